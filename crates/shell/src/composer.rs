//! Route matching and page composition for the shell.

use crate::sandbox::Sandbox;
use crate::table::{ShellEntry, ShellTable};

/// A single sandboxed embedding boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedView {
    pub src: String,
    pub title: String,
    pub sandbox: Sandbox,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellView {
    Home,
    Embed(EmbedView),
    /// Unknown route; replace it with the home route.
    Redirect { to: String },
}

#[derive(Debug, Clone)]
pub struct ShellComposer {
    table: ShellTable,
    sandbox: Sandbox,
    /// Prefix the shell is served under ("" at the root).
    mount: String,
}

impl ShellComposer {
    pub fn new(table: ShellTable) -> Self {
        Self {
            table,
            sandbox: Sandbox::standard(),
            mount: String::new(),
        }
    }

    /// Serve the shell below `prefix` (e.g. `/shell`).
    pub fn mounted_at(mut self, prefix: &str) -> Self {
        self.mount = prefix.trim_end_matches('/').to_string();
        self
    }

    pub fn table(&self) -> &ShellTable {
        &self.table
    }

    pub fn home_path(&self) -> String {
        if self.mount.is_empty() {
            "/".to_string()
        } else {
            self.mount.clone()
        }
    }

    /// `route` is relative to the mount point.
    pub fn compose(&self, route: &str) -> ShellView {
        let route = route.trim_end_matches('/');
        if route.is_empty() {
            return ShellView::Home;
        }

        match self.table.find(route) {
            Some(entry) => ShellView::Embed(EmbedView {
                src: entry.origin.as_str().to_string(),
                title: entry.title.clone(),
                sandbox: self.sandbox,
            }),
            None => {
                tracing::debug!(route, "unknown shell route; redirecting home");
                ShellView::Redirect { to: self.home_path() }
            }
        }
    }

    /// Full HTML document for `view`; `active` is the matched route.
    pub fn render(&self, view: &ShellView, active: &str) -> String {
        let body = match view {
            ShellView::Home => self.render_home(),
            ShellView::Embed(embed) => format!(
                r#"<iframe class="shell-iframe" src="{}" title="{}" sandbox="{}"></iframe>"#,
                escape_html(&embed.src),
                escape_html(&embed.title),
                embed.sandbox.attribute()
            ),
            ShellView::Redirect { to } => format!(r#"<a href="{}">Home</a>"#, escape_html(to)),
        };

        format!(
            "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Hotel Inventory Shell</title></head>\n\
             <body><header><h1>Hotel Inventory Shell</h1>{}</header>\n<main>{}</main></body></html>\n",
            self.render_nav(active),
            body
        )
    }

    pub fn render_nav(&self, active: &str) -> String {
        let active = active.trim_end_matches('/');
        let mut nav = String::from("<nav>");
        nav.push_str(&self.link(&self.home_path(), "Home", active.is_empty()));
        for ShellEntry { route, label, .. } in self.table.entries() {
            let href = format!("{}{}", self.mount, route);
            nav.push_str(&self.link(&href, label, active == route));
        }
        nav.push_str("</nav>");
        nav
    }

    fn link(&self, href: &str, label: &str, active: bool) -> String {
        let class = if active { r#" class="active""# } else { "" };
        format!(r#"<a href="{}"{}>{}</a>"#, escape_html(href), class, escape_html(label))
    }

    fn render_home(&self) -> String {
        let badges: String = self
            .table
            .entries()
            .iter()
            .map(|e| format!("<li>{} @ {}</li>", escape_html(&e.label), escape_html(e.origin.as_str())))
            .collect();
        format!(
            "<h2>Welcome</h2><p>Use the navigation to open each service. Every service \
             checks its own session.</p><ul>{badges}</ul>"
        )
    }
}

/// Escape text for use in HTML content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use hotelgate_core::OriginUrl;

    use super::*;

    fn composer() -> ShellComposer {
        ShellComposer::new(ShellTable::from_lookup(|_| None).unwrap())
    }

    #[test]
    fn known_route_embeds_its_origin() {
        let view = composer().compose("/frontdesk");

        assert_eq!(
            view,
            ShellView::Embed(EmbedView {
                src: "http://localhost:3003".into(),
                title: "Frontdesk Service".into(),
                sandbox: Sandbox::standard(),
            })
        );
    }

    #[test]
    fn unknown_route_redirects_home() {
        assert_eq!(composer().compose("/billing"), ShellView::Redirect { to: "/".into() });
        assert_eq!(
            composer().mounted_at("/shell").compose("/billing"),
            ShellView::Redirect { to: "/shell".into() }
        );
        assert_eq!(composer().compose("/"), ShellView::Home);
    }

    #[test]
    fn rendered_page_has_one_sandboxed_frame_and_marks_the_active_link() {
        let c = composer().mounted_at("/shell");
        let html = c.render(&c.compose("/inspector"), "/inspector");

        assert_eq!(html.matches("<iframe").count(), 1);
        assert!(html.contains(
            r#"sandbox="allow-scripts allow-same-origin allow-forms allow-popups allow-downloads""#
        ));
        assert!(html.contains(r#"<a href="/shell/inspector" class="active">Inspector</a>"#));
        assert!(html.contains(r#"<a href="/shell">Home</a>"#));
    }

    #[test]
    fn titles_are_escaped() {
        let table = ShellTable::new()
            .with_entry("/x", OriginUrl::parse("http://localhost:1").unwrap(), "<b>X</b>", "X")
            .unwrap();
        let c = ShellComposer::new(table);
        let html = c.render(&c.compose("/x"), "/x");

        assert!(html.contains("&lt;b&gt;X&lt;/b&gt;"));
    }

    proptest! {
        #[test]
        fn every_route_is_home_embed_or_redirect(route in "(/[a-z]{0,10}){0,3}") {
            let c = composer();
            match c.compose(&route) {
                ShellView::Home => prop_assert!(route.trim_end_matches('/').is_empty()),
                ShellView::Embed(embed) => {
                    prop_assert!(c.table().find(&route).is_some());
                    prop_assert!(!embed.sandbox.attribute().contains("top-navigation"));
                }
                ShellView::Redirect { to } => prop_assert_eq!(to, "/"),
            }
        }
    }
}
