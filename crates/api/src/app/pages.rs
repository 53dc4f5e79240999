//! Minimal HTML pages served by the login origin and the role-services.

use hotelgate_auth::{Identity, KnownRole};
use hotelgate_routing::{RoutingOutcome, ServiceLink};
use hotelgate_shell::escape_html;

fn document(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>{}</head>\n<body>{}</body></html>\n",
        escape_html(title),
        head_extra,
        body
    )
}

fn link_list(links: &[ServiceLink]) -> String {
    let items: String = links
        .iter()
        .map(|l| format!(r#"<li><a href="{}">{}</a></li>"#, escape_html(&l.href), escape_html(&l.label)))
        .collect();
    format!("<ul>{items}</ul>")
}

pub fn login(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape_html(e)))
        .unwrap_or_default();
    document(
        "Sign in",
        "",
        &format!(
            r#"<h1>Hotel Inventory</h1>{error}
<form method="post" action="/login">
<label>Username <input name="username" autocomplete="username" required></label>
<label>Password <input name="password" type="password" autocomplete="current-password" required></label>
<button type="submit">Sign in</button>
</form>"#
        ),
    )
}

/// `refresh` is the (seconds, url) of the next automatic re-check, if any.
pub fn fallback(outcome: &RoutingOutcome, refresh: Option<(u64, String)>) -> String {
    let head = refresh
        .as_ref()
        .map(|(secs, url)| format!(r#"<meta http-equiv="refresh" content="{secs};url={}">"#, escape_html(url)))
        .unwrap_or_default();
    let note = match &refresh {
        Some((secs, _)) => format!("<p>Checking again in {secs}s.</p>"),
        None => r#"<p><a href="/dashboard">Check again</a></p>"#.to_string(),
    };
    document(
        "Service unavailable",
        &head,
        &format!(
            "<h1>Your service is not answering</h1><p>You can open it directly:</p>{}{note}",
            link_list(outcome.links())
        ),
    )
}

pub fn manual_choice(outcome: &RoutingOutcome) -> String {
    let role = match outcome {
        RoutingOutcome::ManualChoice { role, .. } => role.as_str(),
        _ => "",
    };
    document(
        "Choose a service",
        "",
        &format!(
            "<h1>Choose a service</h1><p>No service is configured for role {}.</p>{}",
            escape_html(role),
            link_list(outcome.links())
        ),
    )
}

pub fn service_home(service: KnownRole, identity: &Identity, access: &[KnownRole], logout_href: &str) -> String {
    let role = identity
        .role
        .known()
        .map(|r| r.display_name())
        .unwrap_or_else(|| identity.role.as_str());
    let areas: String = access
        .iter()
        .map(|r| format!("<li>{}</li>", escape_html(r.display_name())))
        .collect();
    document(
        &format!("{} Dashboard", service.service_label()),
        "",
        &format!(
            r#"<h1>{} Dashboard</h1><p>Signed in as {} ({})</p><ul class="access">{}</ul><p><a href="{}">Log out</a></p>"#,
            escape_html(service.service_label()),
            escape_html(&identity.full_name()),
            escape_html(role),
            areas,
            escape_html(logout_href)
        ),
    )
}
