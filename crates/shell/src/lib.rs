//! `hotelgate-shell`: the portal that embeds every service side by side.
//!
//! The shell takes no part in the identity protocol: each embedded service
//! resolves its own session through its own guard.

pub mod composer;
pub mod sandbox;
pub mod table;

pub use composer::{EmbedView, ShellComposer, ShellView, escape_html};
pub use sandbox::{Capability, Sandbox};
pub use table::{ShellConfigError, ShellEntry, ShellTable};
