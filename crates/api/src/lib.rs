//! HTTP surface: login origin, guarded role-services and the shell.

pub mod app;
pub mod context;
pub mod cookies;
pub mod middleware;
