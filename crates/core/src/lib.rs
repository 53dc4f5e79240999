//! `hotelgate-core`: shared building blocks for the identity handoff.
//!
//! This crate holds the vocabulary every other crate speaks: identifiers,
//! origin URLs and the gate error taxonomy. No IO lives here.

pub mod error;
pub mod id;
pub mod origin;

pub use error::{GateError, Recovery};
pub use id::UserId;
pub use origin::{OriginError, OriginUrl};
