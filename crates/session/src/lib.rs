//! `hotelgate-session`: the persisted identity+token record.
//!
//! Components never touch a storage primitive directly; they go through
//! [`SessionManager`] over an injectable [`StorageBackend`].

pub mod backend;
pub mod manager;

pub use backend::{InMemoryStorage, StorageBackend, StorageError};
pub use manager::{IDENTITY_KEY, SessionError, SessionManager, TOKEN_KEY};
