//! Data models for the application
//!
//! Identities come from the identity provider, creation records are the
//! append-only log of completed generations, and the generation module holds
//! the small enums used to parameterize individual kinds.

mod creation;
mod generation;
mod identity;

pub use creation::*;
pub use generation::*;
pub use identity::*;
