//! Credential identifiers and token models.

pub mod id;
pub mod token;

pub use id::*;
pub use token::{record::*, secret::*};
