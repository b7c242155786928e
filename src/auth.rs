//! Token models shared by the cache, the issuer client, and the stores.

pub mod token;

pub use token::{record::*, secret::*};
