//! Bearer token secret wrapper and the cached credential record.

pub mod record;
pub mod secret;
