//! Public extension contracts for consumers of the cached token.

pub mod request_signer;

pub use request_signer::*;
