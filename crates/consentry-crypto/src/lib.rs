#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod canonical;
mod digest;

pub use canonical::canonical_json;
pub use digest::{assignment_seed, canonical_sha256_hex, consent_digest, keccak256};
