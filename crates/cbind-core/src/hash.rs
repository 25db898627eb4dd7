//! Content digests for front-end modules.
//!
//! Generated bindings are stamped with the digest of the module they were
//! produced from, so stale output can be detected without re-running the
//! front end.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::module::Module;

/// A 32-byte SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// Compute the SHA-256 hash of the canonical JSON form of `value`.
pub fn content_hash<T: Serialize>(value: &T) -> serde_json::Result<ContentHash> {
    let json = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hasher.finalize().into())
}

/// Format a content hash as a hex string.
pub fn hash_hex(hash: &ContentHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Hex digest stamped into bindings generated from `module`.
pub fn module_digest(module: &Module) -> serde_json::Result<String> {
    content_hash(module).map(|hash| hash_hex(&hash))
}
