//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Generate a deterministic cache key from an endpoint, a namespace and parameters.
///
/// The namespace is the active credential fingerprint, so entries fetched with
/// one credential set are never served to another. Parameters are sorted so
/// their order does not matter.
pub fn cache_key(endpoint: &str, namespace: Option<&str>, params: &[(&str, &str)]) -> String {
    let mut hasher = Sha256::new();

    hasher.update(endpoint.as_bytes());
    hasher.update(b"|");

    if let Some(namespace) = namespace {
        hasher.update(namespace.as_bytes());
    }
    hasher.update(b"|");

    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort_by_key(|(k, _)| *k);

    for (k, v) in sorted_params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}
