//! Content hashing for save models
//!
//! [`ContentHash`] fingerprints the canonical JSON of a document so the
//! change tracker can tell "identical to what we already saw" without a
//! full structural diff.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

const HASH_LEN: usize = blake3::OUT_LEN;

/// Blake3 fingerprint of a save model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(blake3::Hash);

impl ContentHash {
    /// Fingerprint raw bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(blake3::hash(data))
    }

    /// Fingerprint the JSON encoding of `value`
    ///
    /// `serde_json` maps are key-sorted, so structurally equal save models
    /// hash the same regardless of how they were built. The encoding is
    /// streamed into the hasher.
    ///
    /// # Errors
    /// `HashError::Encode` if `value` refuses to serialize
    pub fn compute_serializable<T>(value: &T) -> Result<Self, HashError>
    where
        T: Serialize + ?Sized,
    {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, value)?;
        Ok(Self(hasher.finalize()))
    }

    /// Leading 16 hex digits, enough to tell models apart in log lines
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0.as_bytes()[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.as_bytes()))
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HASH_LEN * 2 {
            return Err(HashError::Malformed(format!(
                "expected {} hex digits, got {}",
                HASH_LEN * 2,
                s.len()
            )));
        }
        let mut bytes = [0u8; HASH_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| HashError::Malformed(e.to_string()))?;
        Ok(Self(blake3::Hash::from(bytes)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("malformed content hash: {0}")]
    Malformed(String),

    #[error("cannot encode save model: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_models_hash_equal() {
        let a = json!({"title": "A", "version": 1});
        let mut b = serde_json::Map::new();
        b.insert("version".into(), json!(1));
        b.insert("title".into(), json!("A"));

        let ha = ContentHash::compute_serializable(&a).unwrap();
        let hb = ContentHash::compute_serializable(&serde_json::Value::Object(b)).unwrap();
        assert_eq!(ha, hb);
        assert_ne!(ha, ContentHash::compute_serializable(&json!({"title": "B"})).unwrap());
    }

    #[test]
    fn streamed_hash_matches_buffered() {
        let model = json!({"layout": [{"kind": "item"}], "title": "Ops"});
        let buffered = ContentHash::compute(&serde_json::to_vec(&model).unwrap());
        assert_eq!(ContentHash::compute_serializable(&model).unwrap(), buffered);
    }

    #[test]
    fn hex_form_parses_back() {
        let hash = ContentHash::compute(b"dashboard");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
        assert!(hash.to_string().starts_with(&hash.short()));
        assert!(matches!("abcd".parse::<ContentHash>(), Err(HashError::Malformed(_))));
    }
}
