// src/utils/hash.rs

//! Content fingerprinting.
//!
//! The metadata store records an MD5 hex digest per file. MD5 is a
//! change fingerprint here, not a security boundary; the digest only
//! ever gets compared against a previous digest of the same resource.

use std::path::Path;

use md5::{Digest, Md5};

use crate::error::Result;

/// MD5 hex digest of a byte slice.
pub fn md5_hex(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// MD5 hex digest of a file's bytes.
pub async fn hash_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(md5_hex(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_hex_known_vectors() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[tokio::test]
    async fn test_hash_file_matches_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doc.html");
        tokio::fs::write(&path, b"hello world").await.unwrap();

        let from_file = hash_file(&path).await.unwrap();
        assert_eq!(from_file, md5_hex(b"hello world"));
    }

    #[tokio::test]
    async fn test_hash_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(hash_file(&dir.path().join("absent")).await.is_err());
    }
}
