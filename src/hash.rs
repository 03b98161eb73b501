//! BLAKE3 hashing utilities for artifact integrity
//!
//! Digests are used three ways with different failure policies:
//! install-time verification against a caller-supplied hash (fatal unless
//! permissive), resolution-time comparison against a manifest pin
//! (disqualifies the candidate release), and lockfile replay (always fatal).
//! The policies live at the call sites; this module only computes and
//! compares digests.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;
use walkdir::WalkDir;

use crate::error::{DepotError, Result};

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate BLAKE3 hash of a byte slice
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}

/// Calculate BLAKE3 hash of a file
#[allow(dead_code)]
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| DepotError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| DepotError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

/// Calculate BLAKE3 hash of a directory's contents
///
/// Hashes all files recursively, sorted by relative path with NUL
/// separators, so the result is deterministic across platforms.
#[allow(dead_code)]
pub fn hash_directory(path: &Path) -> Result<String> {
    if !path.is_dir() {
        return Err(DepotError::FileReadFailed {
            path: path.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    let mut hasher = Hasher::new();
    let mut files: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();

    // Sort for deterministic hashing
    files.sort_by_key(|e| e.path().to_path_buf());

    for entry in files {
        let file_path = entry.path();

        let relative_path = file_path
            .strip_prefix(path)
            .unwrap_or(file_path)
            .to_string_lossy();
        hasher.update(relative_path.as_bytes());
        hasher.update(b"\0");

        let file = File::open(file_path).map_err(|e| DepotError::FileReadFailed {
            path: file_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut reader = BufReader::new(file);
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| DepotError::FileReadFailed {
                    path: file_path.display().to_string(),
                    reason: e.to_string(),
                })?;

            if bytes_read == 0 {
                break;
            }

            hasher.update(&buffer[..bytes_read]);
        }

        hasher.update(b"\0");
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

/// Verify a hash matches the expected value
///
/// Comparison is byte-exact after normalizing the prefix.
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    let normalize = |h: &str| {
        if h.starts_with(HASH_PREFIX) {
            h.to_string()
        } else {
            format!("{}{}", HASH_PREFIX, h)
        }
    };

    normalize(expected) == normalize(actual)
}
