//! # Hasher Module
//!
//! Computes content fingerprints for media files.
//!
//! Only a bounded prefix of each file is hashed: files larger than the
//! prefix limit are identified by their first `limit` bytes, smaller files by
//! their whole content. Two files that differ only past the prefix share a
//! fingerprint.

use crate::core::media::Fingerprint;
use crate::error::FingerprintError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_128;

/// Default number of leading bytes hashed per file
pub const DEFAULT_PREFIX_LIMIT: usize = 2_000_000;

/// Fingerprint and full size of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprinted {
    pub fingerprint: Fingerprint,
    pub size: u64,
}

/// Hash at most `limit` bytes read from `reader`
pub fn fingerprint_reader<R: Read>(reader: R, limit: usize) -> std::io::Result<Fingerprint> {
    let mut buffer = Vec::with_capacity(limit.min(64 * 1024));
    reader.take(limit as u64).read_to_end(&mut buffer)?;
    Ok(Fingerprint::from_bytes(xxh3_128(&buffer).to_be_bytes()))
}

/// Open, stat and fingerprint a file
pub fn fingerprint_file(path: &Path, limit: usize) -> Result<Fingerprinted, FingerprintError> {
    let file = File::open(path).map_err(|source| FingerprintError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let size = file
        .metadata()
        .map_err(|source| FingerprintError::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    let fingerprint =
        fingerprint_reader(&file, limit).map_err(|source| FingerprintError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Fingerprinted { fingerprint, size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn small_file_hashes_whole_content() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.jpg");
        let b = temp.path().join("b.jpg");
        fs::write(&a, b"hello world").unwrap();
        fs::write(&b, b"hello worle").unwrap();

        let fa = fingerprint_file(&a, 1024).unwrap();
        let fb = fingerprint_file(&b, 1024).unwrap();

        assert_eq!(fa.size, 11);
        assert_ne!(fa.fingerprint, fb.fingerprint);
        assert_eq!(fa.fingerprint, fingerprint_reader(&b"hello world"[..], 1024).unwrap());
    }

    #[test]
    fn large_files_differing_past_prefix_collide() {
        let temp = TempDir::new().unwrap();
        let limit = 4096;

        let mut first = vec![0x5a_u8; limit];
        first.extend_from_slice(b"tail one");
        let mut second = vec![0x5a_u8; limit];
        second.extend_from_slice(b"a completely different and longer tail");

        let a = temp.path().join("a.mov");
        let b = temp.path().join("b.mov");
        fs::write(&a, &first).unwrap();
        fs::write(&b, &second).unwrap();

        let fa = fingerprint_file(&a, limit).unwrap();
        let fb = fingerprint_file(&b, limit).unwrap();

        assert_eq!(fa.fingerprint, fb.fingerprint);
        assert_ne!(fa.size, fb.size);
        assert_eq!(fa.fingerprint, fingerprint_reader(&first[..limit], limit).unwrap());
    }

    #[test]
    fn difference_inside_prefix_is_detected() {
        let limit = 16;
        let a = fingerprint_reader(&b"0123456789abcdefXYZ"[..], limit).unwrap();
        let b = fingerprint_reader(&b"0123456789abcdeFXYZ"[..], limit).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let result = fingerprint_file(Path::new("/nonexistent/file.jpg"), 1024);
        assert!(matches!(result, Err(FingerprintError::Open { .. })));
    }
}
