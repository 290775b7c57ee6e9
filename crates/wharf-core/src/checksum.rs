//! Streaming SHA-256 digests

use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Read buffer size used while hashing
pub const BUFFER_SIZE: usize = 4 * 1024;

/// Hash everything `reader` yields and return the lower-case hex digest.
///
/// Memory use is bounded by [`BUFFER_SIZE`] regardless of input length.
pub fn sha256_hex<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUFFER_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Whether `candidate` is a well-formed hex SHA-256 digest
pub fn is_sha256_hex(candidate: &str) -> bool {
    candidate.len() == 64 && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}
