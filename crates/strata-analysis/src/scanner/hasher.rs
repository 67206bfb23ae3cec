//! Content hashing via xxh3.

use xxhash_rust::xxh3::xxh3_64;

/// Compute the xxh3 64-bit hash of file content.
#[inline]
pub fn hash_content(content: &[u8]) -> u64 {
    xxh3_64(content)
}

/// Stored form of a content hash: 16 lowercase hex digits.
///
/// Doubles as the provenance tag of every symbol and edge the file produces.
#[inline]
pub fn hash_hex(hash: u64) -> String {
    format!("{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_hash() {
        let data = b"hello world";
        assert_eq!(hash_content(data), hash_content(data));
    }

    #[test]
    fn different_content_different_hash() {
        assert_ne!(hash_content(b"hello"), hash_content(b"world"));
    }

    #[test]
    fn hex_is_fixed_width() {
        assert_eq!(hash_hex(0xab), "00000000000000ab");
        assert_eq!(hash_hex(hash_content(b"x")).len(), 16);
    }
}
