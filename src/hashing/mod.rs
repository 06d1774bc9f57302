use blake3::Hasher;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Birthday bound is around 4 billion items.
///
/// Use [`hash_score_input`] where the full 256-bit digest is wanted.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Hashes a `(namespace, value)` pair so identical values from different
/// identifier kinds never collide (a DOI and a title that happen to match).
#[inline]
pub fn hash_identity(namespace: &str, value: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"|");
    hasher.update(value.as_bytes());

    let hash = hasher.finalize();
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Full digest of the per-record dynamic content sent to the oracle.
///
/// The length prefix keeps `("ab", "c")` and `("a", "bc")` apart.
#[inline]
pub fn hash_score_input(title: &str, abstract_text: &str) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(&(title.len() as u64).to_le_bytes());
    hasher.update(title.as_bytes());
    hasher.update(abstract_text.as_bytes());
    *hasher.finalize().as_bytes()
}
