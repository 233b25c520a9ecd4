const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Collapse every run of whitespace to a single space and trim both ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 32-bit FNV-1a over raw bytes
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Fingerprint of a region's visible text: FNV-1a of the normalized UTF-8
/// bytes, as 8 lowercase hex digits.
pub fn fingerprint(text: &str) -> String {
    format!("{:08x}", fnv1a_32(normalize_text(text).as_bytes()))
}
