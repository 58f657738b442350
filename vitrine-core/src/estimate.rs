/// Estimates the decoded size, in bytes, of a base64 image reference.
///
/// Anything up to and including the first `,` (a `data:` URI header) is
/// ignored. Every four payload characters stand for three bytes; padding is
/// not subtracted, so the result may overshoot by up to two bytes.
pub fn estimate_size(encoded: &str) -> u64 {
    let payload = match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    };
    payload.len() as u64 * 3 / 4
}

/// The [`estimate_size`] of `byte_len` bytes once base64 encoded, computed
/// without encoding them.
pub fn estimate_encoded(byte_len: u64) -> u64 {
    // 4 * ceil(n / 3) payload characters, times 3 / 4.
    byte_len.div_ceil(3) * 3
}
