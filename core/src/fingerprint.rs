/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 32;

/// 32-character uppercase hex MD5 digest of the UTF-8 bytes of `content`.
///
/// Deterministic and case sensitive. Used for content identity, not security.
pub fn compute_fingerprint(content: &str) -> String {
    format!("{:X}", md5::compute(content.as_bytes()))
}
