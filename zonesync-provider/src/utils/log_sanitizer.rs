//! Keeps response bodies out of logs at full length.
//!
//! Source responses can carry long TXT payloads (DKIM keys, SPF chains) and
//! error bodies may echo request headers.

/// Maximum number of bytes kept from a logged body.
const TRUNCATE_LIMIT: usize = 256;

/// Truncate a string for logging, never splitting a UTF-8 character.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= TRUNCATE_LIMIT)
        .last()
        .unwrap_or(0);
    format!("{}... [truncated, total {} bytes]", &s[..cut], s.len())
}
