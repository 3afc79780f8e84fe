//! Keeps response bodies and credentials out of logs.

/// Longest body excerpt written to a log line, in bytes.
const BODY_LOG_LIMIT: usize = 256;

/// Visible prefix of a masked token.
const TOKEN_VISIBLE: usize = 6;

/// Largest char boundary at or below `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0)
}

/// Response body excerpt for debug/error logs.
///
/// Bodies longer than the limit are cut on a char boundary and suffixed with
/// the original length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= BODY_LOG_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, BODY_LOG_LIMIT)],
            s.len()
        )
    }
}

/// Show only the head of a bearer or refresh token.
pub fn mask_token(token: &str) -> String {
    let end = floor_char_boundary(token, TOKEN_VISIBLE);
    if end >= token.len() {
        "***".to_string()
    } else {
        format!("{}***", &token[..end])
    }
}
