/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Short, log-safe preview of a bearer token (never the whole secret).
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(12).collect();
    format!("{}... ({} chars)", prefix, token.len())
}

/// Format a major-unit amount for display with two decimals.
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("-{:.2}", amount.abs())
    } else {
        format!("{:.2}", amount)
    }
}
