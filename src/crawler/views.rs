/// Multiplier for the thousands suffix
const THOUSAND: f64 = 1_000.0;

/// Multiplier for the millions suffix
const MILLION: f64 = 1_000_000.0;

/// Convert a scraped view-count token ("214K", "1.2M", "3,402") into a count.
///
/// Never fails: anything that does not parse becomes 0. Suffix detection is a
/// plain substring check, so any `k` in the token selects the thousands path
/// before `m` is considered. Only surrounding whitespace is ignored. Fractional
/// results are truncated.
pub fn parse_views(token: &str) -> u64 {
    let cleaned = token.trim().to_lowercase().replace(',', "");

    if cleaned.contains('k') {
        scaled(&cleaned.replace('k', ""), THOUSAND)
    } else if cleaned.contains('m') {
        scaled(&cleaned.replace('m', ""), MILLION)
    } else if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
        cleaned.parse().unwrap_or(u64::MAX)
    } else {
        0
    }
}

/// Parse a decimal remainder and apply the suffix multiplier
fn scaled(remainder: &str, multiplier: f64) -> u64 {
    match remainder.trim().parse::<f64>() {
        // `as` saturates at u64::MAX and truncates toward zero
        Ok(value) if value.is_finite() && value >= 0.0 => (value * multiplier) as u64,
        _ => 0,
    }
}
