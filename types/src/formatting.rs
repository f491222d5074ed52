//! Centralized number and time formatting for analysis output.
//!
//! All numeric display formatting goes through this module so the CLI
//! renders totals, percentages and fight times consistently.

/// Format a number with thousands separators.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_thousands;
/// assert_eq!(format_thousands(0), "0");
/// assert_eq!(format_thousands(1_500), "1,500");
/// assert_eq!(format_thousands(1_500_000), "1,500,000");
/// ```
pub fn format_thousands(n: i64) -> String {
    let s = n.abs().to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    if n < 0 {
        result.insert(0, '-');
    }
    result
}

/// Format a percentage value with 1 decimal place.
pub fn format_pct(n: f64) -> String {
    format!("{:.1}%", n)
}

/// Format a percentage from count/total.
///
/// Returns `"0%"` if total is zero.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_pct_ratio;
/// assert_eq!(format_pct_ratio(3, 10), "30.0%");
/// assert_eq!(format_pct_ratio(0, 0), "0%");
/// ```
pub fn format_pct_ratio(count: i64, total: i64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format_pct(count as f64 / total as f64 * 100.0)
}

/// Format a duration as `M:SS`.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_duration;
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(0), "0:00");
/// ```
pub fn format_duration(secs: i64) -> String {
    let mins = secs / 60;
    let secs = secs % 60;
    format!("{}:{:02}", mins, secs)
}

/// Format a fight-relative millisecond timestamp as `M:SS`.
///
/// Sub-second precision is truncated; negative inputs clamp to `0:00`
/// (they indicate an event recorded before the fight clock started).
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_fight_time;
/// assert_eq!(format_fight_time(125_700.0), "2:05");
/// assert_eq!(format_fight_time(-40.0), "0:00");
/// ```
pub fn format_fight_time(ms: f64) -> String {
    if ms <= 0.0 {
        return "0:00".to_string();
    }
    format_duration((ms / 1000.0) as i64)
}
