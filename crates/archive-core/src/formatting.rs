/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use archive_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a duration in seconds for run summaries.
///
/// * `< 1` second → milliseconds, e.g. `"420ms"`
/// * otherwise → seconds with two decimals, e.g. `"3.25s"`
///
/// # Examples
///
/// ```
/// use archive_core::formatting::format_seconds;
///
/// assert_eq!(format_seconds(0.42), "420ms");
/// assert_eq!(format_seconds(3.25), "3.25s");
/// ```
pub fn format_seconds(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{}ms", (seconds * 1000.0).round() as u64)
    } else {
        format!("{:.2}s", seconds)
    }
}

/// Width in cells of a bar for `value` scaled against `max`.
///
/// Any non-zero value gets at least one cell so that small buckets stay
/// visible next to large ones.
///
/// # Examples
///
/// ```
/// use archive_core::formatting::bar_length;
///
/// assert_eq!(bar_length(50, 100, 40), 20);
/// assert_eq!(bar_length(1, 10_000, 40), 1);
/// assert_eq!(bar_length(0, 100, 40), 0);
/// ```
pub fn bar_length(value: u64, max: u64, width: usize) -> usize {
    if value == 0 || max == 0 || width == 0 {
        return 0;
    }
    let scaled = (value as f64 / max as f64 * width as f64).round() as usize;
    scaled.clamp(1, width)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
