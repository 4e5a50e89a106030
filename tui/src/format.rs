//! Text formatting helpers for the TUI.

use std::time::Duration;

use unicode_width::UnicodeWidthChar;

/// Render a remaining duration as `mm:ss`.
///
/// Sub-second remainders round up, so a countdown never shows `00:00` while
/// time is actually left.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let mut total_secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        total_secs += 1;
    }
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Truncate `text` to at most `max_width` terminal columns, appending an
/// ellipsis when anything was cut.
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}
