//! Draft parsing helpers: multi-line button definitions and schedule delays.

use std::time::Duration;

use bcast_core::Button;
use tracing::warn;

/// Parses inline buttons from the lines after a `/send` or `/schedule` command.
/// One button per line, `label | url`; only http(s) URLs are accepted.
/// Malformed lines are skipped with a warning rather than failing the draft.
pub fn parse_buttons(command_text: &str) -> Vec<Button> {
    let mut buttons = Vec::new();

    for line in command_text.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((label, url)) = line.split_once('|') else {
            warn!(line, "Skipping button line without 'label | url' separator");
            continue;
        };
        let label = label.trim();
        let url = url.trim();
        if label.is_empty() {
            warn!(line, "Skipping button line with empty label");
            continue;
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warn!(url, "Skipping button with non-http(s) URL");
            continue;
        }
        buttons.push(Button {
            label: label.to_string(),
            url: url.to_string(),
        });
    }

    buttons
}

/// Parses a schedule delay like `10m`, `2h`, or `1d` into a duration.
pub fn parse_delay(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    if input.len() < 2 || !input.is_ascii() {
        return None;
    }

    let (value, unit) = input.split_at(input.len() - 1);
    let value: u64 = value.parse().ok()?;
    let unit_secs = match unit {
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        _ => return None,
    };

    Some(Duration::from_secs(value.checked_mul(unit_secs)?))
}
