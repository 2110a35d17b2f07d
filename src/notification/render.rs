//! Result rendering - turn a RunResult into a channel-shaped notification
//!
//! Two body strategies:
//! - inline-bounded: header block plus log sections, log shortened to fit a
//!   hard cap (ntfy's server enforces 4096 bytes, we stay under 4000)
//! - attachment: short summary body, full untruncated log as `logs.txt`

use super::channel::{Attachment, BodyStrategy, RenderedNotification};
use crate::runner::RunResult;

/// Maximum command length shown in titles and header blocks
const TITLE_CMD_MAX: usize = 60;

/// Inline body cap in bytes
pub const INLINE_BODY_MAX: usize = 4000;

/// Appended when the log portion of an inline body had to be shortened
pub const TRUNCATION_MARKER: &str = "\n\n... (output truncated)";

/// Attachment filename used by channels that carry the full log
pub const LOG_ATTACHMENT_NAME: &str = "logs.txt";

/// Render `result` for one channel.
///
/// `host` is passed in by the caller; the renderer itself does no ambient
/// lookups.
pub fn render(result: &RunResult, host: &str, strategy: BodyStrategy) -> RenderedNotification {
    let tags = if result.succeeded() {
        vec!["white_check_mark".to_string()]
    } else {
        vec!["x".to_string()]
    };

    match strategy {
        BodyStrategy::InlineBounded { max_len } => RenderedNotification {
            title: render_title(result),
            body: inline_body(result, host, max_len),
            tags,
            attachment: None,
        },
        BodyStrategy::Attachment => RenderedNotification {
            title: render_title(result),
            body: summary_body(result, host),
            tags,
            attachment: Some(Attachment {
                filename: LOG_ATTACHMENT_NAME.to_string(),
                content: result.combined_log(),
            }),
        },
    }
}

/// Status glyph, command trimmed to 60 chars, outcome and duration.
fn render_title(result: &RunResult) -> String {
    let icon = if result.succeeded() { "✅" } else { "❌" };
    let suffix = if result.succeeded() {
        "done".to_string()
    } else {
        format!("failed (exit {})", result.exit_code)
    };
    format!(
        "{} '{}' {} ({:.1}s)",
        icon,
        truncate_command(&result.command),
        suffix,
        result.duration_secs()
    )
}

/// Header block plus STDOUT/STDERR sections, shortened to fit `max_len`.
///
/// The header carries host, command, exit status and duration and is never
/// cut; only the log sections are shortened, and the truncation marker always
/// fits within the cap. Empty sections are omitted entirely.
fn inline_body(result: &RunResult, host: &str, max_len: usize) -> String {
    let status = if result.succeeded() {
        "OK".to_string()
    } else {
        format!("FAILED (exit {})", result.exit_code)
    };
    let header = format!(
        "Host: {}\n$ {}\nStatus: {}\nDuration: {:.1}s\n\n",
        host,
        truncate_command(&result.command),
        status,
        result.duration_secs()
    );

    let mut log = String::new();
    if !result.stdout.is_empty() {
        log.push_str("── STDOUT ───────────────────────────────────\n");
        log.push_str(result.stdout.trim_end_matches('\n'));
        log.push('\n');
    }
    if !result.stderr.is_empty() {
        log.push_str("── STDERR ───────────────────────────────────\n");
        log.push_str(result.stderr.trim_end_matches('\n'));
        log.push('\n');
    }

    if header.len() + log.len() <= max_len {
        return header + &log;
    }

    let keep = max_len.saturating_sub(header.len() + TRUNCATION_MARKER.len());
    let cut = floor_char_boundary(&log, keep);
    let mut body = format!("{}{}{}", header, &log[..cut], TRUNCATION_MARKER);
    // A cap smaller than header + marker cannot fit the scaffolding; the cap
    // still wins.
    if body.len() > max_len {
        body.truncate(floor_char_boundary(&body, max_len));
    }
    body
}

/// Short plain-text summary used when the full log travels as an attachment.
fn summary_body(result: &RunResult, host: &str) -> String {
    let status = if result.succeeded() {
        "SUCCESS ✅".to_string()
    } else {
        format!("FAILED ❌  (exit code {})", result.exit_code)
    };
    [
        format!("Host:      {}", host),
        format!("Command:   {}", result.command),
        format!("Status:    {}", status),
        String::new(),
        format!("Full output is attached as {}.", LOG_ATTACHMENT_NAME),
    ]
    .join("\n")
}

fn truncate_command(cmd: &str) -> String {
    if cmd.chars().count() <= TITLE_CMD_MAX {
        cmd.to_string()
    } else {
        let head: String = cmd.chars().take(TITLE_CMD_MAX - 3).collect();
        format!("{}...", head)
    }
}

/// Largest index <= `max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut idx = max;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
