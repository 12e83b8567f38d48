//! Truncated previews for debug logging.
//!
//! Secrets and request text only ever reach the log through these helpers.

/// Characters of a secret that may appear in a log line.
pub const SECRET_PREFIX_CHARS: usize = 5;

/// Characters of request text that may appear in a log line.
pub const TEXT_PREFIX_CHARS: usize = 50;

/// Short prefix of a secret followed by `...`.
///
/// Values no longer than the prefix are cut to half their length so the
/// whole value is never echoed back.
#[must_use]
pub fn secret_preview(value: &str) -> String {
    let len = value.chars().count();
    let keep = if len > SECRET_PREFIX_CHARS {
        SECRET_PREFIX_CHARS
    } else {
        len / 2
    };
    let prefix: String = value.chars().take(keep).collect();
    format!("{prefix}...")
}

/// First [`TEXT_PREFIX_CHARS`] characters of `text`, with `...` if cut.
#[must_use]
pub fn text_preview(text: &str) -> String {
    let mut chars = text.chars();
    let prefix: String = chars.by_ref().take(TEXT_PREFIX_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}...")
    } else {
        prefix
    }
}
