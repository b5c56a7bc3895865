use std::fmt;
use std::time::Instant;

pub(crate) fn human_size(bytes: impl humansize::ToF64 + humansize::Unsigned) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

pub(crate) fn bold(val: &dyn fmt::Display) -> String {
    nu_ansi_term::Style::new().bold().paint(val.to_string()).to_string()
}

pub(crate) fn elapsed(start: Instant) -> String {
    format!("{:.2?}", start.elapsed())
}

/// Keeps at most `max_chars` characters from the end of the text, marking the
/// cut with an ellipsis. Tools tend to print the actual error at the very end.
pub(crate) fn truncate_start(text: &str, max_chars: usize) -> String {
    let len = text.chars().count();
    if len <= max_chars {
        return text.to_owned();
    }

    let tail: String = text.chars().skip(len - max_chars.saturating_sub(1)).collect();
    format!("…{tail}")
}
