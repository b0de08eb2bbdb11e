use html2text::from_read;
use regex::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("valid url pattern"))
}

fn inline_whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[ \t\u{a0}]+").expect("valid whitespace pattern"))
}

fn blank_lines_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank line pattern"))
}

/// Prepare text for speech: strip markup and URLs, tidy whitespace.
///
/// Paragraph breaks survive as a single blank line so the chunker can
/// still split on them.
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let plain = if text.trim_start().starts_with('<') {
        from_read(text.as_bytes(), usize::MAX)
    } else {
        text
    };

    let without_urls = url_pattern().replace_all(&plain, "");

    let lines: Vec<String> = without_urls
        .lines()
        .map(|line| inline_whitespace_pattern().replace_all(line, " ").trim().to_string())
        .collect();

    blank_lines_pattern()
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// Length in characters, the unit every limit is expressed in
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
