//! Pattern matching utilities for prompt detection.

use memchr::memchr_iter;
use regex::bytes::Regex;

/// Compile a prompt pattern string into a regex anchored at the end of input.
///
/// The device may emit trailing spaces after the prompt, so the pattern is
/// followed by optional horizontal whitespace and anchored with `\z`. A
/// pattern that already ends with `\z` is left untouched.
pub fn compile_prompt_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = if pattern.ends_with(r"\z") {
        pattern.to_string()
    } else {
        format!(r"(?:{})[ \t]*\z", pattern)
    };

    Regex::new(&pattern)
}

/// Build one end-anchored regex that matches any of `patterns`.
pub fn combine_patterns<'a>(
    patterns: impl IntoIterator<Item = &'a str>,
) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = patterns
        .into_iter()
        .map(|p| format!("(?:{})", p))
        .collect();
    compile_prompt_pattern(&alternatives.join("|"))
}

/// Split captured output into display lines.
///
/// Lines are separated by `\n`. A carriage return inside a line means the
/// device redrew it, so only the last non-empty `\r`-separated segment is
/// kept. Trailing whitespace is removed.
pub fn split_lines(raw: &str) -> Vec<String> {
    let bytes = raw.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;

    for end in memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
        if end < start {
            continue;
        }
        let line = &raw[start..end];
        let visible = line
            .split('\r')
            .filter(|segment| !segment.is_empty())
            .last()
            .unwrap_or("");
        lines.push(visible.trim_end().to_string());
        start = end + 1;
    }

    // A trailing newline produces one empty segment that carries no content.
    if raw.ends_with('\n') {
        lines.pop();
    }
    lines
}
