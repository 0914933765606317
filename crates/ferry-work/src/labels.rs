// labels.rs — Label footer parsing and mutation.
//
// A change message may end with a block of `KEY=VALUE` lines (the footer):
//
//   Fix the frobnicator
//
//   Some longer description.
//
//   BUG=1234
//   ORIGINAL_AUTHOR=Foo Bar <foo@bar.com>
//
// Every function here takes the message as a string and returns a new one,
// so each mutation can be tested without a work context.
//
// The footer is the last contiguous run of label lines once trailing blank
// lines are skipped. When adding, that run is only extended if it is a
// proper group: preceded by a blank line or by the start of the message.
// Otherwise a new group is started after a blank line.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

fn label_regex() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| Regex::new(r"^(?P<key>[\w-]+)=(?P<value>.*)$").expect("label regex is valid"))
}

/// Parse a single line as a `KEY=VALUE` label.
pub fn parse_label_line(line: &str) -> Option<(&str, &str)> {
    let caps = label_regex().captures(line)?;
    let key = caps.name("key")?.as_str();
    let value = caps.name("value")?.as_str();
    Some((key, value))
}

/// Line range of the footer, if the message has one.
fn footer_range(lines: &[&str]) -> Option<Range<usize>> {
    let mut end = lines.len();
    while end > 0 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    let mut start = end;
    while start > 0 && parse_label_line(lines[start - 1]).is_some() {
        start -= 1;
    }
    (start < end).then_some(start..end)
}

/// Index of the first footer line carrying `key`.
fn find_in_footer(lines: &[&str], key: &str) -> Option<usize> {
    footer_range(lines)?.find(|&idx| matches!(parse_label_line(lines[idx]), Some((k, _)) if k == key))
}

fn split_lines(message: &str) -> Vec<&str> {
    message.split('\n').collect()
}

/// All labels in the footer, in order of appearance.
pub fn parse_labels(message: &str) -> Vec<(String, String)> {
    let lines = split_lines(message);
    match footer_range(&lines) {
        Some(range) => lines[range]
            .iter()
            .filter_map(|line| parse_label_line(line))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => Vec::new(),
    }
}

/// Value of the first footer label named `key`.
pub fn get_label(message: &str, key: &str) -> Option<String> {
    let lines = split_lines(message);
    let idx = find_in_footer(&lines, key)?;
    parse_label_line(lines[idx]).map(|(_, value)| value.to_string())
}

/// Append `key=value` to the footer, creating one if needed.
///
/// Existing entries for `key` are kept, so calling this twice leaves two
/// lines. Use [`replace_label`] or [`add_or_replace_label`] for single-valued
/// labels.
pub fn add_label(message: &str, key: &str, value: &str) -> String {
    let label = format!("{}={}", key, value);
    let lines = split_lines(message);

    if let Some(range) = footer_range(&lines) {
        let grouped = range.start == 0 || lines[range.start - 1].trim().is_empty();
        if grouped {
            let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 2);
            out.extend_from_slice(&lines[..range.end]);
            out.push(&label);
            out.extend_from_slice(&lines[range.end..]);
            if range.end == lines.len() {
                // Footer was the last line without a newline.
                out.push("");
            }
            return out.join("\n");
        }
    }

    if message.trim_end_matches('\n').is_empty() {
        return format!("{}\n", label);
    }
    // Exactly one blank line must separate the body from the new group;
    // blank lines already there are kept as they are.
    let separator = match message.len() - message.trim_end_matches('\n').len() {
        0 => "\n\n",
        1 => "\n",
        _ => "",
    };
    format!("{}{}{}\n", message, separator, label)
}

/// Rewrite the value of the first footer label named `key`.
///
/// Returns the message unchanged if the label isn't present.
pub fn replace_label(message: &str, key: &str, value: &str) -> String {
    let lines = split_lines(message);
    let Some(idx) = find_in_footer(&lines, key) else {
        return message.to_string();
    };
    let label = format!("{}={}", key, value);
    let mut out = lines;
    out[idx] = label.as_str();
    out.join("\n")
}

/// Delete the line of the first footer label named `key`.
///
/// Returns the message unchanged if the label isn't present.
pub fn remove_label(message: &str, key: &str) -> String {
    let mut lines = split_lines(message);
    match find_in_footer(&lines, key) {
        Some(idx) => {
            lines.remove(idx);
            lines.join("\n")
        }
        None => message.to_string(),
    }
}

/// Replace `key` if it is already in the footer, otherwise add it.
pub fn add_or_replace_label(message: &str, key: &str, value: &str) -> String {
    let lines = split_lines(message);
    if find_in_footer(&lines, key).is_some() {
        replace_label(message, key, value)
    } else {
        add_label(message, key, value)
    }
}
