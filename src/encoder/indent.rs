//! Indentation of statement bodies.

/// Prefix every non-blank line of `code`. Empty input stays empty.
pub fn prefix_lines(code: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(code.len() + prefix.len() * 4);
    for line in code.split_inclusive('\n') {
        if !line.trim().is_empty() {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}

/// Normalise a container body.
///
/// - Empty or whitespace-only bodies become one placeholder line.
/// - A body whose first non-blank line is already indented is kept as is.
/// - Otherwise every non-blank line is indented by exactly one `indent`.
/// - The result always ends with a newline.
pub fn indent_body_if_needed(code: &str, indent: &str, placeholder: &str) -> String {
    if code.trim().is_empty() {
        return format!("{indent}{placeholder}\n");
    }
    let normalized = code.replace('\r', "");
    let starts_indented = normalized
        .lines()
        .find(|l| !l.trim().is_empty())
        .is_some_and(|l| l.starts_with(char::is_whitespace));

    let mut out = if starts_indented {
        normalized
    } else {
        prefix_lines(&normalized, indent)
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
