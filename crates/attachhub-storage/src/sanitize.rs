//! File path sanitization.
//!
//! Human-supplied names such as `Copy of 100% of Paul's Time(1).txt` are
//! reduced to a filesystem- and URL-safe path. The function is pure, so the
//! same input always yields the same output, and sanitizing an already
//! sanitized path returns it unchanged.

/// Name used when nothing of the input survives sanitization.
pub const FALLBACK_FILE_PATH: &str = "untitled";

/// Sanitize a user-supplied file path.
///
/// - each run of whitespace becomes `_`
/// - `&`, `+`, `(` and `)` become `-`
/// - anything else outside letters, digits, `_`, `.`, `-` and `/` is dropped
/// - empty, `.` and `..` segments are removed, so the result never starts
///   with `/` and cannot climb out of its section
///
/// ```
/// use attachhub_storage::sanitize_file_path;
///
/// assert_eq!(sanitize_file_path("Draft #1.txt"), "Draft_1.txt");
/// assert_eq!(sanitize_file_path("Broken? Yes & No!.txt"), "Broken_Yes_-_No.txt");
/// ```
pub fn sanitize_file_path(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut in_whitespace = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                cleaned.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        match c {
            '&' | '+' | '(' | ')' => cleaned.push('-'),
            c if c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '/') => cleaned.push(c),
            _ => {}
        }
    }

    let segments: Vec<&str> = cleaned
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    if segments.is_empty() {
        FALLBACK_FILE_PATH.to_string()
    } else {
        segments.join("/")
    }
}

/// The path as shown on a content record: sanitized, with a leading `/`.
pub fn display_file_path(path: &str) -> String {
    format!("/{}", sanitize_file_path(path))
}
