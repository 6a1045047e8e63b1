//! crates/syllabus_core/src/sanitize.rs
//!
//! Converts unreliable model text into parseable JSON. The model is asked for
//! JSON only, but real responses arrive wrapped in code fences, prefixed with
//! prose, or truncated mid-structure. Sanitizing maximizes salvage without
//! touching a response that is already valid: the truncation repair is only
//! invoked after an initial parse attempt fails.

/// Errors raised while isolating or repairing the JSON payload.
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("model response contained no JSON object")]
    NoJsonFound,
    #[error("model response was truncated beyond repair: {0}")]
    UnrecoverableTruncation(String),
}

/// Isolates the JSON payload from a raw model response.
///
/// Strips a leading code-fence marker (with or without a language tag) and a
/// trailing one, then slices from the first `{` to the last `}` to discard
/// any prose the model added despite instructions. Idempotent on valid
/// minified JSON.
pub fn sanitize(raw: &str) -> Result<String, SanitizeError> {
    let stripped = strip_wrapping(raw)?;
    let end = stripped.rfind('}').ok_or(SanitizeError::NoJsonFound)?;
    Ok(stripped[..=end].to_string())
}

/// Strips fences and leading prose, yielding the text from the first `{`
/// through the end of the response. Used by `sanitize` and, separately, as
/// the input to `repair_truncation` so a truncated tail (which `sanitize`
/// would cut at the last `}`) is preserved for repair.
pub fn strip_wrapping(raw: &str) -> Result<&str, SanitizeError> {
    let text = strip_code_fences(raw.trim());
    let start = text.find('{').ok_or(SanitizeError::NoJsonFound)?;
    Ok(text[start..].trim_end())
}

fn strip_code_fences(text: &str) -> &str {
    let mut text = text;
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the optional language tag (e.g. ```json) with its line.
        text = match rest.find('\n') {
            Some(i) => &rest[i + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    let text = text.trim_end();
    text.strip_suffix("```").map(str::trim_end).unwrap_or(text)
}

/// Best-effort repair of a response truncated mid-array or mid-object.
///
/// Scans the text tracking string/escape state and the stack of open
/// brackets, then appends the missing closers in reverse-open order. This
/// recovers well-formed prefixes cut off at any nesting depth; it does not
/// fix interior syntax errors (trailing commas, unescaped quotes). Text that
/// ends inside a string literal, or whose closers do not match its openers,
/// is unrecoverable.
pub fn repair_truncation(candidate: &str) -> Result<String, SanitizeError> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in candidate.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => stack.push(ch),
            '}' | ']' => {
                let expected = if ch == '}' { '{' } else { '[' };
                if stack.pop() != Some(expected) {
                    return Err(SanitizeError::UnrecoverableTruncation(format!(
                        "unbalanced '{ch}'"
                    )));
                }
            }
            _ => {}
        }
    }

    if in_string {
        return Err(SanitizeError::UnrecoverableTruncation(
            "response ends inside a string literal".to_string(),
        ));
    }

    let mut repaired = candidate.trim_end().to_string();
    // A truncation can also end on a dangling comma; drop it before closing.
    if repaired.ends_with(',') {
        repaired.pop();
    }
    while let Some(open) = stack.pop() {
        repaired.push(if open == '{' { '}' } else { ']' });
    }
    Ok(repaired)
}
