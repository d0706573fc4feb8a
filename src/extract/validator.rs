//! Parameter name validation
//!
//! Script-text patterns are naive, so most false positives are language
//! keywords or fragments of punctuation. This predicate filters them out.

/// Characters that never appear in a reported parameter name
const INVALID_CHARS: &[char] = &[
    '<', '>', '{', '}', '(', ')', '\\', '"', '\'', ';', '$', '#', '/',
];

/// Scripting-language reserved words and literals
const RESERVED_WORDS: &[&str] = &[
    "function", "var", "let", "const", "if", "else", "for", "while", "return", "break", "case",
    "catch", "class", "continue", "debugger", "default", "delete", "do", "export", "extends",
    "finally", "import", "in", "instanceof", "new", "super", "switch", "this", "throw", "try",
    "typeof", "void", "with", "yield", "null", "true", "false", "undefined",
];

/// Decides whether an extracted token is a plausible parameter name
///
/// A valid name is at least two characters long, consists only of
/// `[A-Za-z0-9_]`, and is not a reserved word.
///
/// # Examples
///
/// ```
/// use paraxm::is_valid_parameter;
///
/// assert!(is_valid_parameter("user_id"));
/// assert!(!is_valid_parameter("q"));
/// assert!(!is_valid_parameter("function"));
/// assert!(!is_valid_parameter("a-b"));
/// ```
pub fn is_valid_parameter(name: &str) -> bool {
    if name.len() < 2 {
        return false;
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }

    if name.contains(INVALID_CHARS) {
        return false;
    }

    !RESERVED_WORDS.contains(&name)
}
