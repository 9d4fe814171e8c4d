// POSIX shell-style word splitting for `args` strings

use crate::error::ScriptingError;

/// Split `input` into words the way a POSIX shell would, honoring single
/// quotes, double quotes and backslash escapes. No expansion happens here.
pub fn split_args(input: &str) -> Result<Vec<String>, ScriptingError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(ScriptingError::with_data("No closing quotation", input)),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.peek() {
                            Some(&next @ ('\\' | '"' | '$' | '`' | '\n')) => {
                                chars.next();
                                current.push(next);
                            }
                            _ => current.push('\\'),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(ScriptingError::with_data("No closing quotation", input)),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(next) => current.push(next),
                    None => return Err(ScriptingError::with_data("No escaped character", input)),
                }
            }
            _ => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
