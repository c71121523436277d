//! Pattern engine: one compiled regex plus replacement template per run
//!
//! A [`Pattern`] is compiled once, before any object is fetched, and shared
//! across every object and field processed in that run. Substitution is a
//! pure operation: it never mutates its input or any external state.

use regex::{Captures, Regex};

use crate::error::PatternError;

/// A compiled search pattern and its replacement template.
///
/// The replacement template uses the `regex` crate's expansion syntax:
/// `$1`/`${1}` for numbered groups, `$name`/`${name}` for named groups, and
/// `$$` for a literal dollar sign. References to groups the pattern does not
/// define are rejected at compile time rather than silently expanding to
/// nothing.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    replacement: String,
}

/// Outcome of substituting one text value: the rewritten text and how many
/// replacements were performed. A count of zero means `text` is identical
/// to the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub count: usize,
}

impl Pattern {
    /// Compile a regex and replacement template pair.
    ///
    /// # Example
    /// ```
    /// use coursesed::Pattern;
    ///
    /// let pattern = Pattern::compile(r"(\w+)@old\.edu", "$1@new.edu").unwrap();
    /// let result = pattern.substitute("mail alice@old.edu or bob@old.edu");
    /// assert_eq!(result.text, "mail alice@new.edu or bob@new.edu");
    /// assert_eq!(result.count, 2);
    /// ```
    pub fn compile(pattern: &str, replacement: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern)?;
        validate_template(&regex, replacement)?;
        Ok(Self {
            regex,
            replacement: replacement.to_string(),
        })
    }

    /// Replace every non-overlapping match of the pattern in `text`.
    ///
    /// All matches are replaced in a single pass; replacement output is never
    /// re-scanned, so substitution cannot recurse even when the replacement
    /// text would itself match the pattern.
    pub fn substitute(&self, text: &str) -> Substitution {
        let mut count = 0;
        let new_text = self.regex.replace_all(text, |caps: &Captures<'_>| {
            count += 1;
            let mut expanded = String::new();
            caps.expand(&self.replacement, &mut expanded);
            expanded
        });
        Substitution {
            text: new_text.into_owned(),
            count,
        }
    }

    /// The source text of the compiled regex, for reporting.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Check every group reference in the template against the pattern's actual
/// capture groups, mirroring the expansion rules `Captures::expand` applies:
/// after a `$`, the longest run of `[0-9A-Za-z_]` names the group, and a
/// name that parses as an integer is an index reference.
fn validate_template(regex: &Regex, template: &str) -> Result<(), PatternError> {
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            // `$$` is a literal dollar sign
            Some(b'$') => i += 2,
            Some(b'{') => {
                let rest = &template[i + 2..];
                let end = rest.find('}').ok_or(PatternError::UnclosedGroup)?;
                let name = &rest[..end];
                if name.is_empty() {
                    return Err(PatternError::EmptyGroup);
                }
                check_group(regex, name)?;
                i += 2 + end + 1;
            }
            _ => {
                let rest = &template[i + 1..];
                let name_len = rest
                    .bytes()
                    .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    .count();
                if name_len == 0 {
                    // A `$` followed by nothing referenceable expands literally
                    i += 1;
                    continue;
                }
                check_group(regex, &rest[..name_len])?;
                i += 1 + name_len;
            }
        }
    }
    Ok(())
}

fn check_group(regex: &Regex, name: &str) -> Result<(), PatternError> {
    let known = match name.parse::<usize>() {
        // captures_len counts group 0 (the whole match)
        Ok(index) => index < regex.captures_len(),
        Err(_) => regex.capture_names().flatten().any(|n| n == name),
    };
    if known {
        Ok(())
    } else {
        Err(PatternError::UnknownGroup(name.to_string()))
    }
}
