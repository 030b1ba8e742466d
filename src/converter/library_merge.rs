//! Text-level updates of multi-symbol `.kicad_sym` libraries.
//!
//! The library is never re-serialized: symbols other than the one being
//! touched keep their bytes exactly.

use crate::error::{Error, Result};
use crate::kicad_models::symbol_lib_header;
use log::warn;
use regex::Regex;
use std::ops::Range;

/// A library with no symbols.
pub fn empty_library() -> String {
    format!("{})\n", symbol_lib_header())
}

fn symbol_pattern(name: &str) -> Result<Regex> {
    Regex::new(&format!(r#"\(symbol\s+"{}""#, regex::escape(name)))
        .map_err(|e| Error::InvalidLibrary(e.to_string()))
}

pub fn symbol_exists_in_library(library: &str, name: &str) -> bool {
    symbol_pattern(name).is_ok_and(|re| re.is_match(library))
}

fn library_body(library: &str) -> Result<&str> {
    library
        .trim_end()
        .strip_suffix(')')
        .map(str::trim_end)
        .ok_or_else(|| Error::InvalidLibrary("missing closing parenthesis".to_string()))
}

/// Inserts `entry` as the last symbol of the library.
pub fn append_to_library(library: &str, entry: &str) -> Result<String> {
    let body = library_body(library)?;
    Ok(format!("{}\n\t{}\n)\n", body, entry.trim()))
}

/// Byte range of the named symbol block, from its `(` to its matching `)`.
fn find_symbol_span(library: &str, name: &str) -> Result<Option<Range<usize>>> {
    let Some(found) = symbol_pattern(name)?.find(library) else {
        return Ok(None);
    };
    let start = found.start();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in library[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(start..start + offset + 1));
                }
            }
            _ => {}
        }
    }
    Err(Error::InvalidLibrary(format!(
        "symbol \"{}\" is never closed",
        name
    )))
}

fn ensure_trailing_newline(mut text: String) -> String {
    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    text.push('\n');
    text
}

/// Replaces the named symbol in place, or appends it when it is absent.
pub fn replace_in_library(library: &str, name: &str, entry: &str) -> Result<String> {
    library_body(library)?;
    match find_symbol_span(library, name)? {
        Some(span) => Ok(ensure_trailing_newline(format!(
            "{}{}{}",
            &library[..span.start],
            entry.trim(),
            &library[span.end..]
        ))),
        None => {
            warn!("Symbol '{}' not found in library, appending instead", name);
            append_to_library(library, entry)
        }
    }
}

/// Removes the named symbol together with its line. Returns the library
/// unchanged when the symbol is absent.
pub fn remove_from_library(library: &str, name: &str) -> Result<String> {
    library_body(library)?;
    let Some(span) = find_symbol_span(library, name)? else {
        return Ok(library.to_string());
    };
    let line_start = library[..span.start]
        .rfind('\n')
        .map(|i| i + 1)
        .filter(|&i| library[i..span.start].trim().is_empty())
        .unwrap_or(span.start);
    let line_end = if library[span.end..].starts_with('\n') {
        span.end + 1
    } else {
        span.end
    };
    Ok(ensure_trailing_newline(format!(
        "{}{}",
        &library[..line_start],
        &library[line_end..]
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY_A: &str = "\t(symbol \"A\"\n\t\t(property \"Value\" \"a (1)\")\n\t)";
    const ENTRY_B: &str = "\t(symbol \"B\"\n\t\t(property \"Value\" \"b\")\n\t)";

    #[test]
    fn test_append_then_exists() {
        let lib = append_to_library(&empty_library(), ENTRY_A).unwrap();
        assert!(symbol_exists_in_library(&lib, "A"));
        assert!(!symbol_exists_in_library(&lib, "B"));
        assert!(lib.ends_with("\t)\n)\n"));
    }

    #[test]
    fn test_exists_does_not_match_units() {
        let lib = append_to_library(&empty_library(), "(symbol \"AB_0_1\")").unwrap();
        assert!(!symbol_exists_in_library(&lib, "AB"));
    }

    #[test]
    fn test_missing_closing_paren_is_invalid() {
        assert!(matches!(
            append_to_library("(kicad_symbol_lib", ENTRY_A),
            Err(Error::InvalidLibrary(_))
        ));
        assert!(replace_in_library("", "A", ENTRY_A).is_err());
    }

    #[test]
    fn test_replace_keeps_neighbours() {
        let lib = append_to_library(&empty_library(), ENTRY_A).unwrap();
        let lib = append_to_library(&lib, ENTRY_B).unwrap();
        let updated = "\t(symbol \"A\"\n\t\t(property \"Value\" \"a2 \\\")\")\n\t)";
        let lib = replace_in_library(&lib, "A", updated).unwrap();
        let lib = replace_in_library(&lib, "A", updated).unwrap();
        assert_eq!(lib.matches("(symbol \"A\"").count(), 1);
        assert!(lib.contains("a2"));
        assert!(!lib.contains("a (1)"));
        assert!(lib.contains(ENTRY_B));
    }

    #[test]
    fn test_replace_missing_appends() {
        let lib = replace_in_library(&empty_library(), "A", ENTRY_A).unwrap();
        assert!(symbol_exists_in_library(&lib, "A"));
    }

    #[test]
    fn test_remove() {
        let lib = append_to_library(&empty_library(), ENTRY_A).unwrap();
        let lib = append_to_library(&lib, ENTRY_B).unwrap();
        let lib = remove_from_library(&lib, "A").unwrap();
        assert!(!symbol_exists_in_library(&lib, "A"));
        assert!(symbol_exists_in_library(&lib, "B"));
        assert_eq!(lib, append_to_library(&empty_library(), ENTRY_B).unwrap());
    }
}
