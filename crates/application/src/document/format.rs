//! Printing of executable documents.
//!
//! `pretty_print` renders the `graphql-parser` AST. `minify` validates the
//! document, then re-emits its tokens without comments, commas or layout.

use super::operations::parse;
use super::{DocumentError, DocumentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Punct(&'a str),
    Name(&'a str),
    Number(&'a str),
    Str(&'a str),
}

impl<'a> Token<'a> {
    const fn text(self) -> &'a str {
        match self {
            Self::Punct(s) | Self::Name(s) | Self::Number(s) | Self::Str(s) => s,
        }
    }

    const fn is_word(self) -> bool {
        matches!(self, Self::Name(_) | Self::Number(_))
    }
}

fn tokenize(source: &str) -> DocumentResult<Vec<Token<'_>>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\n' | b'\r' | b',' => i += 1,
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
            }
            b'"' => {
                let end = string_end(bytes, i)?;
                tokens.push(Token::Str(&source[i..end]));
                i = end;
            }
            b'.' => {
                if !source[i..].starts_with("...") {
                    return Err(unexpected(source, i));
                }
                tokens.push(Token::Punct("..."));
                i += 3;
            }
            b'!' | b'$' | b'&' | b'(' | b')' | b':' | b'=' | b'@' | b'[' | b']' | b'{' | b'|'
            | b'}' => {
                tokens.push(Token::Punct(&source[i..=i]));
                i += 1;
            }
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => {
                let start = i;
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                tokens.push(Token::Name(&source[start..i]));
            }
            b'-' | b'0'..=b'9' => {
                let start = i;
                i += 1;
                while i < bytes.len() && matches!(bytes[i], b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-') {
                    i += 1;
                }
                tokens.push(Token::Number(&source[start..i]));
            }
            // Byte order mark
            0xEF if source[i..].starts_with('\u{feff}') => i += '\u{feff}'.len_utf8(),
            _ => return Err(unexpected(source, i)),
        }
    }

    Ok(tokens)
}

/// Returns the byte offset just past the string starting at `start`.
fn string_end(bytes: &[u8], start: usize) -> DocumentResult<usize> {
    let unterminated = || DocumentError::Syntax("Unterminated string".to_string());

    if bytes[start..].starts_with(b"\"\"\"") {
        let mut i = start + 3;
        while i < bytes.len() {
            if bytes[i..].starts_with(b"\\\"\"\"") {
                i += 4;
            } else if bytes[i..].starts_with(b"\"\"\"") {
                return Ok(i + 3);
            } else {
                i += 1;
            }
        }
        return Err(unterminated());
    }

    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Ok(i + 1),
            b'\n' | b'\r' => return Err(unterminated()),
            _ => i += 1,
        }
    }
    Err(unterminated())
}

fn unexpected(source: &str, offset: usize) -> DocumentError {
    let ch = source[offset..].chars().next().unwrap_or_default();
    DocumentError::Syntax(format!("Unexpected character {ch:?} at offset {offset}"))
}

/// Collapses a document to a single line.
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] if the document does not parse.
///
/// # Examples
///
/// ```
/// use graphit_application::document::minify;
///
/// let min = minify("query Q($id: ID!) {\n  user(id: $id) { ...F } # me\n}").unwrap();
/// assert_eq!(min, "query Q($id:ID!){user(id:$id){...F}}");
/// ```
pub fn minify(document: &str) -> DocumentResult<String> {
    parse(document)?;

    let mut out = String::with_capacity(document.len());
    let mut prev: Option<Token<'_>> = None;
    for token in tokenize(document)? {
        if prev.is_some_and(|p| needs_space(p, token)) {
            out.push(' ');
        }
        out.push_str(token.text());
        prev = Some(token);
    }
    Ok(out)
}

/// Re-indents a document with two spaces per selection level.
///
/// Comments are dropped and object values are printed with sorted keys.
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] if the document does not parse.
pub fn pretty_print(document: &str) -> DocumentResult<String> {
    let parsed = graphql_parser::parse_query::<&str>(document)
        .map_err(|e| DocumentError::Syntax(e.to_string()))?;
    Ok(parsed.to_string().trim_end().to_string())
}

/// Adjacent words would merge and adjacent strings could read as a block quote.
fn needs_space(prev: Token<'_>, token: Token<'_>) -> bool {
    (prev.is_word() && token.is_word())
        || (matches!(prev, Token::Str(_)) && matches!(token, Token::Str(_)))
}
