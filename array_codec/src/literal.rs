//! Text array literal codec
//!
//! Reads and writes the `{elem1,elem2,...}` form PostgreSQL uses for array
//! input and output. Only one-dimensional arrays are accepted.
//!
//! ```text
//! literal  := ws [ bounds ws '=' ws ] '{' ws [ element ( delim element )* ] '}' ws
//! bounds   := '[' [ int ':' ] int ']'
//! element  := ws ( quoted | unquoted ) ws
//! quoted   := '"' ( '\' any | [^"\\] )* '"'
//! unquoted := ( '\' any | [^{}"\\ delim] )+        -- NULL (any case) is a null element
//! ```

use crate::element::ArrayElement;
use crate::errors::{CodecError, CodecResult};
use crate::options::{is_array_space, CodecOptions};

/// One element of a literal after unquoting and unescaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    /// Character index where the element starts
    pub position: usize,
    /// `None` for an unquoted `NULL`
    pub value: Option<String>,
}

struct LiteralParser<'a> {
    chars: Vec<char>,
    pos: usize,
    options: &'a CodecOptions,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &str, options: &'a CodecOptions) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            options,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if is_array_space(c)) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: impl Into<String>) -> CodecError {
        CodecError::malformed(self.pos, reason)
    }

    fn parse(mut self) -> CodecResult<Vec<RawElement>> {
        self.skip_whitespace();

        let expected_len = if self.peek() == Some('[') {
            let len = self.parse_bounds()?;
            self.skip_whitespace();
            if self.bump() != Some('=') {
                return Err(CodecError::malformed(
                    self.pos.saturating_sub(1),
                    "expected '=' after array bounds",
                ));
            }
            self.skip_whitespace();
            Some(len)
        } else {
            None
        };

        if self.peek() != Some('{') {
            return Err(self.error("array literal must start with '{'"));
        }
        self.pos += 1;

        let mut elements = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
        } else {
            loop {
                let element = self.parse_element()?;
                elements.push(element);
                if !self.options.allows_len(elements.len()) {
                    return Err(self.error(format!(
                        "array has more than {} elements",
                        self.options.max_elements
                    )));
                }

                match self.peek() {
                    Some('}') => {
                        self.pos += 1;
                        break;
                    }
                    Some(c) if c == self.options.delimiter => {
                        self.pos += 1;
                    }
                    Some(c) => {
                        return Err(self.error(format!(
                            "expected '{}' or '}}', found '{}'",
                            self.options.delimiter, c
                        )));
                    }
                    None => return Err(self.error("unterminated array literal, missing '}'")),
                }
            }
        }

        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(self.error("unexpected characters after closing '}'"));
        }

        if let Some(expected) = expected_len {
            if expected != elements.len() {
                return Err(CodecError::malformed(
                    0,
                    format!(
                        "array bounds declare {} elements but literal has {}",
                        expected,
                        elements.len()
                    ),
                ));
            }
        }

        Ok(elements)
    }

    /// Parses `[lo:hi]` or `[hi]` and returns the declared length
    fn parse_bounds(&mut self) -> CodecResult<usize> {
        self.pos += 1;
        let first = self.parse_bound()?;
        let (lower, upper) = if self.peek() == Some(':') {
            self.pos += 1;
            (first, self.parse_bound()?)
        } else {
            (1, first)
        };
        if self.bump() != Some(']') {
            return Err(CodecError::malformed(
                self.pos.saturating_sub(1),
                "expected ']' in array bounds",
            ));
        }
        if self.peek() == Some('[') {
            return Err(self.error("multi-dimensional arrays are not supported"));
        }
        if upper < lower - 1 {
            return Err(self.error(format!(
                "upper bound {} is less than lower bound {}",
                upper, lower
            )));
        }
        usize::try_from(upper - lower + 1).map_err(|_| self.error("array bounds out of range"))
    }

    fn parse_bound(&mut self) -> CodecResult<i64> {
        let start = self.pos;
        if self.peek() == Some('-') || self.peek() == Some('+') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<i32>()
            .map(i64::from)
            .map_err(|_| CodecError::malformed(start, format!("invalid array bound '{}'", text)))
    }

    fn parse_element(&mut self) -> CodecResult<RawElement> {
        self.skip_whitespace();
        let position = self.pos;
        let value = match self.peek() {
            None => return Err(self.error("unterminated array literal, missing '}'")),
            Some('{') => return Err(self.error("nested arrays are not supported")),
            Some('"') => Some(self.parse_quoted()?),
            Some(c) if c == '}' || c == self.options.delimiter => {
                return Err(self.error("missing array element"));
            }
            Some(_) => self.parse_unquoted()?,
        };
        self.skip_whitespace();
        Ok(RawElement { position, value })
    }

    fn parse_quoted(&mut self) -> CodecResult<String> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(CodecError::malformed(start, "unterminated quoted element"));
                }
                Some('\\') => match self.bump() {
                    Some(c) => value.push(c),
                    None => return Err(self.error("unexpected end of input after '\\'")),
                },
                Some('"') => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }

    fn parse_unquoted(&mut self) -> CodecResult<Option<String>> {
        let mut value = String::new();
        // Length up to the last escaped or non-whitespace character
        let mut significant = 0;
        let mut escaped = false;

        while let Some(c) = self.peek() {
            if c == '}' || c == self.options.delimiter {
                break;
            }
            match c {
                '\\' => {
                    self.pos += 1;
                    match self.bump() {
                        Some(next) => value.push(next),
                        None => return Err(self.error("unexpected end of input after '\\'")),
                    }
                    escaped = true;
                    significant = value.len();
                }
                '"' => return Err(self.error("unexpected '\"' in unquoted element")),
                '{' => return Err(self.error("nested arrays are not supported")),
                _ => {
                    self.pos += 1;
                    value.push(c);
                    if !is_array_space(c) {
                        significant = value.len();
                    }
                }
            }
        }

        value.truncate(significant);
        if !escaped && value.eq_ignore_ascii_case("NULL") {
            return Ok(None);
        }
        Ok(Some(value))
    }
}

/// Split a literal into unescaped elements without coercing them
pub fn split_literal(input: &str, options: &CodecOptions) -> CodecResult<Vec<RawElement>> {
    options.validate()?;
    LiteralParser::new(input, options).parse().inspect_err(|e| {
        tracing::debug!(error = %e, "rejected array literal");
    })
}

fn coerce<T: ArrayElement>(raw: RawElement) -> CodecResult<Option<T>> {
    match raw.value {
        None => Ok(None),
        Some(token) => T::parse_text(&token)
            .map(Some)
            .map_err(|reason| CodecError::malformed(raw.position, reason)),
    }
}

/// Parse a literal into elements of the declared type, keeping null elements
pub fn parse_literal<T: ArrayElement>(
    input: &str,
    options: &CodecOptions,
) -> CodecResult<Vec<Option<T>>> {
    split_literal(input, options)?.into_iter().map(coerce).collect()
}

/// Parse a literal whose elements may not be null
pub fn parse_literal_values<T: ArrayElement>(
    input: &str,
    options: &CodecOptions,
) -> CodecResult<Vec<T>> {
    split_literal(input, options)?
        .into_iter()
        .map(|raw| {
            let position = raw.position;
            coerce::<T>(raw)?.ok_or_else(|| {
                CodecError::malformed(
                    position,
                    format!(
                        "null element in array of non-nullable {}",
                        T::ELEMENT_TYPE.sql_name()
                    ),
                )
            })
        })
        .collect()
}

/// Decode a column value: SQL NULL stays `None`, `{}` becomes an empty vector
pub fn decode_literal<T: ArrayElement>(
    input: Option<&str>,
    options: &CodecOptions,
) -> CodecResult<Option<Vec<Option<T>>>> {
    input.map(|literal| parse_literal(literal, options)).transpose()
}

fn needs_quotes(text: &str, delimiter: char) -> bool {
    text.is_empty()
        || text.eq_ignore_ascii_case("NULL")
        || text.chars().any(|c| {
            c == delimiter || matches!(c, '{' | '}' | '"' | '\\') || is_array_space(c)
        })
}

/// Append one already-formatted element, quoting and escaping when required
pub fn write_element(out: &mut String, text: &str, delimiter: char) {
    if !needs_quotes(text, delimiter) {
        out.push_str(text);
        return;
    }
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Format a sequence of elements as a literal; `None` entries become `NULL`
pub fn format_elements<'a, T, I>(elements: I, options: &CodecOptions) -> String
where
    T: ArrayElement + 'a,
    I: IntoIterator<Item = Option<&'a T>>,
{
    let mut out = String::from("{");
    let mut scratch = String::new();
    for (i, element) in elements.into_iter().enumerate() {
        if i > 0 {
            out.push(options.delimiter);
        }
        match element {
            None => out.push_str("NULL"),
            Some(value) => {
                scratch.clear();
                value.write_text(&mut scratch);
                write_element(&mut out, &scratch, options.delimiter);
            }
        }
    }
    out.push('}');
    out
}

pub fn format_literal<T: ArrayElement>(values: &[Option<T>], options: &CodecOptions) -> String {
    format_elements(values.iter().map(Option::as_ref), options)
}

pub fn format_literal_values<T: ArrayElement>(values: &[T], options: &CodecOptions) -> String {
    format_elements(values.iter().map(Some), options)
}

/// Encode a column value: `None` is SQL NULL, an empty slice is `{}`
pub fn encode_literal<T: ArrayElement>(
    values: Option<&[Option<T>]>,
    options: &CodecOptions,
) -> Option<String> {
    values.map(|values| format_literal(values, options))
}
