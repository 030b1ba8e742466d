use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Unexpected token at position {0}: {1}")]
    UnexpectedToken(usize, String),
    #[error("Unterminated string starting at position {0}")]
    UnterminatedString(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SExp {
    Atom(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// First atom of a list, e.g. `pad` for `(pad "1" smd rect ...)`.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    /// Atom at position `index` of a list.
    pub fn atom(&self, index: usize) -> Option<&str> {
        self.as_list()?.get(index)?.as_atom()
    }

    /// Atom at position `index`, parsed as a number.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.atom(index)?.parse().ok()
    }

    /// First direct child list whose head is `key`.
    pub fn child(&self, key: &str) -> Option<&SExp> {
        self.as_list()?.iter().find(|item| item.head() == Some(key))
    }

    /// All direct child lists whose head is `key`.
    pub fn children<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a SExp> + 'a {
        self.as_list()
            .unwrap_or_default()
            .iter()
            .filter(move |item| item.head() == Some(key))
    }

    /// All lists with head `key` at any depth, in document order.
    pub fn descendants<'a>(&'a self, key: &str, out: &mut Vec<&'a SExp>) {
        if let Some(items) = self.as_list() {
            if self.head() == Some(key) {
                out.push(self);
            }
            for item in items {
                item.descendants(key, out);
            }
        }
    }
}

/// Recursive-descent reader for KiCad S-expression text.
pub struct SExpParser {
    input: Vec<char>,
    pos: usize,
}

impl SExpParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn parse(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();
        if self.is_eof() {
            return Err(ParseError::UnexpectedEof);
        }
        let sexp = self.parse_sexp()?;
        self.skip_whitespace();
        if !self.is_eof() {
            return Err(ParseError::UnexpectedToken(
                self.pos,
                self.peek().to_string(),
            ));
        }
        Ok(sexp)
    }

    fn parse_sexp(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            _ if self.is_eof() => Err(ParseError::UnexpectedEof),
            '(' => self.parse_list(),
            ')' => Err(ParseError::UnexpectedToken(self.pos, ")".to_string())),
            '"' => self.parse_string(),
            _ => self.parse_symbol(),
        }
    }

    fn parse_list(&mut self) -> Result<SExp, ParseError> {
        self.advance();
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof);
            }
            if self.peek() == ')' {
                self.advance();
                break;
            }
            items.push(self.parse_sexp()?);
        }

        Ok(SExp::List(items))
    }

    fn parse_string(&mut self) -> Result<SExp, ParseError> {
        let start = self.pos;
        self.advance();
        let mut s = String::new();
        let mut escaped = false;

        while !self.is_eof() {
            let ch = self.peek();
            self.advance();
            if escaped {
                match ch {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    _ => s.push(ch),
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                return Ok(SExp::Atom(s));
            } else {
                s.push(ch);
            }
        }

        Err(ParseError::UnterminatedString(start))
    }

    fn parse_symbol(&mut self) -> Result<SExp, ParseError> {
        let mut s = String::new();
        while !self.is_eof() {
            let ch = self.peek();
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            s.push(ch);
            self.advance();
        }
        Ok(SExp::Atom(s))
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn peek(&self) -> char {
        self.input.get(self.pos).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}

pub fn parse(input: &str) -> Result<SExp, ParseError> {
    SExpParser::new(input).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_lists_and_strings() {
        let sexp = parse(r#"(pad "1" smd rect (at 1.5 -2) (name "a \"b\" (c)"))"#).unwrap();
        assert_eq!(sexp.head(), Some("pad"));
        assert_eq!(sexp.atom(1), Some("1"));
        let at = sexp.child("at").unwrap();
        assert_eq!(at.number(1), Some(1.5));
        assert_eq!(at.number(2), Some(-2.0));
        assert_eq!(sexp.child("name").unwrap().atom(1), Some("a \"b\" (c)"));
    }

    #[test]
    fn test_empty_quoted_atom() {
        let sexp = parse(r#"(pad "" np_thru_hole circle)"#).unwrap();
        assert_eq!(sexp.atom(1), Some(""));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("(a (b)"), Err(ParseError::UnexpectedEof));
        assert_eq!(parse(r#"(a "b)"#), Err(ParseError::UnterminatedString(3)));
        assert!(parse("(a) b").is_err());
        assert_eq!(parse("   "), Err(ParseError::UnexpectedEof));
    }
}
