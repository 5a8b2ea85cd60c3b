//! Character-level scanning shared by the directive and term parsers.

use crate::error::WarningKind;

/// A recoverable parse failure for the current logical line. The driver
/// attaches the line number and original text when recording it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub kind: WarningKind,
    pub message: String,
}

impl ParseIssue {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(WarningKind::BelSyntax, message)
    }
}

/// Single-lookahead cursor over one logical line.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consume `expected` if it is next (after whitespace).
    pub fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, expected: char) -> Result<(), ParseIssue> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(ParseIssue::syntax(format!(
                "expected '{expected}' near \"{}\"",
                self.excerpt()
            )))
        }
    }

    /// A word made of identifier characters: letters, digits, `_`, `.`, `-`.
    /// Colons are excluded so `ns:name` splits unambiguously.
    pub fn word(&mut self) -> &'a str {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            self.bump();
        }
        &self.text[start..self.pos]
    }

    /// A relation token: either a keyword (`increases`) or a symbol run
    /// (`->`, `=|`). Symbols stop before letters so `->p(...)` splits.
    pub fn relation_token(&mut self) -> &'a str {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some(first) if first.is_ascii_alphabetic() => {
                while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
                    self.bump();
                }
            }
            Some(_) => {
                while self.peek().is_some_and(|c| {
                    !c.is_whitespace() && c != '(' && c != ')' && !c.is_ascii_alphanumeric()
                }) {
                    self.bump();
                }
            }
            None => {}
        }
        &self.text[start..self.pos]
    }

    /// A double-quoted string with backslash escapes, unescaped.
    pub fn quoted_string(&mut self) -> Result<String, ParseIssue> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => return Err(ParseIssue::syntax("unterminated string escape")),
                },
                Some(c) => out.push(c),
                None => return Err(ParseIssue::syntax("unterminated string")),
            }
        }
    }

    /// A quoted string or a bare word.
    pub fn string_or_word(&mut self) -> Result<String, ParseIssue> {
        self.skip_ws();
        if self.peek() == Some('"') {
            return self.quoted_string();
        }
        let word = self.word();
        if word.is_empty() {
            return Err(ParseIssue::syntax(format!(
                "expected a name near \"{}\"",
                self.excerpt()
            )));
        }
        Ok(word.to_string())
    }

    /// A signed integer.
    pub fn integer(&mut self) -> Result<i64, ParseIssue> {
        self.skip_ws();
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        self.text[start..self.pos]
            .parse::<i64>()
            .map_err(|_| ParseIssue::syntax(format!("expected an integer near \"{}\"", self.excerpt())))
    }

    /// A `{...}` list of quoted strings or bare words.
    pub fn braced_list(&mut self) -> Result<Vec<String>, ParseIssue> {
        self.expect('{')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(items);
            }
            items.push(self.string_or_word()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => {
                    return Err(ParseIssue::syntax(format!(
                        "expected ',' or '}}' near \"{}\"",
                        self.excerpt()
                    )));
                }
            }
        }
    }

    /// Up to 24 characters of the remaining input, for error messages.
    pub fn excerpt(&self) -> &'a str {
        let rest = self.rest();
        match rest.char_indices().nth(24) {
            Some((idx, _)) => &rest[..idx],
            None => rest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_stop_at_colons_and_parens() {
        let mut cursor = Cursor::new("HGNC:AKT1)");
        assert_eq!(cursor.word(), "HGNC");
        assert!(cursor.eat(':'));
        assert_eq!(cursor.word(), "AKT1");
        assert_eq!(cursor.peek(), Some(')'));
    }

    #[test]
    fn quoted_strings_unescape() {
        let mut cursor = Cursor::new(r#""a \"b\" \\ c""#);
        assert_eq!(cursor.quoted_string().expect("string"), r#"a "b" \ c"#);
    }

    #[test]
    fn unterminated_strings_are_syntax_issues() {
        let mut cursor = Cursor::new("\"oops");
        let issue = cursor.quoted_string().expect_err("must fail");
        assert_eq!(issue.kind, WarningKind::BelSyntax);
    }

    #[test]
    fn braced_lists_accept_quoted_and_bare_items() {
        let mut cursor = Cursor::new(r#"{"PubMed", Title, "12345"}"#);
        assert_eq!(
            cursor.braced_list().expect("list"),
            vec!["PubMed".to_string(), "Title".to_string(), "12345".to_string()]
        );
    }

    #[test]
    fn integers_accept_a_sign() {
        let mut cursor = Cursor::new("-12");
        assert_eq!(cursor.integer().expect("integer"), -12);
    }

    #[test]
    fn relation_tokens_split_symbols_from_terms() {
        let mut cursor = Cursor::new("->p(HGNC:A)");
        assert_eq!(cursor.relation_token(), "->");
        assert_eq!(cursor.peek(), Some('p'));

        let mut cursor = Cursor::new("increases p(HGNC:A)");
        assert_eq!(cursor.relation_token(), "increases");
    }
}
