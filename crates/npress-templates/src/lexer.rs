use crate::tokens::Token;
use crate::tokens::TokenKind;

const RAW_TAG_START: &str = "{{{";
const RAW_TAG_END: &str = "}}}";
const TAG_START: &str = "{{";
const TAG_END: &str = "}}";

/// Cursor-based scanner splitting template source into text and tag tokens.
pub struct Lexer<'src> {
    source: &'src str,
    start: usize,
    current: usize,
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            start: 0,
            current: 0,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.start = self.current;

            let token = if self.rest().starts_with(RAW_TAG_START) {
                self.lex_tag(RAW_TAG_START.len(), RAW_TAG_END, true)
            } else if self.rest().starts_with(TAG_START) {
                self.lex_tag(TAG_START.len(), TAG_END, false)
            } else {
                self.lex_text()
            };

            tokens.push(token);
        }

        tokens.push(Token::new(TokenKind::Eof, self.current, self.current));
        tokens
    }

    fn lex_tag(&mut self, delimiter_len: usize, end: &str, raw: bool) -> Token {
        self.consume_n(delimiter_len);

        match self.consume_until(end) {
            Ok(text) => {
                self.consume_n(end.len());
                Token::new(
                    TokenKind::Expr {
                        content: text.trim().to_string(),
                        raw,
                    },
                    self.start,
                    self.current,
                )
            }
            // No closing delimiter before EOF: keep the raw slice so the
            // construct degrades to literal text instead of vanishing.
            Err(()) => Token::new(
                TokenKind::Error(self.source[self.start..self.current].to_string()),
                self.start,
                self.current,
            ),
        }
    }

    fn lex_text(&mut self) -> Token {
        while !self.is_at_end() && !self.rest().starts_with(TAG_START) {
            self.consume();
        }

        Token::new(
            TokenKind::Text(self.source[self.start..self.current].to_string()),
            self.start,
            self.current,
        )
    }

    #[inline]
    fn rest(&self) -> &str {
        &self.source[self.current..]
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    #[inline]
    fn consume(&mut self) {
        if let Some(ch) = self.rest().chars().next() {
            self.current += ch.len_utf8();
        }
    }

    fn consume_n(&mut self, count: usize) {
        for _ in 0..count {
            self.consume();
        }
    }

    fn consume_until(&mut self, delimiter: &str) -> Result<&'src str, ()> {
        let offset = self.current;

        while !self.is_at_end() {
            if self.rest().starts_with(delimiter) {
                return Ok(&self.source[offset..self.current]);
            }
            self.consume();
        }

        Err(())
    }
}
