/// A lexed region of template source.
///
/// `start`/`end` are byte offsets into the source, covering the whole token
/// including its delimiters. The parser slices the source between tag tokens
/// to recover raw block body text for block-style helpers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text between tags.
    Text(String),
    /// A `{{ ... }}` or `{{{ ... }}}` tag; `content` is trimmed, `raw` marks
    /// the triple-delimiter form whose output skips HTML escaping.
    Expr { content: String, raw: bool },
    /// An unterminated tag; carries the raw slice so rendering can leave it
    /// in place as literal text.
    Error(String),
    Eof,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}
