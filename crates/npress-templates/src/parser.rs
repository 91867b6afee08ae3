use thiserror::Error;

use crate::ast::Node;
use crate::tokens::Token;
use crate::tokens::TokenKind;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated tag at byte {position}")]
    UnterminatedTag { position: usize },

    #[error("unclosed block '{name}' opened at byte {position}")]
    UnclosedBlock { name: String, position: usize },

    #[error("stray closing tag for '{name}' at byte {position}")]
    StrayClose { name: String, position: usize },

    #[error("'else' outside a block at byte {position}")]
    StrayElse { position: usize },

    #[error("empty tag at byte {position}")]
    EmptyTag { position: usize },
}

/// How a nested parse stopped.
enum BlockEnd {
    Close,
    Else,
    Eof,
}

/// Recursive-descent parser from the token stream into the construct AST.
///
/// Parsing never aborts: malformed constructs are recorded as [`ParseError`]s
/// and degrade (to literal text for unterminated tags, to nothing otherwise)
/// so a render can always proceed with the rest of the template.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    #[must_use]
    pub fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> (Vec<Node>, Vec<ParseError>) {
        let (nodes, _, _) = self.parse_nodes(None);
        (nodes, self.errors)
    }

    /// Parse until EOF or, inside a block, until the matching close tag or an
    /// `else` divider. Returns the nodes, how parsing stopped, and the byte
    /// range of the terminating tag (used to slice raw block body text).
    fn parse_nodes(&mut self, enclosing: Option<&str>) -> (Vec<Node>, BlockEnd, (usize, usize)) {
        let mut nodes = Vec::new();

        loop {
            let token = self.tokens[self.current].clone();

            match token.kind {
                TokenKind::Eof => {
                    return (nodes, BlockEnd::Eof, (token.start, token.start));
                }
                TokenKind::Text(text) => {
                    self.current += 1;
                    nodes.push(Node::Text(text));
                }
                TokenKind::Error(raw) => {
                    self.current += 1;
                    self.errors.push(ParseError::UnterminatedTag {
                        position: token.start,
                    });
                    nodes.push(Node::Text(raw));
                }
                TokenKind::Expr { ref content, raw } => {
                    if let Some(closed) = content.strip_prefix('/') {
                        let closed = closed.trim();
                        self.current += 1;
                        if enclosing == Some(closed) {
                            return (nodes, BlockEnd::Close, (token.start, token.end));
                        }
                        self.errors.push(ParseError::StrayClose {
                            name: closed.to_string(),
                            position: token.start,
                        });
                    } else if content.as_str() == "else" {
                        self.current += 1;
                        if enclosing.is_some() {
                            return (nodes, BlockEnd::Else, (token.start, token.end));
                        }
                        self.errors.push(ParseError::StrayElse {
                            position: token.start,
                        });
                    } else {
                        self.current += 1;
                        if let Some(node) = self.parse_expr(content, raw, &token) {
                            nodes.push(node);
                        }
                    }
                }
            }
        }
    }

    fn parse_expr(&mut self, content: &str, raw: bool, token: &Token) -> Option<Node> {
        if content.is_empty() {
            self.errors.push(ParseError::EmptyTag {
                position: token.start,
            });
            return None;
        }

        if let Some(block) = content.strip_prefix('#') {
            let block = block.trim();
            let (name, arg) = match block.split_once(char::is_whitespace) {
                Some((name, arg)) => (name, arg.trim()),
                None => (block, ""),
            };
            if name.is_empty() {
                self.errors.push(ParseError::EmptyTag {
                    position: token.start,
                });
                return None;
            }
            return Some(self.parse_block(name, arg, token));
        }

        if let Some(partial) = content.strip_prefix('>') {
            let name = partial.trim();
            if name.is_empty() {
                self.errors.push(ParseError::EmptyTag {
                    position: token.start,
                });
                return None;
            }
            return Some(Node::Partial {
                name: name.to_string(),
            });
        }

        // {{! ... }} comments expand to nothing.
        if content.starts_with('!') {
            return None;
        }

        let mut pieces = split_args(content);
        if pieces.len() <= 1 {
            return Some(Node::Variable {
                path: content.to_string(),
                raw,
            });
        }
        let name = pieces.remove(0);
        Some(Node::HelperCall {
            name,
            args: pieces,
            raw,
        })
    }

    fn parse_block(&mut self, name: &str, arg: &str, open: &Token) -> Node {
        let body_start = open.end;
        let (body, end, (term_start, term_end)) = self.parse_nodes(Some(name));
        let body_text = self.source[body_start..term_start].to_string();

        let (else_body, else_text) = match end {
            BlockEnd::Close => (Vec::new(), String::new()),
            BlockEnd::Else => {
                let (else_nodes, after_else, (close_start, _)) = self.parse_nodes(Some(name));
                if matches!(after_else, BlockEnd::Eof) {
                    self.errors.push(ParseError::UnclosedBlock {
                        name: name.to_string(),
                        position: open.start,
                    });
                }
                let text = self.source[term_end..close_start].to_string();
                (else_nodes, text)
            }
            BlockEnd::Eof => {
                self.errors.push(ParseError::UnclosedBlock {
                    name: name.to_string(),
                    position: open.start,
                });
                (Vec::new(), String::new())
            }
        };

        match name {
            "if" => Node::Conditional {
                cond: arg.to_string(),
                body,
                else_body,
            },
            "unless" => Node::Negation {
                cond: arg.to_string(),
                body,
                else_body,
            },
            "with" => Node::Scoped {
                path: arg.to_string(),
                body,
            },
            "each" => Node::Iteration {
                path: arg.to_string(),
                body,
            },
            _ => Node::HelperBlock {
                name: name.to_string(),
                args: split_args(arg),
                body_text,
                else_text,
            },
        }
    }
}

/// Split tag content on whitespace, respecting quoted arguments so
/// `greet "dear reader" name` yields three pieces.
pub(crate) fn split_args(content: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = None;
    let mut quote: Option<char> = None;
    let mut escape = false;
    for (idx, ch) in content.char_indices() {
        if start.is_none() && !ch.is_whitespace() {
            start = Some(idx);
        }
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if quote.is_some() => escape = true,
            '"' | '\'' if quote == Some(ch) => quote = None,
            '"' | '\'' if quote.is_none() => quote = Some(ch),
            c if quote.is_none() && c.is_whitespace() => {
                if let Some(s) = start.take() {
                    pieces.push(content[s..idx].to_owned());
                }
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        pieces.push(content[s..].to_owned());
    }
    pieces
}
