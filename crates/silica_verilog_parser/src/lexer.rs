//! Lexical analyzer for the Verilog subset.
//!
//! Byte-walking scanner producing a token vector terminated by
//! [`TokenKind::Eof`]. Line and block comments are skipped. Sized literals
//! (`4'b0101`) are lexed as a single token and parsed immediately; a
//! malformed literal aborts the lex.

use crate::parser::{position, ParseError};
use crate::token::{lookup_keyword, Token, TokenKind};
use silica_common::parse_verilog_literal;

/// Lexes source text into tokens.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        pos: 0,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            if self.pos >= self.bytes.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    start: self.pos,
                    end: self.pos,
                });
                return Ok(tokens);
            }
            tokens.push(self.next_token()?);
        }
    }

    fn peek(&self) -> u8 {
        if self.pos < self.bytes.len() {
            self.bytes[self.pos]
        } else {
            0
        }
    }

    fn peek_at(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.bytes.len() {
            self.bytes[idx]
        } else {
            0
        }
    }

    fn error(&self, start: usize, message: impl Into<String>) -> ParseError {
        let (line, col) = position(self.source, start);
        ParseError {
            message: message.into(),
            line,
            col,
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.bytes.len() {
                        return Err(self.error(start, "unterminated block comment"));
                    }
                    if self.bytes[self.pos] == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            return Ok(());
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        let b = self.peek();

        if is_ident_start(b) {
            return Ok(self.lex_identifier_or_keyword(start));
        }
        if b.is_ascii_digit() || (b == b'\'' && is_base_char(self.peek_at(1))) {
            return self.lex_number(start);
        }

        let kind = match b {
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            b';' => self.single(TokenKind::Semi),
            b',' => self.single(TokenKind::Comma),
            b':' => self.single(TokenKind::Colon),
            b'#' => self.single(TokenKind::Hash),
            b'@' => self.single(TokenKind::At),
            b'*' => self.single(TokenKind::Star),
            b'+' => self.single(TokenKind::Plus),
            b'-' => self.single(TokenKind::Minus),
            b'=' => {
                if self.peek_at(1) == b'=' {
                    self.pos += 2;
                    TokenKind::EqEq
                } else {
                    self.single(TokenKind::Assign1)
                }
            }
            b'!' => {
                if self.peek_at(1) == b'=' {
                    self.pos += 2;
                    TokenKind::BangEq
                } else {
                    self.single(TokenKind::Bang)
                }
            }
            b'<' => {
                if self.peek_at(1) == b'=' {
                    self.pos += 2;
                    TokenKind::LeAssign
                } else {
                    return Err(self.error(start, "unsupported operator `<`"));
                }
            }
            b'&' => {
                if self.peek_at(1) == b'&' {
                    self.pos += 2;
                    TokenKind::AmpAmp
                } else {
                    return Err(self.error(start, "unsupported operator `&`"));
                }
            }
            b'|' => {
                if self.peek_at(1) == b'|' {
                    self.pos += 2;
                    TokenKind::PipePipe
                } else {
                    return Err(self.error(start, "unsupported operator `|`"));
                }
            }
            other => {
                return Err(self.error(
                    start,
                    format!("unexpected character `{}`", other as char),
                ))
            }
        };

        Ok(Token {
            kind,
            start,
            end: self.pos,
        })
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        while self.pos < self.bytes.len() && is_ident_char(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        let kind = lookup_keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        Token {
            kind,
            start,
            end: self.pos,
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, ParseError> {
        // Optional size digits
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_digit() || self.bytes[self.pos] == b'_')
        {
            self.pos += 1;
        }
        // Optional tick-base and value digits
        if self.peek() == b'\'' && is_base_char(self.peek_at(1)) {
            self.pos += 1; // tick
            if self.peek() == b's' || self.peek() == b'S' {
                self.pos += 1;
            }
            self.pos += 1; // base character
            while self.pos < self.bytes.len() && is_value_digit(self.bytes[self.pos]) {
                self.pos += 1;
            }
        }

        let text = &self.source[start..self.pos];
        let (value, width) =
            parse_verilog_literal(text).map_err(|e| self.error(start, e.to_string()))?;
        Ok(Token {
            kind: TokenKind::Number { value, width },
            start,
            end: self.pos,
        })
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_base_char(b: u8) -> bool {
    matches!(
        b.to_ascii_lowercase(),
        b'b' | b'o' | b'd' | b'h' | b's'
    )
}

fn is_value_digit(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'?'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("module counter endmodule"),
            vec![
                TokenKind::Module,
                TokenKind::Ident("counter".into()),
                TokenKind::Endmodule,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn sized_literal_is_one_token() {
        assert_eq!(
            kinds("4'b0101"),
            vec![
                TokenKind::Number {
                    value: 5,
                    width: Some(4)
                },
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unsized_literals() {
        assert_eq!(
            kinds("42 'hFF"),
            vec![
                TokenKind::Number {
                    value: 42,
                    width: None
                },
                TokenKind::Number {
                    value: 255,
                    width: None
                },
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn x_digits_read_as_zero() {
        assert_eq!(
            kinds("4'b1x1z"),
            vec![
                TokenKind::Number {
                    value: 0b1010,
                    width: Some(4)
                },
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("== != && || <="),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::LeAssign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a // line\n /* block\n comment */ b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_errors() {
        assert!(lex("/* never closed").is_err());
    }

    #[test]
    fn bad_literal_errors() {
        assert!(lex("4'q01").is_err());
    }

    #[test]
    fn single_ampersand_errors() {
        let err = lex("a & b").unwrap_err();
        assert!(err.to_string().contains('&'));
    }
}
