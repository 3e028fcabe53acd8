use strum_macros::Display;

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenType {
    Identifier, Integer, Decimal, Character, String, Operator,
}

/// A lexeme borrowed from the source text, tagged with its kind and the byte
/// offset it starts at. Keywords are plain identifiers; the parser tells them
/// apart by their literal text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub tokentype: TokenType,
    pub literal: &'a str,
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn new(tokentype: TokenType, literal: &'a str, offset: usize) -> Token<'a> {
        Token {
            tokentype,
            literal,
            offset,
        }
    }
    pub fn is(&self, literal: &str) -> bool {
        self.literal == literal
    }
}
