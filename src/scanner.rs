use crate::token::{Token, TokenType};
use phf::phf_map;
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[offset {offset}] Lex Error: {message}")]
pub struct ScanError {
    pub offset: usize,
    pub message: String,
}

impl ScanError {
    fn new(offset: usize, message: &str) -> ScanError {
        ScanError {
            offset,
            message: message.to_string(),
        }
    }
}

/// Escape sequences accepted in string and character literals, keyed by the
/// character following the backslash.
pub static ESCAPES: phf::Map<char, char> = phf_map! {
    'b' => '\u{8}',
    'n' => '\n',
    'r' => '\r',
    't' => '\t',
    '\'' => '\'',
    '"' => '"',
    '\\' => '\\',
};

type Pattern = fn(char) -> bool;

const WHITESPACE: Pattern = |c| matches!(c, ' ' | '\u{8}' | '\n' | '\r' | '\t');
const LETTER: Pattern = |c| c.is_ascii_alphabetic();
const IDENTIFIER_PART: Pattern = |c| c.is_ascii_alphanumeric() || c == '_' || c == '-';
const DIGIT: Pattern = |c| c.is_ascii_digit();
const SIGN: Pattern = |c| c == '+' || c == '-';
const DOT: Pattern = |c| c == '.';
const DOUBLE_QUOTE: Pattern = |c| c == '"';
const SINGLE_QUOTE: Pattern = |c| c == '\'';
const BACKSLASH: Pattern = |c| c == '\\';
const ESCAPE: Pattern = |c| ESCAPES.contains_key(&c);
const STRING_PART: Pattern = |c| !matches!(c, '"' | '\n' | '\r');
const CHARACTER_PART: Pattern = |c| !matches!(c, '\'' | '\n' | '\r' | '\\');
const COMPARISON: Pattern = |c| matches!(c, '<' | '>' | '!' | '=');
const EQUALS: Pattern = |c| c == '=';
const ANY: Pattern = |_| true;

struct Scanner<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
    start: usize,
}

/// Splits `source` into tokens, skipping whitespace. Stops at the first
/// malformed token.
pub fn scan_tokens(source: &str) -> Result<Vec<Token<'_>>, ScanError> {
    let mut scanner = Scanner {
        source,
        iter: source.char_indices().peekable(),
        start: 0,
    };
    let mut tokens: Vec<Token> = Vec::new();
    loop {
        while scanner.next_if(&[WHITESPACE]) {}
        if scanner.iter.peek().is_none() {
            break;
        }
        scanner.start = scanner.current();
        tokens.push(scanner.scan_token()?);
    }
    debug!(count = tokens.len(), "scanned tokens");
    Ok(tokens)
}

impl<'a> Scanner<'a> {
    fn scan_token(&mut self) -> Result<Token<'a>, ScanError> {
        if self.peek(&[LETTER]) {
            Ok(self.identifier())
        } else if self.peek(&[DOUBLE_QUOTE]) {
            self.string()
        } else if self.peek(&[SINGLE_QUOTE]) {
            self.character()
        } else if self.peek(&[SIGN, DIGIT]) || self.peek(&[DIGIT]) {
            Ok(self.number())
        } else {
            Ok(self.operator())
        }
    }
    /// Tests the upcoming characters against `patterns`, one predicate per
    /// position, without consuming anything.
    fn peek(&self, patterns: &[Pattern]) -> bool {
        let mut window = self.iter.clone();
        patterns
            .iter()
            .all(|pattern| window.next().map_or(false, |(_, c)| pattern(c)))
    }
    fn next_if(&mut self, patterns: &[Pattern]) -> bool {
        if !self.peek(patterns) {
            return false;
        }
        for _ in patterns {
            self.iter.next();
        }
        true
    }
    fn current(&mut self) -> usize {
        match self.iter.peek() {
            None => self.source.len(),
            Some((idx, _)) => *idx,
        }
    }
    fn token(&mut self, token_type: TokenType) -> Token<'a> {
        let current = self.current();
        Token::new(token_type, &self.source[self.start..current], self.start)
    }
    fn identifier(&mut self) -> Token<'a> {
        self.next_if(&[LETTER]);
        while self.next_if(&[IDENTIFIER_PART]) {}
        self.token(TokenType::Identifier)
    }
    fn number(&mut self) -> Token<'a> {
        self.next_if(&[SIGN]);
        while self.next_if(&[DIGIT]) {}
        // A dot only belongs to the number when a digit follows it.
        if self.next_if(&[DOT, DIGIT]) {
            while self.next_if(&[DIGIT]) {}
            self.token(TokenType::Decimal)
        } else {
            self.token(TokenType::Integer)
        }
    }
    fn escape(&mut self) -> Result<(), ScanError> {
        let backslash = self.current();
        if self.next_if(&[BACKSLASH, ESCAPE]) {
            Ok(())
        } else {
            Err(ScanError::new(backslash, "Invalid escape sequence."))
        }
    }
    fn string(&mut self) -> Result<Token<'a>, ScanError> {
        self.next_if(&[DOUBLE_QUOTE]);
        loop {
            if self.next_if(&[DOUBLE_QUOTE]) {
                return Ok(self.token(TokenType::String));
            } else if self.peek(&[BACKSLASH]) {
                self.escape()?;
            } else if !self.next_if(&[STRING_PART]) {
                return Err(ScanError::new(self.start, "Unterminated string."));
            }
        }
    }
    fn character(&mut self) -> Result<Token<'a>, ScanError> {
        self.next_if(&[SINGLE_QUOTE]);
        if self.peek(&[SINGLE_QUOTE]) {
            let offset = self.current();
            return Err(ScanError::new(offset, "Empty character literal."));
        } else if self.peek(&[BACKSLASH]) {
            self.escape()?;
        } else if !self.next_if(&[CHARACTER_PART]) {
            return Err(ScanError::new(self.start, "Unterminated character literal."));
        }
        if self.next_if(&[SINGLE_QUOTE]) {
            Ok(self.token(TokenType::Character))
        } else if self.peek(&[CHARACTER_PART]) || self.peek(&[BACKSLASH]) {
            let offset = self.current();
            Err(ScanError::new(
                offset,
                "Character literal has more than one character.",
            ))
        } else {
            Err(ScanError::new(self.start, "Unterminated character literal."))
        }
    }
    fn operator(&mut self) -> Token<'a> {
        if !self.next_if(&[COMPARISON, EQUALS]) {
            self.next_if(&[ANY]);
        }
        self.token(TokenType::Operator)
    }
}
