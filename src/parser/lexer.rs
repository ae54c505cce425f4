// Query Lexer Implementation
//
// This module tokenizes entity query text into a stream of typed tokens.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// Token types produced by the lexer
#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    // Clause keywords
    Select,
    From,
    Where,
    Order,
    By,
    Group,
    Having,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    On,
    As,
    Distinct,
    Update,
    Set,
    Delete,
    Into,
    Values,

    // Logical operators
    And,
    Or,
    Not,

    // Comparison operators
    Eq,       // =
    NotEq,    // <> or !=
    Lt,       // <
    LtEq,     // <=
    Gt,       // >
    GtEq,     // >=
    Like,
    In,
    Between,
    Is,
    Null,

    // Arithmetic operators
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Percent,  // %

    // Aggregate function keywords
    Count,
    Sum,
    Avg,
    Min,
    Max,

    // Scalar function keywords
    Upper,
    Lower,
    Length,
    Substring,
    Trim,
    Concat,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Now,

    // Sort directions
    Asc,
    Desc,

    // Punctuation
    LParen,
    RParen,
    Comma,
    Dot,
    Semicolon,
    Colon,

    // Value-carrying tokens
    Identifier(String),
    StringLiteral(String),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    /// Bound parameter, name stored without the leading colon
    Parameter(String),

    // End of input
    Eof,
}

/// A lexical unit of the query text.
///
/// `position` is the 0-based character offset of the token start; line and
/// column are carried for diagnostics only.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Synthesize an end-of-input token at the given offset
    pub fn eof(position: usize) -> Self {
        Token {
            kind: TokenKind::Eof,
            literal: String::new(),
            position,
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.literal)
    }
}

/// Lexical errors raised while tokenizing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexicalError {
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },
    #[error("invalid number literal '{literal}' at position {position}")]
    InvalidNumber { literal: String, position: usize },
}

/// Lexer over a query string
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    ch: Option<char>,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over the given query text
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars().peekable();
        let ch = chars.next();
        Lexer {
            input: chars,
            ch,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance the cursor by one character
    fn read_char(&mut self) {
        if let Some(c) = self.ch {
            self.offset += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.ch = self.input.next();
    }

    /// Peek one character past the cursor without advancing
    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    /// Skip whitespace and `--` line comments between tokens
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some(c) = self.ch {
                if c.is_whitespace() {
                    self.read_char();
                } else {
                    break;
                }
            }

            if self.ch == Some('-') && self.peek_char() == Some('-') {
                while let Some(c) = self.ch {
                    if c == '\n' {
                        break;
                    }
                    self.read_char();
                }
                continue;
            }

            break;
        }
    }

    /// Read an identifier span starting at the current character
    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.ch {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.read_char();
            } else {
                break;
            }
        }
        ident
    }

    /// Read an unsigned number literal; the sign is a parser concern
    fn read_number(&mut self, position: usize) -> Result<(TokenKind, String), LexicalError> {
        let mut number = String::new();
        while let Some(c) = self.ch {
            if c.is_ascii_digit() {
                number.push(c);
                self.read_char();
            } else if c == '.' && !number.contains('.') && self.peek_char().is_some_and(|n| n.is_ascii_digit()) {
                number.push(c);
                self.read_char();
            } else {
                break;
            }
        }

        match number.parse::<f64>() {
            Ok(value) => Ok((TokenKind::NumberLiteral(value), number)),
            Err(_) => Err(LexicalError::InvalidNumber {
                literal: number,
                position,
            }),
        }
    }

    /// Read a string literal; `''` escapes an embedded quote
    fn read_string(&mut self, position: usize) -> Result<(TokenKind, String), LexicalError> {
        self.read_char(); // opening quote

        let mut value = String::new();
        loop {
            match self.ch {
                Some('\'') => {
                    if self.peek_char() == Some('\'') {
                        value.push('\'');
                        self.read_char();
                        self.read_char();
                    } else {
                        self.read_char(); // closing quote
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.read_char();
                }
                None => return Err(LexicalError::UnterminatedString { position }),
            }
        }

        let literal = format!("'{}'", value.replace('\'', "''"));
        Ok((TokenKind::StringLiteral(value), literal))
    }

    /// Resolve an identifier span against the keyword table
    fn lookup_keyword(ident: &str) -> Option<TokenKind> {
        match ident.to_ascii_uppercase().as_str() {
            "SELECT" => Some(TokenKind::Select),
            "FROM" => Some(TokenKind::From),
            "WHERE" => Some(TokenKind::Where),
            "ORDER" => Some(TokenKind::Order),
            "BY" => Some(TokenKind::By),
            "GROUP" => Some(TokenKind::Group),
            "HAVING" => Some(TokenKind::Having),
            "JOIN" => Some(TokenKind::Join),
            "INNER" => Some(TokenKind::Inner),
            "LEFT" => Some(TokenKind::Left),
            "RIGHT" => Some(TokenKind::Right),
            "FULL" => Some(TokenKind::Full),
            "OUTER" => Some(TokenKind::Outer),
            "ON" => Some(TokenKind::On),
            "AS" => Some(TokenKind::As),
            "DISTINCT" => Some(TokenKind::Distinct),
            "UPDATE" => Some(TokenKind::Update),
            "SET" => Some(TokenKind::Set),
            "DELETE" => Some(TokenKind::Delete),
            "INTO" => Some(TokenKind::Into),
            "VALUES" => Some(TokenKind::Values),
            "AND" => Some(TokenKind::And),
            "OR" => Some(TokenKind::Or),
            "NOT" => Some(TokenKind::Not),
            "LIKE" => Some(TokenKind::Like),
            "IN" => Some(TokenKind::In),
            "BETWEEN" => Some(TokenKind::Between),
            "IS" => Some(TokenKind::Is),
            "NULL" => Some(TokenKind::Null),
            "COUNT" => Some(TokenKind::Count),
            "SUM" => Some(TokenKind::Sum),
            "AVG" => Some(TokenKind::Avg),
            "MIN" => Some(TokenKind::Min),
            "MAX" => Some(TokenKind::Max),
            "UPPER" => Some(TokenKind::Upper),
            "LOWER" => Some(TokenKind::Lower),
            "LENGTH" => Some(TokenKind::Length),
            "SUBSTRING" => Some(TokenKind::Substring),
            "TRIM" => Some(TokenKind::Trim),
            "CONCAT" => Some(TokenKind::Concat),
            "YEAR" => Some(TokenKind::Year),
            "MONTH" => Some(TokenKind::Month),
            "DAY" => Some(TokenKind::Day),
            "HOUR" => Some(TokenKind::Hour),
            "MINUTE" => Some(TokenKind::Minute),
            "SECOND" => Some(TokenKind::Second),
            "NOW" => Some(TokenKind::Now),
            "ASC" => Some(TokenKind::Asc),
            "DESC" => Some(TokenKind::Desc),
            "TRUE" => Some(TokenKind::BooleanLiteral(true)),
            "FALSE" => Some(TokenKind::BooleanLiteral(false)),
            _ => None,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_whitespace_and_comments();

        let position = self.offset;
        let line = self.line;
        let column = self.column;

        let Some(ch) = self.ch else {
            return Ok(Token::eof(position));
        };

        let (kind, literal) = match ch {
            '(' => self.single(TokenKind::LParen, ch),
            ')' => self.single(TokenKind::RParen, ch),
            ',' => self.single(TokenKind::Comma, ch),
            '.' => self.single(TokenKind::Dot, ch),
            ';' => self.single(TokenKind::Semicolon, ch),
            '+' => self.single(TokenKind::Plus, ch),
            '-' => self.single(TokenKind::Minus, ch),
            '*' => self.single(TokenKind::Star, ch),
            '/' => self.single(TokenKind::Slash, ch),
            '%' => self.single(TokenKind::Percent, ch),
            '=' => self.single(TokenKind::Eq, ch),
            '<' => {
                self.read_char();
                match self.ch {
                    Some('=') => {
                        self.read_char();
                        (TokenKind::LtEq, "<=".to_string())
                    }
                    Some('>') => {
                        self.read_char();
                        (TokenKind::NotEq, "<>".to_string())
                    }
                    _ => (TokenKind::Lt, "<".to_string()),
                }
            }
            '>' => {
                self.read_char();
                if self.ch == Some('=') {
                    self.read_char();
                    (TokenKind::GtEq, ">=".to_string())
                } else {
                    (TokenKind::Gt, ">".to_string())
                }
            }
            '!' => {
                self.read_char();
                if self.ch == Some('=') {
                    self.read_char();
                    (TokenKind::NotEq, "!=".to_string())
                } else {
                    return Err(LexicalError::UnexpectedCharacter {
                        character: '!',
                        position,
                    });
                }
            }
            ':' => {
                self.read_char();
                if self.ch.is_some_and(|c| c.is_alphabetic() || c == '_') {
                    let name = self.read_identifier();
                    let literal = format!(":{name}");
                    (TokenKind::Parameter(name), literal)
                } else {
                    (TokenKind::Colon, ":".to_string())
                }
            }
            '\'' => self.read_string(position)?,
            c if c.is_ascii_digit() => self.read_number(position)?,
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                match Self::lookup_keyword(&ident) {
                    Some(kind) => (kind, ident),
                    None => (TokenKind::Identifier(ident.clone()), ident),
                }
            }
            c => {
                return Err(LexicalError::UnexpectedCharacter {
                    character: c,
                    position,
                });
            }
        };

        Ok(Token {
            kind,
            literal,
            position,
            line,
            column,
        })
    }

    /// Consume a single-character token
    fn single(&mut self, kind: TokenKind, ch: char) -> (TokenKind, String) {
        self.read_char();
        (kind, ch.to_string())
    }

    /// Tokenize the entire input, ending with an Eof token
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexicalError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}
