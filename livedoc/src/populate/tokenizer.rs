use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::Chars;

/// A token of a population specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<`
    OpenRef,
    /// `>`
    CloseRef,
    /// `{`
    OpenObject,
    /// `}`
    CloseObject,
    /// `[`
    OpenArray,
    /// `]`
    CloseArray,
    Word(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::OpenRef => write!(f, "<"),
            Token::CloseRef => write!(f, ">"),
            Token::OpenObject => write!(f, "{{"),
            Token::CloseObject => write!(f, "}}"),
            Token::OpenArray => write!(f, "["),
            Token::CloseArray => write!(f, "]"),
            Token::Word(word) => write!(f, "{}", word),
        }
    }
}

/// Splits a population specification into tokens.
///
/// Brackets are always tokens of their own. Commas, newlines, carriage
/// returns and tabs end the current word. Spaces belong to a word only once
/// it has started, trailing spaces are trimmed.
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            chars: input.chars().peekable(),
        }
    }
}

#[inline]
fn structural(c: char) -> Option<Token> {
    match c {
        '<' => Some(Token::OpenRef),
        '>' => Some(Token::CloseRef),
        '{' => Some(Token::OpenObject),
        '}' => Some(Token::CloseObject),
        '[' => Some(Token::OpenArray),
        ']' => Some(Token::CloseArray),
        _ => None,
    }
}

#[inline]
fn is_terminator(c: char) -> bool {
    matches!(c, ',' | '\n' | '\r' | '\t')
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let mut word = String::new();

        while let Some(&c) = self.chars.peek() {
            if structural(c).is_some() {
                if !word.is_empty() {
                    // the bracket is taken on the next call
                    break;
                }
                self.chars.next();
                return structural(c);
            }

            self.chars.next();
            if is_terminator(c) {
                if !word.is_empty() {
                    break;
                }
            } else if c != ' ' || !word.is_empty() {
                word.push(c);
            }
        }

        let trimmed = word.trim_end();
        if trimmed.is_empty() {
            None
        } else {
            Some(Token::Word(trimmed.to_string()))
        }
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).collect()
}
