//! Splits (comment-free) source text into line-tagged tokens.
//!
//! Lexing happens in two stages. Splitting on whitespace produces coarse [Token]s, then every
//! coarse token is broken up on punctuation. Fragments that aren't punctuation are left
//! unclassified until [classify::classify_word] decides what they are.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::one_of,
    combinator::recognize,
    error::{Error, ErrorKind},
    IResult,
};

pub mod classify;
pub mod cursor;

pub use classify::classify_word;
pub use cursor::TokenCursor;

/// A fragment of source text and the (1-based) line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    LeftCurly,
    RightCurly,
    LeftParen,
    RightParen,
    LeftAngle,
    RightAngle,
    LeftSquare,
    RightSquare,
    /// `[[`
    DoubleLeftSquare,
    /// `]]`
    DoubleRightSquare,
    SingleQuote,
    DoubleQuote,
    Colon,
    DoubleColon,
    Equals,
    Semicolon,
    Comma,
    /// Catch-all for `* + - / % & !`, nothing downstream cares which one
    MathOperator,

    /// `in`, `out`, `inout`
    ParamModifier,
    BuiltinDatatype,
    StructKeyword,
    ReservedKeyword,
    GeneralIdentifier,
}
impl TokenCategory {
    pub fn is_brace(self) -> bool {
        matches!(self, Self::LeftCurly | Self::RightCurly)
    }

    /// True for categories that hold a word rather than punctuation
    pub fn is_word(self) -> bool {
        matches!(
            self,
            Self::ParamModifier
                | Self::BuiltinDatatype
                | Self::StructKeyword
                | Self::ReservedKeyword
                | Self::GeneralIdentifier
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedToken {
    pub token: Token,
    pub category: TokenCategory,
}
impl ClassifiedToken {
    pub fn new(text: impl Into<String>, line: u32, category: TokenCategory) -> Self {
        Self {
            token: Token {
                text: text.into(),
                line,
            },
            category,
        }
    }

    pub fn text(&self) -> &str {
        &self.token.text
    }

    pub fn line(&self) -> u32 {
        self.token.line
    }

    pub fn is(&self, category: TokenCategory) -> bool {
        self.category == category
    }
}

/// Output of the second lexing stage.
/// `category` is `None` for identifier/literal runs which still need classifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedToken {
    pub token: Token,
    pub category: Option<TokenCategory>,
}

const PUNCTUATION: &str = "(){}<>[]\"':;,=*+-/%&!";

fn punctuation_category(text: &str) -> Option<TokenCategory> {
    use TokenCategory::*;
    let category = match text {
        "(" => LeftParen,
        ")" => RightParen,
        "{" => LeftCurly,
        "}" => RightCurly,
        "<" => LeftAngle,
        ">" => RightAngle,
        "[" => LeftSquare,
        "]" => RightSquare,
        "[[" => DoubleLeftSquare,
        "]]" => DoubleRightSquare,
        "\"" => DoubleQuote,
        "'" => SingleQuote,
        ":" => Colon,
        "::" => DoubleColon,
        ";" => Semicolon,
        "," => Comma,
        "=" => Equals,
        "*" | "+" | "-" | "/" | "%" | "&" | "!" => MathOperator,
        _ => return None,
    };
    Some(category)
}

fn punctuation(data: &str) -> IResult<&str, (&str, Option<TokenCategory>)> {
    // Doubled forms are tried first so `[[` never lexes as two `[`
    let (rest, text) = alt((
        tag("[["),
        tag("]]"),
        tag("::"),
        recognize(one_of(PUNCTUATION)),
    ))(data)?;
    match punctuation_category(text) {
        Some(category) => Ok((rest, (text, Some(category)))),
        None => Err(nom::Err::Error(Error::new(data, ErrorKind::OneOf))),
    }
}
fn word(data: &str) -> IResult<&str, (&str, Option<TokenCategory>)> {
    let (rest, text) = take_while1(|c: char| !PUNCTUATION.contains(c))(data)?;
    Ok((rest, (text, None)))
}

/// Stage 1: split on lines, then on runs of whitespace.
pub fn coarse_tokens(source: &str) -> Vec<Token> {
    source
        .lines()
        .enumerate()
        .flat_map(|(i, line)| {
            line.split_whitespace().map(move |text| Token {
                text: text.to_owned(),
                line: i as u32 + 1,
            })
        })
        .collect()
}

/// Stage 2: break a coarse token up on punctuation.
pub fn split_token(token: &Token) -> Vec<LexedToken> {
    let mut fragments = vec![];
    let mut data = token.text.as_str();

    while !data.is_empty() {
        let (rest, (text, category)) = match alt((punctuation, word))(data) {
            Ok(parsed) => parsed,
            // Every character is either punctuation or part of a word, so this can't happen
            Err(_) => ("", (data, None)),
        };
        fragments.push(LexedToken {
            token: Token {
                text: text.to_owned(),
                line: token.line,
            },
            category,
        });
        data = rest;
    }

    fragments
}

/// Lex and classify a comment-free source string.
pub fn tokenize(source: &str) -> Vec<ClassifiedToken> {
    coarse_tokens(source)
        .iter()
        .flat_map(split_token)
        .map(|lexed| {
            let category = lexed
                .category
                .unwrap_or_else(|| classify_word(&lexed.token.text));
            ClassifiedToken {
                token: lexed.token,
                category,
            }
        })
        .collect()
}
