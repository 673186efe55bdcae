//! Source text preprocessing.
//!
//! Comments are removed before lexing, but every newline inside them is kept so that the
//! line numbers the lexer assigns still match the file on disk.

use std::borrow::Cow;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while},
    combinator::rest,
    sequence::{preceded, terminated},
    IResult,
};

enum Chunk<'a> {
    Text(&'a str),
    Comment(&'a str),
}

fn line_comment(data: &str) -> IResult<&str, Chunk> {
    // The newline itself is left for the next chunk
    let (data, body) = preceded(tag("//"), take_while(|c| c != '\n'))(data)?;
    Ok((data, Chunk::Comment(body)))
}
fn block_comment(data: &str) -> IResult<&str, Chunk> {
    let (data, _) = tag("/*")(data)?;
    match terminated(take_until("*/"), tag::<_, _, nom::error::Error<&str>>("*/"))(data) {
        Ok((data, body)) => Ok((data, Chunk::Comment(body))),
        // Unterminated, runs to the end of the file
        Err(_) => {
            let (data, body) = rest(data)?;
            Ok((data, Chunk::Comment(body)))
        }
    }
}
fn text(data: &str) -> IResult<&str, Chunk> {
    let (data, text) = alt((is_not("/"), tag("/")))(data)?;
    Ok((data, Chunk::Text(text)))
}

/// Remove `//` line comments and `/* */` block comments, keeping every newline.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut data = source;

    while !data.is_empty() {
        match alt((line_comment, block_comment, text))(data) {
            Ok((remaining, Chunk::Text(text))) => {
                out.push_str(text);
                data = remaining;
            }
            Ok((remaining, Chunk::Comment(body))) => {
                out.extend(body.chars().filter(|&c| c == '\n'));
                data = remaining;
            }
            // `text` accepts any non-empty input
            Err(_) => {
                out.push_str(data);
                break;
            }
        }
    }

    out
}

/// Rebuild `source` line by line, letting `f` replace the text of each 1-based line.
///
/// The number of lines is preserved, as is a trailing newline.
pub fn rewrite_lines<'a, F>(source: &'a str, mut f: F) -> String
where
    F: FnMut(u32, &'a str) -> Cow<'a, str>,
{
    let mut out = String::with_capacity(source.len());
    for (i, line) in source.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&f(i as u32 + 1, line));
    }
    if source.ends_with('\n') {
        out.push('\n');
    }
    out
}
