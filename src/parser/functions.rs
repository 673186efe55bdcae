use super::{expect, expect_word, next, syntax, Fault, ParseError, ParseResult, ParseState};
use crate::{
    ast::{FunctionDecl, Param},
    lexer::{ClassifiedToken, TokenCategory, TokenCursor},
};

impl<'s> ParseState<'s> {
    /// `<type> <name> ( <params> ) [: <semantic>]` then `;` or a body.
    ///
    /// A body's `{` is left for the driver to count, the body itself is never parsed.
    pub(super) fn parse_function(&mut self, cursor: &mut TokenCursor<'_>) -> ParseResult<()> {
        let return_type = self.known_type(cursor.current())?;
        let name = expect(
            cursor,
            TokenCategory::GeneralIdentifier,
            "function name",
            "function declaration",
        )?;
        expect(
            cursor,
            TokenCategory::LeftParen,
            "'(' after function name",
            "function declaration",
        )?;
        let params = self.parse_params(cursor)?;

        let mut return_semantic = None;
        if cursor
            .peek_next()
            .map_or(false, |t| t.is(TokenCategory::Colon))
        {
            cursor.advance();
            let semantic = expect_word(cursor, "return semantic", "function declaration")?;
            return_semantic = Some(semantic.text().to_owned());
        }

        let has_body = match cursor.peek_next() {
            Some(t) if t.is(TokenCategory::Semicolon) => {
                cursor.advance();
                false
            }
            Some(t) if t.is(TokenCategory::LeftCurly) => true,
            Some(t) => {
                return Err(Fault::Recoverable(syntax(t, "';' or function body")));
            }
            None => {
                return Err(Fault::Fatal(ParseError::UnexpectedEof {
                    line: cursor.current().line(),
                    context: "function declaration",
                }))
            }
        };

        let decl = FunctionDecl {
            name: name.text().to_owned(),
            line: name.line(),
            return_type,
            return_semantic,
            params,
            has_body,
        };
        self.functions.insert(decl).map_err(|decl| {
            Fault::Recoverable(ParseError::Redefinition {
                line: decl.line,
                what: "function",
                name: decl.name,
            })
        })
    }

    /// Starts on `(`, leaves the cursor on the matching `)`
    fn parse_params(&self, cursor: &mut TokenCursor<'_>) -> ParseResult<Vec<Param>> {
        let mut params = vec![];
        let mut token = next(cursor, "parameter list")?;
        if token.is(TokenCategory::RightParen) {
            return Ok(params);
        }

        loop {
            let modifier = if token.is(TokenCategory::ParamModifier) {
                let modifier = token.text().to_owned();
                token = next(cursor, "parameter")?;
                Some(modifier)
            } else {
                None
            };
            let ty = self.known_type(token)?;
            let name = expect(
                cursor,
                TokenCategory::GeneralIdentifier,
                "parameter name",
                "parameter",
            )?;

            let mut after = next(cursor, "parameter")?;
            let semantic = if after.is(TokenCategory::Colon) {
                let semantic = expect_word(cursor, "parameter semantic", "parameter")?;
                after = next(cursor, "parameter")?;
                Some(semantic.text().to_owned())
            } else {
                None
            };
            let has_default = after.is(TokenCategory::Equals);
            if has_default {
                after = skip_default_value(cursor)?;
            }

            params.push(Param {
                modifier,
                ty,
                name: name.text().to_owned(),
                semantic,
                has_default,
            });

            match after.category {
                TokenCategory::RightParen => return Ok(params),
                TokenCategory::Comma => token = next(cursor, "parameter list")?,
                _ => {
                    return Err(Fault::Recoverable(syntax(
                        after,
                        "',', ')' or '=' after parameter",
                    )))
                }
            }
        }
    }
}

/// Skip a default value expression, starting on its `=`.
///
/// Parentheses and curly braces are balanced independently. Stops on the first `,` or `)` with
/// both balanced, which is returned.
fn skip_default_value<'a>(cursor: &mut TokenCursor<'a>) -> ParseResult<&'a ClassifiedToken> {
    let mut parens = 0i32;
    let mut curlies = 0i32;
    loop {
        let token = next(cursor, "default parameter value")?;
        match token.category {
            TokenCategory::Comma | TokenCategory::RightParen if parens == 0 && curlies == 0 => {
                return Ok(token)
            }
            TokenCategory::LeftParen => parens += 1,
            TokenCategory::RightParen => parens -= 1,
            TokenCategory::LeftCurly => curlies += 1,
            TokenCategory::RightCurly => curlies -= 1,
            _ => {}
        }
        if parens < 0 || curlies < 0 {
            return Err(Fault::Recoverable(syntax(
                token,
                "balanced default parameter value",
            )));
        }
    }
}
