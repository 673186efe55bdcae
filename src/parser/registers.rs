use nom::{
    bytes::complete::{tag, take_while_m_n},
    character::complete::{digit1, one_of},
    combinator::{all_consuming, map_opt, map_res},
    sequence::{pair, preceded},
    IResult,
};

use super::{
    expect, expect_trailing_semicolon, next, skip_statement, syntax, Fault, ParseError,
    ParseResult, ParseState,
};
use crate::{
    ast::{LineSpan, RegisterBinding, RegisterClass, ResourcesBlock},
    lexer::{ClassifiedToken, TokenCategory, TokenCursor},
    stage::BlockHandler,
};

fn register_slot(data: &str) -> IResult<&str, (RegisterClass, u8)> {
    let class = map_opt(one_of("utsb"), RegisterClass::from_prefix);
    let index = map_res(
        take_while_m_n(1, 2, |c: char| c.is_ascii_digit()),
        |digits: &str| digits.parse::<u8>(),
    );
    pair(class, index)(data)
}
fn register_space(data: &str) -> IResult<&str, u32> {
    map_res(preceded(tag("space"), digit1), |digits: &str| {
        digits.parse::<u32>()
    })(data)
}

/// Parse a register slot such as `t3` or `b12`
pub fn parse_register_slot(text: &str) -> Option<(RegisterClass, u8)> {
    all_consuming(register_slot)(text)
        .ok()
        .map(|(_, slot)| slot)
}

/// Parse a register space such as `space1`
pub fn parse_register_space(text: &str) -> Option<u32> {
    all_consuming(register_space)(text)
        .ok()
        .map(|(_, space)| space)
}

impl<'s> ParseState<'s> {
    /// `register(<slot>[, space<N>])`, starting on `register` and finishing on `)`.
    /// Well-formed bindings are added to the resource counts.
    pub(super) fn parse_register_statement(
        &mut self,
        cursor: &mut TokenCursor<'_>,
    ) -> ParseResult<RegisterBinding> {
        let line = cursor.current().line();
        expect(
            cursor,
            TokenCategory::LeftParen,
            "'(' after register",
            "register binding",
        )?;

        let slot = next(cursor, "register binding")?;
        let (class, index) =
            parse_register_slot(slot.text()).ok_or_else(|| invalid_slot(slot))?;

        let mut token = next(cursor, "register binding")?;
        let space = if token.is(TokenCategory::Comma) {
            let space_token = next(cursor, "register binding")?;
            let space =
                parse_register_space(space_token.text()).ok_or_else(|| invalid_slot(space_token))?;
            token = next(cursor, "register binding")?;
            Some(space)
        } else {
            None
        };
        if !token.is(TokenCategory::RightParen) {
            return Err(Fault::Recoverable(syntax(token, "')' after register slot")));
        }

        let binding = RegisterBinding {
            class,
            index,
            space,
            line,
        };
        self.counts.record(&binding);
        self.registers.push(binding);
        Ok(binding)
    }

    /// `Resources = { <declarations> };`, starting on `Resources`.
    ///
    /// Register bindings inside are counted. A malformed one is reported and skipped up to its
    /// `;`, the rest of the block is still parsed.
    pub(super) fn parse_resources(&mut self, cursor: &mut TokenCursor<'_>) -> ParseResult<()> {
        let start = cursor.current();
        self.claim_block(BlockHandler::Resources, start)?;
        next(cursor, "Resources block")?;
        next(cursor, "Resources block")?;
        let body_start = cursor.position() + 1;

        let mut depth = 0u32;
        loop {
            let token = next(cursor, "Resources block")?;
            match token.category {
                TokenCategory::RightCurly if depth == 0 => break,
                TokenCategory::RightCurly => depth -= 1,
                TokenCategory::LeftCurly => {
                    depth += 1;
                    if depth + 1 > self.scope_limit {
                        return Err(Fault::Fatal(ParseError::ScopeOutOfBounds {
                            line: token.line(),
                            depth: depth as i64 + 1,
                            limit: self.scope_limit,
                        }));
                    }
                }
                TokenCategory::ReservedKeyword if token.text() == "register" => {
                    let statement = *cursor;
                    match self.parse_register_statement(cursor) {
                        Ok(_) => {}
                        Err(Fault::Recoverable(e)) => {
                            self.report(e);
                            // Rewind so a brace the failed binding ran into still gets counted
                            *cursor = statement;
                            skip_statement(cursor);
                        }
                        Err(fatal) => return Err(fatal),
                    }
                }
                _ => {}
            }
        }

        let body = &cursor.tokens()[body_start..cursor.position()];
        let end = expect_trailing_semicolon(cursor, "';' after Resources block")?;

        let span = LineSpan::new(start.line(), end.line());
        self.sink.message(format_args!(
            "Resources block on lines {}-{}",
            span.start, span.end
        ));
        self.resources = Some(ResourcesBlock {
            span,
            lines: reconstruct_lines(body),
        });
        Ok(())
    }
}

fn invalid_slot(token: &ClassifiedToken) -> Fault {
    Fault::Recoverable(ParseError::InvalidRegisterSlot {
        line: token.line(),
        slot: token.text().to_owned(),
    })
}

/// Rebuild declaration text from tokens, one entry per source line
fn reconstruct_lines(tokens: &[ClassifiedToken]) -> Vec<(u32, String)> {
    let mut lines: Vec<(u32, String)> = vec![];
    for token in tokens {
        match lines.last_mut() {
            Some((line, text)) if *line == token.line() => {
                text.push(' ');
                text.push_str(token.text());
            }
            _ => lines.push((token.line(), token.text().to_owned())),
        }
    }
    lines
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_register_slots() {
        assert_eq!(
            parse_register_slot("t3"),
            Some((RegisterClass::ShaderResource, 3))
        );
        assert_eq!(
            parse_register_slot("b12"),
            Some((RegisterClass::ConstantBuffer, 12))
        );
        for bad in ["t", "x0", "t123", "T0", "t-1", "s0a", ""] {
            assert_eq!(parse_register_slot(bad), None, "{:?}", bad);
        }
    }

    #[test]
    fn test_register_space() {
        assert_eq!(parse_register_space("space0"), Some(0));
        assert_eq!(parse_register_space("space17"), Some(17));
        assert_eq!(parse_register_space("space"), None);
        assert_eq!(parse_register_space("spaces1"), None);
    }
}
