use super::{
    expect, expect_trailing_semicolon, expect_word, next, syntax, Fault, ParseError, ParseResult,
    ParseState,
};
use crate::{
    ast::{Member, StructDecl},
    lexer::{TokenCategory, TokenCursor},
};

impl<'s> ParseState<'s> {
    /// `struct <name> { <members> };`, starting on `struct`.
    ///
    /// Anything that goes wrong after the `{` is fatal.
    pub(super) fn parse_struct(&mut self, cursor: &mut TokenCursor<'_>) -> ParseResult<()> {
        let name = expect(
            cursor,
            TokenCategory::GeneralIdentifier,
            "struct name",
            "struct declaration",
        )?;
        expect(
            cursor,
            TokenCategory::LeftCurly,
            "'{' after struct name",
            "struct declaration",
        )?;

        let members = self.parse_members(cursor).map_err(Fault::into_fatal)?;
        expect_trailing_semicolon(cursor, "';' after struct declaration")?;

        let decl = StructDecl {
            name: name.text().to_owned(),
            line: name.line(),
            members,
        };
        self.structs.insert(decl).map_err(|decl| {
            Fault::Recoverable(ParseError::Redefinition {
                line: decl.line,
                what: "struct",
                name: decl.name,
            })
        })
    }

    /// Leaves the cursor on the closing `}`
    fn parse_members(&self, cursor: &mut TokenCursor<'_>) -> ParseResult<Vec<Member>> {
        let mut members: Vec<Member> = vec![];
        loop {
            let token = next(cursor, "struct body")?;
            if token.is(TokenCategory::RightCurly) {
                return Ok(members);
            }

            let member = self.parse_member(cursor)?;
            if members.iter().any(|m| m.name == member.name) {
                return Err(Fault::Recoverable(ParseError::Redefinition {
                    line: token.line(),
                    what: "struct member",
                    name: member.name,
                }));
            }
            members.push(member);
        }
    }

    /// `[modifier] <type> <name> [: <semantic>];`
    fn parse_member(&self, cursor: &mut TokenCursor<'_>) -> ParseResult<Member> {
        let mut token = cursor.current();
        let modifier = if token.is(TokenCategory::ReservedKeyword) {
            let modifier = token.text().to_owned();
            token = next(cursor, "struct member")?;
            Some(modifier)
        } else {
            None
        };
        let ty = self.known_type(token)?;
        let name = expect(
            cursor,
            TokenCategory::GeneralIdentifier,
            "member name",
            "struct member",
        )?;

        let mut token = next(cursor, "struct member")?;
        let semantic = if token.is(TokenCategory::Colon) {
            let semantic = expect_word(cursor, "semantic", "struct member")?;
            token = next(cursor, "struct member")?;
            Some(semantic.text().to_owned())
        } else {
            None
        };
        if !token.is(TokenCategory::Semicolon) {
            return Err(Fault::Recoverable(syntax(token, "';' after struct member")));
        }

        Ok(Member {
            modifier,
            ty,
            name: name.text().to_owned(),
            semantic,
        })
    }
}
