use std::mem;

use super::{expect_trailing_semicolon, next, syntax, Fault, ParseError, ParseResult, ParseState};
use crate::{
    ast::{Assignment, InitializerList, InitializerNode, LineSpan, PipelineBlock, ScalarValue},
    lexer::{ClassifiedToken, TokenCategory, TokenCursor},
    stage::BlockHandler,
};

/// Deepest initializer list nesting accepted inside a `Pipeline` block.
///
/// The finished tree is walked recursively by `Serialize`, `Debug`, `Clone` and drop.
pub const PIPELINE_DEPTH_LIMIT: u32 = 64;

/// An initializer list still being filled, and the assignment it will become the value of
struct OpenList {
    names: Vec<String>,
    line: u32,
    list: InitializerList,
}
impl OpenList {
    fn new(names: Vec<String>, line: u32) -> Self {
        Self {
            names,
            line,
            list: InitializerList::default(),
        }
    }

    fn into_assignment(self) -> Assignment {
        Assignment {
            names: self.names,
            value: Box::new(InitializerNode::List(self.list)),
            line: self.line,
        }
    }
}

impl<'s> ParseState<'s> {
    /// `Pipeline = { <assignments> };`, starting on `Pipeline`.
    pub(super) fn parse_pipeline(&mut self, cursor: &mut TokenCursor<'_>) -> ParseResult<()> {
        let start = cursor.current();
        self.claim_block(BlockHandler::Pipeline, start)?;
        next(cursor, "Pipeline block")?;
        next(cursor, "Pipeline block")?;

        let root = self.parse_initializer_tree(cursor)?;
        let end = expect_trailing_semicolon(cursor, "';' after Pipeline block")?;

        let span = LineSpan::new(start.line(), end.line());
        self.sink.message(format_args!(
            "Pipeline block on lines {}-{}",
            span.start, span.end
        ));
        self.pipeline = Some(PipelineBlock { root, span });
        Ok(())
    }

    /// Starts on the opening `{` and leaves the cursor on the matching `}`.
    ///
    /// Nested lists are kept on an explicit stack while parsing. Everything here is inside the
    /// block's braces, so every failure is fatal.
    fn parse_initializer_tree(&self, cursor: &mut TokenCursor<'_>) -> ParseResult<InitializerList> {
        let limit = self.scope_limit.min(PIPELINE_DEPTH_LIMIT);
        let mut current = OpenList::new(vec![], cursor.current().line());
        let mut parents: Vec<OpenList> = vec![];

        loop {
            let token = next(cursor, "initializer list")?;
            if token.is(TokenCategory::RightCurly) {
                match parents.pop() {
                    None => return Ok(current.list),
                    Some(parent) => {
                        expect_trailing_semicolon(cursor, "';' after initializer list")?;
                        let child = mem::replace(&mut current, parent);
                        current.list.assignments.push(child.into_assignment());
                    }
                }
                continue;
            }

            let line = token.line();
            let names = assignment_names(cursor)?;
            let value = next(cursor, "initializer assignment")?;
            if value.is(TokenCategory::LeftCurly) {
                // The block itself sits one scope down from the top level
                let depth = parents.len() as u32 + 2;
                if depth > limit {
                    return Err(Fault::Fatal(ParseError::ScopeOutOfBounds {
                        line: value.line(),
                        depth: depth as i64,
                        limit,
                    }));
                }
                parents.push(mem::replace(&mut current, OpenList::new(names, line)));
            } else {
                let scalar = scalar_value(cursor)?;
                expect_trailing_semicolon(cursor, "';' after assignment")?;
                current.list.assignments.push(Assignment {
                    names,
                    value: Box::new(InitializerNode::Scalar(scalar)),
                    line,
                });
            }
        }
    }
}

fn is_name(token: &ClassifiedToken) -> bool {
    token.is(TokenCategory::GeneralIdentifier) || token.is(TokenCategory::ReservedKeyword)
}

fn is_scalar(token: &ClassifiedToken) -> bool {
    is_name(token) || token.is(TokenCategory::BuiltinDatatype)
}

/// `name (, name)* =`, starting on the first name and finishing on `=`
fn assignment_names(cursor: &mut TokenCursor<'_>) -> ParseResult<Vec<String>> {
    let first = cursor.current();
    if !is_name(first) {
        return Err(Fault::Fatal(syntax(first, "assignment name")));
    }
    let mut names = vec![first.text().to_owned()];
    loop {
        let token = next(cursor, "initializer assignment")?;
        match token.category {
            TokenCategory::Equals => return Ok(names),
            TokenCategory::Comma => {
                let name = next(cursor, "initializer assignment")?;
                if !is_name(name) {
                    return Err(Fault::Fatal(syntax(name, "assignment name")));
                }
                names.push(name.text().to_owned());
            }
            _ => return Err(Fault::Fatal(syntax(token, "',' or '=' in assignment"))),
        }
    }
}

/// A single value token, optionally preceded by a sign
fn scalar_value(cursor: &mut TokenCursor<'_>) -> ParseResult<ScalarValue> {
    let token = cursor.current();
    let sign = match token.text() {
        "-" | "+" if token.is(TokenCategory::MathOperator) => Some(token.text()),
        _ => None,
    };
    let value = match sign {
        Some(_) => next(cursor, "scalar value")?,
        None => token,
    };
    if !is_scalar(value) {
        return Err(Fault::Fatal(syntax(value, "scalar value or '{'")));
    }
    Ok(ScalarValue {
        text: format!("{}{}", sign.unwrap_or_default(), value.text()),
    })
}
