//! The top-level driver.
//!
//! A single forward pass over the token buffer. Braces are counted everywhere, but declarations
//! are only recognized at depth 0: function bodies, cbuffer contents and anything else inside
//! braces is skipped by brace counting alone.
//!
//! Every declaration parser starts with the cursor on the first token of its construct and
//! leaves it on the last token it consumed. The driver then advances past it.

use bitflags::bitflags;

use crate::{
    ast::{
        FunctionTable, ParsedShader, PipelineBlock, RegisterBinding, ResourceCounts,
        ResourcesBlock, StructTable,
    },
    lexer::{tokenize, ClassifiedToken, TokenCategory, TokenCursor},
    sink::{LogSink, StdoutSink},
    source::strip_comments,
    stage::{BlockHandler, ShaderKind},
};

pub mod error;
mod functions;
mod pipeline;
mod registers;
mod structs;

pub use error::{Fault, ParseError, ParseResult};
pub use pipeline::PIPELINE_DEPTH_LIMIT;
pub use registers::{parse_register_slot, parse_register_space};

/// Deepest brace nesting accepted before a parse is abandoned
pub const SCOPE_DEPTH_LIMIT: u32 = 4096;

bitflags! {
    /// Blocks which may appear at most once per file
    #[derive(Default)]
    struct ParsedBlocks: u8 {
        const PIPELINE = 0b01;
        const RESOURCES = 0b10;
    }
}
impl From<BlockHandler> for ParsedBlocks {
    fn from(handler: BlockHandler) -> Self {
        match handler {
            BlockHandler::Pipeline => Self::PIPELINE,
            BlockHandler::Resources => Self::RESOURCES,
        }
    }
}

/// Parses one source file.
///
/// ```
/// use shader_ast::{ShaderKind, ShaderParser};
///
/// let shader = ShaderParser::new(ShaderKind::Graphics)
///     .parse("struct VSInput { float3 Position : POSITION; };")
///     .unwrap();
/// assert!(shader.structs.contains("VSInput"));
/// ```
pub struct ShaderParser<'s> {
    kind: ShaderKind,
    sink: &'s dyn LogSink,
    scope_limit: u32,
}
impl ShaderParser<'static> {
    /// A parser logging to stdout
    pub fn new(kind: ShaderKind) -> Self {
        Self {
            kind,
            sink: &StdoutSink,
            scope_limit: SCOPE_DEPTH_LIMIT,
        }
    }
}
impl<'s> ShaderParser<'s> {
    pub fn with_sink<'t>(self, sink: &'t dyn LogSink) -> ShaderParser<'t> {
        ShaderParser {
            kind: self.kind,
            sink,
            scope_limit: self.scope_limit,
        }
    }

    pub fn with_scope_limit(mut self, scope_limit: u32) -> Self {
        self.scope_limit = scope_limit;
        self
    }

    /// Parse a whole file.
    ///
    /// `Err` holds the fatal error that stopped the parse. Declarations that failed recoverably
    /// are listed in [ParsedShader::diagnostics] instead.
    pub fn parse(self, source: &str) -> Result<ParsedShader, ParseError> {
        let tokens = tokenize(&strip_comments(source));
        let mut state = ParseState::new(self.kind, self.sink, self.scope_limit);
        if let Some(cursor) = TokenCursor::new(&tokens) {
            state.drive(cursor)?;
        }
        let shader = state.finish();
        self.sink.message(format_args!(
            "parsed {} structs, {} functions ({} diagnostics)",
            shader.structs.len(),
            shader.functions.len(),
            shader.diagnostics.len()
        ));
        Ok(shader)
    }
}

/// Brace depth of the driver, remembering the line each open brace was on
struct Scopes {
    open: Vec<u32>,
    limit: u32,
}
impl Scopes {
    fn new(limit: u32) -> Self {
        Self { open: vec![], limit }
    }

    fn depth(&self) -> usize {
        self.open.len()
    }

    fn count(&mut self, token: &ClassifiedToken) -> ParseResult<()> {
        match token.category {
            TokenCategory::LeftCurly => {
                if self.open.len() as u32 >= self.limit {
                    return Err(Fault::Fatal(ParseError::ScopeOutOfBounds {
                        line: token.line(),
                        depth: self.open.len() as i64 + 1,
                        limit: self.limit,
                    }));
                }
                self.open.push(token.line());
            }
            TokenCategory::RightCurly => {
                if self.open.pop().is_none() {
                    return Err(Fault::Fatal(ParseError::ScopeOutOfBounds {
                        line: token.line(),
                        depth: -1,
                        limit: self.limit,
                    }));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Registries filled in during a single pass
pub(crate) struct ParseState<'s> {
    kind: ShaderKind,
    sink: &'s dyn LogSink,
    scope_limit: u32,
    blocks: ParsedBlocks,

    structs: StructTable,
    functions: FunctionTable,
    counts: ResourceCounts,
    registers: Vec<RegisterBinding>,
    pipeline: Option<PipelineBlock>,
    resources: Option<ResourcesBlock>,
    diagnostics: Vec<ParseError>,
}
impl<'s> ParseState<'s> {
    fn new(kind: ShaderKind, sink: &'s dyn LogSink, scope_limit: u32) -> Self {
        Self {
            kind,
            sink,
            scope_limit,
            blocks: ParsedBlocks::default(),
            structs: StructTable::default(),
            functions: FunctionTable::default(),
            counts: ResourceCounts::default(),
            registers: vec![],
            pipeline: None,
            resources: None,
            diagnostics: vec![],
        }
    }

    fn finish(self) -> ParsedShader {
        ParsedShader {
            kind: self.kind,
            structs: self.structs,
            functions: self.functions,
            counts: self.counts,
            registers: self.registers,
            pipeline: self.pipeline,
            resources: self.resources,
            diagnostics: self.diagnostics,
        }
    }

    fn drive(&mut self, mut cursor: TokenCursor<'_>) -> Result<(), ParseError> {
        let mut scopes = Scopes::new(self.scope_limit);
        loop {
            let result = match self.step(&mut cursor, &mut scopes) {
                Err(Fault::Recoverable(e)) => {
                    self.report(e);
                    self.resynchronize(&mut cursor, &mut scopes)
                }
                other => other,
            };
            if let Err(fault) = result {
                self.sink.error(format_args!("{}", fault));
                return Err(fault.into_error());
            }
            if !cursor.advance() {
                break;
            }
        }

        if let Some(&line) = scopes.open.first() {
            let warning = ParseError::UnclosedScope { line };
            self.sink.warn(format_args!("{}", warning));
            self.diagnostics.push(warning);
        }
        Ok(())
    }

    fn step(&mut self, cursor: &mut TokenCursor<'_>, scopes: &mut Scopes) -> ParseResult<()> {
        let token = cursor.current();
        if token.category.is_brace() {
            return scopes.count(token);
        }
        if scopes.depth() > 0 {
            return Ok(());
        }

        match token.category {
            TokenCategory::StructKeyword => self.parse_struct(cursor),
            TokenCategory::GeneralIdentifier => self.dispatch_identifier(cursor),
            // Template argument, as in `Texture2D<float4> tex : register(t0);`
            TokenCategory::BuiltinDatatype if cursor.last().is(TokenCategory::LeftAngle) => Ok(()),
            TokenCategory::BuiltinDatatype => {
                if is_function_shape(cursor) {
                    self.parse_function(cursor)
                } else {
                    // Global variable
                    skip_statement(cursor);
                    Ok(())
                }
            }
            TokenCategory::ReservedKeyword => match token.text() {
                "groupshared" | "uniform" | "const" => {
                    skip_statement(cursor);
                    Ok(())
                }
                "register" => {
                    self.parse_register_statement(cursor)?;
                    skip_statement(cursor);
                    Ok(())
                }
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn dispatch_identifier(&mut self, cursor: &mut TokenCursor<'_>) -> ParseResult<()> {
        for &handler in self.kind.block_handlers() {
            if handler.opens_at(cursor) {
                return match handler {
                    BlockHandler::Pipeline => self.parse_pipeline(cursor),
                    BlockHandler::Resources => self.parse_resources(cursor),
                };
            }
        }
        if is_function_shape(cursor) {
            self.parse_function(cursor)
        } else {
            Ok(())
        }
    }

    /// After a recoverable fault, get back to a statement boundary without losing brace depth
    fn resynchronize(
        &mut self,
        cursor: &mut TokenCursor<'_>,
        scopes: &mut Scopes,
    ) -> ParseResult<()> {
        let token = cursor.current();
        if token.category.is_brace() {
            scopes.count(token)
        } else {
            skip_statement(cursor);
            Ok(())
        }
    }

    fn report(&mut self, error: ParseError) {
        self.sink.error(format_args!("{}", error));
        self.diagnostics.push(error);
    }

    /// Mark a once-per-file block as seen, or fail if it already was
    fn claim_block(&mut self, handler: BlockHandler, token: &ClassifiedToken) -> ParseResult<()> {
        let flag = ParsedBlocks::from(handler);
        if self.blocks.contains(flag) {
            let first_line = match handler {
                BlockHandler::Pipeline => self.pipeline.as_ref().map(|b| b.span.start),
                BlockHandler::Resources => self.resources.as_ref().map(|b| b.span.start),
            };
            return Err(Fault::Recoverable(ParseError::DuplicateBlock {
                line: token.line(),
                block: handler.keyword(),
                first_line: first_line.unwrap_or_default(),
            }));
        }
        self.blocks.insert(flag);
        Ok(())
    }

    /// The type name of `token`, if it is a builtin or an already declared struct
    fn known_type(&self, token: &ClassifiedToken) -> ParseResult<String> {
        let known = token.is(TokenCategory::BuiltinDatatype)
            || (token.is(TokenCategory::GeneralIdentifier) && self.structs.contains(token.text()));
        if known {
            Ok(token.text().to_owned())
        } else {
            Err(Fault::Recoverable(ParseError::UnknownType {
                line: token.line(),
                name: token.text().to_owned(),
            }))
        }
    }
}

/// Move to the next token. Running out of tokens mid-construct is always fatal.
fn next<'a>(
    cursor: &mut TokenCursor<'a>,
    context: &'static str,
) -> ParseResult<&'a ClassifiedToken> {
    if cursor.advance() {
        Ok(cursor.current())
    } else {
        Err(Fault::Fatal(ParseError::UnexpectedEof {
            line: cursor.current().line(),
            context,
        }))
    }
}

/// Move to the next token and require it to be `category`
fn expect<'a>(
    cursor: &mut TokenCursor<'a>,
    category: TokenCategory,
    expected: &'static str,
    context: &'static str,
) -> ParseResult<&'a ClassifiedToken> {
    let token = next(cursor, context)?;
    if token.is(category) {
        Ok(token)
    } else {
        Err(Fault::Recoverable(syntax(token, expected)))
    }
}

/// Move to the next token and require it to be a word, e.g. a semantic
fn expect_word<'a>(
    cursor: &mut TokenCursor<'a>,
    expected: &'static str,
    context: &'static str,
) -> ParseResult<&'a ClassifiedToken> {
    let token = next(cursor, context)?;
    if token.category.is_word() {
        Ok(token)
    } else {
        Err(Fault::Recoverable(syntax(token, expected)))
    }
}

/// Require the token after `cursor` to be `;` and consume it.
/// The error cites the line of the current token, the one the `;` should follow.
fn expect_trailing_semicolon<'a>(
    cursor: &mut TokenCursor<'a>,
    expected: &'static str,
) -> ParseResult<&'a ClassifiedToken> {
    let line = cursor.current().line();
    match cursor.peek_next() {
        Some(token) if token.is(TokenCategory::Semicolon) => {
            cursor.advance();
            Ok(token)
        }
        other => Err(Fault::Fatal(ParseError::Syntax {
            line,
            expected,
            found: other.map_or("end of input", |t| t.text()).to_owned(),
        })),
    }
}

fn syntax(token: &ClassifiedToken, expected: &'static str) -> ParseError {
    ParseError::Syntax {
        line: token.line(),
        expected,
        found: token.text().to_owned(),
    }
}

/// `<type> <name> (`, checked on a copy of the cursor
fn is_function_shape(cursor: &TokenCursor) -> bool {
    let mut probe = *cursor;
    probe.advance() && probe.advance() && probe.current().is(TokenCategory::LeftParen)
}

/// Move to the end of the current statement: onto its `;`, onto the last token before a brace,
/// or onto the last token of the buffer. Braces are never consumed.
pub(crate) fn skip_statement(cursor: &mut TokenCursor) {
    while !cursor.current().is(TokenCategory::Semicolon) {
        match cursor.peek_next() {
            Some(next) if !next.category.is_brace() => {
                cursor.advance();
            }
            _ => return,
        }
    }
}
