//! A front end for an HLSL dialect with `Resources` and `Pipeline` blocks.
//!
//! Source text is stripped of comments ([source]), split into classified tokens ([lexer]) and
//! scanned by a single-pass driver ([parser]) which only looks at top-level declarations.
//! The result is a [ParsedShader]: struct and function declaration tables, how many registers of
//! each class the shader binds, and the initializer tree of the `Pipeline` block.
//!
//! Function bodies are never parsed. The rewritten text from [ParsedShader::compiler_source] is
//! meant to be handed to a real HLSL compiler, with the `Pipeline` tree translated separately.

use std::{fs, io, path::Path};

use thiserror::Error;

pub mod ast;
pub mod hlsl;
pub mod lexer;
pub mod parser;
pub mod sink;
pub mod source;
pub mod stage;

pub use ast::ParsedShader;
pub use parser::{Fault, ParseError, ParseResult, ShaderParser};
pub use sink::{LogSink, MemorySink, StdoutSink, TracingSink};
pub use stage::{ShaderKind, ShaderStage};

#[derive(Error, Debug)]
pub enum ShaderError {
    #[error("couldn't read shader file")]
    Io(#[from] io::Error),
    #[error("couldn't parse shader")]
    Parse(#[from] ParseError),
}

/// Parse `source` with a default [ShaderParser]
pub fn parse_source(source: &str, kind: ShaderKind) -> Result<ParsedShader, ShaderError> {
    Ok(ShaderParser::new(kind).parse(source)?)
}

/// Read and parse a shader file, logging through `sink`
pub fn parse_file(
    path: impl AsRef<Path>,
    kind: ShaderKind,
    sink: &dyn LogSink,
) -> Result<ParsedShader, ShaderError> {
    let source = fs::read_to_string(path)?;
    Ok(ShaderParser::new(kind).with_sink(sink).parse(&source)?)
}
