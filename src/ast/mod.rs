//! Output data of a parse: declaration tables, resource usage and the Pipeline initializer tree.

use std::{borrow::Cow, collections::HashMap};

use serde::{Serialize, Serializer};

use crate::{
    parser::error::ParseError,
    source,
    stage::{ShaderKind, ShaderStage},
};

pub mod initializer;
pub mod resources;

pub use initializer::{Assignment, InitializerList, InitializerNode, PipelineBlock, ScalarValue};
pub use resources::{RegisterBinding, RegisterClass, ResourceCounts, ResourcesBlock};

/// An inclusive range of 1-based source lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}
impl LineSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line <= self.end
    }
}

/// Anything stored in a [DeclTable]
pub trait Named {
    fn name(&self) -> &str;
}

/// Declarations keyed by name, iterated in declaration order.
#[derive(Debug, Clone)]
pub struct DeclTable<T> {
    order: Vec<String>,
    entries: HashMap<String, T>,
}
impl<T> Default for DeclTable<T> {
    fn default() -> Self {
        Self {
            order: vec![],
            entries: HashMap::new(),
        }
    }
}
impl<T: Named> DeclTable<T> {
    /// Store `decl` unless its name is already taken, in which case it is handed back.
    pub fn insert(&mut self, decl: T) -> Result<(), T> {
        if self.entries.contains_key(decl.name()) {
            return Err(decl);
        }
        self.order.push(decl.name().to_owned());
        self.entries.insert(decl.name().to_owned(), decl);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
impl<T: Named + Serialize> Serialize for DeclTable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Storage modifier such as `nointerpolation`
    pub modifier: Option<String>,
    pub ty: String,
    pub name: String,
    pub semantic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDecl {
    pub name: String,
    pub line: u32,
    /// In declaration order, names are unique
    pub members: Vec<Member>,
}
impl StructDecl {
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}
impl Named for StructDecl {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    /// `in`, `out`, `inout` or a storage keyword like `uniform`
    pub modifier: Option<String>,
    pub ty: String,
    pub name: String,
    pub semantic: Option<String>,
    /// Default value expressions are skipped, only their presence is kept
    pub has_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub line: u32,
    pub return_type: String,
    pub return_semantic: Option<String>,
    pub params: Vec<Param>,
    /// False for prototypes ending in `;`
    pub has_body: bool,
}
impl Named for FunctionDecl {
    fn name(&self) -> &str {
        &self.name
    }
}

pub type StructTable = DeclTable<StructDecl>;
pub type FunctionTable = DeclTable<FunctionDecl>;

/// Everything a single parse produces.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedShader {
    pub kind: ShaderKind,
    pub structs: StructTable,
    pub functions: FunctionTable,
    pub counts: ResourceCounts,
    /// Every well-formed register binding, in source order
    pub registers: Vec<RegisterBinding>,
    pub pipeline: Option<PipelineBlock>,
    pub resources: Option<ResourcesBlock>,
    /// Declarations that failed without aborting the parse
    pub diagnostics: Vec<ParseError>,
}
impl ParsedShader {
    /// Stages of this shader's kind whose conventional entry point was declared, in declaration order
    pub fn entry_points(&self) -> Vec<ShaderStage> {
        self.functions
            .iter()
            .filter_map(|f| ShaderStage::from_entry_point(&f.name))
            .filter(|stage| stage.kind() == self.kind)
            .collect()
    }

    /// Rewrite `source` (the text this was parsed from) for the compiler backend.
    ///
    /// The Pipeline block is blanked and the Resources block is replaced by its declarations.
    /// Every other line is untouched, so line numbers in compiler output still point at `source`.
    pub fn compiler_source(&self, source: &str) -> String {
        source::rewrite_lines(source, |line_no, line| {
            if let Some(pipeline) = &self.pipeline {
                if pipeline.span.contains(line_no) {
                    return Cow::Borrowed("");
                }
            }
            if let Some(resources) = &self.resources {
                if resources.span.contains(line_no) {
                    return Cow::Owned(resources.line(line_no).unwrap_or_default().to_owned());
                }
            }
            Cow::Borrowed(line)
        })
    }
}
