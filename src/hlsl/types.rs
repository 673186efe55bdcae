use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, one_of},
    combinator::{all_consuming, map, opt, value},
    sequence::{pair, preceded},
    IResult,
};
use serde::Serialize;

/// The element kind of a numeric builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarKind {
    Int,
    UInt,
    DWord,
    Half,
    Double,
    Float,
}
impl ScalarKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::DWord => "dword",
            Self::Half => "half",
            Self::Double => "double",
            Self::Float => "float",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Shape {
    Scalar,
    /// e.g. `float3`
    Vector(u8),
    /// e.g. `float4x4`, rows then columns
    Matrix(u8, u8),
}

/// A type name that the language defines without a declaration.
///
/// Numeric builtins follow `(int|uint|dword|half|double|float)([1-4](x[1-4])?)?`,
/// everything else is one of the fixed keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuiltinType {
    Void,
    Bool,
    /// The generic `matrix` keyword
    Matrix,
    Numeric { scalar: ScalarKind, shape: Shape },
}
impl BuiltinType {
    /// Parse a whole word as a builtin type, or `None` if the word is anything else.
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "void" => Some(Self::Void),
            "bool" => Some(Self::Bool),
            "matrix" => Some(Self::Matrix),
            _ => {
                let parsed: IResult<&str, (ScalarKind, Shape)> =
                    all_consuming(pair(scalar_kind, shape))(word);
                parsed
                    .ok()
                    .map(|(_, (scalar, shape))| Self::Numeric { scalar, shape })
            }
        }
    }

    /// Number of scalar components, `None` for types which don't have a fixed count
    pub fn n_components(self) -> Option<u8> {
        match self {
            Self::Numeric { shape, .. } => Some(match shape {
                Shape::Scalar => 1,
                Shape::Vector(n) => n,
                Shape::Matrix(r, c) => r * c,
            }),
            Self::Bool => Some(1),
            Self::Void | Self::Matrix => None,
        }
    }
}
impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Bool => write!(f, "bool"),
            Self::Matrix => write!(f, "matrix"),
            Self::Numeric { scalar, shape } => match shape {
                Shape::Scalar => write!(f, "{}", scalar.keyword()),
                Shape::Vector(n) => write!(f, "{}{}", scalar.keyword(), n),
                Shape::Matrix(r, c) => write!(f, "{}{}x{}", scalar.keyword(), r, c),
            },
        }
    }
}

fn scalar_kind(data: &str) -> IResult<&str, ScalarKind> {
    alt((
        value(ScalarKind::UInt, tag("uint")),
        value(ScalarKind::Int, tag("int")),
        value(ScalarKind::DWord, tag("dword")),
        value(ScalarKind::Half, tag("half")),
        value(ScalarKind::Double, tag("double")),
        value(ScalarKind::Float, tag("float")),
    ))(data)
}
fn dimension(data: &str) -> IResult<&str, u8> {
    map(one_of("1234"), |c| c as u8 - b'0')(data)
}
fn shape(data: &str) -> IResult<&str, Shape> {
    let (data, dims) = opt(pair(dimension, opt(preceded(char('x'), dimension))))(data)?;
    let shape = match dims {
        None => Shape::Scalar,
        Some((n, None)) => Shape::Vector(n),
        Some((rows, Some(cols))) => Shape::Matrix(rows, cols),
    };
    Ok((data, shape))
}
