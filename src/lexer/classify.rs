//! Assigns a [TokenCategory] to word fragments.

use phf::phf_set;

use super::TokenCategory;
use crate::hlsl::types::BuiltinType;

/// Words the language reserves, excluding `struct`, builtin datatypes and parameter modifiers
/// (which get categories of their own).
static RESERVED_WORDS: phf::Set<&'static str> = phf_set! {
    "AppendStructuredBuffer",
    "asm",
    "asm_fragment",
    "BlendState",
    "break",
    "Buffer",
    "ByteAddressBuffer",
    "case",
    "cbuffer",
    "centroid",
    "class",
    "column_major",
    "compile",
    "compile_fragment",
    "CompileShader",
    "const",
    "continue",
    "ComputeShader",
    "ConstantBuffer",
    "ConsumeStructuredBuffer",
    "default",
    "DepthStencilState",
    "DepthStencilView",
    "discard",
    "do",
    "DomainShader",
    "else",
    "export",
    "extern",
    "false",
    "for",
    "fxgroup",
    "GeometryShader",
    "groupshared",
    "HullShader",
    "if",
    "inline",
    "InputPatch",
    "interface",
    "line",
    "lineadj",
    "linear",
    "LineStream",
    "min16float",
    "min10float",
    "min16int",
    "min12int",
    "min16uint",
    "namespace",
    "nointerpolation",
    "noperspective",
    "NULL",
    "OutputPatch",
    "packoffset",
    "pass",
    "pixelfragment",
    "PixelShader",
    "point",
    "PointStream",
    "precise",
    "RasterizerState",
    "RaytracingAccelerationStructure",
    "RenderTargetView",
    "return",
    "register",
    "row_major",
    "RWBuffer",
    "RWByteAddressBuffer",
    "RWStructuredBuffer",
    "RWTexture1D",
    "RWTexture1DArray",
    "RWTexture2D",
    "RWTexture2DArray",
    "RWTexture3D",
    "sample",
    "sampler",
    "SamplerState",
    "SamplerComparisonState",
    "shared",
    "snorm",
    "stateblock",
    "stateblock_state",
    "static",
    "string",
    "switch",
    "StructuredBuffer",
    "tbuffer",
    "technique",
    "technique10",
    "technique11",
    "texture",
    "Texture1D",
    "Texture1DArray",
    "Texture2D",
    "Texture2DArray",
    "Texture2DMS",
    "Texture2DMSArray",
    "Texture3D",
    "TextureCube",
    "TextureCubeArray",
    "true",
    "typedef",
    "triangle",
    "triangleadj",
    "TriangleStream",
    "uniform",
    "unorm",
    "unsigned",
    "vector",
    "vertexfragment",
    "VertexShader",
    "volatile",
    "while",
};

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}

pub fn is_param_modifier(word: &str) -> bool {
    matches!(word, "in" | "out" | "inout")
}

/// Classify a word fragment. Priority order is
/// `struct` > builtin datatype > parameter modifier > reserved word > identifier.
pub fn classify_word(word: &str) -> TokenCategory {
    if word == "struct" {
        TokenCategory::StructKeyword
    } else if BuiltinType::parse(word).is_some() {
        TokenCategory::BuiltinDatatype
    } else if is_param_modifier(word) {
        TokenCategory::ParamModifier
    } else if is_reserved_word(word) {
        TokenCategory::ReservedKeyword
    } else {
        TokenCategory::GeneralIdentifier
    }
}
