//! Shader kinds and the stages their entry points belong to.

use phf::phf_map;
use serde::Serialize;

use crate::lexer::{TokenCategory, TokenCursor};

/// Selects which top-level blocks a shader may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum ShaderKind {
    Graphics,
    Compute,
    Raytracing,
}
impl ShaderKind {
    /// Block handlers tried, in order, for a top-level identifier
    pub fn block_handlers(self) -> &'static [BlockHandler] {
        match self {
            Self::Graphics | Self::Raytracing => &[BlockHandler::Pipeline, BlockHandler::Resources],
            Self::Compute => &[BlockHandler::Resources],
        }
    }
}
impl Default for ShaderKind {
    fn default() -> Self {
        Self::Graphics
    }
}

/// A once-per-file block of the form `<Keyword> = { ... };`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockHandler {
    Pipeline,
    Resources,
}
impl BlockHandler {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Pipeline => "Pipeline",
            Self::Resources => "Resources",
        }
    }

    /// True if the cursor sits on `<Keyword> = {`. Looks ahead on a copy, `cursor` doesn't move.
    pub fn opens_at(self, cursor: &TokenCursor) -> bool {
        if cursor.current().text() != self.keyword() {
            return false;
        }
        let mut probe = *cursor;
        probe.advance()
            && probe.current().is(TokenCategory::Equals)
            && probe.advance()
            && probe.current().is(TokenCategory::LeftCurly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShaderStage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
}

static ENTRY_POINTS: phf::Map<&'static str, ShaderStage> = phf_map! {
    "VSMain" => ShaderStage::Vertex,
    "HSMain" => ShaderStage::Hull,
    "DSMain" => ShaderStage::Domain,
    "GSMain" => ShaderStage::Geometry,
    "PSMain" => ShaderStage::Pixel,
    "CSMain" => ShaderStage::Compute,
};

impl ShaderStage {
    pub fn from_entry_point(name: &str) -> Option<Self> {
        ENTRY_POINTS.get(name).copied()
    }

    pub fn entry_point(self) -> &'static str {
        match self {
            Self::Vertex => "VSMain",
            Self::Hull => "HSMain",
            Self::Domain => "DSMain",
            Self::Geometry => "GSMain",
            Self::Pixel => "PSMain",
            Self::Compute => "CSMain",
        }
    }

    pub fn kind(self) -> ShaderKind {
        match self {
            Self::Compute => ShaderKind::Compute,
            _ => ShaderKind::Graphics,
        }
    }

    /// Compiler target profile, e.g. `vs_5_1` for `model = "5_1"`
    pub fn profile(self, model: &str) -> String {
        let prefix = match self {
            Self::Vertex => "vs",
            Self::Hull => "hs",
            Self::Domain => "ds",
            Self::Geometry => "gs",
            Self::Pixel => "ps",
            Self::Compute => "cs",
        };
        format!("{}_{}", prefix, model)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_entry_points_round_trip() {
        for stage in [
            ShaderStage::Vertex,
            ShaderStage::Hull,
            ShaderStage::Domain,
            ShaderStage::Geometry,
            ShaderStage::Pixel,
            ShaderStage::Compute,
        ] {
            assert_eq!(ShaderStage::from_entry_point(stage.entry_point()), Some(stage));
        }
        assert_eq!(ShaderStage::from_entry_point("main"), None);
        assert_eq!(ShaderStage::Pixel.profile("5_1"), "ps_5_1");
    }

    #[test]
    fn test_compute_has_no_pipeline() {
        assert_eq!(ShaderKind::Compute.block_handlers(), &[BlockHandler::Resources]);
        assert_eq!(
            ShaderKind::Graphics.block_handlers(),
            &[BlockHandler::Pipeline, BlockHandler::Resources]
        );
    }
}
