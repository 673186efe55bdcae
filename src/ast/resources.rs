use serde::Serialize;

use super::LineSpan;

/// The register file a binding lives in, named by its slot prefix letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegisterClass {
    /// `b`
    ConstantBuffer,
    /// `t`
    ShaderResource,
    /// `u`
    UnorderedAccess,
    /// `s`
    Sampler,
}
impl RegisterClass {
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            'b' => Some(Self::ConstantBuffer),
            't' => Some(Self::ShaderResource),
            'u' => Some(Self::UnorderedAccess),
            's' => Some(Self::Sampler),
            _ => None,
        }
    }
}

/// A parsed `register(<slot>[, space<N>])`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RegisterBinding {
    pub class: RegisterClass,
    /// At most two decimal digits
    pub index: u8,
    pub space: Option<u32>,
    pub line: u32,
}

/// How many slots of each register class a shader needs.
///
/// Each count is `max(index) + 1` over every binding seen, not the number of bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceCounts {
    pub constant_buffers: u8,
    pub shader_resource_views: u8,
    pub unordered_access_views: u8,
    pub samplers: u8,
}
impl ResourceCounts {
    pub fn record(&mut self, binding: &RegisterBinding) {
        let count = self.count_mut(binding.class);
        *count = (*count).max(binding.index + 1);
    }

    pub fn get(&self, class: RegisterClass) -> u8 {
        match class {
            RegisterClass::ConstantBuffer => self.constant_buffers,
            RegisterClass::ShaderResource => self.shader_resource_views,
            RegisterClass::UnorderedAccess => self.unordered_access_views,
            RegisterClass::Sampler => self.samplers,
        }
    }

    fn count_mut(&mut self, class: RegisterClass) -> &mut u8 {
        match class {
            RegisterClass::ConstantBuffer => &mut self.constant_buffers,
            RegisterClass::ShaderResource => &mut self.shader_resource_views,
            RegisterClass::UnorderedAccess => &mut self.unordered_access_views,
            RegisterClass::Sampler => &mut self.samplers,
        }
    }
}

/// The legacy `Resources = { ... };` block.
///
/// `lines` holds the declarations between the braces rebuilt from tokens, keyed by source line,
/// so the block can be swapped for plain declarations without shifting any line numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcesBlock {
    pub span: LineSpan,
    pub lines: Vec<(u32, String)>,
}
impl ResourcesBlock {
    pub fn line(&self, line_no: u32) -> Option<&str> {
        self.lines
            .iter()
            .find(|(n, _)| *n == line_no)
            .map(|(_, text)| text.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn binding(class: RegisterClass, index: u8) -> RegisterBinding {
        RegisterBinding {
            class,
            index,
            space: None,
            line: 1,
        }
    }

    #[test]
    fn test_counts_are_max_plus_one() {
        let mut counts = ResourceCounts::default();
        counts.record(&binding(RegisterClass::ShaderResource, 3));
        counts.record(&binding(RegisterClass::ShaderResource, 0));
        counts.record(&binding(RegisterClass::Sampler, 0));
        assert_eq!(counts.shader_resource_views, 4);
        assert_eq!(counts.samplers, 1);
        assert_eq!(counts.get(RegisterClass::UnorderedAccess), 0);
    }
}
