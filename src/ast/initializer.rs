use serde::Serialize;

use super::LineSpan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum InitializerNode {
    Assignment(Assignment),
    List(InitializerList),
    Scalar(ScalarValue),
}
impl InitializerNode {
    pub fn as_list(&self) -> Option<&InitializerList> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(scalar) => Some(&scalar.text),
            _ => None,
        }
    }
}

/// `a, b, c = value;` assigns the same value under every name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub names: Vec<String>,
    pub value: Box<InitializerNode>,
    pub line: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitializerList {
    pub assignments: Vec<Assignment>,
}
impl InitializerList {
    /// The value of the first assignment that lists `name`
    pub fn get(&self, name: &str) -> Option<&InitializerNode> {
        self.assignments
            .iter()
            .find(|a| a.names.iter().any(|n| n == name))
            .map(|a| a.value.as_ref())
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarValue {
    pub text: String,
}

/// The parsed `Pipeline = { ... };` block and the lines it covered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineBlock {
    pub root: InitializerList,
    pub span: LineSpan,
}
