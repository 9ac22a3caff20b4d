//! Decoded YAML nodes with source positions
//!
//! This is the input of the AST constructor. Mapping entries stay in source
//! order and duplicate keys are kept, so the constructor can report them.

use crate::ast::{Pos, Str};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Explicit or implicit null (`~`, `null`, empty value)
    Null,
    /// Any scalar, as written. `plain` is false for quoted and block scalars.
    Scalar { value: String, plain: bool },
    Sequence(Vec<YamlNode>),
    Mapping(Vec<(YamlNode, YamlNode)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct YamlNode {
    pub kind: NodeKind,
    pub pos: Pos,
}

impl YamlNode {
    pub fn null(pos: Pos) -> Self {
        Self {
            kind: NodeKind::Null,
            pos,
        }
    }

    /// Plain (unquoted) scalar
    pub fn scalar(value: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind: NodeKind::Scalar {
                value: value.into(),
                plain: true,
            },
            pos,
        }
    }

    /// Quoted or block scalar, never resolved to a bool or number
    pub fn quoted(value: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind: NodeKind::Scalar {
                value: value.into(),
                plain: false,
            },
            pos,
        }
    }

    pub fn sequence(items: Vec<YamlNode>, pos: Pos) -> Self {
        Self {
            kind: NodeKind::Sequence(items),
            pos,
        }
    }

    pub fn mapping(entries: Vec<(YamlNode, YamlNode)>, pos: Pos) -> Self {
        Self {
            kind: NodeKind::Mapping(entries),
            pos,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, NodeKind::Null)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Scalar written without quotes, the only form resolved to a bool or number
    pub fn as_plain_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar { value, plain: true } => Some(value),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, itself included
    pub fn node_count(&self) -> usize {
        match &self.kind {
            NodeKind::Null | NodeKind::Scalar { .. } => 1,
            NodeKind::Sequence(items) => 1 + items.iter().map(YamlNode::node_count).sum::<usize>(),
            NodeKind::Mapping(entries) => {
                1 + entries
                    .iter()
                    .map(|(k, v)| k.node_count() + v.node_count())
                    .sum::<usize>()
            }
        }
    }

    /// Scalar as a located string leaf
    pub fn as_str_leaf(&self) -> Option<Str> {
        self.as_scalar().map(|s| Str::new(s.to_string(), self.pos))
    }

    pub fn as_sequence(&self) -> Option<&[YamlNode]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(YamlNode, YamlNode)]> {
        match &self.kind {
            NodeKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// First value whose key is the scalar `key`
    pub fn get(&self, key: &str) -> Option<&YamlNode> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k.as_scalar() == Some(key))
            .map(|(_, v)| v)
    }

    /// Short description of the node kind for error messages
    pub fn describe(&self) -> String {
        match &self.kind {
            NodeKind::Null => "null".to_string(),
            NodeKind::Scalar { value, plain: true } => format!("scalar \"{}\"", value),
            NodeKind::Scalar { value, plain: false } => format!("quoted scalar \"{}\"", value),
            NodeKind::Sequence(_) => "a sequence".to_string(),
            NodeKind::Mapping(_) => "a mapping".to_string(),
        }
    }
}
