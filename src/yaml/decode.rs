//! Text to [`YamlNode`] using yaml-rust2's marked event stream
//!
//! Only the first document of a stream is decoded. Anchors are resolved by
//! copying the anchored node into each alias site, up to
//! [`MAX_ALIAS_NODES`] copied nodes per document.

use std::collections::HashMap;

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use super::node::YamlNode;
use crate::ast::Pos;
use crate::error::BuildError;

/// Upper bound on nodes copied by alias expansion in one document
pub const MAX_ALIAS_NODES: usize = 100_000;

/// Decode the first document of `source`
pub fn decode(source: &str) -> Result<YamlNode, BuildError> {
    let mut receiver = NodeReceiver::default();
    let mut parser = Parser::new(source.chars());
    parser
        .load(&mut receiver, false)
        .map_err(|e| BuildError::Decode {
            message: e.info().to_string(),
            pos: marker_pos(e.marker()),
        })?;

    if let Some(error) = receiver.error {
        return Err(error);
    }
    receiver.root.ok_or(BuildError::Decode {
        message: "document is empty".to_string(),
        pos: Pos::new(1, 1),
    })
}

/// yaml-rust2 lines are 1-based and columns 0-based
fn marker_pos(mark: &Marker) -> Pos {
    Pos::new(mark.line(), mark.col() + 1)
}

fn is_plain_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

enum Frame {
    Sequence {
        items: Vec<YamlNode>,
        anchor: usize,
        pos: Pos,
    },
    Mapping {
        entries: Vec<(YamlNode, YamlNode)>,
        key: Option<YamlNode>,
        anchor: usize,
        pos: Pos,
    },
}

#[derive(Default)]
struct NodeReceiver {
    stack: Vec<Frame>,
    anchors: HashMap<usize, YamlNode>,
    /// Nodes copied so far by alias expansion
    expanded: usize,
    root: Option<YamlNode>,
    error: Option<BuildError>,
}

impl NodeReceiver {
    fn complete(&mut self, node: YamlNode, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
        match self.stack.last_mut() {
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping { entries, key, .. }) => match key.take() {
                Some(k) => entries.push((k, node)),
                None => *key = Some(node),
            },
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }
}

impl MarkedEventReceiver for NodeReceiver {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        let pos = marker_pos(&mark);
        match ev {
            Event::Scalar(value, style, anchor, ..) => {
                let node = match style {
                    TScalarStyle::Plain if is_plain_null(&value) => YamlNode::null(pos),
                    TScalarStyle::Plain => YamlNode::scalar(value, pos),
                    _ => YamlNode::quoted(value, pos),
                };
                self.complete(node, anchor);
            }
            Event::SequenceStart(anchor, ..) => self.stack.push(Frame::Sequence {
                items: Vec::new(),
                anchor,
                pos,
            }),
            Event::MappingStart(anchor, ..) => self.stack.push(Frame::Mapping {
                entries: Vec::new(),
                key: None,
                anchor,
                pos,
            }),
            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Sequence { items, anchor, pos }) => {
                    self.complete(YamlNode::sequence(items, pos), anchor)
                }
                Some(Frame::Mapping {
                    entries,
                    anchor,
                    pos,
                    ..
                }) => self.complete(YamlNode::mapping(entries, pos), anchor),
                None => {}
            },
            Event::Alias(id) => match self.anchors.get(&id) {
                Some(node) => {
                    let total = self.expanded.saturating_add(node.node_count());
                    if total > MAX_ALIAS_NODES {
                        self.error = Some(BuildError::Decode {
                            message: format!(
                                "aliases expand to more than {} nodes",
                                MAX_ALIAS_NODES
                            ),
                            pos,
                        });
                        return;
                    }
                    self.expanded = total;
                    let node = node.clone();
                    self.complete(node, 0);
                }
                None => {
                    self.error = Some(BuildError::Decode {
                        message: "alias refers to an unknown anchor".to_string(),
                        pos,
                    });
                }
            },
            _ => {}
        }
        tracing::trace!(depth = self.stack.len(), %pos, "yaml event");
    }
}
