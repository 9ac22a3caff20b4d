//! YAML input layer
//!
//! - `node`: position-annotated decoded nodes consumed by [`crate::parse`]
//! - `decode`: adapter producing them from text via yaml-rust2

mod decode;
mod node;

pub use decode::{decode, MAX_ALIAS_NODES};
pub use node::{NodeKind, YamlNode};
