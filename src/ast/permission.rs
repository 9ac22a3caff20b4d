//! `permissions:` blocks
//!
//! A block is either a blanket grant (`read-all` / `write-all`) or a mapping
//! from scope name to grant. The two forms cannot coexist in one value.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::pos::{Pos, Str};

/// Access level of a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermKind {
    #[default]
    None,
    Read,
    Write,
}

impl PermKind {
    /// Parse a per-scope value (`none`, `read`, `write`)
    pub fn from_scope_value(s: &str) -> Option<Self> {
        match s {
            "none" => Some(PermKind::None),
            "read" => Some(PermKind::Read),
            "write" => Some(PermKind::Write),
            _ => None,
        }
    }

    /// Parse a blanket value (`read-all`, `write-all`)
    pub fn from_blanket_value(s: &str) -> Option<Self> {
        match s {
            "read-all" => Some(PermKind::Read),
            "write-all" => Some(PermKind::Write),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermKind::None => "none",
            PermKind::Read => "read",
            PermKind::Write => "write",
        }
    }
}

/// A single grant
#[derive(Debug, Clone, Serialize)]
pub struct Permission {
    /// Scope name, `None` for a blanket grant covering all scopes
    pub name: Option<Str>,
    pub kind: PermKind,
    pub pos: Pos,
}

/// The two exclusive forms of a permissions block
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "form", content = "grant", rename_all = "snake_case")]
pub enum PermissionsScope {
    /// `read-all` or `write-all`
    All(Permission),
    /// Scope name to grant
    Scopes(FxHashMap<String, Permission>),
}

#[derive(Debug, Clone, Serialize)]
pub struct Permissions {
    pub scope: PermissionsScope,
    pub pos: Pos,
}

impl Permissions {
    /// Blanket grant for every scope
    pub fn all(kind: PermKind, pos: Pos) -> Self {
        Self {
            scope: PermissionsScope::All(Permission {
                name: None,
                kind,
                pos,
            }),
            pos,
        }
    }

    /// Per-scope grants
    pub fn scoped(scopes: FxHashMap<String, Permission>, pos: Pos) -> Self {
        Self {
            scope: PermissionsScope::Scopes(scopes),
            pos,
        }
    }

    /// The blanket grant, if this block is one
    pub fn blanket(&self) -> Option<&Permission> {
        match &self.scope {
            PermissionsScope::All(p) => Some(p),
            PermissionsScope::Scopes(_) => None,
        }
    }

    /// The per-scope grants, if this block is a mapping
    pub fn scopes(&self) -> Option<&FxHashMap<String, Permission>> {
        match &self.scope {
            PermissionsScope::All(_) => None,
            PermissionsScope::Scopes(m) => Some(m),
        }
    }

    /// Effective grant for `scope`
    ///
    /// A blanket grant overrides everything; otherwise the scope entry is
    /// used, and a missing entry means no access.
    pub fn scope(&self, scope: &str) -> PermKind {
        match &self.scope {
            PermissionsScope::All(p) => p.kind,
            PermissionsScope::Scopes(m) => m.get(scope).map(|p| p.kind).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(name: &str, kind: PermKind) -> (String, Permission) {
        (
            name.to_string(),
            Permission {
                name: Some(Str::new(name.to_string(), Pos::new(3, 5))),
                kind,
                pos: Pos::new(3, 5),
            },
        )
    }

    #[test]
    fn blanket_grant_overrides_every_scope() {
        let p = Permissions::all(PermKind::Write, Pos::new(2, 14));
        assert_eq!(p.scope("contents"), PermKind::Write);
        assert_eq!(p.scope("anything"), PermKind::Write);
        assert!(p.blanket().is_some());
        assert!(p.scopes().is_none());
        assert!(p.blanket().and_then(|g| g.name.as_ref()).is_none());
    }

    #[test]
    fn scoped_lookup_defaults_to_none() {
        let scopes: FxHashMap<_, _> = [
            grant("issues", PermKind::Read),
            grant("contents", PermKind::Write),
        ]
        .into_iter()
        .collect();
        let p = Permissions::scoped(scopes, Pos::new(2, 3));
        assert_eq!(p.scope("issues"), PermKind::Read);
        assert_eq!(p.scope("contents"), PermKind::Write);
        assert_eq!(p.scope("packages"), PermKind::None);
        assert!(p.blanket().is_none());
        assert_eq!(p.scopes().map(|m| m.len()), Some(2));
    }

    #[test]
    fn parses_scope_and_blanket_values() {
        assert_eq!(PermKind::from_scope_value("read"), Some(PermKind::Read));
        assert_eq!(PermKind::from_scope_value("none"), Some(PermKind::None));
        assert_eq!(PermKind::from_scope_value("read-all"), None);
        assert_eq!(PermKind::from_blanket_value("write-all"), Some(PermKind::Write));
        assert_eq!(PermKind::from_blanket_value("write"), None);
        assert_eq!(PermKind::Write.as_str(), "write");
    }
}
