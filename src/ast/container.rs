//! `container:` and `services:`

use serde::Serialize;

use super::pos::{Pos, Str};
use super::settings::Env;

/// Registry credentials; both fields are always present
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: Str,
    pub password: Str,
    pub pos: Pos,
}

#[derive(Debug, Clone, Serialize)]
pub struct Container {
    pub image: Str,
    pub credentials: Option<Credentials>,
    pub env: Env,
    pub ports: Vec<Str>,
    pub volumes: Vec<Str>,
    /// Raw `docker create` options
    pub options: Option<Str>,
    pub pos: Pos,
}

impl Container {
    /// Container given only by its image, as in `container: node:20`
    pub fn from_image(image: Str, pos: Pos) -> Self {
        Self {
            image,
            credentials: None,
            env: Env::default(),
            ports: Vec::new(),
            volumes: Vec::new(),
            options: None,
            pos,
        }
    }
}

/// A named service container
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub name: Str,
    pub container: Container,
}
