use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one live engine session. Move tokens are only valid for the
/// session that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Opaque move token handed out by an engine. The board layer only stores
/// these and passes them back; the encoding belongs to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    session: SessionId,
    code: String,
}

impl Move {
    pub fn issue(session: SessionId, code: impl Into<String>) -> Self {
        Self {
            session,
            code: code.into(),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Engine-private encoding.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
