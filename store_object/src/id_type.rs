//! Id Type module
//!
//! Entity identities come in numeric, UUID and string flavours. Each has a
//! zero/default value that means "not yet persisted", which update and
//! delete must never bind.

use serde_json::Value;
use std::fmt::{self, Display};
use uuid::Uuid;

/// Universal ID type that can handle both numeric IDs and UUIDs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UniversalId {
    Numeric(i64),
    Uuid(Uuid),
    String(String),
}

impl UniversalId {
    /// `0`, the nil UUID or an empty string
    pub fn is_default(&self) -> bool {
        match self {
            UniversalId::Numeric(n) => *n == 0,
            UniversalId::Uuid(uuid) => uuid.is_nil(),
            UniversalId::String(s) => s.is_empty(),
        }
    }

    /// JSON form used when binding the identity as a query parameter
    pub fn to_value(&self) -> Value {
        match self {
            UniversalId::Numeric(n) => Value::from(*n),
            UniversalId::Uuid(uuid) => Value::String(uuid.to_string()),
            UniversalId::String(s) => Value::String(s.clone()),
        }
    }
}

impl Display for UniversalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniversalId::Numeric(n) => write!(f, "{}", n),
            UniversalId::Uuid(uuid) => write!(f, "{}", uuid),
            UniversalId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for UniversalId {
    fn from(id: i32) -> Self {
        UniversalId::Numeric(id as i64)
    }
}

impl From<i64> for UniversalId {
    fn from(id: i64) -> Self {
        UniversalId::Numeric(id)
    }
}

impl From<Uuid> for UniversalId {
    fn from(id: Uuid) -> Self {
        UniversalId::Uuid(id)
    }
}

impl From<String> for UniversalId {
    fn from(id: String) -> Self {
        UniversalId::String(id)
    }
}

impl From<&str> for UniversalId {
    fn from(id: &str) -> Self {
        UniversalId::String(id.to_string())
    }
}

/// Trait for types that can provide a universal ID
pub trait HasUniversalId {
    fn universal_id(&self) -> UniversalId;

    fn is_default_id(&self) -> bool {
        self.universal_id().is_default()
    }
}

impl HasUniversalId for i32 {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Numeric(*self as i64)
    }
}

impl HasUniversalId for i64 {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Numeric(*self)
    }
}

impl HasUniversalId for u32 {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Numeric(*self as i64)
    }
}

impl HasUniversalId for Uuid {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Uuid(*self)
    }
}

impl HasUniversalId for String {
    fn universal_id(&self) -> UniversalId {
        UniversalId::String(self.clone())
    }
}
