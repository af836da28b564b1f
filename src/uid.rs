use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Random unique identifier of a shared record (e.g. a shade construction).
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct UID(String);

impl UID {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UID {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for UID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unique() {
        let a = UID::new();
        let b = UID::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_from_str() {
        let uid = UID::from("shade-construction");
        assert_eq!(uid.to_string(), "shade-construction");
    }
}
