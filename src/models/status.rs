//! Externally visible unit status.

use serde::Serialize;
use std::fmt;

/// Unit health as reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum UnitStatus {
    Active,
    Blocked(String),
    Maintenance(Option<String>),
}

impl UnitStatus {
    pub fn blocked(reason: impl Into<String>) -> Self {
        UnitStatus::Blocked(reason.into())
    }

    pub fn maintenance(reason: impl Into<String>) -> Self {
        UnitStatus::Maintenance(Some(reason.into()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnitStatus::Active => "active",
            UnitStatus::Blocked(_) => "blocked",
            UnitStatus::Maintenance(_) => "maintenance",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            UnitStatus::Active => "",
            UnitStatus::Blocked(reason) => reason,
            UnitStatus::Maintenance(reason) => reason.as_deref().unwrap_or(""),
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        if message.is_empty() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}: {}", self.name(), message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(UnitStatus::Active.to_string(), "active");
        assert_eq!(
            UnitStatus::blocked("Missing config-file in config").to_string(),
            "blocked: Missing config-file in config"
        );
        assert_eq!(UnitStatus::Maintenance(None).to_string(), "maintenance");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&UnitStatus::blocked("x")).unwrap();
        assert_eq!(json, r#"{"status":"blocked","message":"x"}"#);
    }
}
