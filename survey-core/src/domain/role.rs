//! Respondent roles and question audiences

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a distribution link (and every session started from it) is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Nurse,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Nurse => "nurse",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nurse" => Ok(Role::Nurse),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Which roles a question is shown to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    All,
    Nurse,
    Doctor,
}

impl Audience {
    /// Whether a respondent with `role` should see questions for this audience
    pub fn includes(&self, role: Role) -> bool {
        match self {
            Audience::All => true,
            Audience::Nurse => role == Role::Nurse,
            Audience::Doctor => role == Role::Doctor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Nurse => "nurse",
            Audience::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "both" => Ok(Audience::All),
            "nurse" => Ok(Audience::Nurse),
            "doctor" => Ok(Audience::Doctor),
            other => Err(format!("unknown audience '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_includes() {
        assert!(Audience::All.includes(Role::Nurse));
        assert!(Audience::All.includes(Role::Doctor));
        assert!(Audience::Nurse.includes(Role::Nurse));
        assert!(!Audience::Nurse.includes(Role::Doctor));
        assert!(!Audience::Doctor.includes(Role::Nurse));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Nurse".parse::<Role>().unwrap(), Role::Nurse);
        assert_eq!(" doctor ".parse::<Role>().unwrap(), Role::Doctor);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!("both".parse::<Audience>().unwrap(), Audience::All);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Doctor).unwrap(), "\"doctor\"");
        assert_eq!(serde_json::to_string(&Audience::All).unwrap(), "\"all\"");
    }
}
