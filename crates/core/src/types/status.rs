//! Lifecycle states for the shopping cart.

use serde::{Deserialize, Serialize};

/// Macro-state of a cart.
///
/// `Active` covers every cart that accepts adds and removes, empty or not.
/// `CheckingOut` is entered when checkout starts on a non-empty cart and
/// left once the delayed purchase step has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartPhase {
    #[default]
    Active,
    CheckingOut,
}

impl CartPhase {
    /// Whether a checkout is currently waiting on its completion step.
    #[must_use]
    pub const fn is_checking_out(&self) -> bool {
        matches!(self, Self::CheckingOut)
    }
}

impl std::fmt::Display for CartPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::CheckingOut => write!(f, "checking_out"),
        }
    }
}

impl std::str::FromStr for CartPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "checking_out" => Ok(Self::CheckingOut),
            _ => Err(format!("invalid cart phase: {s}")),
        }
    }
}
