//! Terminal outcome of a verification run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state outcome of a verification run.
///
/// Transitions only `Pending → Granted` or `Pending → Denied`. A terminal
/// outcome never reverses; the sequencer enforces this by only resolving a
/// pending run once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The run has not resolved yet.
    #[default]
    Pending,
    /// Access granted.
    Granted,
    /// Access denied. A normal terminal state, not an error.
    Denied,
}

impl Outcome {
    /// The terminal outcome for a granted/denied decision.
    pub fn resolved(granted: bool) -> Self {
        if granted {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// `Some(true)` for granted, `Some(false)` for denied, `None` while pending.
    pub fn granted(&self) -> Option<bool> {
        match self {
            Self::Pending => None,
            Self::Granted => Some(true),
            Self::Denied => Some(false),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Granted => "granted",
            Self::Denied => "denied",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_maps_bool_to_terminal_state() {
        assert_eq!(Outcome::resolved(true), Outcome::Granted);
        assert_eq!(Outcome::resolved(false), Outcome::Denied);
    }

    #[test]
    fn pending_is_not_terminal() {
        assert!(Outcome::Pending.is_pending());
        assert!(!Outcome::Pending.is_terminal());
        assert_eq!(Outcome::Pending.granted(), None);
    }

    #[test]
    fn terminal_outcomes_expose_their_decision() {
        assert_eq!(Outcome::Granted.granted(), Some(true));
        assert_eq!(Outcome::Denied.granted(), Some(false));
        assert!(Outcome::Granted.is_terminal());
        assert!(Outcome::Denied.is_terminal());
    }
}
