//! Steps of the "sell your car" wizard.
//!
//! The wizard is linear: Vehicle → Details → Features → Images → Review.
//! Moving forward is gated by the session (see
//! [`SellSession::next_step`](crate::session::SellSession::next_step));
//! moving back never is.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Vehicle,
    Details,
    Features,
    Images,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Vehicle,
        WizardStep::Details,
        WizardStep::Features,
        WizardStep::Images,
        WizardStep::Review,
    ];

    pub fn next(self) -> Option<Self> {
        let pos = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(pos + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        let pos = Self::ALL.iter().position(|s| *s == self)?;
        pos.checked_sub(1).and_then(|p| Self::ALL.get(p).copied())
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Vehicle => "vehicle",
            WizardStep::Details => "details",
            WizardStep::Features => "features",
            WizardStep::Images => "images",
            WizardStep::Review => "review",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_linear() {
        assert_eq!(WizardStep::Vehicle.next(), Some(WizardStep::Details));
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::Vehicle.previous(), None);
        assert_eq!(WizardStep::Review.previous(), Some(WizardStep::Images));
        assert!(WizardStep::Review.is_last());
    }
}
