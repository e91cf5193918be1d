//! Confirmation gate for mutating cmdlets.

use crate::Result;
use std::fmt;
use std::str::FromStr;

/// How much damage a cmdlet can do.
///
/// Ordered so that `High > Medium > Low > None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ConfirmImpact {
    /// Read-only; never prompts.
    #[default]
    None,
    /// Minor changes.
    Low,
    /// Associations and other reversible changes.
    Medium,
    /// Deletions.
    High,
}

impl ConfirmImpact {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Returns `true` if a cmdlet with this impact must be confirmed when
    /// the confirmation threshold is `threshold`.
    ///
    /// # Examples
    ///
    /// ```
    /// use loc_core::ConfirmImpact;
    ///
    /// assert!(ConfirmImpact::High.requires_confirmation(ConfirmImpact::Medium));
    /// assert!(ConfirmImpact::Medium.requires_confirmation(ConfirmImpact::Medium));
    /// assert!(!ConfirmImpact::Low.requires_confirmation(ConfirmImpact::Medium));
    /// assert!(!ConfirmImpact::None.requires_confirmation(ConfirmImpact::None));
    /// ```
    #[must_use]
    pub fn requires_confirmation(self, threshold: Self) -> bool {
        self != Self::None && self >= threshold
    }
}

impl fmt::Display for ConfirmImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfirmImpact {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(crate::Error::InvalidArgument(format!(
                "invalid confirm impact: '{s}' (expected: none, low, medium, or high)"
            ))),
        }
    }
}

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    /// Cmdlet name, e.g. `Remove-LOCGeofence`.
    pub cmdlet: String,
    /// Service operation, e.g. `BatchDeleteGeofence`.
    pub operation: String,
    /// Rendered value of the primary parameter, e.g. the collection name.
    pub target: String,
    /// Impact of the cmdlet.
    pub impact: ConfirmImpact,
}

impl ConfirmationRequest {
    /// Renders the prompt shown to the user.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "Performing the operation \"{} ({})\" on target \"{}\". Continue?",
            self.cmdlet, self.operation, self.target
        )
    }
}

/// Asks for confirmation before a mutating call.
pub trait Confirmer: Send + Sync {
    /// Returns `true` to proceed, `false` to abort silently.
    ///
    /// # Errors
    ///
    /// Returns an error if the question could not be asked at all.
    fn confirm(&self, request: &ConfirmationRequest) -> Result<bool>;
}

/// A confirmer with a fixed answer.
///
/// `AutoConfirm(true)` approves everything, `AutoConfirm(false)` declines
/// everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl Confirmer for AutoConfirm {
    fn confirm(&self, _request: &ConfirmationRequest) -> Result<bool> {
        Ok(self.0)
    }
}
