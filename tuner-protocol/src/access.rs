//! Capability check performed before a settings builder is handed out.

use crate::error::AccessError;

/// Capability required to configure tuner frontends.
pub const TUNER_ACCESS_CAPABILITY: &str = "tuner.access";

/// Source of truth for which capabilities the caller holds.
pub trait PermissionCheck {
    /// Returns true if the caller holds `capability`.
    fn has_capability(&self, capability: &str) -> bool;
}

/// Proof that the tuner-access check passed.
///
/// Only [`TunerAccess::acquire`] creates one; settings builders take a
/// reference to it instead of looking up permissions themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunerAccess {
    _private: (),
}

impl TunerAccess {
    /// Check the tuner-access capability once and return the token.
    pub fn acquire<P: PermissionCheck + ?Sized>(checker: &P) -> Result<Self, AccessError> {
        if checker.has_capability(TUNER_ACCESS_CAPABILITY) {
            Ok(Self { _private: () })
        } else {
            Err(AccessError::PermissionDenied {
                capability: TUNER_ACCESS_CAPABILITY.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(bool);

    impl PermissionCheck for Fixed {
        fn has_capability(&self, capability: &str) -> bool {
            self.0 && capability == TUNER_ACCESS_CAPABILITY
        }
    }

    #[test]
    fn test_acquire_granted() {
        assert!(TunerAccess::acquire(&Fixed(true)).is_ok());
    }

    #[test]
    fn test_acquire_denied() {
        let err = TunerAccess::acquire(&Fixed(false)).unwrap_err();
        assert_eq!(
            err,
            AccessError::PermissionDenied {
                capability: "tuner.access".to_string()
            }
        );
    }
}
