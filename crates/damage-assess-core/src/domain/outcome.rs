//! Explicit success-or-degraded results for pipeline stages.

use serde::Serialize;

/// Why a stage returned a fallback value instead of a computed one.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DegradeReason {
    /// An image could not be read or decoded.
    #[error("image unreadable: {0}")]
    UnreadableImage(String),
    /// There was no image to analyze.
    #[error("no images supplied")]
    NoImages,
    /// The external completion service is not configured.
    #[error("completion service unavailable")]
    ServiceUnavailable,
    /// The external completion call failed.
    #[error("completion call failed: {0}")]
    CallFailed(String),
    /// The completion response could not be interpreted.
    #[error("unparseable response: {0}")]
    ParseFailed(String),
    /// The severity model is not loaded.
    #[error("severity model unavailable: {0}")]
    ModelUnavailable(String),
}

/// A stage result that always carries a value, tagged with whether it is degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The value was computed normally.
    Ok(T),
    /// The value is a documented fallback.
    Degraded(T, DegradeReason),
}

impl<T> Outcome<T> {
    /// Returns true for `Degraded`.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(..))
    }

    /// Borrows the carried value.
    #[must_use]
    pub const fn value(&self) -> &T {
        match self {
            Self::Ok(v) | Self::Degraded(v, _) => v,
        }
    }

    /// Returns the degrade reason, if any.
    #[must_use]
    pub const fn reason(&self) -> Option<&DegradeReason> {
        match self {
            Self::Ok(_) => None,
            Self::Degraded(_, r) => Some(r),
        }
    }

    /// Consumes the outcome and returns the carried value.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Ok(v) | Self::Degraded(v, _) => v,
        }
    }

    /// Maps the carried value, keeping the tag.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Ok(v) => Outcome::Ok(f(v)),
            Self::Degraded(v, r) => Outcome::Degraded(f(v), r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let ok: Outcome<u8> = Outcome::Ok(1);
        assert!(!ok.is_degraded());
        assert!(ok.reason().is_none());
        assert_eq!(*ok.value(), 1);

        let degraded = Outcome::Degraded(2u8, DegradeReason::NoImages);
        assert!(degraded.is_degraded());
        assert_eq!(degraded.reason(), Some(&DegradeReason::NoImages));
        assert_eq!(degraded.map(|v| v * 2).into_inner(), 4);
    }

    #[test]
    fn test_degrade_reason_display() {
        let reason = DegradeReason::CallFailed("timeout".into());
        assert_eq!(reason.to_string(), "completion call failed: timeout");
    }
}
