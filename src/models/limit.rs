use std::num::NonZeroUsize;

use crate::error::{AppError, AppResult};

/// Parses a raw `limit` query value into a positive count
pub fn parse_limit(raw: &str) -> AppResult<NonZeroUsize> {
    raw.trim()
        .parse::<NonZeroUsize>()
        .map_err(|_| AppError::InvalidLimit(raw.to_string()))
}

/// Default and ceiling applied to caller-supplied result limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    default: NonZeroUsize,
    max: NonZeroUsize,
}

impl LimitPolicy {
    /// Builds a policy; a zero default or max is replaced with 1 and the
    /// default is never allowed to exceed the max
    pub fn new(default: usize, max: usize) -> Self {
        let max = NonZeroUsize::new(max).unwrap_or(NonZeroUsize::MIN);
        let default = NonZeroUsize::new(default)
            .unwrap_or(NonZeroUsize::MIN)
            .min(max);
        Self { default, max }
    }

    pub fn default_limit(&self) -> NonZeroUsize {
        self.default
    }

    pub fn max_limit(&self) -> NonZeroUsize {
        self.max
    }

    /// Resolves an optional raw value; missing, non-numeric or non-positive
    /// input falls back to the default, anything else is clamped to the max
    pub fn resolve(&self, raw: Option<&str>) -> NonZeroUsize {
        match raw.map(parse_limit) {
            Some(Ok(limit)) => limit.min(self.max),
            Some(Err(e)) => {
                tracing::debug!(error = %e, default = self.default.get(), "Falling back to default limit");
                self.default
            }
            None => self.default,
        }
    }
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self::new(20, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit("15").unwrap().get(), 15);
        assert_eq!(parse_limit(" 3 ").unwrap().get(), 3);
        assert!(matches!(parse_limit("0"), Err(AppError::InvalidLimit(_))));
        assert!(matches!(parse_limit("-4"), Err(AppError::InvalidLimit(_))));
        assert!(matches!(parse_limit("ten"), Err(AppError::InvalidLimit(_))));
    }

    #[test]
    fn test_resolve_defaults_on_bad_input() {
        let policy = LimitPolicy::default();
        assert_eq!(policy.resolve(None).get(), 20);
        assert_eq!(policy.resolve(Some("abc")).get(), 20);
        assert_eq!(policy.resolve(Some("0")).get(), 20);
        assert_eq!(policy.resolve(Some("-1")).get(), 20);
    }

    #[test]
    fn test_resolve_clamps_to_max() {
        let policy = LimitPolicy::new(20, 50);
        assert_eq!(policy.resolve(Some("7")).get(), 7);
        assert_eq!(policy.resolve(Some("5000")).get(), 50);
    }

    #[test]
    fn test_new_keeps_default_within_max() {
        let policy = LimitPolicy::new(200, 50);
        assert_eq!(policy.default_limit().get(), 50);

        let policy = LimitPolicy::new(0, 0);
        assert_eq!(policy.default_limit().get(), 1);
    }
}
