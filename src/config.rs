//! Table configuration: initial size, growth trigger and growth step.

use crate::error::TableError;

/// Buckets allocated by [`TableConfig::default`].
pub const DEFAULT_INITIAL_BUCKETS: usize = 10;
/// Growth is triggered when `unique_entries / bucket_count` exceeds this.
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.75;
/// Bucket count multiplier applied on each growth event.
pub const DEFAULT_GROWTH_FACTOR: usize = 3;

/// Fixed parameters of a [`FrequencyTable`](crate::FrequencyTable).
///
/// All three are set once at construction; the table never changes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub initial_bucket_count: usize,
    pub load_factor_threshold: f64,
    pub growth_factor: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_bucket_count: DEFAULT_INITIAL_BUCKETS,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_bucket_count(mut self, n: usize) -> Self {
        self.initial_bucket_count = n;
        self
    }

    pub fn with_load_factor_threshold(mut self, threshold: f64) -> Self {
        self.load_factor_threshold = threshold;
        self
    }

    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    /// Reject parameters under which the table cannot keep its invariants.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.initial_bucket_count == 0 {
            return Err(TableError::invalid("initial_bucket_count must be >= 1"));
        }
        if !self.load_factor_threshold.is_finite() || self.load_factor_threshold <= 0.0 {
            return Err(TableError::invalid(format!(
                "load_factor_threshold must be finite and > 0, got {}",
                self.load_factor_threshold
            )));
        }
        if self.growth_factor < 2 {
            return Err(TableError::invalid(format!(
                "growth_factor must be >= 2, got {}",
                self.growth_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = TableConfig::default();
        assert_eq!(c.initial_bucket_count, 10);
        assert_eq!(c.load_factor_threshold, 0.75);
        assert_eq!(c.growth_factor, 3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_buckets_rejected() {
        let err = TableConfig::new()
            .with_initial_bucket_count(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("initial_bucket_count"));
    }

    #[test]
    fn bad_threshold_rejected() {
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let r = TableConfig::new().with_load_factor_threshold(t).validate();
            assert!(
                matches!(r, Err(TableError::InvalidConfiguration(_))),
                "threshold {t} should be rejected"
            );
        }
    }

    #[test]
    fn growth_factor_below_two_rejected() {
        for f in [0, 1] {
            let r = TableConfig::new().with_growth_factor(f).validate();
            assert!(matches!(r, Err(TableError::InvalidConfiguration(_))));
        }
        assert!(TableConfig::new().with_growth_factor(2).validate().is_ok());
    }
}
