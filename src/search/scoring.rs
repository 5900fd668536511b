//! BM25 relevance scoring.
//!
//! Weights are computed once at build time and stored on each posting, so a query
//! only has to sum them.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Saturation (`k1`) and length-normalization (`b`) parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Params {
    pub const K1_RANGE: (f64, f64) = (0.0, 5.0);
    pub const B_RANGE: (f64, f64) = (0.0, 1.0);

    /// Rejects out-of-range values before any document is indexed.
    pub fn new(k1: f64, b: f64) -> Result<Self, ConfigError> {
        check_range("k1", k1, Self::K1_RANGE)?;
        check_range("b", b, Self::B_RANGE)?;
        Ok(Self { k1, b })
    }

    /// Term-frequency component with length normalization.
    ///
    /// `tf * (k1 + 1) / (tf + k1 * (1 - b + b * len / avg_len))`
    pub fn tf_weight(&self, tf: u32, field_len: u32, avg_field_len: f64) -> f64 {
        if tf == 0 {
            return 0.0;
        }
        let tf = f64::from(tf);
        let ratio = if avg_field_len > 0.0 {
            f64::from(field_len) / avg_field_len
        } else {
            1.0
        };
        let norm = self.k1 * (1.0 - self.b + self.b * ratio);
        tf * (self.k1 + 1.0) / (tf + norm)
    }
}

pub(crate) fn check_range(name: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// Inverse document frequency, always positive.
///
/// `ln(1 + (N - df + 0.5) / (df + 0.5))`
pub fn idf(total_docs: usize, doc_freq: usize) -> f64 {
    let n = total_docs as f64;
    let df = doc_freq as f64;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// Rounds a score to three decimals so serialized indexes stay compact and stable.
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
