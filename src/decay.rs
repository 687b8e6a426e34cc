use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f64) -> f64;

    /// Lowest and highest values taken for `t >= 0`
    fn bounds(&self) -> (f64, f64);
}

/// v(t) = v<sub>f</sub> + (v<sub>i</sub> - v<sub>f</sub>) * e<sup>-rt</sup>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExponentialParams")]
pub struct Exponential {
    rate: f64,
    vi: f64,
    vf: f64,
}

/// Unchecked form of [`Exponential`] read from model files
#[derive(Deserialize)]
struct ExponentialParams {
    rate: f64,
    vi: f64,
    vf: f64,
}

impl TryFrom<ExponentialParams> for Exponential {
    type Error = Error;

    fn try_from(ExponentialParams { rate, vi, vf }: ExponentialParams) -> Result<Self> {
        Self::new(rate, vi, vf)
    }
}

impl Exponential {
    /// **Errors** unless `vi - vf` has the same sign as `rate`
    pub fn new(rate: f64, vi: f64, vf: f64) -> Result<Self> {
        if (rate >= 0.0 && vi > vf) || (rate < 0.0 && vi < vf) {
            Ok(Self { rate, vi, vf })
        } else {
            Err(Error::InvalidConfig(format!(
                "decay from {vi} to {vf} does not match the sign of rate {rate}"
            )))
        }
    }
}

impl Decay for Exponential {
    fn evaluate(&self, t: f64) -> f64 {
        let &Self { rate, vi, vf } = self;
        vf + (vi - vf) * (-rate * t).exp()
    }

    fn bounds(&self) -> (f64, f64) {
        (self.vi.min(self.vf), self.vi.max(self.vf))
    }
}
