//! Laplace noise generation
//!
//! Inverse-CDF sampling of `Laplace(location, scale)` and the per-record
//! noise sources built on it

use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Distribution;

use crate::params::NoiseParams;
use crate::DpError;

/// Laplace distribution with density `(1/2b) * exp(-|x - location| / b)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Laplace {
    location: f64,
    scale: f64,
}

impl Laplace {
    /// Create a Laplace distribution. `scale` must be finite and `>= 0`;
    /// a zero scale is the point mass at `location`.
    pub fn new(location: f64, scale: f64) -> Result<Self, DpError> {
        if !location.is_finite() {
            return Err(DpError::InvalidParameter {
                name: "location",
                value: location,
                reason: "must be finite",
            });
        }
        if !scale.is_finite() || scale < 0.0 {
            return Err(DpError::InvalidParameter {
                name: "scale",
                value: scale,
                reason: "must be a finite, non-negative number",
            });
        }
        Ok(Self { location, scale })
    }

    /// Zero-centred distribution calibrated from noise parameters
    pub fn centered(params: &NoiseParams) -> Self {
        // NoiseParams::new rejects any non-finite or negative scale
        Self {
            location: 0.0,
            scale: params.scale(),
        }
    }
}

impl Distribution<f64> for Laplace {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // u in the open interval (-0.5, 0.5), so 1 - 2|u| never reaches 0
        let u: f64 = rng.sample::<f64, _>(Open01) - 0.5;
        self.location - self.scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
    }
}

/// Draw one Laplace(0, sensitivity / epsilon) sample from `rng`.
///
/// Fails with [`DpError::InvalidParameter`] when `epsilon <= 0` (or the
/// sensitivity is negative) and consumes no randomness in that case.
pub fn sample_with<R: Rng + ?Sized>(
    rng: &mut R,
    sensitivity: f64,
    epsilon: f64,
) -> Result<f64, DpError> {
    let params = NoiseParams::new(sensitivity, epsilon)?;
    Ok(Laplace::new(0.0, params.scale())?.sample(rng))
}

/// [`sample_with`] using the thread-local generator
pub fn sample(sensitivity: f64, epsilon: f64) -> Result<f64, DpError> {
    sample_with(&mut rand::thread_rng(), sensitivity, epsilon)
}

/// Source of additive noise for one record.
///
/// Every call must be an independent draw.
pub trait NoiseSource {
    fn sample(&mut self, params: &NoiseParams) -> f64;
}

/// Laplace noise backed by an owned random generator
#[derive(Debug, Clone)]
pub struct LaplaceNoise<R = StdRng> {
    rng: R,
}

impl<R: Rng> LaplaceNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl LaplaceNoise<StdRng> {
    /// Reproducible noise stream
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Noise stream seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> NoiseSource for LaplaceNoise<R> {
    fn sample(&mut self, params: &NoiseParams) -> f64 {
        Laplace::centered(params).sample(&mut self.rng)
    }
}

impl<F> NoiseSource for F
where
    F: FnMut(&NoiseParams) -> f64,
{
    fn sample(&mut self, params: &NoiseParams) -> f64 {
        self(params)
    }
}
