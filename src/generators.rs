use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};

use crate::error::Result;
use crate::models::{validate_distribution, DistributionConfig};

/// Sampler for non-negative durations (service times, inter-arrival gaps).
///
/// Distribution-specific correctness rules live inside the concrete
/// sampler, not in the service point: the normal sampler rejects
/// non-positive draws so a sampled service time can never stall a point.
pub trait DurationSampler: Send {
    fn sample(&mut self) -> f64;
    fn set_seed(&mut self, seed: u64);
    /// Re-seeds from OS entropy.
    fn reseed(&mut self);
}

/// Builds the sampler described by `config`, validating its parameters
/// first. `seed` of `None` seeds from entropy.
pub fn build_sampler(
    context: &str,
    config: &DistributionConfig,
    seed: Option<u64>,
) -> Result<Box<dyn DurationSampler>> {
    validate_distribution(context, config)?;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(match *config {
        DistributionConfig::Exponential { mean } => Box::new(ExponentialSampler {
            dist: Exp::new(1.0 / mean).expect("exponential mean validated > 0"),
            rng,
        }),
        DistributionConfig::Normal { mean, variance } => Box::new(PositiveNormalSampler {
            dist: Normal::new(mean, variance.sqrt())
                .expect("normal parameters validated finite"),
            rng,
        }),
        DistributionConfig::Uniform { min, max } => Box::new(UniformSampler { min, max, rng }),
        DistributionConfig::Constant { value } => Box::new(ConstantSampler { value }),
    })
}

/// Exponentially distributed durations with the given mean.
pub struct ExponentialSampler {
    dist: Exp<f64>,
    rng: StdRng,
}

impl ExponentialSampler {
    pub fn new(mean: f64, seed: u64) -> Self {
        Self {
            dist: Exp::new(1.0 / mean).expect("exponential mean validated > 0"),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DurationSampler for ExponentialSampler {
    fn sample(&mut self) -> f64 {
        self.dist.sample(&mut self.rng)
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn reseed(&mut self) {
        self.rng = StdRng::from_entropy();
    }
}

/// Normally distributed durations, resampling until the draw is strictly
/// positive.
pub struct PositiveNormalSampler {
    dist: Normal<f64>,
    rng: StdRng,
}

impl PositiveNormalSampler {
    pub fn new(mean: f64, variance: f64, seed: u64) -> Self {
        Self {
            dist: Normal::new(mean, variance.sqrt()).expect("normal parameters validated finite"),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DurationSampler for PositiveNormalSampler {
    fn sample(&mut self) -> f64 {
        loop {
            let value = self.dist.sample(&mut self.rng);
            if value > 0.0 {
                return value;
            }
        }
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn reseed(&mut self) {
        self.rng = StdRng::from_entropy();
    }
}

/// Uniformly distributed durations over `[min, max)`.
pub struct UniformSampler {
    min: f64,
    max: f64,
    rng: StdRng,
}

impl UniformSampler {
    pub fn new(min: f64, max: f64, seed: u64) -> Self {
        Self {
            min,
            max,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DurationSampler for UniformSampler {
    fn sample(&mut self) -> f64 {
        self.rng.gen_range(self.min..self.max)
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn reseed(&mut self) {
        self.rng = StdRng::from_entropy();
    }
}

/// Fixed duration, useful for deterministic tests and paced demos.
pub struct ConstantSampler {
    value: f64,
}

impl ConstantSampler {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl DurationSampler for ConstantSampler {
    fn sample(&mut self) -> f64 {
        self.value
    }

    fn set_seed(&mut self, _seed: u64) {}

    fn reseed(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_samples_are_non_negative() {
        let mut sampler = ExponentialSampler::new(4.0, 1);
        for _ in 0..1000 {
            assert!(sampler.sample() >= 0.0);
        }
    }

    #[test]
    fn positive_normal_rejects_non_positive_draws() {
        // Mean close to zero with a wide spread forces the rejection path.
        let mut sampler = PositiveNormalSampler::new(0.1, 4.0, 7);
        for _ in 0..1000 {
            assert!(sampler.sample() > 0.0);
        }
    }

    #[test]
    fn uniform_stays_within_bounds() {
        let mut sampler = UniformSampler::new(1.0, 2.5, 3);
        for _ in 0..1000 {
            let value = sampler.sample();
            assert!((1.0..2.5).contains(&value));
        }
    }

    #[test]
    fn constant_always_returns_value() {
        let mut sampler = ConstantSampler::new(4.0);
        assert_eq!(sampler.sample(), 4.0);
        assert_eq!(sampler.sample(), 4.0);
    }

    #[test]
    fn same_seed_yields_same_stream() {
        let mut a = ExponentialSampler::new(3.0, 42);
        let mut b = ExponentialSampler::new(3.0, 42);
        for _ in 0..100 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn set_seed_restarts_the_stream() {
        let mut sampler = PositiveNormalSampler::new(4.5, 1.2, 5);
        let first: Vec<f64> = (0..10).map(|_| sampler.sample()).collect();
        sampler.set_seed(5);
        let second: Vec<f64> = (0..10).map(|_| sampler.sample()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn build_sampler_rejects_invalid_parameters() {
        let bad_mean = DistributionConfig::Exponential { mean: 0.0 };
        assert!(build_sampler("cashier", &bad_mean, Some(1)).is_err());

        let bad_bounds = DistributionConfig::Uniform { min: 2.5, max: 1.0 };
        assert!(build_sampler("shelf", &bad_bounds, Some(1)).is_err());

        let bad_constant = DistributionConfig::Constant { value: -1.0 };
        assert!(build_sampler("delivery", &bad_constant, Some(1)).is_err());
    }
}
