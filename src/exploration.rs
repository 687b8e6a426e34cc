use rand::Rng;

use crate::{assert_interval, decay::Decay, Error, Result};

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    ///
    /// **Errors** if the decay strategy can leave the interval `[0,1]`
    pub fn new(decay: D) -> Result<Self> {
        let (low, high) = decay.bounds();
        if low < 0.0 || high > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "epsilon must stay in [0, 1], the schedule spans [{low}, {high}]"
            )));
        }
        Ok(Self { epsilon: decay })
    }

    pub fn decay(&self) -> &D {
        &self.epsilon
    }

    /// Epsilon after `t` timesteps
    ///
    /// **Panics** if the decay strategy leaves the interval `[0,1]`
    pub fn epsilon(&self, t: u64) -> f64 {
        let epsilon = self.epsilon.evaluate(t as f64);
        assert_interval!(epsilon, 0.0, 1.0);
        epsilon
    }

    /// Invoke epsilon greedy policy at timestep `t`
    pub fn choose<R: Rng + ?Sized>(&self, t: u64, rng: &mut R) -> Choice {
        if rng.gen::<f64>() >= self.epsilon(t) {
            Choice::Exploit
        } else {
            Choice::Explore
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::decay::Exponential;

    #[test]
    fn epsilon_greedy_follows_decay() {
        let policy = EpsilonGreedy::new(Exponential::new(1.0, 1.0, 0.0).unwrap()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(policy.epsilon(0), 1.0);
        assert!(
            (0..100).all(|_| policy.choose(0, &mut rng) == Choice::Explore),
            "Epsilon 1 always explores"
        );
        assert!(
            (0..100).all(|_| policy.choose(100, &mut rng) == Choice::Exploit),
            "Epsilon ~0 always exploits"
        );
    }

    #[test]
    fn epsilon_outside_unit_interval_rejected() {
        assert!(EpsilonGreedy::new(Exponential::new(1e-3, 5.0, 0.05).unwrap()).is_err());
        assert!(EpsilonGreedy::new(Exponential::new(-1e-3, 0.5, 1.5).unwrap()).is_err());
        assert!(
            EpsilonGreedy::new(Exponential::new(1e-3, 1.0, 0.0).unwrap()).is_ok(),
            "Bounds are inclusive"
        );
    }
}
