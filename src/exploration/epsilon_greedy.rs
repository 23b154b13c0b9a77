use rand::{thread_rng, Rng};

use crate::{
    decay::{self, Decay},
    ensure_interval, Result,
};

use super::Choice;

/// Epsilon greedy exploration policy with a time-decaying epsilon threshold
///
/// Epsilon is the probability of exploring. The schedule is evaluated at the current
/// episode, so a [`decay::Constant`] gives the classic fixed-rate policy.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl EpsilonGreedy<decay::Constant> {
    /// Fixed exploration rate
    ///
    /// **Errors** if `epsilon` is not in the interval `[0,1]`
    pub fn constant(epsilon: f64) -> Result<Self> {
        ensure_interval!(epsilon, 0.0, 1.0);
        Ok(Self::new(decay::Constant::new(epsilon)))
    }
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Exploration probability at `episode`, clamped to `[0,1]`
    pub fn epsilon(&self, episode: u32) -> f64 {
        self.epsilon.evaluate(episode as f64).clamp(0.0, 1.0)
    }

    /// Invoke epsilon greedy policy for current episode
    pub fn choose(&self, episode: u32) -> Choice {
        if thread_rng().gen::<f64>() < self.epsilon(episode) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_are_deterministic() {
        let never = EpsilonGreedy::constant(0.0).unwrap();
        let always = EpsilonGreedy::constant(1.0).unwrap();
        for episode in 0..200 {
            assert_eq!(never.choose(episode), Choice::Exploit);
            assert_eq!(always.choose(episode), Choice::Explore);
        }
    }

    #[test]
    fn decays_with_episodes() {
        let policy = EpsilonGreedy::new(decay::Linear::new(0.1, 1.0, 0.0).unwrap());
        assert_eq!(policy.epsilon(0), 1.0);
        assert!((policy.epsilon(5) - 0.5).abs() < 1e-12);
        assert_eq!(policy.epsilon(50), 0.0);
    }

    #[test]
    fn rejects_invalid_rate() {
        assert!(EpsilonGreedy::constant(1.5).is_err());
    }
}
