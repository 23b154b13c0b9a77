//! Value iteration and Q-learning over user supplied Markov decision processes
//!
//! Planning agents ([`algo::ValueIterationAgent`]) consume a fully known [`env::Mdp`].
//! Learning agents ([`algo::QLearningAgent`], [`algo::ApproximateQAgent`]) only need the
//! legal actions of each state ([`env::ActionSpace`]) and learn from transitions reported by
//! a driving loop the caller owns.
//!
//! Agents are not synchronized internally. Share one between threads only behind a lock.

/// The agent interface exposed to driving loops
pub mod agent;

/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Environment interfaces consumed by agents
pub mod env;

/// Exploration policies
pub mod exploration;

/// Grid world models
#[cfg(feature = "gym")]
pub mod gym;

/// Tuned grid world parameters
#[cfg(feature = "gym")]
pub mod analysis;

mod error;
mod util;

pub use error::{Error, Result};
