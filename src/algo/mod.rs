pub mod linear;
pub mod q;
pub mod q_table;
pub mod value_iteration;

pub use linear::{FeatureExtractor, Features, IdentityExtractor, LinearQ, MissingWeights, WeightVector};
pub use q::{ApproximateQAgent, QAgent, QAgentConfig, QEstimator, QLearningAgent};
pub use q_table::QTable;
pub use value_iteration::{ValueIterationAgent, ValueIterationConfig};
