//! Grid world parameters that steer value iteration toward particular policies
//!
//! Each preset was found by hand. Planning over the matching grid with the preset produces
//! the described behaviour from the start cell.

use crate::{
    algo::{ValueIterationAgent, ValueIterationConfig},
    gym::GridWorld,
    Result,
};

/// Discount, noise and living reward for planning over a [`GridWorld`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParameters {
    pub discount: f64,
    pub noise: f64,
    pub living_reward: f64,
}

impl GridParameters {
    /// Run value iteration over `grid` with these parameters
    pub fn plan(&self, grid: GridWorld, iterations: u32) -> Result<ValueIterationAgent<GridWorld>> {
        let grid = grid
            .with_noise(self.noise)?
            .with_living_reward(self.living_reward);
        ValueIterationAgent::new(
            grid,
            ValueIterationConfig {
                discount: self.discount,
                iterations,
            },
        )
    }
}

/// Low enough noise that crossing [`GridWorld::bridge`] beats the close exit
pub fn bridge_crossing() -> GridParameters {
    GridParameters {
        discount: 0.9,
        noise: 0.01,
        living_reward: 0.0,
    }
}

/// The policies reachable on [`GridWorld::discount`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountRegime {
    /// Take the +1 exit along the cliff
    CloseRiskCliff,
    /// Take the +1 exit by the upper route
    CloseAvoidCliff,
    /// Take the +10 exit along the cliff
    DistantRiskCliff,
    /// Take the +10 exit by the upper route
    DistantAvoidCliff,
    /// Never leave the grid
    AvoidExits,
}

impl DiscountRegime {
    pub const ALL: [DiscountRegime; 5] = [
        DiscountRegime::CloseRiskCliff,
        DiscountRegime::CloseAvoidCliff,
        DiscountRegime::DistantRiskCliff,
        DiscountRegime::DistantAvoidCliff,
        DiscountRegime::AvoidExits,
    ];

    pub fn parameters(self) -> GridParameters {
        let (discount, noise, living_reward) = match self {
            DiscountRegime::CloseRiskCliff => (0.9, 0.2, -2.0),
            DiscountRegime::CloseAvoidCliff => (0.3, 0.2, 0.0),
            DiscountRegime::DistantRiskCliff => (0.9, 0.2, -1.0),
            DiscountRegime::DistantAvoidCliff => (0.9, 0.2, 0.0),
            DiscountRegime::AvoidExits => (0.9, 0.2, 1.0),
        };
        GridParameters {
            discount,
            noise,
            living_reward,
        }
    }
}

/// Exploration and learning rates for a Q-learning agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningParameters {
    pub epsilon: f64,
    pub alpha: f64,
}

/// Rates that make Q-learning find the bridge crossing within 50 episodes
///
/// There are none: the far exit is too rarely reached by exploration in so few episodes.
pub fn bridge_learning() -> Option<LearningParameters> {
    None
}
