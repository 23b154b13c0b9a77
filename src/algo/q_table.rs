use std::collections::HashMap;

use log::trace;

use crate::{env::Hashable, Result};

use super::q::QEstimator;

/// A sparse table of Q values keyed by `(state, action)`
///
/// Only pairs that have been learned from are stored. Reading any other pair gives 0 and
/// never inserts.
#[derive(Debug, Clone)]
pub struct QTable<S, A> {
    table: HashMap<(S, A), f64>,
}

impl<S: Hashable, A: Hashable> Default for QTable<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Hashable, A: Hashable> QTable<S, A> {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Stored Q value, or 0 if the pair has never been learned from
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.table
            .get(&(state.clone(), action.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set(&mut self, state: S, action: A, value: f64) {
        self.table.insert((state, action), value);
    }

    /// Number of stored pairs
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(S, A), &f64)> {
        self.table.iter()
    }
}

impl<S: Hashable, A: Hashable> QEstimator<S, A> for QTable<S, A> {
    fn q_value(&self, state: &S, action: &A) -> f64 {
        self.get(state, action)
    }

    /// Blend the stored estimate with the target: `Q ← (1-α)·Q + α·target`
    fn learn(&mut self, state: &S, action: &A, target: f64, alpha: f64) -> Result<()> {
        let q_value = self.get(state, action);
        let weighted_q_value = (1.0 - alpha) * q_value + alpha * target;
        trace!("q-table update: target {target:.4}, {q_value:.4} -> {weighted_q_value:.4}");

        self.set(state.clone(), action.clone(), weighted_q_value);
        Ok(())
    }
}
