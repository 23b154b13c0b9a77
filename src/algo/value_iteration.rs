use std::collections::HashMap;

use log::debug;

use crate::{
    agent::{Agent, Exp},
    ensure_interval,
    env::Mdp,
    Error, Result,
};

/// Configuration for the [`ValueIterationAgent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueIterationConfig {
    /// The discount factor - must be between 0 and 1
    ///
    /// **Default**: `0.9`
    pub discount: f64,
    /// Number of synchronous sweeps run at construction
    ///
    /// **Default**: `100`
    pub iterations: u32,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            iterations: 100,
        }
    }
}

/// A value iteration agent
///
/// Plans over a fully known [`Mdp`]. All sweeps run eagerly in [`ValueIterationAgent::new`],
/// after which the value table never changes. Each sweep builds a fresh table from the
/// previous one, so no state sees a value updated earlier in the same sweep.
///
/// Terminal states keep whatever value they had, which is 0 since every table starts empty.
pub struct ValueIterationAgent<M: Mdp> {
    mdp: M,
    values: HashMap<M::State, f64>,
    discount: f64,
}

impl<M: Mdp> ValueIterationAgent<M> {
    /// Run value iteration over `mdp`
    ///
    /// **Errors** if the discount is not in `[0,1]`, or if any query to `mdp` fails
    pub fn new(mdp: M, config: ValueIterationConfig) -> Result<Self> {
        ensure_interval!(config.discount, 0.0, 1.0);

        let mut agent = Self {
            mdp,
            values: HashMap::new(),
            discount: config.discount,
        };

        for k in 0..config.iterations {
            let next = agent.sweep()?;
            let delta = next
                .iter()
                .map(|(state, value)| (value - agent.value(state)).abs())
                .fold(0.0, f64::max);
            debug!(
                "value iteration sweep {}/{}: max change {delta:.6}",
                k + 1,
                config.iterations
            );
            agent.values = next;
        }

        Ok(agent)
    }

    /// One synchronous backup of every state against the current table
    fn sweep(&self) -> Result<HashMap<M::State, f64>> {
        let states = self.mdp.states().map_err(Error::mdp)?;
        let mut next = HashMap::with_capacity(states.len());

        for state in states {
            let value = match self.best_action(&state)? {
                Some((_, q_value)) => q_value,
                None => self.value(&state),
            };
            next.insert(state, value);
        }

        Ok(next)
    }

    /// The first action with the highest Q value, in the order the model lists them
    fn best_action(&self, state: &M::State) -> Result<Option<(M::Action, f64)>> {
        let mut best: Option<(M::Action, f64)> = None;
        for action in self.mdp.possible_actions(state).map_err(Error::mdp)? {
            let q_value = self.q_value(state, &action)?;
            if best.as_ref().map_or(true, |&(_, top)| q_value > top) {
                best = Some((action, q_value));
            }
        }

        Ok(best)
    }

    /// Value of `state` after the final sweep, 0 for states never visited
    pub fn value(&self, state: &M::State) -> f64 {
        self.values.get(state).copied().unwrap_or(0.0)
    }

    /// Expected return of taking `action` in `state` and then following the value table
    ///
    /// Computed on demand from the model, not cached.
    pub fn q_value(&self, state: &M::State, action: &M::Action) -> Result<f64> {
        let mut q_value = 0.0;
        for outcome in self.mdp.transitions(state, action).map_err(Error::mdp)? {
            let reward = self
                .mdp
                .reward(state, action, &outcome.next_state)
                .map_err(Error::mdp)?;
            q_value += outcome.prob * (reward + self.discount * self.value(&outcome.next_state));
        }

        Ok(q_value)
    }

    /// The greedy action in `state`, `None` if the state is terminal
    ///
    /// Ties go to the action listed first by the model.
    pub fn policy(&self, state: &M::State) -> Result<Option<M::Action>> {
        Ok(self.best_action(state)?.map(|(action, _)| action))
    }

    /// Same as [`ValueIterationAgent::policy`], planning agents never explore
    pub fn action(&self, state: &M::State) -> Result<Option<M::Action>> {
        self.policy(state)
    }

    /// Get the agent's state value function
    pub fn values(&self) -> &HashMap<M::State, f64> {
        &self.values
    }

    /// Get the model the agent planned over
    pub fn mdp(&self) -> &M {
        &self.mdp
    }
}

impl<M: Mdp> Agent for ValueIterationAgent<M> {
    type State = M::State;
    type Action = M::Action;

    fn act(&mut self, state: &M::State) -> Result<Option<M::Action>> {
        self.action(state)
    }

    /// Planning is finished at construction, observed transitions are ignored
    fn learn(&mut self, _exp: Exp<M::State, M::Action>) -> Result<()> {
        Ok(())
    }
}
