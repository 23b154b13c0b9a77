use crate::Result;

/// Represents a single experience or transition in the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Exp<S, A> {
    /// The state of the environment before taking the action
    pub state: S,
    /// The action taken in the given state
    pub action: A,
    /// The state of the environment after the action is taken
    pub next_state: S,
    /// The reward received after taking the action
    pub reward: f64,
}

/// The interface a driving loop uses to run an agent
///
/// The loop owns the environment. It asks the agent for an action, applies it, and reports
/// the outcome back through [`Agent::learn`].
///
/// Agents are not internally synchronized, every call needs exclusive access.
pub trait Agent {
    type State;
    type Action;

    /// Choose the action to take in `state`, `None` if the state is terminal
    fn act(&mut self, state: &Self::State) -> Result<Option<Self::Action>>;

    /// Observe the outcome of an action chosen by [`Agent::act`]
    fn learn(&mut self, exp: Exp<Self::State, Self::Action>) -> Result<()>;
}
