use std::hash::Hash;

/// A trait for state and action types that can be used as keys in a [`HashMap`](std::collections::HashMap)
///
/// Engines never look inside a state or action, they only hash, compare and hand them back
/// to the environment.
pub trait Hashable: Clone + Eq + Hash {}

impl<T> Hashable for T where T: Clone + Eq + Hash {}

/// One possible outcome of taking an action in a state
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    /// The state the environment moves to
    pub next_state: S,
    /// Probability of this outcome, the outcomes of one `(state, action)` sum to 1
    pub prob: f64,
}

impl<S> Transition<S> {
    pub fn new(next_state: S, prob: f64) -> Self {
        Self { next_state, prob }
    }
}

/// Represents a Markov decision process with a known model, as consumed by planning agents
///
/// Every query is fallible. Errors are passed through to the caller of the agent untouched,
/// wrapped in [`Error::Mdp`](crate::Error::Mdp). Use [`Infallible`](std::convert::Infallible)
/// for models that cannot fail.
pub trait Mdp {
    /// A representation of the state of the environment
    type State: Hashable;

    /// A representation of an action that an agent can take
    type Action: Hashable;

    /// Error raised by the model
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every state of the process
    fn states(&self) -> Result<Vec<Self::State>, Self::Error>;

    /// Legal actions in `state`, empty if the state is terminal
    fn possible_actions(&self, state: &Self::State) -> Result<Vec<Self::Action>, Self::Error>;

    /// Outcome distribution of taking `action` in `state`
    ///
    /// Probabilities are assumed to sum to 1 and are not re-validated.
    fn transitions(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Vec<Transition<Self::State>>, Self::Error>;

    /// Reward for the transition `state --action--> next_state`
    fn reward(
        &self,
        state: &Self::State,
        action: &Self::Action,
        next_state: &Self::State,
    ) -> Result<f64, Self::Error>;
}

/// The legal action function used by online learners
///
/// Model-free agents never see transition probabilities or rewards, only which actions
/// they may take in each state.
pub trait ActionSpace {
    /// A representation of the state of the environment
    type State: Hashable;

    /// A representation of an action that an agent can take
    type Action: Hashable;

    /// Legal actions in `state`, empty if the state is terminal
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{collections::HashMap, convert::Infallible, fmt};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum LoopState {
        Loop,
        Done,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum LoopAction {
        Stay,
        Quit,
    }

    /// Two states: `Loop` pays `reward` for staying forever, `Done` is terminal
    pub struct LoopMdp {
        pub reward: f64,
    }

    impl Mdp for LoopMdp {
        type State = LoopState;
        type Action = LoopAction;
        type Error = Infallible;

        fn states(&self) -> Result<Vec<LoopState>, Infallible> {
            Ok(vec![LoopState::Loop, LoopState::Done])
        }

        fn possible_actions(&self, state: &LoopState) -> Result<Vec<LoopAction>, Infallible> {
            Ok(match state {
                LoopState::Loop => vec![LoopAction::Stay, LoopAction::Quit],
                LoopState::Done => vec![],
            })
        }

        fn transitions(
            &self,
            _state: &LoopState,
            action: &LoopAction,
        ) -> Result<Vec<Transition<LoopState>>, Infallible> {
            Ok(match action {
                LoopAction::Stay => vec![Transition::new(LoopState::Loop, 1.0)],
                LoopAction::Quit => vec![Transition::new(LoopState::Done, 1.0)],
            })
        }

        fn reward(
            &self,
            _state: &LoopState,
            action: &LoopAction,
            _next_state: &LoopState,
        ) -> Result<f64, Infallible> {
            Ok(match action {
                LoopAction::Stay => self.reward,
                LoopAction::Quit => 0.0,
            })
        }
    }

    #[derive(Debug)]
    pub struct BrokenModel;

    impl fmt::Display for BrokenModel {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("transition table is missing")
        }
    }

    impl std::error::Error for BrokenModel {}

    /// A model whose transition queries always fail
    pub struct BrokenMdp;

    impl Mdp for BrokenMdp {
        type State = u8;
        type Action = u8;
        type Error = BrokenModel;

        fn states(&self) -> Result<Vec<u8>, BrokenModel> {
            Ok(vec![0])
        }

        fn possible_actions(&self, _state: &u8) -> Result<Vec<u8>, BrokenModel> {
            Ok(vec![0])
        }

        fn transitions(&self, _state: &u8, _action: &u8) -> Result<Vec<Transition<u8>>, BrokenModel> {
            Err(BrokenModel)
        }

        fn reward(&self, _state: &u8, _action: &u8, _next_state: &u8) -> Result<f64, BrokenModel> {
            Err(BrokenModel)
        }
    }

    /// Legal actions looked up from a fixed table, unknown states are terminal
    #[derive(Debug, Clone, Default)]
    pub struct MockActions {
        pub actions: HashMap<u8, Vec<char>>,
    }

    impl MockActions {
        pub fn new(entries: &[(u8, &[char])]) -> Self {
            Self {
                actions: entries
                    .iter()
                    .map(|&(state, actions)| (state, actions.to_vec()))
                    .collect(),
            }
        }
    }

    impl ActionSpace for MockActions {
        type State = u8;
        type Action = char;

        fn legal_actions(&self, state: &u8) -> Vec<char> {
            self.actions.get(state).cloned().unwrap_or_default()
        }
    }
}
