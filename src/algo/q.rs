use log::{debug, info, trace};
use rand::{seq::SliceRandom, thread_rng};

use crate::{
    agent::{Agent, Exp},
    decay::{self, Decay},
    ensure_interval,
    env::ActionSpace,
    exploration::{Choice, EpsilonGreedy},
    Result,
};

use super::{
    linear::{FeatureExtractor, LinearQ, WeightVector},
    q_table::QTable,
};

/// A representation of the Q function that can be read and trained
pub trait QEstimator<S, A> {
    /// Current estimate of `Q(state, action)`
    fn q_value(&self, state: &S, action: &A) -> f64;

    /// Move the estimate of `Q(state, action)` toward `target` at learning rate `alpha`
    fn learn(&mut self, state: &S, action: &A, target: f64, alpha: f64) -> Result<()>;

    /// Called once when the agent completes its configured training episodes
    fn finish_training(&self) {}
}

/// Configuration for the [`QAgent`]
#[derive(Debug, Clone)]
pub struct QAgentConfig<D: Decay> {
    /// Epsilon greedy exploration, evaluated at the current episode
    ///
    /// **Default**: constant `0.5`
    pub exploration: EpsilonGreedy<D>,
    /// The learning rate - must be between 0 and 1
    ///
    /// **Default**: `0.5`
    pub alpha: f64,
    /// The discount factor - must be between 0 and 1
    ///
    /// **Default**: `1.0`
    pub gamma: f64,
    /// Number of episodes to train for, after which the agent stops exploring and learning
    ///
    /// **Default**: `None`, train forever
    pub num_training: Option<u32>,
}

impl Default for QAgentConfig<decay::Constant> {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::new(decay::Constant::new(0.5)),
            alpha: 0.5,
            gamma: 1.0,
            num_training: None,
        }
    }
}

impl QAgentConfig<decay::Constant> {
    /// Settings tuned for pacman sized state spaces
    pub fn pacman() -> Self {
        Self {
            exploration: EpsilonGreedy::new(decay::Constant::new(0.05)),
            alpha: 0.2,
            gamma: 0.8,
            num_training: None,
        }
    }
}

/// A Q-learning agent, generic over how the Q function is stored
///
/// The agent learns online from transitions reported by a driving loop through
/// [`QAgent::update`], using the one step temporal difference target
/// `r + γ·max_a' Q(s',a')`. Action selection is epsilon greedy over
/// [`QAgent::policy`], and is the same for every estimator.
///
/// ### Generics
/// - `E` - The [`ActionSpace`] giving the legal actions of each state
/// - `Q` - The [`QEstimator`] holding the learned values, see [`QLearningAgent`] and
///   [`ApproximateQAgent`]
/// - `D` - The [`Decay`] schedule of the exploration rate
pub struct QAgent<E, Q, D = decay::Constant>
where
    E: ActionSpace,
    Q: QEstimator<E::State, E::Action>,
    D: Decay,
{
    env: E,
    estimator: Q,
    exploration: EpsilonGreedy<D>,
    alpha: f64,           // learning rate
    gamma: f64,           // discount factor
    num_training: Option<u32>,
    training: bool,
    episode: u32,         // completed episodes
    episode_reward: f64,  // reward observed in the current episode
}

/// Tabular Q-learning, exact for small discrete state spaces
pub type QLearningAgent<E, D = decay::Constant> =
    QAgent<E, QTable<<E as ActionSpace>::State, <E as ActionSpace>::Action>, D>;

/// Q-learning with a linear function approximation over extracted features
pub type ApproximateQAgent<E, X, D = decay::Constant> = QAgent<E, LinearQ<X>, D>;

impl<E, D> QAgent<E, QTable<E::State, E::Action>, D>
where
    E: ActionSpace,
    D: Decay,
{
    /// Initialize a tabular Q-learning agent with an empty table
    ///
    /// **Errors** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn tabular(env: E, config: QAgentConfig<D>) -> Result<Self> {
        Self::new(env, QTable::new(), config)
    }

    pub fn q_table(&self) -> &QTable<E::State, E::Action> {
        &self.estimator
    }
}

impl<E, X, D> QAgent<E, LinearQ<X>, D>
where
    E: ActionSpace,
    X: FeatureExtractor<E::State, E::Action>,
    D: Decay,
{
    /// Initialize an approximate Q-learning agent
    ///
    /// **Errors** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn approximate(env: E, estimator: LinearQ<X>, config: QAgentConfig<D>) -> Result<Self> {
        Self::new(env, estimator, config)
    }

    pub fn weights(&self) -> &WeightVector {
        self.estimator.weights()
    }
}

impl<E, Q, D> QAgent<E, Q, D>
where
    E: ActionSpace,
    Q: QEstimator<E::State, E::Action>,
    D: Decay,
{
    /// Initialize a new `QAgent` with any estimator
    ///
    /// **Errors** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(env: E, estimator: Q, config: QAgentConfig<D>) -> Result<Self> {
        ensure_interval!(config.alpha, 0.0, 1.0);
        ensure_interval!(config.gamma, 0.0, 1.0);
        let training = config.num_training != Some(0);
        Ok(Self {
            env,
            estimator,
            exploration: config.exploration,
            alpha: if training { config.alpha } else { 0.0 },
            gamma: config.gamma,
            num_training: config.num_training,
            training,
            episode: 0,
            episode_reward: 0.0,
        })
    }

    /// Current estimate of `Q(state, action)`, 0 for pairs never learned from
    pub fn q_value(&self, state: &E::State, action: &E::Action) -> f64 {
        self.estimator.q_value(state, action)
    }

    /// Highest Q value over the legal actions of `state`, 0 if the state is terminal
    pub fn value(&self, state: &E::State) -> f64 {
        self.env
            .legal_actions(state)
            .iter()
            .map(|action| self.q_value(state, action))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// The greedy action in `state`, `None` if the state is terminal
    ///
    /// Ties are broken uniformly at random among all maximizing actions.
    pub fn policy(&self, state: &E::State) -> Option<E::Action> {
        self.greedy(state, self.env.legal_actions(state))
    }

    fn greedy(&self, state: &E::State, actions: Vec<E::Action>) -> Option<E::Action> {
        let scored = actions
            .into_iter()
            .map(|action| {
                let q_value = self.q_value(state, &action);
                (action, q_value)
            })
            .collect::<Vec<_>>();
        let best = scored.iter().map(|&(_, q)| q).reduce(f64::max)?;

        let maximizers = scored
            .into_iter()
            .filter(|&(_, q)| q == best)
            .map(|(action, _)| action)
            .collect::<Vec<_>>();
        maximizers.choose(&mut thread_rng()).cloned()
    }

    /// Choose an action with the epsilon greedy policy, `None` if the state is terminal
    ///
    /// With probability epsilon a legal action is picked uniformly at random, otherwise
    /// the greedy [`QAgent::policy`] is followed. Exploration is off once training is over.
    pub fn action(&self, state: &E::State) -> Option<E::Action> {
        let actions = self.env.legal_actions(state);
        if actions.is_empty() {
            return None;
        }

        match self.choose() {
            Choice::Explore => actions.choose(&mut thread_rng()).cloned(),
            Choice::Exploit => self.greedy(state, actions),
        }
    }

    fn choose(&self) -> Choice {
        if self.training {
            self.exploration.choose(self.episode)
        } else {
            Choice::Exploit
        }
    }

    /// Learn from one observed transition
    ///
    /// Called by the driving loop after every step, with the temporal difference target
    /// `reward + γ·value(next_state)`. Once training is over only the episode reward is kept.
    pub fn update(
        &mut self,
        state: &E::State,
        action: &E::Action,
        next_state: &E::State,
        reward: f64,
    ) -> Result<()> {
        self.episode_reward += reward;
        if !self.training {
            return Ok(());
        }

        let target = reward + self.gamma * self.value(next_state);
        trace!("td target {target:.4} (reward {reward:.4})");
        self.estimator.learn(state, action, target, self.alpha)
    }

    /// Reset the per-episode bookkeeping
    pub fn start_episode(&mut self) {
        self.episode_reward = 0.0;
    }

    /// Close the current episode, ending training once `num_training` episodes are done
    pub fn stop_episode(&mut self) {
        self.episode += 1;
        debug!(
            "episode {} finished with reward {:.4}",
            self.episode, self.episode_reward
        );

        if self.training && self.num_training.is_some_and(|n| self.episode >= n) {
            info!("training finished after {} episodes", self.episode);
            self.training = false;
            self.alpha = 0.0;
            self.estimator.finish_training();
        }
    }

    /// Whether the agent is still exploring and learning
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Number of completed episodes
    pub fn episodes(&self) -> u32 {
        self.episode
    }

    /// Reward accumulated since [`QAgent::start_episode`]
    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f64 {
        if self.training {
            self.exploration.epsilon(self.episode)
        } else {
            0.0
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn estimator(&self) -> &Q {
        &self.estimator
    }
}

impl<E, Q, D> Agent for QAgent<E, Q, D>
where
    E: ActionSpace,
    Q: QEstimator<E::State, E::Action>,
    D: Decay,
{
    type State = E::State;
    type Action = E::Action;

    fn act(&mut self, state: &E::State) -> Result<Option<E::Action>> {
        Ok(self.action(state))
    }

    fn learn(&mut self, exp: Exp<E::State, E::Action>) -> Result<()> {
        let Exp {
            state,
            action,
            next_state,
            reward,
        } = exp;

        self.update(&state, &action, &next_state, reward)
    }
}
