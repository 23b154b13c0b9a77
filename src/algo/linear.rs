use std::{collections::HashMap, fmt::Debug};

use log::{debug, trace};

use crate::{Error, Result};

use super::q::QEstimator;

/// A sparse set of named feature values
pub type Features = HashMap<String, f64>;

/// Maps a `(state, action)` pair to the features a linear estimator weighs
///
/// Any `Fn(&S, &A) -> Features` closure is an extractor.
pub trait FeatureExtractor<S, A> {
    fn features(&self, state: &S, action: &A) -> Features;
}

impl<S, A, F> FeatureExtractor<S, A> for F
where
    F: Fn(&S, &A) -> Features,
{
    fn features(&self, state: &S, action: &A) -> Features {
        self(state, action)
    }
}

/// One indicator feature per `(state, action)` pair
///
/// With this extractor a linear estimator behaves exactly like a [`QTable`](super::QTable).
/// Features are named after the `Debug` output of the pair, so that output must tell apart
/// every state and every action. Pairs that print alike share one weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityExtractor;

impl<S: Debug, A: Debug> FeatureExtractor<S, A> for IdentityExtractor {
    fn features(&self, state: &S, action: &A) -> Features {
        Features::from([(format!("{state:?}/{action:?}"), 1.0)])
    }
}

/// Sparse weights keyed by feature name, unseen features weigh 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightVector {
    weights: HashMap<String, f64>,
}

impl WeightVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of `feature`, 0 if it has never been set
    pub fn get(&self, feature: &str) -> f64 {
        self.weights.get(feature).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, feature: impl Into<String>, weight: f64) {
        self.weights.insert(feature.into(), weight);
    }

    /// Add `feature` with weight 0 unless it is already present
    pub fn register(&mut self, feature: impl Into<String>) {
        self.weights.entry(feature.into()).or_insert(0.0);
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.weights.contains_key(feature)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.weights.iter()
    }

    /// Dot product with a feature vector
    pub fn dot(&self, features: &Features) -> f64 {
        features
            .iter()
            .map(|(feature, value)| self.get(feature) * value)
            .sum()
    }
}

/// What an update does with an active feature that has no weight yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingWeights {
    /// Start the weight at 0, the same value reads already assume
    #[default]
    Initialize,
    /// Fail with [`Error::UnregisteredFeature`], features must be registered up front
    Reject,
}

/// A linear Q function: `Q(s,a) = w · features(s,a)`
#[derive(Debug, Clone)]
pub struct LinearQ<X> {
    extractor: X,
    weights: WeightVector,
    missing: MissingWeights,
}

impl<X> LinearQ<X> {
    pub fn new(extractor: X) -> Self {
        Self {
            extractor,
            weights: WeightVector::new(),
            missing: MissingWeights::default(),
        }
    }

    /// Choose how updates treat features without a weight
    pub fn with_missing_weights(mut self, missing: MissingWeights) -> Self {
        self.missing = missing;
        self
    }

    /// Start from existing weights
    pub fn with_weights(mut self, weights: WeightVector) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut WeightVector {
        &mut self.weights
    }

    pub fn extractor(&self) -> &X {
        &self.extractor
    }
}

impl<S, A, X> QEstimator<S, A> for LinearQ<X>
where
    X: FeatureExtractor<S, A>,
{
    fn q_value(&self, state: &S, action: &A) -> f64 {
        self.weights.dot(&self.extractor.features(state, action))
    }

    /// Move every active weight along its feature by `α · correction`
    ///
    /// With [`MissingWeights::Reject`] nothing is changed if any active feature is unknown.
    fn learn(&mut self, state: &S, action: &A, target: f64, alpha: f64) -> Result<()> {
        let features = self.extractor.features(state, action);

        if self.missing == MissingWeights::Reject {
            if let Some(feature) = features.keys().find(|f| !self.weights.contains(f)) {
                return Err(Error::UnregisteredFeature {
                    feature: feature.clone(),
                });
            }
        }

        let correction = target - self.weights.dot(&features);
        trace!("linear update: target {target:.4}, correction {correction:.4}");

        for (feature, value) in features {
            *self.weights.weights.entry(feature).or_insert(0.0) += alpha * correction * value;
        }

        Ok(())
    }

    fn finish_training(&self) {
        for (feature, weight) in self.weights.iter() {
            debug!("learned weight {feature}: {weight:.4}");
        }
    }
}
