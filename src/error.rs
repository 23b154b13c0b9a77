//! Error types for the crate

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid value for `{name}`: {value} is not in the interval [{min}, {max}]")]
    OutOfInterval {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid decay schedule: `vi - vf` must have the same sign as `rate`")]
    InvalidDecay,

    #[error("no weight registered for feature '{feature}'")]
    UnregisteredFeature { feature: String },

    #[error("invalid grid layout: unknown token '{token}'")]
    InvalidGridToken { token: String },

    #[error("mdp query failed: {0}")]
    Mdp(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an error raised by a [`Mdp`](crate::env::Mdp) implementation
    pub fn mdp<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Mdp(Box::new(err))
    }
}

/// Result type alias using the crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
