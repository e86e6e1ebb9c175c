#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Typed hyperparameter configuration spaces with conditional activation,
//! forbidden clauses, and deterministic seeded sampling.
//!
//! A [`ConfigurationSpace`] holds a set of typed hyperparameters (uniform
//! and normal numeric ranges, categoricals, constants), activation
//! conditions that switch parameters on and off depending on the values of
//! their parents, and forbidden clauses that exclude value combinations.
//! Parameters are kept in a deterministic topological order, so every
//! [`Configuration`] has both a dictionary view and a dense normalized
//! vector view with a fixed slot layout.
//!
//! # Getting Started
//!
//! ```
//! use configspace::prelude::*;
//!
//! # fn main() -> configspace::Result<()> {
//! let mut space = ConfigurationSpace::with_seed(1);
//! space.add_hyperparameter(Categorical::new("classifier", ["svm", "forest"]))?;
//! space.add_hyperparameter(UniformFloat::new("C", 1e-3, 1e3).log())?;
//! space.add_hyperparameter(UniformInt::new("n_estimators", 10, 500))?;
//! space.add_condition(Condition::equals("C", "classifier", "svm"))?;
//! space.add_condition(Condition::equals("n_estimators", "classifier", "forest"))?;
//!
//! for config in space.sample_configurations(10)? {
//!     // Exactly one of the two children is active per draw.
//!     assert!(config.get("C")?.is_some() != config.get("n_estimators")?.is_some());
//! }
//! # Ok(()) }
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`ConfigurationSpace`] | Own the hyperparameters, conditions, and forbidden clauses; sample and validate configurations. |
//! | [`Hyperparameter`] | One typed dimension of the space, with a default and a normalized vector encoding. |
//! | [`Condition`] | Activate a child parameter depending on its parents' values; composable with and/or. |
//! | [`ForbiddenClause`] | Exclude a value combination from the otherwise-legal space. |
//! | [`Configuration`] | One assignment, readable as a dictionary or as a dense normalized vector. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on values, hyperparameters, conditions, and forbidden clauses | on |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) on space mutation and sampling | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod condition;
mod configuration;
mod error;
mod forbidden;
mod hyperparameter;
mod rng_util;
mod space;
mod value;

pub use condition::Condition;
pub use configuration::Configuration;
pub use error::{Error, Result};
pub use forbidden::ForbiddenClause;
pub use hyperparameter::{
    Categorical, Constant, Hyperparameter, NormalFloat, UniformFloat, UniformInt,
};
pub use space::ConfigurationSpace;
pub use value::Value;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use configspace::prelude::*;
/// ```
pub mod prelude {
    pub use crate::condition::Condition;
    pub use crate::configuration::Configuration;
    pub use crate::error::{Error, Result};
    pub use crate::forbidden::ForbiddenClause;
    pub use crate::hyperparameter::{
        Categorical, Constant, Hyperparameter, NormalFloat, UniformFloat, UniformInt,
    };
    pub use crate::space::ConfigurationSpace;
    pub use crate::value::Value;
}
