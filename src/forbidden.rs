//! Forbidden clauses excluding otherwise-legal configurations.
//!
//! A forbidden clause matches a full assignment independently of
//! activation: if it matches, the configuration is illegal. A referenced
//! hyperparameter that is absent (inactive) simply makes that sub-clause
//! not match.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// A predicate over hyperparameter values that invalidates a whole
/// configuration when it matches.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ForbiddenClause {
    /// Matches when the named hyperparameter equals the literal.
    Equals {
        /// The hyperparameter whose value is tested.
        name: String,
        /// The forbidden value.
        value: Value,
    },
    /// Matches when every component clause matches.
    And {
        /// The component clauses.
        components: Vec<ForbiddenClause>,
    },
}

impl ForbiddenClause {
    /// Creates a clause forbidding `name == value`.
    #[must_use]
    pub fn equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        ForbiddenClause::Equals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Combines clauses into a conjunction that matches only when all
    /// components match.
    ///
    /// # Errors
    ///
    /// Returns an error if `components` is empty.
    pub fn and(components: Vec<ForbiddenClause>) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::EmptyConjunction);
        }
        Ok(ForbiddenClause::And { components })
    }

    /// Returns every hyperparameter name referenced by this clause.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            ForbiddenClause::Equals { name, .. } => vec![name],
            ForbiddenClause::And { components } => {
                components.iter().flat_map(ForbiddenClause::names).collect()
            }
        }
    }

    /// Evaluates this clause against a (possibly partial) assignment.
    ///
    /// An absent hyperparameter makes its sub-clause not match.
    #[must_use]
    pub fn is_violated(&self, assignment: &HashMap<String, Value>) -> bool {
        match self {
            ForbiddenClause::Equals { name, value } => {
                assignment.get(name).is_some_and(|v| v == value)
            }
            ForbiddenClause::And { components } => {
                components.iter().all(|c| c.is_violated(assignment))
            }
        }
    }

    /// Returns a copy with every hyperparameter name rewritten by `rename`.
    /// Used for namespaced sub-space composition.
    pub(crate) fn renamed(&self, rename: &dyn Fn(&str) -> String) -> ForbiddenClause {
        match self {
            ForbiddenClause::Equals { name, value } => ForbiddenClause::Equals {
                name: rename(name),
                value: value.clone(),
            },
            ForbiddenClause::And { components } => ForbiddenClause::And {
                components: components.iter().map(|c| c.renamed(rename)).collect(),
            },
        }
    }
}

impl core::fmt::Display for ForbiddenClause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ForbiddenClause::Equals { name, value } => {
                write!(f, "Forbidden: {name} == {}", value.repr())
            }
            ForbiddenClause::And { components } => {
                let rendered = components
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" && ");
                write!(f, "({rendered})")
            }
        }
    }
}
