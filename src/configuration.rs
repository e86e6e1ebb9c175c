//! A single point of a configuration space.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::space::ConfigurationSpace;
use crate::value::Value;

/// One assignment of values to the hyperparameters of a space.
///
/// A configuration is bound to the [`ConfigurationSpace`] it came from and
/// is stored as a dense vector of normalized slots, one per hyperparameter
/// in topological order. An inactive hyperparameter's slot holds NaN. The
/// dictionary view is derived from the vector on demand, so the two
/// representations cannot drift apart.
#[derive(Clone)]
pub struct Configuration<'a> {
    space: &'a ConfigurationSpace,
    vector: Vec<f64>,
}

impl<'a> Configuration<'a> {
    /// Builds a configuration from exactly one of the two representations.
    ///
    /// # Errors
    ///
    /// Returns an error if both or neither representation is given, or if
    /// the given representation fails validation.
    pub fn new(
        space: &'a ConfigurationSpace,
        values: Option<HashMap<String, Value>>,
        vector: Option<Vec<f64>>,
    ) -> Result<Self> {
        match (values, vector) {
            (Some(_), Some(_)) => Err(Error::BothValuesAndVector),
            (None, None) => Err(Error::NeitherValuesNorVector),
            (Some(values), None) => Self::from_values(space, &values),
            (None, Some(vector)) => Self::from_vector(space, vector),
        }
    }

    /// Builds a configuration from a name-to-value mapping.
    ///
    /// Hyperparameters are validated in topological order: every active
    /// hyperparameter must be present with a legal value, and no inactive
    /// hyperparameter may be present. The result must not match any
    /// forbidden clause.
    ///
    /// # Errors
    ///
    /// Returns the first violation encountered in that order.
    pub fn from_values(
        space: &'a ConfigurationSpace,
        values: &HashMap<String, Value>,
    ) -> Result<Self> {
        for name in values.keys() {
            if space.hyperparameter_index(name).is_none() {
                return Err(Error::UnknownHyperparameter(name.clone()));
            }
        }
        let mut vector = vec![f64::NAN; space.len()];
        let mut active_values: HashMap<String, Value> = HashMap::new();
        for (i, hp) in space.get_hyperparameters().iter().enumerate() {
            let active = space
                .condition_of(hp.name())
                .is_none_or(|c| c.evaluate(&active_values));
            match (active, values.get(hp.name())) {
                (true, Some(value)) => {
                    vector[i] = hp.to_vector(value).ok_or_else(|| Error::IllegalValue {
                        name: hp.name().to_string(),
                        value: value.repr(),
                    })?;
                    active_values.insert(hp.name().to_string(), value.clone());
                }
                (true, None) => {
                    return Err(Error::ActiveParameterMissing(hp.name().to_string()));
                }
                (false, Some(_)) => {
                    return Err(Error::InactiveParameter(hp.name().to_string()));
                }
                (false, None) => {}
            }
        }
        space.check_forbidden(&active_values)?;
        Ok(Self { space, vector })
    }

    /// Builds a configuration from a dense normalized vector.
    ///
    /// The raw slots are trusted; only the length and the forbidden clauses
    /// are checked. Use
    /// [`ConfigurationSpace::check_configuration`] for a full activation
    /// re-validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector has the wrong length or matches a
    /// forbidden clause.
    pub fn from_vector(space: &'a ConfigurationSpace, vector: Vec<f64>) -> Result<Self> {
        if vector.len() != space.len() {
            return Err(Error::VectorLengthMismatch {
                expected: space.len(),
                got: vector.len(),
            });
        }
        space.check_forbidden(&space.values_from_vector(&vector))?;
        Ok(Self { space, vector })
    }

    /// Binds an already validated vector. Callers guarantee validity.
    pub(crate) fn from_parts(space: &'a ConfigurationSpace, vector: Vec<f64>) -> Self {
        Self { space, vector }
    }

    /// Returns the space this configuration is bound to.
    #[must_use]
    pub fn space(&self) -> &'a ConfigurationSpace {
        self.space
    }

    /// Returns the dense normalized vector, one slot per hyperparameter in
    /// topological order; inactive slots hold NaN.
    #[must_use]
    pub fn vector(&self) -> &[f64] {
        &self.vector
    }

    /// Returns the value of a hyperparameter, or `None` if it is inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a member of the space.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        let idx = self
            .space
            .hyperparameter_index(name)
            .ok_or_else(|| Error::UnknownHyperparameter(name.to_string()))?;
        let slot = self.vector[idx];
        if slot.is_nan() {
            return Ok(None);
        }
        Ok(Some(self.space.get_hyperparameters()[idx].from_vector(slot)))
    }

    /// Replaces the value of one hyperparameter, leaving every other slot
    /// untouched. Activation of dependent parameters is not re-derived;
    /// run [`ConfigurationSpace::check_configuration`] afterwards when the
    /// updated parameter has children.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown, the value is illegal, or
    /// the updated assignment would match a forbidden clause.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let idx = self
            .space
            .hyperparameter_index(name)
            .ok_or_else(|| Error::UnknownHyperparameter(name.to_string()))?;
        let hp = &self.space.get_hyperparameters()[idx];
        let slot = hp.to_vector(&value).ok_or_else(|| Error::IllegalValue {
            name: name.to_string(),
            value: value.repr(),
        })?;
        let mut updated = self.vector.clone();
        updated[idx] = slot;
        self.space
            .check_forbidden(&self.space.values_from_vector(&updated))?;
        self.vector = updated;
        Ok(())
    }

    /// Returns the active hyperparameters as a sorted name-to-value map.
    ///
    /// The map is derived from the vector, so repeated calls return
    /// identical values for an unchanged configuration.
    #[must_use]
    pub fn get_dictionary(&self) -> BTreeMap<String, Value> {
        self.space
            .get_hyperparameters()
            .iter()
            .zip(&self.vector)
            .filter(|(_, slot)| !slot.is_nan())
            .map(|(hp, slot)| (hp.name().to_string(), hp.from_vector(*slot)))
            .collect()
    }
}

impl core::fmt::Debug for Configuration<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Configuration")
            .field("vector", &self.vector)
            .finish_non_exhaustive()
    }
}

/// Configurations are equal when their spaces are structurally equal and
/// their vectors match slot for slot, treating two NaN slots as equal.
impl PartialEq for Configuration<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.space == other.space
            && self.vector.len() == other.vector.len()
            && self
                .vector
                .iter()
                .zip(&other.vector)
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

impl core::fmt::Display for Configuration<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Configuration:")?;
        for (hp, slot) in self.space.get_hyperparameters().iter().zip(&self.vector) {
            if !slot.is_nan() {
                writeln!(f, "  {}, Value: {}", hp.name(), hp.from_vector(*slot).repr())?;
            }
        }
        Ok(())
    }
}
