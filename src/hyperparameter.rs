//! Hyperparameter kinds and their value-domain transforms.
//!
//! Each kind knows its legal values, its default, and the transform between
//! a domain value and the normalized scalar stored in a configuration
//! vector. The kinds are a closed set wrapped by the [`Hyperparameter`]
//! enum, so transform and legality dispatch is exhaustively checked.
//!
//! # Example
//!
//! ```
//! use configspace::{Hyperparameter, UniformInt};
//!
//! let hp: Hyperparameter = UniformInt::new("layers", 0, 10).into();
//! assert_eq!(hp.to_vector(&2.into()), Some(2.5 / 11.0));
//! assert_eq!(hp.from_vector(2.5 / 11.0), 2.into());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rng_util;
use crate::value::Value;

/// Vector slot value for constants. Distinct from the NaN "unset" sentinel.
pub(crate) const CONSTANT_VECTOR_VALUE: f64 = 0.0;

/// A categorical hyperparameter selecting from an ordered list of choices.
///
/// The normalized form is the index into the choice list. Without an
/// explicit default, the first choice is the default; an explicit default
/// that is not a choice also falls back to the first choice.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Categorical {
    name: String,
    choices: Vec<Value>,
    default: Option<Value>,
}

impl Categorical {
    /// Creates a new categorical hyperparameter with the given choices.
    #[must_use]
    pub fn new<I, V>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            default: None,
        }
    }

    /// Sets an explicit default choice.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Returns the ordered choice list.
    #[must_use]
    pub fn choices(&self) -> &[Value] {
        &self.choices
    }

    fn default(&self) -> Value {
        self.default
            .clone()
            .filter(|d| self.choices.contains(d))
            .or_else(|| self.choices.first().cloned())
            .unwrap_or(Value::Int(0))
    }

    fn validate(&self) -> Result<()> {
        if self.choices.is_empty() {
            return Err(Error::EmptyChoices);
        }
        for (i, choice) in self.choices.iter().enumerate() {
            if self.choices[..i].contains(choice) {
                return Err(Error::DuplicateChoice {
                    name: self.name.clone(),
                    choice: choice.repr(),
                });
            }
        }
        Ok(())
    }
}

impl core::fmt::Display for Categorical {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let choices = self
            .choices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{}, Type: Categorical, Choices: {{{choices}}}, Default: {}",
            self.name,
            self.default()
        )
    }
}

/// A hyperparameter fixed to a single value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constant {
    name: String,
    value: Value,
}

impl Constant {
    /// Creates a new constant hyperparameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the constant value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl core::fmt::Display for Constant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}, Type: Constant, Value: {}", self.name, self.value)
    }
}

/// An integer hyperparameter uniform over `[lower, upper]`.
///
/// The normalized domain pads the integer range by half a unit on each side
/// before rescaling to `[0, 1]`, so uniform draws over the continuous
/// interval round to an unbiased discrete distribution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UniformInt {
    name: String,
    lower: i64,
    upper: i64,
    log: bool,
    q: Option<i64>,
    default: Option<i64>,
}

impl UniformInt {
    /// Creates a new uniform integer hyperparameter with the given bounds.
    #[must_use]
    pub fn new(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
            log: false,
            q: None,
            default: None,
        }
    }

    /// Enables log-scale sampling.
    #[must_use]
    pub fn log(mut self) -> Self {
        self.log = true;
        self
    }

    /// Sets a quantization factor for the sampled values.
    #[must_use]
    pub fn q(mut self, q: i64) -> Self {
        self.q = Some(q);
        self
    }

    /// Sets an explicit default value.
    #[must_use]
    pub fn default_value(mut self, value: i64) -> Self {
        self.default = Some(value);
        self
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn default(&self) -> i64 {
        self.default.unwrap_or_else(|| {
            if self.log {
                let mid = ((self.lower as f64).ln() + (self.upper as f64).ln()) / 2.0;
                mid.exp().round() as i64
            } else {
                (self.lower + self.upper) / 2
            }
        })
    }

    fn validate(&self) -> Result<()> {
        #[allow(clippy::cast_precision_loss)]
        if self.lower > self.upper {
            return Err(Error::InvalidBounds {
                low: self.lower as f64,
                high: self.upper as f64,
            });
        }
        if self.log && self.lower < 1 {
            return Err(Error::InvalidLogBounds);
        }
        if matches!(self.q, Some(q) if q <= 0) {
            return Err(Error::InvalidQuantization);
        }
        let default = self.default();
        if default < self.lower || default > self.upper {
            return Err(Error::IllegalDefault {
                name: self.name.clone(),
                value: default.to_string(),
            });
        }
        Ok(())
    }

    fn is_legal(&self, value: &Value) -> bool {
        matches!(value, Value::Int(v) if (self.lower..=self.upper).contains(v))
    }

    // Half-unit padded bounds of the continuous sampling domain.
    #[allow(clippy::cast_precision_loss)]
    fn padded_bounds(&self) -> (f64, f64) {
        (self.lower as f64 - 0.5, self.upper as f64 + 0.5)
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_unit(&self, v: i64) -> f64 {
        let (lo, hi) = self.padded_bounds();
        if self.log {
            ((v as f64).ln() - lo.ln()) / (hi.ln() - lo.ln())
        } else {
            (v as f64 - lo) / (hi - lo)
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_unit(&self, x: f64) -> i64 {
        let (lo, hi) = self.padded_bounds();
        let raw = if self.log {
            (lo.ln() + x * (hi.ln() - lo.ln())).exp()
        } else {
            lo + x * (hi - lo)
        };
        let mut v = raw.round() as i64;
        if let Some(q) = self.q {
            #[allow(clippy::cast_precision_loss)]
            {
                v = self.lower + ((v - self.lower) as f64 / q as f64).round() as i64 * q;
            }
        }
        v.clamp(self.lower, self.upper)
    }
}

impl core::fmt::Display for UniformInt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}, Type: UniformInteger, Range: [{}, {}], Default: {}",
            self.name,
            self.lower,
            self.upper,
            self.default()
        )?;
        if self.log {
            write!(f, ", on log-scale")?;
        }
        if let Some(q) = self.q {
            write!(f, ", Q: {q}")?;
        }
        Ok(())
    }
}

/// A float hyperparameter uniform over `[lower, upper]`, optionally on a
/// log scale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UniformFloat {
    name: String,
    lower: f64,
    upper: f64,
    log: bool,
    q: Option<f64>,
    default: Option<f64>,
}

impl UniformFloat {
    /// Creates a new uniform float hyperparameter with the given bounds.
    #[must_use]
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
            log: false,
            q: None,
            default: None,
        }
    }

    /// Enables log-scale sampling.
    #[must_use]
    pub fn log(mut self) -> Self {
        self.log = true;
        self
    }

    /// Sets a quantization factor for the sampled values.
    #[must_use]
    pub fn q(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }

    /// Sets an explicit default value.
    #[must_use]
    pub fn default_value(mut self, value: f64) -> Self {
        self.default = Some(value);
        self
    }

    fn default(&self) -> f64 {
        self.default.unwrap_or_else(|| {
            if self.log {
                ((self.lower.ln() + self.upper.ln()) / 2.0).exp()
            } else {
                (self.lower + self.upper) / 2.0
            }
        })
    }

    fn validate(&self) -> Result<()> {
        if self.lower > self.upper {
            return Err(Error::InvalidBounds {
                low: self.lower,
                high: self.upper,
            });
        }
        if self.log && self.lower <= 0.0 {
            return Err(Error::InvalidLogBounds);
        }
        if matches!(self.q, Some(q) if q <= 0.0) {
            return Err(Error::InvalidQuantization);
        }
        let default = self.default();
        if default < self.lower || default > self.upper {
            return Err(Error::IllegalDefault {
                name: self.name.clone(),
                value: default.to_string(),
            });
        }
        Ok(())
    }

    fn is_legal(&self, value: &Value) -> bool {
        match value.as_f64() {
            Some(v) => (self.lower..=self.upper).contains(&v),
            None => false,
        }
    }

    fn to_unit(&self, v: f64) -> f64 {
        if self.log {
            (v.ln() - self.lower.ln()) / (self.upper.ln() - self.lower.ln())
        } else {
            (v - self.lower) / (self.upper - self.lower)
        }
    }

    fn from_unit(&self, x: f64) -> f64 {
        let v = if self.log {
            (self.lower.ln() + x * (self.upper.ln() - self.lower.ln())).exp()
        } else {
            self.lower + x * (self.upper - self.lower)
        };
        let v = match self.q {
            Some(q) => (v / q).round() * q,
            None => v,
        };
        v.clamp(self.lower, self.upper)
    }
}

impl core::fmt::Display for UniformFloat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}, Type: UniformFloat, Range: [{}, {}], Default: {}",
            self.name,
            self.lower,
            self.upper,
            self.default()
        )?;
        if self.log {
            write!(f, ", on log-scale")?;
        }
        if let Some(q) = self.q {
            write!(f, ", Q: {q}")?;
        }
        Ok(())
    }
}

/// A float hyperparameter sampled from a normal distribution.
///
/// The normalized form is the standard-normal transform of the domain
/// value; with `log`, draws are exponentiated, so the legal domain is the
/// positive reals. Both transform directions are exact algebraic inverses.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalFloat {
    name: String,
    mu: f64,
    sigma: f64,
    log: bool,
    q: Option<f64>,
    default: Option<f64>,
}

impl NormalFloat {
    /// Creates a new normal float hyperparameter with the given mean and
    /// standard deviation.
    #[must_use]
    pub fn new(name: impl Into<String>, mu: f64, sigma: f64) -> Self {
        Self {
            name: name.into(),
            mu,
            sigma,
            log: false,
            q: None,
            default: None,
        }
    }

    /// Enables log-scale sampling.
    #[must_use]
    pub fn log(mut self) -> Self {
        self.log = true;
        self
    }

    /// Sets a quantization factor for the sampled values.
    #[must_use]
    pub fn q(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }

    /// Sets an explicit default value.
    #[must_use]
    pub fn default_value(mut self, value: f64) -> Self {
        self.default = Some(value);
        self
    }

    fn default(&self) -> f64 {
        self.default
            .unwrap_or_else(|| if self.log { self.mu.exp() } else { self.mu })
    }

    fn validate(&self) -> Result<()> {
        if self.sigma <= 0.0 {
            return Err(Error::InvalidSigma(self.sigma));
        }
        if matches!(self.q, Some(q) if q <= 0.0) {
            return Err(Error::InvalidQuantization);
        }
        let default = self.default();
        if !self.is_legal(&Value::Float(default)) {
            return Err(Error::IllegalDefault {
                name: self.name.clone(),
                value: default.to_string(),
            });
        }
        Ok(())
    }

    fn is_legal(&self, value: &Value) -> bool {
        match value.as_f64() {
            Some(v) => v.is_finite() && (!self.log || v > 0.0),
            None => false,
        }
    }

    fn to_unit(&self, v: f64) -> f64 {
        if self.log {
            (v.ln() - self.mu) / self.sigma
        } else {
            (v - self.mu) / self.sigma
        }
    }

    fn from_unit(&self, x: f64) -> f64 {
        let v = if self.log {
            (self.mu + self.sigma * x).exp()
        } else {
            self.mu + self.sigma * x
        };
        match self.q {
            Some(q) => (v / q).round() * q,
            None => v,
        }
    }
}

impl core::fmt::Display for NormalFloat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}, Type: NormalFloat, Mu: {} Sigma: {}, Default: {}",
            self.name,
            self.mu,
            self.sigma,
            self.default()
        )?;
        if self.log {
            write!(f, ", on log-scale")?;
        }
        if let Some(q) = self.q {
            write!(f, ", Q: {q}")?;
        }
        Ok(())
    }
}

/// Enum wrapping all hyperparameter kinds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Hyperparameter {
    /// A categorical hyperparameter.
    Categorical(Categorical),
    /// A constant hyperparameter.
    Constant(Constant),
    /// A uniform integer hyperparameter.
    UniformInt(UniformInt),
    /// A uniform float hyperparameter.
    UniformFloat(UniformFloat),
    /// A normally distributed float hyperparameter.
    NormalFloat(NormalFloat),
}

impl Hyperparameter {
    /// Returns the name of this hyperparameter.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Hyperparameter::Categorical(hp) => &hp.name,
            Hyperparameter::Constant(hp) => &hp.name,
            Hyperparameter::UniformInt(hp) => &hp.name,
            Hyperparameter::UniformFloat(hp) => &hp.name,
            Hyperparameter::NormalFloat(hp) => &hp.name,
        }
    }

    /// Returns a copy of this hyperparameter under a new name. Used for
    /// namespaced sub-space composition.
    #[must_use]
    pub(crate) fn with_name(&self, name: String) -> Self {
        let mut renamed = self.clone();
        match &mut renamed {
            Hyperparameter::Categorical(hp) => hp.name = name,
            Hyperparameter::Constant(hp) => hp.name = name,
            Hyperparameter::UniformInt(hp) => hp.name = name,
            Hyperparameter::UniformFloat(hp) => hp.name = name,
            Hyperparameter::NormalFloat(hp) => hp.name = name,
        }
        renamed
    }

    /// Returns the default value of this hyperparameter's domain.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Hyperparameter::Categorical(hp) => hp.default(),
            Hyperparameter::Constant(hp) => hp.value.clone(),
            Hyperparameter::UniformInt(hp) => Value::Int(hp.default()),
            Hyperparameter::UniformFloat(hp) => Value::Float(hp.default()),
            Hyperparameter::NormalFloat(hp) => Value::Float(hp.default()),
        }
    }

    /// Returns whether `value` belongs to this hyperparameter's domain.
    #[must_use]
    pub fn is_legal(&self, value: &Value) -> bool {
        match self {
            Hyperparameter::Categorical(hp) => hp.choices.contains(value),
            Hyperparameter::Constant(hp) => *value == hp.value,
            Hyperparameter::UniformInt(hp) => hp.is_legal(value),
            Hyperparameter::UniformFloat(hp) => hp.is_legal(value),
            Hyperparameter::NormalFloat(hp) => hp.is_legal(value),
        }
    }

    /// Transforms a legal domain value into its normalized scalar.
    /// Returns `None` for values outside the domain.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_vector(&self, value: &Value) -> Option<f64> {
        if !self.is_legal(value) {
            return None;
        }
        match self {
            Hyperparameter::Categorical(hp) => hp
                .choices
                .iter()
                .position(|c| c == value)
                .map(|i| i as f64),
            Hyperparameter::Constant(_) => Some(CONSTANT_VECTOR_VALUE),
            Hyperparameter::UniformInt(hp) => match value {
                Value::Int(v) => Some(hp.to_unit(*v)),
                _ => None,
            },
            Hyperparameter::UniformFloat(hp) => value.as_f64().map(|v| hp.to_unit(v)),
            Hyperparameter::NormalFloat(hp) => value.as_f64().map(|v| hp.to_unit(v)),
        }
    }

    /// Transforms a normalized scalar back into a domain value, rounding
    /// and clamping bounded kinds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_vector(&self, x: f64) -> Value {
        match self {
            Hyperparameter::Categorical(hp) => {
                let idx = (x.round().max(0.0) as usize).min(hp.choices.len().saturating_sub(1));
                hp.choices.get(idx).cloned().unwrap_or(Value::Int(0))
            }
            Hyperparameter::Constant(hp) => hp.value.clone(),
            Hyperparameter::UniformInt(hp) => Value::Int(hp.from_unit(x)),
            Hyperparameter::UniformFloat(hp) => Value::Float(hp.from_unit(x)),
            Hyperparameter::NormalFloat(hp) => Value::Float(hp.from_unit(x)),
        }
    }

    /// Draws one normalized scalar from this hyperparameter's distribution.
    ///
    /// The configuration vector stores this draw directly, so the derived
    /// domain value is stable across repeated conversions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn sample_vector(&self, rng: &mut fastrand::Rng) -> f64 {
        match self {
            Hyperparameter::Categorical(hp) => rng.usize(0..hp.choices.len()) as f64,
            Hyperparameter::Constant(_) => CONSTANT_VECTOR_VALUE,
            Hyperparameter::UniformInt(_) | Hyperparameter::UniformFloat(_) => rng.f64(),
            Hyperparameter::NormalFloat(_) => rng_util::standard_normal(rng),
        }
    }

    /// Draws one domain value from this hyperparameter's distribution.
    #[must_use]
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Value {
        self.from_vector(self.sample_vector(rng))
    }

    /// Validates the hyperparameter definition. Run by
    /// [`ConfigurationSpace::add_hyperparameter`](crate::ConfigurationSpace::add_hyperparameter).
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Hyperparameter::Categorical(hp) => hp.validate(),
            Hyperparameter::Constant(_) => Ok(()),
            Hyperparameter::UniformInt(hp) => hp.validate(),
            Hyperparameter::UniformFloat(hp) => hp.validate(),
            Hyperparameter::NormalFloat(hp) => hp.validate(),
        }
    }
}

impl core::fmt::Display for Hyperparameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Hyperparameter::Categorical(hp) => write!(f, "{hp}"),
            Hyperparameter::Constant(hp) => write!(f, "{hp}"),
            Hyperparameter::UniformInt(hp) => write!(f, "{hp}"),
            Hyperparameter::UniformFloat(hp) => write!(f, "{hp}"),
            Hyperparameter::NormalFloat(hp) => write!(f, "{hp}"),
        }
    }
}

impl From<Categorical> for Hyperparameter {
    fn from(hp: Categorical) -> Self {
        Hyperparameter::Categorical(hp)
    }
}

impl From<Constant> for Hyperparameter {
    fn from(hp: Constant) -> Self {
        Hyperparameter::Constant(hp)
    }
}

impl From<UniformInt> for Hyperparameter {
    fn from(hp: UniformInt) -> Self {
        Hyperparameter::UniformInt(hp)
    }
}

impl From<UniformFloat> for Hyperparameter {
    fn from(hp: UniformFloat) -> Self {
        Hyperparameter::UniformFloat(hp)
    }
}

impl From<NormalFloat> for Hyperparameter {
    fn from(hp: NormalFloat) -> Self {
        Hyperparameter::NormalFloat(hp)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn categorical_display() {
        let hp: Hyperparameter = Categorical::new("input1", [0, 1]).into();
        assert_eq!(
            hp.to_string(),
            "input1, Type: Categorical, Choices: {0, 1}, Default: 0"
        );
    }

    #[test]
    fn categorical_default_falls_back_to_first_choice() {
        let hp: Hyperparameter = Categorical::new("loss", ["l1", "l2"]).into();
        assert_eq!(hp.default_value(), "l1".into());

        let hp: Hyperparameter = Categorical::new("loss", ["l1", "l2"])
            .default_value("l2")
            .into();
        assert_eq!(hp.default_value(), "l2".into());

        let hp: Hyperparameter = Categorical::new("loss", ["l1", "l2"])
            .default_value("l3")
            .into();
        assert_eq!(hp.default_value(), "l1".into());
    }

    #[test]
    fn categorical_rejects_duplicates_and_empty() {
        let hp: Hyperparameter = Categorical::new("x", ["a", "b", "a"]).into();
        assert!(matches!(hp.validate(), Err(Error::DuplicateChoice { .. })));

        let hp: Hyperparameter = Categorical::new("x", Vec::<Value>::new()).into();
        assert!(matches!(hp.validate(), Err(Error::EmptyChoices)));
    }

    #[test]
    fn categorical_transform_is_choice_index() {
        let hp: Hyperparameter = Categorical::new("opt", ["sgd", "adam", "rmsprop"]).into();
        assert_eq!(hp.to_vector(&"adam".into()), Some(1.0));
        assert_eq!(hp.from_vector(1.0), "adam".into());
        assert_eq!(hp.to_vector(&"momentum".into()), None);
        // Out-of-range scalars clamp to the nearest choice.
        assert_eq!(hp.from_vector(17.0), "rmsprop".into());
    }

    #[test]
    fn constant_domain_is_single_valued() {
        let hp: Hyperparameter = Constant::new("AND", "True").into();
        assert_eq!(hp.to_string(), "AND, Type: Constant, Value: True");
        assert!(hp.is_legal(&"True".into()));
        assert!(!hp.is_legal(&"False".into()));
        assert_eq!(hp.to_vector(&"True".into()), Some(CONSTANT_VECTOR_VALUE));
        assert_eq!(hp.default_value(), "True".into());
    }

    #[test]
    fn uniform_int_display_and_default() {
        let hp: Hyperparameter = UniformInt::new("child", 0, 10).into();
        assert_eq!(
            hp.to_string(),
            "child, Type: UniformInteger, Range: [0, 10], Default: 5"
        );
    }

    #[test]
    fn uniform_int_half_unit_padding() {
        let hp: Hyperparameter = UniformInt::new("child", 0, 10).into();
        assert_relative_eq!(hp.to_vector(&2.into()).unwrap(), 2.5 / 11.0);
        assert_relative_eq!(hp.to_vector(&0.into()).unwrap(), 0.5 / 11.0);
        assert_relative_eq!(hp.to_vector(&10.into()).unwrap(), 10.5 / 11.0);
        for v in 0..=10 {
            let x = hp.to_vector(&v.into()).unwrap();
            assert_eq!(hp.from_vector(x), v.into());
        }
        // The extremes of the unit interval land on the bounds.
        assert_eq!(hp.from_vector(0.0), 0.into());
        assert_eq!(hp.from_vector(1.0 - 1e-12), 10.into());
    }

    #[test]
    fn uniform_int_legality_is_integer_only() {
        let hp: Hyperparameter = UniformInt::new("x0", 1, 5).into();
        assert!(hp.is_legal(&2.into()));
        assert!(!hp.is_legal(&2.5.into()));
        assert!(!hp.is_legal(&0.into()));
        assert!(!hp.is_legal(&6.into()));
        assert!(!hp.is_legal(&"2".into()));
    }

    #[test]
    fn uniform_int_quantization_snaps() {
        let hp: Hyperparameter = UniformInt::new("units", 0, 10).q(2).into();
        for x in [0.0, 0.13, 0.29, 0.5, 0.77, 0.99] {
            if let Value::Int(v) = hp.from_vector(x) {
                assert_eq!(v % 2, 0, "value {v} not on the q grid");
                assert!((0..=10).contains(&v));
            } else {
                panic!("expected an integer value");
            }
        }
    }

    #[test]
    fn uniform_int_validate() {
        assert!(matches!(
            Hyperparameter::from(UniformInt::new("x", 10, 1)).validate(),
            Err(Error::InvalidBounds { .. })
        ));
        assert!(matches!(
            Hyperparameter::from(UniformInt::new("x", 0, 10).log()).validate(),
            Err(Error::InvalidLogBounds)
        ));
        assert!(matches!(
            Hyperparameter::from(UniformInt::new("x", 0, 10).q(-1)).validate(),
            Err(Error::InvalidQuantization)
        ));
        assert!(matches!(
            Hyperparameter::from(UniformInt::new("x", 0, 10).default_value(42)).validate(),
            Err(Error::IllegalDefault { .. })
        ));
        assert!(Hyperparameter::from(UniformInt::new("x", 1, 1024).log())
            .validate()
            .is_ok());
    }

    #[test]
    fn uniform_int_log_round_trips() {
        let hp: Hyperparameter = UniformInt::new("batch", 1, 1024).log().into();
        for v in [1_i64, 2, 7, 32, 500, 1024] {
            let x = hp.to_vector(&v.into()).unwrap();
            assert_eq!(hp.from_vector(x), v.into());
        }
    }

    #[test]
    fn uniform_float_transform_is_exact_inverse() {
        let hp: Hyperparameter = UniformFloat::new("a", -5.0, 10.0).into();
        assert_eq!(hp.to_vector(&Value::Float(-5.0)), Some(0.0));
        assert_eq!(hp.to_vector(&Value::Float(10.0)), Some(1.0));
        for v in [-5.0, -1.25, 0.0, 3.3, 10.0] {
            let x = hp.to_vector(&v.into()).unwrap();
            if let Value::Float(back) = hp.from_vector(x) {
                assert_relative_eq!(back, v, max_relative = 1e-12);
            } else {
                panic!("expected a float value");
            }
        }
    }

    #[test]
    fn uniform_float_log_transform() {
        let hp: Hyperparameter = UniformFloat::new("lr", 1e-5, 1e-1).log().into();
        assert_relative_eq!(hp.to_vector(&Value::Float(1e-5)).unwrap(), 0.0);
        assert_relative_eq!(hp.to_vector(&Value::Float(1e-1)).unwrap(), 1.0);
        let x = hp.to_vector(&Value::Float(1e-3)).unwrap();
        assert_relative_eq!(x, 0.5, max_relative = 1e-12);
        if let Value::Float(back) = hp.from_vector(x) {
            assert_relative_eq!(back, 1e-3, max_relative = 1e-12);
        } else {
            panic!("expected a float value");
        }
    }

    #[test]
    fn uniform_float_accepts_integer_values_in_range() {
        let hp: Hyperparameter = UniformFloat::new("x1", 0.5, 2.55).into();
        assert!(hp.is_legal(&2.into()));
        assert!(!hp.is_legal(&0.into()));
        assert!(!hp.is_legal(&"high".into()));
    }

    #[test]
    fn uniform_float_quantization_snaps() {
        let hp: Hyperparameter = UniformFloat::new("x", 0.0, 1.0).q(0.25).into();
        if let Value::Float(v) = hp.from_vector(0.3) {
            assert_relative_eq!(v, 0.25);
        } else {
            panic!("expected a float value");
        }
    }

    #[test]
    fn normal_float_transform_round_trips() {
        let hp: Hyperparameter = NormalFloat::new("b", 1.0, 2.0).into();
        for v in [-3.0, 0.0, 1.0, 2.5] {
            let x = hp.to_vector(&v.into()).unwrap();
            if let Value::Float(back) = hp.from_vector(x) {
                assert_relative_eq!(back, v, max_relative = 1e-12, epsilon = 1e-12);
            } else {
                panic!("expected a float value");
            }
        }
    }

    #[test]
    fn normal_float_log_domain_is_positive() {
        let hp: Hyperparameter = NormalFloat::new("b", 1.0, 2.0).log().into();
        assert!(hp.is_legal(&Value::Float(0.1)));
        assert!(!hp.is_legal(&Value::Float(0.0)));
        assert!(!hp.is_legal(&Value::Float(-1.0)));
        assert_relative_eq!(
            match hp.default_value() {
                Value::Float(v) => v,
                other => panic!("unexpected default {other:?}"),
            },
            1.0_f64.exp()
        );
    }

    #[test]
    fn normal_float_validate_rejects_bad_sigma() {
        assert!(matches!(
            Hyperparameter::from(NormalFloat::new("b", 1.0, 0.0)).validate(),
            Err(Error::InvalidSigma(_))
        ));
    }

    #[test]
    fn sampling_respects_bounds() {
        let mut rng = fastrand::Rng::with_seed(42);
        let int_hp: Hyperparameter = UniformInt::new("n", 1, 10).into();
        let float_hp: Hyperparameter = UniformFloat::new("lr", 1e-5, 1e-1).log().into();
        let cat_hp: Hyperparameter = Categorical::new("opt", ["sgd", "adam"]).into();
        for _ in 0..200 {
            assert!(int_hp.is_legal(&int_hp.sample(&mut rng)));
            assert!(float_hp.is_legal(&float_hp.sample(&mut rng)));
            assert!(cat_hp.is_legal(&cat_hp.sample(&mut rng)));
        }
    }

    #[test]
    fn sampling_is_reproducible() {
        let hp: Hyperparameter = NormalFloat::new("b", 1.0, 2.0).log().into();
        let mut a = fastrand::Rng::with_seed(1);
        let mut b = fastrand::Rng::with_seed(1);
        for _ in 0..50 {
            assert_eq!(hp.sample(&mut a), hp.sample(&mut b));
        }
    }

    #[test]
    fn equality_is_structural() {
        let a: Hyperparameter = UniformInt::new("n", 1, 10).into();
        let b: Hyperparameter = UniformInt::new("n", 1, 10).into();
        let c: Hyperparameter = UniformInt::new("n", 1, 11).into();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Hyperparameter::from(UniformFloat::new("n", 1.0, 10.0)));
    }
}
