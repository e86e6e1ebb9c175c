#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when registering a hyperparameter whose name is taken.
    #[error("hyperparameter '{0}' is already in the configuration space")]
    DuplicateHyperparameter(String),

    /// Returned when a lookup references a hyperparameter that was never added.
    #[error("hyperparameter '{0}' does not exist in this configuration space")]
    UnknownHyperparameter(String),

    /// Returned when a condition's child is not a member of the space.
    #[error("child hyperparameter '{0}' not in configuration space")]
    UnknownChild(String),

    /// Returned when a condition's parent is not a member of the space.
    #[error("parent hyperparameter '{0}' not in configuration space")]
    UnknownParent(String),

    /// Returned when a child already carries a top-level condition.
    #[error(
        "adding a second top-level condition for hyperparameter '{child}' is ambiguous, \
         use a conjunction instead"
    )]
    AmbiguousCondition {
        /// The child hyperparameter that is already conditioned.
        child: String,
    },

    /// Returned when adding a condition would make the dependency graph cyclic.
    #[error("hyperparameter conditions contain a cycle: [{}]", cycle.join(", "))]
    CycleDetected {
        /// The offending cycle as an ordered list of hyperparameter names.
        cycle: Vec<String>,
    },

    /// Returned when a value is outside a hyperparameter's legal domain.
    #[error("illegal value {value} for hyperparameter {name}")]
    IllegalValue {
        /// The hyperparameter whose domain was violated.
        name: String,
        /// The offending value, rendered.
        value: String,
    },

    /// Returned when a hyperparameter's default does not satisfy its domain.
    #[error("illegal default value {value} for hyperparameter {name}")]
    IllegalDefault {
        /// The hyperparameter with the bad default.
        name: String,
        /// The offending default, rendered.
        value: String,
    },

    /// Returned when a value is supplied for a currently inactive hyperparameter.
    #[error("inactive hyperparameter '{0}' must not be specified")]
    InactiveParameter(String),

    /// Returned when an active hyperparameter is missing from a value mapping.
    #[error("active hyperparameter '{0}' not specified")]
    ActiveParameterMissing(String),

    /// Returned when an assignment matches a registered forbidden clause.
    #[error("configuration violates forbidden clause ({0})")]
    ForbiddenViolation(String),

    /// Returned when a forbidden clause would make the default configuration illegal.
    #[error("default configuration violates forbidden clause ({0})")]
    ForbiddenDefault(String),

    /// Returned when a configuration is constructed from both values and a vector.
    #[error("configuration specified both as values and as a vector, can only do one")]
    BothValuesAndVector,

    /// Returned when a configuration is constructed from neither values nor a vector.
    #[error("configuration specified neither as values nor as a vector")]
    NeitherValuesNorVector,

    /// Returned when a dense vector has the wrong number of slots for the space.
    #[error("vector length mismatch: expected {expected} entries, got {got}")]
    VectorLengthMismatch {
        /// The number of hyperparameters in the space.
        expected: usize,
        /// The length of the supplied vector.
        got: usize,
    },

    /// Returned when a configuration bound to another space is checked.
    #[error("configuration is bound to a different configuration space")]
    ForeignConfiguration,

    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low must be positive for log scale")]
    InvalidLogBounds,

    /// Returned when sigma is not positive.
    #[error("invalid sigma: {0} must be positive")]
    InvalidSigma(f64),

    /// Returned when a quantization factor is not positive.
    #[error("invalid quantization: q must be positive")]
    InvalidQuantization,

    /// Returned when categorical choices are empty.
    #[error("categorical choices cannot be empty")]
    EmptyChoices,

    /// Returned when a categorical choice appears more than once.
    #[error("duplicate choice {choice} for hyperparameter {name}")]
    DuplicateChoice {
        /// The hyperparameter with the duplicated choice.
        name: String,
        /// The duplicated choice, rendered.
        choice: String,
    },

    /// Returned when conjunction components do not share a single child.
    #[error("all conditions in a conjunction must share the same child hyperparameter")]
    ConjunctionChildMismatch,

    /// Returned when a conjunction is built from an empty component list.
    #[error("a conjunction requires at least one condition")]
    EmptyConjunction,

    /// Returned when rejection sampling gives up on finding a legal configuration.
    #[error("no legal configuration found after {attempts} sampling attempts")]
    SamplingExhausted {
        /// The number of whole-configuration draws that were rejected.
        attempts: usize,
    },

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
