//! The configuration space: hyperparameters, their dependency graph, and
//! the operations over it.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::condition::Condition;
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::forbidden::ForbiddenClause;
use crate::hyperparameter::Hyperparameter;
use crate::value::Value;

/// Whole-configuration redraws attempted before rejection sampling gives up.
/// Unreachable for spaces built through [`ConfigurationSpace::add_forbidden_clause`],
/// which keeps the default configuration legal.
const MAX_SAMPLE_ATTEMPTS: usize = 10_000;

/// A typed, constrained schema over hyperparameters.
///
/// The space owns its hyperparameters, the activation conditions between
/// them, and the forbidden clauses excluding value combinations. Parameters
/// are kept in a deterministic topological order (parents before children)
/// that is recomputed on every mutation; the order defines the slot layout
/// of every [`Configuration`] vector bound to this space.
///
/// # Example
///
/// ```
/// use configspace::prelude::*;
///
/// # fn main() -> configspace::Result<()> {
/// let mut space = ConfigurationSpace::with_seed(42);
/// space.add_hyperparameter(Categorical::new("optimizer", ["sgd", "adam"]))?;
/// space.add_hyperparameter(UniformFloat::new("learning_rate", 1e-5, 1e-1).log())?;
/// space.add_hyperparameter(UniformInt::new("momentum_window", 1, 10))?;
/// space.add_condition(Condition::equals("momentum_window", "optimizer", "sgd"))?;
///
/// let config = space.sample_configuration()?;
/// assert!(space.check_configuration(&config).is_ok());
/// # Ok(()) }
/// ```
pub struct ConfigurationSpace {
    /// Hyperparameters in topological order; the position is the vector slot.
    hyperparameters: Vec<Hyperparameter>,
    /// Name to topological index.
    index_of: HashMap<String, usize>,
    /// Top-level conditions, at most one per child.
    conditions: Vec<Condition>,
    forbidden: Vec<ForbiddenClause>,
    /// The sampling stream. Locked per draw so sampling takes `&self`.
    rng: Mutex<fastrand::Rng>,
}

impl ConfigurationSpace {
    /// Creates an empty configuration space with a random sampling seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hyperparameters: Vec::new(),
            index_of: HashMap::new(),
            conditions: Vec::new(),
            forbidden: Vec::new(),
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates an empty configuration space with a fixed sampling seed.
    ///
    /// Two spaces with equal structure and equal seeds sample identical
    /// configuration sequences.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
            ..Self::new()
        }
    }

    /// Reseeds the sampling stream.
    pub fn seed(&self, seed: u64) {
        *self.rng.lock() = fastrand::Rng::with_seed(seed);
    }

    /// Returns the number of hyperparameters in the space.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hyperparameters.len()
    }

    /// Returns whether the space has no hyperparameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hyperparameters.is_empty()
    }

    /// Adds a hyperparameter and recomputes the topological indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition fails validation or the name is
    /// already taken.
    pub fn add_hyperparameter(
        &mut self,
        hp: impl Into<Hyperparameter>,
    ) -> Result<&Hyperparameter> {
        let hp = hp.into();
        hp.validate()?;
        if self.index_of.contains_key(hp.name()) {
            return Err(Error::DuplicateHyperparameter(hp.name().to_string()));
        }
        trace_debug!("adding hyperparameter {}", hp.name());
        let name = hp.name().to_string();
        self.hyperparameters.push(hp);
        self.recompute_order();
        let idx = self
            .index_of
            .get(&name)
            .copied()
            .ok_or(Error::Internal("freshly added hyperparameter lost"))?;
        Ok(&self.hyperparameters[idx])
    }

    /// Adds a top-level condition (or conjunction) and recomputes the
    /// topological indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the child or any referenced parent is not a
    /// member of the space, the child already carries a top-level
    /// condition, or the new edges would create a cycle.
    pub fn add_condition(&mut self, condition: Condition) -> Result<&Condition> {
        if !self.index_of.contains_key(condition.child()) {
            return Err(Error::UnknownChild(condition.child().to_string()));
        }
        for parent in condition.parents() {
            if !self.index_of.contains_key(parent) {
                return Err(Error::UnknownParent(parent.to_string()));
            }
        }
        if self.condition_of(condition.child()).is_some() {
            return Err(Error::AmbiguousCondition {
                child: condition.child().to_string(),
            });
        }
        if let Some(cycle) = self.find_cycle(&condition) {
            return Err(Error::CycleDetected { cycle });
        }
        trace_debug!("adding condition {}", condition);
        self.conditions.push(condition);
        self.recompute_order();
        self.conditions
            .last()
            .ok_or(Error::Internal("freshly added condition lost"))
    }

    /// Adds a forbidden clause after verifying that the space's default
    /// configuration stays legal.
    ///
    /// # Errors
    ///
    /// Returns an error if the clause references an unknown hyperparameter
    /// or the default configuration would violate it.
    pub fn add_forbidden_clause(&mut self, clause: ForbiddenClause) -> Result<&ForbiddenClause> {
        for name in clause.names() {
            if !self.index_of.contains_key(name) {
                return Err(Error::UnknownHyperparameter(name.to_string()));
            }
        }
        if clause.is_violated(&self.default_assignment()) {
            return Err(Error::ForbiddenDefault(clause.to_string()));
        }
        trace_debug!("adding forbidden clause {}", clause);
        self.forbidden.push(clause);
        self.forbidden
            .last()
            .ok_or(Error::Internal("freshly added forbidden clause lost"))
    }

    /// Imports every hyperparameter, condition, and forbidden clause of
    /// `other`, renaming each parameter to `prefix + delimiter + name`.
    /// The relative topology of the imported subgraph is preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if any renamed parameter collides with an existing
    /// one.
    pub fn add_configuration_space(
        &mut self,
        prefix: &str,
        other: &ConfigurationSpace,
        delimiter: &str,
    ) -> Result<()> {
        trace_info!(
            "importing {} hyperparameters under prefix {}",
            other.len(),
            prefix
        );
        let rename = |name: &str| format!("{prefix}{delimiter}{name}");
        for hp in other.get_hyperparameters() {
            self.add_hyperparameter(hp.with_name(rename(hp.name())))?;
        }
        for condition in other.get_conditions() {
            self.add_condition(condition.renamed(&rename))?;
        }
        for clause in other.get_forbidden_clauses() {
            self.add_forbidden_clause(clause.renamed(&rename))?;
        }
        Ok(())
    }

    /// Looks up a hyperparameter by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a member of the space.
    pub fn get_hyperparameter(&self, name: &str) -> Result<&Hyperparameter> {
        self.index_of
            .get(name)
            .map(|&i| &self.hyperparameters[i])
            .ok_or_else(|| Error::UnknownHyperparameter(name.to_string()))
    }

    /// Returns all hyperparameters in topological order.
    #[must_use]
    pub fn get_hyperparameters(&self) -> &[Hyperparameter] {
        &self.hyperparameters
    }

    /// Returns all top-level conditions in insertion order.
    #[must_use]
    pub fn get_conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns all forbidden clauses in insertion order.
    #[must_use]
    pub fn get_forbidden_clauses(&self) -> &[ForbiddenClause] {
        &self.forbidden
    }

    /// Returns the topological index of a hyperparameter, which is also its
    /// slot in every configuration vector of this space.
    #[must_use]
    pub fn hyperparameter_index(&self, name: &str) -> Option<usize> {
        self.index_of.get(name).copied()
    }

    /// Returns the conditions controlling `name` (at most one top-level
    /// condition or conjunction).
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a member of the space.
    pub fn get_parent_conditions_of(&self, name: &str) -> Result<Vec<&Condition>> {
        self.require(name)?;
        Ok(self
            .conditions
            .iter()
            .filter(|c| c.child() == name)
            .collect())
    }

    /// Returns the conditions in which `name` participates as a parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a member of the space.
    pub fn get_child_conditions_of(&self, name: &str) -> Result<Vec<&Condition>> {
        self.require(name)?;
        Ok(self
            .conditions
            .iter()
            .filter(|c| c.parents().contains(&name))
            .collect())
    }

    /// Returns the hyperparameters that `name` depends on.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a member of the space.
    pub fn get_parents_of(&self, name: &str) -> Result<Vec<&Hyperparameter>> {
        let mut parents = Vec::new();
        for condition in self.get_parent_conditions_of(name)? {
            for parent in condition.parents() {
                if !parents.iter().any(|p: &&Hyperparameter| p.name() == parent) {
                    parents.push(self.get_hyperparameter(parent)?);
                }
            }
        }
        Ok(parents)
    }

    /// Returns the hyperparameters that depend on `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a member of the space.
    pub fn get_children_of(&self, name: &str) -> Result<Vec<&Hyperparameter>> {
        let mut children = Vec::new();
        for condition in self.get_child_conditions_of(name)? {
            let child = condition.child();
            if !children.iter().any(|c: &&Hyperparameter| c.name() == child) {
                children.push(self.get_hyperparameter(child)?);
            }
        }
        Ok(children)
    }

    /// Returns the hyperparameters with no controlling condition.
    #[must_use]
    pub fn get_all_unconditional_hyperparameters(&self) -> Vec<&Hyperparameter> {
        self.hyperparameters
            .iter()
            .filter(|hp| self.condition_of(hp.name()).is_none())
            .collect()
    }

    /// Re-runs full validation (activation and forbidden clauses) on a
    /// configuration of this space.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is bound to a different space
    /// or violates activation or forbidden constraints.
    pub fn check_configuration(&self, configuration: &Configuration<'_>) -> Result<()> {
        if !core::ptr::eq(self, configuration.space()) {
            return Err(Error::ForeignConfiguration);
        }
        self.validate_vector(configuration.vector())
    }

    /// Re-runs full validation on a raw normalized vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector has the wrong length or violates
    /// activation or forbidden constraints.
    pub fn check_configuration_vector_representation(&self, vector: &[f64]) -> Result<()> {
        self.validate_vector(vector)
    }

    /// Builds the configuration holding every active hyperparameter's
    /// default value.
    ///
    /// # Errors
    ///
    /// Returns an error if a forbidden clause matches the defaults, which
    /// [`add_forbidden_clause`](Self::add_forbidden_clause) prevents for
    /// clauses added through it.
    pub fn get_default_configuration(&self) -> Result<Configuration<'_>> {
        let mut vector = vec![f64::NAN; self.hyperparameters.len()];
        let mut values: HashMap<String, Value> = HashMap::new();
        for (i, hp) in self.hyperparameters.iter().enumerate() {
            let active = self
                .condition_of(hp.name())
                .is_none_or(|c| c.evaluate(&values));
            if active {
                let default = hp.default_value();
                vector[i] = hp
                    .to_vector(&default)
                    .ok_or(Error::Internal("default value outside its own domain"))?;
                values.insert(hp.name().to_string(), default);
            }
        }
        self.check_forbidden(&values)?;
        Ok(Configuration::from_parts(self, vector))
    }

    /// Samples one valid configuration.
    ///
    /// Parameters are visited in topological order; a parameter whose
    /// controlling condition evaluates false over the values sampled so far
    /// stays unset. Draws matching a forbidden clause are rejected and
    /// redrawn.
    ///
    /// # Errors
    ///
    /// Returns an error if no legal configuration is found within the
    /// retry cap.
    pub fn sample_configuration(&self) -> Result<Configuration<'_>> {
        for _attempt in 0..MAX_SAMPLE_ATTEMPTS {
            let vector = self.draw_vector();
            if self.check_forbidden(&self.values_from_vector(&vector)).is_ok() {
                return Ok(Configuration::from_parts(self, vector));
            }
            trace_debug!("sample attempt {} rejected by a forbidden clause", _attempt);
        }
        Err(Error::SamplingExhausted {
            attempts: MAX_SAMPLE_ATTEMPTS,
        })
    }

    /// Samples `size` valid configurations.
    ///
    /// # Errors
    ///
    /// Returns an error if any draw exhausts the retry cap.
    pub fn sample_configurations(&self, size: usize) -> Result<Vec<Configuration<'_>>> {
        (0..size).map(|_| self.sample_configuration()).collect()
    }

    /// Returns the top-level condition controlling `child`, if any.
    pub(crate) fn condition_of(&self, child: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.child() == child)
    }

    /// Activation-aware default values of every active hyperparameter.
    pub(crate) fn default_assignment(&self) -> HashMap<String, Value> {
        let mut values: HashMap<String, Value> = HashMap::new();
        for hp in &self.hyperparameters {
            let active = self
                .condition_of(hp.name())
                .is_none_or(|c| c.evaluate(&values));
            if active {
                values.insert(hp.name().to_string(), hp.default_value());
            }
        }
        values
    }

    /// Derives the sparse value mapping of the set slots of a vector.
    pub(crate) fn values_from_vector(&self, vector: &[f64]) -> HashMap<String, Value> {
        self.hyperparameters
            .iter()
            .zip(vector)
            .filter(|(_, x)| !x.is_nan())
            .map(|(hp, x)| (hp.name().to_string(), hp.from_vector(*x)))
            .collect()
    }

    /// Fails on the first forbidden clause matching `values`.
    pub(crate) fn check_forbidden(&self, values: &HashMap<String, Value>) -> Result<()> {
        for clause in &self.forbidden {
            if clause.is_violated(values) {
                return Err(Error::ForbiddenViolation(clause.to_string()));
            }
        }
        Ok(())
    }

    /// Full activation + forbidden validation of a dense vector.
    pub(crate) fn validate_vector(&self, vector: &[f64]) -> Result<()> {
        if vector.len() != self.hyperparameters.len() {
            return Err(Error::VectorLengthMismatch {
                expected: self.hyperparameters.len(),
                got: vector.len(),
            });
        }
        let mut active_values: HashMap<String, Value> = HashMap::new();
        for (i, hp) in self.hyperparameters.iter().enumerate() {
            let active = self
                .condition_of(hp.name())
                .is_none_or(|c| c.evaluate(&active_values));
            let set = !vector[i].is_nan();
            if active && !set {
                return Err(Error::ActiveParameterMissing(hp.name().to_string()));
            }
            if !active && set {
                return Err(Error::InactiveParameter(hp.name().to_string()));
            }
            if set {
                active_values.insert(hp.name().to_string(), hp.from_vector(vector[i]));
            }
        }
        self.check_forbidden(&active_values)
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.index_of.contains_key(name) {
            Ok(())
        } else {
            Err(Error::UnknownHyperparameter(name.to_string()))
        }
    }

    fn draw_vector(&self) -> Vec<f64> {
        let mut rng = self.rng.lock();
        let mut vector = vec![f64::NAN; self.hyperparameters.len()];
        let mut values: HashMap<String, Value> = HashMap::new();
        for (i, hp) in self.hyperparameters.iter().enumerate() {
            let active = self
                .condition_of(hp.name())
                .is_none_or(|c| c.evaluate(&values));
            if active {
                let x = hp.sample_vector(&mut rng);
                vector[i] = x;
                values.insert(hp.name().to_string(), hp.from_vector(x));
            }
        }
        vector
    }

    /// Ancestor depth of every hyperparameter: 0 for unconditioned
    /// parameters, `1 + max(depth(parent))` otherwise.
    fn compute_depths(&self) -> HashMap<String, usize> {
        fn depth_of(
            conditions: &[Condition],
            name: &str,
            memo: &mut HashMap<String, usize>,
        ) -> usize {
            if let Some(d) = memo.get(name) {
                return *d;
            }
            let d = match conditions.iter().find(|c| c.child() == name) {
                None => 0,
                Some(condition) => {
                    1 + condition
                        .parents()
                        .iter()
                        .map(|p| depth_of(conditions, p, memo))
                        .max()
                        .unwrap_or(0)
                }
            };
            memo.insert(name.to_string(), d);
            d
        }

        let mut memo = HashMap::new();
        for hp in &self.hyperparameters {
            depth_of(&self.conditions, hp.name(), &mut memo);
        }
        memo
    }

    /// Recomputes the topological order as a pure function of the current
    /// parameters and conditions: sort by (ancestor depth, name). Parents
    /// have strictly smaller depth than their children, so every condition
    /// edge satisfies parent-index < child-index; ties break alphabetically
    /// for determinism.
    fn recompute_order(&mut self) {
        let depths = self.compute_depths();
        self.hyperparameters.sort_by(|a, b| {
            let da = depths.get(a.name()).copied().unwrap_or(0);
            let db = depths.get(b.name()).copied().unwrap_or(0);
            da.cmp(&db).then_with(|| a.name().cmp(b.name()))
        });
        self.index_of = self
            .hyperparameters
            .iter()
            .enumerate()
            .map(|(i, hp)| (hp.name().to_string(), i))
            .collect();
    }

    /// Searches the prospective graph (existing conditions plus the
    /// candidate) for a cycle, returning it as an ordered name list.
    fn find_cycle(&self, candidate: &Condition) -> Option<Vec<String>> {
        fn dfs<'a>(
            node: &'a str,
            edges: &HashMap<&'a str, Vec<&'a str>>,
            state: &mut HashMap<&'a str, u8>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            state.insert(node, 1);
            path.push(node);
            if let Some(children) = edges.get(node) {
                for &next in children {
                    match state.get(next).copied().unwrap_or(0) {
                        0 => {
                            if let Some(cycle) = dfs(next, edges, state, path) {
                                return Some(cycle);
                            }
                        }
                        1 => {
                            let start = path.iter().position(|&n| n == next).unwrap_or(0);
                            return Some(path[start..].iter().map(ToString::to_string).collect());
                        }
                        _ => {}
                    }
                }
            }
            path.pop();
            state.insert(node, 2);
            None
        }

        let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
        for condition in self.conditions.iter().chain(core::iter::once(candidate)) {
            for parent in condition.parents() {
                edges.entry(parent).or_default().push(condition.child());
            }
        }
        let mut nodes: Vec<&str> = edges.keys().copied().collect();
        nodes.sort_unstable();

        let mut state: HashMap<&str, u8> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();
        for node in nodes {
            if state.get(node).copied().unwrap_or(0) == 0 {
                if let Some(cycle) = dfs(node, &edges, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}

impl Default for ConfigurationSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ConfigurationSpace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConfigurationSpace")
            .field("hyperparameters", &self.hyperparameters)
            .field("conditions", &self.conditions)
            .field("forbidden", &self.forbidden)
            .finish_non_exhaustive()
    }
}

/// Order-independent slice equality counting duplicates on both sides.
fn multiset_eq<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len()
        && a.iter().all(|x| {
            a.iter().filter(|y| *y == x).count() == b.iter().filter(|y| *y == x).count()
        })
}

/// Spaces are equal when their hyperparameters, conditions, and forbidden
/// clauses are equal as multisets; the sampling stream is ignored.
impl PartialEq for ConfigurationSpace {
    fn eq(&self, other: &Self) -> bool {
        self.hyperparameters.len() == other.hyperparameters.len()
            && self
                .hyperparameters
                .iter()
                .all(|hp| other.get_hyperparameter(hp.name()).is_ok_and(|o| o == hp))
            && multiset_eq(&self.conditions, &other.conditions)
            && multiset_eq(&self.forbidden, &other.forbidden)
    }
}

impl core::fmt::Display for ConfigurationSpace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Configuration space object:")?;
        writeln!(f, "  Hyperparameters:")?;
        for hp in &self.hyperparameters {
            writeln!(f, "    {hp}")?;
        }
        if !self.conditions.is_empty() {
            writeln!(f, "  Conditions:")?;
            for condition in &self.conditions {
                writeln!(f, "    {condition}")?;
            }
        }
        if !self.forbidden.is_empty() {
            writeln!(f, "  Forbidden Clauses:")?;
            for clause in &self.forbidden {
                writeln!(f, "    {clause}")?;
            }
        }
        Ok(())
    }
}
