//! Activation conditions over parent hyperparameter values.
//!
//! A condition makes a child hyperparameter relevant only when its parent
//! values satisfy a relation. Leaf relations compare one parent value
//! against a literal (or set of literals); [`Condition::and`] and
//! [`Condition::or`] combine conditions sharing the same child into a
//! recursive conjunction tree.
//!
//! Evaluation is total: a parent that is absent from the assignment makes
//! the relation false, never an error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// A boolean predicate deciding whether a child hyperparameter is active.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Condition {
    /// Active when the parent equals the literal.
    Equals {
        /// The dependent hyperparameter.
        child: String,
        /// The hyperparameter whose value is tested.
        parent: String,
        /// The literal the parent is compared against.
        value: Value,
    },
    /// Active when the parent differs from the literal.
    NotEquals {
        /// The dependent hyperparameter.
        child: String,
        /// The hyperparameter whose value is tested.
        parent: String,
        /// The literal the parent is compared against.
        value: Value,
    },
    /// Active when the parent is one of the listed values.
    In {
        /// The dependent hyperparameter.
        child: String,
        /// The hyperparameter whose value is tested.
        parent: String,
        /// The set of parent values activating the child.
        values: Vec<Value>,
    },
    /// Active when the parent is numerically less than the literal.
    LessThan {
        /// The dependent hyperparameter.
        child: String,
        /// The hyperparameter whose value is tested.
        parent: String,
        /// The literal the parent is compared against.
        value: Value,
    },
    /// Active when the parent is numerically greater than the literal.
    GreaterThan {
        /// The dependent hyperparameter.
        child: String,
        /// The hyperparameter whose value is tested.
        parent: String,
        /// The literal the parent is compared against.
        value: Value,
    },
    /// Active when every component condition is active.
    And {
        /// The shared dependent hyperparameter.
        child: String,
        /// The component conditions, all with the same child.
        components: Vec<Condition>,
    },
    /// Active when at least one component condition is active.
    Or {
        /// The shared dependent hyperparameter.
        child: String,
        /// The component conditions, all with the same child.
        components: Vec<Condition>,
    },
}

impl Condition {
    /// Creates an equality condition: `child` is active when `parent == value`.
    #[must_use]
    pub fn equals(
        child: impl Into<String>,
        parent: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Condition::Equals {
            child: child.into(),
            parent: parent.into(),
            value: value.into(),
        }
    }

    /// Creates an inequality condition: `child` is active when `parent != value`.
    #[must_use]
    pub fn not_equals(
        child: impl Into<String>,
        parent: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Condition::NotEquals {
            child: child.into(),
            parent: parent.into(),
            value: value.into(),
        }
    }

    /// Creates a set-membership condition: `child` is active when `parent`
    /// takes one of `values`.
    #[must_use]
    pub fn is_in<I, V>(child: impl Into<String>, parent: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition::In {
            child: child.into(),
            parent: parent.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an ordering condition: `child` is active when `parent < value`.
    #[must_use]
    pub fn less_than(
        child: impl Into<String>,
        parent: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Condition::LessThan {
            child: child.into(),
            parent: parent.into(),
            value: value.into(),
        }
    }

    /// Creates an ordering condition: `child` is active when `parent > value`.
    #[must_use]
    pub fn greater_than(
        child: impl Into<String>,
        parent: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Condition::GreaterThan {
            child: child.into(),
            parent: parent.into(),
            value: value.into(),
        }
    }

    /// Combines conditions sharing one child into an And conjunction.
    ///
    /// # Errors
    ///
    /// Returns an error if `components` is empty or the components do not
    /// all share the same child hyperparameter.
    pub fn and(components: Vec<Condition>) -> Result<Self> {
        let child = Self::common_child(&components)?;
        Ok(Condition::And { child, components })
    }

    /// Combines conditions sharing one child into an Or conjunction.
    ///
    /// # Errors
    ///
    /// Returns an error if `components` is empty or the components do not
    /// all share the same child hyperparameter.
    pub fn or(components: Vec<Condition>) -> Result<Self> {
        let child = Self::common_child(&components)?;
        Ok(Condition::Or { child, components })
    }

    fn common_child(components: &[Condition]) -> Result<String> {
        let first = components.first().ok_or(Error::EmptyConjunction)?;
        let child = first.child();
        if components.iter().any(|c| c.child() != child) {
            return Err(Error::ConjunctionChildMismatch);
        }
        Ok(child.to_string())
    }

    /// Returns the dependent (child) hyperparameter of this condition.
    #[must_use]
    pub fn child(&self) -> &str {
        match self {
            Condition::Equals { child, .. }
            | Condition::NotEquals { child, .. }
            | Condition::In { child, .. }
            | Condition::LessThan { child, .. }
            | Condition::GreaterThan { child, .. }
            | Condition::And { child, .. }
            | Condition::Or { child, .. } => child,
        }
    }

    /// Returns every parent referenced by the leaf relations of this
    /// condition, in depth-first order, without deduplication.
    #[must_use]
    pub fn parents(&self) -> Vec<&str> {
        match self {
            Condition::Equals { parent, .. }
            | Condition::NotEquals { parent, .. }
            | Condition::In { parent, .. }
            | Condition::LessThan { parent, .. }
            | Condition::GreaterThan { parent, .. } => vec![parent],
            Condition::And { components, .. } | Condition::Or { components, .. } => {
                components.iter().flat_map(Condition::parents).collect()
            }
        }
    }

    /// Evaluates this condition against a (possibly partial) assignment.
    ///
    /// A parent missing from the assignment makes its relation false.
    #[must_use]
    pub fn evaluate(&self, assignment: &HashMap<String, Value>) -> bool {
        match self {
            Condition::Equals { parent, value, .. } => {
                assignment.get(parent).is_some_and(|v| v == value)
            }
            Condition::NotEquals { parent, value, .. } => {
                assignment.get(parent).is_some_and(|v| v != value)
            }
            Condition::In { parent, values, .. } => {
                assignment.get(parent).is_some_and(|v| values.contains(v))
            }
            Condition::LessThan { parent, value, .. } => Self::compare(assignment, parent, value)
                .is_some_and(|ord| ord == core::cmp::Ordering::Less),
            Condition::GreaterThan { parent, value, .. } => Self::compare(assignment, parent, value)
                .is_some_and(|ord| ord == core::cmp::Ordering::Greater),
            Condition::And { components, .. } => components.iter().all(|c| c.evaluate(assignment)),
            Condition::Or { components, .. } => components.iter().any(|c| c.evaluate(assignment)),
        }
    }

    fn compare(
        assignment: &HashMap<String, Value>,
        parent: &str,
        value: &Value,
    ) -> Option<core::cmp::Ordering> {
        let lhs = assignment.get(parent)?.as_f64()?;
        let rhs = value.as_f64()?;
        lhs.partial_cmp(&rhs)
    }

    /// Returns a copy with every hyperparameter name rewritten by `rename`.
    /// Used for namespaced sub-space composition.
    pub(crate) fn renamed(&self, rename: &dyn Fn(&str) -> String) -> Condition {
        match self {
            Condition::Equals {
                child,
                parent,
                value,
            } => Condition::Equals {
                child: rename(child),
                parent: rename(parent),
                value: value.clone(),
            },
            Condition::NotEquals {
                child,
                parent,
                value,
            } => Condition::NotEquals {
                child: rename(child),
                parent: rename(parent),
                value: value.clone(),
            },
            Condition::In {
                child,
                parent,
                values,
            } => Condition::In {
                child: rename(child),
                parent: rename(parent),
                values: values.clone(),
            },
            Condition::LessThan {
                child,
                parent,
                value,
            } => Condition::LessThan {
                child: rename(child),
                parent: rename(parent),
                value: value.clone(),
            },
            Condition::GreaterThan {
                child,
                parent,
                value,
            } => Condition::GreaterThan {
                child: rename(child),
                parent: rename(parent),
                value: value.clone(),
            },
            Condition::And { child, components } => Condition::And {
                child: rename(child),
                components: components.iter().map(|c| c.renamed(rename)).collect(),
            },
            Condition::Or { child, components } => Condition::Or {
                child: rename(child),
                components: components.iter().map(|c| c.renamed(rename)).collect(),
            },
        }
    }

    /// Renders the boolean expression to the right of `child | `.
    /// Nested conjunctions are parenthesized.
    #[must_use]
    pub fn expression(&self) -> String {
        match self {
            Condition::Equals { parent, value, .. } => format!("{parent} == {}", value.repr()),
            Condition::NotEquals { parent, value, .. } => format!("{parent} != {}", value.repr()),
            Condition::In { parent, values, .. } => {
                let values = values
                    .iter()
                    .map(Value::repr)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{parent} in {{{values}}}")
            }
            Condition::LessThan { parent, value, .. } => format!("{parent} < {}", value.repr()),
            Condition::GreaterThan { parent, value, .. } => format!("{parent} > {}", value.repr()),
            Condition::And { components, .. } => Self::join_components(components, " && "),
            Condition::Or { components, .. } => Self::join_components(components, " || "),
        }
    }

    fn join_components(components: &[Condition], separator: &str) -> String {
        components
            .iter()
            .map(|c| match c {
                Condition::And { .. } | Condition::Or { .. } => format!("({})", c.expression()),
                _ => c.expression(),
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl core::fmt::Display for Condition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} | {}", self.child(), self.expression())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn equals_evaluates_against_parent_value() {
        let cond = Condition::equals("child", "parent", 0);
        assert!(cond.evaluate(&assignment(&[("parent", 0.into())])));
        assert!(!cond.evaluate(&assignment(&[("parent", 1.into())])));
    }

    #[test]
    fn absent_parent_is_false_not_an_error() {
        let cond = Condition::equals("child", "parent", 0);
        assert!(!cond.evaluate(&assignment(&[])));

        let cond = Condition::not_equals("child", "parent", 0);
        assert!(!cond.evaluate(&assignment(&[])));

        let cond = Condition::is_in("child", "parent", [0, 1]);
        assert!(!cond.evaluate(&assignment(&[])));
    }

    #[test]
    fn in_condition_checks_membership() {
        let cond = Condition::is_in("child", "parent", ["a", "b"]);
        assert!(cond.evaluate(&assignment(&[("parent", "a".into())])));
        assert!(!cond.evaluate(&assignment(&[("parent", "c".into())])));
    }

    #[test]
    fn ordering_conditions_compare_numerically() {
        let less = Condition::less_than("child", "parent", 5);
        assert!(less.evaluate(&assignment(&[("parent", 4.into())])));
        assert!(!less.evaluate(&assignment(&[("parent", 5.into())])));
        assert!(less.evaluate(&assignment(&[("parent", 4.5.into())])));
        // Strings have no ordering against numbers.
        assert!(!less.evaluate(&assignment(&[("parent", "low".into())])));

        let greater = Condition::greater_than("child", "parent", 5);
        assert!(greater.evaluate(&assignment(&[("parent", 6.into())])));
        assert!(!greater.evaluate(&assignment(&[("parent", 5.into())])));
    }

    #[test]
    fn conjunctions_require_a_shared_child() {
        let c1 = Condition::equals("and", "input1", 1);
        let c2 = Condition::equals("and", "input2", 1);
        let c3 = Condition::equals("other", "input1", 1);

        assert!(Condition::and(vec![c1.clone(), c2.clone()]).is_ok());
        assert!(matches!(
            Condition::and(vec![c1.clone(), c3]),
            Err(Error::ConjunctionChildMismatch)
        ));
        assert!(matches!(
            Condition::or(vec![]),
            Err(Error::EmptyConjunction)
        ));
        let conj = Condition::and(vec![c1, c2]).unwrap();
        assert_eq!(conj.child(), "and");
        assert_eq!(conj.parents(), vec!["input1", "input2"]);
    }

    #[test]
    #[allow(clippy::cast_possible_wrap)]
    fn conjunction_evaluation_is_recursive() {
        // (input1 == 1 && input2 != 1 || input3 in {1}) && input4 == 1 && input5 == 1
        let conj1 = Condition::and(vec![
            Condition::equals("AND", "input1", 1),
            Condition::not_equals("AND", "input2", 1),
        ])
        .unwrap();
        let conj2 = Condition::or(vec![conj1, Condition::is_in("AND", "input3", [1])]).unwrap();
        let conj3 = Condition::and(vec![
            conj2,
            Condition::equals("AND", "input4", 1),
            Condition::equals("AND", "input5", 1),
        ])
        .unwrap();

        let expected = [
            false, false, false, false, false, false, false, true, false, false, false, false,
            false, false, false, true, false, false, false, true, false, false, false, true, false,
            false, false, false, false, false, false, true,
        ];
        for (idx, want) in expected.iter().enumerate() {
            let bits: Vec<i64> = (0..5).map(|b| ((idx >> (4 - b)) & 1) as i64).collect();
            let assignment = assignment(&[
                ("input1", bits[0].into()),
                ("input2", bits[1].into()),
                ("input3", bits[2].into()),
                ("input4", bits[3].into()),
                ("input5", bits[4].into()),
            ]);
            assert_eq!(
                conj3.evaluate(&assignment),
                *want,
                "wrong outcome for inputs {bits:?}"
            );
        }
    }

    #[test]
    fn display_renders_child_pipe_expression() {
        assert_eq!(
            Condition::equals("child", "parent", 0).to_string(),
            "child | parent == 0"
        );
        assert_eq!(
            Condition::equals("metric", "classifier", "knn").to_string(),
            "metric | classifier == 'knn'"
        );
        assert_eq!(
            Condition::is_in("child", "parent", [1, 2]).to_string(),
            "child | parent in {1, 2}"
        );
        assert_eq!(
            Condition::less_than("child", "parent", 5).to_string(),
            "child | parent < 5"
        );
    }

    #[test]
    fn nested_conjunctions_are_parenthesized() {
        let conj1 = Condition::and(vec![
            Condition::equals("AND", "input1", 1),
            Condition::not_equals("AND", "input2", 1),
        ])
        .unwrap();
        let conj2 = Condition::or(vec![conj1, Condition::is_in("AND", "input3", [1])]).unwrap();
        let conj3 = Condition::and(vec![
            conj2,
            Condition::equals("AND", "input4", 1),
            Condition::equals("AND", "input5", 1),
        ])
        .unwrap();
        assert_eq!(
            conj3.to_string(),
            "AND | ((input1 == 1 && input2 != 1) || input3 in {1}) \
             && input4 == 1 && input5 == 1"
        );
    }

    #[test]
    fn renaming_rewrites_all_names() {
        let conj = Condition::and(vec![
            Condition::equals("b", "a", 0),
            Condition::is_in("b", "c", [1]),
        ])
        .unwrap();
        let renamed = conj.renamed(&|name: &str| format!("p__{name}"));
        assert_eq!(renamed.child(), "p__b");
        assert_eq!(renamed.parents(), vec!["p__a", "p__c"]);
        assert_eq!(renamed.to_string(), "p__b | p__a == 0 && p__c in {1}");
    }
}
