//! End-to-end tests exercising space construction, sampling, and
//! validation together.

use std::collections::HashMap;

use configspace::prelude::*;

/// A small AutoML-style space: the choice of classifier activates either
/// the KNN branch or the extra-trees branch, and the distance metric has a
/// conditional sub-parameter of its own.
fn automl_space(seed: u64) -> ConfigurationSpace {
    let mut cs = ConfigurationSpace::with_seed(seed);
    cs.add_hyperparameter(Categorical::new("classifier", ["knn", "extra_trees"]))
        .unwrap();
    cs.add_hyperparameter(Categorical::new("metric", ["euclidean", "manhattan", "other"]))
        .unwrap();
    cs.add_hyperparameter(UniformInt::new("n_neighbors", 1, 30))
        .unwrap();
    cs.add_hyperparameter(UniformInt::new("n_estimators", 10, 100))
        .unwrap();
    cs.add_hyperparameter(UniformFloat::new("p", 1.0, 3.0))
        .unwrap();

    cs.add_condition(Condition::equals("n_neighbors", "classifier", "knn"))
        .unwrap();
    cs.add_condition(Condition::equals("n_estimators", "classifier", "extra_trees"))
        .unwrap();
    cs.add_condition(Condition::equals("p", "metric", "other"))
        .unwrap();
    cs
}

#[test]
fn sampled_configurations_are_always_valid() {
    let cs = automl_space(1);
    for config in cs.sample_configurations(100).unwrap() {
        cs.check_configuration(&config).unwrap();
        cs.check_configuration_vector_representation(config.vector())
            .unwrap();

        let classifier = config.get("classifier").unwrap().unwrap();
        assert_eq!(
            config.get("n_neighbors").unwrap().is_some(),
            classifier == "knn".into()
        );
        assert_eq!(
            config.get("n_estimators").unwrap().is_some(),
            classifier == "extra_trees".into()
        );
        let metric = config.get("metric").unwrap().unwrap();
        assert_eq!(config.get("p").unwrap().is_some(), metric == "other".into());
    }
}

#[test]
fn equal_seeds_reproduce_equal_sample_sequences() {
    for seed in [0, 1, 7, 42, 1234] {
        let cs1 = automl_space(seed);
        let cs2 = automl_space(seed);
        for _ in 0..100 {
            let a = cs1.sample_configuration().unwrap();
            let b = cs2.sample_configuration().unwrap();
            assert_eq!(a.get_dictionary(), b.get_dictionary());
            for (x, y) in a.vector().iter().zip(b.vector()) {
                assert!(x == y || (x.is_nan() && y.is_nan()), "seed {seed}");
            }
        }
    }
}

#[test]
fn reseeding_restarts_the_stream() {
    let cs = automl_space(9);
    let first: Vec<_> = (0..20)
        .map(|_| cs.sample_configuration().unwrap().get_dictionary())
        .collect();
    cs.seed(9);
    let second: Vec<_> = (0..20)
        .map(|_| cs.sample_configuration().unwrap().get_dictionary())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn forbidden_clauses_are_enforced_everywhere() {
    let mut cs = ConfigurationSpace::with_seed(5);
    cs.add_hyperparameter(Categorical::new("x", [0, 1])).unwrap();
    cs.add_hyperparameter(Categorical::new("y", [0, 1])).unwrap();
    cs.add_forbidden_clause(ForbiddenClause::equals("x", 1))
        .unwrap();

    // Sampling never produces the forbidden value.
    for config in cs.sample_configurations(100).unwrap() {
        assert_eq!(config.get("x").unwrap(), Some(0.into()));
    }

    // Explicit construction is rejected.
    let values: HashMap<String, Value> =
        [("x".to_string(), 1.into()), ("y".to_string(), 0.into())].into();
    assert!(matches!(
        Configuration::from_values(&cs, &values),
        Err(Error::ForbiddenViolation(_))
    ));

    // Mutation is rejected.
    let mut config = cs.get_default_configuration().unwrap();
    assert!(config.set("x", 1).is_err());
    assert!(config.set("y", 1).is_ok());
}

#[test]
fn default_configuration_is_valid_and_deterministic() {
    let cs = automl_space(2);
    let config = cs.get_default_configuration().unwrap();
    cs.check_configuration(&config).unwrap();
    assert_eq!(config, cs.get_default_configuration().unwrap());

    // Defaults activate only the branch selected by the default classifier.
    assert_eq!(config.get("classifier").unwrap(), Some("knn".into()));
    assert_eq!(config.get("n_neighbors").unwrap(), Some(15.into()));
    assert_eq!(config.get("n_estimators").unwrap(), None);
}

#[test]
fn composed_spaces_sample_like_their_parts() {
    let mut outer = ConfigurationSpace::with_seed(3);
    outer
        .add_hyperparameter(Categorical::new("top", ["a", "b"]))
        .unwrap();
    outer
        .add_configuration_space("p", &automl_space(0), "__")
        .unwrap();

    assert!(outer.get_hyperparameter("p__classifier").is_ok());
    assert!(outer.get_hyperparameter("classifier").is_err());

    for config in outer.sample_configurations(50).unwrap() {
        outer.check_configuration(&config).unwrap();
        let classifier = config.get("p__classifier").unwrap().unwrap();
        assert_eq!(
            config.get("p__n_neighbors").unwrap().is_some(),
            classifier == "knn".into()
        );
    }
}

#[test]
fn values_and_vector_views_agree() {
    let cs = automl_space(4);
    for config in cs.sample_configurations(25).unwrap() {
        let rebuilt = Configuration::from_vector(&cs, config.vector().to_vec()).unwrap();
        assert_eq!(rebuilt, config);
        assert_eq!(rebuilt.get_dictionary(), config.get_dictionary());

        let dict: HashMap<String, Value> = config.get_dictionary().into_iter().collect();
        let from_values = Configuration::from_values(&cs, &dict).unwrap();
        assert_eq!(from_values.get_dictionary(), config.get_dictionary());
    }
}

#[test]
fn construction_errors_surface_in_order() {
    let mut cs = ConfigurationSpace::new();
    cs.add_hyperparameter(Categorical::new("parent", [0, 1]))
        .unwrap();
    cs.add_hyperparameter(UniformInt::new("child", 0, 10))
        .unwrap();
    cs.add_condition(Condition::equals("child", "parent", 0))
        .unwrap();

    // A cycle across the existing edge is reported with its member names.
    match cs.add_condition(Condition::equals("parent", "child", 5)) {
        Err(Error::CycleDetected { cycle }) => {
            assert_eq!(cycle, vec!["child".to_string(), "parent".to_string()]);
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }

    // A second top-level condition on the same child is ambiguous.
    assert!(matches!(
        cs.add_condition(Condition::equals("child", "parent", 1)),
        Err(Error::AmbiguousCondition { .. })
    ));
}
