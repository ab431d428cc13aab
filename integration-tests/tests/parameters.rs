use skein_core::{ConfigError, Configuration, Kind, Value};
use skein_solvers::{Error, Solver, list_methods, registry};

use integration_tests::decay;

/// A value of `kind` that no registered spec accepts for a numeric parameter.
fn wrong_kind(kinds: &[Kind]) -> Value {
    if kinds.contains(&Kind::Text) {
        Value::from(1.5)
    } else {
        Value::from("not a number")
    }
}

#[test]
fn every_parameter_round_trips() {
    let registry = registry();
    let names: Vec<&str> = registry.iter().map(|spec| spec.name()).collect();
    let mut config = Configuration::new(registry, &[], &names).unwrap();

    for spec in registry.iter() {
        if let Some(default) = spec.default() {
            config.set(spec.name(), default.clone()).unwrap();
            assert_eq!(config.get(spec.name()).unwrap(), Some(default), "{}", spec.name());
            assert!(config.is_explicit(spec.name()));
        }
    }
}

#[test]
fn wrong_kinds_are_rejected() {
    let registry = registry();
    let names: Vec<&str> = registry.iter().map(|spec| spec.name()).collect();
    let mut config = Configuration::new(registry, &[], &names).unwrap();

    for spec in registry.iter() {
        let before = config.get(spec.name()).unwrap().cloned();
        let err = config.set(spec.name(), wrong_kind(spec.kinds())).unwrap_err();

        assert!(
            matches!(err, ConfigError::InvalidParameterValue { ref name, .. } if name == spec.name()),
            "{}: {err}",
            spec.name()
        );
        assert_eq!(config.get(spec.name()).unwrap().cloned(), before);
    }
}

#[test]
fn constraints_are_enforced() {
    let mut solver = Solver::by_name("ThetaRule", decay()).unwrap();
    for (name, value) in [
        ("theta", Value::from(1.5)),
        ("theta", Value::from(-0.1)),
        ("max_iter", Value::from(0)),
        ("eps_iter", Value::from(0.0)),
    ] {
        let err = solver.set(name, value).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidParameterValue { .. })));
    }

    let mut solver = Solver::by_name("AdamsBashforth2", decay()).unwrap();
    assert!(solver.set("start_method", "RK4").is_ok());
    assert!(solver.set("start_method", "BackwardEuler").is_err());

    let mut solver = Solver::by_name("RKFehlberg", decay()).unwrap();
    assert!(solver.set("safety", 1.0).is_ok());
    assert!(solver.set("safety", 1.5).is_err());
    assert!(solver.set("max_retries", 0).is_ok());
    assert!(solver.set("max_retries", 2.5).is_err());
}

#[test]
fn every_method_accepts_its_defaults() {
    for (name, description) in list_methods() {
        assert!(!description.is_empty());

        let solver = Solver::by_name(name, decay()).unwrap();
        let entries: Vec<(&str, Value)> = solver
            .parameters()
            .map(|(name, value)| (name, value.clone()))
            .collect();

        let mut copy = Solver::by_name(name, decay()).unwrap();
        copy.set_many(entries).unwrap();
        assert_eq!(
            copy.parameters().collect::<Vec<_>>(),
            solver.parameters().collect::<Vec<_>>(),
            "{name}"
        );
    }
}

#[test]
fn unknown_parameter_is_reported_by_name() {
    let mut solver = Solver::by_name("RK4", decay()).unwrap();

    let err = solver.set("rtol", 1e-3).unwrap_err();

    assert_eq!(err.to_string(), "invalid configuration: unknown parameter `rtol`");
}
