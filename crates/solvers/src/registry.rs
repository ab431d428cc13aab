use std::{collections::BTreeMap, sync::LazyLock};

use skein_core::{ConfigError, Kind, ParameterRegistry, ParameterSpec, RegistryBuilder};

use crate::{adaptive, methods};

static REGISTRY: LazyLock<ParameterRegistry> = LazyLock::new(|| {
    // Known-good specs, covered by `builtin_specs_are_consistent`
    build().expect("built-in parameter specs are consistent")
});

/// The process-wide registry of every built-in parameter.
///
/// It is assembled on first use from the registration functions of the
/// solver and each method family, and never changes afterwards.
#[must_use]
pub fn registry() -> &'static ParameterRegistry {
    &REGISTRY
}

fn build() -> Result<ParameterRegistry, ConfigError> {
    let mut builder = ParameterRegistry::builder();
    register(&mut builder)?;
    methods::theta::register(&mut builder)?;
    methods::adams::register(&mut builder)?;
    adaptive::register(&mut builder)?;
    Ok(builder.build())
}

/// Registers the parameters every solver accepts.
fn register(builder: &mut RegistryBuilder) -> Result<(), ConfigError> {
    builder.register_all([
        ParameterSpec::new(
            "f_args",
            "Extra positional values passed to the right-hand side",
            &[Kind::Floats],
        )
        .with_default(Vec::<f64>::new()),
        ParameterSpec::new(
            "f_kwargs",
            "Extra named values passed to the right-hand side",
            &[Kind::Map],
        )
        .with_default(BTreeMap::<String, f64>::new()),
    ])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_specs_are_consistent() {
        let registry = build().expect("registry should build");
        for name in [
            "f_args",
            "f_kwargs",
            "theta",
            "max_iter",
            "eps_iter",
            "start_method",
            "rtol",
            "atol",
            "first_step",
            "min_step",
            "max_step",
            "safety",
            "max_retries",
            "max_growth",
            "min_shrink",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let registry = registry();
        let default = |name| registry.get(name).and_then(ParameterSpec::default).cloned();

        assert_eq!(default("theta"), Some(0.5.into()));
        assert_eq!(default("max_iter"), Some(25.into()));
        assert_eq!(default("eps_iter"), Some(1e-4.into()));
        assert_eq!(default("start_method"), Some("RK4".into()));
        assert_eq!(default("atol"), None);
    }
}
