use std::rc::Rc;

use crate::{
    Method,
    methods::{
        AdamsBashforth2, AdamsBashforth3, AdamsBashforth4, BackwardEuler, ForwardEuler, Heun,
        HeunEuler, RK2, RK4, RKFehlberg, ThetaRule,
    },
};

/// Every built-in method, in listing order.
fn builtin() -> [Rc<dyn Method>; 11] {
    [
        Rc::new(ForwardEuler),
        Rc::new(Heun),
        Rc::new(RK2),
        Rc::new(RK4),
        Rc::new(ThetaRule),
        Rc::new(BackwardEuler),
        Rc::new(AdamsBashforth2),
        Rc::new(AdamsBashforth3),
        Rc::new(AdamsBashforth4),
        Rc::new(HeunEuler),
        Rc::new(RKFehlberg),
    ]
}

/// Looks up a built-in method by its canonical name.
#[must_use]
pub fn method(name: &str) -> Option<Rc<dyn Method>> {
    builtin().into_iter().find(|method| method.name() == name)
}

/// Names and one-line descriptions of the built-in methods.
#[must_use]
pub fn list_methods() -> Vec<(&'static str, &'static str)> {
    builtin()
        .iter()
        .map(|method| (method.name(), method.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = list_methods().into_iter().map(|(name, _)| name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 11);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(method("RK4").map(|m| m.name()), Some("RK4"));
        assert_eq!(
            method("AdamsBashforth3").map(|m| m.description()),
            Some("Explicit 3rd-order Adams-Bashforth method")
        );
        assert!(method("rk4").is_none());
    }
}
