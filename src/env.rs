// SPDX-License-Identifier: MIT

//! Variable environment for expression evaluation

use std::collections::HashMap;

use crate::state::StateMap;
use crate::value::Scalar;

/// Variables visible to a single expression evaluation.
///
/// Built fresh per call from the agent's decisions and the agent-visible
/// turn counters; decisions win on key collision. System state never
/// enters an environment.
#[derive(Debug, Default)]
pub struct Environment {
    vars: HashMap<String, Scalar>,
}

impl Environment {
    /// Build the lookup table, coercing every value once.
    pub fn from_sources(decisions: &StateMap, condition_state: &StateMap) -> Self {
        let mut vars = HashMap::new();
        for (key, value) in decisions {
            vars.insert(key.clone(), Scalar::coerce(value));
        }
        for (key, value) in condition_state {
            vars.entry(key.clone())
                .or_insert_with(|| Scalar::coerce(value));
        }
        Self { vars }
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.vars.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map_of(pairs: Vec<(&str, serde_json::Value)>) -> StateMap {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_decisions_shadow_condition_state() {
        let decisions = map_of(vec![("status", json!("done"))]);
        let condition_state = map_of(vec![("status", json!("pending")), ("turns", json!(3))]);

        let env = Environment::from_sources(&decisions, &condition_state);
        assert_eq!(env.get("status"), Some(&Scalar::Text("done".to_string())));
        assert_eq!(env.get("turns"), Some(&Scalar::Number(3.0)));
    }

    #[test]
    fn test_coercion_applies_to_both_sources() {
        let decisions = map_of(vec![("approved", json!("yes"))]);
        let condition_state = map_of(vec![("blocked", json!("false"))]);

        let env = Environment::from_sources(&decisions, &condition_state);
        assert_eq!(env.get("approved"), Some(&Scalar::Bool(true)));
        assert_eq!(env.get("blocked"), Some(&Scalar::Bool(false)));
    }

    #[test]
    fn test_unknown_name_is_absent() {
        let env = Environment::from_sources(&StateMap::new(), &StateMap::new());
        assert!(env.get("anything").is_none());
    }
}
