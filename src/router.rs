// SPDX-License-Identifier: MIT

//! Workflow-specific condition routing
//!
//! A workflow can ship named predicates that transition conditions refer
//! to by bare name. The evaluator consults the router before trying to
//! parse anything, so a registered name always wins over expression
//! syntax. Predicates are plain closures over the agent's response and a
//! merged state view; registration happens once through `RouterBuilder`
//! and the table is immutable afterward.

use serde_json::Value;

use crate::error::RouterError;
use crate::state::{AgentResponse, StateMap, SystemState};

/// A named condition predicate supplied by a workflow.
///
/// Receives the agent's response and the merged view of condition state
/// and system state.
pub type Predicate = Box<dyn Fn(&AgentResponse, &StateMap) -> anyhow::Result<bool> + Send + Sync>;

/// Named-condition lookup used by the evaluator, plus observational
/// lifecycle hooks the owning state machine may call.
pub trait ConditionRouter: Send + Sync {
    /// Whether `name` is a registered condition
    fn has_condition(&self, name: &str) -> bool;

    /// Registered condition names, in registration order
    fn list_conditions(&self) -> Vec<String>;

    /// Run the predicate registered under `name`
    fn evaluate_condition(
        &self,
        name: &str,
        response: &AgentResponse,
        condition_state: &StateMap,
        system_state: &SystemState,
    ) -> Result<bool, RouterError>;

    /// Called once when a workflow run starts
    fn on_workflow_start(&self, _config: &StateMap) {}

    /// Called once when a workflow run finishes
    fn on_workflow_end(&self, _result: &StateMap) {}

    /// Called when the run enters a state
    fn on_state_enter(&self, _state_name: &str, _context: &StateMap) {}

    /// Called when the run leaves a state
    fn on_state_exit(&self, _state_name: &str, _result: &StateMap) {}
}

/// Builder for [`PredicateRouter`]; registration order is preserved.
#[derive(Default)]
pub struct RouterBuilder {
    conditions: Vec<(String, Predicate)>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under `name`.
    ///
    /// A `check_` prefix on the name is stripped, so predicates written
    /// against the historical naming convention register under the bare
    /// condition name. Re-registering a name replaces the predicate but
    /// keeps its original position in the table.
    pub fn condition<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&AgentResponse, &StateMap) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        let name = name.into();
        let name = name.strip_prefix("check_").unwrap_or(&name).to_string();
        let predicate: Predicate = Box::new(f);

        if let Some(slot) = self.conditions.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = predicate;
        } else {
            self.conditions.push((name, predicate));
        }
        self
    }

    pub fn build(self) -> PredicateRouter {
        PredicateRouter {
            conditions: self.conditions,
        }
    }
}

/// Router over an ordered table of named predicates.
pub struct PredicateRouter {
    conditions: Vec<(String, Predicate)>,
}

impl PredicateRouter {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }
}

impl ConditionRouter for PredicateRouter {
    fn has_condition(&self, name: &str) -> bool {
        self.conditions.iter().any(|(n, _)| n == name)
    }

    fn list_conditions(&self) -> Vec<String> {
        self.conditions.iter().map(|(n, _)| n.clone()).collect()
    }

    fn evaluate_condition(
        &self,
        name: &str,
        response: &AgentResponse,
        condition_state: &StateMap,
        system_state: &SystemState,
    ) -> Result<bool, RouterError> {
        let predicate = self
            .conditions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .ok_or_else(|| RouterError::unknown(name, self.list_conditions()))?;

        let merged = merge_states(condition_state, system_state);
        predicate(response, &merged).map_err(|err| RouterError::predicate_failed(name, err))
    }
}

// Condition-state keys win on collision with system keys.
fn merge_states(condition_state: &StateMap, system_state: &SystemState) -> StateMap {
    let mut merged = system_state.to_map();
    for (key, value) in condition_state {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// State value for `key`, or `default` when absent
pub fn state_or<'a>(state: &'a StateMap, key: &str, default: &'a Value) -> &'a Value {
    state.get(key).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;

    fn score_router(threshold: f64) -> PredicateRouter {
        RouterBuilder::new()
            .condition("check_quality_threshold", move |response, _state| {
                let score = response
                    .decision_or("score", &json!(0))
                    .as_f64()
                    .unwrap_or(0.0);
                Ok(score >= threshold)
            })
            .build()
    }

    #[test]
    fn test_check_prefix_stripped() {
        let router = score_router(7.0);
        assert!(router.has_condition("quality_threshold"));
        assert!(!router.has_condition("check_quality_threshold"));
        assert_eq!(router.list_conditions(), vec!["quality_threshold"]);
    }

    #[test]
    fn test_predicate_runs_on_response() {
        let router = score_router(7.0);
        let system = SystemState::new("wf", "msg");

        let high = AgentResponse::new("").with_decision("score", json!(8));
        let low = AgentResponse::new("").with_decision("score", json!(5));

        assert!(router
            .evaluate_condition("quality_threshold", &high, &StateMap::new(), &system)
            .unwrap());
        assert!(!router
            .evaluate_condition("quality_threshold", &low, &StateMap::new(), &system)
            .unwrap());
    }

    #[test]
    fn test_unknown_condition_error() {
        let router = score_router(7.0);
        let system = SystemState::new("wf", "msg");

        let err = router
            .evaluate_condition("nope", &AgentResponse::new(""), &StateMap::new(), &system)
            .unwrap_err();
        match err {
            RouterError::UnknownCondition { name, available } => {
                assert_eq!(name, "nope");
                assert_eq!(available, vec!["quality_threshold"]);
            }
            other => panic!("expected UnknownCondition, got {:?}", other),
        }
    }

    #[test]
    fn test_predicate_sees_merged_state() {
        let router = RouterBuilder::new()
            .condition("deep_run", |_response, state| {
                let turns = state_or(state, "total_turns", &json!(0)).as_u64().unwrap_or(0);
                let local = state_or(state, "turn_count_writer_draft", &json!(0))
                    .as_u64()
                    .unwrap_or(0);
                Ok(turns >= 2 && local >= 1)
            })
            .build();

        let mut system = SystemState::new("wf", "msg");
        system.record_transition("draft", "writer", StateMap::new());
        system.record_transition("review", "reviewer", StateMap::new());

        let mut condition_state = StateMap::new();
        condition_state.insert("turn_count_writer_draft".to_string(), json!(1));

        assert!(router
            .evaluate_condition("deep_run", &AgentResponse::new(""), &condition_state, &system)
            .unwrap());
    }

    #[test]
    fn test_condition_state_wins_merge_collision() {
        let router = RouterBuilder::new()
            .condition("sees_override", |_response, state| {
                Ok(state_or(state, "total_turns", &json!(0)) == &json!(99))
            })
            .build();

        let mut system = SystemState::new("wf", "msg");
        system.record_transition("draft", "writer", StateMap::new());

        let mut condition_state = StateMap::new();
        condition_state.insert("total_turns".to_string(), json!(99));

        assert!(router
            .evaluate_condition(
                "sees_override",
                &AgentResponse::new(""),
                &condition_state,
                &system
            )
            .unwrap());
    }

    #[test]
    fn test_reregistering_replaces_in_place() {
        let router = RouterBuilder::new()
            .condition("first", |_, _| Ok(true))
            .condition("second", |_, _| Ok(true))
            .condition("first", |_, _| Ok(false))
            .build();

        // Position kept, predicate replaced
        assert_eq!(router.list_conditions(), vec!["first", "second"]);
        let system = SystemState::new("wf", "msg");
        assert!(!router
            .evaluate_condition("first", &AgentResponse::new(""), &StateMap::new(), &system)
            .unwrap());
    }

    #[test]
    fn test_predicate_failure_wrapped() {
        let router = RouterBuilder::new()
            .condition("explodes", |_, _| Err(anyhow!("backing store gone")))
            .build();
        let system = SystemState::new("wf", "msg");

        let err = router
            .evaluate_condition("explodes", &AgentResponse::new(""), &StateMap::new(), &system)
            .unwrap_err();
        match err {
            RouterError::PredicateFailed { name, source } => {
                assert_eq!(name, "explodes");
                assert_eq!(source.to_string(), "backing store gone");
            }
            other => panic!("expected PredicateFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_default_hooks_are_noops() {
        let router = score_router(1.0);
        router.on_workflow_start(&StateMap::new());
        router.on_state_enter("draft", &StateMap::new());
        router.on_state_exit("draft", &StateMap::new());
        router.on_workflow_end(&StateMap::new());
    }

    #[test]
    fn test_state_or_default() {
        let mut state = StateMap::new();
        state.insert("present".to_string(), json!(5));

        assert_eq!(state_or(&state, "present", &json!(0)), &json!(5));
        assert_eq!(state_or(&state, "absent", &json!(0)), &json!(0));
    }
}
