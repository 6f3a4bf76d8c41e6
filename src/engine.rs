//! Condition evaluation orchestrator
//!
//! Resolves a transition condition string through a fixed chain of
//! strategies, most specific first:
//!
//! 1. empty expression, unconditionally true
//! 2. system-predefined names (`true`, `false`, `always`, `never`,
//!    `max_turns_exceeded`, `error_occurred`)
//! 3. workflow predicates registered on the router, exact name match
//! 4. the expression language over decisions and condition state
//! 5. legacy string matching, which always produces a verdict
//!
//! Stages 3 and 4 can decline (predicate error, parse error, undefined
//! variable); the chain then moves on, so a malformed condition never
//! aborts a workflow. The worst case is a `false` verdict plus a warning
//! naming the stage that declined.

use std::sync::Arc;

use crate::env::Environment;
use crate::expr;
use crate::legacy;
use crate::router::ConditionRouter;
use crate::state::{AgentResponse, StateMap, SystemState};

/// Default turn budget backing `max_turns_exceeded`
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// The stage of the resolution chain that decided a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Empty expression, vacuously true
    Empty,
    /// System-predefined condition name
    System,
    /// Workflow predicate via the router
    Predicate,
    /// Parsed and evaluated expression
    Expression,
    /// Legacy string matching
    Legacy,
}

/// A condition verdict together with the stage that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub value: bool,
    pub strategy: Strategy,
}

/// Evaluates transition conditions for a workflow state machine.
///
/// Immutable after construction; safe to share across threads.
pub struct ConditionEvaluator {
    max_turns: u32,
    router: Option<Arc<dyn ConditionRouter>>,
}

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            router: None,
        }
    }

    /// Override the turn budget used by `max_turns_exceeded`
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Attach a workflow condition router
    pub fn with_router(mut self, router: Arc<dyn ConditionRouter>) -> Self {
        self.router = Some(router);
        self
    }

    /// Evaluate a transition condition to a boolean verdict
    pub fn evaluate(
        &self,
        expr: &str,
        response: &AgentResponse,
        condition_state: &StateMap,
        system_state: &SystemState,
    ) -> bool {
        self.resolve(expr, response, condition_state, system_state)
            .value
    }

    /// Evaluate a transition condition and report which stage decided.
    ///
    /// Inputs are never mutated; the same inputs always produce the same
    /// resolution.
    pub fn resolve(
        &self,
        expr: &str,
        response: &AgentResponse,
        condition_state: &StateMap,
        system_state: &SystemState,
    ) -> Resolution {
        let trimmed = expr.trim();

        let resolution = if trimmed.is_empty() {
            Resolution {
                value: true,
                strategy: Strategy::Empty,
            }
        } else if let Some(value) = self.system_condition(trimmed, system_state) {
            Resolution {
                value,
                strategy: Strategy::System,
            }
        } else if let Some(value) =
            self.router_condition(trimmed, response, condition_state, system_state)
        {
            Resolution {
                value,
                strategy: Strategy::Predicate,
            }
        } else if let Some(value) = self.expression_condition(trimmed, response, condition_state) {
            Resolution {
                value,
                strategy: Strategy::Expression,
            }
        } else {
            Resolution {
                value: legacy::evaluate(trimmed, response, condition_state),
                strategy: Strategy::Legacy,
            }
        };

        log::debug!(
            "condition '{}' resolved to {} via {:?}",
            trimmed,
            resolution.value,
            resolution.strategy
        );
        resolution
    }

    /// System names take absolute precedence, even over a registered
    /// predicate or a decision of the same name.
    fn system_condition(&self, expr: &str, system_state: &SystemState) -> Option<bool> {
        match expr {
            "true" | "always" => Some(true),
            "false" | "never" => Some(false),
            // Reaching the budget counts as exceeding it
            "max_turns_exceeded" => Some(system_state.total_turns >= self.max_turns),
            "error_occurred" => Some(system_state.error.is_some()),
            _ => None,
        }
    }

    /// Exact-name predicate lookup; never parses the expression.
    fn router_condition(
        &self,
        expr: &str,
        response: &AgentResponse,
        condition_state: &StateMap,
        system_state: &SystemState,
    ) -> Option<bool> {
        let router = self.router.as_ref()?;
        if !router.has_condition(expr) {
            return None;
        }

        match router.evaluate_condition(expr, response, condition_state, system_state) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!(
                    "router condition '{}' failed: {}, trying expression evaluation",
                    expr,
                    err
                );
                None
            }
        }
    }

    fn expression_condition(
        &self,
        expr: &str,
        response: &AgentResponse,
        condition_state: &StateMap,
    ) -> Option<bool> {
        let result = expr::parse(expr).and_then(|ast| {
            let env = Environment::from_sources(&response.decisions, condition_state);
            expr::evaluate(&ast, &env)
        });

        match result {
            Ok(value) => Some(value.truthy()),
            Err(err) => {
                log::warn!(
                    "expression evaluation failed for '{}': {}, falling back to legacy matching",
                    expr,
                    err
                );
                None
            }
        }
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
