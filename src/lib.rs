// SPDX-License-Identifier: MIT

//! Condition evaluation for multi-agent workflow state machines
//!
//! A workflow state machine decides its next state by evaluating small
//! boolean/comparison expressions against the agent's latest structured
//! decisions and internal execution counters the agent cannot see. This
//! crate is that decision core: a safe expression interpreter with fixed
//! precedence, layered variable resolution, system-predefined condition
//! names, per-workflow pluggable predicates, and a legacy string-matching
//! fallback. The owning engine stays in charge of invoking agents and
//! persisting state; nothing here blocks or performs I/O.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use switchyard_rs::{AgentResponse, ConditionEvaluator, RouterBuilder, StateMap, SystemState};
//!
//! let router = Arc::new(
//!     RouterBuilder::new()
//!         .condition("check_quality_threshold", |response, _state| {
//!             let score = response
//!                 .decision_or("satisfaction_score", &json!(0))
//!                 .as_f64()
//!                 .unwrap_or(0.0);
//!             Ok(score >= 8.0)
//!         })
//!         .build(),
//! );
//!
//! let evaluator = ConditionEvaluator::new().with_router(router);
//! let system = SystemState::new("review_loop", "polish the draft");
//! let response = AgentResponse::new("ready for review")
//!     .with_decision("quality_score", json!(9))
//!     .with_decision("satisfaction_score", json!(9));
//!
//! assert!(evaluator.evaluate("quality_score >= 8", &response, &StateMap::new(), &system));
//! assert!(evaluator.evaluate("quality_threshold", &response, &StateMap::new(), &system));
//! ```

pub mod engine;
pub mod env;
pub mod error;
pub mod expr;
pub mod legacy;
pub mod router;
pub mod state;
pub mod value;

pub use engine::{ConditionEvaluator, Resolution, Strategy, DEFAULT_MAX_TURNS};
pub use error::{ExprError, RouterError};
pub use router::{state_or, ConditionRouter, Predicate, PredicateRouter, RouterBuilder};
pub use state::{
    turn_counter_view, AgentResponse, StateMap, SystemState, TransitionRecord,
};
pub use value::Scalar;
