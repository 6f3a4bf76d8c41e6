// SPDX-License-Identifier: MIT

//! Workflow run state consumed by the condition evaluator
//!
//! Two kinds of data feed a transition decision: structured decisions from
//! the agent's last response, and internal execution counters the agent
//! never sees (`SystemState`). The owning state machine parses responses
//! from agent JSON output and persists `SystemState` across turns; this
//! crate only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat string-keyed JSON object used for decisions and state snapshots.
pub type StateMap = Map<String, Value>;

/// Structured output of one agent turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Free-form text produced by the agent
    #[serde(default)]
    pub content: String,
    /// Structured decisions emitted alongside the text
    #[serde(default)]
    pub decisions: StateMap,
}

impl AgentResponse {
    /// Create a response with text content and no decisions
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            decisions: StateMap::new(),
        }
    }

    /// Add a decision, consuming and returning self
    pub fn with_decision(mut self, key: impl Into<String>, value: Value) -> Self {
        self.decisions.insert(key.into(), value);
        self
    }

    /// Decision value for `key`, or `default` when the agent did not set it
    pub fn decision_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.decisions.get(key).unwrap_or(default)
    }
}

/// One executed transition in a workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State the transition left
    pub state: String,
    /// Agent that produced the turn
    pub agent: String,
    /// Decisions the agent emitted on that turn
    #[serde(default)]
    pub decisions: StateMap,
    /// Value of the run-wide turn counter after the transition
    pub turn_count: u32,
}

/// Internal execution state of a workflow run. Never exposed to agents;
/// conditions reach it only through the system-predefined names and
/// router predicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemState {
    /// Turns executed so far across the whole run
    pub total_turns: u32,
    /// Message of the most recent unrecovered failure, if any
    pub error: Option<String>,
    /// Every executed transition, oldest first
    pub execution_history: Vec<TransitionRecord>,
    /// Name of the workflow definition being run
    pub workflow_name: String,
    /// Message the run was started with
    pub initial_message: String,
    /// When the run started
    pub started_at: Option<DateTime<Utc>>,
}

impl SystemState {
    /// Create fresh state for a new run, start time stamped now
    pub fn new(workflow_name: impl Into<String>, initial_message: impl Into<String>) -> Self {
        Self {
            total_turns: 0,
            error: None,
            execution_history: Vec::new(),
            workflow_name: workflow_name.into(),
            initial_message: initial_message.into(),
            started_at: Some(Utc::now()),
        }
    }

    /// Append a transition and advance the turn counter
    pub fn record_transition(
        &mut self,
        state: impl Into<String>,
        agent: impl Into<String>,
        decisions: StateMap,
    ) {
        self.total_turns += 1;
        self.execution_history.push(TransitionRecord {
            state: state.into(),
            agent: agent.into(),
            decisions,
            turn_count: self.total_turns,
        });
    }

    /// The most recent `n` transitions, all of them when fewer exist
    pub fn last_records(&self, n: usize) -> &[TransitionRecord] {
        let start = self.execution_history.len().saturating_sub(n);
        &self.execution_history[start..]
    }

    /// Flatten into a `StateMap` for predicate consumption.
    ///
    /// History becomes a JSON array, the start time an RFC 3339 string.
    pub fn to_map(&self) -> StateMap {
        let mut map = StateMap::new();
        map.insert("total_turns".to_string(), Value::from(self.total_turns));
        map.insert(
            "error".to_string(),
            self.error.as_ref().map_or(Value::Null, |e| Value::String(e.clone())),
        );
        map.insert(
            "execution_history".to_string(),
            serde_json::to_value(&self.execution_history).unwrap_or_else(|_| Value::Array(Vec::new())),
        );
        map.insert(
            "workflow_name".to_string(),
            Value::String(self.workflow_name.clone()),
        );
        map.insert(
            "initial_message".to_string(),
            Value::String(self.initial_message.clone()),
        );
        map.insert(
            "started_at".to_string(),
            self.started_at
                .map_or(Value::Null, |t| Value::String(t.to_rfc3339())),
        );
        map
    }
}

/// Agent-visible turn counters extracted from a flat engine state.
///
/// Keys follow the `turn_count_{agent}_{state}` convention; everything
/// else in the raw map stays on the system side of the boundary.
pub fn turn_counter_view(raw: &StateMap) -> StateMap {
    raw.iter()
        .filter(|(k, _)| k.starts_with("turn_count_"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
