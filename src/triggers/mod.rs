// src/triggers/mod.rs

//! Pattern-to-action rules for one output stream.
//!
//! A [`TriggerRegistry`] holds the compiled rules for a single stream
//! (stdout or stderr). Matching is side-effect-free; dispatch is the
//! caller's job and happens in the returned order.

use anyhow::{Context, Result};
use regex::Regex;

use crate::actions::{self, Action, ActionObject};
use crate::config::RuleSet;

/// One compiled pattern plus its ordered action list. Immutable after load.
pub struct TriggerRule {
    pattern: Regex,
    actions: Vec<ActionObject>,
}

impl TriggerRule {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// All rules for one stream, in configured order.
pub struct TriggerRegistry {
    rules: Vec<TriggerRule>,
}

impl TriggerRegistry {
    /// Compile a rule set from config.
    ///
    /// Each pattern is compiled once; every action invocation goes through
    /// the registration table. Any failure names the offending pattern.
    pub fn compile(rules: &RuleSet) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());

        for (pattern, invocations) in rules.iter() {
            let regex = Regex::new(pattern)
                .with_context(|| format!("invalid pattern \"{pattern}\""))?;
            let actions = actions::build_action_list(invocations)
                .with_context(|| format!("in actions for pattern \"{pattern}\""))?;
            compiled.push(TriggerRule {
                pattern: regex,
                actions,
            });
        }

        Ok(Self { rules: compiled })
    }

    /// All actions whose rule matches anywhere in `line`, concatenated in
    /// rule order with each rule's list order preserved.
    ///
    /// Search semantics: patterns match substrings unless the author anchors
    /// them.
    pub fn matched_actions(&self, line: &str) -> Vec<&dyn Action> {
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_match(line))
            .flat_map(|rule| rule.actions.iter().map(|action| action.as_ref()))
            .collect()
    }

    pub fn rules(&self) -> &[TriggerRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
