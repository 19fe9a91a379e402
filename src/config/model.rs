// src/config/model.rs

use std::marker::PhantomData;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Top-level configuration as read from a YAML file.
///
/// ```yaml
/// stdout:
///   "^READY$":
///     - action: print
///       kwargs: { message: ok }
/// stderr:
///   "FATAL":
///     - action: timer_stop
///       kwargs: { name: heartbeat }
/// timers:
///   heartbeat:
///     duration: { seconds: 1 }
///     autostart: true
///     actions:
///       - action: exit_program
///         kwargs: { kind_kill_timeout: 0 }
/// ```
///
/// All sections are optional; an absent section means "no rules / no timers".
/// Mapping order is load order and is preserved: it decides rule dispatch
/// order and the timer expiry-pass order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Rules applied to the child's standard output, pattern -> actions.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub stdout: RuleSet,

    /// Rules applied to the child's standard error, same shape.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub stderr: RuleSet,

    /// Named countdown timers from `timers.<name>`.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub timers: OrderedMap<TimerConfig>,
}

/// Pattern string -> ordered list of action invocations.
pub type RuleSet = OrderedMap<Vec<ActionInvocation>>;

/// One `{action, kwargs}` entry from a rule's or timer's action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionInvocation {
    /// Registered action identifier, e.g. `"print"` or `"timer_start"`.
    pub action: String,

    /// Named parameters for the action; shape is checked per action at load
    /// time.
    #[serde(default, skip_serializing_if = "serde_yaml::Value::is_null")]
    pub kwargs: serde_yaml::Value,
}

impl ActionInvocation {
    /// Convenience constructor for building invocations in code.
    pub fn new(action: impl Into<String>, kwargs: serde_yaml::Value) -> Self {
        Self {
            action: action.into(),
            kwargs,
        }
    }
}

/// `timers.<name>` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimerConfig {
    /// How long the timer runs before its actions fire. Required.
    pub duration: DurationSpec,

    /// Start the timer immediately at load instead of waiting for a
    /// `timer_start` action.
    #[serde(default)]
    pub autostart: bool,

    /// Actions fired, in order, when the timer expires.
    #[serde(default)]
    pub actions: Vec<ActionInvocation>,
}

/// Duration in the config schema: any of `seconds`, `minutes`, `hours`,
/// summed. Fractional values are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
}

impl DurationSpec {
    /// Sum the components into a `Duration`.
    ///
    /// Negative or non-finite components are a configuration error.
    pub fn to_duration(self) -> Result<Duration> {
        let total = self.seconds.unwrap_or(0.0)
            + self.minutes.unwrap_or(0.0) * 60.0
            + self.hours.unwrap_or(0.0) * 3600.0;

        if !total.is_finite() || total < 0.0 {
            return Err(anyhow!("duration must be a non-negative time span"));
        }

        Ok(Duration::from_secs_f64(total))
    }
}

/// A mapping that keeps its entries in document order.
///
/// YAML rule sets and timer sets are dispatched in the order the author wrote
/// them, so the usual `BTreeMap` is not an option here.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an entry. Does not check for duplicate keys; that is the
    /// loader's job, where a useful error message can be produced.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.0.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
