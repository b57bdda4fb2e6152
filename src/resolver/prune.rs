//! Platform pruning rules.
//!
//! Pruning removes options that are meaningless for the target, such as
//! `fPIC` on Windows or for shared builds. Rules run once, in declaration
//! order, before any later phase reads the configuration. Each rule sees the
//! result of the rules before it.

use serde::Serialize;

use crate::core::configuration::Configuration;
use crate::core::option::OptionValue;
use crate::core::settings::{Os, Settings};

/// When a pruning rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneCondition {
    /// The target OS is one of these
    Os(Vec<Os>),
    /// Another option is present and has this value
    OptionEquals { option: String, value: OptionValue },
}

impl PruneCondition {
    /// Evaluate against a configuration and settings.
    pub fn holds(&self, configuration: &Configuration, settings: &Settings) -> bool {
        match self {
            PruneCondition::Os(targets) => targets.contains(&settings.os),
            PruneCondition::OptionEquals { option, value } => {
                configuration.get(option) == Some(value)
            }
        }
    }
}

impl std::fmt::Display for PruneCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneCondition::Os(targets) => {
                let names: Vec<&str> = targets.iter().map(|os| os.as_str()).collect();
                write!(f, "os in [{}]", names.join(", "))
            }
            PruneCondition::OptionEquals { option, value } => write!(f, "{} == {}", option, value),
        }
    }
}

/// Delete `option` whenever `when` holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneRule {
    /// Option to delete
    pub option: String,
    /// Condition
    pub when: PruneCondition,
}

impl PruneRule {
    /// Delete `option` on the given operating systems.
    pub fn on_os(option: impl Into<String>, targets: Vec<Os>) -> Self {
        PruneRule {
            option: option.into(),
            when: PruneCondition::Os(targets),
        }
    }

    /// Delete `option` when `other` has `value`.
    pub fn when_option(
        option: impl Into<String>,
        other: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Self {
        PruneRule {
            option: option.into(),
            when: PruneCondition::OptionEquals {
                option: other.into(),
                value: value.into(),
            },
        }
    }
}

/// Apply pruning rules, returning a new configuration.
///
/// Deleting an option that an earlier rule already removed is a no-op, so
/// pruning a pruned configuration returns it unchanged.
pub fn prune(
    configuration: &Configuration,
    settings: &Settings,
    rules: &[PruneRule],
) -> Configuration {
    let mut current = configuration.clone();

    for rule in rules {
        if !rule.when.holds(&current, settings) {
            continue;
        }

        if current.contains(&rule.option) {
            tracing::debug!("pruning option `{}` ({})", rule.option, rule.when);
            current = current.without(&rule.option);
        }
    }

    current
}
