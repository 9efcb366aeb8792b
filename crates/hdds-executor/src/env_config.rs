// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Environment variable configuration for the executor memory strategy.
//!
//! - `HDDS_EXECUTOR_STRATEGY`: `dynamic` (default) or `static`
//! - `HDDS_EXECUTOR_INITIAL_CAPACITY`: initial slots per kind for `dynamic` (default: 0)
//! - `HDDS_EXECUTOR_MAX_SUBSCRIPTIONS`: fixed subscription handle slots for `static` (default: 64)
//! - `HDDS_EXECUTOR_MAX_SERVICES`: fixed service handle slots for `static` (default: 16)
//! - `HDDS_EXECUTOR_MAX_CLIENTS`: fixed client handle slots for `static` (default: 16)
//! - `HDDS_EXECUTOR_SELECTION`: `collection` (default) or `round-robin`
//!
//! # Example
//!
//! ```bash
//! export HDDS_EXECUTOR_STRATEGY=static
//! export HDDS_EXECUTOR_MAX_SUBSCRIPTIONS=256
//! export HDDS_EXECUTOR_SELECTION=round-robin
//! ```

use crate::error::{Error, Result};
use crate::strategy::{AllocatorMemoryStrategy, BufferPolicy, MemoryStrategy, SelectionPolicy};
use std::env;

/// Environment variable names
pub const ENV_STRATEGY: &str = "HDDS_EXECUTOR_STRATEGY";
pub const ENV_INITIAL_CAPACITY: &str = "HDDS_EXECUTOR_INITIAL_CAPACITY";
pub const ENV_MAX_SUBSCRIPTIONS: &str = "HDDS_EXECUTOR_MAX_SUBSCRIPTIONS";
pub const ENV_MAX_SERVICES: &str = "HDDS_EXECUTOR_MAX_SERVICES";
pub const ENV_MAX_CLIENTS: &str = "HDDS_EXECUTOR_MAX_CLIENTS";
pub const ENV_SELECTION: &str = "HDDS_EXECUTOR_SELECTION";

const DEFAULT_MAX_SUBSCRIPTIONS: usize = 64;
const DEFAULT_MAX_SERVICES: usize = 16;
const DEFAULT_MAX_CLIENTS: usize = 16;

/// Which buffer allocation scheme to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Grow-only buffers.
    #[default]
    Dynamic,
    /// Fixed preallocated buffers.
    Static,
}

impl StrategyKind {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "dynamic" => Ok(Self::Dynamic),
            "static" => Ok(Self::Static),
            _ => Err(Error::UnknownStrategy(value.to_string())),
        }
    }
}

fn parse_selection(value: &str) -> Result<SelectionPolicy> {
    match value.to_ascii_lowercase().as_str() {
        "collection" => Ok(SelectionPolicy::CollectionOrder),
        "round-robin" | "round_robin" | "roundrobin" => Ok(SelectionPolicy::RoundRobin),
        _ => Err(Error::UnknownSelection(value.to_string())),
    }
}

fn parse_count(var: &'static str, value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| Error::InvalidConfig {
        var,
        value: value.to_string(),
    })
}

/// Parse an optional value; in lenient mode a bad value is logged and dropped.
fn settle<T>(
    value: Option<String>,
    parse: impl FnOnce(&str) -> Result<T>,
    strict: bool,
) -> Result<Option<T>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match parse(&value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) if strict => Err(err),
        Err(err) => {
            log::warn!("[executor] {}, using default", err);
            Ok(None)
        }
    }
}

/// Executor strategy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub strategy: StrategyKind,

    /// Initial slots per kind (dynamic strategy only)
    pub initial_capacity: usize,

    /// Fixed capacities (static strategy only)
    pub max_subscriptions: usize,
    pub max_services: usize,
    pub max_clients: usize,

    pub selection: SelectionPolicy,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Dynamic,
            initial_capacity: 0,
            max_subscriptions: DEFAULT_MAX_SUBSCRIPTIONS,
            max_services: DEFAULT_MAX_SERVICES,
            max_clients: DEFAULT_MAX_CLIENTS,
            selection: SelectionPolicy::CollectionOrder,
        }
    }
}

impl EnvConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparsable values are logged and replaced by their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok(), false).unwrap_or_default()
    }

    /// Like [`EnvConfig::from_env`] but reports the first bad value.
    pub fn try_from_env() -> Result<Self> {
        let config = Self::from_lookup(|name| env::var(name).ok(), true)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset. With `strict == false` every parse
    /// error falls back to the field's default.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        strict: bool,
    ) -> Result<Self> {
        let mut config = Self::default();
        let read = |name: &'static str| lookup(name).filter(|s| !s.trim().is_empty());

        if let Some(kind) = settle(read(ENV_STRATEGY), StrategyKind::parse, strict)? {
            config.strategy = kind;
        }
        if let Some(selection) = settle(read(ENV_SELECTION), parse_selection, strict)? {
            config.selection = selection;
        }

        let counts = [
            (ENV_INITIAL_CAPACITY, &mut config.initial_capacity),
            (ENV_MAX_SUBSCRIPTIONS, &mut config.max_subscriptions),
            (ENV_MAX_SERVICES, &mut config.max_services),
            (ENV_MAX_CLIENTS, &mut config.max_clients),
        ];
        for (var, field) in counts {
            if let Some(count) = settle(read(var), |value| parse_count(var, value), strict)? {
                *field = count;
            }
        }

        Ok(config)
    }

    /// Reject configurations that cannot wait on anything.
    pub fn validate(&self) -> Result<()> {
        if self.strategy != StrategyKind::Static {
            return Ok(());
        }
        let limits = [
            (ENV_MAX_SUBSCRIPTIONS, self.max_subscriptions),
            (ENV_MAX_SERVICES, self.max_services),
            (ENV_MAX_CLIENTS, self.max_clients),
        ];
        for (var, value) in limits {
            if value == 0 {
                return Err(Error::InvalidConfig {
                    var,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Check if any custom configuration was provided
    #[must_use]
    pub fn is_custom(&self) -> bool {
        *self != Self::default()
    }

    #[must_use]
    pub fn buffer_policy(&self) -> BufferPolicy {
        match self.strategy {
            StrategyKind::Dynamic => BufferPolicy::GrowOnly {
                initial_capacity: self.initial_capacity,
            },
            StrategyKind::Static => BufferPolicy::Preallocated {
                subscriptions: self.max_subscriptions,
                services: self.max_services,
                clients: self.max_clients,
            },
        }
    }

    /// Build the configured strategy.
    #[must_use]
    pub fn build_strategy(&self) -> Box<dyn MemoryStrategy> {
        log::debug!(
            "[executor] memory strategy {:?} ({:?}), selection {:?}",
            self.strategy,
            self.buffer_policy(),
            self.selection
        );
        Box::new(AllocatorMemoryStrategy::new(
            self.buffer_policy(),
            self.selection,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::HandleKind;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EnvConfig::default();
        assert_eq!(config.strategy, StrategyKind::Dynamic);
        assert_eq!(config.selection, SelectionPolicy::CollectionOrder);
        assert_eq!(config.max_subscriptions, 64);
        assert!(!config.is_custom());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_static_strategy_from_vars() {
        let config = EnvConfig::from_lookup(
            lookup(&[
                (ENV_STRATEGY, "STATIC"),
                (ENV_MAX_SUBSCRIPTIONS, "8"),
                (ENV_MAX_SERVICES, " 2 "),
                (ENV_SELECTION, "round-robin"),
            ]),
            true,
        )
        .expect("valid config");

        assert_eq!(config.strategy, StrategyKind::Static);
        assert_eq!(config.max_subscriptions, 8);
        assert_eq!(config.max_services, 2);
        assert_eq!(config.max_clients, 16);
        assert_eq!(config.selection, SelectionPolicy::RoundRobin);
        assert!(config.is_custom());
        assert_eq!(
            config.buffer_policy(),
            BufferPolicy::Preallocated {
                subscriptions: 8,
                services: 2,
                clients: 16,
            }
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = EnvConfig::from_lookup(lookup(&[(ENV_STRATEGY, "")]), true)
            .expect("valid config");
        assert_eq!(config, EnvConfig::default());
    }

    #[test]
    fn test_strict_rejects_bad_values() {
        let err = EnvConfig::from_lookup(lookup(&[(ENV_STRATEGY, "pooled")]), true)
            .expect_err("unknown strategy");
        assert_eq!(err, Error::UnknownStrategy("pooled".to_string()));

        let err = EnvConfig::from_lookup(lookup(&[(ENV_MAX_CLIENTS, "-3")]), true)
            .expect_err("negative count");
        assert_eq!(
            err,
            Error::InvalidConfig {
                var: ENV_MAX_CLIENTS,
                value: "-3".to_string(),
            }
        );

        let err = EnvConfig::from_lookup(lookup(&[(ENV_SELECTION, "random")]), true)
            .expect_err("unknown selection");
        assert!(err.to_string().contains("random"));
    }

    #[test]
    fn test_lenient_falls_back_to_defaults() {
        let config = EnvConfig::from_lookup(
            lookup(&[(ENV_STRATEGY, "pooled"), (ENV_INITIAL_CAPACITY, "32")]),
            false,
        )
        .expect("lenient never fails");
        assert_eq!(config.strategy, StrategyKind::Dynamic);
        assert_eq!(config.initial_capacity, 32);
    }

    #[test]
    fn test_validate_rejects_zero_static_capacity() {
        let config = EnvConfig {
            strategy: StrategyKind::Static,
            max_services: 0,
            ..EnvConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                var: ENV_MAX_SERVICES,
                ..
            })
        ));

        // Zero is fine for the dynamic strategy, which ignores the limits.
        let config = EnvConfig {
            max_services: 0,
            ..EnvConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_strategy_uses_policy() {
        let config = EnvConfig {
            strategy: StrategyKind::Static,
            max_subscriptions: 4,
            ..EnvConfig::default()
        };
        let strategy = config.build_strategy();
        assert_eq!(strategy.handle_buffer(HandleKind::Subscription).capacity(), 4);
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let prev = env::var(ENV_MAX_CLIENTS).ok();

        env::set_var(ENV_MAX_CLIENTS, "5");
        let config = EnvConfig::from_env();
        assert_eq!(config.max_clients, 5);

        // Restore
        if let Some(v) = prev {
            env::set_var(ENV_MAX_CLIENTS, v);
        } else {
            env::remove_var(ENV_MAX_CLIENTS);
        }
    }
}
