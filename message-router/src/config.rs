/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! JSON5 router configuration.

use crate::address::Address;
use crate::error::ConfigError;
use crate::inbound::shared_subscription_skeleton::sanitize_channel_id;
use crate::routing::address_validator::RuntimeRole;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_MAX_INCOMING_REQUESTS: i64 = 20;
const DEFAULT_UPPER_THRESHOLD_PERCENT: i64 = 80;
const DEFAULT_LOWER_THRESHOLD_PERCENT: i64 = 20;
const DEFAULT_ROUTING_TABLE_CLEANUP_INTERVAL_MS: u64 = 60_000;
const DEFAULT_SHUTDOWN_MAX_TIMEOUT_MS: u64 = 5_000;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Global address other runtimes reach this process under.
    pub own_address: Address,
    /// Address replies to this process's requests are sent to.
    pub reply_to_address: Address,
    /// Known backends; the first one is the default.
    pub gbids: Vec<String>,
    pub channel_id: String,
    #[serde(default)]
    pub role: RuntimeRole,
    #[serde(default)]
    pub backpressure: BackpressureConfig,
    #[serde(default)]
    pub separate_reply_receiver: bool,
    #[serde(default = "default_routing_table_cleanup_interval_ms")]
    pub routing_table_cleanup_interval_ms: u64,
    #[serde(default = "default_shutdown_max_timeout_ms")]
    pub shutdown_max_timeout_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BackpressureConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_incoming_requests")]
    pub max_incoming_requests: i64,
    #[serde(default = "default_upper_threshold_percent")]
    pub upper_threshold_percent: i64,
    #[serde(default = "default_lower_threshold_percent")]
    pub lower_threshold_percent: i64,
}

fn default_max_incoming_requests() -> i64 {
    DEFAULT_MAX_INCOMING_REQUESTS
}

fn default_upper_threshold_percent() -> i64 {
    DEFAULT_UPPER_THRESHOLD_PERCENT
}

fn default_lower_threshold_percent() -> i64 {
    DEFAULT_LOWER_THRESHOLD_PERCENT
}

fn default_routing_table_cleanup_interval_ms() -> u64 {
    DEFAULT_ROUTING_TABLE_CLEANUP_INTERVAL_MS
}

fn default_shutdown_max_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_MAX_TIMEOUT_MS
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_incoming_requests: DEFAULT_MAX_INCOMING_REQUESTS,
            upper_threshold_percent: DEFAULT_UPPER_THRESHOLD_PERCENT,
            lower_threshold_percent: DEFAULT_LOWER_THRESHOLD_PERCENT,
        }
    }
}

impl BackpressureConfig {
    /// Threshold values only matter, and are only checked, when enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.max_incoming_requests <= 0 {
            return Err(ConfigError::InvalidMaxIncomingRequests(
                self.max_incoming_requests,
            ));
        }
        if self.upper_threshold_percent <= 0 || self.upper_threshold_percent > 100 {
            return Err(ConfigError::InvalidUpperThreshold(
                self.upper_threshold_percent,
            ));
        }
        if self.lower_threshold_percent < 0 || self.lower_threshold_percent >= 100 {
            return Err(ConfigError::InvalidLowerThreshold(
                self.lower_threshold_percent,
            ));
        }
        if self.lower_threshold_percent >= self.upper_threshold_percent {
            return Err(ConfigError::LowerThresholdNotBelowUpper {
                lower: self.lower_threshold_percent,
                upper: self.upper_threshold_percent,
            });
        }
        Ok(())
    }
}

impl RouterConfig {
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = json5::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json5_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_json5_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gbids.is_empty() {
            return Err(ConfigError::MissingGbids);
        }
        sanitize_channel_id(&self.channel_id)?;
        if self.routing_table_cleanup_interval_ms == 0 {
            return Err(ConfigError::ZeroCleanupInterval);
        }
        self.backpressure.validate()
    }

    /// Default backend id.
    pub fn default_gbid(&self) -> Option<&str> {
        self.gbids.first().map(String::as_str)
    }

    /// The addresses routing to which would loop back into this process.
    pub fn own_addresses(&self) -> Vec<Address> {
        let mut addresses = Vec::with_capacity(self.gbids.len() * 2 + 2);
        for address in [&self.own_address, &self.reply_to_address] {
            addresses.push(address.clone());
            for gbid in &self.gbids {
                addresses.push(address.with_broker_uri(gbid));
            }
        }
        addresses
    }

    pub fn routing_table_cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.routing_table_cleanup_interval_ms)
    }

    pub fn shutdown_max_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_max_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{BackpressureConfig, RouterConfig};
    use crate::address::Address;
    use crate::error::ConfigError;
    use crate::routing::address_validator::RuntimeRole;
    use std::time::Duration;

    const CONFIG: &str = r#"{
        // this process on the default backend
        own_address: { type: "mqtt", broker_uri: "joynrdefaultgbid", topic: "cc/global" },
        reply_to_address: { type: "mqtt", broker_uri: "joynrdefaultgbid", topic: "cc/replyto" },
        gbids: ["joynrdefaultgbid", "othergbid"],
        channel_id: "cc-channel-01",
        backpressure: { enabled: true },
        separate_reply_receiver: true,
    }"#;

    #[test]
    fn defaults_are_applied() {
        let config = RouterConfig::from_json5_str(CONFIG).expect("valid config");

        assert_eq!(config.role, RuntimeRole::ClusterController);
        assert_eq!(
            config.backpressure,
            BackpressureConfig {
                enabled: true,
                ..BackpressureConfig::default()
            }
        );
        assert!(config.separate_reply_receiver);
        assert_eq!(config.default_gbid(), Some("joynrdefaultgbid"));
        assert_eq!(config.routing_table_cleanup_interval(), Duration::from_secs(60));
        assert_eq!(config.shutdown_max_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn own_addresses_cover_every_backend() {
        let config = RouterConfig::from_json5_str(CONFIG).expect("valid config");
        let own = config.own_addresses();

        assert!(own.contains(&Address::mqtt("othergbid", "cc/global")));
        assert!(own.contains(&Address::mqtt("othergbid", "cc/replyto")));
        assert!(own.contains(&Address::mqtt("joynrdefaultgbid", "cc/global")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = RouterConfig::from_json5_str(
            r#"{ own_address: { type: "in_process" }, reply_to_address: { type: "in_process" },
                 gbids: ["g"], channel_id: "c", unexpected: 1 }"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = RouterConfig::from_json5_str(CONFIG).expect("valid config");

        config.channel_id = "1234-5678".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidChannelId(_))));

        config.channel_id = "channel".to_string();
        config.gbids.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingGbids)));
    }

    #[test]
    fn zero_cleanup_interval_is_rejected() {
        let result = RouterConfig::from_json5_str(
            r#"{ own_address: { type: "in_process" }, reply_to_address: { type: "in_process" },
                 gbids: ["g"], channel_id: "c", routing_table_cleanup_interval_ms: 0 }"#,
        );
        assert!(matches!(result, Err(ConfigError::ZeroCleanupInterval)));
    }

    #[test]
    fn backpressure_ranges_are_checked_only_when_enabled() {
        let valid = BackpressureConfig {
            enabled: true,
            ..BackpressureConfig::default()
        };
        assert!(valid.validate().is_ok());

        let cases = [
            (
                BackpressureConfig {
                    max_incoming_requests: 0,
                    ..valid.clone()
                },
                "max",
            ),
            (
                BackpressureConfig {
                    upper_threshold_percent: 101,
                    ..valid.clone()
                },
                "upper",
            ),
            (
                BackpressureConfig {
                    lower_threshold_percent: -1,
                    ..valid.clone()
                },
                "lower",
            ),
            (
                BackpressureConfig {
                    lower_threshold_percent: 80,
                    ..valid.clone()
                },
                "order",
            ),
        ];
        for (config, case) in cases {
            let result = config.validate();
            match case {
                "max" => assert!(matches!(result, Err(ConfigError::InvalidMaxIncomingRequests(0)))),
                "upper" => assert!(matches!(result, Err(ConfigError::InvalidUpperThreshold(101)))),
                "lower" => assert!(matches!(result, Err(ConfigError::InvalidLowerThreshold(-1)))),
                _ => assert!(matches!(
                    result,
                    Err(ConfigError::LowerThresholdNotBelowUpper { lower: 80, upper: 80 })
                )),
            }

            let disabled = BackpressureConfig {
                enabled: false,
                ..config
            };
            assert!(disabled.validate().is_ok());
        }
    }
}
