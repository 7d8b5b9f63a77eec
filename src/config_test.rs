//! Tests for environment configuration
//!
//! Parsing goes through `from_lookup` with a map, so no test touches the
//! real process environment.

use super::*;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults_when_nothing_set() {
    let config = Config::from_lookup(lookup(&[])).expect("config");

    assert_eq!(config.traffic_addr, "0.0.0.0:80".parse().expect("addr"));
    assert_eq!(config.control_addr, "0.0.0.0:8080".parse().expect("addr"));
    assert_eq!(config.prestop_grace, Duration::from_secs(3));
    assert_eq!(config.demo_work, Duration::from_millis(1000));
    assert_eq!(config, Config::default());
}

#[test]
fn test_overrides_are_applied() {
    let config = Config::from_lookup(lookup(&[
        (TRAFFIC_ADDR_VAR, "127.0.0.1:9000"),
        (CONTROL_ADDR_VAR, " 127.0.0.1:9001 "),
        (PRESTOP_GRACE_VAR, "10"),
        (DEMO_WORK_VAR, "0"),
    ]))
    .expect("config");

    assert_eq!(config.traffic_addr, "127.0.0.1:9000".parse().expect("addr"));
    assert_eq!(config.control_addr, "127.0.0.1:9001".parse().expect("addr"));
    assert_eq!(config.prestop_grace, Duration::from_secs(10));
    assert_eq!(config.demo_work, Duration::ZERO);
}

/// Empty values behave like unset ones
#[test]
fn test_empty_values_fall_back_to_defaults() {
    let config = Config::from_lookup(lookup(&[(TRAFFIC_ADDR_VAR, ""), (PRESTOP_GRACE_VAR, "  ")]))
        .expect("config");

    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_address_is_rejected() {
    let err = Config::from_lookup(lookup(&[(CONTROL_ADDR_VAR, "localhost")]))
        .expect_err("bare hostname is not a socket address");

    assert_eq!(
        err,
        ConfigError::InvalidAddress {
            key: CONTROL_ADDR_VAR,
            value: "localhost".to_string(),
        }
    );
}

#[test]
fn test_invalid_grace_is_rejected() {
    let err = Config::from_lookup(lookup(&[(PRESTOP_GRACE_VAR, "3s")]))
        .expect_err("unit suffix is not accepted");

    assert!(matches!(err, ConfigError::InvalidDuration { key, .. } if key == PRESTOP_GRACE_VAR));
    assert!(err.to_string().contains(PRESTOP_GRACE_VAR));
}
