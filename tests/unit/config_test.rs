//! Tests for configuration parsing and validation

use ctxpool::config::pool::MAX_WORKERS;
use ctxpool::config::PoolConfig;

#[test]
fn test_default_config_is_valid() {
    let cfg = PoolConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.workers, num_cpus::get());
    assert_eq!(cfg.admission_buffer, Some(0));
    assert!(!cfg.async_submit);
    assert!(!cfg.async_errors);
}

#[test]
fn test_zero_workers_is_valid() {
    let cfg = PoolConfig::new().with_workers(0);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_too_many_workers_rejected() {
    let cfg = PoolConfig::new().with_workers(MAX_WORKERS + 1);
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("workers"));
}

#[test]
fn test_builder_methods_chain() {
    let cfg = PoolConfig::new()
        .with_workers(8)
        .with_admission_buffer(32)
        .with_async_submit(true)
        .with_async_errors(true);

    assert_eq!(cfg.workers, 8);
    assert_eq!(cfg.admission_buffer, Some(32));
    assert!(cfg.async_submit);
    assert!(cfg.async_errors);

    let cfg = cfg.with_unbounded_admission();
    assert_eq!(cfg.admission_buffer, None);
}

#[test]
fn test_from_json_partial() {
    let cfg = PoolConfig::from_json_str(r#"{"workers": 2, "async_errors": true}"#).unwrap();
    assert_eq!(cfg.workers, 2);
    assert!(cfg.async_errors);
    assert_eq!(cfg.admission_buffer, Some(0));
    assert!(!cfg.async_submit);
}

#[test]
fn test_from_json_unbounded_admission() {
    let cfg = PoolConfig::from_json_str(r#"{"admission_buffer": null}"#).unwrap();
    assert_eq!(cfg.admission_buffer, None);
}

#[test]
fn test_from_json_rejects_invalid() {
    assert!(PoolConfig::from_json_str("{not json").is_err());

    let too_many = format!(r#"{{"workers": {}}}"#, MAX_WORKERS + 1);
    assert!(PoolConfig::from_json_str(&too_many).is_err());
}

#[test]
fn test_config_serializes_round_trip() {
    let cfg = PoolConfig::new().with_workers(3).with_unbounded_admission();
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(PoolConfig::from_json_str(&json).unwrap(), cfg);
}
