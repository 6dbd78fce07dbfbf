//! Tests for builder modules

use ctxpool::builders::PoolBuilder;
use ctxpool::config::PoolConfig;
use ctxpool::core::PoolError;

#[test]
fn test_builder_without_runtime_fails() {
    let err = PoolBuilder::new().workers(1).build().unwrap_err();
    assert!(matches!(err, PoolError::NoRuntime(_)));
}

#[tokio::test]
async fn test_builder_applies_settings() {
    let pool = PoolBuilder::new()
        .workers(3)
        .admission_buffer(5)
        .async_submit(true)
        .async_errors(true)
        .build()
        .unwrap();

    let cfg = pool.config();
    assert_eq!(cfg.workers, 3);
    assert_eq!(cfg.admission_buffer, Some(5));
    assert!(cfg.async_submit);
    assert!(cfg.async_errors);
    assert_eq!(pool.stats().worker_count, 3);
    pool.kill();
}

#[tokio::test]
async fn test_builder_from_config() {
    let config = PoolConfig::new().with_workers(2).with_unbounded_admission();
    let pool = PoolBuilder::from_config(config.clone()).build().unwrap();
    assert_eq!(pool.config(), &config);
    pool.kill();
}

#[tokio::test]
async fn test_distinct_pools_have_distinct_ids() {
    let a = PoolBuilder::new().workers(1).build().unwrap();
    let b = PoolBuilder::new().workers(1).build().unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(a.id(), a.clone().id());
}
