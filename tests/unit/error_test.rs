//! Tests for error classification and display

use anyhow::Context as _;
use ctxpool::core::{ContextError, PoolError, WorkError};

#[test]
fn test_cant_do_display() {
    assert_eq!(
        WorkError::CantDo.to_string(),
        "failed to send work item to a worker before the context expired"
    );
}

#[test]
fn test_context_error_display() {
    assert_eq!(ContextError::Cancelled.to_string(), "context canceled");
    assert_eq!(
        ContextError::DeadlineExceeded.to_string(),
        "context deadline exceeded"
    );
    // Transparent: the wrapper adds nothing.
    assert_eq!(
        WorkError::from(ContextError::DeadlineExceeded).to_string(),
        "context deadline exceeded"
    );
}

#[test]
fn test_from_work_recognises_bare_context_error() {
    let err = WorkError::from_work(anyhow::Error::new(ContextError::Cancelled));
    assert!(matches!(err, WorkError::Context(ContextError::Cancelled)));
    assert!(err.is_context());
    assert_eq!(err.context_error(), Some(ContextError::Cancelled));
}

#[test]
fn test_from_work_keeps_wrapped_context_error_as_action() {
    let wrapped: anyhow::Result<()> =
        Err(anyhow::Error::new(ContextError::DeadlineExceeded)).context("fetching page");
    let err = WorkError::from_work(wrapped.unwrap_err());

    assert!(matches!(err, WorkError::Action(_)));
    assert_eq!(err.to_string(), "fetching page");
    // Still recognisable as a context failure further down the chain.
    assert!(err.is_context());
    assert_eq!(err.context_error(), Some(ContextError::DeadlineExceeded));
}

#[test]
fn test_plain_error_is_not_context() {
    let err = WorkError::from_work(anyhow::anyhow!("disk full"));
    assert!(!err.is_context());
    assert_eq!(err.context_error(), None);
    assert_eq!(err.to_string(), "disk full");
}

#[test]
fn test_panicked_display() {
    let err = WorkError::Panicked("index out of bounds".to_string());
    assert_eq!(err.to_string(), "work item panicked: index out of bounds");
    assert!(!err.is_context());
}

#[test]
fn test_pool_error_display() {
    let err = PoolError::InvalidConfig("workers must be at most 1".to_string());
    assert!(err.to_string().contains("workers must be at most 1"));
}
