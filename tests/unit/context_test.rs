//! Tests for work contexts

use std::time::Duration;

use ctxpool::core::{ContextError, WorkContext};

#[tokio::test(start_paused = true)]
async fn test_timeout_reports_deadline_exceeded() {
    let ctx = WorkContext::background().with_timeout(Duration::from_millis(30));
    assert!(ctx.check().is_ok());

    ctx.done().await;
    assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    assert_eq!(ctx.check(), Err(ContextError::DeadlineExceeded));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_wins_over_later_deadline() {
    let ctx = WorkContext::background().with_timeout(Duration::from_secs(10));
    let child = ctx.child();
    ctx.cancel();

    child.done().await;
    assert_eq!(child.err(), Some(ContextError::Cancelled));
}

#[tokio::test]
async fn test_child_inherits_deadline() {
    let parent = WorkContext::background().with_timeout(Duration::from_secs(5));
    let child = parent.child();
    assert_eq!(child.deadline(), parent.deadline());

    let looser = parent.with_timeout(Duration::from_secs(60));
    assert_eq!(looser.deadline(), parent.deadline());
}

#[test]
fn test_background_never_expires() {
    let ctx = WorkContext::default();
    assert!(ctx.deadline().is_none());
    assert!(!ctx.is_done());
    assert_eq!(ctx.err(), None);
}
