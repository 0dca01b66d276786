//! Unit tests for the cleanup service

use chrono::Duration;
use mc_shared::config::CleanupConfig;
use std::sync::Arc;

use crate::domain::entities::{EmailVerification, VerificationPurpose};
use crate::repositories::{InMemoryVerificationCodeRepository, VerificationCodeRepository};
use crate::services::verification::{CleanupResult, CodeCleanupService, ManualClock};

use super::mocks::t0;

async fn seeded_repository() -> Arc<InMemoryVerificationCodeRepository> {
    let repo = Arc::new(InMemoryVerificationCodeRepository::new());
    let expired = EmailVerification::new(
        "a@example.com",
        "111111",
        VerificationPurpose::Register,
        t0() - Duration::hours(1),
        10,
    );
    let live = EmailVerification::new(
        "b@example.com",
        "222222",
        VerificationPurpose::Register,
        t0(),
        10,
    );
    let used_id = repo
        .create(EmailVerification::new(
            "c@example.com",
            "333333",
            VerificationPurpose::ResetPassword,
            t0(),
            10,
        ))
        .await
        .unwrap();
    repo.create(expired).await.unwrap();
    repo.create(live).await.unwrap();
    repo.mark_used(used_id).await.unwrap();
    repo
}

#[tokio::test]
async fn test_run_cleanup_removes_expired_and_used() {
    let repo = seeded_repository().await;
    let service = CodeCleanupService::new(repo.clone(), CleanupConfig::default())
        .with_clock(Arc::new(ManualClock::new(t0())));

    let result = service.run_cleanup().await.unwrap();
    assert_eq!(result, CleanupResult { records_deleted: 2 });
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_disabled_cleanup_is_a_no_op() {
    let repo = seeded_repository().await;
    let service = Arc::new(
        CodeCleanupService::new(
            repo.clone(),
            CleanupConfig {
                enabled: false,
                interval_seconds: 3600,
            },
        )
        .with_clock(Arc::new(ManualClock::new(t0()))),
    );

    assert_eq!(service.run_cleanup().await.unwrap(), CleanupResult::default());
    assert!(service.clone().start_background_task().is_none());
    assert_eq!(repo.len().await, 3);
}

#[tokio::test(start_paused = true)]
async fn test_background_task_sweeps_on_first_tick() {
    let repo = seeded_repository().await;
    let service = Arc::new(
        CodeCleanupService::new(
            repo.clone(),
            CleanupConfig {
                enabled: true,
                interval_seconds: 60,
            },
        )
        .with_clock(Arc::new(ManualClock::new(t0()))),
    );

    let handle = service.start_background_task().unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    assert_eq!(repo.len().await, 1);
    handle.abort();
}
