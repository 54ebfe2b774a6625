use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use skat_backend::errors::domain::{AuthKind, ConflictKind, DomainError};
use skat_backend::services::{LoginOutcome, NewReservation, User};
use skat_backend::EngineConfig;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::support::test_state::{
    build_engine_with_clock, login_with, EngineHarness, ANNA_TOKEN, MALLORY_TOKEN,
};

const EVENING: OffsetDateTime = datetime!(2024-06-01 19:00 UTC);

fn user(name: &str) -> User {
    User {
        name: name.to_string(),
        roles: Vec::new(),
    }
}

/// Engine whose clock starts at `EVENING` and moves with the returned offset.
fn harness() -> (EngineHarness, Arc<AtomicI64>) {
    let offset = Arc::new(AtomicI64::new(0));
    let clock_offset = Arc::clone(&offset);
    let h = build_engine_with_clock(
        EngineConfig::for_tests(),
        Arc::new(move || EVENING + Duration::seconds(clock_offset.load(Ordering::SeqCst))),
    );
    (h, offset)
}

async fn reserve_evening(h: &EngineHarness) {
    h.reservations
        .create(
            &user("anna"),
            NewReservation {
                reserved_at_utc: EVENING,
                duration_minutes: 120,
                players: vec!["anna".into(), "bob".into(), "carl".into()],
            },
            EVENING - Duration::days(1),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn reserved_table_admits_only_listed_accounts() {
    let (h, _) = harness();
    reserve_evening(&h).await;
    let e = h.engine.as_ref();

    assert!(matches!(
        e.login("mallory", None).await.unwrap(),
        LoginOutcome::AuthRequired
    ));
    assert!(matches!(
        e.login("mallory", Some(MALLORY_TOKEN)).await,
        Err(DomainError::Conflict(ConflictKind::TableReserved, _))
    ));
    // a listed account may not sit down under another listed name
    assert!(matches!(
        e.login("bob", Some(ANNA_TOKEN)).await,
        Err(DomainError::Conflict(ConflictKind::TableReserved, _))
    ));

    let ticket = login_with(e, "anna", Some(ANNA_TOKEN)).await;
    assert_eq!(e.session_user(&ticket).map(|u| u.name), Some("anna".to_string()));
}

#[tokio::test]
async fn table_opens_again_when_the_window_ends() {
    let (h, offset) = harness();
    reserve_evening(&h).await;
    offset.store(120 * 60, Ordering::SeqCst);

    let e = h.engine.as_ref();
    assert!(matches!(
        e.login("mallory", None).await.unwrap(),
        LoginOutcome::Ticket(_)
    ));
    assert!(h.reservations.list(EVENING + Duration::hours(2)).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_creator_or_admin_deletes() {
    let (h, _) = harness();
    reserve_evening(&h).await;
    let now = EVENING - Duration::hours(1);
    let id = h.reservations.list(now).await.unwrap()[0].id;

    assert!(matches!(
        h.reservations.delete(&user("bob"), id).await,
        Err(DomainError::Auth(AuthKind::Forbidden, _))
    ));
    let admin = User {
        name: "root".into(),
        roles: vec!["admin".into()],
    };
    h.reservations.delete(&admin, id).await.unwrap();
    assert!(h.reservations.list(now).await.unwrap().is_empty());
}
