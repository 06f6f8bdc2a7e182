//! Contract Test: Refresh & State Persistence
//!
//! Constraints verified:
//! - Refresh keeps records that still exist and drops vanished ones
//! - Refreshing an unmanaged address is NotFound
//! - State written by one run is honored by the next (no duplicate creates)

mod common;

use common::*;
use pihole_core::lifecycle::ApplyOutcome;
use pihole_core::traits::StateStore;
use pihole_core::FileStateStore;

const TYPE: &str = "pihole_dns_record";

#[tokio::test]
async fn refresh_keeps_present_record() {
    let client = MockDnsClient::new();
    let lifecycle = memory_lifecycle(&client);

    lifecycle
        .apply("pihole_dns_record.nas", TYPE, record("nas.lan", "10.0.0.2"))
        .await
        .unwrap();

    let state = lifecycle
        .refresh("pihole_dns_record.nas")
        .await
        .unwrap()
        .expect("record still exists");
    assert_eq!(state.id, "nas.lan_10.0.0.2");
    assert_eq!(
        state.attributes.get("ip").and_then(|v| v.as_str()),
        Some("10.0.0.2")
    );
}

#[tokio::test]
async fn refresh_drops_vanished_record() {
    let client = MockDnsClient::new();
    let lifecycle = memory_lifecycle(&client);

    lifecycle
        .apply("pihole_dns_record.nas", TYPE, record("nas.lan", "10.0.0.2"))
        .await
        .unwrap();
    client.remove_out_of_band("nas.lan", "10.0.0.2");

    assert!(lifecycle
        .refresh("pihole_dns_record.nas")
        .await
        .unwrap()
        .is_none());
    assert!(lifecycle
        .state()
        .get("pihole_dns_record.nas")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn refresh_all_reports_kept_and_removed() {
    let client = MockDnsClient::new();
    let lifecycle = memory_lifecycle(&client);

    lifecycle
        .apply("pihole_dns_record.nas", TYPE, record("nas.lan", "10.0.0.2"))
        .await
        .unwrap();
    lifecycle
        .apply("pihole_dns_record.tv", TYPE, record("tv.lan", "10.0.0.4"))
        .await
        .unwrap();
    client.remove_out_of_band("tv.lan", "10.0.0.4");

    let report = lifecycle.refresh_all().await.unwrap();

    assert_eq!(report.kept, vec!["pihole_dns_record.nas".to_string()]);
    assert_eq!(report.removed, vec!["pihole_dns_record.tv".to_string()]);
    assert_eq!(
        lifecycle.state().list().await.unwrap(),
        vec!["pihole_dns_record.nas".to_string()]
    );
}

#[tokio::test]
async fn refresh_unmanaged_address_is_not_found() {
    let client = MockDnsClient::new();
    let lifecycle = memory_lifecycle(&client);

    let err = lifecycle.refresh("pihole_dns_record.nas").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(client.list_call_count(), 0);
}

#[tokio::test]
async fn restart_does_not_create_twice() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("state.json");
    let client = MockDnsClient::new();

    // First run
    {
        let store = FileStateStore::new(&path).await.unwrap();
        let lifecycle = lifecycle_with_state(&client, Box::new(store));
        let outcome = lifecycle
            .apply("pihole_dns_record.nas", TYPE, record("nas.lan", "10.0.0.2"))
            .await
            .unwrap();
        assert!(matches!(outcome, ApplyOutcome::Created { .. }));
        lifecycle.state().flush().await.unwrap();
    }

    // Second run reads the state file
    {
        let store = FileStateStore::new(&path).await.unwrap();
        let lifecycle = lifecycle_with_state(&client, Box::new(store));
        let outcome = lifecycle
            .apply("pihole_dns_record.nas", TYPE, record("nas.lan", "10.0.0.2"))
            .await
            .unwrap();
        assert!(matches!(outcome, ApplyOutcome::Unchanged { .. }));
    }

    assert_eq!(client.create_call_count(), 1);
    assert_eq!(client.records().len(), 1);
}
