//! Contract Test: Import & Destroy
//!
//! Constraints verified:
//! - Import reads the record from Pi-hole and stores it under the address
//! - Importing a record that does not exist stores nothing
//! - Destroy deletes exactly the managed pair and forgets the address
//! - Destroying a record already gone from Pi-hole still forgets it

mod common;

use common::*;
use pihole_core::traits::StateStore;
use pihole_core::Error;

const ADDRESS: &str = "pihole_dns_record.nas";
const TYPE: &str = "pihole_dns_record";

#[tokio::test]
async fn import_existing_record() {
    let client = MockDnsClient::with_records(&[("nas.lan", "10.0.0.2")]);
    let lifecycle = memory_lifecycle(&client);

    let state = lifecycle
        .import(ADDRESS, TYPE, "nas.lan_10.0.0.2")
        .await
        .unwrap();

    assert_eq!(state.id, "nas.lan_10.0.0.2");
    assert_eq!(
        state.attributes.get("domain").and_then(|v| v.as_str()),
        Some("nas.lan")
    );
    assert_eq!(
        state.attributes.get("ip").and_then(|v| v.as_str()),
        Some("10.0.0.2")
    );
    assert_eq!(client.create_call_count(), 0);
    assert!(lifecycle.state().get(ADDRESS).await.unwrap().is_some());
}

#[tokio::test]
async fn import_missing_record_is_not_found() {
    let client = MockDnsClient::with_records(&[("nas.lan", "10.0.0.9")]);
    let lifecycle = memory_lifecycle(&client);

    let err = lifecycle
        .import(ADDRESS, TYPE, "nas.lan_10.0.0.2")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(lifecycle.state().get(ADDRESS).await.unwrap().is_none());
}

#[tokio::test]
async fn import_malformed_id_fails() {
    let client = MockDnsClient::with_records(&[("nas.lan", "10.0.0.2")]);
    let lifecycle = memory_lifecycle(&client);

    assert!(lifecycle.import(ADDRESS, TYPE, "nas.lan").await.is_err());
    assert_eq!(client.list_call_count(), 0);
}

#[tokio::test]
async fn import_into_managed_address_is_rejected() {
    let client = MockDnsClient::with_records(&[("nas.lan", "10.0.0.2")]);
    let lifecycle = memory_lifecycle(&client);

    lifecycle
        .import(ADDRESS, TYPE, "nas.lan_10.0.0.2")
        .await
        .unwrap();
    let err = lifecycle
        .import(ADDRESS, TYPE, "nas.lan_10.0.0.2")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn destroy_deletes_managed_pair_only() {
    let client = MockDnsClient::with_records(&[("nas.lan", "10.0.0.9")]);
    let lifecycle = memory_lifecycle(&client);

    lifecycle
        .apply(ADDRESS, TYPE, record("nas.lan", "10.0.0.2"))
        .await
        .unwrap();
    lifecycle.destroy(ADDRESS).await.unwrap();

    assert!(!client.contains("nas.lan", "10.0.0.2"));
    assert!(client.contains("nas.lan", "10.0.0.9"));
    assert!(lifecycle.state().get(ADDRESS).await.unwrap().is_none());
}

#[tokio::test]
async fn destroy_after_out_of_band_delete_succeeds() {
    let client = MockDnsClient::new();
    let lifecycle = memory_lifecycle(&client);

    lifecycle
        .apply(ADDRESS, TYPE, record("nas.lan", "10.0.0.2"))
        .await
        .unwrap();
    client.remove_out_of_band("nas.lan", "10.0.0.2");

    lifecycle.destroy(ADDRESS).await.unwrap();
    assert!(lifecycle.state().get(ADDRESS).await.unwrap().is_none());
}

#[tokio::test]
async fn destroy_unmanaged_address_is_not_found() {
    let client = MockDnsClient::new();
    let lifecycle = memory_lifecycle(&client);

    let err = lifecycle.destroy(ADDRESS).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(client.delete_call_count(), 0);
}
