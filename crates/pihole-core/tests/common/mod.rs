//! Test doubles and common utilities for lifecycle contract tests
//!
//! The mock client keeps records in memory the way Pi-hole does (a flat list
//! of domain/ip pairs) and counts the calls the lifecycle makes.

#![allow(dead_code)]

use pihole_core::config::AuthMode;
use pihole_core::error::{Error, Result};
use pihole_core::traits::{DnsRecordClient, StateStore};
use pihole_core::{DnsRecord, DnsRecordList, Lifecycle, MemoryStateStore, PiholeProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A mock DnsRecordClient that tracks calls
#[derive(Default)]
pub struct MockDnsClient {
    records: Mutex<DnsRecordList>,
    /// Message returned by create_record() as a Pi-hole refusal
    create_error: Mutex<Option<String>>,
    list_call_count: AtomicUsize,
    create_call_count: AtomicUsize,
    delete_call_count: AtomicUsize,
}

impl MockDnsClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A client whose Pi-hole already holds these records
    pub fn with_records(records: &[(&str, &str)]) -> Arc<Self> {
        let client = Self::default();
        *client.records.lock().unwrap() = records
            .iter()
            .map(|(domain, ip)| DnsRecord::new(*domain, *ip))
            .collect();
        Arc::new(client)
    }

    /// Make every following create_record() fail with this message
    pub fn refuse_creates(&self, message: &str) {
        *self.create_error.lock().unwrap() = Some(message.to_string());
    }

    /// Remove a record behind the lifecycle's back
    pub fn remove_out_of_band(&self, domain: &str, ip: &str) {
        self.records
            .lock()
            .unwrap()
            .retain(|r| !(r.domain == domain && r.ip == ip));
    }

    /// Current records
    pub fn records(&self) -> DnsRecordList {
        self.records.lock().unwrap().clone()
    }

    pub fn contains(&self, domain: &str, ip: &str) -> bool {
        self.records()
            .iter()
            .any(|r| r.domain == domain && r.ip == ip)
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times create_record() was called
    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of delete calls (delete_record() and delete_exact())
    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DnsRecordClient for MockDnsClient {
    async fn list_records(&self) -> Result<DnsRecordList> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.records())
    }

    async fn create_record(&self, record: &DnsRecord) -> Result<DnsRecord> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.create_error.lock().unwrap().clone() {
            return Err(Error::provider("pihole", message));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(record.clone())
    }

    async fn get_record(&self, domain: &str) -> Result<DnsRecord> {
        let mut records = self.get_record_list(domain).await?;
        Ok(records.swap_remove(0))
    }

    async fn get_record_list(&self, domain: &str) -> Result<DnsRecordList> {
        let matches: DnsRecordList = self
            .list_records()
            .await?
            .into_iter()
            .filter(|r| r.matches_domain(domain))
            .collect();
        if matches.is_empty() {
            return Err(Error::not_found(format!("dns record {} not found", domain)));
        }
        Ok(matches)
    }

    async fn delete_record(&self, domain: &str) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        self.get_record_list(domain).await?;
        self.records
            .lock()
            .unwrap()
            .retain(|r| !r.matches_domain(domain));
        Ok(())
    }

    async fn delete_exact(&self, record: &DnsRecord) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let Some(pos) = records
            .iter()
            .position(|r| r.matches_domain(&record.domain) && r.ip == record.ip)
        else {
            return Err(Error::not_found(format!("dns record {} not found", record)));
        };
        records.remove(pos);
        Ok(())
    }

    fn auth_mode(&self) -> AuthMode {
        AuthMode::Token
    }

    fn client_name(&self) -> &'static str {
        "mock"
    }
}

/// Lifecycle over the mock client and an in-memory state store
pub fn memory_lifecycle(client: &Arc<MockDnsClient>) -> Lifecycle {
    lifecycle_with_state(client, Box::new(MemoryStateStore::new()))
}

/// Lifecycle over the mock client and the given state store
pub fn lifecycle_with_state(client: &Arc<MockDnsClient>, state: Box<dyn StateStore>) -> Lifecycle {
    let client: Arc<dyn DnsRecordClient> = client.clone();
    Lifecycle::new(Arc::new(PiholeProvider::new()), client, state)
}

/// Desired attributes of a pihole_dns_record
pub fn record(domain: &str, ip: &str) -> pihole_core::ResourceData {
    pihole_core::ResourceData::new()
        .with("domain", domain)
        .with("ip", ip)
}
