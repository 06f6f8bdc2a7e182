//! Resource lifecycle
//!
//! The `Lifecycle` plays the part of the host framework: it takes the desired
//! attributes of a resource instance, compares them with what the state store
//! remembers, and calls the resource handlers accordingly.
//!
//! ## Apply Flow
//!
//! ```text
//! desired ──► validate ──► state.get(address)
//!                              │
//!          ┌───────────────────┼──────────────────────────┐
//!          ▼                   ▼                          ▼
//!       (none)          force-new differs            same attributes
//!       create          delete + create              read ──► gone? create
//!          │                   │                          │
//!          └───────────────────┴──────► state.put ◄───────┘
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::provider::PiholeProvider;
use crate::record::normalize_domain;
use crate::resource::Resource;
use crate::schema::{ResourceData, ResourceSchema};
use crate::traits::{DnsRecordClient, ResourceState, StateStore};

/// Result of an apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The resource was not managed before and has been created
    Created { id: String },
    /// The resource exists remotely with the desired attributes
    Unchanged { id: String },
    /// The resource was managed but had vanished remotely, so it was created again
    Recreated { id: String },
    /// A force-new attribute changed: the old object was deleted and a new one created
    Replaced { old_id: String, new_id: String },
}

impl ApplyOutcome {
    /// ID of the resource after the apply
    pub fn id(&self) -> &str {
        match self {
            ApplyOutcome::Created { id }
            | ApplyOutcome::Unchanged { id }
            | ApplyOutcome::Recreated { id } => id,
            ApplyOutcome::Replaced { new_id, .. } => new_id,
        }
    }
}

/// Result of refreshing every managed resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Addresses still present remotely
    pub kept: Vec<String>,
    /// Addresses dropped from state because the remote object is gone
    pub removed: Vec<String>,
}

/// Drives resources against a configured client and a state store
pub struct Lifecycle {
    provider: Arc<PiholeProvider>,
    client: Arc<dyn DnsRecordClient>,
    state: Box<dyn StateStore>,
}

impl Lifecycle {
    pub fn new(
        provider: Arc<PiholeProvider>,
        client: Arc<dyn DnsRecordClient>,
        state: Box<dyn StateStore>,
    ) -> Self {
        Self {
            provider,
            client,
            state,
        }
    }

    /// The underlying state store
    pub fn state(&self) -> &dyn StateStore {
        self.state.as_ref()
    }

    fn resource(&self, resource_type: &str) -> Result<Arc<dyn Resource>> {
        self.provider.resource(resource_type).ok_or_else(|| {
            Error::invalid_input(format!(
                "Unknown resource type '{}'. Supported: {}",
                resource_type,
                self.provider.resource_types().join(", ")
            ))
        })
    }

    /// Make the resource at `address` match `desired`
    pub async fn apply(
        &self,
        address: &str,
        resource_type: &str,
        desired: ResourceData,
    ) -> Result<ApplyOutcome> {
        let resource = self.resource(resource_type)?;
        let schema = resource.schema();
        schema.validate(&desired).into_result(resource_type)?;

        let Some(prior) = self.state.get(address).await? else {
            info!("{}: creating", address);
            let id = self.create(address, resource.as_ref(), desired).await?;
            return Ok(ApplyOutcome::Created { id });
        };

        if prior.resource_type != resource_type {
            return Err(Error::invalid_input(format!(
                "{} is managed as '{}', not '{}'",
                address, prior.resource_type, resource_type
            )));
        }

        let changed = changed_force_new(&schema, &prior.to_data(), &desired);
        if !changed.is_empty() {
            info!(
                "{}: {} changed, replacing {}",
                address,
                changed.join(", "),
                prior.id
            );

            let mut old = prior.to_data();
            resource
                .delete(&mut old, self.client.as_ref())
                .await
                .into_result(resource_type)?;
            self.state.remove(address).await?;

            let new_id = self.create(address, resource.as_ref(), desired).await?;
            return Ok(ApplyOutcome::Replaced {
                old_id: prior.id,
                new_id,
            });
        }

        let mut current = prior.to_data();
        resource
            .read(&mut current, self.client.as_ref())
            .await
            .into_result(resource_type)?;

        if current.is_gone() {
            warn!("{}: {} no longer exists, creating it again", address, prior.id);
            self.state.remove(address).await?;
            let id = self.create(address, resource.as_ref(), desired).await?;
            return Ok(ApplyOutcome::Recreated { id });
        }

        debug!("{}: up to date", address);
        self.persist(address, resource_type, &current).await?;
        Ok(ApplyOutcome::Unchanged { id: prior.id })
    }

    async fn create(
        &self,
        address: &str,
        resource: &dyn Resource,
        mut data: ResourceData,
    ) -> Result<String> {
        data.clear_id();
        resource
            .create(&mut data, self.client.as_ref())
            .await
            .into_result(resource.type_name())?;

        let id = data
            .id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::provider(resource.type_name(), "create succeeded but set no ID")
            })?;

        self.persist(address, resource.type_name(), &data).await?;
        Ok(id)
    }

    async fn persist(&self, address: &str, resource_type: &str, data: &ResourceData) -> Result<()> {
        match ResourceState::from_data(resource_type, data) {
            Some(state) => self.state.put(address, &state).await,
            None => self.state.remove(address).await,
        }
    }

    /// Refresh one managed resource from Pi-hole
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ResourceState))`: The refreshed state
    /// - `Ok(None)`: The remote object is gone and was dropped from state
    pub async fn refresh(&self, address: &str) -> Result<Option<ResourceState>> {
        let prior = self
            .state
            .get(address)
            .await?
            .ok_or_else(|| Error::not_found(format!("{} is not managed", address)))?;
        let resource = self.resource(&prior.resource_type)?;

        let mut data = prior.to_data();
        resource
            .read(&mut data, self.client.as_ref())
            .await
            .into_result(&prior.resource_type)?;

        if data.is_gone() {
            info!("{}: remote object is gone, removing from state", address);
            self.state.remove(address).await?;
            return Ok(None);
        }

        self.persist(address, &prior.resource_type, &data).await?;
        self.state.get(address).await
    }

    /// Refresh every managed resource
    pub async fn refresh_all(&self) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();

        for address in self.state.list().await? {
            match self.refresh(&address).await? {
                Some(_) => report.kept.push(address),
                None => report.removed.push(address),
            }
        }

        self.state.flush().await?;
        Ok(report)
    }

    /// Delete a managed resource and forget it
    pub async fn destroy(&self, address: &str) -> Result<()> {
        let prior = self
            .state
            .get(address)
            .await?
            .ok_or_else(|| Error::not_found(format!("{} is not managed", address)))?;
        let resource = self.resource(&prior.resource_type)?;

        let mut data = prior.to_data();
        resource
            .delete(&mut data, self.client.as_ref())
            .await
            .into_result(&prior.resource_type)?;

        self.state.remove(address).await?;
        self.state.flush().await?;
        info!("{}: destroyed {}", address, prior.id);
        Ok(())
    }

    /// Bring an existing remote object under management
    pub async fn import(
        &self,
        address: &str,
        resource_type: &str,
        id: &str,
    ) -> Result<ResourceState> {
        if self.state.get(address).await?.is_some() {
            return Err(Error::invalid_input(format!(
                "{} is already managed; destroy or remove it first",
                address
            )));
        }

        let resource = self.resource(resource_type)?;
        if !resource.schema().importable {
            return Err(Error::invalid_input(format!(
                "{} does not support import",
                resource_type
            )));
        }

        let mut data = ResourceData::with_id(id);
        resource.import(&mut data).await.into_result(resource_type)?;
        resource
            .read(&mut data, self.client.as_ref())
            .await
            .into_result(resource_type)?;

        let state = ResourceState::from_data(resource_type, &data).ok_or_else(|| {
            Error::not_found(format!(
                "Cannot import non-existent remote object {} ({})",
                id, resource_type
            ))
        })?;

        self.state.put(address, &state).await?;
        self.state.flush().await?;
        info!("{}: imported {}", address, id);
        Ok(state)
    }
}

/// Names of force-new attributes whose value differs between prior and desired
fn changed_force_new<'a>(
    schema: &'a ResourceSchema,
    prior: &ResourceData,
    desired: &ResourceData,
) -> Vec<&'a str> {
    schema
        .attributes
        .iter()
        .filter(|(_, attr)| attr.force_new)
        .filter(|(name, attr)| {
            let old = prior.attributes.get(name.as_str());
            let new = desired.attributes.get(name.as_str());
            match (old.and_then(|v| v.as_str()), new.and_then(|v| v.as_str())) {
                (Some(old), Some(new)) if attr.case_insensitive => {
                    normalize_domain(old) != normalize_domain(new)
                }
                _ => old != new,
            }
        })
        .map(|(name, _)| name.as_str())
        .collect()
}
