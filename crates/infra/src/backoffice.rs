//! Wiring: configuration + catalog + gateway → ready-to-use services.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use rihla_auth::{AccessPolicy, AccountBootstrap, PermissionCatalog};

use crate::accounting_service::AccountingService;
use crate::booking_service::BookingService;
use crate::config::AppConfig;
use crate::gateway::PersistenceGateway;
use crate::session::SessionResolver;

pub struct Backoffice<G> {
    pub config: AppConfig,
    pub catalog: Arc<PermissionCatalog>,
    pub policy: Arc<AccessPolicy>,
    pub sessions: SessionResolver<G>,
    pub bookings: BookingService<G>,
    pub accounting: AccountingService<G>,
}

impl<G> Backoffice<G>
where
    G: PersistenceGateway + Clone,
{
    /// Validate the permission catalog and assemble every service.
    ///
    /// A catalog that references unknown permissions is fatal.
    pub fn from_config(config: AppConfig, gateway: G) -> anyhow::Result<Self> {
        let catalog = PermissionCatalog::load_standard().context("loading permission catalog")?;
        Ok(Self::with_catalog(config, catalog, gateway))
    }

    pub fn with_catalog(config: AppConfig, catalog: PermissionCatalog, gateway: G) -> Self {
        let catalog = Arc::new(catalog);
        let policy = Arc::new(AccessPolicy::new(&catalog, config.default_policy));
        let bootstrap = AccountBootstrap::new(&config.admin_emails);

        info!(
            data_mode = %config.data_mode,
            default_policy = ?config.default_policy,
            permissions = catalog.permissions().len(),
            "back office initialized"
        );

        Self {
            sessions: SessionResolver::new(gateway.clone(), catalog.clone(), bootstrap),
            bookings: BookingService::new(gateway.clone(), policy.clone(), config.data_mode),
            accounting: AccountingService::new(gateway, policy.clone(), config.data_mode),
            config,
            catalog,
            policy,
        }
    }
}

/// Process entry helper: logging, environment config, then wiring.
pub fn bootstrap_from_env<G>(gateway: G) -> anyhow::Result<Backoffice<G>>
where
    G: PersistenceGateway + Clone,
{
    rihla_observability::init();
    let config = AppConfig::from_env().context("reading configuration from environment")?;
    Backoffice::from_config(config, gateway)
}
