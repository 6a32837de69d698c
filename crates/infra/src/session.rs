//! Login-time session resolution: load the user document, run the account
//! bootstrap, persist what it changed, normalize into a [`Principal`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use rihla_auth::{
    AccountBootstrap, BootstrapResult, EmployeeRecord, PermissionCatalog, Principal, UserRecord,
};
use serde_json::Value as JsonValue;
use rihla_core::{DocumentId, UserId};

use crate::gateway::{GatewayError, PersistenceGateway, Query, to_document};

pub const USERS: &str = "users";
pub const EMPLOYEES: &str = "employees";

pub struct SessionResolver<G> {
    gateway: G,
    catalog: Arc<PermissionCatalog>,
    bootstrap: AccountBootstrap,
}

impl<G: PersistenceGateway> SessionResolver<G> {
    pub fn new(gateway: G, catalog: Arc<PermissionCatalog>, bootstrap: AccountBootstrap) -> Self {
        Self {
            gateway,
            catalog,
            bootstrap,
        }
    }

    /// Resolve the signed-in email to a principal.
    ///
    /// Returns `Ok(None)` when neither a user nor an employee record exists;
    /// callers treat that as "no user", which every access decision denies.
    pub async fn resolve(&self, email: &str) -> Result<Option<Principal>, GatewayError> {
        self.resolve_at(email, Utc::now()).await
    }

    pub async fn resolve_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Principal>, GatewayError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Ok(None);
        }

        // Older records may hold the address as typed at sign-up.
        let by_email = Query::all().where_eq_ignore_case("email", &email).limit(1);

        if let Some(doc) = self.gateway.query(USERS, &by_email).await?.into_iter().next() {
            let record: UserRecord = doc.decode()?;
            let stored_email = record.email.clone();
            let mut result = self.bootstrap.on_login(record, now);
            let mut patch = result.patch();
            if stored_email != email {
                patch.insert("email".to_string(), JsonValue::String(email.clone()));
                result.record.email = email;
            }
            self.gateway.update(USERS, &doc.id, patch).await?;
            return Ok(Some(self.principal(&result)));
        }

        let employees = self.gateway.query(EMPLOYEES, &by_email).await?;
        let Some(doc) = employees.into_iter().next() else {
            warn!(email = %email, "sign-in without user or employee record");
            return Ok(None);
        };
        let employee: EmployeeRecord = doc.decode()?;

        // The store assigns the real id on create.
        let mut result = self.bootstrap.from_employee(UserId::generate(), &employee, now);
        let id: DocumentId = self.gateway.create(USERS, to_document(&result.record)?).await?;
        result.record.id = UserId::from(id);
        info!(
            user = %result.record.id, employee = %employee.id,
            "user account derived from employee"
        );

        Ok(Some(self.principal(&result)))
    }

    fn principal(&self, result: &BootstrapResult) -> Principal {
        if !result.changes.is_empty() {
            info!(user = %result.record.id, changes = ?result.changes, "account bootstrap applied");
        }
        Principal::resolve(&result.record, &self.catalog)
    }
}
