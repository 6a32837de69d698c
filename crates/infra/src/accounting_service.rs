//! Expense recording and ledger summaries.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use rihla_accounting::{AccountingDocument, Artifact, Expense, LedgerSummary};
use rihla_auth::{AccessPolicy, Principal};
use rihla_core::{Amount, DataMode, DocumentId, DomainError};

use crate::gateway::{GatewayError, PersistenceGateway, Query, to_document};

pub const EXPENSES: &str = "expenses";

#[derive(Debug, Error)]
pub enum AccountingServiceError {
    #[error("access denied: {0}")]
    Denied(String),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] GatewayError),
}

pub struct AccountingService<G> {
    gateway: G,
    policy: Arc<AccessPolicy>,
    mode: DataMode,
}

impl<G: PersistenceGateway> AccountingService<G> {
    pub fn new(gateway: G, policy: Arc<AccessPolicy>, mode: DataMode) -> Self {
        Self {
            gateway,
            policy,
            mode,
        }
    }

    pub async fn record_expense(
        &self,
        principal: &Principal,
        description: &str,
        category: &str,
        amount: Amount,
    ) -> Result<DocumentId, AccountingServiceError> {
        if !self.policy.can_access_section(Some(principal), "expenses") {
            debug!(user = %principal.user_id, "expense recording denied");
            return Err(AccountingServiceError::Denied("section 'expenses'".to_string()));
        }

        let mut expense = Expense::new(
            description.trim(),
            category.trim(),
            amount,
            principal.user_id.clone(),
            principal.display_name.clone(),
            Utc::now(),
        );
        expense.data_mode = self.mode;
        expense.validate()?;

        let id = self.gateway.create(EXPENSES, to_document(&expense)?).await?;
        info!(expense_id = %id, amount = %amount, user = %principal.user_id, "expense recorded");
        Ok(id)
    }

    /// Revenue and expense totals over one data partition.
    pub async fn summary(
        &self,
        principal: &Principal,
        mode: DataMode,
    ) -> Result<LedgerSummary, AccountingServiceError> {
        if !self.policy.can_access_section(Some(principal), "accounting") {
            debug!(user = %principal.user_id, "ledger summary denied");
            return Err(AccountingServiceError::Denied("section 'accounting'".to_string()));
        }

        let scoped = Query::scoped(mode);
        let revenues = self
            .gateway
            .query(Artifact::Revenue.collection(), &scoped)
            .await?
            .iter()
            .map(|doc| doc.decode::<AccountingDocument>())
            .collect::<Result<Vec<_>, _>>()?;
        let expenses = self
            .gateway
            .query(EXPENSES, &scoped)
            .await?
            .iter()
            .map(|doc| doc.decode::<Expense>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LedgerSummary::from_documents(&revenues, &expenses))
    }
}
