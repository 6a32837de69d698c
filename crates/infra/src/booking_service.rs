//! Booking save/edit/delete, gated by access decisions and followed by the
//! accounting fan-out.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use rihla_accounting::{PaymentSummary, PostingResult, VoidResult};
use rihla_auth::{AccessPolicy, Principal};
use rihla_bookings::{Booking, BookingDraft, BookingKind, BookingValidationError, CreatorRef};
use rihla_core::{BookingId, DataMode, DocumentId, UserId};

use crate::gateway::{Direction, GatewayError, PersistenceGateway, Query, to_document};
use crate::gateway::query::DATA_MODE_FIELD;
use crate::posting::RevenuePostingWorkflow;

const DELETE_PERMISSION: &str = "delete_bookings";

#[derive(Debug, Error)]
pub enum BookingServiceError {
    #[error("access denied: {0}")]
    Denied(String),

    #[error(transparent)]
    Validation(#[from] BookingValidationError),

    #[error("a booking save is already in progress for user {0}")]
    SubmissionInFlight(UserId),

    #[error("booking {0} not found")]
    NotFound(BookingId),

    /// Cost, price and payment fields cannot change once accounting is posted.
    #[error("financial fields of booking {0} cannot be changed after posting")]
    FinancialFieldsLocked(BookingId),

    #[error(transparent)]
    Persistence(#[from] GatewayError),
}

/// Outcome of a successful booking save. The booking is stored even when
/// some of the accounting documents failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBookingOutcome {
    pub booking_id: BookingId,
    pub posting: PostingResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBookingOutcome {
    pub booking_id: BookingId,
    pub voided: VoidResult,
}

/// At most one in-flight booking save per user.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<Mutex<HashSet<UserId>>>,
}

/// Held for the duration of one save; releases the user on drop.
#[derive(Debug)]
pub struct SubmissionPermit {
    in_flight: Arc<Mutex<HashSet<UserId>>>,
    user_id: UserId,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, user_id: &UserId) -> Result<SubmissionPermit, BookingServiceError> {
        let mut set = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if !set.insert(user_id.clone()) {
            return Err(BookingServiceError::SubmissionInFlight(user_id.clone()));
        }
        Ok(SubmissionPermit {
            in_flight: self.in_flight.clone(),
            user_id: user_id.clone(),
        })
    }

    pub fn is_in_flight(&self, user_id: &UserId) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(user_id))
            .unwrap_or(false)
    }
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        set.remove(&self.user_id);
    }
}

pub struct BookingService<G> {
    gateway: G,
    policy: Arc<AccessPolicy>,
    workflow: RevenuePostingWorkflow<G>,
    guard: SubmissionGuard,
    mode: DataMode,
}

impl<G> BookingService<G>
where
    G: PersistenceGateway + Clone,
{
    pub fn new(gateway: G, policy: Arc<AccessPolicy>, mode: DataMode) -> Self {
        Self {
            workflow: RevenuePostingWorkflow::new(gateway.clone(), mode),
            gateway,
            policy,
            guard: SubmissionGuard::new(),
            mode,
        }
    }

    pub fn workflow(&self) -> &RevenuePostingWorkflow<G> {
        &self.workflow
    }

    /// Validate, persist and post a new booking.
    ///
    /// Nothing is written when access or validation fails. A failed booking
    /// write stops before any accounting document is attempted.
    pub async fn save_booking(
        &self,
        principal: &Principal,
        draft: BookingDraft,
    ) -> Result<SaveBookingOutcome, BookingServiceError> {
        let kind = draft.kind;
        self.authorize_write(principal, kind)?;

        let booking = draft.into_booking(
            CreatorRef {
                id: principal.user_id.clone(),
                name: principal.display_name.clone(),
            },
            Utc::now(),
        )?;

        let _permit = self.guard.acquire(&principal.user_id)?;

        let mut body = to_document(&booking)?;
        body.insert(DATA_MODE_FIELD.to_string(), json!(self.mode));
        let booking_id = match self.gateway.create(kind.collection(), body).await {
            Ok(id) => BookingId::from(id),
            Err(e) => {
                warn!(kind = %kind, user = %principal.user_id, error = %e, "booking write failed");
                return Err(e.into());
            }
        };
        info!(kind = %kind, booking_id = %booking_id, user = %principal.user_id, "booking saved");

        let summary = PaymentSummary::from_booking(&booking);
        let posting = self.workflow.post_booking_accounting(&booking_id, &summary).await;

        Ok(SaveBookingOutcome { booking_id, posting })
    }

    /// Apply an edit to a stored booking. Only non-financial fields (customer
    /// details, notes, line-item descriptions and details) may change.
    pub async fn update_booking(
        &self,
        principal: &Principal,
        booking_id: &BookingId,
        draft: BookingDraft,
    ) -> Result<(), BookingServiceError> {
        let kind = draft.kind;
        self.authorize_write(principal, kind)?;

        let current = self.load(kind, booking_id).await?;
        let updated = draft.into_booking(current.created_by.clone(), current.created_at)?;
        if current.financially_differs(&updated) {
            return Err(BookingServiceError::FinancialFieldsLocked(booking_id.clone()));
        }

        let mut patch = to_document(&updated)?;
        patch.insert("updatedAt".to_string(), json!(Utc::now()));
        patch.insert("updatedBy".to_string(), json!(principal.user_id));
        self.gateway
            .update(kind.collection(), &DocumentId::from(booking_id.clone()), patch)
            .await?;
        info!(kind = %kind, booking_id = %booking_id, user = %principal.user_id, "booking updated");
        Ok(())
    }

    /// Delete a booking and void its accounting documents.
    pub async fn delete_booking(
        &self,
        principal: &Principal,
        kind: BookingKind,
        booking_id: &BookingId,
    ) -> Result<DeleteBookingOutcome, BookingServiceError> {
        if !self.policy.has_permission(Some(principal), DELETE_PERMISSION) {
            debug!(user = %principal.user_id, booking_id = %booking_id, "booking delete denied");
            return Err(BookingServiceError::Denied(format!(
                "permission '{DELETE_PERMISSION}' required"
            )));
        }

        self.gateway
            .delete(kind.collection(), &DocumentId::from(booking_id.clone()))
            .await
            .map_err(|e| match e {
                GatewayError::NotFound { .. } => BookingServiceError::NotFound(booking_id.clone()),
                other => other.into(),
            })?;
        info!(kind = %kind, booking_id = %booking_id, user = %principal.user_id, "booking deleted");

        let voided = self.workflow.void_booking_accounting(booking_id).await;
        Ok(DeleteBookingOutcome {
            booking_id: booking_id.clone(),
            voided,
        })
    }

    /// Bookings of `kind` in this service's data mode, newest first.
    pub async fn list_bookings(
        &self,
        principal: &Principal,
        kind: BookingKind,
    ) -> Result<Vec<(BookingId, Booking)>, BookingServiceError> {
        if !self.policy.can_access_section(Some(principal), kind.section()) {
            return Err(BookingServiceError::Denied(format!("section '{}'", kind.section())));
        }
        let query = Query::scoped(self.mode).order_by("createdAt", Direction::Desc);
        self.gateway
            .query(kind.collection(), &query)
            .await?
            .into_iter()
            .map(|doc| -> Result<_, BookingServiceError> {
                Ok((BookingId::from(doc.id.clone()), doc.decode::<Booking>()?))
            })
            .collect()
    }

    async fn load(
        &self,
        kind: BookingKind,
        booking_id: &BookingId,
    ) -> Result<Booking, BookingServiceError> {
        let doc = self
            .gateway
            .get(kind.collection(), &DocumentId::from(booking_id.clone()))
            .await?
            .ok_or_else(|| BookingServiceError::NotFound(booking_id.clone()))?;
        Ok(doc.decode()?)
    }

    fn authorize_write(
        &self,
        principal: &Principal,
        kind: BookingKind,
    ) -> Result<(), BookingServiceError> {
        let decision = self.policy.decide_section(Some(principal), kind.section());
        if !decision.granted {
            debug!(
                user = %principal.user_id, section = kind.section(), rule = ?decision.rule,
                "booking write denied"
            );
            return Err(BookingServiceError::Denied(format!("section '{}'", kind.section())));
        }
        if !self.policy.has_permission(Some(principal), kind.write_permission()) {
            debug!(
                user = %principal.user_id, permission = kind.write_permission(),
                "booking write denied"
            );
            return Err(BookingServiceError::Denied(format!(
                "permission '{}' required",
                kind.write_permission()
            )));
        }
        Ok(())
    }
}
