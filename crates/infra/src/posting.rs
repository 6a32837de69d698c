//! Booking → accounting fan-out.
//!
//! One saved booking produces a revenue entry, an invoice and a receipt.
//! The three writes are issued in that order and each is attempted exactly
//! once per call regardless of how the others went. There is no
//! cross-document transaction and no compensation: failures are reported
//! per artifact in a [`PostingResult`].

use serde_json::{Value as JsonValue, json};
use tracing::{info, warn};

use rihla_accounting::{
    AccountingDocument, Artifact, DocumentStatus, PaymentSummary, PostingOutcome, PostingResult,
    VoidOutcome, VoidResult,
};
use rihla_core::{BookingId, DataMode};

use crate::gateway::{Document, GatewayError, PersistenceGateway, Query, to_document};

pub struct RevenuePostingWorkflow<G> {
    gateway: G,
    mode: DataMode,
}

impl<G: PersistenceGateway> RevenuePostingWorkflow<G> {
    pub fn new(gateway: G, mode: DataMode) -> Self {
        Self { gateway, mode }
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    /// Post revenue, invoice and receipt for a persisted booking.
    pub async fn post_booking_accounting(
        &self,
        booking_id: &BookingId,
        summary: &PaymentSummary,
    ) -> PostingResult {
        let document = AccountingDocument::for_booking(booking_id, summary, self.mode);
        let body = to_document(&document);

        let revenue = self.post(Artifact::Revenue, booking_id, &body).await;
        let invoice = self.post(Artifact::Invoice, booking_id, &body).await;
        let receipt = self.post(Artifact::Receipt, booking_id, &body).await;

        let result = PostingResult {
            revenue,
            invoice,
            receipt,
        };
        if !result.all_created() {
            warn!(
                booking_id = %booking_id,
                failed = ?result.failed_artifacts(),
                "booking accounting partially posted"
            );
        }
        result
    }

    /// Re-attempt only the artifacts that failed last time, in posting order.
    /// Artifacts already created are left untouched.
    pub async fn retry_failed(
        &self,
        booking_id: &BookingId,
        summary: &PaymentSummary,
        previous: PostingResult,
    ) -> PostingResult {
        let document = AccountingDocument::for_booking(booking_id, summary, self.mode);
        let body = to_document(&document);

        let mut result = previous;
        for artifact in result.failed_artifacts() {
            let outcome = self.post(artifact, booking_id, &body).await;
            result.set(artifact, outcome);
        }
        result
    }

    /// Mark every accounting document linked to `booking_id` as void.
    ///
    /// Best-effort like posting: each artifact collection is handled
    /// independently.
    pub async fn void_booking_accounting(&self, booking_id: &BookingId) -> VoidResult {
        VoidResult {
            revenue: self.void(Artifact::Revenue, booking_id).await,
            invoice: self.void(Artifact::Invoice, booking_id).await,
            receipt: self.void(Artifact::Receipt, booking_id).await,
        }
    }

    async fn post(
        &self,
        artifact: Artifact,
        booking_id: &BookingId,
        body: &Result<Document, GatewayError>,
    ) -> PostingOutcome {
        let body = match body {
            Ok(body) => body.clone(),
            Err(e) => return PostingOutcome::failed(e.to_string()),
        };
        match self.gateway.create(artifact.collection(), body).await {
            Ok(id) => {
                info!(
                    booking_id = %booking_id, artifact = %artifact, document_id = %id,
                    "accounting document posted"
                );
                PostingOutcome::created(id)
            }
            Err(e) => {
                warn!(
                    booking_id = %booking_id, artifact = %artifact, error = %e,
                    "accounting document failed"
                );
                PostingOutcome::failed(e.to_string())
            }
        }
    }

    /// Marks every linked document void. A failed update does not stop the
    /// rest; the outcome reports the first error and the ids that did flip.
    async fn void(&self, artifact: Artifact, booking_id: &BookingId) -> VoidOutcome {
        let query = Query::scoped(self.mode).where_eq("bookingId", booking_id.as_str());
        let linked = match self.gateway.query(artifact.collection(), &query).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!(
                    booking_id = %booking_id, artifact = %artifact, error = %e,
                    "could not look up accounting documents"
                );
                return VoidOutcome::failed(e.to_string(), Vec::new());
            }
        };
        if linked.is_empty() {
            return VoidOutcome::NothingPosted;
        }

        let mut ids = Vec::with_capacity(linked.len());
        let mut first_error = None;
        for doc in linked {
            let mut patch = Document::new();
            patch.insert("status".to_string(), json!(DocumentStatus::Void));
            patch.insert(
                "voidedAt".to_string(),
                JsonValue::String(chrono::Utc::now().to_rfc3339()),
            );
            match self.gateway.update(artifact.collection(), &doc.id, patch).await {
                Ok(()) => ids.push(doc.id),
                Err(e) => {
                    warn!(
                        booking_id = %booking_id, artifact = %artifact,
                        document_id = %doc.id, error = %e, "void failed"
                    );
                    first_error.get_or_insert_with(|| e.to_string());
                }
            }
        }

        match first_error {
            Some(reason) => VoidOutcome::failed(reason, ids),
            None => {
                info!(
                    booking_id = %booking_id, artifact = %artifact, count = ids.len(),
                    "accounting documents voided"
                );
                VoidOutcome::Voided { ids }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rihla_bookings::{BookingKind, PaymentMethod};
    use rihla_core::{Amount, CustomerId, UserId};

    use super::*;
    use crate::gateway::InMemoryGateway;

    fn summary(method: PaymentMethod, price: f64) -> PaymentSummary {
        PaymentSummary {
            amount: Amount::new(price).unwrap(),
            booking_type: BookingKind::Flight,
            customer_id: CustomerId::parse("cust-1").unwrap(),
            customer_name: "Noura".to_string(),
            payment_method: method,
            receipt_number: "R-1".to_string(),
            created_by: UserId::parse("agent-1").unwrap(),
            created_by_name: "Agent".to_string(),
            created_at: Utc::now(),
        }
    }

    fn workflow() -> (Arc<InMemoryGateway>, RevenuePostingWorkflow<Arc<InMemoryGateway>>) {
        let gw = Arc::new(InMemoryGateway::new());
        (gw.clone(), RevenuePostingWorkflow::new(gw, DataMode::Production))
    }

    #[tokio::test]
    async fn posts_all_three_artifacts() {
        let (gw, wf) = workflow();
        let booking_id = BookingId::parse("b-1").unwrap();
        let result = wf
            .post_booking_accounting(&booking_id, &summary(PaymentMethod::Knet, 150.0))
            .await;

        assert!(result.all_created());
        for artifact in Artifact::ALL {
            let docs = gw.documents(artifact.collection());
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].data["bookingId"], "b-1");
            assert_eq!(docs[0].data["amount"], 150.0);
            assert_eq!(docs[0].data["dataMode"], "production");
        }
    }

    #[tokio::test]
    async fn revenue_failure_does_not_block_invoice_or_receipt() {
        let (gw, wf) = workflow();
        gw.fail_writes("revenues");

        let booking_id = BookingId::parse("b-2").unwrap();
        let result = wf
            .post_booking_accounting(&booking_id, &summary(PaymentMethod::Cash, 80.0))
            .await;

        assert!(result.revenue.is_failed());
        assert!(result.invoice.is_created());
        assert!(result.receipt.is_created());
        for artifact in Artifact::ALL {
            assert_eq!(gw.write_attempts(artifact.collection()), 1);
        }
    }

    #[tokio::test]
    async fn every_artifact_attempted_when_all_fail() {
        let (gw, wf) = workflow();
        for artifact in Artifact::ALL {
            gw.fail_writes(artifact.collection());
        }

        let booking_id = BookingId::parse("b-3").unwrap();
        let result = wf
            .post_booking_accounting(&booking_id, &summary(PaymentMethod::Visa, 10.0))
            .await;

        assert_eq!(result.failed_artifacts(), Artifact::ALL.to_vec());
        for artifact in Artifact::ALL {
            assert_eq!(gw.write_attempts(artifact.collection()), 1);
        }
    }

    #[tokio::test]
    async fn retry_only_touches_failed_artifacts() {
        let (gw, wf) = workflow();
        let booking_id = BookingId::parse("b-4").unwrap();
        let s = summary(PaymentMethod::Tabby, 42.0);
        gw.fail_next_writes("invoices", 1);

        let first = wf.post_booking_accounting(&booking_id, &s).await;
        assert_eq!(first.failed_artifacts(), vec![Artifact::Invoice]);
        let revenue_before = first.revenue.clone();

        let second = wf.retry_failed(&booking_id, &s, first).await;
        assert!(second.all_created());
        assert_eq!(second.revenue, revenue_before);
        assert_eq!(gw.len("revenues"), 1);
        assert_eq!(gw.len("invoices"), 1);
        assert_eq!(gw.write_attempts("invoices"), 2);
    }

    #[tokio::test]
    async fn void_marks_linked_documents() {
        let (gw, wf) = workflow();
        let booking_id = BookingId::parse("b-5").unwrap();
        gw.fail_writes("receipts");
        wf.post_booking_accounting(&booking_id, &summary(PaymentMethod::Cash, 5.0)).await;
        gw.restore("receipts");

        let voided = wf.void_booking_accounting(&booking_id).await;
        assert!(matches!(voided.revenue, VoidOutcome::Voided { ref ids } if ids.len() == 1));
        assert!(matches!(voided.receipt, VoidOutcome::NothingPosted));
        assert_eq!(gw.documents("invoices")[0].data["status"], "void");
    }

    #[tokio::test]
    async fn void_attempts_every_linked_document_after_a_failure() {
        let (gw, wf) = workflow();
        let booking_id = BookingId::parse("b-6").unwrap();
        let s = summary(PaymentMethod::Knet, 20.0);
        wf.post_booking_accounting(&booking_id, &s).await;
        wf.post_booking_accounting(&booking_id, &s).await;
        assert_eq!(gw.len("revenues"), 2);

        gw.fail_writes_after("revenues", 1);
        let voided = wf.void_booking_accounting(&booking_id).await;

        assert!(voided.any_failed());
        assert!(voided.revenue.is_failed());
        assert_eq!(voided.revenue.voided_ids().len(), 1);
        assert_eq!(gw.write_attempts("revenues"), 4);
        let statuses: Vec<_> = gw
            .documents("revenues")
            .iter()
            .map(|d| d.data.get("status").cloned())
            .collect();
        assert_eq!(statuses.iter().filter(|s| s.as_ref() == Some(&json!("void"))).count(), 1);
        assert!(matches!(voided.invoice, VoidOutcome::Voided { ref ids } if ids.len() == 2));
    }
}
