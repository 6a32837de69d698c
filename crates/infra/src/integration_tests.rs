//! End-to-end tests: session → access decision → booking save → accounting
//! fan-out, over the in-memory gateway.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use rihla_accounting::{Artifact, VoidOutcome};
    use rihla_auth::{
        DefaultPolicy, Permission, PermissionCatalog, Principal, UserRecord, UserStatus,
    };
    use rihla_bookings::{
        BookingDraft, BookingKind, BookingValidationError, CustomerRef, LineItem, PaymentBlock,
        PaymentMethod, PaymentValidationError,
    };
    use rihla_core::{Amount, CustomerId, DataMode, UserId};

    use crate::backoffice::Backoffice;
    use crate::booking_service::BookingServiceError;
    use crate::config::AppConfig;
    use crate::gateway::{InMemoryGateway, PersistenceGateway, Query, to_document};
    use crate::session::USERS;

    type Office = Backoffice<Arc<InMemoryGateway>>;

    fn amt(v: f64) -> Amount {
        Amount::new(v).unwrap()
    }

    fn office_with(gw: Arc<InMemoryGateway>, mode: DataMode) -> Office {
        let config = AppConfig {
            data_mode: mode,
            ..AppConfig::default()
        };
        Backoffice::from_config(config, gw).unwrap()
    }

    fn office() -> (Arc<InMemoryGateway>, Office) {
        let gw = Arc::new(InMemoryGateway::new());
        (gw.clone(), office_with(gw, DataMode::Production))
    }

    fn agent(permissions: &[&str]) -> Principal {
        let id = UserId::parse("agent-1").unwrap();
        let mut record = UserRecord::new(id, "agent@rihla.example", "Agent");
        record.status = UserStatus::Active;
        record.permissions = permissions.iter().map(|p| Permission::new(p.to_string())).collect();
        Principal::resolve(&record, &PermissionCatalog::standard())
    }

    fn customer() -> CustomerRef {
        CustomerRef {
            id: CustomerId::parse("cust-1").unwrap(),
            name: "Mariam".to_string(),
            phone: "+965 9999 0000".to_string(),
        }
    }

    fn flight(method: PaymentMethod, cost: f64, price: f64) -> BookingDraft {
        BookingDraft {
            kind: BookingKind::Flight,
            customer: Some(customer()),
            items: vec![
                LineItem::new("KWI → DXB", amt(cost), amt(price)).with_detail("airline", "KU"),
            ],
            payment: PaymentBlock::new(method, amt(cost), amt(price)),
            notes: None,
        }
    }

    #[tokio::test]
    async fn knet_flight_booking_posts_all_three_documents() {
        let (gw, office) = office();
        let principal = agent(&["manage_flights"]);

        let outcome = office
            .bookings
            .save_booking(&principal, flight(PaymentMethod::Knet, 120.0, 150.0))
            .await
            .unwrap();

        assert!(outcome.posting.revenue.is_created());
        assert!(outcome.posting.invoice.is_created());
        assert!(outcome.posting.receipt.is_created());
        assert_eq!(gw.len("flightBookings"), 1);
        for artifact in Artifact::ALL {
            let docs = gw.documents(artifact.collection());
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].data["bookingId"], outcome.booking_id.as_str());
            assert_eq!(docs[0].data["amount"], 150.0);
            assert_eq!(docs[0].data["bookingType"], "flight");
            assert_eq!(docs[0].data["customerName"], "Mariam");
            assert_eq!(docs[0].data["createdBy"], "agent-1");
        }
    }

    #[tokio::test]
    async fn revenue_failure_still_posts_invoice_and_receipt() {
        let (gw, office) = office();
        gw.fail_writes("revenues");

        let outcome = office
            .bookings
            .save_booking(&agent(&["manage_flights"]), flight(PaymentMethod::Cash, 50.0, 60.0))
            .await
            .unwrap();

        assert!(outcome.posting.revenue.is_failed());
        assert!(outcome.posting.invoice.is_created());
        assert!(outcome.posting.receipt.is_created());
        assert!(outcome.posting.is_partial());
    }

    #[tokio::test]
    async fn booking_survives_when_every_fan_out_write_fails() {
        let (gw, office) = office();
        for artifact in Artifact::ALL {
            gw.fail_writes(artifact.collection());
        }

        let outcome = office
            .bookings
            .save_booking(&agent(&["manage_flights"]), flight(PaymentMethod::Visa, 10.0, 12.0))
            .await
            .unwrap();

        assert_eq!(outcome.posting.failed_artifacts(), Artifact::ALL.to_vec());
        let stored = gw
            .get("flightBookings", &outcome.booking_id.clone().into())
            .await
            .unwrap();
        assert!(stored.is_some());
        assert_eq!(gw.write_attempts("flightBookings"), 1);
    }

    #[tokio::test]
    async fn failed_booking_write_skips_fan_out() {
        let (gw, office) = office();
        gw.fail_writes("flightBookings");

        let err = office
            .bookings
            .save_booking(&agent(&["manage_flights"]), flight(PaymentMethod::Knet, 10.0, 12.0))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingServiceError::Persistence(_)));
        for artifact in Artifact::ALL {
            assert_eq!(gw.write_attempts(artifact.collection()), 0);
        }
    }

    #[tokio::test]
    async fn validation_failure_writes_nothing() {
        let (gw, office) = office();
        let mut draft = flight(PaymentMethod::Installments, 200.0, 300.0);
        draft.payment.installments = vec![Some(amt(100.0)), Some(amt(100.0)), Some(amt(99.5))];

        let err = office
            .bookings
            .save_booking(&agent(&["manage_flights"]), draft)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BookingServiceError::Validation(BookingValidationError::Payment(
                PaymentValidationError::InstallmentMismatch { .. }
            ))
        ));
        assert_eq!(gw.write_attempts("flightBookings"), 0);
        assert_eq!(gw.write_attempts("revenues"), 0);
    }

    #[tokio::test]
    async fn installment_booking_posts_total_sale_price() {
        let (gw, office) = office();
        let mut draft = flight(PaymentMethod::Installments, 200.0, 300.0);
        draft.payment.installments = vec![Some(amt(100.0)), Some(amt(100.0)), Some(amt(100.0))];

        let outcome = office
            .bookings
            .save_booking(&agent(&["manage_flights"]), draft)
            .await
            .unwrap();

        assert!(outcome.posting.all_created());
        assert_eq!(gw.documents("revenues")[0].data["amount"], 300.0);
    }

    #[tokio::test]
    async fn view_only_user_cannot_save() {
        let (gw, office) = office();
        let err = office
            .bookings
            .save_booking(&agent(&["view_bookings"]), flight(PaymentMethod::Cash, 1.0, 2.0))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingServiceError::Denied(_)));
        assert!(gw.is_empty("flightBookings"));
    }

    #[tokio::test]
    async fn inactive_admin_is_denied() {
        let (_gw, office) = office();
        let id = UserId::parse("root").unwrap();
        let mut record = UserRecord::new(id, "root@rihla.example", "Root");
        record.is_admin = true;
        record.status = UserStatus::Inactive;
        let principal = Principal::resolve(&record, &office.catalog);

        let err = office
            .bookings
            .save_booking(&principal, flight(PaymentMethod::Cash, 1.0, 2.0))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingServiceError::Denied(_)));
    }

    #[tokio::test]
    async fn concurrent_double_submit_creates_one_booking() {
        let gw = Arc::new(InMemoryGateway::new().with_write_latency(Duration::from_millis(20)));
        let office = office_with(gw.clone(), DataMode::Production);
        let principal = agent(&["manage_flights"]);

        let (first, second) = tokio::join!(
            office.bookings.save_booking(&principal, flight(PaymentMethod::Knet, 1.0, 2.0)),
            office.bookings.save_booking(&principal, flight(PaymentMethod::Knet, 1.0, 2.0)),
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(BookingServiceError::SubmissionInFlight(_))));
        assert_eq!(gw.len("flightBookings"), 1);

        // The guard is released once the save finishes.
        assert!(
            office
                .bookings
                .save_booking(&principal, flight(PaymentMethod::Knet, 1.0, 2.0))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn edits_cannot_change_money_fields() {
        let (gw, office) = office();
        let principal = agent(&["manage_flights"]);
        let saved = office
            .bookings
            .save_booking(&principal, flight(PaymentMethod::Knet, 100.0, 130.0))
            .await
            .unwrap();

        let repriced = flight(PaymentMethod::Knet, 100.0, 140.0);
        let err = office
            .bookings
            .update_booking(&principal, &saved.booking_id, repriced)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingServiceError::FinancialFieldsLocked(_)));

        let mut annotated = flight(PaymentMethod::Knet, 100.0, 130.0);
        annotated.notes = Some("aisle seat".to_string());
        office
            .bookings
            .update_booking(&principal, &saved.booking_id, annotated)
            .await
            .unwrap();

        let stored = gw
            .get("flightBookings", &saved.booking_id.clone().into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data["notes"], "aisle seat");
        assert_eq!(stored.data["createdBy"]["id"], "agent-1");
    }

    #[tokio::test]
    async fn delete_requires_permission_and_voids_documents() {
        let (gw, office) = office();
        let saved = office
            .bookings
            .save_booking(&agent(&["manage_flights"]), flight(PaymentMethod::Cash, 5.0, 8.0))
            .await
            .unwrap();

        let err = office
            .bookings
            .delete_booking(&agent(&["manage_flights"]), BookingKind::Flight, &saved.booking_id)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingServiceError::Denied(_)));

        let deleted = office
            .bookings
            .delete_booking(&agent(&["delete_bookings"]), BookingKind::Flight, &saved.booking_id)
            .await
            .unwrap();

        assert!(gw.is_empty("flightBookings"));
        assert!(!deleted.voided.any_failed());
        for (_, outcome) in deleted.voided.iter() {
            assert!(matches!(outcome, VoidOutcome::Voided { ids } if ids.len() == 1));
        }
        for artifact in Artifact::ALL {
            assert_eq!(gw.documents(artifact.collection())[0].data["status"], "void");
        }

        let summary = office
            .accounting
            .summary(&agent(&["view_accounting"]), DataMode::Production)
            .await
            .unwrap();
        assert!(summary.total_revenue.is_zero());
        assert_eq!(summary.voided_count, 1);
    }

    #[tokio::test]
    async fn test_mode_bookings_are_invisible_to_production() {
        let gw = Arc::new(InMemoryGateway::new());
        let production = office_with(gw.clone(), DataMode::Production);
        let sandbox = office_with(gw.clone(), DataMode::Test);
        let principal = agent(&["manage_flights", "view_accounting"]);

        production
            .bookings
            .save_booking(&principal, flight(PaymentMethod::Cash, 10.0, 15.0))
            .await
            .unwrap();
        sandbox
            .bookings
            .save_booking(&principal, flight(PaymentMethod::Cash, 1.0, 3.0))
            .await
            .unwrap();

        let listed = production
            .bookings
            .list_bookings(&principal, BookingKind::Flight)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        let test_docs = gw
            .query("revenues", &Query::scoped(DataMode::Test))
            .await
            .unwrap();
        assert_eq!(test_docs.len(), 1);
        assert_eq!(test_docs[0].data["amount"], 3.0);

        let summary = production
            .accounting
            .summary(&principal, DataMode::Production)
            .await
            .unwrap();
        assert_eq!(summary.total_revenue, amt(15.0));
        assert_eq!(summary.revenue_by_kind.get(&BookingKind::Flight), Some(&amt(15.0)));
    }

    #[tokio::test]
    async fn legacy_job_title_user_signs_in_and_books() {
        let (gw, office) = office();
        gw.create(
            USERS,
            to_document(&json!({
                "email": "clerk@rihla.example",
                "name": "Clerk",
                "jobTitle": "موظف حجوزات",
                "status": "active"
            }))
            .unwrap(),
        )
        .await
        .unwrap();

        let principal = office.sessions.resolve("clerk@rihla.example").await.unwrap().unwrap();
        assert!(office.policy.can_access_section(Some(&principal), "flights"));
        assert!(!office.policy.can_access_section(Some(&principal), "accounting"));

        let outcome = office
            .bookings
            .save_booking(&principal, flight(PaymentMethod::Tabby, 40.0, 55.0))
            .await
            .unwrap();
        assert!(outcome.posting.all_created());
    }

    #[test]
    fn allow_by_default_only_affects_unmapped_sections() {
        let gw = Arc::new(InMemoryGateway::new());
        let config = AppConfig {
            default_policy: DefaultPolicy::AllowByDefault,
            ..AppConfig::default()
        };
        let office = Backoffice::from_config(config, gw).unwrap();
        let principal = agent(&["view_customers"]);

        assert!(office.policy.can_access_section(Some(&principal), "beta-lab"));
        assert!(!office.policy.can_access_section(Some(&principal), "accounting"));
        assert!(!office.policy.can_access_section(None, "beta-lab"));
    }
}
