//! Infrastructure layer: persistence gateway, services, configuration.

pub mod accounting_service;
pub mod backoffice;
pub mod booking_service;
pub mod config;
pub mod gateway;
pub mod posting;
pub mod session;

mod integration_tests;

pub use accounting_service::{AccountingService, AccountingServiceError};
pub use backoffice::{Backoffice, bootstrap_from_env};
pub use booking_service::{
    BookingService, BookingServiceError, DeleteBookingOutcome, SaveBookingOutcome, SubmissionGuard,
};
pub use config::{AppConfig, ConfigError};
pub use gateway::{GatewayError, InMemoryGateway, PersistenceGateway, Query, StoredDocument};
pub use posting::RevenuePostingWorkflow;
pub use session::SessionResolver;
