//! Stripe payment adapter for the commerce order pipeline.
//!
//! Exposes a single operation, [`create_authorized_payment`], which maps the
//! pipeline's normalized payment-creation request onto Stripe's customer and
//! payment-intent endpoints and reshapes the response into the payment record
//! the orders layer persists. Per-shop credentials are resolved through the
//! host-implemented [`StripeSettingsStore`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::StripeConfig;
pub use error::PaymentError;
pub use services::payments::create_authorized_payment;
pub use services::stripe::{StripeClient, StripeSettingsStore};
