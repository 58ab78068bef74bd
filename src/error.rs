use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the payment adapter.
///
/// Provider failures are passed through with Stripe's own code, message and
/// decline code intact; the adapter applies no retry or recovery policy.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Stripe API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        error_type: Option<String>,
        message: String,
        decline_code: Option<String>,
    },

    #[error("request to Stripe failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode Stripe response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Stripe is not configured for shop {0}")]
    NotConfigured(String),

    #[error("payment data carries neither a payment method nor a prior intent")]
    MissingPaymentMethod,

    #[error("amount {0} cannot be expressed in minor currency units")]
    InvalidAmount(Decimal),
}
