use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::stripe::{Charge, PaymentIntent};

/// Discriminator for the provider-specific payload attached to a payment,
/// used by consumers resolving the payment-data union.
pub const STRIPE_CARD_DATA_TYPE: &str = "stripe_card";

/// Commerce-side postal address. Every field is optional; the commerce
/// system's documents are camelCase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub city: Option<String>,
    pub country: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub postal: Option<String>,
    pub region: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// Input to [`crate::create_authorized_payment`], as assembled by the order
/// orchestration layer for a single fulfillment group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentInput {
    pub account_id: Option<String>,
    /// Major currency units.
    pub amount: Decimal,
    pub billing_address: Option<Address>,
    /// ISO 4217 code, e.g. "USD".
    pub currency_code: String,
    pub email: Option<String>,
    pub shipping_address: Option<Address>,
    pub shop_id: String,
    pub payment_data: PaymentData,
}

/// Provider references collected at checkout. Field casing follows what the
/// storefront submits: `payment_method` and `payment_intent` keep Stripe's
/// own naming.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentData {
    /// Legacy card-token flow; carried through unused.
    #[serde(default, rename = "stripeTokenId")]
    pub stripe_token_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethodRef>,
    #[serde(default)]
    pub payment_intent: Option<PaymentIntentRef>,
}

/// Reference to a Stripe payment method created on the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodRef {
    pub id: String,
    #[serde(default)]
    pub card: Option<CardSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardSummary {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
}

/// Reference to a payment intent from an earlier authorization attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentRef {
    pub id: String,
}

/// Fraud-risk classification, normalized from Stripe's `outcome.risk_level`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Normal,
    Elevated,
    High,
}

impl RiskLevel {
    /// Stripe risk levels mapped to the commerce system's levels. Anything
    /// unrecognized or absent reads as normal.
    pub fn from_provider(value: Option<&str>) -> Self {
        match value {
            Some("elevated") => Self::Elevated,
            Some("highest") => Self::High,
            _ => Self::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Authorize,
    Capture,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Provider payload stored alongside the payment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeCardPaymentData {
    pub intent: PaymentIntent,
    pub charge: Option<Charge>,
    pub charge_id: Option<String>,
    pub customer_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Normalized payment record in the schema the orders layer persists.
///
/// Constructed fresh per call; it has no identity until the caller stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub address: Option<Address>,
    /// Major currency units. Falls back to the requested amount when the
    /// intent carries no charge yet.
    pub amount: Decimal,
    pub card_brand: String,
    /// Taken from the charge's creation time; now, when no charge exists.
    pub created_at: DateTime<Utc>,
    pub data: StripeCardPaymentData,
    pub display_name: String,
    pub method: String,
    pub mode: PaymentMode,
    pub name: String,
    pub payment_plugin_name: String,
    pub processor: String,
    pub risk_level: RiskLevel,
    pub shop_id: String,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub transactions: Vec<Charge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_maps_known_provider_values() {
        assert_eq!(
            RiskLevel::from_provider(Some("elevated")),
            RiskLevel::Elevated
        );
        assert_eq!(RiskLevel::from_provider(Some("highest")), RiskLevel::High);
    }

    #[test]
    fn risk_level_defaults_to_normal() {
        assert_eq!(RiskLevel::from_provider(Some("normal")), RiskLevel::Normal);
        assert_eq!(
            RiskLevel::from_provider(Some("not_assessed")),
            RiskLevel::Normal
        );
        assert_eq!(RiskLevel::from_provider(None), RiskLevel::Normal);
    }

    #[test]
    fn payment_data_accepts_storefront_casing() {
        let data: PaymentData = serde_json::from_value(serde_json::json!({
            "stripeTokenId": "tok_123",
            "payment_method": {
                "id": "pm_123",
                "card": { "brand": "visa", "last4": "4242" }
            }
        }))
        .expect("payment data should deserialize");

        assert_eq!(data.stripe_token_id.as_deref(), Some("tok_123"));
        let method = data.payment_method.expect("payment method present");
        assert_eq!(method.id, "pm_123");
        assert_eq!(
            method.card.and_then(|c| c.brand).as_deref(),
            Some("visa")
        );
        assert!(data.payment_intent.is_none());
    }
}
