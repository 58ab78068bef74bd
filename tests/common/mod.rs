use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal_macros::dec;
use secrecy::Secret;
use serde_json::{json, Value};
use stripe_payments::config::StripeConfig;
use stripe_payments::error::PaymentError;
use stripe_payments::models::{
    Address, CardSummary, CreatePaymentInput, PaymentData, PaymentIntentRef, PaymentMethodRef,
};
use stripe_payments::services::stripe::StripeSettingsStore;
use wiremock::{MockServer, Request};

pub const TEST_SHOP_ID: &str = "test-shop";
pub const TEST_ACCOUNT_ID: &str = "test-account";
pub const TEST_PAYMENT_METHOD_ID: &str = "pm_card_visa";

/// Mock Stripe server plus a settings store pointing at it.
pub struct TestGateway {
    pub server: MockServer,
    pub settings: TestSettings,
}

/// In-memory per-shop Stripe settings.
pub struct TestSettings {
    configs: HashMap<String, StripeConfig>,
}

#[async_trait]
impl StripeSettingsStore for TestSettings {
    async fn stripe_config(&self, shop_id: &str) -> Result<Option<StripeConfig>, PaymentError> {
        Ok(self.configs.get(shop_id).cloned())
    }
}

impl TestGateway {
    pub async fn spawn() -> Self {
        let server = MockServer::start().await;

        let mut configs = HashMap::new();
        configs.insert(
            TEST_SHOP_ID.to_string(),
            StripeConfig {
                secret_key: Secret::new("sk_test_123".to_string()),
                api_base_url: format!("{}/v1", server.uri()),
            },
        );

        Self {
            server,
            settings: TestSettings { configs },
        }
    }

    /// A typical new-payment input: 19.99 USD on a visa card with shipping.
    pub fn payment_input(&self) -> CreatePaymentInput {
        CreatePaymentInput {
            account_id: Some(TEST_ACCOUNT_ID.to_string()),
            amount: dec!(19.99),
            billing_address: Some(test_address()),
            currency_code: "USD".to_string(),
            email: Some("jane@example.com".to_string()),
            shipping_address: Some(test_address()),
            shop_id: TEST_SHOP_ID.to_string(),
            payment_data: PaymentData {
                stripe_token_id: None,
                payment_method: Some(PaymentMethodRef {
                    id: TEST_PAYMENT_METHOD_ID.to_string(),
                    card: Some(CardSummary {
                        brand: Some("visa".to_string()),
                        last4: Some("4242".to_string()),
                    }),
                }),
                payment_intent: None,
            },
        }
    }

    /// An input confirming a prior intent instead of creating a new one.
    pub fn confirm_input(&self, intent_id: &str) -> CreatePaymentInput {
        let mut input = self.payment_input();
        input.payment_data.payment_method = None;
        input.payment_data.payment_intent = Some(PaymentIntentRef {
            id: intent_id.to_string(),
        });
        input
    }
}

pub fn test_address() -> Address {
    Address {
        city: Some("Portland".to_string()),
        country: Some("US".to_string()),
        address1: Some("2110 Main Street".to_string()),
        address2: Some("Suite 207".to_string()),
        postal: Some("97201".to_string()),
        region: Some("OR".to_string()),
        full_name: Some("Jane Doe".to_string()),
        phone: Some("+15035551234".to_string()),
    }
}

pub fn customer_json(id: &str) -> Value {
    json!({
        "id": id,
        "object": "customer",
        "email": "jane@example.com",
        "created": 1_718_000_000_i64
    })
}

/// A confirmed intent carrying a single charge.
pub fn intent_json(id: &str, customer: &str, amount: i64, risk_level: Option<&str>) -> Value {
    let mut outcome = json!({
        "network_status": "approved_by_network",
        "seller_message": "Payment complete.",
        "type": "authorized"
    });
    if let Some(level) = risk_level {
        outcome["risk_level"] = json!(level);
    }

    json!({
        "id": id,
        "object": "payment_intent",
        "amount": amount,
        "currency": "usd",
        "status": "requires_capture",
        "customer": customer,
        "payment_method": TEST_PAYMENT_METHOD_ID,
        "client_secret": format!("{id}_secret_abc"),
        "created": 1_718_000_000_i64,
        "charges": {
            "object": "list",
            "data": [{
                "id": format!("ch_{id}"),
                "object": "charge",
                "amount": amount,
                "created": 1_718_000_100_i64,
                "currency": "usd",
                "status": "succeeded",
                "payment_method": TEST_PAYMENT_METHOD_ID,
                "outcome": outcome
            }]
        }
    })
}

/// An intent that has not produced a charge yet.
pub fn intent_json_without_charge(id: &str, customer: &str, amount: i64) -> Value {
    json!({
        "id": id,
        "object": "payment_intent",
        "amount": amount,
        "currency": "usd",
        "status": "processing",
        "customer": customer,
        "created": 1_718_000_000_i64,
        "charges": { "object": "list", "data": [] }
    })
}

/// Decode a recorded form-encoded request body into its fields.
pub fn form_fields(request: &Request) -> HashMap<String, String> {
    serde_urlencoded::from_bytes(&request.body).expect("request body should be form-encoded")
}
