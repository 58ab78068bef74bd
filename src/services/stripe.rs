//! Stripe API client.
//!
//! Implements the customer and payment-intent endpoints used for authorized
//! card payments. Stripe takes form-encoded request bodies with bracketed
//! keys for nested values; nested keys are expressed here as flat serde
//! renames so the whole request serializes through the urlencoded encoder.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::StripeConfig;
use crate::error::PaymentError;

/// Client for one shop's Stripe account.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

/// Resolves per-shop Stripe credentials.
///
/// Implemented by the host commerce system; each shop connects its own
/// Stripe account, so clients are built through [`StripeClient::for_shop`].
#[async_trait]
pub trait StripeSettingsStore: Send + Sync {
    async fn stripe_config(&self, shop_id: &str)
        -> Result<Option<StripeConfig>, PaymentError>;
}

/// Request to create a Stripe customer.
#[derive(Debug, Default, Serialize)]
pub struct CreateCustomerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Commerce account the customer belongs to.
    #[serde(rename = "metadata[accountId]", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Request to create a payment intent.
#[derive(Debug, Serialize)]
pub struct PaymentIntentRequest {
    /// Minor currency units (cents for two-decimal currencies).
    pub amount: i64,
    /// Lowercased ISO 4217 code.
    pub currency: String,
    pub customer: String,
    pub payment_method: String,
    pub confirmation_method: ConfirmationMethod,
    pub confirm: bool,
    #[serde(flatten)]
    pub shipping: ShippingDetails,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationMethod {
    #[default]
    Manual,
    Automatic,
}

/// Request to confirm an existing payment intent. Confirming with no
/// overrides reuses whatever the intent already carries.
#[derive(Debug, Default, Serialize)]
pub struct ConfirmPaymentIntentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Stripe `shipping` hash, flattened into form fields.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ShippingDetails {
    #[serde(rename = "shipping[address][city]", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "shipping[address][country]", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "shipping[address][line1]", skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(rename = "shipping[address][line2]", skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(rename = "shipping[address][postal_code]", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(rename = "shipping[address][state]", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "shipping[name]", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "shipping[phone]", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Stripe customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Creation timestamp, epoch seconds.
    pub created: i64,
}

/// Payment intent as returned by Stripe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Creation timestamp, epoch seconds.
    pub created: i64,
    #[serde(default)]
    pub charges: ChargeList,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    Succeeded,
    Processing,
    RequiresAction,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresCapture,
    Canceled,
}

/// Charge list nested inside an intent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeList {
    #[serde(default)]
    pub data: Vec<Charge>,
}

/// Stripe charge record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    /// Minor currency units.
    pub amount: i64,
    /// Creation timestamp, epoch seconds.
    pub created: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<ChargeStatus>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub outcome: Option<ChargeOutcome>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Succeeded,
    Pending,
    Failed,
}

/// Stripe's assessment of a charge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeOutcome {
    #[serde(default)]
    pub network_status: Option<String>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub seller_message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Stripe API error response.
#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub struct StripeErrorDetail {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub message: Option<String>,
    pub param: Option<String>,
    pub decline_code: Option<String>,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build a client for the shop's connected Stripe account.
    pub async fn for_shop<S>(store: &S, shop_id: &str) -> Result<Self, PaymentError>
    where
        S: StripeSettingsStore + ?Sized,
    {
        let config = store
            .stripe_config(shop_id)
            .await?
            .ok_or_else(|| PaymentError::NotConfigured(shop_id.to_string()))?;

        let client = Self::new(config);
        if !client.is_configured() {
            return Err(PaymentError::NotConfigured(shop_id.to_string()));
        }

        Ok(client)
    }

    /// Check if credentials are set.
    pub fn is_configured(&self) -> bool {
        !self.config.secret_key.expose_secret().is_empty()
    }

    /// Create a customer record, tagging it with the commerce account.
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let customer: Customer = self.post_form("customers", &request).await?;

        tracing::info!(customer_id = %customer.id, "Stripe customer created");

        Ok(customer)
    }

    /// Create a payment intent.
    pub async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let intent: PaymentIntent = self.post_form("payment_intents", &request).await?;

        tracing::info!(
            intent_id = %intent.id,
            amount = intent.amount,
            currency = %intent.currency,
            status = ?intent.status,
            "Stripe payment intent created"
        );

        Ok(intent)
    }

    /// Confirm a payment intent from an earlier authorization attempt.
    pub async fn confirm_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let path = format!("payment_intents/{intent_id}/confirm");
        let intent: PaymentIntent = self
            .post_form(&path, &ConfirmPaymentIntentRequest::default())
            .await?;

        tracing::info!(
            intent_id = %intent.id,
            status = ?intent.status,
            "Stripe payment intent confirmed"
        );

        Ok(intent)
    }

    async fn post_form<B, T>(&self, path: &str, form: &B) -> Result<T, PaymentError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.api_base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, body = %body, path, "Stripe response");

        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            let error: StripeErrorResponse =
                serde_json::from_str(&body).unwrap_or_else(|_| StripeErrorResponse {
                    error: StripeErrorDetail {
                        message: Some(body.clone()),
                        ..StripeErrorDetail::default()
                    },
                });
            let detail = error.error;

            tracing::error!(
                status = %status,
                code = ?detail.code,
                message = ?detail.message,
                path,
                "Stripe request failed"
            );

            Err(PaymentError::Api {
                status: status.as_u16(),
                code: detail.code,
                error_type: detail.error_type,
                message: detail
                    .message
                    .unwrap_or_else(|| "unknown Stripe error".to_string()),
                decline_code: detail.decline_code,
            })
        }
    }
}
