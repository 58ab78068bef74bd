use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com/v1";

/// Credentials and endpoint for one shop's Stripe account.
#[derive(Deserialize, Clone, Debug)]
pub struct StripeConfig {
    /// Secret API key (`sk_live_...` or `sk_test_...`).
    pub secret_key: Secret<String>,
    pub api_base_url: String,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: Secret::new(secret_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let secret_key =
            env::var("STRIPE_SECRET_KEY").map_err(|_| anyhow!("STRIPE_SECRET_KEY must be set"))?;
        let api_base_url = env::var("STRIPE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            secret_key: Secret::new(secret_key),
            api_base_url,
        })
    }

    /// Point the client at a different endpoint, e.g. a mock server in tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
