//! Authorized payment creation.
//!
//! Maps the commerce system's "create authorized payment" request onto
//! Stripe's customer / payment-intent endpoints and reshapes the result into
//! the normalized payment record the order pipeline stores.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::PaymentError;
use crate::models::{
    Address, CreatePaymentInput, Payment, PaymentMode, PaymentStatus, RiskLevel,
    StripeCardPaymentData, STRIPE_CARD_DATA_TYPE,
};
use crate::services::stripe::{
    ConfirmationMethod, CreateCustomerRequest, PaymentIntentRequest, ShippingDetails,
    StripeClient, StripeSettingsStore,
};

const METHOD: &str = "credit";
const PAYMENT_METHOD_NAME: &str = "stripe_card";

// The processor value is lowercased and prefixed to provider operation names
// elsewhere in the pipeline, e.g. the refund listing is "stripe/refund/list".
const PROCESSOR: &str = "Stripe";
const PAYMENT_PLUGIN_NAME: &str = "stripe-payments";

const DEFAULT_CARD_BRAND: &str = "no brand";
const DEFAULT_CARD_LAST4: &str = "0000";

/// Translate a commerce shipping address into Stripe's `shipping` fields.
/// Returns `None` when no address was supplied; missing fields pass through
/// as absent.
pub fn stripe_shipping_details(address: Option<&Address>) -> Option<ShippingDetails> {
    let address = address?;

    Some(ShippingDetails {
        city: address.city.clone(),
        country: address.country.clone(),
        line1: address.address1.clone(),
        line2: address.address2.clone(),
        postal_code: address.postal.clone(),
        state: address.region.clone(),
        name: address.full_name.clone(),
        phone: address.phone.clone(),
    })
}

/// Convert a major-unit amount into Stripe's minor units, rounded to the
/// nearest cent. Exact for two-decimal currencies.
fn minor_units(amount: Decimal) -> Result<i64, PaymentError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.round().to_i64())
        .ok_or(PaymentError::InvalidAmount(amount))
}

/// Convert Stripe's minor units back into major currency units.
fn major_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

/// Create an authorized (manual-capture) Stripe payment for a single
/// fulfillment group.
///
/// Without a prior intent reference this creates a Stripe customer tagged
/// with the commerce account and a confirmed payment intent against it; with
/// one, the existing intent is confirmed instead and the customer is taken
/// from the confirmed intent. The two calls of the first branch are strictly
/// sequential. Provider failures propagate to the caller unmodified.
pub async fn create_authorized_payment<S>(
    context: &S,
    input: CreatePaymentInput,
) -> Result<Payment, PaymentError>
where
    S: StripeSettingsStore + ?Sized,
{
    tracing::info!(
        shop_id = %input.shop_id,
        amount = %input.amount,
        currency = %input.currency_code,
        "Creating authorized Stripe payment"
    );

    let stripe = StripeClient::for_shop(context, &input.shop_id).await?;

    let payment_method = input.payment_data.payment_method.as_ref();

    let (intent, customer_id) = match &input.payment_data.payment_intent {
        None => {
            let method = payment_method.ok_or(PaymentError::MissingPaymentMethod)?;

            let customer = stripe
                .create_customer(CreateCustomerRequest {
                    email: input.email.clone(),
                    account_id: input.account_id.clone(),
                    payment_method: Some(method.id.clone()),
                })
                .await?;

            let intent = stripe
                .create_payment_intent(PaymentIntentRequest {
                    amount: minor_units(input.amount)?,
                    currency: input.currency_code.to_lowercase(),
                    customer: customer.id.clone(),
                    payment_method: method.id.clone(),
                    confirmation_method: ConfirmationMethod::Manual,
                    confirm: true,
                    shipping: stripe_shipping_details(input.shipping_address.as_ref())
                        .unwrap_or_default(),
                })
                .await?;

            (intent, Some(customer.id))
        }
        Some(reference) => {
            let intent = stripe.confirm_payment_intent(&reference.id).await?;
            let customer_id = intent.customer.clone();
            (intent, customer_id)
        }
    };

    let charge = intent.charges.data.first().cloned();

    let card = payment_method.and_then(|method| method.card.as_ref());
    let brand = card
        .and_then(|card| card.brand.clone())
        .unwrap_or_else(|| DEFAULT_CARD_BRAND.to_string());
    let last4 = card
        .and_then(|card| card.last4.clone())
        .unwrap_or_else(|| DEFAULT_CARD_LAST4.to_string());

    let amount = charge
        .as_ref()
        .map(|charge| major_units(charge.amount))
        .unwrap_or(input.amount);
    let created_at = charge
        .as_ref()
        .and_then(|charge| DateTime::from_timestamp(charge.created, 0))
        .unwrap_or_else(Utc::now);
    let risk_level = RiskLevel::from_provider(
        charge
            .as_ref()
            .and_then(|charge| charge.outcome.as_ref())
            .and_then(|outcome| outcome.risk_level.as_deref()),
    );
    let transaction_id = charge.as_ref().map(|charge| charge.id.clone());

    tracing::info!(
        intent_id = %intent.id,
        charge_id = ?transaction_id,
        risk_level = ?risk_level,
        "Stripe payment authorized"
    );

    Ok(Payment {
        id: Uuid::new_v4(),
        address: input.billing_address,
        amount,
        card_brand: brand.clone(),
        created_at,
        data: StripeCardPaymentData {
            charge: charge.clone(),
            charge_id: transaction_id.clone(),
            customer_id,
            intent,
            kind: STRIPE_CARD_DATA_TYPE.to_string(),
        },
        display_name: format!("{brand} {last4}"),
        method: METHOD.to_string(),
        mode: PaymentMode::Authorize,
        name: PAYMENT_METHOD_NAME.to_string(),
        payment_plugin_name: PAYMENT_PLUGIN_NAME.to_string(),
        processor: PROCESSOR.to_string(),
        risk_level,
        shop_id: input.shop_id,
        status: PaymentStatus::Created,
        transaction_id,
        transactions: charge.into_iter().collect(),
    })
}
