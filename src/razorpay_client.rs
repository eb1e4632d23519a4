use crate::errors::AppError;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// An order as confirmed by the payment gateway.
#[derive(Debug, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in the gateway's smallest unit (paise).
    pub amount: i64,
    pub currency: String,
}

/// Client for the Razorpay payment gateway.
///
/// Covers the two interactions the service needs: registering an order
/// before checkout, and verifying the signature on the checkout callback.
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    /// Creates a new `RazorpayClient` with a bounded request timeout.
    pub fn new(base_url: String, key_id: String, key_secret: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create Razorpay client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            key_id,
            key_secret,
        })
    }

    /// Public half of the key pair, handed to the checkout widget.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Registers an order with the gateway.
    ///
    /// `amount_paise` is the amount in the gateway's smallest unit. Nothing
    /// is persisted locally here; the caller only writes its pending record
    /// once the gateway has confirmed the order exists.
    pub async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
        notes: Value,
    ) -> Result<GatewayOrder, AppError> {
        let url = format!("{}/v1/orders", self.base_url);
        tracing::info!("Creating Razorpay order: amount={} paise", amount_paise);

        let body = serde_json::json!({
            "amount": amount_paise,
            "currency": currency,
            "receipt": receipt,
            "notes": notes,
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(AppError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "Razorpay order creation failed {}: {}",
                status, error_text
            )));
        }

        let order: GatewayOrder = response.json().await.map_err(|e| {
            AppError::UpstreamError(format!("Failed to parse Razorpay order response: {}", e))
        })?;

        tracing::info!("Razorpay order created: {}", order.id);
        Ok(order)
    }

    /// Computes the expected callback signature for an order/payment pair:
    /// hex-encoded HMAC-SHA256 over `"{order_id}|{payment_id}"` keyed with
    /// the secret half of the key pair.
    pub fn compute_signature(&self, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a supplied callback signature against the expected one.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, supplied: &str) -> bool {
        let expected = self.compute_signature(order_id, payment_id);
        constant_time_compare(&expected, supplied)
    }
}

/// Constant-time string comparison (basic implementation)
/// For production, consider using a crypto library like `subtle`
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
