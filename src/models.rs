use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

// ============ Database Models ============

/// A registered user and their prepaid credit wallet.
///
/// The `credits` balance is the single source of truth for spend authority.
/// It is mutated only by the investigation debit and the payment-verification
/// credit; both paths use conditional atomic updates (see `wallet`).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,
    /// Email address, unique and matched case-insensitively.
    pub email: String,
    /// Whether the account may authenticate at all.
    pub is_active: bool,
    /// Current wallet balance in credits. Never negative.
    pub credits: i32,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
}

/// A payment intent registered with the Razorpay gateway.
///
/// Created in `pending` status once the gateway confirms the order exists;
/// transitions to `success` at most once, when a verified callback arrives.
/// There is no failure status: unverified or abandoned orders stay `pending`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentTransaction {
    /// Unique identifier for the transaction record.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Amount in whole currency units (rupees).
    pub amount: i64,
    /// Credits to grant on successful payment.
    pub credits: i32,
    /// Gateway order id, unique per transaction.
    pub razorpay_order_id: String,
    /// Gateway payment id, set when the payment is confirmed.
    pub razorpay_payment_id: Option<String>,
    /// Either "pending" or "success".
    pub status: String,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
}

/// Transaction status values persisted in `payment_transactions.status`.
pub mod transaction_status {
    pub const PENDING: &str = "pending";
    pub const SUCCESS: &str = "success";
}

// ============ Investigation Request/Response ============

fn default_credits() -> i32 {
    10
}

/// Body of `POST /api/v1/investigation`.
///
/// Each service category expects exactly one search field; the category
/// decides which one (see [`SearchField::for_service`]), so extraction does
/// not depend on key order in the submitted object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigationRequest {
    /// Human-readable service category label (e.g. "Vehicle Details").
    pub service_type: String,
    /// Credit cost of the lookup. Tied to the category, not to content.
    #[serde(default = "default_credits")]
    pub credits: i32,
    pub vehicle_number: Option<String>,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub pan_number: Option<String>,
    pub upi_id: Option<String>,
    /// Generic fallback for categories without a dedicated field.
    pub query: Option<String>,
}

/// The search field a given service category requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    VehicleNumber,
    MobileNumber,
    Email,
    Gstin,
    PanNumber,
    UpiId,
    Query,
}

impl SearchField {
    /// Maps a service category label to its required search field.
    pub fn for_service(service_type: &str) -> Self {
        if service_type.contains("Vehicle") {
            SearchField::VehicleNumber
        } else if service_type.contains("Mobile") || service_type.contains("Phone") {
            SearchField::MobileNumber
        } else if service_type.contains("Email") {
            SearchField::Email
        } else if service_type == "GST Details Advanced" {
            SearchField::Gstin
        } else if service_type.contains("PAN") || service_type.contains("GST") {
            SearchField::PanNumber
        } else if service_type.contains("UPI") {
            SearchField::UpiId
        } else {
            SearchField::Query
        }
    }

    /// Wire name of the field, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            SearchField::VehicleNumber => "vehicleNumber",
            SearchField::MobileNumber => "mobileNumber",
            SearchField::Email => "email",
            SearchField::Gstin => "gstin",
            SearchField::PanNumber => "panNumber",
            SearchField::UpiId => "upiId",
            SearchField::Query => "query",
        }
    }
}

impl InvestigationRequest {
    /// Extracts the single search key the service category requires.
    ///
    /// Returns `None` when the required field is absent or blank; the
    /// caller turns that into a bad-request fault.
    pub fn search_key(&self) -> Option<(SearchField, &str)> {
        let field = SearchField::for_service(&self.service_type);
        let value = match field {
            SearchField::VehicleNumber => self.vehicle_number.as_deref(),
            SearchField::MobileNumber => self.mobile_number.as_deref(),
            SearchField::Email => self.email.as_deref(),
            SearchField::Gstin => self.gstin.as_deref(),
            SearchField::PanNumber => self.pan_number.as_deref(),
            SearchField::UpiId => self.upi_id.as_deref(),
            SearchField::Query => self.query.as_deref(),
        };
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| (field, v))
    }
}

/// Successful body of `POST /api/v1/investigation`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigationResponse {
    pub success: bool,
    /// Raw (or allow-list narrowed) provider payload.
    pub data: Value,
    /// Wallet balance after the debit.
    pub credits_remaining: i32,
}

// ============ Payment Request/Response ============

/// Body of `POST /api/v1/payments/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in whole currency units (rupees). Must be positive.
    pub amount: i64,
    /// Credits to grant once the payment verifies. Must be positive.
    pub credits: i32,
}

/// Successful body of `POST /api/v1/payments/orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    /// Gateway order id the frontend hands to the checkout widget.
    pub order_id: String,
    /// Amount in the gateway's smallest unit (paise).
    pub amount: i64,
    pub currency: String,
    /// Public half of the gateway key pair.
    pub key_id: String,
}

/// Body of `POST /api/v1/payments/verify`, as delivered by the
/// Razorpay checkout callback.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Body of `POST /api/v1/payments/verify`.
///
/// `credited: false` with `success: true` means the callback was valid but
/// the order had already been credited (idempotent replay).
#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub credited: bool,
}
