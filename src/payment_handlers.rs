use crate::auth::require_session;
use crate::errors::AppError;
use crate::handlers::{require_razorpay, AppState};
use crate::models::{
    transaction_status, CreateOrderRequest, CreateOrderResponse, PaymentTransaction,
    VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::wallet;
use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// POST /api/v1/payments/orders
///
/// Registers an order with the payment gateway and persists the matching
/// `pending` transaction record. The local row is only written after the
/// gateway has confirmed the order exists, so there are never pending rows
/// without a real order behind them. The converse (order exists, local
/// write fails) is an accepted narrow race surfaced as a persistence fault.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let user = require_session(&state.db, &headers).await?;

    if req.amount <= 0 || req.credits <= 0 {
        return Err(AppError::BadRequest("Invalid request".to_string()));
    }

    let razorpay = require_razorpay(&state)?;

    let amount_paise = req
        .amount
        .checked_mul(100)
        .ok_or_else(|| AppError::BadRequest("Amount too large".to_string()))?;

    let receipt = format!("receipt_{}", Utc::now().timestamp_millis());
    let notes = json!({
        "userId": user.id,
        "credits": req.credits,
    });

    let order = razorpay
        .create_order(amount_paise, "INR", &receipt, notes)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO payment_transactions (id, user_id, amount, credits, razorpay_order_id, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(req.amount)
    .bind(req.credits)
    .bind(&order.id)
    .bind(transaction_status::PENDING)
    .execute(&state.db)
    .await
    .map_err(|e| {
        AppError::PersistenceError(format!(
            "Gateway order {} exists but pending record write failed: {}",
            order.id, e
        ))
    })?;

    tracing::info!(
        "Payment order created: user={}, order={}, amount={}, credits={}",
        user.email,
        order.id,
        req.amount,
        req.credits
    );

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: razorpay.key_id().to_string(),
    }))
}

/// POST /api/v1/payments/verify
///
/// Verifies a checkout callback and credits the wallet exactly once per
/// order. The status transition (`pending` -> `success`) and the balance
/// increment run in one database transaction: if the increment cannot be
/// performed, the transition rolls back with it. A replayed callback finds
/// the order already successful and returns `credited: false` without error.
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let user = require_session(&state.db, &headers).await?;
    let razorpay = require_razorpay(&state)?;

    if !razorpay.verify_signature(
        &req.razorpay_order_id,
        &req.razorpay_payment_id,
        &req.razorpay_signature,
    ) {
        return Err(AppError::InvalidSignature);
    }

    let transaction = sqlx::query_as::<_, PaymentTransaction>(
        "SELECT * FROM payment_transactions WHERE razorpay_order_id = $1",
    )
    .bind(&req.razorpay_order_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    // Don't leak other users' order ids; a foreign order behaves like a
    // missing one.
    if transaction.user_id != user.id {
        tracing::warn!(
            "User {} attempted to verify order {} owned by another user",
            user.email,
            req.razorpay_order_id
        );
        return Err(AppError::NotFound("Transaction not found".to_string()));
    }

    if transaction.status == transaction_status::SUCCESS {
        tracing::info!(
            "Replayed payment callback for order {}; no credit applied",
            req.razorpay_order_id
        );
        return Ok(Json(VerifyPaymentResponse {
            success: true,
            credited: false,
        }));
    }

    let mut tx = state.db.begin().await?;

    let transitioned = sqlx::query(
        r#"
        UPDATE payment_transactions
        SET status = $3, razorpay_payment_id = $2
        WHERE razorpay_order_id = $1 AND status = $4
        "#,
    )
    .bind(&req.razorpay_order_id)
    .bind(&req.razorpay_payment_id)
    .bind(transaction_status::SUCCESS)
    .bind(transaction_status::PENDING)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if transitioned == 0 {
        // A concurrent delivery of the same callback won the conditional
        // transition; this one must not credit again.
        tx.rollback().await?;
        return Ok(Json(VerifyPaymentResponse {
            success: true,
            credited: false,
        }));
    }

    let new_balance = wallet::credit(&mut *tx, transaction.user_id, transaction.credits).await?;
    tx.commit().await?;

    tracing::info!(
        "Payment verified: user={}, order={}, credits_added={}, balance={}",
        user.email,
        req.razorpay_order_id,
        transaction.credits,
        new_balance
    );

    Ok(Json(VerifyPaymentResponse {
        success: true,
        credited: true,
    }))
}
