use crate::auth::require_session;
use crate::errors::AppError;
use crate::lookup_client::LookupClient;
use crate::models::{InvestigationRequest, InvestigationResponse};
use crate::normalizer;
use crate::razorpay_client::RazorpayClient;
use crate::wallet;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Client for the external lookup provider (None when unconfigured).
    pub lookup_client: Option<LookupClient>,
    /// Client for the Razorpay gateway (None when unconfigured).
    pub razorpay_client: Option<RazorpayClient>,
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "osint-credits-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/investigation
///
/// The credit-gated lookup pipeline. Ordering is the correctness property:
/// check the balance, call the provider, and only then charge. A user is
/// never charged for a failed or unreachable provider call, and the
/// provider is never called when funds are insufficient.
pub async fn investigate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<InvestigationRequest>,
) -> Result<Json<InvestigationResponse>, AppError> {
    let user = require_session(&state.db, &headers).await?;

    if req.service_type.trim().is_empty() {
        return Err(AppError::BadRequest("Service type is required".to_string()));
    }
    if req.credits <= 0 {
        return Err(AppError::BadRequest(
            "Credit cost must be positive".to_string(),
        ));
    }

    let (field, search_key) = req.search_key().ok_or_else(|| {
        AppError::BadRequest(format!(
            "Missing search parameter: '{}' expects field '{}'",
            req.service_type,
            crate::models::SearchField::for_service(&req.service_type).name()
        ))
    })?;

    let lookup_client = state.lookup_client.as_ref().ok_or_else(|| {
        AppError::ConfigurationError("Lookup provider token not configured".to_string())
    })?;

    // Gate: reject before any paid external call is made.
    if user.credits < req.credits {
        return Err(AppError::InsufficientCredits {
            required: req.credits,
            available: user.credits,
        });
    }

    tracing::info!(
        "Investigation request: user={}, service={}, field={}, cost={}",
        user.email,
        req.service_type,
        field.name(),
        req.credits
    );

    let raw = lookup_client.search(search_key).await?;

    // The provider has answered and incurred cost, so the debit must
    // complete even if the client disconnects: run it on a detached task
    // and await its handle.
    let db = state.db.clone();
    let user_id = user.id;
    let cost = req.credits;
    let gate_balance = user.credits;
    let settled =
        tokio::spawn(async move { settle_debit(&db, user_id, cost, gate_balance).await })
            .await
            .map_err(|e| AppError::InternalError(format!("Debit task failed: {}", e)))?;
    let new_balance = settled?;

    let data = if req.service_type == normalizer::IDENTITY_LINKAGE_SERVICE {
        normalizer::filter_identity_payload(raw)
    } else {
        raw
    };

    tracing::info!(
        "Investigation success: user={}, service={}, credits_used={}, remaining={}",
        user.email,
        req.service_type,
        req.credits,
        new_balance
    );

    Ok(Json(InvestigationResponse {
        success: true,
        data,
        credits_remaining: new_balance,
    }))
}

/// Applies the post-provider debit and reports the outcome.
///
/// The conditional write re-validates the balance, so losing that race
/// means a concurrent request spent the credits between the gate and the
/// write: no charge is applied and the caller gets `InsufficientCredits`
/// with the freshest balance readable (falling back to the gate-time
/// snapshot when the re-read itself fails, never a fabricated value).
/// A storage fault here is a persistence fault: the provider call has
/// already succeeded and incurred cost.
pub async fn settle_debit(
    db: &PgPool,
    user_id: Uuid,
    cost: i32,
    gate_balance: i32,
) -> Result<i32, AppError> {
    let debited = wallet::debit(db, user_id, cost)
        .await
        .map_err(|e| AppError::PersistenceError(format!("Credit debit failed: {}", e)))?;

    match debited {
        Some(new_balance) => Ok(new_balance),
        None => {
            let available =
                match sqlx::query_scalar::<_, i32>("SELECT credits FROM users WHERE id = $1")
                    .bind(user_id)
                    .fetch_optional(db)
                    .await
                {
                    Ok(Some(balance)) => balance,
                    Ok(None) => 0,
                    Err(e) => {
                        tracing::warn!(
                            "Failed to re-read balance after lost debit race: {}",
                            e
                        );
                        gate_balance
                    }
                };
            Err(AppError::InsufficientCredits {
                required: cost,
                available,
            })
        }
    }
}

/// Returns the Razorpay client or a configuration fault, failing closed.
pub(crate) fn require_razorpay(state: &AppState) -> Result<&RazorpayClient, AppError> {
    state.razorpay_client.as_ref().ok_or_else(|| {
        AppError::ConfigurationError("Razorpay key pair not configured".to_string())
    })
}
