use crate::errors::AppError;
use axum::http::HeaderMap;
use sqlx::PgPool;
use uuid::Uuid;

/// Identity resolved from a request's session token.
///
/// The session mechanism itself is deliberately thin: the rest of the
/// service only consumes "given request context, an authenticated identity
/// or none". The credit balance carried here is a read-time snapshot; the
/// wallet operations re-validate at write time.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub credits: i32,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    email: String,
    is_active: bool,
    credits: i32,
}

/// Resolves the caller from the `Authorization: Bearer <token>` header.
///
/// Unknown or expired tokens and inactive accounts all resolve to
/// `Unauthorized`; the distinction is logged but not surfaced.
pub async fn require_session(
    db: &PgPool,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AppError> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Please sign in".to_string()))?;

    let row = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT u.id, u.email, u.is_active, u.credits
        FROM sessions s
        INNER JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > now()
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()))?;

    if !row.is_active {
        tracing::warn!("Rejected session for inactive account: {}", row.email);
        return Err(AppError::Unauthorized("Account is inactive".to_string()));
    }

    Ok(AuthenticatedUser {
        id: row.id,
        email: row.email,
        credits: row.credits,
    })
}
