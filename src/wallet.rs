use sqlx::PgExecutor;
use uuid::Uuid;

/// Atomically debits `cost` credits from a user's wallet.
///
/// The condition `credits >= cost` is re-validated at write time, so two
/// concurrent requests for the same user cannot both drive the balance
/// negative even though the orchestrator already checked it earlier.
///
/// Returns the new balance, or `None` when the conditional update matched no
/// row (balance changed under us, or the user disappeared) — the caller
/// treats that as "someone else already won".
pub async fn debit<'e, E>(executor: E, user_id: Uuid, cost: i32) -> Result<Option<i32>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE users
        SET credits = credits - $2
        WHERE id = $1 AND credits >= $2
        RETURNING credits
        "#,
    )
    .bind(user_id)
    .bind(cost)
    .fetch_optional(executor)
    .await
}

/// Atomically credits `amount` credits to a user's wallet.
///
/// Runs against any executor so the payment verifier can perform it inside
/// the same transaction as the order's status transition.
pub async fn credit<'e, E>(executor: E, user_id: Uuid, amount: i32) -> Result<i32, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE users
        SET credits = credits + $2
        WHERE id = $1
        RETURNING credits
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_one(executor)
    .await
}
