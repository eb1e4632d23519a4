use std::env;
use uuid::Uuid;

use osint_credits_api::db::Database;
use osint_credits_api::models::User;
use osint_credits_api::wallet;

/// Integration smoke tests for the atomic wallet and transaction operations.
/// Marked ignored to avoid running against production by accident; set
/// TEST_DATABASE_URL to run, with schema.sql applied.

async fn test_pool() -> anyhow::Result<sqlx::PgPool> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;
    let db = Database::new(&db_url).await?;
    Ok(db.pool)
}

async fn create_user(pool: &sqlx::PgPool, credits: i32) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, is_active, credits) VALUES ($1, $2, 'x', TRUE, $3)",
    )
    .bind(id)
    .bind(format!("wallet-test-{}@example.com", id))
    .bind(credits)
    .execute(pool)
    .await?;
    Ok(id)
}

#[tokio::test]
#[ignore]
async fn conditional_debit_and_credit_smoke_test() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let user_id = create_user(&pool, 20).await?;

    // Debit within balance succeeds and returns the new balance.
    let balance = wallet::debit(&pool, user_id, 15).await?;
    assert_eq!(balance, Some(5));

    // A second debit beyond the remaining balance matches no row and
    // leaves the wallet untouched.
    let balance = wallet::debit(&pool, user_id, 15).await?;
    assert_eq!(balance, None);

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(user.credits, 5);
    assert!(user.is_active);

    // Crediting is unconditional and returns the new balance.
    let balance = wallet::credit(&pool, user_id, 750).await?;
    assert_eq!(balance, 755);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn one_success_transition_per_order_smoke_test() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let user_id = create_user(&pool, 0).await?;

    let order_id = format!("order_test_{}", Uuid::new_v4());
    sqlx::query(
        r#"
        INSERT INTO payment_transactions (id, user_id, amount, credits, razorpay_order_id, status)
        VALUES ($1, $2, 699, 750, $3, 'pending')
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&order_id)
    .execute(&pool)
    .await?;

    let transition = r#"
        UPDATE payment_transactions
        SET status = 'success', razorpay_payment_id = $2
        WHERE razorpay_order_id = $1 AND status = 'pending'
    "#;

    // First confirmation wins the conditional transition.
    let first = sqlx::query(transition)
        .bind(&order_id)
        .bind("pay_test_1")
        .execute(&pool)
        .await?
        .rows_affected();
    assert_eq!(first, 1);

    // A replayed confirmation matches no row.
    let second = sqlx::query(transition)
        .bind(&order_id)
        .bind("pay_test_2")
        .execute(&pool)
        .await?
        .rows_affected();
    assert_eq!(second, 0);

    Ok(())
}
