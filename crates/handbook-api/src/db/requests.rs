//! Policy question persistence (`policy_requests` table).

use handbook_core::PolicyRequest;
use sqlx::PgPool;

/// Insert a submitted question. Returns the generated row ID.
pub async fn insert(pool: &PgPool, request: &PolicyRequest) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO policy_requests
             (policy_number, first_name, last_name, email, question, submitted_at, resolved)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id",
    )
    .bind(request.policy.to_string())
    .bind(&request.first_name)
    .bind(&request.last_name)
    .bind(&request.email)
    .bind(&request.question)
    .bind(request.submitted_at)
    .bind(request.resolved)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Number of questions not yet marked resolved.
pub async fn count_unresolved(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM policy_requests WHERE NOT resolved")
        .fetch_one(pool)
        .await
}
