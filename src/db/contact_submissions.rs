use sqlx::PgPool;

use crate::models::PersistedSubmission;

pub async fn insert(pool: &PgPool, submission: &PersistedSubmission) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contact_submissions (id, name, phone, email, property_address, message, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(submission.id)
    .bind(&submission.name)
    .bind(&submission.phone)
    .bind(&submission.email)
    .bind(&submission.property_address)
    .bind(&submission.message)
    .bind(submission.created_at)
    .execute(pool)
    .await?;
    Ok(())
}
