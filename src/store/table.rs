use async_trait::async_trait;
use sqlx::PgPool;

use crate::db;
use crate::models::PersistedSubmission;

use super::{StorageError, SubmissionStore};

/// Durable store backed by the `contact_submissions` Postgres table.
pub struct TableStore {
    pool: PgPool,
}

impl TableStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for TableStore {
    fn name(&self) -> &str {
        "table"
    }

    async fn append(&self, record: PersistedSubmission) -> Result<(), StorageError> {
        db::contact_submissions::insert(&self.pool, &record).await?;
        Ok(())
    }
}
