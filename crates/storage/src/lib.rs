use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tracing::debug;

use shared::{
    domain::{LpaId, SessionId},
    protocol::LpaSummary,
    provided::Provided,
};

/// Persistence for the donor aggregate.
#[async_trait]
pub trait DonorStore: Send + Sync {
    async fn create(&self, session_id: SessionId, now: DateTime<Utc>) -> Result<Provided>;
    async fn get(&self, lpa_id: LpaId) -> Result<Option<Provided>>;
    /// Writes the aggregate if nobody else wrote it since it was read, and
    /// returns it with its new version.
    async fn put(&self, provided: &Provided) -> Result<Provided>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("lpa {lpa_id} was changed by another request (expected version {expected})")]
    Conflict { lpa_id: LpaId, expected: i64 },
    #[error("lpa {0} does not exist")]
    Missing(LpaId),
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        // Every connection to an in-memory database gets its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_for_session(&self, session_id: SessionId) -> Result<Vec<LpaSummary>> {
        let rows = sqlx::query(
            "SELECT data, version FROM lpas WHERE session_id = ? ORDER BY updated_at DESC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("failed to list lpas for session")?;

        rows.into_iter()
            .map(|row| {
                let provided = decode_row(&row)?;
                Ok(summary(&provided))
            })
            .collect()
    }

    pub async fn list_all(&self, limit: u32) -> Result<Vec<LpaSummary>> {
        let rows = sqlx::query("SELECT data, version FROM lpas ORDER BY updated_at DESC LIMIT ?")
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .context("failed to list lpas")?;

        rows.into_iter()
            .map(|row| {
                let provided = decode_row(&row)?;
                Ok(summary(&provided))
            })
            .collect()
    }
}

#[async_trait]
impl DonorStore for Storage {
    async fn create(&self, session_id: SessionId, now: DateTime<Utc>) -> Result<Provided> {
        let mut provided = Provided::new(LpaId::new(), session_id, now);
        provided.version = 1;
        let data = serde_json::to_string(&provided).context("failed to encode lpa")?;

        sqlx::query(
            "INSERT INTO lpas (lpa_id, session_id, lpa_uid, version, data, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(provided.lpa_id.to_string())
        .bind(session_id.to_string())
        .bind(&provided.lpa_uid)
        .bind(provided.version)
        .bind(data)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("failed to insert lpa")?;

        debug!(lpa_id = %provided.lpa_id, "created lpa");
        Ok(provided)
    }

    async fn get(&self, lpa_id: LpaId) -> Result<Option<Provided>> {
        let row = sqlx::query("SELECT data, version FROM lpas WHERE lpa_id = ?")
            .bind(lpa_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load lpa {lpa_id}"))?;

        row.map(|row| decode_row(&row)).transpose()
    }

    async fn put(&self, provided: &Provided) -> Result<Provided> {
        let mut stored = provided.clone();
        stored.version = provided.version + 1;
        let updated_at = stored.updated_at.unwrap_or_else(Utc::now);
        stored.updated_at = Some(updated_at);
        let data = serde_json::to_string(&stored).context("failed to encode lpa")?;

        let result = sqlx::query(
            "UPDATE lpas SET data = ?, lpa_uid = ?, version = ?, updated_at = ?
             WHERE lpa_id = ? AND version = ?",
        )
        .bind(data)
        .bind(&stored.lpa_uid)
        .bind(stored.version)
        .bind(updated_at)
        .bind(provided.lpa_id.to_string())
        .bind(provided.version)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update lpa {}", provided.lpa_id))?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT version FROM lpas WHERE lpa_id = ?")
                .bind(provided.lpa_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
            return Err(match exists {
                Some(_) => StoreError::Conflict {
                    lpa_id: provided.lpa_id,
                    expected: provided.version,
                },
                None => StoreError::Missing(provided.lpa_id),
            }
            .into());
        }

        debug!(lpa_id = %stored.lpa_id, version = stored.version, "stored lpa");
        Ok(stored)
    }
}

fn decode_row(row: &sqlx::sqlite::SqliteRow) -> Result<Provided> {
    let data: String = row.try_get("data")?;
    let version: i64 = row.try_get("version")?;
    let mut provided: Provided = serde_json::from_str(&data).context("failed to decode lpa")?;
    provided.version = version;
    Ok(provided)
}

fn summary(provided: &Provided) -> LpaSummary {
    LpaSummary {
        lpa_id: provided.lpa_id,
        lpa_uid: provided.lpa_uid.clone(),
        donor_full_name: provided.donor.full_name(),
        lpa_type: provided.lpa_type,
        version: provided.version,
        updated_at: provided.updated_at,
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
