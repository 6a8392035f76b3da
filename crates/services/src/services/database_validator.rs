//! Database validation service for checking the schema and its contents

use db::schema::TABLES;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("missing tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    pub name: String,
    pub rows: i64,
}

/// Result of database validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub missing_tables: Vec<String>,
    pub tables: Vec<TableStats>,
    pub foreign_keys_enabled: bool,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.missing_tables.is_empty() && self.foreign_keys_enabled
    }

    pub fn total_rows(&self) -> i64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn summary(&self) -> String {
        if !self.missing_tables.is_empty() {
            format!("Database incomplete - missing {}", self.missing_tables.join(", "))
        } else if !self.foreign_keys_enabled {
            "Database OK but foreign keys are disabled".to_string()
        } else {
            format!(
                "Database OK - {} tables, {} rows",
                self.tables.len(),
                self.total_rows()
            )
        }
    }
}

pub struct DatabaseValidator {
    pool: SqlitePool,
}

impl DatabaseValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Checks that every application table exists and counts its rows.
    pub async fn validate(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let missing_tables = self.validate_tables(TABLES).await?;
        if !missing_tables.is_empty() {
            warn!(missing = ?missing_tables, "Database is missing tables");
        }

        let mut tables = Vec::with_capacity(TABLES.len());
        for name in TABLES.iter().filter(|t| !missing_tables.iter().any(|m| m == *t)) {
            let rows = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {name}"))
                .fetch_one(&self.pool)
                .await?;
            tables.push(TableStats {
                name: name.to_string(),
                rows,
            });
        }

        let foreign_keys_enabled = sqlx::query_scalar::<_, i64>("PRAGMA foreign_keys")
            .fetch_one(&self.pool)
            .await?
            == 1;

        let result = ValidationResult {
            missing_tables,
            tables,
            foreign_keys_enabled,
        };
        info!(
            tables = result.tables.len(),
            rows = result.total_rows(),
            "Database validation complete"
        );
        Ok(result)
    }

    /// Same as [`validate`](Self::validate) but missing tables are an error.
    pub async fn require_valid(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let result = self.validate().await?;
        if !result.missing_tables.is_empty() {
            return Err(DatabaseValidationError::MissingTables(result.missing_tables));
        }
        Ok(result)
    }

    /// Returns the names in `required_tables` that do not exist.
    pub async fn validate_tables(
        &self,
        required_tables: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing_tables = Vec::new();

        for table in required_tables {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;

            if !exists {
                missing_tables.push(table.to_string());
            }
        }

        Ok(missing_tables)
    }
}
