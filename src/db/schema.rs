//! Database lifecycle and schema.

use crate::error::DatabaseError;
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::path::Path;
use std::str::FromStr;

use super::Database;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS Studies (
        Name TEXT PRIMARY KEY NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Languages (
        LanguageIx INTEGER NOT NULL,
        study TEXT NOT NULL,
        FilePathPart TEXT NOT NULL,
        ShortName TEXT,
        PRIMARY KEY (LanguageIx, study)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Words (
        study TEXT NOT NULL,
        IxElicitation INTEGER NOT NULL,
        IxMorphologicalInstance INTEGER NOT NULL,
        SoundFileWordIdentifierText TEXT NOT NULL,
        PRIMARY KEY (study, IxElicitation, IxMorphologicalInstance)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Transcriptions (
        LanguageIx INTEGER NOT NULL,
        IxElicitation INTEGER NOT NULL,
        IxMorphologicalInstance INTEGER NOT NULL,
        AlternativeLexemIx INTEGER NOT NULL DEFAULT 0,
        AlternativePhoneticRealisationIx INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_transcriptions_word
        ON Transcriptions(LanguageIx, IxElicitation, IxMorphologicalInstance)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Page_Translations (
        TranslationId INTEGER PRIMARY KEY,
        TranslationName TEXT NOT NULL,
        BrowserMatch TEXT NOT NULL,
        Active INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Page_StaticTranslation (
        TranslationId INTEGER NOT NULL,
        Req TEXT NOT NULL,
        Trans TEXT NOT NULL,
        IsHtml INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (TranslationId, Req)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Page_DynamicTranslation (
        TranslationId INTEGER NOT NULL,
        Category TEXT NOT NULL,
        Field TEXT NOT NULL,
        Trans TEXT NOT NULL,
        PRIMARY KEY (TranslationId, Category, Field)
    )
    "#,
];

impl Database {
    /// Open an existing database snapshot read-only
    ///
    /// # Errors
    ///
    /// [`Error::MissingInput`] if `path` does not exist.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingInput {
                what: "database snapshot",
                path: path.to_path_buf(),
            });
        }

        let options = connect_options(path)?.read_only(true);
        let pool = connect(options).await?;
        tracing::debug!(?path, "opened database snapshot");
        Ok(Self { pool })
    }

    /// Create a database (or open an existing one read-write) and apply the schema
    pub async fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to create database directory: {}",
                    e
                )))
            })?;
        }

        let options = connect_options(path)?.create_if_missing(true);
        let db = Self {
            pool: connect(options).await?,
        };
        db.apply_schema().await?;
        Ok(db)
    }

    async fn apply_schema(&self) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(format!(
                "Failed to begin transaction: {}",
                e
            )))
        })?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::MigrationFailed(format!(
                        "Failed to apply schema: {}",
                        e
                    )))
                })?;
        }

        tx.commit().await.map_err(|e| {
            Error::Database(DatabaseError::MigrationFailed(format!(
                "Failed to commit schema: {}",
                e
            )))
        })?;

        tracing::debug!(statements = SCHEMA.len(), "applied database schema");
        Ok(())
    }
}

fn connect_options(path: &Path) -> Result<SqliteConnectOptions> {
    SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display())).map_err(|e| {
        Error::Database(DatabaseError::ConnectionFailed(format!(
            "Failed to parse database path: {}",
            e
        )))
    })
}

async fn connect(options: SqliteConnectOptions) -> Result<SqlitePool> {
    SqlitePool::connect_with(options).await.map_err(|e| {
        Error::Database(DatabaseError::ConnectionFailed(format!(
            "Failed to connect to database: {}",
            e
        )))
    })
}
