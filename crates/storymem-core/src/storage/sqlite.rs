//! SQLite Storage Implementation
//!
//! Children, stories and feedback in one database file. Embeddings are stored
//! next to their story so ranking needs a single query per child.

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::embeddings::Embedding;
use crate::model::{
    Child, FeedbackReceipt, NewChild, NewFeedback, NewStory, Progress, ProgressStats, Story,
    MAX_READING_LEVEL,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error, including constraint violations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Record not found
    #[error("{0} not found")]
    NotFound(String),
    /// Input rejected before reaching the database
    #[error("Validation error: {0}")]
    Validation(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

impl StorageError {
    /// True for foreign-key, NOT NULL and similar constraint failures
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            StorageError::Database(e) => {
                e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
            }
            _ => false,
        }
    }
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Row counts for health reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    pub children: i64,
    pub stories: i64,
    pub stories_with_embeddings: i64,
    pub feedback: i64,
}

// ============================================================================
// STORAGE
// ============================================================================

const STORY_COLUMNS: &str =
    "id, child_id, story_text, difficulty, summary, keywords, embedding, embedding_dims, created_at";

/// Main storage struct
///
/// Uses separate reader/writer connections. Each operation checks a
/// connection out by locking its mutex and the guard returns it on every exit
/// path, so `Storage` is `Send + Sync` and shared as `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl Storage {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }

    /// Create new storage instance
    ///
    /// With `None` the database lives in the platform data directory.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let writer_conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::info!(applied, path = %path.display(), "Database schema up to date");
        }

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "storymem", "core").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(data_dir, perms);
        }
        Ok(data_dir.join("storymem.db"))
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    /// Timestamp format whose lexical order matches chronological order
    fn timestamp(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    // ========================================================================
    // CHILDREN
    // ========================================================================

    /// Create a child profile
    pub fn create_child(&self, input: &NewChild, default_level: i32) -> Result<Child> {
        input.validate().map_err(StorageError::Validation)?;

        let interests_json =
            serde_json::to_string(&input.interests).unwrap_or_else(|_| "[]".to_string());
        let now = Self::timestamp(Utc::now());

        let id = {
            let writer = self.writer()?;
            writer.execute(
                "INSERT INTO children (name, age, reading_level, interests, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    input.name,
                    input.age,
                    input.effective_reading_level(default_level),
                    interests_json,
                    now,
                ],
            )?;
            writer.last_insert_rowid()
        };

        self.get_child(id)?
            .ok_or_else(|| StorageError::NotFound(format!("Child {}", id)))
    }

    /// Get a child by ID
    pub fn get_child(&self, id: i64) -> Result<Option<Child>> {
        let reader = self.reader()?;
        let child = reader
            .query_row(
                "SELECT id, name, age, reading_level, interests, created_at
                 FROM children WHERE id = ?1",
                params![id],
                Self::row_to_child,
            )
            .optional()?;
        Ok(child)
    }

    // ========================================================================
    // STORIES
    // ========================================================================

    /// Insert a story, with or without an embedding
    pub fn insert_story(&self, input: &NewStory, embedding: Option<&Embedding>) -> Result<Story> {
        self.insert_story_at(input, embedding, Utc::now())
    }

    fn insert_story_at(
        &self,
        input: &NewStory,
        embedding: Option<&Embedding>,
        created_at: DateTime<Utc>,
    ) -> Result<Story> {
        input.validate().map_err(StorageError::Validation)?;

        let keywords_json =
            serde_json::to_string(&input.keywords).unwrap_or_else(|_| "[]".to_string());
        let embedding_bytes = embedding.map(Embedding::to_bytes);
        let embedding_dims = embedding.map(|e| e.dimensions as i64);

        let id = {
            let writer = self.writer()?;
            writer.execute(
                "INSERT INTO stories (
                    child_id, story_text, difficulty, summary, keywords,
                    embedding, embedding_dims, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    input.child_id,
                    input.story_text,
                    input.difficulty,
                    input.summary,
                    keywords_json,
                    embedding_bytes,
                    embedding_dims,
                    Self::timestamp(created_at),
                ],
            )?;
            writer.last_insert_rowid()
        };

        self.get_story(id)?
            .ok_or_else(|| StorageError::NotFound(format!("Story {}", id)))
    }

    /// Get a story by ID
    pub fn get_story(&self, id: i64) -> Result<Option<Story>> {
        let reader = self.reader()?;
        let story = reader
            .query_row(
                &format!("SELECT {} FROM stories WHERE id = ?1", STORY_COLUMNS),
                params![id],
                Self::row_to_story,
            )
            .optional()?;
        Ok(story)
    }

    /// Most recent stories for a child, newest first
    pub fn list_stories(&self, child_id: i64, limit: usize) -> Result<Vec<Story>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {} FROM stories WHERE child_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
            STORY_COLUMNS
        ))?;
        let stories = stmt
            .query_map(params![child_id, limit as i64], Self::row_to_story)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stories)
    }

    /// The newest story for a child
    pub fn latest_story(&self, child_id: i64) -> Result<Option<Story>> {
        Ok(self.list_stories(child_id, 1)?.into_iter().next())
    }

    /// Every story for a child, newest first, embeddings decoded
    pub fn stories_for_child(&self, child_id: i64) -> Result<Vec<Story>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {} FROM stories WHERE child_id = ?1
             ORDER BY created_at DESC, id DESC",
            STORY_COLUMNS
        ))?;
        let stories = stmt
            .query_map(params![child_id], Self::row_to_story)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stories)
    }

    // ========================================================================
    // FEEDBACK & PROGRESS
    // ========================================================================

    /// Record feedback and apply the reading-level rule in one transaction
    ///
    /// The increment is a conditional UPDATE, so concurrent submissions for
    /// the same child can never push the level past the ceiling or lose an
    /// increment.
    pub fn save_feedback(&self, input: &NewFeedback) -> Result<FeedbackReceipt> {
        let mut writer = self.writer()?;
        let tx = writer.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO feedback (story_id, child_id, rating, comprehension_score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.story_id,
                input.child_id,
                input.rating,
                input.comprehension_score,
                Self::timestamp(Utc::now()),
            ],
        )?;
        let id = tx.last_insert_rowid();

        let reading_level_raised = if input.earns_level_up() {
            let updated = tx.execute(
                "UPDATE children SET reading_level = reading_level + 1
                 WHERE id = ?1 AND reading_level < ?2",
                params![input.child_id, MAX_READING_LEVEL],
            )?;
            updated > 0
        } else {
            false
        };

        tx.commit()?;

        if reading_level_raised {
            tracing::info!(child_id = input.child_id, "Reading level raised");
        }

        Ok(FeedbackReceipt {
            id,
            reading_level_raised,
        })
    }

    /// Child profile plus story and feedback aggregates
    pub fn get_progress(&self, child_id: i64) -> Result<Option<Progress>> {
        let Some(child) = self.get_child(child_id)? else {
            return Ok(None);
        };

        let reader = self.reader()?;
        let stats = reader.query_row(
            "SELECT
                COUNT(DISTINCT s.id),
                COUNT(f.id),
                AVG(f.rating),
                AVG(f.comprehension_score)
             FROM stories s
             LEFT JOIN feedback f ON f.story_id = s.id
             WHERE s.child_id = ?1",
            params![child_id],
            |row| {
                Ok(ProgressStats {
                    story_count: row.get(0)?,
                    feedback_count: row.get(1)?,
                    avg_rating: row.get(2)?,
                    avg_comprehension: row.get(3)?,
                })
            },
        )?;

        Ok(Some(Progress { child, stats }))
    }

    /// Row counts across all tables
    pub fn get_stats(&self) -> Result<StorageStats> {
        let reader = self.reader()?;
        let count = |sql: &str| -> Result<i64> { Ok(reader.query_row(sql, [], |row| row.get(0))?) };

        Ok(StorageStats {
            children: count("SELECT COUNT(*) FROM children")?,
            stories: count("SELECT COUNT(*) FROM stories")?,
            stories_with_embeddings: count(
                "SELECT COUNT(*) FROM stories WHERE embedding IS NOT NULL",
            )?,
            feedback: count("SELECT COUNT(*) FROM feedback")?,
        })
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                    )),
                )
            })
    }

    fn parse_string_list(json: &str) -> Vec<String> {
        serde_json::from_str(json).unwrap_or_default()
    }

    fn row_to_child(row: &rusqlite::Row) -> rusqlite::Result<Child> {
        let interests: String = row.get("interests")?;
        let created_at: String = row.get("created_at")?;

        Ok(Child {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
            reading_level: row.get("reading_level")?,
            interests: Self::parse_string_list(&interests),
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
        })
    }

    /// A stored vector is only trusted when its length agrees with `embedding_dims`
    fn decode_embedding(bytes: Option<&[u8]>, dims: Option<i64>) -> Option<Embedding> {
        let embedding = Embedding::from_bytes(bytes?)?;
        if dims != Some(embedding.dimensions as i64) {
            tracing::warn!(
                stored = ?dims,
                decoded = embedding.dimensions,
                "Ignoring story embedding with inconsistent dimensions"
            );
            return None;
        }
        Some(embedding)
    }

    fn row_to_story(row: &rusqlite::Row) -> rusqlite::Result<Story> {
        let keywords: String = row.get("keywords")?;
        let created_at: String = row.get("created_at")?;
        let embedding_bytes: Option<Vec<u8>> = row.get("embedding")?;
        let embedding_dims: Option<i64> = row.get("embedding_dims")?;
        let embedding = Self::decode_embedding(embedding_bytes.as_deref(), embedding_dims);

        Ok(Story {
            id: row.get("id")?,
            child_id: row.get("child_id")?,
            story_text: row.get("story_text")?,
            difficulty: row.get("difficulty")?,
            summary: row.get("summary")?,
            keywords: Self::parse_string_list(&keywords),
            has_embedding: embedding.is_some(),
            embedding,
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
