use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Executor, FromRow, SqlitePool,
};

use crate::error::{Error, Result};

/// Minimum extracted text length for an article to appear on the front page.
pub const MIN_TEXT_LEN: i64 = 140;

const LIST_RECENT_SQL: &str = r#"
    SELECT a.url, a.handle, a.title, a.summary, a.found_at,
           s.url AS source_url, s.brand AS source_brand
    FROM articles AS a
    LEFT JOIN sources AS s ON a.source = s.id
    WHERE a.title IS NOT NULL
      AND a.text IS NOT NULL AND LENGTH(a.text) >= ?
    ORDER BY a.found_at DESC, a.handle DESC
    LIMIT ?
"#;

const GET_BY_HANDLE_SQL: &str = r#"
    SELECT a.url, a.handle, a.title, a.found_at, a.text,
           s.url AS source_url, s.brand AS source_brand
    FROM articles AS a
    LEFT JOIN sources AS s ON a.source = s.id
    WHERE a.handle = ?
    LIMIT 1
"#;

/// An article as read for one request.
///
/// The list projection leaves `text` empty and the detail projection leaves
/// `summary` empty. Missing sources yield empty `source_url`/`source_brand`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub url: String,
    pub handle: u64,
    pub title: Option<String>,
    pub summary: String,
    pub text: String,
    pub found_at: Option<NaiveDateTime>,
    pub source_url: String,
    pub source_brand: String,
}

#[derive(Debug, FromRow)]
struct ArticleRow {
    url: String,
    handle: i64,
    title: Option<String>,
    #[sqlx(default)]
    summary: Option<String>,
    #[sqlx(default)]
    text: Option<String>,
    found_at: Option<String>,
    source_url: Option<String>,
    source_brand: Option<String>,
}

impl From<ArticleRow> for ArticleRecord {
    fn from(row: ArticleRow) -> Self {
        Self {
            url: row.url,
            handle: row.handle as u64,
            title: row.title,
            summary: row.summary.unwrap_or_default(),
            text: row.text.unwrap_or_default(),
            found_at: row.found_at.as_deref().and_then(parse_found_at),
            source_url: row.source_url.unwrap_or_default(),
            source_brand: row.source_brand.unwrap_or_default(),
        }
    }
}

/// Parses the timestamp text written by the ingester.
pub fn parse_found_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Read-only queries the routes depend on.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Most recent articles that pass the content-quality gate, newest
    /// first, ties broken by handle descending.
    async fn list_recent(&self, limit: usize) -> Result<Vec<ArticleRecord>>;

    /// The article with this handle, whatever its text length.
    async fn get_by_handle(&self, handle: u64) -> Result<ArticleRecord>;
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens an existing database file without write access.
    pub async fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Prepares both route queries so schema problems surface before the
    /// server accepts connections. Requests reuse the cached statements.
    pub async fn prepare_queries(&self) -> anyhow::Result<()> {
        self.pool.prepare(LIST_RECENT_SQL).await?;
        self.pool.prepare(GET_BY_HANDLE_SQL).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ArticleStore for Database {
    async fn list_recent(&self, limit: usize) -> Result<Vec<ArticleRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, ArticleRow>(LIST_RECENT_SQL)
            .bind(MIN_TEXT_LEN)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("list_recent", e))?;

        Ok(rows.into_iter().map(ArticleRecord::from).collect())
    }

    async fn get_by_handle(&self, handle: u64) -> Result<ArticleRecord> {
        // INTEGER columns are signed; reinterpret the bits
        let row = sqlx::query_as::<_, ArticleRow>(GET_BY_HANDLE_SQL)
            .bind(handle as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("get_by_handle", e))?;

        row.map(ArticleRecord::from)
            .ok_or(Error::NotFound { handle })
    }
}
