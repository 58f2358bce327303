use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use chrono::{Datelike, Local, NaiveDateTime};
use tracing::{debug, error, info};

use crate::db::{ArticleRecord, ArticleStore};
use crate::error::Error;
use crate::handle::{HandleCodec, HandleError};

pub struct AppState<S> {
    pub store: S,
    pub codec: HandleCodec,
    /// Already normalized, see `Config::validate`
    pub prefix: String,
    pub items: usize,
}

impl<S> AppState<S> {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    fn article_href(&self, handle: u64) -> String {
        self.url(&format!("/article/{}", self.codec.encode(handle)))
    }
}

// Template structs
#[derive(Template)]
#[template(path = "root.html")]
pub struct RootTemplate {
    pub prefix: String,
    pub articles: Vec<ArticleSummary>,
    pub generated_at: String,
}

pub struct ArticleSummary {
    pub href: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub found_at: String,
    pub source_url: String,
    pub source_brand: String,
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub prefix: String,
    pub article: ArticleView,
}

pub struct ArticleView {
    pub url: String,
    pub title: String,
    pub found_at: String,
    pub paragraphs: Vec<String>,
    pub source_url: String,
    pub source_brand: String,
}

impl ArticleSummary {
    fn new<S>(state: &AppState<S>, record: ArticleRecord, now: NaiveDateTime) -> Self {
        Self {
            href: state.article_href(record.handle),
            url: record.url,
            title: record.title.unwrap_or_default(),
            summary: record.summary,
            found_at: format_found_at(record.found_at, now),
            source_url: record.source_url,
            source_brand: record.source_brand,
        }
    }
}

impl ArticleView {
    fn new(record: ArticleRecord, now: NaiveDateTime) -> Self {
        Self {
            paragraphs: split_paragraphs(&record.text),
            url: record.url,
            title: record.title.unwrap_or_else(|| "(untitled)".to_string()),
            found_at: format_found_at(record.found_at, now),
            source_url: record.source_url,
            source_brand: record.source_brand,
        }
    }
}

/// Short human date: `Today 14:05`, `03 May 14:05`, or `03 May 2023`.
pub fn format_found_at(found_at: Option<NaiveDateTime>, now: NaiveDateTime) -> String {
    let Some(found_at) = found_at else {
        return String::new();
    };
    let format = if found_at.date() == now.date() {
        "Today %H:%M"
    } else if found_at.year() == now.year() {
        "%d %b %H:%M"
    } else {
        "%d %b %Y"
    };
    found_at.format(format).to_string()
}

/// One paragraph per non-blank line of extracted text.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// Maps store and handle errors to the plain-text bodies readers see.
pub struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0 {
            Error::InvalidHandle(err) => {
                debug!("rejected article handle: {}", err);
                (StatusCode::NOT_FOUND, "article not found").into_response()
            }
            Error::NotFound { handle } => {
                info!(handle, "article not found");
                (StatusCode::NOT_FOUND, "article not found").into_response()
            }
            Error::Store { operation, source } => {
                error!(operation, error = %source, "database query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "database error").into_response()
            }
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl From<HandleError> for AppError {
    fn from(err: HandleError) -> Self {
        AppError(err.into())
    }
}

// Route handlers
pub async fn index<S: ArticleStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, AppError> {
    let records = state.store.list_recent(state.items).await?;

    let now = Local::now().naive_local();
    let articles = records
        .into_iter()
        .map(|record| ArticleSummary::new(&state, record, now))
        .collect();

    Ok(HtmlTemplate(RootTemplate {
        prefix: state.prefix.clone(),
        articles,
        generated_at: now.format("%Y-%m-%d %H:%M").to_string(),
    }))
}

pub async fn article<S: ArticleStore>(
    State(state): State<Arc<AppState<S>>>,
    handle: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    // e.g. percent-encoded bytes that are not UTF-8
    let Path(handle) =
        handle.map_err(|rejection| HandleError::Unreadable(rejection.body_text()))?;
    show_article(&state, &handle).await
}

/// `/article/` with nothing after it decodes as the empty handle.
pub async fn article_root<S: ArticleStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, AppError> {
    show_article(&state, "").await
}

async fn show_article<S: ArticleStore>(
    state: &AppState<S>,
    encoded: &str,
) -> Result<HtmlTemplate<ArticleTemplate>, AppError> {
    let handle = state.codec.decode(encoded)?;
    let record = state.store.get_by_handle(handle).await?;

    Ok(HtmlTemplate(ArticleTemplate {
        prefix: state.prefix.clone(),
        article: ArticleView::new(record, Local::now().naive_local()),
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

/// The list and detail routes, mounted under the state's prefix.
pub fn router<S: ArticleStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let mut router = Router::new()
        .route(&state.url("/"), get(index::<S>))
        .route(&state.url("/article/"), get(article_root::<S>))
        .route(&state.url("/article/:handle"), get(article::<S>));

    if !state.prefix.is_empty() {
        let target = state.url("/");
        router = router.route(
            &state.prefix,
            get(move || async move { Redirect::permanent(&target) }),
        );
    }

    router.fallback(not_found).with_state(state)
}
