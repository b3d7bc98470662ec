use crate::models::{Link, Visit};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists")]
    DuplicateCode,
    #[error("destination URL already shortened")]
    DuplicateDestination,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Insert a new link. Uniqueness of both the code and the destination
    /// URL is enforced here, at the store boundary, so two concurrent
    /// encodes that passed any pre-check still cannot both insert.
    async fn create(
        &self,
        short_code: &str,
        original_url: &str,
        short_url: &str,
    ) -> StorageResult<Link>;

    /// Look up a link by short code
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>>;

    /// Look up a link by destination URL (encode dedup)
    async fn find_by_destination(&self, original_url: &str) -> Result<Option<Link>>;

    /// Atomically increment the click counter and bump `updated_at`,
    /// returning the updated link, or `None` for an unknown code.
    ///
    /// Must be a single read-modify-write statement; concurrent redirects
    /// of the same code must not lose updates.
    async fn increment_clicks(&self, short_code: &str) -> Result<Option<Link>>;

    /// List all links, newest first
    async fn list(&self) -> Result<Vec<Link>>;

    /// Append one visit record. Pure append; visits are never mutated
    /// or deleted.
    async fn record_visit(
        &self,
        short_code: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Result<Visit>;

    /// All visits for a code, most recent first
    async fn visits_for_code(&self, short_code: &str) -> Result<Vec<Visit>>;
}
