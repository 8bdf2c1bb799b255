//! Storage collaborators for articles and users.
//!
//! The pipeline depends on two narrow interfaces: [`ArticleStore`] for the
//! managed collection and [`UserStore`] for identity lookups. Both are
//! `async` traits so a durable backend can sit behind them; the in-memory
//! adapters here back the server's default wiring and the test suites.
//!
//! The split between [`ArticleRecord`](crate::types::ArticleRecord) and
//! [`Article`](crate::types::Article) mirrors the write/read asymmetry of
//! the store contract: `insert` returns the persisted record with the
//! author relation unresolved, while every read path resolves the author
//! into the full user.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Article, ArticleData, ArticlePatch, ArticleRecord, User};

/// Errors surfaced by storage collaborators.
///
/// The pipeline does not interpret these beyond mapping them to its
/// internal error kind; retries, if any, belong to the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store failed in a way the pipeline cannot anticipate.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a backend failure error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Durable storage for the articles collection.
///
/// A single call against one identifier is atomic; no transaction spans
/// multiple calls. Read paths resolve the author relation, `insert` does
/// not.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetches all articles in store-native order.
    async fn list_all(&self) -> Result<Vec<Article>, StoreError>;

    /// Fetches one article with its author resolved, or `None` if the
    /// identifier does not exist.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError>;

    /// Persists a new article and returns the stored record. The author
    /// relation is left unresolved; callers needing the resolved shape
    /// read the article back.
    async fn insert(&self, data: ArticleData) -> Result<ArticleRecord, StoreError>;

    /// Applies a partial update and returns the updated, resolved article,
    /// or `None` if the identifier does not exist.
    async fn update_by_id(
        &self,
        id: Uuid,
        patch: ArticlePatch,
    ) -> Result<Option<Article>, StoreError>;

    /// Removes an article and reports how many records were deleted
    /// (0 when the identifier never existed or was already removed).
    async fn delete_by_id(&self, id: Uuid) -> Result<u64, StoreError>;
}

/// Identity lookups for authorization decisions.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetches a user by identifier, or `None` if no such user exists.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

// ============================================================================
// In-memory adapters
// ============================================================================

/// In-memory user store backed by `RwLock<HashMap>`.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given users.
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::new();
        for user in users {
            store.upsert(user);
        }
        store
    }

    /// Inserts or replaces a user record.
    pub fn upsert(&self, user: User) {
        self.users
            .write()
            .expect("user store lock poisoned")
            .insert(user.id, user);
    }

    /// Removes a user record, returning it if present.
    pub fn remove(&self, id: Uuid) -> Option<User> {
        self.users
            .write()
            .expect("user store lock poisoned")
            .remove(&id)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::backend("user store lock poisoned"))?;
        Ok(users.get(&id).cloned())
    }
}

impl std::fmt::Debug for MemoryUserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.users.read().map(|u| u.len()).unwrap_or(0);
        f.debug_struct("MemoryUserStore").field("users", &count).finish()
    }
}

/// In-memory article store.
///
/// Holds unresolved records and resolves the author relation on reads via
/// the injected [`UserStore`]. Records are cloned out of the lock before
/// any `await`, so guards are never held across suspension points.
pub struct MemoryArticleStore {
    articles: RwLock<HashMap<Uuid, ArticleRecord>>,
    users: Arc<dyn UserStore>,
}

impl MemoryArticleStore {
    /// Creates an empty article store resolving authors against `users`.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            articles: RwLock::new(HashMap::new()),
            users,
        }
    }

    /// Number of stored articles.
    pub fn len(&self) -> usize {
        self.articles
            .read()
            .expect("article store lock poisoned")
            .len()
    }

    /// Returns `true` if no articles are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn resolve(&self, record: ArticleRecord) -> Result<Article, StoreError> {
        let author = self.users.get_by_id(record.author_id).await?;
        Ok(Article {
            id: record.id,
            title: record.title,
            content: record.content,
            author,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn list_all(&self) -> Result<Vec<Article>, StoreError> {
        let mut records: Vec<ArticleRecord> = {
            let articles = self
                .articles
                .read()
                .map_err(|_| StoreError::backend("article store lock poisoned"))?;
            articles.values().cloned().collect()
        };
        // Insertion order is the store-native order here.
        records.sort_by_key(|r| r.created_at);

        let mut resolved = Vec::with_capacity(records.len());
        for record in records {
            resolved.push(self.resolve(record).await?);
        }
        Ok(resolved)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        let record = {
            let articles = self
                .articles
                .read()
                .map_err(|_| StoreError::backend("article store lock poisoned"))?;
            articles.get(&id).cloned()
        };

        match record {
            Some(record) => Ok(Some(self.resolve(record).await?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, data: ArticleData) -> Result<ArticleRecord, StoreError> {
        let now = Utc::now();
        let record = ArticleRecord {
            id: Uuid::new_v4(),
            title: data.title,
            content: data.content,
            author_id: data.author_id,
            created_at: now,
            updated_at: now,
        };

        let mut articles = self
            .articles
            .write()
            .map_err(|_| StoreError::backend("article store lock poisoned"))?;
        articles.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: ArticlePatch,
    ) -> Result<Option<Article>, StoreError> {
        let record = {
            let mut articles = self
                .articles
                .write()
                .map_err(|_| StoreError::backend("article store lock poisoned"))?;
            match articles.get_mut(&id) {
                Some(record) => {
                    if let Some(title) = patch.title {
                        record.title = title;
                    }
                    if let Some(content) = patch.content {
                        record.content = content;
                    }
                    record.updated_at = Utc::now();
                    Some(record.clone())
                }
                None => None,
            }
        };

        match record {
            Some(record) => Ok(Some(self.resolve(record).await?)),
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut articles = self
            .articles
            .write()
            .map_err(|_| StoreError::backend("article store lock poisoned"))?;
        Ok(u64::from(articles.remove(&id).is_some()))
    }
}

impl std::fmt::Debug for MemoryArticleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryArticleStore")
            .field("articles", &self.len())
            .finish()
    }
}
