//! Article service: the authorization/mutation/notification pipeline.
//!
//! Every operation runs its checks in a fixed order - authentication has
//! already happened at the gate, then authorization, then existence, then
//! the mutation itself - and the first failing check short-circuits the
//! rest. A successful mutation triggers exactly one broadcast, after the
//! persistence write and before the operation returns; failed operations
//! never broadcast and reads never broadcast.
//!
//! The service owns no state of its own. Stores and the broadcaster are
//! injected capabilities, and the store is the sole arbiter of atomicity
//! for any single call.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::broadcast::EventBroadcaster;
use crate::error::ApiError;
use crate::store::{ArticleStore, UserStore};
use crate::types::{Article, ArticleData, ArticleEvent, ArticlePatch, AuthClaims, NewArticle, Role};

/// The operations a caller can request against the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Pure authorization decision: may `role` perform `operation`?
///
/// Reads and creation are open to every authenticated role; update and
/// delete are administrator-only. The match is exhaustive over both closed
/// sets, so adding a role or an operation forces this decision to be
/// revisited.
#[must_use]
pub fn allow(role: Role, operation: Operation) -> bool {
    match operation {
        Operation::List | Operation::Get | Operation::Create => match role {
            Role::Member | Role::Admin => true,
        },
        Operation::Update | Operation::Delete => match role {
            Role::Admin => true,
            Role::Member => false,
        },
    }
}

/// Caller-facing denial message for an administrator-only operation.
fn admin_denial(operation: Operation) -> &'static str {
    match operation {
        Operation::Delete => "Only administrators can delete articles",
        _ => "Only administrators can modify articles",
    }
}

/// Orchestrates policy checks, store calls, and mutation broadcasts.
#[derive(Clone)]
pub struct ArticleService {
    articles: Arc<dyn ArticleStore>,
    users: Arc<dyn UserStore>,
    broadcaster: EventBroadcaster,
}

impl ArticleService {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        users: Arc<dyn UserStore>,
        broadcaster: EventBroadcaster,
    ) -> Self {
        Self {
            articles,
            users,
            broadcaster,
        }
    }

    /// Lists all articles in store-native order.
    pub async fn list(&self, _claims: &AuthClaims) -> Result<Vec<Article>, ApiError> {
        Ok(self.articles.list_all().await?)
    }

    /// Fetches one article with its author resolved.
    pub async fn get(&self, _claims: &AuthClaims, id: Uuid) -> Result<Article, ApiError> {
        self.articles
            .get_by_id(id)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Creates an article authored by the caller.
    ///
    /// The author reference is stamped from the claims; nothing the client
    /// sends can influence it. The write path does not resolve the author
    /// relation, so the record is read back before the event is emitted -
    /// caller and subscribers observe an identically shaped, fully
    /// resolved article. A read-back miss (the record was deleted between
    /// the two calls) surfaces as `NotFound`.
    pub async fn create(&self, claims: &AuthClaims, draft: NewArticle) -> Result<Article, ApiError> {
        let record = self
            .articles
            .insert(ArticleData {
                title: draft.title,
                content: draft.content,
                author_id: claims.user_id,
            })
            .await?;

        let article = self
            .articles
            .get_by_id(record.id)
            .await?
            .ok_or(ApiError::NotFound)?;

        info!(article_id = %article.id, author_id = %claims.user_id, "Article created");
        self.broadcaster.broadcast(ArticleEvent::Created(article.clone()));
        Ok(article)
    }

    /// Applies a partial update to an article. Administrator-only.
    pub async fn update(
        &self,
        claims: &AuthClaims,
        id: Uuid,
        patch: ArticlePatch,
    ) -> Result<Article, ApiError> {
        self.require_admin(claims, Operation::Update).await?;

        let article = self
            .articles
            .update_by_id(id, patch)
            .await?
            .ok_or(ApiError::NotFound)?;

        info!(article_id = %article.id, "Article updated");
        self.broadcaster.broadcast(ArticleEvent::Updated(article.clone()));
        Ok(article)
    }

    /// Removes an article. Administrator-only.
    ///
    /// Success requires the store to report at least one deleted record; a
    /// replayed delete of the same identifier reports zero and surfaces as
    /// `NotFound`.
    pub async fn delete(&self, claims: &AuthClaims, id: Uuid) -> Result<(), ApiError> {
        self.require_admin(claims, Operation::Delete).await?;

        let deleted = self.articles.delete_by_id(id).await?;
        if deleted == 0 {
            return Err(ApiError::NotFound);
        }

        info!(article_id = %id, "Article deleted");
        self.broadcaster.broadcast(ArticleEvent::Deleted { id });
        Ok(())
    }

    /// Resolves the caller's role and enforces the policy for an
    /// administrator-only operation.
    ///
    /// A claims subject with no matching user is denied exactly like an
    /// insufficient role: at this layer the absence of a valid identity is
    /// indistinguishable from missing privilege.
    async fn require_admin(&self, claims: &AuthClaims, operation: Operation) -> Result<(), ApiError> {
        let user = self.users.get_by_id(claims.user_id).await?;
        match user {
            Some(user) if allow(user.role, operation) => Ok(()),
            _ => {
                debug!(user_id = %claims.user_id, ?operation, "Authorization denied");
                Err(ApiError::unauthorized(admin_denial(operation)))
            }
        }
    }
}

impl std::fmt::Debug for ArticleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleService")
            .field("broadcaster", &self.broadcaster)
            .finish_non_exhaustive()
    }
}
