//! Shared data types for the Pressroom server.
//!
//! This module defines the article and user data model plus the event types
//! broadcast to subscribers. Stored and resolved article representations are
//! kept distinct: the store assigns identifiers and owns the timestamps, and
//! only read paths resolve the author relation into the full user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a user, as a closed set.
///
/// Authorization decisions match exhaustively on this enum; there is no
/// free-form role string anywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}', expected 'member' or 'admin'")),
        }
    }
}

/// A user record as held by the identity store.
///
/// Immutable for the purposes of this server: the pipeline only ever reads
/// `role`, it never mutates a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Decoded token claims identifying the acting user.
///
/// Produced once per request by the token verifier and carried through the
/// rest of the pipeline; discarded when the request completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Identifier of the acting user.
    #[serde(rename = "userId")]
    pub user_id: Uuid,

    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// A fully resolved article, as returned to callers and subscribers.
///
/// `author` is the resolved user record; it is `None` only when the
/// referenced user no longer exists in the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An article as persisted, with the author relation unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted from a client when creating an article.
///
/// There is deliberately no author field here: the author reference is set
/// exactly once, at creation, to the authenticated caller. Any author field
/// a client includes in the request body is discarded during
/// deserialization rather than merged.
#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
}

/// Insert payload handed to the article store, with the author reference
/// already stamped by the service.
#[derive(Debug, Clone)]
pub struct ArticleData {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

/// Partial update applied to an existing article.
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// An event broadcast to subscribers after a successful mutation.
///
/// Create and update carry the fully resolved article so subscribers observe
/// the same shape the HTTP caller receives; delete carries only the
/// identifier. Events are ephemeral and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ArticleEvent {
    #[serde(rename = "article:create")]
    Created(Article),

    #[serde(rename = "article:update")]
    Updated(Article),

    #[serde(rename = "article:delete")]
    Deleted { id: Uuid },
}

impl ArticleEvent {
    /// The wire name of the event, as seen by subscribers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created(_) => "article:create",
            Self::Updated(_) => "article:update",
            Self::Deleted { .. } => "article:delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "John Doe".to_string(),
            email: "john@test.com".to_string(),
            role,
        }
    }

    fn sample_article() -> Article {
        Article {
            id: Uuid::new_v4(),
            title: "New Article".to_string(),
            content: "Content of the new article".to_string(),
            author: Some(sample_user(Role::Member)),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Member).unwrap(), r#""member""#);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    }

    #[test]
    fn role_parses_from_str() {
        assert_eq!("member".parse::<Role>().unwrap(), Role::Member);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn auth_claims_uses_user_id_wire_name() {
        let claims = AuthClaims {
            user_id: Uuid::new_v4(),
            exp: 4_102_444_800,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn new_article_discards_client_supplied_author() {
        let json = r#"{"title":"t","content":"c","author":"someone-else"}"#;
        let draft: NewArticle = serde_json::from_str(json).unwrap();
        assert_eq!(draft.title, "t");
        assert_eq!(draft.content, "c");
    }

    #[test]
    fn article_patch_fields_default_to_none() {
        let patch: ArticlePatch = serde_json::from_str(r#"{"title":"only title"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("only title"));
        assert!(patch.content.is_none());
    }

    #[test]
    fn event_serializes_with_wire_name() {
        let event = ArticleEvent::Created(sample_article());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "article:create");
        assert!(json["data"]["title"].is_string());
    }

    #[test]
    fn delete_event_carries_only_the_id() {
        let id = Uuid::new_v4();
        let event = ArticleEvent::Deleted { id };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "article:delete");
        assert_eq!(json["data"]["id"], id.to_string());
        assert_eq!(json["data"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn event_name_matches_variant() {
        assert_eq!(ArticleEvent::Created(sample_article()).name(), "article:create");
        assert_eq!(ArticleEvent::Updated(sample_article()).name(), "article:update");
        assert_eq!(
            ArticleEvent::Deleted { id: Uuid::new_v4() }.name(),
            "article:delete"
        );
    }

    #[test]
    fn event_round_trips_through_json() {
        let event = ArticleEvent::Updated(sample_article());
        let json = serde_json::to_string(&event).unwrap();
        let back: ArticleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
