//! Domain models of the comment-tracking store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use table_derive::{model, Projection, TableMetadata};
use uuid::Uuid;

/// Reusable review comment
#[model]
#[table(name = "comments", entity = "Comment", auto_increment)]
pub struct Comment {
    #[primary_key]
    pub id: i64,
    pub message: String,
    pub author: String,
    pub created_on: DateTime<Utc>,
}

/// How often a comment has been reused
#[model]
#[table(name = "comment_usages", entity = "CommentUsage", auto_increment)]
pub struct CommentUsage {
    #[primary_key]
    pub id: i64,
    pub comment_id: i64,
    pub usage_count: i32,
    pub last_used_on: DateTime<Utc>,
}

/// Token that lets an author withdraw a comment until it expires
#[model]
#[table(name = "retraction_tokens", entity = "RetractionToken")]
pub struct RetractionToken {
    #[primary_key]
    pub token: Uuid,
    pub comment_id: i64,
    pub expires_on: DateTime<Utc>,
}

#[model]
#[table(name = "system_variables", entity = "SystemVariable")]
pub struct SystemVariable {
    #[primary_key]
    pub name: String,
    pub value: String,
}

/// Usage counter joined to the comment it counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Projection)]
pub struct CommentUsageView {
    pub id: i64,
    pub comment_id: i64,
    pub usage_count: i32,
    pub last_used_on: DateTime<Utc>,
    #[join_path("[comments:id:comment_id].message")]
    pub comment_message: String,
    #[join_path("[comments:id:comment_id].author")]
    pub comment_author: String,
}
