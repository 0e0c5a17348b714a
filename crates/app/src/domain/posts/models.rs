//! Post Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{tags::models::TagUuid, users::models::UserUuid},
    ids::TypedUuid,
};

/// Post UUID
pub type PostUuid = TypedUuid<Post>;

/// Post Model, joined with its author and optional tag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub uuid: PostUuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_uuid: UserUuid,
    pub author_name: String,
    pub tag_uuid: Option<TagUuid>,
    pub tag_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Post Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub tag_uuid: Option<TagUuid>,
}
