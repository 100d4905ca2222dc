//! A typed description of the mock server's API, shared by the integration
//! tests.

#![allow(dead_code)]

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use endpoint_core::{dates, ApiEndpoint, HttpMethod, JsonBody, Query};
use serde::Deserialize;
use serde_json::json;

pub enum Api {
    Posts { limit: Option<u32>, user_id: Option<u32> },
    Post(u32),
    CreatePost { title: String, body: String, user_id: u32 },
    RenamePost { id: u32, title: String },
    DeletePost(u32),
    Users,
    User(u32),
    CommentsForPost(u32),
    TodosForUser(u32),
    Me,
}

impl ApiEndpoint for Api {
    fn path(&self) -> Cow<'_, str> {
        match self {
            Api::Posts { .. } | Api::CreatePost { .. } => Cow::Borrowed("/posts"),
            Api::Post(id) | Api::DeletePost(id) | Api::RenamePost { id, .. } => {
                Cow::Owned(format!("/posts/{id}"))
            }
            Api::Users => Cow::Borrowed("/users"),
            Api::User(id) => Cow::Owned(format!("/users/{id}")),
            Api::CommentsForPost(_) => Cow::Borrowed("/comments"),
            Api::TodosForUser(_) => Cow::Borrowed("/todos"),
            Api::Me => Cow::Borrowed("/me"),
        }
    }

    fn method(&self) -> HttpMethod {
        match self {
            Api::CreatePost { .. } => HttpMethod::Post,
            Api::RenamePost { .. } => HttpMethod::Patch,
            Api::DeletePost(_) => HttpMethod::Delete,
            _ => HttpMethod::Get,
        }
    }

    fn query(&self) -> Option<Query> {
        match self {
            Api::Posts { limit, user_id } => {
                let mut query = Query::new();
                if let Some(limit) = limit {
                    query.push(("_limit".into(), limit.to_string()));
                }
                if let Some(user_id) = user_id {
                    query.push(("userId".into(), user_id.to_string()));
                }
                Some(query)
            }
            Api::CommentsForPost(id) => Some(vec![("postId".into(), id.to_string())]),
            Api::TodosForUser(id) => Some(vec![("userId".into(), id.to_string())]),
            _ => None,
        }
    }

    fn body(&self) -> Option<JsonBody> {
        let value = match self {
            Api::CreatePost { title, body, user_id } => {
                json!({ "title": title, "body": body, "userId": user_id })
            }
            Api::RenamePost { title, .. } => json!({ "title": title }),
            _ => return None,
        };
        value.as_object().cloned()
    }

    fn requires_auth(&self) -> bool {
        matches!(self, Api::Me)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u32,
    pub user_id: u32,
    pub title: String,
    pub body: String,
    #[serde(with = "dates::iso8601")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u32,
    pub post_id: u32,
    pub body: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u32,
    pub user_id: u32,
    pub title: String,
    pub completed: bool,
}
