use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Bearer token `/me` accepts when the app is built with [`app`].
pub const DEFAULT_TOKEN: &str = "test-token";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u32,
    pub user_id: u32,
    pub title: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u32,
    pub post_id: u32,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u32,
    pub user_id: u32,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub user_id: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
    #[serde(rename = "userId")]
    pub user_id: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentFilter {
    #[serde(rename = "postId")]
    pub post_id: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TodoFilter {
    #[serde(rename = "userId")]
    pub user_id: Option<u32>,
}

#[derive(Debug, Default)]
pub struct Db {
    pub posts: Vec<Post>,
    pub users: Vec<User>,
    pub comments: Vec<Comment>,
    pub todos: Vec<Todo>,
}

impl Db {
    /// A small fixed dataset. Post 2 carries a timestamp without fractional
    /// seconds; the others have milliseconds.
    pub fn seeded() -> Self {
        let user = |id: u32, name: &str, username: &str| User {
            id,
            name: name.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
        };
        let post = |id: u32, user_id: u32, title: &str, created_at: &str| Post {
            id,
            user_id,
            title: title.to_string(),
            body: format!("body of post {id}"),
            created_at: created_at.to_string(),
        };
        let comment = |id: u32, post_id: u32| Comment {
            id,
            post_id,
            name: format!("comment {id}"),
            email: format!("reader{id}@example.com"),
            body: format!("comment {id} on post {post_id}"),
        };
        let todo = |id: u32, user_id: u32, title: &str, completed: bool| Todo {
            id,
            user_id,
            title: title.to_string(),
            completed,
        };

        Self {
            users: vec![
                user(1, "Leanne Graham", "bret"),
                user(2, "Ervin Howell", "antonette"),
                user(3, "Clementine Bauch", "samantha"),
            ],
            posts: vec![
                post(1, 1, "first post", "2024-12-01T14:45:30.123Z"),
                post(2, 1, "second post", "2024-06-15T10:30:00Z"),
                post(3, 1, "third post", "2025-01-02T08:00:00.500Z"),
                post(4, 2, "hello from ervin", "2025-02-03T09:15:00.000Z"),
                post(5, 2, "ervin again", "2025-03-04T10:20:30.999Z"),
            ],
            comments: vec![comment(1, 1), comment(2, 1), comment(3, 2), comment(4, 4)],
            todos: vec![
                todo(1, 1, "write the client", true),
                todo(2, 1, "write the tests", false),
                todo(3, 2, "review", false),
            ],
        }
    }

    fn next_post_id(&self) -> u32 {
        self.posts.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }
}

#[derive(Clone)]
pub struct AppState {
    db: Arc<RwLock<Db>>,
    token: Arc<str>,
}

type ErrorResponse = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: &str) -> ErrorResponse {
    (status, Json(json!({ "error": message })))
}

fn not_found() -> ErrorResponse {
    error(StatusCode::NOT_FOUND, "not found")
}

pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

/// Build the router with a custom bearer token for `/me`.
pub fn app_with_token(token: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Db::seeded())),
        token: Arc::from(token),
    };
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .put(replace_post)
                .patch(update_post)
                .delete(delete_post),
        )
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/comments", get(list_comments))
        .route("/todos", get(list_todos))
        .route("/me", get(me))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> Json<Vec<Post>> {
    let db = state.db.read().await;
    let posts = db
        .posts
        .iter()
        .filter(|p| filter.user_id.map_or(true, |id| p.user_id == id))
        .take(filter.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    Json(posts)
}

async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<NewPost>,
) -> (StatusCode, Json<Post>) {
    let mut db = state.db.write().await;
    let post = Post {
        id: db.next_post_id(),
        user_id: input.user_id,
        title: input.title,
        body: input.body,
        created_at: now(),
    };
    db.posts.push(post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Post>, ErrorResponse> {
    let db = state.db.read().await;
    db.posts
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn replace_post(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(input): Json<NewPost>,
) -> Result<Json<Post>, ErrorResponse> {
    let mut db = state.db.write().await;
    let post = db.posts.iter_mut().find(|p| p.id == id).ok_or_else(not_found)?;
    post.title = input.title;
    post.body = input.body;
    post.user_id = input.user_id;
    Ok(Json(post.clone()))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(input): Json<PostPatch>,
) -> Result<Json<Post>, ErrorResponse> {
    let mut db = state.db.write().await;
    let post = db.posts.iter_mut().find(|p| p.id == id).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(body) = input.body {
        post.body = body;
    }
    if let Some(user_id) = input.user_id {
        post.user_id = user_id;
    }
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ErrorResponse> {
    let mut db = state.db.write().await;
    let before = db.posts.len();
    db.posts.retain(|p| p.id != id);
    if db.posts.len() == before {
        return Err(not_found());
    }
    Ok(Json(json!({})))
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.db.read().await.users.clone())
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<User>, ErrorResponse> {
    let db = state.db.read().await;
    db.users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn list_comments(
    State(state): State<AppState>,
    Query(filter): Query<CommentFilter>,
) -> Json<Vec<Comment>> {
    let db = state.db.read().await;
    let comments = db
        .comments
        .iter()
        .filter(|c| filter.post_id.map_or(true, |id| c.post_id == id))
        .cloned()
        .collect();
    Json(comments)
}

async fn list_todos(
    State(state): State<AppState>,
    Query(filter): Query<TodoFilter>,
) -> Json<Vec<Todo>> {
    let db = state.db.read().await;
    let todos = db
        .todos
        .iter()
        .filter(|t| filter.user_id.map_or(true, |id| t.user_id == id))
        .cloned()
        .collect();
    Json(todos)
}

/// The signed-in user. Requires `Authorization: Bearer <token>`.
async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<User>, ErrorResponse> {
    let expected = format!("Bearer {}", state.token);
    let presented = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if presented != Some(expected.as_str()) {
        debug!(has_header = presented.is_some(), "rejecting /me request");
        return Err(error(StatusCode::UNAUTHORIZED, "unauthorized"));
    }
    let db = state.db.read().await;
    db.users.first().cloned().map(Json).ok_or_else(not_found)
}
