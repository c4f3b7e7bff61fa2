//! Post handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use board_core::board::Deletion;
use board_core::domain::{Post, SortOrder};
use board_shared::dto::{CreatePostRequest, CreatedResponse, PostResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::profile::Caller;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub sort: Option<String>,
}

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        question: post.question,
        answer: post.answer,
        user: post.user,
        timestamp: post.timestamp.to_rfc3339(),
        reply_count: post.reply_count,
    }
}

/// GET /api/posts?sort=newest|most|random
pub async fn list_posts(caller: Caller, query: web::Query<ListPostsQuery>) -> HttpResponse {
    let sort = query
        .sort
        .as_deref()
        .map(|s| s.parse::<SortOrder>().unwrap_or_default())
        .unwrap_or_default();

    let posts: Vec<PostResponse> = caller
        .board
        .load_posts(sort)
        .await
        .into_iter()
        .map(post_response)
        .collect();

    let mut response = HttpResponse::Ok();
    caller.remember(&mut response);
    response.json(posts)
}

/// POST /api/posts
pub async fn create_post(
    caller: Caller,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let id = caller.board.create_post(&req.question, &req.answer).await?;

    let mut response = HttpResponse::Created();
    caller.remember(&mut response);
    Ok(response.json(CreatedResponse { id }))
}

/// GET /api/posts/{id}
pub async fn get_post(caller: Caller, path: web::Path<String>) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = caller
        .board
        .load_post_by_id(&post_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    let mut response = HttpResponse::Ok();
    caller.remember(&mut response);
    Ok(response.json(post_response(post)))
}

/// DELETE /api/posts/{id} - requires the moderation flag
pub async fn delete_post(caller: Caller, path: web::Path<String>) -> AppResult<HttpResponse> {
    match caller.board.delete_post(&path.into_inner()).await? {
        Deletion::Deleted => Ok(HttpResponse::NoContent().finish()),
        Deletion::NotPermitted => Err(AppError::Forbidden),
    }
}
