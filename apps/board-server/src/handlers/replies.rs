//! Reply handlers.

use actix_web::{HttpResponse, web};

use board_core::board::Deletion;
use board_core::domain::Reply;
use board_shared::dto::{CreateReplyRequest, CreatedResponse, ReplyResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::profile::Caller;

fn reply_response(reply: Reply) -> ReplyResponse {
    ReplyResponse {
        id: reply.id,
        post_id: reply.post_id,
        text: reply.text,
        user: reply.user,
        timestamp: reply.timestamp.to_rfc3339(),
    }
}

/// GET /api/posts/{id}/replies
pub async fn list_replies(caller: Caller, path: web::Path<String>) -> HttpResponse {
    let replies: Vec<ReplyResponse> = caller
        .board
        .load_replies(&path.into_inner())
        .await
        .into_iter()
        .map(reply_response)
        .collect();

    let mut response = HttpResponse::Ok();
    caller.remember(&mut response);
    response.json(replies)
}

/// POST /api/posts/{id}/replies
pub async fn add_reply(
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<CreateReplyRequest>,
) -> AppResult<HttpResponse> {
    let id = caller
        .board
        .add_reply(&path.into_inner(), &body.into_inner().text)
        .await?;

    let mut response = HttpResponse::Created();
    caller.remember(&mut response);
    Ok(response.json(CreatedResponse { id }))
}

/// DELETE /api/posts/{post_id}/replies/{reply_id} - requires the moderation flag
pub async fn delete_reply(
    caller: Caller,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (post_id, reply_id) = path.into_inner();
    match caller.board.delete_reply(&reply_id, &post_id).await? {
        Deletion::Deleted => Ok(HttpResponse::NoContent().finish()),
        Deletion::NotPermitted => Err(AppError::Forbidden),
    }
}
