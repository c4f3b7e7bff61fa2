//! Profile endpoint.

use actix_web::HttpResponse;
use board_shared::dto::ProfileResponse;

use crate::middleware::profile::Caller;

/// GET /api/me
pub async fn me(caller: Caller) -> HttpResponse {
    let user = caller.board.identity().current_user().await;
    let is_admin = caller.board.moderation().is_admin().await;

    let mut response = HttpResponse::Ok();
    caller.remember(&mut response);
    response.json(ProfileResponse {
        user: user.into_inner(),
        is_admin,
    })
}
