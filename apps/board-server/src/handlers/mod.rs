//! HTTP handlers and route configuration.

mod health;
mod posts;
mod profile;
mod replies;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/me", web::get().to(profile::me))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/replies", web::get().to(replies::list_replies))
                    .route("/{id}/replies", web::post().to(replies::add_reply))
                    .route(
                        "/{id}/replies/{reply_id}",
                        web::delete().to(replies::delete_reply),
                    ),
            ),
    );
}
