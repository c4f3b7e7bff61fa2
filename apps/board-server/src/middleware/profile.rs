//! Caller profile extractor.
//!
//! A caller names its profile with the `X-Profile-Id` header or the
//! `profile_id` cookie. Callers without a valid one get a fresh profile,
//! and handlers hand its id back as a cookie.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, HttpResponseBuilder, dev::Payload, web};
use futures::future::LocalBoxFuture;

use board_core::board::NormalizedBoard;
use board_core::domain::ProfileId;

use crate::middleware::error::AppError;
use crate::state::AppState;

pub const PROFILE_HEADER: &str = "X-Profile-Id";
pub const PROFILE_COOKIE: &str = "profile_id";

/// The calling profile and the board as it sees it.
pub struct Caller {
    pub profile: ProfileId,
    pub board: NormalizedBoard,
    issued: bool,
}

impl Caller {
    /// Attach the profile cookie if this request was given a new profile.
    pub fn remember(&self, response: &mut HttpResponseBuilder) {
        if self.issued {
            let cookie = Cookie::build(PROFILE_COOKIE, self.profile.as_str().to_string())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .permanent()
                .finish();
            response.cookie(cookie);
        }
    }
}

/// Profile named by the request, if it names a valid one.
fn requested_profile(req: &HttpRequest) -> Option<ProfileId> {
    let from_header = req
        .headers()
        .get(PROFILE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(ProfileId::parse);

    from_header.or_else(|| {
        req.cookie(PROFILE_COOKIE)
            .and_then(|c| ProfileId::parse(c.value()))
    })
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let requested = requested_profile(req);

        Box::pin(async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(AppError::Internal("Server configuration error".to_string()));
            };

            let (profile, issued) = match requested {
                Some(profile) => (profile, false),
                None => {
                    let profile = ProfileId::generate(&mut rand::thread_rng());
                    tracing::debug!(profile = %profile, "Issued new profile");
                    (profile, true)
                }
            };

            let board = state
                .board_for(&profile)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

            Ok(Caller {
                profile,
                board,
                issued,
            })
        })
    }
}
