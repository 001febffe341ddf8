use actix_session::Session;
use actix_web::{get, web, HttpResponse, Responder};

use crate::error::IdentityError;
use crate::handlers::oauth_handler::{self, CallbackParams};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(check_auth)
        .service(oauth_login)
        .service(oauth_callback)
        .service(logout);
}

#[get("/check_auth")]
async fn check_auth(session: Session) -> impl Responder {
    oauth_handler::check_auth(&session)
}

#[get("/oauth/login")]
async fn oauth_login(data: web::Data<AppState>, session: Session) -> Result<HttpResponse, IdentityError> {
    oauth_handler::oauth_login(data, session).await
}

#[get("/oauth/callback")]
async fn oauth_callback(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<CallbackParams>,
) -> Result<HttpResponse, IdentityError> {
    oauth_handler::oauth_callback(data, session, query.into_inner()).await
}

#[get("/logout")]
async fn logout(session: Session) -> impl Responder {
    oauth_handler::logout(&session)
}
