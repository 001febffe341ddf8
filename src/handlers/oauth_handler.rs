use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{error, info};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;
use serde_json::Value;

use crate::config::OAuthConfig;
use crate::error::IdentityError;
use crate::handlers::session_handler;
use crate::models::identity::{AuthStatus, Identity};
use crate::routes::app_state::AppState;

const SCOPES: [&str; 3] = ["openid", "profile", "email"];

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Constructs an OAuth2 client for the configured identity provider.
fn build_oauth_client(config: &OAuthConfig) -> Result<BasicClient, IdentityError> {
    let invalid = |e: url::ParseError| IdentityError::Provider(format!("invalid provider URL: {}", e));
    Ok(BasicClient::new(
        ClientId::new(config.client_id.clone()),
        Some(ClientSecret::new(config.client_secret.clone())),
        AuthUrl::new(config.auth_url.clone()).map_err(invalid)?,
        Some(TokenUrl::new(config.token_url.clone()).map_err(invalid)?),
    )
    .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone()).map_err(invalid)?))
}

fn oauth_config(data: &AppState) -> Result<&OAuthConfig, IdentityError> {
    data.oauth.as_ref().ok_or(IdentityError::NotConfigured)
}

/// Starts the sign-in flow by redirecting to the identity provider.
pub async fn oauth_login(data: web::Data<AppState>, session: Session) -> Result<HttpResponse, IdentityError> {
    let client = build_oauth_client(oauth_config(&data)?)?;
    let (auth_url, csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
        .url();
    session_handler::remember_oauth_state(&session, csrf_token.secret())?;

    Ok(HttpResponse::Found()
        .append_header(("Location", auth_url.to_string()))
        .finish())
}

/// Handles the provider's redirect: checks the CSRF state, exchanges the code,
/// looks the user up and stores their identity in the session.
pub async fn oauth_callback(
    data: web::Data<AppState>,
    session: Session,
    params: CallbackParams,
) -> Result<HttpResponse, IdentityError> {
    let config = oauth_config(&data)?;
    if let Some(reason) = params.error {
        return Err(IdentityError::InvalidCallback(reason));
    }
    let code = params
        .code
        .ok_or_else(|| IdentityError::InvalidCallback("missing code".to_string()))?;
    let expected = session_handler::take_oauth_state(&session);
    if expected.is_none() || expected != params.state {
        return Err(IdentityError::InvalidCallback("state mismatch".to_string()));
    }

    let client = build_oauth_client(config)?;
    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(async_http_client)
        .await
        .map_err(|e| {
            error!("Token exchange error: {:?}", e);
            IdentityError::Provider(e.to_string())
        })?;

    let userinfo = fetch_userinfo(&config.userinfo_url, token.access_token().secret()).await?;
    let identity = Identity::from_userinfo(&userinfo)
        .ok_or_else(|| IdentityError::Provider("userinfo has no subject".to_string()))?;
    session_handler::sign_in(&session, &identity)?;

    Ok(HttpResponse::Found().append_header(("Location", "/")).finish())
}

async fn fetch_userinfo(url: &str, access_token: &str) -> Result<Value, IdentityError> {
    info!("Fetching userinfo");
    let provider_error = |e: reqwest::Error| IdentityError::Provider(e.to_string());
    reqwest::Client::new()
        .get(url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(provider_error)?
        .error_for_status()
        .map_err(provider_error)?
        .json::<Value>()
        .await
        .map_err(provider_error)
}

/// Reports whether the browser's session is signed in, and as whom.
pub fn check_auth(session: &Session) -> HttpResponse {
    let identity = session_handler::current_identity(session);
    HttpResponse::Ok().json(AuthStatus::from(identity.as_ref()))
}

pub fn logout(session: &Session) -> HttpResponse {
    session_handler::sign_out(session);
    HttpResponse::Found().append_header(("Location", "/")).finish()
}
