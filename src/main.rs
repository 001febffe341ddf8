use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};

use hashbot::config::{self, Config};
use hashbot::routes::{self, app_state::AppState};

fn session_key(config: &Config) -> Key {
    match config.session_key.as_deref().map(Key::try_from) {
        Some(Ok(key)) => key,
        Some(Err(e)) => {
            warn!("HASHBOT_SESSION_KEY unusable ({}); sessions will not survive a restart", e);
            Key::generate()
        }
        None => {
            warn!("HASHBOT_SESSION_KEY not set; sessions will not survive a restart");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    config::init_logging();

    let config = Config::from_env()?;
    let state = web::Data::new(AppState::from_config(&config));
    let key = session_key(&config);
    let secure_cookies = config.secure_cookies;

    info!("Starting server on http://{}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
            .service(Files::new("/static", "./static"))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("could not bind {}:{}", config.host, config.port))?
    .run()
    .await?;
    Ok(())
}
