use actix_session::Session;
use log::{info, warn};

use crate::error::IdentityError;
use crate::models::identity::Identity;

const IDENTITY_KEY: &str = "identity";
const OAUTH_STATE_KEY: &str = "oauth_state";

/// The signed-in identity carried by the cookie session, if any.
pub fn current_identity(session: &Session) -> Option<Identity> {
    match session.get::<Identity>(IDENTITY_KEY) {
        Ok(identity) => identity,
        Err(e) => {
            warn!("Discarding unreadable identity in session: {:?}", e);
            session.remove(IDENTITY_KEY);
            None
        }
    }
}

pub fn sign_in(session: &Session, identity: &Identity) -> Result<(), IdentityError> {
    // A new session id on every sign-in.
    session.renew();
    session
        .insert(IDENTITY_KEY, identity)
        .map_err(|e| IdentityError::Session(e.to_string()))?;
    info!("Signed in user {}", identity.user_id);
    Ok(())
}

pub fn sign_out(session: &Session) {
    if let Some(identity) = current_identity(session) {
        info!("Signing out user {}", identity.user_id);
    }
    session.purge();
}

pub fn remember_oauth_state(session: &Session, state: &str) -> Result<(), IdentityError> {
    session
        .insert(OAUTH_STATE_KEY, state)
        .map_err(|e| IdentityError::Session(e.to_string()))
}

/// Consumes the pending CSRF state; it is only good for one callback.
pub fn take_oauth_state(session: &Session) -> Option<String> {
    session.remove_as::<String>(OAUTH_STATE_KEY).and_then(Result::ok)
}
