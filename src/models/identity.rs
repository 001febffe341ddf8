use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The signed-in user as far as this application cares: an id and a name to greet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
}

impl Identity {
    /// Builds an identity from an OpenID-style userinfo document.
    pub fn from_userinfo(userinfo: &Value) -> Option<Self> {
        let user_id = ["sub", "id"]
            .iter()
            .find_map(|key| match userinfo.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })?;

        let display_name = ["given_name", "preferred_username", "name"]
            .iter()
            .find_map(|key| {
                userinfo
                    .get(*key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(String::from)
            })
            .unwrap_or_else(|| "User".to_string());

        Some(Identity { user_id, display_name })
    }
}

/// What `/check_auth` reports to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<Option<&Identity>> for AuthStatus {
    fn from(identity: Option<&Identity>) -> Self {
        match identity {
            Some(identity) => AuthStatus {
                authenticated: true,
                user_id: Some(identity.user_id.clone()),
                name: Some(identity.display_name.clone()),
            },
            None => AuthStatus {
                authenticated: false,
                user_id: None,
                name: None,
            },
        }
    }
}
