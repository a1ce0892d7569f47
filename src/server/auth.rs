//! Request authentication.
//!
//! Every API request is resolved to a [`Principal`] before it reaches a
//! handler. Credentials are HTTP Basic (user name plus application password,
//! checked against a bcrypt hash) or a Bearer API key. Requests without
//! credentials act as the anonymous principal; presenting bad credentials is
//! an error. With auth disabled every request acts as an administrator.

use crate::auth::Principal;
use crate::config::AuthConfig;
use crate::server::error::AppError;
use crate::server::AppContext;
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::{
    headers::{
        authorization::{Basic, Bearer},
        Authorization,
    },
    typed_header::TypedHeader,
};
use videometa_common::{Error, Result};

const LOCAL_ADMIN: &str = "admin";

fn verify_password(password: &str, hash: &str) -> bool {
    if bcrypt::verify(password, hash).unwrap_or(false) {
        return true;
    }
    // Application passwords are often pasted with display spaces.
    let compact: String = password.split_whitespace().collect();
    compact != password && bcrypt::verify(&compact, hash).unwrap_or(false)
}

/// Resolve the acting principal from the presented credentials.
pub fn authenticate(
    auth_config: &AuthConfig,
    basic: Option<(&str, &str)>,
    bearer_token: Option<&str>,
) -> Result<Principal> {
    if !auth_config.enabled {
        return Ok(Principal::administrator(LOCAL_ADMIN));
    }

    if let Some(token) = bearer_token {
        return auth_config
            .find_by_api_key(token)
            .map(|user| user.principal())
            .ok_or(Error::Unauthorized);
    }

    if let Some((username, password)) = basic {
        let user = auth_config.find_user(username).ok_or(Error::Unauthorized)?;
        let hash = user.password_hash.as_deref().ok_or(Error::Unauthorized)?;
        if verify_password(password, hash) {
            return Ok(user.principal());
        }
        tracing::warn!(user = username, "Rejected Basic credentials");
        return Err(Error::Unauthorized);
    }

    Ok(Principal::anonymous())
}

/// Middleware attaching the request's [`Principal`] as an extension.
pub async fn principal_middleware(
    State(ctx): State<AppContext>,
    basic: Option<TypedHeader<Authorization<Basic>>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let basic = basic
        .as_ref()
        .map(|b| (b.username(), b.password()));
    let bearer_token = bearer.as_ref().map(|b| b.token());

    let principal = authenticate(&ctx.config.auth, basic, bearer_token)
        .map_err(|e| AppError::new(e).with_code("rest_authentication_failed"))?;

    tracing::trace!(user = principal.name().unwrap_or("-"), "Resolved principal");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Generate a bcrypt password hash
pub fn hash_password(password: &str) -> std::result::Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Generate a random API key
pub fn generate_api_key() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Capability;
    use crate::config::UserConfig;

    fn config() -> AuthConfig {
        AuthConfig {
            enabled: true,
            users: vec![
                UserConfig {
                    name: "publisher".into(),
                    password_hash: Some(bcrypt::hash("abcd efgh ijkl", 4).unwrap()),
                    api_key: Some("secret-key".into()),
                    capabilities: vec![Capability::Read, Capability::EditPosts],
                },
                UserConfig {
                    name: "reader".into(),
                    password_hash: None,
                    api_key: Some("reader-key".into()),
                    capabilities: vec![Capability::Read],
                },
            ],
        }
    }

    #[test]
    fn disabled_auth_is_admin() {
        let principal = authenticate(&AuthConfig::default(), None, None).unwrap();
        assert!(principal.has(Capability::ManageOptions));
    }

    #[test]
    fn no_credentials_is_anonymous() {
        let principal = authenticate(&config(), None, None).unwrap();
        assert!(!principal.is_authenticated());
    }

    #[test]
    fn bearer_maps_to_user() {
        let principal = authenticate(&config(), None, Some("reader-key")).unwrap();
        assert_eq!(principal.name(), Some("reader"));
        assert!(!principal.has(Capability::EditPosts));

        assert!(matches!(
            authenticate(&config(), None, Some("wrong")),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn basic_checks_password_hash() {
        let principal =
            authenticate(&config(), Some(("publisher", "abcd efgh ijkl")), None).unwrap();
        assert!(principal.has(Capability::EditPosts));

        let compact = authenticate(&config(), Some(("publisher", "abcdefghijkl")), None);
        assert!(compact.is_err());

        assert!(authenticate(&config(), Some(("publisher", "nope")), None).is_err());
        assert!(authenticate(&config(), Some(("reader", "anything")), None).is_err());
        assert!(authenticate(&config(), Some(("nobody", "x")), None).is_err());
    }

    #[test]
    fn display_spaces_are_ignored() {
        let mut config = config();
        config.users[0].password_hash = Some(bcrypt::hash("abcdefghijkl", 4).unwrap());
        let principal =
            authenticate(&config, Some(("publisher", "abcd efgh ijkl")), None).unwrap();
        assert_eq!(principal.name(), Some("publisher"));
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password").unwrap();
        assert!(bcrypt::verify("test_password", &hash).unwrap());
    }

    #[test]
    fn test_generate_api_key() {
        let key1 = generate_api_key();
        let key2 = generate_api_key();
        assert_ne!(key1, key2);
        assert_eq!(key1.len(), 43);
    }
}
