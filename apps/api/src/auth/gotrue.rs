//! GoTrue-compatible auth client (the Supabase auth API).

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthError, AuthProvider, OAuthProvider};
use crate::config::AuthConfig;
use crate::models::Identity;

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error_description", alias = "message")]
    msg: String,
}

pub struct GoTrueAuth {
    client: Client,
    base_url: String,
    anon_key: String,
    /// OAuth redirect target.
    site_url: String,
    access_token: RwLock<Option<String>>,
    identity: watch::Sender<Option<Identity>>,
}

impl GoTrueAuth {
    pub fn new(config: &AuthConfig, site_url: &str) -> Result<Self, AuthError> {
        let (identity, _) = watch::channel(None);
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            site_url: site_url.trim_end_matches('/').to_string(),
            access_token: RwLock::new(None),
            identity,
        })
    }

    /// Adopts a session token (e.g. from the OAuth redirect), resolves its
    /// user and notifies subscribers.
    pub async fn set_access_token(&self, token: String) -> Result<Option<Identity>, AuthError> {
        self.store_token(Some(token));
        let identity = self.current_identity().await?;
        if let Some(identity) = &identity {
            info!("Signed in as {}", identity.id);
        }
        self.identity.send_replace(identity.clone());
        Ok(identity)
    }

    fn token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    async fn api_error(response: reqwest::Response) -> AuthError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.msg)
            .unwrap_or(body);
        AuthError::Api { status, message }
    }
}

#[async_trait]
impl AuthProvider for GoTrueAuth {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Stored session is no longer valid; continuing signed out");
                Ok(None)
            }
            status if status.is_success() => {
                let user: UserResponse = response.json().await?;
                Ok(Some(Identity {
                    id: user.id,
                    email: user.email,
                }))
            }
            _ => Err(Self::api_error(response).await),
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    fn sign_in_url(&self, provider: OAuthProvider) -> Result<String, AuthError> {
        let redirect_to = format!("{}/", self.site_url);
        let url = Url::parse_with_params(
            &format!("{}/auth/v1/authorize", self.base_url),
            &[
                ("provider", provider.as_str()),
                ("redirect_to", redirect_to.as_str()),
            ],
        )
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))?;
        Ok(url.to_string())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.token();
        // Local session ends regardless of what the provider says.
        self.store_token(None);
        self.identity.send_replace(None);

        let Some(token) = token else {
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        if response.status().is_success() {
            info!("Signed out");
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_auth(url: &str) -> GoTrueAuth {
        let config = AuthConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
        };
        GoTrueAuth::new(&config, "https://tailor.example.com/").unwrap()
    }

    #[test]
    fn test_sign_in_url_carries_provider_and_redirect() {
        let auth = make_auth("https://project.supabase.co/");
        let url = auth.sign_in_url(OAuthProvider::Github).unwrap();
        assert!(url.starts_with("https://project.supabase.co/auth/v1/authorize?"));
        assert!(url.contains("provider=github"));
        assert!(url.contains("redirect_to=https%3A%2F%2Ftailor.example.com%2F"));
    }

    #[tokio::test]
    async fn test_no_token_means_signed_out_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let auth = make_auth(&server.uri());
        assert_eq!(auth.current_identity().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_access_token_resolves_and_publishes_identity() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": user_id, "email": "dev@example.com" })),
            )
            .mount(&server)
            .await;

        let auth = make_auth(&server.uri());
        let mut rx = auth.subscribe();
        let identity = auth.set_access_token("tok".to_string()).await.unwrap();

        assert_eq!(identity.as_ref().map(|i| i.id), Some(user_id));
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|i| i.email.clone()),
            Some(Some("dev@example.com".to_string()))
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_signed_out_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "expired" })))
            .mount(&server)
            .await;

        let auth = make_auth(&server.uri());
        assert_eq!(auth.set_access_token("old".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_and_notifies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": Uuid::new_v4() })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let auth = make_auth(&server.uri());
        auth.set_access_token("tok".into()).await.unwrap();
        let mut rx = auth.subscribe();

        auth.sign_out().await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), None);
        assert_eq!(auth.current_identity().await.unwrap(), None);
    }
}
