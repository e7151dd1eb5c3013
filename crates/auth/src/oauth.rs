//! Google sign-in: authorization URL, code exchange and identity hand-off.

use anyhow::Context;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;
use tracing::{debug, info};

use hireloop_api::models::OAuthIdentity;
use hireloop_api::ApiClient;
use hireloop_config::GoogleAuthConfig;
use hireloop_session::{Route, Session};

use crate::error::{AuthError, AuthResult};
use crate::sign_in::landing_route;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Provider endpoints. Overridable so a local provider can stand in.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// A started authorization: send the user to `url`, keep `state` to check the
/// callback against.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub url: String,
    pub state: String,
}

#[derive(Clone)]
pub struct GoogleOAuth {
    client: BasicClient,
    http: reqwest::Client,
    userinfo_url: String,
}

impl GoogleOAuth {
    /// `Ok(None)` when the client id, secret or redirect uri is missing.
    pub fn from_config(config: &GoogleAuthConfig) -> AuthResult<Option<Self>> {
        let (Some(client_id), Some(client_secret), Some(redirect_uri)) = (
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_uri.clone(),
        ) else {
            return Ok(None);
        };

        Self::new(
            client_id,
            client_secret,
            &redirect_uri,
            ProviderEndpoints::default(),
        )
        .map(Some)
    }

    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: &str,
        endpoints: ProviderEndpoints,
    ) -> AuthResult<Self> {
        let client = BasicClient::new(
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
            AuthUrl::new(endpoints.auth_url).context("invalid google auth url")?,
            Some(TokenUrl::new(endpoints.token_url).context("invalid google token url")?),
        )
        .set_redirect_uri(
            RedirectUrl::new(redirect_uri.to_owned())
                .context("invalid redirect uri for google oauth")?,
        )
        .set_auth_type(oauth2::AuthType::RequestBody);

        let http = reqwest::Client::builder()
            .user_agent("hireloop-client")
            .build()
            .context("failed to build oauth http client")?;

        Ok(Self {
            client,
            http,
            userinfo_url: endpoints.userinfo_url,
        })
    }

    pub fn authorize(&self) -> PendingAuthorization {
        let (url, state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url();

        PendingAuthorization {
            url: url.to_string(),
            state: state.secret().clone(),
        }
    }

    /// Trade the callback code for the provider profile.
    pub async fn exchange(
        &self,
        pending: &PendingAuthorization,
        code: &str,
        returned_state: &str,
    ) -> AuthResult<OAuthIdentity> {
        if pending.state != returned_state {
            return Err(AuthError::StateMismatch);
        }

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .request_async(async_http_client)
            .await
            .context("failed to exchange google oauth code")?;

        let profile: GoogleProfile = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .context("failed to call google userinfo")?
            .error_for_status()
            .context("google userinfo returned error")?
            .json()
            .await
            .context("failed to decode google userinfo")?;

        debug!(email = %profile.email, "fetched google profile");

        Ok(OAuthIdentity {
            name: profile.name.unwrap_or_else(|| profile.email.clone()),
            email: profile.email,
            image: profile.picture,
        })
    }
}

#[derive(Deserialize)]
struct GoogleProfile {
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

/// Post the provider identity to the backend and start the session it returns.
pub async fn complete_oauth_sign_in(
    api: &ApiClient,
    session: &Session,
    identity: &OAuthIdentity,
) -> AuthResult<Route> {
    let response = api.persist_oauth_identity(identity).await?;
    let redirect = landing_route(response.user.role);
    info!(user = %response.user.id, "signed in with google");
    session.sign_in(response.user, &response.access_token)?;
    Ok(redirect)
}
