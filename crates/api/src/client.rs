use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use hireloop_config::ApiConfig;
use hireloop_session::{SessionContext, StorageKey};

use crate::endpoints;
use crate::error::{ApiError, ApiResult};
use crate::models::*;

/// REST client for the backend. Cheap to clone.
///
/// Tokens are read from the session context on every call, so a sign-in or a
/// forced logout is visible to the next request without rebuilding the client.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionContext,
}

/// Which stored token authorises a request.
#[derive(Debug, Clone, Copy)]
enum Auth {
    None,
    Bearer(StorageKey),
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionContext) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("hireloop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http(http, &config.base_url, session)
    }

    pub fn with_http(http: Client, base_url: &str, session: SessionContext) -> ApiResult<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // ---- authentication -------------------------------------------------

    pub async fn sign_up(&self, request: &SignUpRequest) -> ApiResult<SignUpResponse> {
        self.call(Method::POST, endpoints::SIGN_UP, Auth::None, Some(request))
            .await
    }

    /// Verify the emailed code. Authorised by the interim sign-up token.
    pub async fn verify_otp(&self, otp: &str) -> ApiResult<MessageResponse> {
        let body = VerifyOtpRequest {
            otp: otp.to_string(),
        };
        self.call(
            Method::POST,
            endpoints::VERIFY_OTP,
            Auth::Bearer(StorageKey::SignupToken),
            Some(&body),
        )
        .await
    }

    pub async fn resend_otp(&self) -> ApiResult<MessageResponse> {
        self.call::<(), _>(
            Method::POST,
            endpoints::RESEND_OTP,
            Auth::Bearer(StorageKey::SignupToken),
            None,
        )
        .await
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> ApiResult<AuthResponse> {
        self.call(Method::POST, endpoints::SIGN_IN, Auth::None, Some(request))
            .await
    }

    pub async fn admin_sign_in(&self, request: &SignInRequest) -> ApiResult<AuthResponse> {
        self.call(Method::POST, endpoints::ADMIN_SIGN_IN, Auth::None, Some(request))
            .await
    }

    /// Persist an identity returned by the OAuth provider.
    pub async fn persist_oauth_identity(
        &self,
        identity: &OAuthIdentity,
    ) -> ApiResult<AuthResponse> {
        self.call(Method::POST, endpoints::OAUTH_IDENTITY, Auth::None, Some(identity))
            .await
    }

    // ---- profile --------------------------------------------------------

    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.call::<(), _>(Method::GET, endpoints::PROFILE, user(), None)
            .await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ApiResult<UserProfile> {
        self.call(Method::PUT, endpoints::PROFILE, user(), Some(request))
            .await
    }

    // ---- jobs -----------------------------------------------------------

    pub async fn jobs(&self, query: &JobQuery) -> ApiResult<Page<JobPost>> {
        let request = self.request(Method::GET, endpoints::JOBS, user())?.query(query);
        self.execute(request).await
    }

    pub async fn job(&self, id: &str) -> ApiResult<JobPost> {
        self.call::<(), _>(Method::GET, &endpoints::job(id), user(), None)
            .await
    }

    pub async fn apply_to_job(
        &self,
        job_id: &str,
        application: &JobApplicationRequest,
    ) -> ApiResult<JobApplication> {
        self.call(Method::POST, &endpoints::job_apply(job_id), user(), Some(application))
            .await
    }

    pub async fn recruiter_jobs(&self) -> ApiResult<Vec<JobPost>> {
        self.call::<(), _>(Method::GET, endpoints::RECRUITER_JOBS, user(), None)
            .await
    }

    pub async fn create_job(&self, post: &JobPostRequest) -> ApiResult<JobPost> {
        self.call(Method::POST, endpoints::RECRUITER_JOBS, user(), Some(post))
            .await
    }

    pub async fn update_job(&self, id: &str, post: &JobPostRequest) -> ApiResult<JobPost> {
        self.call(Method::PUT, &endpoints::recruiter_job(id), user(), Some(post))
            .await
    }

    pub async fn delete_job(&self, id: &str) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &endpoints::recruiter_job(id), user())
            .await
    }

    pub async fn job_applications(&self, job_id: &str) -> ApiResult<Vec<JobApplication>> {
        self.call::<(), _>(
            Method::GET,
            &endpoints::recruiter_job_applications(job_id),
            user(),
            None,
        )
        .await
    }

    // ---- subscription ---------------------------------------------------

    pub async fn subscription(&self) -> ApiResult<SubscriptionData> {
        self.call::<(), _>(Method::GET, endpoints::SUBSCRIPTION, user(), None)
            .await
    }

    pub async fn change_plan(&self, request: &ChangePlanRequest) -> ApiResult<SubscriptionData> {
        self.call(Method::POST, endpoints::SUBSCRIPTION_CHANGE, user(), Some(request))
            .await
    }

    pub async fn cancel_subscription(&self) -> ApiResult<SubscriptionData> {
        self.call::<(), _>(Method::POST, endpoints::SUBSCRIPTION_CANCEL, user(), None)
            .await
    }

    // ---- admin ----------------------------------------------------------

    pub async fn admin_users(&self, search: &str, page: u32) -> ApiResult<Page<AdminUserSummary>> {
        let mut request = self
            .request(Method::GET, endpoints::ADMIN_USERS, admin())?
            .query(&[("page", page.to_string())]);
        if !search.is_empty() {
            request = request.query(&[("search", search)]);
        }
        self.execute(request).await
    }

    pub async fn set_user_blocked(
        &self,
        user_id: &str,
        blocked: bool,
    ) -> ApiResult<AdminUserSummary> {
        let body = BlockUserRequest { blocked };
        self.call(
            Method::PATCH,
            &endpoints::admin_user_block(user_id),
            admin(),
            Some(&body),
        )
        .await
    }

    // ---- network --------------------------------------------------------

    pub async fn connections(&self) -> ApiResult<Vec<UserSummary>> {
        self.call::<(), _>(Method::GET, endpoints::CONNECTIONS, user(), None)
            .await
    }

    pub async fn connection_requests(&self) -> ApiResult<Vec<ConnectionRequest>> {
        self.call::<(), _>(Method::GET, endpoints::CONNECTION_REQUESTS, user(), None)
            .await
    }

    pub async fn send_connection_request(&self, receiver_id: &str) -> ApiResult<ConnectionRequest> {
        let body = NewConnectionRequest {
            receiver_id: receiver_id.to_string(),
        };
        self.call(Method::POST, endpoints::CONNECTION_REQUESTS, user(), Some(&body))
            .await
    }

    pub async fn accept_connection_request(&self, id: &str) -> ApiResult<ConnectionRequest> {
        self.call::<(), _>(
            Method::POST,
            &endpoints::connection_request_accept(id),
            user(),
            None,
        )
        .await
    }

    pub async fn reject_connection_request(&self, id: &str) -> ApiResult<ConnectionRequest> {
        self.call::<(), _>(
            Method::POST,
            &endpoints::connection_request_reject(id),
            user(),
            None,
        )
        .await
    }

    // ---- feed -----------------------------------------------------------

    pub async fn feed(&self) -> ApiResult<Vec<FeedPost>> {
        self.call::<(), _>(Method::GET, endpoints::POSTS, user(), None)
            .await
    }

    pub async fn create_post(&self, post: &CreatePostRequest) -> ApiResult<FeedPost> {
        self.call(Method::POST, endpoints::POSTS, user(), Some(post))
            .await
    }

    pub async fn like_post(&self, id: &str) -> ApiResult<FeedPost> {
        self.call::<(), _>(Method::POST, &endpoints::post_like(id), user(), None)
            .await
    }

    // ---- notifications & chat history ----------------------------------

    pub async fn notifications(&self) -> ApiResult<Vec<Notification>> {
        self.call::<(), _>(Method::GET, endpoints::NOTIFICATIONS, user(), None)
            .await
    }

    pub async fn mark_notification_read(&self, id: &str) -> ApiResult<()> {
        self.call_empty(Method::PATCH, &endpoints::notification_read(id), user())
            .await
    }

    pub async fn delete_notification(&self, id: &str) -> ApiResult<()> {
        self.call_empty(Method::DELETE, &endpoints::notification(id), user())
            .await
    }

    pub async fn chat_history(&self, room_id: &str) -> ApiResult<Vec<ChatMessage>> {
        self.call::<(), _>(Method::GET, &endpoints::chat_messages(room_id), user(), None)
            .await
    }

    // ---- plumbing -------------------------------------------------------

    fn request(&self, method: Method, path: &str, auth: Auth) -> ApiResult<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");

        let builder = self.http.request(method, url);
        match auth {
            Auth::None => Ok(builder),
            Auth::Bearer(key) => {
                let token = self
                    .session
                    .token(key)
                    .ok_or(ApiError::MissingToken(key.as_str()))?;
                Ok(builder.bearer_auth(token))
            }
        }
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        auth: Auth,
        body: Option<&B>,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(method, path, auth)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await
    }

    async fn call_empty(&self, method: Method, path: &str, auth: Auth) -> ApiResult<()> {
        let response = self.request(method, path, auth)?.send().await?;
        check_status(response).await.map(|_| ())
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        let body = check_status(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn user() -> Auth {
    Auth::Bearer(StorageKey::AccessToken)
}

fn admin() -> Auth {
    Auth::Bearer(StorageKey::AdminAccessToken)
}

/// Map non-success statuses onto [`ApiError`] and hand back the body otherwise.
async fn check_status(response: Response) -> ApiResult<Vec<u8>> {
    let status = response.status();
    let url = response.url().clone();
    let body = response.bytes().await?.to_vec();

    if status.is_success() {
        return Ok(body);
    }

    let message = server_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    warn!(%status, %url, %message, "api request failed");

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        Err(ApiError::Unauthorized(message))
    } else {
        Err(ApiError::Server { status, message })
    }
}

/// Business errors arrive as `{"message": ...}` or `{"error": ...}`.
fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|field| value.get(field).and_then(Value::as_str))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_prefers_message_field() {
        assert_eq!(
            server_message(br#"{"message":"Invalid OTP","error":"bad"}"#).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(
            server_message(br#"{"error":"Email taken"}"#).as_deref(),
            Some("Email taken")
        );
        assert!(server_message(b"<html>").is_none());
        assert!(server_message(br#"{"message":42}"#).is_none());
    }
}
