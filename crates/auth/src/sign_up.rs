use tracing::{info, warn};

use hireloop_api::models::SignUpRequest;
use hireloop_api::ApiClient;
use hireloop_session::{Route, Session};

use crate::error::AuthResult;
use crate::flow::FlowState;
use crate::validation::SignUpForm;

pub struct SignUpFlow {
    api: ApiClient,
    session: Session,
    state: FlowState,
}

impl SignUpFlow {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            state: FlowState::default(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// On success the interim sign-up token is stored and the flow points at
    /// the OTP page.
    pub async fn submit(&mut self, form: &SignUpForm) -> &FlowState {
        if let Err(fields) = form.validate() {
            self.state = FlowState::Idle {
                error: None,
                fields,
            };
            return &self.state;
        }

        self.state = FlowState::Submitting;
        self.state = match self.register(form).await {
            Ok(()) => FlowState::Completed {
                redirect: Route::VerifyOtp,
            },
            Err(err) => {
                warn!(error = %err, "sign up failed");
                FlowState::failed(&err)
            }
        };
        &self.state
    }

    async fn register(&self, form: &SignUpForm) -> AuthResult<()> {
        let response = self
            .api
            .sign_up(&SignUpRequest {
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                password: form.password.clone(),
            })
            .await?;

        self.session.store_signup_token(&response.token)?;
        info!(email = %form.email.trim(), "sign up accepted, awaiting otp");
        Ok(())
    }
}
