use tracing::{info, warn};

use hireloop_api::models::{AuthResponse, SignInRequest};
use hireloop_api::ApiClient;
use hireloop_session::{Role, Route, Session};

use crate::error::AuthResult;
use crate::flow::FlowState;
use crate::validation::SignInForm;

/// Which sign-in page the flow backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portal {
    User,
    Admin,
}

pub struct SignInFlow {
    api: ApiClient,
    session: Session,
    portal: Portal,
    state: FlowState,
}

impl SignInFlow {
    pub fn new(api: ApiClient, session: Session, portal: Portal) -> Self {
        Self {
            api,
            session,
            portal,
            state: FlowState::default(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Validate locally, then authenticate. Invalid forms never reach the network.
    pub async fn submit(&mut self, form: &SignInForm) -> &FlowState {
        if let Err(fields) = form.validate() {
            self.state = FlowState::Idle {
                error: None,
                fields,
            };
            return &self.state;
        }

        self.state = FlowState::Submitting;
        self.state = match self.authenticate(form).await {
            Ok(redirect) => FlowState::Completed { redirect },
            Err(err) => {
                warn!(error = %err, portal = ?self.portal, "sign in failed");
                FlowState::failed(&err)
            }
        };
        &self.state
    }

    async fn authenticate(&self, form: &SignInForm) -> AuthResult<Route> {
        let request = SignInRequest {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };

        let AuthResponse {
            access_token,
            mut user,
        } = match self.portal {
            Portal::User => self.api.sign_in(&request).await?,
            Portal::Admin => self.api.admin_sign_in(&request).await?,
        };
        if self.portal == Portal::Admin {
            user.role = Role::Admin;
        }

        let redirect = landing_route(user.role);
        info!(user = %user.id, role = ?user.role, "signed in");
        self.session.sign_in(user, &access_token)?;
        Ok(redirect)
    }
}

/// First page after sign-in for a role.
pub fn landing_route(role: Role) -> Route {
    match role {
        Role::User => Route::Home,
        Role::Recruiter => Route::RecruiterJobs,
        Role::Admin => Route::AdminDashboard,
    }
}

/// End the session and return the sign-in page to show.
pub fn sign_out(session: &Session) -> AuthResult<Route> {
    let previous = session.sign_out()?;
    Ok(match previous.map(|user| user.role) {
        Some(Role::Admin) => Route::AdminSignIn,
        _ => Route::SignIn,
    })
}
