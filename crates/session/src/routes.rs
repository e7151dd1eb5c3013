//! Protected-route gating.
//!
//! The guard only checks that a token is present. It never validates it and
//! grants no security boundary: the backend authorises every request.

use tracing::debug;

use crate::storage::{SessionStorage, StorageKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    SignIn,
    SignUp,
    VerifyOtp,
    Home,
    Profile,
    Feed,
    Jobs,
    RecruiterJobs,
    Messages,
    Network,
    Notifications,
    Subscription,
    AdminSignIn,
    AdminDashboard,
    AdminUsers,
}

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public,
    User,
    Admin,
    /// Between sign-up and OTP verification.
    PendingSignup,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::SignIn => "/signin",
            Route::SignUp => "/signup",
            Route::VerifyOtp => "/otp",
            Route::Home => "/home",
            Route::Profile => "/profile",
            Route::Feed => "/feed",
            Route::Jobs => "/jobs",
            Route::RecruiterJobs => "/recruiter/jobs",
            Route::Messages => "/messages",
            Route::Network => "/network",
            Route::Notifications => "/notifications",
            Route::Subscription => "/subscription",
            Route::AdminSignIn => "/admin/signin",
            Route::AdminDashboard => "/admin/dashboard",
            Route::AdminUsers => "/admin/users",
        }
    }

    pub fn audience(self) -> Audience {
        match self {
            Route::Landing | Route::SignIn | Route::SignUp | Route::AdminSignIn => {
                Audience::Public
            }
            Route::VerifyOtp => Audience::PendingSignup,
            Route::AdminDashboard | Route::AdminUsers => Audience::Admin,
            _ => Audience::User,
        }
    }
}

impl Audience {
    fn required_key(self) -> Option<StorageKey> {
        match self {
            Audience::Public => None,
            Audience::User => Some(StorageKey::AccessToken),
            Audience::Admin => Some(StorageKey::AdminAccessToken),
            Audience::PendingSignup => Some(StorageKey::SignupToken),
        }
    }

    /// Where to send a visitor without the required token.
    pub fn entry_route(self) -> Route {
        match self {
            Audience::Public | Audience::User => Route::SignIn,
            Audience::Admin => Route::AdminSignIn,
            Audience::PendingSignup => Route::SignUp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Render,
    Redirect(Route),
}

pub fn gate(route: Route, storage: &dyn SessionStorage) -> Gate {
    let audience = route.audience();
    match audience.required_key() {
        Some(key) if !storage.contains(key) => {
            let target = audience.entry_route();
            debug!(route = route.path(), redirect = target.path(), "route gated");
            Gate::Redirect(target)
        }
        _ => Gate::Render,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Guarded<T> {
    Rendered(T),
    Redirected(Route),
}

/// Produce gated content only when the gate opens. `render` is never called
/// on redirect.
pub fn guard<T>(
    route: Route,
    storage: &dyn SessionStorage,
    render: impl FnOnce() -> T,
) -> Guarded<T> {
    match gate(route, storage) {
        Gate::Render => Guarded::Rendered(render()),
        Gate::Redirect(target) => Guarded::Redirected(target),
    }
}
