//! Backend paths, relative to the configured base URL.

pub const SIGN_UP: &str = "/auth/signup";
pub const VERIFY_OTP: &str = "/auth/verify-otp";
pub const RESEND_OTP: &str = "/auth/resend-otp";
pub const SIGN_IN: &str = "/auth/signin";
pub const OAUTH_IDENTITY: &str = "/auth/google";
pub const ADMIN_SIGN_IN: &str = "/admin/signin";

pub const PROFILE: &str = "/user/profile";

pub const JOBS: &str = "/jobs";
pub const RECRUITER_JOBS: &str = "/recruiter/jobs";

pub const SUBSCRIPTION: &str = "/subscription";
pub const SUBSCRIPTION_CHANGE: &str = "/subscription/change";
pub const SUBSCRIPTION_CANCEL: &str = "/subscription/cancel";

pub const ADMIN_USERS: &str = "/admin/users";

pub const CONNECTIONS: &str = "/network/connections";
pub const CONNECTION_REQUESTS: &str = "/network/requests";

pub const POSTS: &str = "/posts";
pub const NOTIFICATIONS: &str = "/notifications";
pub const CHAT: &str = "/chat";

pub fn job(id: &str) -> String {
    format!("{JOBS}/{id}")
}

pub fn job_apply(id: &str) -> String {
    format!("{JOBS}/{id}/apply")
}

pub fn recruiter_job(id: &str) -> String {
    format!("{RECRUITER_JOBS}/{id}")
}

pub fn recruiter_job_applications(id: &str) -> String {
    format!("{RECRUITER_JOBS}/{id}/applications")
}

pub fn admin_user_block(id: &str) -> String {
    format!("{ADMIN_USERS}/{id}/block")
}

pub fn connection_request_accept(id: &str) -> String {
    format!("{CONNECTION_REQUESTS}/{id}/accept")
}

pub fn connection_request_reject(id: &str) -> String {
    format!("{CONNECTION_REQUESTS}/{id}/reject")
}

pub fn post_like(id: &str) -> String {
    format!("{POSTS}/{id}/like")
}

pub fn notification(id: &str) -> String {
    format!("{NOTIFICATIONS}/{id}")
}

pub fn notification_read(id: &str) -> String {
    format!("{NOTIFICATIONS}/{id}/read")
}

pub fn chat_messages(room_id: &str) -> String {
    format!("{CHAT}/{room_id}/messages")
}
