mod credentials;
mod middleware;

pub use credentials::{compute_password_hash, validate_creds, AuthError, Credentials};
pub use middleware::{reject_logged_out_users, require_hook_token, AdminUser};
