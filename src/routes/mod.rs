mod admin;
mod healthcheck;
mod helpers;
mod hooks;
mod login;

pub use admin::*;
pub use healthcheck::*;
pub use hooks::*;
pub use login::*;
