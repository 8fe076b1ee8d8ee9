pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod license_client;
pub mod list_directory;
pub mod madmimi_client;
pub mod nonce;
pub mod optin_gate;
pub mod routes;
pub mod session_state;
pub mod settings_controller;
pub mod settings_store;
pub mod startup;
pub mod telemetry;
pub mod utils;
