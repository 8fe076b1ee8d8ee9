mod assets;
mod logout;
mod settings;

pub use assets::admin_js;
pub use logout::logout;
pub use settings::{refresh_lists, save_settings, settings_page};
