mod get;
mod lists;
mod post;

pub use get::settings_page;
pub use lists::refresh_lists;
pub use post::save_settings;
