mod health_check;
mod helpers;
mod lists;
mod login;
mod postgres;
mod settings;
