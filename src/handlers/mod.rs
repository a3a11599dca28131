pub mod account_handlers;
pub mod admin_handlers;
pub mod api;
pub mod auth_handlers;
pub mod main_handlers;
