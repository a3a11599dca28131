pub mod csrf;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod pending;
pub mod session;
pub mod totp;
pub mod validate;
