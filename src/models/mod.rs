pub mod attachment;
pub mod attendance;
pub mod meeting;
pub mod minutes;
pub mod read_model;
pub mod user;
