use askama::Template;

use crate::models::meeting::{Meeting, MeetingStatus};
use crate::models::read_model::MeetingView;
use super::PageContext;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub ctx: PageContext,
    pub featured: Option<Meeting>,
    pub recent: Vec<Meeting>,
}

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub ctx: PageContext,
    pub meetings: Vec<Meeting>,
}

#[derive(Template)]
#[template(path = "event.html")]
pub struct EventTemplate {
    pub ctx: PageContext,
    pub view: MeetingView,
    pub checked_in: bool,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub view: MeetingView,
}

/// Shows a freshly issued join code once.
#[derive(Template)]
#[template(path = "admin/code.html")]
pub struct CodeTemplate {
    pub ctx: PageContext,
    pub meeting: Meeting,
    pub code: String,
}
