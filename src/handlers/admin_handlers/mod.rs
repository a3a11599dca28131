/// Administrator handlers, mounted under `/admin` behind the admin guard.
///
/// - `dashboard.rs`: GET meeting dashboard, POST create
/// - `lifecycle.rs`: POST start, reset-code, end
/// - `ledger.rs`: POST manual attendee add, minutes, attachments
/// - `forms.rs`: form structures and the shared JSON reply shape
///
/// Every handler receives the `AdminUser` placed in request extensions by
/// `auth::middleware::require_admin`.

pub mod dashboard;
pub mod forms;
pub mod ledger;
pub mod lifecycle;

pub use dashboard::{create, dashboard};
pub use ledger::{add_attendee, amend_minutes, record_attachment, submit_minutes};
pub use lifecycle::{end, reset_code, start};
