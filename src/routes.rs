use std::path::Path;

use actix_web::middleware::from_fn;
use actix_web::web;

use crate::auth::middleware::{require_admin, require_login};
use crate::handlers::{account_handlers, admin_handlers, api, auth_handlers, main_handlers};

/// Register every route. Shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig, upload_dir: &Path) {
    cfg
        // Attachment files
        .service(actix_files::Files::new("/uploads", upload_dir))
        // Public pages
        .route("/", web::get().to(main_handlers::home))
        .route("/events/", web::get().to(main_handlers::events))
        .route("/event/{id}/", web::get().to(main_handlers::event_detail))
        .route("/login/", web::get().to(auth_handlers::login_page))
        .route("/login/", web::post().to(auth_handlers::login_submit))
        .route("/verify-2fa/", web::get().to(auth_handlers::verify_2fa_page))
        .route("/verify-2fa/", web::post().to(auth_handlers::verify_2fa_submit))
        .route("/sign-up/", web::get().to(auth_handlers::sign_up_page))
        .route("/sign-up/", web::post().to(auth_handlers::sign_up_submit))
        // Login required
        .service(
            web::resource("/event/check-in/{id}/")
                .wrap(from_fn(require_login))
                .route(web::post().to(main_handlers::check_in)),
        )
        .service(
            web::resource("/logout/")
                .wrap(from_fn(require_login))
                .route(web::post().to(auth_handlers::logout)),
        )
        .service(
            web::resource("/my-account/")
                .wrap(from_fn(require_login))
                .route(web::get().to(account_handlers::my_account)),
        )
        .service(
            web::resource("/update-account/")
                .wrap(from_fn(require_login))
                .route(web::post().to(account_handlers::update_account)),
        )
        .service(
            web::resource("/setup-2fa/")
                .wrap(from_fn(require_login))
                .route(web::get().to(account_handlers::setup_2fa)),
        )
        .service(
            web::resource("/verify-setup/")
                .wrap(from_fn(require_login))
                .route(web::post().to(account_handlers::verify_setup)),
        )
        .service(
            web::resource("/disable-2fa/")
                .wrap(from_fn(require_login))
                .route(web::post().to(account_handlers::disable_2fa)),
        )
        // JSON API
        .service(
            web::scope("/api/event")
                .route("/state/{id}/", web::get().to(api::state))
                .route("/attendees/{id}/", web::get().to(api::attendees))
                .route("/notes/{id}/", web::get().to(api::notes))
                .route("/attachments/{id}/", web::get().to(api::attachments)),
        )
        // Administrators
        .service(
            web::scope("/admin")
                .wrap(from_fn(require_admin))
                .route("/dashboard/{id}/", web::get().to(admin_handlers::dashboard))
                .route("/create/", web::post().to(admin_handlers::create))
                .route("/start/{id}/", web::post().to(admin_handlers::start))
                .route("/reset-code/{id}/", web::post().to(admin_handlers::reset_code))
                .route("/end/{id}/", web::post().to(admin_handlers::end))
                .route("/attendees/{id}/", web::post().to(admin_handlers::add_attendee))
                .route("/minutes/{id}/", web::post().to(admin_handlers::submit_minutes))
                .route("/minutes/{id}/{entry}/", web::post().to(admin_handlers::amend_minutes))
                .route("/attachments/{id}/", web::post().to(admin_handlers::record_attachment)),
        );
}
