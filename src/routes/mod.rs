use actix_identity::Identity;
use actix_session::Session;
use actix_web::{HttpResponse, web};
use actix_web_flash_messages::IncomingFlashMessages;
use chrono::Utc;
use pushkind_common::routes::alert_level_to_str;
use tera::{Context, Tera};

use crate::domain::stats::VisitStats;
use crate::store::{SharedStore, read_store};

pub mod admin;
pub mod main;

/// Identity id stored in the session cookie after a successful admin login.
pub const ADMIN_IDENTITY: &str = "admin";

const VISITS_KEY: &str = "visits";

/// Register every page handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(main::index)
        .service(main::show_mods)
        .service(main::show_versions)
        .service(main::download_item)
        .service(main::show_item)
        .service(main::search)
        .service(admin::show_login)
        .service(admin::login)
        .service(admin::logout)
        .service(admin::show_panel)
        .service(admin::show_stats)
        .service(admin::refresh)
        .service(admin::new_item)
        .service(admin::preview_item)
        .service(admin::save_item)
        .service(admin::edit_item)
        .service(admin::confirm_delete)
        .service(admin::delete_item);
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    HttpResponse::Ok().body(tera.render(template, context).unwrap_or_else(|e| {
        log::error!("Failed to render template '{template}': {e}");
        String::new()
    }))
}

pub fn is_admin(identity: &Option<Identity>) -> bool {
    identity
        .as_ref()
        .and_then(|id| id.id().ok())
        .is_some_and(|id| id == ADMIN_IDENTITY)
}

pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    identity: &Option<Identity>,
    store: &SharedStore,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("is_admin", &is_admin(identity));
    context.insert("data_source", &read_store(store).source());
    context.insert("current_page", current_page);
    context
}

/// Visit counters of the current browser.
pub fn load_visits(session: &Session) -> VisitStats {
    session
        .get::<VisitStats>(VISITS_KEY)
        .unwrap_or_else(|e| {
            log::warn!("Discarding unreadable visit counters: {e}");
            None
        })
        .unwrap_or_default()
}

/// Count one page load and persist the counters in the session.
pub fn record_visit(session: &Session) -> VisitStats {
    let mut visits = load_visits(session);
    visits.record_visit(Utc::now().date_naive());
    if let Err(e) = session.insert(VISITS_KEY, &visits) {
        log::warn!("Failed to store visit counters: {e}");
    }
    visits
}
