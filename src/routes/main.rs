use actix_identity::Identity;
use actix_session::Session;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::routes::redirect;
use tera::Tera;

use crate::domain::types::{ItemId, ItemKind};
use crate::forms::items::SearchQuery;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, record_visit, render_template};
use crate::services::ServiceError;
use crate::services::catalog::{
    download as download_service, search as search_service, show_home as show_home_service,
    show_item as show_item_service, show_items as show_items_service,
};
use crate::store::SharedStore;

/// Header set by the live search script to ask for the bare results fragment.
const FRAGMENT_HEADER: &str = "x-search-fragment";

fn parse_item_path(kind: &str, id: i32) -> Option<(ItemKind, ItemId)> {
    Some((ItemKind::try_from(kind).ok()?, ItemId::new(id).ok()?))
}

#[get("/")]
pub async fn index(
    identity: Option<Identity>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let visits = record_visit(&session);
    let home = show_home_service(store.get_ref(), server_config.latest_items);

    let mut context = base_context(&flash_messages, &identity, store.get_ref(), "home");
    context.insert("home", &home);
    context.insert("visits", &visits);
    context.insert("search_debounce_ms", &server_config.search_debounce_ms);
    render_template(&tera, "main/index.html", &context)
}

async fn show_listing(
    kind: ItemKind,
    identity: Option<Identity>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> HttpResponse {
    record_visit(&session);
    let items = show_items_service(store.get_ref(), kind);

    let mut context = base_context(&flash_messages, &identity, store.get_ref(), kind.table());
    context.insert("kind", kind.as_str());
    context.insert("kind_label", kind.label());
    context.insert("items", &items);
    render_template(&tera, "items/index.html", &context)
}

#[get("/mods")]
pub async fn show_mods(
    identity: Option<Identity>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    show_listing(ItemKind::Mod, identity, session, flash_messages, store, tera).await
}

#[get("/versions")]
pub async fn show_versions(
    identity: Option<Identity>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    show_listing(ItemKind::Version, identity, session, flash_messages, store, tera).await
}

#[get("/items/{kind}/{id}")]
pub async fn show_item(
    path: web::Path<(String, i32)>,
    identity: Option<Identity>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    let Some((kind, id)) = parse_item_path(&kind, id) else {
        return HttpResponse::NotFound().finish();
    };
    record_visit(&session);

    match show_item_service(repo.get_ref(), store.get_ref(), kind, id) {
        Ok(item) => {
            let mut context = base_context(&flash_messages, &identity, store.get_ref(), kind.table());
            context.insert("item", &item);
            render_template(&tera, "items/detail.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Item not found.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to show {kind} {id}: {err}");
            FlashMessage::error("Failed to load item details.").send();
            redirect("/")
        }
    }
}

#[get("/items/{kind}/{id}/download")]
pub async fn download_item(
    path: web::Path<(String, i32)>,
    repo: web::Data<DieselRepository>,
    store: web::Data<SharedStore>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    let Some((kind, id)) = parse_item_path(&kind, id) else {
        return HttpResponse::NotFound().finish();
    };

    match download_service(repo.get_ref(), store.get_ref(), kind, id) {
        Ok(link) => HttpResponse::Found()
            .insert_header((header::LOCATION, link.url))
            .finish(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Item not found.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to download {kind} {id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/search")]
pub async fn search(
    request: HttpRequest,
    query: web::Query<SearchQuery>,
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let results = search_service(store.get_ref(), &query.q, server_config.search_preview_limit);

    let mut context = base_context(&flash_messages, &identity, store.get_ref(), "search");
    context.insert("query", query.q.trim());
    context.insert("results", &results);

    if request.headers().contains_key(FRAGMENT_HEADER) {
        render_template(&tera, "search/results.html", &context)
    } else {
        context.insert("search_debounce_ms", &server_config.search_debounce_ms);
        render_template(&tera, "search/index.html", &context)
    }
}
