use actix_identity::Identity;
use actix_session::Session;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::routes::redirect;
use tera::{Context, Tera};

use crate::forms::items::{
    AdminFilterQuery, DeleteItemForm, DeleteItemFormPayload, ItemForm, ItemFormState, LoginForm,
    LoginFormPayload, NewItemQuery,
};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{ADMIN_IDENTITY, base_context, is_admin, load_visits, render_template};
use crate::services::ServiceError;
use crate::services::admin::{
    confirm_delete as confirm_delete_service, delete_item as delete_item_service,
    edit_form as edit_form_service, login as login_service, preview_item as preview_item_service,
    refresh as refresh_service, show_form as show_form_service, show_panel as show_panel_service,
    show_stats as show_stats_service, submit_item as submit_item_service,
};
use crate::store::{MutationGuard, SharedStore};

const LOGIN_PAGE: &str = "/admin/login";
const PANEL_PAGE: &str = "/admin";
const DEMO_READ_ONLY: &str = "Demo data cannot be changed. Refresh once the database is back.";

fn render_login(tera: &Tera, mut context: Context, error: Option<&str>) -> HttpResponse {
    context.insert("login_error", &error);
    render_template(tera, "admin/login.html", &context)
}

#[get("/admin/login")]
pub async fn show_login(
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    if is_admin(&identity) {
        return redirect(PANEL_PAGE);
    }
    let context = base_context(&flash_messages, &identity, store.get_ref(), "admin");
    render_login(&tera, context, None)
}

#[post("/admin/login")]
pub async fn login(
    request: HttpRequest,
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let context = base_context(&flash_messages, &identity, store.get_ref(), "admin");

    let payload: LoginFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(_) => return render_login(&tera, context, Some("Wrong password!")),
    };

    match login_service(&payload, &server_config.admin_password) {
        Ok(()) => match Identity::login(&request.extensions(), ADMIN_IDENTITY.to_string()) {
            Ok(_) => {
                FlashMessage::success("Logged in successfully!").send();
                redirect(PANEL_PAGE)
            }
            Err(e) => {
                log::error!("Failed to start admin session: {e}");
                HttpResponse::InternalServerError().finish()
            }
        },
        Err(_) => render_login(&tera, context, Some("Wrong password!")),
    }
}

#[post("/admin/logout")]
pub async fn logout(identity: Option<Identity>) -> impl Responder {
    if let Some(identity) = identity {
        identity.logout();
    }
    FlashMessage::success("Logged out.").send();
    redirect(LOGIN_PAGE)
}

#[get("/admin")]
pub async fn show_panel(
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    query: web::Query<AdminFilterQuery>,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_panel_service(is_admin(&identity), store.get_ref(), &query.mods_q, &query.versions_q) {
        Ok(panel) => {
            let mut context = base_context(&flash_messages, &identity, store.get_ref(), "admin");
            context.insert("panel", &panel);
            render_template(&tera, "admin/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect(LOGIN_PAGE),
        Err(err) => {
            log::error!("Failed to render admin panel: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/stats")]
pub async fn show_stats(
    identity: Option<Identity>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_stats_service(is_admin(&identity), store.get_ref(), load_visits(&session)) {
        Ok(stats) => {
            let mut context = base_context(&flash_messages, &identity, store.get_ref(), "admin");
            context.insert("stats", &stats);
            render_template(&tera, "admin/stats.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect(LOGIN_PAGE),
        Err(err) => {
            log::error!("Failed to render stats: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/refresh")]
pub async fn refresh(
    identity: Option<Identity>,
    repo: web::Data<DieselRepository>,
    store: web::Data<SharedStore>,
) -> impl Responder {
    match refresh_service(is_admin(&identity), repo.get_ref(), store.get_ref()) {
        Ok(outcome) if outcome.is_live() => FlashMessage::success("Data refreshed.").send(),
        Ok(_) => FlashMessage::error("Failed to load data, showing demo content.").send(),
        Err(ServiceError::Unauthorized) => return redirect(LOGIN_PAGE),
        Err(err) => {
            log::error!("Failed to refresh catalog: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(PANEL_PAGE)
}

fn render_form(
    tera: &Tera,
    mut context: Context,
    form: &ItemFormState,
    form_error: Option<&str>,
) -> HttpResponse {
    context.insert("form", form);
    context.insert("form_error", &form_error);
    render_template(tera, "admin/form.html", &context)
}

#[get("/admin/items/new")]
pub async fn new_item(
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    query: web::Query<NewItemQuery>,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_form_service(is_admin(&identity), &query.kind) {
        Ok(form) => {
            let context = base_context(&flash_messages, &identity, store.get_ref(), "admin");
            render_form(&tera, context, &form, None)
        }
        Err(ServiceError::Unauthorized) => redirect(LOGIN_PAGE),
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            redirect(PANEL_PAGE)
        }
    }
}

#[get("/admin/items/{kind}/{id}/edit")]
pub async fn edit_item(
    path: web::Path<(String, i32)>,
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    match edit_form_service(is_admin(&identity), repo.get_ref(), &kind, id) {
        Ok(form) => {
            let context = base_context(&flash_messages, &identity, store.get_ref(), "admin");
            render_form(&tera, context, &form, None)
        }
        Err(ServiceError::Unauthorized) => redirect(LOGIN_PAGE),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Item not found.").send();
            redirect(PANEL_PAGE)
        }
        Err(err) => {
            log::error!("Failed to load item for editing: {err}");
            FlashMessage::error("Failed to load the item.").send();
            redirect(PANEL_PAGE)
        }
    }
}

#[post("/admin/items")]
pub async fn save_item(
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    store: web::Data<SharedStore>,
    guard: web::Data<MutationGuard>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ItemForm>,
) -> impl Responder {
    let editing = form.edit_id.as_deref().is_some_and(|id| !id.trim().is_empty());
    let submitted = form.clone();

    match submit_item_service(
        is_admin(&identity),
        repo.get_ref(),
        store.get_ref(),
        guard.get_ref(),
        form,
    ) {
        Ok(true) if editing => FlashMessage::success("Item updated successfully.").send(),
        Ok(true) => FlashMessage::success("Item added successfully.").send(),
        Ok(false) => FlashMessage::error("Failed to save the item.").send(),
        Err(ServiceError::Unauthorized) => return redirect(LOGIN_PAGE),
        Err(ServiceError::NotFound) => FlashMessage::error("Item not found.").send(),
        Err(ServiceError::Conflict) => {
            FlashMessage::warning("This item is already being saved.").send()
        }
        Err(ServiceError::ReadOnly) => FlashMessage::warning(DEMO_READ_ONLY).send(),
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            return match ItemFormState::from_form(&submitted) {
                Ok(state) => {
                    let context =
                        base_context(&flash_messages, &identity, store.get_ref(), "admin");
                    render_form(&tera, context, &state, Some(message.as_str()))
                }
                Err(_) => {
                    FlashMessage::error(message).send();
                    redirect(PANEL_PAGE)
                }
            };
        }
        Err(err) => {
            log::error!("Failed to save item: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(PANEL_PAGE)
}

#[post("/admin/items/preview")]
pub async fn preview_item(
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ItemForm>,
) -> impl Responder {
    match preview_item_service(is_admin(&identity), &form) {
        Ok(page) => {
            let mut context = base_context(&flash_messages, &identity, store.get_ref(), "admin");
            context.insert("preview", &page.preview);
            if page.preview.is_none() {
                context.insert("preview_warning", "Fill in the required fields first.");
            }
            render_form(&tera, context, &page.form, None)
        }
        Err(ServiceError::Unauthorized) => redirect(LOGIN_PAGE),
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            redirect(PANEL_PAGE)
        }
    }
}

#[get("/admin/items/{kind}/{id}/delete")]
pub async fn confirm_delete(
    path: web::Path<(String, i32)>,
    identity: Option<Identity>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    store: web::Data<SharedStore>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    match confirm_delete_service(is_admin(&identity), repo.get_ref(), store.get_ref(), &kind, id) {
        Ok(item) => {
            let mut context = base_context(&flash_messages, &identity, store.get_ref(), "admin");
            context.insert("item", &item);
            render_template(&tera, "admin/confirm_delete.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect(LOGIN_PAGE),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Item not found.").send();
            redirect(PANEL_PAGE)
        }
        Err(err) => {
            log::error!("Failed to load item for deletion: {err}");
            FlashMessage::error("Failed to load the item.").send();
            redirect(PANEL_PAGE)
        }
    }
}

#[post("/admin/items/{kind}/{id}/delete")]
pub async fn delete_item(
    path: web::Path<(String, i32)>,
    identity: Option<Identity>,
    repo: web::Data<DieselRepository>,
    store: web::Data<SharedStore>,
    guard: web::Data<MutationGuard>,
    web::Form(form): web::Form<DeleteItemForm>,
) -> impl Responder {
    let admin = is_admin(&identity);
    if !admin {
        return redirect(LOGIN_PAGE);
    }

    let (kind, id) = path.into_inner();
    let payload = match DeleteItemFormPayload::new(form, &kind, id) {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(PANEL_PAGE);
        }
    };

    match delete_item_service(admin, repo.get_ref(), store.get_ref(), guard.get_ref(), payload) {
        Ok(true) => FlashMessage::success("Item deleted successfully.").send(),
        Ok(false) => FlashMessage::error("Failed to delete the item.").send(),
        Err(ServiceError::Unauthorized) => return redirect(LOGIN_PAGE),
        Err(ServiceError::NotFound) => FlashMessage::error("Item not found.").send(),
        Err(ServiceError::Conflict) => {
            FlashMessage::warning("This item is already being deleted.").send()
        }
        Err(ServiceError::ReadOnly) => FlashMessage::warning(DEMO_READ_ONLY).send(),
        Err(err) => {
            log::error!("Failed to delete item: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(PANEL_PAGE)
}
