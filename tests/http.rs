use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use pushkind_mods::models::config::ServerConfig;
use pushkind_mods::repository::DieselRepository;
use pushkind_mods::routes::configure;
use pushkind_mods::services::sync;
use pushkind_mods::store::{CatalogStore, MutationGuard, SharedStore};

mod common;

const PASSWORD: &str = "letmein";

fn server_config() -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1".into(),
        port: 8080,
        database_url: String::new(),
        templates_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*").into(),
        assets_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/assets").into(),
        secret: String::new(),
        admin_password: PASSWORD.into(),
        search_debounce_ms: 500,
        latest_items: 3,
        search_preview_limit: 5,
    }
}

macro_rules! catalog_app {
    ($test_db:expr) => {{
        let key = Key::generate();
        let config = server_config();
        let tera = Tera::new(&config.templates_dir).expect("templates parse");
        let repo = DieselRepository::new($test_db.pool());
        let store = SharedStore::new(CatalogStore::new());
        sync::initialize(&repo, &store);
        let message_store = CookieMessageStore::builder(key.clone()).build();

        test::init_service(
            App::new()
                .wrap(FlashMessagesFramework::builder(message_store).build())
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                        .cookie_secure(false)
                        .build(),
                )
                .configure(configure)
                .app_data(web::Data::new(repo))
                .app_data(web::Data::new(store))
                .app_data(web::Data::new(MutationGuard::new()))
                .app_data(web::Data::new(tera))
                .app_data(web::Data::new(config)),
        )
        .await
    }};
}

/// Browser-side cookie jar: later cookies replace earlier ones, removals drop them.
#[derive(Default)]
struct Jar(Vec<Cookie<'static>>);

impl Jar {
    fn absorb<B>(&mut self, resp: &ServiceResponse<B>) {
        for cookie in resp.response().cookies() {
            let cookie = cookie.into_owned();
            self.0.retain(|c| c.name() != cookie.name());
            if !cookie.value().is_empty() {
                self.0.push(cookie);
            }
        }
    }

    fn attach(&self, mut req: test::TestRequest) -> test::TestRequest {
        for cookie in &self.0 {
            req = req.cookie(cookie.clone());
        }
        req
    }
}

fn location<B>(resp: &ServiceResponse<B>) -> Option<&str> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

#[actix_web::test]
async fn correct_password_opens_the_admin_panel() {
    let test_db = common::TestDb::new();
    let app = catalog_app!(test_db);
    let mut jar = Jar::default();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/login")
            .set_form(&[("password", PASSWORD)])
            .to_request(),
    )
    .await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), Some("/admin"));
    jar.absorb(&resp);

    let resp = test::call_service(
        &app,
        jar.attach(test::TestRequest::get().uri("/admin")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn wrong_password_keeps_the_admin_panel_locked() {
    let test_db = common::TestDb::new();
    let app = catalog_app!(test_db);
    let mut jar = Jar::default();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/login")
            .set_form(&[("password", "guess")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    jar.absorb(&resp);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Wrong password!"));

    let resp = test::call_service(
        &app,
        jar.attach(test::TestRequest::get().uri("/admin")).to_request(),
    )
    .await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), Some("/admin/login"));
}

#[actix_web::test]
async fn listing_pages_count_as_visits() {
    let test_db = common::TestDb::new();
    let app = catalog_app!(test_db);
    let mut jar = Jar::default();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/login")
            .set_form(&[("password", PASSWORD)])
            .to_request(),
    )
    .await;
    jar.absorb(&resp);

    let resp = test::call_service(
        &app,
        jar.attach(test::TestRequest::get().uri("/mods")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    jar.absorb(&resp);

    let resp = test::call_service(
        &app,
        jar.attach(test::TestRequest::get().uri("/admin/stats"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(
        String::from_utf8_lossy(&body).contains("<tr><th>Your visits</th><td>1</td></tr>")
    );
}
