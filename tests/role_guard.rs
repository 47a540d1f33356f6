//! Role guard behavior over a live actix service: authentication always
//! runs first, the role test is pure set membership, and no role implies
//! another. No database needed - the guard never touches storage.

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, HttpResponse};
use chrono::Duration;
use uuid::Uuid;

use campusboard::middleware::{Principal, RequireAuth};
use campusboard::models::user::Role;
use campusboard::security::jwt;

fn init_test_key() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        jwt::initialize("role-guard-test-secret").expect("Failed to initialize test key");
    });
}

async fn whoami(principal: Principal) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "id": principal.id,
        "role": principal.role,
    }))
}

macro_rules! guarded_app {
    () => {
        test::init_service(
            App::new()
                .service(
                    web::resource("/any")
                        .wrap(RequireAuth::any())
                        .route(web::get().to(whoami)),
                )
                .service(
                    web::resource("/admin")
                        .wrap(RequireAuth::roles(&[Role::Admin]))
                        .route(web::get().to(whoami)),
                )
                .service(
                    web::resource("/organizer")
                        .wrap(RequireAuth::roles(&[Role::Organizer]))
                        .route(web::get().to(whoami)),
                ),
        )
        .await
    };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn missing_token_is_unauthenticated() {
    init_test_key();
    let app = guarded_app!();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/any").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Admin route without a token is 401, not 403: auth runs first
    let resp = test::call_service(&app, test::TestRequest::get().uri("/admin").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn garbage_token_is_unauthenticated() {
    init_test_key();
    let app = guarded_app!();

    let req = test::TestRequest::get()
        .uri("/any")
        .insert_header(bearer("definitely.not.a.jwt"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn wrong_scheme_is_unauthenticated() {
    init_test_key();
    let app = guarded_app!();

    let token = jwt::issue_token(Uuid::new_v4(), Role::Student).unwrap();
    let req = test::TestRequest::get()
        .uri("/any")
        .insert_header((header::AUTHORIZATION, format!("Basic {token}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn expired_token_is_unauthenticated() {
    init_test_key();
    let app = guarded_app!();

    let token =
        jwt::issue_token_with_lifetime(Uuid::new_v4(), Role::Admin, Duration::hours(-2)).unwrap();
    let req = test::TestRequest::get()
        .uri("/admin")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn any_authenticated_role_passes_the_open_guard() {
    init_test_key();
    let app = guarded_app!();

    for role in [Role::Student, Role::Organizer, Role::Admin] {
        let token = jwt::issue_token(Uuid::new_v4(), role).unwrap();
        let req = test::TestRequest::get()
            .uri("/any")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn non_admin_role_is_forbidden_on_admin_route() {
    init_test_key();
    let app = guarded_app!();

    for role in [Role::Student, Role::Organizer] {
        let token = jwt::issue_token(Uuid::new_v4(), role).unwrap();
        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }
}

#[actix_web::test]
async fn admin_is_not_implicitly_an_organizer() {
    init_test_key();
    let app = guarded_app!();

    let token = jwt::issue_token(Uuid::new_v4(), Role::Admin).unwrap();
    let req = test::TestRequest::get()
        .uri("/organizer")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_web::test]
async fn principal_reflects_the_token() {
    init_test_key();
    let app = guarded_app!();

    let user_id = Uuid::new_v4();
    let token = jwt::issue_token(user_id, Role::Organizer).unwrap();
    let req = test::TestRequest::get()
        .uri("/organizer")
        .insert_header(bearer(&token))
        .to_request();

    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], serde_json::json!(user_id));
    assert_eq!(body["role"], serde_json::json!("organizer"));
}
