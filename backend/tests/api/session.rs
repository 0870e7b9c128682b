use crate::helper::{as_user, spawn_app, USER};
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[actix_web::test]
async fn missing_identity_is_401() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let resp = test::call_service(&service, test::TestRequest::get().uri("/api/session").to_request()).await;
    assert_eq!(resp.status().as_u16(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn unconfigured_authorization_permits_as_non_admin() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let req = as_user(test::TestRequest::get(), "/api/session").to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(
        body,
        json!({"user": USER, "isAuthorized": true, "isAdmin": false})
    );
}

#[actix_web::test]
async fn admin_flag_comes_from_the_authorization_procedure() {
    let app = spawn_app().await.with_authorization();
    Mock::given(method("POST"))
        .and(path("/procedure"))
        .and(body_partial_json(json!({
            "procedure": "sp_CheckAuthorizedUser",
            "parameters": {"EmployeeId": USER},
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": [{"IsAuthorized": 1, "IsAdmin": true}]})),
        )
        .mount(&app.gateway)
        .await;
    let service = init_app!(app);

    let req = as_user(test::TestRequest::get(), "/api/session").to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["isAdmin"], json!(true));
}

#[actix_web::test]
async fn unauthorized_identity_is_403_everywhere() {
    let app = spawn_app().await.with_authorization();
    Mock::given(method("POST"))
        .and(path("/procedure"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"IsAuthorized": 0, "IsAdmin": 0}]})),
        )
        .mount(&app.gateway)
        .await;
    let service = init_app!(app);

    for uri in ["/api/session", "/api/templates/draft", "/api/dispatch/status"] {
        let resp = test::call_service(&service, as_user(test::TestRequest::get(), uri).to_request()).await;
        assert_eq!(resp.status().as_u16(), 403, "{}", uri);
    }
}

#[actix_web::test]
async fn failing_authorization_gateway_denies() {
    let app = spawn_app().await.with_authorization();
    Mock::given(method("POST"))
        .and(path("/procedure"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.gateway)
        .await;
    let service = init_app!(app);

    let resp = test::call_service(&service, as_user(test::TestRequest::get(), "/api/session").to_request()).await;
    assert_eq!(resp.status().as_u16(), 403);
}
