use crate::helper::{as_user, spawn_app, upload_request};
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn draft() -> Value {
    json!({
        "name": "Payday",
        "htmlContent": "<p>Hello {{name}}, id {{id}}</p>",
        "tags": [{"name": "name", "column": "column2"}],
    })
}

#[actix_web::test]
async fn draft_is_empty_until_saved() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::get(), "/api/templates/draft").to_request(),
    )
    .await;
    assert_eq!(body, json!({"htmlContent": "", "tags": []}));

    test::call_service(
        &service,
        as_user(test::TestRequest::put(), "/api/templates/draft")
            .set_json(draft())
            .to_request(),
    )
    .await;
    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::get(), "/api/templates/draft").to_request(),
    )
    .await;
    assert_eq!(body, draft());
}

#[actix_web::test]
async fn duplicate_tag_names_are_rejected() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::put(), "/api/templates/draft")
            .set_json(json!({
                "htmlContent": "x",
                "tags": [{"name": "a", "column": "column1"}, {"name": "a", "column": "column2"}],
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    test::call_service(
        &service,
        as_user(test::TestRequest::put(), "/api/templates/draft")
            .set_json(draft())
            .to_request(),
    )
    .await;
    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::post(), "/api/templates/draft/tags")
            .set_json(json!({"name": "name", "column": "column1"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn tags_can_be_added_removed_and_inserted() {
    let app = spawn_app().await;
    let service = init_app!(app);

    test::call_service(
        &service,
        as_user(test::TestRequest::put(), "/api/templates/draft")
            .set_json(draft())
            .to_request(),
    )
    .await;

    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::post(), "/api/templates/draft/tags")
            .set_json(json!({"name": "id", "column": "column1"}))
            .to_request(),
    )
    .await;
    assert_eq!(body["tags"].as_array().map(Vec::len), Some(2));

    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::get(), "/api/templates/draft/tags/id/marker").to_request(),
    )
    .await;
    assert_eq!(body, json!({"marker": "{{id}}"}));

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::delete(), "/api/templates/draft/tags/id").to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::delete(), "/api/templates/draft/tags/id").to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn preview_renders_the_first_row() {
    let app = spawn_app().await;
    let service = init_app!(app);

    test::call_service(
        &service,
        as_user(test::TestRequest::put(), "/api/templates/draft")
            .set_json(draft())
            .to_request(),
    )
    .await;

    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::get(), "/api/templates/draft/preview").to_request(),
    )
    .await;
    assert_eq!(body["html"], json!("<p>Hello {{name}}, id {{id}}</p>"));

    test::call_service(
        &service,
        upload_request("staff.csv", b"alice,Alice\nbob,Bob\n").to_request(),
    )
    .await;
    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::get(), "/api/templates/draft/preview").to_request(),
    )
    .await;
    assert_eq!(body["html"], json!("<p>Hello Alice, id {{id}}</p>"));
}

#[actix_web::test]
async fn import_copies_a_stored_template_into_the_draft() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "query": "SELECT TemplateId, TemplateName, HtmlContent FROM dbo.Templates WHERE TemplateId = @TemplateId",
            "parameters": {"TemplateId": 8},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"TemplateId": 8, "TemplateName": "Shift change", "HtmlContent": "<b>{{who}}</b>"}],
        })))
        .mount(&app.gateway)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "query": "SELECT TagName, ColumnName FROM TemplateTags WHERE TemplateId = @TemplateId",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordset": [{"TagName": "who", "ColumnName": "column1"}],
        })))
        .mount(&app.gateway)
        .await;
    let service = init_app!(app);

    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::post(), "/api/templates/import/8").to_request(),
    )
    .await;
    assert_eq!(
        body,
        json!({
            "name": "Shift change",
            "htmlContent": "<b>{{who}}</b>",
            "tags": [{"name": "who", "column": "column1"}],
        })
    );

    let stored: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::get(), "/api/templates/draft").to_request(),
    )
    .await;
    assert_eq!(stored, body);
}

#[actix_web::test]
async fn importing_an_unknown_template_is_404() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&app.gateway)
        .await;
    let service = init_app!(app);

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::post(), "/api/templates/import/404").to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn stored_templates_are_listed_newest_first() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "query": "SELECT TemplateId, TemplateName, HtmlContent FROM dbo.Templates ORDER BY CreatedAt DESC",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"recordset": [
                {"TemplateId": 9, "TemplateName": "Shift change", "HtmlContent": "<b>{{who}}</b>"},
                {"TemplateId": 3, "TemplateName": "Payday", "HtmlContent": "<p>Paid</p>"},
            ]},
        })))
        .expect(1)
        .mount(&app.gateway)
        .await;
    let service = init_app!(app);

    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::get(), "/api/templates").to_request(),
    )
    .await;
    assert_eq!(
        body,
        json!([
            {"templateId": 9, "templateName": "Shift change", "htmlContent": "<b>{{who}}</b>"},
            {"templateId": 3, "templateName": "Payday", "htmlContent": "<p>Paid</p>"},
        ])
    );
}

#[actix_web::test]
async fn malformed_json_bodies_get_the_error_shape() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::post(), "/api/templates/draft/tags")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}
