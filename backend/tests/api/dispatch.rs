use crate::helper::{as_user, spawn_app, upload_request};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const RECIPIENTS_CSV: &[u8] = b"alice,Alice\n,Nobody\ncarol,Carol\n";

async fn save_draft<S>(service: &S)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_service(
        service,
        as_user(test::TestRequest::put(), "/api/templates/draft")
            .set_json(json!({
                "name": "Greeting",
                "htmlContent": "<p>Hi {{name}}</p>",
                "tags": [{"name": "name", "column": "column2"}],
            }))
            .to_request(),
    )
    .await;
}

async fn prepare<S>(service: &S, body: Value) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_service(
        service,
        as_user(test::TestRequest::post(), "/api/dispatch/prepare")
            .set_json(body)
            .to_request(),
    )
    .await
}

async fn status<S>(service: &S) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_and_read_body_json(
        service,
        as_user(test::TestRequest::get(), "/api/dispatch/status").to_request(),
    )
    .await
}

/// Polls the status endpoint until the run has completed.
async fn wait_for_completion<S>(service: &S) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    for _ in 0..100 {
        let current = status(service).await;
        if current["phase"] == json!("completed") {
            return current;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("dispatch did not complete");
}

#[actix_web::test]
async fn confirmed_dispatch_sends_every_row_in_order() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("x-api-key", "send-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(2)
        .mount(&app.provider)
        .await;
    let service = init_app!(app);

    save_draft(&service).await;
    test::call_service(&service, upload_request("staff.csv", RECIPIENTS_CSV).to_request()).await;

    let resp = prepare(&service, json!({"usernameColumn": "column1"})).await;
    assert_eq!(resp.status().as_u16(), 200);
    let prompt: Value = test::read_body_json(resp).await;
    assert_eq!(prompt["recipientCount"], json!(3));
    assert_eq!(prompt["prompt"], json!("Send this message to 3 recipients?"));

    let started: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::post(), "/api/dispatch/confirm").to_request(),
    )
    .await;
    let job_id = started["jobId"].as_str().unwrap().to_string();

    let done = wait_for_completion(&service).await;
    assert_eq!(done["alreadySent"], json!(true));
    assert_eq!(done["progress"], json!({"current": 3, "total": 3}));
    assert_eq!(done["result"]["successCount"], json!(2));
    assert_eq!(done["result"]["failCount"], json!(1));
    assert_eq!(
        done["result"]["items"],
        json!([
            {"row": 1, "username": "alice", "status": "success"},
            {"row": 2, "username": "-", "status": "error", "message": "no username found"},
            {"row": 3, "username": "carol", "status": "success"},
        ])
    );

    // The job controller entry is written after the session completes.
    let mut job = Value::Null;
    for _ in 0..100 {
        job = test::call_and_read_body_json(
            &service,
            as_user(test::TestRequest::get(), &format!("/api/dispatch/jobs/{}", job_id)).to_request(),
        )
        .await;
        if job.get("completed").is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(job, json!({"completed": "2 sent, 1 failed"}));
}

#[actix_web::test]
async fn sent_dataset_needs_an_explicit_resend() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&app.provider)
        .await;
    let service = init_app!(app);

    save_draft(&service).await;
    test::call_service(&service, upload_request("staff.csv", RECIPIENTS_CSV).to_request()).await;
    prepare(&service, json!({"usernameColumn": "column1"})).await;
    test::call_service(
        &service,
        as_user(test::TestRequest::post(), "/api/dispatch/confirm").to_request(),
    )
    .await;
    wait_for_completion(&service).await;

    let resp = prepare(&service, json!({"usernameColumn": "column1"})).await;
    assert_eq!(resp.status().as_u16(), 409);

    let resp = prepare(&service, json!({"usernameColumn": "column1", "resend": true})).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_web::test]
async fn refused_send_is_recorded_with_the_provider_reason() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_partial_json(json!({"to": ["alice"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": "unknown user"})))
        .mount(&app.provider)
        .await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.provider)
        .await;
    let service = init_app!(app);

    save_draft(&service).await;
    test::call_service(&service, upload_request("staff.csv", b"alice,Alice\ncarol,Carol\n").to_request()).await;
    prepare(&service, json!({"usernameColumn": "column1"})).await;
    test::call_service(
        &service,
        as_user(test::TestRequest::post(), "/api/dispatch/confirm").to_request(),
    )
    .await;

    let done = wait_for_completion(&service).await;
    assert_eq!(done["result"]["failCount"], json!(2));
    assert_eq!(done["result"]["items"][0]["message"], json!("unknown user"));
    assert_eq!(done["result"]["items"][1]["message"], json!("API error: 500"));
}

#[actix_web::test]
async fn missing_username_column_keeps_the_session_idle() {
    let app = spawn_app().await;
    let service = init_app!(app);

    save_draft(&service).await;
    test::call_service(&service, upload_request("staff.csv", RECIPIENTS_CSV).to_request()).await;

    let resp = prepare(&service, json!({})).await;
    assert_eq!(resp.status().as_u16(), 400);
    let resp = prepare(&service, json!({"usernameColumn": "column9"})).await;
    assert_eq!(resp.status().as_u16(), 400);

    assert_eq!(status(&service).await["phase"], json!("idle"));
}

#[actix_web::test]
async fn prepare_without_data_or_template_is_rejected() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let resp = prepare(&service, json!({"usernameColumn": "column1"})).await;
    assert_eq!(resp.status().as_u16(), 400);

    test::call_service(&service, upload_request("staff.csv", RECIPIENTS_CSV).to_request()).await;
    let resp = prepare(&service, json!({"usernameColumn": "column1"})).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("template"));
}

#[actix_web::test]
async fn cancel_returns_to_idle() {
    let app = spawn_app().await;
    let service = init_app!(app);

    save_draft(&service).await;
    test::call_service(&service, upload_request("staff.csv", RECIPIENTS_CSV).to_request()).await;
    prepare(&service, json!({"usernameColumn": "column1"})).await;
    assert_eq!(status(&service).await["phase"], json!("confirming"));

    let body: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::post(), "/api/dispatch/cancel").to_request(),
    )
    .await;
    assert_eq!(body["phase"], json!("idle"));

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::post(), "/api/dispatch/confirm").to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 409);
}

#[actix_web::test]
async fn workspace_is_locked_while_running() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&app.provider)
        .await;
    let service = init_app!(app);

    save_draft(&service).await;
    test::call_service(&service, upload_request("staff.csv", RECIPIENTS_CSV).to_request()).await;
    prepare(&service, json!({"usernameColumn": "column1"})).await;
    test::call_service(
        &service,
        as_user(test::TestRequest::post(), "/api/dispatch/confirm").to_request(),
    )
    .await;

    let resp = test::call_service(&service, upload_request("other.csv", b"x,y\n").to_request()).await;
    assert_eq!(resp.status().as_u16(), 409);
    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::put(), "/api/templates/draft")
            .set_json(json!({"htmlContent": "changed"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 409);
    let resp = prepare(&service, json!({"usernameColumn": "column1"})).await;
    assert_eq!(resp.status().as_u16(), 409);

    let done = wait_for_completion(&service).await;
    assert_eq!(done["result"]["successCount"], json!(2));

    let current: Value = test::call_and_read_body_json(
        &service,
        as_user(test::TestRequest::get(), "/api/data_sources").to_request(),
    )
    .await;
    assert_eq!(current["fileName"], json!("staff.csv"));
}

#[actix_web::test]
async fn unknown_job_is_404() {
    let app = spawn_app().await;
    let service = init_app!(app);

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::get(), "/api/dispatch/jobs/nope").to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn confirm_refuses_a_draft_emptied_after_prepare() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&app.provider)
        .await;
    let service = init_app!(app);

    save_draft(&service).await;
    test::call_service(&service, upload_request("staff.csv", RECIPIENTS_CSV).to_request()).await;
    let resp = prepare(&service, json!({"usernameColumn": "column1"})).await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::put(), "/api/templates/draft")
            .set_json(json!({"htmlContent": "   "}))
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let resp = test::call_service(
        &service,
        as_user(test::TestRequest::post(), "/api/dispatch/confirm").to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("template"));

    let current = status(&service).await;
    assert_eq!(current["phase"], json!("confirming"));
    assert!(current.get("result").is_none());
}
