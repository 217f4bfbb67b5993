mod common;

use common::{solve_captcha, TestApp, CAPTCHA_RATE_LIMIT, REGISTRATION_RATE_LIMIT};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn captcha(app: &TestApp) -> (String, String) {
    let response = app.get("/api/registrations/captcha").await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["expires_in_seconds"], 300);
    (
        body["captcha_id"].as_str().unwrap().to_string(),
        solve_captcha(body["question"].as_str().unwrap()),
    )
}

fn form(captcha_id: &str, answer: &str) -> Value {
    json!({
        "company_name": "Desert Rose Travel",
        "contact_name": "Amal Haddad",
        "email": "ops@desertrose.example",
        "phone": "+971 4 555 0101",
        "country_code": "ae",
        "city": "Dubai",
        "address": "Office 12, Al Quoz",
        "license_number": "DTCM-44821",
        "password": "correct-horse",
        "captcha_id": captcha_id,
        "captcha_answer": answer
    })
}

#[tokio::test]
async fn registration_with_solved_captcha_reaches_backend() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/agencies"))
        .and(body_partial_json(json!({
            "companyName": "Desert Rose Travel",
            "countryCode": "AE",
            "licenseNumber": "DTCM-44821"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "ag-1001", "status": "pending_approval" })),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    let (captcha_id, answer) = captcha(&app).await;
    let response = app
        .post_json("/api/registrations", &form(&captcha_id, &answer))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["agency_id"], "ag-1001");
    assert_eq!(body["status"], "pending_approval");
}

#[tokio::test]
async fn wrong_captcha_answer_is_rejected_and_consumed() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/agencies"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "ag-1" })))
        .expect(0)
        .mount(&app.backend)
        .await;

    let (captcha_id, answer) = captcha(&app).await;
    let wrong = (answer.parse::<u32>().unwrap() + 1).to_string();

    let response = app
        .post_json("/api/registrations", &form(&captcha_id, &wrong))
        .await;
    assert_eq!(response.status().as_u16(), 422);

    // The challenge is gone even though the right answer is now supplied.
    let response = app
        .post_json("/api/registrations", &form(&captcha_id, &answer))
        .await;
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn invalid_form_fields_are_reported() {
    let app = TestApp::spawn().await;

    let (captcha_id, answer) = captcha(&app).await;
    let mut body = form(&captcha_id, &answer);
    body["email"] = json!("not-an-email");
    body["phone"] = json!("123");

    let response = app.post_json("/api/registrations", &body).await;
    assert_eq!(response.status().as_u16(), 422);

    let body: Value = response.json().await.unwrap();
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("email"));
    assert!(details.contains("phone"));
}

#[tokio::test]
async fn registration_is_rate_limited_per_ip() {
    let app = TestApp::spawn().await;

    for _ in 0..REGISTRATION_RATE_LIMIT {
        let response = app.post_json("/api/registrations", &json!({})).await;
        assert_ne!(response.status().as_u16(), 429);
    }

    let response = app.post_json("/api/registrations", &json!({})).await;
    assert_eq!(response.status().as_u16(), 429);
    assert!(response.headers().contains_key("retry-after"));
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_the_limit() {
    let app = TestApp::spawn().await;

    let mut statuses = Vec::new();
    for n in 0..=REGISTRATION_RATE_LIMIT {
        let response = app
            .client
            .post(app.url("/api/registrations"))
            .header("x-forwarded-for", format!("203.0.113.{}", n + 1))
            .json(&json!({}))
            .send()
            .await
            .expect("Failed to execute request");
        statuses.push(response.status().as_u16());
    }

    assert!(statuses[..REGISTRATION_RATE_LIMIT as usize]
        .iter()
        .all(|status| *status != 429));
    assert_eq!(statuses.last(), Some(&429));
}

#[tokio::test]
async fn captcha_issuance_is_rate_limited_per_ip() {
    let app = TestApp::spawn().await;

    for _ in 0..CAPTCHA_RATE_LIMIT {
        let response = app.get("/api/registrations/captcha").await;
        assert!(response.status().is_success());
    }

    let response = app.get("/api/registrations/captcha").await;
    assert_eq!(response.status().as_u16(), 429);
}
