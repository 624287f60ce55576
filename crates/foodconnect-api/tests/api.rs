use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use foodconnect_api::{AppStateInner, Settings, build_router};
use foodconnect_db::Database;

const PASSWORD: &str = "Secret123!";

fn app(settings: Settings) -> Router {
    let db = Database::open_in_memory().unwrap();
    build_router(AppStateInner::new(db, settings))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    caller: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header("X-User-Id", caller);
    }
    let req = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str, role: &str) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "email": email,
            "password": PASSWORD,
            "name": "Dana Donor",
            "type": role,
            "phone": "555-0100",
            "address": "1 Main St",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["user"].clone()
}

async fn create_donation(app: &Router, owner_email: &str, caller: Option<&str>) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        "/api/donations",
        Some(json!({
            "userEmail": owner_email,
            "foodType": "Rice",
            "quantity": "10",
            "expiryDate": "2026-12-01",
            "location": "Warehouse",
            "description": "Long grain, sealed bags",
        })),
        caller,
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str, role: &str) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "email": email, "password": password, "userType": role })),
        None,
    )
    .await
}

#[tokio::test]
async fn donor_walkthrough() {
    let app = app(Settings::default());

    let user = register(&app, "d@x.com", "donor").await;
    assert_eq!(user["type"], "donor");
    assert!(user.get("password").is_none());

    let (status, body) = login(&app, "d@x.com", PASSWORD, "recipient").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("donor"));

    let (status, body) = login(&app, "d@x.com", PASSWORD, "donor").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], user["id"]);

    let (status, body) = create_donation(&app, "d@x.com", None).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let donation = &body["donation"];
    assert_eq!(donation["status"], "Available");
    assert_eq!(donation["unit"], "kg");
    assert_eq!(donation["ownerEmail"], "d@x.com");
    assert_eq!(donation["userId"], user["id"]);
    let id = donation["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::GET, "/api/donations/user/d@x.com", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let donations = body["donations"].as_array().unwrap();
    assert_eq!(donations.len(), 1);
    let listed = &donations[0];
    assert_eq!(listed["id"], id.as_str());
    assert_eq!(listed["userId"], user["id"]);
    assert_eq!(listed["ownerEmail"], "d@x.com");
    assert_eq!(listed["foodType"], "Rice");
    assert_eq!(listed["quantity"], "10");
    assert_eq!(listed["unit"], "kg");
    assert_eq!(listed["expiryDate"], "2026-12-01");
    assert_eq!(listed["location"], "Warehouse");
    assert_eq!(listed["description"], "Long grain, sealed bags");
    assert_eq!(listed["status"], "Available");
    assert_eq!(listed["createdAt"], donation["createdAt"]);

    let uri = format!("/api/donations/{}", id);
    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Donation deleted successfully");

    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Donation not found");

    let (_, body) = call(&app, Method::GET, "/api/donations/user/d@x.com", None, None).await;
    assert!(body["donations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_in_any_casing_is_rejected() {
    let app = app(Settings::default());
    let original = register(&app, "dana@example.com", "donor").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "email": "  DANA@Example.COM ",
            "password": "Another123!",
            "name": "Impostor",
            "type": "recipient",
            "phone": "555-0199",
            "address": "9 Elsewhere",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "An account with this email already exists");

    let (status, body) = login(&app, "dana@example.com", PASSWORD, "donor").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], original["id"]);
    assert_eq!(body["user"]["name"], "Dana Donor");
}

#[tokio::test]
async fn failed_logins_leave_last_login_alone() {
    let app = app(Settings::default());
    let user = register(&app, "d@x.com", "donor").await;
    let profile_uri = format!("/api/auth/profile/{}", user["id"].as_str().unwrap());

    let (status, body) = login(&app, "d@x.com", "wrong-password", "donor").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect password");

    let (status, _) = login(&app, "d@x.com", PASSWORD, "admin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&app, Method::GET, &profile_uri, None, None).await;
    assert!(body["user"]["lastLogin"].is_null());

    let (status, _) = login(&app, "d@x.com", PASSWORD, "donor").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, &profile_uri, None, None).await;
    assert!(body["user"]["lastLogin"].is_string());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn unknown_account_and_profile_are_not_found() {
    let app = app(Settings::default());

    let (status, body) = login(&app, "ghost@x.com", PASSWORD, "donor").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No account found with this email");

    let (status, _) = call(&app, Method::GET, "/api/auth/profile/not-a-user", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_looks_up_the_account_before_judging_the_payload() {
    let app = app(Settings::default());

    let (status, body) = login(&app, "ghost@x.com", "", "donor").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No account found with this email");

    let (status, body) = login(&app, "ghost@x.com", PASSWORD, "courier").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No account found with this email");

    register(&app, "d@x.com", "donor").await;

    let (status, body) = login(&app, "d@x.com", "", "donor").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect password");

    let (status, body) = login(&app, "d@x.com", PASSWORD, "courier").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("donor"));

    let (status, _) = login(&app, "d@x.com", PASSWORD, " Donor ").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn status_changes_are_lenient_by_default() {
    let app = app(Settings::default());
    register(&app, "d@x.com", "donor").await;
    let (_, body) = create_donation(&app, "d@x.com", None).await;
    let uri = format!("/api/donations/{}/status", body["donation"]["id"].as_str().unwrap());

    let (status, body) =
        call(&app, Method::PATCH, &uri, Some(json!({ "status": "Delivered" })), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["donation"]["status"], "Delivered");
}

#[tokio::test]
async fn strict_mode_rejects_illegal_transitions() {
    let app = app(Settings { strict_transitions: true, ..Settings::default() });
    register(&app, "d@x.com", "donor").await;
    let (_, body) = create_donation(&app, "d@x.com", None).await;
    let uri = format!("/api/donations/{}/status", body["donation"]["id"].as_str().unwrap());

    let (status, body) =
        call(&app, Method::PATCH, &uri, Some(json!({ "status": "Delivered" })), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Cannot change status from Available to Delivered");

    let (status, body) =
        call(&app, Method::PATCH, &uri, Some(json!({ "status": "Pending" })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donation"]["status"], "Pending");
}

#[tokio::test]
async fn status_change_on_unknown_id_is_not_found() {
    for strict in [false, true] {
        let app = app(Settings { strict_transitions: strict, ..Settings::default() });
        let missing = "00000000-0000-0000-0000-000000000000";

        let uri = format!("/api/donations/{}/status", missing);
        let (status, body) =
            call(&app, Method::PATCH, &uri, Some(json!({ "status": "Pending" })), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Donation not found");

        let uri = format!("/api/requests/{}/status", missing);
        let (status, body) =
            call(&app, Method::PATCH, &uri, Some(json!({ "status": "Matched" })), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Request not found");
    }
}

#[tokio::test]
async fn ownership_enforcement_checks_caller_header() {
    let app = app(Settings { enforce_ownership: true, ..Settings::default() });
    let owner = register(&app, "d@x.com", "donor").await;
    let other = register(&app, "o@x.com", "donor").await;
    let owner_id = owner["id"].as_str().unwrap();
    let other_id = other["id"].as_str().unwrap();

    let (status, _) = create_donation(&app, "d@x.com", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = create_donation(&app, "d@x.com", Some(other_id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = create_donation(&app, "d@x.com", Some(owner_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/donations/{}", body["donation"]["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::DELETE, &uri, None, Some(other_id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::DELETE, &uri, None, Some(owner_id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_payloads_are_bad_requests() {
    let app = app(Settings::default());
    register(&app, "d@x.com", "donor").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/donations",
        Some(json!({ "ownerEmail": "d@x.com", "quantity": "10", "location": "Warehouse" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, body) = create_donation(&app, "d@x.com", None).await;
    let uri = format!("/api/donations/{}/status", body["donation"]["id"].as_str().unwrap());
    let (status, _) =
        call(&app, Method::PATCH, &uri, Some(json!({ "status": "Teleported" })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "email": "new@x.com",
            "password": PASSWORD,
            "name": "New",
            "type": "courier",
            "phone": "555",
            "address": "Road",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = create_donation(&app, "nobody@x.com", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Owner account not found");
}

#[tokio::test]
async fn requests_use_defaults_and_lifecycle() {
    let app = app(Settings { strict_transitions: true, ..Settings::default() });
    register(&app, "r@x.com", "recipient").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/requests",
        Some(json!({
            "ownerEmail": "r@x.com",
            "organization": "Shelter",
            "email": "contact@shelter.org",
            "address": "2 Side St",
            "foodType": "Bread",
            "quantity": "20",
            "urgency": "high",
            "beneficiaries": 40,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let request = &body["request"];
    assert_eq!(request["status"], "Pending");
    assert_eq!(request["pickupPreference"], "delivery");
    assert_eq!(request["distance"], 5.0);
    assert_eq!(request["deliveryFee"], 0.0);
    assert_eq!(request["deliveryFeePaid"], false);
    let id = request["id"].as_str().unwrap().to_string();

    let uri = format!("/api/requests/{}/status", id);
    let (status, body) =
        call(&app, Method::PATCH, &uri, Some(json!({ "status": "Matched" })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "Matched");

    let (status, body) =
        call(&app, Method::PATCH, &uri, Some(json!({ "status": "In Transit" })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "In Transit");

    let (status, _) =
        call(&app, Method::PATCH, &uri, Some(json!({ "status": "Cancelled" })), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&app, Method::GET, "/api/requests/user/r@x.com", None, None).await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);

    let uri = format!("/api/requests/{}", id);
    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request deleted successfully");

    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Request not found");

    let (_, body) = call(&app, Method::GET, "/api/requests/user/r@x.com", None, None).await;
    assert!(body["requests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn messages_list_newest_first_and_mark_read() {
    let app = app(Settings::default());
    register(&app, "d@x.com", "donor").await;

    for (subject, timestamp) in [
        ("older", "2024-01-01T08:00:00Z"),
        ("newer", "2024-01-02T08:00:00Z"),
    ] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/messages",
            Some(json!({
                "ownerEmail": "d@x.com",
                "sender": "Shelter",
                "subject": subject,
                "body": "Pickup at noon",
                "timestamp": timestamp,
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["read"], false);
    }

    let (_, body) = call(&app, Method::GET, "/api/messages/user/d@x.com", None, None).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages[0]["subject"], "newer");
    assert_eq!(messages[1]["subject"], "older");

    let uri = format!("/api/messages/{}/read", messages[1]["id"].as_str().unwrap());
    let (status, body) = call(&app, Method::PATCH, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Message marked as read");
    assert_eq!(body["data"]["read"], true);

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/api/messages/00000000-0000-0000-0000-000000000000/read",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/messages/{}", messages[0]["id"].as_str().unwrap());
    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Message deleted successfully");

    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Message not found");

    let (_, body) = call(&app, Method::GET, "/api/messages/user/d@x.com", None, None).await;
    let remaining = body["messages"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["subject"], "older");
}

#[tokio::test]
async fn timestamps_beyond_four_digit_years_are_rejected() {
    let app = app(Settings::default());
    register(&app, "d@x.com", "donor").await;

    for timestamp in ["+10000-01-01T00:00:00Z", "-0001-01-01T00:00:00Z"] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/messages",
            Some(json!({
                "ownerEmail": "d@x.com",
                "sender": "Shelter",
                "subject": "far off",
                "body": "Pickup at noon",
                "timestamp": timestamp,
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}: {}", timestamp, body);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/notifications",
            Some(json!({
                "ownerEmail": "d@x.com",
                "message": "far off",
                "type": "info",
                "timestamp": timestamp,
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", timestamp);
    }

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/messages",
        Some(json!({
            "ownerEmail": "d@x.com",
            "sender": "Shelter",
            "subject": "last year",
            "body": "Pickup at noon",
            "timestamp": "9999-01-01T00:00:00Z",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = call(&app, Method::GET, "/api/messages/user/d@x.com", None, None).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["subject"], "last year");

    let (_, body) = call(&app, Method::GET, "/api/notifications/user/d@x.com", None, None).await;
    assert!(body["notifications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn clearing_notifications_touches_one_owner() {
    let app = app(Settings::default());
    register(&app, "a@x.com", "donor").await;
    register(&app, "b@x.com", "recipient").await;

    for (owner, text) in [("a@x.com", "one"), ("a@x.com", "two"), ("b@x.com", "three")] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/notifications",
            Some(json!({ "ownerEmail": owner, "message": text, "type": "success" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["type"], "success");
    }

    let (status, body) =
        call(&app, Method::DELETE, "/api/notifications/user/a@x.com", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 2);

    let (_, body) = call(&app, Method::GET, "/api/notifications/user/a@x.com", None, None).await;
    assert!(body["notifications"].as_array().unwrap().is_empty());

    let (_, body) = call(&app, Method::GET, "/api/notifications/user/b@x.com", None, None).await;
    let remaining = body["notifications"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["message"], "three");
}

#[tokio::test]
async fn single_notifications_can_be_read_and_deleted() {
    let app = app(Settings::default());
    register(&app, "a@x.com", "donor").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/notifications",
        Some(json!({ "ownerEmail": "a@x.com", "message": "Pickup confirmed", "type": "info" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["read"], false);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/notifications/{}/read", id);
    let (status, body) = call(&app, Method::PATCH, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Notification marked as read");
    assert_eq!(body["data"]["read"], true);
    assert_eq!(body["data"]["message"], "Pickup confirmed");

    let uri = format!("/api/notifications/{}", id);
    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Notification deleted successfully");

    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Notification not found");

    let uri = format!("/api/notifications/{}/read", id);
    let (status, _) = call(&app, Method::PATCH, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(&app, Method::GET, "/api/notifications/user/a@x.com", None, None).await;
    assert!(body["notifications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_database() {
    let app = app(Settings::default());
    let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], "Connected");
}
