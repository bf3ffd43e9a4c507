use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sendgo::api::rest::router;
use sendgo::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn setup() -> axum::Router {
    router(Arc::new(AppState::new(64)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn mission_body(expediteur_id: &str) -> Value {
    json!({
        "expediteur_id": expediteur_id,
        "departure_country": "Senegal",
        "departure_city": "Dakar",
        "pickup_address": "12 Rue Felix Faure",
        "arrival_country": "France",
        "arrival_city": "Paris",
        "delivery_address": "8 Rue de la Paix",
        "package_weight": 4.5,
        "package_description": "documents and fabric",
        "package_value": 100000.0,
        "desired_departure_date": "2026-09-01T08:00:00Z",
        "offered_price": 15000.0
    })
}

fn trip_body(gp_id: &str) -> Value {
    json!({
        "gp_id": gp_id,
        "departure_country": "Senegal",
        "departure_city": "Dakar",
        "arrival_country": "France",
        "arrival_city": "Paris",
        "departure_date": "2026-09-02T08:00:00Z",
        "arrival_date": "2026-09-02T16:00:00Z",
        "available_weight": 20.0,
        "max_packages": 5
    })
}

async fn create_mission(app: &axum::Router, expediteur_id: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/missions", mission_body(expediteur_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn set_status(app: &axum::Router, mission_id: &str, status: &str, actor_id: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/missions/{mission_id}/status"),
            json!({ "status": status, "actor_id": actor_id }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["missions"], 0);
    assert_eq!(body["trips"], 0);
    assert_eq!(body["tracking_events"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("open_missions"));
    assert!(body.contains("missions_created_total"));
}

#[tokio::test]
async fn create_mission_assigns_identifiers_and_insurance() {
    let app = setup();
    let mission = create_mission(&app, &Uuid::new_v4().to_string()).await;

    assert_eq!(mission["status"], "pending");
    assert!(mission["mission_code"].as_str().unwrap().starts_with("MIS-"));
    assert!(mission["tracking_number"].as_str().unwrap().starts_with("SG"));
    assert_eq!(mission["is_insured"], true);
    assert_eq!(mission["insurance_cost"], 2000.0);
    assert!(mission["gp_id"].is_null());
    assert!(mission["completed_at"].is_null());
}

#[tokio::test]
async fn create_mission_rejects_nonpositive_weight() {
    let app = setup();
    let mut body = mission_body(&Uuid::new_v4().to_string());
    body["package_weight"] = json!(0.0);

    let response = app
        .oneshot(json_request("POST", "/missions", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_nonexistent_mission_returns_404() {
    let app = setup();
    let fake_id = "00000000-0000-0000-0000-000000000000";
    let response = app
        .oneshot(get_request(&format!("/missions/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_mission_flow() {
    let app = setup();
    let gp_id = Uuid::new_v4().to_string();

    let res = app
        .clone()
        .oneshot(json_request("POST", "/trips", trip_body(&gp_id)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let trip = body_json(res).await;
    let trip_id = trip["id"].as_str().unwrap().to_string();
    assert!(trip["trip_code"].as_str().unwrap().starts_with("TRJ-"));
    assert_eq!(trip["current_packages"], 0);

    let mission = create_mission(&app, &Uuid::new_v4().to_string()).await;
    let mission_id = mission["id"].as_str().unwrap().to_string();
    let tracking_number = mission["tracking_number"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/missions/{mission_id}/accept"),
            json!({ "gp_id": gp_id, "trip_id": trip_id }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let accepted = body_json(res).await;
    assert_eq!(accepted["status"], "accepted");
    assert_eq!(accepted["gp_id"], gp_id.as_str());
    assert_eq!(accepted["trip_id"], trip_id.as_str());

    // losing claim on the same mission
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/missions/{mission_id}/accept"),
            json!({ "gp_id": Uuid::new_v4().to_string() }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/trips/{trip_id}")))
        .await
        .unwrap();
    let trip = body_json(res).await;
    assert_eq!(trip["current_packages"], 1);

    for status in ["picked_up", "in_transit", "in_customs", "out_for_delivery"] {
        let res = set_status(&app, &mission_id, status, &gp_id).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = set_status(&app, &mission_id, "delivered", &gp_id).await;
    assert_eq!(res.status(), StatusCode::OK);
    let delivered = body_json(res).await;
    assert_eq!(delivered["status"], "delivered");
    assert!(!delivered["completed_at"].is_null());
    assert!(!delivered["actual_delivery_date"].is_null());

    // terminal: nothing moves a delivered mission
    let res = set_status(&app, &mission_id, "cancelled", &gp_id).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/missions/{mission_id}/tracking")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let history = body_json(res).await;
    let events = history.as_array().unwrap();
    assert_eq!(events.len(), 6);
    assert_eq!(events[0]["status"], "delivered");
    assert_eq!(events[events.len() - 1]["status"], "accepted");

    let res = app
        .clone()
        .oneshot(get_request(&format!("/tracking/{tracking_number}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let tracked = body_json(res).await;
    assert_eq!(tracked["mission"]["id"], mission_id.as_str());
    assert_eq!(tracked["tracking"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn illegal_transitions_are_rejected() {
    let app = setup();
    let gp_id = Uuid::new_v4().to_string();
    let mission = create_mission(&app, &Uuid::new_v4().to_string()).await;
    let mission_id = mission["id"].as_str().unwrap().to_string();

    // acceptance only happens through the accept flow
    let res = set_status(&app, &mission_id, "accepted", &gp_id).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/missions/{mission_id}/accept"),
            json!({ "gp_id": gp_id }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // skipping pickup and transit entirely
    let res = set_status(&app, &mission_id, "delivered", &gp_id).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/missions/{mission_id}")))
        .await
        .unwrap();
    let unchanged = body_json(res).await;
    assert_eq!(unchanged["status"], "accepted");
}

#[tokio::test]
async fn pending_mission_details_can_change_until_accepted() {
    let app = setup();
    let mission = create_mission(&app, &Uuid::new_v4().to_string()).await;
    let mission_id = mission["id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/missions/{mission_id}"),
            json!({ "offered_price": 18000.0, "package_value": 50000.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated = body_json(res).await;
    assert_eq!(updated["offered_price"], 18000.0);
    assert_eq!(updated["insurance_cost"], 1000.0);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/missions/{mission_id}/accept"),
            json!({ "gp_id": Uuid::new_v4().to_string() }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(json_request(
            "PUT",
            &format!("/missions/{mission_id}"),
            json!({ "offered_price": 20000.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn qr_code_generation_is_idempotent() {
    let app = setup();
    let mission = create_mission(&app, &Uuid::new_v4().to_string()).await;
    let mission_id = mission["id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/missions/{mission_id}/qr-code"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let first = body_json(res).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/missions/{mission_id}/qr-code"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let second = body_json(res).await;

    assert_eq!(first["qr_code_data"], second["qr_code_data"]);
    assert!(!second["qr_code_url"].is_null());

    let payload: Value =
        serde_json::from_str(second["qr_code_data"].as_str().unwrap()).unwrap();
    assert_eq!(payload["tracking_number"], mission["tracking_number"]);
}

#[tokio::test]
async fn tracking_history_is_empty_for_fresh_missions() {
    let app = setup();
    let mission = create_mission(&app, &Uuid::new_v4().to_string()).await;
    let mission_id = mission["id"].as_str().unwrap().to_string();

    let res = app
        .oneshot(get_request(&format!("/missions/{mission_id}/tracking")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let history = body_json(res).await;
    assert_eq!(history.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn track_unknown_number_returns_404() {
    let app = setup();
    let response = app
        .oneshot(get_request("/tracking/SGDOESNOTEXIST"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_missions_filters_and_paginates() {
    let app = setup();
    let expediteur = Uuid::new_v4().to_string();

    for _ in 0..3 {
        create_mission(&app, &expediteur).await;
    }
    // one mission from someone else
    create_mission(&app, &Uuid::new_v4().to_string()).await;

    let res = app
        .clone()
        .oneshot(get_request(&format!(
            "/missions?expediteur_id={expediteur}&page=1&limit=2"
        )))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_json(res).await;
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["total"], 3);
    assert_eq!(page["pagination"]["total_pages"], 2);
    assert_eq!(page["pagination"]["page"], 1);
    assert_eq!(page["pagination"]["limit"], 2);

    let res = app
        .clone()
        .oneshot(get_request("/missions?departure_city=dak"))
        .await
        .unwrap();
    let matches = body_json(res).await;
    assert_eq!(matches["pagination"]["total"], 4);

    let res = app
        .clone()
        .oneshot(get_request("/missions?departure_city=nowhere"))
        .await
        .unwrap();
    let matches = body_json(res).await;
    assert_eq!(matches["pagination"]["total"], 0);

    // limit clamps to the maximum page size
    let res = app
        .oneshot(get_request("/missions?limit=1000"))
        .await
        .unwrap();
    let clamped = body_json(res).await;
    assert_eq!(clamped["pagination"]["limit"], 100);
}

#[tokio::test]
async fn status_filter_matches_exactly() {
    let app = setup();
    let gp_id = Uuid::new_v4().to_string();

    let mission = create_mission(&app, &Uuid::new_v4().to_string()).await;
    create_mission(&app, &Uuid::new_v4().to_string()).await;

    let mission_id = mission["id"].as_str().unwrap().to_string();
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/missions/{mission_id}/accept"),
            json!({ "gp_id": gp_id }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(get_request("/missions?status=accepted"))
        .await
        .unwrap();
    let accepted = body_json(res).await;
    assert_eq!(accepted["pagination"]["total"], 1);
    assert_eq!(accepted["data"][0]["id"], mission_id.as_str());

    let res = app
        .oneshot(get_request(&format!("/missions?gp_id={gp_id}")))
        .await
        .unwrap();
    let carried = body_json(res).await;
    assert_eq!(carried["pagination"]["total"], 1);
}
