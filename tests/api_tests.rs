// HTTP API tests for Roommate Match

use actix_web::{test, web, App};
use roommate_match::core::Matcher;
use roommate_match::routes::{
    configure_routes, handle_json_payload_error, handle_query_payload_error, AppState,
};
use roommate_match::services::{CacheManager, InMemoryRepository, RankingLimits, RoommateService};
use serde_json::{json, Value};
use std::sync::Arc;

fn create_state() -> AppState {
    AppState {
        service: RoommateService::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(CacheManager::in_memory(100, 60)),
            Matcher::with_default_weights(),
            RankingLimits::default(),
        ),
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
                .configure(configure_routes),
        )
        .await
    };
}

fn preferences_body(user_id: &str, cleanliness: u8, age_range: (u8, u8)) -> Value {
    json!({
        "userId": user_id,
        "cleanlinessLevel": cleanliness,
        "noiseLevel": 2,
        "sleepSchedule": "early_bird",
        "dietPreferences": "no_restrictions",
        "smokingPreferences": "no",
        "petsPreferences": "no",
        "guestPreferences": "sometimes",
        "ageRangeMin": age_range.0,
        "ageRangeMax": age_range.1,
        "interests": ["hiking", "cooking"]
    })
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!(create_state());

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_preferences_roundtrip() {
    let app = init_app!(create_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/preferences")
        .set_json(preferences_body("u1", 4, (22, 30)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/v1/roommates/preferences?userId=u1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["cleanlinessLevel"], 4);
    assert_eq!(body["fingerprint"], "4-2-early_bird-no-no");

    let req = test::TestRequest::delete()
        .uri("/api/v1/roommates/preferences?userId=u1")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let req = test::TestRequest::get()
        .uri("/api/v1/roommates/preferences?userId=u1")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_invalid_preferences_rejected() {
    let app = init_app!(create_state());

    let mut body = preferences_body("u1", 9, (22, 30));
    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/preferences")
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    body["cleanlinessLevel"] = json!(3);
    body["ageRangeMin"] = json!(40);
    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/preferences")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "invalid_preferences");

    body["ageRangeMin"] = json!(22);
    body["sleepSchedule"] = json!("whenever");
    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/preferences")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "invalid_json");
}

#[actix_web::test]
async fn test_find_requires_preferences() {
    let app = init_app!(create_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/find")
        .set_json(json!({ "userId": "ghost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "preferences_required");
    assert_eq!(error["statusCode"], 400);
}

#[actix_web::test]
async fn test_find_ranks_candidates() {
    let app = init_app!(create_state());

    for (id, cleanliness, ages) in [("me", 4, (22, 30)), ("a", 4, (24, 32)), ("b", 3, (20, 28)), ("c", 4, (45, 55))] {
        let req = test::TestRequest::post()
            .uri("/api/v1/roommates/preferences")
            .set_json(preferences_body(id, cleanliness, ages))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/find")
        .set_json(json!({ "userId": "me", "limit": 5 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["totalCandidates"], 3);
    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["userId"], "a");
    assert_eq!(candidates[0]["compatibility"], 100);
    assert_eq!(candidates[1]["userId"], "b");
    assert_eq!(candidates[1]["compatibility"], 97);

    let profile = &candidates[0]["preferences"];
    assert_eq!(profile["cleanlinessLevel"], 4);
    assert_eq!(profile["sleepSchedule"], "early_bird");
    assert_eq!(profile["ageRangeMin"], 24);
    assert_eq!(profile["ageRangeMax"], 32);
    assert_eq!(profile["interests"], json!(["cooking", "hiking"]));
    assert_eq!(candidates[1]["preferences"]["cleanlinessLevel"], 3);

    // Served from cache the second time; the profile must survive that
    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/find")
        .set_json(json!({ "userId": "me", "limit": 5 }))
        .to_request();
    let cached: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cached["candidates"], body["candidates"]);
}

macro_rules! submit_preferences {
    ($app:expr, $user_id:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/roommates/preferences")
            .set_json(preferences_body($user_id, 4, (22, 30)))
            .to_request();
        assert!(test::call_service(&$app, req).await.status().is_success());
    }};
}

#[actix_web::test]
async fn test_match_lifecycle_over_http() {
    let app = init_app!(create_state());
    submit_preferences!(app, "a");
    submit_preferences!(app, "b");

    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/matches")
        .set_json(json!({ "userId": "a", "targetUserId": "b", "compatibilityScore": 82 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/matches")
        .set_json(json!({ "userId": "b", "targetUserId": "a", "compatibilityScore": 82 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::get()
        .uri("/api/v1/roommates/matches?userId=b")
        .to_request();
    let views: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(views[0]["otherUserId"], "a");
    assert_eq!(views[0]["compatibilityScore"], 82);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/roommates/matches/{}/status", id))
        .set_json(json!({ "actingUserId": "mallory", "status": "accepted" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/roommates/matches/{}/status", id))
        .set_json(json!({ "actingUserId": "b", "status": "maybe" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/roommates/matches/{}/status", id))
        .set_json(json!({ "actingUserId": "b", "status": "accepted" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["status"], "accepted");

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/roommates/matches/{}/status", id))
        .set_json(json!({ "actingUserId": "a", "status": "rejected" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);
}

#[actix_web::test]
async fn test_match_creation_errors() {
    let app = init_app!(create_state());
    submit_preferences!(app, "a");
    submit_preferences!(app, "b");

    let cases = [
        (json!({ "userId": "a", "targetUserId": "b" }), "missing_score"),
        (json!({ "userId": "a", "targetUserId": "b", "compatibilityScore": 140 }), "invalid_score"),
        (json!({ "userId": "a", "targetUserId": "a", "compatibilityScore": 70 }), "self_match"),
    ];

    for (body, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/roommates/matches")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let error: Value = test::read_body_json(resp).await;
        assert_eq!(error["error"], expected);
    }
}

#[actix_web::test]
async fn test_match_with_unknown_target() {
    let app = init_app!(create_state());
    submit_preferences!(app, "a");

    let req = test::TestRequest::post()
        .uri("/api/v1/roommates/matches")
        .set_json(json!({ "userId": "a", "targetUserId": "ghost", "compatibilityScore": 70 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "not_found");
}

#[actix_web::test]
async fn test_unknown_match_id() {
    let app = init_app!(create_state());

    for id in ["not-a-uuid", "7f9c24e8-3b12-4fef-91e7-64a1f0b0e8a1"] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/roommates/matches/{}/status", id))
            .set_json(json!({ "actingUserId": "a", "status": "accepted" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}

#[actix_web::test]
async fn test_missing_query_parameter() {
    let app = init_app!(create_state());

    let req = test::TestRequest::get().uri("/api/v1/roommates/matches").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "invalid_query");
}
