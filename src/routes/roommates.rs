use crate::core::CoreError;
use crate::models::{
    CreateMatchRequest, ErrorResponse, FindRoommatesRequest, FindRoommatesResponse,
    HealthResponse, SubmitPreferencesRequest, UpdateMatchStatusRequest, UserQuery,
};
use crate::services::{RoommateService, ServiceError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: RoommateService,
}

/// Configure all roommate routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/roommates/preferences", web::post().to(submit_preferences))
        .route("/roommates/preferences", web::get().to(get_preferences))
        .route("/roommates/preferences", web::delete().to(delete_preferences))
        .route("/roommates/find", web::post().to(find_roommates))
        .route("/roommates/matches", web::post().to(create_match))
        .route("/roommates/matches", web::get().to(list_matches))
        .route(
            "/roommates/matches/{id}/status",
            web::put().to(update_match_status),
        );
}

fn status_for(err: &ServiceError) -> (StatusCode, &'static str) {
    match err {
        ServiceError::Core(core) => match core {
            CoreError::PreconditionMissing(_) => (StatusCode::BAD_REQUEST, "preferences_required"),
            CoreError::InvalidPreferences(_) => (StatusCode::BAD_REQUEST, "invalid_preferences"),
            CoreError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "invalid_status"),
            CoreError::InvalidScore(_) => (StatusCode::BAD_REQUEST, "invalid_score"),
            CoreError::MissingScore => (StatusCode::BAD_REQUEST, "missing_score"),
            CoreError::SelfMatch(_) => (StatusCode::BAD_REQUEST, "self_match"),
            CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            CoreError::DuplicateMatch(_, _) => (StatusCode::CONFLICT, "duplicate_match"),
            CoreError::DuplicatePreferences(_) => (StatusCode::CONFLICT, "duplicate_preferences"),
            CoreError::TerminalStatus(_) => (StatusCode::CONFLICT, "terminal_status"),
        },
        ServiceError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
    }
}

/// Map a service failure onto the JSON error body
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let (status, error) = status_for(err);

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected ({}): {}", error, err);
    }

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code: status.as_u16(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.service.health_check().await.unwrap_or(false);
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Create or replace a user's preferences
///
/// POST /api/v1/roommates/preferences
async fn submit_preferences(
    state: web::Data<AppState>,
    req: web::Json<SubmitPreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for preferences of {}: {}", req.user_id, errors);
        return validation_failed(errors);
    }

    let preferences = match req.to_preferences() {
        Ok(preferences) => preferences,
        Err(e) => return error_response(&e.into()),
    };

    match state.service.submit_preferences(&req.user_id, preferences).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/roommates/preferences?userId={userId}
async fn get_preferences(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    match state.service.get_preferences(&query.user_id).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/v1/roommates/preferences?userId={userId}
async fn delete_preferences(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    match state.service.delete_preferences(&query.user_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Rank potential roommates for a user
///
/// POST /api/v1/roommates/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 20,
///   "minScore": 50
/// }
/// ```
async fn find_roommates(
    state: web::Data<AppState>,
    req: web::Json<FindRoommatesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_roommates request: {}", errors);
        return validation_failed(errors);
    }

    let user_id = &req.user_id;
    tracing::info!("Finding roommates for user: {}, limit: {:?}", user_id, req.limit);

    match state
        .service
        .find_roommates(user_id, req.limit.map(usize::from), req.min_score)
        .await
    {
        Ok(result) => {
            tracing::info!(
                "Returning {} roommates for user {} (from {} candidates)",
                result.candidates.len(),
                user_id,
                result.total_candidates
            );
            HttpResponse::Ok().json(FindRoommatesResponse {
                candidates: result.candidates,
                total_candidates: result.total_candidates,
            })
        }
        Err(e) => error_response(&e),
    }
}

/// Propose a match
///
/// POST /api/v1/roommates/matches
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string",
///   "compatibilityScore": 80
/// }
/// ```
async fn create_match(
    state: web::Data<AppState>,
    req: web::Json<CreateMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    match state
        .service
        .create_match(&req.user_id, &req.target_user_id, req.compatibility_score)
        .await
    {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/roommates/matches?userId={userId}
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    match state.service.list_matches(&query.user_id).await {
        Ok(views) => HttpResponse::Ok().json(views),
        Err(e) => error_response(&e),
    }
}

/// Accept or reject a match
///
/// PUT /api/v1/roommates/matches/{id}/status
///
/// Request body:
/// ```json
/// {
///   "actingUserId": "string",
///   "status": "accepted|rejected"
/// }
/// ```
async fn update_match_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateMatchStatusRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let raw_id = path.into_inner();
    // Malformed ids can never name a stored match
    let match_id = match Uuid::parse_str(&raw_id) {
        Ok(id) => id,
        Err(_) => return error_response(&CoreError::NotFound(format!("match {}", raw_id)).into()),
    };

    match state
        .service
        .update_match_status(match_id, &req.acting_user_id, &req.status)
        .await
    {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => error_response(&e),
    }
}
