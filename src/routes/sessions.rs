//! # 코칭 세션 API 라우트 핸들러
//!
//! 코칭 세션의 CRUD와 완료 표시, 미팅 링크, 노트 추가를 처리하는
//! HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/sessions | `get_sessions` | 세션 목록 |
//! | POST | /api/v1/sessions | `create_session` | 새 세션 생성 |
//! | GET | /api/v1/sessions/{id} | `get_session` | 단일 세션 조회 |
//! | PUT | /api/v1/sessions/{id} | `update_session` | 부분 업데이트 |
//! | DELETE | /api/v1/sessions/{id} | `delete_session` | 세션 삭제 |
//! | GET | /api/v1/clients/{id}/sessions | `get_client_sessions` | 고객별 세션 목록 |
//! | POST | /api/v1/sessions/{id}/complete | `complete_session` | 완료 표시 |
//! | POST/GET | /api/v1/sessions/{id}/zoom | `set_zoom_link` / `get_zoom_link` | 미팅 링크 |
//! | POST/GET | /api/v1/sessions/{id}/notes | `add_session_notes` / `get_session_notes` | 노트 |
//! | GET/PUT | /api/v1/sessions/{id}/completed | `get_session_completed` / `set_session_completed` | 완료 플래그 |
//!
//! ## 참조 무결성
//! 세션을 생성하거나 `clientId`를 바꾸는 업데이트는
//! 참조 고객이 존재하는지 **쓰기 전에** 확인합니다.
//! 고객이 없으면 아무 행도 쓰지 않고 404 "Client not found"를 반환합니다.

use crate::{
    db,
    error::AppError,
    models::*,
    routes::clients::AppState,
    services,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /sessions` — 전체 세션 목록을 조회합니다.
pub async fn get_sessions(State(state): State<AppState>) -> Result<Json<Vec<Session>>, AppError> {
    let sessions = db::list_sessions(&state.pool).await?;
    Ok(Json(sessions))
}

/// `GET /sessions/{id}` — 단일 세션을 조회합니다.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let session = db::get_session(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(session))
}

/// `GET /clients/{id}/sessions` — 특정 고객의 세션 목록을 조회합니다.
///
/// 고객 존재 여부를 먼저 확인합니다 — 존재하지 않는 고객이면
/// 빈 배열 대신 404를 반환하기 위함입니다.
pub async fn get_client_sessions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Session>>, AppError> {
    let client = db::get_client(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    let sessions = db::list_sessions_for_client(&state.pool, &client.id).await?;
    Ok(Json(sessions))
}

/// `POST /sessions` — 새 세션을 생성합니다.
///
/// 필수 필드: `clientId`, `sessionNumber`, `date` — 누락 시 400.
/// `date`는 ISO 8601로 파싱되어야 하며(`Z` 접미사 UTC 허용),
/// 실패하면 400을 반환합니다. 참조 고객이 없으면 404를 반환하고
/// 아무것도 쓰지 않습니다.
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    // 필수 필드 검증 (400)
    let client_code = req.client_id.as_deref().filter(|s| !s.is_empty());
    let (client_code, session_number, date_raw) =
        match (client_code, req.session_number, req.date.as_deref()) {
            (Some(c), Some(n), Some(d)) => (c, n, d),
            _ => {
                return Err(AppError::BadRequest(
                    "Client ID, session number, and date are required fields".to_string(),
                ))
            }
        };

    // 참조 무결성: 고객 존재 확인을 쓰기 전에 수행합니다 (404)
    let client = db::get_client(&state.pool, client_code)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    // 날짜 검증/정규화 (400)
    let date = services::normalize_iso_date(date_raw)?;

    let id = uuid::Uuid::now_v7().to_string();
    let display_id = services::generate_display_code(&state.pool, "SESSION", "sessions").await?;

    let session = db::create_session(
        &state.pool,
        &id,
        &display_id,
        &client.id, // 내부 키로 연결합니다
        session_number,
        &date,
        &req,
    )
    .await?;
    tracing::info!("Created session {} for client {}", session.display_id, client.display_id);

    Ok((StatusCode::CREATED, Json(session)))
}

/// `PUT /sessions/{id}` — 세션을 수정합니다 (부분 업데이트).
///
/// `clientId`가 포함되면 새 고객의 존재를 먼저 확인하고(404),
/// `date`가 포함되면 다시 검증/정규화합니다(400).
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<Session>, AppError> {
    let session = db::get_session(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Session"))?;

    // clientId 변경 요청이면 공개 코드 → 내부 키로 해석합니다.
    let resolved_client_id = if let Some(code) = &req.client_id {
        let client = db::get_client(&state.pool, code)
            .await?
            .ok_or(AppError::NotFound("Client"))?;
        Some(client.id)
    } else {
        None
    };

    // 날짜가 포함되면 제자리에서 정규화하여 db 계층에 넘깁니다.
    // mut req: Json 추출기가 소유권을 넘겨주므로 가변으로 재선언할 수 있습니다.
    // .take(): Option에서 값을 꺼내고 None을 남깁니다 (빌림 충돌 없이 교체 가능).
    let mut req = req;
    if let Some(date) = req.date.take() {
        req.date = Some(services::normalize_iso_date(&date)?);
    }

    let updated = db::update_session(&state.pool, &session, &req, resolved_client_id.as_deref())
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(updated))
}

/// `DELETE /sessions/{id}` — 세션을 삭제합니다.
///
/// 고객과 형제 세션/문서에는 영향을 주지 않습니다.
/// 성공 시 HTTP 204 No Content를 반환합니다.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = db::delete_session(&state.pool, &id).await?;
    if !deleted {
        return Err(AppError::NotFound("Session"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /sessions/{id}/complete` — 세션을 완료 상태로 표시합니다.
pub async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let session = db::complete_session(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(session))
}

/// `POST /sessions/{id}/zoom` — 세션의 미팅 링크를 설정합니다.
///
/// `zoomLink` 필드가 필수이며 누락 시 400을 반환합니다.
pub async fn set_zoom_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ZoomLinkRequest>,
) -> Result<Json<Session>, AppError> {
    let zoom_link = req
        .zoom_link
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Zoom link is required".to_string()))?;

    let session = db::set_zoom_link(&state.pool, &id, zoom_link)
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(session))
}

/// `GET /sessions/{id}/zoom` — 세션의 미팅 링크만 조회합니다.
///
/// 응답: `{ "zoomLink": "https://..." }` (설정 전이면 null)
pub async fn get_zoom_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session = db::get_session(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(json!({ "zoomLink": session.zoom_link })))
}

/// `POST /sessions/{id}/notes` — 세션 노트에 새 텍스트를 추가합니다.
///
/// 기존 노트를 덮어쓰지 않고 줄바꿈으로 이어 붙입니다.
/// `notes` 필드가 필수이며 누락 시 400을 반환합니다.
pub async fn add_session_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddNotesRequest>,
) -> Result<Json<Session>, AppError> {
    let notes = req
        .notes
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Notes are required".to_string()))?;

    let session = db::append_notes(&state.pool, &id, notes)
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(session))
}

/// `GET /sessions/{id}/notes` — 세션 노트만 조회합니다.
///
/// 응답: `{ "notes": "..." }` (노트가 없으면 null)
pub async fn get_session_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session = db::get_session(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(json!({ "notes": session.notes })))
}

/// `GET /sessions/{id}/completed` — 완료 플래그만 조회합니다.
///
/// 응답: `{ "completed": true }`
pub async fn get_session_completed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session = db::get_session(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(json!({ "completed": session.completed })))
}

/// `PUT /sessions/{id}/completed` — 완료 플래그를 지정한 값으로 설정합니다.
///
/// `completed` 필드(불리언)가 필수이며 누락 시 400을 반환합니다.
/// 설정/해제 두 전이뿐이며 순서 강제는 없습니다.
pub async fn set_session_completed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CompletedRequest>,
) -> Result<Json<Session>, AppError> {
    let completed = req
        .completed
        .ok_or_else(|| AppError::BadRequest("Completed is a required field".to_string()))?;

    let session = db::set_completed(&state.pool, &id, completed)
        .await?
        .ok_or(AppError::NotFound("Session"))?;
    Ok(Json(session))
}
