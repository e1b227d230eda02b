//! # 고객(Client) 라우트 핸들러
//!
//! 고객 디렉터리의 CRUD와 파이프라인 상태 변경을 처리하는
//! HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트
//! - `GET    /api/v1/clients`            → 고객 목록 조회
//! - `POST   /api/v1/clients`            → 새 고객 생성 (이메일 중복 시 409)
//! - `GET    /api/v1/clients/{id}`       → 단일 고객 조회
//! - `PUT    /api/v1/clients/{id}`       → 고객 수정 (부분 업데이트)
//! - `DELETE /api/v1/clients/{id}`       → 고객 삭제 (세션/문서 CASCADE)
//! - `PUT    /api/v1/clients/{id}/status`→ 파이프라인 상태만 변경
//!
//! ## Axum 핸들러 패턴
//! Axum 핸들러는 **Extractor(추출기)**를 매개변수로 받습니다.
//! Extractor는 HTTP 요청에서 데이터를 자동으로 추출합니다:
//! - `State(state)`: 앱 전역 상태 (DB 풀)
//! - `Path(id)`: URL 경로 파라미터 (예: /clients/{id}에서 id)
//! - `Json(body)`: 요청 본문을 JSON으로 파싱하여 구조체로 변환
//!
//! 반환 타입이 `Result<T, AppError>`이면, Axum이 자동으로:
//! - `Ok(T)` → T를 HTTP 응답으로 변환 (IntoResponse 트레이트 사용)
//! - `Err(AppError)` → AppError를 에러 JSON 응답으로 변환

use crate::{
    db,              // 데이터베이스 접근 계층
    error::AppError,
    models::*,       // 데이터 모델 구조체들
    services,        // 표시 코드 생성 등 비즈니스 로직
};
use axum::{
    extract::{Path, State}, // Axum Extractor: 요청에서 데이터 추출
    http::StatusCode,       // HTTP 상태 코드 (201, 204 등)
    Json,                   // JSON 요청/응답 래퍼
};
use sqlx::SqlitePool; // SQLite 연결 풀 타입

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// Axum의 의존성 주입(Dependency Injection) 메커니즘입니다.
///
/// SqlitePool은 내부적으로 Arc(참조 카운트)를 사용하므로
/// clone해도 실제 연결 풀이 복제되지 않고 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
}

/// `GET /clients` — 전체 고객 목록을 조회합니다.
///
/// 고객이 없으면 빈 배열 `[]`을 반환합니다 (항상 200).
pub async fn get_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, AppError> {
    let clients = db::list_clients(&state.pool).await?;
    Ok(Json(clients))
}

/// `GET /clients/{id}` — 공개 표시 코드로 단일 고객을 조회합니다.
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Client>, AppError> {
    let client = db::get_client(&state.pool, &id)
        .await?
        // .ok_or(): Option이 None이면 지정한 에러를 반환합니다.
        // 고객을 찾지 못하면 404 Not Found 응답이 됩니다.
        .ok_or(AppError::NotFound("Client"))?;
    Ok(Json(client))
}

/// `POST /clients` — 새 고객을 생성합니다.
///
/// 필수 필드: `name`, `email` — 누락 시 400.
/// 이미 등록된 이메일이면 409 Conflict를 반환하고 아무것도 쓰지 않습니다.
/// 성공 시 201 Created와 생성된 고객을 반환합니다.
pub async fn create_client(
    State(state): State<AppState>,
    Json(req): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    // 필수 필드 검증 — 구조체 차원이 아니라 여기서 검사해야
    // 422가 아닌 400으로 응답할 수 있습니다 (models/client.rs 참고).
    // .filter(|s| !s.is_empty()): 빈 문자열도 누락으로 취급합니다.
    let name = req
        .name
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Name and email are required fields".to_string()))?;
    let email = req
        .email
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Name and email are required fields".to_string()))?;

    // 이메일 유일성 검사 — 쓰기 전에 확인하여 409로 응답합니다.
    // (DB의 UNIQUE 제약이 최후의 안전장치 역할을 합니다)
    if db::email_in_use(&state.pool, email, None).await? {
        return Err(AppError::Conflict(
            "A client with this email already exists".to_string(),
        ));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let display_id = services::generate_display_code(&state.pool, "CLIENT", "clients").await?;

    let client = db::create_client(&state.pool, &id, &display_id, name, email, &req).await?;
    tracing::info!("Created client {}", client.display_id);

    // 튜플 (상태코드, 본문): Axum이 201 Created 응답으로 변환합니다.
    Ok((StatusCode::CREATED, Json(client)))
}

/// `PUT /clients/{id}` — 고객을 수정합니다 (부분 업데이트).
///
/// 요청 본문에 포함된 필드만 변경됩니다.
/// 이메일을 바꾸는 경우 유일성을 다시 검증합니다 (중복이면 409).
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateClientRequest>,
) -> Result<Json<Client>, AppError> {
    // 대상 고객을 먼저 조회합니다 (404 판정 + 이메일 검증에 필요)
    let client = db::get_client(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    // 이메일 변경 시에만 유일성을 재검증합니다.
    // 자기 자신의 이메일(변경 없음)은 중복으로 치지 않습니다.
    if let Some(email) = &req.email {
        if email != &client.email && db::email_in_use(&state.pool, email, Some(&client.id)).await? {
            return Err(AppError::Conflict(
                "A client with this email already exists".to_string(),
            ));
        }
    }

    let updated = db::update_client(&state.pool, &client, &req)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
    Ok(Json(updated))
}

/// `DELETE /clients/{id}` — 고객을 삭제합니다.
///
/// 외래키 CASCADE에 의해 소속 세션/문서도 함께 삭제됩니다.
/// 성공 시 HTTP 204 No Content를 반환합니다 (본문 없음).
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = db::delete_client(&state.pool, &id).await?;
    if !deleted {
        return Err(AppError::NotFound("Client"));
    }

    tracing::info!("Deleted client {} (sessions/documents cascaded)", id);
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /clients/{id}/status` — 파이프라인 상태만 변경하는 편의 엔드포인트입니다.
///
/// `status` 필드가 필수이며 누락 시 400을 반환합니다.
pub async fn update_client_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Client>, AppError> {
    let status = req
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Status is a required field".to_string()))?;

    let client = db::set_client_status(&state.pool, &id, status)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
    Ok(Json(client))
}
