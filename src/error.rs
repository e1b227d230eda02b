//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! ## 에러 분류 (HTTP 상태 코드 매핑)
//! | 에러 | 상태 코드 | 의미 |
//! |------|-----------|------|
//! | `BadRequest` | 400 | 필수 필드 누락, 잘못된 날짜 형식 등 |
//! | `NotFound` | 404 | 식별자로 리소스를 찾지 못함 |
//! | `Conflict` | 409 | 유니크 필드 중복 (이메일 등) |
//! | `Database`, `Internal` | 500 | 그 외 처리되지 않은 내부 오류 |

use axum::{
    http::StatusCode,                   // HTTP 상태 코드 (200, 404, 500 등)
    response::{IntoResponse, Response}, // Axum의 응답 변환 트레이트
    Json,                               // JSON 응답 래퍼
};
use serde_json::json; // json! 매크로: JSON 객체를 간편하게 생성
use thiserror::Error; // thiserror: 커스텀 에러 타입을 쉽게 만들어주는 매크로 크레이트

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    ///
    /// &'static str로 리소스 이름을 담아 "Client not found"처럼
    /// 어떤 리소스가 없었는지 구분해 응답합니다.
    /// (세션/문서 생성 시 참조 고객이 없는 경우와
    ///  세션/문서 자체가 없는 경우를 구분해야 하기 때문)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// 잘못된 요청 (HTTP 400)
    /// String을 포함하여 구체적인 에러 메시지를 전달합니다.
    /// {0}은 첫 번째 필드(String)를 참조하는 포맷 문법입니다.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 리소스 충돌 (HTTP 409) — 이메일 중복 등 유니크 제약 위반
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx::Error를 AppError로 자동 변환하는 From 트레이트를 구현합니다.
    /// 이를 통해 sqlx 함수에서 반환된 에러에 `?` 연산자를 사용하면
    /// 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// impl IntoResponse for AppError:
// 핸들러가 Err(AppError)를 반환하면 Axum이 이 메서드를 호출하여
// 적절한 HTTP 응답을 생성합니다.
impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 각 에러 종류에 따라 적절한 HTTP 상태 코드와 JSON 에러 메시지를 생성합니다.
    /// 내부 에러(Database, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다 (보안을 위해).
    fn into_response(self) -> Response {
        // match: 패턴 매칭. enum의 각 variant에 대해 다른 처리를 합니다.
        // (status, code, message) 튜플을 반환합니다.
        let (status, code, message) = match self {
            // NotFound("Client") → (404, "not_found", "Client not found")
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),

            // ref: 패턴 매칭에서 값을 이동(move)하지 않고 참조만 빌려옵니다.
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Internal(ref msg) => {
                // 내부 에러는 로그에 기록 (서버 관리자용)
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    // 클라이언트에는 일반적인 메시지만 반환 (보안: 내부 구현 노출 방지)
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        // JSON 응답 본문을 생성합니다.
        // 결과: { "error": { "code": "not_found", "message": "Client not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Axum은 튜플 (상태코드, 본문)을 자동으로 HTTP 응답으로 변환합니다.
        (status, body).into_response()
    }
}
