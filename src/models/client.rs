//! # 고객(Client) 모델 정의
//!
//! 코칭 프로그램을 받는 고객 한 명을 나타내는 데이터 구조체들입니다.
//! 고객은 0개 이상의 세션(Session)과 문서(Document)를 소유하며,
//! 고객이 삭제되면 소속 세션/문서도 함께 삭제됩니다 (DB CASCADE).
//!
//! ## 식별자 체계
//! - `id`: 내부 기본키(UUIDv7). API에 노출하지 않습니다.
//! - `display_id`: 공개 식별자 (예: "CLIENT-3F9A2C"). JSON에서는 `id`로 나갑니다.

use serde::{Deserialize, Serialize};

/// 고객 엔티티 — DB의 `clients` 테이블 한 행에 대응합니다.
///
/// `#[serde(rename_all = "camelCase")]`: JSON 직렬화 시 snake_case 필드명을
/// camelCase(createdAt 등)로 변환합니다. 프론트엔드 API 규약에 맞추기 위함입니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// 내부 기본키 (UUIDv7) — 직렬화에서 제외되어 외부로 노출되지 않습니다.
    #[serde(skip)]
    pub id: String,
    /// 공개 표시 코드 — JSON에서는 `id` 필드로 나갑니다.
    #[serde(rename = "id")]
    pub display_id: String,
    pub name: String,
    /// 이메일 — 전역 유일 (중복 시 409 Conflict)
    pub email: String,
    pub phone: Option<String>,
    /// 유입 경로 (예: "LinkedIn", "Website", "Referral")
    pub source: Option<String>,
    /// 파이프라인 단계 라벨 (자유 텍스트)
    /// 예: "Initial Contact" → "First Session Scheduled" → ...
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// 고객 생성 요청 — `POST /api/v1/clients`의 요청 본문에 해당합니다.
///
/// `name`과 `email`은 의미상 필수지만 Option으로 선언합니다.
/// 필수 필드를 구조체 차원에서 강제하면 누락 시 Axum이 422를 반환하는데,
/// 이 API는 원래 규약대로 400 Bad Request를 반환해야 하므로
/// 핸들러에서 직접 검증합니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    /// 누락 시 기본값 "Initial Contact"가 적용됩니다.
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// 고객 부분 업데이트 요청 — `PUT /api/v1/clients/:id`의 요청 본문에 해당합니다.
///
/// 요청에 포함된 필드만 변경됩니다.
/// NOT NULL 컬럼(name/email/status)은 단일 Option,
/// nullable 컬럼(phone/source/notes)은 이중 Option을 사용해
/// "누락"과 "명시적 null"(NULL로 지우기)을 구분합니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    /// 이메일 변경 시 유일성을 다시 검증합니다 (중복이면 409).
    pub email: Option<String>,
    pub status: Option<String>,
    /// None = 필드 누락 (변경 안 함), Some(None) = null (지움), Some(Some(v)) = 값 지정
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub source: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub notes: Option<Option<String>>,
}

/// 상태 변경 요청 — `PUT /api/v1/clients/:id/status`의 요청 본문에 해당합니다.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// 새 파이프라인 단계 라벨 (필수 — 누락 시 400)
    pub status: Option<String>,
}
