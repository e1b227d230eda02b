//! # 코칭 세션 모델 정의
//!
//! 고객과의 코칭 세션 한 회차를 나타내는 데이터 구조체들입니다.
//! 세션은 반드시 기존 고객(Client)을 참조해야 하며,
//! 고객별로 순차적인 회차 번호(session_number)를 가집니다.
//!
//! ## 세션 흐름
//! 1. 세션 예약 → `CreateSessionRequest`로 생성 (날짜는 ISO 8601 검증)
//! 2. 세션 진행 후 → `POST /sessions/:id/complete`로 완료 표시
//! 3. 상담 내용은 `POST /sessions/:id/notes`로 기존 노트에 **추가**됩니다
//!    (덮어쓰지 않고 줄바꿈으로 이어 붙임)

use serde::{Deserialize, Serialize};

/// 코칭 세션 엔티티 — DB의 `sessions` 테이블 한 행에 대응합니다.
///
/// 조회 쿼리는 clients 테이블과 JOIN하여 소유 고객의 공개 코드를
/// `client_display_id`로 함께 가져옵니다 (JSON에서는 `clientId`).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// 내부 기본키 (UUIDv7) — 외부로 노출되지 않습니다.
    #[serde(skip)]
    pub id: String,
    /// 공개 표시 코드 (예: "SESSION-9A41BC") — JSON에서는 `id`로 나갑니다.
    #[serde(rename = "id")]
    pub display_id: String,
    /// 소유 고객의 내부 키 (외래키) — 외부로 노출되지 않습니다.
    #[serde(skip)]
    pub client_id: String,
    /// 소유 고객의 공개 표시 코드 — JSON에서는 `clientId`로 나갑니다.
    #[serde(rename = "clientId")]
    pub client_display_id: String,
    /// 고객별 순차 회차 번호 (1, 2, 3, ...)
    pub session_number: i64,
    /// 세션 예정 일시 — 정규화된 UTC ISO 8601 문자열
    pub date: String,
    /// 세션 분류 라벨 (예: "Initial Consultation", "Follow-up")
    pub category: String,
    pub completed: bool,
    /// 상담 노트 — append 전용으로 운용됩니다 (notes 엔드포인트 참고)
    pub notes: Option<String>,
    /// 화상 미팅 링크 (선택)
    pub zoom_link: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// 세션 생성 요청 — `POST /api/v1/sessions`의 요청 본문에 해당합니다.
///
/// `clientId`(고객 공개 코드), `sessionNumber`, `date`가 필수입니다.
/// 핸들러에서 검증하여 누락 시 400, 고객 미존재 시 404를 반환합니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub client_id: Option<String>,
    pub session_number: Option<i64>,
    /// ISO 8601 일시 문자열 ("2024-01-01T12:00:00Z" 등). 파싱 실패 시 400.
    pub date: Option<String>,
    /// 누락 시 기본값 "Initial Consultation"
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub notes: Option<String>,
    pub zoom_link: Option<String>,
}

/// 세션 부분 업데이트 요청 — `PUT /api/v1/sessions/:id`의 요청 본문에 해당합니다.
///
/// `clientId`를 변경하면 새 고객의 존재 여부를 먼저 확인합니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub client_id: Option<String>,
    pub session_number: Option<i64>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    /// None = 필드 누락 (변경 안 함), Some(None) = null (지움), Some(Some(v)) = 값 지정
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub zoom_link: Option<Option<String>>,
}

/// 미팅 링크 설정 요청 — `POST /api/v1/sessions/:id/zoom`의 요청 본문입니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomLinkRequest {
    /// 필수 — 누락 시 400
    pub zoom_link: Option<String>,
}

/// 노트 추가 요청 — `POST /api/v1/sessions/:id/notes`의 요청 본문입니다.
///
/// 기존 노트를 덮어쓰지 않고 줄바꿈(`\n`)으로 이어 붙입니다.
#[derive(Debug, Deserialize)]
pub struct AddNotesRequest {
    /// 필수 — 누락 시 400
    pub notes: Option<String>,
}

/// 완료 플래그 변경 요청 — `PUT /api/v1/sessions/:id/completed`의 요청 본문입니다.
#[derive(Debug, Deserialize)]
pub struct CompletedRequest {
    /// 필수 — 누락 시 400
    pub completed: Option<bool>,
}
