use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "id")]
    pub display_id: String,
    #[serde(skip)]
    pub client_id: String,
    #[serde(rename = "clientId")]
    pub client_display_id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub content: String,
    pub sent: bool,
    pub sent_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub client_id: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub content: Option<String>,
    pub sent: Option<bool>,
    pub sent_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub client_id: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub content: Option<String>,
    pub sent: Option<bool>,
    /// None = 필드 누락 (변경 안 함), Some(None) = null (발송일 해제), Some(Some(d)) = 날짜 지정
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub sent_date: Option<Option<String>>,
}

/// 다운로드 응답 — 실제 파일을 만들지 않고 내용과 합성 파일명만 반환합니다.
#[derive(Debug, Serialize)]
pub struct DocumentDownload {
    pub content: String,
    pub filename: String,
}
