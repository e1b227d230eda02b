//! # 생성 문서(Document) 라우트 핸들러
//!
//! 상담 목표, 세션 요약 등 고객별 생성 문서의 CRUD와
//! 발송 상태 관리, 다운로드/미리보기를 처리하는 HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트
//! - `GET    /api/v1/documents`                  → 문서 목록 조회
//! - `POST   /api/v1/documents`                  → 새 문서 생성
//! - `GET    /api/v1/documents/{id}`             → 단일 문서 조회
//! - `PUT    /api/v1/documents/{id}`             → 문서 수정 (부분 업데이트)
//! - `DELETE /api/v1/documents/{id}`             → 문서 삭제
//! - `GET    /api/v1/clients/{id}/documents`     → 고객별 문서 목록
//! - `POST   /api/v1/documents/{id}/send`        → 발송 표시 + 발송 시각 기록
//! - `POST   /api/v1/documents/{id}/unsend`      → 발송 표시/시각 해제 (멱등)
//! - `GET    /api/v1/documents/{id}/download`    → 내용 + 합성 파일명 반환
//! - `GET    /api/v1/documents/{id}/preview`     → 내용 앞부분 미리보기
//! - `POST   /api/v1/documents/{id}/send-reminder` → 리마인더 (프로토타입)
//!
//! 발송 플래그는 설정/해제 두 전이뿐인 단순 불리언입니다 —
//! 발송된 적 없는 문서의 unsend도 막지 않습니다 (멱등한 no-op).

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

/// 미리보기에 포함할 내용의 최대 길이 (유니코드 문자 단위)
const PREVIEW_CHARS: usize = 200;

/// `GET /documents` — 전체 문서 목록을 조회합니다.
pub async fn get_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, AppError> {
    let documents = db::list_documents(&state.pool).await?;
    Ok(Json(documents))
}

/// `GET /documents/{id}` — 단일 문서를 조회합니다.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let document = db::get_document(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;
    Ok(Json(document))
}

/// `GET /clients/{id}/documents` — 특정 고객의 문서 목록을 조회합니다.
///
/// 고객이 존재하지 않으면 빈 배열 대신 404를 반환합니다.
pub async fn get_client_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Document>>, AppError> {
    let client = db::get_client(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    let documents = db::list_documents_for_client(&state.pool, &client.id).await?;
    Ok(Json(documents))
}

/// `POST /documents` — 새 문서를 생성합니다.
///
/// 필수 필드: `clientId`, `type`, `content` — 누락 시 400.
/// 참조 고객이 없으면 404를 반환하고 아무것도 쓰지 않습니다.
/// `sentDate`가 포함되면 ISO 8601로 검증/정규화합니다.
pub async fn create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let client_code = req.client_id.as_deref().filter(|s| !s.is_empty());
    let doc_type = req.doc_type.as_deref().filter(|s| !s.is_empty());
    let content = req.content.as_deref().filter(|s| !s.is_empty());
    let (client_code, doc_type, content) = match (client_code, doc_type, content) {
        (Some(c), Some(t), Some(b)) => (c, t, b),
        _ => {
            return Err(AppError::BadRequest(
                "Client ID, type, and content are required fields".to_string(),
            ))
        }
    };

    // 참조 무결성: 고객 존재 확인을 쓰기 전에 수행합니다 (404)
    let client = db::get_client(&state.pool, client_code)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    // sentDate가 있으면 검증/정규화합니다 (400)
    let sent_date = match req.sent_date.as_deref() {
        Some(raw) => Some(services::normalize_iso_date(raw)?),
        None => None,
    };
    let sent = req.sent.unwrap_or(false);

    let id = uuid::Uuid::now_v7().to_string();
    let display_id = services::generate_display_code(&state.pool, "DOC", "documents").await?;

    let document = db::create_document(
        &state.pool,
        &id,
        &display_id,
        &client.id,
        doc_type,
        content,
        sent,
        sent_date.as_deref(),
    )
    .await?;
    tracing::info!("Created document {} for client {}", document.display_id, client.display_id);

    Ok((StatusCode::CREATED, Json(document)))
}

/// `PUT /documents/{id}` — 문서를 수정합니다 (부분 업데이트).
///
/// `clientId`가 포함되면 새 고객의 존재를 먼저 확인하고(404),
/// `sentDate`가 포함되면 다시 검증/정규화합니다
/// (명시적 null은 발송일을 지웁니다).
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<Document>, AppError> {
    let document = db::get_document(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;

    let resolved_client_id = if let Some(code) = &req.client_id {
        let client = db::get_client(&state.pool, code)
            .await?
            .ok_or(AppError::NotFound("Client"))?;
        Some(client.id)
    } else {
        None
    };

    // Some(Some(raw))일 때만 정규화 — Some(None)은 "null로 지움" 그대로 통과해야
    // 하므로 match로 원래 모양을 보존합니다.
    let mut req = req;
    req.sent_date = match req.sent_date.take() {
        Some(Some(raw)) => Some(Some(services::normalize_iso_date(&raw)?)),
        other => other,
    };

    let updated = db::update_document(&state.pool, &document, &req, resolved_client_id.as_deref())
        .await?
        .ok_or(AppError::NotFound("Document"))?;
    Ok(Json(updated))
}

/// `DELETE /documents/{id}` — 문서를 삭제합니다.
///
/// 성공 시 HTTP 204 No Content를 반환합니다.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = db::delete_document(&state.pool, &id).await?;
    if !deleted {
        return Err(AppError::NotFound("Document"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /documents/{id}/send` — 문서를 발송됨으로 표시합니다.
///
/// `sent = true`로 바꾸고 현재 UTC 시각을 `sentDate`에 기록합니다.
pub async fn send_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let document = db::mark_sent(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;
    tracing::info!("Marked document {} as sent", document.display_id);
    Ok(Json(document))
}

/// `POST /documents/{id}/unsend` — 문서의 발송 표시를 해제합니다.
///
/// `sent`와 `sentDate`를 모두 지웁니다. 반복 호출해도 안전합니다 (멱등).
pub async fn unsend_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let document = db::mark_unsent(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;
    Ok(Json(document))
}

/// `GET /documents/{id}/download` — 문서 내용을 다운로드 형태로 반환합니다.
///
/// 실제 파일을 생성하지 않고, 내용과 합성 파일명만 JSON으로 반환합니다.
/// 파일명은 문서 종류와 표시 코드에서 합성됩니다.
/// 예: `"counselling_objective_DOC-4F2A9C.txt"`
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDownload>, AppError> {
    let document = db::get_document(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;

    let filename = services::document_filename(&document.doc_type, &document.display_id);
    Ok(Json(DocumentDownload {
        content: document.content,
        filename,
    }))
}

/// `GET /documents/{id}/preview` — 문서 내용의 앞부분을 미리보기로 반환합니다.
///
/// 응답: `{ "id", "type", "sent", "preview" }`
/// 미리보기는 내용의 처음 200자입니다.
/// 바이트가 아닌 유니코드 문자 단위로 잘라 멀티바이트 문자에서도 안전합니다.
pub async fn preview_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let document = db::get_document(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;

    // .chars().take(n): 문자 단위로 n개까지만 취합니다.
    let preview: String = document.content.chars().take(PREVIEW_CHARS).collect();
    Ok(Json(json!({
        "id": document.display_id,
        "type": document.doc_type,
        "sent": document.sent,
        "preview": preview,
    })))
}

/// `POST /documents/{id}/send-reminder` — 발송된 문서에 대한 리마인더입니다.
///
/// 프로토타입 동작: 메일러 연동 없이 로그를 남기고 확인 메시지만 반환합니다.
/// 아직 발송되지 않은 문서에는 리마인더를 보낼 수 없으므로 400을 반환합니다.
pub async fn send_document_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let document = db::get_document(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;

    if !document.sent {
        return Err(AppError::BadRequest(
            "Document has not been sent yet".to_string(),
        ));
    }

    tracing::info!(
        "Reminder requested for document {} (client {})",
        document.display_id,
        document.client_display_id
    );
    Ok(Json(json!({
        "message": format!("Reminder sent for document {}", document.display_id)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::routes::clients::{create_client, AppState};

    async fn test_state() -> AppState {
        AppState {
            pool: db::test_pool().await,
        }
    }

    async fn seed_client(state: &AppState, email: &str) -> Client {
        let req = CreateClientRequest {
            name: Some("Alex Johnson".to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        };
        let (_, Json(client)) = create_client(State(state.clone()), Json(req)).await.unwrap();
        client
    }

    fn create_req(client_code: &str) -> CreateDocumentRequest {
        CreateDocumentRequest {
            client_id: Some(client_code.to_string()),
            doc_type: Some("Counselling Objective".to_string()),
            content: Some("Initial objectives focusing on career transition.".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_with_unknown_client_is_404_and_persists_nothing() {
        let state = test_state().await;

        let err = create_document(State(state.clone()), Json(create_req("CLIENT-FFFFFF")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Client")));

        let Json(all) = get_documents(State(state)).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn create_requires_client_type_and_content() {
        let state = test_state().await;
        seed_client(&state, "alex@example.com").await;

        let mut req = create_req("CLIENT-000000");
        req.content = None;
        let err = create_document(State(state), Json(req)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn send_then_unsend_round_trip_is_idempotent() {
        let state = test_state().await;
        let client = seed_client(&state, "alex@example.com").await;
        let (status, Json(document)) =
            create_document(State(state.clone()), Json(create_req(&client.display_id)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(sent) = send_document(
            State(state.clone()),
            Path(document.display_id.clone()),
        )
        .await
        .unwrap();
        assert!(sent.sent);
        assert!(sent.sent_date.is_some());

        let Json(unsent) = unsend_document(
            State(state.clone()),
            Path(document.display_id.clone()),
        )
        .await
        .unwrap();
        assert!(!unsent.sent);
        assert!(unsent.sent_date.is_none());

        // 발송된 적 없는 상태에서 한 번 더 해제해도 같은 결과 (멱등)
        let Json(again) = unsend_document(State(state), Path(document.display_id))
            .await
            .unwrap();
        assert!(!again.sent);
        assert!(again.sent_date.is_none());
    }

    #[tokio::test]
    async fn download_synthesizes_filename_from_type_and_code() {
        let state = test_state().await;
        let client = seed_client(&state, "alex@example.com").await;
        let (_, Json(document)) =
            create_document(State(state.clone()), Json(create_req(&client.display_id)))
                .await
                .unwrap();

        let Json(download) = download_document(State(state), Path(document.display_id.clone()))
            .await
            .unwrap();
        assert_eq!(
            download.filename,
            format!("counselling_objective_{}.txt", document.display_id)
        );
        assert_eq!(download.content, document.content);
    }

    #[tokio::test]
    async fn preview_truncates_long_content_by_chars() {
        let state = test_state().await;
        let client = seed_client(&state, "alex@example.com").await;

        let mut req = create_req(&client.display_id);
        req.content = Some("가".repeat(300)); // 멀티바이트 문자 300자
        let (_, Json(document)) = create_document(State(state.clone()), Json(req))
            .await
            .unwrap();

        let Json(body) = preview_document(State(state), Path(document.display_id))
            .await
            .unwrap();
        let preview = body["preview"].as_str().unwrap();
        assert_eq!(preview.chars().count(), 200);
    }

    #[tokio::test]
    async fn reminder_requires_a_sent_document() {
        let state = test_state().await;
        let client = seed_client(&state, "alex@example.com").await;
        let (_, Json(document)) =
            create_document(State(state.clone()), Json(create_req(&client.display_id)))
                .await
                .unwrap();

        // 아직 발송 전 → 400
        let err = send_document_reminder(
            State(state.clone()),
            Path(document.display_id.clone()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        send_document(
            State(state.clone()),
            Path(document.display_id.clone()),
        )
        .await
        .unwrap();
        let Json(body) = send_document_reminder(State(state), Path(document.display_id.clone()))
            .await
            .unwrap();
        assert_eq!(
            body["message"],
            format!("Reminder sent for document {}", document.display_id)
        );
    }

    #[tokio::test]
    async fn update_accepts_sent_date_null_and_validates_dates() {
        let state = test_state().await;
        let client = seed_client(&state, "alex@example.com").await;
        let (_, Json(document)) =
            create_document(State(state.clone()), Json(create_req(&client.display_id)))
                .await
                .unwrap();

        // 잘못된 sentDate → 400
        let req = UpdateDocumentRequest {
            sent_date: Some(Some("yesterday".to_string())),
            ..Default::default()
        };
        let err = update_document(
            State(state.clone()),
            Path(document.display_id.clone()),
            Json(req),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // 정상 sentDate는 UTC로 정규화되어 저장됩니다.
        let req = UpdateDocumentRequest {
            sent: Some(true),
            sent_date: Some(Some("2024-03-01T10:00:00+01:00".to_string())),
            ..Default::default()
        };
        let Json(updated) = update_document(
            State(state.clone()),
            Path(document.display_id.clone()),
            Json(req),
        )
        .await
        .unwrap();
        assert_eq!(updated.sent_date.as_deref(), Some("2024-03-01T09:00:00Z"));

        // 명시적 null은 발송일을 지웁니다.
        let req = UpdateDocumentRequest {
            sent_date: Some(None),
            ..Default::default()
        };
        let Json(cleared) = update_document(
            State(state),
            Path(document.display_id),
            Json(req),
        )
        .await
        .unwrap();
        assert!(cleared.sent_date.is_none());
    }
}
