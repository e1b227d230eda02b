//! # 생성 문서(Document) 데이터베이스 쿼리 모듈
//!
//! `documents` 테이블에 대한 CRUD와 발송 상태(send/unsend) 쿼리를 담당합니다.
//!
//! 발송 상태의 불변식: `sent = false`이면 `sent_date`는 NULL입니다.
//! 이 관계는 저장된 제약이 아니라 mark_sent/mark_unsent 연산이 유지합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 모든 문서를 최근 생성 순으로 조회합니다.
pub async fn list_documents(pool: &SqlitePool) -> Result<Vec<Document>, AppError> {
    let documents = sqlx::query_as::<_, Document>(
        r#"
        SELECT d.id, d.display_id, d.client_id, c.display_id AS client_display_id,
               d.doc_type, d.content, d.sent, d.sent_date, d.created_at, d.updated_at
        FROM documents d
        JOIN clients c ON c.id = d.client_id
        ORDER BY d.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(documents)
}

/// 특정 고객의 모든 문서를 조회합니다.
///
/// `client_id`는 내부 키입니다 — 호출부가 공개 코드로 고객을 먼저 조회한 뒤
/// (404 판정 포함) 내부 키를 넘깁니다.
pub async fn list_documents_for_client(
    pool: &SqlitePool,
    client_id: &str,
) -> Result<Vec<Document>, AppError> {
    let documents = sqlx::query_as::<_, Document>(
        r#"
        SELECT d.id, d.display_id, d.client_id, c.display_id AS client_display_id,
               d.doc_type, d.content, d.sent, d.sent_date, d.created_at, d.updated_at
        FROM documents d
        JOIN clients c ON c.id = d.client_id
        WHERE d.client_id = ?
        ORDER BY d.created_at DESC
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(documents)
}

/// 공개 표시 코드로 문서 하나를 조회합니다.
pub async fn get_document(
    pool: &SqlitePool,
    display_id: &str,
) -> Result<Option<Document>, AppError> {
    let document = sqlx::query_as::<_, Document>(
        r#"
        SELECT d.id, d.display_id, d.client_id, c.display_id AS client_display_id,
               d.doc_type, d.content, d.sent, d.sent_date, d.created_at, d.updated_at
        FROM documents d
        JOIN clients c ON c.id = d.client_id
        WHERE d.display_id = ?
        "#,
    )
    .bind(display_id)
    .fetch_optional(pool)
    .await?;

    Ok(document)
}

/// 새 문서를 생성합니다.
///
/// # 매개변수
/// - `client_id`: 소유 고객의 **내부** 키 (호출부에서 존재 확인 완료)
/// - `doc_type`, `content`: 핸들러에서 필수 검증을 마친 값
/// - `sent_date`: 핸들러에서 ISO 8601 검증/정규화를 마친 값 (선택)
pub async fn create_document(
    pool: &SqlitePool,
    id: &str,
    display_id: &str,
    client_id: &str,
    doc_type: &str,
    content: &str,
    sent: bool,
    sent_date: Option<&str>,
) -> Result<Document, AppError> {
    sqlx::query(
        r#"
        INSERT INTO documents (id, display_id, client_id, doc_type, content, sent, sent_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(display_id)
    .bind(client_id)
    .bind(doc_type)
    .bind(content)
    .bind(sent)
    .bind(sent_date)
    .execute(pool)
    .await?;

    get_document(pool, display_id)
        .await?
        .ok_or(AppError::Internal(
            "Failed to retrieve created document".to_string(),
        ))
}

/// 문서를 수정합니다 (부분 업데이트).
///
/// 요청에 포함된 필드만 개별 UPDATE 문으로 갱신하며,
/// 트랜잭션으로 묶어 실패 시 전체 롤백합니다.
pub async fn update_document(
    pool: &SqlitePool,
    document: &Document,
    req: &UpdateDocumentRequest,
    client_id: Option<&str>,
) -> Result<Option<Document>, AppError> {
    let mut tx = pool.begin().await?;

    if let Some(new_client) = client_id {
        sqlx::query("UPDATE documents SET client_id = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(new_client)
            .bind(&document.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(doc_type) = &req.doc_type {
        sqlx::query("UPDATE documents SET doc_type = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(doc_type)
            .bind(&document.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(content) = &req.content {
        sqlx::query("UPDATE documents SET content = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(content)
            .bind(&document.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(sent) = req.sent {
        sqlx::query("UPDATE documents SET sent = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(sent)
            .bind(&document.id)
            .execute(&mut *tx)
            .await?;
    }

    // 이중 Option: Some(None)은 명시적 null → 발송일을 NULL로 지웁니다.
    if let Some(sent_date) = &req.sent_date {
        sqlx::query("UPDATE documents SET sent_date = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(sent_date.as_deref())
            .bind(&document.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    get_document(pool, &document.display_id).await
}

/// 문서를 삭제합니다.
pub async fn delete_document(pool: &SqlitePool, display_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE display_id = ?")
        .bind(display_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 문서를 발송됨으로 표시합니다.
///
/// `sent = true`로 바꾸고 `sent_date`에 서버의 현재 UTC 시각을 기록합니다.
pub async fn mark_sent(pool: &SqlitePool, display_id: &str) -> Result<Option<Document>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE documents
        SET sent = 1,
            sent_date = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE display_id = ?
        "#,
    )
    .bind(display_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None); // 문서가 없으면 None 반환 → 라우트에서 404 처리
    }

    get_document(pool, display_id).await
}

/// 문서의 발송 표시를 해제합니다.
///
/// `sent`와 `sent_date`를 모두 지웁니다. 발송된 적 없는 문서에 대해서도
/// 동일하게 동작하므로 반복 호출해도 안전합니다 (멱등).
pub async fn mark_unsent(
    pool: &SqlitePool,
    display_id: &str,
) -> Result<Option<Document>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE documents
        SET sent = 0,
            sent_date = NULL,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE display_id = ?
        "#,
    )
    .bind(display_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_document(pool, display_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn seed_client(pool: &SqlitePool, code: &str, email: &str) -> Client {
        let id = uuid::Uuid::now_v7().to_string();
        db::create_client(
            pool,
            &id,
            code,
            "Alex Johnson",
            email,
            &CreateClientRequest::default(),
        )
        .await
        .expect("client inserts")
    }

    async fn seed_document(pool: &SqlitePool, client: &Client, code: &str) -> Document {
        let id = uuid::Uuid::now_v7().to_string();
        create_document(
            pool,
            &id,
            code,
            &client.id,
            "Counselling Objective",
            "Initial objectives focusing on career transition.",
            false,
            None,
        )
        .await
        .expect("document inserts")
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let pool = db::test_pool().await;
        let client = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;
        let document = seed_document(&pool, &client, "DOC-000001").await;

        assert_eq!(document.client_display_id, "CLIENT-000001");
        assert_eq!(document.doc_type, "Counselling Objective");
        assert!(!document.sent);
        assert!(document.sent_date.is_none());
    }

    #[tokio::test]
    async fn send_stamps_date_and_unsend_clears_both() {
        let pool = db::test_pool().await;
        let client = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;
        let document = seed_document(&pool, &client, "DOC-000001").await;

        let sent = mark_sent(&pool, &document.display_id).await.unwrap().unwrap();
        assert!(sent.sent);
        assert!(sent.sent_date.is_some()); // 발송 시각이 반드시 찍혀야 합니다

        let unsent = mark_unsent(&pool, &document.display_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!unsent.sent);
        assert!(unsent.sent_date.is_none());

        // 반복 해제는 멱등 — 같은 결과가 나와야 합니다.
        let again = mark_unsent(&pool, &document.display_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!again.sent);
        assert!(again.sent_date.is_none());
    }

    #[tokio::test]
    async fn partial_update_touches_only_present_fields() {
        let pool = db::test_pool().await;
        let client = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;
        let document = seed_document(&pool, &client, "DOC-000001").await;

        let req = UpdateDocumentRequest {
            content: Some("Revised objectives.".to_string()),
            ..Default::default()
        };
        let updated = update_document(&pool, &document, &req, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.content, "Revised objectives.");
        assert_eq!(updated.doc_type, "Counselling Objective"); // 그대로
        assert!(!updated.sent); // 그대로
        assert_eq!(updated.display_id, "DOC-000001"); // 표시 코드 불변
    }

    #[tokio::test]
    async fn explicit_null_clears_sent_date() {
        let pool = db::test_pool().await;
        let client = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;
        let document = seed_document(&pool, &client, "DOC-000001").await;
        mark_sent(&pool, &document.display_id).await.unwrap();

        let req = UpdateDocumentRequest {
            sent_date: Some(None), // 명시적 null
            ..Default::default()
        };
        let updated = update_document(&pool, &document, &req, None)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.sent_date.is_none());
    }

    #[tokio::test]
    async fn deleting_client_cascades_to_documents() {
        let pool = db::test_pool().await;
        let alex = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;
        let jamie = seed_client(&pool, "CLIENT-000002", "jamie@example.com").await;
        seed_document(&pool, &alex, "DOC-000001").await;
        seed_document(&pool, &jamie, "DOC-000002").await;

        db::delete_client(&pool, "CLIENT-000001").await.unwrap();

        assert!(get_document(&pool, "DOC-000001").await.unwrap().is_none());
        assert!(get_document(&pool, "DOC-000002").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_document_leaves_client_and_siblings() {
        let pool = db::test_pool().await;
        let client = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;
        seed_document(&pool, &client, "DOC-000001").await;
        seed_document(&pool, &client, "DOC-000002").await;

        assert!(delete_document(&pool, "DOC-000001").await.unwrap());

        assert!(db::get_client(&pool, "CLIENT-000001").await.unwrap().is_some());
        assert!(get_document(&pool, "DOC-000002").await.unwrap().is_some());
    }
}
