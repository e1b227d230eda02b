//! # 코칭 세션 데이터베이스 쿼리 모듈
//!
//! `sessions` 테이블에 대한 CRUD와 완료 표시, 미팅 링크, 노트 추가 쿼리를
//! 담당합니다.
//!
//! ## 조회 쿼리의 JOIN
//! API는 세션의 소유 고객을 내부 UUID가 아닌 공개 코드(`clientId`)로
//! 표현하므로, 모든 SELECT는 clients 테이블과 JOIN하여
//! `c.display_id AS client_display_id`를 함께 가져옵니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 모든 세션을 예정일 순으로 조회합니다.
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<Session>, AppError> {
    let sessions = sqlx::query_as::<_, Session>(
        r#"
        SELECT s.id, s.display_id, s.client_id, c.display_id AS client_display_id,
               s.session_number, s.date, s.category, s.completed, s.notes,
               s.zoom_link, s.created_at, s.updated_at
        FROM sessions s
        JOIN clients c ON c.id = s.client_id
        ORDER BY s.date
        "#,
    )
    .fetch_all(pool) // 모든 행을 Vec으로 반환 (0개여도 빈 Vec)
    .await?;

    Ok(sessions)
}

/// 특정 고객의 모든 세션을 회차 번호 순으로 조회합니다.
///
/// `client_id`는 내부 키입니다 — 호출부가 공개 코드로 고객을 먼저
/// 조회한 뒤(404 판정 포함) 내부 키를 넘깁니다.
pub async fn list_sessions_for_client(
    pool: &SqlitePool,
    client_id: &str,
) -> Result<Vec<Session>, AppError> {
    let sessions = sqlx::query_as::<_, Session>(
        r#"
        SELECT s.id, s.display_id, s.client_id, c.display_id AS client_display_id,
               s.session_number, s.date, s.category, s.completed, s.notes,
               s.zoom_link, s.created_at, s.updated_at
        FROM sessions s
        JOIN clients c ON c.id = s.client_id
        WHERE s.client_id = ?
        ORDER BY s.session_number
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}

/// 공개 표시 코드로 세션 하나를 조회합니다.
///
/// 세션이 존재하면 `Some(Session)`, 없으면 `None`을 반환합니다.
pub async fn get_session(pool: &SqlitePool, display_id: &str) -> Result<Option<Session>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT s.id, s.display_id, s.client_id, c.display_id AS client_display_id,
               s.session_number, s.date, s.category, s.completed, s.notes,
               s.zoom_link, s.created_at, s.updated_at
        FROM sessions s
        JOIN clients c ON c.id = s.client_id
        WHERE s.display_id = ?
        "#,
    )
    .bind(display_id)
    .fetch_optional(pool) // 0행이면 None, 1행이면 Some
    .await?;

    Ok(session)
}

/// 새 세션을 생성합니다.
///
/// # 매개변수
/// - `id`: 내부 기본키 (UUIDv7)
/// - `display_id`: 미리 생성된 공개 표시 코드
/// - `client_id`: 소유 고객의 **내부** 키 — 호출부가 공개 코드를 해석해
///   존재를 확인한 뒤 넘깁니다 (참조 무결성 검사는 쓰기 전에 수행)
/// - `date`: 핸들러에서 ISO 8601 검증/정규화를 마친 UTC 일시 문자열
pub async fn create_session(
    pool: &SqlitePool,
    id: &str,
    display_id: &str,
    client_id: &str,
    session_number: i64,
    date: &str,
    req: &CreateSessionRequest,
) -> Result<Session, AppError> {
    let category = req.category.as_deref().unwrap_or("Initial Consultation");
    let completed = req.completed.unwrap_or(false);

    sqlx::query(
        r#"
        INSERT INTO sessions (id, display_id, client_id, session_number, date,
                              category, completed, notes, zoom_link)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(display_id)
    .bind(client_id)
    .bind(session_number)
    .bind(date)
    .bind(category)
    .bind(completed)
    .bind(&req.notes)
    .bind(&req.zoom_link)
    .execute(pool)
    .await?;

    // 생성 직후 조회하여 DB가 채운 기본값(타임스탬프 등)이 포함된 완전한 객체를 반환
    get_session(pool, display_id)
        .await?
        .ok_or(AppError::Internal(
            "Failed to retrieve created session".to_string(),
        ))
}

/// 세션을 수정합니다 (부분 업데이트).
///
/// 요청에 포함된 필드만 개별 UPDATE 문으로 갱신하며,
/// 트랜잭션으로 묶어 실패 시 전체 롤백합니다.
///
/// # 매개변수
/// - `session`: 현재 행 (호출부에서 404 판정에 사용한 것을 재사용)
/// - `client_id`: `clientId` 변경 요청이 있을 때, 호출부가 새 고객의
///   존재를 확인하고 해석한 **내부** 키
/// - `req.date`: 호출부에서 이미 검증/정규화된 상태여야 합니다
pub async fn update_session(
    pool: &SqlitePool,
    session: &Session,
    req: &UpdateSessionRequest,
    client_id: Option<&str>,
) -> Result<Option<Session>, AppError> {
    let mut tx = pool.begin().await?;

    if let Some(new_client) = client_id {
        sqlx::query("UPDATE sessions SET client_id = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(new_client)
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(session_number) = req.session_number {
        sqlx::query("UPDATE sessions SET session_number = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(session_number)
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(date) = &req.date {
        sqlx::query("UPDATE sessions SET date = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(date)
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(category) = &req.category {
        sqlx::query("UPDATE sessions SET category = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(category)
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(completed) = req.completed {
        sqlx::query("UPDATE sessions SET completed = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(completed)
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;
    }

    // 이중 Option: 바깥 Some = 필드 존재, 안쪽 None = 명시적 null(지움)
    if let Some(notes) = &req.notes {
        sqlx::query("UPDATE sessions SET notes = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(notes.as_deref())
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(zoom_link) = &req.zoom_link {
        sqlx::query("UPDATE sessions SET zoom_link = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(zoom_link.as_deref())
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    get_session(pool, &session.display_id).await
}

/// 세션을 삭제합니다.
///
/// # 반환값
/// - `Ok(true)`: 삭제 성공 / `Ok(false)`: 해당 코드의 세션이 없음
pub async fn delete_session(pool: &SqlitePool, display_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM sessions WHERE display_id = ?")
        .bind(display_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 세션을 완료 상태로 표시합니다 (`completed = true`).
pub async fn complete_session(
    pool: &SqlitePool,
    display_id: &str,
) -> Result<Option<Session>, AppError> {
    set_completed(pool, display_id, true).await
}

/// 세션의 완료 플래그를 지정한 값으로 설정합니다.
///
/// 두 가지 전이(설정/해제)뿐인 단순 불리언입니다 — 중간 상태나
/// 순서 강제는 없습니다.
pub async fn set_completed(
    pool: &SqlitePool,
    display_id: &str,
    completed: bool,
) -> Result<Option<Session>, AppError> {
    let result = sqlx::query(
        "UPDATE sessions SET completed = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE display_id = ?",
    )
    .bind(completed)
    .bind(display_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None); // 세션이 없으면 None 반환 → 라우트에서 404 처리
    }

    get_session(pool, display_id).await
}

/// 세션의 화상 미팅 링크를 설정합니다.
pub async fn set_zoom_link(
    pool: &SqlitePool,
    display_id: &str,
    zoom_link: &str,
) -> Result<Option<Session>, AppError> {
    let result = sqlx::query(
        "UPDATE sessions SET zoom_link = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE display_id = ?",
    )
    .bind(zoom_link)
    .bind(display_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_session(pool, display_id).await
}

/// 세션 노트에 새 텍스트를 **추가**합니다 (덮어쓰기 아님).
///
/// 기존 노트가 있으면 줄바꿈(`\n`)으로 이어 붙이고,
/// 없으면 새 텍스트가 첫 노트가 됩니다.
pub async fn append_notes(
    pool: &SqlitePool,
    display_id: &str,
    notes: &str,
) -> Result<Option<Session>, AppError> {
    // 먼저 현재 노트를 읽어옵니다 (세션 존재 확인을 겸함)
    let session = match get_session(pool, display_id).await? {
        Some(s) => s,
        None => return Ok(None),
    };

    // match의 가드 패턴: 기존 노트가 비어 있지 않을 때만 이어 붙입니다.
    let combined = match &session.notes {
        Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, notes),
        _ => notes.to_string(),
    };

    sqlx::query(
        "UPDATE sessions SET notes = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
    )
    .bind(&combined)
    .bind(&session.id)
    .execute(pool)
    .await?;

    get_session(pool, display_id).await
}
