//! # 고객(Client) 데이터베이스 쿼리 모듈
//!
//! `clients` 테이블에 대한 CRUD(Create, Read, Update, Delete) 쿼리 함수들이
//! 정의되어 있습니다.
//!
//! 모든 함수는 `async`이며 `SqlitePool`을 받아 데이터베이스와 상호작용합니다.
//! 에러 발생 시 `AppError`를 반환합니다.
//!
//! 조회는 항상 공개 표시 코드(display_id) 기준입니다 — 내부 UUID는
//! 외래키 연결에만 사용하고 API 경계 밖으로 내보내지 않습니다.

use crate::error::AppError;
use crate::models::*;
// SqlitePool: SQLite 연결 풀. 여러 비동기 작업이 동시에 DB에 접근할 수 있게 합니다.
// &SqlitePool로 받으면 소유권을 가져가지 않고 빌려서(borrow) 사용합니다.
use sqlx::SqlitePool;

/// 모든 고객을 조회합니다 (이름 알파벳순).
///
/// # 매개변수
/// - `pool`: SQLite 연결 풀의 참조(&). 소유권을 가져가지 않고 빌려 씁니다.
///
/// # 반환값
/// - `Result<Vec<Client>, AppError>`: 성공 시 고객 목록, 실패 시 에러
pub async fn list_clients(pool: &SqlitePool) -> Result<Vec<Client>, AppError> {
    // sqlx::query_as::<_, Client>():
    //   SQL 쿼리를 실행하고 결과를 Client 구조체로 자동 변환합니다.
    //   Client에 #[derive(sqlx::FromRow)]가 있어서 자동 변환이 가능합니다.
    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, display_id, name, email, phone, source, status, notes,
               created_at, updated_at
        FROM clients
        ORDER BY name
        "#,
    )
    // .fetch_all(pool): 모든 결과 행을 가져옵니다 (Vec<Client> 반환)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// 공개 표시 코드로 단일 고객을 조회합니다.
///
/// # 반환값
/// - `Ok(Some(Client))`: 고객을 찾은 경우
/// - `Ok(None)`: 해당 코드의 고객이 없는 경우
/// - `Err(AppError)`: DB 에러 발생 시
pub async fn get_client(pool: &SqlitePool, display_id: &str) -> Result<Option<Client>, AppError> {
    let client = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, display_id, name, email, phone, source, status, notes,
               created_at, updated_at
        FROM clients
        WHERE display_id = ?
        "#,
        // ↑ SQL의 `?`는 파라미터 바인딩 자리표시자입니다.
        //   .bind()로 값을 안전하게 대입하여 SQL 인젝션을 방지합니다.
    )
    .bind(display_id)
    // .fetch_optional(): 결과가 0행이면 None, 1행이면 Some(Client)을 반환합니다.
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

/// 이메일이 이미 사용 중인지 확인합니다.
///
/// 부분 업데이트에서 자기 자신의 이메일은 중복으로 치지 않도록
/// `exclude_id`(내부 키)로 제외할 수 있습니다.
pub async fn email_in_use(
    pool: &SqlitePool,
    email: &str,
    exclude_id: Option<&str>,
) -> Result<bool, AppError> {
    let (count,): (i64,) = if let Some(id) = exclude_id {
        sqlx::query_as("SELECT COUNT(*) FROM clients WHERE email = ? AND id != ?")
            .bind(email)
            .bind(id)
            .fetch_one(pool)
            .await?
    } else {
        sqlx::query_as("SELECT COUNT(*) FROM clients WHERE email = ?")
            .bind(email)
            .fetch_one(pool)
            .await?
    };
    Ok(count > 0)
}

/// 새 고객을 생성합니다.
///
/// 레코드를 삽입하고, DB가 채운 기본값(타임스탬프 등)이 포함된
/// 완전한 행을 다시 조회하여 반환합니다.
///
/// # 매개변수
/// - `id`: 내부 기본키 (UUIDv7)
/// - `display_id`: 미리 생성된 공개 표시 코드
/// - `name`, `email`: 핸들러에서 필수 검증을 마친 값
/// - `req`: 나머지 선택 필드들
pub async fn create_client(
    pool: &SqlitePool,
    id: &str,
    display_id: &str,
    name: &str,
    email: &str,
    req: &CreateClientRequest,
) -> Result<Client, AppError> {
    // status 누락 시 파이프라인 첫 단계를 기본값으로 사용합니다.
    let status = req.status.as_deref().unwrap_or("Initial Contact");

    sqlx::query(
        r#"
        INSERT INTO clients (id, display_id, name, email, phone, source, status, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        // ↑ created_at/updated_at은 스키마의 DEFAULT(strftime)가 채웁니다.
    )
    .bind(id)
    .bind(display_id)
    .bind(name)
    .bind(email)
    .bind(&req.phone) // Option<String>: Some이면 값을, None이면 SQL NULL을 바인딩합니다.
    .bind(&req.source)
    .bind(status)
    .bind(&req.notes)
    .execute(pool)
    .await?;

    get_client(pool, display_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created client".to_string()))
}

/// 고객을 수정합니다 (부분 업데이트).
///
/// 요청에 포함된 필드만 개별 UPDATE 문으로 갱신합니다.
/// 여러 문장이 실행되므로 트랜잭션으로 묶어, 중간에 실패하면
/// 전체가 롤백되도록 합니다 (요청 단위의 작업 단위 보장).
///
/// 이메일 유일성 검증은 호출부(라우트 핸들러)가 이 함수를 부르기 전에
/// 수행합니다 — 현재 행이 필요하므로 `&Client`를 받습니다.
pub async fn update_client(
    pool: &SqlitePool,
    client: &Client,
    req: &UpdateClientRequest,
) -> Result<Option<Client>, AppError> {
    // pool.begin(): 트랜잭션 시작. commit() 전에 드롭되면 자동 롤백됩니다.
    let mut tx = pool.begin().await?;

    // if let Some(x) = ...: Option이 Some인 경우에만 실행하는 패턴 매칭
    if let Some(name) = &req.name {
        sqlx::query("UPDATE clients SET name = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(name)
            .bind(&client.id)
            .execute(&mut *tx) // &mut *tx: 트랜잭션을 실행자(executor)로 사용
            .await?;
    }

    if let Some(email) = &req.email {
        sqlx::query("UPDATE clients SET email = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(email)
            .bind(&client.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(status) = &req.status {
        sqlx::query("UPDATE clients SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(status)
            .bind(&client.id)
            .execute(&mut *tx)
            .await?;
    }

    // 이중 Option 필드: 바깥 Some = "필드가 요청에 존재함",
    // 안쪽 Option = 실제 값(None이면 SQL NULL로 지움)
    if let Some(phone) = &req.phone {
        sqlx::query("UPDATE clients SET phone = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(phone.as_deref()) // Option<&str>: None이면 NULL
            .bind(&client.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(source) = &req.source {
        sqlx::query("UPDATE clients SET source = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(source.as_deref())
            .bind(&client.id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(notes) = &req.notes {
        sqlx::query("UPDATE clients SET notes = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
            .bind(notes.as_deref())
            .bind(&client.id)
            .execute(&mut *tx)
            .await?;
    }

    // commit(): 모든 변경을 확정합니다.
    tx.commit().await?;

    // 수정된 고객을 다시 조회하여 반환 (최신 updated_at 값 포함)
    get_client(pool, &client.display_id).await
}

/// 고객을 삭제합니다.
///
/// 외래키의 `ON DELETE CASCADE`에 의해 소속 세션/문서도 함께 삭제됩니다.
///
/// # 반환값
/// - `Ok(true)`: 삭제 성공 (1행 이상 영향)
/// - `Ok(false)`: 해당 코드의 고객이 없음 (0행 영향)
pub async fn delete_client(pool: &SqlitePool, display_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM clients WHERE display_id = ?")
        .bind(display_id)
        .execute(pool)
        .await?;

    // .rows_affected(): 쿼리에 의해 영향받은 행 수를 반환합니다.
    Ok(result.rows_affected() > 0)
}

/// 고객의 파이프라인 상태만 변경하는 단일 필드 편의 쿼리입니다.
pub async fn set_client_status(
    pool: &SqlitePool,
    display_id: &str,
    status: &str,
) -> Result<Option<Client>, AppError> {
    let result = sqlx::query(
        "UPDATE clients SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE display_id = ?",
    )
    .bind(status)
    .bind(display_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None); // 고객이 없으면 None 반환 → 라우트에서 404 처리
    }

    get_client(pool, display_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    /// 테스트용 고객 한 명을 삽입합니다.
    async fn seed_client(pool: &SqlitePool, code: &str, email: &str) -> Client {
        let req = CreateClientRequest {
            phone: Some("+1234567890".to_string()),
            source: Some("LinkedIn".to_string()),
            ..Default::default()
        };
        let id = uuid::Uuid::now_v7().to_string();
        create_client(pool, &id, code, "Alex Johnson", email, &req)
            .await
            .expect("client inserts")
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let pool = db::test_pool().await;
        let created = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;

        assert_eq!(created.display_id, "CLIENT-000001");
        assert_eq!(created.status, "Initial Contact"); // 기본값 적용
        assert!(!created.created_at.is_empty());

        let fetched = get_client(&pool, "CLIENT-000001").await.unwrap().unwrap();
        assert_eq!(fetched.email, "alex@example.com");
        assert_eq!(fetched.name, "Alex Johnson");
    }

    #[tokio::test]
    async fn email_in_use_respects_exclusion() {
        let pool = db::test_pool().await;
        let client = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;

        assert!(email_in_use(&pool, "alex@example.com", None).await.unwrap());
        // 자기 자신은 제외 — 이메일을 그대로 둔 업데이트가 409가 되면 안 됩니다.
        assert!(!email_in_use(&pool, "alex@example.com", Some(&client.id))
            .await
            .unwrap());
        assert!(!email_in_use(&pool, "other@example.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn partial_update_leaves_absent_fields_untouched() {
        let pool = db::test_pool().await;
        let client = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;

        let req = UpdateClientRequest {
            name: Some("Alex J. Johnson".to_string()),
            ..Default::default()
        };
        let updated = update_client(&pool, &client, &req).await.unwrap().unwrap();

        assert_eq!(updated.name, "Alex J. Johnson");
        // 요청에 없던 필드는 그대로여야 합니다.
        assert_eq!(updated.email, "alex@example.com");
        assert_eq!(updated.phone.as_deref(), Some("+1234567890"));
        assert_eq!(updated.source.as_deref(), Some("LinkedIn"));
        // 표시 코드는 불변입니다.
        assert_eq!(updated.display_id, "CLIENT-000001");
    }

    #[tokio::test]
    async fn explicit_null_clears_nullable_field() {
        let pool = db::test_pool().await;
        let client = seed_client(&pool, "CLIENT-000001", "alex@example.com").await;

        // Some(None) = 요청 본문의 명시적 null
        let req = UpdateClientRequest {
            phone: Some(None),
            ..Default::default()
        };
        let updated = update_client(&pool, &client, &req).await.unwrap().unwrap();

        assert_eq!(updated.phone, None);
        assert_eq!(updated.source.as_deref(), Some("LinkedIn")); // 다른 필드는 유지
    }

    #[tokio::test]
    async fn set_status_changes_only_status() {
        let pool = db::test_pool().await;
        seed_client(&pool, "CLIENT-000001", "alex@example.com").await;

        let updated = set_client_status(&pool, "CLIENT-000001", "First Session Scheduled")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "First Session Scheduled");
        assert_eq!(updated.name, "Alex Johnson");

        // 없는 고객이면 None
        let missing = set_client_status(&pool, "CLIENT-FFFFFF", "X").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let pool = db::test_pool().await;
        seed_client(&pool, "CLIENT-000001", "alex@example.com").await;

        assert!(delete_client(&pool, "CLIENT-000001").await.unwrap());
        assert!(!delete_client(&pool, "CLIENT-000001").await.unwrap());
        assert!(get_client(&pool, "CLIENT-000001").await.unwrap().is_none());
    }
}
