//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `clients`: 고객 디렉터리 CRUD 쿼리
//! - `sessions`: 코칭 세션 CRUD 및 완료/노트/미팅 링크 쿼리
//! - `documents`: 생성 문서 CRUD 및 발송 상태 쿼리

pub mod clients;
pub mod documents;
pub mod sessions;

// 하위 모듈의 모든 공개 함수를 재공개(re-export)하여
// `crate::db::list_clients`처럼 바로 접근할 수 있게 합니다.
pub use clients::*;
pub use documents::*;
pub use sessions::*;

/// 테스트용 인메모리 SQLite 풀을 생성하고 마이그레이션을 적용합니다.
///
/// `sqlite::memory:`는 연결마다 독립된 DB를 갖기 때문에
/// 반드시 max_connections(1)로 제한해야 합니다.
/// (연결이 2개면 테이블이 한쪽에만 존재하게 됩니다)
#[cfg(test)]
pub async fn test_pool() -> sqlx::SqlitePool {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        // CASCADE 삭제가 동작하려면 외래키 제약을 켜야 합니다 (main.rs와 동일)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory sqlite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations apply cleanly");

    pool
}
