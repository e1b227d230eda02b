//! # 공개 표시 코드(Display Code) 생성 서비스
//!
//! 고객/세션/문서의 공개 식별자(예: "CLIENT-3F9A2C")를 생성하는 모듈입니다.
//!
//! ## 왜 랜덤 코드인가?
//! "최대 id + 1" 방식은 동시에 두 요청이 들어오면 같은 번호를 받을 수 있는
//! 경쟁 조건(race condition)이 있습니다. 여기서는 OsRng로 랜덤 접미사를 뽑고
//! DB에서 중복 여부를 확인하는 방식을 사용합니다.
//! display_id 컬럼의 UNIQUE 제약이 최후의 안전장치 역할을 합니다.

use crate::error::AppError;
// OsRng: 운영체제가 제공하는 암호학적으로 안전한 난수 생성기
// RngCore: fill_bytes() 등 난수 생성 메서드를 정의하는 트레이트
use rand_core::{OsRng, RngCore};
use sqlx::SqlitePool;

/// 코드 생성 최대 재시도 횟수
///
/// 접미사 공간이 16^6(약 1,677만)이므로 충돌은 사실상 일어나지 않지만,
/// 무한 루프를 막기 위해 상한을 둡니다.
const CODE_ATTEMPTS: usize = 8;

/// 전역 유일한 공개 표시 코드를 생성합니다.
///
/// 형식: `{prefix}-{6자리 16진수 대문자}` (예: "SESSION-9A41BC")
///
/// # 매개변수
/// - `pool`: DB 연결 풀
/// - `prefix`: 엔티티별 접두사 ("CLIENT", "SESSION", "DOC")
/// - `table`: 중복 확인 대상 테이블 이름
///   (호출부에서 고정 문자열 리터럴만 전달합니다 — 사용자 입력 아님)
///
/// # 반환값
/// - `Ok(String)`: 아직 사용되지 않은 코드
/// - `Err(AppError::Internal)`: 재시도 상한까지 모두 충돌한 경우
pub async fn generate_display_code(
    pool: &SqlitePool,
    prefix: &str,
    table: &str,
) -> Result<String, AppError> {
    for _ in 0..CODE_ATTEMPTS {
        let code = format!("{}-{}", prefix, random_suffix());

        // 같은 코드가 이미 존재하는지 확인합니다.
        // 테이블 이름은 SQL 파라미터로 바인딩할 수 없어 format!으로 조립하지만,
        // 고정 리터럴만 들어오므로 인젝션 위험은 없습니다.
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE display_id = ?)",
            table
        );
        // (i64,): 컬럼이 하나뿐인 행은 1-튜플로 받습니다. EXISTS는 0 또는 1을 반환합니다.
        let (taken,): (i64,) = sqlx::query_as(&query).bind(&code).fetch_one(pool).await?;

        if taken == 0 {
            return Ok(code);
        }
    }

    Err(AppError::Internal(format!(
        "Failed to allocate a unique display code for {}",
        table
    )))
}

/// 6자리 16진수 대문자 접미사를 생성합니다 (3바이트 난수).
fn random_suffix() -> String {
    let mut bytes = [0u8; 3];
    // fill_bytes(): 배열을 난수로 채웁니다. OsRng는 실패하지 않습니다.
    OsRng.fill_bytes(&mut bytes);
    // 바이트당 2자리 16진수로 포맷: [0x3F, 0x9A, 0x2C] → "3F9A2C"
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// 문서 다운로드용 파일명을 합성합니다.
///
/// 실제 파일은 만들지 않고 이름만 만들어 응답에 포함합니다.
///
/// # 예시
/// `document_filename("Counselling Objective", "DOC-4F2A9C")`
/// → `"counselling_objective_DOC-4F2A9C.txt"`
pub fn document_filename(doc_type: &str, display_id: &str) -> String {
    // slugify로 공백/특수문자를 정리한 뒤, 하이픈을 언더스코어로 바꿉니다.
    format!(
        "{}_{}.txt",
        slug::slugify(doc_type).replace('-', "_"),
        display_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_lowercased_and_underscored() {
        assert_eq!(
            document_filename("Counselling Objective", "DOC-4F2A9C"),
            "counselling_objective_DOC-4F2A9C.txt"
        );
        assert_eq!(
            document_filename("Session Summary", "DOC-000001"),
            "session_summary_DOC-000001.txt"
        );
    }

    #[test]
    fn suffix_is_six_uppercase_hex_chars() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn generated_codes_carry_the_prefix_and_are_free() {
        let pool = crate::db::test_pool().await;
        let code = generate_display_code(&pool, "CLIENT", "clients")
            .await
            .unwrap();
        assert!(code.starts_with("CLIENT-"));
        assert_eq!(code.len(), "CLIENT-".len() + 6);
    }
}
