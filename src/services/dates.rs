//! # 일시 파싱/정규화 서비스
//!
//! 클라이언트가 보낸 ISO 8601 일시 문자열을 검증하고
//! UTC 기준의 단일 형식으로 정규화합니다.
//!
//! 허용 입력: RFC 3339 형식 — "2024-01-01T12:00:00Z",
//! "2024-01-01T14:00:00+02:00" 등. 파싱에 실패하면 400 Bad Request가 됩니다.

use crate::error::AppError;
// chrono::DateTime: 타임존 정보를 포함한 일시 타입
// Utc: UTC 타임존 마커 타입
use chrono::{DateTime, Utc};

/// ISO 8601 일시 문자열을 검증하고 UTC로 정규화합니다.
///
/// # 반환값
/// - `Ok(String)`: "2024-01-01T12:00:00Z" 형식의 UTC 문자열
///   (오프셋이 있는 입력은 UTC로 환산됩니다)
/// - `Err(AppError::BadRequest)`: 파싱 실패 시
///
/// # 예시
/// - `"2024-01-01T14:00:00+02:00"` → `"2024-01-01T12:00:00Z"`
/// - `"not-a-date"` → 400 에러
pub fn normalize_iso_date(input: &str) -> Result<String, AppError> {
    // parse_from_rfc3339(): "Z" 접미사와 "+HH:MM" 오프셋을 모두 받아들입니다.
    // .map_err(): 파싱 에러를 우리 도메인의 400 에러로 변환합니다.
    let parsed: DateTime<chrono::FixedOffset> = DateTime::parse_from_rfc3339(input)
        .map_err(|_| {
            AppError::BadRequest(
                "Invalid date format. Use ISO format (e.g., 2023-01-01T12:00:00Z)".to_string(),
            )
        })?;

    // .with_timezone(&Utc): 어떤 오프셋이든 UTC로 환산합니다.
    // .format(): 저장용 단일 형식으로 출력합니다.
    Ok(parsed
        .with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_z_suffixed_utc() {
        assert_eq!(
            normalize_iso_date("2024-01-01T00:00:00Z").unwrap(),
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn converts_offsets_to_utc() {
        assert_eq!(
            normalize_iso_date("2024-01-01T14:00:00+02:00").unwrap(),
            "2024-01-01T12:00:00Z"
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["not-a-date", "2024-13-01T00:00:00Z", "2024-01-01", ""] {
            let err = normalize_iso_date(bad).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "{bad} should be rejected");
        }
    }
}
