//! # 서비스 계층 (비즈니스 로직)
//!
//! HTTP나 SQL에 직접 속하지 않는 도메인 로직을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `codes`: 공개 표시 코드 생성, 다운로드 파일명 합성
//! - `dates`: ISO 8601 일시 검증/정규화

pub mod codes;
pub mod dates;

pub use codes::*;
pub use dates::*;
