//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `clients`: 고객 디렉터리 CRUD + 상태 변경 핸들러 (AppState 정의 포함)
//! - `sessions`: 코칭 세션 CRUD + 완료/노트/미팅 링크 핸들러
//! - `documents`: 생성 문서 CRUD + 발송/다운로드/미리보기 핸들러
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod clients;
pub mod documents;
pub mod health;
pub mod sessions;

// 각 모듈의 핸들러 함수들을 재공개하여
// main.rs에서 `routes::get_clients`처럼 바로 접근 가능하게 합니다.
pub use clients::*;
pub use documents::*;
pub use health::*;
pub use sessions::*;
