//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `client`: 고객(Client) 관련 구조체
//! - `session`: 코칭 세션(Session) 관련 구조체
//! - `document`: 생성 문서(Document) 관련 구조체
//!
//! `pub use X::*;`는 하위 모듈의 모든 공개 항목을
//! 이 모듈에서 바로 접근할 수 있게 재공개(re-export)합니다.
//! 예: `crate::models::client::Client` 대신 `crate::models::Client`로 접근 가능

pub mod client;
pub mod document;
pub mod session;

pub use client::*;
pub use document::*;
pub use session::*;

use serde::{Deserialize, Deserializer};

/// "필드 누락"과 "명시적 null"을 구분하는 역직렬화 헬퍼
///
/// 부분 업데이트(PUT) 요청에서 nullable 필드는 세 가지 상태를 가집니다:
/// - 필드 누락        → `None`          (변경하지 않음)
/// - `"field": null`  → `Some(None)`    (NULL로 지움)
/// - `"field": "값"`  → `Some(Some(값))` (값으로 변경)
///
/// serde의 기본 `Option<Option<T>>` 역직렬화는 null을 바깥 None으로
/// 삼켜버리므로, 필드가 **존재하기만 하면** 바깥을 Some으로 감싸는
/// 이 함수를 `#[serde(default, deserialize_with = ...)]`와 함께 사용합니다.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    // 필드가 JSON에 존재할 때만 이 함수가 호출됩니다.
    // 안쪽 Option<T>가 null → None, 값 → Some(T)를 처리하고,
    // 우리는 그 결과를 무조건 Some으로 감쌉니다.
    Deserialize::deserialize(de).map(Some)
}
