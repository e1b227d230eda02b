//! # Coachdesk 웹 서버 진입점
//!
//! 이 파일은 Coachdesk 애플리케이션의 **시작점(entry point)**입니다.
//! Rust 프로그램은 항상 `main()` 함수에서 실행이 시작됩니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성 (외래키 제약 활성화)
//! 4. 데이터베이스 마이그레이션 실행
//! 5. API 라우터 설정
//! 6. HTTP 서버 시작

// ── 모듈 선언 ──
// `mod` 키워드는 다른 파일을 모듈로 가져옵니다.
// 예: `mod config;`는 같은 디렉토리의 `config.rs` 또는 `config/mod.rs`를 가져옵니다.
// Rust에서는 파일 시스템 구조가 곧 모듈 구조입니다.
mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

// ── 외부 크레이트 및 모듈에서 필요한 항목 가져오기 ──
// `use` 키워드는 다른 모듈의 항목을 현재 스코프로 가져옵니다.
use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use axum::{
    routing::{get, post, put}, // HTTP 메서드별 라우팅 함수들
    Router,                    // 라우터: URL 경로와 핸들러를 연결하는 구조체
};
use config::Config; // 우리가 만든 설정 모듈
use routes::{clients::AppState, *}; // `*`는 모듈의 모든 공개 항목을 가져옴 (glob import)
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions}; // SQLite 연결 설정/풀 옵션
use std::str::FromStr; // 문자열 → 타입 변환 트레이트 (SqliteConnectOptions 파싱용)
use tower_http::{
    cors::{Any, CorsLayer}, // CORS(Cross-Origin Resource Sharing) 설정
    trace::TraceLayer,      // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // 로깅 초기화 유틸리티

// #[tokio::main]: 비동기 런타임을 시작하는 **어트리뷰트 매크로**
// Rust의 main() 함수는 기본적으로 동기(sync)이므로,
// async/await를 사용하려면 비동기 런타임(Tokio)이 필요합니다.
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .ok()는 Result를 Option으로 변환하여, .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // registry(): 로그 수집기를 만들고
    // .with(): 필터와 포맷터를 레이어처럼 쌓아올립니다
    tracing_subscriber::registry()
        .with(
            // EnvFilter: RUST_LOG 환경변수로 로그 레벨을 제어합니다.
            // 환경변수가 없으면 기본값으로 coachdesk, tower_http, axum 모듈을 debug 레벨로 설정
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coachdesk=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer()) // 로그를 터미널에 출력하는 포맷터 레이어
        .init(); // 전역 로거로 등록

    // ── 3단계: 설정 로딩 ──
    // `?` 연산자: Result가 Err이면 즉시 함수에서 반환(에러 전파).
    let config = Config::from_env()?;
    tracing::info!("Starting Coachdesk server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 생성 ──
    // 연결 풀(Connection Pool): 데이터베이스 연결을 미리 여러 개 만들어두고 재사용하는 패턴.
    //
    // foreign_keys(true): SQLite는 기본적으로 외래키 제약을 검사하지 않는
    // 역사적 특성이 있습니다. 고객 삭제 시 세션/문서의 CASCADE 삭제가
    // 이 프래그마에 의존하므로 반드시 명시적으로 켭니다.
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true) // DB 파일이 없으면 생성
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5) // 최대 5개의 동시 연결을 유지
        .connect_with(options)
        .await?; // 연결 실패 시 에러 전파

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    // sqlx::migrate!는 컴파일 타임에 ./migrations 폴더의 SQL 파일들을 포함시키는 매크로
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool) // 아직 실행되지 않은 마이그레이션만 순서대로 실행
        .await?;

    // ── 6단계: 애플리케이션 상태(State) 생성 ──
    // AppState: 모든 라우트 핸들러가 공유하는 데이터를 담는 구조체
    // Axum에서는 State를 통해 핸들러에 의존성을 주입합니다.
    let state = AppState { pool };

    // ── 7단계: API 라우터 설정 ──
    // .route(): URL 패턴과 핸들러 함수를 연결합니다.
    // {id}는 URL 경로 파라미터 (Path<String>으로 핸들러에서 추출)
    // .post()를 .route()에 체이닝하면 같은 경로에 여러 HTTP 메서드를 매핑할 수 있습니다.
    let api_routes = Router::new()
        // 고객(Client) 디렉터리 API
        .route("/clients", get(get_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(routes::clients::get_client)
                .put(update_client)
                .delete(delete_client),
        )
        .route("/clients/{id}/status", put(update_client_status))
        // 고객 하위 리소스: 소속 세션/문서 목록
        .route("/clients/{id}/sessions", get(get_client_sessions))
        .route("/clients/{id}/documents", get(get_client_documents))
        // 코칭 세션 API
        .route("/sessions", get(get_sessions).post(create_session))
        .route(
            "/sessions/{id}",
            get(routes::sessions::get_session)
                .put(update_session)
                .delete(delete_session),
        )
        .route("/sessions/{id}/complete", post(complete_session))
        .route("/sessions/{id}/zoom", post(set_zoom_link).get(get_zoom_link))
        .route(
            "/sessions/{id}/notes",
            post(add_session_notes).get(get_session_notes),
        )
        .route(
            "/sessions/{id}/completed",
            get(get_session_completed).put(set_session_completed),
        )
        // 생성 문서(Document) API
        .route("/documents", get(get_documents).post(create_document))
        .route(
            "/documents/{id}",
            get(routes::documents::get_document)
                .put(update_document)
                .delete(delete_document),
        )
        .route("/documents/{id}/send", post(send_document))
        .route("/documents/{id}/unsend", post(unsend_document))
        .route("/documents/{id}/download", get(download_document))
        .route("/documents/{id}/preview", get(preview_document))
        .route("/documents/{id}/send-reminder", post(send_document_reminder))
        // 헬스체크 API (서버 상태 확인용)
        .route("/health", get(health_check))
        // .with_state(): 이 라우터의 모든 핸들러에서 AppState를 사용할 수 있게 합니다.
        .with_state(state);

    // ── 8단계: CORS 미들웨어 설정 ──
    // 개발 환경에서는 Any(모두 허용)로 설정합니다.
    // 프로덕션에서는 특정 도메인만 허용해야 합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)   // 모든 출처(origin) 허용
        .allow_methods(Any)  // 모든 HTTP 메서드 허용
        .allow_headers(Any); // 모든 헤더 허용

    // API 라우트를 /api/v1 경로 아래에 중첩시키고 미들웨어를 얹습니다.
    // 예: /clients → /api/v1/clients
    let app = Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http()); // HTTP 요청/응답 자동 로깅

    // ── 9단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    // TcpListener: TCP 연결을 수신 대기하는 소켓
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // axum::serve(): Axum 서버를 시작하고 요청을 처리합니다.
    // 이 줄에서 서버가 영원히 실행됩니다 (Ctrl+C로 종료할 때까지).
    axum::serve(listener, app).await?;

    Ok(())
}
