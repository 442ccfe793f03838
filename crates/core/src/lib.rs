//! 스모크 테스트 공통 크레이트
//!
//! 엔진, 데몬, CLI가 공유하는 타입/에러/설정/메트릭 상수를 정의합니다.
//!
//! - [`types`]: 진행 상태(`TestStatus`), 프로브 결과(`ProbeOutcome`), 헬스 상태
//! - [`error`]: 도메인 에러 (`SmokeTestError` 및 하위 에러)
//! - [`config`]: `smoketest.toml` 파싱, 환경변수 오버라이드, 검증
//! - [`metrics`]: Prometheus 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod template;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DownstreamError, ProfileError, SmokeTestError};

// 설정
pub use config::SmokeTestConfig;

// 도메인 타입
pub use types::{HealthStatus, ProbeOutcome, TestProgress, TestStatus};
