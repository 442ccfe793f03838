//! 스모크 테스트 실행 엔진
//!
//! 이름 붙은 테스트 프로파일을 실행하여 다운스트림 시스템이 기대한 상태에 도달하는지
//! 폴링으로 확인하고, 진행 상태를 [`StatusStream`]으로 실시간 전달합니다.
//!
//! - [`profile`]: 프로파일/스테이지 정의, 기대 결과 판정, 레지스트리
//! - [`downstream`]: 다운스트림 HTTP 호출 추상화와 reqwest 구현
//! - [`probe`]: 스테이지 조건 1회 평가
//! - [`scheduler`]: Pending 재시도 / 데드라인 처리
//! - [`engine`]: 실행 상태 머신과 상태 방출
//! - [`stream`]: 취소 가능한 상태 스트림

pub mod downstream;
pub mod engine;
pub mod error;
pub mod probe;
pub mod profile;
pub mod scheduler;
pub mod stream;

pub use downstream::{
    DownstreamClient, DownstreamRequest, DownstreamResponse, HttpDownstreamClient,
};
pub use engine::{EngineOptions, RUN_TIMED_OUT, RunState, SmokeTestEngine};
pub use error::EngineError;
pub use probe::{HttpProbe, Probe};
pub use profile::{Expectation, Fixture, ProfileRegistry, RequestTemplate, Stage, TestProfile};
pub use scheduler::{StagePoller, StageResult};
pub use stream::StatusStream;

/// HTTP 프로브를 사용하는 엔진 타입
pub type HttpSmokeTestEngine = SmokeTestEngine<HttpProbe<HttpDownstreamClient>>;

/// 설정으로 HTTP 다운스트림 클라이언트와 엔진을 함께 구성합니다.
pub fn http_engine(
    config: &smoketest_core::SmokeTestConfig,
) -> Result<HttpSmokeTestEngine, EngineError> {
    let client = HttpDownstreamClient::from_config(config)?;
    SmokeTestEngine::from_config(config, HttpProbe::new(std::sync::Arc::new(client)))
}
