//! 테스트 프로파일 -- 스테이지 정의, 기대 결과 판정, 프로파일 레지스트리
//!
//! [`TestProfile`]은 시작 시점에 설정에서 만들어지고 이후 불변입니다.
//! [`ProfileRegistry`]는 이름으로 프로파일을 조회하며, 등록되지 않은 이름은
//! [`ProfileError::NotFound`]로 구분됩니다.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use smoketest_core::config::{ExpectConfig, ProfileConfig, SmokeTestConfig, StageConfig};
use smoketest_core::error::ProfileError;
use smoketest_core::template;
use smoketest_core::types::{ProbeOutcome, TestStatus};

use crate::downstream::DownstreamRequest;
use crate::error::EngineError;

/// 테스트 대상 식별자 (자리표시자 이름 -> 값)
pub type Fixture = BTreeMap<String, String>;

/// 설명 템플릿에서 스테이지 이름으로 치환되는 예약 키
const STAGE_KEY: &str = "stage";

const DEFAULT_ON_MATCH: &str = "{stage} matched";

/// 기대 결과 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// 2xx 응답이면 매칭
    Status,
    /// 응답 JSON의 포인터 위치 값이 렌더링된 값과 같으면 매칭
    JsonEquals {
        /// JSON 포인터
        pointer: String,
        /// 기대값 템플릿
        value: String,
    },
}

impl Expectation {
    /// 2xx 응답 본문을 기대 조건으로 판정합니다.
    ///
    /// - 값이 없거나 `null`: `Pending` (다운스트림이 아직 처리하지 않음)
    /// - 값이 같음: `Matched`
    /// - 값이 다름: `Mismatched`
    /// - 본문이 JSON이 아님: `Error`
    pub fn evaluate(&self, body: &[u8], fixture: &Fixture) -> ProbeOutcome {
        match self {
            Self::Status => ProbeOutcome::Matched,
            Self::JsonEquals { pointer, value } => {
                let document: Value = match serde_json::from_slice(body) {
                    Ok(v) => v,
                    Err(e) => return ProbeOutcome::Error(format!("malformed response body: {e}")),
                };
                let expected = template::render(value, fixture);
                match document.pointer(pointer) {
                    None | Some(Value::Null) => ProbeOutcome::Pending,
                    Some(actual) => {
                        let actual = match actual {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        if actual == expected {
                            ProbeOutcome::Matched
                        } else {
                            ProbeOutcome::Mismatched(format!(
                                "expected {pointer} to be '{expected}' but was '{actual}'"
                            ))
                        }
                    }
                }
            }
        }
    }
}

impl From<&ExpectConfig> for Expectation {
    fn from(config: &ExpectConfig) -> Self {
        match config {
            ExpectConfig::Status => Self::Status,
            ExpectConfig::JsonEquals { pointer, value } => Self::JsonEquals {
                pointer: pointer.clone(),
                value: value.clone(),
            },
        }
    }
}

/// 요청 템플릿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    /// HTTP 메서드
    pub method: Method,
    /// 경로 템플릿
    pub path: String,
    /// JSON 본문 템플릿
    pub body: Option<String>,
}

impl RequestTemplate {
    /// 픽스처로 자리표시자를 채워 실제 요청을 만듭니다.
    pub fn render(&self, fixture: &Fixture) -> DownstreamRequest {
        DownstreamRequest {
            method: self.method.clone(),
            path: template::render(&self.path, fixture),
            body: self.body.as_deref().map(|b| template::render(b, fixture)),
        }
    }
}

/// 프로파일의 한 스테이지 -- 하나의 다운스트림 조건을 폴링으로 확인합니다.
#[derive(Debug, Clone)]
pub struct Stage {
    /// 스테이지 이름
    pub name: String,
    /// 대상 다운스트림 시스템
    pub system: String,
    /// 요청 템플릿
    pub request: RequestTemplate,
    /// 기대 결과 조건
    pub expect: Expectation,
    /// Pending으로 취급할 non-2xx 상태 코드
    pub pending_statuses: Vec<u16>,
    /// 폴링 주기
    pub interval: Duration,
    /// 스테이지 데드라인
    pub deadline: Duration,
    /// 매칭 시 설명 템플릿
    pub on_match: Option<String>,
    /// 매칭 시 COMPLETE 상태를 보낼지 여부
    pub completes_test: bool,
}

impl Stage {
    /// `GET /` + 2xx 조건의 스테이지를 생성합니다.
    pub fn new(
        name: impl Into<String>,
        system: impl Into<String>,
        interval: Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            system: system.into(),
            request: RequestTemplate {
                method: Method::GET,
                path: "/".to_owned(),
                body: None,
            },
            expect: Expectation::Status,
            pending_statuses: Vec::new(),
            interval,
            deadline,
            on_match: None,
            completes_test: false,
        }
    }

    /// 요청 메서드와 경로 템플릿을 지정합니다.
    pub fn with_request(mut self, method: Method, path: impl Into<String>) -> Self {
        self.request.method = method;
        self.request.path = path.into();
        self
    }

    /// 요청 본문 템플릿을 지정합니다.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// 기대 결과 조건을 지정합니다.
    pub fn with_expectation(mut self, expect: Expectation) -> Self {
        self.expect = expect;
        self
    }

    /// Pending으로 취급할 상태 코드를 지정합니다.
    pub fn with_pending_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.pending_statuses = statuses;
        self
    }

    /// 매칭 시 설명 템플릿을 지정합니다.
    pub fn with_on_match(mut self, description: impl Into<String>) -> Self {
        self.on_match = Some(description.into());
        self
    }

    /// 매칭 시 COMPLETE 상태를 보내도록 합니다.
    pub fn completing_test(mut self) -> Self {
        self.completes_test = true;
        self
    }

    /// 응답 상태 코드와 본문을 [`ProbeOutcome`]으로 분류합니다.
    pub fn classify(&self, status: u16, body: &[u8], fixture: &Fixture) -> ProbeOutcome {
        if (200..300).contains(&status) {
            self.expect.evaluate(body, fixture)
        } else if self.pending_statuses.contains(&status) {
            ProbeOutcome::Pending
        } else {
            ProbeOutcome::Error(format!("unexpected HTTP status {status}"))
        }
    }

    /// 스테이지 매칭 시 보낼 상태를 만듭니다.
    pub fn matched_status(&self, fixture: &Fixture) -> TestStatus {
        let description = self.describe(self.on_match.as_deref().unwrap_or(DEFAULT_ON_MATCH), fixture);
        if self.completes_test {
            TestStatus::complete(description)
        } else {
            TestStatus::incomplete(description)
        }
    }

    /// 긴 Pending 동안 보내는 진행 상태를 만듭니다.
    pub fn waiting_status(&self) -> TestStatus {
        TestStatus::incomplete(format!("Still waiting for {}", self.name))
    }

    fn describe(&self, text: &str, fixture: &Fixture) -> String {
        let mut values = fixture.clone();
        values.insert(STAGE_KEY.to_owned(), self.name.clone());
        template::render(text, &values)
    }

    fn from_config(profile: &str, config: &StageConfig) -> Result<Self, EngineError> {
        let method = Method::from_bytes(config.method.as_bytes()).map_err(|e| {
            EngineError::InvalidProfile {
                profile: profile.to_owned(),
                reason: format!("stage '{}': invalid method: {e}", config.name),
            }
        })?;
        if config.interval_secs == 0 {
            return Err(EngineError::InvalidProfile {
                profile: profile.to_owned(),
                reason: format!("stage '{}': poll interval must be non-zero", config.name),
            });
        }

        Ok(Self {
            name: config.name.clone(),
            system: config.system.clone(),
            request: RequestTemplate {
                method,
                path: config.path.clone(),
                body: config.body.clone(),
            },
            expect: Expectation::from(&config.expect),
            pending_statuses: config.pending_statuses.clone(),
            interval: Duration::from_secs(config.interval_secs),
            deadline: Duration::from_secs(config.timeout_secs),
            on_match: config.on_match.clone(),
            completes_test: config.completes_test,
        })
    }
}

/// 이름 붙은 테스트 프로파일
#[derive(Debug, Clone)]
pub struct TestProfile {
    /// 프로파일 이름
    pub name: String,
    /// 테스트 대상 식별자
    pub fixture: Fixture,
    /// 순서대로 실행되는 스테이지
    pub stages: Vec<Stage>,
    /// 전체 실행 데드라인
    pub deadline: Duration,
    /// 성공 설명 템플릿
    pub success_message: String,
}

impl TestProfile {
    /// 빈 픽스처와 기본 성공 메시지로 프로파일을 생성합니다.
    pub fn new(name: impl Into<String>, stages: Vec<Stage>, deadline: Duration) -> Self {
        Self {
            name: name.into(),
            fixture: Fixture::new(),
            stages,
            deadline,
            success_message: "test complete".to_owned(),
        }
    }

    /// 픽스처를 지정합니다.
    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixture = fixture;
        self
    }

    /// 성공 설명 템플릿을 지정합니다.
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    /// 모든 스테이지 성공 시 보낼 최종 상태를 만듭니다.
    pub fn success_status(&self) -> TestStatus {
        TestStatus::success(template::render(&self.success_message, &self.fixture))
    }
}

impl TryFrom<&ProfileConfig> for TestProfile {
    type Error = EngineError;

    fn try_from(config: &ProfileConfig) -> Result<Self, Self::Error> {
        if config.stages.is_empty() {
            return Err(EngineError::InvalidProfile {
                profile: config.name.clone(),
                reason: "at least one stage is required".to_owned(),
            });
        }
        let stages = config
            .stages
            .iter()
            .map(|s| Stage::from_config(&config.name, s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: config.name.clone(),
            fixture: config.fixture.clone(),
            stages,
            deadline: Duration::from_secs(config.timeout_secs),
            success_message: config.success_message.clone(),
        })
    }
}

/// 이름 -> 프로파일 매핑
///
/// 시작 시점에 구성되고 이후 읽기 전용으로 실행 간에 공유됩니다.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Arc<TestProfile>>,
}

impl ProfileRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정의 모든 프로파일을 등록합니다.
    pub fn from_config(config: &SmokeTestConfig) -> Result<Self, EngineError> {
        let mut registry = Self::new();
        for profile in &config.profiles {
            registry.register(TestProfile::try_from(profile)?)?;
        }
        Ok(registry)
    }

    /// 프로파일을 등록합니다. 같은 이름이 이미 있으면 에러입니다.
    pub fn register(&mut self, profile: TestProfile) -> Result<(), ProfileError> {
        if self.profiles.contains_key(&profile.name) {
            return Err(ProfileError::Duplicate(profile.name));
        }
        self.profiles.insert(profile.name.clone(), Arc::new(profile));
        Ok(())
    }

    /// 이름으로 프로파일을 조회합니다.
    pub fn get(&self, name: &str) -> Result<Arc<TestProfile>, ProfileError> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ProfileError::NotFound(name.to_owned()))
    }

    /// 등록된 프로파일 이름 (정렬됨)
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// 등록된 프로파일 수
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
