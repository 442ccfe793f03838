//! 설정 관리 -- smoketest.toml 파싱 및 런타임 설정
//!
//! [`SmokeTestConfig`]는 서버, 엔진, 다운스트림 시스템, 테스트 프로파일 설정을 담는
//! 최상위 구조체입니다. 프로세스 시작 시 한 번 로드되고 이후 불변으로 취급됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SMOKETEST_OAUTH_CLIENT_SECRET=...` 형식)
//! 3. 설정 파일 (`smoketest.toml`)
//! 4. 기본값 (`Default` 구현, 내장 PTPU 프로파일 포함)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), smoketest_core::error::SmokeTestError> {
//! use smoketest_core::config::SmokeTestConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SmokeTestConfig::load("smoketest.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SmokeTestConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SmokeTestError};
use crate::template;

/// 커뮤니티(보호관찰) API 시스템명
pub const SYSTEM_COMMUNITY_API: &str = "community-api";
/// 교정 시설(prison) API 시스템명
pub const SYSTEM_PRISON_API: &str = "prison-api";

/// 허용되는 HTTP 메서드
const VALID_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// 스모크 테스트 통합 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmokeTestConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// HTTP 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// 토큰 발급자 설정
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// 다운스트림 시스템 (시스템명 -> 설정)
    #[serde(default = "default_downstream")]
    pub downstream: BTreeMap<String, DownstreamConfig>,
    /// 테스트 프로파일 목록 (생략 시 내장 PTPU 프로파일)
    #[serde(default = "builtin_profiles")]
    pub profiles: Vec<ProfileConfig>,
}

impl Default for SmokeTestConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            metrics: MetricsConfig::default(),
            engine: EngineConfig::default(),
            oauth: OAuthConfig::default(),
            downstream: default_downstream(),
            profiles: builtin_profiles(),
        }
    }
}

impl SmokeTestConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용한 뒤 검증합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SmokeTestError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SmokeTestError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SmokeTestError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SmokeTestError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SmokeTestError> {
        toml::from_str(toml_str).map_err(|e| {
            SmokeTestError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 이름으로 프로파일 설정을 조회합니다.
    pub fn profile(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SMOKETEST_{SECTION}_{FIELD}`
    /// 다운스트림은 `SMOKETEST_DOWNSTREAM_{SYSTEM}_{FIELD}` (시스템명의 `-`는 `_`)
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SMOKETEST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SMOKETEST_GENERAL_LOG_FORMAT");

        // Server
        override_string(&mut self.server.bind_addr, "SMOKETEST_SERVER_BIND_ADDR");

        // Metrics
        override_bool(&mut self.metrics.enabled, "SMOKETEST_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "SMOKETEST_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "SMOKETEST_METRICS_PORT");

        // Engine
        override_u32(
            &mut self.engine.heartbeat_polls,
            "SMOKETEST_ENGINE_HEARTBEAT_POLLS",
        );
        override_usize(
            &mut self.engine.channel_capacity,
            "SMOKETEST_ENGINE_CHANNEL_CAPACITY",
        );

        // OAuth
        override_string(&mut self.oauth.base_url, "SMOKETEST_OAUTH_BASE_URL");

        // Downstream
        for (name, downstream) in &mut self.downstream {
            let prefix = format!(
                "SMOKETEST_DOWNSTREAM_{}",
                name.to_uppercase().replace('-', "_")
            );
            override_string(&mut downstream.base_url, &format!("{prefix}_BASE_URL"));
            override_string(&mut downstream.client_id, &format!("{prefix}_CLIENT_ID"));
            override_string(
                &mut downstream.client_secret,
                &format!("{prefix}_CLIENT_SECRET"),
            );
        }
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 폴링 주기 0, 알 수 없는 자리표시자 등은 실행 중 실패가 아니라
    /// 여기서 설정 에러로 보고됩니다.
    pub fn validate(&self) -> Result<(), SmokeTestError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(invalid(
                "server.bind_addr",
                format!("'{}' is not a valid socket address", self.server.bind_addr),
            ));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid("metrics.port", "must be greater than 0".to_owned()));
        }

        if self.engine.channel_capacity == 0 {
            return Err(invalid(
                "engine.channel_capacity",
                "must be greater than 0".to_owned(),
            ));
        }

        self.validate_downstream()?;
        self.validate_profiles()?;
        Ok(())
    }

    fn validate_downstream(&self) -> Result<(), SmokeTestError> {
        let mut needs_oauth = false;
        for (name, downstream) in &self.downstream {
            let field = |f: &str| format!("downstream.{name}.{f}");
            if !is_http_url(&downstream.base_url) {
                return Err(invalid(
                    &field("base_url"),
                    "must start with http:// or https://".to_owned(),
                ));
            }
            if downstream.timeout_secs == 0 {
                return Err(invalid(
                    &field("timeout_secs"),
                    "must be greater than 0".to_owned(),
                ));
            }
            if downstream.client_id.is_empty() != downstream.client_secret.is_empty() {
                return Err(invalid(
                    &field("client_secret"),
                    "client_id and client_secret must be set together".to_owned(),
                ));
            }
            needs_oauth |= downstream.uses_oauth();
        }

        if needs_oauth && !is_http_url(&self.oauth.base_url) {
            return Err(invalid(
                "oauth.base_url",
                "must be an http(s) URL when any downstream uses client credentials".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_profiles(&self) -> Result<(), SmokeTestError> {
        if self.profiles.is_empty() {
            return Err(invalid(
                "profiles",
                "at least one test profile is required".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.name.is_empty() {
                return Err(invalid("profiles.name", "must not be empty".to_owned()));
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(invalid(
                    "profiles.name",
                    format!("duplicate test profile '{}'", profile.name),
                ));
            }
            profile.validate(&self.downstream)?;
        }
        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// HTTP 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 수신 주소
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_owned(),
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 수신 주소
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

/// 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 실행당 상태 채널 용량
    pub channel_capacity: usize,
    /// N회 연속 Pending마다 "still waiting" 상태를 보냄 (0 = 끔)
    pub heartbeat_polls: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            heartbeat_polls: 0,
        }
    }
}

/// 토큰 발급자 (client credentials) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// 토큰 발급자 기본 URL
    pub base_url: String,
    /// 토큰 발급 경로
    pub token_path: String,
    /// 헬스 체크 경로
    pub health_path: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090/auth".to_owned(),
            token_path: "/oauth/token".to_owned(),
            health_path: "/health/ping".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// 다운스트림 시스템 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// 기본 URL
    pub base_url: String,
    /// 헬스 체크 경로
    pub health_path: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// client credentials 클라이언트 ID (비어 있으면 인증 없음)
    pub client_id: String,
    /// client credentials 시크릿
    pub client_secret: String,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
            health_path: "/health/ping".to_owned(),
            timeout_secs: 30,
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

impl DownstreamConfig {
    /// 기본 URL로 설정을 생성합니다.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// 토큰 인증을 사용하는지 확인합니다.
    pub fn uses_oauth(&self) -> bool {
        !self.client_id.is_empty()
    }
}

/// 테스트 프로파일 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// 프로파일 이름 (예: `PTPU_T3`)
    pub name: String,
    /// 전체 실행 데드라인 (초)
    #[serde(default = "default_run_timeout_secs")]
    pub timeout_secs: u64,
    /// 성공 시 설명
    #[serde(default = "default_success_message")]
    pub success_message: String,
    /// 테스트 대상 식별자 (crn, noms_number 등)
    #[serde(default)]
    pub fixture: BTreeMap<String, String>,
    /// 순서대로 실행되는 스테이지
    pub stages: Vec<StageConfig>,
}

impl ProfileConfig {
    fn validate(
        &self,
        downstream: &BTreeMap<String, DownstreamConfig>,
    ) -> Result<(), SmokeTestError> {
        let prefix = format!("profiles.{}", self.name);

        if self.timeout_secs == 0 {
            return Err(invalid(
                &format!("{prefix}.timeout_secs"),
                "must be greater than 0".to_owned(),
            ));
        }
        if self.stages.is_empty() {
            return Err(invalid(
                &format!("{prefix}.stages"),
                "at least one stage is required".to_owned(),
            ));
        }
        self.check_placeholders(
            &format!("{prefix}.success_message"),
            &self.success_message,
            false,
        )?;

        for stage in &self.stages {
            let field = |f: &str| format!("{prefix}.stages.{}.{f}", stage.name);

            if stage.name.is_empty() {
                return Err(invalid(
                    &format!("{prefix}.stages.name"),
                    "must not be empty".to_owned(),
                ));
            }
            if !downstream.contains_key(&stage.system) {
                return Err(invalid(
                    &field("system"),
                    format!("unknown downstream system '{}'", stage.system),
                ));
            }
            if !VALID_METHODS.contains(&stage.method.as_str()) {
                return Err(invalid(
                    &field("method"),
                    format!("must be one of: {}", VALID_METHODS.join(", ")),
                ));
            }
            if !stage.path.starts_with('/') {
                return Err(invalid(&field("path"), "must start with '/'".to_owned()));
            }
            if stage.interval_secs == 0 {
                return Err(invalid(
                    &field("interval_secs"),
                    "must be greater than 0".to_owned(),
                ));
            }
            if stage.timeout_secs == 0 {
                return Err(invalid(
                    &field("timeout_secs"),
                    "must be greater than 0".to_owned(),
                ));
            }
            if stage.interval_secs > stage.timeout_secs {
                return Err(invalid(
                    &field("interval_secs"),
                    format!("must not exceed timeout_secs ({})", stage.timeout_secs),
                ));
            }
            if let Some(code) = stage
                .pending_statuses
                .iter()
                .find(|c| !(100..=599).contains(*c) || (200..300).contains(*c))
            {
                return Err(invalid(
                    &field("pending_statuses"),
                    format!("{code} is not a non-2xx HTTP status"),
                ));
            }

            self.check_placeholders(&field("path"), &stage.path, false)?;
            if let Some(body) = &stage.body {
                self.check_placeholders(&field("body"), body, false)?;
            }
            if let Some(on_match) = &stage.on_match {
                self.check_placeholders(&field("on_match"), on_match, true)?;
            }
            if let ExpectConfig::JsonEquals { pointer, value } = &stage.expect {
                if !pointer.is_empty() && !pointer.starts_with('/') {
                    return Err(invalid(
                        &field("expect.pointer"),
                        "must be empty or start with '/'".to_owned(),
                    ));
                }
                self.check_placeholders(&field("expect.value"), value, false)?;
            }
        }
        Ok(())
    }

    /// `allow_stage`: `{stage}`는 엔진이 채워주는 `on_match` 설명에서만 허용
    fn check_placeholders(
        &self,
        field: &str,
        text: &str,
        allow_stage: bool,
    ) -> Result<(), SmokeTestError> {
        match template::placeholders(text)
            .into_iter()
            .find(|key| !(allow_stage && *key == "stage") && !self.fixture.contains_key(*key))
        {
            Some(key) => Err(invalid(
                field,
                format!("placeholder '{{{key}}}' is not defined in the profile fixture"),
            )),
            None => Ok(()),
        }
    }
}

/// 스테이지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// 스테이지 이름
    pub name: String,
    /// 대상 다운스트림 시스템명
    pub system: String,
    /// HTTP 메서드
    #[serde(default = "default_method")]
    pub method: String,
    /// 경로 템플릿 (`{crn}` 등 픽스처 자리표시자)
    pub path: String,
    /// JSON 본문 템플릿
    #[serde(default)]
    pub body: Option<String>,
    /// 폴링 주기 (초)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// 스테이지 데드라인 (초)
    #[serde(default = "default_stage_timeout_secs")]
    pub timeout_secs: u64,
    /// Pending으로 취급할 HTTP 상태 코드
    #[serde(default)]
    pub pending_statuses: Vec<u16>,
    /// 기대 결과 조건
    #[serde(default)]
    pub expect: ExpectConfig,
    /// 매칭 시 설명 템플릿 (기본값: `"{stage} matched"`)
    #[serde(default)]
    pub on_match: Option<String>,
    /// 매칭 시 INCOMPLETE 대신 COMPLETE 상태를 보냄
    #[serde(default)]
    pub completes_test: bool,
}

/// 기대 결과 조건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectConfig {
    /// 2xx 응답이면 매칭
    #[default]
    Status,
    /// 응답 JSON의 포인터 위치 값이 템플릿 값과 같으면 매칭
    JsonEquals {
        /// JSON 포인터 (RFC 6901)
        pointer: String,
        /// 기대값 템플릿
        value: String,
    },
}

fn default_method() -> String {
    "GET".to_owned()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_stage_timeout_secs() -> u64 {
    120
}

fn default_run_timeout_secs() -> u64 {
    600
}

fn default_success_message() -> String {
    "test complete".to_owned()
}

fn default_downstream() -> BTreeMap<String, DownstreamConfig> {
    BTreeMap::from([
        (
            SYSTEM_COMMUNITY_API.to_owned(),
            DownstreamConfig::with_base_url("http://localhost:8096"),
        ),
        (
            SYSTEM_PRISON_API.to_owned(),
            DownstreamConfig::with_base_url("http://localhost:8093"),
        ),
    ])
}

/// 내장 prison-to-probation-update 프로파일 (`PTPU_T1` ~ `PTPU_T3`)
///
/// 세 프로파일은 픽스처(테스트 대상 수감자 식별자)만 다릅니다.
pub fn builtin_profiles() -> Vec<ProfileConfig> {
    [
        ("PTPU_T1", "X360040", "A7742DY", "38479A"),
        ("PTPU_T2", "X360041", "A7743DY", "38480A"),
        ("PTPU_T3", "X360042", "A7744DY", "38481A"),
    ]
    .into_iter()
    .map(|(name, crn, noms_number, booking_number)| {
        ptpu_profile(name, crn, noms_number, booking_number)
    })
    .collect()
}

fn ptpu_profile(name: &str, crn: &str, noms_number: &str, booking_number: &str) -> ProfileConfig {
    ProfileConfig {
        name: name.to_owned(),
        timeout_secs: default_run_timeout_secs(),
        success_message: "Test for offender {noms_number} completed successfully".to_owned(),
        fixture: BTreeMap::from([
            ("crn".to_owned(), crn.to_owned()),
            ("noms_number".to_owned(), noms_number.to_owned()),
            ("booking_number".to_owned(), booking_number.to_owned()),
        ]),
        stages: vec![
            StageConfig {
                name: "reset test data".to_owned(),
                system: SYSTEM_COMMUNITY_API.to_owned(),
                method: "POST".to_owned(),
                path: "/secure/smoketest/offenders/crn/{crn}/details".to_owned(),
                body: None,
                interval_secs: 5,
                timeout_secs: 30,
                pending_statuses: Vec::new(),
                expect: ExpectConfig::Status,
                on_match: Some("Reset test data for {crn}".to_owned()),
                completes_test: false,
            },
            StageConfig {
                name: "trigger imprisonment status change".to_owned(),
                system: SYSTEM_PRISON_API.to_owned(),
                method: "POST".to_owned(),
                path: "/api/smoketest/offenders/{noms_number}/imprisonment-status".to_owned(),
                body: None,
                interval_secs: 5,
                timeout_secs: 30,
                pending_statuses: Vec::new(),
                expect: ExpectConfig::Status,
                on_match: Some("Triggered imprisonment status change for {noms_number}".to_owned()),
                completes_test: false,
            },
            StageConfig {
                name: "offender match in probation records".to_owned(),
                system: SYSTEM_COMMUNITY_API.to_owned(),
                method: "GET".to_owned(),
                path: "/secure/offenders/crn/{crn}/all".to_owned(),
                body: None,
                interval_secs: 10,
                timeout_secs: 120,
                pending_statuses: vec![404],
                expect: ExpectConfig::JsonEquals {
                    pointer: "/otherIds/nomsNumber".to_owned(),
                    value: "{noms_number}".to_owned(),
                },
                on_match: Some("Offender {noms_number} matched to {crn} in probation records".to_owned()),
                completes_test: true,
            },
            StageConfig {
                name: "custody record updated in probation records".to_owned(),
                system: SYSTEM_COMMUNITY_API.to_owned(),
                method: "GET".to_owned(),
                path: "/secure/offenders/crn/{crn}/custody/bookingNumber/{booking_number}"
                    .to_owned(),
                body: None,
                interval_secs: 10,
                timeout_secs: 60,
                pending_statuses: vec![404],
                expect: ExpectConfig::JsonEquals {
                    pointer: "/bookingNumber".to_owned(),
                    value: "{booking_number}".to_owned(),
                },
                on_match: Some("Custody record {booking_number} updated for {crn}".to_owned()),
                completes_test: false,
            },
        ],
    }
}

fn invalid(field: &str, reason: String) -> SmokeTestError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
