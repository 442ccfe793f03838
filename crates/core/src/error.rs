//! 에러 타입 -- 도메인별 에러 정의
//!
//! 실행 중(run) 발생하는 실패는 에러가 아니라 `FAIL` 상태로 호출자에게 전달됩니다.
//! 여기 정의된 에러는 시작 시점(설정 로딩/검증)과 다운스트림 호출 계층에서 사용됩니다.

/// 스모크 테스트 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SmokeTestError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 테스트 프로파일 에러
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// 다운스트림 호출 에러
    #[error("downstream error: {0}")]
    Downstream(#[from] DownstreamError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 테스트 프로파일 에러
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// 등록되지 않은 프로파일 이름
    #[error("Unknown test profile {0}")]
    NotFound(String),

    /// 중복된 프로파일 이름
    #[error("duplicate test profile {0}")]
    Duplicate(String),
}

/// 다운스트림 시스템 호출 에러
///
/// 프로브는 이 에러를 `ProbeOutcome::Error`로 변환하여 스케줄러에 전달합니다.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    /// 설정되지 않은 시스템
    #[error("unknown downstream system '{0}'")]
    UnknownSystem(String),

    /// 연결/전송 실패
    #[error("{system}: transport error: {reason}")]
    Transport { system: String, reason: String },

    /// 토큰 발급 실패
    #[error("{system}: token request failed: {reason}")]
    Token { system: String, reason: String },

    /// 잘못된 요청 (메서드, URL 등)
    #[error("{system}: invalid request: {reason}")]
    InvalidRequest { system: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_not_found_names_the_profile() {
        let err = ProfileError::NotFound("PTPU_T9".to_owned());
        assert_eq!(err.to_string(), "Unknown test profile PTPU_T9");
    }

    #[test]
    fn downstream_transport_display() {
        let err = DownstreamError::Transport {
            system: "community-api".to_owned(),
            reason: "connection refused".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("community-api"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn config_error_converts_to_top_level() {
        let err: SmokeTestError = ConfigError::InvalidValue {
            field: "engine.channel_capacity".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            SmokeTestError::Config(ConfigError::InvalidValue { .. })
        ));
        assert!(err.to_string().contains("engine.channel_capacity"));
    }
}
