//! 엔진 에러 타입
//!
//! [`EngineError`]는 엔진 구성(프로파일 등록, HTTP 클라이언트 생성) 단계의 에러입니다.
//! 실행 중 실패는 에러가 아니라 `FAIL` 상태로 스트림에 전달됩니다.
//! `From<EngineError> for SmokeTestError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use smoketest_core::error::{ConfigError, DownstreamError, ProfileError, SmokeTestError};

/// 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 프로파일 조회/등록 에러
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// 프로파일 정의를 실행 가능한 형태로 변환하지 못함
    #[error("invalid profile '{profile}': {reason}")]
    InvalidProfile {
        /// 프로파일 이름
        profile: String,
        /// 실패 사유
        reason: String,
    },

    /// 다운스트림 클라이언트 구성 실패
    #[error(transparent)]
    Downstream(#[from] DownstreamError),
}

impl From<EngineError> for SmokeTestError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Profile(e) => SmokeTestError::Profile(e),
            EngineError::Downstream(e) => SmokeTestError::Downstream(e),
            EngineError::InvalidProfile { profile, reason } => {
                SmokeTestError::Config(ConfigError::InvalidValue {
                    field: format!("profiles.{profile}"),
                    reason,
                })
            }
        }
    }
}
