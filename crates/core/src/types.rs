//! 도메인 타입 -- 진행 상태, 프로브 결과, 헬스 상태
//!
//! [`TestStatus`]는 호출자에게 스트리밍되는 유일한 와이어 타입입니다.
//! `{ "description": "...", "progress": "INCOMPLETE" }` 형태로 직렬화됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 테스트 진행 단계
///
/// `Incomplete`/`Complete`는 중간 상태, `Success`/`Fail`은 최종 상태입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestProgress {
    /// 진행 중
    #[default]
    Incomplete,
    /// 테스트 동작은 끝났고 결과 검증 대기 중
    Complete,
    /// 성공 (최종)
    Success,
    /// 실패 (최종)
    Fail,
}

impl TestProgress {
    /// 최종 상태(SUCCESS/FAIL)인지 확인합니다.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Fail)
    }
}

impl fmt::Display for TestProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete => write!(f, "INCOMPLETE"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// 테스트 진행 상태 -- 스트림의 한 원소
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStatus {
    /// 사람이 읽을 수 있는 최신 상태 설명
    pub description: String,
    /// 현재 진행 단계
    #[serde(default)]
    pub progress: TestProgress,
}

impl TestStatus {
    /// 임의의 진행 단계로 상태를 생성합니다.
    pub fn new(description: impl Into<String>, progress: TestProgress) -> Self {
        Self {
            description: description.into(),
            progress,
        }
    }

    /// `INCOMPLETE` 상태를 생성합니다.
    pub fn incomplete(description: impl Into<String>) -> Self {
        Self::new(description, TestProgress::Incomplete)
    }

    /// `COMPLETE` 상태를 생성합니다.
    pub fn complete(description: impl Into<String>) -> Self {
        Self::new(description, TestProgress::Complete)
    }

    /// `SUCCESS` 상태를 생성합니다.
    pub fn success(description: impl Into<String>) -> Self {
        Self::new(description, TestProgress::Success)
    }

    /// `FAIL` 상태를 생성합니다.
    pub fn fail(description: impl Into<String>) -> Self {
        Self::new(description, TestProgress::Fail)
    }

    /// 테스트 동작이 끝났는지 (INCOMPLETE가 아닌지) 확인합니다.
    pub fn test_complete(&self) -> bool {
        self.progress != TestProgress::Incomplete
    }

    /// 결과(SUCCESS/FAIL)를 담고 있는지 확인합니다.
    pub fn has_result(&self) -> bool {
        self.progress.is_terminal()
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.progress, self.description)
    }
}

/// 프로브 1회 평가 결과
///
/// `Pending`만 재시도 대상입니다. `Mismatched`/`Error`는 즉시 실패로 끝납니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 아직 결정적인 신호 없음 -- 계속 폴링
    Pending,
    /// 기대한 조건이 관찰됨
    Matched,
    /// 응답은 정상이지만 기대와 다른 결과 (최종 실패)
    Mismatched(String),
    /// 호출/전송/프로토콜 에러 (최종 실패)
    Error(String),
}

impl ProbeOutcome {
    /// 더 이상 폴링할 필요가 없는 결과인지 확인합니다.
    pub fn is_decisive(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// 메트릭 레이블용 고정 이름을 반환합니다.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Matched => "matched",
            Self::Mismatched(_) => "mismatched",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Matched => write!(f, "matched"),
            Self::Mismatched(reason) => write!(f, "mismatched: {reason}"),
            Self::Error(cause) => write!(f, "error: {cause}"),
        }
    }
}

/// 컴포넌트 헬스 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    /// 정상
    Healthy,
    /// 부분 장애
    Degraded(String),
    /// 장애
    Unhealthy(String),
}

impl HealthStatus {
    /// 정상 상태인지 확인합니다.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 장애 상태인지 확인합니다.
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
            Self::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_serializes_in_upper_case() {
        let json = serde_json::to_string(&TestProgress::Incomplete).unwrap();
        assert_eq!(json, "\"INCOMPLETE\"");
        let json = serde_json::to_string(&TestProgress::Fail).unwrap();
        assert_eq!(json, "\"FAIL\"");
    }

    #[test]
    fn status_wire_shape() {
        let status = TestStatus::success("test complete");
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["description"], "test complete");
        assert_eq!(value["progress"], "SUCCESS");
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn status_progress_defaults_to_incomplete() {
        let status: TestStatus = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert_eq!(status.progress, TestProgress::Incomplete);
    }

    #[test]
    fn terminal_only_for_success_and_fail() {
        assert!(!TestProgress::Incomplete.is_terminal());
        assert!(!TestProgress::Complete.is_terminal());
        assert!(TestProgress::Success.is_terminal());
        assert!(TestProgress::Fail.is_terminal());
    }

    #[test]
    fn complete_is_test_complete_without_result() {
        let status = TestStatus::complete("offender matched");
        assert!(status.test_complete());
        assert!(!status.has_result());

        let status = TestStatus::incomplete("waiting");
        assert!(!status.test_complete());
    }

    #[test]
    fn only_pending_is_not_decisive() {
        assert!(!ProbeOutcome::Pending.is_decisive());
        assert!(ProbeOutcome::Matched.is_decisive());
        assert!(ProbeOutcome::Mismatched("x".to_owned()).is_decisive());
        assert!(ProbeOutcome::Error("x".to_owned()).is_decisive());
    }

    #[test]
    fn health_status_serializes_with_reason() {
        let value = serde_json::to_value(HealthStatus::Unhealthy("down".to_owned())).unwrap();
        assert_eq!(value["status"], "unhealthy");
        assert_eq!(value["reason"], "down");
    }
}
