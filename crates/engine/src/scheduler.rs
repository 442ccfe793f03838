//! 폴링 스케줄러 -- 한 스테이지의 프로브를 고정 주기로 반복합니다.
//!
//! - `Pending`: 한 주기 대기 후 재시도
//! - `Matched`: 스테이지 성공
//! - `Mismatched` / `Error`: 재시도 없이 즉시 실패
//! - 스테이지 데드라인 경과: `"timed out waiting for <stage>"` 실패
//!
//! 매 프로브 호출 전에 취소 신호를 확인하며, 진행 중인 호출도 취소 시 버려집니다.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use smoketest_core::metrics as m;
use smoketest_core::types::{ProbeOutcome, TestStatus};

use crate::probe::Probe;
use crate::profile::{Fixture, Stage};

/// 표현할 수 없을 만큼 먼 데드라인 대신 쓰는 대기 시간 (약 30년)
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `start + wait`를 계산합니다. 오버플로 시 먼 미래 시각으로 포화합니다.
pub(crate) fn deadline_after(start: Instant, wait: Duration) -> Instant {
    start
        .checked_add(wait)
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

/// 스테이지 폴링 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    /// 기대 조건 관찰됨
    Matched,
    /// 불일치 또는 호출 에러 (설명 포함)
    Failed(String),
    /// Pending 상태로 스테이지 데드라인 경과
    TimedOut,
    /// 취소됨 (상태를 보내지 않음)
    Cancelled,
}

impl StageResult {
    /// 실패 결과의 최종 상태 설명을 만듭니다.
    pub fn failure_description(&self, stage: &Stage) -> Option<String> {
        match self {
            Self::Failed(reason) => Some(reason.clone()),
            Self::TimedOut => Some(format!("timed out waiting for {}", stage.name)),
            Self::Matched | Self::Cancelled => None,
        }
    }
}

/// 한 실행(run)의 스테이지 폴러
pub struct StagePoller<'a, P: Probe> {
    probe: &'a P,
    fixture: &'a Fixture,
    cancel: &'a CancellationToken,
    status_tx: &'a mpsc::Sender<TestStatus>,
    heartbeat_polls: u32,
}

impl<'a, P: Probe> StagePoller<'a, P> {
    /// 폴러를 생성합니다.
    ///
    /// `heartbeat_polls`가 0이 아니면 연속 Pending N회마다 진행 상태를 보냅니다.
    pub fn new(
        probe: &'a P,
        fixture: &'a Fixture,
        cancel: &'a CancellationToken,
        status_tx: &'a mpsc::Sender<TestStatus>,
        heartbeat_polls: u32,
    ) -> Self {
        Self {
            probe,
            fixture,
            cancel,
            status_tx,
            heartbeat_polls,
        }
    }

    /// 스테이지가 결정적 결과에 도달할 때까지 폴링합니다.
    pub async fn poll(&self, stage: &Stage) -> StageResult {
        let deadline = deadline_after(Instant::now(), stage.deadline);
        let mut pending_polls: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return StageResult::Cancelled;
            }

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return StageResult::Cancelled,
                result = timeout_at(deadline, self.probe.evaluate(stage, self.fixture)) => {
                    match result {
                        Ok(outcome) => outcome,
                        Err(_) => return StageResult::TimedOut,
                    }
                }
            };

            metrics::counter!(
                m::PROBE_CALLS_TOTAL,
                m::LABEL_SYSTEM => stage.system.clone(),
                m::LABEL_OUTCOME => outcome.label()
            )
            .increment(1);

            match outcome {
                ProbeOutcome::Pending => {}
                ProbeOutcome::Matched => return StageResult::Matched,
                ProbeOutcome::Mismatched(reason) => {
                    return StageResult::Failed(format!("{} mismatched: {reason}", stage.name));
                }
                ProbeOutcome::Error(cause) => {
                    return StageResult::Failed(format!("{} failed: {cause}", stage.name));
                }
            }

            pending_polls += 1;
            debug!(stage = stage.name.as_str(), pending_polls, "stage pending");

            if self.heartbeat_polls > 0
                && pending_polls % self.heartbeat_polls == 0
                && self.status_tx.send(stage.waiting_status()).await.is_err()
            {
                return StageResult::Cancelled;
            }

            let now = Instant::now();
            if now >= deadline {
                return StageResult::TimedOut;
            }
            let wake_at = deadline_after(now, stage.interval).min(deadline);

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return StageResult::Cancelled,
                _ = sleep_until(wake_at) => {}
            }

            if Instant::now() >= deadline {
                return StageResult::TimedOut;
            }
        }
    }
}
