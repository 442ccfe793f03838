//! 오케스트레이션 엔진 -- 프로파일의 스테이지를 순서대로 실행하고 상태를 방출합니다.
//!
//! # 내부 아키텍처
//! ```text
//! run(name) ──> ProfileRegistry.get()
//!                  │ NotFound ──> [FAIL "Unknown test profile <name>"]
//!                  ▼
//!              Run task (tokio::spawn)
//!                  │  stage[i] ──> StagePoller.poll() ──> Probe.evaluate()
//!                  ▼
//!              TestStatus ──mpsc──> StatusStream ──> caller
//! ```
//!
//! 실행 상태: `NotStarted -> RunningStage(i) -> {RunningStage(i+1) | Succeeded | Failed}`.
//! 최종 상태는 흡수 상태이며, 실행당 최종 상태 방출은 정확히 한 번입니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use smoketest_core::config::SmokeTestConfig;
use smoketest_core::metrics as m;
use smoketest_core::types::{TestProgress, TestStatus};

use crate::error::EngineError;
use crate::probe::Probe;
use crate::profile::{ProfileRegistry, TestProfile};
use crate::scheduler::{StagePoller, StageResult, deadline_after};
use crate::stream::StatusStream;

/// 전체 실행 데드라인 초과 시 설명
pub const RUN_TIMED_OUT: &str = "test run timed out";

/// 엔진 실행 옵션
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// 실행당 상태 채널 용량
    pub channel_capacity: usize,
    /// N회 연속 Pending마다 진행 상태 방출 (0 = 끔)
    pub heartbeat_polls: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            heartbeat_polls: 0,
        }
    }
}

impl From<&SmokeTestConfig> for EngineOptions {
    fn from(config: &SmokeTestConfig) -> Self {
        Self {
            channel_capacity: config.engine.channel_capacity,
            heartbeat_polls: config.engine.heartbeat_polls,
        }
    }
}

/// 실행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// 시작 전
    NotStarted,
    /// i번째 스테이지 실행 중
    RunningStage(usize),
    /// 모든 스테이지 성공 (최종)
    Succeeded,
    /// 실패 (최종)
    Failed,
}

impl RunState {
    /// 최종 상태인지 확인합니다.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// 다음 상태로 전이합니다. 최종 상태에서는 전이하지 않고 `false`를 반환합니다.
    pub fn advance(&mut self, next: RunState) -> bool {
        if self.is_terminal() {
            return false;
        }
        *self = next;
        true
    }
}

/// 스모크 테스트 엔진
///
/// 실행들은 서로 독립적이며, 공유되는 것은 불변 프로파일과 프로브뿐입니다.
///
/// # 사용 예시
/// ```ignore
/// use futures::StreamExt;
///
/// let engine = SmokeTestEngine::from_config(&config, probe)?;
/// let mut statuses = engine.run("PTPU_T3");
/// while let Some(status) = statuses.next().await {
///     println!("{status}");
/// }
/// ```
pub struct SmokeTestEngine<P: Probe> {
    profiles: Arc<ProfileRegistry>,
    probe: Arc<P>,
    options: EngineOptions,
}

impl<P: Probe> SmokeTestEngine<P> {
    /// 레지스트리와 프로브로 엔진을 생성합니다.
    pub fn new(profiles: ProfileRegistry, probe: P, options: EngineOptions) -> Self {
        Self {
            profiles: Arc::new(profiles),
            probe: Arc::new(probe),
            options,
        }
    }

    /// 설정의 프로파일과 엔진 옵션으로 엔진을 생성합니다.
    pub fn from_config(config: &SmokeTestConfig, probe: P) -> Result<Self, EngineError> {
        let profiles = ProfileRegistry::from_config(config)?;
        info!(profiles = profiles.len(), "test profiles loaded");
        Ok(Self::new(profiles, probe, EngineOptions::from(config)))
    }

    /// 등록된 프로파일
    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    /// 공유 프로브
    pub fn probe(&self) -> &Arc<P> {
        &self.probe
    }

    /// 프로파일을 실행하고 상태 스트림을 반환합니다.
    ///
    /// 알 수 없는 이름이면 `FAIL "Unknown test profile <name>"` 하나만 담긴
    /// 스트림을 반환하며 다운스트림 호출은 일어나지 않습니다.
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn run(&self, profile_name: &str) -> StatusStream {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(self.options.channel_capacity.max(1));

        match self.profiles.get(profile_name) {
            Ok(profile) => {
                let run = Run {
                    id: Uuid::new_v4(),
                    profile,
                    probe: Arc::clone(&self.probe),
                    tx,
                    cancel: cancel.clone(),
                    heartbeat_polls: self.options.heartbeat_polls,
                    state: RunState::NotStarted,
                };
                tokio::spawn(run.execute());
            }
            Err(e) => {
                warn!(profile = profile_name, "unknown test profile requested");
                if tx.try_send(TestStatus::fail(e.to_string())).is_err() {
                    warn!(profile = profile_name, "failed to queue unknown profile status");
                }
            }
        }

        StatusStream::new(rx, cancel)
    }
}

/// 실행 하나 -- 호출마다 생성되고 스트림 종료 또는 취소 시 소멸합니다.
struct Run<P: Probe> {
    id: Uuid,
    profile: Arc<TestProfile>,
    probe: Arc<P>,
    tx: mpsc::Sender<TestStatus>,
    cancel: CancellationToken,
    heartbeat_polls: u32,
    state: RunState,
}

impl<P: Probe> Run<P> {
    async fn execute(mut self) {
        let span = info_span!("run", run_id = %self.id, profile = self.profile.name.as_str());
        async move {
            let profile_name = self.profile.name.clone();
            metrics::counter!(m::RUNS_STARTED_TOTAL, m::LABEL_PROFILE => profile_name.clone())
                .increment(1);
            metrics::gauge!(m::ACTIVE_RUNS).increment(1.0);
            info!(stages = self.profile.stages.len(), "test run started");

            let cancel = self.cancel.clone();
            let run_deadline = deadline_after(Instant::now(), self.profile.deadline);

            // 취소, 전체 데드라인, 스테이지 진행 중 먼저 끝나는 쪽이 결과를 결정
            let terminal = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                _ = sleep_until(run_deadline) => Some(TestStatus::fail(RUN_TIMED_OUT)),
                status = self.run_stages() => status,
            };

            match terminal {
                Some(status) => self.finish(status, &profile_name).await,
                None => info!("test run cancelled"),
            }
            metrics::gauge!(m::ACTIVE_RUNS).decrement(1.0);
        }
        .instrument(span)
        .await
    }

    /// 스테이지를 순서대로 실행합니다. 최종 상태를 반환하며, 취소 시 `None`.
    async fn run_stages(&mut self) -> Option<TestStatus> {
        let profile = Arc::clone(&self.profile);
        let poller = StagePoller::new(
            self.probe.as_ref(),
            &profile.fixture,
            &self.cancel,
            &self.tx,
            self.heartbeat_polls,
        );

        for (index, stage) in profile.stages.iter().enumerate() {
            self.state.advance(RunState::RunningStage(index));
            debug!(stage = stage.name.as_str(), index, "stage started");
            let started = Instant::now();

            let result = poller.poll(stage).await;
            record_stage_duration(&profile.name, started.elapsed());

            match result {
                StageResult::Matched => {
                    info!(stage = stage.name.as_str(), "stage matched");
                    if self.tx.send(stage.matched_status(&profile.fixture)).await.is_err() {
                        self.cancel.cancel();
                        return None;
                    }
                }
                StageResult::Cancelled => return None,
                failed => {
                    let description = failed
                        .failure_description(stage)
                        .unwrap_or_else(|| format!("{} failed", stage.name));
                    warn!(stage = stage.name.as_str(), reason = description.as_str(), "stage failed");
                    return Some(TestStatus::fail(description));
                }
            }
        }

        Some(profile.success_status())
    }

    async fn finish(&mut self, status: TestStatus, profile_name: &str) {
        let (next, result) = if status.progress == TestProgress::Success {
            (RunState::Succeeded, "success")
        } else {
            (RunState::Failed, "fail")
        };
        if !self.state.advance(next) {
            return;
        }

        metrics::counter!(
            m::RUNS_FINISHED_TOTAL,
            m::LABEL_PROFILE => profile_name.to_owned(),
            m::LABEL_RESULT => result
        )
        .increment(1);
        info!(result, description = status.description.as_str(), "test run finished");

        if self.tx.send(status).await.is_err() {
            debug!("caller disconnected before terminal status");
        }
    }
}

fn record_stage_duration(profile: &str, elapsed: Duration) {
    metrics::histogram!(m::STAGE_DURATION_SECONDS, m::LABEL_PROFILE => profile.to_owned())
        .record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_absorbing() {
        let mut state = RunState::NotStarted;
        assert!(state.advance(RunState::RunningStage(0)));
        assert!(state.advance(RunState::RunningStage(1)));
        assert!(state.advance(RunState::Failed));

        assert!(!state.advance(RunState::RunningStage(2)));
        assert!(!state.advance(RunState::Succeeded));
        assert_eq!(state, RunState::Failed);
    }

    #[test]
    fn engine_options_from_config() {
        let mut config = SmokeTestConfig::default();
        config.engine.heartbeat_polls = 4;
        let options = EngineOptions::from(&config);
        assert_eq!(options.heartbeat_polls, 4);
        assert_eq!(options.channel_capacity, 32);
    }
}
