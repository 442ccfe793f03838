//! 프로브 -- 스테이지 조건을 한 번 평가합니다.
//!
//! 프로브 1회 호출은 다운스트림 요청 정확히 1번이며 내부 재시도가 없습니다.
//! 재시도 여부는 [`scheduler`](crate::scheduler)가 [`ProbeOutcome`]을 보고 결정합니다.

use std::future::Future;
use std::sync::Arc;

use smoketest_core::types::ProbeOutcome;

use crate::downstream::DownstreamClient;
use crate::profile::{Fixture, Stage};

/// 스테이지 조건 평가기
///
/// 구현체는 `Send + Sync + 'static`이어야 하며 여러 실행이 동시에 공유합니다.
pub trait Probe: Send + Sync + 'static {
    /// 스테이지 조건을 한 번 평가합니다.
    fn evaluate(
        &self,
        stage: &Stage,
        fixture: &Fixture,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

/// HTTP 다운스트림 호출로 스테이지를 평가하는 프로브
pub struct HttpProbe<C: DownstreamClient> {
    client: Arc<C>,
}

impl<C: DownstreamClient> HttpProbe<C> {
    /// 다운스트림 클라이언트로 프로브를 생성합니다.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// 내부 다운스트림 클라이언트 (헬스 체크에서 공유)
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }
}

impl<C: DownstreamClient> Probe for HttpProbe<C> {
    async fn evaluate(&self, stage: &Stage, fixture: &Fixture) -> ProbeOutcome {
        let request = stage.request.render(fixture);
        match self.client.call(&stage.system, &request).await {
            Ok(response) => stage.classify(response.status, &response.body, fixture),
            Err(e) => ProbeOutcome::Error(e.to_string()),
        }
    }
}
