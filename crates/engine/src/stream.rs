//! 상태 스트림 -- 한 실행의 `TestStatus`를 방출 순서대로 전달합니다.
//!
//! 스트림은 최종 상태(SUCCESS/FAIL)를 내보낸 직후 끝납니다.
//! 스트림을 drop하면 실행이 취소되어 더 이상 다운스트림 호출이 발생하지 않습니다.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use smoketest_core::types::TestStatus;

/// 실행 하나의 상태 스트림
pub struct StatusStream {
    rx: mpsc::Receiver<TestStatus>,
    cancel: CancellationToken,
    _guard: DropGuard,
    finished: bool,
}

impl StatusStream {
    pub(crate) fn new(rx: mpsc::Receiver<TestStatus>, cancel: CancellationToken) -> Self {
        let guard = cancel.clone().drop_guard();
        Self {
            rx,
            cancel,
            _guard: guard,
            finished: false,
        }
    }

    /// 실행을 취소합니다. 이후 상태는 전달되지 않습니다.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.finished = true;
        self.rx.close();
    }

    /// 다음 상태를 기다립니다. 스트림이 끝나면 `None`을 반환합니다.
    pub async fn next_status(&mut self) -> Option<TestStatus> {
        if self.finished {
            return None;
        }
        let status = self.rx.recv().await;
        self.observe(status.as_ref());
        status
    }

    fn observe(&mut self, status: Option<&TestStatus>) {
        match status {
            Some(s) if !s.has_result() => {}
            _ => {
                self.finished = true;
                self.rx.close();
            }
        }
    }
}

impl Stream for StatusStream {
    type Item = TestStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(status) => {
                self.observe(status.as_ref());
                Poll::Ready(status)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
