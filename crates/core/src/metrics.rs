//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 엔진과 데몬은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `smoketest_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(smoketest_core::metrics::RUNS_STARTED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 프로파일 레이블 키 (PTPU_T1 등)
pub const LABEL_PROFILE: &str = "profile";

/// 다운스트림 시스템 레이블 키 (community-api, prison-api)
pub const LABEL_SYSTEM: &str = "system";

/// 프로브 결과 레이블 키 (pending, matched, mismatched, error)
pub const LABEL_OUTCOME: &str = "outcome";

/// 실행 결과 레이블 키 (success, fail)
pub const LABEL_RESULT: &str = "result";

// ─── Engine 메트릭 ─────────────────────────────────────────────────

/// Engine: 시작된 실행 수 (counter, label: profile)
pub const RUNS_STARTED_TOTAL: &str = "smoketest_runs_started_total";

/// Engine: 끝난 실행 수 (counter, labels: profile, result)
pub const RUNS_FINISHED_TOTAL: &str = "smoketest_runs_finished_total";

/// Engine: 진행 중인 실행 수 (gauge)
pub const ACTIVE_RUNS: &str = "smoketest_active_runs";

/// Engine: 프로브 호출 수 (counter, labels: system, outcome)
pub const PROBE_CALLS_TOTAL: &str = "smoketest_probe_calls_total";

/// Engine: 스테이지 소요 시간 (histogram, 초, label: profile)
pub const STAGE_DURATION_SECONDS: &str = "smoketest_stage_duration_seconds";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "smoketest_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 스테이지 소요 시간 히스토그램 버킷 (초)
///
/// 10ms ~ 600s 범위 (다운스트림 비동기 처리 대기 포함)
pub const STAGE_DURATION_BUCKETS: [f64; 10] =
    [0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 600.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(RUNS_STARTED_TOTAL, "Total number of smoke test runs started");
    describe_counter!(
        RUNS_FINISHED_TOTAL,
        "Total number of smoke test runs finished, by result"
    );
    describe_gauge!(ACTIVE_RUNS, "Number of smoke test runs currently in flight");
    describe_counter!(
        PROBE_CALLS_TOTAL,
        "Total number of probe evaluations against downstream systems"
    );
    describe_histogram!(
        STAGE_DURATION_SECONDS,
        "Time from stage start to decisive outcome in seconds"
    );

    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        RUNS_STARTED_TOTAL,
        RUNS_FINISHED_TOTAL,
        ACTIVE_RUNS,
        PROBE_CALLS_TOTAL,
        STAGE_DURATION_SECONDS,
        DAEMON_BUILD_INFO,
    ];

    #[test]
    fn all_metrics_start_with_smoketest_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("smoketest_"),
                "Metric '{}' does not start with 'smoketest_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in [RUNS_STARTED_TOTAL, RUNS_FINISHED_TOTAL, PROBE_CALLS_TOTAL] {
            assert!(name.ends_with("_total"), "Counter '{}' lacks _total", name);
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // 레코더 없이도 패닉하지 않아야 함
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_PROFILE, LABEL_SYSTEM, LABEL_OUTCOME, LABEL_RESULT] {
            assert_eq!(
                label.to_lowercase(),
                label,
                "Label key '{}' should be lowercase",
                label
            );
        }
    }

    #[test]
    fn stage_duration_buckets_are_sorted() {
        let buckets = STAGE_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
