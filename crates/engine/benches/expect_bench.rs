//! 기대 결과 판정 벤치마크
//!
//! 응답 분류(상태 코드 + JSON 포인터 비교)와 템플릿 렌더링 성능을 측정합니다.

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use reqwest::Method;
use smoketest_engine::{Expectation, Fixture, Stage};

fn fixture() -> Fixture {
    Fixture::from([
        ("crn".to_owned(), "X360040".to_owned()),
        ("noms_number".to_owned(), "A7742DY".to_owned()),
        ("booking_number".to_owned(), "38479A".to_owned()),
    ])
}

fn match_stage() -> Stage {
    Stage::new(
        "offender match",
        "community-api",
        Duration::from_secs(10),
        Duration::from_secs(120),
    )
    .with_request(Method::GET, "/secure/offenders/crn/{crn}/all")
    .with_expectation(Expectation::JsonEquals {
        pointer: "/otherIds/nomsNumber".to_owned(),
        value: "{noms_number}".to_owned(),
    })
    .with_pending_statuses(vec![404])
}

/// 주소/별칭 등 부가 필드가 `n`개 붙은 오펜더 문서
fn offender_body(extra_fields: usize) -> Vec<u8> {
    let mut aliases = String::new();
    for i in 0..extra_fields {
        if i > 0 {
            aliases.push(',');
        }
        aliases.push_str(&format!(
            r#"{{"firstName":"Alias{i}","surname":"Smith","dateOfBirth":"1980-01-01"}}"#
        ));
    }
    format!(
        r#"{{"offenderId":1,"otherIds":{{"crn":"X360040","nomsNumber":"A7742DY"}},"offenderAliases":[{aliases}]}}"#
    )
    .into_bytes()
}

fn bench_classify(c: &mut Criterion) {
    let stage = match_stage();
    let fixture = fixture();
    let mut group = c.benchmark_group("classify");

    for size in [0usize, 10, 100] {
        let body = offender_body(size);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::new("json_equals", size), &body, |b, body| {
            b.iter(|| stage.classify(black_box(200), black_box(body), &fixture));
        });
    }

    group.bench_function("pending_status", |b| {
        b.iter(|| stage.classify(black_box(404), black_box(b""), &fixture));
    });
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let stage = match_stage()
        .with_body(r#"{{"crn":"{crn}","nomsNumber":"{noms_number}","bookingNo":"{booking_number}"}}"#);
    let fixture = fixture();

    c.bench_function("render_request", |b| {
        b.iter(|| stage.request.render(black_box(&fixture)));
    });
    c.bench_function("matched_status", |b| {
        b.iter(|| stage.matched_status(black_box(&fixture)));
    });
}

criterion_group!(benches, bench_classify, bench_render);
criterion_main!(benches);
