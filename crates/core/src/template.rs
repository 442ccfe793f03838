//! `{key}` 자리표시자 템플릿
//!
//! 스테이지의 경로/본문/기대값/설명 템플릿을 프로파일 픽스처로 채웁니다.
//! 자리표시자 유효성은 설정 로딩 시점에 [`placeholders`]로 검사합니다.

use std::collections::BTreeMap;

/// 템플릿에 등장하는 자리표시자 이름 목록을 반환합니다.
///
/// `{{`/`}}`는 리터럴 중괄호로 취급합니다.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        if let Some(stripped) = after.strip_prefix('{') {
            rest = stripped;
            continue;
        }
        match after.find('}') {
            Some(end) => {
                names.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}

/// 자리표시자를 픽스처 값으로 치환합니다.
///
/// 픽스처에 없는 키는 원문 그대로 남깁니다 (로딩 시 검증으로 걸러짐).
pub fn render(template: &str, fixture: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(['{', '}']) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
        } else {
            match tail[1..].find('}') {
                Some(end) => {
                    let key = &tail[1..=end];
                    match fixture.get(key) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&tail[..end + 2]),
                    }
                    rest = &tail[end + 2..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        }
    }
    out.push_str(rest);
    out
}
