//! `@`-mention detection and completion for comment input.
//!
//! A trailing unterminated `@token` (longest suffix of `@` plus non-whitespace)
//! activates mention mode. Suggestions filter the team roster by name or
//! email, case-insensitively, capped at five. Applying a suggestion replaces
//! the trailing token with `@<email> ` — the caller is expected to re-emit
//! its input-changed signal so dependent state updates as if typed.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::Member;

pub const MAX_SUGGESTIONS: usize = 5;

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(\S*)$").expect("static regex"))
}

/// The in-progress mention at the end of `input`, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    /// Text after the `@`, possibly empty.
    pub token: String,
    /// Byte offset of the `@` in the input.
    pub start: usize,
}

pub fn detect(input: &str) -> Option<MentionQuery> {
    let caps = mention_re().captures(input)?;
    let m = caps.get(0)?;
    Some(MentionQuery {
        token: caps[1].to_string(),
        start: m.start(),
    })
}

/// Roster members matching the token (empty token matches all), capped at
/// [`MAX_SUGGESTIONS`]. An empty roster yields no suggestions, so mention
/// mode never activates without members loaded.
pub fn suggest<'a>(token: &str, members: &'a [Member]) -> Vec<&'a Member> {
    let needle = token.to_lowercase();
    members
        .iter()
        .filter(|m| {
            m.name.to_lowercase().contains(&needle) || m.email.to_lowercase().contains(&needle)
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Replace the trailing `@token` with `@<email> ` (trailing space included).
/// Input without an active mention is returned unchanged.
pub fn apply(input: &str, member: &Member) -> String {
    match detect(input) {
        Some(query) => format!("{}@{} ", &input[..query.start], member.email),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, email: &str) -> Member {
        Member {
            user_id: 1,
            name: name.to_string(),
            email: email.to_string(),
            role: "member".to_string(),
        }
    }

    #[test]
    fn test_detect_trailing_token() {
        let q = detect("진행 상황 공유 @kim").unwrap();
        assert_eq!(q.token, "kim");

        // bare @ means empty token (matches all members)
        let q = detect("cc @").unwrap();
        assert_eq!(q.token, "");
    }

    #[test]
    fn test_detect_rejects_terminated_mention() {
        // a space after the token terminates the mention
        assert!(detect("@kim 확인 부탁").is_none());
        assert!(detect("no mention here").is_none());
    }

    #[test]
    fn test_suggest_matches_name_or_email() {
        let roster = vec![
            member("김철수", "kim@test.com"),
            member("이영희", "lee@test.com"),
            member("Park Jun", "pj@test.com"),
        ];
        let hits = suggest("kim", &roster);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "kim@test.com");

        let hits = suggest("PARK", &roster);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_suggest_empty_token_capped_at_five() {
        let roster: Vec<Member> = (0..8)
            .map(|i| member(&format!("user{}", i), &format!("u{}@test.com", i)))
            .collect();
        assert_eq!(suggest("", &roster).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_suggest_empty_roster() {
        assert!(suggest("kim", &[]).is_empty());
    }

    #[test]
    fn test_apply_substitutes_email_with_trailing_space() {
        let m = member("김철수", "kim@test.com");
        assert_eq!(apply("확인 부탁 @김철", &m), "확인 부탁 @kim@test.com ");
        // no active mention: unchanged
        assert_eq!(apply("확인 부탁", &m), "확인 부탁");
    }
}
