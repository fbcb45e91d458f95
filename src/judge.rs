//! # Outcome judge
//!
//! Decides whether a search satisfied the mission it was run for and writes
//! the feedback shown to the player. Mission rules live in a static table;
//! unknown missions, and searches run without one, only need a match.

use crate::types::LogEntry;

/// Feedback for a blank query.
pub const EMPTY_QUERY_FEEDBACK: &str = "Enter a search query. Example: status:failed";

/// A mission-specific correctness rule.
pub struct MissionRule {
    pub id: &'static str,
    /// Receives the lowercased query and the post-cap match count.
    pub is_correct: fn(&str, usize) -> bool,
    /// Builds the congratulation once the rule holds.
    pub congratulate: fn(&[LogEntry]) -> String,
}

pub static MISSION_RULES: &[MissionRule] = &[
    MissionRule {
        id: "mission03",
        is_correct: failed_logins_found,
        congratulate: failed_logins_insight,
    },
    MissionRule {
        id: "mission06",
        is_correct: after_hours_admin_found,
        congratulate: after_hours_admin_insight,
    },
];

/// Result of judging one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_correct: bool,
    pub feedback: String,
}

pub fn find_rule(mission_id: &str) -> Option<&'static MissionRule> {
    MISSION_RULES.iter().find(|rule| rule.id == mission_id)
}

/// Applies the mission's rule, or "at least one match" when there is none.
pub fn is_correct(query: &str, mission_id: Option<&str>, match_count: usize) -> bool {
    let Some(id) = mission_id else {
        return match_count > 0;
    };
    match find_rule(id) {
        Some(rule) => (rule.is_correct)(&query.to_lowercase(), match_count),
        None => {
            tracing::debug!("no rule for mission {}, using generic check", id);
            match_count > 0
        }
    }
}

/// Judges a completed search. `fields` lists what the corpus can be searched
/// on and is quoted back when nothing matched.
pub fn assess(query: &str, mission_id: Option<&str>, results: &[LogEntry], fields: &[&str]) -> Verdict {
    let is_correct = is_correct(query, mission_id, results.len());

    let feedback = if results.is_empty() {
        format!(
            "No results found. Try adjusting your query. Available fields: {}",
            fields.join(", ")
        )
    } else if is_correct {
        match mission_id.and_then(find_rule) {
            Some(rule) => (rule.congratulate)(results),
            None => format!("✅ Found {} matching entries.", results.len()),
        }
    } else {
        format!(
            "Found {} results. Review them to see if they match what you're looking for.",
            results.len()
        )
    };

    Verdict {
        is_correct,
        feedback,
    }
}

/// Feedback for a query the engine refused to run.
pub fn query_error_feedback(reason: &str) -> String {
    format!("Query error: {}. Check your syntax!", reason)
}

/// The player has to filter on the status field, either as `status:failed`
/// or with both words in the query, and get at least one match back.
fn failed_logins_found(query: &str, count: usize) -> bool {
    count > 0
        && (query.contains("status:failed")
            || (query.contains("status") && query.contains("failed")))
}

fn failed_logins_insight(results: &[LogEntry]) -> String {
    match most_common_ip(results) {
        Some((ip, seen)) if seen > 1 => format!(
            "🎯 Found {} failed events! Notice the IP {} appears {} times. That's a pattern worth investigating!",
            results.len(),
            ip,
            seen
        ),
        _ => format!(
            "🎯 Found {} failed events! Compare their users and IPs for anything that repeats.",
            results.len()
        ),
    }
}

fn after_hours_admin_found(query: &str, count: usize) -> bool {
    count > 0
        && query.contains("admin")
        && ["hour", "23", "02", "03", "night"]
            .iter()
            .any(|hint| query.contains(hint))
}

fn after_hours_admin_insight(results: &[LogEntry]) -> String {
    format!(
        "🌙 Found {} after-hours admin accesses! This is suspicious behavior that a real analyst would escalate.",
        results.len()
    )
}

/// The IP seen most often; ties go to the one seen first.
fn most_common_ip(results: &[LogEntry]) -> Option<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for ip in results.iter().filter_map(|e| e.ip.as_deref()) {
        match counts.iter_mut().find(|(seen, _)| *seen == ip) {
            Some((_, n)) => *n += 1,
            None => counts.push((ip, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best, (ip, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((ip, n)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ip: &str) -> LogEntry {
        LogEntry {
            ip: Some(ip.to_string()),
            status: Some("failed".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn without_mission_any_match_is_correct() {
        assert!(is_correct("whatever", None, 1));
        assert!(!is_correct("whatever", None, 0));
        assert!(is_correct("whatever", Some("mission99"), 2));
        assert!(!is_correct("whatever", Some("mission99"), 0));
    }

    #[test]
    fn failed_login_mission_needs_status_failed_and_matches() {
        assert!(is_correct("STATUS:FAILED", Some("mission03"), 6));
        assert!(is_correct("status:\"Failed\"", Some("mission03"), 6));
        assert!(is_correct("failed AND status:*", Some("mission03"), 6));
        assert!(!is_correct("failed", Some("mission03"), 6));
        assert!(!is_correct("status:failed", Some("mission03"), 0));
        assert!(!is_correct("user:john", Some("mission03"), 6));
    }

    #[test]
    fn after_hours_mission_needs_admin_and_time_hint() {
        assert!(is_correct("path:*admin* AND hour:[0 TO 5]", Some("mission06"), 2));
        assert!(is_correct("user:admin AND timestamp:*23:*", Some("mission06"), 2));
        assert!(!is_correct("path:*admin*", Some("mission06"), 4));
        assert!(!is_correct("path:*admin* AND hour:[23 TO 5]", Some("mission06"), 0));
    }

    #[test]
    fn zero_matches_lists_fields() {
        let verdict = assess("user:ghost", None, &[], &["user", "ip"]);
        assert!(!verdict.is_correct);
        assert_eq!(
            verdict.feedback,
            "No results found. Try adjusting your query. Available fields: user, ip"
        );
    }

    #[test]
    fn failed_logins_feedback_names_the_repeating_ip() {
        let results = vec![
            entry("192.168.1.51"),
            entry("10.0.50.99"),
            entry("10.0.50.99"),
        ];
        let verdict = assess("status:failed", Some("mission03"), &results, &[]);
        assert!(verdict.is_correct);
        assert!(verdict.feedback.contains("Found 3 failed events"));
        assert!(verdict.feedback.contains("10.0.50.99 appears 2 times"));
    }

    #[test]
    fn failed_logins_feedback_without_repeats() {
        let results = vec![entry("1.1.1.1"), entry("2.2.2.2")];
        let verdict = assess("status:failed", Some("mission03"), &results, &[]);
        assert!(verdict.feedback.starts_with("🎯 Found 2 failed events!"));
        assert!(!verdict.feedback.contains("appears"));
    }

    #[test]
    fn generic_and_review_feedback() {
        let results = vec![entry("1.1.1.1")];
        let verdict = assess("ip:1.1.1.1", None, &results, &[]);
        assert_eq!(verdict.feedback, "✅ Found 1 matching entries.");

        let verdict = assess("ip:1.1.1.1", Some("mission06"), &results, &[]);
        assert!(!verdict.is_correct);
        assert!(verdict.feedback.starts_with("Found 1 results. Review them"));
    }

    #[test]
    fn most_common_ip_prefers_first_on_ties() {
        let results = vec![entry("a"), entry("b"), entry("b"), entry("a")];
        assert_eq!(most_common_ip(&results), Some(("a", 2)));
        assert_eq!(most_common_ip(&[]), None);
    }
}
