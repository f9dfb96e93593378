use std::collections::HashSet;

use crate::model::ParticipantSummary;

pub const DEFAULT_MAX_VISIBLE_PARTICIPANTS: usize = 3;

/// Stable de-duplication followed by truncation to `max_visible`.
///
/// The first occurrence of each identity wins, so callers control ranking
/// through input order.
pub fn summarize<I, S>(identities: I, max_visible: usize) -> ParticipantSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut visible = Vec::new();
    let mut distinct = 0usize;

    for identity in identities {
        let identity = identity.as_ref();
        if !seen.insert(identity.to_string()) {
            continue;
        }
        distinct += 1;
        if visible.len() < max_visible {
            visible.push(identity.to_string());
        }
    }

    ParticipantSummary {
        remainder: distinct - visible.len(),
        visible,
    }
}

#[cfg(test)]
mod tests {
    use crate::summary::summarize;

    #[test]
    fn keeps_first_occurrence_order() {
        let summary = summarize(["carol", "bob", "carol", "alice", "bob"], 5);
        assert_eq!(summary.visible, vec!["carol", "bob", "alice"]);
        assert_eq!(summary.remainder, 0);
    }

    #[test]
    fn truncates_and_counts_remainder() {
        let summary = summarize(["e", "d", "c", "b", "a", "e"], 3);
        assert_eq!(summary.visible, vec!["e", "d", "c"]);
        assert_eq!(summary.remainder, 2);
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn zero_visible_puts_everyone_in_remainder() {
        let summary = summarize(["a", "b", "a"], 0);
        assert!(summary.visible.is_empty());
        assert_eq!(summary.remainder, 2);
    }

    #[test]
    fn empty_input_is_empty_summary() {
        let summary = summarize(Vec::<String>::new(), 3);
        assert!(summary.visible.is_empty());
        assert_eq!(summary.remainder, 0);
    }

    #[test]
    fn visible_length_is_min_of_distinct_and_cap() {
        let inputs: [&[&str]; 4] = [&[], &["a"], &["a", "a", "b"], &["a", "b", "c", "d"]];
        for input in inputs {
            let distinct = {
                let mut ids = input.to_vec();
                ids.sort_unstable();
                ids.dedup();
                ids.len()
            };
            for cap in 0..5 {
                let summary = summarize(input.iter(), cap);
                assert_eq!(summary.visible.len(), distinct.min(cap));
                assert_eq!(summary.remainder, distinct - summary.visible.len());
                let mut unique = summary.visible.clone();
                unique.sort_unstable();
                unique.dedup();
                assert_eq!(unique.len(), summary.visible.len());
            }
        }
    }
}
