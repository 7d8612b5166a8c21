//! Markdown rendering for the two changelog layouts.

use crate::classify::{display_name, group_by_type, strip_prefix};
use crate::models::{Category, ChangelogDocument, ClassifiedCommit, DateRange, Layout};
use std::fmt::Write;

pub const NO_CHANGES_TITLE: &str = "No Changes";
pub const NO_COMMITS_CONTENT: &str = "No commits found for the specified period.";

/// External sections in the order they are emitted.
const EXTERNAL_SECTIONS: [(Category, &str); 4] = [
    (Category::Feature, "Added"),
    (Category::Breaking, "Breaking Changes"),
    (Category::Fix, "Bug Fixes"),
    (Category::Performance, "Performance"),
];

pub fn render(
    repo_name: &str,
    commits: &[ClassifiedCommit],
    date_range: &DateRange,
    layout: Layout,
) -> ChangelogDocument {
    let range = date_range.to_string();

    if commits.is_empty() {
        return ChangelogDocument::new(NO_CHANGES_TITLE, NO_COMMITS_CONTENT, range);
    }

    let content = match layout {
        Layout::Internal => render_internal(repo_name, commits, &range),
        Layout::External => render_external(repo_name, commits, &range),
    };

    ChangelogDocument::new(format!("{} Changelog", repo_name), content, range)
}

fn render_internal(repo_name: &str, commits: &[ClassifiedCommit], range: &str) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Changelog: {}", repo_name);
    let _ = writeln!(output);
    let _ = writeln!(output, "**Period:** {}", range);

    for (commit_type, members) in group_by_type(commits) {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", display_name(&commit_type));
        let _ = writeln!(output);

        for classified in members {
            let commit = &classified.commit;
            let _ = writeln!(
                output,
                "- **{}** {} ({}, {})",
                commit.short_hash(),
                commit.subject(),
                commit.author,
                commit.timestamp.format("%Y-%m-%d")
            );
        }
    }

    output
}

fn render_external(repo_name: &str, commits: &[ClassifiedCommit], range: &str) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {} - Changelog", repo_name);
    let _ = writeln!(output);
    let _ = writeln!(output, "**{}**", range);

    for (category, heading) in EXTERNAL_SECTIONS {
        let entries: Vec<&str> = commits
            .iter()
            .filter(|c| c.category == Some(category))
            .map(|c| strip_prefix(c.commit.subject()))
            .collect();

        if entries.is_empty() {
            continue;
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", heading);
        let _ = writeln!(output);
        for entry in entries {
            let _ = writeln!(output, "- {}", entry);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::models::Commit;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn range() -> DateRange {
        DateRange::ending_at(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(), 7).unwrap()
    }

    fn sample_commits() -> Vec<Commit> {
        vec![
            Commit::new(
                "abc1234567890",
                "feat: add login",
                "A",
                Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
            ),
            Commit::new(
                "def5678901234",
                "fix: crash on start",
                "B",
                Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap(),
            ),
        ]
    }

    #[test]
    fn test_empty_input_short_circuits() {
        for layout in [Layout::Internal, Layout::External] {
            let doc = render("repo", &[], &range(), layout);
            assert_eq!(doc.title, NO_CHANGES_TITLE);
            assert_eq!(doc.content, NO_COMMITS_CONTENT);
        }
    }

    #[test]
    fn test_external_layout_scenario() {
        let classified = classify(&sample_commits());
        let doc = render("repo", &classified, &range(), Layout::External);

        assert_eq!(doc.title, "repo Changelog");
        assert!(doc.content.starts_with("# repo - Changelog\n"));
        assert!(doc.content.contains("**January 1, 2024 - January 8, 2024**"));
        assert!(doc.content.contains("## Added\n\n- add login\n"));
        assert!(doc.content.contains("## Bug Fixes\n\n- crash on start\n"));
        assert!(!doc.content.contains("abc1234"));
        assert!(!doc.content.contains("def5678"));
        assert!(!doc.content.contains("(A"));
        assert!(!doc.content.contains("## Performance"));
    }

    #[test]
    fn test_external_sections_follow_fixed_order() {
        let now = Utc::now();
        let commits = vec![
            Commit::new("1111111aaa", "perf: faster", "P", now),
            Commit::new("2222222bbb", "fix: bug", "F", now),
            Commit::new("3333333ccc", "breaking: remove v1", "B", now),
            Commit::new("4444444ddd", "feat: thing", "T", now),
            Commit::new("5555555eee", "chore: noise", "N", now),
        ];
        let doc = render("r", &classify(&commits), &range(), Layout::External);

        let added = doc.content.find("## Added").unwrap();
        let breaking = doc.content.find("## Breaking Changes").unwrap();
        let fixes = doc.content.find("## Bug Fixes").unwrap();
        let perf = doc.content.find("## Performance").unwrap();
        assert!(added < breaking && breaking < fixes && fixes < perf);
        assert!(!doc.content.contains("noise"));
    }

    #[test]
    fn test_internal_layout_one_entry_per_commit() {
        let commits = sample_commits();
        let doc = render("repo", &classify(&commits), &range(), Layout::Internal);

        assert!(doc.content.starts_with("# Changelog: repo\n"));
        assert!(doc.content.contains("## Features"));
        assert!(doc.content.contains("## Bug Fixes"));

        let entries: Vec<&str> = doc
            .content
            .lines()
            .filter(|l| l.starts_with("- **"))
            .collect();
        assert_eq!(entries.len(), commits.len());
        for (entry, commit) in entries.iter().zip(&commits) {
            assert!(entry.starts_with(&format!("- **{}**", &commit.hash[..7])));
        }
        assert!(doc
            .content
            .contains("- **abc1234** feat: add login (A, 2024-01-02)"));
    }

    #[test]
    fn test_internal_layout_groups_unknown_types() {
        let commits = vec![Commit::new("9999999fff", "Merge branch main", "M", Utc::now())];
        let doc = render("repo", &classify(&commits), &range(), Layout::Internal);
        assert!(doc.content.contains("## Other Changes"));
    }
}
