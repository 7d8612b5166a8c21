//! Conventional-commit classification.
//!
//! Every commit gets a type tag taken from its `type(scope):` prefix and, when
//! it is relevant to end users, a [`Category`] for the external layout.

use crate::models::{Category, ClassifiedCommit, Commit};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TYPE_PREFIX: Regex = Regex::new(r"^(\w+)(\([^)]*\))?:").unwrap();
    static ref STRIP_PREFIX: Regex = Regex::new(r"(?i)^\w+(\([^)]*\))?:\s*").unwrap();
}

pub const OTHER_TYPE: &str = "other";

pub fn classify(commits: &[Commit]) -> Vec<ClassifiedCommit> {
    commits
        .iter()
        .map(|commit| ClassifiedCommit {
            commit_type: commit_type(&commit.message),
            category: category(&commit.message),
            commit: commit.clone(),
        })
        .collect()
}

/// Lower-cased conventional type of the message's first line, or `other`.
pub fn commit_type(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");
    TYPE_PREFIX
        .captures(first_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| OTHER_TYPE.to_string())
}

pub fn category(message: &str) -> Option<Category> {
    let lowered = message.to_lowercase();
    if lowered.starts_with("feat") {
        Some(Category::Feature)
    } else if lowered.starts_with("fix") {
        Some(Category::Fix)
    } else if lowered.starts_with("perf") {
        Some(Category::Performance)
    } else if lowered.starts_with("breaking") {
        Some(Category::Breaking)
    } else {
        None
    }
}

/// Groups commits by type, keeping the order in which each type first appears.
pub fn group_by_type(commits: &[ClassifiedCommit]) -> Vec<(String, Vec<&ClassifiedCommit>)> {
    let mut groups: Vec<(String, Vec<&ClassifiedCommit>)> = Vec::new();

    for commit in commits {
        match groups.iter_mut().find(|(t, _)| *t == commit.commit_type) {
            Some((_, members)) => members.push(commit),
            None => groups.push((commit.commit_type.clone(), vec![commit])),
        }
    }

    groups
}

pub fn display_name(commit_type: &str) -> String {
    let known = match commit_type {
        "feat" => "Features",
        "fix" => "Bug Fixes",
        "docs" => "Documentation",
        "style" => "Styles",
        "refactor" => "Code Refactoring",
        "perf" => "Performance Improvements",
        "test" => "Tests",
        "build" => "Builds",
        "ci" => "Continuous Integration",
        "chore" => "Chores",
        "other" => "Other Changes",
        _ => return capitalize(commit_type),
    };
    known.to_string()
}

/// Removes a leading `type(scope):` or `type:` marker.
pub fn strip_prefix(message: &str) -> &str {
    match STRIP_PREFIX.find(message) {
        Some(m) => &message[m.end()..],
        None => message,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
