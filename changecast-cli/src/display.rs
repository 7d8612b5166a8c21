use changecast_core::diff::{DiffLineType, EditDiff};
use changecast_core::ChangelogDocument;
use colored::Colorize;

pub fn print_document(document: &ChangelogDocument) {
    println!("{}", "━".repeat(80).bright_black());
    println!("{}: {}", "Title".bold(), document.title.cyan().bold());
    println!("{}: {}", "Period".bold(), document.date_range);
    println!("{}", "━".repeat(80).bright_black());
    println!();
    println!("{}", document.content.trim_end());
    println!();
}

pub fn print_edit_diff(diff: &EditDiff) {
    println!(
        "{} {} {}",
        "Your edits:".bold(),
        format!("+{}", diff.additions()).green(),
        format!("-{}", diff.deletions()).red()
    );

    for line in diff.changed_lines() {
        match line.line_type {
            DiffLineType::Addition => print!("{}", format!("+{}", line.content).green()),
            DiffLineType::Deletion => print!("{}", format!("-{}", line.content).red()),
            DiffLineType::Context => {}
        }
        if !line.content.ends_with('\n') {
            println!();
        }
    }
    println!();
}

pub fn days_ago(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{} days ago", n),
    }
}
