use changecast::core::{classify, render, Commit, DateRange, HistoryStore, Layout};
use chrono::{Duration, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📝 changecast pipeline example (offline)\n");

    let now = Utc::now();
    let commits = vec![
        Commit::new("3f9c2a1d0b7e", "feat(search): fuzzy matching", "Ada", now),
        Commit::new("8e41b07c55aa", "fix: crash when the index is empty", "Brian", now - Duration::hours(5)),
        Commit::new("c0ffee123456", "perf: cache parsed queries", "Ada", now - Duration::days(1)),
        Commit::new("d15ea5e98765", "chore: bump dependencies", "Chen", now - Duration::days(2)),
    ];

    let range = DateRange::last_days(7)?;
    let classified = classify(&commits);

    for layout in [Layout::Internal, Layout::External] {
        let doc = render("widgets", &classified, &range, layout);
        println!("--- {} layout: {} ---\n", layout.as_str(), doc.title);
        println!("{}", doc.content);
    }

    // Record the run in a throwaway history file
    let path = std::env::temp_dir().join("changecast-example-history.json");
    let store = HistoryStore::new(&path);
    store.initialize()?;
    store.record_generation(
        "https://github.com/acme/widgets",
        "widgets",
        range.start,
        range.end,
        commits.first().map(|c| c.hash.as_str()),
    )?;

    if let Some(last) = store.last_run_info("https://github.com/acme/widgets") {
        println!("✓ Run recorded in {:?} ({} day(s) ago)", path, last.days);
    }

    Ok(())
}
