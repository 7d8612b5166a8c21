use similar::{ChangeTag, TextDiff};

/// Line diff between a generated changelog and the user's edited copy.
#[derive(Debug, Clone)]
pub struct EditDiff {
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineType {
    Context,
    Addition,
    Deletion,
}

impl EditDiff {
    pub fn between(original: &str, edited: &str) -> Self {
        let diff = TextDiff::from_lines(original, edited);

        let lines = diff
            .iter_all_changes()
            .map(|change| {
                let line_type = match change.tag() {
                    ChangeTag::Delete => DiffLineType::Deletion,
                    ChangeTag::Insert => DiffLineType::Addition,
                    ChangeTag::Equal => DiffLineType::Context,
                };
                DiffLine {
                    line_type,
                    content: change.to_string(),
                }
            })
            .collect();

        Self { lines }
    }

    pub fn additions(&self) -> usize {
        self.count(DiffLineType::Addition)
    }

    pub fn deletions(&self) -> usize {
        self.count(DiffLineType::Deletion)
    }

    pub fn has_changes(&self) -> bool {
        self.lines
            .iter()
            .any(|l| l.line_type != DiffLineType::Context)
    }

    /// Only the added and removed lines.
    pub fn changed_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines
            .iter()
            .filter(|l| l.line_type != DiffLineType::Context)
    }

    fn count(&self, line_type: DiffLineType) -> usize {
        self.lines.iter().filter(|l| l.line_type == line_type).count()
    }
}
