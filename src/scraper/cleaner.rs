//! Value normalisation applied to raw field text after selection.

// ── Steps ─────────────────────────────────────────────────────────────────────

/// One normalisation step of a field rule. Steps run in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    /// Strip every leading/trailing char contained in the set.
    TrimChars(&'static str),
    /// Split on `separator` and keep the piece at `index`.
    Segment { separator: char, index: usize },
    /// Keep everything before the first `delimiter`.
    TruncateAt(char),
    /// Trim and fold internal whitespace runs into one space.
    CollapseWhitespace,
}

impl Normalize {
    /// `None` when the step cannot produce a value (segment out of range).
    pub fn apply(&self, value: &str) -> Option<String> {
        match *self {
            Normalize::TrimChars(set) => Some(trim_decoration(value, set).to_string()),
            Normalize::Segment { separator, index } => {
                path_segment(value, separator, index).map(str::to_string)
            }
            Normalize::TruncateAt(delimiter) => Some(truncate_at(value, delimiter).to_string()),
            Normalize::CollapseWhitespace => Some(collapse_whitespace(value)),
        }
    }
}

/// Run `steps` over `value`, stopping at the first step that yields nothing.
pub fn normalize(value: &str, steps: &[Normalize]) -> Option<String> {
    let mut current = value.to_string();
    for step in steps {
        current = step.apply(&current)?;
    }
    Some(current)
}

// ── Primitives ────────────────────────────────────────────────────────────────

/// "(1994)" → "1994" | "1994" → "1994" | " (1994) " → " (1994) " with set "()"
pub fn trim_decoration<'a>(s: &'a str, set: &str) -> &'a str {
    s.trim_matches(|c: char| set.contains(c))
}

/// "/title/tt0111161/" split on '/' → ["", "title", "tt0111161", ""]
pub fn path_segment(s: &str, separator: char, index: usize) -> Option<&str> {
    s.split(separator).nth(index)
}

/// "tt0111161?ref=abc" → "tt0111161"
pub fn truncate_at(s: &str, delimiter: char) -> &str {
    s.split(delimiter).next().unwrap_or(s)
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
