// ── Record ────────────────────────────────────────────────────────────────────

/// One extracted chart row.
///
/// `rank` is the 1-based position of the row in document order; it is never
/// read from the page. `fields` holds one value per field rule, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub rank: usize,
    pub fields: Vec<String>,
}

impl Record {
    pub fn new(rank: usize, fields: Vec<String>) -> Self {
        Self { rank, fields }
    }

    /// Number of output columns, rank included.
    pub fn arity(&self) -> usize {
        self.fields.len() + 1
    }

    /// `[rank, fields...]`, the shape written to the sink.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.arity());
        row.push(self.rank.to_string());
        row.extend(self.fields.iter().cloned());
        row
    }

    /// First field, the first extracted column of every chart.
    pub fn title(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }

    /// Last field, the identifier column of every chart.
    pub fn identifier(&self) -> &str {
        self.fields.last().map(String::as_str).unwrap_or_default()
    }

    /// Console form: `1. Title (1994); ID: tt0111161`, or without the
    /// parenthesised part when the chart has no columns between title and id.
    pub fn summary_line(&self) -> String {
        match self.fields.len() {
            0 => format!("{}.", self.rank),
            1 => format!("{}. {}", self.rank, self.title()),
            2 => format!("{}. {}; ID: {}", self.rank, self.title(), self.identifier()),
            n => format!(
                "{}. {} ({}); ID: {}",
                self.rank,
                self.title(),
                self.fields[1..n - 1].join(", "),
                self.identifier()
            ),
        }
    }
}
