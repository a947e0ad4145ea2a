//! Row extraction: one [`Record`] per node matched by a chart's row selector.

use crate::error::ScrapeError;
use crate::models::Record;
use crate::scraper::cleaner::{normalize, Normalize};
use crate::scraper::document::Document;
use tracing::debug;

// ── Field rules ───────────────────────────────────────────────────────────────

/// Where a field's raw value comes from, relative to the row node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Concatenated text of every node matching the selector.
    TextOf(&'static str),
    /// Attribute of the first node matching the selector.
    AttributeOf {
        selector: &'static str,
        attribute: &'static str,
    },
}

impl FieldSource {
    pub fn selector(&self) -> &'static str {
        match *self {
            FieldSource::TextOf(selector) => selector,
            FieldSource::AttributeOf { selector, .. } => selector,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub source: FieldSource,
    pub steps: &'static [Normalize],
}

impl FieldRule {
    pub const fn text(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            source: FieldSource::TextOf(selector),
            steps: &[],
        }
    }

    pub const fn attribute(name: &'static str, selector: &'static str, attribute: &'static str) -> Self {
        Self {
            name,
            source: FieldSource::AttributeOf { selector, attribute },
            steps: &[],
        }
    }

    pub const fn then(self, steps: &'static [Normalize]) -> Self {
        Self { steps, ..self }
    }
}

struct CompiledRule<'r, Q> {
    rule: &'r FieldRule,
    query: Q,
}

// ── Extraction ────────────────────────────────────────────────────────────────

/// Apply `rules` to every row matched by `row_selector`, in document order.
///
/// Ranks are assigned 1..=n from match position. A field whose selector or
/// attribute is absent becomes an empty string; the row is still emitted.
/// Only selector compilation can fail.
pub fn extract<D: Document>(
    doc: &D,
    row_selector: &str,
    rules: &[FieldRule],
) -> Result<Vec<Record>, ScrapeError> {
    extract_rows(doc, row_selector, rules, None)
}

/// Like [`extract`], but stops after the first matched row.
pub fn extract_first<D: Document>(
    doc: &D,
    row_selector: &str,
    rules: &[FieldRule],
) -> Result<Option<Record>, ScrapeError> {
    Ok(extract_rows(doc, row_selector, rules, Some(1))?.into_iter().next())
}

fn extract_rows<D: Document>(
    doc: &D,
    row_selector: &str,
    rules: &[FieldRule],
    limit: Option<usize>,
) -> Result<Vec<Record>, ScrapeError> {
    let row_query = D::compile(row_selector)?;
    let compiled = rules
        .iter()
        .map(|rule| -> Result<_, ScrapeError> {
            Ok(CompiledRule {
                rule,
                query: D::compile(rule.source.selector())?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows = doc.find(&row_query);
    let take = limit.unwrap_or(rows.len());
    debug!("{}: {} rows matched", row_selector, rows.len());

    let records = rows
        .into_iter()
        .take(take)
        .enumerate()
        .map(|(i, row)| {
            let rank = i + 1;
            let fields = compiled
                .iter()
                .map(|c| match field_value(doc, row, c) {
                    Some(value) => value,
                    None => {
                        debug!("row {}: field `{}` missing, left empty", rank, c.rule.name);
                        String::new()
                    }
                })
                .collect();
            Record::new(rank, fields)
        })
        .collect();

    Ok(records)
}

fn field_value<'a, D: Document>(
    doc: &'a D,
    row: D::Node<'a>,
    compiled: &CompiledRule<'_, D::Query>,
) -> Option<String> {
    let matches = doc.find_within(row, &compiled.query);

    let raw = match compiled.rule.source {
        FieldSource::TextOf(_) => {
            if matches.is_empty() {
                return None;
            }
            matches.into_iter().map(|n| doc.text(n)).collect::<String>()
        }
        FieldSource::AttributeOf { attribute, .. } => {
            let first = matches.into_iter().next()?;
            doc.attr(first, attribute)?.to_string()
        }
    };

    normalize(&raw, compiled.rule.steps)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
