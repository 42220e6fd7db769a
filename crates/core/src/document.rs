//! Multi-line requirement documents.
//!
//! A document holds one requirement per line. Blank lines and lines whose
//! first non-space characters are `//` are skipped before tokenizing.

use crate::ast::IntentRecord;
use crate::error::Error;
use serde::Serialize;

/// Error budget for [`parse_document_recovering`] when the caller has no
/// preference.
pub const DEFAULT_MAX_ERRORS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRequirement {
    /// 1-based line number within the document
    pub line: usize,
    pub text: String,
    pub record: IntentRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Document {
    pub requirements: Vec<ParsedRequirement>,
}

impl Document {
    pub fn records(&self) -> Vec<IntentRecord> {
        self.requirements.iter().map(|r| r.record.clone()).collect()
    }

    /// Source line of the `index`-th parsed requirement.
    pub fn line_of(&self, index: usize) -> Option<(usize, &str)> {
        self.requirements
            .get(index)
            .map(|r| (r.line, r.text.as_str()))
    }
}

/// A failure on one document line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {error}")]
pub struct LineError {
    pub line: usize,
    pub text: String,
    #[source]
    pub error: Error,
}

impl LineError {
    pub fn render(&self) -> String {
        format!("line {}:\n{}", self.line, self.error.render(&self.text))
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        let mut value = self.error.to_json_value();
        if let Some(obj) = value.as_object_mut() {
            obj.insert("line".to_owned(), serde_json::json!(self.line));
        }
        value
    }
}

/// Lines that carry a requirement, with their 1-based numbers.
pub fn requirement_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            tracing::trace!(line = i + 1, "skipping blank or comment line");
            None
        } else {
            Some((i + 1, line))
        }
    })
}

/// Parse every requirement line, stopping at the first failure.
pub fn parse_document(text: &str) -> Result<Document, LineError> {
    let mut doc = Document::default();
    for (line, src) in requirement_lines(text) {
        let record = crate::parse_one(src).map_err(|error| LineError {
            line,
            text: src.to_owned(),
            error,
        })?;
        doc.requirements.push(ParsedRequirement {
            line,
            text: src.to_owned(),
            record,
        });
    }
    tracing::debug!(requirements = doc.requirements.len(), "parsed document");
    Ok(doc)
}

/// Parse every requirement line, collecting failures instead of stopping.
///
/// Gives up after `max_errors` failures; lines after that point are not
/// examined. A budget of zero is treated as one.
pub fn parse_document_recovering(text: &str, max_errors: usize) -> (Document, Vec<LineError>) {
    let max_errors = max_errors.max(1);
    let mut doc = Document::default();
    let mut errors = Vec::new();

    for (line, src) in requirement_lines(text) {
        match crate::parse_one(src) {
            Ok(record) => doc.requirements.push(ParsedRequirement {
                line,
                text: src.to_owned(),
                record,
            }),
            Err(error) => {
                tracing::debug!(line, stage = error.stage(), "requirement rejected");
                errors.push(LineError {
                    line,
                    text: src.to_owned(),
                    error,
                });
                if errors.len() >= max_errors {
                    tracing::warn!(max_errors, "error limit reached, stopping");
                    break;
                }
            }
        }
    }
    (doc, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
// access rules
User can withdraw money if balance >= amount

   // indented comment
User must authenticate where password_data contains \"uppercase\"
";

    #[test]
    fn skips_blank_and_comment_lines() {
        let doc = parse_document(DOC).unwrap();
        let lines: Vec<usize> = doc.requirements.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 5]);
        assert_eq!(doc.records()[1].action.verb, "authenticate");
        assert_eq!(doc.line_of(0).map(|(n, _)| n), Some(2));
        assert_eq!(doc.line_of(2), None);
    }

    #[test]
    fn stops_at_first_bad_line() {
        let err = parse_document("User can login\nwithdraw money\nUser can logout\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.error.stage(), "parse");
        assert_eq!(err.error.offset(), 0);
        assert_eq!(err.to_json_value()["line"], 2);
    }

    #[test]
    fn recovery_collects_errors_and_keeps_going() {
        let src = "User can login\nUser can $\nUser can logout\nSystem\n";
        let (doc, errors) = parse_document_recovering(src, DEFAULT_MAX_ERRORS);
        assert_eq!(doc.requirements.len(), 2);
        let failed: Vec<(usize, &str)> = errors.iter().map(|e| (e.line, e.error.stage())).collect();
        assert_eq!(failed, vec![(2, "lex"), (4, "parse")]);
    }

    #[test]
    fn recovery_respects_error_budget() {
        let src = "x\ny\nz\nUser can login\n";
        let (doc, errors) = parse_document_recovering(src, 2);
        assert_eq!(errors.len(), 2);
        assert!(doc.requirements.is_empty());
    }

    #[test]
    fn rendered_line_error_has_caret() {
        let err = parse_document("User can $pay").unwrap_err();
        assert_eq!(
            err.render(),
            format!(
                "line 1:\n{}",
                err.error.render("User can $pay")
            )
        );
        assert!(err.render().ends_with("  |          ^"));
    }
}
