use std::path::Path;
use std::process;

use crucible_core::IntentRecord;

use super::{load_document, print_json, read_input_or_exit, DocumentOptions};
use crate::OutputFormat;

/// One-line summary: subject, modal and action as written.
fn headline(record: &IntentRecord) -> String {
    let mut out = format!("{} {} {}", record.subject, record.modal, record.action.verb);
    if let Some(object) = &record.action.object {
        out.push(' ');
        out.push_str(object);
    }
    if let Some(pp) = &record.action.preposition_phrase {
        out.push_str(&format!(" {} {}", pp.preposition, pp.noun_phrase));
    }
    out
}

pub(crate) fn cmd_parse(file: &Path, options: DocumentOptions, output: OutputFormat, quiet: bool) {
    let src = read_input_or_exit(file, output, quiet);
    let (doc, had_errors) = load_document(&src, options, output, quiet);

    match output {
        OutputFormat::Json => print_json(&doc),
        OutputFormat::Text => {
            for req in &doc.requirements {
                println!("line {}: {}", req.line, headline(&req.record));
                if let Some(condition) = &req.record.condition {
                    println!("  if    {}", condition);
                }
                if let Some(constraint) = &req.record.constraint {
                    println!("  where {}", constraint);
                }
            }
            if !quiet {
                eprintln!("{} requirement(s) parsed", doc.requirements.len());
            }
        }
    }

    if had_errors {
        process::exit(1);
    }
}
