use std::path::Path;
use std::process;

use crucible_core::{translate, Document, Error, LineError, TranslationError};

use super::{
    load_document, print_json, read_input_or_exit, report_error, report_line_error,
    DocumentOptions,
};
use crate::OutputFormat;

pub(crate) fn cmd_translate(
    file: &Path,
    options: DocumentOptions,
    output: OutputFormat,
    quiet: bool,
) {
    let src = read_input_or_exit(file, output, quiet);
    let (doc, had_errors) = load_document(&src, options, output, quiet);

    let set = match translate(&doc.records()) {
        Ok(set) => set,
        Err(e) => {
            report_translation_error(&doc, e, output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&set),
        OutputFormat::Text => print!("{}", set),
    }

    if had_errors {
        process::exit(1);
    }
}

/// Point the diagnostic at the line the failing record came from.
fn report_translation_error(doc: &Document, e: TranslationError, output: OutputFormat, quiet: bool) {
    match doc.line_of(e.position().record) {
        Some((line, text)) => {
            let err = LineError {
                line,
                text: text.to_owned(),
                error: Error::Translation(e),
            };
            report_line_error(&err, output, quiet);
        }
        None => report_error(&Error::Translation(e).to_string(), output, quiet),
    }
}
