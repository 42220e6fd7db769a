//! Subcommand implementations and the reporting helpers they share.

pub(crate) mod parse;
pub(crate) mod tokens;
pub(crate) mod translate;
pub(crate) mod tree;

use std::io::Read;
use std::path::Path;
use std::process;

use crucible_core::{parse_document, parse_document_recovering, Document, LineError};

use crate::OutputFormat;

/// How multi-line input is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DocumentOptions {
    pub recover: bool,
    pub max_errors: usize,
}

/// Read the whole input file; `-` means stdin.
pub(crate) fn read_input(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("error reading stdin: {}", e))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| format!("error reading file '{}': {}", path.display(), e))
}

/// Read input or exit with status 1.
pub(crate) fn read_input_or_exit(path: &Path, output: OutputFormat, quiet: bool) -> String {
    match read_input(path) {
        Ok(s) => s,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// Parse a document according to `options`. Failing lines are reported
/// as they are found; the returned flag says whether there were any.
pub(crate) fn load_document(
    src: &str,
    options: DocumentOptions,
    output: OutputFormat,
    quiet: bool,
) -> (Document, bool) {
    if options.recover {
        let (doc, errors) = parse_document_recovering(src, options.max_errors);
        for e in &errors {
            report_line_error(e, output, quiet);
        }
        (doc, !errors.is_empty())
    } else {
        match parse_document(src) {
            Ok(doc) => (doc, false),
            Err(e) => {
                report_line_error(&e, output, quiet);
                process::exit(1);
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Caret diagnostic in text mode, stage-tagged JSON otherwise.
pub(crate) fn report_line_error(err: &LineError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&err.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", err));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => eprintln!("{}", err.render()),
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}
