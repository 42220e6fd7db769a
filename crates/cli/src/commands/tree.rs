use std::path::Path;
use std::process;

use crucible_core::document::requirement_lines;
use crucible_core::syntax::OutlineEntry;
use crucible_core::{parse, tokenize, Error, LineError};

use super::{print_json, read_input_or_exit, report_line_error};
use crate::OutputFormat;

fn outline_line(text: &str) -> Result<Vec<OutlineEntry>, Error> {
    let tokens = tokenize(text)?;
    let tree = parse(&tokens)?;
    Ok(tree.outline())
}

pub(crate) fn cmd_tree(file: &Path, output: OutputFormat, quiet: bool) {
    let src = read_input_or_exit(file, output, quiet);

    let mut outlines = Vec::new();
    for (line, text) in requirement_lines(&src) {
        match outline_line(text) {
            Ok(outline) => outlines.push((line, text, outline)),
            Err(error) => {
                let err = LineError {
                    line,
                    text: text.to_owned(),
                    error,
                };
                report_line_error(&err, output, quiet);
                process::exit(1);
            }
        }
    }

    match output {
        OutputFormat::Json => {
            let json: Vec<_> = outlines
                .iter()
                .map(|(line, _, outline)| serde_json::json!({ "line": line, "outline": outline }))
                .collect();
            print_json(&json);
        }
        OutputFormat::Text => {
            for (line, text, outline) in &outlines {
                println!("line {}:", line);
                for entry in outline {
                    let snippet = text.get(entry.span.start..entry.span.end).unwrap_or("");
                    println!(
                        "{}{:?} {}..{} {:?}",
                        "  ".repeat(entry.depth + 1),
                        entry.kind,
                        entry.span.start,
                        entry.span.end,
                        snippet
                    );
                }
            }
        }
    }
}
