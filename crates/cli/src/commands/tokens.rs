use std::path::Path;
use std::process;

use crucible_core::document::requirement_lines;
use crucible_core::{tokenize, Error, LineError, Token};

use super::{print_json, read_input_or_exit, report_line_error};
use crate::OutputFormat;

/// Serialized token plus its coarse category.
fn token_json(token: &Token) -> serde_json::Value {
    let mut value = serde_json::to_value(token).unwrap_or(serde_json::Value::Null);
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "category".to_owned(),
            serde_json::to_value(token.kind.category()).unwrap_or(serde_json::Value::Null),
        );
    }
    value
}

pub(crate) fn cmd_tokens(file: &Path, output: OutputFormat, quiet: bool) {
    let src = read_input_or_exit(file, output, quiet);

    let mut lines = Vec::new();
    for (line, text) in requirement_lines(&src) {
        match tokenize(text) {
            Ok(tokens) => lines.push((line, tokens)),
            Err(e) => {
                let err = LineError {
                    line,
                    text: text.to_owned(),
                    error: Error::Lex(e),
                };
                report_line_error(&err, output, quiet);
                process::exit(1);
            }
        }
    }

    match output {
        OutputFormat::Json => {
            let json: Vec<_> = lines
                .iter()
                .map(|(line, tokens)| {
                    let tokens: Vec<_> = tokens.iter().map(token_json).collect();
                    serde_json::json!({ "line": line, "tokens": tokens })
                })
                .collect();
            print_json(&json);
        }
        OutputFormat::Text => {
            for (line, tokens) in &lines {
                println!("line {}:", line);
                for token in tokens {
                    let range = format!("{}..{}", token.span.start, token.span.end);
                    println!("  {:<9} {:<22} {}", range, token.kind.describe(), token);
                }
            }
        }
    }
}
