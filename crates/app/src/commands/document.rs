//! `graphit operations`, `graphit format` and `graphit minify`

use std::process::ExitCode;

use anyhow::Result;
use graphit_application::document::{minify as minify_document, parse_operations, pretty_print};

use super::{print_json, read_document};
use crate::cli::{DocumentArgs, OperationsArgs};

pub async fn operations(args: &OperationsArgs) -> Result<ExitCode> {
    let document = read_document(args.document.file.as_deref()).await?;
    let operations = parse_operations(&document)?;

    if args.json {
        print_json(&operations)?;
    } else {
        for op in &operations {
            println!(
                "{}\t{}\t{}:{}",
                op.kind,
                op.name.as_deref().unwrap_or("<anonymous>"),
                op.line,
                op.column
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn format(args: &DocumentArgs) -> Result<ExitCode> {
    let document = read_document(args.file.as_deref()).await?;
    println!("{}", pretty_print(&document)?.trim_end());
    Ok(ExitCode::SUCCESS)
}

pub async fn minify(args: &DocumentArgs) -> Result<ExitCode> {
    let document = read_document(args.file.as_deref()).await?;
    println!("{}", minify_document(&document)?);
    Ok(ExitCode::SUCCESS)
}
