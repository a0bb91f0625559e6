//! `homescan validate`: YAML checks with the platform's custom tags.

use std::fmt::Write;

use tabled::Tabled;

use homescan_sources::{FileReport, FileStatus, validate_file};

use crate::cli::ValidateArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output::{self, Painter};

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Directives")]
    directives: String,
    #[tabled(rename = "Unknown tags")]
    unknown: String,
}

fn row(report: &FileReport, painter: Painter) -> ReportRow {
    let (status, directives, unknown) = match &report.status {
        FileStatus::Valid {
            directives,
            unknown_tags,
        } => {
            let status = if unknown_tags.is_empty() {
                painter.good("valid")
            } else {
                painter.warn("valid")
            };
            let tags: Vec<String> = unknown_tags.iter().map(|d| format!("!{}", d.tag)).collect();
            (status, directives.len().to_string(), tags.join(", "))
        }
        FileStatus::ParseError { message } => (
            painter.bad(&format!("parse error: {message}")),
            "-".into(),
            String::new(),
        ),
        FileStatus::Missing => (painter.bad("missing"), "-".into(), String::new()),
    };
    ReportRow {
        file: report.path.display().to_string(),
        status,
        directives,
        unknown,
    }
}

/// Table view with every include directive listed under its file.
fn detail(reports: &[FileReport], painter: Painter) -> String {
    let rows: Vec<ReportRow> = reports.iter().map(|r| row(r, painter)).collect();
    let mut out = output::render_table(&rows);
    for report in reports {
        if let FileStatus::Valid { directives, .. } = &report.status {
            if directives.is_empty() {
                continue;
            }
            let _ = write!(out, "\n\n{}", painter.heading(&report.path.display().to_string()));
            for d in directives {
                let target = d.target.as_deref().unwrap_or("-");
                let _ = write!(out, "\n  {}: !{} {target}", d.path, d.tag);
            }
        }
    }
    out
}

pub fn handle(ctx: &Context, args: &ValidateArgs) -> Result<(), CliError> {
    let files = if args.files.is_empty() {
        vec![ctx.config_dir().join("configuration.yaml")]
    } else {
        args.files.clone()
    };
    let reports: Vec<FileReport> = files.iter().map(|f| validate_file(f)).collect();

    let out = output::render_report(
        ctx.output,
        &reports,
        |r| detail(r, ctx.painter),
        |r| {
            r.iter()
                .map(|f| {
                    let verdict = if f.is_valid() { "ok" } else { "fail" };
                    format!("{verdict} {}", f.path.display())
                })
                .collect()
        },
    )?;
    output::print_output(&out, ctx.quiet);

    let failed = reports.iter().filter(|r| !r.is_valid()).count();
    if failed > 0 {
        return Err(CliError::InvalidYaml {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}
