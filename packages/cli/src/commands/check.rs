use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use postcraft_editor::link_color_violations;
use postcraft_markup::{parse_with_report, DropReason, DroppedElement};
use postcraft_schema::Schema;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Post file or directory (defaults to the configured source directory)
    pub input: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Treat dropped elements as errors
    #[arg(long)]
    pub strict: bool,

    /// Working directory
    #[arg(long, default_value = ".")]
    pub cwd: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    dropped: Vec<DroppedEntry>,
    link_color: Vec<LinkColorEntry>,
}

#[derive(Debug, Serialize)]
struct DroppedEntry {
    tag: String,
    position: usize,
    reason: String,
}

#[derive(Debug, Serialize)]
struct LinkColorEntry {
    from: usize,
    to: usize,
    color: String,
}

impl FileReport {
    fn has_errors(&self, strict: bool) -> bool {
        self.error.is_some() || !self.link_color.is_empty() || (strict && !self.dropped.is_empty())
    }
}

fn describe(reason: &DropReason) -> String {
    match reason {
        DropReason::UnknownType => "unknown element".to_string(),
        DropReason::Misplaced { parent } => format!("not allowed inside {}", parent),
    }
}

fn dropped_entry(element: &DroppedElement) -> DroppedEntry {
    DroppedEntry {
        tag: element.tag.clone(),
        position: element.position,
        reason: describe(&element.reason),
    }
}

fn check_file(path: &Path, schema: &Schema) -> Result<FileReport> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut report = FileReport {
        path: path.display().to_string(),
        error: None,
        dropped: Vec::new(),
        link_color: Vec::new(),
    };

    match parse_with_report(&source, schema) {
        Ok((doc, parse_report)) => {
            report.dropped = parse_report.dropped.iter().map(dropped_entry).collect();
            report.link_color = link_color_violations(&doc)
                .into_iter()
                .map(|v| LinkColorEntry {
                    from: v.from,
                    to: v.to,
                    color: v.style.attr("color").as_str().unwrap_or_default().to_string(),
                })
                .collect();
        }
        Err(e) => report.error = Some(e.to_string()),
    }

    debug!(path = %report.path, dropped = report.dropped.len(), "Checked post");
    Ok(report)
}

pub fn check(args: CheckArgs) -> Result<()> {
    let config = Config::load(&args.cwd)?;
    let schema = Schema::standard()?;
    let files = super::collect_posts(args.input.as_deref(), &config, &args.cwd)?;

    if files.is_empty() {
        println!("{} No posts found", "⚠".yellow());
        return Ok(());
    }

    let reports = files
        .iter()
        .map(|path| check_file(path, &schema))
        .collect::<Result<Vec<_>>>()?;
    let failed = reports.iter().filter(|r| r.has_errors(args.strict)).count();

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        _ => {
            for report in &reports {
                print_report(report, args.strict);
            }
            println!();
            if failed == 0 {
                println!("{} {} post(s) checked", "Done".green().bold(), reports.len());
            } else {
                println!(
                    "{} {} of {} post(s) have problems",
                    "✗".red().bold(),
                    failed,
                    reports.len()
                );
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &FileReport, strict: bool) {
    if let Some(error) = &report.error {
        println!("{} {}: {}", "✗".red(), report.path, error.red());
        return;
    }

    if report.dropped.is_empty() && report.link_color.is_empty() {
        println!("{} {}", "✓".green(), report.path);
        return;
    }

    let mark = if report.has_errors(strict) { "✗".red() } else { "⚠".yellow() };
    println!("{} {}", mark, report.path);
    for dropped in &report.dropped {
        println!(
            "    {} <{}> at byte {}: {}",
            "dropped".yellow(),
            dropped.tag,
            dropped.position,
            dropped.reason
        );
    }
    for violation in &report.link_color {
        println!(
            "    {} colored link text at {}..{} ({})",
            "error".red(),
            violation.from,
            violation.to,
            violation.color
        );
    }
}
