use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use postcraft_editor::EditorSession;
use postcraft_schema::Schema;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Post file or directory (defaults to the configured source directory)
    pub input: Option<PathBuf>,

    /// Rewrite files in place
    #[arg(short, long)]
    pub write: bool,

    /// Print normalized markup to stdout
    #[arg(long)]
    pub stdout: bool,

    /// Working directory
    #[arg(long, default_value = ".")]
    pub cwd: String,
}

/// Load a post, apply the invariant pass and serialize it back
pub fn normalize_source(schema: Arc<Schema>, source: &str, config: &Config) -> Result<(String, bool)> {
    let mut session = EditorSession::from_markup(schema, source, config.editor_config())?;
    let corrected = config.enforce_link_color && session.enforce_invariants()?;
    let markup = session.to_markup();
    Ok((markup, corrected))
}

pub fn normalize(args: NormalizeArgs) -> Result<()> {
    let config = Config::load(&args.cwd)?;
    let schema = Arc::new(Schema::standard()?);
    let files = super::collect_posts(args.input.as_deref(), &config, &args.cwd)?;

    if files.is_empty() {
        println!("{} No posts found", "⚠".yellow());
        return Ok(());
    }

    let mut changed = 0;
    for path in &files {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let (markup, corrected) = normalize_source(schema.clone(), &source, &config)
            .with_context(|| format!("Failed to normalize {}", path.display()))?;

        if args.stdout {
            println!("{}", markup);
            continue;
        }

        let differs = markup != source.trim_end();
        if differs {
            changed += 1;
        }

        if args.write && differs {
            std::fs::write(path, format!("{}\n", markup))?;
            info!(path = %path.display(), corrected, "Normalized post");
            println!("{} {}", "✓".green(), path.display());
        } else if differs {
            println!("{} {} {}", "⚠".yellow(), path.display(), "(would change)".dimmed());
        }
    }

    if !args.stdout {
        println!();
        if args.write {
            println!("{} {} post(s) rewritten", "Done".green().bold(), changed);
        } else {
            println!(
                "{} {} post(s) would change; pass --write to apply",
                "Done".green().bold(),
                changed
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::standard().unwrap())
    }

    #[test]
    fn test_clears_link_color() {
        let source = r#"<p><a href="https://x.y"><span style="color: red">go</span></a></p>"#;
        let (markup, corrected) = normalize_source(schema(), source, &Config::default()).unwrap();
        assert!(corrected);
        assert_eq!(markup, r#"<p><a href="https://x.y">go</a></p>"#);
    }

    #[test]
    fn test_respects_disabled_enforcement() {
        let source = r#"<p><a href="https://x.y"><span style="color: red">go</span></a></p>"#;
        let config = Config {
            enforce_link_color: false,
            ..Config::default()
        };
        let (markup, corrected) = normalize_source(schema(), source, &config).unwrap();
        assert!(!corrected);
        assert!(markup.contains("color: red"));
    }
}
