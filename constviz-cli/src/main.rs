//! constviz CLI - shows the values of C# and Visual Basic constants where
//! they are used.
//!
//! Features:
//! - Indexes every `.cs` / `.vb` file under a project root
//! - Annotates the lines of selected files with resolved constant values
//! - Plain text or JSON output
//! - Rayon-powered parallel annotation

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use constviz_core::{
    init_structured_logging, log_error, log_info, log_warn, print_annotations_plain, print_json,
    print_records_plain, print_summary_plain, report::FileLineReport, ConstantIndex,
    ConstantRecord, Constviz, LineAnnotator,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Show constant values for C# and Visual Basic code")]
pub struct Cli {
    /// Path to the root of the project
    #[arg(default_value = ".")]
    path: String,

    /// Source file whose lines should be annotated (repeatable)
    #[arg(long = "file", value_name = "FILE")]
    files: Vec<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// List every indexed constant
    #[arg(long)]
    list: bool,

    /// Also index Visual Basic files
    #[arg(long)]
    vb: bool,

    /// Do not index C# files
    #[arg(long)]
    no_csharp: bool,

    /// Directory names to skip while scanning (repeatable)
    #[arg(long, value_name = "DIR")]
    exclude: Vec<String>,
}

impl Cli {
    fn builder(&self, root: &Path) -> Constviz {
        let mut builder = Constviz::new(root).exclude_dirs(self.exclude.iter().cloned());
        if self.vb {
            builder = builder.visual_basic(true);
        }
        if self.no_csharp {
            builder = builder.csharp(false);
        }
        builder
    }
}

/// Annotates every line of `path`, keeping only lines with annotations.
fn annotate_file(index: &ConstantIndex, path: &Path) -> Result<Vec<FileLineReport>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let source_id = path.to_string_lossy().to_string();
    let annotator = LineAnnotator::new(index);

    Ok(text
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let annotations = annotator.annotate(line, &source_id);
            (!annotations.is_empty()).then(|| FileLineReport {
                file: source_id.clone(),
                line: i + 1,
                annotations,
            })
        })
        .collect())
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] constviz internal error: {}", info);
        eprintln!("[PANIC] The process will exit safely with code 2.");
        std::process::exit(2);
    }));

    let cli = Cli::parse();
    run(&cli).inspect_err(|e| log_error(&format!("{:#}", e)))
}

fn run(cli: &Cli) -> Result<()> {
    // Index ids are canonical paths so --file arguments line up with them.
    let root: PathBuf = fs::canonicalize(&cli.path)
        .with_context(|| format!("Failed to resolve project root: {}", cli.path))?;
    let builder = cli.builder(&root);

    let config = builder.resolve_config()?;
    init_structured_logging(config.logging.advanced);

    log_info(&format!("Indexing {}", root.display()));
    let project = builder.with_config(config).index()?;
    for (source, message) in &project.summary.failed_units {
        log_warn(&format!("{}: {}", source, message));
    }

    let files: Vec<PathBuf> = cli
        .files
        .iter()
        .map(|f| fs::canonicalize(f).with_context(|| format!("Failed to resolve file: {}", f)))
        .collect::<Result<_>>()?;

    let lines: Vec<FileLineReport> = files
        .par_iter()
        .map(|path| annotate_file(&project.index, path))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let records: Vec<&ConstantRecord> = project.index.records().collect();

    if cli.json {
        print_json(&project.summary, cli.list.then_some(records.as_slice()), &lines);
        return Ok(());
    }

    print_summary_plain(&project.summary);
    if cli.list {
        print_records_plain(&records);
    }
    if !files.is_empty() {
        print_annotations_plain(&lines);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use constviz_core::{ConstvizConfig, DeclarationSource, SourceUnit};

    #[test]
    fn test_flags_map_to_builder() {
        let cli = Cli::try_parse_from(["constviz", "proj", "--vb", "--no-csharp", "--exclude", "Legacy"])
            .unwrap();
        let config = cli
            .builder(Path::new("/nonexistent"))
            .with_config(ConstvizConfig::default())
            .resolve_config()
            .unwrap();
        assert!(config.languages.visual_basic);
        assert!(!config.languages.csharp);
        assert_eq!(config.scan.exclude, vec!["Legacy"]);
    }

    #[test]
    fn test_annotate_file_reports_lines() {
        let mut index = ConstantIndex::new();
        index
            .rebuild_all(
                vec![SourceUnit::new(
                    "Limits.cs",
                    DeclarationSource::CSharp,
                    "class Limits { const int MAX = 10; }",
                )],
                &ConstvizConfig::default(),
            )
            .unwrap();

        let path = std::env::temp_dir().join(format!("constviz_cli_{}.cs", std::process::id()));
        fs::write(&path, "class P\n{\n    int x = Limits.MAX;\n}\n").unwrap();
        let lines = annotate_file(&index, &path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line, 3);
        assert_eq!(lines[0].annotations[0].display, "10");
        assert!(annotate_file(&index, Path::new("/nonexistent/P.cs")).is_err());
    }
}
