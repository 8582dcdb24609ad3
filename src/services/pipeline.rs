//! Sequential labeling pipeline over a directory of PDF documents.
//!
//! Documents are processed one at a time; the only shared state is the
//! accumulating row list, written out once after the loop.

use std::path::{Path, PathBuf};

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Settings;
use crate::export::{self, LabelRecord};
use crate::extract;
use crate::llm::{ChatBackend, LlmConfig};
use crate::services::label::{LabelOutcome, Labeler};

/// Counters for a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Documents that received generated labels.
    pub labeled: usize,
    /// Documents with no extractable text.
    pub empty: usize,
    /// Documents whose retry budget was exhausted.
    pub failed: usize,
    /// Rows written to the output table.
    pub total: usize,
}

/// Runs the extract → label → export pipeline.
pub struct LabelPipeline<'a> {
    settings: &'a Settings,
    llm_config: &'a LlmConfig,
    backend: &'a dyn ChatBackend,
}

impl<'a> LabelPipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        llm_config: &'a LlmConfig,
        backend: &'a dyn ChatBackend,
    ) -> Self {
        Self {
            settings,
            llm_config,
            backend,
        }
    }

    /// Process every PDF in the input directory and write the output table.
    ///
    /// A single document can never abort the run; only a missing input
    /// directory or a failed export is fatal. On export failure the
    /// accumulated rows are printed before the error propagates, so
    /// collected results are not lost.
    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        let mut files = list_pdf_files(&self.settings.input_dir)?;
        if self.settings.doc_limit > 0 && files.len() > self.settings.doc_limit {
            files.truncate(self.settings.doc_limit);
        }

        let labeler = Labeler::new(self.backend, self.llm_config);
        let mut summary = RunSummary::default();
        let mut rows: Vec<LabelRecord> = Vec::with_capacity(files.len());

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        pb.set_message("Labeling...");

        for path in &files {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pb.set_message(truncate(&filename, 40));
            info!("Processing: {}", filename);

            let text = extract::extract_text(path, self.settings.page_limit);
            let outcome = labeler.label(&text).await;

            match &outcome {
                LabelOutcome::Generated(labels) => {
                    summary.labeled += 1;
                    pb.println(format!("  {} {} -> {}", style("✓").green(), filename, labels));
                }
                LabelOutcome::NoText => {
                    summary.empty += 1;
                    pb.println(format!(
                        "  {} {} has no extractable text",
                        style("!").yellow(),
                        filename
                    ));
                }
                LabelOutcome::Exhausted => {
                    summary.failed += 1;
                    pb.println(format!(
                        "  {} {} labeling failed",
                        style("✗").red(),
                        filename
                    ));
                }
            }

            rows.push(LabelRecord {
                filename,
                labels: outcome.into_label(),
            });
            pb.inc(1);
        }

        pb.finish_and_clear();
        summary.total = rows.len();

        if let Err(e) = export::write_table(&self.settings.output_path, &rows) {
            // Surface the collected results before failing the run
            println!(
                "{} Could not write {}: {}",
                style("✗").red(),
                self.settings.output_path.display(),
                e
            );
            for row in &rows {
                println!("  {} -> {}", row.filename, row.labels);
            }
            return Err(e).with_context(|| {
                format!(
                    "failed to write output table {}",
                    self.settings.output_path.display()
                )
            });
        }

        info!(rows = summary.total, "Wrote output table");
        Ok(summary)
    }
}

/// List PDF files in a directory, sorted by filename.
///
/// The extension match is case-insensitive and non-files are skipped.
/// Sorting keeps output tables reproducible across platforms whose
/// directory-listing order differs.
fn list_pdf_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read input directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max - 3])
    }
}
