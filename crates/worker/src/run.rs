//! Submit one job per instruction and collect the results.

use std::path::{Path, PathBuf};

use booth_core::image::InlineImage;
use booth_genai::dispatcher::Dispatcher;
use booth_genai::job::ImageJob;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::output::{artifact_file_name, write_artifact};

/// Counts of how each job ended.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub cancelled: usize,
    pub failed: usize,
}

/// Submit every instruction against `photo` and write the results.
///
/// Jobs join the dispatcher queue in instruction order. Each job gets a
/// child of `cancel`, so cancelling it abandons every outstanding job.
pub async fn run_jobs(
    dispatcher: &Dispatcher,
    model: &str,
    photo: &InlineImage,
    instructions: &[String],
    output_dir: &Path,
    cancel: &CancellationToken,
) -> RunSummary {
    let submissions = instructions.iter().map(|instruction| {
        let job = ImageJob::with_parts(model, instruction.as_str(), Some(photo.clone()))
            .with_cancel(cancel.child_token());
        tracing::info!(job_id = %job.id(), instruction = %instruction, "Submitting job");
        dispatcher.submit(job)
    });
    let results = join_all(submissions).await;

    let mut summary = RunSummary::default();
    for (index, (instruction, result)) in instructions.iter().zip(results).enumerate() {
        match result {
            Ok(Some(artifact)) => {
                let file_name = artifact_file_name(index, instruction);
                match write_artifact(output_dir, &file_name, &artifact).await {
                    Ok(path) => {
                        tracing::info!(path = %path.display(), "Image written");
                        summary.written.push(path);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, instruction = %instruction, "Failed to write image");
                        summary.failed += 1;
                    }
                }
            }
            Ok(None) => {
                tracing::info!(instruction = %instruction, "Job cancelled");
                summary.cancelled += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, instruction = %instruction, "Job failed");
                summary.failed += 1;
            }
        }
    }
    summary
}
