use std::path::PathBuf;

use clap::Parser;

/// Generate stylised variants of a photo with a remote image model.
#[derive(Debug, Parser)]
#[command(name = "booth-worker", version, about)]
pub struct Args {
    /// Input photo (JPEG) sent alongside every instruction.
    pub input: PathBuf,

    /// One job is submitted per instruction.
    #[arg(required = true)]
    pub instructions: Vec<String>,

    /// Directory the generated PNG files are written to.
    #[arg(short, long, default_value = "out")]
    pub output_dir: PathBuf,

    /// Model identifier; overrides `GENAI_MODEL`.
    #[arg(short, long)]
    pub model: Option<String>,
}
