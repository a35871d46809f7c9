use std::path::PathBuf;

use clap::Parser;
use merchpress::{CaptureConfig, RenderPipeline, VectorPostProcessor};

/// Render hoodie mockups for every parameter file given.
///
/// Each PATH is a parameter JSON file or a directory scanned recursively
/// for parameter files. Outputs land in ./renders, scene assets are read
/// from ./docs.
#[derive(Parser)]
#[command(name = "merchpress", version)]
struct Cli {
    /// Parameter files or directories to scan
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let mut config = CaptureConfig::default();
    if let Some(path) = std::env::var_os("MERCHPRESS_CHROME") {
        config.browser_path = Some(PathBuf::from(path));
    }
    let post = match std::env::var_os("MERCHPRESS_INKSCAPE") {
        Some(path) => VectorPostProcessor::new(PathBuf::from(path)),
        None => VectorPostProcessor::default(),
    };

    let pipeline = RenderPipeline::new("docs", "renders", config).with_post_processor(post);

    match pipeline.run(&cli.paths) {
        Ok(summary) => {
            println!(
                "rendered {} passes, {} failed, {} inputs skipped",
                summary.rendered, summary.failed, summary.skipped
            );
            if summary.rendered == 0 && summary.failed > 0 {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("merchpress: {}", e);
            std::process::exit(1);
        }
    }
}
