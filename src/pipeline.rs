//! Render orchestration
//!
//! Walks parameter files, and for each one renders a light and a dark pass.
//! A pass owns one workspace, injects the themed parameters into both scene
//! scripts, then runs the front and back captures strictly in sequence,
//! post-processing each vector fragment before moving on.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::capture::CaptureSession;
use crate::svgproc::VectorPostProcessor;
use crate::workspace::Workspace;
use crate::{CaptureConfig, CaptureTarget, RenderParams, Result, Side};

/// Counts reported by one orchestrator run
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    /// Theme passes that completed with at least the raster artifacts
    pub rendered: usize,
    /// Theme passes aborted by a fatal error
    pub failed: usize,
    /// Input paths skipped because they were not parameter files
    pub skipped: usize,
}

/// Entry point that drives workspaces, injection, capture and post-processing
pub struct RenderPipeline {
    scene_dir: PathBuf,
    output_dir: PathBuf,
    capture: CaptureConfig,
    post: VectorPostProcessor,
}

impl RenderPipeline {
    pub fn new(
        scene_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        capture: CaptureConfig,
    ) -> Self {
        Self {
            scene_dir: scene_dir.into(),
            output_dir: output_dir.into(),
            capture,
            post: VectorPostProcessor::default(),
        }
    }

    /// Override the vector post-processor (tool path, font remapping)
    pub fn with_post_processor(mut self, post: VectorPostProcessor) -> Self {
        self.post = post;
        self
    }

    /// Render every parameter file reachable from `paths`.
    ///
    /// Each path is either a parameter JSON file or a directory scanned
    /// recursively for `*.json`. Failures are contained per theme pass;
    /// unrelated configurations always continue.
    pub fn run(&self, paths: &[PathBuf]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for path in paths {
            self.process_path(path, &mut summary)?;
        }
        Ok(summary)
    }

    fn process_path(&self, path: &Path, summary: &mut RunSummary) -> Result<()> {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = Vec::new();
            collect_json_files(path, &mut entries)?;
            entries.sort();
            for entry in entries {
                self.render_all_themes(&entry, summary);
            }
        } else if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            self.render_all_themes(path, summary);
        } else {
            warn!("Skipping {}, not a JSON file or directory", path.display());
            summary.skipped += 1;
        }
        Ok(())
    }

    fn render_all_themes(&self, params_path: &Path, summary: &mut RunSummary) {
        for dark in [false, true] {
            match self.render_pass(params_path, dark) {
                Ok(()) => summary.rendered += 1,
                Err(e) => {
                    error!(
                        "Render pass failed for {} (dark: {}): {}",
                        params_path.display(),
                        dark,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    /// One theme pass: fresh workspace, themed injection into both scene
    /// scripts, then the front and back captures in order.
    fn render_pass(&self, params_path: &Path, dark: bool) -> Result<()> {
        let params = RenderParams::from_path(params_path)?;
        let name = params.name()?.to_string();

        let workspace = Workspace::acquire(&self.scene_dir)?;

        // Renders must be static and themed; the front always carries the
        // tagline, the back never does.
        let mut front_params = params.clone();
        front_params.set_flag("animate", false);
        front_params.set_flag("dark", dark);
        front_params.set_flag("tagline", true);
        crate::inject::inject_into_file(&workspace.file(Path::new("script.js")), &front_params)?;

        let mut back_params = front_params.clone();
        back_params.set_flag("tagline", false);
        crate::inject::inject_into_file(&workspace.file(Path::new("back.js")), &back_params)?;

        fs::create_dir_all(&self.output_dir)?;

        for target in [CaptureTarget::front(), CaptureTarget::back()] {
            if let Err(e) = self.capture_target(&workspace, &target, &name, dark) {
                // Fatal for this target only; the sibling capture continues.
                error!(
                    "Capture of {} (#{}) failed for configuration {}: {}",
                    target.document.display(),
                    target.element_id,
                    name,
                    e
                );
            }
        }

        workspace.release();
        Ok(())
    }

    fn capture_target(
        &self,
        workspace: &Workspace,
        target: &CaptureTarget,
        name: &str,
        dark: bool,
    ) -> Result<()> {
        let result = match CaptureSession::capture(&self.capture, workspace, target)? {
            Some(result) => result,
            None => return Ok(()),
        };

        let stem = artifact_stem(name, target.side, dark);
        let png_path = self.output_dir.join(format!("{}.png", stem));
        fs::write(&png_path, &result.image)?;
        info!("Wrote {}", png_path.display());

        if let Some(fragment) = &result.vector {
            self.write_vector_artifacts(fragment, target, &stem)?;
        }
        Ok(())
    }

    /// Persist and flatten the vector artifacts for one captured fragment.
    /// The raster file is already on disk at this point and is retained even
    /// when the flattening tool fails.
    fn write_vector_artifacts(
        &self,
        fragment: &str,
        target: &CaptureTarget,
        stem: &str,
    ) -> Result<()> {
        let svg_path = self.output_dir.join(format!("{}.svg", stem));
        self.post.write_document(&self.post.normalize(fragment), &svg_path)?;
        self.post.flatten(&svg_path)?;
        info!("Wrote {}", svg_path.display());

        if target.prune_fine_print {
            if let Some(pruned) = self.post.prune_fine_print(fragment)? {
                let zipper_path = self.output_dir.join(format!("{}_zipper.svg", stem));
                self.post
                    .write_document(&self.post.normalize(&pruned), &zipper_path)?;
                self.post.flatten(&zipper_path)?;
                info!("Wrote {}", zipper_path.display());
            }
        }
        Ok(())
    }
}

/// Output filename stem for one (configuration, side, theme) triple
pub fn artifact_stem(name: &str, side: Side, dark: bool) -> String {
    let suffix = if dark { "_dark" } else { "" };
    format!("{}_{}{}", name, side.as_str(), suffix)
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|e| e == "json") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_stems_cover_both_themes() {
        assert_eq!(artifact_stem("acme", Side::Front, false), "acme_front");
        assert_eq!(artifact_stem("acme", Side::Back, false), "acme_back");
        assert_eq!(artifact_stem("acme", Side::Front, true), "acme_front_dark");
        assert_eq!(artifact_stem("acme", Side::Back, true), "acme_back_dark");
    }

    #[test]
    fn test_theme_sets_do_not_collide() {
        let light: Vec<String> = [Side::Front, Side::Back]
            .iter()
            .map(|s| artifact_stem("acme", *s, false))
            .collect();
        let dark: Vec<String> = [Side::Front, Side::Back]
            .iter()
            .map(|s| artifact_stem("acme", *s, true))
            .collect();
        for stem in &light {
            assert!(!dark.contains(stem));
        }
    }

    #[test]
    fn test_non_json_path_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let stray = dir.path().join("notes.txt");
        fs::write(&stray, "not parameters").unwrap();

        let pipeline = RenderPipeline::new("docs", dir.path(), CaptureConfig::default());
        let mut summary = RunSummary::default();
        pipeline.process_path(&stray, &mut summary).unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rendered, 0);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_directory_scan_finds_nested_parameters() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("team/a")).unwrap();
        fs::write(dir.path().join("team/a/acme.json"), "{}").unwrap();
        fs::write(dir.path().join("readme.md"), "docs").unwrap();

        let mut found = Vec::new();
        collect_json_files(dir.path(), &mut found).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("team/a/acme.json"));
    }

    #[test]
    fn test_pass_with_missing_scene_fails_but_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let params = dir.path().join("acme.json");
        fs::write(&params, r#"{"name": "acme"}"#).unwrap();

        let pipeline = RenderPipeline::new(
            dir.path().join("no-such-scene"),
            dir.path().join("renders"),
            CaptureConfig::default(),
        );
        let mut summary = RunSummary::default();
        pipeline.process_path(&params, &mut summary).unwrap();

        // both theme passes fail, nothing else aborts
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.rendered, 0);
    }
}
