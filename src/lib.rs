//! Merchpress
//!
//! A branding-asset pipeline that renders hoodie mockups and logo variants
//! from a parameterized interactive scene. It drives a headless Chrome
//! session through a disposable copy of the scene, waits for the render to
//! settle, and extracts both a transparent PNG and a cleaned, text-flattened
//! SVG for each capture target.
//!
//! # Example
//!
//! ```no_run
//! use merchpress::{CaptureConfig, RenderPipeline};
//!
//! # fn main() -> merchpress::Result<()> {
//! let pipeline = RenderPipeline::new("docs", "renders", CaptureConfig::default());
//! let summary = pipeline.run(&["params/acme.json".into()])?;
//! println!("rendered {} passes", summary.rendered);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod capture;
pub mod inject;
pub mod pipeline;
pub mod raster;
pub mod svgproc;
pub mod variants;
pub mod workspace;

pub use capture::{CaptureResult, CaptureSession};
pub use pipeline::{RenderPipeline, RunSummary};
pub use svgproc::VectorPostProcessor;
pub use workspace::Workspace;

/// Configuration for capture sessions
///
/// The defaults reproduce the fixed render geometry the pipeline was built
/// around: a 2000px-wide viewport at a 2x device-pixel multiplier, so output
/// resolution is deterministic regardless of the host display.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Path to the Chrome/Chromium binary; `None` uses auto-detection
    pub browser_path: Option<PathBuf>,
    /// Fixed viewport width in CSS pixels
    pub viewport_width: u32,
    /// Device pixel multiplier applied to the captured region
    pub device_scale_factor: f64,
    /// Timeout for the target element to appear, in milliseconds
    pub selector_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            browser_path: None,
            viewport_width: 2000,
            device_scale_factor: 2.0,
            selector_timeout_ms: 30_000,
        }
    }
}

/// Which side of the garment a capture target renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    /// Label used in output filenames
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

/// One DOM element to extract from one scene document
///
/// Read-only descriptor: the orchestrator builds two of these per render
/// pass and hands them to fresh capture sessions.
#[derive(Debug, Clone)]
pub struct CaptureTarget {
    pub side: Side,
    /// Scene document, relative to the workspace root
    pub document: PathBuf,
    /// Id of the element whose bounding region is captured
    pub element_id: String,
    /// Height/width ratio used to size the viewport
    pub aspect_ratio: f64,
    /// Force a reload-and-rewait after the element first appears. Works
    /// around a font-shaping race where the logo text is misaligned on the
    /// first paint.
    pub reload_for_layout: bool,
    /// Derive an additional fine-print-free vector artifact from this
    /// target's fragment
    pub prune_fine_print: bool,
}

impl CaptureTarget {
    /// The front logo capture: `index.html`, element `#star`
    pub fn front() -> Self {
        Self {
            side: Side::Front,
            document: PathBuf::from("index.html"),
            element_id: "star".to_string(),
            aspect_ratio: 1.1,
            reload_for_layout: true,
            prune_fine_print: true,
        }
    }

    /// The back design capture: `back.html`, element `#back`
    pub fn back() -> Self {
        Self {
            side: Side::Back,
            document: PathBuf::from("back.html"),
            element_id: "back".to_string(),
            aspect_ratio: 1.15,
            reload_for_layout: false,
            prune_fine_print: false,
        }
    }
}

/// Parameters for one render configuration
///
/// The scene defines its own parameter schema; apart from `name` (used for
/// output filenames) the pipeline treats the fields as opaque key/value
/// data and passes them through to the injected script verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderParams {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl RenderParams {
    /// Load parameters from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("malformed parameter file {}: {}", path.display(), e)))
    }

    /// Build parameters from raw JSON text (used by tests)
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::Config(format!("malformed parameters: {}", e)))
    }

    /// The display name used to derive output filenames
    pub fn name(&self) -> Result<&str> {
        self.fields
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| Error::Config("parameter file has no \"name\" field".to_string()))
    }

    /// Set a boolean field, inserting it if absent
    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.fields
            .insert(key.to_string(), serde_json::Value::Bool(value));
    }

    /// Access the underlying map
    pub fn fields(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.fields
    }
}
