//! Vector post-processing
//!
//! Raw fragments serialized out of the browser are not portable as-is:
//! entity references and font names need normalization, and text runs must
//! be flattened to paths so consumers don't need the scene fonts installed.
//! Flattening is delegated to Inkscape, invoked in place on the written file.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;

use crate::{Error, Result};

/// Attribute that marks the scene's circular fine-print layers. Only the
/// `sign()` text-on-path helper emits it, so it doubles as the pruning
/// predicate for the fine-print-free artifact.
const FINE_PRINT_ATTR: &str = "startOffset";

/// Deterministic post-processor for captured vector fragments
#[derive(Debug, Clone)]
pub struct VectorPostProcessor {
    /// Inkscape binary used for text-to-path flattening
    pub tool_path: PathBuf,
    /// Font family name as referenced by the scene
    pub font_from: String,
    /// Font family name as shipped in the distribution
    pub font_to: String,
}

impl Default for VectorPostProcessor {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from("inkscape"),
            font_from: "Conduit ITC Medium".to_string(),
            font_to: "Conduit ITC Std Medium".to_string(),
        }
    }
}

impl VectorPostProcessor {
    pub fn new(tool_path: impl Into<PathBuf>) -> Self {
        Self {
            tool_path: tool_path.into(),
            ..Self::default()
        }
    }

    /// Normalize a raw fragment: explicit numeric form for non-breaking
    /// spaces, and the distribution font name in place of the scene's
    /// reference. Purely textual and referentially transparent.
    pub fn normalize(&self, fragment: &str) -> String {
        fragment
            .replace("&nbsp;", "&#160;")
            .replace(&self.font_from, &self.font_to)
    }

    /// Write a fragment to disk as a standalone, well-formed SVG document.
    pub fn write_document(&self, fragment: &str, path: &Path) -> Result<()> {
        let body = if fragment.contains("xmlns=") {
            fragment.to_string()
        } else {
            // Serialized innerHTML can drop the namespace declaration
            fragment.replacen("<svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"", 1)
        };
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n{}\n",
            body
        );
        std::fs::write(path, document)?;
        Ok(())
    }

    /// Flatten a written SVG in place: plain-SVG dialect plus text converted
    /// to path geometry. A non-zero tool exit is fatal for this artifact.
    pub fn flatten(&self, path: &Path) -> Result<()> {
        let output = Command::new(&self.tool_path)
            .arg("--export-plain-svg")
            .arg("--export-text-to-path")
            .arg("--export-type=svg")
            .arg(format!("--export-filename={}", path.display()))
            .arg(path)
            .output()
            .map_err(|e| {
                Error::PostProcess(format!(
                    "cannot run {} on {}: {}",
                    self.tool_path.display(),
                    path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(Error::PostProcess(format!(
                "{} exited with {} for {}: {}",
                self.tool_path.display(),
                output.status,
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!("Flattened {}", path.display());
        Ok(())
    }

    /// Remove every element subtree carrying the fine-print attribute.
    ///
    /// Returns the reduced fragment, or `None` when nothing matched. This is
    /// structural filtering of one captured fragment, not a second render.
    pub fn prune_fine_print(&self, fragment: &str) -> Result<Option<String>> {
        // The browser's HTML serializer emits `&nbsp;`, which no XML parser
        // accepts; fix the entity up-front so the fragment parses. The same
        // substitution happens again in `normalize`, where it is a no-op.
        let mut current = fragment.replace("&nbsp;", "&#160;");
        let mut pruned_any = false;

        loop {
            let range = {
                let doc = roxmltree::Document::parse(&current).map_err(|e| {
                    Error::PostProcess(format!("fragment is not well-formed XML: {}", e))
                })?;
                doc.descendants()
                    .find(|n| n.is_element() && n.has_attribute(FINE_PRINT_ATTR))
                    .map(|n| n.range())
            };

            match range {
                Some(Range { start, end }) => {
                    current.replace_range(start..end, "");
                    pruned_any = true;
                }
                None => break,
            }
        }

        Ok(if pruned_any { Some(current) } else { None })
    }
}
