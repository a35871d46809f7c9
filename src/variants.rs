//! Combinatorial logo variant generation
//!
//! Takes one logo SVG template and emits the full stylistic matrix: seven
//! palette colors crossed with tagline presence, background opacity and
//! light/dark theme. Edits are id-targeted attribute rewrites and element
//! removals; the pack has no mutable XML DOM, so each edit re-parses the
//! document and splices the byte range reported by roxmltree.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::{Error, Result};

/// Palette adapted from the Japanese Woodblock color list
pub const PALETTE: [(&str, &str); 7] = [
    ("red", "#b03a48"),
    ("orange", "#d4804d"),
    ("yellow", "#d6b74b"),
    ("green", "#3e7a4c"),
    ("blue", "#3266A3"),
    ("purple", "#915394"),
    ("pink", "#d980a0"),
];

const LIGHT_BACKGROUND: &str = "#f1e7da";
const DARK_BACKGROUND: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// One point in the variant matrix
#[derive(Debug, Clone)]
pub struct VariantSpec {
    pub color_name: &'static str,
    pub fill: &'static str,
    pub tagline: bool,
    pub background: bool,
    pub theme: Theme,
}

impl VariantSpec {
    /// Output path relative to the variant root, mirroring the axis layout
    pub fn relative_path(&self) -> PathBuf {
        let mut name = format!("logo_{}_{}", self.color_name, self.theme.as_str());
        if !self.background {
            name.push_str("_transparent");
        }
        if self.tagline {
            name.push_str("_tagline");
        }
        name.push_str(".svg");

        PathBuf::from(self.theme.as_str())
            .join(if self.tagline { "tagline" } else { "bare" })
            .join(if self.background { "opaque" } else { "transparent" })
            .join(name)
    }
}

/// Enumerate the full matrix in a stable order
pub fn enumerate() -> Vec<VariantSpec> {
    let mut specs = Vec::with_capacity(PALETTE.len() * 8);
    for (color_name, fill) in PALETTE {
        for tagline in [true, false] {
            for background in [true, false] {
                for theme in [Theme::Light, Theme::Dark] {
                    specs.push(VariantSpec {
                        color_name,
                        fill,
                        tagline,
                        background,
                        theme,
                    });
                }
            }
        }
    }
    specs
}

/// Rewrite one template into one variant
pub fn apply(template: &str, spec: &VariantSpec) -> Result<String> {
    let mut svg = set_attr(template, Some("star"), "fill", spec.fill)?;

    if !spec.tagline {
        if let Some(stripped) = remove_element(&svg, "tagline")? {
            svg = stripped;
            svg = set_attr(&svg, None, "viewBox", "-50 -50 100 17.5")?;
            svg = set_attr(&svg, None, "height", "175")?;
        }
    }

    if spec.background {
        let color = match spec.theme {
            Theme::Light => LIGHT_BACKGROUND,
            Theme::Dark => DARK_BACKGROUND,
        };
        svg = set_attr(&svg, None, "style", &format!("background-color: {};", color))?;
        if spec.tagline {
            svg = set_attr(&svg, None, "viewBox", "-60 -60 120 45")?;
            svg = set_attr(&svg, None, "width", "1200")?;
            svg = set_attr(&svg, None, "height", "450")?;
        } else {
            svg = set_attr(&svg, None, "viewBox", "-60 -60 120 37.5")?;
            svg = set_attr(&svg, None, "width", "1200")?;
            svg = set_attr(&svg, None, "height", "375")?;
        }
    }

    if spec.theme == Theme::Dark {
        // Wordmark and tagline flip to the paper color on dark
        for id in ["codestar", "tagline"] {
            svg = set_attr(&svg, Some(id), "fill", LIGHT_BACKGROUND)?;
        }
    }

    Ok(svg)
}

/// Generate the whole matrix under `out_root`, returning the written paths
pub fn generate(template: &str, out_root: &Path) -> Result<Vec<PathBuf>> {
    // Fail fast on a malformed template rather than per variant
    parse(template)?;

    let mut written = Vec::new();
    for spec in enumerate() {
        let variant = apply(template, &spec)?;
        let path = out_root.join(spec.relative_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, variant)?;
        written.push(path);
    }
    info!("Generated {} logo variants under {}", written.len(), out_root.display());
    Ok(written)
}

fn parse(svg: &str) -> Result<roxmltree::Document<'_>> {
    roxmltree::Document::parse(svg)
        .map_err(|e| Error::Variant(format!("template is not well-formed SVG: {}", e)))
}

/// Set an attribute on the element with the given id, or on the root when
/// `id` is `None`. Missing target elements leave the document unchanged,
/// matching the tolerant behavior of the original matrix loop.
fn set_attr(svg: &str, id: Option<&str>, name: &str, value: &str) -> Result<String> {
    let node_start = {
        let doc = parse(svg)?;
        let node = match id {
            Some(id) => doc
                .descendants()
                .find(|n| n.is_element() && n.attribute("id") == Some(id)),
            None => Some(doc.root_element()),
        };
        match node {
            Some(n) => n.range().start,
            None => return Ok(svg.to_string()),
        }
    };

    let tag_end = svg[node_start..]
        .find('>')
        .map(|i| node_start + i)
        .ok_or_else(|| Error::Variant("unterminated opening tag".to_string()))?;
    let tag = &svg[node_start..tag_end];

    let needle = format!(" {}=\"", name);
    let rewritten_tag = if let Some(attr_pos) = tag.find(&needle) {
        let value_start = attr_pos + needle.len();
        let value_end = tag[value_start..]
            .find('"')
            .map(|i| value_start + i)
            .ok_or_else(|| Error::Variant(format!("unterminated {} attribute", name)))?;
        format!("{}{}{}", &tag[..value_start], value, &tag[value_end..])
    } else {
        let insert_at = if tag.ends_with('/') { tag.len() - 1 } else { tag.len() };
        format!(
            "{} {}=\"{}\"{}",
            &tag[..insert_at],
            name,
            value,
            &tag[insert_at..]
        )
    };

    let mut out = String::with_capacity(svg.len() + rewritten_tag.len());
    out.push_str(&svg[..node_start]);
    out.push_str(&rewritten_tag);
    out.push_str(&svg[tag_end..]);
    Ok(out)
}

/// Remove the element with the given id, returning `None` when absent
fn remove_element(svg: &str, id: &str) -> Result<Option<String>> {
    let range = {
        let doc = parse(svg)?;
        doc.descendants()
            .find(|n| n.is_element() && n.attribute("id") == Some(id))
            .map(|n| n.range())
    };

    Ok(range.map(|r| {
        let mut out = svg.to_string();
        out.replace_range(r, "");
        out
    }))
}
