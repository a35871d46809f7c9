//! SVG to PNG conversion for generated logo variants
//!
//! Variants are published alongside 512px and 1024px (@2x) PNG renders.
//! Opaque variants carry their background as a root `style` attribute, which
//! resvg does not paint, so the background is filled into the pixmap first.

use std::fs;
use std::path::Path;

use log::info;

use crate::{Error, Result};

/// Render an SVG string to PNG bytes at the given pixel width.
pub fn to_png(svg: &str, width: u32) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| Error::Variant(format!("cannot parse SVG for rasterization: {}", e)))?;

    let size = tree.size();
    let scale = width as f32 / size.width();
    let height = (size.height() * scale).round().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| Error::Variant("zero-sized raster output".to_string()))?;

    if let Some(color) = background_color(svg).and_then(|c| parse_hex_color(&c)) {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| Error::Variant(format!("PNG encoding failed: {}", e)))
}

/// Convert every SVG under `input_dir` into `{stem}.png` and `{stem}@2x.png`
/// under `output_dir`, preserving the directory layout.
pub fn convert_dir(input_dir: &Path, output_dir: &Path) -> Result<usize> {
    let mut converted = 0;
    convert_subdir(input_dir, input_dir, output_dir, &mut converted)?;
    info!("Rasterized {} variants into {}", converted, output_dir.display());
    Ok(converted)
}

fn convert_subdir(
    root: &Path,
    dir: &Path,
    output_root: &Path,
    converted: &mut usize,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            convert_subdir(root, &path, output_root, converted)?;
        } else if path.extension().is_some_and(|e| e == "svg") {
            let relative = path.strip_prefix(root).map_err(|_| {
                Error::Other(format!("{} escapes the input root", path.display()))
            })?;
            let out_dir = match relative.parent() {
                Some(parent) => output_root.join(parent),
                None => output_root.to_path_buf(),
            };
            fs::create_dir_all(&out_dir)?;

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| Error::Other(format!("unusable filename {}", path.display())))?;
            let svg = fs::read_to_string(&path)?;

            fs::write(out_dir.join(format!("{}.png", stem)), to_png(&svg, 512)?)?;
            fs::write(out_dir.join(format!("{}@2x.png", stem)), to_png(&svg, 1024)?)?;
            *converted += 1;
        }
    }
    Ok(())
}

/// Background color declared on the root element's `style` attribute, if any
fn background_color(svg: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(svg).ok()?;
    let style = doc.root_element().attribute("style")?;
    style.split(';').find_map(|decl| {
        let (key, value) = decl.split_once(':')?;
        if key.trim() == "background-color" {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

fn parse_hex_color(value: &str) -> Option<tiny_skia::Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(tiny_skia::Color::from_rgba8(r, g, b, 255))
}
