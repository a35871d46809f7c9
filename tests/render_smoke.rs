//! Capture smoke tests against a real browser.
//!
//! These render a minimal self-contained scene (no external fonts or
//! scripts) and exercise the full capture protocol.

use std::fs;
use std::path::Path;

use merchpress::{CaptureConfig, CaptureSession, CaptureTarget, Side, Workspace};

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html>
<head><title>Scene</title></head>
<body>
<div class="tp-dfwv">debug panel</div>
<div id="star">
  <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
    <circle cx="50" cy="50" r="40" fill="#3266A3"/>
  </svg>
</div>
</body>
</html>"##;

fn scene_fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("index.html"), INDEX_HTML).unwrap();
    dir
}

fn small_target(element_id: &str) -> CaptureTarget {
    CaptureTarget {
        side: Side::Front,
        document: "index.html".into(),
        element_id: element_id.to_string(),
        aspect_ratio: 1.0,
        reload_for_layout: true,
        prune_fine_print: false,
    }
}

fn smoke_config() -> CaptureConfig {
    CaptureConfig {
        viewport_width: 400,
        selector_timeout_ms: 10_000,
        ..CaptureConfig::default()
    }
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_capture_produces_raster_and_vector() {
    let scene = scene_fixture();
    let workspace = Workspace::acquire(&scene.path().join("docs")).unwrap();

    let result = CaptureSession::capture(&smoke_config(), &workspace, &small_target("star"))
        .expect("capture failed")
        .expect("element should exist");

    assert_eq!(&result.image[..8], b"\x89PNG\r\n\x1a\n");
    let vector = result.vector.expect("nested svg should be extracted");
    assert!(vector.contains("<circle"));
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_selector_timeout_is_fatal_for_target() {
    let scene = scene_fixture();
    let workspace = Workspace::acquire(&scene.path().join("docs")).unwrap();

    let config = CaptureConfig {
        selector_timeout_ms: 1_500,
        ..smoke_config()
    };
    let res = CaptureSession::capture(&config, &workspace, &small_target("no-such-element"));
    assert!(matches!(
        res,
        Err(merchpress::Error::SelectorTimeout { .. })
    ));
}

#[test]
#[ignore] // Requires Chrome and Inkscape to be installed
fn test_full_pipeline_light_and_dark_names() {
    use merchpress::RenderPipeline;

    // A scene whose scripts follow the placeholder contract and draw into
    // the capture targets without external dependencies.
    let script = r#"const default_params = { name: "fixture", dark: false, tagline: true };
const params = { ...default_params };
const host = document.currentScript.dataset.host;
document.getElementById(host).innerHTML =
  '<svg xmlns="http://www.w3.org/2000/svg" width="80" height="80">' +
  '<rect width="80" height="80" fill="' + (params.dark ? '#f1e7da' : '#000000') + '"/></svg>';
"#;

    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(
        docs.join("index.html"),
        "<html><body><div id=\"star\"></div><script src=\"script.js\" data-host=\"star\"></script></body></html>",
    )
    .unwrap();
    fs::write(
        docs.join("back.html"),
        "<html><body><div id=\"back\"></div><script src=\"back.js\" data-host=\"back\"></script></body></html>",
    )
    .unwrap();
    fs::write(docs.join("script.js"), script).unwrap();
    fs::write(docs.join("back.js"), script).unwrap();

    let params = dir.path().join("acme.json");
    fs::write(&params, r#"{"name": "acme"}"#).unwrap();

    let renders = dir.path().join("renders");
    let pipeline = RenderPipeline::new(&docs, &renders, smoke_config());
    let summary = pipeline.run(&[params]).unwrap();
    assert_eq!(summary.rendered, 2);

    for name in [
        "acme_front.png",
        "acme_back.png",
        "acme_front.svg",
        "acme_back.svg",
        "acme_front_dark.png",
        "acme_back_dark.png",
        "acme_front_dark.svg",
        "acme_back_dark.svg",
    ] {
        assert!(renders.join(name).is_file(), "missing {}", name);
    }
    // no fine-print layers in the fixture, so no zipper variant
    assert!(!renders.join(Path::new("acme_front_zipper.svg")).exists());
}
