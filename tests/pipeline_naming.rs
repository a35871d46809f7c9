//! Orchestrator-level tests that don't need a browser: naming matrix,
//! injection behavior inside a workspace, and workspace freshness.

use std::fs;
use std::path::Path;

use merchpress::pipeline::artifact_stem;
use merchpress::{inject, RenderParams, Side, Workspace};

const SCRIPT: &str = "\
const default_params = { color: 0, name: \"<YOUR NAME>\", tagline: true };
const params = { ...default_params };
codestar();
";

fn scene_fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("index.html"), "<html><div id=\"star\"></div></html>").unwrap();
    fs::write(docs.join("back.html"), "<html><div id=\"back\"></div></html>").unwrap();
    fs::write(docs.join("script.js"), SCRIPT).unwrap();
    fs::write(docs.join("back.js"), SCRIPT).unwrap();
    dir
}

#[test]
fn artifact_names_match_the_published_contract() {
    // light pass
    assert_eq!(artifact_stem("acme", Side::Front, false), "acme_front");
    assert_eq!(artifact_stem("acme", Side::Back, false), "acme_back");
    // dark pass appends the theme suffix before the extension
    assert_eq!(artifact_stem("acme", Side::Front, true), "acme_front_dark");
    assert_eq!(artifact_stem("acme", Side::Back, true), "acme_back_dark");
}

#[test]
fn themed_injection_into_one_workspace() {
    let scene = scene_fixture();
    let workspace = Workspace::acquire(&scene.path().join("docs")).unwrap();

    let mut front = RenderParams::from_json(r#"{"name": "acme"}"#).unwrap();
    front.set_flag("animate", false);
    front.set_flag("dark", false);
    front.set_flag("tagline", true);
    inject::inject_into_file(&workspace.file(Path::new("script.js")), &front).unwrap();

    let mut back = front.clone();
    back.set_flag("tagline", false);
    inject::inject_into_file(&workspace.file(Path::new("back.js")), &back).unwrap();

    let front_script = fs::read_to_string(workspace.file(Path::new("script.js"))).unwrap();
    let back_script = fs::read_to_string(workspace.file(Path::new("back.js"))).unwrap();
    assert!(front_script.contains("\"tagline\":true"));
    assert!(back_script.contains("\"tagline\":false"));

    // the source template still carries the placeholder
    let source = fs::read_to_string(scene.path().join("docs/script.js")).unwrap();
    assert!(source.contains(inject::PLACEHOLDER));
}

#[test]
fn second_pass_gets_a_fresh_workspace() {
    let scene = scene_fixture();
    let docs = scene.path().join("docs");

    let first = Workspace::acquire(&docs).unwrap();
    let params = RenderParams::from_json(r#"{"name": "acme", "dark": false}"#).unwrap();
    inject::inject_into_file(&first.file(Path::new("script.js")), &params).unwrap();
    let first_root = first.root().to_path_buf();
    first.release();

    let second = Workspace::acquire(&docs).unwrap();
    assert_ne!(second.root(), first_root.as_path());
    assert!(!first_root.exists());

    // the fresh copy is uninjected: the placeholder is intact again
    let script = fs::read_to_string(second.file(Path::new("script.js"))).unwrap();
    assert!(script.contains(inject::PLACEHOLDER));
}

#[test]
fn injection_aborts_on_violated_placeholder_contract() {
    let scene = scene_fixture();
    fs::write(scene.path().join("docs/script.js"), "const params = {};\n").unwrap();

    let workspace = Workspace::acquire(&scene.path().join("docs")).unwrap();
    let params = RenderParams::from_json(r#"{"name": "acme"}"#).unwrap();
    let res = inject::inject_into_file(&workspace.file(Path::new("script.js")), &params);
    assert!(matches!(res, Err(merchpress::Error::Config(_))));
}
