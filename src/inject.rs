//! Parameter injection into scene scripts
//!
//! Each scene script declares its defaults and then copies them into a
//! `params` binding on a single well-known line. Injection serializes the
//! requested configuration and substitutes it for that line, so the scene
//! renders the caller's parameters instead of its defaults.

use std::path::Path;

use crate::{Error, RenderParams, Result};

/// The assignment line every injectable scene script must contain exactly once
pub const PLACEHOLDER: &str = "const params = { ...default_params };";

/// Replace the placeholder assignment with a serialized parameter literal.
///
/// Fails with a configuration error when the placeholder is missing or
/// appears more than once; a silent no-op here would render the scene's
/// default configuration instead of the requested one.
pub fn inject(script: &str, params: &RenderParams) -> Result<String> {
    let payload = serde_json::to_string(params)
        .map_err(|e| Error::Config(format!("parameters are not serializable: {}", e)))?;
    let line = format!("const params = {};", escape_for_script(&payload));

    match script.matches(PLACEHOLDER).count() {
        1 => Ok(script.replacen(PLACEHOLDER, &line, 1)),
        0 => Err(Error::Config(format!(
            "placeholder `{}` not found in scene script",
            PLACEHOLDER
        ))),
        n => Err(Error::Config(format!(
            "placeholder `{}` found {} times in scene script, expected exactly one",
            PLACEHOLDER, n
        ))),
    }
}

/// Inject parameters into a script file inside a workspace, in place.
pub fn inject_into_file(path: &Path, params: &RenderParams) -> Result<()> {
    let script = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot read scene script {}: {}", path.display(), e))
    })?;
    let injected = inject(&script, params)?;
    std::fs::write(path, injected)?;
    Ok(())
}

/// Escape a JSON payload for embedding in a script source context.
///
/// JSON is almost a JS literal already; the exceptions are `</` sequences
/// (which can close the surrounding script element) and the U+2028/U+2029
/// separators, which are line terminators in source text.
fn escape_for_script(json: &str) -> String {
    json.replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
