//! Capture sessions over headless Chrome
//!
//! One session owns one browser process: launch, navigate, synchronize,
//! extract, close. Processes are never pooled or reused; the isolation
//! guarantee is that no rendering state can leak between captures.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{info, warn};

use crate::workspace::Workspace;
use crate::{CaptureConfig, CaptureTarget, Error, Result};

/// Script run after load to strip non-content chrome before the screenshot:
/// the scene's tweakpane control panel is hidden and the page background is
/// forced transparent.
const CLEANUP_SCRIPT: &str = r#"(function() {
    const elements = document.querySelectorAll('.tp-dfwv');
    elements.forEach(element => element.style.display = 'none');
    document.body.style.background = 'transparent';
})()"#;

/// Output of one capture session invocation
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// PNG bytes of the target element's bounding region, transparent background
    pub image: Vec<u8>,
    /// Serialized markup of a nested `<svg>` inside the target, if one exists.
    /// Always taken from the same rendered state as `image`.
    pub vector: Option<String>,
}

/// One headless-browser lifecycle, exclusively owned by one capture call
pub struct CaptureSession {
    browser: Browser,
    tab: Arc<Tab>,
    config: CaptureConfig,
}

impl CaptureSession {
    /// Launch a fresh browser process sized for `target` and run the capture
    /// protocol against `workspace`.
    ///
    /// Returns `Ok(None)` when the target element is absent from an otherwise
    /// healthy session (logged, artifact simply not produced). The browser is
    /// closed unconditionally, whether or not the protocol succeeded.
    pub fn capture(
        config: &CaptureConfig,
        workspace: &Workspace,
        target: &CaptureTarget,
    ) -> Result<Option<CaptureResult>> {
        let session = Self::launch(config, target)?;
        let result = session.run(workspace, target);
        session.close();
        result
    }

    fn launch(config: &CaptureConfig, target: &CaptureTarget) -> Result<Self> {
        let width = config.viewport_width;
        let height = (config.viewport_width as f64 * target.aspect_ratio) as u32;

        // The scene is loaded from a file:// path, so its module imports and
        // font fetches require web security to be off.
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((width, height)))
            .args(vec![OsStr::new("--disable-web-security")])
            .path(config.browser_path.clone())
            .build()
            .map_err(|e| Error::Launch(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Launch(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Launch(format!("Failed to create tab: {}", e)))?;

        Ok(Self {
            browser,
            tab,
            config: config.clone(),
        })
    }

    fn run(&self, workspace: &Workspace, target: &CaptureTarget) -> Result<Option<CaptureResult>> {
        let document = workspace.file(&target.document);
        let url = format!("file://{}", document.display());
        let selector = format!("#{}", target.element_id);

        self.tab
            .navigate_to(&url)
            .map_err(|e| Error::Load(format!("Navigation to {} failed: {}", url, e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::Load(format!("Load of {} did not settle: {}", url, e)))?;

        self.wait_for_target(&selector, target)?;

        // A deliberate second synchronization step, not a retry: the logo
        // text field is sometimes misaligned on the first paint, so the
        // affected target reloads and waits again before extraction.
        if target.reload_for_layout {
            self.tab
                .reload(false, None)
                .map_err(|e| Error::Load(format!("Reload of {} failed: {}", url, e)))?;
            self.tab
                .wait_until_navigated()
                .map_err(|e| Error::Load(format!("Reload of {} did not settle: {}", url, e)))?;
            self.wait_for_target(&selector, target)?;
        }

        self.tab
            .evaluate(CLEANUP_SCRIPT, false)
            .map_err(|e| Error::Capture(format!("Scene cleanup failed: {}", e)))?;

        // True alpha in the screenshot rather than a matte color
        self.tab
            .call_method(
                headless_chrome::protocol::cdp::Emulation::SetDefaultBackgroundColorOverride {
                    color: Some(headless_chrome::protocol::cdp::DOM::RGBA {
                        r: 0,
                        g: 0,
                        b: 0,
                        a: Some(0.0),
                    }),
                },
            )
            .map_err(|e| Error::Capture(format!("Background override failed: {}", e)))?;

        let element = match self.tab.find_element(&selector) {
            Ok(element) => element,
            Err(e) => {
                warn!(
                    "Element {} not found in {}: {}; skipping target",
                    selector,
                    target.document.display(),
                    e
                );
                return Ok(None);
            }
        };

        let mut clip = element
            .get_box_model()
            .map_err(|e| Error::Capture(format!("No box model for {}: {}", selector, e)))?
            .content_viewport();
        clip.scale = self.config.device_scale_factor;

        let image = self
            .tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                Some(clip),
                true,
            )
            .map_err(|e| Error::Capture(format!("Screenshot of {} failed: {}", selector, e)))?;

        let vector = self.extract_vector(target)?;
        info!(
            "Captured {} from {} ({} bytes, vector: {})",
            selector,
            target.document.display(),
            image.len(),
            vector.is_some()
        );

        Ok(Some(CaptureResult { image, vector }))
    }

    /// Bounded wait for the target element to exist in the rendered document.
    /// Timing out means the template and the target disagree, which is fatal
    /// for this capture.
    fn wait_for_target(&self, selector: &str, target: &CaptureTarget) -> Result<()> {
        let timeout = Duration::from_millis(self.config.selector_timeout_ms);
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|_| Error::SelectorTimeout {
                document: target.document.display().to_string(),
                element_id: target.element_id.clone(),
                timeout_ms: self.config.selector_timeout_ms,
            })?;
        Ok(())
    }

    /// Serialize the first `<svg>` nested inside the target, if any.
    fn extract_vector(&self, target: &CaptureTarget) -> Result<Option<String>> {
        let script = format!(
            r#"(function() {{
    const svg = document.querySelector('#{} svg');
    return svg ? svg.outerHTML : null;
}})()"#,
            target.element_id
        );

        let eval = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| Error::Capture(format!("Vector extraction failed: {}", e)))?;

        match eval.value {
            Some(serde_json::Value::String(markup)) => Ok(Some(markup)),
            _ => Ok(None),
        }
    }

    /// Drop the tab and browser explicitly so the child process terminates
    /// promptly. Runs on success and failure alike.
    fn close(self) {
        drop(self.tab);
        drop(self.browser);
    }
}
