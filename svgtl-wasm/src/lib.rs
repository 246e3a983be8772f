//! WebAssembly bindings for svgtl

use svgtl_core::{generate, parse_config, Config, DEFAULT_STYLE};
use wasm_bindgen::prelude::*;

/// Render a timeline config to SVG
///
/// # Arguments
/// * `input` - The timeline config text
///
/// # Returns
/// The rendered SVG as a string, or an error message
#[wasm_bindgen]
pub fn render(input: &str) -> Result<String, String> {
    let (timeline, config) = parse_config(input).map_err(|e| e.to_string())?;
    generate(&timeline, &config).map_err(|e| e.to_string())
}

/// Render a timeline config to SVG with a caller-supplied stylesheet
///
/// # Arguments
/// * `input` - The timeline config text
/// * `style` - CSS replacing the embedded default stylesheet
#[wasm_bindgen]
pub fn render_with_style(input: &str, style: &str) -> Result<String, String> {
    let (timeline, mut config) = parse_config(input).map_err(|e| e.to_string())?;
    config.style = style.to_string();
    generate(&timeline, &config).map_err(|e| e.to_string())
}

/// The embedded base stylesheet, for callers building their own themes
#[wasm_bindgen]
pub fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

/// Default generation configuration as a JSON object string
#[wasm_bindgen]
pub fn default_config() -> String {
    let config = Config::default();
    format!(
        r#"{{"width":{},"numTicks":{},"tickHeight":{},"marginTop":{},"marginRight":{},"marginBottom":{},"marginLeft":{}}}"#,
        config.width,
        config.num_ticks,
        config.tick_height,
        config.margin_top,
        config.margin_right,
        config.margin_bottom,
        config.margin_left
    )
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
