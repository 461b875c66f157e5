//! Story options.
//!
//! Keys mirror the options object accepted by the page script
//! (`rootId`, `squareSideLen`, `squareFittingLens`, `stepFont`), so an
//! existing options blob can be loaded unchanged with [`Options::from_json`].

use serde::{Deserialize, Serialize};

pub const DEFAULT_ROOT_ID: &str = "storyspin";
pub const DEFAULT_SIDE_LEN: f64 = 600.0;
pub const DEFAULT_FITTING_LENS: [f64; 6] = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0];
pub const DEFAULT_STEP_FONT: &str = r#"normal 36px "PT Serif", georgia, serif"#;
pub const DEFAULT_IMPRESS_SCRIPT: &str = "js/impress.js";

/// User-facing options; every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Id of the element holding the markdown, and receiving the showcases.
    pub root_id: String,
    /// Reference showcase side length `S`.
    pub square_side_len: f64,
    /// Candidate widths tried from smallest to largest when fitting content.
    pub square_fitting_lens: Vec<f64>,
    pub step_font: String,
    /// Script include emitted for the presentation engine.
    pub impress_script: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            root_id: DEFAULT_ROOT_ID.to_string(),
            square_side_len: DEFAULT_SIDE_LEN,
            square_fitting_lens: DEFAULT_FITTING_LENS.to_vec(),
            step_font: DEFAULT_STEP_FONT.to_string(),
            impress_script: DEFAULT_IMPRESS_SCRIPT.to_string(),
        }
    }
}

impl Options {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Options>(json).map(Options::normalized)
    }

    /// Replace unusable values with their defaults: a side length that is
    /// not a positive finite number, and empty strings.
    pub fn normalized(mut self) -> Self {
        if !(self.square_side_len.is_finite() && self.square_side_len > 0.0) {
            log::warn!(
                "squareSideLen {} is not positive, using {}",
                self.square_side_len,
                DEFAULT_SIDE_LEN
            );
            self.square_side_len = DEFAULT_SIDE_LEN;
        }
        if self.root_id.trim().is_empty() {
            self.root_id = DEFAULT_ROOT_ID.to_string();
        }
        if self.step_font.trim().is_empty() {
            self.step_font = DEFAULT_STEP_FONT.to_string();
        }
        if self.impress_script.trim().is_empty() {
            self.impress_script = DEFAULT_IMPRESS_SCRIPT.to_string();
        }
        self
    }

    pub fn with_root_id(mut self, id: impl Into<String>) -> Self {
        self.root_id = id.into();
        self
    }

    pub fn with_side_len(mut self, side: f64) -> Self {
        self.square_side_len = side;
        self
    }

    pub fn with_fitting_lens(mut self, lens: Vec<f64>) -> Self {
        self.square_fitting_lens = lens;
        self
    }

    pub fn with_step_font(mut self, font: impl Into<String>) -> Self {
        self.step_font = font.into();
        self
    }

    pub fn with_impress_script(mut self, src: impl Into<String>) -> Self {
        self.impress_script = src.into();
        self
    }

    pub fn fitting(&self) -> FittingConfig {
        let opts = self.clone().normalized();
        FittingConfig {
            side_len: opts.square_side_len,
            fitting_lens: opts.square_fitting_lens,
            font: opts.step_font,
        }
    }
}

/// Immutable layout configuration shared by fitting and showcase layout.
///
/// `fitting_lens` is expected to be non-empty and strictly ascending; other
/// inputs still lay out, only with poorer fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct FittingConfig {
    pub side_len: f64,
    pub fitting_lens: Vec<f64>,
    pub font: String,
}

impl Default for FittingConfig {
    fn default() -> Self {
        Options::default().fitting()
    }
}
