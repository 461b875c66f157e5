//! Content fitting: pick the smallest candidate square that holds an
//! element, then scale the element up so that square fills the showcase.

use crate::config::FittingConfig;
use crate::dom::css::{apply_css, px, scale, PrefixResolver};
use crate::dom::DomNode;
use crate::render::layout::LayoutHost;

/// What the fitting pass decided for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOutcome {
    /// Last width applied to the element (the winner when `fitted`).
    pub width: Option<f64>,
    /// Uniform scale applied; 1 when nothing fit.
    pub scale: f64,
    pub fitted: bool,
}

/// Fit `element` into the smallest candidate square containing its height.
///
/// Candidates are tried in the configured order and the first one whose
/// measured height does not exceed it wins, so more zoom beats a looser fit.
/// When none fits, the element keeps the last width tried at scale 1.
pub fn fit_element(
    element: &mut DomNode,
    config: &FittingConfig,
    resolver: &PrefixResolver,
    host: &mut dyn LayoutHost,
) -> FitOutcome {
    let mut outcome = FitOutcome {
        width: None,
        scale: 1.0,
        fitted: false,
    };

    apply_css(element, &[("display", "block".to_string())], resolver);

    for &len in &config.fitting_lens {
        apply_css(element, &[("width", px(len))], resolver);
        outcome.width = Some(len);

        let height = host.attach_and_measure(element, len, &config.font);
        if height <= len {
            let factor = config.side_len / len;
            apply_css(
                element,
                &[
                    ("transformOrigin", "top left".to_string()),
                    ("transform", scale(factor)),
                ],
                resolver,
            );
            log::debug!(
                "fit <{}>: {}px square (height {}px), scale {}",
                element.tag,
                len,
                height,
                factor
            );
            outcome.scale = factor;
            outcome.fitted = true;
            return outcome;
        }
    }

    log::debug!(
        "fit <{}>: no candidate holds it, left at {:?}px unscaled",
        element.tag,
        outcome.width
    );
    outcome
}
