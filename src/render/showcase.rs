//! Showcase layout: square "steps" on a Fibonacci square spiral.
//!
//! Side lengths follow `S, S, 2S, 3S, 5S, ...`. Showcase 1 sits on top of
//! showcase 0; from showcase 2 on, each one is placed beside the previous
//! one, turning a quarter clockwise every step (up, right, down, left).
//!
//! Coordinates are in presentation space: `x` grows right, `y` grows down.
//! Each square is tracked by its left-bottom anchor and its center.

use serde::Serialize;

use crate::config::FittingConfig;
use crate::dom::css::{apply_css, js_number, px, PrefixResolver};
use crate::dom::DomNode;
use crate::render::fit::{fit_element, FitOutcome};
use crate::render::layout::LayoutHost;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Growth direction of one spiral step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Right,
    Down,
    Left,
}

impl Step {
    fn from_turn(turn: usize) -> Self {
        match turn % 4 {
            0 => Step::Up,
            1 => Step::Right,
            2 => Step::Down,
            _ => Step::Left,
        }
    }

    fn orientation(self) -> i32 {
        match self {
            Step::Up => 0,
            Step::Right => -90,
            Step::Down => -180,
            Step::Left => -270,
        }
    }

    /// Anchor and center of a square of side `len`, placed after the square
    /// at `prev_anchor` of side `prev_len`.
    fn place(self, prev_anchor: Point, prev_len: f64, len: f64) -> (Point, Point) {
        let d = prev_len + len;
        let h = len / 2.0;
        match self {
            Step::Up => {
                let lb = Point::new(prev_anchor.x, prev_anchor.y + d);
                (lb, Point::new(lb.x + h, lb.y - h))
            }
            Step::Right => {
                let lb = Point::new(prev_anchor.x + d, prev_anchor.y);
                (lb, Point::new(lb.x - h, lb.y - h))
            }
            Step::Down => {
                let lb = Point::new(prev_anchor.x, prev_anchor.y - d);
                (lb, Point::new(lb.x - h, lb.y + h))
            }
            Step::Left => {
                let lb = Point::new(prev_anchor.x - d, prev_anchor.y);
                (lb, Point::new(lb.x + h, lb.y + h))
            }
        }
    }
}

/// Position, rotation and scale of one showcase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcaseGeometry {
    pub index: usize,
    pub side_len: f64,
    /// Degrees, one of 0, -90, -180, -270.
    pub orientation: i32,
    /// Left-bottom corner of the square.
    pub anchor: Point,
    pub center: Point,
    /// `side_len` of showcase 0 divided by this showcase's `side_len`.
    pub scale: f64,
}

/// Compute the spiral geometry of `n` showcases with reference side `side`.
pub fn spiral_geometry(n: usize, side: f64) -> Vec<ShowcaseGeometry> {
    let mut out: Vec<ShowcaseGeometry> = Vec::with_capacity(n);
    let origin_anchor = Point::new(-side / 2.0, side / 2.0);

    for i in 0..n {
        let geometry = if i < 2 {
            // Showcase 1 is not advanced: it coincides with showcase 0.
            ShowcaseGeometry {
                index: i,
                side_len: side,
                orientation: 0,
                anchor: origin_anchor,
                center: Point::new(0.0, 0.0),
                scale: 1.0,
            }
        } else {
            let prev = &out[i - 1];
            let len = prev.side_len + out[i - 2].side_len;
            let step = Step::from_turn(i - 1);
            let (anchor, center) = step.place(prev.anchor, prev.side_len, len);
            ShowcaseGeometry {
                index: i,
                side_len: len,
                orientation: step.orientation(),
                anchor,
                center,
                scale: side / len,
            }
        };

        log::debug!(
            "showcase {}: side {} rotate {} anchor ({}, {}) center ({}, {})",
            i,
            geometry.side_len,
            geometry.orientation,
            geometry.anchor.x,
            geometry.anchor.y,
            geometry.center.x,
            geometry.center.y
        );
        out.push(geometry);
    }

    out
}

/// One story element wrapped in its annotated step container.
#[derive(Debug, Clone)]
pub struct Showcase {
    pub geometry: ShowcaseGeometry,
    pub fit: FitOutcome,
    container: DomNode,
}

impl Showcase {
    pub fn container(&self) -> &DomNode {
        &self.container
    }

    /// The wrapped story element.
    pub fn element(&self) -> Option<&DomNode> {
        self.container.children.first()
    }

    pub fn into_node(self) -> DomNode {
        self.container
    }
}

/// Wrap each element in a positioned step container, in order, fitting each
/// element once it is inside its container.
pub fn layout_showcases(
    elements: Vec<DomNode>,
    config: &FittingConfig,
    resolver: &PrefixResolver,
    host: &mut dyn LayoutHost,
) -> Vec<Showcase> {
    let geometry = spiral_geometry(elements.len(), config.side_len);

    elements
        .into_iter()
        .zip(geometry)
        .map(|(element, geometry)| {
            let mut container = DomNode::element("div", Vec::new(), Vec::new());
            container.add_class("step");
            container.set_data("x", js_number(geometry.center.x));
            container.set_data("y", js_number(geometry.center.y));
            container.set_data("rotate", geometry.orientation.to_string());
            container.set_data("scale", js_number(geometry.scale));
            apply_css(
                &mut container,
                &[
                    ("width", px(config.side_len)),
                    ("height", px(config.side_len)),
                    ("font", config.font.clone()),
                ],
                resolver,
            );

            container.children.push(element);
            let fit = match container.children.last_mut() {
                Some(attached) => fit_element(attached, config, resolver, host),
                None => FitOutcome {
                    width: None,
                    scale: 1.0,
                    fitted: false,
                },
            };

            Showcase {
                geometry,
                fit,
                container,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::TextMeasurer;

    fn heading(tag: &str, text: &str) -> DomNode {
        DomNode::element(tag, Vec::new(), vec![DomNode::text(text)])
    }

    #[test]
    fn empty_input_is_empty_layout() {
        assert!(spiral_geometry(0, 600.0).is_empty());
        let out = layout_showcases(
            Vec::new(),
            &FittingConfig::default(),
            &PrefixResolver::standard(),
            &mut TextMeasurer::default(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn side_lengths_are_fibonacci() {
        for side in [1.0, 600.0, 750.5] {
            let g = spiral_geometry(12, side);
            assert_eq!(g[0].side_len, side);
            assert_eq!(g[1].side_len, side);
            for i in 2..g.len() {
                assert_eq!(g[i].side_len, g[i - 1].side_len + g[i - 2].side_len);
            }
        }
        let lens: Vec<f64> = spiral_geometry(7, 600.0).iter().map(|g| g.side_len).collect();
        assert_eq!(lens, vec![600.0, 600.0, 1200.0, 1800.0, 3000.0, 4800.0, 7800.0]);
    }

    #[test]
    fn orientation_cycles_from_index_one() {
        let rot: Vec<i32> = spiral_geometry(10, 600.0).iter().map(|g| g.orientation).collect();
        assert_eq!(rot, vec![0, 0, -90, -180, -270, 0, -90, -180, -270, 0]);
    }

    #[test]
    fn scale_is_relative_to_first_and_decreasing() {
        let g = spiral_geometry(8, 600.0);
        assert_eq!(g[0].scale, 1.0);
        assert_eq!(g[1].scale, 1.0);
        assert_eq!(g[2].scale, 0.5);
        for i in 0..g.len() {
            assert_eq!(g[i].scale, g[0].side_len / g[i].side_len);
        }
        for i in 2..g.len() {
            assert!(g[i].scale < g[i - 1].scale);
        }
    }

    #[test]
    fn showcase_one_coincides_with_zero() {
        let g = spiral_geometry(2, 600.0);
        assert_eq!(g[1].center, Point::new(0.0, 0.0));
        assert_eq!(g[1].anchor, g[0].anchor);
        assert_eq!(g[1].orientation, 0);
    }

    #[test]
    fn spiral_centers() {
        let centers: Vec<(f64, f64)> = spiral_geometry(6, 600.0)
            .iter()
            .map(|g| (g.center.x, g.center.y))
            .collect();
        assert_eq!(
            centers,
            vec![
                (0.0, 0.0),
                (0.0, 0.0),
                (900.0, -300.0),
                (600.0, -1800.0),
                (-1800.0, -1200.0),
                (-900.0, 2700.0),
            ]
        );
    }

    #[test]
    fn containers_carry_annotations_in_order() {
        let elements = vec![heading("h1", "A"), heading("h2", "B"), heading("h3", "C")];
        let out = layout_showcases(
            elements,
            &FittingConfig::default(),
            &PrefixResolver::standard(),
            &mut TextMeasurer::default(),
        );
        assert_eq!(out.len(), 3);

        let tags: Vec<&str> = out.iter().map(|s| s.element().unwrap().tag.as_str()).collect();
        assert_eq!(tags, vec!["h1", "h2", "h3"]);

        let last = out[2].container();
        assert!(last.has_class("step"));
        assert_eq!(last.data("x"), Some("900"));
        assert_eq!(last.data("y"), Some("-300"));
        assert_eq!(last.data("rotate"), Some("-90"));
        assert_eq!(last.data("scale"), Some("0.5"));
        assert_eq!(last.style("width"), Some("600px"));
        assert_eq!(last.style("height"), Some("600px"));
        assert!(out.iter().all(|s| s.container().children.len() == 1));
        assert!(out.iter().all(|s| s.fit.fitted));
    }
}
