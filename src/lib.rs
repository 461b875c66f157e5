//! storyspin: turn a markdown story into an impress.js presentation whose
//! steps spiral outward on Fibonacci-sized squares.
//!
//! Pipeline: page → markdown (root element) → HTML → story elements →
//! fitted, annotated step containers → presentation engine.

pub mod capability;
pub mod config;
pub mod dom;
pub mod engine;
pub mod markdown;
pub mod net;
pub mod render;

pub use capability::Environment;
pub use config::{FittingConfig, Options};
pub use engine::pipeline::{storyspin, ImpressPage, Launch, PresentationEngine, Storyspin};
