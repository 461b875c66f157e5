//! Host environment capability check.
//!
//! The layout needs 3D transforms (a resolvable `perspective` property),
//! the `classList` and `dataset` attribute APIs, and a device that is not on
//! the denylist of known-weak 3D implementations.

use crate::dom::css::PrefixResolver;

/// Device-family tokens matched case-insensitively against the user agent.
const DEVICE_DENYLIST: &[&str] = &["iphone", "ipod", "android"];

/// The simulated host the story is laid out for.
#[derive(Debug, Clone)]
pub struct Environment {
    pub user_agent: String,
    pub class_list: bool,
    pub dataset: bool,
    pub styles: PrefixResolver,
}

impl Environment {
    /// Desktop-class host supporting every standard property.
    pub fn headless() -> Self {
        Self {
            user_agent: concat!("Mozilla/5.0 (compatible; storyspin/", env!("CARGO_PKG_VERSION"), ")")
                .to_string(),
            class_list: true,
            dataset: true,
            styles: PrefixResolver::standard(),
        }
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_styles(mut self, styles: PrefixResolver) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_attribute_apis(mut self, class_list: bool, dataset: bool) -> Self {
        self.class_list = class_list;
        self.dataset = dataset;
        self
    }

    /// Whether the full spiral layout can run here.
    pub fn supports_storyspin(&self) -> bool {
        self.styles.resolve("perspective").is_some()
            && self.class_list
            && self.dataset
            && !is_denylisted(&self.user_agent)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::headless()
    }
}

fn is_denylisted(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    DEVICE_DENYLIST.iter().any(|token| ua.contains(token))
}
