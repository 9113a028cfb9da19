//! The fixed set of build lifecycle events.
//!
//! Plugins receive these in build order. The set is immutable for the
//! process lifetime; the `config` event is always fired first.

use serde::{Deserialize, Serialize};

/// Enumeration of all lifecycle events in the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    // ── Build ──
    /// Fired once the configuration file has been loaded and validated.
    /// Always the first event of a build.
    Config,
    /// Fired before the build starts.
    PreBuild,
    /// Fired after the source file collection has been assembled.
    Files,
    /// Fired after the site navigation has been built.
    Nav,
    /// Fired after the template environment has been created.
    Env,
    /// Fired after the full build completes.
    PostBuild,

    // ── Template ──
    /// Fired before a non-page template is rendered.
    PreTemplate,
    /// Fired when the context for a non-page template is assembled.
    TemplateContext,
    /// Fired after a non-page template has been rendered.
    PostTemplate,

    // ── Page ──
    /// Fired before a page is processed.
    PrePage,
    /// Fired when a page's source is read from disk.
    PageReadSource,
    /// Fired after a page's markdown is loaded, before conversion.
    PageMarkdown,
    /// Fired after a page's markdown has been converted to HTML.
    PageContent,
    /// Fired when the rendering context for a page is assembled.
    PageContext,
    /// Fired after a page has been fully rendered.
    PostPage,
}

impl LifecycleEvent {
    /// All lifecycle events, in build order.
    pub const ALL: &'static [LifecycleEvent] = &[
        Self::Config,
        Self::PreBuild,
        Self::Files,
        Self::Nav,
        Self::Env,
        Self::PreTemplate,
        Self::TemplateContext,
        Self::PostTemplate,
        Self::PrePage,
        Self::PageReadSource,
        Self::PageMarkdown,
        Self::PageContent,
        Self::PageContext,
        Self::PostPage,
        Self::PostBuild,
    ];

    /// Returns the string name of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::PreBuild => "pre_build",
            Self::Files => "files",
            Self::Nav => "nav",
            Self::Env => "env",
            Self::PostBuild => "post_build",
            Self::PreTemplate => "pre_template",
            Self::TemplateContext => "template_context",
            Self::PostTemplate => "post_template",
            Self::PrePage => "pre_page",
            Self::PageReadSource => "page_read_source",
            Self::PageMarkdown => "page_markdown",
            Self::PageContent => "page_content",
            Self::PageContext => "page_context",
            Self::PostPage => "post_page",
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LifecycleEvent {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|event| event.as_str() == s)
            .copied()
            .ok_or_else(|| {
                crate::error::AppError::validation(format!("unknown lifecycle event '{s}'"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_all_contains_every_event_once() {
        let mut seen = std::collections::HashSet::new();
        for event in LifecycleEvent::ALL {
            assert!(seen.insert(*event), "duplicate event {event}");
        }
        assert_eq!(LifecycleEvent::ALL.len(), 15);
    }

    #[test]
    fn test_config_is_first() {
        assert_eq!(LifecycleEvent::ALL[0], LifecycleEvent::Config);
    }

    #[test]
    fn test_from_str_round_trips() {
        for event in LifecycleEvent::ALL {
            assert_eq!(LifecycleEvent::from_str(event.as_str()).expect("parse"), *event);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(LifecycleEvent::from_str("on_teardown").is_err());
    }

    #[test]
    fn test_serde_uses_snake_case_names() {
        let json = serde_json::to_string(&LifecycleEvent::PageMarkdown).expect("serialize");
        assert_eq!(json, "\"page_markdown\"");
    }
}
