//! Per-element watch configuration and registration-time validation.

use web_time::Duration;

use crate::geometry::OffsetSpec;
use crate::WatchId;

/// Configuration snapshot taken when an element is registered.
///
/// Defaults match the common case: document-relative test, scroll listener
/// bound, no resize listener, no rate limiting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchConfig {
    /// Visibility margin before/after the element's natural edges.
    pub offset: OffsetSpec,
    /// Freeze visibility permanently after the first match and drop the
    /// element from the watch set.
    pub once: bool,
    /// Test against the nearest scrollable ancestor instead of the document.
    pub overflow: bool,
    /// Bind a scroll listener for this element.
    pub scroll: bool,
    /// Bind a window resize listener for this element.
    pub resize: bool,
    /// Rate-limit dispatch by fixed interval.
    pub throttle: Option<Duration>,
    /// Rate-limit dispatch by trailing-edge coalescing.
    pub debounce: Option<Duration>,
    /// Revert to the unrendered state when scrolled back out.
    pub unmount_if_invisible: bool,
    /// Explicit scroll source override.
    pub scroll_container: Option<WatchId>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            offset: OffsetSpec::default(),
            once: false,
            overflow: false,
            scroll: true,
            resize: false,
            throttle: None,
            debounce: None,
            unmount_if_invisible: false,
            scroll_container: None,
        }
    }
}

impl WatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: OffsetSpec) -> Self {
        self.offset = offset;
        self
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn overflow(mut self) -> Self {
        self.overflow = true;
        self
    }

    pub fn with_scroll(mut self, scroll: bool) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_resize(mut self, resize: bool) -> Self {
        self.resize = resize;
        self
    }

    pub fn with_throttle(mut self, interval: Duration) -> Self {
        self.throttle = Some(interval);
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce = Some(delay);
        self
    }

    pub fn unmount_if_invisible(mut self) -> Self {
        self.unmount_if_invisible = true;
        self
    }

    pub fn with_scroll_container(mut self, container: WatchId) -> Self {
        self.scroll_container = Some(container);
        self
    }

    /// Validates the snapshot before anything is mutated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.offset.is_finite() {
            return Err(ConfigError::NonFiniteOffset {
                offset: self.offset,
            });
        }
        if let (Some(throttle), Some(debounce)) = (self.throttle, self.debounce) {
            return Err(ConfigError::ConflictingRateLimit { throttle, debounce });
        }
        Ok(())
    }
}

/// Rejected watch configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// Offset contains a NaN or infinite component.
    NonFiniteOffset { offset: OffsetSpec },
    /// Throttle and debounce are mutually exclusive on the shared handler.
    ConflictingRateLimit {
        throttle: Duration,
        debounce: Duration,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonFiniteOffset { offset } => {
                write!(f, "offset must be finite, got {offset:?}")
            }
            ConfigError::ConflictingRateLimit { throttle, debounce } => write!(
                f,
                "throttle ({throttle:?}) and debounce ({debounce:?}) cannot both be set"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
