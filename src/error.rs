//! Error types for partial-response assembly.
//!
//! Configuration errors are raised at the call site and never retried.
//! Stale references (a queued node removed from the tree) are not errors at
//! all: they are dropped and logged by the coordinator.

use thiserror::Error;

use crate::ajax::Phase;

/// Boxed collaborator failure, as returned by tree render hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while collecting, rendering or serializing an update.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("component `{component}` is the page root and cannot be updated via ajax")]
    RootNode { component: String },

    #[error("component `{component}` must output a stable markup id in order to be updated via ajax")]
    NoStableId { component: String },

    #[error("component `{component}` renders body only and cannot be updated via ajax")]
    BodyOnly { component: String },

    #[error(
        "component `{component}` is a repeater and cannot be repainted via ajax directly; \
         add its parent or another container higher in the hierarchy instead"
    )]
    NotAnchorable { component: String },

    #[error("component `{component}` does not belong to a page")]
    NotAttached { component: String },

    #[error(
        "`{method}` can only be called while header contributions are rendered; \
         only dom-ready and on-load scripts may be queued outside of it"
    )]
    HeaderOutsideRender { method: &'static str },

    #[error("operation requires the {expected} phase, but the response is {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("failed to render component `{component}`")]
    Render {
        component: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to serialize the update envelope")]
    Serialize(#[from] serde_json::Error),
}

impl UpdateError {
    /// Wrap a collaborator failure for `component`.
    pub fn render(component: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Render {
            component: component.into(),
            source: source.into(),
        }
    }

    /// Whether this is a configuration error (misuse at the call site).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::RootNode { .. }
                | Self::NoStableId { .. }
                | Self::BodyOnly { .. }
                | Self::NotAnchorable { .. }
                | Self::NotAttached { .. }
                | Self::HeaderOutsideRender { .. }
                | Self::WrongPhase { .. }
        )
    }
}

pub type Result<T, E = UpdateError> = std::result::Result<T, E>;
