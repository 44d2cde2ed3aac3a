//! Contribution dedup tables.
//!
//! Two independent questions are answered here:
//!
//! - content identity: "has this exact contribution been emitted?"
//!   keyed by a [`ContributionToken`] compared by value;
//! - declaration identity: "has this declared header fragment contributed
//!   in this pass?" keyed by `(scope, fragment id)` regardless of content.
//!
//! A registry lives for one render pass (one page render or one ajax
//! response) and is never shared.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

// =============================================================================
// Contribution Token
// =============================================================================

/// One primitive component of a [`ContributionToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenPart {
    Str(String),
    Int(i64),
    Bool(bool),
    /// An absent optional value (e.g. no `media` on a stylesheet).
    Absent,
}

impl From<&str> for TokenPart {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for TokenPart {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for TokenPart {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for TokenPart {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<TokenPart>> From<Option<T>> for TokenPart {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl fmt::Display for TokenPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Absent => f.write_str("-"),
        }
    }
}

/// Ordered tuple of primitive values used as a value-equality dedup key.
///
/// Two tokens are equal iff all their parts are equal; who built the token
/// does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContributionToken(SmallVec<[TokenPart; 4]>);

impl ContributionToken {
    pub fn new<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<TokenPart>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// `("css", url, media)`
    pub fn css(url: &str, media: Option<&str>) -> Self {
        Self::new([TokenPart::from("css"), url.into(), media.into()])
    }

    /// `("javascript", url)`
    pub fn javascript(url: &str) -> Self {
        Self::new(["javascript", url])
    }

    /// `("javascript-inline", id)` when an id is given, otherwise keyed by code.
    pub fn inline_javascript(code: &str, id: Option<&str>) -> Self {
        Self::new(["javascript-inline", id.unwrap_or(code)])
    }

    /// `("javascript-event", target, event, code)`
    pub fn event(target: &str, event: &str, code: &str) -> Self {
        Self::new(["javascript-event", target, event, code])
    }

    pub fn parts(&self) -> &[TokenPart] {
        &self.0
    }
}

impl From<&str> for ContributionToken {
    fn from(s: &str) -> Self {
        Self::new([s])
    }
}

impl From<String> for ContributionToken {
    fn from(s: String) -> Self {
        Self::new([s])
    }
}

impl fmt::Display for ContributionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str(")")
    }
}

// =============================================================================
// Contribution Registry
// =============================================================================

/// Request-scoped dedup state for header contributions.
///
/// Once closed, writes are silently discarded while reads keep reflecting
/// what was recorded before.
#[derive(Debug, Default)]
pub struct ContributionRegistry {
    rendered: FxHashSet<ContributionToken>,
    scopes: FxHashMap<String, FxHashSet<String>>,
    closed: bool,
}

impl ContributionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a token equal to `token` was marked rendered.
    pub fn was_rendered(&self, token: &ContributionToken) -> bool {
        self.rendered.contains(token)
    }

    /// Record `token` as rendered. No-op once closed.
    pub fn mark_rendered(&mut self, token: ContributionToken) {
        if self.closed {
            crate::debug!("header"; "registry closed, ignoring {}", token);
            return;
        }
        self.rendered.insert(token);
    }

    /// Returns `true` (and records the pair) the first time `(scope, id)` is
    /// seen in this pass, `false` afterwards.
    ///
    /// A closed registry records nothing and answers `false`: nothing can be
    /// emitted anymore.
    pub fn ok_to_render(&mut self, scope: &str, fragment_id: &str) -> bool {
        if self.closed {
            return false;
        }
        let ids = self.scopes.entry(scope.to_string()).or_default();
        ids.insert(fragment_id.to_string())
    }

    /// Whether `(scope, id)` has already contributed in this pass.
    pub fn was_declared(&self, scope: &str, fragment_id: &str) -> bool {
        self.scopes
            .get(scope)
            .is_some_and(|ids| ids.contains(fragment_id))
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of distinct content tokens recorded.
    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}
