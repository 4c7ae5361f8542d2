//! Route history.

use std::fmt;

use crate::models::NoteId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Launch screen shown while the session gate decides where to go
    Index,
    Login,
    Register,
    Notes,
    NoteDetail { id: NoteId },
}

impl Route {
    /// Routes that require a signed-in session.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::Notes | Self::NoteDetail { .. })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("/"),
            Self::Login => f.write_str("/login"),
            Self::Register => f.write_str("/register"),
            Self::Notes => f.write_str("/notes"),
            Self::NoteDetail { id } => write!(f, "/note/{id}"),
        }
    }
}

/// A stack of routes. `reset` replaces the whole history, so nothing behind
/// the new route is reachable with `back`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![Route::Index],
        }
    }

    #[must_use]
    pub fn current(&self) -> &Route {
        // The stack is never empty: `back` keeps the root and `reset` pushes one.
        self.stack.last().unwrap_or(&Route::Index)
    }

    #[must_use]
    pub fn history(&self) -> &[Route] {
        &self.stack
    }

    pub fn push(&mut self, route: Route) {
        tracing::debug!(%route, "navigate push");
        self.stack.push(route);
    }

    pub fn reset(&mut self, route: Route) {
        tracing::debug!(%route, "navigate reset");
        self.stack.clear();
        self.stack.push(route);
    }

    /// Pop the current route. Returns `false` at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        tracing::debug!(route = %self.current(), "navigate back");
        true
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn push_and_back_walk_the_stack() {
        let mut nav = Navigator::new();
        nav.reset(Route::Notes);
        nav.push(Route::NoteDetail { id: "n1".into() });
        assert_eq!(nav.current().to_string(), "/note/n1");

        assert!(nav.back());
        assert_eq!(nav.current(), &Route::Notes);
        assert!(!nav.back());
    }

    #[test]
    fn reset_hides_protected_history() {
        let mut nav = Navigator::new();
        nav.reset(Route::Notes);
        nav.push(Route::NoteDetail { id: "n1".into() });
        nav.reset(Route::Login);

        assert_eq!(nav.history(), &[Route::Login]);
        assert!(!nav.can_go_back());
        assert!(nav.history().iter().all(|route| !route.is_protected()));
    }
}
