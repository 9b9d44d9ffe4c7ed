//! Cycle detection and depth limiting for recursive type walks.
//!
//! Every solver walk over the symbol graph (relation checks, inference,
//! instantiation, display) can revisit a type through self-referential
//! members. `RecursionGuard` tracks the keys currently on the stack and
//! bounds both depth and the total number of visits; `RecursionProfile`
//! names the limits each walk uses.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Named limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Assignability, subtype and identity checks.
    Relation,
    /// Structural type-argument inference.
    Inference,
    /// Type-parameter substitution.
    Instantiation,
    /// Anonymous-type display; kept shallow so messages stay readable.
    Display,
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::Relation => 100,
            Self::Inference => 50,
            Self::Instantiation => 50,
            Self::Display => 4,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::Relation => 100_000,
            Self::Inference => 10_000,
            Self::Instantiation => 10_000,
            Self::Display => 1_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

/// Outcome of `RecursionGuard::enter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already on the stack.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to push `key`. Only `Entered` must be paired with `leave`.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(was_present, "RecursionGuard::leave without matching enter");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` with `key` pushed, or report why entry was denied.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce() -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f();
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Sticky: stays set until `reset`.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            debug_assert!(
                self.visiting.is_empty(),
                "RecursionGuard dropped with {} active entries",
                self.visiting.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_is_reported_for_key_on_stack() {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::Relation);
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        assert_eq!(guard.enter(1u32), RecursionResult::Cycle);
        guard.leave(1);
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn depth_limit_is_sticky() {
        let mut guard = RecursionGuard::new(2, 100);
        assert!(guard.enter(1u32).is_entered());
        assert!(guard.enter(2u32).is_entered());
        assert_eq!(guard.enter(3u32), RecursionResult::DepthExceeded);
        guard.leave(2);
        guard.leave(1);
        assert!(guard.is_exceeded());
        guard.reset();
        assert!(!guard.is_exceeded());
    }

    #[test]
    fn scope_leaves_on_return() {
        let mut guard = RecursionGuard::new(4, 100);
        let value = guard.scope(7u32, || 42);
        assert_eq!(value, Ok(42));
        assert!(!guard.is_visiting(&7));
    }
}
