//! Deterministic temporary-name generation.
//!
//! Each netlist-producing stage owns one [`NameGen`] with its own namespace
//! prefix, so the elaborator and bit-blaster allocate from disjoint name
//! spaces and cannot collide.

/// A monotonic generator of fresh signal names.
///
/// Produced names have the shape `<namespace>_<class>_<n>`, e.g. `e_mux_0`
/// for the first mux temporary allocated during elaboration.
#[derive(Debug)]
pub struct NameGen {
    namespace: &'static str,
    next: u32,
}

impl NameGen {
    /// Creates a generator for the given stage namespace.
    pub fn new(namespace: &'static str) -> Self {
        Self { namespace, next: 0 }
    }

    /// Returns a fresh name for a temporary of the given class.
    pub fn fresh(&mut self, class: &str) -> String {
        let name = format!("{}_{}_{}", self.namespace, class, self.next);
        self.next += 1;
        name
    }
}
