//! Deferred construction for recursive schemas.
//!
//! A schema cannot contain itself by value, so a recursive shape names a
//! builder function instead. [`LazyValidator`] calls it on first use and
//! caches the result.
//!
//! Every lazy resolution enters one level of a per-thread traversal counter,
//! restored by a guard when the resolution returns. Once the counter reaches
//! the limit the lazy validator fails instead of descending. This holds for
//! recursion that never extends the path, such as a union whose alternative
//! refers back to the union itself. The limit of an enclosing lazy validator
//! also bounds every lazy validator nested beneath it.

use std::cell::Cell;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use stillwater::Validation;
use tracing::{debug, warn};

use crate::error::{Issue, Issues};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::Validator;

/// Default number of nested lazy resolutions allowed on one thread.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy)]
struct Traversal {
    depth: usize,
    limit: usize,
}

thread_local! {
    static TRAVERSAL: Cell<Traversal> = const {
        Cell::new(Traversal {
            depth: 0,
            limit: usize::MAX,
        })
    };
}

/// Restores the enclosing traversal level when dropped.
struct DepthGuard {
    previous: Traversal,
}

impl DepthGuard {
    /// Enters one more level, or returns the limit that stops it.
    fn enter(max_depth: usize) -> Result<Self, usize> {
        TRAVERSAL.with(|cell| {
            let previous = cell.get();
            let limit = previous.limit.min(max_depth);
            if previous.depth >= limit {
                return Err(limit);
            }
            cell.set(Traversal {
                depth: previous.depth + 1,
                limit,
            });
            Ok(DepthGuard { previous })
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        TRAVERSAL.with(|cell| cell.set(self.previous));
    }
}

/// A validator built on first use.
///
/// # Example
///
/// ```rust
/// use surely::{ObjectValidator, Schema, Validator};
/// use serde_json::json;
///
/// fn category() -> ObjectValidator {
///     Schema::object()
///         .field("name", Schema::string())
///         .field("children", Schema::array(Schema::lazy(category)).optional())
/// }
///
/// let tree = category();
/// assert!(tree.validate(&json!({
///     "name": "root",
///     "children": [{"name": "leaf", "children": []}]
/// })));
/// ```
pub struct LazyValidator<V: Validator, F> {
    build: F,
    target: Arc<OnceLock<V>>,
    max_depth: usize,
    modifiers: Modifiers<V::Output>,
}

impl<V, F> LazyValidator<V, F>
where
    V: Validator,
    F: Fn() -> V + Send + Sync,
{
    /// Creates a lazy validator that calls `build` on first parse.
    pub fn new(build: F) -> Self {
        Self {
            build,
            target: Arc::new(OnceLock::new()),
            max_depth: DEFAULT_MAX_DEPTH,
            modifiers: Modifiers::new(),
        }
    }

    /// Sets the maximum number of nested lazy resolutions, counting this one.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Returns true once the target validator has been built.
    pub fn is_initialized(&self) -> bool {
        self.target.get().is_some()
    }

    fn target(&self) -> &V {
        self.target.get_or_init(|| {
            debug!("building lazy validator target");
            (self.build)()
        })
    }
}

impl<V, F> Clone for LazyValidator<V, F>
where
    V: Validator,
    F: Clone,
{
    fn clone(&self) -> Self {
        Self {
            build: self.build.clone(),
            target: Arc::clone(&self.target),
            max_depth: self.max_depth,
            modifiers: self.modifiers.clone(),
        }
    }
}

impl<V, F> Validator for LazyValidator<V, F>
where
    V: Validator,
    F: Fn() -> V + Send + Sync,
{
    type Output = V::Output;

    fn modifiers(&self) -> &Modifiers<Self::Output> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<Self::Output> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Self::Output> {
        let _guard = match DepthGuard::enter(self.max_depth) {
            Ok(guard) => guard,
            Err(limit) => {
                warn!(path = %path, max_depth = limit, "lazy validator depth exceeded");
                return Validation::Failure(Issues::single(Issue::refinement(
                    path.clone(),
                    "max_depth_exceeded",
                    format!("maximum depth {} exceeded", limit),
                    value.clone(),
                )));
            }
        };
        self.target().parse_present(value, path)
    }

    fn output_to_value(&self, output: Self::Output) -> Value {
        self.target().output_to_value(output)
    }
}
