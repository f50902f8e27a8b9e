//! Union validation.
//!
//! This module provides [`UnionValidator`], which accepts a value if any of
//! its alternatives does.
//!
//! # Example
//!
//! ```rust
//! use surely::{DynValidator, Schema, Validator};
//! use serde_json::json;
//!
//! // Flexible id: a non-empty string or a positive integer
//! let id = Schema::union(vec![
//!     Box::new(Schema::string().min_len(1)) as Box<dyn DynValidator>,
//!     Box::new(Schema::number().int().positive()),
//! ])
//! .unwrap();
//!
//! assert!(id.validate(&json!("abc")));
//! assert!(id.validate(&json!(42)));
//! assert!(!id.validate(&json!(true)));
//! ```

use std::sync::Arc;

use serde_json::Value;
use stillwater::Validation;
use tracing::{debug, trace};

use crate::error::{Issue, Issues, SchemaDefinitionError};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::{DynValidator, Validator};

/// A validator that tries its alternatives in declaration order.
///
/// The first alternative that succeeds wins and later ones are not run. If
/// every alternative fails, the result is one `aggregate` issue at the
/// union's path whose sub-issues are every alternative's issues, in
/// alternative order.
#[derive(Clone)]
pub struct UnionValidator {
    alternatives: Vec<Arc<dyn DynValidator>>,
    modifiers: Modifiers<Value>,
}

impl UnionValidator {
    /// Creates a union. An empty list of alternatives is rejected.
    pub fn new(alternatives: Vec<Box<dyn DynValidator>>) -> Result<Self, SchemaDefinitionError> {
        Self::from_shared(alternatives.into_iter().map(Arc::from).collect())
    }

    /// Creates a union from shared alternatives.
    pub fn from_shared(
        alternatives: Vec<Arc<dyn DynValidator>>,
    ) -> Result<Self, SchemaDefinitionError> {
        if alternatives.is_empty() {
            return Err(SchemaDefinitionError::EmptyUnion);
        }
        Ok(Self {
            alternatives,
            modifiers: Modifiers::new(),
        })
    }

    /// Adds another alternative after the existing ones.
    pub fn or<V: Validator + 'static>(mut self, alternative: V) -> Self {
        self.alternatives.push(Arc::new(alternative));
        self
    }

    /// Returns the number of alternatives.
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Always false; a union has at least one alternative.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Validator for UnionValidator {
    type Output = Value;

    fn modifiers(&self) -> &Modifiers<Value> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<Value> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Value> {
        let mut issues = Vec::new();

        for (index, alternative) in self.alternatives.iter().enumerate() {
            trace!(path = %path, alternative = index, "trying union alternative");
            match alternative.parse_present_dyn(value, path) {
                Validation::Success(v) => {
                    debug!(path = %path, alternative = index, "union alternative matched");
                    return Validation::Success(v);
                }
                Validation::Failure(e) => issues.extend(e),
            }
        }

        debug!(path = %path, alternatives = self.alternatives.len(), "no union alternative matched");

        let message = format!(
            "Expected input to match one of the {} validators, but it matched none",
            self.alternatives.len()
        );
        let issue = match Issues::from_vec(issues) {
            Some(sub) => Issue::aggregate(path.clone(), message, value.clone(), sub),
            None => Issue::refinement(path.clone(), "invalid_union", message, value.clone()),
        };
        Validation::Failure(Issues::single(issue.with_code("invalid_union")))
    }

    fn output_to_value(&self, output: Value) -> Value {
        output
    }
}
