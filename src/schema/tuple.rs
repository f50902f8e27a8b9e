//! Fixed-length tuple validation.
//!
//! A [`TupleValidator`] checks an array position by position. Its items are
//! either a Rust tuple of typed validators (arity 1 to 8), producing a Rust
//! tuple of their outputs, or a `Vec` of type-erased validators producing a
//! `Vec<Value>`.

use std::sync::Arc;

use serde_json::Value;
use stillwater::validation::ValidateAll;
use stillwater::Validation;
use tracing::{debug, trace};

use crate::error::{Issue, Issues};
use crate::path::JsonPath;
use crate::pipeline::{self, Modifiers};
use crate::ParseResult;

use super::traits::{DynValidator, Validator};

/// The positional item validators of a tuple.
///
/// `parse_items` is only called with exactly [`arity`](Self::arity) items.
pub trait TupleItems: Send + Sync {
    /// The output produced when every position passes.
    type Output: Clone + Send + Sync + 'static;

    /// Returns the number of positions.
    fn arity(&self) -> usize;

    /// Parses each position, failing with the flat list of position issues.
    fn parse_items(&self, items: &[Value], path: &JsonPath) -> ParseResult<Self::Output>;

    /// Converts an output back into one value per position.
    fn items_to_values(&self, output: Self::Output) -> Vec<Value>;
}

macro_rules! impl_tuple_items {
    ($len:expr; $($idx:tt => $V:ident),+) => {
        impl<$($V: Validator),+> TupleItems for ($($V,)+) {
            type Output = ($($V::Output,)+);

            fn arity(&self) -> usize {
                $len
            }

            fn parse_items(&self, items: &[Value], path: &JsonPath) -> ParseResult<Self::Output> {
                ($(self.$idx.parse_present(&items[$idx], &path.push_index($idx)),)+).validate_all()
            }

            fn items_to_values(&self, output: Self::Output) -> Vec<Value> {
                vec![$(self.$idx.output_to_value(output.$idx)),+]
            }
        }
    };
}

impl_tuple_items!(1; 0 => A);
impl_tuple_items!(2; 0 => A, 1 => B);
impl_tuple_items!(3; 0 => A, 1 => B, 2 => C);
impl_tuple_items!(4; 0 => A, 1 => B, 2 => C, 3 => D);
impl_tuple_items!(5; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_tuple_items!(6; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_tuple_items!(7; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_tuple_items!(8; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);

impl TupleItems for Vec<Arc<dyn DynValidator>> {
    type Output = Vec<Value>;

    fn arity(&self) -> usize {
        self.len()
    }

    fn parse_items(&self, items: &[Value], path: &JsonPath) -> ParseResult<Vec<Value>> {
        let mut output = Vec::with_capacity(items.len());
        let mut issues = Vec::new();
        for (index, (validator, item)) in self.iter().zip(items).enumerate() {
            match validator.parse_present_dyn(item, &path.push_index(index)) {
                Validation::Success(v) => output.push(v),
                Validation::Failure(e) => issues.extend(e),
            }
        }
        pipeline::finish(output, issues)
    }

    fn items_to_values(&self, output: Vec<Value>) -> Vec<Value> {
        output
    }
}

/// A validator for fixed-length arrays with one validator per position.
///
/// A length mismatch is reported as a single `tuple_length` issue and no
/// position is parsed. Otherwise every position is parsed and all failures
/// are collected into one `aggregate` issue.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use serde_json::json;
///
/// let point = Schema::tuple((Schema::string(), Schema::number()));
///
/// let (label, x) = point.parse_value(&json!(["origin", 0])).into_result().unwrap().unwrap();
/// assert_eq!(label, "origin");
/// assert_eq!(x, 0.0);
///
/// let issues = point.parse_value(&json!(["a", 1, 2])).into_result().unwrap_err();
/// assert_eq!(issues.first().code, "tuple_length");
/// ```
#[derive(Clone)]
pub struct TupleValidator<I: TupleItems> {
    items: I,
    modifiers: Modifiers<I::Output>,
}

impl<I: TupleItems> TupleValidator<I> {
    /// Creates a tuple validator from its positional items.
    pub fn new(items: I) -> Self {
        Self {
            items,
            modifiers: Modifiers::new(),
        }
    }

    /// Returns the number of positions.
    pub fn arity(&self) -> usize {
        self.items.arity()
    }
}

impl<I: TupleItems> Validator for TupleValidator<I> {
    type Output = I::Output;

    fn modifiers(&self) -> &Modifiers<Self::Output> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<Self::Output> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Self::Output> {
        let arr = match value.as_array() {
            Some(a) => a,
            None => {
                return Validation::Failure(Issues::single(Issue::type_mismatch(
                    path.clone(),
                    "array",
                    value,
                )))
            }
        };

        let arity = self.items.arity();
        if arr.len() != arity {
            return Validation::Failure(Issues::single(
                Issue::refinement(
                    path.clone(),
                    "tuple_length",
                    format!(
                        "Expected tuple of length {}, but received {}",
                        arity,
                        arr.len()
                    ),
                    value.clone(),
                )
                .with_expected(format!("{} items", arity)),
            ));
        }

        trace!(path = %path, arity, "validating tuple");

        match self.items.parse_items(arr, path) {
            Validation::Success(output) => Validation::Success(output),
            Validation::Failure(sub) => {
                debug!(path = %path, issues = sub.len(), "tuple validation failed");
                Validation::Failure(Issues::single(Issue::aggregate(
                    path.clone(),
                    format!("Tuple validation failed with {} issue(s)", sub.len()),
                    value.clone(),
                    sub,
                )))
            }
        }
    }

    fn output_to_value(&self, output: Self::Output) -> Value {
        Value::Array(self.items.items_to_values(output))
    }
}
