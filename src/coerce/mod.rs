//! # Value Coercer
//!
//! Converts raw request values (strings from query strings and form bodies, or
//! already-typed JSON) into the type a parameter was declared with.
//!
//! ## Overview
//!
//! - [`TypeDescriptor`] names the declared target type: a [`Primitive`], `Hash`,
//!   `Array[T]`, `Set[T]`, one of the special JSON/file types, a custom
//!   [`Parseable`] type, or a list of alternatives.
//! - [`Coercer`] is the compiled strategy for one descriptor.
//! - [`CoercerCache`] memoizes coercers by [`TypeDescriptor::signature`].
//!
//! Coercion never panics and never raises: failures come back as
//! [`InvalidValue`], which the validation layer turns into an "is invalid" error.
//!
//! ## Example
//!
//! ```rust
//! use paramgate::coerce::{build_coercer, TypeDescriptor};
//! use serde_json::json;
//!
//! let coercer = build_coercer(&TypeDescriptor::array_of(TypeDescriptor::integer()));
//! assert_eq!(coercer.call(&json!(["1", "2"])).ok(), Some(json!([1, 2])));
//! assert!(coercer.call(&json!(["x"])).is_err());
//! ```

mod cache;
mod coercer;
mod primitive;
#[cfg(test)]
mod tests;
mod types;

pub use cache::{build_coercer, CoercerCache};
pub use coercer::Coercer;
pub use types::{CustomType, InvalidValue, Parseable, Primitive, TypeDescriptor};
