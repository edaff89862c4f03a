//! Errors raised while declaring programs or emitting shader sources.

use std::fmt;
use thiserror::Error;

/// Errors that can happen while building a [`Program`](crate::program::Program) or emitting one of its entry points.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
  /// A value used by a stage cannot be resolved, for instance a declaration coming from another program.
  #[error("missing value: {0}")]
  MissingValue(String),

  /// Two declarations share the same name in the same namespace.
  #[error("duplicate {kind} definition: {name}")]
  DuplicateDefinition { kind: &'static str, name: String },

  /// No entry point with that name was declared.
  #[error("unresolved entry point: {0}")]
  UnresolvedEntryPoint(String),

  /// An argument does not fit the operation it is given to.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// Two resources were explicitly assigned the same index in the same space.
  #[error("{space} index {index} is claimed by both {first} and {second}")]
  IndexCollision {
    space: String,
    index: u32,
    first: String,
    second: String,
  },

  /// Writing the shader source failed.
  #[error("cannot format shader source")]
  Format(#[from] fmt::Error),
}
