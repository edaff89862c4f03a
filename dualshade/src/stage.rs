//! Shader stages and entry points.

use crate::{
  analysis::Analysis,
  builtin::{FragmentShaderEnv, VertexShaderEnv},
  error::Error,
  scope::{ErasedScope, Scope, StageReturn},
};
use std::{fmt, sync::OnceLock};

/// Shader stage of an entry point.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShaderStage {
  Vertex,
  Fragment,
}

impl fmt::Display for ShaderStage {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      ShaderStage::Vertex => f.write_str("vertex"),
      ShaderStage::Fragment => f.write_str("fragment"),
    }
  }
}

/// Values entry point bodies can return: either nothing, or a [`Result`] to bail out of recording early.
pub trait BodyResult {
  fn into_result(self) -> Result<(), Error>;
}

impl BodyResult for () {
  fn into_result(self) -> Result<(), Error> {
    Ok(())
  }
}

impl BodyResult for Result<(), Error> {
  fn into_result(self) -> Result<(), Error> {
    self
  }
}

type VertexBody =
  Box<dyn Fn(&mut Scope<StageReturn>, &VertexShaderEnv) -> Result<(), Error> + Send + Sync>;
type FragmentBody =
  Box<dyn Fn(&mut Scope<StageReturn>, &FragmentShaderEnv) -> Result<(), Error> + Send + Sync>;

pub(crate) enum Body {
  Vertex(VertexBody),
  Fragment(FragmentBody),
}

impl fmt::Debug for Body {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Body::Vertex(_) => f.write_str("Body::Vertex"),
      Body::Fragment(_) => f.write_str("Body::Fragment"),
    }
  }
}

impl Body {
  pub(crate) fn vertex<F, B>(body: F) -> Self
  where
    F: Fn(&mut Scope<StageReturn>, &VertexShaderEnv) -> B + Send + Sync + 'static,
    B: BodyResult,
  {
    Body::Vertex(Box::new(move |s, env| body(s, env).into_result()))
  }

  pub(crate) fn fragment<F, B>(body: F) -> Self
  where
    F: Fn(&mut Scope<StageReturn>, &FragmentShaderEnv) -> B + Send + Sync + 'static,
    B: BodyResult,
  {
    Body::Fragment(Box::new(move |s, env| body(s, env).into_result()))
  }
}

/// A vertex or fragment entry point.
///
/// The body is recorded the first time it is needed, and only once; the recorded statements are then shared by every
/// emission, whatever the target language and options.
#[derive(Debug)]
pub struct EntryPoint {
  name: String,
  body: Body,
  recorded: OnceLock<Result<ErasedScope, Error>>,
  analysis: OnceLock<Result<Analysis, Error>>,
}

impl EntryPoint {
  pub(crate) fn new(name: &str, body: Body) -> Self {
    EntryPoint {
      name: name.to_owned(),
      body,
      recorded: OnceLock::new(),
      analysis: OnceLock::new(),
    }
  }

  /// Name of the entry point.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Stage of the entry point.
  pub fn stage(&self) -> ShaderStage {
    match self.body {
      Body::Vertex(_) => ShaderStage::Vertex,
      Body::Fragment(_) => ShaderStage::Fragment,
    }
  }

  /// Recorded body.
  pub(crate) fn scope(&self) -> Result<&ErasedScope, Error> {
    self
      .recorded
      .get_or_init(|| self.record())
      .as_ref()
      .map_err(Clone::clone)
  }

  /// Memoized analysis; `analyze` runs at most once.
  pub(crate) fn analysis(
    &self,
    analyze: impl FnOnce(&ErasedScope) -> Result<Analysis, Error>,
  ) -> Result<&Analysis, Error> {
    self
      .analysis
      .get_or_init(|| self.scope().and_then(analyze))
      .as_ref()
      .map_err(Clone::clone)
  }

  fn record(&self) -> Result<ErasedScope, Error> {
    log::debug!("recording {} entry point {}", self.stage(), self.name);

    let mut scope = Scope::new(0);
    match &self.body {
      Body::Vertex(body) => body(&mut scope, &VertexShaderEnv::new())?,
      Body::Fragment(body) => body(&mut scope, &FragmentShaderEnv::new())?,
    }

    log::trace!(
      "{} entry point {} recorded {} top-level statements",
      self.stage(),
      self.name,
      scope.erased.instructions().len()
    );

    Ok(scope.erased)
  }
}
