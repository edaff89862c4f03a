//! Externally visible resources: uniforms, vertex attributes, varyings and fragment outputs.
//!
//! Resources are declared on a [`Program`](crate::program::Program), which hands back a typed handle already bound to
//! its name and type. Handles are used in entry point bodies as expressions (uniforms, attributes) or as variables
//! (varyings, fragment outputs).

use crate::{
  expr::{ErasedExpr, Expr},
  scope::ScopedHandle,
  var::Var,
};
use std::ops::Deref;

/// Where a uniform or a sampler is bound.
///
/// The group defaults to `0` and the binding is allocated automatically unless set.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Binding {
  pub group: u32,
  pub binding: Option<u32>,
}

impl Binding {
  /// Automatic binding in group `0`.
  pub const fn auto() -> Self {
    Binding {
      group: 0,
      binding: None,
    }
  }

  /// Explicit binding in group `0`.
  pub const fn index(binding: u32) -> Self {
    Binding {
      group: 0,
      binding: Some(binding),
    }
  }

  /// Move the binding to another group.
  pub const fn in_group(self, group: u32) -> Self {
    Binding { group, ..self }
  }
}

/// Interpolation qualifier of a varying.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Interpolation {
  /// Perspective-correct interpolation.
  Perspective,

  /// Linear interpolation in screen space.
  Linear,

  /// No interpolation; the value of the provoking vertex is used.
  Flat,
}

/// Sampling qualifier of a varying.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Sampling {
  /// Interpolate at the center of the pixel.
  Center,

  /// Interpolate at a point covered by the primitive.
  Centroid,

  /// Interpolate per sample.
  Sample,
}

/// Declaration options of a varying.
///
/// # Examples
///
/// ```
/// use dualshade::resource::{Interpolation, VaryingOptions};
///
/// let opts = VaryingOptions::default().location(2).interpolation(Interpolation::Flat);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct VaryingOptions {
  pub(crate) location: Option<u32>,
  pub(crate) interpolation: Option<Interpolation>,
  pub(crate) sampling: Option<Sampling>,
}

impl VaryingOptions {
  /// Request an explicit location.
  pub fn location(self, location: u32) -> Self {
    VaryingOptions {
      location: Some(location),
      ..self
    }
  }

  /// Set the interpolation qualifier.
  pub fn interpolation(self, interpolation: Interpolation) -> Self {
    VaryingOptions {
      interpolation: Some(interpolation),
      ..self
    }
  }

  /// Set the sampling qualifier.
  pub fn sampling(self, sampling: Sampling) -> Self {
    VaryingOptions {
      sampling: Some(sampling),
      ..self
    }
  }
}

/// Uniform value.
#[derive(Debug)]
pub struct Uniform<T> {
  name: String,
  binding: Binding,
  expr: Expr<T>,
}

impl<T> Clone for Uniform<T> {
  fn clone(&self) -> Self {
    Uniform {
      name: self.name.clone(),
      binding: self.binding,
      expr: self.expr.clone(),
    }
  }
}

impl<T> Uniform<T> {
  pub(crate) fn new(name: &str, binding: Binding) -> Self {
    Uniform {
      name: name.to_owned(),
      binding,
      expr: Expr::new(ErasedExpr::Var(ScopedHandle::Uniform(name.to_owned()))),
    }
  }

  /// Name of the uniform.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Requested binding.
  pub fn binding(&self) -> Binding {
    self.binding
  }

  /// The uniform as an expression.
  pub fn expr(&self) -> Expr<T> {
    self.expr.clone()
  }
}

impl<T> Deref for Uniform<T> {
  type Target = Expr<T>;

  fn deref(&self) -> &Self::Target {
    &self.expr
  }
}

impl<'a, T> From<&'a Uniform<T>> for Expr<T> {
  fn from(u: &'a Uniform<T>) -> Self {
    u.expr.clone()
  }
}

/// Vertex attribute.
#[derive(Debug)]
pub struct Attribute<T> {
  name: String,
  location: Option<u32>,
  expr: Expr<T>,
}

impl<T> Clone for Attribute<T> {
  fn clone(&self) -> Self {
    Attribute {
      name: self.name.clone(),
      location: self.location,
      expr: self.expr.clone(),
    }
  }
}

impl<T> Attribute<T> {
  pub(crate) fn new(name: &str, location: Option<u32>) -> Self {
    Attribute {
      name: name.to_owned(),
      location,
      expr: Expr::new(ErasedExpr::Var(ScopedHandle::Attribute(name.to_owned()))),
    }
  }

  /// Name of the attribute.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Explicitly requested location, if any.
  pub fn location(&self) -> Option<u32> {
    self.location
  }

  /// The attribute as an expression.
  pub fn expr(&self) -> Expr<T> {
    self.expr.clone()
  }
}

impl<T> Deref for Attribute<T> {
  type Target = Expr<T>;

  fn deref(&self) -> &Self::Target {
    &self.expr
  }
}

impl<'a, T> From<&'a Attribute<T>> for Expr<T> {
  fn from(a: &'a Attribute<T>) -> Self {
    a.expr.clone()
  }
}

/// Varying, written by vertex entry points and read by fragment entry points.
#[derive(Debug)]
pub struct Varying<T> {
  name: String,
  options: VaryingOptions,
  var: Var<T>,
}

impl<T> Clone for Varying<T> {
  fn clone(&self) -> Self {
    Varying {
      name: self.name.clone(),
      options: self.options,
      var: self.var.clone(),
    }
  }
}

impl<T> Varying<T> {
  pub(crate) fn new(name: &str, options: VaryingOptions) -> Self {
    Varying {
      name: name.to_owned(),
      options,
      var: Var::new(ScopedHandle::Varying(name.to_owned())),
    }
  }

  /// Name of the varying.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Explicitly requested location, if any.
  pub fn location(&self) -> Option<u32> {
    self.options.location
  }

  /// Interpolation qualifier, if any.
  pub fn interpolation(&self) -> Option<Interpolation> {
    self.options.interpolation
  }

  /// Sampling qualifier, if any.
  pub fn sampling(&self) -> Option<Sampling> {
    self.options.sampling
  }
}

impl<T> Deref for Varying<T> {
  type Target = Var<T>;

  fn deref(&self) -> &Self::Target {
    &self.var
  }
}

impl<'a, T> From<&'a Varying<T>> for Var<T> {
  fn from(v: &'a Varying<T>) -> Self {
    v.var.clone()
  }
}

impl<'a, T> From<&'a Varying<T>> for Expr<T> {
  fn from(v: &'a Varying<T>) -> Self {
    v.var.to_expr()
  }
}

/// Fragment output.
///
/// Declaring outputs switches fragment entry points from the single color output to one output per location.
#[derive(Debug)]
pub struct FragmentOutput<T> {
  name: String,
  location: Option<u32>,
  var: Var<T>,
}

impl<T> Clone for FragmentOutput<T> {
  fn clone(&self) -> Self {
    FragmentOutput {
      name: self.name.clone(),
      location: self.location,
      var: self.var.clone(),
    }
  }
}

impl<T> FragmentOutput<T> {
  pub(crate) fn new(name: &str, location: Option<u32>) -> Self {
    FragmentOutput {
      name: name.to_owned(),
      location,
      var: Var::new(ScopedHandle::Output(name.to_owned())),
    }
  }

  /// Name of the output.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Explicitly requested location, if any.
  pub fn location(&self) -> Option<u32> {
    self.location
  }
}

impl<T> Deref for FragmentOutput<T> {
  type Target = Var<T>;

  fn deref(&self) -> &Self::Target {
    &self.var
  }
}

impl<'a, T> From<&'a FragmentOutput<T>> for Var<T> {
  fn from(o: &'a FragmentOutput<T>) -> Self {
    o.var.clone()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{lit, scope::Scope, types::V2};

  #[test]
  fn binding_builder() {
    assert_eq!(
      Binding::auto(),
      Binding {
        group: 0,
        binding: None
      }
    );
    assert_eq!(
      Binding::index(4).in_group(1),
      Binding {
        group: 1,
        binding: Some(4)
      }
    );
  }

  #[test]
  fn handles_are_bound() {
    let time = Uniform::<f32>::new("time", Binding::auto());
    let pos = Attribute::<V2<f32>>::new("position", Some(3));

    assert_eq!(
      time.erased(),
      &ErasedExpr::Var(ScopedHandle::Uniform("time".to_owned()))
    );
    assert_eq!(pos.location(), Some(3));
    assert_eq!(
      (&*time * 2.).erased,
      ErasedExpr::Mul(
        Box::new(ErasedExpr::Var(ScopedHandle::Uniform("time".to_owned()))),
        Box::new(ErasedExpr::LitFloat(2.)),
      )
    );
  }

  #[test]
  fn varying_is_writable() {
    let uv = Varying::<V2<f32>>::new("uv", VaryingOptions::default().sampling(Sampling::Centroid));
    let mut scope = Scope::<()>::new(0);

    scope.set(&uv, lit!(0., 1.));

    assert_eq!(uv.sampling(), Some(Sampling::Centroid));
    assert_eq!(uv.interpolation(), None);
    assert_eq!(scope.erased.instructions().len(), 1);
  }
}
