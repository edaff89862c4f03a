use crate::{
  expr::{ErasedExpr, Expr},
  scope::ScopedHandle,
};
use std::ops;

/// Mutable variable.
///
/// A [`Var<T>`] is akin to an [`Expr<T>`] that can be mutated with [`Scope::set`](crate::scope::Scope::set). You can
/// go from a [`Var<T>`] to an [`Expr<T>`] via either the [`From`] or [`Var::to_expr`] method.
///
/// Local variables, varyings, fragment outputs and the writable built-ins of the stage environments (such as
/// [`VertexShaderEnv::position`](crate::builtin::VertexShaderEnv::position)) are all variables.
#[derive(Debug)]
pub struct Var<T>(pub Expr<T>)
where
  T: ?Sized;

impl<T> Clone for Var<T>
where
  T: ?Sized,
{
  fn clone(&self) -> Self {
    Var(self.0.clone())
  }
}

impl<'a, T> From<&'a Var<T>> for Var<T>
where
  T: ?Sized,
{
  fn from(v: &'a Self) -> Self {
    Var(v.0.clone())
  }
}

impl<T> From<Var<T>> for Expr<T>
where
  T: ?Sized,
{
  fn from(v: Var<T>) -> Self {
    v.0
  }
}

impl<'a, T> From<&'a Var<T>> for Expr<T>
where
  T: ?Sized,
{
  fn from(v: &'a Var<T>) -> Self {
    v.0.clone()
  }
}

impl<T> Var<T>
where
  T: ?Sized,
{
  /// Create a new [`Var<T>`] from a [`ScopedHandle`].
  pub(crate) const fn new(handle: ScopedHandle) -> Self {
    Self(Expr::new(ErasedExpr::Var(handle)))
  }

  /// Coerce [`Var<T>`] into [`Expr<T>`].
  ///
  /// > Note: use this function only when necessary. Lots of functions will accept both [`Expr<T>`] and [`Var<T>`],
  /// > performing the coercion for you automatically.
  pub fn to_expr(&self) -> Expr<T> {
    self.0.clone()
  }
}

impl<T, const N: usize> Var<[T; N]> {
  /// Array element, as a variable so that it can be mutated.
  pub fn at(&self, index: impl Into<Expr<i32>>) -> Var<T> {
    Var(self.to_expr().at(index))
  }
}

impl<T> ops::Deref for Var<T>
where
  T: ?Sized,
{
  type Target = Expr<T>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}
