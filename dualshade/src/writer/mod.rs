//! Shader writers.
//!
//! Writers turn recorded entry points into source code. Both target languages share the precedence rules, number
//! formatting and indentation defined here; everything else lives in the per-language modules.

use crate::{
  alloc::ResourceLayout,
  analysis::Analysis,
  error::Error,
  expr::ErasedExpr,
  program::Program,
  scope::{ErasedScope, ScopedHandle},
  stage::ShaderStage,
  types::{PrimType, Type},
};
use std::fmt;

pub(crate) mod glsl;
pub(crate) mod wgsl;

const INDENT_SPACES: usize = 2;

/// GLSL dialect to emit.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum GlslVersion {
  /// GLSL ES 1.00, for WebGL 1.
  V1,

  /// GLSL ES 3.00, for WebGL 2.
  #[default]
  V2,
}

/// Default float precision of fragment shaders.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Precision {
  Low,
  Medium,
  High,
}

impl Precision {
  pub(crate) const fn qualifier(self) -> &'static str {
    match self {
      Precision::Low => "lowp",
      Precision::Medium => "mediump",
      Precision::High => "highp",
    }
  }
}

/// GLSL emission options.
///
/// Defaults to GLSL ES 3.00 with high float precision.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlslOptions {
  pub version: GlslVersion,
  pub precision: Option<Precision>,
}

impl Default for GlslOptions {
  fn default() -> Self {
    GlslOptions {
      version: GlslVersion::V2,
      precision: Some(Precision::High),
    }
  }
}

impl GlslOptions {
  /// Set the GLSL version.
  pub fn version(self, version: GlslVersion) -> Self {
    GlslOptions { version, ..self }
  }

  /// Set, or remove with `None`, the default float precision of fragment shaders.
  pub fn precision(self, precision: impl Into<Option<Precision>>) -> Self {
    GlslOptions {
      precision: precision.into(),
      ..self
    }
  }
}

/// WGSL emission options.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WgslOptions {
  /// Remap the clip-space depth of vertex outputs from `[-1; 1]` to `[0; 1]`.
  pub remap_depth: bool,

  /// Name of the entry point of the other stage, to allocate varyings and bindings consistently across both.
  pub peer: Option<String>,
}

impl WgslOptions {
  /// Enable or disable depth remapping.
  pub fn remap_depth(self, remap_depth: bool) -> Self {
    WgslOptions {
      remap_depth,
      ..self
    }
  }

  /// Pair with the entry point of the other stage.
  pub fn peer(self, peer: impl Into<String>) -> Self {
    WgslOptions {
      peer: Some(peer.into()),
      ..self
    }
  }
}

/// An entry point about to be emitted, with everything resolved.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EntryContext<'a> {
  pub(crate) program: &'a Program,
  pub(crate) name: &'a str,
  pub(crate) stage: ShaderStage,
  pub(crate) scope: &'a ErasedScope,
  pub(crate) analysis: &'a Analysis,
  pub(crate) layout: &'a ResourceLayout,
}

impl<'a> EntryContext<'a> {
  /// The output the color built-in and returned values go to: the one at location 0, or the first one used.
  pub(crate) fn primary_output(&self) -> Option<&'a str> {
    let outputs = &self.analysis.outputs;
    let layout = self.layout;

    outputs
      .iter()
      .find(|name| layout.output(name) == Some(0))
      .or_else(|| outputs.first())
      .map(String::as_str)
  }

  /// Used fragment outputs, by location.
  pub(crate) fn outputs_by_location(&self) -> Vec<(&'a str, u32)> {
    let mut outputs: Vec<_> = self
      .analysis
      .outputs
      .iter()
      .map(|name| (name.as_str(), self.layout.output(name).unwrap_or_default()))
      .collect();
    outputs.sort_by_key(|(_, location)| *location);
    outputs
  }

  /// Used varyings, by location.
  pub(crate) fn varyings_by_location(&self) -> Vec<(&'a str, u32)> {
    let mut varyings: Vec<_> = self
      .analysis
      .varyings
      .iter()
      .map(|name| (name.as_str(), self.layout.varying(name).unwrap_or_default()))
      .collect();
    varyings.sort_by_key(|(_, location)| *location);
    varyings
  }
}

/// Everything a writer needs to know about where it is writing.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BuildContext {
  pub(crate) stage: Option<ShaderStage>,
  pub(crate) version: GlslVersion,
  pub(crate) remap_depth: bool,
  pub(crate) helper: bool,
}

impl BuildContext {
  /// Context of expressions rendered on their own, outside of any entry point.
  pub(crate) const fn standalone() -> Self {
    BuildContext {
      stage: None,
      version: GlslVersion::V2,
      remap_depth: false,
      helper: false,
    }
  }

  pub(crate) const fn in_helper(self) -> Self {
    BuildContext {
      helper: true,
      ..self
    }
  }

  /// Whether the context is the body of an entry point (and not a helper or a standalone expression).
  pub(crate) const fn is_entry_body(&self) -> bool {
    self.stage.is_some() && !self.helper
  }
}

/// Precedence class of a rendered expression.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Prec {
  /// Literals, names, calls, constructors, postfix accesses.
  Atomic,
  /// Negations and negative literals.
  Unary,
  /// `*`, `/`, `%`.
  Multiplicative,
  /// `+`, `-`.
  Additive,
  /// Everything else: comparisons, logic, bitwise, shifts.
  Other,
}

/// Binary operators, as far as parenthesization goes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BinOp {
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  Other,
}

/// Whether an operand of `op` must be wrapped in parentheses; `rhs` tells which side it sits on.
pub(crate) fn needs_parens(op: BinOp, rhs: bool, operand: Prec) -> bool {
  if operand == Prec::Atomic {
    return false;
  }

  match op {
    BinOp::Other => operand != Prec::Unary,
    _ if operand == Prec::Other => true,
    BinOp::Add => false,
    BinOp::Sub => rhs && operand == Prec::Additive,
    BinOp::Mul => operand == Prec::Additive,
    BinOp::Div | BinOp::Rem => {
      if rhs {
        true
      } else {
        operand == Prec::Additive
      }
    }
  }
}

/// Precedence class of the nodes both languages render the same way.
///
/// Returns `None` for nodes whose class depends on the language (function calls and variables).
pub(crate) fn common_prec(e: &ErasedExpr) -> Option<Prec> {
  let prec = match e {
    ErasedExpr::LitInt(x) if *x < 0 => Prec::Unary,
    ErasedExpr::LitFloat(x) if *x < 0. => Prec::Unary,

    ErasedExpr::Not(_) | ErasedExpr::Neg(_) => Prec::Unary,

    ErasedExpr::Add(..) | ErasedExpr::Sub(..) => Prec::Additive,
    ErasedExpr::Mul(..) | ErasedExpr::Div(..) | ErasedExpr::Rem(..) => Prec::Multiplicative,

    ErasedExpr::And(..)
    | ErasedExpr::Or(..)
    | ErasedExpr::Xor(..)
    | ErasedExpr::BitOr(..)
    | ErasedExpr::BitAnd(..)
    | ErasedExpr::BitXor(..)
    | ErasedExpr::Shl(..)
    | ErasedExpr::Shr(..)
    | ErasedExpr::Eq(..)
    | ErasedExpr::Neq(..)
    | ErasedExpr::Lt(..)
    | ErasedExpr::Lte(..)
    | ErasedExpr::Gt(..)
    | ErasedExpr::Gte(..) => Prec::Other,

    ErasedExpr::FunCall(..) | ErasedExpr::Var(_) | ErasedExpr::Swizzle(..) => return None,

    _ => Prec::Atomic,
  };

  Some(prec)
}

/// Operator text and parenthesization class of a binary node; `None` for other nodes.
pub(crate) fn binary_op(e: &ErasedExpr) -> Option<(&ErasedExpr, &'static str, BinOp, &ErasedExpr)> {
  let (a, op, class, b) = match e {
    ErasedExpr::And(a, b) => (a, "&&", BinOp::Other, b),
    ErasedExpr::Or(a, b) => (a, "||", BinOp::Other, b),
    ErasedExpr::BitOr(a, b) => (a, "|", BinOp::Other, b),
    ErasedExpr::BitAnd(a, b) => (a, "&", BinOp::Other, b),
    ErasedExpr::BitXor(a, b) => (a, "^", BinOp::Other, b),
    ErasedExpr::Add(a, b) => (a, "+", BinOp::Add, b),
    ErasedExpr::Sub(a, b) => (a, "-", BinOp::Sub, b),
    ErasedExpr::Mul(a, b) => (a, "*", BinOp::Mul, b),
    ErasedExpr::Div(a, b) => (a, "/", BinOp::Div, b),
    ErasedExpr::Rem(a, b) => (a, "%", BinOp::Rem, b),
    ErasedExpr::Shl(a, b) => (a, "<<", BinOp::Other, b),
    ErasedExpr::Shr(a, b) => (a, ">>", BinOp::Other, b),
    ErasedExpr::Eq(a, b) => (a, "==", BinOp::Other, b),
    ErasedExpr::Neq(a, b) => (a, "!=", BinOp::Other, b),
    ErasedExpr::Lt(a, b) => (a, "<", BinOp::Other, b),
    ErasedExpr::Lte(a, b) => (a, "<=", BinOp::Other, b),
    ErasedExpr::Gt(a, b) => (a, ">", BinOp::Other, b),
    ErasedExpr::Gte(a, b) => (a, ">=", BinOp::Other, b),
    _ => return None,
  };

  Some((a, op, class, b))
}

/// Name of handles that render the same way whatever the context.
pub(crate) fn handle_name(handle: &ScopedHandle) -> String {
  match handle {
    ScopedHandle::Global(handle) => format!("glob_{}", handle),
    ScopedHandle::FunArg(handle) => format!("arg_{}", handle),
    ScopedHandle::FunVar { subscope, handle } => format!("var_{}_{}", subscope, handle),

    ScopedHandle::Uniform(name)
    | ScopedHandle::UniformStruct(name)
    | ScopedHandle::Attribute(name)
    | ScopedHandle::Varying(name)
    | ScopedHandle::Output(name)
    | ScopedHandle::Sampler(name) => name.clone(),

    ScopedHandle::BuiltIn(builtin) => format!("{:?}", builtin),
  }
}

/// Integral varyings cannot be interpolated.
pub(crate) fn is_integral(ty: &Type) -> bool {
  matches!(ty.prim_ty, PrimType::Int(_) | PrimType::UInt(_))
}

/// Render a float so that both languages parse it back as a float.
pub(crate) fn float_to_string(x: f32) -> String {
  if x == 0. {
    return "0.0".to_owned();
  }

  let abs = x.abs();
  if !(1e-6..1e15).contains(&abs) {
    format!("{:e}", x)
  } else if x.fract() == 0. {
    format!("{:.1}", x)
  } else {
    format!("{}", x).to_lowercase()
  }
}

pub(crate) fn uint_to_string(x: u32) -> String {
  format!("{}u", x)
}

/// Collapse the components of a vector literal to a single one when they are all the same.
pub(crate) fn splat<T>(components: &[T]) -> &[T]
where
  T: PartialEq,
{
  match components.split_first() {
    Some((first, rest)) if rest.iter().all(|x| x == first) => &components[..1],
    _ => components,
  }
}

pub(crate) fn write_indent(f: &mut impl fmt::Write, indent_lvl: usize) -> Result<(), Error> {
  write!(f, "{:indent$}", "", indent = indent_lvl * INDENT_SPACES)?;
  Ok(())
}

/// Write a block of declarations, followed by an empty line unless there is nothing in it.
pub(crate) fn write_section(
  f: &mut String,
  write: impl FnOnce(&mut String) -> Result<(), Error>,
) -> Result<(), Error> {
  let mut section = String::new();
  write(&mut section)?;

  if !section.is_empty() {
    f.push_str(&section);
    f.push('\n');
  }

  Ok(())
}

/// Write items separated by `, `.
pub(crate) fn write_comma_separated<F, T>(
  f: &mut F,
  items: &[T],
  mut write_item: impl FnMut(&mut F, &T) -> Result<(), Error>,
) -> Result<(), Error>
where
  F: fmt::Write,
{
  if let Some((first, rest)) = items.split_first() {
    write_item(f, first)?;

    for item in rest {
      f.write_str(", ")?;
      write_item(f, item)?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn floats() {
    assert_eq!(float_to_string(0.), "0.0");
    assert_eq!(float_to_string(-0.), "0.0");
    assert_eq!(float_to_string(1.), "1.0");
    assert_eq!(float_to_string(-3.), "-3.0");
    assert_eq!(float_to_string(0.5), "0.5");
    assert_eq!(float_to_string(1e-7), "1e-7");
    assert_eq!(float_to_string(2e20), "2e20");
  }

  #[test]
  fn splats() {
    assert_eq!(splat(&[1., 1., 1.]), &[1.]);
    assert_eq!(splat(&[1., 0., 1.]), &[1., 0., 1.]);
  }

  #[test]
  fn parens() {
    // a - (b + c)
    assert!(needs_parens(BinOp::Sub, true, Prec::Additive));
    // (a + b) - c
    assert!(!needs_parens(BinOp::Sub, false, Prec::Additive));
    // (a + b) * c
    assert!(needs_parens(BinOp::Mul, false, Prec::Additive));
    // a * b * c
    assert!(!needs_parens(BinOp::Mul, true, Prec::Multiplicative));
    // a / (b * c)
    assert!(needs_parens(BinOp::Div, true, Prec::Multiplicative));
    // a / -b
    assert!(needs_parens(BinOp::Div, true, Prec::Unary));
    // a * b / c
    assert!(!needs_parens(BinOp::Div, false, Prec::Multiplicative));
    // (a < b) == c
    assert!(needs_parens(BinOp::Other, false, Prec::Other));
    // !a && b
    assert!(!needs_parens(BinOp::Other, false, Prec::Unary));
    // (a + b) < c
    assert!(needs_parens(BinOp::Other, false, Prec::Additive));
  }
}
