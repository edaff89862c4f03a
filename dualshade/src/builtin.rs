//! Stage built-ins and the environments exposing them to entry point bodies.

use crate::{
  expr::{ErasedExpr, Expr},
  types::V4,
  var::Var,
};

/// Built-in values, per stage.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BuiltIn {
  /// Vertex built-ins.
  Vertex(VertexBuiltIn),

  /// Fragment built-ins.
  Fragment(FragmentBuiltIn),
}

/// Vertex built-ins.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum VertexBuiltIn {
  /// Index of the vertex being processed.
  VertexID,

  /// Index of the instance being processed.
  InstanceID,

  /// Clip-space position output.
  Position,

  /// Size of the rasterized point.
  PointSize,
}

/// Fragment built-ins.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FragmentBuiltIn {
  /// Window coordinates of the fragment.
  FragCoord,

  /// Whether the primitive is front-facing.
  FrontFacing,

  /// Color output of the fragment.
  ///
  /// This one has no direct counterpart in modern shading languages; writers alias it to the primary output.
  FragColor,
}

impl BuiltIn {
  /// Whether the built-in is written by the stage rather than read.
  pub const fn is_output(self) -> bool {
    matches!(
      self,
      BuiltIn::Vertex(VertexBuiltIn::Position)
        | BuiltIn::Vertex(VertexBuiltIn::PointSize)
        | BuiltIn::Fragment(FragmentBuiltIn::FragColor)
    )
  }
}

/// Vertex shader environment.
///
/// Given to vertex entry point bodies; gathers everything only valid in a vertex stage.
#[derive(Debug)]
pub struct VertexShaderEnv {
  // inputs
  /// ID of the current vertex.
  pub vertex_id: Expr<i32>,

  /// Instance ID of the current vertex.
  pub instance_id: Expr<i32>,

  // outputs
  /// 4D position of the vertex.
  pub position: Var<V4<f32>>,

  /// Point size of the vertex.
  pub point_size: Var<f32>,
}

impl VertexShaderEnv {
  pub(crate) const fn new() -> Self {
    let vertex_id = Expr::new(ErasedExpr::new_builtin(BuiltIn::Vertex(
      VertexBuiltIn::VertexID,
    )));
    let instance_id = Expr::new(ErasedExpr::new_builtin(BuiltIn::Vertex(
      VertexBuiltIn::InstanceID,
    )));
    let position = Var(Expr::new(ErasedExpr::new_builtin(BuiltIn::Vertex(
      VertexBuiltIn::Position,
    ))));
    let point_size = Var(Expr::new(ErasedExpr::new_builtin(BuiltIn::Vertex(
      VertexBuiltIn::PointSize,
    ))));

    Self {
      vertex_id,
      instance_id,
      position,
      point_size,
    }
  }
}

/// Fragment shader environment.
///
/// This type contains everything you have access to when writing a fragment shader.
#[derive(Debug)]
pub struct FragmentShaderEnv {
  // inputs
  /// Fragment coordinate in the framebuffer.
  pub frag_coord: Expr<V4<f32>>,

  /// Whether the fragment is front-facing.
  pub front_facing: Expr<bool>,

  // outputs
  /// Color of the fragment.
  ///
  /// Writing it is equivalent to returning a value from the body.
  pub color: Var<V4<f32>>,
}

impl FragmentShaderEnv {
  pub(crate) const fn new() -> Self {
    let frag_coord = Expr::new(ErasedExpr::new_builtin(BuiltIn::Fragment(
      FragmentBuiltIn::FragCoord,
    )));
    let front_facing = Expr::new(ErasedExpr::new_builtin(BuiltIn::Fragment(
      FragmentBuiltIn::FrontFacing,
    )));
    let color = Var(Expr::new(ErasedExpr::new_builtin(BuiltIn::Fragment(
      FragmentBuiltIn::FragColor,
    ))));

    Self {
      frag_coord,
      front_facing,
      color,
    }
  }
}
