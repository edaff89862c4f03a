//! Samplers and texture sampling.
//!
//! A sampler is a texture resource the shader can read from. In GLSL it is a single `sampler*` uniform; in WGSL it
//! becomes a texture binding, plus a separate `sampler` binding for the kinds that are filtered
//! ([`SamplerKind::is_paired`]).

use crate::{
  expr::{ErasedExpr, Expr},
  fun::ErasedFunHandle,
  scope::ScopedHandle,
  types::{V2, V3, V4},
};

/// Kind of sampler.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SamplerKind {
  /// Filtered 2D floating-point texture.
  Sampler2D,

  /// Filtered 2D texture array; the layer is the third coordinate.
  Sampler2DArray,

  /// Filtered 3D texture.
  Sampler3D,

  /// 2D depth texture, read texel by texel.
  Depth,

  /// 2D unsigned integer texture, read texel by texel.
  Unsigned,
}

impl SamplerKind {
  /// Whether this kind comes with a separate `sampler` object in WGSL.
  pub const fn is_paired(self) -> bool {
    matches!(
      self,
      SamplerKind::Sampler2D | SamplerKind::Sampler2DArray | SamplerKind::Sampler3D
    )
  }
}

/// Sampler kinds, at the type level.
pub trait SamplerType {
  const KIND: SamplerKind;
}

macro_rules! sampler_types {
  ($($(#[$doc:meta])* $name:ident => $kind:ident),* $(,)?) => {
    $(
      $(#[$doc])*
      #[derive(Clone, Copy, Debug, Eq, PartialEq)]
      pub struct $name;

      impl SamplerType for $name {
        const KIND: SamplerKind = SamplerKind::$kind;
      }
    )*
  };
}

sampler_types! {
  /// Filtered 2D texture.
  Tex2D => Sampler2D,
  /// Filtered 2D texture array.
  Tex2DArray => Sampler2DArray,
  /// Filtered 3D texture.
  Tex3D => Sampler3D,
  /// Depth texture.
  TexDepth => Depth,
  /// Unsigned integer texture.
  TexUnsigned => Unsigned,
}

/// Sampler resource, obtained by declaring it on a [`Program`](crate::program::Program).
#[derive(Debug)]
pub struct Sampler<K> {
  name: String,
  binding: Option<u32>,
  group: u32,
  pub(crate) expr: Expr<K>,
}

impl<K> Clone for Sampler<K> {
  fn clone(&self) -> Self {
    Sampler {
      name: self.name.clone(),
      binding: self.binding,
      group: self.group,
      expr: self.expr.clone(),
    }
  }
}

impl<K> Sampler<K>
where
  K: SamplerType,
{
  pub(crate) fn new(name: &str, group: u32, binding: Option<u32>) -> Self {
    Sampler {
      name: name.to_owned(),
      binding,
      group,
      expr: Expr::new(ErasedExpr::Var(ScopedHandle::Sampler(name.to_owned()))),
    }
  }

  /// Name of the sampler.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Explicitly requested binding, if any.
  pub fn binding(&self) -> Option<u32> {
    self.binding
  }

  /// Binding group of the sampler.
  pub fn group(&self) -> u32 {
    self.group
  }

  /// Kind of the sampler.
  pub fn kind(&self) -> SamplerKind {
    K::KIND
  }

  fn call<T>(&self, f: ErasedFunHandle, coords: ErasedExpr) -> Expr<T> {
    Expr::new(ErasedExpr::FunCall(f, vec![self.expr.erased.clone(), coords]))
  }
}

impl Sampler<Tex2D> {
  /// Sample the texture at normalized coordinates.
  pub fn sample(&self, uv: impl Into<Expr<V2<f32>>>) -> Expr<V4<f32>> {
    self.call(
      ErasedFunHandle::Texture(SamplerKind::Sampler2D),
      uv.into().erased,
    )
  }
}

impl Sampler<Tex2DArray> {
  /// Sample the texture array; `.z` selects the layer.
  pub fn sample(&self, uvw: impl Into<Expr<V3<f32>>>) -> Expr<V4<f32>> {
    self.call(
      ErasedFunHandle::Texture(SamplerKind::Sampler2DArray),
      uvw.into().erased,
    )
  }
}

impl Sampler<Tex3D> {
  /// Sample the 3D texture at normalized coordinates.
  pub fn sample(&self, uvw: impl Into<Expr<V3<f32>>>) -> Expr<V4<f32>> {
    self.call(
      ErasedFunHandle::Texture(SamplerKind::Sampler3D),
      uvw.into().erased,
    )
  }
}

impl Sampler<TexDepth> {
  /// Read the depth of a texel, at level 0.
  pub fn fetch(&self, texel: impl Into<Expr<V2<i32>>>) -> Expr<f32> {
    self.call(
      ErasedFunHandle::TexelFetch(SamplerKind::Depth),
      texel.into().erased,
    )
  }
}

impl Sampler<TexUnsigned> {
  /// Read a texel, at level 0.
  pub fn fetch(&self, texel: impl Into<Expr<V2<i32>>>) -> Expr<V4<u32>> {
    self.call(
      ErasedFunHandle::TexelFetch(SamplerKind::Unsigned),
      texel.into().erased,
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::lit;

  #[test]
  fn paired_kinds() {
    assert!(SamplerKind::Sampler2D.is_paired());
    assert!(SamplerKind::Sampler2DArray.is_paired());
    assert!(SamplerKind::Sampler3D.is_paired());
    assert!(!SamplerKind::Depth.is_paired());
    assert!(!SamplerKind::Unsigned.is_paired());
  }

  #[test]
  fn sample_2d() {
    let tex = Sampler::<Tex2D>::new("albedo", 0, None);
    let color = tex.sample(lit!(0.5, 0.5));

    assert_eq!(tex.kind(), SamplerKind::Sampler2D);
    assert_eq!(
      color.erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::Texture(SamplerKind::Sampler2D),
        vec![
          ErasedExpr::Var(ScopedHandle::Sampler("albedo".to_owned())),
          ErasedExpr::LitFloat2([0.5, 0.5])
        ]
      )
    );
  }

  #[test]
  fn fetch_depth() {
    let tex = Sampler::<TexDepth>::new("shadow", 1, Some(3));
    let depth = tex.fetch(lit!(1, 2));

    assert_eq!(tex.group(), 1);
    assert_eq!(tex.binding(), Some(3));
    assert_eq!(
      depth.erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::TexelFetch(SamplerKind::Depth),
        vec![
          ErasedExpr::Var(ScopedHandle::Sampler("shadow".to_owned())),
          ErasedExpr::LitInt2([1, 2])
        ]
      )
    );
  }
}
