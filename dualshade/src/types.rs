//! Shading types.
//!
//! Shading types are represented on the Rust side by regular Rust types (`f32`, `[T; N]`, …) and a couple of wrapper
//! types ([`V2`], [`V3`], [`V4`], [`Matrix`]). Their erased representation, [`Type`], is what the writers consume to
//! render the type names of both target languages.

use crate::{
  error::Error,
  expr::{AnyExpr, ErasedExpr, Expr},
  fun::ErasedFunHandle,
};
use std::iter::once;

macro_rules! make_vn {
  ($t:ident, $dim:expr) => {
    /// Scalar vectors.
    ///
    /// Scalar vectors come into three flavors, based on the dimension used:
    ///
    /// - Two dimensions (2D): [`V2<T>`].
    /// - Three dimensions (3D): [`V3<T>`].
    /// - Four dimensions (4D): [`V4<T>`].
    ///
    /// Each type implements the [`From`] trait for sized array. For instance, if you want to make a `V3<f32>` from
    /// constants / literals, you can simply use the implementor `From<[f32; 3]> for V3<f32>`.
    ///
    /// A builder macro version exists for each flavor: [`vec2!`](crate::vec2), [`vec3!`](crate::vec3) and
    /// [`vec4!`](crate::vec4).
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct $t<T>(pub [T; $dim]);

    impl<T> From<[T; $dim]> for $t<T> {
      fn from(a: [T; $dim]) -> Self {
        Self(a)
      }
    }
  };
}

make_vn!(V2, 2);
make_vn!(V3, 3);
make_vn!(V4, 4);

/// Matrix wrapper.
///
/// This type represents a matrix of a given dimension, deduced from the wrapped type. The wrapped array is a list of
/// columns, so `[[f32; 3]; 4]` is a matrix of four columns of three rows each.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix<T>(pub T);

impl<T, const M: usize, const N: usize> From<[[T; N]; M]> for Matrix<[[T; N]; M]> {
  fn from(a: [[T; N]; M]) -> Self {
    Matrix(a)
  }
}

macro_rules! make_mat_ty {
  ($t:ident, $lit:ident, $m:expr, $n:expr, $mdim:ident) => {
    pub type $t = Matrix<[[f32; $n]; $m]>;

    impl ToPrimType for Matrix<[[f32; $n]; $m]> {
      const PRIM_TYPE: PrimType = PrimType::Matrix(MatrixDim::$mdim);
    }

    impl From<Matrix<[[f32; $n]; $m]>> for Expr<Matrix<[[f32; $n]; $m]>> {
      fn from(matrix: Matrix<[[f32; $n]; $m]>) -> Self {
        Self::new(ErasedExpr::$lit(matrix))
      }
    }

    impl<'a> From<&'a Matrix<[[f32; $n]; $m]>> for Expr<Matrix<[[f32; $n]; $m]>> {
      fn from(matrix: &'a Matrix<[[f32; $n]; $m]>) -> Self {
        Self::new(ErasedExpr::$lit(*matrix))
      }
    }
  };
}

make_mat_ty!(M22, LitM22, 2, 2, D22);
make_mat_ty!(M33, LitM33, 3, 3, D33);
make_mat_ty!(M44, LitM44, 4, 4, D44);
make_mat_ty!(M43, LitM43, 4, 3, D43);

/// Matrix dimension.
///
/// Variants are named after columns × rows, so [`MatrixDim::D43`] is `mat4x3` (four columns, three rows).
///
/// > Note: matrices are expressed in column-major.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatrixDim {
  /// Squared 2 dimension.
  D22,
  /// Squared 3 dimension.
  D33,
  /// Squared 4 dimension.
  D44,
  /// 4 columns of 3 rows.
  D43,
}

impl MatrixDim {
  /// Number of columns.
  pub const fn columns(self) -> usize {
    match self {
      MatrixDim::D22 => 2,
      MatrixDim::D33 => 3,
      MatrixDim::D44 | MatrixDim::D43 => 4,
    }
  }

  /// Number of rows.
  pub const fn rows(self) -> usize {
    match self {
      MatrixDim::D22 => 2,
      MatrixDim::D33 | MatrixDim::D43 => 3,
      MatrixDim::D44 => 4,
    }
  }
}

/// Dimension of a primitive type.
///
/// Primitive types currently can have one of four dimension:
///
/// - [`Dim::Scalar`]: designates a scalar value.
/// - [`Dim::D2`]: designates a 2D vector.
/// - [`Dim::D3`]: designates a 3D vector.
/// - [`Dim::D4`]: designates a 4D vector.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dim {
  /// Scalar value.
  Scalar,

  /// 2D vector.
  D2,

  /// 3D vector.
  D3,

  /// 4D vector.
  D4,
}

impl Dim {
  /// Number of components.
  pub const fn count(self) -> usize {
    match self {
      Dim::Scalar => 1,
      Dim::D2 => 2,
      Dim::D3 => 3,
      Dim::D4 => 4,
    }
  }
}

/// Type representation: akin to [`PrimType`] glued with array dimensions, if any.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Type {
  /// Primitive type, representing a type without array dimensions.
  pub(crate) prim_ty: PrimType,

  /// Array dimensions, if any.
  ///
  /// Dimensions are sorted from outer to inner; i.e. `[[i32; N]; M]`’s dimensions is encoded as `vec![M, N]`.
  pub(crate) array_dims: Vec<usize>,
}

impl Type {
  /// Primitive type, ignoring array dimensions.
  pub fn prim_ty(&self) -> PrimType {
    self.prim_ty
  }

  /// Array dimensions, outer first.
  pub fn array_dims(&self) -> &[usize] {
    &self.array_dims
  }

  /// Type of an element when this type is an array; `None` otherwise.
  pub fn element(&self) -> Option<Type> {
    if self.array_dims.is_empty() {
      return None;
    }

    Some(Type {
      prim_ty: self.prim_ty,
      array_dims: self.array_dims[1..].to_vec(),
    })
  }
}

/// Primitive supported types.
///
/// Types without array dimensions are known as _primitive types_ and are exhaustively constructed thanks to
/// [`PrimType`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PrimType {
  /// An integral type.
  ///
  /// The [`Dim`] argument represents the vector dimension. Do not confuse it with an array dimension.
  Int(Dim),

  /// An unsigned integral type.
  ///
  /// The [`Dim`] argument represents the vector dimension. Do not confuse it with an array dimension.
  UInt(Dim),

  /// An floating type.
  ///
  /// The [`Dim`] argument represents the vector dimension. Do not confuse it with an array dimension.
  Float(Dim),

  /// A boolean type.
  ///
  /// The [`Dim`] argument represents the vector dimension. Do not confuse it with an array dimension.
  Bool(Dim),

  /// A N×M floating matrix.
  ///
  /// The [`MatrixDim`] provides the information required to know the exact dimension of the matrix.
  Matrix(MatrixDim),
}

impl PrimType {
  /// Total number of scalar components.
  pub const fn components(self) -> usize {
    match self {
      PrimType::Int(d) | PrimType::UInt(d) | PrimType::Float(d) | PrimType::Bool(d) => d.count(),
      PrimType::Matrix(m) => m.columns() * m.rows(),
    }
  }

  /// The scalar type components are made of.
  pub const fn scalar(self) -> PrimType {
    match self {
      PrimType::Int(_) => PrimType::Int(Dim::Scalar),
      PrimType::UInt(_) => PrimType::UInt(Dim::Scalar),
      PrimType::Float(_) | PrimType::Matrix(_) => PrimType::Float(Dim::Scalar),
      PrimType::Bool(_) => PrimType::Bool(Dim::Scalar),
    }
  }

  pub(crate) const fn is_scalar(self) -> bool {
    matches!(
      self,
      PrimType::Int(Dim::Scalar)
        | PrimType::UInt(Dim::Scalar)
        | PrimType::Float(Dim::Scalar)
        | PrimType::Bool(Dim::Scalar)
    )
  }
}

/// Class of types that are recognized by the EDSL.
///
/// Any type implementing this type family is _representable_ in the EDSL.
pub trait ToPrimType {
  /// Mapped primitive type.
  const PRIM_TYPE: PrimType;
}

macro_rules! impl_ToPrimType {
  ($t:ty, $q:ident, $d:ident) => {
    impl ToPrimType for $t {
      const PRIM_TYPE: PrimType = PrimType::$q(Dim::$d);
    }
  };
}

impl_ToPrimType!(i32, Int, Scalar);
impl_ToPrimType!(u32, UInt, Scalar);
impl_ToPrimType!(f32, Float, Scalar);
impl_ToPrimType!(bool, Bool, Scalar);
impl_ToPrimType!(V2<i32>, Int, D2);
impl_ToPrimType!(V2<u32>, UInt, D2);
impl_ToPrimType!(V2<f32>, Float, D2);
impl_ToPrimType!(V2<bool>, Bool, D2);
impl_ToPrimType!(V3<i32>, Int, D3);
impl_ToPrimType!(V3<u32>, UInt, D3);
impl_ToPrimType!(V3<f32>, Float, D3);
impl_ToPrimType!(V3<bool>, Bool, D3);
impl_ToPrimType!(V4<i32>, Int, D4);
impl_ToPrimType!(V4<u32>, UInt, D4);
impl_ToPrimType!(V4<f32>, Float, D4);
impl_ToPrimType!(V4<bool>, Bool, D4);

/// Represent a type (primitive type and array dimension) in the EDSL.
///
/// Any type implementing [`ToType`] is representable in the EDSL. Any type implementing [`ToPrimType`] automatically
/// also implements [`ToType`].
pub trait ToType {
  fn ty() -> Type;
}

impl<T> ToType for T
where
  T: ToPrimType,
{
  fn ty() -> Type {
    Type {
      prim_ty: T::PRIM_TYPE,
      array_dims: Vec::new(),
    }
  }
}

impl<T, const N: usize> ToType for [T; N]
where
  T: ToType,
{
  fn ty() -> Type {
    let Type {
      prim_ty,
      array_dims,
    } = T::ty();
    let array_dims = once(N).chain(array_dims).collect();

    Type {
      prim_ty,
      array_dims,
    }
  }
}

fn construct<T>(args: Vec<ErasedExpr>) -> Expr<T>
where
  T: ToPrimType,
{
  Expr::new(ErasedExpr::FunCall(
    ErasedFunHandle::Construct(T::PRIM_TYPE),
    args,
  ))
}

/// Trait allowing to create 2D scalar vector ([`V2`]) constructors.
///
/// 2D scalar vectors can be created from either two sole scalars or a single scalar (splat).
///
/// The `A` type variable represents the arguments type. In the case of several arguments, tuples are used.
///
/// You are advised to use the [`vec2!`](crate::vec2) macro instead as the interface of this function is not really
/// user-friendly.
pub trait Vec2<A> {
  /// Make a [`V2`] from `A`.
  fn vec2(args: A) -> Self;
}

impl<T> Vec2<Expr<T>> for Expr<V2<T>>
where
  V2<T>: ToPrimType,
{
  fn vec2(x: Expr<T>) -> Self {
    construct(vec![x.erased])
  }
}

impl<T> Vec2<(Expr<T>, Expr<T>)> for Expr<V2<T>>
where
  V2<T>: ToPrimType,
{
  fn vec2((x, y): (Expr<T>, Expr<T>)) -> Self {
    construct(vec![x.erased, y.erased])
  }
}

/// Trait allowing to create 3D scalar vector ([`V3`]) constructors.
///
/// 3D scalar vectors can be created from either three sole scalars, a single 2D scalar vector with a single scalar or
/// a single scalar (splat).
///
/// You are advised to use the [`vec3!`](crate::vec3) macro instead.
pub trait Vec3<A> {
  /// Make a [`V3`] from `A`.
  fn vec3(args: A) -> Self;
}

impl<T> Vec3<Expr<T>> for Expr<V3<T>>
where
  V3<T>: ToPrimType,
{
  fn vec3(x: Expr<T>) -> Self {
    construct(vec![x.erased])
  }
}

impl<T> Vec3<(Expr<V2<T>>, Expr<T>)> for Expr<V3<T>>
where
  V3<T>: ToPrimType,
{
  fn vec3((xy, z): (Expr<V2<T>>, Expr<T>)) -> Self {
    construct(vec![xy.erased, z.erased])
  }
}

impl<T> Vec3<(Expr<T>, Expr<V2<T>>)> for Expr<V3<T>>
where
  V3<T>: ToPrimType,
{
  fn vec3((x, yz): (Expr<T>, Expr<V2<T>>)) -> Self {
    construct(vec![x.erased, yz.erased])
  }
}

impl<T> Vec3<(Expr<T>, Expr<T>, Expr<T>)> for Expr<V3<T>>
where
  V3<T>: ToPrimType,
{
  fn vec3((x, y, z): (Expr<T>, Expr<T>, Expr<T>)) -> Self {
    construct(vec![x.erased, y.erased, z.erased])
  }
}

/// Trait allowing to create 4D scalar vector ([`V4`]) constructors.
///
/// 4D scalar vectors can be created from either four sole scalars, a single 3D scalar vector with a single scalar,
/// two 2D scalar vectors, a 2D scalar vector and two sole scalars or a single scalar (splat).
///
/// You are advised to use the [`vec4!`](crate::vec4) macro instead.
pub trait Vec4<A> {
  /// Make a [`V4`] from `A`.
  fn vec4(args: A) -> Self;
}

impl<T> Vec4<Expr<T>> for Expr<V4<T>>
where
  V4<T>: ToPrimType,
{
  fn vec4(x: Expr<T>) -> Self {
    construct(vec![x.erased])
  }
}

impl<T> Vec4<(Expr<V3<T>>, Expr<T>)> for Expr<V4<T>>
where
  V4<T>: ToPrimType,
{
  fn vec4((xyz, w): (Expr<V3<T>>, Expr<T>)) -> Self {
    construct(vec![xyz.erased, w.erased])
  }
}

impl<T> Vec4<(Expr<V2<T>>, Expr<V2<T>>)> for Expr<V4<T>>
where
  V4<T>: ToPrimType,
{
  fn vec4((xy, zw): (Expr<V2<T>>, Expr<V2<T>>)) -> Self {
    construct(vec![xy.erased, zw.erased])
  }
}

impl<T> Vec4<(Expr<V2<T>>, Expr<T>, Expr<T>)> for Expr<V4<T>>
where
  V4<T>: ToPrimType,
{
  fn vec4((xy, z, w): (Expr<V2<T>>, Expr<T>, Expr<T>)) -> Self {
    construct(vec![xy.erased, z.erased, w.erased])
  }
}

impl<T> Vec4<(Expr<T>, Expr<T>, Expr<T>, Expr<T>)> for Expr<V4<T>>
where
  V4<T>: ToPrimType,
{
  fn vec4((x, y, z, w): (Expr<T>, Expr<T>, Expr<T>, Expr<T>)) -> Self {
    construct(vec![x.erased, y.erased, z.erased, w.erased])
  }
}

impl<T> Expr<T>
where
  T: ToPrimType,
{
  /// Dynamic type constructor.
  ///
  /// Build a `T` out of a list of type-erased arguments, the way `vec4(xy, z, w)` or `mat2(c0, c1)` would. Unlike
  /// the statically typed constructors ([`Vec2`], [`Vec3`], [`Vec4`]), the argument shape is only known at runtime
  /// and is validated here:
  ///
  /// - arguments must not be arrays and must share the scalar type of `T` (matrices are made of `f32`);
  /// - a single scalar argument splats on every component of a vector (not of a matrix);
  /// - otherwise, the total number of components must match exactly.
  ///
  /// # Errors
  ///
  /// [`Error::InvalidArgument`] when the argument shape is not recognized.
  pub fn construct(args: impl IntoIterator<Item = AnyExpr>) -> Result<Self, Error> {
    let target = T::PRIM_TYPE;
    let args: Vec<AnyExpr> = args.into_iter().collect();

    if args.is_empty() {
      return Err(Error::InvalidArgument(format!(
        "{:?} constructor requires at least one argument",
        target
      )));
    }

    let mut components = 0;
    for arg in &args {
      if !arg.ty.array_dims.is_empty() {
        return Err(Error::InvalidArgument(format!(
          "{:?} constructor cannot take an array argument",
          target
        )));
      }

      if arg.ty.prim_ty.scalar() != target.scalar() {
        return Err(Error::InvalidArgument(format!(
          "{:?} constructor cannot take a {:?} argument",
          target, arg.ty.prim_ty
        )));
      }

      components += arg.ty.prim_ty.components();
    }

    let splat = args.len() == 1 && args[0].ty.prim_ty.is_scalar();
    let valid = match target {
      PrimType::Matrix(_) => components == target.components(),
      _ => splat || components == target.components(),
    };

    if !valid {
      return Err(Error::InvalidArgument(format!(
        "{:?} constructor expects {} components, got {}",
        target,
        target.components(),
        components
      )));
    }

    Ok(construct(args.into_iter().map(|arg| arg.erased).collect()))
  }
}

macro_rules! impl_cast {
  ($from:ty, $meth:ident, $to:ty) => {
    impl Expr<$from> {
      /// Scalar conversion.
      pub fn $meth(&self) -> Expr<$to> {
        construct(vec![self.erased.clone()])
      }
    }
  };
}

impl_cast!(i32, as_f32, f32);
impl_cast!(i32, as_u32, u32);
impl_cast!(u32, as_f32, f32);
impl_cast!(u32, as_i32, i32);
impl_cast!(f32, as_i32, i32);
impl_cast!(f32, as_u32, u32);
impl_cast!(V2<f32>, as_ivec2, V2<i32>);
impl_cast!(V2<i32>, as_vec2, V2<f32>);
impl_cast!(V3<f32>, as_ivec3, V3<i32>);
impl_cast!(V3<i32>, as_vec3, V3<f32>);

#[cfg(test)]
mod test {
  use super::*;
  use crate::lit;

  #[test]
  fn array_types() {
    let ty = <[[f32; 2]; 4] as ToType>::ty();

    assert_eq!(ty.prim_ty(), PrimType::Float(Dim::Scalar));
    assert_eq!(ty.array_dims(), &[4, 2]);
    assert_eq!(ty.element(), Some(<[f32; 2] as ToType>::ty()));
    assert_eq!(f32::ty().element(), None);
  }

  #[test]
  fn matrix_dims() {
    assert_eq!(M43::PRIM_TYPE, PrimType::Matrix(MatrixDim::D43));
    assert_eq!(MatrixDim::D43.columns(), 4);
    assert_eq!(MatrixDim::D43.rows(), 3);
    assert_eq!(PrimType::Matrix(MatrixDim::D43).components(), 12);
  }

  #[test]
  fn dynamic_construct() {
    let xy: Expr<V2<f32>> = lit!(1., 2.);
    let v = Expr::<V4<f32>>::construct([
      AnyExpr::from(&xy),
      lit!(3f32).into(),
      lit!(4f32).into(),
    ])
    .unwrap();

    assert_eq!(
      v.erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::Construct(PrimType::Float(Dim::D4)),
        vec![xy.erased.clone(), ErasedExpr::LitFloat(3.), ErasedExpr::LitFloat(4.)]
      )
    );

    let splat = Expr::<V3<f32>>::construct([AnyExpr::from(lit!(1f32))]);
    assert!(splat.is_ok());
  }

  #[test]
  fn dynamic_construct_invalid() {
    let xy: Expr<V2<f32>> = lit!(1., 2.);

    assert!(matches!(
      Expr::<V4<f32>>::construct([AnyExpr::from(&xy), lit!(3f32).into()]),
      Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
      Expr::<V2<f32>>::construct([AnyExpr::from(lit!(1i32)), lit!(2i32).into()]),
      Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
      Expr::<M22>::construct([AnyExpr::from(lit!(1f32))]),
      Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
      Expr::<V2<f32>>::construct(Vec::new()),
      Err(Error::InvalidArgument(_))
    ));
  }
}
