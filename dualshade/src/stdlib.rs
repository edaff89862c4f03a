//! Built-in math functions, available on expressions via traits.

use crate::{
  expr::{ErasedExpr, Expr},
  fun::ErasedFunHandle,
  types::{M22, M33, M44, V2, V3, V4},
};

fn call<T>(f: ErasedFunHandle, args: Vec<ErasedExpr>) -> Expr<T> {
  Expr::new(ErasedExpr::FunCall(f, args))
}

pub trait Trigonometry {
  fn radians(&self) -> Self;

  fn degrees(&self) -> Self;

  fn sin(&self) -> Self;

  fn cos(&self) -> Self;

  fn tan(&self) -> Self;

  fn asin(&self) -> Self;

  fn acos(&self) -> Self;

  fn atan(&self) -> Self;

  fn sinh(&self) -> Self;

  fn cosh(&self) -> Self;

  fn tanh(&self) -> Self;

  fn asinh(&self) -> Self;

  fn acosh(&self) -> Self;

  fn atanh(&self) -> Self;
}

macro_rules! impl_unary_funs {
  ($($meth:ident => $f:ident),*) => {
    $(
      fn $meth(&self) -> Self {
        call(ErasedFunHandle::$f, vec![self.erased.clone()])
      }
    )*
  };
}

macro_rules! impl_Trigonometry {
  ($t:ty) => {
    impl Trigonometry for Expr<$t> {
      impl_unary_funs!(
        radians => Radians,
        degrees => Degrees,
        sin => Sin,
        cos => Cos,
        tan => Tan,
        asin => ASin,
        acos => ACos,
        atan => ATan,
        sinh => SinH,
        cosh => CosH,
        tanh => TanH,
        asinh => ASinH,
        acosh => ACosH,
        atanh => ATanH
      );
    }
  };
}

impl_Trigonometry!(f32);
impl_Trigonometry!(V2<f32>);
impl_Trigonometry!(V3<f32>);
impl_Trigonometry!(V4<f32>);

pub trait Exponential: Sized {
  fn pow(&self, p: impl Into<Self>) -> Self;

  fn exp(&self) -> Self;

  fn exp2(&self) -> Self;

  fn log(&self) -> Self;

  fn log2(&self) -> Self;

  fn sqrt(&self) -> Self;

  fn isqrt(&self) -> Self;
}

macro_rules! impl_Exponential {
  ($t:ty) => {
    impl Exponential for Expr<$t> {
      fn pow(&self, p: impl Into<Self>) -> Self {
        call(
          ErasedFunHandle::Pow,
          vec![self.erased.clone(), p.into().erased],
        )
      }

      impl_unary_funs!(
        exp => Exp,
        exp2 => Exp2,
        log => Log,
        log2 => Log2,
        sqrt => Sqrt,
        isqrt => InverseSqrt
      );
    }
  };
}

impl_Exponential!(f32);
impl_Exponential!(V2<f32>);
impl_Exponential!(V3<f32>);
impl_Exponential!(V4<f32>);

pub trait Relative {
  fn abs(&self) -> Self;

  fn sign(&self) -> Self;
}

macro_rules! impl_Relative {
  ($t:ty) => {
    impl Relative for Expr<$t> {
      impl_unary_funs!(abs => Abs, sign => Sign);
    }
  };
}

impl_Relative!(i32);
impl_Relative!(V2<i32>);
impl_Relative!(V3<i32>);
impl_Relative!(V4<i32>);
impl_Relative!(f32);
impl_Relative!(V2<f32>);
impl_Relative!(V3<f32>);
impl_Relative!(V4<f32>);

pub trait Floating {
  fn floor(&self) -> Self;

  fn trunc(&self) -> Self;

  fn round(&self) -> Self;

  fn ceil(&self) -> Self;

  fn fract(&self) -> Self;
}

macro_rules! impl_Floating {
  ($t:ty) => {
    impl Floating for Expr<$t> {
      impl_unary_funs!(
        floor => Floor,
        trunc => Trunc,
        round => Round,
        ceil => Ceil,
        fract => Fract
      );
    }
  };
}

impl_Floating!(f32);
impl_Floating!(V2<f32>);
impl_Floating!(V3<f32>);
impl_Floating!(V4<f32>);

pub trait Bounded: Sized {
  fn min(&self, rhs: impl Into<Self>) -> Self;

  fn max(&self, rhs: impl Into<Self>) -> Self;

  fn clamp(&self, min_value: impl Into<Self>, max_value: impl Into<Self>) -> Self;
}

macro_rules! impl_Bounded {
  ($t:ty) => {
    impl Bounded for Expr<$t> {
      fn min(&self, rhs: impl Into<Self>) -> Self {
        call(
          ErasedFunHandle::Min,
          vec![self.erased.clone(), rhs.into().erased],
        )
      }

      fn max(&self, rhs: impl Into<Self>) -> Self {
        call(
          ErasedFunHandle::Max,
          vec![self.erased.clone(), rhs.into().erased],
        )
      }

      fn clamp(&self, min_value: impl Into<Self>, max_value: impl Into<Self>) -> Self {
        call(
          ErasedFunHandle::Clamp,
          vec![
            self.erased.clone(),
            min_value.into().erased,
            max_value.into().erased,
          ],
        )
      }
    }
  };
}

impl_Bounded!(i32);
impl_Bounded!(V2<i32>);
impl_Bounded!(V3<i32>);
impl_Bounded!(V4<i32>);

impl_Bounded!(u32);
impl_Bounded!(V2<u32>);
impl_Bounded!(V3<u32>);
impl_Bounded!(V4<u32>);

impl_Bounded!(f32);
impl_Bounded!(V2<f32>);
impl_Bounded!(V3<f32>);
impl_Bounded!(V4<f32>);

/// Interpolation functions.
///
/// `RHS` is either the type of the expression or its scalar type.
pub trait Mix<RHS>: Sized {
  fn mix(&self, y: impl Into<Self>, a: RHS) -> Self;

  fn step(&self, edge: RHS) -> Self;

  fn smooth_step(&self, edge_a: RHS, edge_b: RHS) -> Self;
}

macro_rules! impl_Mix {
  ($t:ty, $q:ty) => {
    impl Mix<Expr<$q>> for Expr<$t> {
      fn mix(&self, y: impl Into<Self>, a: Expr<$q>) -> Self {
        call(
          ErasedFunHandle::Mix,
          vec![self.erased.clone(), y.into().erased, a.erased],
        )
      }

      // the edge comes first in both languages
      fn step(&self, edge: Expr<$q>) -> Self {
        call(
          ErasedFunHandle::Step,
          vec![edge.erased, self.erased.clone()],
        )
      }

      fn smooth_step(&self, edge_a: Expr<$q>, edge_b: Expr<$q>) -> Self {
        call(
          ErasedFunHandle::SmoothStep,
          vec![edge_a.erased, edge_b.erased, self.erased.clone()],
        )
      }
    }
  };
}

impl_Mix!(f32, f32);
impl_Mix!(V2<f32>, f32);
impl_Mix!(V2<f32>, V2<f32>);
impl_Mix!(V3<f32>, f32);
impl_Mix!(V3<f32>, V3<f32>);
impl_Mix!(V4<f32>, f32);
impl_Mix!(V4<f32>, V4<f32>);

pub trait Geometry: Sized {
  type LengthExpr;

  fn length(&self) -> Self::LengthExpr;

  fn distance(&self, other: impl Into<Self>) -> Self::LengthExpr;

  fn dot(&self, other: impl Into<Self>) -> Self::LengthExpr;

  fn normalize(&self) -> Self;

  fn face_forward(&self, normal: impl Into<Self>, reference: impl Into<Self>) -> Self;

  fn reflect(&self, normal: impl Into<Self>) -> Self;

  fn refract(&self, normal: impl Into<Self>, eta: impl Into<Expr<f32>>) -> Self;
}

macro_rules! impl_Geometry {
  ($t:ty, $l:ty) => {
    impl Geometry for Expr<$t> {
      type LengthExpr = Expr<$l>;

      fn length(&self) -> Self::LengthExpr {
        call(ErasedFunHandle::Length, vec![self.erased.clone()])
      }

      fn distance(&self, other: impl Into<Self>) -> Self::LengthExpr {
        call(
          ErasedFunHandle::Distance,
          vec![self.erased.clone(), other.into().erased],
        )
      }

      fn dot(&self, other: impl Into<Self>) -> Self::LengthExpr {
        call(
          ErasedFunHandle::Dot,
          vec![self.erased.clone(), other.into().erased],
        )
      }

      fn normalize(&self) -> Self {
        call(ErasedFunHandle::Normalize, vec![self.erased.clone()])
      }

      fn face_forward(&self, normal: impl Into<Self>, reference: impl Into<Self>) -> Self {
        call(
          ErasedFunHandle::FaceForward,
          vec![
            self.erased.clone(),
            normal.into().erased,
            reference.into().erased,
          ],
        )
      }

      fn reflect(&self, normal: impl Into<Self>) -> Self {
        call(
          ErasedFunHandle::Reflect,
          vec![self.erased.clone(), normal.into().erased],
        )
      }

      fn refract(&self, normal: impl Into<Self>, eta: impl Into<Expr<f32>>) -> Self {
        call(
          ErasedFunHandle::Refract,
          vec![
            self.erased.clone(),
            normal.into().erased,
            eta.into().erased,
          ],
        )
      }
    }
  };
}

impl_Geometry!(V2<f32>, f32);
impl_Geometry!(V3<f32>, f32);
impl_Geometry!(V4<f32>, f32);

impl Expr<V3<f32>> {
  /// Cross product.
  pub fn cross(&self, other: impl Into<Self>) -> Self {
    call(
      ErasedFunHandle::Cross,
      vec![self.erased.clone(), other.into().erased],
    )
  }
}

/// Square matrix functions.
pub trait SquareMatrix {
  fn transpose(&self) -> Self;

  fn determinant(&self) -> Expr<f32>;
}

macro_rules! impl_SquareMatrix {
  ($t:ty) => {
    impl SquareMatrix for Expr<$t> {
      fn transpose(&self) -> Self {
        call(ErasedFunHandle::Transpose, vec![self.erased.clone()])
      }

      fn determinant(&self) -> Expr<f32> {
        call(ErasedFunHandle::Determinant, vec![self.erased.clone()])
      }
    }
  };
}

impl_SquareMatrix!(M22);
impl_SquareMatrix!(M33);
impl_SquareMatrix!(M44);

/// Screen-space derivatives, only valid in fragment entry points.
pub trait Derivative {
  fn dfdx(&self) -> Self;

  fn dfdy(&self) -> Self;

  fn fwidth(&self) -> Self;
}

macro_rules! impl_Derivative {
  ($t:ty) => {
    impl Derivative for Expr<$t> {
      impl_unary_funs!(dfdx => DFDX, dfdy => DFDY, fwidth => FWidth);
    }
  };
}

impl_Derivative!(f32);
impl_Derivative!(V2<f32>);
impl_Derivative!(V3<f32>);
impl_Derivative!(V4<f32>);

/// Component-wise comparisons of vectors.
pub trait VectorRelational: Sized {
  type BoolExpr;

  fn lt_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr;

  fn lte_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr;

  fn gt_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr;

  fn gte_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr;

  fn eq_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr;

  fn neq_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr;
}

macro_rules! impl_VectorRelational {
  ($t:ty, $b:ty) => {
    impl VectorRelational for Expr<$t> {
      type BoolExpr = Expr<$b>;

      fn lt_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr {
        call(ErasedFunHandle::VLt, vec![self.erased.clone(), rhs.into().erased])
      }

      fn lte_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr {
        call(ErasedFunHandle::VLte, vec![self.erased.clone(), rhs.into().erased])
      }

      fn gt_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr {
        call(ErasedFunHandle::VGt, vec![self.erased.clone(), rhs.into().erased])
      }

      fn gte_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr {
        call(ErasedFunHandle::VGte, vec![self.erased.clone(), rhs.into().erased])
      }

      fn eq_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr {
        call(ErasedFunHandle::VEq, vec![self.erased.clone(), rhs.into().erased])
      }

      fn neq_each(&self, rhs: impl Into<Self>) -> Self::BoolExpr {
        call(ErasedFunHandle::VNeq, vec![self.erased.clone(), rhs.into().erased])
      }
    }
  };
}

impl_VectorRelational!(V2<f32>, V2<bool>);
impl_VectorRelational!(V3<f32>, V3<bool>);
impl_VectorRelational!(V4<f32>, V4<bool>);
impl_VectorRelational!(V2<i32>, V2<bool>);
impl_VectorRelational!(V3<i32>, V3<bool>);
impl_VectorRelational!(V4<i32>, V4<bool>);
impl_VectorRelational!(V2<u32>, V2<bool>);
impl_VectorRelational!(V3<u32>, V3<bool>);
impl_VectorRelational!(V4<u32>, V4<bool>);

/// Reductions and negation of boolean vectors.
pub trait BoolVector {
  fn any(&self) -> Expr<bool>;

  fn all(&self) -> Expr<bool>;

  fn not_each(&self) -> Self;
}

macro_rules! impl_BoolVector {
  ($t:ty) => {
    impl BoolVector for Expr<$t> {
      fn any(&self) -> Expr<bool> {
        call(ErasedFunHandle::VAny, vec![self.erased.clone()])
      }

      fn all(&self) -> Expr<bool> {
        call(ErasedFunHandle::VAll, vec![self.erased.clone()])
      }

      fn not_each(&self) -> Self {
        call(ErasedFunHandle::VNot, vec![self.erased.clone()])
      }
    }
  };
}

impl_BoolVector!(V2<bool>);
impl_BoolVector!(V3<bool>);
impl_BoolVector!(V4<bool>);

#[cfg(test)]
mod test {
  use super::*;
  use crate::lit;

  #[test]
  fn step_takes_edge_first() {
    let x = lit!(0.3f32);
    let e = lit!(0.5f32);

    assert_eq!(
      x.step(e.clone()).erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::Step,
        vec![ErasedExpr::LitFloat(0.5), ErasedExpr::LitFloat(0.3)]
      )
    );
  }

  #[test]
  fn geometry() {
    let a: Expr<V3<f32>> = lit!(1., 0., 0.);
    let b: Expr<V3<f32>> = lit!(0., 1., 0.);

    assert_eq!(
      a.cross(&b).erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::Cross,
        vec![a.erased.clone(), b.erased.clone()]
      )
    );
    assert_eq!(
      a.dot(&b).erased,
      ErasedExpr::FunCall(ErasedFunHandle::Dot, vec![a.erased.clone(), b.erased])
    );
  }

  #[test]
  fn bool_vectors() {
    let a: Expr<V2<f32>> = lit!(1., 2.);
    let b: Expr<V2<f32>> = lit!(2., 2.);
    let lt = a.lt_each(b);

    assert_eq!(
      lt.any().erased,
      ErasedExpr::FunCall(ErasedFunHandle::VAny, vec![lt.erased.clone()])
    );
  }
}
