use crate::{
  expr::{ErasedExpr, Expr},
  types::{V2, V3, V4},
};

/// Select a channel to extract from into a swizzled expession.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwizzleSelector {
  /// Select the `.x` (or `.r`) channel.
  X,

  /// Select the `.y` (or `.g`) channel.
  Y,

  /// Select the `.z` (or `.b`) channel.
  Z,

  /// Select the `.w` (or `.a`) channel.
  W,
}

impl SwizzleSelector {
  pub(crate) const fn name(self) -> char {
    match self {
      SwizzleSelector::X => 'x',
      SwizzleSelector::Y => 'y',
      SwizzleSelector::Z => 'z',
      SwizzleSelector::W => 'w',
    }
  }
}

/// Swizzle channel selector.
///
/// This type gives the dimension of the target expression (output). Each [`SwizzleSelector`] selects a specific
/// channel in the input expression.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Swizzle {
  /// Create a one-channel expression.
  D1(SwizzleSelector),

  /// Create a two-channel expression.
  D2(SwizzleSelector, SwizzleSelector),

  /// Create a three-channel expression.
  D3(SwizzleSelector, SwizzleSelector, SwizzleSelector),

  /// Create a four-channel expression.
  D4(
    SwizzleSelector,
    SwizzleSelector,
    SwizzleSelector,
    SwizzleSelector,
  ),
}

impl Swizzle {
  /// Selected channels, in order.
  pub fn selectors(&self) -> Vec<SwizzleSelector> {
    match *self {
      Swizzle::D1(a) => vec![a],
      Swizzle::D2(a, b) => vec![a, b],
      Swizzle::D3(a, b, c) => vec![a, b, c],
      Swizzle::D4(a, b, c, d) => vec![a, b, c, d],
    }
  }
}

/// Interface to implement to swizzle an expression.
///
/// If you plan to use your implementor with the [`sw!`](crate::sw) macro, `S` must be one of the following types:
///
/// - [`SwizzleSelector`]: to implement `sw!(e, .x)`.
/// - [[`SwizzleSelector`]; 2]: to implement `sw!(e, .x.x)`.
/// - [[`SwizzleSelector`]; 3]: to implement `sw!(e, .x.x.x)`.
/// - [[`SwizzleSelector`]; 4]: to implement `sw!(e, .x.x.x.x)`.
pub trait Swizzlable<S> {
  type Output;

  fn swizzle(&self, sw: S) -> Self::Output;
}

fn swizzled<T>(e: &ErasedExpr, sw: Swizzle) -> Expr<T> {
  Expr::new(ErasedExpr::Swizzle(Box::new(e.clone()), sw))
}

macro_rules! impl_Swizzlable {
  ($v:ident, $d2:ident, $d3:ident, $d4:ident) => {
    impl<T> Swizzlable<SwizzleSelector> for Expr<$v<T>> {
      type Output = Expr<T>;

      fn swizzle(&self, x: SwizzleSelector) -> Self::Output {
        swizzled(&self.erased, Swizzle::D1(x))
      }
    }

    impl<T> Swizzlable<[SwizzleSelector; 2]> for Expr<$v<T>> {
      type Output = Expr<$d2<T>>;

      fn swizzle(&self, [x, y]: [SwizzleSelector; 2]) -> Self::Output {
        swizzled(&self.erased, Swizzle::D2(x, y))
      }
    }

    impl<T> Swizzlable<[SwizzleSelector; 3]> for Expr<$v<T>> {
      type Output = Expr<$d3<T>>;

      fn swizzle(&self, [x, y, z]: [SwizzleSelector; 3]) -> Self::Output {
        swizzled(&self.erased, Swizzle::D3(x, y, z))
      }
    }

    impl<T> Swizzlable<[SwizzleSelector; 4]> for Expr<$v<T>> {
      type Output = Expr<$d4<T>>;

      fn swizzle(&self, [x, y, z, w]: [SwizzleSelector; 4]) -> Self::Output {
        swizzled(&self.erased, Swizzle::D4(x, y, z, w))
      }
    }
  };
}

// any vector can be swizzled into any other dimension, as in GLSL and WGSL (e.g. `v.xxxx` for a 2D vector)
impl_Swizzlable!(V2, V2, V3, V4);
impl_Swizzlable!(V3, V2, V3, V4);
impl_Swizzlable!(V4, V2, V3, V4);

/// Expressions having a `x` or `r` coordinate.
///
/// Akin to swizzling with `.x` or `.r`, but easier.
pub trait HasX {
  type Output;

  fn x(&self) -> Self::Output;
  fn r(&self) -> Self::Output {
    self.x()
  }
}

/// Expressions having a `y` or `g` coordinate.
///
/// Akin to swizzling with `.y` or `.g`, but easier.
pub trait HasY {
  type Output;

  fn y(&self) -> Self::Output;
  fn g(&self) -> Self::Output {
    self.y()
  }
}

/// Expressions having a `z` or `b` coordinate.
///
/// Akin to swizzling with `.z` or `.b`, but easier.
pub trait HasZ {
  type Output;

  fn z(&self) -> Self::Output;
  fn b(&self) -> Self::Output {
    self.z()
  }
}

/// Expressions having a `w` or `a` coordinate.
///
/// Akin to swizzling with `.w` or `.a`, but easier.
pub trait HasW {
  type Output;

  fn w(&self) -> Self::Output;
  fn a(&self) -> Self::Output {
    self.w()
  }
}

/// Expressions with at least two channels, giving the `.xy` and `.zw` shorthands.
pub trait HasXY {
  type Output;

  fn xy(&self) -> Self::Output;
}

/// Expressions with four channels, giving the `.zw` shorthand.
pub trait HasZW {
  type Output;

  fn zw(&self) -> Self::Output;
}

/// Expressions with at least three channels, giving the `.xyz` (or `.rgb`) shorthand.
pub trait HasXYZ {
  type Output;

  fn xyz(&self) -> Self::Output;
  fn rgb(&self) -> Self::Output {
    self.xyz()
  }
}

macro_rules! impl_has_k {
  ($trait:ident, $name:ident, $selector:ident, $t:ident) => {
    impl<T> $trait for Expr<$t<T>> {
      type Output = Expr<T>;

      fn $name(&self) -> Self::Output {
        self.swizzle(SwizzleSelector::$selector)
      }
    }
  };
}

impl_has_k!(HasX, x, X, V2);
impl_has_k!(HasX, x, X, V3);
impl_has_k!(HasX, x, X, V4);

impl_has_k!(HasY, y, Y, V2);
impl_has_k!(HasY, y, Y, V3);
impl_has_k!(HasY, y, Y, V4);

impl_has_k!(HasZ, z, Z, V3);
impl_has_k!(HasZ, z, Z, V4);

impl_has_k!(HasW, w, W, V4);

macro_rules! impl_has_xy {
  ($t:ident) => {
    impl<T> HasXY for Expr<$t<T>> {
      type Output = Expr<V2<T>>;

      fn xy(&self) -> Self::Output {
        self.swizzle([SwizzleSelector::X, SwizzleSelector::Y])
      }
    }
  };
}

impl_has_xy!(V2);
impl_has_xy!(V3);
impl_has_xy!(V4);

impl<T> HasZW for Expr<V4<T>> {
  type Output = Expr<V2<T>>;

  fn zw(&self) -> Self::Output {
    self.swizzle([SwizzleSelector::Z, SwizzleSelector::W])
  }
}

macro_rules! impl_has_xyz {
  ($t:ident) => {
    impl<T> HasXYZ for Expr<$t<T>> {
      type Output = Expr<V3<T>>;

      fn xyz(&self) -> Self::Output {
        self.swizzle([SwizzleSelector::X, SwizzleSelector::Y, SwizzleSelector::Z])
      }
    }
  };
}

impl_has_xyz!(V3);
impl_has_xyz!(V4);

/// Swizzle macro.
///
/// This macro allows to swizzle expressions to yield expressions reorganizing the vector attributes. For instance,
/// `sw!(color, .r.g.b.r)` will take a 4D color and will output a 4D color for which the alpha channel is overridden
/// with the red channel.
///
/// The current syntax allows to extract and construct from a lot of types. Have a look at [`Swizzlable`] for a
/// comprehensive list of what you can do.
#[macro_export]
macro_rules! sw {
  ($e:expr, . $a:tt) => {
    $e.swizzle($crate::sw_extract!($a))
  };

  ($e:expr, . $a:tt . $b:tt) => {
    $e.swizzle([$crate::sw_extract!($a), $crate::sw_extract!($b)])
  };

  ($e:expr, . $a:tt . $b:tt . $c:tt) => {
    $e.swizzle([
      $crate::sw_extract!($a),
      $crate::sw_extract!($b),
      $crate::sw_extract!($c),
    ])
  };

  ($e:expr, . $a:tt . $b:tt . $c:tt . $d:tt) => {
    $e.swizzle([
      $crate::sw_extract!($a),
      $crate::sw_extract!($b),
      $crate::sw_extract!($c),
      $crate::sw_extract!($d),
    ])
  };
}

#[doc(hidden)]
#[macro_export]
macro_rules! sw_extract {
  (x) => {
    $crate::swizzle::SwizzleSelector::X
  };

  (r) => {
    $crate::swizzle::SwizzleSelector::X
  };

  (y) => {
    $crate::swizzle::SwizzleSelector::Y
  };

  (g) => {
    $crate::swizzle::SwizzleSelector::Y
  };

  (z) => {
    $crate::swizzle::SwizzleSelector::Z
  };

  (b) => {
    $crate::swizzle::SwizzleSelector::Z
  };

  (w) => {
    $crate::swizzle::SwizzleSelector::W
  };

  (a) => {
    $crate::swizzle::SwizzleSelector::W
  };
}

#[cfg(test)]
mod test {
  use crate::{
    lit,
    scope::{Scope, ScopedHandle},
  };

  use super::*;

  #[test]
  fn swizzling() {
    let mut scope = Scope::<()>::new(0);
    let foo = scope.var(lit![1, 2]);
    let foo_xy: Expr<V2<_>> = sw!(foo, .x.y);
    let foo_xxx: Expr<V3<_>> = sw!(foo, .x.x.x);

    assert_eq!(
      foo_xy.erased,
      ErasedExpr::Swizzle(
        Box::new(ErasedExpr::Var(ScopedHandle::fun_var(0, 0))),
        Swizzle::D2(SwizzleSelector::X, SwizzleSelector::Y),
      )
    );

    assert_eq!(
      foo_xxx.erased,
      ErasedExpr::Swizzle(
        Box::new(ErasedExpr::Var(ScopedHandle::fun_var(0, 0))),
        Swizzle::D3(SwizzleSelector::X, SwizzleSelector::X, SwizzleSelector::X),
      )
    );
  }

  #[test]
  fn shorthands() {
    let xyzw: Expr<V4<i32>> = lit![1, 2, 3, 4];

    assert_eq!(xyzw.x().erased, sw!(xyzw, .x).erased);
    assert_eq!(xyzw.a().erased, sw!(xyzw, .w).erased);
    assert_eq!(xyzw.xy().erased, sw!(xyzw, .x.y).erased);
    assert_eq!(xyzw.zw().erased, sw!(xyzw, .z.w).erased);
    assert_eq!(xyzw.rgb().erased, sw!(xyzw, .x.y.z).erased);
  }
}
