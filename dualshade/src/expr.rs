use crate::{
  builtin::BuiltIn,
  error::Error,
  fun::ErasedFunHandle,
  scope::ScopedHandle,
  swizzle::Swizzle,
  types::{ToType, Type, M22, M33, M43, M44, V2, V3, V4},
  var::Var,
  writer,
};
use std::{marker::PhantomData, ops};

/// Representation of an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ErasedExpr {
  // scalars
  LitInt(i32),
  LitUInt(u32),
  LitFloat(f32),
  LitBool(bool),
  // vectors
  LitInt2([i32; 2]),
  LitUInt2([u32; 2]),
  LitFloat2([f32; 2]),
  LitBool2([bool; 2]),
  LitInt3([i32; 3]),
  LitUInt3([u32; 3]),
  LitFloat3([f32; 3]),
  LitBool3([bool; 3]),
  LitInt4([i32; 4]),
  LitUInt4([u32; 4]),
  LitFloat4([f32; 4]),
  LitBool4([bool; 4]),
  // matrices
  LitM22(M22),
  LitM33(M33),
  LitM44(M44),
  LitM43(M43),
  // arrays
  Array(Type, Vec<ErasedExpr>),
  // var
  Var(ScopedHandle),
  // built-in functions and operators
  Not(Box<Self>),
  And(Box<Self>, Box<Self>),
  Or(Box<Self>, Box<Self>),
  Xor(Box<Self>, Box<Self>),
  BitOr(Box<Self>, Box<Self>),
  BitAnd(Box<Self>, Box<Self>),
  BitXor(Box<Self>, Box<Self>),
  Neg(Box<Self>),
  Add(Box<Self>, Box<Self>),
  Sub(Box<Self>, Box<Self>),
  Mul(Box<Self>, Box<Self>),
  Div(Box<Self>, Box<Self>),
  Rem(Box<Self>, Box<Self>),
  Shl(Box<Self>, Box<Self>),
  Shr(Box<Self>, Box<Self>),
  Eq(Box<Self>, Box<Self>),
  Neq(Box<Self>, Box<Self>),
  Lt(Box<Self>, Box<Self>),
  Lte(Box<Self>, Box<Self>),
  Gt(Box<Self>, Box<Self>),
  Gte(Box<Self>, Box<Self>),
  // function call
  FunCall(ErasedFunHandle, Vec<Self>),
  // swizzle
  Swizzle(Box<Self>, Swizzle),
  // field access on a struct value, as in `camera.view`
  Field { object: Box<Self>, field: String },
  ArrayLookup { object: Box<Self>, index: Box<Self> },
}

impl ErasedExpr {
  pub(crate) const fn new_builtin(builtin: BuiltIn) -> Self {
    ErasedExpr::Var(ScopedHandle::builtin(builtin))
  }

  pub(crate) fn add(a: Self, b: Self) -> Self {
    ErasedExpr::Add(Box::new(a), Box::new(b))
  }

  pub(crate) fn sub(a: Self, b: Self) -> Self {
    ErasedExpr::Sub(Box::new(a), Box::new(b))
  }

  /// Multiplication; a literal `-1` on either side turns into a negation of the other side.
  pub(crate) fn mul(a: Self, b: Self) -> Self {
    if b.is_minus_one() {
      ErasedExpr::Neg(Box::new(a))
    } else if a.is_minus_one() {
      ErasedExpr::Neg(Box::new(b))
    } else {
      ErasedExpr::Mul(Box::new(a), Box::new(b))
    }
  }

  pub(crate) fn div(a: Self, b: Self) -> Self {
    ErasedExpr::Div(Box::new(a), Box::new(b))
  }

  pub(crate) fn rem(a: Self, b: Self) -> Self {
    ErasedExpr::Rem(Box::new(a), Box::new(b))
  }

  /// Floating-point remainder, which is a function in GLSL.
  pub(crate) fn fmod(a: Self, b: Self) -> Self {
    ErasedExpr::FunCall(ErasedFunHandle::Mod, vec![a, b])
  }

  pub(crate) fn bit_or(a: Self, b: Self) -> Self {
    ErasedExpr::BitOr(Box::new(a), Box::new(b))
  }

  pub(crate) fn bit_and(a: Self, b: Self) -> Self {
    ErasedExpr::BitAnd(Box::new(a), Box::new(b))
  }

  pub(crate) fn bit_xor(a: Self, b: Self) -> Self {
    ErasedExpr::BitXor(Box::new(a), Box::new(b))
  }

  pub(crate) fn shl(a: Self, b: Self) -> Self {
    ErasedExpr::Shl(Box::new(a), Box::new(b))
  }

  pub(crate) fn shr(a: Self, b: Self) -> Self {
    ErasedExpr::Shr(Box::new(a), Box::new(b))
  }

  fn is_minus_one(&self) -> bool {
    match self {
      ErasedExpr::LitInt(x) => *x == -1,
      ErasedExpr::LitFloat(x) => *x == -1.,
      ErasedExpr::LitInt2(v) => v.iter().all(|x| *x == -1),
      ErasedExpr::LitInt3(v) => v.iter().all(|x| *x == -1),
      ErasedExpr::LitInt4(v) => v.iter().all(|x| *x == -1),
      ErasedExpr::LitFloat2(v) => v.iter().all(|x| *x == -1.),
      ErasedExpr::LitFloat3(v) => v.iter().all(|x| *x == -1.),
      ErasedExpr::LitFloat4(v) => v.iter().all(|x| *x == -1.),
      _ => false,
    }
  }

  /// Direct children of this node.
  ///
  /// Every node that shows up in the rendered text of this node is listed here, so walking this relation recursively
  /// reaches every variable the expression reads.
  pub fn dependencies(&self) -> Vec<&ErasedExpr> {
    match self {
      ErasedExpr::Array(_, items) => items.iter().collect(),
      ErasedExpr::FunCall(_, args) => args.iter().collect(),

      ErasedExpr::Not(a) | ErasedExpr::Neg(a) => vec![a.as_ref()],

      ErasedExpr::And(a, b)
      | ErasedExpr::Or(a, b)
      | ErasedExpr::Xor(a, b)
      | ErasedExpr::BitOr(a, b)
      | ErasedExpr::BitAnd(a, b)
      | ErasedExpr::BitXor(a, b)
      | ErasedExpr::Add(a, b)
      | ErasedExpr::Sub(a, b)
      | ErasedExpr::Mul(a, b)
      | ErasedExpr::Div(a, b)
      | ErasedExpr::Rem(a, b)
      | ErasedExpr::Shl(a, b)
      | ErasedExpr::Shr(a, b)
      | ErasedExpr::Eq(a, b)
      | ErasedExpr::Neq(a, b)
      | ErasedExpr::Lt(a, b)
      | ErasedExpr::Lte(a, b)
      | ErasedExpr::Gt(a, b)
      | ErasedExpr::Gte(a, b) => vec![a.as_ref(), b.as_ref()],

      ErasedExpr::Swizzle(object, _) | ErasedExpr::Field { object, .. } => vec![object.as_ref()],
      ErasedExpr::ArrayLookup { object, index } => vec![object.as_ref(), index.as_ref()],

      _ => Vec::new(),
    }
  }

  /// Handle of the variable this expression ultimately refers to, looking through swizzles, field accesses and array
  /// lookups.
  pub(crate) fn root_handle(&self) -> Option<&ScopedHandle> {
    match self {
      ErasedExpr::Var(handle) => Some(handle),
      ErasedExpr::Swizzle(object, _)
      | ErasedExpr::Field { object, .. }
      | ErasedExpr::ArrayLookup { object, .. } => object.root_handle(),
      _ => None,
    }
  }
}

/// Expression representation.
///
/// An expression is anything that carries a (typed) value and that can be combined in various ways with other
/// expressions. A literal, a constant or a variable are all expressions. The sum (as in `a + b`) of two expressions is
/// also an expression. A function call returning an expression is also an expression, as in `a * sin(b)`. Accessing an
/// element in an array via an index is also an expression, e.g. `levels[y * HEIGHT + x] * size`. The same thing
/// applies to field access, swizzling, etc. etc.
///
/// Expressions are side effect free, so a variable, for instance, can either be considered as an expression or not.
/// If `x` is a variable (see [`Var`]), then `x * 10` is an expression, but using `x` to mutate its content does not
/// make a use of `x` as an expression.
///
/// # Literals
///
/// The most obvious kind of expression is a literal, such as `1`, `false` or `3.14`. Any type `T` that defines an
/// implementor `From<T> for Expr<T>` can be used as literal. The [`lit!`](crate::lit) macro does the lifting for
/// you and accepts more forms, such as scalar vectors.
///
/// Because of how Rust infers types, type ambiguities might occur when using literals. In `1 + 2`, the type of `1` is
/// ambiguous because of how the implementors for [`Add`](std::ops::Add) are picked; use [`lit!`](crate::lit) there.
///
/// ## Automatic lifting
///
/// If `x` has the type `Expr<i32>`, then `x + 1` is the same as `x + lit!(1)`. That automatic lifting is valid for a
/// lot of traits and methods throughout this crate.
///
/// # Rendering
///
/// Every expression renders in both target languages without any stage context, see [`Expr::to_glsl`] and
/// [`Expr::to_wgsl`]. Stage-dependent handles (built-ins, varyings, outputs) render with their bare names there; the
/// entry point writers resolve them properly.
#[derive(Debug)]
pub struct Expr<T>
where
  T: ?Sized,
{
  pub(crate) erased: ErasedExpr,
  _phantom: PhantomData<T>,
}

impl<T> From<&'_ Self> for Expr<T>
where
  T: ?Sized,
{
  fn from(e: &Self) -> Self {
    Self::new(e.erased.clone())
  }
}

impl<T> Clone for Expr<T>
where
  T: ?Sized,
{
  fn clone(&self) -> Self {
    Self::new(self.erased.clone())
  }
}

impl<T> Expr<T>
where
  T: ?Sized,
{
  /// Type an [`ErasedExpr`] and return it wrapped in [`Expr<T>`].
  pub(crate) const fn new(erased: ErasedExpr) -> Self {
    Self {
      erased,
      _phantom: PhantomData,
    }
  }

  /// Untyped representation of this expression.
  pub fn erased(&self) -> &ErasedExpr {
    &self.erased
  }

  /// Render this expression as GLSL.
  ///
  /// # Errors
  ///
  /// Only fails if formatting fails.
  pub fn to_glsl(&self) -> Result<String, Error> {
    writer::glsl::expr_to_string(&self.erased)
  }

  /// Render this expression as WGSL.
  ///
  /// # Errors
  ///
  /// Only fails if formatting fails.
  pub fn to_wgsl(&self) -> Result<String, Error> {
    writer::wgsl::expr_to_string(&self.erased)
  }

  /// Equality expression.
  ///
  /// This method builds an expression representing the equality between two expressions.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::{lit, vec2};
  ///
  /// let _ = lit!(1).eq(1); // 1 == 1;
  /// let _ = vec2!(1., 2.).eq(vec2!(0., 0.)); // vec2(1., 2.) == vec2(0., 0.)
  /// ```
  pub fn eq(&self, rhs: impl Into<Expr<T>>) -> Expr<bool> {
    Expr::new(ErasedExpr::Eq(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }

  /// Inequality expression.
  ///
  /// This method builds an expression representing the inequality between two expressions.
  pub fn neq(&self, rhs: impl Into<Expr<T>>) -> Expr<bool> {
    Expr::new(ErasedExpr::Neq(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }
}

impl<T> Expr<T>
where
  T: PartialOrd,
{
  /// Less-than expression, `a < b`.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::lit;
  ///
  /// let _ = lit!(1).lt(2); // 1 < 2;
  /// ```
  pub fn lt(&self, rhs: impl Into<Expr<T>>) -> Expr<bool> {
    Expr::new(ErasedExpr::Lt(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }

  /// Less-than-or-equal expression, `a <= b`.
  pub fn lte(&self, rhs: impl Into<Expr<T>>) -> Expr<bool> {
    Expr::new(ErasedExpr::Lte(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }

  /// Greater-than expression, `a > b`.
  pub fn gt(&self, rhs: impl Into<Expr<T>>) -> Expr<bool> {
    Expr::new(ErasedExpr::Gt(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }

  /// Greater-than-or-equal expression, `a >= b`.
  pub fn gte(&self, rhs: impl Into<Expr<T>>) -> Expr<bool> {
    Expr::new(ErasedExpr::Gte(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }
}

impl Expr<bool> {
  /// Logical _and_ expression, `a && b`.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::lit;
  ///
  /// let _ = lit!(true).and(false); // true && false
  /// ```
  pub fn and(&self, rhs: impl Into<Expr<bool>>) -> Expr<bool> {
    Expr::new(ErasedExpr::And(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }

  /// Logical _or_ expression, `a || b`.
  pub fn or(&self, rhs: impl Into<Expr<bool>>) -> Expr<bool> {
    Expr::new(ErasedExpr::Or(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }

  /// Logical _exclusive or_ expression.
  ///
  /// Rendered `a ^^ b` in GLSL and `a != b` in WGSL, which has no logical xor.
  pub fn xor(&self, rhs: impl Into<Expr<bool>>) -> Expr<bool> {
    Expr::new(ErasedExpr::Xor(
      Box::new(self.erased.clone()),
      Box::new(rhs.into().erased),
    ))
  }
}

impl<T, const N: usize> Expr<[T; N]> {
  /// Array lookup.
  ///
  /// The expression `a.at(i)` represents an _array lookup_, where `a` is an array and `i` is an [`Expr<i32>`], either
  /// a literal or any dynamic expression.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::lit;
  ///
  /// let _ = lit!([1, 2, 3]).at(2); // [1, 2, 3][2]
  /// ```
  pub fn at(&self, index: impl Into<Expr<i32>>) -> Expr<T> {
    Expr::new(ErasedExpr::ArrayLookup {
      object: Box::new(self.erased.clone()),
      index: Box::new(index.into().erased),
    })
  }
}

/// An expression which type is only known at runtime.
///
/// Mostly used as argument of dynamic constructors, such as [`Expr::construct`].
#[derive(Clone, Debug, PartialEq)]
pub struct AnyExpr {
  pub(crate) ty: Type,
  pub(crate) erased: ErasedExpr,
}

impl AnyExpr {
  /// Type of the expression.
  pub fn ty(&self) -> &Type {
    &self.ty
  }

  /// Untyped representation of the expression.
  pub fn erased(&self) -> &ErasedExpr {
    &self.erased
  }
}

impl<T> From<Expr<T>> for AnyExpr
where
  T: ToType,
{
  fn from(e: Expr<T>) -> Self {
    AnyExpr {
      ty: T::ty(),
      erased: e.erased,
    }
  }
}

impl<'a, T> From<&'a Expr<T>> for AnyExpr
where
  T: ToType,
{
  fn from(e: &'a Expr<T>) -> Self {
    AnyExpr {
      ty: T::ty(),
      erased: e.erased.clone(),
    }
  }
}

impl<'a, T> From<&'a Var<T>> for AnyExpr
where
  T: ToType,
{
  fn from(v: &'a Var<T>) -> Self {
    AnyExpr::from(&v.0)
  }
}

// not
macro_rules! impl_Not_Expr {
  ($t:ty) => {
    impl ops::Not for Expr<$t> {
      type Output = Self;

      fn not(self) -> Self::Output {
        Expr::new(ErasedExpr::Not(Box::new(self.erased)))
      }
    }

    impl<'a> ops::Not for &'a Expr<$t> {
      type Output = Expr<$t>;

      fn not(self) -> Self::Output {
        Expr::new(ErasedExpr::Not(Box::new(self.erased.clone())))
      }
    }

    impl ops::Not for Var<$t> {
      type Output = Expr<$t>;

      fn not(self) -> Self::Output {
        Expr::new(ErasedExpr::Not(Box::new(self.0.erased)))
      }
    }

    impl<'a> ops::Not for &'a Var<$t> {
      type Output = Expr<$t>;

      fn not(self) -> Self::Output {
        Expr::new(ErasedExpr::Not(Box::new(self.0.erased.clone())))
      }
    }
  };
}

impl_Not_Expr!(bool);
impl_Not_Expr!(V2<bool>);
impl_Not_Expr!(V3<bool>);
impl_Not_Expr!(V4<bool>);

// neg
macro_rules! impl_Neg {
  ($t:ty) => {
    impl ops::Neg for Expr<$t> {
      type Output = Self;

      fn neg(self) -> Self::Output {
        Expr::new(ErasedExpr::Neg(Box::new(self.erased)))
      }
    }

    impl<'a> ops::Neg for &'a Expr<$t> {
      type Output = Expr<$t>;

      fn neg(self) -> Self::Output {
        Expr::new(ErasedExpr::Neg(Box::new(self.erased.clone())))
      }
    }

    impl ops::Neg for Var<$t> {
      type Output = Expr<$t>;

      fn neg(self) -> Self::Output {
        Expr::new(ErasedExpr::Neg(Box::new(self.0.erased)))
      }
    }

    impl<'a> ops::Neg for &'a Var<$t> {
      type Output = Expr<$t>;

      fn neg(self) -> Self::Output {
        Expr::new(ErasedExpr::Neg(Box::new(self.0.erased.clone())))
      }
    }
  };
}

impl_Neg!(i32);
impl_Neg!(V2<i32>);
impl_Neg!(V3<i32>);
impl_Neg!(V4<i32>);

impl_Neg!(f32);
impl_Neg!(V2<f32>);
impl_Neg!(V3<f32>);
impl_Neg!(V4<f32>);

// binary arithmetic and logical (+, -, *, /, %)
//
// $ctor is the ErasedExpr constructor function building the node out of both operands
macro_rules! impl_binop_Expr {
  ($op:ident, $meth_name:ident, $ctor:ident, $a:ty, $b:ty) => {
    impl_binop_Expr!($op, $meth_name, $ctor, $a, $b, $a);
  };

  ($op:ident, $meth_name:ident, $ctor:ident, $a:ty, $b:ty, $r:ty) => {
    // expr OP expr
    impl ops::$op<Expr<$b>> for Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: Expr<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased, rhs.erased))
      }
    }

    // var OP expr
    impl ops::$op<Expr<$b>> for Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: Expr<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.0.erased, rhs.erased))
      }
    }

    // expr OP var
    impl ops::$op<Var<$b>> for Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: Var<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased, rhs.0.erased))
      }
    }

    // var OP var
    impl ops::$op<Var<$b>> for Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: Var<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.0.erased, rhs.0.erased))
      }
    }

    // expr OP &expr
    impl<'a> ops::$op<&'a Expr<$b>> for Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: &'a Expr<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased, rhs.erased.clone()))
      }
    }

    // var OP &expr
    impl<'a> ops::$op<&'a Expr<$b>> for Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: &'a Expr<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.0.erased, rhs.erased.clone()))
      }
    }

    // expr OP &var
    impl<'a> ops::$op<&'a Var<$b>> for Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: &'a Var<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased, rhs.0.erased.clone()))
      }
    }

    // var OP &var
    impl<'a> ops::$op<&'a Var<$b>> for Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: &'a Var<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.0.erased, rhs.0.erased.clone()))
      }
    }

    // &expr OP expr
    impl<'a> ops::$op<Expr<$b>> for &'a Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: Expr<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased.clone(), rhs.erased))
      }
    }

    // &var OP expr
    impl<'a> ops::$op<Expr<$b>> for &'a Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: Expr<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.0.erased.clone(), rhs.erased))
      }
    }

    // &expr OP var
    impl<'a> ops::$op<Var<$b>> for &'a Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: Var<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased.clone(), rhs.0.erased))
      }
    }

    // &var OP var
    impl<'a> ops::$op<Var<$b>> for &'a Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: Var<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.0.erased.clone(), rhs.0.erased))
      }
    }

    // &expr OP &expr
    impl<'a> ops::$op<&'a Expr<$b>> for &'a Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: &'a Expr<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased.clone(), rhs.erased.clone()))
      }
    }

    // &var OP &expr
    impl<'a> ops::$op<&'a Expr<$b>> for &'a Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: &'a Expr<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.0.erased.clone(), rhs.erased.clone()))
      }
    }

    // &expr OP &var
    impl<'a> ops::$op<&'a Var<$b>> for &'a Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: &'a Var<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased.clone(), rhs.0.erased.clone()))
      }
    }

    // &var OP &var
    impl<'a> ops::$op<&'a Var<$b>> for &'a Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: &'a Var<$b>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(
          self.0.erased.clone(),
          rhs.0.erased.clone(),
        ))
      }
    }

    // expr OP t, where t is automatically lifted
    impl ops::$op<$b> for Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: $b) -> Self::Output {
        let rhs = Expr::<$b>::from(rhs);
        Expr::new(ErasedExpr::$ctor(self.erased, rhs.erased))
      }
    }

    // var OP t, where t is automatically lifted
    impl ops::$op<$b> for Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: $b) -> Self::Output {
        let rhs = Expr::<$b>::from(rhs);
        Expr::new(ErasedExpr::$ctor(self.0.erased, rhs.erased))
      }
    }

    // &expr OP t, where t is automatically lifted
    impl<'a> ops::$op<$b> for &'a Expr<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: $b) -> Self::Output {
        let rhs = Expr::<$b>::from(rhs);
        Expr::new(ErasedExpr::$ctor(self.erased.clone(), rhs.erased))
      }
    }

    // &var OP t, where t is automatically lifted
    impl<'a> ops::$op<$b> for &'a Var<$a> {
      type Output = Expr<$r>;

      fn $meth_name(self, rhs: $b) -> Self::Output {
        let rhs = Expr::<$b>::from(rhs);
        Expr::new(ErasedExpr::$ctor(self.0.erased.clone(), rhs.erased))
      }
    }
  };
}

// bitwise or, and, xor; logical operators on booleans are Expr::and, Expr::or and Expr::xor
impl_binop_Expr!(BitOr, bitor, bit_or, i32, i32);
impl_binop_Expr!(BitOr, bitor, bit_or, u32, u32);

impl_binop_Expr!(BitAnd, bitand, bit_and, i32, i32);
impl_binop_Expr!(BitAnd, bitand, bit_and, u32, u32);

impl_binop_Expr!(BitXor, bitxor, bit_xor, i32, i32);
impl_binop_Expr!(BitXor, bitxor, bit_xor, u32, u32);

/// Run a macro on all supported types to generate the impl for them.
macro_rules! impl_binarith_Expr {
  ($op:ident, $meth_name:ident, $ctor:ident) => {
    impl_binop_Expr!($op, $meth_name, $ctor, i32, i32);
    impl_binop_Expr!($op, $meth_name, $ctor, V2<i32>, V2<i32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V2<i32>, i32);
    impl_binop_Expr!($op, $meth_name, $ctor, V3<i32>, V3<i32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V3<i32>, i32);
    impl_binop_Expr!($op, $meth_name, $ctor, V4<i32>, V4<i32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V4<i32>, i32);

    impl_binop_Expr!($op, $meth_name, $ctor, u32, u32);
    impl_binop_Expr!($op, $meth_name, $ctor, V2<u32>, V2<u32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V2<u32>, u32);
    impl_binop_Expr!($op, $meth_name, $ctor, V3<u32>, V3<u32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V3<u32>, u32);
    impl_binop_Expr!($op, $meth_name, $ctor, V4<u32>, V4<u32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V4<u32>, u32);

    impl_binop_Expr!($op, $meth_name, $ctor, f32, f32);
    impl_binop_Expr!($op, $meth_name, $ctor, V2<f32>, V2<f32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V2<f32>, f32);
    impl_binop_Expr!($op, $meth_name, $ctor, V3<f32>, V3<f32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V3<f32>, f32);
    impl_binop_Expr!($op, $meth_name, $ctor, V4<f32>, V4<f32>);
    impl_binop_Expr!($op, $meth_name, $ctor, V4<f32>, f32);
  };
}

impl_binarith_Expr!(Add, add, add);
impl_binarith_Expr!(Sub, sub, sub);
impl_binarith_Expr!(Mul, mul, mul);
impl_binarith_Expr!(Div, div, div);

impl_binop_Expr!(Rem, rem, rem, i32, i32);
impl_binop_Expr!(Rem, rem, rem, V2<i32>, V2<i32>);
impl_binop_Expr!(Rem, rem, rem, V3<i32>, V3<i32>);
impl_binop_Expr!(Rem, rem, rem, V4<i32>, V4<i32>);
impl_binop_Expr!(Rem, rem, rem, u32, u32);
impl_binop_Expr!(Rem, rem, rem, V2<u32>, V2<u32>);
impl_binop_Expr!(Rem, rem, rem, V3<u32>, V3<u32>);
impl_binop_Expr!(Rem, rem, rem, V4<u32>, V4<u32>);

impl_binop_Expr!(Rem, rem, fmod, f32, f32);
impl_binop_Expr!(Rem, rem, fmod, V2<f32>, V2<f32>);
impl_binop_Expr!(Rem, rem, fmod, V2<f32>, f32);
impl_binop_Expr!(Rem, rem, fmod, V3<f32>, V3<f32>);
impl_binop_Expr!(Rem, rem, fmod, V3<f32>, f32);
impl_binop_Expr!(Rem, rem, fmod, V4<f32>, V4<f32>);
impl_binop_Expr!(Rem, rem, fmod, V4<f32>, f32);

impl_binop_Expr!(Mul, mul, mul, M22, M22);
impl_binop_Expr!(Mul, mul, mul, M22, V2<f32>, V2<f32>);
impl_binop_Expr!(Mul, mul, mul, V2<f32>, M22, V2<f32>);
impl_binop_Expr!(Mul, mul, mul, M33, M33);
impl_binop_Expr!(Mul, mul, mul, M33, V3<f32>, V3<f32>);
impl_binop_Expr!(Mul, mul, mul, V3<f32>, M33, V3<f32>);
impl_binop_Expr!(Mul, mul, mul, M44, M44);
impl_binop_Expr!(Mul, mul, mul, M44, V4<f32>, V4<f32>);
impl_binop_Expr!(Mul, mul, mul, V4<f32>, M44, V4<f32>);
impl_binop_Expr!(Mul, mul, mul, M43, V4<f32>, V3<f32>);
impl_binop_Expr!(Mul, mul, mul, M43, M44, M43);

macro_rules! impl_binshift_Expr {
  ($op:ident, $meth_name:ident, $ctor:ident, $ty:ty) => {
    // expr OP expr
    impl ops::$op<Expr<u32>> for Expr<$ty> {
      type Output = Expr<$ty>;

      fn $meth_name(self, rhs: Expr<u32>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased, rhs.erased))
      }
    }

    impl<'a> ops::$op<Expr<u32>> for &'a Expr<$ty> {
      type Output = Expr<$ty>;

      fn $meth_name(self, rhs: Expr<u32>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased.clone(), rhs.erased))
      }
    }

    impl<'a> ops::$op<&'a Expr<u32>> for Expr<$ty> {
      type Output = Expr<$ty>;

      fn $meth_name(self, rhs: &'a Expr<u32>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased, rhs.erased.clone()))
      }
    }

    impl<'a> ops::$op<&'a Expr<u32>> for &'a Expr<$ty> {
      type Output = Expr<$ty>;

      fn $meth_name(self, rhs: &'a Expr<u32>) -> Self::Output {
        Expr::new(ErasedExpr::$ctor(self.erased.clone(), rhs.erased.clone()))
      }
    }

    // expr OP bits
    impl ops::$op<u32> for Expr<$ty> {
      type Output = Self;

      fn $meth_name(self, rhs: u32) -> Self::Output {
        let rhs = Expr::from(rhs);
        Expr::new(ErasedExpr::$ctor(self.erased, rhs.erased))
      }
    }

    impl<'a> ops::$op<u32> for &'a Expr<$ty> {
      type Output = Expr<$ty>;

      fn $meth_name(self, rhs: u32) -> Self::Output {
        let rhs = Expr::from(rhs);
        Expr::new(ErasedExpr::$ctor(self.erased.clone(), rhs.erased))
      }
    }
  };
}

/// Binary shift generating macro.
macro_rules! impl_binshifts_Expr {
  ($op:ident, $meth_name:ident, $ctor:ident) => {
    impl_binshift_Expr!($op, $meth_name, $ctor, i32);
    impl_binshift_Expr!($op, $meth_name, $ctor, V2<i32>);
    impl_binshift_Expr!($op, $meth_name, $ctor, V3<i32>);
    impl_binshift_Expr!($op, $meth_name, $ctor, V4<i32>);

    impl_binshift_Expr!($op, $meth_name, $ctor, u32);
    impl_binshift_Expr!($op, $meth_name, $ctor, V2<u32>);
    impl_binshift_Expr!($op, $meth_name, $ctor, V3<u32>);
    impl_binshift_Expr!($op, $meth_name, $ctor, V4<u32>);
  };
}

impl_binshifts_Expr!(Shl, shl, shl);
impl_binshifts_Expr!(Shr, shr, shr);

macro_rules! impl_From_Expr_scalar {
  ($t:ty, $q:ident) => {
    impl Expr<$t> {
      pub const fn lit(a: $t) -> Expr<$t> {
        Self::new(ErasedExpr::$q(a))
      }
    }

    impl From<$t> for Expr<$t> {
      fn from(a: $t) -> Self {
        Self::lit(a)
      }
    }

    impl<'a> From<&'a $t> for Expr<$t> {
      fn from(a: &'a $t) -> Self {
        Self::lit(*a)
      }
    }
  };
}

impl_From_Expr_scalar!(i32, LitInt);
impl_From_Expr_scalar!(u32, LitUInt);
impl_From_Expr_scalar!(f32, LitFloat);
impl_From_Expr_scalar!(bool, LitBool);

macro_rules! impl_From_Expr_vn {
  ($t:ty, $q:ident) => {
    impl Expr<$t> {
      pub const fn lit(a: $t) -> Expr<$t> {
        Self::new(ErasedExpr::$q(a.0))
      }
    }

    impl From<$t> for Expr<$t> {
      fn from(a: $t) -> Self {
        Self::lit(a)
      }
    }

    impl<'a> From<&'a $t> for Expr<$t> {
      fn from(a: &'a $t) -> Self {
        Self::lit(*a)
      }
    }
  };
}

impl_From_Expr_vn!(V2<i32>, LitInt2);
impl_From_Expr_vn!(V2<u32>, LitUInt2);
impl_From_Expr_vn!(V2<f32>, LitFloat2);
impl_From_Expr_vn!(V2<bool>, LitBool2);
impl_From_Expr_vn!(V3<i32>, LitInt3);
impl_From_Expr_vn!(V3<u32>, LitUInt3);
impl_From_Expr_vn!(V3<f32>, LitFloat3);
impl_From_Expr_vn!(V3<bool>, LitBool3);
impl_From_Expr_vn!(V4<i32>, LitInt4);
impl_From_Expr_vn!(V4<u32>, LitUInt4);
impl_From_Expr_vn!(V4<f32>, LitFloat4);
impl_From_Expr_vn!(V4<bool>, LitBool4);

impl<T, const N: usize> From<[T; N]> for Expr<[T; N]>
where
  Expr<T>: From<T>,
  T: ToType,
{
  fn from(array: [T; N]) -> Self {
    let array = array.into_iter().map(|t| Expr::from(t).erased).collect();
    Self::new(ErasedExpr::Array(<[T; N] as ToType>::ty(), array))
  }
}

impl<'a, T, const N: usize> From<&'a [T; N]> for Expr<[T; N]>
where
  Expr<T>: From<T>,
  T: Clone + ToType,
{
  fn from(array: &'a [T; N]) -> Self {
    let array = array
      .iter()
      .cloned()
      .map(|t| Expr::from(t).erased)
      .collect();
    Self::new(ErasedExpr::Array(<[T; N] as ToType>::ty(), array))
  }
}

impl<T, const N: usize> From<[Expr<T>; N]> for Expr<[T; N]>
where
  T: ToType,
{
  fn from(array: [Expr<T>; N]) -> Self {
    let array = array.into_iter().map(|e| e.erased).collect();
    Self::new(ErasedExpr::Array(<[T; N] as ToType>::ty(), array))
  }
}

impl<'a, T, const N: usize> From<&'a [Expr<T>; N]> for Expr<[T; N]>
where
  T: ToType,
{
  fn from(array: &'a [Expr<T>; N]) -> Self {
    let array = array.iter().map(|e| e.erased.clone()).collect();
    Self::new(ErasedExpr::Array(<[T; N] as ToType>::ty(), array))
  }
}

/// Create various forms of literal expressions.
///
/// This macro allows you to create _literal expressions_ by lifting Rust constants into the EDSL. The way this is done
/// is via several forms:
///
/// - `lit!(x)` lifts a single Rust expression into the EDSL. It’s isomorphic to `Expr::from(x)`.
/// - `lit!(x, y)` lifts two Rust expressions into the EDSL as a 2D scalar vector. It’s isomorphic to
///   `Expr::from(V2::from([x, y]))`.
/// - `lit!(x, y, z)` lifts three Rust expressions into the EDSL as a 3D scalar vector.
/// - `lit!(x, y, z, w)` lifts four Rust expressions into the EDSL as a 4D scalar vector.
/// - `lit!([a, b, …])` lifts an array.
///
/// # Examples
///
/// ```
/// use dualshade::lit;
///
/// let _ = lit!(1);
/// let _ = lit!(false);
/// let _ = lit!(1., 2., 3., 4.);
/// ```
#[macro_export]
macro_rules! lit {
  ($e:expr) => {
    $crate::expr::Expr::from($e)
  };

  ($a:expr, $b:expr) => {
    $crate::expr::Expr::from($crate::types::V2::from([$a, $b]))
  };

  ($a:expr, $b:expr, $c:expr) => {
    $crate::expr::Expr::from($crate::types::V3::from([$a, $b, $c]))
  };

  ($a:expr, $b:expr, $c:expr, $d:expr) => {
    $crate::expr::Expr::from($crate::types::V4::from([$a, $b, $c, $d]))
  };

  ([ $($item:expr),* ]) => {
    $crate::expr::Expr::from([ $($item),* ])
  }
}

/// Create 2D scalar vectors via different forms.
///
/// - `vec2!(x)`, which splats `x` on both components.
/// - `vec2!(x, y)`, which builds a [`V2<T>`](crate::types::V2) for `x: T` and `y: T`.
///
/// # Examples
///
/// ```
/// use dualshade::vec2;
///
/// let _ = vec2!(1, 2);
/// ```
#[macro_export]
macro_rules! vec2 {
  ($a:expr) => {{
    use $crate::types::Vec2 as _;
    $crate::expr::Expr::vec2($crate::expr::Expr::from(&$a))
  }};

  ($xy:expr, $z:expr) => {{
    use $crate::types::Vec2 as _;
    $crate::expr::Expr::vec2((
      $crate::expr::Expr::from(&$xy),
      $crate::expr::Expr::from(&$z),
    ))
  }};
}

/// Create 3D scalar vectors via different forms.
///
/// - `vec3!(x)`, which splats `x` on every component.
/// - `vec3!(xy, z)`, which builds a [`V3<T>`](crate::types::V3) with `xy` a value that can be turned into a
///   `Expr<V2<T>>` and `z: T`.
/// - `vec3!(x, y, z)`, which builds a [`V3<T>`](crate::types::V3) for `x: T`, `y: T` and `z: T`.
///
/// # Examples
///
/// ```
/// use dualshade::{vec2, vec3};
///
/// let _ = vec3!(1, 2, 3);
/// let _ = vec3!(vec2!(1, 2), 3);
/// ```
#[macro_export]
macro_rules! vec3 {
  ($a:expr) => {{
    use $crate::types::Vec3 as _;
    $crate::expr::Expr::vec3($crate::expr::Expr::from(&$a))
  }};

  ($xy:expr, $z:expr) => {{
    use $crate::types::Vec3 as _;
    $crate::expr::Expr::vec3((
      $crate::expr::Expr::from(&$xy),
      $crate::expr::Expr::from(&$z),
    ))
  }};

  ($x:expr, $y:expr, $z:expr) => {{
    use $crate::types::Vec3 as _;
    $crate::expr::Expr::vec3((
      $crate::expr::Expr::from(&$x),
      $crate::expr::Expr::from(&$y),
      $crate::expr::Expr::from(&$z),
    ))
  }};
}

/// Create 4D scalar vectors via different forms.
///
/// - `vec4!(x)`, which splats `x` on every component.
/// - `vec4!(xyz, w)`, which builds a [`V4<T>`](crate::types::V4) with `xyz` a value that can be turned into a
///   `Expr<V3<T>>` and `w: T`.
/// - `vec4!(xy, zw)`, which builds a [`V4<T>`](crate::types::V4) with `xy` and `zw` values that can be turned into
///   `Expr<V2<T>>`.
/// - `vec4!(xy, z, w)`, which builds a [`V4<T>`](crate::types::V4) with `xy`, `z: T` and `w: T`.
/// - `vec4!(x, y, z, w)`, which builds a [`V4<T>`](crate::types::V4) out of four scalars.
///
/// # Examples
///
/// ```
/// use dualshade::{vec2, vec3, vec4};
///
/// let _ = vec4!(1, 2, 3, 4);
/// let _ = vec4!(vec3!(1, 2, 3), 4);
/// let _ = vec4!(vec2!(1, 2), vec2!(3, 4));
/// let _ = vec4!(vec2!(1, 2), 3, 4);
/// ```
#[macro_export]
macro_rules! vec4 {
  ($a:expr) => {{
    use $crate::types::Vec4 as _;
    $crate::expr::Expr::vec4($crate::expr::Expr::from(&$a))
  }};

  ($xy:expr, $zw:expr) => {{
    use $crate::types::Vec4 as _;
    $crate::expr::Expr::vec4((
      $crate::expr::Expr::from(&$xy),
      $crate::expr::Expr::from(&$zw),
    ))
  }};

  ($xy:expr, $z:expr, $w:expr) => {{
    use $crate::types::Vec4 as _;
    $crate::expr::Expr::vec4((
      $crate::expr::Expr::from(&$xy),
      $crate::expr::Expr::from(&$z),
      $crate::expr::Expr::from(&$w),
    ))
  }};

  ($x:expr, $y:expr, $z:expr, $w:expr) => {{
    use $crate::types::Vec4 as _;
    $crate::expr::Expr::vec4((
      $crate::expr::Expr::from(&$x),
      $crate::expr::Expr::from(&$y),
      $crate::expr::Expr::from(&$z),
      $crate::expr::Expr::from(&$w),
    ))
  }};
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    scope::{Scope, ScopeInstr},
    stdlib::Bounded as _,
    types::{Dim, PrimType},
  };

  #[test]
  fn lit() {
    assert_eq!(lit!(true).erased, ErasedExpr::LitBool(true));
    assert_eq!(lit![1, 2].erased, ErasedExpr::LitInt2([1, 2]));
    assert_eq!(
      (lit!(1.) + lit!(2.)).erased,
      ErasedExpr::Add(
        Box::new(ErasedExpr::LitFloat(1.)),
        Box::new(ErasedExpr::LitFloat(2.)),
      )
    );
  }

  #[test]
  fn unary() {
    let mut scope = Scope::<()>::new(0);

    let a = !lit!(true);
    let b = -lit!(3i32);
    let c = scope.var(17);

    assert_eq!(
      a.erased,
      ErasedExpr::Not(Box::new(ErasedExpr::LitBool(true)))
    );
    assert_eq!(b.erased, ErasedExpr::Neg(Box::new(ErasedExpr::LitInt(3))));
    assert_eq!(c.erased, ErasedExpr::Var(ScopedHandle::fun_var(0, 0)));
  }

  #[test]
  fn binary() {
    let a = lit!(1i32) + lit!(2);
    let b = lit!(1i32) + 2;

    assert_eq!(a.erased, b.erased);
    assert_eq!(
      a.erased,
      ErasedExpr::Add(
        Box::new(ErasedExpr::LitInt(1)),
        Box::new(ErasedExpr::LitInt(2)),
      )
    );

    let a = lit!(1i32) - lit!(2);
    let b = lit!(1i32) - 2;

    assert_eq!(a.erased, b.erased);
    assert_eq!(
      a.erased,
      ErasedExpr::Sub(
        Box::new(ErasedExpr::LitInt(1)),
        Box::new(ErasedExpr::LitInt(2)),
      )
    );

    let a = lit!(1i32) / lit!(2);
    let b = lit!(1i32) / 2;

    assert_eq!(a.erased, b.erased);
    assert_eq!(
      a.erased,
      ErasedExpr::Div(
        Box::new(ErasedExpr::LitInt(1)),
        Box::new(ErasedExpr::LitInt(2)),
      )
    );
  }

  #[test]
  fn mul_minus_one_is_negation() {
    let x = lit!(3f32);

    assert_eq!(
      (&x * -1.).erased,
      ErasedExpr::Neg(Box::new(ErasedExpr::LitFloat(3.)))
    );
    assert_eq!(
      (lit!(-1i32) * lit!(4)).erased,
      ErasedExpr::Neg(Box::new(ErasedExpr::LitInt(4)))
    );

    let v: Expr<V3<f32>> = lit!(1., 2., 3.);
    let minus_one: Expr<V3<f32>> = lit!(-1., -1., -1.);
    assert_eq!(
      (&v * minus_one).erased,
      ErasedExpr::Neg(Box::new(v.erased.clone()))
    );
    assert_eq!(
      (&x * 2.).erased,
      ErasedExpr::Mul(
        Box::new(ErasedExpr::LitFloat(3.)),
        Box::new(ErasedExpr::LitFloat(2.)),
      )
    );
  }

  #[test]
  fn float_rem_is_mod() {
    let a = lit!(5f32) % 2.;
    let b = lit!(5i32) % 2;

    assert_eq!(
      a.erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::Mod,
        vec![ErasedExpr::LitFloat(5.), ErasedExpr::LitFloat(2.)]
      )
    );
    assert_eq!(
      b.erased,
      ErasedExpr::Rem(
        Box::new(ErasedExpr::LitInt(5)),
        Box::new(ErasedExpr::LitInt(2)),
      )
    );
  }

  #[test]
  fn dependencies() {
    let a = lit!(1f32);
    let b = lit!(2f32);
    let sum = &a + &b;

    assert_eq!(sum.erased.dependencies(), vec![&a.erased, &b.erased]);
    assert!(a.erased.dependencies().is_empty());

    let array = lit!([1, 2, 3]);
    let i = lit!(1i32) + 1;
    let lookup = array.at(i.clone());
    assert_eq!(lookup.erased.dependencies(), vec![&array.erased, &i.erased]);
  }

  #[test]
  fn ref_inference() {
    let a = lit!(1i32);
    let b = a.clone() + 1;
    let c = a + 1;

    assert_eq!(b.erased, c.erased);
  }

  #[test]
  fn var() {
    let mut scope = Scope::<()>::new(0);

    let x = scope.var(0);
    let y = scope.var(1u32);
    let z = scope.var(lit![false, true, false]);

    assert_eq!(x.erased, ErasedExpr::Var(ScopedHandle::fun_var(0, 0)));
    assert_eq!(y.erased, ErasedExpr::Var(ScopedHandle::fun_var(0, 1)));
    assert_eq!(z.erased, ErasedExpr::Var(ScopedHandle::fun_var(0, 2)));
    assert_eq!(scope.erased.instructions.len(), 3);
    assert_eq!(
      scope.erased.instructions[2],
      ScopeInstr::VarDecl {
        ty: Type {
          prim_ty: PrimType::Bool(Dim::D3),
          array_dims: Vec::new(),
        },
        handle: ScopedHandle::fun_var(0, 2),
        init_value: Some(ErasedExpr::LitBool3([false, true, false])),
      }
    );
  }

  #[test]
  fn min_max_clamp() {
    let a = lit!(1i32);
    let b = lit!(2);
    let c = lit!(3);

    assert_eq!(
      a.min(&b).erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::Min,
        vec![ErasedExpr::LitInt(1), ErasedExpr::LitInt(2)],
      )
    );

    assert_eq!(
      a.clamp(b, c).erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::Clamp,
        vec![
          ErasedExpr::LitInt(1),
          ErasedExpr::LitInt(2),
          ErasedExpr::LitInt(3)
        ],
      )
    );
  }

  #[test]
  fn array_creation() {
    let _ = Expr::from([1, 2, 3]);
    let _ = Expr::from(&[1, 2, 3]);
    let two_d = Expr::from([[1, 2], [3, 4]]);

    assert_eq!(
      two_d.erased,
      ErasedExpr::Array(
        <[[i32; 2]; 2] as ToType>::ty(),
        vec![
          ErasedExpr::Array(
            <[i32; 2] as ToType>::ty(),
            vec![ErasedExpr::LitInt(1), ErasedExpr::LitInt(2)]
          ),
          ErasedExpr::Array(
            <[i32; 2] as ToType>::ty(),
            vec![ErasedExpr::LitInt(3), ErasedExpr::LitInt(4)]
          )
        ]
      )
    );
  }

  #[test]
  fn vec4_ctor() {
    let xy: Expr<V2<f32>> = lit!(1., 2.);
    let xyzw22 = vec4!(xy, xy);
    let xyzw211 = vec4!(xy, 3., 4.);
    let splat: Expr<V4<f32>> = vec4!(1.);

    let vec4 = ErasedFunHandle::Construct(PrimType::Float(Dim::D4));

    assert_eq!(
      xyzw22.erased,
      ErasedExpr::FunCall(vec4.clone(), vec![xy.erased.clone(), xy.erased.clone()])
    );
    assert_eq!(
      xyzw211.erased,
      ErasedExpr::FunCall(
        vec4.clone(),
        vec![xy.erased.clone(), lit!(3.).erased, lit!(4.).erased]
      )
    );
    assert_eq!(
      splat.erased,
      ErasedExpr::FunCall(vec4, vec![ErasedExpr::LitFloat(1.)])
    );
  }
}
