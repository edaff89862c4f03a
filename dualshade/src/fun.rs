//! Helper functions and function handles.

use crate::{
  expr::{ErasedExpr, Expr},
  sampler::SamplerKind,
  scope::{ErasedScope, Scope, ScopedHandle},
  types::{PrimType, ToType, Type},
};
use std::marker::PhantomData;

/// Function return.
///
/// This type represents a function return and is used to annotate values that can be returned from functions (i.e.
/// expressions).
#[derive(Clone, Debug, PartialEq)]
pub struct Return {
  pub(crate) erased: ErasedReturn,
}

/// Erased return.
///
/// Either `Void` (i.e. `void`) or an expression. The type of the expression is also present for convenience.
#[derive(Clone, Debug, PartialEq)]
pub enum ErasedReturn {
  Void,
  Expr(Type, ErasedExpr),
}

impl ErasedReturn {
  /// Type of the returned value, if any.
  pub fn ty(&self) -> Option<&Type> {
    match self {
      ErasedReturn::Void => None,
      ErasedReturn::Expr(ty, _) => Some(ty),
    }
  }
}

impl From<()> for Return {
  fn from(_: ()) -> Self {
    Return {
      erased: ErasedReturn::Void,
    }
  }
}

impl<T> From<Expr<T>> for Return
where
  T: ToType,
{
  fn from(expr: Expr<T>) -> Self {
    Return {
      erased: ErasedReturn::Expr(T::ty(), expr.erased),
    }
  }
}

/// An opaque function handle, used to call helper functions.
///
/// Function handles are created with [`Program::fun`](crate::program::Program::fun), introducing new helper functions.
/// You can then call the functions in the context of generating new expressions, returning them or creating variables,
/// with [`FunHandle::call`]:
///
/// - It is a function without argument if the represented function doesn’t have any argument.
/// - It is a unary function if the represented function has a single argument.
/// - It takes as many arguments as the represented function otherwise.
///
/// A helper is emitted only in the entry points that (transitively) call it.
///
/// # Examples
///
/// ```
/// use dualshade::{expr::Expr, lit, program::Program, scope::Scope};
///
/// let mut program = Program::new();
/// let square = program
///   .fun("square", |_: &mut Scope<Expr<i32>>, a: Expr<i32>| &a * &a)
///   .unwrap();
///
/// let nine = square.call(lit!(3));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FunHandle<R, A> {
  pub(crate) erased: ErasedFunHandle,
  _phantom: PhantomData<(R, A)>,
}

impl<R, A> FunHandle<R, A> {
  pub(crate) fn new(erased: ErasedFunHandle) -> Self {
    Self {
      erased,
      _phantom: PhantomData,
    }
  }

  /// Name of the function.
  pub fn name(&self) -> &str {
    match &self.erased {
      ErasedFunHandle::UserDefined(name) => name,
      _ => "",
    }
  }
}

impl<R> FunHandle<Expr<R>, ()> {
  /// Create an expression representing a function call to this function.
  ///
  /// See the documentation of [`FunHandle`] for examples.
  pub fn call(&self) -> Expr<R> {
    Expr::new(ErasedExpr::FunCall(self.erased.clone(), Vec::new()))
  }
}

impl<R, A> FunHandle<Expr<R>, Expr<A>> {
  /// Create an expression representing a function call to this function.
  ///
  /// See the documentation of [`FunHandle`] for examples.
  pub fn call(&self, a: impl Into<Expr<A>>) -> Expr<R> {
    Expr::new(ErasedExpr::FunCall(
      self.erased.clone(),
      vec![a.into().erased],
    ))
  }
}

macro_rules! impl_FunCall {
  ( $( ( $arg_name:ident, $arg_ty:ident ) ),*) => {
    impl<R, $($arg_ty),*> FunHandle<Expr<R>, ($(Expr<$arg_ty>),*)>
    {
      /// Create an expression representing a function call to this function.
      ///
      /// See the documentation of [`FunHandle`] for examples.
      pub fn call(&self, $($arg_name : impl Into<Expr<$arg_ty>>),*) -> Expr<R> {
        Expr::new(ErasedExpr::FunCall(self.erased.clone(), vec![$($arg_name.into().erased),*]))
      }
    }
  };
}

// implement function calls for Expr up to 8 arguments
macro_rules! impl_FunCall_rec {
  ( ( $a:ident, $b:ident ) , ( $x:ident, $y:ident )) => {
    impl_FunCall!(($a, $b), ($x, $y));
  };

  ( ( $a:ident, $b:ident ) , ( $x: ident, $y: ident ) , $($r:tt)* ) => {
    impl_FunCall_rec!(($a, $b), $($r)*);
    impl_FunCall!(($a, $b), ($x, $y), $($r)*);
  };
}

impl_FunCall_rec!(
  (a, A),
  (b, B),
  (c, C),
  (d, D),
  (e, E),
  (f, F),
  (g, G),
  (h, H)
);

/// Erased function handle.
///
/// Built-in functions are rendered with their name in the target language; [`ErasedFunHandle::UserDefined`] refers to
/// a helper function by name.
#[derive(Clone, Debug, PartialEq)]
pub enum ErasedFunHandle {
  // constructors and casts
  Construct(PrimType),
  // trigonometry
  Radians,
  Degrees,
  Sin,
  Cos,
  Tan,
  ASin,
  ACos,
  ATan,
  SinH,
  CosH,
  TanH,
  ASinH,
  ACosH,
  ATanH,
  // exponential
  Pow,
  Exp,
  Exp2,
  Log,
  Log2,
  Sqrt,
  InverseSqrt,
  // common
  Abs,
  Sign,
  Floor,
  Trunc,
  Round,
  Ceil,
  Fract,
  Mod,
  Min,
  Max,
  Clamp,
  Mix,
  Step,
  SmoothStep,
  // geometry functions
  Length,
  Distance,
  Dot,
  Cross,
  Normalize,
  FaceForward,
  Reflect,
  Refract,
  // matrix functions
  Transpose,
  Determinant,
  // vector relational functions
  VLt,
  VLte,
  VGt,
  VGte,
  VEq,
  VNeq,
  VAny,
  VAll,
  VNot,
  // texture functions
  Texture(SamplerKind),
  TexelFetch(SamplerKind),
  // fragment processing functions
  DFDX,
  DFDY,
  FWidth,
  // helper functions
  UserDefined(String),
}

/// A function definition.
///
/// Function definitions contain the information required to know how to represent a function’s arguments, return type
/// and its body.
#[derive(Debug)]
pub struct FunDef<R, A> {
  pub(crate) erased: ErasedFun,
  _phantom: PhantomData<(R, A)>,
}

impl<R, A> FunDef<R, A> {
  pub(crate) fn new(erased: ErasedFun) -> Self {
    Self {
      erased,
      _phantom: PhantomData,
    }
  }
}

/// Erased function definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ErasedFun {
  pub(crate) args: Vec<Type>,
  pub(crate) scope: ErasedScope,
  pub(crate) ret: ErasedReturn,
}

impl ErasedFun {
  pub(crate) fn new(args: Vec<Type>, scope: ErasedScope, ret: ErasedReturn) -> Self {
    Self { args, scope, ret }
  }

  /// Types of the arguments, in order.
  pub fn args(&self) -> &[Type] {
    &self.args
  }

  /// Body of the function.
  pub fn scope(&self) -> &ErasedScope {
    &self.scope
  }

  /// Value returned at the end of the body.
  pub fn ret(&self) -> &ErasedReturn {
    &self.ret
  }
}

/// Types that can be turned into helper functions.
///
/// Closures taking a mutable [`Scope<R>`] and up to eight [`Expr`] arguments, and returning `R`, implement this trait.
/// You are not supposed to implement it yourself.
///
/// # Caveats
///
/// Type inference is not great here: you will most of the time have to annotate the closure’s arguments.
pub trait ToFun<R, A> {
  fn build_fn(self) -> FunDef<R, A>;
}

impl<F, R> ToFun<R, ()> for F
where
  Self: FnOnce(&mut Scope<R>) -> R,
  Return: From<R>,
{
  fn build_fn(self) -> FunDef<R, ()> {
    let mut scope = Scope::new(0);
    let ret = self(&mut scope);

    let erased = ErasedFun::new(Vec::new(), scope.erased, Return::from(ret).erased);

    FunDef::new(erased)
  }
}

impl<F, R, A> ToFun<R, Expr<A>> for F
where
  Self: FnOnce(&mut Scope<R>, Expr<A>) -> R,
  Return: From<R>,
  A: ToType,
{
  fn build_fn(self) -> FunDef<R, Expr<A>> {
    let arg = Expr::new(ErasedExpr::Var(ScopedHandle::fun_arg(0)));

    let mut scope = Scope::new(0);
    let ret = self(&mut scope, arg);

    let erased = ErasedFun::new(vec![A::ty()], scope.erased, Return::from(ret).erased);

    FunDef::new(erased)
  }
}

macro_rules! impl_ToFun_args {
  ($($arg:ident , $arg_ident:ident , $arg_rank:expr),*) => {
    impl<F, R, $($arg),*> ToFun<R, ($(Expr<$arg>),*)> for F
    where
      Self: FnOnce(&mut Scope<R>, $(Expr<$arg>),*) -> R,
      Return: From<R>,
      $($arg: ToType),*
    {
      fn build_fn(self) -> FunDef<R, ($(Expr<$arg>),*)> {
        $( let $arg_ident = Expr::new(ErasedExpr::Var(ScopedHandle::fun_arg($arg_rank))); )*
        let args = vec![$( $arg::ty() ),*];

        let mut scope = Scope::new(0);
        let ret = self(&mut scope, $($arg_ident),*);

        let erased = ErasedFun::new(args, scope.erased, Return::from(ret).erased);

        FunDef::new(erased)
      }
    }
  }
}

impl_ToFun_args!(A0, a0, 0, A1, a1, 1);
impl_ToFun_args!(A0, a0, 0, A1, a1, 1, A2, a2, 2);
impl_ToFun_args!(A0, a0, 0, A1, a1, 1, A2, a2, 2, A3, a3, 3);
impl_ToFun_args!(A0, a0, 0, A1, a1, 1, A2, a2, 2, A3, a3, 3, A4, a4, 4);
impl_ToFun_args!(A0, a0, 0, A1, a1, 1, A2, a2, 2, A3, a3, 3, A4, a4, 4, A5, a5, 5);
impl_ToFun_args!(A0, a0, 0, A1, a1, 1, A2, a2, 2, A3, a3, 3, A4, a4, 4, A5, a5, 5, A6, a6, 6);
impl_ToFun_args!(
  A0, a0, 0, A1, a1, 1, A2, a2, 2, A3, a3, 3, A4, a4, 4, A5, a5, 5, A6, a6, 6, A7, a7, 7
);

#[cfg(test)]
mod test {
  use super::*;
  use crate::{lit, scope::ScopeInstr, types::V3};

  #[test]
  fn build_unary() {
    let fundef = (|s: &mut Scope<Expr<f32>>, a: Expr<f32>| {
      let x = s.var(&a * 2.);
      x.to_expr()
    })
    .build_fn();

    assert_eq!(fundef.erased.args, vec![f32::ty()]);
    assert_eq!(
      fundef.erased.ret,
      ErasedReturn::Expr(
        f32::ty(),
        ErasedExpr::Var(ScopedHandle::fun_var(0, 0))
      )
    );
    assert_eq!(
      fundef.erased.scope.instructions(),
      &[ScopeInstr::VarDecl {
        ty: f32::ty(),
        handle: ScopedHandle::fun_var(0, 0),
        init_value: Some(ErasedExpr::Mul(
          Box::new(ErasedExpr::Var(ScopedHandle::fun_arg(0))),
          Box::new(ErasedExpr::LitFloat(2.)),
        )),
      }]
    );
  }

  #[test]
  fn build_ternary() {
    let fundef = (|_: &mut Scope<Expr<V3<f32>>>,
                   a: Expr<V3<f32>>,
                   _b: Expr<V3<f32>>,
                   _t: Expr<f32>| a)
      .build_fn();

    assert_eq!(
      fundef.erased.args,
      vec![V3::<f32>::ty(), V3::<f32>::ty(), f32::ty()]
    );
  }

  #[test]
  fn void_fun() {
    let fundef = (|s: &mut Scope<()>| {
      s.var(lit!(1i32));
    })
    .build_fn();

    assert!(fundef.erased.args.is_empty());
    assert_eq!(fundef.erased.ret, ErasedReturn::Void);
    assert_eq!(fundef.erased.ret.ty(), None);
  }

  #[test]
  fn call() {
    let handle = FunHandle::<Expr<f32>, (Expr<f32>, Expr<i32>)>::new(ErasedFunHandle::UserDefined(
      "foo".to_owned(),
    ));
    let call = handle.call(lit!(1f32), 2);

    assert_eq!(handle.name(), "foo");
    assert_eq!(
      call.erased,
      ErasedExpr::FunCall(
        ErasedFunHandle::UserDefined("foo".to_owned()),
        vec![ErasedExpr::LitFloat(1.), ErasedExpr::LitInt(2)]
      )
    );
  }
}
