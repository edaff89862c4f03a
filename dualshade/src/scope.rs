use crate::{
  builtin::BuiltIn,
  expr::{ErasedExpr, Expr},
  fun::{ErasedReturn, Return},
  types::{PrimType, ToType, Type, V4},
  var::Var,
};
use std::{
  marker::PhantomData,
  ops::{Deref, DerefMut},
};

/// Lexical scope that must output an `R`.
///
/// Scopes are the only way to add statements to function and entry point bodies. [`Scope<R>`] is the most general
/// one, parent of all scopes. [`LoopScope<R>`] is a special kind of [`Scope<R>`] that also allows to escape local
/// looping statements, such as `for` and `while` loops.
///
/// A [`Scope<R>`] allows to perform a bunch of actions:
///
/// - Creating variable via [`Scope::var`]. Expressions of type [`Expr<T>`] where [`T: ToType`](ToType) are bound in a
///   [`Scope<R>`] via [`Scope::var`] and a [`Var<T>`] is returned, representing the bound variable.
/// - Variable mutation via [`Scope::set`] and [`Scope::update`]. Any [`Var<T>`] declared previously and still reachable
///   in the current [`Scope`] can be mutated, as well as varyings, fragment outputs and writable built-ins.
/// - Introducing conditional statements with [`Conditional::when`] and [`Conditional::unless`].
/// - Introducing looping statements with [`Scope::loop_for`] and [`Scope::loop_while`].
/// - Returning early with [`Scope::leave`], or [`Scope::abort`] when nothing is returned.
///
/// Entry point bodies get a `Scope<StageReturn>`, helper functions get a `Scope<()>` or a `Scope<Expr<T>>`.
#[derive(Debug)]
pub struct Scope<R> {
  pub(crate) erased: ErasedScope,
  _phantom: PhantomData<R>,
}

impl<R> Scope<R>
where
  Return: From<R>,
{
  /// Create a new [`Scope<R>`] for which the ID is explicitly passed.
  ///
  /// The ID is unique in the scope hierarchy, but is not necessarily unique in the parent scope. What it means is that
  /// creating a scope `s` in a (parent) scope of ID `p` will give `s` the ID `p + 1`. So any scope created directly
  /// under the scope of ID `p` will get the `p + 1` ID. Variables go out of scope at the end of the scope they were
  /// created in, so sibling scopes can safely reuse the same ID.
  pub fn new(id: u16) -> Self {
    Self {
      erased: ErasedScope::new(id),
      _phantom: PhantomData,
    }
  }

  fn next_handle(&mut self) -> ScopedHandle {
    let n = self.erased.next_var;
    self.erased.next_var += 1;
    ScopedHandle::fun_var(self.erased.id, n)
  }

  /// Bind an expression to a variable in the current scope.
  ///
  /// `let v = s.var(e);` binds the `e` expression to `v` in the `s` [`Scope<T>`], and `e` must have type [`Expr<T>`]
  /// and `v` must be a [`Var<T>`], with [`T: ToType`](ToType).
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::scope::Scope;
  ///
  /// let mut s = Scope::<()>::new(0);
  /// let v = s.var(3.1415); // assign the literal 3.1415 to v
  /// let q = s.var(v * 2.); // assign v * 2. to q
  /// ```
  pub fn var<T>(&mut self, init_value: impl Into<Expr<T>>) -> Var<T>
  where
    T: ToType,
  {
    let handle = self.next_handle();

    self.erased.instructions.push(ScopeInstr::VarDecl {
      ty: T::ty(),
      handle: handle.clone(),
      init_value: Some(init_value.into().erased),
    });

    Var::new(handle)
  }

  /// Declare a variable without initializing it.
  ///
  /// The variable holds the default value of its type until it is assigned with [`Scope::set`].
  pub fn declare<T>(&mut self) -> Var<T>
  where
    T: ToType,
  {
    let handle = self.next_handle();

    self.erased.instructions.push(ScopeInstr::VarDecl {
      ty: T::ty(),
      handle: handle.clone(),
      init_value: None,
    });

    Var::new(handle)
  }

  /// For looping statement (`for`).
  ///
  /// `s.loop_for(i, |i| /* cond */, |i| /* fold */, |s, i| /* body */ )` inserts a looping statement into the EDSL
  /// representing a typical “for” loop. `i` is an [`Expr<T>`] satisfying [`T: ToType`](ToType) and is used as
  /// _initial_ value.
  ///
  /// In all the following closures, `i` refers to the loop counter.
  ///
  /// The first `cond` closure must return an [`Expr<bool>`], representing the condition that is held until the loop
  /// exits. The second `fold` closure is a pure computation that must return an [`Expr<T>`] and that will be evaluated
  /// at the end of each iteration before the next check on `cond`. The last and third `body` closure is the body of the
  /// loop.
  ///
  /// The fold is akin to `i + 1` rather than `i++`: its value is assigned back to the counter after each iteration.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::{lit, scope::{Conditional as _, Scope}};
  ///
  /// let mut s = Scope::<()>::new(0);
  /// s.loop_for(0i32, |i| i.lt(10), |i| i + 1, |s, i| {
  ///   s.when(i.eq(5), |s| {
  ///     s.loop_break();
  ///   });
  /// });
  /// ```
  pub fn loop_for<T>(
    &mut self,
    init_value: impl Into<Expr<T>>,
    condition: impl FnOnce(&Expr<T>) -> Expr<bool>,
    iter_fold: impl FnOnce(&Expr<T>) -> Expr<T>,
    body: impl FnOnce(&mut LoopScope<R>, &Expr<T>),
  ) where
    T: ToType,
  {
    let mut scope = LoopScope::new(self.deeper());

    // the counter is declared by the for statement itself, so it takes the first handle of the loop scope
    let init_handle = scope.next_handle();
    let counter = Expr::new(ErasedExpr::Var(init_handle.clone()));

    let condition = condition(&counter);
    let post_expr = iter_fold(&counter);

    body(&mut scope, &counter);

    self.erased.instructions.push(ScopeInstr::For {
      init_ty: T::ty(),
      init_handle,
      init_expr: init_value.into().erased,
      condition: condition.erased,
      post_expr: post_expr.erased,
      scope: scope.0.erased,
    });
  }

  /// While looping statement (`while`).
  ///
  /// `s.loop_while(cond, body)` inserts a looping statement into the EDSL representing a typical “while” loop.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::scope::Scope;
  ///
  /// let mut s = Scope::<()>::new(0);
  /// let i = s.var(0);
  ///
  /// s.loop_while(i.lt(10), |s| {
  ///   s.set(&i, &i + 1);
  /// });
  /// ```
  pub fn loop_while(
    &mut self,
    condition: impl Into<Expr<bool>>,
    body: impl FnOnce(&mut LoopScope<R>),
  ) {
    let mut scope = LoopScope::new(self.deeper());
    body(&mut scope);

    self.erased.instructions.push(ScopeInstr::While {
      condition: condition.into().erased,
      scope: scope.0.erased,
    });
  }

  /// Assign a value to a variable.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::scope::Scope;
  ///
  /// let mut s = Scope::<()>::new(0);
  /// let v = s.var(1); // v = 1
  /// s.set(&v, 10); // v = 10
  /// ```
  pub fn set<T>(&mut self, var: impl Into<Var<T>>, value: impl Into<Expr<T>>) {
    self.erased.instructions.push(ScopeInstr::MutateVar {
      var: var.into().to_expr().erased,
      bin_op: None,
      expr: value.into().erased,
    });
  }

  /// Compound assignment, such as `v += 2`.
  ///
  /// Floating-point remainders have no compound form in GLSL; they are recorded as `v = v % value` instead.
  pub fn update<T>(
    &mut self,
    var: impl Into<Var<T>>,
    bin_op: MutateBinOp,
    value: impl Into<Expr<T>>,
  ) where
    T: ToType,
  {
    let var = var.into().to_expr().erased;
    let value = value.into().erased;

    let instr = match (bin_op, T::ty().prim_ty.scalar()) {
      (MutateBinOp::Rem, PrimType::Float(_)) => ScopeInstr::MutateVar {
        expr: ErasedExpr::fmod(var.clone(), value),
        var,
        bin_op: None,
      },

      _ => ScopeInstr::MutateVar {
        var,
        bin_op: Some(bin_op),
        expr: value,
      },
    };

    self.erased.instructions.push(instr);
  }

  /// Early-return the current function with an expression.
  ///
  /// In entry points, the returned value is the output of the stage (the position of a vertex, or the color of a
  /// fragment).
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::{expr::Expr, lit, scope::{Conditional as _, Scope}};
  ///
  /// let mut s = Scope::<Expr<i32>>::new(0);
  /// let arg = lit!(3);
  ///
  /// // if arg is less than 10, early-return with 0
  /// s.when(arg.lt(10), |s| {
  ///   s.leave(0);
  /// });
  /// ```
  pub fn leave(&mut self, ret: impl Into<R>) {
    self
      .erased
      .instructions
      .push(ScopeInstr::Return(Return::from(ret.into()).erased));
  }

  /// Insert raw source text, one version per target language.
  ///
  /// Nothing is checked; the text is written verbatim as a statement of its own.
  pub fn raw(&mut self, glsl: impl Into<String>, wgsl: impl Into<String>) {
    self.erased.instructions.push(ScopeInstr::Raw {
      glsl: glsl.into(),
      wgsl: wgsl.into(),
    });
  }
}

impl Scope<()> {
  /// Early-abort the current function.
  pub fn abort(&mut self) {
    self
      .erased
      .instructions
      .push(ScopeInstr::Return(ErasedReturn::Void));
  }
}

impl Scope<StageReturn> {
  /// Leave the entry point without returning a value.
  ///
  /// Whatever was written to the stage outputs so far is kept.
  pub fn abort(&mut self) {
    self
      .erased
      .instructions
      .push(ScopeInstr::Return(ErasedReturn::Void));
  }

  /// Discard the current fragment.
  ///
  /// Only valid in fragment entry points.
  pub fn discard(&mut self) {
    self.erased.instructions.push(ScopeInstr::Discard);
  }
}

/// Value returned by an entry point: the position of a vertex or the color of a fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct StageReturn {
  pub(crate) erased: ErasedExpr,
}

impl From<Expr<V4<f32>>> for StageReturn {
  fn from(e: Expr<V4<f32>>) -> Self {
    StageReturn { erased: e.erased }
  }
}

impl<'a> From<&'a Expr<V4<f32>>> for StageReturn {
  fn from(e: &'a Expr<V4<f32>>) -> Self {
    StageReturn {
      erased: e.erased.clone(),
    }
  }
}

impl From<Var<V4<f32>>> for StageReturn {
  fn from(v: Var<V4<f32>>) -> Self {
    StageReturn { erased: v.0.erased }
  }
}

impl<'a> From<&'a Var<V4<f32>>> for StageReturn {
  fn from(v: &'a Var<V4<f32>>) -> Self {
    StageReturn {
      erased: v.0.erased.clone(),
    }
  }
}

impl From<StageReturn> for Return {
  fn from(ret: StageReturn) -> Self {
    Return {
      erased: ErasedReturn::Expr(V4::<f32>::ty(), ret.erased),
    }
  }
}

/// Types that support type erasure.
pub trait Erased {
  type Erased;

  fn erased(&self) -> &Self::Erased;
  fn erased_mut(&mut self) -> &mut Self::Erased;
}

impl<R> Erased for Scope<R> {
  type Erased = ErasedScope;

  fn erased(&self) -> &Self::Erased {
    &self.erased
  }

  fn erased_mut(&mut self) -> &mut Self::Erased {
    &mut self.erased
  }
}

/// A special kind of [`Scope`] that can also break loops.
#[derive(Debug)]
pub struct LoopScope<R>(Scope<R>);

impl<R> From<LoopScope<R>> for Scope<R> {
  fn from(s: LoopScope<R>) -> Self {
    s.0
  }
}

impl<R> Deref for LoopScope<R> {
  type Target = Scope<R>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl<R> DerefMut for LoopScope<R> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl<R> LoopScope<R>
where
  Return: From<R>,
{
  fn new(s: Scope<R>) -> Self {
    Self(s)
  }

  /// Break the current iteration of the nearest loop and continue to the next iteration.
  pub fn loop_continue(&mut self) {
    self.erased.instructions.push(ScopeInstr::Continue);
  }

  /// Break the nearest loop.
  pub fn loop_break(&mut self) {
    self.erased.instructions.push(ScopeInstr::Break);
  }
}

impl<R> Erased for LoopScope<R> {
  type Erased = ErasedScope;

  fn erased(&self) -> &Self::Erased {
    &self.0.erased
  }

  fn erased_mut(&mut self) -> &mut Self::Erased {
    &mut self.0.erased
  }
}

/// Recorded statements of a scope.
#[derive(Clone, Debug, PartialEq)]
pub struct ErasedScope {
  id: u16,
  pub(crate) instructions: Vec<ScopeInstr>,
  next_var: u16,
}

impl ErasedScope {
  fn new(id: u16) -> Self {
    Self {
      id,
      instructions: Vec::new(),
      next_var: 0,
    }
  }

  /// Recorded statements, in order.
  pub fn instructions(&self) -> &[ScopeInstr] {
    &self.instructions
  }
}

/// Go one level deeper in the scope.
pub trait DeepScope {
  /// Create a new fresh scope under the current scope.
  fn deeper(&self) -> Self;
}

impl<R> DeepScope for Scope<R>
where
  Return: From<R>,
{
  fn deeper(&self) -> Self {
    Scope::new(self.erased.id + 1)
  }
}

impl<R> DeepScope for LoopScope<R>
where
  Return: From<R>,
{
  fn deeper(&self) -> Self {
    LoopScope(self.0.deeper())
  }
}

/// Scopes allowing to enter conditional scopes.
pub trait Conditional: Sized {
  /// Conditional statement (`if`).
  ///
  /// `s.when(cond, |s| { /* body */ })` inserts a conditional branch in the EDSL using the `cond` expression as truth
  /// and the passed closure as body to run when the represented condition is `true`. The body receives a scope of the
  /// same kind, so it can early-return and, in loops, break.
  ///
  /// # Return
  ///
  /// A [`When`], which allows you to chain other conditional statements, commonly referred to as `else if` and
  /// `else` in common languages.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::{expr::Expr, lit, scope::{Conditional as _, Scope}};
  ///
  /// let mut s = Scope::<Expr<i32>>::new(0);
  /// let x = lit!(1);
  ///
  /// s.when(x.lt(2), |s| {
  ///   s.leave(0);
  /// }).or_else(x.lt(10), |s| {
  ///   s.leave(1);
  /// }).or(|s| {
  ///   s.leave(2);
  /// });
  /// ```
  fn when<'a>(
    &'a mut self,
    condition: impl Into<Expr<bool>>,
    body: impl FnOnce(&mut Self),
  ) -> When<'a, Self>;

  /// Complement form of [`Conditional::when`].
  ///
  /// This method does the same thing as [`Conditional::when`] but applies the [`Not::not`](std::ops::Not::not)
  /// operator on the condition first.
  fn unless<'a>(
    &'a mut self,
    condition: impl Into<Expr<bool>>,
    body: impl FnOnce(&mut Self),
  ) -> When<'a, Self> {
    self.when(!condition.into(), body)
  }
}

impl<S> Conditional for S
where
  S: DeepScope + Erased<Erased = ErasedScope>,
{
  fn when<'a>(
    &'a mut self,
    condition: impl Into<Expr<bool>>,
    body: impl FnOnce(&mut Self),
  ) -> When<'a, Self> {
    let mut scope = self.deeper();
    body(&mut scope);

    let instructions = &mut self.erased_mut().instructions;
    let index = instructions.len();
    instructions.push(ScopeInstr::If {
      condition: condition.into().erased,
      scope: scope.erased().clone(),
      else_ifs: Vec::new(),
      else_scope: None,
    });

    When {
      parent_scope: self,
      index,
    }
  }
}

/// Conditional combinator.
///
/// A [`When`] is returned from functions such as [`Conditional::when`] or [`Conditional::unless`] and allows to
/// continue chaining conditional statements, encoding the concept of `else if` and `else` in more traditional
/// languages.
#[derive(Debug)]
pub struct When<'a, S> {
  /// The scope the `if` statement was recorded in.
  parent_scope: &'a mut S,

  /// Position of the `if` statement in its scope.
  index: usize,
}

impl<S> When<'_, S>
where
  S: DeepScope + Erased<Erased = ErasedScope>,
{
  fn branches(&mut self) -> Option<(&mut Vec<(ErasedExpr, ErasedScope)>, &mut Option<ErasedScope>)> {
    match self.parent_scope.erased_mut().instructions.get_mut(self.index) {
      Some(ScopeInstr::If {
        else_ifs,
        else_scope,
        ..
      }) => Some((else_ifs, else_scope)),
      _ => None,
    }
  }

  /// Add a conditional branch (`else if`).
  ///
  /// This method is often found chained after [`Conditional::when`] and allows to add a new conditional if the
  /// previous conditional fails (i.e. `else if`). The behavior is the same as with [`Conditional::when`].
  pub fn or_else(mut self, condition: impl Into<Expr<bool>>, body: impl FnOnce(&mut S)) -> Self {
    let mut scope = self.parent_scope.deeper();
    body(&mut scope);

    let scope = scope.erased().clone();
    if let Some((else_ifs, _)) = self.branches() {
      else_ifs.push((condition.into().erased, scope));
    }

    self
  }

  /// Add a final catch-all conditional branch (`else`).
  ///
  /// Can chain and mix conditional but [`When::or`] cannot be anywhere else but the end of the chain.
  pub fn or(mut self, body: impl FnOnce(&mut S)) {
    let mut scope = self.parent_scope.deeper();
    body(&mut scope);

    let scope = scope.erased().clone();
    if let Some((_, else_scope)) = self.branches() {
      *else_scope = Some(scope);
    }
  }
}

/// Hierarchical and namespaced handle.
///
/// Handles live in different namespaces:
///
/// - The _built-in_ namespace gathers all built-ins.
/// - The _global_ namespace gathers program constants.
/// - The _function argument_ namespace gives handles to function arguments, which exist only in a function body.
/// - The _function variable_ namespace gives handles to variables defined in function bodies. This namespace is
///   hierarchical: for each scope, a new namespace is created. The depth at which a namespace is located is referred
///   to as its _subscope_.
/// - Resources (uniforms, struct uniforms, attributes, varyings, fragment outputs and samplers) are named; their names
///   are unique per kind in a [`Program`](crate::program::Program).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ScopedHandle {
  BuiltIn(BuiltIn),
  Global(u16),
  FunArg(u16),
  FunVar { subscope: u16, handle: u16 },
  Uniform(String),
  UniformStruct(String),
  Attribute(String),
  Varying(String),
  Output(String),
  Sampler(String),
}

impl ScopedHandle {
  pub(crate) const fn builtin(b: BuiltIn) -> Self {
    Self::BuiltIn(b)
  }

  pub(crate) const fn global(handle: u16) -> Self {
    Self::Global(handle)
  }

  pub(crate) const fn fun_arg(handle: u16) -> Self {
    Self::FunArg(handle)
  }

  pub(crate) const fn fun_var(subscope: u16, handle: u16) -> Self {
    Self::FunVar { subscope, handle }
  }
}

/// A recorded statement.
#[derive(Clone, Debug, PartialEq)]
pub enum ScopeInstr {
  VarDecl {
    ty: Type,
    handle: ScopedHandle,
    init_value: Option<ErasedExpr>,
  },

  Return(ErasedReturn),

  Continue,

  Break,

  Discard,

  If {
    condition: ErasedExpr,
    scope: ErasedScope,
    else_ifs: Vec<(ErasedExpr, ErasedScope)>,
    else_scope: Option<ErasedScope>,
  },

  For {
    init_ty: Type,
    init_handle: ScopedHandle,
    init_expr: ErasedExpr,
    condition: ErasedExpr,
    post_expr: ErasedExpr,
    scope: ErasedScope,
  },

  While {
    condition: ErasedExpr,
    scope: ErasedScope,
  },

  MutateVar {
    var: ErasedExpr,
    bin_op: Option<MutateBinOp>,
    expr: ErasedExpr,
  },

  Raw {
    glsl: String,
    wgsl: String,
  },
}

/// Operator of a compound assignment.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MutateBinOp {
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  Xor,
  And,
  Or,
  Shl,
  Shr,
}

impl MutateBinOp {
  pub(crate) const fn symbol(self) -> &'static str {
    match self {
      MutateBinOp::Add => "+=",
      MutateBinOp::Sub => "-=",
      MutateBinOp::Mul => "*=",
      MutateBinOp::Div => "/=",
      MutateBinOp::Rem => "%=",
      MutateBinOp::Xor => "^=",
      MutateBinOp::And => "&=",
      MutateBinOp::Or => "|=",
      MutateBinOp::Shl => "<<=",
      MutateBinOp::Shr => ">>=",
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    builtin::VertexShaderEnv,
    lit,
    types::{Dim, PrimType, V4},
  };

  #[test]
  fn when() {
    let mut s = Scope::<Expr<V4<f32>>>::new(0);

    let x = s.var(1);
    s.when(x.eq(lit!(2)), |s| {
      let y = s.var(lit![1., 2., 3., 4.]);
      s.leave(y);
    })
    .or_else(x.eq(lit!(0)), |s| s.leave(lit![0., 0., 0., 0.]))
    .or(|_| ());

    assert_eq!(s.erased.instructions.len(), 2);

    assert_eq!(
      s.erased.instructions[0],
      ScopeInstr::VarDecl {
        ty: Type {
          prim_ty: PrimType::Int(Dim::Scalar),
          array_dims: Vec::new(),
        },
        handle: ScopedHandle::fun_var(0, 0),
        init_value: Some(ErasedExpr::LitInt(1)),
      }
    );

    // if
    let mut scope = ErasedScope::new(1);
    scope.next_var = 1;
    scope.instructions.push(ScopeInstr::VarDecl {
      ty: Type {
        prim_ty: PrimType::Float(Dim::D4),
        array_dims: Vec::new(),
      },
      handle: ScopedHandle::fun_var(1, 0),
      init_value: Some(ErasedExpr::LitFloat4([1., 2., 3., 4.])),
    });
    scope
      .instructions
      .push(ScopeInstr::Return(ErasedReturn::Expr(
        V4::<f32>::ty(),
        ErasedExpr::Var(ScopedHandle::fun_var(1, 0)),
      )));

    // else if
    let mut else_if_scope = ErasedScope::new(1);
    else_if_scope
      .instructions
      .push(ScopeInstr::Return(ErasedReturn::Expr(
        V4::<f32>::ty(),
        ErasedExpr::LitFloat4([0., 0., 0., 0.]),
      )));

    assert_eq!(
      s.erased.instructions[1],
      ScopeInstr::If {
        condition: ErasedExpr::Eq(
          Box::new(ErasedExpr::Var(ScopedHandle::fun_var(0, 0))),
          Box::new(ErasedExpr::LitInt(2)),
        ),
        scope,
        else_ifs: vec![(
          ErasedExpr::Eq(
            Box::new(ErasedExpr::Var(ScopedHandle::fun_var(0, 0))),
            Box::new(ErasedExpr::LitInt(0)),
          ),
          else_if_scope
        )],
        else_scope: Some(ErasedScope::new(1)),
      }
    );
  }

  #[test]
  fn for_loop() {
    let mut scope: Scope<Expr<i32>> = Scope::new(0);

    scope.loop_for(
      0i32,
      |a| a.lt(lit!(10)),
      |a| a + 1,
      |s, a| {
        s.leave(a);
      },
    );

    assert_eq!(scope.erased.instructions.len(), 1);

    let mut loop_scope = ErasedScope::new(1);
    loop_scope.next_var = 1;
    loop_scope
      .instructions
      .push(ScopeInstr::Return(ErasedReturn::Expr(
        i32::ty(),
        ErasedExpr::Var(ScopedHandle::fun_var(1, 0)),
      )));

    assert_eq!(
      scope.erased.instructions[0],
      ScopeInstr::For {
        init_ty: i32::ty(),
        init_handle: ScopedHandle::fun_var(1, 0),
        init_expr: ErasedExpr::LitInt(0),
        condition: ErasedExpr::Lt(
          Box::new(ErasedExpr::Var(ScopedHandle::fun_var(1, 0))),
          Box::new(ErasedExpr::LitInt(10)),
        ),
        post_expr: ErasedExpr::Add(
          Box::new(ErasedExpr::Var(ScopedHandle::fun_var(1, 0))),
          Box::new(ErasedExpr::LitInt(1)),
        ),
        scope: loop_scope,
      }
    );
  }

  #[test]
  fn while_loop() {
    let mut scope: Scope<Expr<i32>> = Scope::new(0);

    scope.loop_while(lit!(1).lt(lit!(2)), LoopScope::loop_continue);

    let mut loop_scope = ErasedScope::new(1);
    loop_scope.instructions.push(ScopeInstr::Continue);

    assert_eq!(scope.erased.instructions.len(), 1);
    assert_eq!(
      scope.erased.instructions[0],
      ScopeInstr::While {
        condition: ErasedExpr::Lt(
          Box::new(ErasedExpr::LitInt(1)),
          Box::new(ErasedExpr::LitInt(2)),
        ),
        scope: loop_scope,
      }
    );
  }

  #[test]
  fn compound_float_rem_is_mod() {
    let mut scope = Scope::<()>::new(0);
    let x = scope.var(lit!(5f32));
    let i = scope.var(lit!(5i32));

    scope.update(&x, MutateBinOp::Rem, 2.);
    scope.update(&i, MutateBinOp::Rem, 2);

    assert_eq!(
      scope.erased.instructions[2],
      ScopeInstr::MutateVar {
        var: x.erased.clone(),
        bin_op: None,
        expr: ErasedExpr::fmod(x.erased.clone(), ErasedExpr::LitFloat(2.)),
      }
    );
    assert_eq!(
      scope.erased.instructions[3],
      ScopeInstr::MutateVar {
        var: i.erased.clone(),
        bin_op: Some(MutateBinOp::Rem),
        expr: ErasedExpr::LitInt(2),
      }
    );
  }

  #[test]
  fn stage_return() {
    let env = VertexShaderEnv::new();
    let mut scope = Scope::<StageReturn>::new(0);

    scope.set(&env.position, lit!(0., 0., 0., 1.));
    scope.leave(&env.position);
    scope.abort();

    assert_eq!(
      scope.erased.instructions[1],
      ScopeInstr::Return(ErasedReturn::Expr(
        V4::<f32>::ty(),
        env.position.erased.clone()
      ))
    );
    assert_eq!(
      scope.erased.instructions[2],
      ScopeInstr::Return(ErasedReturn::Void)
    );
  }
}
