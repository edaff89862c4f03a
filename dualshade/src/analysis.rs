//! Usage analysis of entry points.
//!
//! Walking an entry point body (and, transitively, the helpers it calls and the constants it reads) tells which
//! declarations the emitted code needs, in which order they were first encountered, and which stage outputs are
//! written. Writers only emit what shows up here.

use crate::{
  builtin::{BuiltIn, FragmentBuiltIn, VertexBuiltIn},
  error::Error,
  expr::ErasedExpr,
  fun::{ErasedFunHandle, ErasedReturn},
  program::Program,
  scope::{ErasedScope, ScopeInstr, ScopedHandle},
  stage::ShaderStage,
};
use indexmap::IndexSet;

/// What an entry point transitively uses.
///
/// Every set is in first-encounter order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Analysis {
  pub(crate) uniforms: IndexSet<String>,
  pub(crate) uniform_structs: IndexSet<String>,
  pub(crate) attributes: IndexSet<String>,
  pub(crate) varyings: IndexSet<String>,
  pub(crate) samplers: IndexSet<String>,
  pub(crate) outputs: IndexSet<String>,
  pub(crate) builtins: IndexSet<BuiltIn>,
  pub(crate) constants: IndexSet<u16>,

  /// Helpers, callees before callers.
  pub(crate) functions: IndexSet<String>,

  /// Uniforms, struct uniforms and samplers, mixed, in the order bindings are handed out.
  pub(crate) bindings: IndexSet<ScopedHandle>,

  pub(crate) written_builtins: IndexSet<BuiltIn>,
  pub(crate) written_varyings: IndexSet<String>,
  pub(crate) written_outputs: IndexSet<String>,

  pub(crate) returns_value: bool,
  pub(crate) returns_void: bool,
  pub(crate) discards: bool,
}

impl Analysis {
  /// Analyze the recorded body of an entry point of `stage`.
  pub(crate) fn of(program: &Program, stage: ShaderStage, scope: &ErasedScope) -> Result<Self, Error> {
    let mut walker = Walker {
      program,
      stage,
      analysis: Analysis::default(),
      visiting: IndexSet::new(),
    };

    walker.scope(scope, false)?;

    let analysis = walker.analysis;
    log::debug!(
      "{} entry point uses {} uniforms, {} struct uniforms, {} samplers, {} attributes, {} varyings, {} outputs, {} helpers",
      stage,
      analysis.uniforms.len(),
      analysis.uniform_structs.len(),
      analysis.samplers.len(),
      analysis.attributes.len(),
      analysis.varyings.len(),
      analysis.outputs.len(),
      analysis.functions.len()
    );

    Ok(analysis)
  }

  /// Used uniforms, in encounter order.
  pub fn uniforms(&self) -> impl Iterator<Item = &str> {
    self.uniforms.iter().map(String::as_str)
  }

  /// Used struct uniforms, in encounter order.
  pub fn uniform_structs(&self) -> impl Iterator<Item = &str> {
    self.uniform_structs.iter().map(String::as_str)
  }

  /// Used attributes, in encounter order.
  pub fn attributes(&self) -> impl Iterator<Item = &str> {
    self.attributes.iter().map(String::as_str)
  }

  /// Used varyings (read or written), in encounter order.
  pub fn varyings(&self) -> impl Iterator<Item = &str> {
    self.varyings.iter().map(String::as_str)
  }

  /// Used samplers, in encounter order.
  pub fn samplers(&self) -> impl Iterator<Item = &str> {
    self.samplers.iter().map(String::as_str)
  }

  /// Used fragment outputs, in encounter order.
  pub fn outputs(&self) -> impl Iterator<Item = &str> {
    self.outputs.iter().map(String::as_str)
  }

  /// Used built-ins, in encounter order.
  pub fn builtins(&self) -> impl Iterator<Item = BuiltIn> + '_ {
    self.builtins.iter().copied()
  }

  /// Called helpers, callees before callers.
  pub fn functions(&self) -> impl Iterator<Item = &str> {
    self.functions.iter().map(String::as_str)
  }

  /// Varyings the entry point assigns to.
  pub fn written_varyings(&self) -> impl Iterator<Item = &str> {
    self.written_varyings.iter().map(String::as_str)
  }

  pub fn uses_builtin(&self, builtin: BuiltIn) -> bool {
    self.builtins.contains(&builtin)
  }

  /// Whether the body returns a value somewhere.
  pub fn returns_value(&self) -> bool {
    self.returns_value
  }

  /// Whether the body has an early return without a value somewhere.
  pub fn returns_void(&self) -> bool {
    self.returns_void
  }

  /// Whether the body discards fragments.
  pub fn discards(&self) -> bool {
    self.discards
  }
}

struct Walker<'a> {
  program: &'a Program,
  stage: ShaderStage,
  analysis: Analysis,
  // helpers being walked, to reject recursion
  visiting: IndexSet<String>,
}

impl<'a> Walker<'a> {
  fn scope(&mut self, scope: &ErasedScope, helper: bool) -> Result<(), Error> {
    for instr in scope.instructions() {
      self.instr(instr, helper)?;
    }

    Ok(())
  }

  fn instr(&mut self, instr: &ScopeInstr, helper: bool) -> Result<(), Error> {
    match instr {
      ScopeInstr::VarDecl { init_value, .. } => {
        if let Some(e) = init_value {
          self.expr(e)?;
        }
      }

      ScopeInstr::Return(ret) => self.ret(ret, helper)?,

      ScopeInstr::Continue | ScopeInstr::Break | ScopeInstr::Raw { .. } => (),

      ScopeInstr::Discard => {
        if self.stage != ShaderStage::Fragment {
          return Err(Error::InvalidArgument(format!(
            "discard in a {} entry point",
            self.stage
          )));
        }

        self.analysis.discards = true;
      }

      ScopeInstr::If {
        condition,
        scope,
        else_ifs,
        else_scope,
      } => {
        self.expr(condition)?;
        self.scope(scope, helper)?;

        for (condition, scope) in else_ifs {
          self.expr(condition)?;
          self.scope(scope, helper)?;
        }

        if let Some(scope) = else_scope {
          self.scope(scope, helper)?;
        }
      }

      ScopeInstr::For {
        init_expr,
        condition,
        post_expr,
        scope,
        ..
      } => {
        self.expr(init_expr)?;
        self.expr(condition)?;
        self.expr(post_expr)?;
        self.scope(scope, helper)?;
      }

      ScopeInstr::While { condition, scope } => {
        self.expr(condition)?;
        self.scope(scope, helper)?;
      }

      ScopeInstr::MutateVar { var, expr, .. } => {
        self.expr(var)?;
        self.expr(expr)?;

        match var.root_handle() {
          Some(ScopedHandle::BuiltIn(builtin)) => {
            self.analysis.written_builtins.insert(*builtin);
          }

          Some(ScopedHandle::Varying(name)) => {
            self.analysis.written_varyings.insert(name.clone());
          }

          Some(ScopedHandle::Output(name)) => {
            self.analysis.written_outputs.insert(name.clone());
          }

          _ => (),
        }
      }
    }

    Ok(())
  }

  fn ret(&mut self, ret: &ErasedReturn, helper: bool) -> Result<(), Error> {
    match ret {
      ErasedReturn::Void => {
        if !helper {
          self.analysis.returns_void = true;
        }
      }

      ErasedReturn::Expr(_, e) => {
        if !helper {
          self.analysis.returns_value = true;
        }

        self.expr(e)?;
      }
    }

    Ok(())
  }

  fn expr(&mut self, e: &ErasedExpr) -> Result<(), Error> {
    match e {
      ErasedExpr::Var(handle) => self.handle(handle),

      ErasedExpr::FunCall(ErasedFunHandle::UserDefined(name), args) => {
        for arg in args {
          self.expr(arg)?;
        }

        self.fun(name)
      }

      _ => {
        for dep in e.dependencies() {
          self.expr(dep)?;
        }

        Ok(())
      }
    }
  }

  fn fun(&mut self, name: &str) -> Result<(), Error> {
    if self.analysis.functions.contains(name) {
      return Ok(());
    }

    if self.visiting.contains(name) {
      return Err(Error::InvalidArgument(format!(
        "function {} calls itself",
        name
      )));
    }

    let fun = self
      .program
      .funs
      .get(name)
      .ok_or_else(|| Error::MissingValue(format!("function {}", name)))?;

    self.visiting.insert(name.to_owned());
    self.scope(&fun.scope, true)?;
    self.ret(&fun.ret, true)?;
    self.visiting.shift_remove(name);

    log::trace!("entry point calls {}", name);
    self.analysis.functions.insert(name.to_owned());

    Ok(())
  }

  fn handle(&mut self, handle: &ScopedHandle) -> Result<(), Error> {
    match handle {
      ScopedHandle::BuiltIn(builtin) => {
        let valid = matches!(
          (builtin, self.stage),
          (BuiltIn::Vertex(_), ShaderStage::Vertex) | (BuiltIn::Fragment(_), ShaderStage::Fragment)
        );

        if !valid {
          return Err(Error::InvalidArgument(format!(
            "{} used in a {} entry point",
            builtin_name(*builtin),
            self.stage
          )));
        }

        self.analysis.builtins.insert(*builtin);
      }

      ScopedHandle::Global(index) => {
        if self.analysis.constants.contains(index) {
          return Ok(());
        }

        let constant = self
          .program
          .constants
          .get(usize::from(*index))
          .ok_or_else(|| Error::MissingValue(format!("glob_{}", index)))?;

        // constants the value refers to come first
        self.expr(&constant.value)?;
        self.analysis.constants.insert(*index);
      }

      ScopedHandle::FunArg(_) | ScopedHandle::FunVar { .. } => (),

      ScopedHandle::Uniform(name) => {
        if !self.program.uniforms.contains_key(name) {
          return Err(missing("uniform", name));
        }

        self.analysis.uniforms.insert(name.clone());
        self.analysis.bindings.insert(handle.clone());
      }

      ScopedHandle::UniformStruct(name) => {
        if !self.program.uniform_structs.contains_key(name) {
          return Err(missing("struct uniform", name));
        }

        self.analysis.uniform_structs.insert(name.clone());
        self.analysis.bindings.insert(handle.clone());
      }

      ScopedHandle::Sampler(name) => {
        if !self.program.samplers.contains_key(name) {
          return Err(missing("sampler", name));
        }

        self.analysis.samplers.insert(name.clone());
        self.analysis.bindings.insert(handle.clone());
      }

      ScopedHandle::Attribute(name) => {
        if !self.program.attributes.contains_key(name) {
          return Err(missing("attribute", name));
        }

        if self.stage != ShaderStage::Vertex {
          return Err(Error::InvalidArgument(format!(
            "attribute {} used in a {} entry point",
            name, self.stage
          )));
        }

        self.analysis.attributes.insert(name.clone());
      }

      ScopedHandle::Varying(name) => {
        if !self.program.varyings.contains_key(name) {
          return Err(missing("varying", name));
        }

        self.analysis.varyings.insert(name.clone());
      }

      ScopedHandle::Output(name) => {
        if !self.program.outputs.contains_key(name) {
          return Err(missing("output", name));
        }

        if self.stage != ShaderStage::Fragment {
          return Err(Error::InvalidArgument(format!(
            "output {} used in a {} entry point",
            name, self.stage
          )));
        }

        self.analysis.outputs.insert(name.clone());
      }
    }

    Ok(())
  }
}

fn missing(kind: &str, name: &str) -> Error {
  Error::MissingValue(format!("{} {}", kind, name))
}

fn builtin_name(builtin: BuiltIn) -> &'static str {
  match builtin {
    BuiltIn::Vertex(VertexBuiltIn::VertexID) => "vertex_id",
    BuiltIn::Vertex(VertexBuiltIn::InstanceID) => "instance_id",
    BuiltIn::Vertex(VertexBuiltIn::Position) => "position",
    BuiltIn::Vertex(VertexBuiltIn::PointSize) => "point_size",
    BuiltIn::Fragment(FragmentBuiltIn::FragCoord) => "frag_coord",
    BuiltIn::Fragment(FragmentBuiltIn::FrontFacing) => "front_facing",
    BuiltIn::Fragment(FragmentBuiltIn::FragColor) => "color",
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    expr::Expr,
    lit,
    scope::Scope,
    types::{V2, V4},
    vec4,
  };

  #[test]
  fn unused_declarations_are_pruned() {
    let mut program = Program::new();
    let time = program.uniform::<f32>("time").unwrap();
    let _unused = program.uniform::<f32>("unused").unwrap();
    let tint = program.uniform::<V4<f32>>("tint").unwrap();

    program
      .fragment("main", move |s, _| {
        let t = s.var(&*time * 2.);
        s.leave(&*tint * t);
      })
      .unwrap();

    let analysis = program.entry("main").unwrap().analysis().unwrap();

    assert_eq!(analysis.uniforms().collect::<Vec<_>>(), vec!["time", "tint"]);
    assert!(analysis.returns_value());
    assert!(!analysis.returns_void());
  }

  #[test]
  fn helpers_are_ordered_callee_first() {
    let mut program = Program::new();
    let scale = program.uniform::<f32>("scale").unwrap();

    let inner = program
      .fun("inner", move |_: &mut Scope<Expr<f32>>, x: Expr<f32>| &x * &*scale)
      .unwrap();
    let outer = program
      .fun("outer", move |_: &mut Scope<Expr<f32>>, x: Expr<f32>| inner.call(x) + 1.)
      .unwrap();

    program
      .fragment("main", move |s, _| {
        s.leave(vec4!(outer.call(lit!(0.5f32))));
      })
      .unwrap();

    let analysis = program.entry("main").unwrap().analysis().unwrap();

    assert_eq!(analysis.functions().collect::<Vec<_>>(), vec!["inner", "outer"]);
    // uniforms used by helpers count too
    assert_eq!(analysis.uniforms().collect::<Vec<_>>(), vec!["scale"]);
  }

  #[test]
  fn constants_follow_their_dependencies() {
    let mut program = Program::new();
    let a = program.constant(lit!(2f32)).unwrap();
    let b = program.constant(&a * 3.).unwrap();

    program
      .fragment("main", move |s, _| {
        s.leave(vec4!(b.clone()));
      })
      .unwrap();

    let analysis = program.entry("main").unwrap().analysis().unwrap();
    assert_eq!(analysis.constants.iter().copied().collect::<Vec<_>>(), vec![0, 1]);
  }

  #[test]
  fn writes_are_tracked() {
    let mut program = Program::new();
    let uv = program.varying::<V2<f32>>("uv").unwrap();

    program
      .vertex("main", move |s, env| {
        s.set(&uv, lit!(0., 1.));
        s.set(&env.position, vec4!(1.));
      })
      .unwrap();

    let analysis = program.entry("main").unwrap().analysis().unwrap();

    assert_eq!(analysis.written_varyings().collect::<Vec<_>>(), vec!["uv"]);
    assert!(analysis
      .written_builtins
      .contains(&BuiltIn::Vertex(VertexBuiltIn::Position)));
    assert!(!analysis.returns_value());
  }

  #[test]
  fn attributes_are_vertex_only() {
    let mut program = Program::new();
    let pos = program.attribute::<V4<f32>>("pos").unwrap();

    program
      .fragment("main", move |s, _| {
        s.leave(pos.expr());
      })
      .unwrap();

    assert!(matches!(
      program.entry("main").unwrap().analysis(),
      Err(Error::InvalidArgument(_))
    ));
  }

  #[test]
  fn discard_is_fragment_only() {
    let mut program = Program::new();

    program
      .fragment("main", |s, _| {
        s.discard();
      })
      .unwrap();

    assert!(program.entry("main").unwrap().analysis().unwrap().discards());
  }
}
