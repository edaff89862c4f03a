//! Programs: the set of declarations and entry points a shader module is emitted from.
//!
//! A [`Program`] owns every declaration (uniforms, attributes, varyings, samplers, fragment outputs, struct uniforms,
//! constants and helper functions) and any number of named vertex and fragment entry points. Each entry point is
//! emitted on its own, to GLSL or WGSL, with only the declarations it transitively uses.
//!
//! # Examples
//!
//! ```
//! use dualshade::{vec4, GlslOptions, Program, WgslOptions};
//!
//! let mut program = Program::new();
//! let time = program.uniform::<f32>("time").unwrap();
//!
//! program
//!   .fragment("main", move |s, _| {
//!     s.leave(vec4!(time.expr(), 0., 0., 1.));
//!   })
//!   .unwrap();
//!
//! let entry = program.entry("main").unwrap();
//! let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
//! let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
//!
//! assert!(glsl.contains("uniform float time;"));
//! assert!(wgsl.contains("var<uniform> time: f32;"));
//! ```

use crate::{
  alloc::ResourceLayout,
  analysis::Analysis,
  builtin::{FragmentShaderEnv, VertexShaderEnv},
  error::Error,
  expr::{ErasedExpr, Expr},
  fun::{ErasedFun, ErasedFunHandle, FunHandle, ToFun},
  resource::{Attribute, Binding, FragmentOutput, Uniform, Varying, VaryingOptions},
  sampler::{Sampler, SamplerKind, SamplerType},
  scope::{ErasedScope, Scope, ScopedHandle, StageReturn},
  stage::{Body, BodyResult, EntryPoint, ShaderStage},
  structs::{DynStruct, StructDef, UniformBlock, UniformStruct},
  types::{ToType, Type},
  writer::{glsl, wgsl, EntryContext, GlslOptions, WgslOptions},
};
use indexmap::IndexMap;

#[derive(Clone, Debug)]
pub(crate) struct UniformDecl {
  pub(crate) ty: Type,
  pub(crate) binding: Binding,
}

#[derive(Clone, Debug)]
pub(crate) struct StructUniformDecl {
  pub(crate) def: StructDef,
  pub(crate) binding: Binding,
}

#[derive(Clone, Debug)]
pub(crate) struct AttributeDecl {
  pub(crate) ty: Type,
  pub(crate) location: Option<u32>,
}

#[derive(Clone, Debug)]
pub(crate) struct VaryingDecl {
  pub(crate) ty: Type,
  pub(crate) options: VaryingOptions,
}

#[derive(Clone, Debug)]
pub(crate) struct SamplerDecl {
  pub(crate) kind: SamplerKind,
  pub(crate) binding: Binding,
}

#[derive(Clone, Debug)]
pub(crate) struct OutputDecl {
  pub(crate) ty: Type,
  pub(crate) location: Option<u32>,
}

#[derive(Clone, Debug)]
pub(crate) struct ConstantDecl {
  pub(crate) ty: Type,
  pub(crate) value: ErasedExpr,
}

/// Declarations and entry points of a shader module.
#[derive(Debug, Default)]
pub struct Program {
  pub(crate) uniforms: IndexMap<String, UniformDecl>,
  pub(crate) uniform_structs: IndexMap<String, StructUniformDecl>,
  pub(crate) structs: IndexMap<String, StructDef>,
  pub(crate) attributes: IndexMap<String, AttributeDecl>,
  pub(crate) varyings: IndexMap<String, VaryingDecl>,
  pub(crate) samplers: IndexMap<String, SamplerDecl>,
  pub(crate) outputs: IndexMap<String, OutputDecl>,
  pub(crate) constants: Vec<ConstantDecl>,
  pub(crate) funs: IndexMap<String, ErasedFun>,
  entries: IndexMap<String, EntryPoint>,
}

impl Program {
  /// Empty program.
  pub fn new() -> Self {
    Self::default()
  }

  /// Uniforms, struct uniforms and samplers share the same namespace, since they all end up as uniforms in GLSL.
  fn check_uniform_name(&self, name: &str) -> Result<(), Error> {
    if self.uniforms.contains_key(name)
      || self.uniform_structs.contains_key(name)
      || self.samplers.contains_key(name)
    {
      return Err(Error::DuplicateDefinition {
        kind: "uniform",
        name: name.to_owned(),
      });
    }

    Ok(())
  }

  /// Declare a uniform with an automatic binding.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a uniform, struct uniform or sampler has the same name.
  pub fn uniform<T>(&mut self, name: &str) -> Result<Uniform<T>, Error>
  where
    T: ToType,
  {
    self.uniform_at(name, Binding::auto())
  }

  /// Declare a uniform with a requested binding.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a uniform, struct uniform or sampler has the same name.
  pub fn uniform_at<T>(&mut self, name: &str, binding: Binding) -> Result<Uniform<T>, Error>
  where
    T: ToType,
  {
    self.check_uniform_name(name)?;

    log::debug!("declaring uniform {} ({:?})", name, binding);
    self.uniforms.insert(
      name.to_owned(),
      UniformDecl {
        ty: T::ty(),
        binding,
      },
    );

    Ok(Uniform::new(name, binding))
  }

  /// Declare a struct uniform described by a [`UniformBlock`], with an automatic binding.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a uniform has the same name, or if a different struct with the same name was
  /// registered before.
  pub fn uniform_struct<S>(&mut self, name: &str) -> Result<UniformStruct<S>, Error>
  where
    S: UniformBlock,
  {
    self.uniform_struct_at(name, Binding::auto())
  }

  /// Declare a struct uniform described by a [`UniformBlock`], with a requested binding.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a uniform has the same name, or if a different struct with the same name was
  /// registered before.
  pub fn uniform_struct_at<S>(
    &mut self,
    name: &str,
    binding: Binding,
  ) -> Result<UniformStruct<S>, Error>
  where
    S: UniformBlock,
  {
    let def = S::struct_def();
    self.declare_uniform_struct(name, binding, &def)?;
    Ok(UniformStruct::new(name, binding, def))
  }

  /// Declare a struct uniform from a definition built at runtime.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a uniform has the same name, or if a different struct with the same name was
  /// registered before.
  pub fn uniform_struct_dyn(
    &mut self,
    name: &str,
    def: StructDef,
    binding: Binding,
  ) -> Result<UniformStruct<DynStruct>, Error> {
    self.declare_uniform_struct(name, binding, &def)?;
    Ok(UniformStruct::new(name, binding, def))
  }

  fn declare_uniform_struct(
    &mut self,
    name: &str,
    binding: Binding,
    def: &StructDef,
  ) -> Result<(), Error> {
    self.check_uniform_name(name)?;

    let defs = def.with_dependencies();
    for def in &defs {
      match self.structs.get(def.name()) {
        Some(known) if known != *def => {
          return Err(Error::DuplicateDefinition {
            kind: "struct",
            name: def.name().to_owned(),
          });
        }

        _ => (),
      }
    }

    for def in defs {
      self
        .structs
        .entry(def.name().to_owned())
        .or_insert_with(|| def.clone());
    }

    log::debug!(
      "declaring struct uniform {}: {} ({:?})",
      name,
      def.name(),
      binding
    );
    self.uniform_structs.insert(
      name.to_owned(),
      StructUniformDecl {
        def: def.clone(),
        binding,
      },
    );

    Ok(())
  }

  /// Declare a vertex attribute with an automatic location.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if an attribute has the same name.
  pub fn attribute<T>(&mut self, name: &str) -> Result<Attribute<T>, Error>
  where
    T: ToType,
  {
    self.declare_attribute(name, None)
  }

  /// Declare a vertex attribute at a given location.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if an attribute has the same name.
  pub fn attribute_at<T>(&mut self, name: &str, location: u32) -> Result<Attribute<T>, Error>
  where
    T: ToType,
  {
    self.declare_attribute(name, Some(location))
  }

  fn declare_attribute<T>(
    &mut self,
    name: &str,
    location: Option<u32>,
  ) -> Result<Attribute<T>, Error>
  where
    T: ToType,
  {
    if self.attributes.contains_key(name) {
      return Err(Error::DuplicateDefinition {
        kind: "attribute",
        name: name.to_owned(),
      });
    }

    log::debug!("declaring attribute {} ({:?})", name, location);
    self.attributes.insert(
      name.to_owned(),
      AttributeDecl {
        ty: T::ty(),
        location,
      },
    );

    Ok(Attribute::new(name, location))
  }

  /// Declare a varying with default options.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a varying has the same name.
  pub fn varying<T>(&mut self, name: &str) -> Result<Varying<T>, Error>
  where
    T: ToType,
  {
    self.varying_with(name, VaryingOptions::default())
  }

  /// Declare a varying with explicit location, interpolation or sampling.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a varying has the same name.
  pub fn varying_with<T>(
    &mut self,
    name: &str,
    options: VaryingOptions,
  ) -> Result<Varying<T>, Error>
  where
    T: ToType,
  {
    if self.varyings.contains_key(name) {
      return Err(Error::DuplicateDefinition {
        kind: "varying",
        name: name.to_owned(),
      });
    }

    log::debug!("declaring varying {} ({:?})", name, options);
    self.varyings.insert(
      name.to_owned(),
      VaryingDecl {
        ty: T::ty(),
        options,
      },
    );

    Ok(Varying::new(name, options))
  }

  /// Declare a sampler with an automatic binding.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a uniform, struct uniform or sampler has the same name.
  pub fn sampler<K>(&mut self, name: &str) -> Result<Sampler<K>, Error>
  where
    K: SamplerType,
  {
    self.sampler_at(name, Binding::auto())
  }

  /// Declare a sampler with a requested binding.
  ///
  /// For kinds paired with a sampler object in WGSL, the sampler object takes the binding right after the texture.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a uniform, struct uniform or sampler has the same name.
  pub fn sampler_at<K>(&mut self, name: &str, binding: Binding) -> Result<Sampler<K>, Error>
  where
    K: SamplerType,
  {
    self.check_uniform_name(name)?;

    log::debug!("declaring {:?} sampler {} ({:?})", K::KIND, name, binding);
    self.samplers.insert(
      name.to_owned(),
      SamplerDecl {
        kind: K::KIND,
        binding,
      },
    );

    Ok(Sampler::new(name, binding.group, binding.binding))
  }

  /// Declare a fragment output with an automatic location.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if an output has the same name.
  pub fn output<T>(&mut self, name: &str) -> Result<FragmentOutput<T>, Error>
  where
    T: ToType,
  {
    self.declare_output(name, None)
  }

  /// Declare a fragment output at a given location.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if an output has the same name.
  pub fn output_at<T>(&mut self, name: &str, location: u32) -> Result<FragmentOutput<T>, Error>
  where
    T: ToType,
  {
    self.declare_output(name, Some(location))
  }

  fn declare_output<T>(
    &mut self,
    name: &str,
    location: Option<u32>,
  ) -> Result<FragmentOutput<T>, Error>
  where
    T: ToType,
  {
    if self.outputs.contains_key(name) {
      return Err(Error::DuplicateDefinition {
        kind: "output",
        name: name.to_owned(),
      });
    }

    log::debug!("declaring output {} ({:?})", name, location);
    self.outputs.insert(
      name.to_owned(),
      OutputDecl {
        ty: T::ty(),
        location,
      },
    );

    Ok(FragmentOutput::new(name, location))
  }

  /// Declare a global constant.
  ///
  /// Constants are only emitted in the entry points that use them.
  ///
  /// # Errors
  ///
  /// [`Error::InvalidArgument`] once the program holds 65536 constants.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::{lit, Program};
  ///
  /// let mut program = Program::new();
  /// let gamma = program.constant(lit!(2.2f32)).unwrap();
  /// ```
  pub fn constant<T>(&mut self, value: impl Into<Expr<T>>) -> Result<Expr<T>, Error>
  where
    T: ToType,
  {
    let handle = u16::try_from(self.constants.len()).map_err(|_| {
      Error::InvalidArgument(format!("too many constants ({})", self.constants.len()))
    })?;

    self.constants.push(ConstantDecl {
      ty: T::ty(),
      value: value.into().erased,
    });

    log::trace!("declaring constant glob_{}", handle);
    Ok(Expr::new(ErasedExpr::Var(ScopedHandle::global(handle))))
  }

  /// Declare a helper function.
  ///
  /// The closure is run right away to record the body of the function. Helpers are only emitted in the entry points
  /// that call them, directly or through other helpers.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if a helper function has the same name.
  ///
  /// # Examples
  ///
  /// ```
  /// use dualshade::{expr::Expr, scope::Scope, Program};
  ///
  /// let mut program = Program::new();
  /// let square = program
  ///   .fun("square", |_: &mut Scope<Expr<f32>>, x: Expr<f32>| &x * &x)
  ///   .unwrap();
  /// ```
  pub fn fun<F, R, A>(&mut self, name: &str, f: F) -> Result<FunHandle<R, A>, Error>
  where
    F: ToFun<R, A>,
  {
    if self.funs.contains_key(name) {
      return Err(Error::DuplicateDefinition {
        kind: "function",
        name: name.to_owned(),
      });
    }

    let def = f.build_fn();
    log::debug!(
      "declaring function {} ({} arguments, {} statements)",
      name,
      def.erased.args.len(),
      def.erased.scope.instructions().len()
    );
    self.funs.insert(name.to_owned(), def.erased);

    Ok(FunHandle::new(ErasedFunHandle::UserDefined(name.to_owned())))
  }

  /// Add a vertex entry point.
  ///
  /// The body is not run here, but the first time the entry point is needed.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if an entry point has the same name.
  pub fn vertex<F, B>(&mut self, name: &str, body: F) -> Result<(), Error>
  where
    F: Fn(&mut Scope<StageReturn>, &VertexShaderEnv) -> B + Send + Sync + 'static,
    B: BodyResult,
  {
    self.add_entry(name, Body::vertex(body))
  }

  /// Add a fragment entry point.
  ///
  /// The body is not run here, but the first time the entry point is needed.
  ///
  /// # Errors
  ///
  /// [`Error::DuplicateDefinition`] if an entry point has the same name.
  pub fn fragment<F, B>(&mut self, name: &str, body: F) -> Result<(), Error>
  where
    F: Fn(&mut Scope<StageReturn>, &FragmentShaderEnv) -> B + Send + Sync + 'static,
    B: BodyResult,
  {
    self.add_entry(name, Body::fragment(body))
  }

  fn add_entry(&mut self, name: &str, body: Body) -> Result<(), Error> {
    if self.entries.contains_key(name) {
      return Err(Error::DuplicateDefinition {
        kind: "entry point",
        name: name.to_owned(),
      });
    }

    let entry = EntryPoint::new(name, body);
    log::debug!("adding {} entry point {}", entry.stage(), name);
    self.entries.insert(name.to_owned(), entry);

    Ok(())
  }

  /// Names and stages of the entry points, in declaration order.
  pub fn entries(&self) -> impl Iterator<Item = (&str, ShaderStage)> {
    self
      .entries
      .iter()
      .map(|(name, entry)| (name.as_str(), entry.stage()))
  }

  /// Look an entry point up by name.
  ///
  /// # Errors
  ///
  /// [`Error::UnresolvedEntryPoint`] if there is no such entry point.
  pub fn entry(&self, name: &str) -> Result<EntryRef<'_>, Error> {
    self
      .entries
      .get(name)
      .map(|entry| EntryRef {
        program: self,
        entry,
      })
      .ok_or_else(|| Error::UnresolvedEntryPoint(name.to_owned()))
  }
}

/// An entry point of a [`Program`], ready to be emitted.
#[derive(Clone, Copy, Debug)]
pub struct EntryRef<'a> {
  program: &'a Program,
  entry: &'a EntryPoint,
}

impl<'a> EntryRef<'a> {
  /// Name of the entry point.
  pub fn name(&self) -> &'a str {
    self.entry.name()
  }

  /// Stage of the entry point.
  pub fn stage(&self) -> ShaderStage {
    self.entry.stage()
  }

  /// Recorded body of the entry point.
  ///
  /// # Errors
  ///
  /// Whatever error the body returned when it was recorded.
  pub fn scope(&self) -> Result<&'a ErasedScope, Error> {
    self.entry.scope()
  }

  /// What the entry point transitively uses.
  ///
  /// # Errors
  ///
  /// Recording errors, [`Error::MissingValue`] for undeclared resources or helpers, and [`Error::InvalidArgument`] for
  /// resources used in the wrong stage.
  pub fn analysis(&self) -> Result<&'a Analysis, Error> {
    let program = self.program;
    let stage = self.stage();
    self
      .entry
      .analysis(|scope| Analysis::of(program, stage, scope))
  }

  /// The paired entry point named in the options, if any.
  fn peer(&self, options: &WgslOptions) -> Result<Option<EntryRef<'a>>, Error> {
    let name = match options.peer {
      Some(ref name) => name,
      None => return Ok(None),
    };

    let peer = self.program.entry(name)?;
    if peer.stage() == self.stage() {
      return Err(Error::InvalidArgument(format!(
        "entry point {} cannot be paired with {}: both are {} entry points",
        self.name(),
        peer.name(),
        self.stage()
      )));
    }

    Ok(Some(peer))
  }

  /// Locations and bindings the WGSL output of this entry point uses.
  ///
  /// With a peer in the options, varyings and bindings are allocated over both entry points so that they agree.
  ///
  /// # Errors
  ///
  /// Analysis errors, [`Error::UnresolvedEntryPoint`] and [`Error::InvalidArgument`] for a bad peer, and
  /// [`Error::IndexCollision`] when two explicit requests conflict.
  pub fn layout(&self, options: &WgslOptions) -> Result<ResourceLayout, Error> {
    let analysis = self.analysis()?;
    let peer = match self.peer(options)? {
      Some(peer) => Some(peer.analysis()?),
      None => None,
    };

    ResourceLayout::allocate(self.program, self.stage(), analysis, peer)
  }

  /// Emit the entry point as a GLSL (ES) shader.
  ///
  /// # Errors
  ///
  /// Analysis and allocation errors, and [`Error::InvalidArgument`] for constructs the chosen version cannot express.
  pub fn to_glsl(&self, options: &GlslOptions) -> Result<String, Error> {
    let analysis = self.analysis()?;
    let layout = ResourceLayout::allocate(self.program, self.stage(), analysis, None)?;

    log::debug!(
      "emitting {} entry point {} as GLSL {:?}",
      self.stage(),
      self.name(),
      options.version
    );

    glsl::write_entry(
      &EntryContext {
        program: self.program,
        name: self.name(),
        stage: self.stage(),
        scope: self.scope()?,
        analysis,
        layout: &layout,
      },
      options,
    )
  }

  /// Emit the entry point as a WGSL module.
  ///
  /// # Errors
  ///
  /// Analysis and allocation errors, and [`Error::InvalidArgument`] for stage inputs or outputs used in helpers.
  pub fn to_wgsl(&self, options: &WgslOptions) -> Result<String, Error> {
    let analysis = self.analysis()?;
    let layout = self.layout(options)?;

    log::debug!(
      "emitting {} entry point {} as WGSL",
      self.stage(),
      self.name()
    );

    wgsl::write_entry(
      &EntryContext {
        program: self.program,
        name: self.name(),
        stage: self.stage(),
        scope: self.scope()?,
        analysis,
        layout: &layout,
      },
      options,
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    lit,
    types::{V2, V3},
  };

  #[test]
  fn duplicate_uniform_names() {
    let mut program = Program::new();
    program.uniform::<f32>("time").unwrap();

    assert_eq!(
      program.uniform::<i32>("time").unwrap_err(),
      Error::DuplicateDefinition {
        kind: "uniform",
        name: "time".to_owned()
      }
    );
    assert!(matches!(
      program.sampler::<crate::sampler::Tex2D>("time"),
      Err(Error::DuplicateDefinition { kind: "uniform", .. })
    ));

    // other namespaces are separate
    assert!(program.varying::<f32>("time").is_ok());
    assert!(program.attribute::<f32>("time").is_ok());
  }

  #[test]
  fn conflicting_struct_definitions() {
    let mut program = Program::new();
    let light = StructDef::new("Light").field::<V3<f32>>("position");
    let other_light = StructDef::new("Light").field::<f32>("intensity");

    program
      .uniform_struct_dyn("sun", light.clone(), Binding::auto())
      .unwrap();
    program
      .uniform_struct_dyn("moon", light, Binding::auto())
      .unwrap();

    assert_eq!(
      program
        .uniform_struct_dyn("lamp", other_light, Binding::auto())
        .unwrap_err(),
      Error::DuplicateDefinition {
        kind: "struct",
        name: "Light".to_owned()
      }
    );
    assert!(!program.uniform_structs.contains_key("lamp"));
  }

  #[test]
  fn duplicate_functions_and_entries() {
    let mut program = Program::new();

    program
      .fun("twice", |_: &mut Scope<Expr<f32>>, x: Expr<f32>| &x * 2.)
      .unwrap();
    assert!(matches!(
      program.fun("twice", |_: &mut Scope<Expr<f32>>, x: Expr<f32>| x),
      Err(Error::DuplicateDefinition {
        kind: "function",
        ..
      })
    ));

    program.vertex("main", |_, _| ()).unwrap();
    assert!(matches!(
      program.fragment("main", |_, _| ()),
      Err(Error::DuplicateDefinition {
        kind: "entry point",
        ..
      })
    ));
  }

  #[test]
  fn constants_are_globals() {
    let mut program = Program::new();
    let a = program.constant(lit!(1.5f32)).unwrap();
    let b = program.constant(lit!(1, 2)).unwrap();

    assert_eq!(a.erased, ErasedExpr::Var(ScopedHandle::Global(0)));
    assert_eq!(b.erased, ErasedExpr::Var(ScopedHandle::Global(1)));
    assert_eq!(program.constants[1].ty, V2::<i32>::ty());
  }

  #[test]
  fn constant_handles_run_out() {
    let mut program = Program::new();

    for _ in 0..=u16::MAX {
      program.constant(lit!(0f32)).unwrap();
    }

    let last = program.constants.len() - 1;
    assert!(matches!(
      program.constant(lit!(1f32)),
      Err(Error::InvalidArgument(_))
    ));
    assert_eq!(program.constants.len(), last + 1);
  }

  #[test]
  fn entries_by_name() {
    let mut program = Program::new();
    program.vertex("vs", |_, _| ()).unwrap();
    program.fragment("fs", |_, _| ()).unwrap();

    let stages: Vec<_> = program.entries().collect();
    assert_eq!(
      stages,
      vec![("vs", ShaderStage::Vertex), ("fs", ShaderStage::Fragment)]
    );
    assert_eq!(
      program.entry("nope").unwrap_err(),
      Error::UnresolvedEntryPoint("nope".to_owned())
    );
  }

  #[test]
  fn bad_peers() {
    let mut program = Program::new();
    program.vertex("vs", |_, _| ()).unwrap();
    program.vertex("other_vs", |_, _| ()).unwrap();

    let vs = program.entry("vs").unwrap();

    assert!(matches!(
      vs.layout(&WgslOptions::default().peer("other_vs")),
      Err(Error::InvalidArgument(_))
    ));
    assert_eq!(
      vs.layout(&WgslOptions::default().peer("fs")).unwrap_err(),
      Error::UnresolvedEntryPoint("fs".to_owned())
    );
  }
}
