//! WGSL writer.
//!
//! Stage inputs and outputs are not globals in WGSL: the writer synthesizes the parameter list and return type of the
//! entry point, wrapping them in `VertexOutput`, `FragmentInput` and `FragmentOut` structs when more than a single
//! value flows through, and rewrites the handles of the body to go through those structs.

use super::{
  binary_op, common_prec, float_to_string, handle_name, is_integral, needs_parens, splat, uint_to_string,
  write_comma_separated, write_indent, write_section, BinOp, BuildContext, EntryContext, GlslVersion, Prec,
  WgslOptions,
};
use crate::{
  builtin::{BuiltIn, FragmentBuiltIn, VertexBuiltIn},
  error::Error,
  expr::ErasedExpr,
  fun::{ErasedFun, ErasedFunHandle, ErasedReturn},
  resource::{Interpolation, Sampling},
  sampler::SamplerKind,
  scope::{ErasedScope, ScopeInstr, ScopedHandle},
  stage::ShaderStage,
  structs::{FieldType, StructDef},
  swizzle::{Swizzle, SwizzleSelector},
  types::{Dim, MatrixDim, PrimType, Type},
};
use indexmap::IndexMap;
use std::fmt;

const REMAP_DEPTH: &str = "output.position.z = (output.position.z + 1.0) * 0.5;";

/// Render an expression on its own.
pub(crate) fn expr_to_string(e: &ErasedExpr) -> Result<String, Error> {
  let writer = Writer {
    ctx: BuildContext::standalone(),
    entry: None,
    io: Io::default(),
  };

  let mut output = String::new();
  writer.write_expr(&mut output, e)?;
  Ok(output)
}

/// Write a whole entry point as a WGSL module.
pub(crate) fn write_entry(entry: &EntryContext, options: &WgslOptions) -> Result<String, Error> {
  let ctx = BuildContext {
    stage: Some(entry.stage),
    version: GlslVersion::default(),
    remap_depth: options.remap_depth && entry.stage == ShaderStage::Vertex,
    helper: false,
  };
  let io = Io::of(entry, ctx.remap_depth);
  log::trace!("writing {:?} with {:?}, {:?}", entry.name, ctx, io);

  let writer = Writer {
    ctx,
    entry: Some(entry),
    io,
  };

  let mut output = String::new();
  write_section(&mut output, |f| write_structs(f, entry))?;
  write_section(&mut output, |f| write_bindings(f, entry))?;
  write_section(&mut output, |f| write_constants(f, &writer, entry))?;

  for name in &entry.analysis.functions {
    let fun = entry
      .program
      .funs
      .get(name)
      .ok_or_else(|| Error::MissingValue(format!("function {}", name)))?;
    write_section(&mut output, |f| writer.in_helper().write_fun_def(f, name, fun))?;
  }

  write_section(&mut output, |f| write_io_structs(f, entry, &io))?;
  writer.write_main(&mut output)?;

  Ok(output)
}

/// How stage inputs and outputs flow in and out of the entry point.
#[derive(Clone, Copy, Debug, Default)]
struct Io<'a> {
  /// Vertex outputs go through a `VertexOutput` struct.
  vertex_output: bool,

  /// Fragment inputs come in a `FragmentInput` struct.
  fragment_input: bool,

  /// Fragment outputs go through a `FragmentOut` struct.
  fragment_out: bool,

  /// Field of `FragmentOut` the color built-in and returned values go to.
  color: &'a str,
}

impl<'a> Io<'a> {
  fn of(entry: &EntryContext<'a>, remap_depth: bool) -> Self {
    let analysis = entry.analysis;
    let no_value = analysis.returns_void || !analysis.returns_value;

    match entry.stage {
      ShaderStage::Vertex => Io {
        vertex_output: remap_depth
          || no_value
          || !analysis.varyings.is_empty()
          || analysis
            .builtins
            .contains(&BuiltIn::Vertex(VertexBuiltIn::Position)),
        ..Io::default()
      },

      ShaderStage::Fragment => Io {
        fragment_input: !analysis.varyings.is_empty(),
        fragment_out: no_value
          || !analysis.outputs.is_empty()
          || analysis
            .builtins
            .contains(&BuiltIn::Fragment(FragmentBuiltIn::FragColor)),
        color: entry.primary_output().unwrap_or("color"),
        ..Io::default()
      },
    }
  }
}

/// Struct definitions of the struct uniforms, dependencies first.
fn write_structs(f: &mut String, entry: &EntryContext) -> Result<(), Error> {
  use fmt::Write as _;

  let mut defs: IndexMap<&str, &StructDef> = IndexMap::new();
  for name in &entry.analysis.uniform_structs {
    let decl = entry
      .program
      .uniform_structs
      .get(name)
      .ok_or_else(|| Error::MissingValue(format!("struct uniform {}", name)))?;

    for def in decl.def.with_dependencies() {
      defs.entry(def.name()).or_insert(def);
    }
  }

  for (i, def) in defs.values().enumerate() {
    if i > 0 {
      f.push('\n');
    }

    writeln!(f, "struct {} {{", def.name())?;

    for (name, ty) in def.fields() {
      write_indent(f, 1)?;
      write!(f, "{}: ", name)?;

      match ty {
        FieldType::Value(ty) => write_type(f, ty)?,
        FieldType::Struct(def) => f.push_str(def.name()),
        FieldType::StructArray(def, len) => write!(f, "array<{}, {}>", def.name(), len)?,
      }

      f.push_str(",\n");
    }

    f.push_str("}\n");
  }

  Ok(())
}

fn write_bindings(f: &mut String, entry: &EntryContext) -> Result<(), Error> {
  use fmt::Write as _;

  let program = entry.program;
  let layout = entry.layout;

  for handle in &entry.analysis.bindings {
    match handle {
      ScopedHandle::Uniform(name) => {
        let decl = program
          .uniforms
          .get(name)
          .ok_or_else(|| Error::MissingValue(format!("uniform {}", name)))?;
        let point = layout
          .uniform(name)
          .ok_or_else(|| Error::MissingValue(format!("binding of {}", name)))?;

        write!(
          f,
          "@group({}) @binding({}) var<uniform> {}: ",
          point.group, point.binding, name
        )?;
        write_type(f, &decl.ty)?;
        f.push_str(";\n");
      }

      ScopedHandle::UniformStruct(name) => {
        let decl = program
          .uniform_structs
          .get(name)
          .ok_or_else(|| Error::MissingValue(format!("struct uniform {}", name)))?;
        let point = layout
          .uniform(name)
          .ok_or_else(|| Error::MissingValue(format!("binding of {}", name)))?;

        writeln!(
          f,
          "@group({}) @binding({}) var<uniform> {}: {};",
          point.group,
          point.binding,
          name,
          decl.def.name()
        )?;
      }

      ScopedHandle::Sampler(name) => {
        let decl = program
          .samplers
          .get(name)
          .ok_or_else(|| Error::MissingValue(format!("sampler {}", name)))?;
        let binding = layout
          .sampler(name)
          .ok_or_else(|| Error::MissingValue(format!("binding of {}", name)))?;

        writeln!(
          f,
          "@group({}) @binding({}) var {}: {};",
          binding.group,
          binding.texture,
          name,
          texture_type(decl.kind)
        )?;

        if let Some(sampler) = binding.sampler {
          writeln!(
            f,
            "@group({}) @binding({}) var {}_sampler: sampler;",
            binding.group, sampler, name
          )?;
        }
      }

      _ => (),
    }
  }

  Ok(())
}

fn texture_type(kind: SamplerKind) -> &'static str {
  match kind {
    SamplerKind::Sampler2D => "texture_2d<f32>",
    SamplerKind::Sampler2DArray => "texture_2d_array<f32>",
    SamplerKind::Sampler3D => "texture_3d<f32>",
    SamplerKind::Depth => "texture_depth_2d",
    SamplerKind::Unsigned => "texture_2d<u32>",
  }
}

fn write_constants(f: &mut String, writer: &Writer, entry: &EntryContext) -> Result<(), Error> {
  use fmt::Write as _;

  for index in &entry.analysis.constants {
    let constant = entry
      .program
      .constants
      .get(usize::from(*index))
      .ok_or_else(|| Error::MissingValue(format!("glob_{}", index)))?;

    write!(f, "const glob_{}: ", index)?;
    write_type(f, &constant.ty)?;
    f.push_str(" = ");
    writer.write_expr(f, &constant.value)?;
    f.push_str(";\n");
  }

  Ok(())
}

/// `@interpolate(…)` attribute of a varying, if any.
fn interpolation_attr(ty: &Type, interpolation: Option<Interpolation>, sampling: Option<Sampling>) -> String {
  let interpolation = if is_integral(ty) {
    Some(Interpolation::Flat)
  } else {
    interpolation.or_else(|| sampling.map(|_| Interpolation::Perspective))
  };

  let interpolation = match interpolation {
    Some(Interpolation::Perspective) => "perspective",
    Some(Interpolation::Linear) => "linear",
    Some(Interpolation::Flat) => "flat",
    None => return String::new(),
  };

  match sampling {
    Some(Sampling::Center) if interpolation != "flat" => format!("@interpolate({}, center) ", interpolation),
    Some(Sampling::Centroid) if interpolation != "flat" => format!("@interpolate({}, centroid) ", interpolation),
    Some(Sampling::Sample) if interpolation != "flat" => format!("@interpolate({}, sample) ", interpolation),
    _ => format!("@interpolate({}) ", interpolation),
  }
}

fn write_varying_fields(f: &mut String, entry: &EntryContext) -> Result<(), Error> {
  use fmt::Write as _;

  for (name, location) in entry.varyings_by_location() {
    let decl = entry
      .program
      .varyings
      .get(name)
      .ok_or_else(|| Error::MissingValue(format!("varying {}", name)))?;

    write_indent(f, 1)?;
    write!(
      f,
      "@location({}) {}{}: ",
      location,
      interpolation_attr(&decl.ty, decl.options.interpolation, decl.options.sampling),
      name
    )?;
    write_type(f, &decl.ty)?;
    f.push_str(",\n");
  }

  Ok(())
}

fn write_io_structs(f: &mut String, entry: &EntryContext, io: &Io) -> Result<(), Error> {
  use fmt::Write as _;

  let analysis = entry.analysis;

  if io.vertex_output {
    f.push_str("struct VertexOutput {\n");
    write_indent(f, 1)?;
    f.push_str("@builtin(position) position: vec4<f32>,\n");
    write_varying_fields(f, entry)?;
    f.push_str("}\n");
  }

  if io.fragment_input {
    f.push_str("struct FragmentInput {\n");

    if analysis.uses_builtin(BuiltIn::Fragment(FragmentBuiltIn::FragCoord)) {
      write_indent(f, 1)?;
      f.push_str("@builtin(position) frag_coord: vec4<f32>,\n");
    }

    if analysis.uses_builtin(BuiltIn::Fragment(FragmentBuiltIn::FrontFacing)) {
      write_indent(f, 1)?;
      f.push_str("@builtin(front_facing) front_facing: bool,\n");
    }

    write_varying_fields(f, entry)?;
    f.push_str("}\n");
  }

  if io.fragment_out {
    if io.fragment_input {
      f.push('\n');
    }

    f.push_str("struct FragmentOut {\n");

    let outputs = entry.outputs_by_location();
    if outputs.is_empty() {
      write_indent(f, 1)?;
      f.push_str("@location(0) color: vec4<f32>,\n");
    }

    for (name, location) in outputs {
      let decl = entry
        .program
        .outputs
        .get(name)
        .ok_or_else(|| Error::MissingValue(format!("output {}", name)))?;

      write_indent(f, 1)?;
      write!(f, "@location({}) {}: ", location, name)?;
      write_type(f, &decl.ty)?;
      f.push_str(",\n");
    }

    f.push_str("}\n");
  }

  Ok(())
}

struct Writer<'a> {
  ctx: BuildContext,
  entry: Option<&'a EntryContext<'a>>,
  io: Io<'a>,
}

impl<'a> Writer<'a> {
  fn in_helper(&self) -> Self {
    Writer {
      ctx: self.ctx.in_helper(),
      entry: self.entry,
      io: self.io,
    }
  }

  fn write_main(&self, f: &mut String) -> Result<(), Error> {
    use fmt::Write as _;

    let entry = match self.entry {
      Some(entry) => entry,
      None => return Ok(()),
    };
    let analysis = entry.analysis;

    match entry.stage {
      ShaderStage::Vertex => {
        write!(f, "@vertex\nfn {}(", entry.name)?;

        let mut attributes: Vec<_> = entry.layout.attributes().collect();
        attributes.sort_by_key(|(_, location)| *location);

        let mut params = Vec::new();
        for (name, location) in attributes {
          let decl = entry
            .program
            .attributes
            .get(name)
            .ok_or_else(|| Error::MissingValue(format!("attribute {}", name)))?;

          let mut param = format!("@location({}) {}: ", location, name);
          write_type(&mut param, &decl.ty)?;
          params.push(param);
        }

        if analysis.uses_builtin(BuiltIn::Vertex(VertexBuiltIn::VertexID)) {
          params.push("@builtin(vertex_index) vertex_index: u32".to_owned());
        }

        if analysis.uses_builtin(BuiltIn::Vertex(VertexBuiltIn::InstanceID)) {
          params.push("@builtin(instance_index) instance_index: u32".to_owned());
        }

        f.push_str(&params.join(", "));

        if self.io.vertex_output {
          f.push_str(") -> VertexOutput {\n");
          write_indent(f, 1)?;
          f.push_str("var output: VertexOutput;\n");
        } else {
          f.push_str(") -> @builtin(position) vec4<f32> {\n");
        }

        if analysis.uses_builtin(BuiltIn::Vertex(VertexBuiltIn::PointSize)) {
          write_indent(f, 1)?;
          f.push_str("var point_size: f32 = 1.0;\n");
        }
      }

      ShaderStage::Fragment => {
        write!(f, "@fragment\nfn {}(", entry.name)?;

        if self.io.fragment_input {
          f.push_str("input: FragmentInput");
        } else {
          let mut params = Vec::new();

          if analysis.uses_builtin(BuiltIn::Fragment(FragmentBuiltIn::FragCoord)) {
            params.push("@builtin(position) frag_coord: vec4<f32>");
          }

          if analysis.uses_builtin(BuiltIn::Fragment(FragmentBuiltIn::FrontFacing)) {
            params.push("@builtin(front_facing) front_facing: bool");
          }

          f.push_str(&params.join(", "));
        }

        if self.io.fragment_out {
          f.push_str(") -> FragmentOut {\n");
          write_indent(f, 1)?;
          f.push_str("var frag_out: FragmentOut;\n");
        } else {
          f.push_str(") -> @location(0) vec4<f32> {\n");
        }
      }
    }

    self.write_scope(f, entry.scope, 1)?;

    let ends_with_return = matches!(entry.scope.instructions().last(), Some(ScopeInstr::Return(_)));
    if !ends_with_return {
      for line in self.tail() {
        write_indent(f, 1)?;
        writeln!(f, "{}", line)?;
      }
    }

    f.push_str("}\n");
    Ok(())
  }

  /// Statements returning the output struct, if any.
  fn tail(&self) -> Vec<&'static str> {
    if self.io.vertex_output {
      if self.ctx.remap_depth {
        vec![REMAP_DEPTH, "return output;"]
      } else {
        vec!["return output;"]
      }
    } else if self.io.fragment_out {
      vec!["return frag_out;"]
    } else {
      Vec::new()
    }
  }

  fn write_tail(&self, f: &mut impl fmt::Write, indent_lvl: usize) -> Result<(), Error> {
    let tail = self.tail();

    if tail.is_empty() {
      f.write_str("return;")?;
    }

    for (i, line) in tail.into_iter().enumerate() {
      if i > 0 {
        f.write_str("\n")?;
        write_indent(f, indent_lvl)?;
      }

      f.write_str(line)?;
    }

    Ok(())
  }

  fn write_fun_def(&self, f: &mut impl fmt::Write, name: &str, fun: &ErasedFun) -> Result<(), Error> {
    write!(f, "fn {}(", name)?;
    let args: Vec<_> = fun.args().iter().enumerate().collect();
    write_comma_separated(f, &args, |f, (i, ty)| {
      write!(f, "arg_{}: ", i)?;
      write_type(f, ty)
    })?;
    f.write_str(")")?;

    if let ErasedReturn::Expr(ty, _) = fun.ret() {
      f.write_str(" -> ")?;
      write_type(f, ty)?;
    }

    f.write_str(" {\n")?;
    self.write_scope(f, fun.scope(), 1)?;

    if let ErasedReturn::Expr(_, e) = fun.ret() {
      write_indent(f, 1)?;
      f.write_str("return ")?;
      self.write_expr(f, e)?;
      f.write_str(";\n")?;
    }

    f.write_str("}\n")?;
    Ok(())
  }

  fn write_scope(
    &self,
    f: &mut impl fmt::Write,
    scope: &ErasedScope,
    indent_lvl: usize,
  ) -> Result<(), Error> {
    for instr in scope.instructions() {
      write_indent(f, indent_lvl)?;

      match instr {
        ScopeInstr::VarDecl {
          ty,
          handle,
          init_value,
        } => {
          write!(f, "var {}: ", handle_name(handle))?;
          write_type(f, ty)?;

          if let Some(e) = init_value {
            f.write_str(" = ")?;
            self.write_expr(f, e)?;
          }

          f.write_str(";")?;
        }

        ScopeInstr::Return(ErasedReturn::Void) => {
          if self.ctx.is_entry_body() {
            self.write_tail(f, indent_lvl)?;
          } else {
            f.write_str("return;")?;
          }
        }

        ScopeInstr::Return(ErasedReturn::Expr(_, e)) => {
          let target = match self.ctx.stage {
            Some(ShaderStage::Vertex) if self.ctx.is_entry_body() && self.io.vertex_output => {
              Some("output.position")
            }
            Some(ShaderStage::Fragment) if self.ctx.is_entry_body() && self.io.fragment_out => {
              Some(self.io.color)
            }
            _ => None,
          };

          match target {
            Some(target) => {
              if self.io.fragment_out {
                write!(f, "frag_out.{} = ", target)?;
              } else {
                write!(f, "{} = ", target)?;
              }

              self.write_expr(f, e)?;
              f.write_str(";\n")?;
              write_indent(f, indent_lvl)?;
              self.write_tail(f, indent_lvl)?;
            }

            None => {
              f.write_str("return ")?;
              self.write_expr(f, e)?;
              f.write_str(";")?;
            }
          }
        }

        ScopeInstr::Continue => f.write_str("continue;")?,

        ScopeInstr::Break => f.write_str("break;")?,

        ScopeInstr::Discard => f.write_str("discard;")?,

        ScopeInstr::If {
          condition,
          scope,
          else_ifs,
          else_scope,
        } => {
          f.write_str("if ")?;
          self.write_expr(f, condition)?;
          f.write_str(" {\n")?;
          self.write_scope(f, scope, indent_lvl + 1)?;
          write_indent(f, indent_lvl)?;
          f.write_str("}")?;

          for (condition, scope) in else_ifs {
            f.write_str(" else if ")?;
            self.write_expr(f, condition)?;
            f.write_str(" {\n")?;
            self.write_scope(f, scope, indent_lvl + 1)?;
            write_indent(f, indent_lvl)?;
            f.write_str("}")?;
          }

          if let Some(scope) = else_scope {
            f.write_str(" else {\n")?;
            self.write_scope(f, scope, indent_lvl + 1)?;
            write_indent(f, indent_lvl)?;
            f.write_str("}")?;
          }
        }

        ScopeInstr::For {
          init_ty,
          init_handle,
          init_expr,
          condition,
          post_expr,
          scope,
        } => {
          let counter = handle_name(init_handle);

          write!(f, "for (var {}: ", counter)?;
          write_type(f, init_ty)?;
          f.write_str(" = ")?;
          self.write_expr(f, init_expr)?;
          f.write_str("; ")?;
          self.write_expr(f, condition)?;
          write!(f, "; {} = ", counter)?;
          self.write_expr(f, post_expr)?;
          f.write_str(") {\n")?;

          self.write_scope(f, scope, indent_lvl + 1)?;
          write_indent(f, indent_lvl)?;
          f.write_str("}")?;
        }

        ScopeInstr::While { condition, scope } => {
          f.write_str("while ")?;
          self.write_expr(f, condition)?;
          f.write_str(" {\n")?;
          self.write_scope(f, scope, indent_lvl + 1)?;
          write_indent(f, indent_lvl)?;
          f.write_str("}")?;
        }

        ScopeInstr::MutateVar { var, bin_op, expr } => {
          self.write_expr(f, var)?;

          match bin_op {
            Some(op) => write!(f, " {} ", op.symbol())?,
            None => f.write_str(" = ")?,
          }

          self.write_expr(f, expr)?;
          f.write_str(";")?;
        }

        ScopeInstr::Raw { wgsl, .. } => f.write_str(wgsl)?,
      }

      f.write_str("\n")?;
    }

    Ok(())
  }

  fn prec(&self, e: &ErasedExpr) -> Prec {
    if let Some(prec) = common_prec(e) {
      return prec;
    }

    match e {
      ErasedExpr::FunCall(ErasedFunHandle::Mod, _) => Prec::Multiplicative,

      ErasedExpr::FunCall(
        ErasedFunHandle::VLt
        | ErasedFunHandle::VLte
        | ErasedFunHandle::VGt
        | ErasedFunHandle::VGte
        | ErasedFunHandle::VEq
        | ErasedFunHandle::VNeq,
        _,
      ) => Prec::Other,

      ErasedExpr::FunCall(ErasedFunHandle::VNot, _) => Prec::Unary,

      _ if is_frag_coord_y(e) => Prec::Unary,

      _ => Prec::Atomic,
    }
  }

  fn write_operand(
    &self,
    f: &mut impl fmt::Write,
    op: BinOp,
    rhs: bool,
    e: &ErasedExpr,
  ) -> Result<(), Error> {
    if needs_parens(op, rhs, self.prec(e)) {
      f.write_str("(")?;
      self.write_expr(f, e)?;
      f.write_str(")")?;
      Ok(())
    } else {
      self.write_expr(f, e)
    }
  }

  /// Operand of a unary operator or base of a postfix access.
  fn write_atom(&self, f: &mut impl fmt::Write, e: &ErasedExpr) -> Result<(), Error> {
    if self.prec(e) == Prec::Atomic {
      self.write_expr(f, e)
    } else {
      f.write_str("(")?;
      self.write_expr(f, e)?;
      f.write_str(")")?;
      Ok(())
    }
  }

  fn write_binary(
    &self,
    f: &mut impl fmt::Write,
    a: &ErasedExpr,
    op: &str,
    class: BinOp,
    b: &ErasedExpr,
  ) -> Result<(), Error> {
    self.write_operand(f, class, false, a)?;
    write!(f, " {} ", op)?;
    self.write_operand(f, class, true, b)
  }

  fn write_expr(&self, f: &mut impl fmt::Write, e: &ErasedExpr) -> Result<(), Error> {
    match e {
      ErasedExpr::LitInt(x) => write!(f, "{}", x)?,
      ErasedExpr::LitUInt(x) => f.write_str(&uint_to_string(*x))?,
      ErasedExpr::LitFloat(x) => f.write_str(&float_to_string(*x))?,
      ErasedExpr::LitBool(x) => write!(f, "{}", x)?,

      ErasedExpr::LitInt2(v) => write_vector(f, "vec2<i32>", v, i32::to_string)?,
      ErasedExpr::LitUInt2(v) => write_vector(f, "vec2<u32>", v, |x| uint_to_string(*x))?,
      ErasedExpr::LitFloat2(v) => write_vector(f, "vec2<f32>", v, |x| float_to_string(*x))?,
      ErasedExpr::LitBool2(v) => write_vector(f, "vec2<bool>", v, bool::to_string)?,
      ErasedExpr::LitInt3(v) => write_vector(f, "vec3<i32>", v, i32::to_string)?,
      ErasedExpr::LitUInt3(v) => write_vector(f, "vec3<u32>", v, |x| uint_to_string(*x))?,
      ErasedExpr::LitFloat3(v) => write_vector(f, "vec3<f32>", v, |x| float_to_string(*x))?,
      ErasedExpr::LitBool3(v) => write_vector(f, "vec3<bool>", v, bool::to_string)?,
      ErasedExpr::LitInt4(v) => write_vector(f, "vec4<i32>", v, i32::to_string)?,
      ErasedExpr::LitUInt4(v) => write_vector(f, "vec4<u32>", v, |x| uint_to_string(*x))?,
      ErasedExpr::LitFloat4(v) => write_vector(f, "vec4<f32>", v, |x| float_to_string(*x))?,
      ErasedExpr::LitBool4(v) => write_vector(f, "vec4<bool>", v, bool::to_string)?,

      ErasedExpr::LitM22(m) => write_matrix(f, "mat2x2<f32>", &m.0)?,
      ErasedExpr::LitM33(m) => write_matrix(f, "mat3x3<f32>", &m.0)?,
      ErasedExpr::LitM44(m) => write_matrix(f, "mat4x4<f32>", &m.0)?,
      ErasedExpr::LitM43(m) => write_matrix(f, "mat4x3<f32>", &m.0)?,

      ErasedExpr::Array(ty, items) => {
        write_type(f, ty)?;
        f.write_str("(")?;
        write_comma_separated(f, items, |f, item| self.write_expr(f, item))?;
        f.write_str(")")?;
      }

      ErasedExpr::Var(handle) => self.write_handle(f, handle)?,

      ErasedExpr::Not(a) => {
        f.write_str("!")?;
        self.write_atom(f, a)?;
      }

      ErasedExpr::Neg(a) => {
        f.write_str("-")?;
        self.write_atom(f, a)?;
      }

      // WGSL has no logical xor
      ErasedExpr::Xor(a, b) => self.write_binary(f, a, "!=", BinOp::Other, b)?,

      ErasedExpr::And(..)
      | ErasedExpr::Or(..)
      | ErasedExpr::BitOr(..)
      | ErasedExpr::BitAnd(..)
      | ErasedExpr::BitXor(..)
      | ErasedExpr::Add(..)
      | ErasedExpr::Sub(..)
      | ErasedExpr::Mul(..)
      | ErasedExpr::Div(..)
      | ErasedExpr::Rem(..)
      | ErasedExpr::Shl(..)
      | ErasedExpr::Shr(..)
      | ErasedExpr::Eq(..)
      | ErasedExpr::Neq(..)
      | ErasedExpr::Lt(..)
      | ErasedExpr::Lte(..)
      | ErasedExpr::Gt(..)
      | ErasedExpr::Gte(..) => {
        if let Some((a, op, class, b)) = binary_op(e) {
          self.write_binary(f, a, op, class, b)?;
        }
      }

      ErasedExpr::FunCall(fun, args) => self.write_fun_call(f, fun, args)?,

      ErasedExpr::Swizzle(object, sw) => {
        if is_frag_coord_y(e) {
          // window coordinates grow downwards in WGSL
          f.write_str("-")?;
        }

        self.write_atom(f, object)?;
        f.write_str(".")?;

        for sel in sw.selectors() {
          f.write_char(sel.name())?;
        }
      }

      ErasedExpr::Field { object, field } => {
        self.write_atom(f, object)?;
        write!(f, ".{}", field)?;
      }

      ErasedExpr::ArrayLookup { object, index } => {
        self.write_atom(f, object)?;
        f.write_str("[")?;
        self.write_expr(f, index)?;
        f.write_str("]")?;
      }
    }

    Ok(())
  }

  fn write_fun_call(
    &self,
    f: &mut impl fmt::Write,
    fun: &ErasedFunHandle,
    args: &[ErasedExpr],
  ) -> Result<(), Error> {
    let name: &str = match fun {
      ErasedFunHandle::Construct(prim_ty) => {
        write_prim_type(f, *prim_ty)?;
        f.write_str("(")?;
        write_comma_separated(f, args, |f, arg| self.write_expr(f, arg))?;
        f.write_str(")")?;
        return Ok(());
      }

      ErasedFunHandle::Radians => "radians",
      ErasedFunHandle::Degrees => "degrees",
      ErasedFunHandle::Sin => "sin",
      ErasedFunHandle::Cos => "cos",
      ErasedFunHandle::Tan => "tan",
      ErasedFunHandle::ASin => "asin",
      ErasedFunHandle::ACos => "acos",
      ErasedFunHandle::ATan => "atan",
      ErasedFunHandle::SinH => "sinh",
      ErasedFunHandle::CosH => "cosh",
      ErasedFunHandle::TanH => "tanh",
      ErasedFunHandle::ASinH => "asinh",
      ErasedFunHandle::ACosH => "acosh",
      ErasedFunHandle::ATanH => "atanh",

      ErasedFunHandle::Pow => "pow",
      ErasedFunHandle::Exp => "exp",
      ErasedFunHandle::Exp2 => "exp2",
      ErasedFunHandle::Log => "log",
      ErasedFunHandle::Log2 => "log2",
      ErasedFunHandle::Sqrt => "sqrt",
      ErasedFunHandle::InverseSqrt => "inverseSqrt",

      ErasedFunHandle::Abs => "abs",
      ErasedFunHandle::Sign => "sign",
      ErasedFunHandle::Floor => "floor",
      ErasedFunHandle::Trunc => "trunc",
      ErasedFunHandle::Round => "round",
      ErasedFunHandle::Ceil => "ceil",
      ErasedFunHandle::Fract => "fract",
      ErasedFunHandle::Mod => return self.write_binary_call(f, "%", BinOp::Rem, args),
      ErasedFunHandle::Min => "min",
      ErasedFunHandle::Max => "max",
      ErasedFunHandle::Clamp => "clamp",
      ErasedFunHandle::Mix => "mix",
      ErasedFunHandle::Step => "step",
      ErasedFunHandle::SmoothStep => "smoothstep",

      ErasedFunHandle::Length => "length",
      ErasedFunHandle::Distance => "distance",
      ErasedFunHandle::Dot => "dot",
      ErasedFunHandle::Cross => "cross",
      ErasedFunHandle::Normalize => "normalize",
      ErasedFunHandle::FaceForward => "faceForward",
      ErasedFunHandle::Reflect => "reflect",
      ErasedFunHandle::Refract => "refract",

      ErasedFunHandle::Transpose => "transpose",
      ErasedFunHandle::Determinant => "determinant",

      ErasedFunHandle::VLt => return self.write_binary_call(f, "<", BinOp::Other, args),
      ErasedFunHandle::VLte => return self.write_binary_call(f, "<=", BinOp::Other, args),
      ErasedFunHandle::VGt => return self.write_binary_call(f, ">", BinOp::Other, args),
      ErasedFunHandle::VGte => return self.write_binary_call(f, ">=", BinOp::Other, args),
      ErasedFunHandle::VEq => return self.write_binary_call(f, "==", BinOp::Other, args),
      ErasedFunHandle::VNeq => return self.write_binary_call(f, "!=", BinOp::Other, args),
      ErasedFunHandle::VAny => "any",
      ErasedFunHandle::VAll => "all",
      ErasedFunHandle::VNot => {
        f.write_str("!")?;
        if let Some(a) = args.first() {
          self.write_atom(f, a)?;
        }
        return Ok(());
      }

      ErasedFunHandle::Texture(kind) => return self.write_texture_sample(f, *kind, args),

      ErasedFunHandle::TexelFetch(_) => {
        f.write_str("textureLoad(")?;
        write_comma_separated(f, args, |f, arg| self.write_expr(f, arg))?;
        f.write_str(", 0)")?;
        return Ok(());
      }

      ErasedFunHandle::DFDX => "dpdx",
      ErasedFunHandle::DFDY => "dpdy",
      ErasedFunHandle::FWidth => "fwidth",

      ErasedFunHandle::UserDefined(name) => name,
    };

    write!(f, "{}(", name)?;
    write_comma_separated(f, args, |f, arg| self.write_expr(f, arg))?;
    f.write_str(")")?;

    Ok(())
  }

  /// Functions that are operators in WGSL.
  fn write_binary_call(
    &self,
    f: &mut impl fmt::Write,
    op: &str,
    class: BinOp,
    args: &[ErasedExpr],
  ) -> Result<(), Error> {
    match args {
      [a, b] => self.write_binary(f, a, op, class, b),
      _ => Err(Error::InvalidArgument(format!(
        "{} expects 2 operands, got {}",
        op,
        args.len()
      ))),
    }
  }

  fn write_texture_sample(
    &self,
    f: &mut impl fmt::Write,
    kind: SamplerKind,
    args: &[ErasedExpr],
  ) -> Result<(), Error> {
    let (texture, coords) = match args {
      [texture, coords] => (texture, coords),
      _ => {
        return Err(Error::InvalidArgument(format!(
          "texture sampling expects 2 arguments, got {}",
          args.len()
        )))
      }
    };

    // implicit derivatives only exist in fragment shaders
    let vertex = self.ctx.stage == Some(ShaderStage::Vertex);
    f.write_str(if vertex { "textureSampleLevel(" } else { "textureSample(" })?;

    self.write_expr(f, texture)?;
    f.write_str(", ")?;
    self.write_expr(f, texture)?;
    f.write_str("_sampler, ")?;

    if kind == SamplerKind::Sampler2DArray {
      // GLSL picks the nearest layer
      self.write_atom(f, coords)?;
      f.write_str(".xy, i32(round(")?;
      self.write_atom(f, coords)?;
      f.write_str(".z))")?;
    } else {
      self.write_expr(f, coords)?;
    }

    if vertex {
      f.write_str(", 0.0")?;
    }

    f.write_str(")")?;
    Ok(())
  }

  /// Stage inputs and outputs are entry point parameters and results; helpers cannot reach them.
  fn check_stage_io(&self, what: impl fmt::Display) -> Result<(), Error> {
    if self.ctx.helper {
      Err(Error::InvalidArgument(format!(
        "{} cannot be used in a helper function in WGSL",
        what
      )))
    } else {
      Ok(())
    }
  }

  fn write_handle(&self, f: &mut impl fmt::Write, handle: &ScopedHandle) -> Result<(), Error> {
    let entry_body = self.ctx.is_entry_body();

    match handle {
      ScopedHandle::BuiltIn(builtin) => self.write_builtin(f, *builtin)?,

      ScopedHandle::Attribute(name) => {
        self.check_stage_io(name)?;
        f.write_str(name)?;
      }

      ScopedHandle::Varying(name) => {
        self.check_stage_io(name)?;

        match self.ctx.stage {
          Some(ShaderStage::Vertex) if entry_body => write!(f, "output.{}", name)?,
          Some(ShaderStage::Fragment) if entry_body => write!(f, "input.{}", name)?,
          _ => f.write_str(name)?,
        }
      }

      ScopedHandle::Output(name) => {
        self.check_stage_io(name)?;

        if entry_body {
          write!(f, "frag_out.{}", name)?;
        } else {
          f.write_str(name)?;
        }
      }

      _ => f.write_str(&handle_name(handle))?,
    }

    Ok(())
  }

  fn write_builtin(&self, f: &mut impl fmt::Write, builtin: BuiltIn) -> Result<(), Error> {
    let entry_body = self.ctx.is_entry_body();
    self.check_stage_io(format_args!("{:?}", builtin))?;

    if entry_body && builtin == BuiltIn::Fragment(FragmentBuiltIn::FragColor) {
      write!(f, "frag_out.{}", self.io.color)?;
      return Ok(());
    }

    let name = match builtin {
      BuiltIn::Vertex(VertexBuiltIn::VertexID) => "i32(vertex_index)",
      BuiltIn::Vertex(VertexBuiltIn::InstanceID) => "i32(instance_index)",
      BuiltIn::Vertex(VertexBuiltIn::Position) if entry_body => "output.position",
      BuiltIn::Vertex(VertexBuiltIn::Position) => "position",
      BuiltIn::Vertex(VertexBuiltIn::PointSize) => "point_size",
      BuiltIn::Fragment(FragmentBuiltIn::FragCoord) if entry_body && self.io.fragment_input => {
        "input.frag_coord"
      }
      BuiltIn::Fragment(FragmentBuiltIn::FragCoord) => "frag_coord",
      BuiltIn::Fragment(FragmentBuiltIn::FrontFacing) if entry_body && self.io.fragment_input => {
        "input.front_facing"
      }
      BuiltIn::Fragment(FragmentBuiltIn::FrontFacing) => "front_facing",
      BuiltIn::Fragment(FragmentBuiltIn::FragColor) => "color",
    };

    f.write_str(name)?;
    Ok(())
  }
}

/// Whether `e` is `frag_coord.y`.
fn is_frag_coord_y(e: &ErasedExpr) -> bool {
  match e {
    ErasedExpr::Swizzle(object, Swizzle::D1(SwizzleSelector::Y)) => matches!(
      object.as_ref(),
      ErasedExpr::Var(ScopedHandle::BuiltIn(BuiltIn::Fragment(FragmentBuiltIn::FragCoord)))
    ),
    _ => false,
  }
}

fn write_vector<T>(
  f: &mut impl fmt::Write,
  ctor: &str,
  components: &[T],
  show: impl Fn(&T) -> String,
) -> Result<(), Error>
where
  T: PartialEq,
{
  write!(f, "{}(", ctor)?;
  write_comma_separated(f, splat(components), |f, x| {
    f.write_str(&show(x))?;
    Ok(())
  })?;
  f.write_str(")")?;

  Ok(())
}

fn write_matrix<const M: usize, const N: usize>(
  f: &mut impl fmt::Write,
  ctor: &str,
  m: &[[f32; N]; M],
) -> Result<(), Error> {
  let components: Vec<_> = m.iter().flatten().map(|x| float_to_string(*x)).collect();
  write!(f, "{}({})", ctor, components.join(", "))?;
  Ok(())
}

fn write_prim_type(f: &mut impl fmt::Write, prim_ty: PrimType) -> Result<(), Error> {
  let (dim, scalar) = match prim_ty {
    PrimType::Int(dim) => (dim, "i32"),
    PrimType::UInt(dim) => (dim, "u32"),
    PrimType::Float(dim) => (dim, "f32"),
    PrimType::Bool(dim) => (dim, "bool"),

    PrimType::Matrix(dim) => {
      let name = match dim {
        MatrixDim::D22 => "mat2x2<f32>",
        MatrixDim::D33 => "mat3x3<f32>",
        MatrixDim::D44 => "mat4x4<f32>",
        MatrixDim::D43 => "mat4x3<f32>",
      };

      f.write_str(name)?;
      return Ok(());
    }
  };

  match dim {
    Dim::Scalar => f.write_str(scalar)?,
    Dim::D2 => write!(f, "vec2<{}>", scalar)?,
    Dim::D3 => write!(f, "vec3<{}>", scalar)?,
    Dim::D4 => write!(f, "vec4<{}>", scalar)?,
  }

  Ok(())
}

/// Write a type; arrays nest from the innermost dimension: `array<array<f32, 2>, 3>`.
fn write_type(f: &mut impl fmt::Write, ty: &Type) -> Result<(), Error> {
  for _ in &ty.array_dims {
    f.write_str("array<")?;
  }

  write_prim_type(f, ty.prim_ty)?;

  for dim in ty.array_dims.iter().rev() {
    write!(f, ", {}>", dim)?;
  }

  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    builtin::BuiltIn,
    expr::Expr,
    lit, sw,
    swizzle::Swizzlable as _,
    types::{V2, V4},
  };

  fn uniform<T>(name: &str) -> Expr<T> {
    Expr::new(ErasedExpr::Var(ScopedHandle::Uniform(name.to_owned())))
  }

  #[test]
  fn literals() {
    assert_eq!(lit!(1).to_wgsl().unwrap(), "1");
    assert_eq!(lit!(3u32).to_wgsl().unwrap(), "3u");
    assert_eq!(lit!(1., 1., 1.).to_wgsl().unwrap(), "vec3<f32>(1.0)");
    assert_eq!(
      lit!(1., 0., 0., 1.).to_wgsl().unwrap(),
      "vec4<f32>(1.0, 0.0, 0.0, 1.0)"
    );
    assert_eq!(lit!(1, 2).to_wgsl().unwrap(), "vec2<i32>(1, 2)");
    assert_eq!(lit!([1, 2, 3]).to_wgsl().unwrap(), "array<i32, 3>(1, 2, 3)");
  }

  #[test]
  fn types() {
    let nested = Type {
      prim_ty: PrimType::Float(Dim::D3),
      array_dims: vec![3, 2],
    };
    let mut s = String::new();
    write_type(&mut s, &nested).unwrap();
    assert_eq!(s, "array<array<vec3<f32>, 2>, 3>");

    let m43 = Type {
      prim_ty: PrimType::Matrix(MatrixDim::D43),
      array_dims: Vec::new(),
    };
    let mut s = String::new();
    write_type(&mut s, &m43).unwrap();
    assert_eq!(s, "mat4x3<f32>");
  }

  #[test]
  fn operators() {
    let a = uniform::<f32>("a");
    let b = uniform::<f32>("b");
    let c = uniform::<f32>("c");

    assert_eq!(((&a + &b) * &c).to_wgsl().unwrap(), "(a + b) * c");
    assert_eq!(((&a + &b) % &c).to_wgsl().unwrap(), "(a + b) % c");
    assert_eq!((&a).lt(&b).xor((&b).lt(&c)).to_wgsl().unwrap(), "(a < b) != (b < c)");
  }

  #[test]
  fn frag_coord_y_is_flipped() {
    let frag_coord = Expr::<V4<f32>>::new(ErasedExpr::new_builtin(BuiltIn::Fragment(
      FragmentBuiltIn::FragCoord,
    )));

    assert_eq!(sw!(frag_coord, .y).to_wgsl().unwrap(), "-frag_coord.y");
    assert_eq!(sw!(frag_coord, .x).to_wgsl().unwrap(), "frag_coord.x");
    assert_eq!((sw!(frag_coord, .y) * 2.).to_wgsl().unwrap(), "-frag_coord.y * 2.0");

    let xy: Expr<V2<f32>> = sw!(frag_coord, .x.y);
    assert_eq!(xy.to_glsl().unwrap(), "gl_FragCoord.xy");
  }

  #[test]
  fn vertex_index_is_signed() {
    let vertex_index = Expr::<i32>::new(ErasedExpr::new_builtin(BuiltIn::Vertex(
      VertexBuiltIn::VertexID,
    )));
    assert_eq!((vertex_index + 1).to_wgsl().unwrap(), "i32(vertex_index) + 1");
  }
}
