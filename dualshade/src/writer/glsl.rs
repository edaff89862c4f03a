//! GLSL writer.
//!
//! Emits GLSL ES 1.00 (WebGL 1) or GLSL ES 3.00 (WebGL 2) shaders.

use super::{
  binary_op, common_prec, float_to_string, handle_name, is_integral, needs_parens, splat, uint_to_string,
  write_comma_separated, write_indent, write_section, BinOp, BuildContext, EntryContext, GlslOptions, GlslVersion,
  Prec,
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
  types::{Dim, MatrixDim, PrimType, Type},
};
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// Render an expression on its own.
pub(crate) fn expr_to_string(e: &ErasedExpr) -> Result<String, Error> {
  let writer = Writer {
    ctx: BuildContext::standalone(),
    entry: None,
    frag_color: "gl_FragColor".to_owned(),
  };

  let mut output = String::new();
  writer.write_expr(&mut output, e)?;
  Ok(output)
}

/// Write a whole entry point as a GLSL shader.
pub(crate) fn write_entry(entry: &EntryContext, options: &GlslOptions) -> Result<String, Error> {
  let ctx = BuildContext {
    stage: Some(entry.stage),
    version: options.version,
    remap_depth: false,
    helper: false,
  };
  log::trace!("writing {:?} with {:?}", entry.name, ctx);

  let writer = Writer {
    ctx,
    entry: Some(entry),
    frag_color: frag_color(entry, options.version),
  };

  let mut output = String::new();
  write_section(&mut output, |f| write_header(f, entry, options))?;
  write_section(&mut output, |f| write_inputs(f, entry, options.version))?;
  write_section(&mut output, |f| write_outputs(f, entry, options.version))?;
  write_section(&mut output, |f| write_uniforms(f, entry, options.version))?;
  write_section(&mut output, |f| write_constants(f, &writer, entry))?;

  for name in &entry.analysis.functions {
    let fun = entry
      .program
      .funs
      .get(name)
      .ok_or_else(|| Error::MissingValue(format!("function {}", name)))?;
    write_section(&mut output, |f| writer.in_helper().write_fun_def(f, name, fun))?;
  }

  output.push_str("void main() {\n");
  writer.write_scope(&mut output, entry.scope, 1)?;
  output.push_str("}\n");

  Ok(output)
}

/// What the color built-in renders to.
fn frag_color(entry: &EntryContext, version: GlslVersion) -> String {
  let primary = entry.primary_output();

  match (version, primary) {
    (GlslVersion::V1, Some(name)) => format!(
      "gl_FragData[{}]",
      entry.layout.output(name).unwrap_or_default()
    ),
    (GlslVersion::V1, None) => "gl_FragColor".to_owned(),
    (GlslVersion::V2, Some(name)) => name.to_owned(),
    (GlslVersion::V2, None) => "color".to_owned(),
  }
}

fn write_header(f: &mut String, entry: &EntryContext, options: &GlslOptions) -> Result<(), Error> {
  use fmt::Write as _;

  match options.version {
    GlslVersion::V1 => {
      let uses_3d = entry.analysis.samplers.iter().any(|name| {
        entry
          .program
          .samplers
          .get(name)
          .map_or(false, |decl| decl.kind == SamplerKind::Sampler3D)
      });

      if uses_3d {
        f.push_str("#extension GL_OES_texture_3D : enable\n");
      }

      if entry.outputs_by_location().iter().any(|(_, location)| *location > 0) {
        f.push_str("#extension GL_EXT_draw_buffers : require\n");
      }
    }

    GlslVersion::V2 => f.push_str("#version 300 es\n"),
  }

  if let (ShaderStage::Fragment, Some(precision)) = (entry.stage, options.precision) {
    writeln!(f, "precision {} float;", precision.qualifier())?;
  }

  Ok(())
}

/// Attributes and varyings the entry point reads (or, for a vertex entry point, writes).
fn write_inputs(f: &mut String, entry: &EntryContext, version: GlslVersion) -> Result<(), Error> {
  use fmt::Write as _;

  if entry.stage == ShaderStage::Vertex {
    for name in &entry.analysis.attributes {
      let decl = entry
        .program
        .attributes
        .get(name)
        .ok_or_else(|| Error::MissingValue(format!("attribute {}", name)))?;

      match version {
        GlslVersion::V1 => f.push_str("attribute "),
        GlslVersion::V2 => write!(
          f,
          "layout(location = {}) in ",
          entry.layout.attribute(name).unwrap_or_default()
        )?,
      }

      write_decl(f, &decl.ty, name, version)?;
      f.push_str(";\n");
    }
  }

  for (name, _) in entry.varyings_by_location() {
    let decl = entry
      .program
      .varyings
      .get(name)
      .ok_or_else(|| Error::MissingValue(format!("varying {}", name)))?;

    match version {
      GlslVersion::V1 => f.push_str("varying "),

      GlslVersion::V2 => {
        let interpolation = decl
          .options
          .interpolation
          .or_else(|| is_integral(&decl.ty).then_some(Interpolation::Flat));

        match interpolation {
          Some(Interpolation::Perspective) => f.push_str("smooth "),
          Some(Interpolation::Linear) => f.push_str("noperspective "),
          Some(Interpolation::Flat) => f.push_str("flat "),
          None => (),
        }

        match decl.options.sampling {
          Some(Sampling::Centroid) => f.push_str("centroid "),
          Some(Sampling::Sample) => f.push_str("sample "),
          Some(Sampling::Center) | None => (),
        }

        match entry.stage {
          ShaderStage::Vertex => f.push_str("out "),
          ShaderStage::Fragment => f.push_str("in "),
        }
      }
    }

    write_decl(f, &decl.ty, name, version)?;
    f.push_str(";\n");
  }

  Ok(())
}

/// Fragment outputs; GLSL ES 1.00 only has the `gl_FragColor` and `gl_FragData` built-ins.
fn write_outputs(f: &mut String, entry: &EntryContext, version: GlslVersion) -> Result<(), Error> {
  use fmt::Write as _;

  if entry.stage != ShaderStage::Fragment || version == GlslVersion::V1 {
    return Ok(());
  }

  let outputs = entry.outputs_by_location();

  if outputs.is_empty() {
    let analysis = entry.analysis;
    if analysis.returns_value
      || analysis
        .builtins
        .contains(&BuiltIn::Fragment(FragmentBuiltIn::FragColor))
    {
      f.push_str("layout(location = 0) out vec4 color;\n");
    }

    return Ok(());
  }

  for (name, location) in outputs {
    let decl = entry
      .program
      .outputs
      .get(name)
      .ok_or_else(|| Error::MissingValue(format!("output {}", name)))?;

    write!(f, "layout(location = {}) out ", location)?;
    write_decl(f, &decl.ty, name, version)?;
    f.push_str(";\n");
  }

  Ok(())
}

fn write_uniforms(f: &mut String, entry: &EntryContext, version: GlslVersion) -> Result<(), Error> {
  use fmt::Write as _;

  let program = entry.program;
  let analysis = entry.analysis;
  let mut block_names = IndexMap::new();

  if !analysis.uniform_structs.is_empty() {
    if version == GlslVersion::V2 {
      f.push_str("layout(std140, column_major) uniform;\n");
    }

    // GLSL ES 3.00 blocks are not structs, so only what they nest is declared as such
    let mut defs: IndexMap<&str, &StructDef> = IndexMap::new();
    for name in &analysis.uniform_structs {
      let decl = program
        .uniform_structs
        .get(name)
        .ok_or_else(|| Error::MissingValue(format!("struct uniform {}", name)))?;

      let deps = decl.def.with_dependencies();
      let nested = match version {
        GlslVersion::V1 => &deps[..],
        GlslVersion::V2 => &deps[..deps.len().saturating_sub(1)],
      };

      for def in nested {
        defs.entry(def.name()).or_insert(def);
      }
    }

    for def in defs.values() {
      writeln!(f, "struct {} {{", def.name())?;
      write_fields(f, def, version)?;
      f.push_str("};\n");
    }

    if version == GlslVersion::V2 {
      block_names = uniform_block_names(entry, &defs)?;
    }
  }

  for handle in &analysis.bindings {
    match handle {
      ScopedHandle::Uniform(name) => {
        let decl = program
          .uniforms
          .get(name)
          .ok_or_else(|| Error::MissingValue(format!("uniform {}", name)))?;

        f.push_str("uniform ");
        write_decl(f, &decl.ty, name, version)?;
        f.push_str(";\n");
      }

      ScopedHandle::UniformStruct(name) => {
        let decl = program
          .uniform_structs
          .get(name)
          .ok_or_else(|| Error::MissingValue(format!("struct uniform {}", name)))?;

        match version {
          GlslVersion::V1 => writeln!(f, "uniform {} {};", decl.def.name(), name)?,

          GlslVersion::V2 => {
            let block = block_names
              .get(name.as_str())
              .map_or(decl.def.name(), String::as_str);
            writeln!(f, "uniform {} {{", block)?;
            write_fields(f, &decl.def, version)?;
            writeln!(f, "}} {};", name)?;
          }
        }
      }

      ScopedHandle::Sampler(name) => {
        let decl = program
          .samplers
          .get(name)
          .ok_or_else(|| Error::MissingValue(format!("sampler {}", name)))?;

        writeln!(f, "uniform {} {};", sampler_type(decl.kind, version)?, name)?;
      }

      _ => (),
    }
  }

  Ok(())
}

/// Block names of the struct uniforms of a GLSL ES 3.00 shader, by instance name.
///
/// A block is named after its struct, unless another used block has the same struct or a struct of that name is
/// declared; it is then suffixed with its instance name.
fn uniform_block_names(
  entry: &EntryContext,
  structs: &IndexMap<&str, &StructDef>,
) -> Result<IndexMap<String, String>, Error> {
  let mut blocks = Vec::new();
  for name in &entry.analysis.uniform_structs {
    let decl = entry
      .program
      .uniform_structs
      .get(name)
      .ok_or_else(|| Error::MissingValue(format!("struct uniform {}", name)))?;
    blocks.push((name, decl.def.name()));
  }

  let mut taken: IndexSet<String> = structs.keys().map(|name| (*name).to_owned()).collect();
  let mut names = IndexMap::new();

  for (instance, def) in &blocks {
    let shared = blocks.iter().filter(|(_, other)| other == def).count() > 1;

    let mut block = if shared || taken.contains(*def) {
      format!("{}_{}", def, instance)
    } else {
      (*def).to_owned()
    };

    while taken.contains(&block) {
      block.push('_');
    }

    taken.insert(block.clone());
    names.insert((*instance).clone(), block);
  }

  Ok(names)
}

fn write_fields(f: &mut String, def: &StructDef, version: GlslVersion) -> Result<(), Error> {
  use fmt::Write as _;

  for (name, ty) in def.fields() {
    write_indent(f, 1)?;

    match ty {
      FieldType::Value(ty) => write_decl(f, ty, name, version)?,
      FieldType::Struct(def) => write!(f, "{} {}", def.name(), name)?,
      FieldType::StructArray(def, len) => write!(f, "{} {}[{}]", def.name(), name, len)?,
    }

    f.push_str(";\n");
  }

  Ok(())
}

fn write_constants(f: &mut String, writer: &Writer, entry: &EntryContext) -> Result<(), Error> {
  for index in &entry.analysis.constants {
    let constant = entry
      .program
      .constants
      .get(usize::from(*index))
      .ok_or_else(|| Error::MissingValue(format!("glob_{}", index)))?;

    f.push_str("const ");
    write_decl(f, &constant.ty, &format!("glob_{}", index), writer.ctx.version)?;
    f.push_str(" = ");
    writer.write_expr(f, &constant.value)?;
    f.push_str(";\n");
  }

  Ok(())
}

fn sampler_type(kind: SamplerKind, version: GlslVersion) -> Result<&'static str, Error> {
  let ty = match (version, kind) {
    (GlslVersion::V1, SamplerKind::Sampler2D) => "sampler2D",
    (GlslVersion::V1, SamplerKind::Sampler3D) => "sampler3D",
    (GlslVersion::V1, kind) => return Err(unavailable_in_v1(format_args!("{:?} sampler", kind))),

    // samplers other than sampler2D have no default precision in GLSL ES 3.00
    (GlslVersion::V2, SamplerKind::Sampler2D) => "sampler2D",
    (GlslVersion::V2, SamplerKind::Sampler2DArray) => "highp sampler2DArray",
    (GlslVersion::V2, SamplerKind::Sampler3D) => "highp sampler3D",
    (GlslVersion::V2, SamplerKind::Depth) => "highp sampler2D",
    (GlslVersion::V2, SamplerKind::Unsigned) => "highp usampler2D",
  };

  Ok(ty)
}

struct Writer<'a> {
  ctx: BuildContext,
  entry: Option<&'a EntryContext<'a>>,
  frag_color: String,
}

impl<'a> Writer<'a> {
  fn in_helper(&self) -> Self {
    Writer {
      ctx: self.ctx.in_helper(),
      entry: self.entry,
      frag_color: self.frag_color.clone(),
    }
  }

  fn write_fun_def(&self, f: &mut impl fmt::Write, name: &str, fun: &ErasedFun) -> Result<(), Error> {
    match fun.ret() {
      ErasedReturn::Void => f.write_str("void")?,
      ErasedReturn::Expr(ty, _) => write_type(f, ty, self.ctx.version)?,
    }

    write!(f, " {}(", name)?;
    let args: Vec<_> = fun.args().iter().enumerate().collect();
    write_comma_separated(f, &args, |f, (i, ty)| {
      write_decl(f, ty, &format!("arg_{}", i), self.ctx.version)
    })?;
    f.write_str(") {\n")?;

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
          write_decl(f, ty, &handle_name(handle), self.ctx.version)?;

          if let Some(e) = init_value {
            f.write_str(" = ")?;
            self.write_expr(f, e)?;
          }

          f.write_str(";")?;
        }

        ScopeInstr::Return(ErasedReturn::Void) => f.write_str("return;")?,

        ScopeInstr::Return(ErasedReturn::Expr(_, e)) => match self.ctx.stage {
          Some(stage) if !self.ctx.helper => {
            match stage {
              ShaderStage::Vertex => f.write_str("gl_Position = ")?,
              ShaderStage::Fragment => write!(f, "{} = ", self.frag_color)?,
            }

            self.write_expr(f, e)?;
            f.write_str(";\n")?;
            write_indent(f, indent_lvl)?;
            f.write_str("return;")?;
          }

          _ => {
            f.write_str("return ")?;
            self.write_expr(f, e)?;
            f.write_str(";")?;
          }
        },

        ScopeInstr::Continue => f.write_str("continue;")?,

        ScopeInstr::Break => f.write_str("break;")?,

        ScopeInstr::Discard => f.write_str("discard;")?,

        ScopeInstr::If {
          condition,
          scope,
          else_ifs,
          else_scope,
        } => {
          f.write_str("if (")?;
          self.write_expr(f, condition)?;
          f.write_str(") {\n")?;
          self.write_scope(f, scope, indent_lvl + 1)?;
          write_indent(f, indent_lvl)?;
          f.write_str("}")?;

          for (condition, scope) in else_ifs {
            f.write_str(" else if (")?;
            self.write_expr(f, condition)?;
            f.write_str(") {\n")?;
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

          f.write_str("for (")?;
          write_decl(f, init_ty, &counter, self.ctx.version)?;
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
          f.write_str("while (")?;
          self.write_expr(f, condition)?;
          f.write_str(") {\n")?;
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

        ScopeInstr::Raw { glsl, .. } => f.write_str(glsl)?,
      }

      f.write_str("\n")?;
    }

    Ok(())
  }

  fn prec(&self, e: &ErasedExpr) -> Prec {
    common_prec(e).unwrap_or(Prec::Atomic)
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
    if self.ctx.version == GlslVersion::V1 {
      match e {
        ErasedExpr::LitUInt(_)
        | ErasedExpr::LitUInt2(_)
        | ErasedExpr::LitUInt3(_)
        | ErasedExpr::LitUInt4(_) => return Err(unavailable_in_v1("unsigned integer literal")),
        ErasedExpr::LitM43(_) => return Err(unavailable_in_v1("mat4x3")),
        _ => (),
      }
    }

    match e {
      ErasedExpr::LitInt(x) => write!(f, "{}", x)?,
      ErasedExpr::LitUInt(x) => f.write_str(&uint_to_string(*x))?,
      ErasedExpr::LitFloat(x) => f.write_str(&float_to_string(*x))?,
      ErasedExpr::LitBool(x) => write!(f, "{}", x)?,

      ErasedExpr::LitInt2(v) => write_vector(f, "ivec2", v, i32::to_string)?,
      ErasedExpr::LitUInt2(v) => write_vector(f, "uvec2", v, |x| uint_to_string(*x))?,
      ErasedExpr::LitFloat2(v) => write_vector(f, "vec2", v, |x| float_to_string(*x))?,
      ErasedExpr::LitBool2(v) => write_vector(f, "bvec2", v, bool::to_string)?,
      ErasedExpr::LitInt3(v) => write_vector(f, "ivec3", v, i32::to_string)?,
      ErasedExpr::LitUInt3(v) => write_vector(f, "uvec3", v, |x| uint_to_string(*x))?,
      ErasedExpr::LitFloat3(v) => write_vector(f, "vec3", v, |x| float_to_string(*x))?,
      ErasedExpr::LitBool3(v) => write_vector(f, "bvec3", v, bool::to_string)?,
      ErasedExpr::LitInt4(v) => write_vector(f, "ivec4", v, i32::to_string)?,
      ErasedExpr::LitUInt4(v) => write_vector(f, "uvec4", v, |x| uint_to_string(*x))?,
      ErasedExpr::LitFloat4(v) => write_vector(f, "vec4", v, |x| float_to_string(*x))?,
      ErasedExpr::LitBool4(v) => write_vector(f, "bvec4", v, bool::to_string)?,

      ErasedExpr::LitM22(m) => write_matrix(f, "mat2", &m.0)?,
      ErasedExpr::LitM33(m) => write_matrix(f, "mat3", &m.0)?,
      ErasedExpr::LitM44(m) => write_matrix(f, "mat4", &m.0)?,
      ErasedExpr::LitM43(m) => write_matrix(f, "mat4x3", &m.0)?,

      ErasedExpr::Array(ty, items) => {
        write_type(f, ty, self.ctx.version)?;
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

      ErasedExpr::Xor(a, b) => self.write_binary(f, a, "^^", BinOp::Other, b)?,

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
      ErasedFunHandle::Construct(prim_ty) => prim_type_name(*prim_ty, self.ctx.version)?,

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
      ErasedFunHandle::InverseSqrt => "inversesqrt",

      ErasedFunHandle::Abs => "abs",
      ErasedFunHandle::Sign => "sign",
      ErasedFunHandle::Floor => "floor",
      ErasedFunHandle::Trunc => "trunc",
      ErasedFunHandle::Round => "round",
      ErasedFunHandle::Ceil => "ceil",
      ErasedFunHandle::Fract => "fract",
      ErasedFunHandle::Mod => "mod",
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
      ErasedFunHandle::FaceForward => "faceforward",
      ErasedFunHandle::Reflect => "reflect",
      ErasedFunHandle::Refract => "refract",

      ErasedFunHandle::Transpose => "transpose",
      ErasedFunHandle::Determinant => "determinant",

      ErasedFunHandle::VLt => "lessThan",
      ErasedFunHandle::VLte => "lessThanEqual",
      ErasedFunHandle::VGt => "greaterThan",
      ErasedFunHandle::VGte => "greaterThanEqual",
      ErasedFunHandle::VEq => "equal",
      ErasedFunHandle::VNeq => "notEqual",
      ErasedFunHandle::VAny => "any",
      ErasedFunHandle::VAll => "all",
      ErasedFunHandle::VNot => "not",

      ErasedFunHandle::Texture(kind) => match (self.ctx.version, kind) {
        (GlslVersion::V2, _) => "texture",
        (GlslVersion::V1, SamplerKind::Sampler2D) => "texture2D",
        (GlslVersion::V1, SamplerKind::Sampler3D) => "texture3D",
        (GlslVersion::V1, kind) => return Err(unavailable_in_v1(format_args!("{:?} sampler", kind))),
      },

      ErasedFunHandle::TexelFetch(kind) => return self.write_texel_fetch(f, *kind, args),

      ErasedFunHandle::DFDX => "dFdx",
      ErasedFunHandle::DFDY => "dFdy",
      ErasedFunHandle::FWidth => "fwidth",

      ErasedFunHandle::UserDefined(name) => name,
    };

    write!(f, "{}(", name)?;
    write_comma_separated(f, args, |f, arg| self.write_expr(f, arg))?;
    f.write_str(")")?;

    Ok(())
  }

  fn write_texel_fetch(
    &self,
    f: &mut impl fmt::Write,
    kind: SamplerKind,
    args: &[ErasedExpr],
  ) -> Result<(), Error> {
    if self.ctx.version == GlslVersion::V1 {
      return Err(Error::InvalidArgument(
        "texel fetches are not available in GLSL ES 1.00".to_owned(),
      ));
    }

    f.write_str("texelFetch(")?;
    write_comma_separated(f, args, |f, arg| self.write_expr(f, arg))?;
    f.write_str(", 0)")?;

    if kind == SamplerKind::Depth {
      f.write_str(".r")?;
    }

    Ok(())
  }

  fn write_handle(&self, f: &mut impl fmt::Write, handle: &ScopedHandle) -> Result<(), Error> {
    match handle {
      ScopedHandle::BuiltIn(builtin) => self.write_builtin(f, *builtin)?,

      ScopedHandle::Output(name) => match (self.entry, self.ctx.version) {
        (Some(entry), GlslVersion::V1) => write!(
          f,
          "gl_FragData[{}]",
          entry.layout.output(name).unwrap_or_default()
        )?,

        _ => f.write_str(name)?,
      },

      _ => f.write_str(&handle_name(handle))?,
    }

    Ok(())
  }

  fn write_builtin(&self, f: &mut impl fmt::Write, builtin: BuiltIn) -> Result<(), Error> {
    let name: &str = match builtin {
      BuiltIn::Vertex(VertexBuiltIn::VertexID) => "gl_VertexID",
      BuiltIn::Vertex(VertexBuiltIn::InstanceID) => "gl_InstanceID",
      BuiltIn::Vertex(VertexBuiltIn::Position) => "gl_Position",
      BuiltIn::Vertex(VertexBuiltIn::PointSize) => "gl_PointSize",
      BuiltIn::Fragment(FragmentBuiltIn::FragCoord) => "gl_FragCoord",
      BuiltIn::Fragment(FragmentBuiltIn::FrontFacing) => "gl_FrontFacing",
      BuiltIn::Fragment(FragmentBuiltIn::FragColor) => &self.frag_color,
    };

    let webgl2_only = matches!(
      builtin,
      BuiltIn::Vertex(VertexBuiltIn::VertexID) | BuiltIn::Vertex(VertexBuiltIn::InstanceID)
    );
    if webgl2_only && self.entry.is_some() && self.ctx.version == GlslVersion::V1 {
      return Err(unavailable_in_v1(name));
    }

    f.write_str(name)?;
    Ok(())
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

/// Matrices are written column after column; they never collapse, since `mat4(1.0)` is the identity.
fn write_matrix<const M: usize, const N: usize>(
  f: &mut impl fmt::Write,
  ctor: &str,
  m: &[[f32; N]; M],
) -> Result<(), Error> {
  let components: Vec<_> = m.iter().flatten().map(|x| float_to_string(*x)).collect();
  write!(f, "{}({})", ctor, components.join(", "))?;
  Ok(())
}

fn prim_type_name(prim_ty: PrimType, version: GlslVersion) -> Result<&'static str, Error> {
  let name = match prim_ty {
    PrimType::Int(Dim::Scalar) => "int",
    PrimType::Int(Dim::D2) => "ivec2",
    PrimType::Int(Dim::D3) => "ivec3",
    PrimType::Int(Dim::D4) => "ivec4",

    PrimType::UInt(Dim::Scalar) => "uint",
    PrimType::UInt(Dim::D2) => "uvec2",
    PrimType::UInt(Dim::D3) => "uvec3",
    PrimType::UInt(Dim::D4) => "uvec4",

    PrimType::Float(Dim::Scalar) => "float",
    PrimType::Float(Dim::D2) => "vec2",
    PrimType::Float(Dim::D3) => "vec3",
    PrimType::Float(Dim::D4) => "vec4",

    PrimType::Bool(Dim::Scalar) => "bool",
    PrimType::Bool(Dim::D2) => "bvec2",
    PrimType::Bool(Dim::D3) => "bvec3",
    PrimType::Bool(Dim::D4) => "bvec4",

    PrimType::Matrix(MatrixDim::D22) => "mat2",
    PrimType::Matrix(MatrixDim::D33) => "mat3",
    PrimType::Matrix(MatrixDim::D44) => "mat4",
    PrimType::Matrix(MatrixDim::D43) => "mat4x3",
  };

  let unavailable = matches!(prim_ty, PrimType::UInt(_) | PrimType::Matrix(MatrixDim::D43));
  if version == GlslVersion::V1 && unavailable {
    return Err(unavailable_in_v1(name));
  }

  Ok(name)
}

fn unavailable_in_v1(what: impl fmt::Display) -> Error {
  Error::InvalidArgument(format!("{} is not available in GLSL ES 1.00", what))
}

/// Type as used in constructors: `float[3]`.
fn write_type(f: &mut impl fmt::Write, ty: &Type, version: GlslVersion) -> Result<(), Error> {
  f.write_str(prim_type_name(ty.prim_ty, version)?)?;

  for dim in &ty.array_dims {
    write!(f, "[{}]", dim)?;
  }

  Ok(())
}

/// Declaration of `name` with type `ty`: `float name[3]`.
fn write_decl(f: &mut impl fmt::Write, ty: &Type, name: &str, version: GlslVersion) -> Result<(), Error> {
  write!(f, "{} {}", prim_type_name(ty.prim_ty, version)?, name)?;

  for dim in &ty.array_dims {
    write!(f, "[{}]", dim)?;
  }

  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    expr::Expr,
    lit, sw,
    swizzle::Swizzlable as _,
    types::{V3, V4},
  };

  fn uniform<T>(name: &str) -> Expr<T> {
    Expr::new(ErasedExpr::Var(ScopedHandle::Uniform(name.to_owned())))
  }

  #[test]
  fn literals() {
    assert_eq!(lit!(1).to_glsl().unwrap(), "1");
    assert_eq!(lit!(3u32).to_glsl().unwrap(), "3u");
    assert_eq!(lit!(-0.5f32).to_glsl().unwrap(), "-0.5");
    assert_eq!(lit!(1., 1., 1.).to_glsl().unwrap(), "vec3(1.0)");
    assert_eq!(lit!(1., 0., 0., 1.).to_glsl().unwrap(), "vec4(1.0, 0.0, 0.0, 1.0)");
    assert_eq!(lit!(true, false).to_glsl().unwrap(), "bvec2(true, false)");
    assert_eq!(lit!([1, 2, 3]).to_glsl().unwrap(), "int[3](1, 2, 3)");
  }

  #[test]
  fn precedence() {
    let a = uniform::<f32>("a");
    let b = uniform::<f32>("b");
    let c = uniform::<f32>("c");

    assert_eq!(((&a + &b) * &c).to_glsl().unwrap(), "(a + b) * c");
    assert_eq!((&a + &b * &c).to_glsl().unwrap(), "a + b * c");
    assert_eq!((&a - (&b + &c)).to_glsl().unwrap(), "a - (b + c)");
    assert_eq!((&a / (&b * &c)).to_glsl().unwrap(), "a / (b * c)");
    assert_eq!((-(&a + &b)).to_glsl().unwrap(), "-(a + b)");
    assert_eq!((&a * -1.).to_glsl().unwrap(), "-a");
    assert_eq!(
      (&a + &b).lt(&c).and((&a).gt(0.)).to_glsl().unwrap(),
      "((a + b) < c) && (a > 0.0)"
    );
  }

  #[test]
  fn float_rem_is_mod() {
    let a = uniform::<f32>("a");
    assert_eq!((&a % 2.).to_glsl().unwrap(), "mod(a, 2.0)");
  }

  #[test]
  fn postfix() {
    let v = uniform::<V4<f32>>("v");
    let w = uniform::<V3<f32>>("w");

    assert_eq!(sw!(v, .x.y.z).to_glsl().unwrap(), "v.xyz");
    assert_eq!(sw!((&w + lit!(1., 1., 1.)), .x).to_glsl().unwrap(), "(w + vec3(1.0)).x");
  }
}
