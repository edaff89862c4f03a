//! Struct definitions and struct uniforms (uniform blocks).
//!
//! A [`StructDef`] is an ordered list of named fields, each either a value type (scalar, vector, matrix or an array of
//! those), a nested struct or an array of nested structs. Struct definitions are built by hand with the
//! [`StructDef`] builder methods, or derived from a Rust struct with `#[derive(UniformBlock)]`:
//!
//! ```
//! use dualshade::{types::{M44, V3}, UniformBlock};
//!
//! #[derive(UniformBlock)]
//! struct Light {
//!   position: V3<f32>,
//!   intensity: f32,
//! }
//!
//! #[derive(UniformBlock)]
//! struct Scene {
//!   view: M44,
//!   #[uniform(nested)]
//!   lights: [Light; 4],
//! }
//!
//! let def = Scene::struct_def();
//! assert_eq!(def.name(), "Scene");
//! ```
//!
//! Binding a struct definition to a uniform gives access to its fields as expressions, rendered `<instance>.<field>`
//! in both languages.

use crate::{
  error::Error,
  expr::{ErasedExpr, Expr},
  resource::Binding,
  scope::ScopedHandle,
  types::{ToType, Type},
};
use std::marker::PhantomData;

/// Type of a struct field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
  /// Scalar, vector, matrix or array of those.
  Value(Type),

  /// Nested struct.
  Struct(StructDef),

  /// Array of nested structs.
  StructArray(StructDef, usize),
}

impl FieldType {
  /// Struct definition this field depends on, if any.
  pub fn struct_def(&self) -> Option<&StructDef> {
    match self {
      FieldType::Value(_) => None,
      FieldType::Struct(def) | FieldType::StructArray(def, _) => Some(def),
    }
  }
}

/// Struct definition.
#[derive(Clone, Debug, PartialEq)]
pub struct StructDef {
  name: String,
  fields: Vec<(String, FieldType)>,
}

impl StructDef {
  /// Start a struct definition without fields.
  pub fn new(name: impl Into<String>) -> Self {
    StructDef {
      name: name.into(),
      fields: Vec::new(),
    }
  }

  /// Add a field of type `T`.
  pub fn field<T>(self, name: impl Into<String>) -> Self
  where
    T: ToType,
  {
    self.with_field(name, FieldType::Value(T::ty()))
  }

  /// Add a nested struct field.
  pub fn nested(self, name: impl Into<String>, def: StructDef) -> Self {
    self.with_field(name, FieldType::Struct(def))
  }

  /// Add an array of nested structs.
  pub fn nested_array(self, name: impl Into<String>, def: StructDef, len: usize) -> Self {
    self.with_field(name, FieldType::StructArray(def, len))
  }

  /// Add a field of any type.
  pub fn with_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
    self.fields.push((name.into(), ty));
    self
  }

  /// Name of the struct.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Fields, in declaration order.
  pub fn fields(&self) -> &[(String, FieldType)] {
    &self.fields
  }

  fn lookup(&self, field: &str) -> Result<&FieldType, Error> {
    self
      .fields
      .iter()
      .find(|(name, _)| name == field)
      .map(|(_, ty)| ty)
      .ok_or_else(|| Error::MissingValue(format!("{}.{}", self.name, field)))
  }

  /// This definition and all the definitions it depends on, dependencies first, each once.
  pub(crate) fn with_dependencies(&self) -> Vec<&StructDef> {
    let mut defs = Vec::new();
    self.collect_dependencies(&mut defs);
    defs
  }

  fn collect_dependencies<'a>(&'a self, defs: &mut Vec<&'a StructDef>) {
    for (_, ty) in &self.fields {
      if let Some(def) = ty.struct_def() {
        def.collect_dependencies(defs);
      }
    }

    if defs.iter().all(|def| def.name != self.name) {
      defs.push(self);
    }
  }
}

/// Rust types describing a uniform block.
///
/// Implemented by `#[derive(UniformBlock)]`.
pub trait UniformBlock {
  /// Typed accessors to the fields of the block.
  type Fields;

  /// Definition of the block.
  fn struct_def() -> StructDef;

  /// Accessors to the fields of `object`, which is an expression of this struct type.
  fn fields(object: ErasedExpr) -> Self::Fields;
}

#[doc(hidden)]
pub fn field<T>(object: &ErasedExpr, name: &str) -> Expr<T> {
  Expr::new(field_expr(object, name))
}

#[doc(hidden)]
pub fn field_expr(object: &ErasedExpr, name: &str) -> ErasedExpr {
  ErasedExpr::Field {
    object: Box::new(object.clone()),
    field: name.to_owned(),
  }
}

/// Accessors to an array of nested structs.
#[derive(Debug)]
pub struct StructArrayFields<S> {
  object: ErasedExpr,
  _phantom: PhantomData<S>,
}

impl<S> StructArrayFields<S>
where
  S: UniformBlock,
{
  #[doc(hidden)]
  pub fn new(object: ErasedExpr) -> Self {
    StructArrayFields {
      object,
      _phantom: PhantomData,
    }
  }

  /// Accessors to the struct at `index`.
  pub fn at(&self, index: impl Into<Expr<i32>>) -> S::Fields {
    S::fields(ErasedExpr::ArrayLookup {
      object: Box::new(self.object.clone()),
      index: Box::new(index.into().erased),
    })
  }
}

/// Marker for struct uniforms whose fields are only known at runtime.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DynStruct;

/// Struct uniform, obtained by declaring it on a [`Program`](crate::program::Program).
#[derive(Debug)]
pub struct UniformStruct<S> {
  name: String,
  binding: Binding,
  def: StructDef,
  _phantom: PhantomData<S>,
}

impl<S> Clone for UniformStruct<S> {
  fn clone(&self) -> Self {
    UniformStruct {
      name: self.name.clone(),
      binding: self.binding,
      def: self.def.clone(),
      _phantom: PhantomData,
    }
  }
}

impl<S> UniformStruct<S> {
  pub(crate) fn new(name: &str, binding: Binding, def: StructDef) -> Self {
    UniformStruct {
      name: name.to_owned(),
      binding,
      def,
      _phantom: PhantomData,
    }
  }

  /// Name of the uniform instance.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Requested binding.
  pub fn binding(&self) -> Binding {
    self.binding
  }

  /// Struct definition of the uniform.
  pub fn struct_def(&self) -> &StructDef {
    &self.def
  }

  fn object(&self) -> ErasedExpr {
    ErasedExpr::Var(ScopedHandle::UniformStruct(self.name.clone()))
  }

  /// Checked, dynamic access to the fields.
  pub fn dynamic(&self) -> StructRef {
    StructRef {
      def: self.def.clone(),
      object: self.object(),
    }
  }
}

impl<S> UniformStruct<S>
where
  S: UniformBlock,
{
  /// Typed accessors to the fields.
  pub fn fields(&self) -> S::Fields {
    S::fields(self.object())
  }
}

/// A struct value whose definition is checked at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct StructRef {
  def: StructDef,
  object: ErasedExpr,
}

impl StructRef {
  /// Definition of the struct.
  pub fn struct_def(&self) -> &StructDef {
    &self.def
  }

  /// Access a value field.
  ///
  /// # Errors
  ///
  /// [`Error::MissingValue`] if the struct has no such field, [`Error::InvalidArgument`] if the field is not of type
  /// `T`.
  pub fn field<T>(&self, name: &str) -> Result<Expr<T>, Error>
  where
    T: ToType,
  {
    match self.def.lookup(name)? {
      FieldType::Value(ty) if *ty == T::ty() => Ok(field(&self.object, name)),

      ty => Err(Error::InvalidArgument(format!(
        "field {}.{} has type {:?}, not {:?}",
        self.def.name,
        name,
        ty,
        T::ty()
      ))),
    }
  }

  /// Access a nested struct field.
  ///
  /// # Errors
  ///
  /// [`Error::MissingValue`] if the struct has no such field, [`Error::InvalidArgument`] if the field is not a nested
  /// struct.
  pub fn nested(&self, name: &str) -> Result<StructRef, Error> {
    match self.def.lookup(name)? {
      FieldType::Struct(def) => Ok(StructRef {
        def: def.clone(),
        object: field_expr(&self.object, name),
      }),

      _ => Err(Error::InvalidArgument(format!(
        "field {}.{} is not a struct",
        self.def.name, name
      ))),
    }
  }

  /// Access an element of a nested struct array.
  ///
  /// # Errors
  ///
  /// [`Error::MissingValue`] if the struct has no such field, [`Error::InvalidArgument`] if the field is not an array
  /// of structs.
  pub fn nested_at(&self, name: &str, index: impl Into<Expr<i32>>) -> Result<StructRef, Error> {
    match self.def.lookup(name)? {
      FieldType::StructArray(def, _) => Ok(StructRef {
        def: def.clone(),
        object: ErasedExpr::ArrayLookup {
          object: Box::new(field_expr(&self.object, name)),
          index: Box::new(index.into().erased),
        },
      }),

      _ => Err(Error::InvalidArgument(format!(
        "field {}.{} is not an array of structs",
        self.def.name, name
      ))),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    lit,
    types::{M44, V3, V4},
  };

  fn light() -> StructDef {
    StructDef::new("Light")
      .field::<V3<f32>>("position")
      .field::<f32>("intensity")
  }

  fn scene() -> StructDef {
    StructDef::new("Scene")
      .field::<M44>("view")
      .nested("sun", light())
      .nested_array("lights", light(), 4)
  }

  #[test]
  fn dependencies_come_first() {
    let scene = scene();
    let names: Vec<_> = scene
      .with_dependencies()
      .into_iter()
      .map(StructDef::name)
      .collect();

    assert_eq!(names, vec!["Light", "Scene"]);
  }

  #[test]
  fn dynamic_access() {
    let scene = UniformStruct::<DynStruct>::new("scene", Binding::auto(), scene());
    let root = scene.dynamic();

    let view = root.field::<M44>("view").unwrap();
    assert_eq!(
      view.erased,
      ErasedExpr::Field {
        object: Box::new(ErasedExpr::Var(ScopedHandle::UniformStruct(
          "scene".to_owned()
        ))),
        field: "view".to_owned(),
      }
    );

    let intensity = root
      .nested_at("lights", lit!(2))
      .and_then(|l| l.field::<f32>("intensity"))
      .unwrap();
    assert_eq!(
      intensity.erased,
      ErasedExpr::Field {
        object: Box::new(ErasedExpr::ArrayLookup {
          object: Box::new(field_expr(
            &ErasedExpr::Var(ScopedHandle::UniformStruct("scene".to_owned())),
            "lights"
          )),
          index: Box::new(ErasedExpr::LitInt(2)),
        }),
        field: "intensity".to_owned(),
      }
    );
  }

  #[test]
  fn dynamic_access_is_checked() {
    let scene = UniformStruct::<DynStruct>::new("scene", Binding::auto(), scene());
    let root = scene.dynamic();

    assert!(matches!(
      root.field::<V4<f32>>("view"),
      Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
      root.field::<f32>("nope"),
      Err(Error::MissingValue(_))
    ));
    assert!(matches!(
      root.nested("view"),
      Err(Error::InvalidArgument(_))
    ));
    assert!(root.nested("sun").is_ok());
  }
}
