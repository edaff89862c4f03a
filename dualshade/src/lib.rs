//! Dualshade, a shading language EDSL emitting both GLSL and WGSL.
//!
//! Shaders are written once, in Rust, as regular functions building an in-memory representation of expressions and
//! statements. That representation is then written out as [GLSL] (ES 1.00 for WebGL 1, ES 3.00 for WebGL 2) or as
//! [WGSL], on demand, at runtime. Rust types track the types of shader values, so most typing mistakes are caught by
//! `rustc` rather than by the GPU driver.
//!
//! # Programs and entry points
//!
//! Everything starts with a [`Program`]. A program holds the declarations shared by its stages (uniforms, vertex
//! attributes, varyings, samplers, fragment outputs, struct uniforms, constants and helper functions) and any number
//! of named vertex and fragment entry points. Declaring a resource gives back a handle already bound to its name,
//! which is then captured by the entry point bodies.
//!
//! Bodies are closures receiving a [`Scope`](scope::Scope) to record statements into, and the environment of their
//! stage (built-in inputs and outputs). They are run the first time the entry point is emitted, and never again.
//!
//! ```
//! use dualshade::{
//!   lit,
//!   types::{V2, V3},
//!   vec4, GlslOptions, Program, WgslOptions,
//! };
//!
//! # fn main() -> Result<(), dualshade::Error> {
//! let mut program = Program::new();
//! let position = program.attribute::<V2<f32>>("position")?;
//! let color = program.varying::<V3<f32>>("v_color")?;
//! let alpha = program.uniform::<f32>("alpha")?;
//!
//! let v_color = color.clone();
//! program.vertex("vs", move |s, _| {
//!   s.set(&v_color, lit!(1., 0.5, 0.));
//!   s.leave(vec4!(position.expr(), 0., 1.));
//! })?;
//!
//! program.fragment("fs", move |s, _| {
//!   s.leave(vec4!(color.to_expr(), alpha.expr()));
//! })?;
//!
//! let fs = program.entry("fs")?;
//! let glsl = fs.to_glsl(&GlslOptions::default())?;
//! let wgsl = fs.to_wgsl(&WgslOptions::default().peer("vs"))?;
//!
//! assert!(glsl.starts_with("#version 300 es"));
//! assert!(wgsl.contains("@fragment"));
//! # Ok(())
//! # }
//! ```
//!
//! # Emission
//!
//! Each entry point is emitted on its own with [`EntryRef::to_glsl`] or [`EntryRef::to_wgsl`], and only contains the
//! declarations and helper functions it transitively uses. Locations and bindings are allocated per emission: explicit
//! indices are kept as requested and the others are taken from the lowest free values. When targeting WGSL, pairing a
//! stage with its peer (see [`WgslOptions::peer`]) allocates varyings and bindings over both entry points so that they
//! agree. The allocation itself is available with [`EntryRef::layout`].
//!
//! # Uniform blocks
//!
//! Struct uniforms are described either dynamically with [`StructDef`](structs::StructDef), or statically by deriving
//! [`UniformBlock`] on a Rust struct (with the `derive` feature, enabled by default).
//!
//! [GLSL]: https://www.khronos.org/registry/OpenGL/specs/es/3.0/GLSL_ES_Specification_3.00.pdf
//! [WGSL]: https://www.w3.org/TR/WGSL/

// derived code refers to ::dualshade paths, which must resolve in this crate's own tests too
extern crate self as dualshade;

pub mod alloc;
pub mod analysis;
pub mod builtin;
pub mod error;
pub mod expr;
pub mod fun;
pub mod program;
pub mod resource;
pub mod sampler;
pub mod scope;
pub mod stage;
pub mod stdlib;
pub mod structs;
pub mod swizzle;
pub mod types;
pub mod var;
pub mod writer;

pub use alloc::{BindingPoint, ResourceLayout, SamplerBinding};
pub use analysis::Analysis;
pub use error::Error;
pub use program::{EntryRef, Program};
pub use stage::ShaderStage;
pub use structs::UniformBlock;
pub use writer::{GlslOptions, GlslVersion, Precision, WgslOptions};

#[cfg(feature = "derive")]
pub use dualshade_derive::UniformBlock;
