//! Location and binding allocation.
//!
//! Explicitly requested indices are claimed first; every other resource then takes the lowest free index of its
//! space, in first-encounter order. Attributes, varyings and fragment outputs each have their own location space;
//! uniforms, struct uniforms and samplers share one binding space per group.

use crate::{
  analysis::Analysis, error::Error, program::Program, scope::ScopedHandle, stage::ShaderStage,
};
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeMap, BTreeSet};

/// Binding point of a uniform or a struct uniform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BindingPoint {
  pub group: u32,
  pub binding: u32,
}

/// Binding points of a sampler.
///
/// `sampler` is the binding of the separate sampler object filtered kinds get in WGSL.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SamplerBinding {
  pub group: u32,
  pub texture: u32,
  pub sampler: Option<u32>,
}

/// Resolved locations and bindings of an entry point, or of a vertex and fragment pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceLayout {
  pub(crate) attributes: IndexMap<String, u32>,
  pub(crate) varyings: IndexMap<String, u32>,
  pub(crate) outputs: IndexMap<String, u32>,
  pub(crate) uniforms: IndexMap<String, BindingPoint>,
  pub(crate) samplers: IndexMap<String, SamplerBinding>,
}

impl ResourceLayout {
  /// Location of an attribute.
  pub fn attribute(&self, name: &str) -> Option<u32> {
    self.attributes.get(name).copied()
  }

  /// Location of a varying.
  pub fn varying(&self, name: &str) -> Option<u32> {
    self.varyings.get(name).copied()
  }

  /// Location of a fragment output.
  pub fn output(&self, name: &str) -> Option<u32> {
    self.outputs.get(name).copied()
  }

  /// Binding of a uniform or a struct uniform.
  pub fn uniform(&self, name: &str) -> Option<BindingPoint> {
    self.uniforms.get(name).copied()
  }

  /// Bindings of a sampler.
  pub fn sampler(&self, name: &str) -> Option<SamplerBinding> {
    self.samplers.get(name).copied()
  }

  /// All attributes with their locations.
  pub fn attributes(&self) -> impl Iterator<Item = (&str, u32)> {
    self.attributes.iter().map(|(name, loc)| (name.as_str(), *loc))
  }

  /// All varyings with their locations.
  pub fn varyings(&self) -> impl Iterator<Item = (&str, u32)> {
    self.varyings.iter().map(|(name, loc)| (name.as_str(), *loc))
  }

  /// All fragment outputs with their locations.
  pub fn outputs(&self) -> impl Iterator<Item = (&str, u32)> {
    self.outputs.iter().map(|(name, loc)| (name.as_str(), *loc))
  }

  /// Allocate the resources `analysis` uses; with `peer`, the analysis of the entry point of the other stage, the
  /// varyings and bindings of both are allocated together, vertex side first.
  pub(crate) fn allocate(
    program: &Program,
    stage: ShaderStage,
    analysis: &Analysis,
    peer: Option<&Analysis>,
  ) -> Result<Self, Error> {
    let (vertex, fragment) = match stage {
      ShaderStage::Vertex => (Some(analysis), peer),
      ShaderStage::Fragment => (peer, Some(analysis)),
    };

    if let (Some(vertex), Some(fragment)) = (vertex, fragment) {
      for name in fragment.varyings.difference(&vertex.written_varyings) {
        log::warn!("varying {} is read by the fragment stage but never written by the vertex stage", name);
      }
    }

    let sides = || vertex.into_iter().chain(fragment);

    let attributes = match vertex {
      Some(vertex) => allocate_locations(
        "attribute",
        vertex
          .attributes
          .iter()
          .map(|name| (name, program.attributes.get(name).and_then(|decl| decl.location))),
      )?,
      None => IndexMap::new(),
    };

    let varyings = allocate_locations(
      "varying",
      sides()
        .flat_map(|analysis| analysis.varyings.iter())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(|name| {
          let location = program
            .varyings
            .get(name)
            .and_then(|decl| decl.options.location);
          (name, location)
        }),
    )?;

    let outputs = match fragment {
      Some(fragment) => allocate_locations(
        "output",
        fragment
          .outputs
          .iter()
          .map(|name| (name, program.outputs.get(name).and_then(|decl| decl.location))),
      )?,
      None => IndexMap::new(),
    };

    let handles = sides()
      .flat_map(|analysis| analysis.bindings.iter())
      .collect::<IndexSet<_>>();
    let (uniforms, samplers) = allocate_bindings(program, handles)?;

    Ok(ResourceLayout {
      attributes,
      varyings,
      outputs,
      uniforms,
      samplers,
    })
  }
}

/// Hand out locations in one space.
fn allocate_locations<'a>(
  space: &str,
  requests: impl Iterator<Item = (&'a String, Option<u32>)>,
) -> Result<IndexMap<String, u32>, Error> {
  let requests: Vec<_> = requests.collect();
  let mut claimed: BTreeMap<u32, &str> = BTreeMap::new();

  for (name, location) in &requests {
    if let Some(location) = *location {
      claim(&mut claimed, format!("{} location", space), location, name)?;
    }
  }

  let mut taken: BTreeSet<u32> = claimed.keys().copied().collect();
  let mut locations = IndexMap::new();

  for (name, location) in requests {
    let location = match location {
      Some(location) => location,
      None => lowest_free(&mut taken),
    };

    log::trace!("{} {} at location {}", space, name, location);
    locations.insert(name.clone(), location);
  }

  Ok(locations)
}

type Bindings = (
  IndexMap<String, BindingPoint>,
  IndexMap<String, SamplerBinding>,
);

/// Hand out bindings, per group.
fn allocate_bindings(program: &Program, handles: IndexSet<&ScopedHandle>) -> Result<Bindings, Error> {
  // (name, requested binding, is a sampler, needs a second binding for a sampler object)
  let mut requests = Vec::new();
  for handle in handles {
    let request = match handle {
      ScopedHandle::Uniform(name) => program
        .uniforms
        .get(name)
        .map(|decl| (name, decl.binding, false, false)),

      ScopedHandle::UniformStruct(name) => program
        .uniform_structs
        .get(name)
        .map(|decl| (name, decl.binding, false, false)),

      ScopedHandle::Sampler(name) => program
        .samplers
        .get(name)
        .map(|decl| (name, decl.binding, true, decl.kind.is_paired())),

      _ => None,
    };

    let request = request.ok_or_else(|| Error::MissingValue(format!("{:?}", handle)))?;
    requests.push(request);
  }

  let mut claimed: BTreeMap<u32, BTreeMap<u32, &str>> = BTreeMap::new();
  for (name, binding, _, paired) in &requests {
    if let Some(index) = binding.binding {
      let group = claimed.entry(binding.group).or_default();
      let space = format!("group {} binding", binding.group);

      claim(group, space.clone(), index, name)?;
      if *paired {
        claim(group, space, sampler_object_binding(index, name)?, name)?;
      }
    }
  }

  let mut taken: BTreeMap<u32, BTreeSet<u32>> = claimed
    .iter()
    .map(|(group, bindings)| (*group, bindings.keys().copied().collect()))
    .collect();

  let mut uniforms = IndexMap::new();
  let mut samplers = IndexMap::new();

  for (name, binding, is_sampler, paired) in requests {
    let group_taken = taken.entry(binding.group).or_default();

    let index = match binding.binding {
      Some(index) => index,
      None => lowest_free(group_taken),
    };

    if is_sampler {
      let sampler = if !paired {
        None
      } else if binding.binding.is_some() {
        Some(sampler_object_binding(index, name)?)
      } else {
        Some(lowest_free(group_taken))
      };

      log::trace!(
        "sampler {} at group {} binding {} (sampler object: {:?})",
        name,
        binding.group,
        index,
        sampler
      );
      samplers.insert(
        name.clone(),
        SamplerBinding {
          group: binding.group,
          texture: index,
          sampler,
        },
      );
    } else {
      log::trace!("uniform {} at group {} binding {}", name, binding.group, index);
      uniforms.insert(
        name.clone(),
        BindingPoint {
          group: binding.group,
          binding: index,
        },
      );
    }
  }

  Ok((uniforms, samplers))
}

fn claim<'a>(
  claimed: &mut BTreeMap<u32, &'a str>,
  space: String,
  index: u32,
  name: &'a str,
) -> Result<(), Error> {
  match claimed.get(&index) {
    Some(first) if *first != name => Err(Error::IndexCollision {
      space,
      index,
      first: (*first).to_owned(),
      second: name.to_owned(),
    }),

    _ => {
      claimed.insert(index, name);
      Ok(())
    }
  }
}

/// Binding of the sampler object of an explicitly bound sampler, right after its texture.
fn sampler_object_binding(texture: u32, name: &str) -> Result<u32, Error> {
  texture.checked_add(1).ok_or_else(|| {
    Error::InvalidArgument(format!(
      "sampler {} at binding {} leaves no room for its sampler object",
      name, texture
    ))
  })
}

/// Take the lowest index not in `taken`.
fn lowest_free(taken: &mut BTreeSet<u32>) -> u32 {
  let index = (0..).find(|i| !taken.contains(i)).unwrap_or_default();
  taken.insert(index);
  index
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    lit,
    resource::{Binding, VaryingOptions},
    sampler::{Tex2D, TexDepth},
    types::{V2, V4},
    vec4,
  };

  #[test]
  fn auto_locations_skip_explicit_ones() {
    let mut program = Program::new();
    let a = program.attribute::<f32>("a").unwrap();
    let b = program.attribute_at::<f32>("b", 0).unwrap();
    let c = program.attribute::<f32>("c").unwrap();

    program
      .vertex("main", move |s, env| {
        s.set(&env.position, vec4!(a.expr(), b.expr(), c.expr(), 1.));
      })
      .unwrap();

    let layout = program
      .entry("main")
      .unwrap()
      .layout(&Default::default())
      .unwrap();

    assert_eq!(
      layout.attributes().collect::<Vec<_>>(),
      vec![("a", 1), ("b", 0), ("c", 2)]
    );
  }

  #[test]
  fn colliding_locations() {
    let mut program = Program::new();
    let a = program
      .varying_with::<f32>("a", VaryingOptions::default().location(3))
      .unwrap();
    let b = program
      .varying_with::<f32>("b", VaryingOptions::default().location(3))
      .unwrap();

    program
      .vertex("main", move |s, _| {
        s.set(&a, lit!(1f32));
        s.set(&b, lit!(2f32));
      })
      .unwrap();

    assert_eq!(
      program
        .entry("main")
        .unwrap()
        .layout(&Default::default())
        .unwrap_err(),
      Error::IndexCollision {
        space: "varying location".to_owned(),
        index: 3,
        first: "a".to_owned(),
        second: "b".to_owned(),
      }
    );
  }

  #[test]
  fn paired_samplers_take_two_bindings() {
    let mut program = Program::new();
    let albedo = program.sampler::<Tex2D>("albedo").unwrap();
    let time = program.uniform::<f32>("time").unwrap();
    let shadow = program
      .sampler_at::<TexDepth>("shadow", Binding::index(0).in_group(1))
      .unwrap();

    program
      .fragment("main", move |s, _| {
        let depth = shadow.fetch(lit!(0, 0));
        s.leave(albedo.sample(lit!(0.5, 0.5)) * &*time * depth);
      })
      .unwrap();

    let layout = program
      .entry("main")
      .unwrap()
      .layout(&Default::default())
      .unwrap();

    assert_eq!(
      layout.sampler("shadow"),
      Some(SamplerBinding {
        group: 1,
        texture: 0,
        sampler: None
      })
    );
    assert_eq!(
      layout.sampler("albedo"),
      Some(SamplerBinding {
        group: 0,
        texture: 0,
        sampler: Some(1)
      })
    );
    assert_eq!(
      layout.uniform("time"),
      Some(BindingPoint {
        group: 0,
        binding: 2
      })
    );
  }

  #[test]
  fn paired_sampler_at_last_binding() {
    let mut program = Program::new();
    let albedo = program
      .sampler_at::<Tex2D>("albedo", Binding::index(u32::MAX))
      .unwrap();

    program
      .fragment("main", move |s, _| {
        s.leave(albedo.sample(lit!(0.5, 0.5)));
      })
      .unwrap();

    assert!(matches!(
      program.entry("main").unwrap().layout(&Default::default()),
      Err(Error::InvalidArgument(_))
    ));
  }

  #[test]
  fn peers_agree_on_varyings() {
    let mut program = Program::new();
    let uv = program.varying::<V2<f32>>("uv").unwrap();
    let color = program.varying::<V4<f32>>("color").unwrap();

    let (vs_uv, vs_color) = (uv.clone(), color.clone());
    program
      .vertex("vs", move |s, env| {
        s.set(&vs_color, vec4!(1.));
        s.set(&vs_uv, lit!(0., 0.));
        s.set(&env.position, vec4!(0.));
      })
      .unwrap();

    program
      .fragment("fs", move |s, _| {
        s.leave(vec4!(uv.to_expr(), 0., 1.) * color.to_expr());
      })
      .unwrap();

    let vs = program.entry("vs").unwrap();
    let fs = program.entry("fs").unwrap();

    let vs_layout = vs
      .layout(&crate::WgslOptions::default().peer("fs"))
      .unwrap();
    let fs_layout = fs
      .layout(&crate::WgslOptions::default().peer("vs"))
      .unwrap();

    assert_eq!(vs_layout.varying("color"), Some(0));
    assert_eq!(vs_layout.varying("uv"), Some(1));
    assert_eq!(vs_layout, fs_layout);
  }
}
