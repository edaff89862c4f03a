use dualshade::{
  lit,
  resource::{Binding, VaryingOptions},
  sampler::{Tex2D, TexUnsigned},
  types::V2,
  vec4, BindingPoint, Error, Program, SamplerBinding, WgslOptions,
};

/// Vertex entry point writing three varyings, `b` optionally at an explicit location.
fn three_varyings(b_location: Option<u32>) -> Program {
  let mut program = Program::new();
  let a = program.varying::<f32>("a").unwrap();
  let b = match b_location {
    Some(location) => program
      .varying_with::<f32>("b", VaryingOptions::default().location(location))
      .unwrap(),
    None => program.varying::<f32>("b").unwrap(),
  };
  let c = program.varying::<f32>("c").unwrap();

  program
    .vertex("vs", move |s, _| {
      s.set(&a, 1.);
      s.set(&b, 2.);
      s.set(&c, 3.);
      s.leave(lit!(0f32, 0., 0., 1.));
    })
    .unwrap();

  program
}

#[test]
fn auto_varying_locations() {
  let program = three_varyings(None);
  let layout = program
    .entry("vs")
    .unwrap()
    .layout(&WgslOptions::default())
    .unwrap();

  assert_eq!(layout.varying("a"), Some(0));
  assert_eq!(layout.varying("b"), Some(1));
  assert_eq!(layout.varying("c"), Some(2));
}

#[test]
fn explicit_varying_location() {
  let program = three_varyings(Some(5));
  let entry = program.entry("vs").unwrap();
  let layout = entry.layout(&WgslOptions::default()).unwrap();

  assert_eq!(layout.varying("a"), Some(0));
  assert_eq!(layout.varying("b"), Some(5));
  assert_eq!(layout.varying("c"), Some(1));

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains(
    "struct VertexOutput {
  @builtin(position) position: vec4<f32>,
  @location(0) a: f32,
  @location(1) c: f32,
  @location(5) b: f32,
}
"
  ));
}

#[test]
fn peers_share_varyings_and_bindings() {
  let mut program = Program::new();
  let offset = program.varying::<f32>("offset").unwrap();
  let uv = program.varying::<V2<f32>>("uv").unwrap();
  let tex = program.sampler::<Tex2D>("tex").unwrap();
  let time = program.uniform::<f32>("time").unwrap();

  {
    let (offset, uv) = (offset.clone(), uv.clone());
    let time = time.clone();

    program
      .vertex("vs", move |s, _| {
        s.set(&offset, time.expr());
        s.set(&uv, lit!(0f32, 1.));
        s.leave(lit!(0f32, 0., 0., 1.));
      })
      .unwrap();
  }

  program
    .fragment("fs", move |s, _| {
      s.leave(tex.sample(uv.to_expr()) * time.expr());
    })
    .unwrap();

  let fs = program.entry("fs").unwrap();

  // on its own, the fragment entry point only knows about uv and its own bindings
  let alone = fs.layout(&WgslOptions::default()).unwrap();
  assert_eq!(alone.varying("uv"), Some(0));
  assert_eq!(
    alone.sampler("tex"),
    Some(SamplerBinding {
      group: 0,
      texture: 0,
      sampler: Some(1)
    })
  );
  assert_eq!(alone.uniform("time"), Some(BindingPoint { group: 0, binding: 2 }));

  let paired = WgslOptions::default().peer("vs");
  let layout = fs.layout(&paired).unwrap();
  assert_eq!(layout.varying("offset"), Some(0));
  assert_eq!(layout.varying("uv"), Some(1));
  assert_eq!(layout.uniform("time"), Some(BindingPoint { group: 0, binding: 0 }));
  assert_eq!(
    layout.sampler("tex"),
    Some(SamplerBinding {
      group: 0,
      texture: 1,
      sampler: Some(2)
    })
  );

  let vs_layout = program
    .entry("vs")
    .unwrap()
    .layout(&WgslOptions::default().peer("fs"))
    .unwrap();
  assert_eq!(vs_layout.varying("uv"), layout.varying("uv"));
  assert_eq!(vs_layout.uniform("time"), layout.uniform("time"));

  let wgsl = fs.to_wgsl(&paired).unwrap();
  assert!(wgsl.contains("  @location(1) uv: vec2<f32>,\n"));
  assert!(wgsl.contains("@group(0) @binding(0) var<uniform> time: f32;"));
  assert!(wgsl.contains("@group(0) @binding(1) var tex: texture_2d<f32>;"));
  assert!(wgsl.contains("@group(0) @binding(2) var tex_sampler: sampler;"));
}

#[test]
fn groups_and_unpaired_samplers() {
  let mut program = Program::new();
  let ids = program
    .sampler_at::<TexUnsigned>("ids", Binding::auto().in_group(1))
    .unwrap();
  let scale = program
    .uniform_at::<f32>("scale", Binding::index(3).in_group(1))
    .unwrap();
  let bias = program.uniform::<f32>("bias").unwrap();

  program
    .fragment("fs", move |s, _| {
      let _id = s.var(ids.fetch(lit!(0, 0)));
      s.leave(vec4!(scale.expr() + bias.expr()));
    })
    .unwrap();

  let layout = program
    .entry("fs")
    .unwrap()
    .layout(&WgslOptions::default())
    .unwrap();

  assert_eq!(layout.uniform("scale"), Some(BindingPoint { group: 1, binding: 3 }));
  assert_eq!(layout.uniform("bias"), Some(BindingPoint { group: 0, binding: 0 }));
  assert_eq!(
    layout.sampler("ids"),
    Some(SamplerBinding {
      group: 1,
      texture: 0,
      sampler: None
    })
  );
}

#[test]
fn explicit_collisions_are_rejected() {
  let mut program = Program::new();
  let a = program.uniform_at::<f32>("a", Binding::index(1)).unwrap();
  let b = program.uniform_at::<f32>("b", Binding::index(1)).unwrap();

  program
    .fragment("fs", move |s, _| {
      s.leave(vec4!(a.expr() + b.expr()));
    })
    .unwrap();

  assert_eq!(
    program
      .entry("fs")
      .unwrap()
      .to_wgsl(&WgslOptions::default())
      .unwrap_err(),
    Error::IndexCollision {
      space: "group 0 binding".to_owned(),
      index: 1,
      first: "a".to_owned(),
      second: "b".to_owned(),
    }
  );
}

#[test]
fn unknown_entry_points() {
  let program = Program::new();

  assert_eq!(
    program.entry("main").unwrap_err(),
    Error::UnresolvedEntryPoint("main".to_owned())
  );
}

#[test]
fn foreign_handles_are_missing_values() {
  let mut other = Program::new();
  let time = other.uniform::<f32>("time").unwrap();

  let mut program = Program::new();
  program
    .fragment("fs", move |s, _| {
      s.leave(vec4!(time.expr()));
    })
    .unwrap();

  assert!(matches!(
    program.entry("fs").unwrap().to_glsl(&Default::default()),
    Err(Error::MissingValue(_))
  ));
}
