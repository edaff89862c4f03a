use dualshade::{
  expr::Expr,
  lit,
  resource::{Binding, Interpolation, VaryingOptions},
  sampler::{Tex2D, Tex2DArray, TexDepth, TexUnsigned},
  scope::{Conditional as _, Scope},
  structs::StructDef,
  sw,
  swizzle::Swizzlable as _,
  types::{M43, V2, V3, V4},
  vec4, Error, GlslOptions, GlslVersion, Program, WgslOptions,
};

fn red_fragment() -> Program {
  let mut program = Program::new();
  program
    .fragment("main", |s, _| {
      s.leave(lit!(1f32, 0., 0., 1.));
    })
    .unwrap();
  program
}

#[test]
fn fragment_color_glsl2() {
  let program = red_fragment();
  let glsl = program
    .entry("main")
    .unwrap()
    .to_glsl(&GlslOptions::default())
    .unwrap();

  assert_eq!(
    glsl,
    "#version 300 es
precision highp float;

layout(location = 0) out vec4 color;

void main() {
  color = vec4(1.0, 0.0, 0.0, 1.0);
  return;
}
"
  );
}

#[test]
fn fragment_color_glsl1() {
  let program = red_fragment();
  let glsl = program
    .entry("main")
    .unwrap()
    .to_glsl(&GlslOptions::default().version(GlslVersion::V1).precision(None))
    .unwrap();

  assert_eq!(
    glsl,
    "void main() {
  gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0);
  return;
}
"
  );
}

#[test]
fn fragment_color_wgsl() {
  let program = red_fragment();
  let wgsl = program
    .entry("main")
    .unwrap()
    .to_wgsl(&WgslOptions::default())
    .unwrap();

  assert_eq!(
    wgsl,
    "@fragment
fn main() -> @location(0) vec4<f32> {
  return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"
  );
}

#[test]
fn vertex_attribute_to_position() {
  let mut program = Program::new();
  let position = program.attribute::<V2<f32>>("position").unwrap();

  program
    .vertex("main", move |s, env| {
      s.set(&env.position, vec4!(position.expr(), 0., 1.));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();
  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();

  assert_eq!(
    wgsl,
    "struct VertexOutput {
  @builtin(position) position: vec4<f32>,
}

@vertex
fn main(@location(0) position: vec2<f32>) -> VertexOutput {
  var output: VertexOutput;
  output.position = vec4<f32>(position, 0.0, 1.0);
  return output;
}
"
  );

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("layout(location = 0) in vec2 position;"));
  assert!(glsl.contains("  gl_Position = vec4(position, 0.0, 1.0);\n"));

  let glsl = entry
    .to_glsl(&GlslOptions::default().version(GlslVersion::V1))
    .unwrap();
  assert!(glsl.contains("attribute vec2 position;"));
  assert!(!glsl.contains("precision"));
}

#[test]
fn depth_remap() {
  let mut program = Program::new();
  program
    .vertex("main", |s, _| {
      s.leave(lit!(0f32, 0., 0.5, 1.));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let plain = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(plain.contains("-> @builtin(position) vec4<f32> {"));
  assert!(plain.contains("  return vec4<f32>(0.0, 0.0, 0.5, 1.0);\n"));

  let remapped = entry
    .to_wgsl(&WgslOptions::default().remap_depth(true))
    .unwrap();
  assert!(remapped.contains(
    "  output.position = vec4<f32>(0.0, 0.0, 0.5, 1.0);
  output.position.z = (output.position.z + 1.0) * 0.5;
  return output;
"
  ));

  // the recorded body is shared by both emissions
  assert_eq!(entry.to_wgsl(&WgslOptions::default()).unwrap(), plain);
}

#[test]
fn emission_is_idempotent() {
  let mut program = Program::new();
  let time = program.uniform::<f32>("time").unwrap();
  let color = program.varying::<V3<f32>>("color").unwrap();

  program
    .fragment("main", move |s, env| {
      let c = s.var(color.to_expr() * time.expr());
      s.when(env.front_facing.clone(), |s| {
        s.leave(vec4!(c.to_expr(), 1.));
      });
      s.discard();
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert_eq!(entry.to_glsl(&GlslOptions::default()).unwrap(), glsl);

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert_eq!(entry.to_wgsl(&WgslOptions::default()).unwrap(), wgsl);
}

#[test]
fn unused_declarations_are_pruned() {
  let mut program = Program::new();
  let _unused = program.uniform::<f32>("unused").unwrap();
  let scale = program.uniform::<f32>("scale").unwrap();
  let _dead = program
    .fun("dead", |_: &mut Scope<Expr<f32>>, x: Expr<f32>| &x * 2.)
    .unwrap();
  let twice = program
    .fun("twice", |_: &mut Scope<Expr<f32>>, x: Expr<f32>| &x + &x)
    .unwrap();
  let _gamma = program.constant(lit!(2.2f32)).unwrap();

  program
    .fragment("main", move |s, _| {
      let v = twice.call(scale.expr());
      s.leave(vec4!(v));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();
  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();

  for source in [&glsl, &wgsl] {
    assert!(!source.contains("unused"));
    assert!(!source.contains("dead"));
    assert!(!source.contains("glob_0"));
    assert!(source.contains("scale"));
    assert!(source.contains("twice(scale)"));
  }

  assert!(glsl.contains("float twice(float arg_0) {\n  return arg_0 + arg_0;\n}\n"));
  assert!(wgsl.contains("fn twice(arg_0: f32) -> f32 {\n  return arg_0 + arg_0;\n}\n"));
  assert!(wgsl.contains("@group(0) @binding(0) var<uniform> scale: f32;"));
}

#[test]
fn constants_are_emitted_when_used() {
  let mut program = Program::new();
  let gamma = program.constant(lit!(2.2f32)).unwrap();

  program
    .fragment("main", move |s, _| {
      s.leave(vec4!(gamma.clone()));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();
  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();

  assert!(glsl.contains("const float glob_0 = 2.2;"));
  assert!(wgsl.contains("const glob_0: f32 = 2.2;"));
}

#[test]
fn sampling_textures() {
  let mut program = Program::new();
  let tex = program.sampler::<Tex2D>("tex").unwrap();
  let uv = program.varying::<V2<f32>>("uv").unwrap();

  program
    .fragment("main", move |s, _| {
      s.leave(tex.sample(uv.to_expr()));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("in vec2 uv;"));
  assert!(glsl.contains("uniform sampler2D tex;"));
  assert!(glsl.contains("color = texture(tex, uv);"));

  let glsl = entry
    .to_glsl(&GlslOptions::default().version(GlslVersion::V1))
    .unwrap();
  assert!(glsl.contains("varying vec2 uv;"));
  assert!(glsl.contains("gl_FragColor = texture2D(tex, uv);"));

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert_eq!(
    wgsl,
    "@group(0) @binding(0) var tex: texture_2d<f32>;
@group(0) @binding(1) var tex_sampler: sampler;

struct FragmentInput {
  @location(0) uv: vec2<f32>,
}

@fragment
fn main(input: FragmentInput) -> @location(0) vec4<f32> {
  return textureSample(tex, tex_sampler, input.uv);
}
"
  );
}

#[test]
fn interpolation_qualifiers() {
  let mut program = Program::new();
  let id = program.varying::<i32>("id").unwrap();
  let depth = program
    .varying_with::<f32>(
      "depth",
      VaryingOptions::default().interpolation(Interpolation::Linear),
    )
    .unwrap();

  program
    .vertex("main", move |s, _| {
      s.set(&id, 3);
      s.set(&depth, 0.5);
      s.leave(lit!(0f32, 0., 0., 1.));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("flat out int id;"));
  assert!(glsl.contains("noperspective out float depth;"));

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains("  @location(0) @interpolate(flat) id: i32,\n"));
  assert!(wgsl.contains("  @location(1) @interpolate(linear) depth: f32,\n"));
  assert!(wgsl.contains("  output.id = 3;\n"));
  assert!(wgsl.contains("  output.position = vec4<f32>(0.0, 0.0, 0.0, 1.0);\n  return output;\n"));
}

#[test]
fn multiple_fragment_outputs() {
  let mut program = Program::new();
  let albedo = program.output::<V4<f32>>("albedo").unwrap();
  let normal = program.output_at::<V3<f32>>("normal", 1).unwrap();

  program
    .fragment("main", move |s, _| {
      s.set(&albedo, lit!(1f32, 1., 1., 1.));
      s.set(&normal, lit!(0f32, 0., 1.));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("layout(location = 0) out vec4 albedo;\nlayout(location = 1) out vec3 normal;\n"));
  assert!(!glsl.contains("out vec4 color;"));
  assert!(glsl.contains("  albedo = vec4(1.0);\n"));

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains(
    "struct FragmentOut {
  @location(0) albedo: vec4<f32>,
  @location(1) normal: vec3<f32>,
}
"
  ));
  assert!(wgsl.contains("fn main() -> FragmentOut {\n  var frag_out: FragmentOut;\n"));
  assert!(wgsl.contains("  frag_out.normal = vec3<f32>(0.0, 0.0, 1.0);\n  return frag_out;\n}\n"));
}

#[test]
fn control_flow() {
  let mut program = Program::new();
  let limit = program.uniform::<i32>("limit").unwrap();

  program
    .fragment("main", move |s, _| {
      let acc = s.var(0f32);

      s.loop_for(0i32, |i| i.lt(limit.expr()), |i| i + 1, |s, i| {
        s.when(i.eq(3), |s| {
          s.loop_continue();
        })
        .or_else(i.gt(10), |s| {
          s.loop_break();
        });

        s.set(&acc, &acc + 0.1);
      });

      s.leave(vec4!(acc.to_expr()));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("  float var_0_0 = 0.0;\n"));
  assert!(glsl.contains("  for (int var_1_0 = 0; var_1_0 < limit; var_1_0 = var_1_0 + 1) {\n"));
  assert!(glsl.contains("    if (var_1_0 == 3) {\n      continue;\n    } else if (var_1_0 > 10) {\n      break;\n    }\n"));

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains("  var var_0_0: f32 = 0.0;\n"));
  assert!(wgsl.contains("  for (var var_1_0: i32 = 0; var_1_0 < limit; var_1_0 = var_1_0 + 1) {\n"));
  assert!(wgsl.contains("    if var_1_0 == 3 {\n      continue;\n    } else if var_1_0 > 10 {\n      break;\n    }\n"));
}

#[test]
fn glsl1_fragment_data() {
  let mut program = Program::new();
  let albedo = program.output::<V4<f32>>("albedo").unwrap();
  let normal = program.output_at::<V4<f32>>("normal", 1).unwrap();

  program
    .fragment("main", move |s, _| {
      s.set(&albedo, lit!(1f32, 1., 1., 1.));
      s.set(&normal, lit!(0f32, 0., 1., 0.));
    })
    .unwrap();

  let glsl = program
    .entry("main")
    .unwrap()
    .to_glsl(&GlslOptions::default().version(GlslVersion::V1))
    .unwrap();

  assert!(glsl.starts_with("#extension GL_EXT_draw_buffers : require\n"));
  assert!(glsl.contains("  gl_FragData[0] = vec4(1.0);\n  gl_FragData[1] = vec4(0.0, 0.0, 1.0, 0.0);\n"));
  assert!(!glsl.contains("out vec4"));
}

#[test]
fn vertex_and_instance_indices() {
  let mut program = Program::new();

  program
    .vertex("main", |s, env| {
      let _index = s.var(&env.vertex_id + &env.instance_id);
      s.leave(lit!(0f32, 0., 0., 1.));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains(
    "fn main(@builtin(vertex_index) vertex_index: u32, @builtin(instance_index) instance_index: u32) -> @builtin(position) vec4<f32> {\n"
  ));
  assert!(wgsl.contains("  var var_0_0: i32 = i32(vertex_index) + i32(instance_index);\n"));

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("  int var_0_0 = gl_VertexID + gl_InstanceID;\n"));

  assert!(matches!(
    entry.to_glsl(&GlslOptions::default().version(GlslVersion::V1)),
    Err(Error::InvalidArgument(_))
  ));
}

#[test]
fn fragment_coordinates() {
  let mut program = Program::new();
  let uv = program.varying::<V2<f32>>("uv").unwrap();

  program
    .fragment("main", move |s, env| {
      s.when(sw!(env.frag_coord, .y).lt(1.), |s| {
        s.discard();
      });

      s.leave(vec4!(uv.to_expr(), 0., 1.));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains(
    "struct FragmentInput {
  @builtin(position) frag_coord: vec4<f32>,
  @location(0) uv: vec2<f32>,
}
"
  ));
  assert!(wgsl.contains("fn main(input: FragmentInput) -> @location(0) vec4<f32> {\n"));
  assert!(wgsl.contains("  if -input.frag_coord.y < 1.0 {\n    discard;\n  }\n"));

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("  if (gl_FragCoord.y < 1.0) {\n    discard;\n  }\n"));
}

#[test]
fn texel_fetches() {
  let mut program = Program::new();
  let ids = program.sampler::<TexUnsigned>("ids").unwrap();
  let shadow = program.sampler::<TexDepth>("shadow").unwrap();

  program
    .fragment("main", move |s, _| {
      let _id = s.var(ids.fetch(lit!(1, 2)));
      s.leave(vec4!(shadow.fetch(lit!(1, 2))));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains(
    "@group(0) @binding(0) var ids: texture_2d<u32>;\n@group(0) @binding(1) var shadow: texture_depth_2d;\n"
  ));
  assert!(!wgsl.contains("sampler;"));
  assert!(wgsl.contains("  var var_0_0: vec4<u32> = textureLoad(ids, vec2<i32>(1, 2), 0);\n"));
  assert!(wgsl.contains("textureLoad(shadow, vec2<i32>(1, 2), 0)"));

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("uniform highp usampler2D ids;\nuniform highp sampler2D shadow;\n"));
  assert!(glsl.contains("  uvec4 var_0_0 = texelFetch(ids, ivec2(1, 2), 0);\n"));
  assert!(glsl.contains("texelFetch(shadow, ivec2(1, 2), 0).r"));

  assert!(matches!(
    entry.to_glsl(&GlslOptions::default().version(GlslVersion::V1)),
    Err(Error::InvalidArgument(_))
  ));
}

#[test]
fn vertex_sampling_uses_level_zero() {
  let mut program = Program::new();
  let height = program.sampler::<Tex2D>("height").unwrap();
  let position = program.attribute::<V2<f32>>("position").unwrap();

  program
    .vertex("main", move |s, env| {
      s.set(&env.position, height.sample(position.expr()));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains("  output.position = textureSampleLevel(height, height_sampler, position, 0.0);\n"));

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("  gl_Position = texture(height, position);\n"));
}

#[test]
fn array_layers_are_rounded() {
  let mut program = Program::new();
  let layers = program.sampler::<Tex2DArray>("layers").unwrap();

  program
    .fragment("main", move |s, _| {
      s.leave(layers.sample(lit!(0.5f32, 0.5, 1.7)));
    })
    .unwrap();

  let entry = program.entry("main").unwrap();

  let wgsl = entry.to_wgsl(&WgslOptions::default()).unwrap();
  assert!(wgsl.contains(
    "textureSample(layers, layers_sampler, vec3<f32>(0.5, 0.5, 1.7).xy, i32(round(vec3<f32>(0.5, 0.5, 1.7).z)))"
  ));

  let glsl = entry.to_glsl(&GlslOptions::default()).unwrap();
  assert!(glsl.contains("uniform highp sampler2DArray layers;"));
  assert!(glsl.contains("color = texture(layers, vec3(0.5, 0.5, 1.7));"));
}

#[test]
fn glsl1_rejects_es3_only_features() {
  fn glsl1(program: &Program) -> Result<String, Error> {
    program
      .entry("main")
      .unwrap()
      .to_glsl(&GlslOptions::default().version(GlslVersion::V1))
  }

  let mut layered = Program::new();
  let layers = layered.sampler::<Tex2DArray>("layers").unwrap();
  layered
    .fragment("main", move |s, _| {
      s.leave(layers.sample(lit!(0.5f32, 0.5, 1.)));
    })
    .unwrap();
  assert!(matches!(glsl1(&layered), Err(Error::InvalidArgument(_))));

  let mut unsigned = Program::new();
  unsigned
    .fragment("main", |s, _| {
      let _n = s.var(lit!(3u32));
      s.leave(lit!(1f32, 1., 1., 1.));
    })
    .unwrap();
  assert!(matches!(glsl1(&unsigned), Err(Error::InvalidArgument(_))));
  assert!(unsigned
    .entry("main")
    .unwrap()
    .to_glsl(&GlslOptions::default())
    .unwrap()
    .contains("  uint var_0_0 = 3u;\n"));

  let mut matrices = Program::new();
  let m = matrices.uniform::<M43>("m").unwrap();
  matrices
    .fragment("main", move |s, _| {
      let _m = s.var(m.expr());
      s.leave(lit!(1f32, 1., 1., 1.));
    })
    .unwrap();
  assert!(matches!(glsl1(&matrices), Err(Error::InvalidArgument(_))));
}

#[test]
fn uniform_blocks_sharing_a_struct() {
  let light = StructDef::new("Light").field::<V3<f32>>("position");

  let mut program = Program::new();
  let sun = program
    .uniform_struct_dyn("sun", light.clone(), Binding::auto())
    .unwrap();
  let moon = program
    .uniform_struct_dyn("moon", light, Binding::auto())
    .unwrap();

  program
    .fragment("main", move |s, _| {
      let sun = sun.dynamic().field::<V3<f32>>("position").unwrap();
      let moon = moon.dynamic().field::<V3<f32>>("position").unwrap();
      s.leave(vec4!(sun + moon, 1.));
    })
    .unwrap();

  let glsl = program
    .entry("main")
    .unwrap()
    .to_glsl(&GlslOptions::default())
    .unwrap();

  assert!(glsl.contains("uniform Light_sun {\n  vec3 position;\n} sun;\n"));
  assert!(glsl.contains("uniform Light_moon {\n  vec3 position;\n} moon;\n"));
  assert!(!glsl.contains("uniform Light {"));
  assert!(glsl.contains("color = vec4(sun.position + moon.position, 1.0);"));
}

#[test]
fn uniform_block_named_like_a_nested_struct() {
  let light = StructDef::new("Light").field::<V3<f32>>("position");
  let scene = StructDef::new("Scene").nested("sun", light.clone());

  let mut program = Program::new();
  let scene = program
    .uniform_struct_dyn("scene", scene, Binding::auto())
    .unwrap();
  let lamp = program
    .uniform_struct_dyn("lamp", light, Binding::auto())
    .unwrap();

  program
    .fragment("main", move |s, _| {
      let sun = scene
        .dynamic()
        .nested("sun")
        .unwrap()
        .field::<V3<f32>>("position")
        .unwrap();
      let lamp = lamp.dynamic().field::<V3<f32>>("position").unwrap();
      s.leave(vec4!(sun + lamp, 1.));
    })
    .unwrap();

  let glsl = program
    .entry("main")
    .unwrap()
    .to_glsl(&GlslOptions::default())
    .unwrap();

  assert!(glsl.contains("struct Light {\n  vec3 position;\n};\n"));
  assert!(glsl.contains("uniform Scene {\n  Light sun;\n} scene;\n"));
  assert!(glsl.contains("uniform Light_lamp {\n  vec3 position;\n} lamp;\n"));
  assert!(!glsl.contains("uniform Light {"));
}
