//! A colored triangle, printed as GLSL ES 1.00, GLSL ES 3.00 and WGSL.

use dualshade::{
  expr::Expr,
  lit,
  scope::{Conditional as _, Scope},
  stdlib::Bounded as _,
  sw,
  swizzle::Swizzlable as _,
  types::{V2, V3},
  vec4, Error, GlslOptions, GlslVersion, Program, WgslOptions,
};

fn main() -> Result<(), Error> {
  let mut program = Program::new();

  let position = program.attribute::<V2<f32>>("position")?;
  let color = program.attribute::<V3<f32>>("color")?;
  let v_color = program.varying::<V3<f32>>("v_color")?;
  let time = program.uniform::<f32>("time")?;

  let pulse = program.fun("pulse", |_: &mut Scope<Expr<f32>>, t: Expr<f32>| {
    (t * 0.5).clamp(0., 1.)
  })?;

  {
    let v_color = v_color.clone();

    program.vertex("vs", move |s, _| {
      s.set(&v_color, color.expr());
      s.leave(vec4!(position.expr(), 0., 1.));
    })?;
  }

  program.fragment("fs", move |s, env| {
    let rgb = s.var(v_color.to_expr() * pulse.call(time.expr()));

    s.when(sw!(env.frag_coord, .y).lt(lit!(1f32)), |s| {
      s.discard();
    });

    s.leave(vec4!(rgb.to_expr(), 1.));
  })?;

  for name in ["vs", "fs"] {
    let entry = program.entry(name)?;

    println!("// {} (GLSL ES 1.00)", name);
    println!("{}", entry.to_glsl(&GlslOptions::default().version(GlslVersion::V1))?);

    println!("// {} (GLSL ES 3.00)", name);
    println!("{}", entry.to_glsl(&GlslOptions::default())?);

    let peer = if name == "vs" { "fs" } else { "vs" };
    println!("// {} (WGSL)", name);
    println!(
      "{}",
      entry.to_wgsl(&WgslOptions::default().remap_depth(true).peer(peer))?
    );
  }

  Ok(())
}
