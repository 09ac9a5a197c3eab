//! Checks of the CPU lighting evaluator against the Blinn-Phong contract the
//! fragment shader implements.

use glam::Vec3;
use terrain::gpu::{evaluate_lighting, AMBIENT_TERM};
use terrain::{Light, Material};

fn white_material() -> Material {
    Material::new(Vec3::ONE, Vec3::ONE, 32.0)
}

#[test]
fn disabled_lights_contribute_nothing() {
    let material = white_material();
    let position = Vec3::new(0.0, 0.0, -5.0);
    let normal = Vec3::Y;

    let none = evaluate_lighting(position, normal, Vec3::ONE, &[], &material);
    let disabled = evaluate_lighting(
        position,
        normal,
        Vec3::ONE,
        &[Light::disabled(), Light::disabled()],
        &material,
    );
    assert_eq!(none, disabled);
    assert_eq!(none, Vec3::splat(AMBIENT_TERM));
}

#[test]
fn directional_light_follows_lambert() {
    let material = Material::new(Vec3::ONE, Vec3::ZERO, 1.0);
    let light = Light::directional(Vec3::Y, Vec3::ONE);

    // Light along the normal: full diffuse plus ambient.
    let lit = evaluate_lighting(Vec3::new(0.0, 0.0, -5.0), Vec3::Y, Vec3::ONE, &[light], &material);
    assert!((lit - Vec3::splat((1.0 + AMBIENT_TERM).min(1.0))).length() < 1e-5);

    // Light behind the surface: ambient only.
    let back = Light::directional(-Vec3::Y, Vec3::ONE);
    let unlit = evaluate_lighting(Vec3::new(0.0, 0.0, -5.0), Vec3::Y, Vec3::ONE, &[back], &material);
    assert_eq!(unlit, Vec3::splat(AMBIENT_TERM));
}

#[test]
fn point_light_direction_depends_on_fragment_position() {
    let material = Material::new(Vec3::ONE, Vec3::ZERO, 1.0);
    // Light directly above one fragment, far to the side of another.
    let light = Light::point(Vec3::new(0.0, 5.0, -5.0), Vec3::ONE);

    let below = evaluate_lighting(Vec3::new(0.0, 0.0, -5.0), Vec3::Y, Vec3::ONE, &[light], &material);
    let aside = evaluate_lighting(Vec3::new(50.0, 0.0, -5.0), Vec3::Y, Vec3::ONE, &[light], &material);
    assert!(below.x > aside.x, "oblique incidence must dim the fragment");
}

#[test]
fn output_is_clamped() {
    let material = white_material();
    let lights = vec![Light::directional(Vec3::Y, Vec3::splat(10.0)); 8];
    let lit = evaluate_lighting(
        Vec3::new(0.0, 0.0, -5.0),
        Vec3::Y,
        Vec3::ONE,
        &lights,
        &material,
    );
    assert_eq!(lit, Vec3::ONE);
}

#[test]
fn zero_normal_shades_ambient_only() {
    let material = white_material();
    let light = Light::directional(Vec3::Y, Vec3::ONE);
    let lit = evaluate_lighting(
        Vec3::new(0.0, 0.0, -5.0),
        Vec3::ZERO,
        Vec3::new(0.5, 0.5, 0.5),
        &[light],
        &material,
    );
    assert_eq!(lit, Vec3::splat(0.5 * AMBIENT_TERM));
    assert!(lit.is_finite());
}

#[test]
fn base_color_modulates_diffuse() {
    let material = Material::new(Vec3::new(1.0, 0.5, 0.0), Vec3::ZERO, 1.0);
    let light = Light::directional(Vec3::Y, Vec3::ONE);
    let lit = evaluate_lighting(
        Vec3::new(0.0, 0.0, -5.0),
        Vec3::Y,
        Vec3::new(0.5, 1.0, 1.0),
        &[light],
        &material,
    );
    // Texture color times material diffuse, at normal incidence.
    let base = Vec3::new(0.5, 0.5, 0.0);
    let expected = (base * AMBIENT_TERM + base).clamp(Vec3::ZERO, Vec3::ONE);
    assert!((lit - expected).length() < 1e-5);
}
