use crate::error::Error;
use super::*;

// ============================================================================
// Technique classification
// ============================================================================

#[test]
fn test_technique_families() {
    assert!(ShadowTechnique::StencilAdditive.is_stencil_based());
    assert!(ShadowTechnique::StencilAdditive.is_additive());
    assert!(ShadowTechnique::StencilModulative.is_modulative());
    assert!(ShadowTechnique::TextureModulative.is_texture_based());
    assert!(!ShadowTechnique::TextureAdditive.is_stencil_based());
    assert!(!ShadowTechnique::None.is_additive());
    assert!(!ShadowTechnique::None.is_modulative());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_defaults_are_valid() {
    let settings = ShadowSettings::default();
    assert_eq!(settings.technique, ShadowTechnique::None);
    assert!(settings.use_infinite_far_plane);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_negative_far_distance_rejected() {
    let settings = ShadowSettings { far_distance: -1.0, ..ShadowSettings::default() };
    assert!(matches!(settings.validate(), Err(Error::Configuration(_))));
}

#[test]
fn test_zero_texture_count_rejected_for_texture_shadows() {
    let mut settings = ShadowSettings::with_technique(ShadowTechnique::TextureModulative);
    settings.texture_count = 0;
    assert!(matches!(settings.validate(), Err(Error::Configuration(_))));

    // Irrelevant for stencil shadows
    settings.technique = ShadowTechnique::StencilAdditive;
    assert!(settings.validate().is_ok());
}

#[test]
fn test_fade_order_rejected() {
    let settings = ShadowSettings {
        texture_fade_start: 0.95,
        texture_fade_end: 0.5,
        ..ShadowSettings::default()
    };
    assert!(matches!(settings.validate(), Err(Error::Configuration(_))));
}

#[test]
fn test_zero_extrusion_distance_rejected() {
    let settings = ShadowSettings {
        directional_light_extrusion_distance: 0.0,
        ..ShadowSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_shadow_camera_distance() {
    let mut settings = ShadowSettings::default();
    assert_eq!(settings.shadow_camera_distance(2.0), 600.0);

    settings.far_distance = 50.0;
    assert_eq!(settings.shadow_camera_distance(2.0), 50.0);
}
