//! Ground surface albedo table.

use crate::error::{PlantError, PlantResult};

/// Named ground surfaces and their albedo.
pub const SURFACE_ALBEDO: &[(&str, f64)] = &[
    ("urban", 0.18),
    ("grass", 0.20),
    ("fresh grass", 0.26),
    ("soil", 0.17),
    ("sand", 0.40),
    ("snow", 0.65),
    ("fresh snow", 0.75),
    ("asphalt", 0.12),
    ("concrete", 0.30),
    ("aluminum", 0.85),
    ("copper", 0.74),
    ("fresh steel", 0.35),
    ("dirty steel", 0.08),
    ("sea", 0.06),
];

/// Albedo of a named surface. Matching ignores case, and `_` stands for a space.
pub fn albedo_for(surface: &str) -> Option<f64> {
    let key = surface.trim().to_ascii_lowercase().replace('_', " ");
    SURFACE_ALBEDO
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, albedo)| *albedo)
}

/// Pick the albedo from an explicit value or a surface name.
///
/// An explicit value wins over the surface name.
pub fn resolve_albedo(albedo: Option<f64>, surface: Option<&str>) -> PlantResult<f64> {
    let value = match (albedo, surface) {
        (Some(value), _) => value,
        (None, Some(name)) => albedo_for(name).ok_or_else(|| {
            PlantError::Configuration(format!(
                "unknown surface type '{name}'; see `pvplant surfaces`"
            ))
        })?,
        (None, None) => {
            return Err(PlantError::Configuration(
                "either surface_albedo or surface_type is required".into(),
            ))
        }
    };
    if !(0.0..=1.0).contains(&value) {
        return Err(PlantError::Configuration(format!(
            "surface_albedo must be within [0, 1], got {value}"
        )));
    }
    Ok(value)
}
