use std::collections::HashMap;

use crate::error::Error;
use crate::rect::NormalizedBounds;

/// Horizontal layout of the eight digit cells within a timecode region,
/// as fractions of the region width.
#[derive(Debug, Clone, Copy)]
pub struct CellGeometry {
    /// Width of a single digit cell.
    pub cell_width: f64,
    /// Gap following each cell. Small gaps separate the two digits of a
    /// field, big gaps separate fields; the final entry is never
    /// consumed.
    pub gaps: [f64; 8],
}

/// Fixed overlay geometry for one footage source: where the timecode
/// sits in the frame, and how its digit cells are laid out.
#[derive(Debug, Clone, Copy)]
pub struct SourceProfile {
    pub region: NormalizedBounds,
    pub cells: CellGeometry,
}

const NAT_GEO_SMALL_GAP: f64 = 0.0119;
const NAT_GEO_BIG_GAP: f64 = 0.0618;

/// Overlay geometry of Nat Geo archival masters.
pub const NAT_GEO: SourceProfile = SourceProfile {
    region: NormalizedBounds {
        x_min: 0.3905,
        x_max: 0.61,
        y_min: 0.807,
        y_max: 0.865,
    },
    cells: CellGeometry {
        cell_width: 0.095,
        gaps: [
            NAT_GEO_SMALL_GAP,
            NAT_GEO_BIG_GAP,
            NAT_GEO_SMALL_GAP,
            NAT_GEO_BIG_GAP,
            NAT_GEO_SMALL_GAP,
            NAT_GEO_BIG_GAP,
            NAT_GEO_SMALL_GAP,
            NAT_GEO_BIG_GAP,
        ],
    },
};

/// Named source profiles, looked up by the `Source Reel Name` of a row.
pub struct ProfileRegistry {
    profiles: HashMap<String, SourceProfile>,
}

impl ProfileRegistry {
    /// Registry pre-populated with the built-in profiles.
    pub fn builtin() -> Self {
        let mut registry = Self {
            profiles: HashMap::new(),
        };
        registry.register("Nat Geo", NAT_GEO);
        registry
    }

    /// Add or replace a named profile.
    pub fn register(&mut self, name: &str, profile: SourceProfile) {
        self.profiles.insert(name.to_owned(), profile);
    }

    /// Resolve a profile by name. An unrecognized name is an error,
    /// never a silent default.
    pub fn get(&self, name: &str) -> Result<&SourceProfile, Error> {
        self.profiles
            .get(name)
            .ok_or_else(|| Error::UnknownProfile(name.to_owned()))
    }

    /// Names of all registered profiles.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|name| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_nat_geo() {
        let registry = ProfileRegistry::builtin();
        let profile = registry.get("Nat Geo").unwrap();
        assert!((profile.cells.cell_width - 0.095).abs() < 1e-12);
        assert!((profile.region.x_min - 0.3905).abs() < 1e-12);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = ProfileRegistry::builtin();
        let err = registry.get("Discovery").unwrap_err();
        assert!(matches!(err, Error::UnknownProfile(name) if name == "Discovery"));
    }

    #[test]
    fn registry_is_open_to_extension() {
        let mut registry = ProfileRegistry::builtin();
        registry.register("Nat Geo HD", NAT_GEO);
        assert!(registry.get("Nat Geo HD").is_ok());
        assert!(registry.names().count() >= 2);
    }

    #[test]
    fn gaps_alternate_small_and_big() {
        for (i, gap) in NAT_GEO.cells.gaps.iter().enumerate() {
            let expected = if i % 2 == 0 {
                NAT_GEO_SMALL_GAP
            } else {
                NAT_GEO_BIG_GAP
            };
            assert!((gap - expected).abs() < 1e-12, "gap {i}");
        }
    }
}
