use serde::Serialize;
use std::fmt;

use crate::error::FireError;

/// Ballistic properties of a weapon/projectile pairing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MunitionProfile {
    pub name: &'static str,
    pub label: &'static str,
    /// kg
    pub mass: f64,
    pub drag_coefficient: f64,
    /// m/s
    pub muzzle_velocity: f64,
    /// Fired above the maximum-range elevation (mortar employment).
    pub high_angle: bool,
    /// Sight offset subtracted from milliradians for display.
    pub elevation_offset_mil: f64,
}

static CATALOG: [MunitionProfile; 3] = [
    MunitionProfile {
        name: "m252",
        label: "M252 81mm",
        mass: 4.1,
        drag_coefficient: 0.0012,
        muzzle_velocity: 250.0,
        high_angle: true,
        elevation_offset_mil: 960.0,
    },
    MunitionProfile {
        name: "m119",
        label: "M119 105mm",
        mass: 23.0,
        drag_coefficient: 0.0043,
        muzzle_velocity: 212.5,
        high_angle: false,
        elevation_offset_mil: 0.0,
    },
    MunitionProfile {
        name: "t2s1",
        label: "2S1 122mm",
        mass: 21.8,
        drag_coefficient: 0.0043,
        muzzle_velocity: 690.0,
        high_angle: false,
        elevation_offset_mil: 0.0,
    },
];

impl MunitionProfile {
    /// Builds an ad-hoc profile. Catalog entries are the usual entry point;
    /// this exists for callers modelling a projectile outside the catalog.
    pub fn custom(mass: f64, drag_coefficient: f64, muzzle_velocity: f64, high_angle: bool) -> Self {
        MunitionProfile {
            name: "custom",
            label: "Custom",
            mass,
            drag_coefficient,
            muzzle_velocity,
            high_angle,
            elevation_offset_mil: 0.0,
        }
    }

    pub fn all() -> &'static [MunitionProfile] {
        &CATALOG
    }

    pub fn lookup(name: &str) -> Option<&'static MunitionProfile> {
        let key = name.trim();
        CATALOG.iter().find(|p| p.name.eq_ignore_ascii_case(key))
    }

    pub fn parse_str(name: &str) -> Result<&'static MunitionProfile, FireError> {
        Self::lookup(name).ok_or_else(|| FireError::UnknownMunition(name.to_string()))
    }

    /// Drag acceleration per unit speed squared.
    pub fn drag_factor(&self) -> f64 {
        self.drag_coefficient / self.mass
    }

    pub fn validate(&self) -> Result<(), FireError> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(FireError::invalid("mass", "must be a positive number"));
        }
        if !self.drag_coefficient.is_finite() || self.drag_coefficient < 0.0 {
            return Err(FireError::invalid("drag_coefficient", "must be zero or positive"));
        }
        if !self.muzzle_velocity.is_finite() || self.muzzle_velocity <= 0.0 {
            return Err(FireError::invalid("muzzle_velocity", "must be a positive number"));
        }
        if !self.elevation_offset_mil.is_finite() {
            return Err(FireError::invalid("elevation_offset_mil", "must be finite"));
        }
        Ok(())
    }
}

impl fmt::Display for MunitionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(MunitionProfile::lookup("M252").map(|p| p.name), Some("m252"));
        assert_eq!(MunitionProfile::lookup(" t2s1 ").map(|p| p.name), Some("t2s1"));
        assert!(MunitionProfile::lookup("m777").is_none());
    }

    #[test]
    fn unknown_name_is_a_client_error() {
        let err = MunitionProfile::parse_str("howitzer").unwrap_err();
        assert!(matches!(err, FireError::UnknownMunition(ref n) if n == "howitzer"));
    }

    #[test]
    fn catalog_entries_are_valid() {
        for p in MunitionProfile::all() {
            p.validate().unwrap();
        }
        assert!(MunitionProfile::lookup("m252").unwrap().high_angle);
        assert!(!MunitionProfile::lookup("m119").unwrap().high_angle);
    }

    #[test]
    fn degenerate_profiles_are_rejected() {
        assert!(MunitionProfile::custom(0.0, 0.001, 200.0, false).validate().is_err());
        assert!(MunitionProfile::custom(5.0, -0.1, 200.0, false).validate().is_err());
        assert!(MunitionProfile::custom(5.0, 0.0, 0.0, true).validate().is_err());
        assert!(MunitionProfile::custom(5.0, 0.0, f64::NAN, true).validate().is_err());
        assert!(MunitionProfile::custom(5.0, 0.0, 120.0, true).validate().is_ok());
    }
}
