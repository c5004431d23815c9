//! Coordinate dimensionality of a geometry.
//!
//! Format codecs use this to decide how many ordinates to read or write per
//! coordinate.

use std::fmt;
use std::str::FromStr;

use geozero::CoordDimensions;

use crate::error::UnknownWireValue;

/// EWKB type-word flag for Z coordinates.
pub const EWKB_Z_FLAG: u32 = 0x8000_0000;
/// EWKB type-word flag for M coordinates.
pub const EWKB_M_FLAG: u32 = 0x4000_0000;

/// Presence of the Z (elevation) and M (measure) ordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// `POINT(x y)`
    Xy,
    /// `POINT Z(x y z)`
    Xyz,
    /// `POINT M(x y m)`
    Xym,
    /// `POINT ZM(x y z m)`
    Xyzm,
}

impl Dimension {
    pub const fn classify(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimension::Xy,
            (true, false) => Dimension::Xyz,
            (false, true) => Dimension::Xym,
            (true, true) => Dimension::Xyzm,
        }
    }

    /// Classify a coordinate by which optional ordinates it carries.
    pub fn from_coordinates(z: Option<f64>, m: Option<f64>) -> Self {
        Self::classify(z.is_some(), m.is_some())
    }

    /// Decode the Z/M bits of an EWKB or ISO WKB geometry type word.
    ///
    /// ```
    /// use pgspatial_core::Dimension;
    ///
    /// assert_eq!(Dimension::from_ewkb_type(0x8000_0001), Dimension::Xyz);
    /// assert_eq!(Dimension::from_ewkb_type(3003), Dimension::Xyzm);
    /// assert_eq!(Dimension::from_ewkb_type(0x2000_0001), Dimension::Xy);
    /// ```
    pub const fn from_ewkb_type(raw_type: u32) -> Self {
        let has_z = raw_type & EWKB_Z_FLAG != 0;
        let has_m = raw_type & EWKB_M_FLAG != 0;
        if has_z || has_m {
            return Self::classify(has_z, has_m);
        }
        match (raw_type & 0x0FFF_FFFF) / 1000 {
            1 => Dimension::Xyz,
            2 => Dimension::Xym,
            3 => Dimension::Xyzm,
            _ => Dimension::Xy,
        }
    }

    /// Whether coordinates carry a Z ordinate.
    pub const fn has_3_dimensions(self) -> bool {
        matches!(self, Dimension::Xyz | Dimension::Xyzm)
    }

    /// Whether coordinates carry an M ordinate.
    pub const fn is_measured(self) -> bool {
        matches!(self, Dimension::Xym | Dimension::Xyzm)
    }

    /// Ordinates per coordinate.
    pub const fn coordinate_count(self) -> usize {
        2 + self.has_3_dimensions() as usize + self.is_measured() as usize
    }

    /// Same encoding as `ST_Zmflag`: 0=2D, 1=M, 2=Z, 3=ZM.
    pub const fn zm_flag(self) -> i16 {
        match self {
            Dimension::Xy => 0,
            Dimension::Xym => 1,
            Dimension::Xyz => 2,
            Dimension::Xyzm => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Dimension::Xy => "2D",
            Dimension::Xyz => "3DZ",
            Dimension::Xym => "3DM",
            Dimension::Xyzm => "4D",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = UnknownWireValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2D" => Ok(Dimension::Xy),
            "3DZ" => Ok(Dimension::Xyz),
            "3DM" => Ok(Dimension::Xym),
            "4D" => Ok(Dimension::Xyzm),
            _ => Err(UnknownWireValue {
                kind: "dimension",
                value: s.to_string(),
            }),
        }
    }
}

impl From<Dimension> for CoordDimensions {
    fn from(dimension: Dimension) -> Self {
        CoordDimensions {
            z: dimension.has_3_dimensions(),
            m: dimension.is_measured(),
            t: false,
            tm: false,
        }
    }
}
