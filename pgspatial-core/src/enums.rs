//! Enumerations whose wire values are passed verbatim to PostGIS.
//!
//! The strings are part of the PostGIS function signatures (for example the
//! `endcap=` key of `ST_Buffer`'s style parameter) and must track the
//! vocabulary PostGIS accepts.

use std::fmt;
use std::str::FromStr;

use crate::error::UnknownWireValue;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The string PostGIS expects for this variant.
            pub const fn wire_value(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.wire_value())
            }
        }

        impl FromStr for $name {
            type Err = UnknownWireValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    _ => Err(UnknownWireValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Shape of the buffer around line ends (`endcap=`).
    EndCap, "end cap style" {
        Round => "round",
        Flat => "flat",
        Square => "square",
    }
}

wire_enum! {
    /// Shape of the buffer or offset curve at vertices (`join=`).
    Join, "join style" {
        Round => "round",
        Mitre => "mitre",
        Bevel => "bevel",
    }
}

wire_enum! {
    /// Which side of a line to buffer (`side=`).
    Side, "buffer side" {
        Both => "both",
        Left => "left",
        Right => "right",
    }
}

wire_enum! {
    /// Overload selector for functions that exist for both `geometry` and
    /// `geography` inputs.
    SpatialType, "spatial type" {
        Geometry => "geometry",
        Geography => "geography",
    }
}

/// Output flavour of `ST_DelaunayTriangles`, passed as the integer `flags`
/// argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelaunayTrianglesOutput {
    /// A GEOMETRYCOLLECTION of triangle polygons.
    Polygons,
    /// A MULTILINESTRING of the triangle edges.
    MultiLineString,
    /// A TIN.
    Tin,
}

impl DelaunayTrianglesOutput {
    pub const ALL: &'static [DelaunayTrianglesOutput] = &[
        DelaunayTrianglesOutput::Polygons,
        DelaunayTrianglesOutput::MultiLineString,
        DelaunayTrianglesOutput::Tin,
    ];

    /// Integer flag accepted by `ST_DelaunayTriangles`.
    pub const fn flag(self) -> i32 {
        match self {
            DelaunayTrianglesOutput::Polygons => 0,
            DelaunayTrianglesOutput::MultiLineString => 1,
            DelaunayTrianglesOutput::Tin => 2,
        }
    }
}

impl TryFrom<i32> for DelaunayTrianglesOutput {
    type Error = UnknownWireValue;

    fn try_from(flag: i32) -> Result<Self, Self::Error> {
        DelaunayTrianglesOutput::ALL
            .iter()
            .copied()
            .find(|output| output.flag() == flag)
            .ok_or_else(|| UnknownWireValue {
                kind: "delaunay output flag",
                value: flag.to_string(),
            })
    }
}

impl fmt::Display for DelaunayTrianglesOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag())
    }
}
