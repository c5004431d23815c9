//! Diesel SQL type definitions and `FromSql` / `ToSql` implementations.
//!
//! `Geometry` and `Geography` map to PostGIS's native `geometry` /
//! `geography` types and travel as EWKB in binary protocol mode.

use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Nullable;
use geozero::wkb::Ewkb;
use geozero::{CoordDimensions, ToGeo, ToWkb};
use pgspatial_core::dimension::EWKB_Z_FLAG;
use pgspatial_core::Dimension;
use std::io::Write as IoWrite;

// ── SQL types ─────────────────────────────────────────────────────────────────

/// Diesel SQL type for a PostGIS `geometry` column.
///
/// ```rust,ignore
/// table! {
///     features (id) {
///         id   -> Integer,
///         geom -> Nullable<pgspatial_diesel::Geometry>,
///     }
/// }
/// ```
#[derive(diesel::sql_types::SqlType, diesel::query_builder::QueryId, Debug, Clone, Copy)]
#[diesel(postgres_type(name = "geometry"))]
pub struct Geometry;

/// Diesel SQL type for a PostGIS `geography` column (SRID 4326).
///
/// Same wire format as [`Geometry`], but `FromSql` enforces SRID 4326.
#[derive(diesel::sql_types::SqlType, diesel::query_builder::QueryId, Debug, Clone, Copy)]
#[diesel(postgres_type(name = "geography"))]
pub struct Geography;

/// SQL types that can stand as a geometry operand of a spatial call.
pub trait SpatialSqlType {}

impl SpatialSqlType for Geometry {}
impl SpatialSqlType for Geography {}
impl SpatialSqlType for Nullable<Geometry> {}
impl SpatialSqlType for Nullable<Geography> {}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const EWKB_SRID_FLAG: u32 = 0x2000_0000;

/// Read the SRID from an EWKB header, if the SRID flag is set.
fn ewkb_srid(blob: &[u8]) -> Result<Option<i32>, BoxError> {
    if blob.len() < 5 {
        return Err("EWKB blob too short".into());
    }
    let little_endian = match blob[0] {
        0x01 => true,
        0x00 => false,
        other => return Err(format!("invalid EWKB byte order marker {other:#04x}").into()),
    };
    let word = |bytes: &[u8]| {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if little_endian {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        }
    };
    let raw_type = word(&blob[1..5]);
    if raw_type & EWKB_SRID_FLAG == 0 {
        return Ok(None);
    }
    if blob.len() < 9 {
        return Err("EWKB SRID truncated".into());
    }
    Ok(Some(word(&blob[5..9]) as i32))
}

fn parse_geometry_blob(blob: &[u8]) -> Result<geo::Geometry<f64>, BoxError> {
    let raw_type = if blob.len() >= 5 && blob[0] == 0x01 {
        u32::from_le_bytes([blob[1], blob[2], blob[3], blob[4]])
    } else if blob.len() >= 5 {
        u32::from_be_bytes([blob[1], blob[2], blob[3], blob[4]])
    } else {
        return Err("EWKB blob too short".into());
    };
    let dimension = Dimension::from_ewkb_type(raw_type);
    if dimension != Dimension::Xy {
        // `geo` holds XY coordinates only; Z/M would be dropped silently.
        return Err(format!(
            "cannot decode {dimension} geometry into geo::Geometry (Z flag {})",
            raw_type & EWKB_Z_FLAG != 0
        )
        .into());
    }
    Ok(Ewkb(blob).to_geo()?)
}

fn parse_geography_blob(blob: &[u8]) -> Result<geo::Geometry<f64>, BoxError> {
    match ewkb_srid(blob)? {
        Some(4326) => parse_geometry_blob(blob),
        Some(other) => Err(format!("geography EWKB must use SRID 4326 (got {other})").into()),
        None => Err("geography EWKB must include SRID 4326".into()),
    }
}

fn write_geometry_blob(geometry: &geo::Geometry<f64>, srid: Option<i32>) -> Result<Vec<u8>, BoxError> {
    Ok(geometry.to_ewkb(CoordDimensions::xy(), srid)?)
}

// --- Vec<u8> (raw EWKB bytes) ---

macro_rules! impl_raw_bytes_pg {
    ($sql_type:ty) => {
        impl FromSql<$sql_type, Pg> for Vec<u8> {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                Ok(bytes.as_bytes().to_vec())
            }
        }

        impl ToSql<$sql_type, Pg> for Vec<u8> {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                IoWrite::write_all(out, self)?;
                Ok(IsNull::No)
            }
        }
    };
}

impl_raw_bytes_pg!(Geometry);
impl_raw_bytes_pg!(Geography);

// --- geo::Geometry<f64> ---

impl FromSql<Geometry, Pg> for geo::Geometry<f64> {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        parse_geometry_blob(bytes.as_bytes())
    }
}

impl ToSql<Geometry, Pg> for geo::Geometry<f64> {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let blob = write_geometry_blob(self, None)?;
        IoWrite::write_all(out, &blob)?;
        Ok(IsNull::No)
    }
}

impl FromSql<Geography, Pg> for geo::Geometry<f64> {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        parse_geography_blob(bytes.as_bytes())
    }
}

impl ToSql<Geography, Pg> for geo::Geometry<f64> {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let blob = write_geometry_blob(self, Some(4326))?;
        IoWrite::write_all(out, &blob)?;
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_blob(srid: Option<i32>) -> Vec<u8> {
        let point = geo::Geometry::Point(geo::Point::new(1.0, 2.0));
        write_geometry_blob(&point, srid).unwrap()
    }

    #[test]
    fn srid_is_read_from_header() {
        assert_eq!(ewkb_srid(&point_blob(Some(4326))).unwrap(), Some(4326));
        assert_eq!(ewkb_srid(&point_blob(None)).unwrap(), None);
    }

    #[test]
    fn short_blob_is_rejected() {
        assert!(ewkb_srid(&[0x01, 0x01]).is_err());
        assert!(parse_geometry_blob(&[]).is_err());
    }

    #[test]
    fn invalid_byte_order_is_rejected() {
        assert!(ewkb_srid(&[0x07, 0, 0, 0, 1]).is_err());
    }

    #[test]
    fn geometry_blob_round_trips_point() {
        let geom = parse_geometry_blob(&point_blob(None)).unwrap();
        assert_eq!(geom, geo::Geometry::Point(geo::Point::new(1.0, 2.0)));
    }

    #[test]
    fn geography_requires_wgs84() {
        assert!(parse_geography_blob(&point_blob(Some(4326))).is_ok());
        assert!(parse_geography_blob(&point_blob(Some(3857))).is_err());
        assert!(parse_geography_blob(&point_blob(None)).is_err());
    }

    #[test]
    fn z_geometries_are_rejected() {
        // POINT Z(1 2 3), little-endian EWKB.
        let mut blob = vec![0x01];
        blob.extend_from_slice(&(1u32 | EWKB_Z_FLAG).to_le_bytes());
        for v in [1.0f64, 2.0, 3.0] {
            blob.extend_from_slice(&v.to_le_bytes());
        }
        let err = parse_geometry_blob(&blob).unwrap_err();
        assert!(err.to_string().contains("3DZ"), "{err}");
    }
}
