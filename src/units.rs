//! Unit-of-measure and cartographic scale conversions.
//!
//! Physical units (inches, millimeters, points) convert to device pixels
//! through the DPI alone. Ground-relative units (ground meters, ground feet)
//! go through the cartographic scale ratio instead, so a ground distance at
//! a given map scale maps to a fixed pixel distance regardless of DPI.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const MM_IN_INCH: f64 = 25.4;
pub const PT_IN_INCH: f64 = 72.0;
pub const IN_IN_FOOT: f64 = 12.0;

/// Unit of measure for a numeric style parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Uom {
    Px,
    In,
    Mm,
    Pt,
    /// Ground meters.
    Gm,
    /// Ground feet.
    Gft,
    Percent,
}

/// Linear unit of the map coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapUnit {
    M,
    Ft,
    UsFt,
    Degree,
}

impl MapUnit {
    /// Length of one map unit in meters (one degree measured at the equator).
    pub fn to_meters(self) -> f64 {
        match self {
            MapUnit::M => 1.0,
            MapUnit::Ft => 0.3048,
            MapUnit::UsFt => 1200.0 / 3937.0,
            MapUnit::Degree => 111_319.444_444_44,
        }
    }
}

/// Convert a value expressed in `uom` to device pixels.
///
/// An absent unit means the value already is in pixels. `v100p` is the
/// reference returned for a `PERCENT` value of 100 (used for halo and label
/// sizes relative to the font size); without a reference the value passes
/// through unchanged.
pub fn to_pixel(
    value: f64,
    uom: Option<Uom>,
    dpi: f64,
    scale_denom: f64,
    v100p: Option<f64>,
) -> Result<f64> {
    let Some(uom) = uom else {
        return Ok(value);
    };
    if uom == Uom::Px {
        return Ok(value);
    }
    if dpi <= 0.0 {
        return Err(EngineError::InvalidDpi(dpi));
    }

    match uom {
        Uom::Px => Ok(value),
        Uom::In => Ok(value * dpi),
        Uom::Mm => Ok(value / MM_IN_INCH * dpi),
        // 1pt is 1/72in whatever the dpi is
        Uom::Pt => Ok(value / PT_IN_INCH * dpi),
        Uom::Gm => {
            if scale_denom <= 0.0 {
                return Err(EngineError::InvalidScale(scale_denom));
            }
            Ok(value * 1000.0 * dpi / (scale_denom * MM_IN_INCH))
        }
        Uom::Gft => {
            if scale_denom <= 0.0 {
                return Err(EngineError::InvalidScale(scale_denom));
            }
            Ok(value * IN_IN_FOOT * dpi / scale_denom)
        }
        Uom::Percent => Ok(match v100p {
            Some(reference) => value * reference / 100.0,
            None => value,
        }),
    }
}

/// Pixels covered by one ground unit at the given resolution and scale.
pub fn ground_to_pixel_factor(unit: MapUnit, dpi: f64, scale_denom: f64) -> Result<f64> {
    to_pixel(unit.to_meters(), Some(Uom::Gm), dpi, scale_denom, None)
}

/// Ground units covered by one pixel at the given resolution and scale.
pub fn pixel_to_ground_factor(unit: MapUnit, dpi: f64, scale_denom: f64) -> Result<f64> {
    if dpi <= 0.0 {
        return Err(EngineError::InvalidDpi(dpi));
    }
    if scale_denom <= 0.0 {
        return Err(EngineError::InvalidScale(scale_denom));
    }
    Ok(MM_IN_INCH * scale_denom / (dpi * 1000.0 * unit.to_meters()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_passthrough() {
        assert_eq!(to_pixel(7.5, None, 96.0, 25_000.0, None).unwrap(), 7.5);
        assert_eq!(to_pixel(7.5, Some(Uom::Px), 96.0, 25_000.0, None).unwrap(), 7.5);
        // Pixels never consult the dpi, so a broken dpi is still fine here
        assert_eq!(to_pixel(7.5, Some(Uom::Px), -1.0, 25_000.0, None).unwrap(), 7.5);
    }

    #[test]
    fn test_physical_units() {
        assert_eq!(to_pixel(2.0, Some(Uom::In), 96.0, 1.0, None).unwrap(), 192.0);
        assert!((to_pixel(25.4, Some(Uom::Mm), 96.0, 1.0, None).unwrap() - 96.0).abs() < 1e-9);
        assert!((to_pixel(72.0, Some(Uom::Pt), 96.0, 1.0, None).unwrap() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_ground_units_scale_with_denominator() {
        // 25m on a 1:1000 map at 96dpi: 25 * 1000 * 96 / (1000 * 25.4)
        let px = to_pixel(25.0, Some(Uom::Gm), 96.0, 1000.0, None).unwrap();
        assert!((px - 25.0 * 1000.0 * 96.0 / (1000.0 * 25.4)).abs() < 1e-9);

        let ft = to_pixel(10.0, Some(Uom::Gft), 96.0, 1000.0, None).unwrap();
        assert!((ft - 10.0 * 12.0 * 96.0 / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent() {
        assert_eq!(to_pixel(50.0, Some(Uom::Percent), 96.0, 1.0, Some(12.0)).unwrap(), 6.0);
        // No reference: pass through
        assert_eq!(to_pixel(50.0, Some(Uom::Percent), 96.0, 1.0, None).unwrap(), 50.0);
    }

    #[test]
    fn test_linearity() {
        for uom in [Uom::In, Uom::Mm, Uom::Pt, Uom::Gm, Uom::Gft] {
            let one = to_pixel(1.0, Some(uom), 96.0, 5000.0, None).unwrap();
            let five = to_pixel(5.0, Some(uom), 96.0, 5000.0, None).unwrap();
            assert!((five - 5.0 * one).abs() < 1e-9, "{uom:?} is not linear");
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(to_pixel(1.0, Some(Uom::Mm), 0.0, 1.0, None).is_err());
        assert!(to_pixel(1.0, Some(Uom::Mm), -96.0, 1.0, None).is_err());
        assert!(to_pixel(1.0, Some(Uom::Gm), 96.0, 0.0, None).is_err());
        assert!(to_pixel(1.0, Some(Uom::Gft), 96.0, -5.0, None).is_err());
        assert!(pixel_to_ground_factor(MapUnit::M, 96.0, 0.0).is_err());
        assert!(ground_to_pixel_factor(MapUnit::M, 0.0, 1000.0).is_err());
    }

    #[test]
    fn test_factor_round_trip() {
        for unit in [MapUnit::M, MapUnit::Ft, MapUnit::UsFt, MapUnit::Degree] {
            for scale in [500.0, 25_000.0, 1_000_000.0] {
                let g2p = ground_to_pixel_factor(unit, 96.0, scale).unwrap();
                let p2g = pixel_to_ground_factor(unit, 96.0, scale).unwrap();
                let v = 1234.5;
                assert!(
                    (v * g2p * p2g - v).abs() < 1e-6,
                    "round trip failed for {unit:?} at 1:{scale}"
                );
            }
        }
    }
}
