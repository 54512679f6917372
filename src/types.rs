//! Shared types and enums used across rasterstretch.
//! Includes map geometry (`MapPoint`, `Extent`), the affine `GeoTransform`,
//! computed `StretchBounds`, and output options (`OutputFormat`, `BitDepth`).
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Affine geotransform coefficients
/// ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
pub type GeoTransform = [f64; 6];

/// Geotransform of a raster without georeferencing: pixel space, y pointing down.
pub const PIXEL_GEOTRANSFORM: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// A point in map (layer CRS) coordinates
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in map coordinates.
///
/// The default extent has zero width and height and stands for "the full
/// raster" wherever an extent selects pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// Build an extent, swapping coordinates so that min <= max on both axes.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            xmin: x1.min(x2),
            ymin: y1.min(y2),
            xmax: x1.max(x2),
            ymax: y1.max(y2),
        }
    }

    /// Rectangle spanned by two opposite corners, in any order
    pub fn from_corners(a: MapPoint, b: MapPoint) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// True for the null extent (or any degenerate rectangle)
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    pub fn top_left(&self) -> MapPoint {
        MapPoint::new(self.xmin, self.ymax)
    }

    pub fn top_right(&self) -> MapPoint {
        MapPoint::new(self.xmax, self.ymax)
    }

    pub fn bottom_right(&self) -> MapPoint {
        MapPoint::new(self.xmax, self.ymin)
    }

    pub fn bottom_left(&self) -> MapPoint {
        MapPoint::new(self.xmin, self.ymin)
    }

    /// Closed ring tracing the rectangle: TL, TR, BR, BL, TL
    pub fn ring(&self) -> Vec<MapPoint> {
        vec![
            self.top_left(),
            self.top_right(),
            self.bottom_right(),
            self.bottom_left(),
            self.top_left(),
        ]
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

impl FromStr for Extent {
    type Err = String;

    /// Parse `xmin,ymin,xmax,ymax`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid extent '{}': {}", s, e))?;
        match parts.as_slice() {
            [x1, y1, x2, y2] => Ok(Extent::new(*x1, *y1, *x2, *y2)),
            _ => Err(format!(
                "invalid extent '{}': expected xmin,ymin,xmax,ymax",
                s
            )),
        }
    }
}

/// Value bounds produced by a percentile cut, in the band's native domain
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StretchBounds {
    pub low: f64,
    pub high: f64,
}

impl std::fmt::Display for StretchBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.low, self.high)
    }
}

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum OutputFormat {
    TIFF,
    JPEG, // Lossy, preview only
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::TIFF => "tiff",
            OutputFormat::JPEG => "jpg",
        }
    }
}

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum BitDepth {
    U8,
    U16,
}

impl BitDepth {
    pub fn max_value(&self) -> f64 {
        match self {
            BitDepth::U8 => 255.0,
            BitDepth::U16 => 65535.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_normalizes_corner_order() {
        let e = Extent::from_corners(MapPoint::new(10.0, -2.0), MapPoint::new(-5.0, 7.5));
        assert_eq!(e, Extent::new(-5.0, -2.0, 10.0, 7.5));
        assert_eq!(e.width(), 15.0);
        assert_eq!(e.height(), 9.5);
        assert!(!e.is_empty());
    }

    #[test]
    fn default_extent_is_empty() {
        assert!(Extent::default().is_empty());
        assert!(Extent::new(1.0, 1.0, 1.0, 4.0).is_empty());
    }

    #[test]
    fn ring_is_closed_clockwise_from_top_left() {
        let ring = Extent::new(0.0, 0.0, 2.0, 1.0).ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[0], MapPoint::new(0.0, 1.0));
        assert_eq!(ring[2], MapPoint::new(2.0, 0.0));
    }

    #[test]
    fn extent_parses_from_cli_text() {
        let e: Extent = "100, 50, 0, 0".parse().unwrap();
        assert_eq!(e, Extent::new(0.0, 0.0, 100.0, 50.0));
        assert!("1,2,3".parse::<Extent>().is_err());
        assert!("a,b,c,d".parse::<Extent>().is_err());
    }
}
