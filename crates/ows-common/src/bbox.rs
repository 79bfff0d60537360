//! GML envelope type shared by spatial filters and extents.

use serde::{Deserialize, Serialize};

/// An axis-aligned envelope in an optional coordinate reference system.
///
/// Coordinates keep the axis order of the CRS they were given in; no
/// reprojection or axis swapping happens in the binding layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// CRS identifier (`srsName`), e.g. `http://www.opengis.net/def/crs/EPSG/0/4326`.
    pub crs: Option<String>,
}

impl Envelope {
    /// Create a new envelope from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            crs: None,
        }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Parse KVP envelope values: `minx,miny,maxx,maxy[,crs]`.
    pub fn from_kvp_values(values: &[&str]) -> Result<Self, EnvelopeParseError> {
        if values.len() != 4 && values.len() != 5 {
            return Err(EnvelopeParseError::InvalidFormat(values.join(",")));
        }

        let mut envelope = Self::new(
            parse_number(values[0])?,
            parse_number(values[1])?,
            parse_number(values[2])?,
            parse_number(values[3])?,
        );
        if let Some(crs) = values.get(4).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            envelope.crs = Some(crs.to_string());
        }
        Ok(envelope)
    }

    /// Parse GML `lowerCorner`/`upperCorner` texts ("x y").
    pub fn from_corners(lower: &str, upper: &str) -> Result<Self, EnvelopeParseError> {
        let (min_x, min_y) = parse_corner(lower)?;
        let (max_x, max_y) = parse_corner(upper)?;
        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// KVP form without the CRS: `minx,miny,maxx,maxy`.
    pub fn to_kvp_values(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }

    pub fn lower_corner(&self) -> String {
        format!("{} {}", self.min_x, self.min_y)
    }

    pub fn upper_corner(&self) -> String {
        format!("{} {}", self.max_x, self.max_y)
    }

    /// Lower corner must not exceed the upper corner on either axis.
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Check if this envelope intersects another.
    pub fn intersects(&self, other: &Envelope) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

fn parse_number(s: &str) -> Result<f64, EnvelopeParseError> {
    s.trim()
        .parse()
        .map_err(|_| EnvelopeParseError::InvalidNumber(s.to_string()))
}

fn parse_corner(s: &str) -> Result<(f64, f64), EnvelopeParseError> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(EnvelopeParseError::InvalidFormat(s.to_string()));
    }
    Ok((parse_number(parts[0])?, parse_number(parts[1])?))
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvelopeParseError {
    #[error("Invalid envelope: {0}. Expected 'minx,miny,maxx,maxy[,crs]' or 'x y' corners")]
    InvalidFormat(String),

    #[error("Invalid number in envelope: {0}")]
    InvalidNumber(String),
}
