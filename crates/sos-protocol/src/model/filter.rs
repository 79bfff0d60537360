//! Spatial and temporal binary filters.

use ows_common::{Envelope, TimeValue};
use serde::Serialize;

/// `operator(value_reference, value)`, e.g. `During(phenomenonTime, period)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryFilter<Op, V> {
    pub operator: Op,
    /// Property the filter applies to, e.g. `om:phenomenonTime`.
    pub value_reference: String,
    pub value: V,
}

impl<Op, V> BinaryFilter<Op, V> {
    pub fn new(operator: Op, value_reference: impl Into<String>, value: V) -> Self {
        Self {
            operator,
            value_reference: value_reference.into(),
            value,
        }
    }
}

pub type SpatialFilter = BinaryFilter<SpatialOperator, Envelope>;
pub type TemporalFilter = BinaryFilter<TemporalOperator, TimeValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpatialOperator {
    BBox,
    Intersects,
    Within,
    Contains,
    Overlaps,
    Disjoint,
    Equals,
}

impl SpatialOperator {
    pub const ALL: [SpatialOperator; 7] = [
        SpatialOperator::BBox,
        SpatialOperator::Intersects,
        SpatialOperator::Within,
        SpatialOperator::Contains,
        SpatialOperator::Overlaps,
        SpatialOperator::Disjoint,
        SpatialOperator::Equals,
    ];

    /// Element name in both FES 2.0 and OGC Filter 1.1.
    pub fn element_name(&self) -> &'static str {
        match self {
            SpatialOperator::BBox => "BBOX",
            SpatialOperator::Intersects => "Intersects",
            SpatialOperator::Within => "Within",
            SpatialOperator::Contains => "Contains",
            SpatialOperator::Overlaps => "Overlaps",
            SpatialOperator::Disjoint => "Disjoint",
            SpatialOperator::Equals => "Equals",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.element_name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TemporalOperator {
    After,
    Before,
    Begins,
    BegunBy,
    During,
    EndedBy,
    Ends,
    Equals,
    Meets,
    MetBy,
    Overlaps,
    OverlappedBy,
    Contains,
}

impl TemporalOperator {
    pub const ALL: [TemporalOperator; 13] = [
        TemporalOperator::After,
        TemporalOperator::Before,
        TemporalOperator::Begins,
        TemporalOperator::BegunBy,
        TemporalOperator::During,
        TemporalOperator::EndedBy,
        TemporalOperator::Ends,
        TemporalOperator::Equals,
        TemporalOperator::Meets,
        TemporalOperator::MetBy,
        TemporalOperator::Overlaps,
        TemporalOperator::OverlappedBy,
        TemporalOperator::Contains,
    ];

    /// FES 2.0 element name.
    pub fn fes_name(&self) -> &'static str {
        match self {
            TemporalOperator::After => "After",
            TemporalOperator::Before => "Before",
            TemporalOperator::Begins => "Begins",
            TemporalOperator::BegunBy => "BegunBy",
            TemporalOperator::During => "During",
            TemporalOperator::EndedBy => "EndedBy",
            TemporalOperator::Ends => "Ends",
            TemporalOperator::Equals => "TEquals",
            TemporalOperator::Meets => "Meets",
            TemporalOperator::MetBy => "MetBy",
            TemporalOperator::Overlaps => "TOverlaps",
            TemporalOperator::OverlappedBy => "OverlappedBy",
            TemporalOperator::Contains => "TContains",
        }
    }

    /// OGC Filter 1.1 element name as used by SOS 1.0 (`TM_` prefixed).
    pub fn ogc_name(&self) -> &'static str {
        match self {
            TemporalOperator::After => "TM_After",
            TemporalOperator::Before => "TM_Before",
            TemporalOperator::Begins => "TM_Begins",
            TemporalOperator::BegunBy => "TM_BegunBy",
            TemporalOperator::During => "TM_During",
            TemporalOperator::EndedBy => "TM_EndedBy",
            TemporalOperator::Ends => "TM_Ends",
            TemporalOperator::Equals => "TM_Equals",
            TemporalOperator::Meets => "TM_Meets",
            TemporalOperator::MetBy => "TM_MetBy",
            TemporalOperator::Overlaps => "TM_Overlaps",
            TemporalOperator::OverlappedBy => "TM_OverlappedBy",
            TemporalOperator::Contains => "TM_Contains",
        }
    }

    pub fn from_fes_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.fes_name() == name)
    }

    pub fn from_ogc_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.ogc_name() == name)
    }
}
