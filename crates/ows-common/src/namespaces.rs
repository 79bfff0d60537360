//! Namespace URIs of the OGC schemas the bindings read and write.

pub const OWS_11: &str = "http://www.opengis.net/ows/1.1";
pub const OWS_10: &str = "http://www.opengis.net/ows";
pub const XLINK: &str = "http://www.w3.org/1999/xlink";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub const GML_32: &str = "http://www.opengis.net/gml/3.2";
pub const GML_311: &str = "http://www.opengis.net/gml";

pub const FES_20: &str = "http://www.opengis.net/fes/2.0";
pub const OGC: &str = "http://www.opengis.net/ogc";

pub const SWE_20: &str = "http://www.opengis.net/swe/2.0";
pub const SWES_20: &str = "http://www.opengis.net/swes/2.0";

pub const SOS_10: &str = "http://www.opengis.net/sos/1.0";
pub const SOS_20: &str = "http://www.opengis.net/sos/2.0";

pub const OM_10: &str = "http://www.opengis.net/om/1.0";
pub const OM_20: &str = "http://www.opengis.net/om/2.0";

pub const WCS_10: &str = "http://www.opengis.net/wcs";
pub const WCS_20: &str = "http://www.opengis.net/wcs/2.0";
pub const GMLCOV_10: &str = "http://www.opengis.net/gmlcov/1.0";
