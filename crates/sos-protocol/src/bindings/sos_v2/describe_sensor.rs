use ows_common::namespaces::{GML_32, SWES_20};
use ows_common::{
    CodecError, CodecResult, KvpParams, NamespaceContext, ReadResult, TimeValue, ValidationReport,
    Violation, XmlElement,
};

use super::{read_xml_envelope, register, write_xml_envelope, ENVELOPE};
use crate::bindings::common::{self, expect_root, opt_param, required_param, required_text};
use crate::bindings::filters::{find_gml_time, read_gml_time, write_gml_time};
use crate::codec::{Codec, Reader, Writer};
use crate::model::{operations, versions, DescribeSensorRequest, DescribeSensorResponse};

const PROCEDURE: &str = "procedure";
const PROCEDURE_DESCRIPTION_FORMAT: &str = "procedureDescriptionFormat";
const VALID_TIME: &str = "validTime";

const KNOWN: &[&str] = &[PROCEDURE, PROCEDURE_DESCRIPTION_FORMAT, VALID_TIME];

/// SOS 2.0 DescribeSensor, encoded in the SWES 2.0 namespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescribeSensorV2;

impl Codec for DescribeSensorV2 {
    fn operation(&self) -> &'static str {
        operations::DESCRIBE_SENSOR
    }

    fn version(&self) -> &'static str {
        versions::SOS_200
    }
}

impl Reader<DescribeSensorRequest> for DescribeSensorV2 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<DescribeSensorRequest> {
        let mut report = ValidationReport::new();
        let common = common::read_kvp_common(self, ENVELOPE, params, KNOWN, &mut report);
        let procedure = required_param(params, PROCEDURE, &mut report);
        let format = required_param(params, PROCEDURE_DESCRIPTION_FORMAT, &mut report);
        let valid_time = opt_param(params, VALID_TIME, &mut report).and_then(|raw| {
            TimeValue::parse(&raw)
                .map_err(|e| report.add(Violation::invalid(VALID_TIME, e.to_string())))
                .ok()
        });
        report.process()?;

        Ok(DescribeSensorRequest {
            common,
            procedure,
            procedure_description_format: format,
            valid_time,
        })
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<DescribeSensorRequest> {
        let mut report = ValidationReport::new();
        let common = read_xml_envelope(self, SWES_20, element, &mut report)?;
        let procedure = required_text(element, "swes:procedure", PROCEDURE, &mut report);
        let format = required_text(
            element,
            "swes:procedureDescriptionFormat",
            PROCEDURE_DESCRIPTION_FORMAT,
            &mut report,
        );

        let valid_time = match element.child("swes:validTime") {
            Some(wrapper) => {
                let time = find_gml_time(wrapper)
                    .ok_or_else(|| CodecError::MissingElement("gml:TimeInstant".to_string()))?;
                match read_gml_time(time) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        report.add(Violation::invalid(VALID_TIME, e.to_string()));
                        None
                    }
                }
            }
            None => None,
        };
        report.process()?;

        Ok(DescribeSensorRequest {
            common,
            procedure,
            procedure_description_format: format,
            valid_time,
        })
    }
}

impl Writer<DescribeSensorRequest> for DescribeSensorV2 {
    fn write_kvp(&self, request: &DescribeSensorRequest) -> CodecResult<KvpParams> {
        let mut params = common::write_kvp_common(self, ENVELOPE, &request.common);
        params.insert_opt(PROCEDURE, request.procedure.as_deref());
        params.insert_opt(
            PROCEDURE_DESCRIPTION_FORMAT,
            request.procedure_description_format.as_deref(),
        );
        if let Some(time) = &request.valid_time {
            params.insert(VALID_TIME, time.to_kvp_string());
        }
        common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, KNOWN)?;
        Ok(params)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &DescribeSensorRequest,
    ) -> CodecResult<XmlElement> {
        let mut root = write_xml_envelope(self, ns, "swes", SWES_20, &request.common);
        if let Some(procedure) = &request.procedure {
            root.add_text("swes:procedure", procedure.as_str());
        }
        if let Some(format) = &request.procedure_description_format {
            root.add_text("swes:procedureDescriptionFormat", format.as_str());
        }
        if let Some(time) = &request.valid_time {
            ns.register("gml", GML_32);
            root.add_path("swes:validTime")
                .push(write_gml_time(time, "validTime_1"));
        }
        Ok(root)
    }
}

impl Reader<DescribeSensorResponse> for DescribeSensorV2 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<DescribeSensorResponse> {
        expect_root(element, "DescribeSensorResponse", SWES_20)?;
        let format = element
            .text_at("swes:procedureDescriptionFormat")
            .ok_or_else(|| CodecError::MissingElement("swes:procedureDescriptionFormat".to_string()))?;
        let descriptions = element
            .children_at("swes:description/swes:SensorDescription/swes:data")
            .into_iter()
            .filter_map(|data| data.first_element().cloned())
            .collect();

        Ok(DescribeSensorResponse {
            procedure_description_format: format.to_string(),
            descriptions,
        })
    }
}

impl Writer<DescribeSensorResponse> for DescribeSensorV2 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &DescribeSensorResponse,
    ) -> CodecResult<XmlElement> {
        register(ns);
        let mut root = XmlElement::new("swes:DescribeSensorResponse");
        root.add_text(
            "swes:procedureDescriptionFormat",
            response.procedure_description_format.as_str(),
        );
        for description in &response.descriptions {
            root.add_path("swes:description/swes:SensorDescription/swes:data")
                .push(description.clone());
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SOS;

    const SENSORML_20: &str = "http://www.opengis.net/sensorml/2.0";

    fn request() -> DescribeSensorRequest {
        let mut request = DescribeSensorRequest::new(versions::SOS_200);
        request.procedure = Some("http://www.52north.org/test/procedure/1".to_string());
        request.procedure_description_format = Some(SENSORML_20.to_string());
        request
    }

    #[test]
    fn test_kvp_requires_procedure_and_format() {
        let params = KvpParams::parse("service=SOS&version=2.0.0&request=DescribeSensor").unwrap();
        let err = DescribeSensorV2
            .read_kvp(&params)
            .map(|_: DescribeSensorRequest| ())
            .unwrap_err();
        assert_eq!(
            err.as_validation().unwrap().locators(),
            vec!["procedure", "procedureDescriptionFormat"]
        );
    }

    #[test]
    fn test_kvp_roundtrip_with_valid_time() {
        let mut request = request();
        request.valid_time = Some(TimeValue::parse("2012-11-19T13:00:00Z/2012-11-19T14:00:00Z").unwrap());
        let params = DescribeSensorV2.write_kvp(&request).unwrap();
        assert_eq!(params.get("service"), Some(SOS));
        let reread: DescribeSensorRequest = DescribeSensorV2.read_kvp(&params).unwrap();
        assert_eq!(reread, request);
    }

    #[test]
    fn test_bad_valid_time_is_a_violation() {
        let params = KvpParams::parse(
            "service=SOS&version=2.0.0&request=DescribeSensor&procedure=p\
             &procedureDescriptionFormat=f&validTime=yesterday",
        )
        .unwrap();
        let err = DescribeSensorV2
            .read_kvp(&params)
            .map(|_: DescribeSensorRequest| ())
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().locators(), vec!["validTime"]);
    }

    #[test]
    fn test_xml_uses_swes_namespace() {
        let mut request = request();
        request.valid_time = Some(TimeValue::parse("2012-11-19T13:00:00Z").unwrap());
        let mut ns = NamespaceContext::new();
        let xml = DescribeSensorV2
            .write_xml(&mut ns, &request)
            .unwrap()
            .to_xml_string(&ns)
            .unwrap();
        assert!(xml.contains("<swes:DescribeSensor"));
        assert!(xml.contains("gml:TimeInstant"));

        let element = XmlElement::parse(&xml).unwrap();
        assert_eq!(element.namespace(), Some(SWES_20));
        let reread: DescribeSensorRequest = DescribeSensorV2.read_xml(&element).unwrap();
        assert_eq!(reread, request);
    }

    #[test]
    fn test_response_roundtrip() {
        let description = XmlElement::parse(
            r#"<sml:PhysicalSystem xmlns:sml="http://www.opengis.net/sensorml/2.0"
                xmlns:gml="http://www.opengis.net/gml/3.2" gml:id="ps_1">
                <gml:identifier codeSpace="uniqueID">http://www.52north.org/test/procedure/1</gml:identifier>
            </sml:PhysicalSystem>"#,
        )
        .unwrap();
        let response = DescribeSensorResponse {
            procedure_description_format: SENSORML_20.to_string(),
            descriptions: vec![description],
        };

        let mut ns = NamespaceContext::new();
        let xml = DescribeSensorV2
            .write_xml(&mut ns, &response)
            .unwrap()
            .to_xml_string(&ns)
            .unwrap();
        let read: DescribeSensorResponse =
            DescribeSensorV2.read_xml(&XmlElement::parse(&xml).unwrap()).unwrap();
        assert_eq!(read, response);
    }
}
