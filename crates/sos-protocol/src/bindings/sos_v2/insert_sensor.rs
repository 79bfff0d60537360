//! InsertSensor has no KVP binding; the trait defaults report it.

use ows_common::namespaces::SWES_20;
use ows_common::{CodecError, CodecResult, NamespaceContext, ReadResult, ValidationReport, XmlElement};

use super::{read_xml_envelope, register, write_xml_envelope};
use crate::bindings::common::{self, expect_root, required_text};
use crate::codec::{Codec, Reader, Writer};
use crate::model::{operations, versions, InsertSensorRequest, InsertSensorResponse};

const METADATA: &str = "swes:metadata/sos:SosInsertionMetadata";

/// SOS 2.0 InsertSensor (transactional profile).
#[derive(Debug, Default, Clone, Copy)]
pub struct InsertSensorV2;

impl Codec for InsertSensorV2 {
    fn operation(&self) -> &'static str {
        operations::INSERT_SENSOR
    }

    fn version(&self) -> &'static str {
        versions::SOS_200
    }
}

impl Reader<InsertSensorRequest> for InsertSensorV2 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<InsertSensorRequest> {
        let mut report = ValidationReport::new();
        let common = read_xml_envelope(self, SWES_20, element, &mut report)?;
        let format = required_text(
            element,
            "swes:procedureDescriptionFormat",
            "procedureDescriptionFormat",
            &mut report,
        );
        let description = element
            .child("swes:procedureDescription")
            .and_then(XmlElement::first_element)
            .cloned();
        report.require(description.is_some(), "procedureDescription");
        let observable_properties = common::text_list(element, "swes:observableProperty");
        report.require(!observable_properties.is_empty(), "observableProperty");
        report.process()?;

        Ok(InsertSensorRequest {
            common,
            procedure_description_format: format,
            procedure_description: description,
            observable_properties,
            observation_types: common::text_list(
                element,
                &format!("{}/sos:observationType", METADATA),
            ),
            feature_of_interest_types: common::text_list(
                element,
                &format!("{}/sos:featureOfInterestType", METADATA),
            ),
        })
    }
}

impl Writer<InsertSensorRequest> for InsertSensorV2 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &InsertSensorRequest,
    ) -> CodecResult<XmlElement> {
        let mut root = write_xml_envelope(self, ns, "swes", SWES_20, &request.common);
        if let Some(format) = &request.procedure_description_format {
            root.add_text("swes:procedureDescriptionFormat", format.as_str());
        }
        if let Some(description) = &request.procedure_description {
            root.add_path("swes:procedureDescription")
                .push(description.clone());
        }
        root.add_texts("swes:observableProperty", &request.observable_properties);
        if !request.observation_types.is_empty() || !request.feature_of_interest_types.is_empty() {
            let metadata = root.add_path(METADATA);
            metadata.add_texts("sos:observationType", &request.observation_types);
            metadata.add_texts("sos:featureOfInterestType", &request.feature_of_interest_types);
        }
        Ok(root)
    }
}

impl Reader<InsertSensorResponse> for InsertSensorV2 {
    fn read_xml(&self, element: &XmlElement) -> ReadResult<InsertSensorResponse> {
        expect_root(element, "InsertSensorResponse", SWES_20)?;
        let text = |path: &str| {
            element
                .text_at(path)
                .map(str::to_string)
                .ok_or_else(|| CodecError::MissingElement(path.to_string()))
        };
        Ok(InsertSensorResponse {
            assigned_procedure: text("swes:assignedProcedure")?,
            assigned_offering: text("swes:assignedOffering")?,
        })
    }
}

impl Writer<InsertSensorResponse> for InsertSensorV2 {
    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        response: &InsertSensorResponse,
    ) -> CodecResult<XmlElement> {
        register(ns);
        let mut root = XmlElement::new("swes:InsertSensorResponse");
        root.add_text("swes:assignedProcedure", response.assigned_procedure.as_str());
        root.add_text("swes:assignedOffering", response.assigned_offering.as_str());
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_common::{Encoding, KvpParams};

    const INSERT_SENSOR: &str = r#"<swes:InsertSensor xmlns:swes="http://www.opengis.net/swes/2.0"
        xmlns:sos="http://www.opengis.net/sos/2.0" service="SOS" version="2.0.0">
        <swes:procedureDescriptionFormat>http://www.opengis.net/sensorml/2.0</swes:procedureDescriptionFormat>
        <swes:procedureDescription>
            <sml:PhysicalSystem xmlns:sml="http://www.opengis.net/sensorml/2.0">
                <sml:identifier>http://www.52north.org/test/procedure/9</sml:identifier>
            </sml:PhysicalSystem>
        </swes:procedureDescription>
        <swes:observableProperty>http://www.52north.org/test/observableProperty/9_1</swes:observableProperty>
        <swes:observableProperty>http://www.52north.org/test/observableProperty/9_2</swes:observableProperty>
        <swes:metadata>
            <sos:SosInsertionMetadata>
                <sos:observationType>http://www.opengis.net/def/observationType/OGC-OM/2.0/OM_Measurement</sos:observationType>
                <sos:featureOfInterestType>http://www.opengis.net/def/samplingFeatureType/OGC-OM/2.0/SF_SamplingPoint</sos:featureOfInterestType>
            </sos:SosInsertionMetadata>
        </swes:metadata>
    </swes:InsertSensor>"#;

    #[test]
    fn test_read_and_rewrite() {
        let request: InsertSensorRequest = InsertSensorV2
            .read_xml(&XmlElement::parse(INSERT_SENSOR).unwrap())
            .unwrap();
        assert_eq!(request.observable_properties.len(), 2);
        assert_eq!(request.observation_types.len(), 1);
        assert_eq!(request.feature_of_interest_types.len(), 1);
        assert_eq!(
            request.procedure_description.as_ref().map(XmlElement::local_name),
            Some("PhysicalSystem")
        );

        let mut ns = NamespaceContext::new();
        let xml = InsertSensorV2
            .write_xml(&mut ns, &request)
            .unwrap()
            .to_xml_string(&ns)
            .unwrap();
        let reread: InsertSensorRequest =
            InsertSensorV2.read_xml(&XmlElement::parse(&xml).unwrap()).unwrap();
        assert_eq!(reread, request);
    }

    #[test]
    fn test_missing_parts_are_reported_together() {
        let element = XmlElement::parse(
            r#"<swes:InsertSensor xmlns:swes="http://www.opengis.net/swes/2.0" service="SOS" version="2.0.0"/>"#,
        )
        .unwrap();
        let err = InsertSensorV2
            .read_xml(&element)
            .map(|_: InsertSensorRequest| ())
            .unwrap_err();
        assert_eq!(
            err.as_validation().unwrap().locators(),
            vec!["procedureDescriptionFormat", "procedureDescription", "observableProperty"]
        );
    }

    #[test]
    fn test_kvp_is_unsupported() {
        let params = KvpParams::parse("service=SOS&version=2.0.0&request=InsertSensor").unwrap();
        let err = InsertSensorV2
            .read_kvp(&params)
            .map(|_: InsertSensorRequest| ())
            .unwrap_err();
        assert!(matches!(
            err.as_structural(),
            Some(CodecError::UnsupportedEncoding { encoding: Encoding::Kvp, .. })
        ));
    }

    #[test]
    fn test_response_roundtrip() {
        let response = InsertSensorResponse {
            assigned_procedure: "http://www.52north.org/test/procedure/9".to_string(),
            assigned_offering: "http://www.52north.org/test/offering/9".to_string(),
        };
        let mut ns = NamespaceContext::new();
        let xml = InsertSensorV2
            .write_xml(&mut ns, &response)
            .unwrap()
            .to_xml_string(&ns)
            .unwrap();
        let read: InsertSensorResponse =
            InsertSensorV2.read_xml(&XmlElement::parse(&xml).unwrap()).unwrap();
        assert_eq!(read, response);
    }
}
