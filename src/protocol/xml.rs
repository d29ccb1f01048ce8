//! EC2 XML response unmarshalling.
//!
//! Members sit under their lowerCamel element name unless the schema says
//! otherwise; lists wrap each element in `<item>`.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

pub trait NodeExt<'a, 'input> {
    fn find_tag(&self, name: &str) -> Option<Node<'a, 'input>>;
    fn tag_text(&self, name: &str) -> Option<&'a str>;
}

impl<'a, 'input> NodeExt<'a, 'input> for Node<'a, 'input> {
    fn find_tag(&self, name: &str) -> Option<Node<'a, 'input>> {
        self.children().find(|t| t.has_tag_name(name))
    }

    fn tag_text(&self, name: &str) -> Option<&'a str> {
        self.find_tag(name).map(text)
    }
}

/// A value readable from an XML element.
pub trait XmlValue: Sized {
    fn from_xml(node: Node<'_, '_>) -> Result<Self>;
}

/// The element's text, empty when it has none.
pub fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or_default()
}

/// Reads the child `name` of `node`; a missing child is an absent member.
pub fn member<T: XmlValue>(node: Node<'_, '_>, name: &str) -> Result<Option<T>> {
    let Some(child) = node.find_tag(name) else {
        return Ok(None);
    };
    match T::from_xml(child) {
        Ok(value) => Ok(Some(value)),
        Err(Error::InvalidArgument(message)) => Err(Error::Unmarshal { element: name.to_string(), message }),
        Err(e) => Err(e),
    }
}

fn unmarshal_error(node: Node<'_, '_>, message: impl Display) -> Error {
    Error::Unmarshal { element: node.tag_name().name().to_string(), message: message.to_string() }
}

fn parse_scalar<T>(node: Node<'_, '_>) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = text(node).trim();
    raw.parse().map_err(|e| unmarshal_error(node, format!("{raw:?}: {e}")))
}

impl XmlValue for String {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        Ok(text(node).to_string())
    }
}

impl XmlValue for i32 {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        parse_scalar(node)
    }
}

impl XmlValue for i64 {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        parse_scalar(node)
    }
}

impl XmlValue for f64 {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        parse_scalar(node)
    }
}

impl XmlValue for bool {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        parse_scalar(node)
    }
}

impl XmlValue for DateTime<Utc> {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        let raw = text(node).trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| unmarshal_error(node, format!("{raw:?}: {e}")))
    }
}

impl<T: XmlValue> XmlValue for Vec<T> {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        node.children().filter(|c| c.has_tag_name("item")).map(T::from_xml).collect()
    }
}

/// A typed result plus the id the service assigned to the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    pub result: T,
    pub request_id: Option<String>,
}

/// Parses a successful response body. An error document in the body still
/// comes back as [`Error::Service`].
pub fn parse_response<T: XmlValue>(body: &str) -> Result<Response<T>> {
    let doc = Document::parse(body)?;
    if let Some(error) = service_error(&doc, None) {
        return Err(error);
    }
    let root = doc.root_element();
    let result = T::from_xml(root)?;
    let request_id = root.tag_text("requestId").map(|id| id.trim().to_string());
    debug!(root = root.tag_name().name(), request_id = ?request_id, "unmarshalled response");
    Ok(Response { result, request_id })
}

/// Reads an EC2 error document, `None` when `body` is not one.
pub fn parse_error(body: &str, status: Option<u16>) -> Option<Error> {
    let doc = Document::parse(body).ok()?;
    service_error(&doc, status)
}

fn service_error(doc: &Document, status: Option<u16>) -> Option<Error> {
    let root = doc.root_element();
    let error = root.find_tag("Errors")?.find_tag("Error")?;
    let request_id = root.tag_text("RequestID").or_else(|| root.tag_text("RequestId"));
    Some(Error::Service {
        code: error.tag_text("Code").unwrap_or_default().trim().to_string(),
        message: error.tag_text("Message").unwrap_or_default().trim().to_string(),
        request_id: request_id.map(|id| id.trim().to_string()),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    const DESCRIBE_INSTANCES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DescribeInstancesResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
    <requestId>8f7724cf-496f-496e-8fe3-example</requestId>
    <reservationSet>
        <item>
            <reservationId>r-1234567890abcdef0</reservationId>
            <ownerId>123456789012</ownerId>
            <instancesSet>
                <item>
                    <instanceId>i-1234567890abcdef0</instanceId>
                    <imageId>ami-bff32ccc</imageId>
                    <instanceState>
                        <code>16</code>
                        <name>running</name>
                    </instanceState>
                    <instanceType>t3.micro</instanceType>
                    <launchTime>2018-05-08T16:46:19.000Z</launchTime>
                    <placement>
                        <availabilityZone>eu-west-1c</availabilityZone>
                        <groupName/>
                        <tenancy>default</tenancy>
                    </placement>
                    <privateIpAddress>172.31.10.11</privateIpAddress>
                    <ipAddress>54.194.252.215</ipAddress>
                    <tagSet>
                        <item>
                            <key>Name</key>
                            <value>web &amp; api</value>
                        </item>
                    </tagSet>
                    <ebsOptimized>false</ebsOptimized>
                    <amiLaunchIndex>0</amiLaunchIndex>
                </item>
            </instancesSet>
        </item>
    </reservationSet>
</DescribeInstancesResponse>"#;

    #[test]
    fn describe_instances_response() {
        let response: Response<DescribeInstancesResult> = parse_response(DESCRIBE_INSTANCES).unwrap();
        assert_eq!(response.request_id.as_deref(), Some("8f7724cf-496f-496e-8fe3-example"));
        assert_eq!(response.result.next_token(), None);

        let reservations = response.result.reservations().unwrap();
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].reservation_id(), Some("r-1234567890abcdef0"));
        assert_eq!(reservations[0].requester_id(), None);

        let instance = &reservations[0].instances().unwrap()[0];
        assert_eq!(instance.instance_id(), Some("i-1234567890abcdef0"));
        assert_eq!(instance.instance_type(), Some("t3.micro"));
        assert_eq!(instance.public_ip_address(), Some("54.194.252.215"));
        assert_eq!(instance.ami_launch_index(), Some(0));
        assert_eq!(instance.ebs_optimized(), Some(false));
        assert_eq!(instance.launch_time().unwrap().to_rfc3339(), "2018-05-08T16:46:19+00:00");
        assert_eq!(instance.state().and_then(|s| s.name()), Some(&InstanceStateName::Running));
        assert_eq!(instance.state().and_then(|s| s.code()), Some(16));

        let placement = instance.placement().unwrap();
        assert_eq!(placement.availability_zone(), Some("eu-west-1c"));
        assert_eq!(placement.group_name(), Some(""));
        assert_eq!(placement.tenancy(), Some(&Tenancy::Default));

        let tags = instance.tags().unwrap();
        assert_eq!(tags, [Tag::new().with_key("Name").with_value("web & api")]);
    }

    #[test]
    fn empty_result_and_unknown_enum_tokens() {
        let body = r#"<CreateTagsResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
            <requestId>7a62c49f</requestId><return>true</return></CreateTagsResponse>"#;
        let response: Response<CreateTagsResult> = parse_response(body).unwrap();
        assert_eq!(response.result, CreateTagsResult::new());

        let body = r#"<PurchaseReservedInstancesOfferingResponse>
            <reservedInstancesId>e5a2ff3b</reservedInstancesId></PurchaseReservedInstancesOfferingResponse>"#;
        let response: Response<PurchaseReservedInstancesOfferingResult> = parse_response(body).unwrap();
        assert_eq!(response.result.reserved_instances_id(), Some("e5a2ff3b"));
        assert_eq!(response.request_id, None);

        let body = "<item><tenancy>shared</tenancy></item>";
        let placement: Response<Placement> = parse_response(body).unwrap();
        assert_eq!(placement.result.tenancy(), Some(&Tenancy::Unknown("shared".into())));
    }

    #[test]
    fn offerings_with_doubles_and_longs() {
        let body = r#"<DescribeReservedInstancesOfferingsResponse>
            <reservedInstancesOfferingsSet>
                <item>
                    <reservedInstancesOfferingId>248e7b75</reservedInstancesOfferingId>
                    <duration>31536000</duration>
                    <fixedPrice>4329.0</fixedPrice>
                    <usagePrice>0.0</usagePrice>
                    <productDescription>Linux/UNIX (Amazon VPC)</productDescription>
                    <recurringCharges>
                        <item><frequency>Hourly</frequency><amount>0.048</amount></item>
                    </recurringCharges>
                </item>
            </reservedInstancesOfferingsSet>
        </DescribeReservedInstancesOfferingsResponse>"#;
        let response: Response<DescribeReservedInstancesOfferingsResult> = parse_response(body).unwrap();
        let offering = &response.result.reserved_instances_offerings().unwrap()[0];
        assert_eq!(offering.duration(), Some(31_536_000));
        assert_eq!(offering.fixed_price(), Some(4329.0));
        assert_eq!(offering.product_description(), Some(&RIProductDescription::LinuxUnixAmazonVpc));
        assert_eq!(offering.recurring_charges().unwrap()[0].amount(), Some(0.048));
    }

    #[test]
    fn error_documents_become_service_errors() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Response><Errors><Error><Code>InvalidInstanceID.NotFound</Code><Message>The instance ID 'i-1a2b3c4d' does not exist</Message></Error></Errors><RequestID>ea966190-f9aa-478e-9ede-example</RequestID></Response>"#;
        let err = parse_response::<DescribeInstancesResult>(body).unwrap_err();
        assert_eq!(err.code(), Some("InvalidInstanceID.NotFound"));
        match parse_error(body, Some(400)).unwrap() {
            Error::Service { message, request_id, status, .. } => {
                assert_eq!(message, "The instance ID 'i-1a2b3c4d' does not exist");
                assert_eq!(request_id.as_deref(), Some("ea966190-f9aa-478e-9ede-example"));
                assert_eq!(status, Some(400));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse_error("<html>busy</html>", Some(503)).is_none());
        assert!(parse_error("not xml", None).is_none());
    }

    #[test]
    fn malformed_values_name_the_element() {
        let body = "<r><instanceState><code>sixteen</code></instanceState></r>";
        match parse_response::<Instance>(body).unwrap_err() {
            Error::Unmarshal { element, message } => {
                assert_eq!(element, "code");
                assert!(message.contains("sixteen"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }

        let body = "<r><tenancy> </tenancy></r>";
        assert!(matches!(
            parse_response::<Placement>(body),
            Err(Error::Unmarshal { element, .. }) if element == "tenancy"
        ));

        let body = "<r><launchTime>yesterday</launchTime></r>";
        assert!(matches!(parse_response::<Instance>(body), Err(Error::Unmarshal { .. })));

        assert!(matches!(parse_response::<Instance>("<r>"), Err(Error::Xml(_))));
    }
}
