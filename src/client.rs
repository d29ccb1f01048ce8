//! The seam between the shapes and whatever moves bytes: requests go out as
//! `http::Request<String>`, answers come back as `http::Response<String>`.
//! Signing, retries and pagination belong to the transport or the caller.

use crate::error::{Error, Result, TransportError};
use crate::model::API_VERSION;
use crate::protocol::query::QueryRequest;
use crate::protocol::xml::{self, Response};
use crate::request::ServiceRequest;
use tracing::{debug, warn};

pub trait Transport {
    fn send(&self, request: http::Request<String>) -> Result<http::Response<String>, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(http::Request<String>) -> Result<http::Response<String>, TransportError>,
{
    fn send(&self, request: http::Request<String>) -> Result<http::Response<String>, TransportError> {
        self(request)
    }
}

#[derive(Debug, Clone)]
pub struct Client<T> {
    endpoint: String,
    api_version: String,
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(endpoint: impl Into<String>, transport: T) -> Self {
        Client { endpoint: endpoint.into(), api_version: API_VERSION.to_string(), transport }
    }

    /// Client for the public regional endpoint.
    pub fn for_region(region: &str, transport: T) -> Self {
        Self::new(format!("https://ec2.{region}.amazonaws.com/"), transport)
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Marshals `request`, hands it to the transport and reads the typed result.
    pub fn send<R: ServiceRequest>(&self, request: &R) -> Result<Response<R::Output>> {
        let query = QueryRequest::marshal(request, &self.api_version);
        let http_request = query.to_http(&self.endpoint)?;
        debug!(action = R::ACTION, endpoint = %self.endpoint, "sending request");

        let response = self.transport.send(http_request).map_err(Error::Transport)?;
        let status = response.status();
        let body = response.into_body();
        if !status.is_success() {
            warn!(action = R::ACTION, status = status.as_u16(), "request failed");
            return Err(xml::parse_error(&body, Some(status.as_u16()))
                .unwrap_or(Error::Status { status: status.as_u16(), body }));
        }
        xml::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use std::cell::RefCell;

    fn reply(status: u16, body: &str) -> http::Response<String> {
        http::Response::builder().status(status).body(body.to_string()).unwrap()
    }

    #[test]
    fn sends_form_post_and_reads_result() {
        let seen = RefCell::new(None);
        let transport = |request: http::Request<String>| -> Result<_, TransportError> {
            seen.replace(Some(request));
            Ok(reply(
                200,
                "<CreateCapacityReservationResponse><requestId>req-1</requestId>\
                 <capacityReservation><capacityReservationId>cr-1</capacityReservationId>\
                 <state>pending</state></capacityReservation></CreateCapacityReservationResponse>",
            ))
        };
        let client = Client::for_region("eu-west-1", transport);
        let request = CreateCapacityReservationRequest::new()
            .with_instance_type("t3.micro")
            .with_instance_count(2)
            .with_tenancy(CapacityReservationTenancy::Default);

        let response = client.send(&request).unwrap();
        assert_eq!(response.request_id.as_deref(), Some("req-1"));
        let reservation = response.result.capacity_reservation().unwrap();
        assert_eq!(reservation.capacity_reservation_id(), Some("cr-1"));
        assert_eq!(reservation.state(), Some(&CapacityReservationState::Pending));

        let sent = seen.take().unwrap();
        assert_eq!(sent.uri(), "https://ec2.eu-west-1.amazonaws.com/");
        assert_eq!(
            sent.body(),
            "Action=CreateCapacityReservation&Version=2016-11-15&InstanceType=t3.micro&Tenancy=default&InstanceCount=2"
        );
    }

    #[test]
    fn client_version_and_request_override() {
        let versions = RefCell::new(Vec::new());
        let transport = |request: http::Request<String>| -> Result<_, TransportError> {
            versions.borrow_mut().push(request.body().split('&').nth(1).unwrap_or_default().to_string());
            Ok(reply(200, "<CreateTagsResponse><return>true</return></CreateTagsResponse>"))
        };
        let client = Client::new("http://localhost:4566/", transport).with_api_version("2016-09-15");
        client.send(&CreateTagsRequest::new()).unwrap();
        client.send(&CreateTagsRequest::new().with_api_version("2014-02-01")).unwrap();
        assert_eq!(versions.take(), ["Version=2016-09-15", "Version=2014-02-01"]);
    }

    #[test]
    fn service_errors_carry_status() {
        let client = Client::new("http://localhost/", |_: http::Request<String>| -> Result<_, TransportError> {
            Ok(reply(
                400,
                "<Response><Errors><Error><Code>DryRunOperation</Code>\
                 <Message>Request would have succeeded.</Message></Error></Errors>\
                 <RequestID>req-2</RequestID></Response>",
            ))
        });
        let err = client.send(&DescribeInstancesRequest::new().with_dry_run(true)).unwrap_err();
        assert_eq!(err.code(), Some("DryRunOperation"));
        assert!(matches!(err, Error::Service { status: Some(400), .. }));
    }

    #[test]
    fn unreadable_failures_keep_the_body() {
        let client = Client::new("http://localhost/", |_: http::Request<String>| -> Result<_, TransportError> {
            Ok(reply(503, "slow down"))
        });
        let err = client.send(&DescribeInstancesRequest::new()).unwrap_err();
        assert!(matches!(err, Error::Status { status: 503, ref body } if body == "slow down"));
    }

    #[test]
    fn transport_failures_are_wrapped() {
        let client = Client::new("http://localhost/", |_: http::Request<String>| -> Result<_, TransportError> {
            Err("connection refused".into())
        });
        let err = client.send(&DescribeInstancesRequest::new()).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.to_string(), "transport failed: connection refused");
    }
}
