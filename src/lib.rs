//! Typed EC2 request and result shapes.
//!
//! Each shape is a value object generated from `res/ec2.json`: optional
//! fields, `set_*`/`with_*` builders, structural equality, a stable hash and a
//! `{Name: value}` rendering. [`protocol`] turns requests into EC2 Query
//! parameters and XML responses back into results; [`client::Client`] ties the
//! two to any [`client::Transport`].
//!
//! ```no_run
//! use ec2_model::client::{Client, Transport};
//! use ec2_model::model::{CapacityReservationTenancy, CreateCapacityReservationRequest};
//!
//! fn reserve(client: &Client<impl Transport>) -> ec2_model::Result<()> {
//!     let request = CreateCapacityReservationRequest::new()
//!         .with_instance_type("t3.micro")
//!         .with_instance_count(2)
//!         .with_tenancy(CapacityReservationTenancy::Default);
//!     let response = client.send(&request)?;
//!     println!("{}", response.result);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod model;
pub mod protocol;
pub mod registry;
pub mod request;
pub mod value_object;

pub use error::{Error, Result};
