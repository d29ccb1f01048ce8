//! EC2 request and result shapes, generated from `res/ec2.json` at build time.
//!
//! Every shape is a plain value: fields start absent, `set_*` and `with_*`
//! replace them, list fields also get an appending `with_*`. Equality, hashing
//! and the `{Name: value}` rendering only look at the fields.

use crate::error::{Error, Result};
use crate::protocol::query::{QueryParams, QueryValue};
use crate::protocol::xml::{self, XmlValue};
use crate::registry::{ActionVisitor, ShapeInfo, ShapeRole};
use crate::request::{RequestOverrides, ServiceRequest};
use crate::value_object::{
    field_eq, render_struct, string_hash, wire_token, Field, FieldDescriptor, FieldKind, HashCode, ValueObject,
};
use chrono::{DateTime, Utc};
use roxmltree::Node;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

include!(concat!(env!("OUT_DIR"), "/model.rs"));
