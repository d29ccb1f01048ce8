//! The shape catalogue and action dispatch.

use crate::request::ServiceRequest;
use crate::value_object::FieldDescriptor;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::AsRefStr;

pub use crate::model::{visit_action, ACTIONS, SHAPES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ShapeRole {
    Request,
    Output,
    Structure,
}

#[derive(Debug, Clone, Copy)]
pub struct ShapeInfo {
    pub name: &'static str,
    pub role: ShapeRole,
    /// Action name, for request shapes.
    pub action: Option<&'static str>,
    pub doc: &'static str,
    pub fields: &'static [FieldDescriptor],
}

/// Receives the request type registered for an action name.
pub trait ActionVisitor {
    type Output;

    fn visit<R: ServiceRequest>(self) -> Self::Output;
}

static BY_NAME: Lazy<HashMap<&'static str, &'static ShapeInfo>> =
    Lazy::new(|| SHAPES.iter().map(|s| (s.name, s)).collect());

pub fn shape(name: &str) -> Option<&'static ShapeInfo> {
    BY_NAME.get(name).copied()
}

pub fn shape_for_action(action: &str) -> Option<&'static ShapeInfo> {
    SHAPES.iter().find(|s| s.action == Some(action))
}
