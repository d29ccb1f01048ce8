//! Wire forms of the shapes: EC2 Query parameters going out, XML coming back.

pub mod query;
pub mod xml;

/// `Parent.Member`, or just `Member` at the top level.
pub(crate) fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
