//! Recursive type detection for automatic boxing.
//!
//! Protobuf messages can have recursive definitions, either directly:
//! ```protobuf
//! message Node {
//!   Node child = 1;
//! }
//! ```
//!
//! Or indirectly:
//! ```protobuf
//! message A {
//!   B b = 1;
//! }
//! message B {
//!   A a = 1;
//! }
//! ```
//!
//! A singular (or oneof) field of type `B` inside `A` is stored inline, so
//! such a cycle would give `A` infinite size. The field `A.b` is boxed when
//! `B` can reach `A` again through singular message fields. Repeated and
//! map fields already live behind a heap allocation and never need boxing.

use std::collections::{HashMap, HashSet};

use crate::context::package_prefix;
use crate::descriptor::{DescriptorProto, FileDescriptorSet, Label, Type};

/// A field that needs to be boxed to break a recursive cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxedField {
    /// Fully-qualified name of the containing message (e.g., ".mypackage.Node").
    pub message_fqn: String,
    /// Name of the field that needs boxing.
    pub field_name: String,
}

/// message fqn -> (field name, referenced message fqn) for singular fields.
type Graph = HashMap<String, Vec<(String, String)>>;

/// Analyze a FileDescriptorSet and return every field that needs boxing.
pub fn find_boxed_fields(fds: &FileDescriptorSet) -> HashSet<BoxedField> {
    let mut messages = HashSet::new();
    for file in &fds.file {
        let prefix = package_prefix(file.package.as_deref().unwrap_or(""));
        for message in &file.message_type {
            collect_message_names(&mut messages, &prefix, message);
        }
    }

    let mut graph = Graph::new();
    for file in &fds.file {
        let prefix = package_prefix(file.package.as_deref().unwrap_or(""));
        for message in &file.message_type {
            collect_message_edges(&mut graph, &messages, &prefix, message);
        }
    }

    let mut result = HashSet::new();
    for (message_fqn, edges) in &graph {
        for (field_name, target) in edges {
            if reaches(&graph, target, message_fqn) {
                tracing::debug!(message = %message_fqn, field = %field_name, "boxing recursive field");
                result.insert(BoxedField {
                    message_fqn: message_fqn.clone(),
                    field_name: field_name.clone(),
                });
            }
        }
    }
    result
}

/// Fully-qualified names of all non-map-entry messages.
fn collect_message_names(names: &mut HashSet<String>, prefix: &str, message: &DescriptorProto) {
    let Some(name) = &message.name else {
        return;
    };
    let message_fqn = format!("{}{}", prefix, name);

    let nested_prefix = format!("{}.", message_fqn);
    for nested in message.nested_type.iter().filter(|m| !m.is_map_entry()) {
        collect_message_names(names, &nested_prefix, nested);
    }
    names.insert(message_fqn);
}

/// Recursively collect edges from a message and its nested messages.
///
/// A field without a `type` (an unlinked descriptor) is a message edge when
/// its `type_name` names a known message.
fn collect_message_edges(
    graph: &mut Graph,
    messages: &HashSet<String>,
    prefix: &str,
    message: &DescriptorProto,
) {
    let Some(name) = &message.name else {
        return;
    };
    let message_fqn = format!("{}{}", prefix, name);

    let edges = message
        .field
        .iter()
        .filter(|field| field.label() != Some(Label::Repeated))
        .filter(|field| match (field.r#type, &field.type_name) {
            (Some(_), _) => field.field_type() == Some(Type::Message),
            (None, Some(type_name)) => messages.contains(type_name),
            (None, None) => false,
        })
        .filter_map(|field| Some((field.name.clone()?, field.type_name.clone()?)))
        .collect();
    graph.insert(message_fqn.clone(), edges);

    let nested_prefix = format!("{}.", message_fqn);
    for nested in message.nested_type.iter().filter(|m| !m.is_map_entry()) {
        collect_message_edges(graph, messages, &nested_prefix, nested);
    }
}

/// Whether `target` is reachable from `start`, `start == target` included.
fn reaches(graph: &Graph, start: &str, target: &str) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(edges) = graph.get(current) {
            stack.extend(edges.iter().map(|(_, next)| next.as_str()));
        }
    }
    false
}
