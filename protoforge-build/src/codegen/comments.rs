//! Comment extraction from protobuf SourceCodeInfo.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::quote;

use crate::descriptor::{FileDescriptorProto, Location};

/// Field numbers from google/protobuf/descriptor.proto, used to build
/// paths into the descriptor tree.
mod field_numbers {
    /// FileDescriptorProto.message_type
    pub const MESSAGE_TYPE: i32 = 4;
    /// FileDescriptorProto.enum_type
    pub const ENUM_TYPE: i32 = 5;
    /// DescriptorProto.field
    pub const FIELD: i32 = 2;
    /// DescriptorProto.nested_type
    pub const NESTED_TYPE: i32 = 3;
    /// DescriptorProto.enum_type
    pub const NESTED_ENUM_TYPE: i32 = 4;
    /// DescriptorProto.oneof_decl
    pub const ONEOF_DECL: i32 = 8;
    /// EnumDescriptorProto.value
    pub const ENUM_VALUE: i32 = 2;
}

/// A path to a location in the protobuf descriptor tree, as used by
/// `SourceCodeInfo.Location.path`.
///
/// ```ignore
/// // Second field of the first message.
/// let path = DescriptorPath::message(0).field(1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DescriptorPath(Vec<i32>);

impl DescriptorPath {
    pub fn message(index: usize) -> Self {
        Self(vec![field_numbers::MESSAGE_TYPE, index as i32])
    }

    pub fn top_level_enum(index: usize) -> Self {
        Self(vec![field_numbers::ENUM_TYPE, index as i32])
    }

    fn child(&self, field_number: i32, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(field_number);
        path.push(index as i32);
        Self(path)
    }

    pub fn field(&self, index: usize) -> Self {
        self.child(field_numbers::FIELD, index)
    }

    pub fn nested_message(&self, index: usize) -> Self {
        self.child(field_numbers::NESTED_TYPE, index)
    }

    pub fn nested_enum(&self, index: usize) -> Self {
        self.child(field_numbers::NESTED_ENUM_TYPE, index)
    }

    pub fn oneof(&self, index: usize) -> Self {
        self.child(field_numbers::ONEOF_DECL, index)
    }

    pub fn enum_value(&self, index: usize) -> Self {
        self.child(field_numbers::ENUM_VALUE, index)
    }
}

/// Comments of one file, indexed by descriptor path.
#[derive(Debug, Default)]
pub struct CommentMap {
    comments: HashMap<Vec<i32>, String>,
}

impl CommentMap {
    pub fn from_file(file: &FileDescriptorProto) -> Self {
        let comments = file
            .source_code_info
            .iter()
            .flat_map(|info| &info.location)
            .filter_map(|location| Some((location.path.clone(), extract_comment(location)?)))
            .collect();
        Self { comments }
    }

    pub fn get(&self, path: &DescriptorPath) -> Option<String> {
        self.comments.get(&path.0).cloned()
    }
}

/// Leading detached, leading and trailing comments, separated by blank lines.
fn extract_comment(location: &Location) -> Option<String> {
    let parts: Vec<String> = location
        .leading_detached_comments
        .iter()
        .chain(&location.leading_comments)
        .chain(&location.trailing_comments)
        .map(|comment| clean_comment(comment))
        .filter(|comment| !comment.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

/// Strips block-comment asterisks and surrounding whitespace from each line.
fn clean_comment(comment: &str) -> String {
    comment
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim_start())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate doc comment tokens from a comment string.
pub fn doc_comment(comment: &str) -> TokenStream {
    // The leading space makes `#[doc = " text"]` render as `/// text`.
    let lines = comment.lines().map(|line| format!(" {}", line));
    quote! {
        #(#[doc = #lines])*
    }
}
