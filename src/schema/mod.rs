//! Service schemas - compiled protobuf descriptors and their registry
//!
//! A [`SchemaFile`] is the introspectable result of compiling one `.proto`
//! source: its services, their methods, and the fields of each method's
//! request and response message. Message-typed fields carry their own member
//! fields one level deep, which is all the registry renders.

pub mod compiler;
pub mod registry;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;

pub use compiler::ProtoxCompiler;
pub use registry::SchemaRegistry;

/// One compiled schema file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaFile {
    /// Path of the file within its bundle
    pub path: String,
    /// Declared package, possibly empty
    pub package: String,
    pub services: Vec<ServiceSchema>,
}

impl SchemaFile {
    /// Short declared name: the last segment of the package.
    pub fn name(&self) -> &str {
        self.package.rsplit('.').next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSchema {
    pub name: String,
    pub full_name: String,
    pub methods: Vec<MethodSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSchema {
    pub name: String,
    /// Request message; `None` when it could not be resolved
    pub input: Option<MessageSchema>,
    /// Response message; `None` when it could not be resolved
    pub output: Option<MessageSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSchema {
    pub full_name: String,
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub json_name: String,
    pub kind: FieldKind,
}

impl FieldSchema {
    pub fn scalar(json_name: &str, kind: &str) -> Self {
        Self {
            json_name: json_name.to_string(),
            kind: FieldKind::Scalar(kind.to_string()),
        }
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Any non-message kind, by protobuf kind name (`string`, `int32`, `enum`, ...)
    Scalar(String),
    /// Nested message with its member fields
    Message {
        full_name: String,
        fields: Vec<NestedField>,
    },
}

/// Member of a nested message; nested messages deeper down keep kind `message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedField {
    pub json_name: String,
    pub kind: String,
}

/// Compiles one schema source against the other files of its bundle
pub trait SchemaCompiler: Send + Sync {
    /// `available` maps file names to sources and is the only place imports
    /// are looked up (besides the embedded well-known types).
    fn compile(
        &self,
        file_name: &str,
        source: &str,
        available: &BTreeMap<String, String>,
    ) -> Result<SchemaFile>;
}
