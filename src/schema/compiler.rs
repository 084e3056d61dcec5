//! Protobuf compilation via protox
//!
//! Sources are resolved only from the bundle being compiled (plus the
//! well-known `google/protobuf/*` files embedded in protox), never from the
//! filesystem.

use std::collections::BTreeMap;
use std::path::Path;

use prost_reflect::{FieldDescriptor, FileDescriptor, Kind, MessageDescriptor};
use protox::file::{ChainFileResolver, File, FileResolver, GoogleFileResolver};

use super::{
    FieldKind, FieldSchema, MessageSchema, MethodSchema, NestedField, SchemaCompiler, SchemaFile,
    ServiceSchema,
};
use crate::error::{Error, Result};

/// Resolves imports against the in-memory files of one bundle.
struct BundleResolver {
    files: BTreeMap<String, String>,
}

impl FileResolver for BundleResolver {
    fn resolve_path(&self, path: &Path) -> Option<String> {
        let name = path.to_str()?;
        self.files.contains_key(name).then(|| name.to_string())
    }

    fn open_file(&self, name: &str) -> std::result::Result<File, protox::Error> {
        match self.files.get(name) {
            Some(source) => File::from_source(name, source),
            None => Err(protox::Error::file_not_found(name)),
        }
    }
}

/// [`SchemaCompiler`] backed by the pure-Rust protox compiler
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtoxCompiler;

impl ProtoxCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaCompiler for ProtoxCompiler {
    fn compile(
        &self,
        file_name: &str,
        source: &str,
        available: &BTreeMap<String, String>,
    ) -> Result<SchemaFile> {
        let mut files = available.clone();
        files.insert(file_name.to_string(), source.to_string());

        let mut resolver = ChainFileResolver::new();
        resolver.add(BundleResolver { files });
        resolver.add(GoogleFileResolver::new());

        let mut compiler = protox::Compiler::with_file_resolver(resolver);
        compiler.include_imports(true);
        compiler
            .open_file(file_name)
            .map_err(|e| Error::Compile(format!("{}: {}", file_name, e)))?;

        let pool = compiler.descriptor_pool();
        let file = pool
            .get_file_by_name(file_name)
            .ok_or_else(|| Error::Compile(format!("{}: missing from descriptor pool", file_name)))?;

        Ok(schema_file(file_name, &file))
    }
}

fn schema_file(path: &str, file: &FileDescriptor) -> SchemaFile {
    SchemaFile {
        path: path.to_string(),
        package: file.package_name().to_string(),
        services: file
            .services()
            .map(|service| ServiceSchema {
                name: service.name().to_string(),
                full_name: service.full_name().to_string(),
                methods: service
                    .methods()
                    .map(|method| MethodSchema {
                        name: method.name().to_string(),
                        input: Some(message_schema(&method.input())),
                        output: Some(message_schema(&method.output())),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn message_schema(message: &MessageDescriptor) -> MessageSchema {
    MessageSchema {
        full_name: message.full_name().to_string(),
        fields: message.fields().map(|field| field_schema(&field)).collect(),
    }
}

fn field_schema(field: &FieldDescriptor) -> FieldSchema {
    let kind = match field.kind() {
        Kind::Message(nested) => FieldKind::Message {
            full_name: nested.full_name().to_string(),
            fields: nested
                .fields()
                .map(|member| NestedField {
                    json_name: member.json_name().to_string(),
                    kind: kind_name(&member).to_string(),
                })
                .collect(),
        },
        _ => FieldKind::Scalar(kind_name(field).to_string()),
    };
    FieldSchema {
        json_name: field.json_name().to_string(),
        kind,
    }
}

/// Protobuf kind name as written in `.proto` sources.
fn kind_name(field: &FieldDescriptor) -> &'static str {
    if field.is_group() {
        return "group";
    }
    match field.kind() {
        Kind::Double => "double",
        Kind::Float => "float",
        Kind::Int32 => "int32",
        Kind::Int64 => "int64",
        Kind::Uint32 => "uint32",
        Kind::Uint64 => "uint64",
        Kind::Sint32 => "sint32",
        Kind::Sint64 => "sint64",
        Kind::Fixed32 => "fixed32",
        Kind::Fixed64 => "fixed64",
        Kind::Sfixed32 => "sfixed32",
        Kind::Sfixed64 => "sfixed64",
        Kind::Bool => "bool",
        Kind::String => "string",
        Kind::Bytes => "bytes",
        Kind::Message(_) => "message",
        Kind::Enum(_) => "enum",
    }
}
