//! In-memory schema registry
//!
//! Maps a service identity to the ordered list of schema files compiled from
//! its bundle. A `None` entry records a file that failed to compile; it is
//! kept so the accumulation mirrors the bundle, and skipped when reading.

use std::collections::BTreeMap;
use std::fmt::Write;

use tokio::sync::RwLock;
use tracing::debug;

use super::{FieldKind, FieldSchema, MessageSchema, SchemaFile};

/// Registry of compiled service schemas, shared between the sync pass
/// (writer) and the API (readers)
#[derive(Default)]
pub struct SchemaRegistry {
    entries: RwLock<BTreeMap<String, Vec<Option<SchemaFile>>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a compiled file (or a failed-compile placeholder) for a service.
    pub async fn accumulate(&self, identity: &str, file: Option<SchemaFile>) {
        let mut entries = self.entries.write().await;
        let list = entries.entry(identity.to_string()).or_default();
        list.push(file);
        debug!(identity, entries = list.len(), "Accumulated schema entry");
    }

    /// Swap a service's entries for `files` in one step. An empty list
    /// removes the service.
    pub async fn replace(&self, identity: &str, files: Vec<Option<SchemaFile>>) {
        let mut entries = self.entries.write().await;
        if files.is_empty() {
            entries.remove(identity);
        } else {
            entries.insert(identity.to_string(), files);
        }
        debug!(identity, "Replaced schema entries");
    }

    /// Successfully compiled files for a service, in accumulation order.
    pub async fn lookup(&self, identity: &str) -> Vec<SchemaFile> {
        let entries = self.entries.read().await;
        entries
            .get(identity)
            .map(|list| list.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Every known identity with its entry count (placeholders included).
    pub async fn identities(&self) -> Vec<(String, usize)> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(identity, list)| (identity.clone(), list.len()))
            .collect()
    }

    pub async fn contains(&self, identity: &str) -> bool {
        self.entries.read().await.contains_key(identity)
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Render every service as a nested HTML list for display.
    pub async fn render(&self) -> String {
        let entries = self.entries.read().await;
        render_entries(&entries)
    }
}

fn render_entries(entries: &BTreeMap<String, Vec<Option<SchemaFile>>>) -> String {
    let mut out = String::new();
    out.push_str("<div style=\"line-height: 0.8;\"><ol>");

    for (identity, files) in entries {
        if files.is_empty() {
            continue;
        }
        let _ = write!(out, "<li><strong>Service ID: {}</strong><ol>", escape(identity));
        for file in files.iter().flatten() {
            render_file(&mut out, file);
        }
        out.push_str("</ol></li>");
    }

    out.push_str("</ol></div>");
    out
}

fn render_file(out: &mut String, file: &SchemaFile) {
    let _ = write!(
        out,
        "<li><strong>Path: {} Descriptor: {}</strong>",
        escape(&file.path),
        escape(file.name())
    );

    for service in &file.services {
        let _ = write!(out, "<p><em>Service: {}</em></p>", escape(&service.name));
        out.push_str("<p>🔁Methods: </p><ul>");
        for method in &service.methods {
            let _ = write!(out, "<li>{}<br>", escape(&method.name));
            if let Some(input) = &method.input {
                render_message(out, "Input", input);
            }
            if let Some(output) = &method.output {
                render_message(out, "Output", output);
            }
            out.push_str("</li>");
        }
        out.push_str("</ul>");
    }

    out.push_str("</li>");
}

fn render_message(out: &mut String, label: &str, message: &MessageSchema) {
    let _ = write!(out, "<p>➡️{}:</p><pre><code>{{", label);
    for field in &message.fields {
        render_field(out, field);
    }
    out.push_str("\n}</code></pre>");
}

fn render_field(out: &mut String, field: &FieldSchema) {
    let name = escape(&field.json_name);
    match &field.kind {
        FieldKind::Scalar(kind) => {
            let _ = write!(out, "\n    \"{}\": {}", name, kind);
        }
        FieldKind::Message { fields, .. } => {
            let _ = write!(out, "\n    \"{}\": {{", name);
            for member in fields {
                let _ = write!(
                    out,
                    "\n        \"{}\": {}",
                    escape(&member.json_name),
                    member.kind
                );
            }
            out.push_str("\n    }");
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
