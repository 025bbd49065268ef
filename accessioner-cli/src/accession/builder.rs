//! Archival object payload construction
//!
//! Creates are built from scratch; updates mutate the fetched record so every
//! field the sheet does not describe is posted back unchanged.

use serde::Serialize;
use serde_json::{Value, json};

use super::containers::container_refs;
use super::row::AccessionRow;

/// Title used when a create row leaves the title blank
pub const PLACEHOLDER_TITLE: &str = "[no label]";

/// Extent subrecord
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub number: String,
    pub portion: String,
    pub extent_type: String,
    pub jsonmodel_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_summary: Option<String>,
}

impl Extent {
    fn whole(number: impl Into<String>, extent_type: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            portion: "whole".to_string(),
            extent_type: extent_type.into(),
            jsonmodel_type: "extent".to_string(),
            container_summary: None,
        }
    }
}

/// A payload ready to POST and the path it goes to
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPayload {
    pub body: Value,
    pub endpoint: String,
}

/// Extents described by a row: one typed extent and/or one byte-count extent
///
/// The container summary only ever goes on the byte-count extent.
pub fn build_extents(row: &AccessionRow) -> Vec<Extent> {
    let mut extents = Vec::with_capacity(2);

    let extent_type = row.extent_type.trim();
    if !extent_type.is_empty() {
        extents.push(Extent::whole("1", extent_type));
    }

    let bytes = row.number_of_bytes.trim();
    if !bytes.is_empty() {
        let mut extent = Extent::whole(bytes.replace(',', ""), "bytes");
        let summary = row.container_summary.trim();
        if !summary.is_empty() {
            extent.container_summary = Some(summary.to_string());
        }
        extents.push(extent);
    }

    extents
}

/// Instance linking a record to a top container
pub fn create_instance(container_uri: &str) -> Value {
    json!({
        "instance_type": "mixed_materials",
        "jsonmodel_type": "instance",
        "sub_container": {
            "jsonmodel_type": "sub_container",
            "top_container": {"ref": container_uri}
        }
    })
}

fn archival_object_path(repository_id: &str, object_id: &str) -> String {
    format!("/repositories/{}/archival_objects/{}", repository_id, object_id)
}

/// New item-level archival object under `parent_id`
///
/// `row.top_container` must already hold the resolved container URI (or be empty).
pub fn build_create(
    row: &AccessionRow,
    repository_id: &str,
    parent_id: &str,
    resource_id: &str,
) -> RecordPayload {
    let title = if row.title.trim().is_empty() {
        PLACEHOLDER_TITLE
    } else {
        row.title.as_str()
    };

    let instances: Vec<Value> = if row.has_container() {
        vec![create_instance(&row.top_container)]
    } else {
        Vec::new()
    };

    let body = json!({
        "publish": true,
        "title": title,
        "level": "item",
        "component_id": row.component_id,
        "jsonmodel_type": "archival_object",
        "resource": {"ref": format!("/repositories/{}/resources/{}", repository_id, resource_id)},
        "parent": {"ref": archival_object_path(repository_id, parent_id)},
        "extents": build_extents(row),
        "instances": instances,
    });

    RecordPayload {
        body,
        endpoint: format!("/repositories/{}/archival_objects", repository_id),
    }
}

/// Existing archival object with the row's component ID, extents, and container applied
///
/// Extents are replaced outright. A container instance is appended only when
/// the row's container is not linked yet; existing instances are never removed.
pub fn build_update(
    mut record: Value,
    row: &AccessionRow,
    repository_id: &str,
    object_id: &str,
) -> RecordPayload {
    let existing_refs = container_refs(&record);

    if let Some(fields) = record.as_object_mut() {
        fields.insert("component_id".to_string(), json!(row.component_id));
        fields.insert("extents".to_string(), json!(build_extents(row)));

        if row.has_container() && !existing_refs.contains(&row.top_container) {
            let instances = fields
                .entry("instances")
                .or_insert_with(|| Value::Array(Vec::new()));
            if !instances.is_array() {
                *instances = Value::Array(Vec::new());
            }
            if let Value::Array(list) = instances {
                list.push(create_instance(&row.top_container));
            }
        }
    }

    RecordPayload {
        body: record,
        endpoint: archival_object_path(repository_id, object_id),
    }
}
