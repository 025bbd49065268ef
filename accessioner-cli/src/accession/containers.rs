//! Top container lookup for archival objects
//!
//! A row names its box by indicator ("Box 2"); the API needs the top
//! container URI. Containers are found on the row's archival object, or on
//! its first ancestor when the object itself has none.

use serde_json::Value;

use crate::api::models::{Instance, Ref, TopContainer};
use crate::api::{ArchivesSpaceApi, get_as};
use crate::error::{AccessionError, NotFoundError};

/// A top container linked to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub uri: String,
    pub indicator: String,
}

impl Container {
    pub fn new(uri: impl Into<String>, indicator: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            indicator: indicator.into(),
        }
    }
}

fn instances(record: &Value) -> Vec<Instance> {
    record
        .get("instances")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Top container refs of every non-digital-object instance on a record
pub fn container_refs(record: &Value) -> Vec<String> {
    instances(record)
        .iter()
        .filter(|instance| !instance.is_digital_object())
        .filter_map(|instance| instance.top_container_ref().map(str::to_string))
        .collect()
}

fn record_label(record: &Value) -> String {
    record
        .get("uri")
        .and_then(Value::as_str)
        .unwrap_or("record")
        .to_string()
}

/// Fetch every top container of a record and pair its URI with its indicator
pub async fn list_containers(
    record: &Value,
    api: &dyn ArchivesSpaceApi,
) -> Result<Vec<Container>, AccessionError> {
    let refs = container_refs(record);
    if refs.is_empty() {
        return Err(NotFoundError::new("Container instance", record_label(record)).into());
    }

    let mut containers = Vec::with_capacity(refs.len());
    for uri in refs {
        match get_as::<TopContainer>(api, &uri).await {
            Ok(top) => containers.push(Container::new(top.uri, top.indicator)),
            Err(e) => log::error!("Failed to fetch top container {}: {}", uri, e),
        }
    }
    Ok(containers)
}

/// Containers of an archival object, falling back to its first ancestor
pub async fn resolve_containers(
    parent_id: &str,
    repository_id: &str,
    api: &dyn ArchivesSpaceApi,
) -> Result<Vec<Container>, AccessionError> {
    let record_path = format!("/repositories/{}/archival_objects/{}", repository_id, parent_id);
    let record = api.get_json(&record_path).await?;

    match list_containers(&record, api).await {
        Ok(containers) => return Ok(containers),
        Err(AccessionError::NotFound(_)) => {
            log::debug!("No containers on {}, checking its ancestor", record_path);
        }
        Err(e) => return Err(e),
    }

    let ancestor: Ref = record
        .get("ancestors")
        .and_then(|a| a.get(0))
        .cloned()
        .and_then(|a| serde_json::from_value(a).ok())
        .ok_or_else(|| NotFoundError::new("Container instance", record_path.clone()))?;

    let ancestor_record = api.get_json(&ancestor.uri).await?;
    list_containers(&ancestor_record, api).await
}

/// URI of the container whose indicator matches exactly
pub fn match_container<'a>(
    containers: &'a [Container],
    indicator: &str,
) -> Result<&'a str, NotFoundError> {
    containers
        .iter()
        .find(|c| c.indicator == indicator)
        .map(|c| c.uri.as_str())
        .ok_or_else(|| NotFoundError::new("Top container", indicator))
}

/// Per-file container list, re-resolved only when the row's indicator changes
///
/// Rows are expected to be grouped by box; a box that reappears after a
/// different one is simply resolved again.
#[derive(Debug, Default)]
pub struct ContainerCache {
    indicator: Option<String>,
    containers: Vec<Container>,
}

impl ContainerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve for `indicator`, or reuse the list resolved for the previous row
    ///
    /// A record without any containers leaves an empty list; the caller's
    /// `match_container` then reports the missing box.
    pub async fn containers_for(
        &mut self,
        indicator: &str,
        parent_id: &str,
        repository_id: &str,
        api: &dyn ArchivesSpaceApi,
    ) -> Result<&[Container], AccessionError> {
        if self.indicator.as_deref() != Some(indicator) {
            self.containers = match resolve_containers(parent_id, repository_id, api).await {
                Ok(containers) => containers,
                Err(AccessionError::NotFound(e)) => {
                    log::warn!("No containers available for {}: {}", parent_id, e);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            self.indicator = Some(indicator.to_string());
        }
        Ok(&self.containers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use serde_json::json;

    fn instance(uri: &str) -> Value {
        json!({
            "instance_type": "mixed_materials",
            "jsonmodel_type": "instance",
            "sub_container": {"top_container": {"ref": uri}}
        })
    }

    fn api() -> FakeApi {
        FakeApi::new("archivist")
            .with_get(
                "/repositories/2/archival_objects/10",
                json!({
                    "uri": "/repositories/2/archival_objects/10",
                    "instances": [
                        instance("/repositories/2/top_containers/1"),
                        {"instance_type": "digital_object", "digital_object": {"ref": "/repositories/2/digital_objects/3"}},
                        instance("/repositories/2/top_containers/2")
                    ]
                }),
            )
            .with_get(
                "/repositories/2/archival_objects/11",
                json!({
                    "uri": "/repositories/2/archival_objects/11",
                    "instances": [],
                    "ancestors": [{"ref": "/repositories/2/archival_objects/10", "level": "series"}]
                }),
            )
            .with_get(
                "/repositories/2/archival_objects/12",
                json!({"uri": "/repositories/2/archival_objects/12", "instances": [], "ancestors": []}),
            )
            .with_get(
                "/repositories/2/top_containers/1",
                json!({"uri": "/repositories/2/top_containers/1", "indicator": "Box 1"}),
            )
            .with_get(
                "/repositories/2/top_containers/2",
                json!({"uri": "/repositories/2/top_containers/2", "indicator": "Box 2"}),
            )
    }

    #[test]
    fn test_match_container() {
        let containers = vec![Container::new("uri1", "Box 1"), Container::new("uri2", "Box 2")];
        assert_eq!(match_container(&containers, "Box 2").unwrap(), "uri2");

        let err = match_container(&containers, "Box 9").unwrap_err();
        assert_eq!(err.value, "Box 9");
    }

    #[test]
    fn test_container_refs_skip_digital_objects() {
        let record = json!({
            "instances": [
                instance("/repositories/2/top_containers/1"),
                {"instance_type": "digital_object", "digital_object": {"ref": "/repositories/2/digital_objects/3"}}
            ]
        });
        assert_eq!(container_refs(&record), vec!["/repositories/2/top_containers/1"]);
        assert!(container_refs(&json!({"title": "no instances"})).is_empty());
    }

    #[tokio::test]
    async fn test_resolve_containers_on_object() {
        let containers = resolve_containers("10", "2", &api()).await.unwrap();
        assert_eq!(
            containers,
            vec![
                Container::new("/repositories/2/top_containers/1", "Box 1"),
                Container::new("/repositories/2/top_containers/2", "Box 2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_containers_falls_back_to_ancestor() {
        let api = api();
        let containers = resolve_containers("11", "2", &api).await.unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(api.get_count("/repositories/2/archival_objects/10"), 1);
    }

    #[tokio::test]
    async fn test_resolve_containers_none_anywhere() {
        let err = resolve_containers("12", "2", &api()).await.unwrap_err();
        assert!(matches!(err, AccessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cache_reuses_list_for_same_indicator() {
        let api = api();
        let mut cache = ContainerCache::new();

        cache.containers_for("Box 1", "10", "2", &api).await.unwrap();
        cache.containers_for("Box 1", "10", "2", &api).await.unwrap();
        assert_eq!(api.get_count("/repositories/2/archival_objects/10"), 1);

        cache.containers_for("Box 2", "10", "2", &api).await.unwrap();
        assert_eq!(api.get_count("/repositories/2/archival_objects/10"), 2);
    }

    #[tokio::test]
    async fn test_cache_treats_missing_containers_as_empty() {
        let api = api();
        let mut cache = ContainerCache::new();
        let containers = cache.containers_for("Box 1", "12", "2", &api).await.unwrap();
        assert!(containers.is_empty());
    }
}
