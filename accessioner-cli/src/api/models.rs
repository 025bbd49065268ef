//! Typed views over the ArchivesSpace JSON responses the accessioner reads
//!
//! Records that get updated stay `serde_json::Value` so fields the tool never
//! touches survive the round trip. These structs only cover what is read.

use serde::{Deserialize, Serialize};

/// Entry of `GET /repositories`
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub repo_code: String,
    pub uri: String,
}

impl Repository {
    /// Numeric id, the last segment of `/repositories/{id}`
    pub fn id(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or_default()
    }
}

/// `{ "ref": "/repositories/2/..." }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ref {
    #[serde(rename = "ref")]
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubContainer {
    pub top_container: Option<Ref>,
}

/// Instance subrecord of an archival object or resource
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub sub_container: Option<SubContainer>,
}

impl Instance {
    pub fn is_digital_object(&self) -> bool {
        self.instance_type.as_deref() == Some("digital_object")
    }

    pub fn top_container_ref(&self) -> Option<&str> {
        self.sub_container
            .as_ref()
            .and_then(|sub| sub.top_container.as_ref())
            .map(|top| top.uri.as_str())
    }
}

/// Response of `GET /repositories/{repo}/top_containers/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct TopContainer {
    pub uri: String,
    pub indicator: String,
}

/// Response of `GET /users/current-user`
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub agent_record: Ref,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub uri: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Response of `GET /search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub total_hits: u64,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// Response of a successful create/update POST
#[derive(Debug, Clone, Deserialize)]
pub struct PostResponse {
    pub uri: Option<String>,
}

/// Response of `POST /users/{username}/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub session: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repository_id_from_uri() {
        let repo: Repository =
            serde_json::from_value(json!({"repo_code": "mssa", "uri": "/repositories/12"}))
                .unwrap();
        assert_eq!(repo.id(), "12");
    }

    #[test]
    fn test_instance_container_ref() {
        let instance: Instance = serde_json::from_value(json!({
            "instance_type": "mixed_materials",
            "sub_container": {"top_container": {"ref": "/repositories/2/top_containers/5"}}
        }))
        .unwrap();
        assert!(!instance.is_digital_object());
        assert_eq!(
            instance.top_container_ref(),
            Some("/repositories/2/top_containers/5")
        );

        let digital: Instance = serde_json::from_value(json!({
            "instance_type": "digital_object",
            "digital_object": {"ref": "/repositories/2/digital_objects/1"}
        }))
        .unwrap();
        assert!(digital.is_digital_object());
        assert_eq!(digital.top_container_ref(), None);
    }
}
