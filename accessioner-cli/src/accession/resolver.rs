//! Repository, resource, and parent identifier resolution

use std::collections::HashMap;

use crate::api::models::Repository;
use crate::api::{ArchivesSpaceApi, get_as};
use crate::error::{AccessionError, NotFoundError};

/// Map a repository code (e.g. `mssa`) to its numeric id
pub async fn resolve_repository(
    code: &str,
    api: &dyn ArchivesSpaceApi,
) -> Result<String, AccessionError> {
    let repositories: Vec<Repository> = get_as(api, "/repositories").await?;
    let by_code: HashMap<&str, &str> = repositories
        .iter()
        .map(|repo| (repo.repo_code.as_str(), repo.id()))
        .collect();

    match by_code.get(code.trim()) {
        Some(id) => {
            log::debug!("Repository {} -> {}", code, id);
            Ok(id.to_string())
        }
        None => Err(NotFoundError::new("Repository", code).into()),
    }
}

/// Archival object id: everything after the last `_` of the parent reference
pub fn resolve_parent_id(parent_record: &str) -> String {
    let reference = parent_record.trim();
    match reference.rsplit_once('_') {
        Some((_, id)) => id.to_string(),
        None => reference.to_string(),
    }
}

/// Resource id embedded in a parent-record URL
///
/// Accepts both `.../resources/77#tree::archival_object_123` and
/// `.../resources/77/#tree`.
pub fn resolve_resource_id(parent_record: &str) -> String {
    let reference = parent_record.trim();
    let path = match reference.split_once("/#") {
        Some((path, _)) => path,
        None => reference.split_once('#').map_or(reference, |(path, _)| path),
    };
    path.rsplit('/').next().unwrap_or_default().to_string()
}
