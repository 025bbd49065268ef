//! Event authorizer lookup

use crate::api::models::{CurrentUser, SearchResults};
use crate::api::{ArchivesSpaceApi, get_as};
use crate::error::{AccessionError, NotFoundError};

/// Agent URI of the session's own user
pub async fn current_user_agent(api: &dyn ArchivesSpaceApi) -> Result<String, AccessionError> {
    let user: CurrentUser = get_as(api, "/users/current-user").await?;
    Ok(user.agent_record.uri)
}

/// Agent URI for the configured event authorizer
///
/// An empty authorizer, or one equal to the logged-in user, resolves to the
/// session user's agent. Anyone else must match exactly one person agent.
pub async fn resolve_agent(
    authorizer: Option<&str>,
    current_username: &str,
    api: &dyn ArchivesSpaceApi,
) -> Result<String, AccessionError> {
    let name = match authorizer.map(str::trim) {
        Some(name) if !name.is_empty() && name != current_username => name,
        _ => return current_user_agent(api).await,
    };

    let path = format!(
        "/search?page=1&type[]=agent_person&q=title:{}",
        urlencoding::encode(name)
    );
    let search: SearchResults = get_as(api, &path).await?;

    match (search.total_hits, search.results.first()) {
        (1, Some(hit)) => {
            log::debug!(
                "Event authorizer {} -> {} ({})",
                name,
                hit.uri,
                hit.title.as_deref().unwrap_or("untitled")
            );
            Ok(hit.uri.clone())
        }
        (0, _) => {
            log::error!("Agent search error: no results found for {}", name);
            Err(NotFoundError::new("Agent", name).into())
        }
        (hits, _) => {
            log::error!("Agent search error: {} results found for {}", hits, name);
            Err(NotFoundError::new("Agent", name).into())
        }
    }
}
