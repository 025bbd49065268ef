//! Preservation event recording for a processed row

use serde_json::{Value, json};

use super::dates::normalize_date;
use super::row::{AccessionRow, EVENT_SLOTS, EventSlot};
use crate::api::ArchivesSpaceApi;
use crate::api::models::PostResponse;
use crate::error::{AccessionError, ApiError};

/// Event payload linking `agent_uri` as authorizer and `record_uri` as source
pub fn build_event(
    slot: &EventSlot,
    agent_uri: &str,
    record_uri: &str,
) -> Result<Value, AccessionError> {
    let begin = normalize_date(&slot.begin)?;
    Ok(json!({
        "event_type": slot.event_type.trim().to_lowercase(),
        "jsonmodel_type": "event",
        "outcome": slot.outcome.trim().to_lowercase(),
        "outcome_note": slot.outcome_note,
        "linked_agents": [{"role": "authorizer", "ref": agent_uri}],
        "linked_records": [{"role": "source", "ref": record_uri}],
        "date": {
            "begin": begin,
            "date_type": "single",
            "label": "event",
            "jsonmodel_type": "date"
        }
    }))
}

async fn post_event(
    slot: &EventSlot,
    agent_uri: &str,
    record_uri: &str,
    repository_id: &str,
    api: &dyn ArchivesSpaceApi,
) -> Result<String, AccessionError> {
    let event = build_event(slot, agent_uri, record_uri)?;
    let endpoint = format!("/repositories/{}/events", repository_id);
    let response = api.post_json(&endpoint, &event).await?;
    let posted: PostResponse = serde_json::from_value(response)?;
    posted
        .uri
        .ok_or_else(|| ApiError::decode(endpoint, "event response carried no uri").into())
}

/// Post every present event slot of `row`; returns the new event URI per slot
///
/// A slot that fails (bad date, API error) is logged and left as `None`; the
/// remaining slots are still posted.
pub async fn record_events(
    row: &AccessionRow,
    agent_uri: &str,
    record_uri: &str,
    repository_id: &str,
    api: &dyn ArchivesSpaceApi,
) -> [Option<String>; EVENT_SLOTS] {
    let mut uris: [Option<String>; EVENT_SLOTS] = Default::default();

    for (index, slot) in row.events.iter().enumerate() {
        if !slot.is_present() {
            continue;
        }
        match post_event(slot, agent_uri, record_uri, repository_id, api).await {
            Ok(uri) => {
                log::debug!("Event {} for {}: {}", index + 1, record_uri, uri);
                uris[index] = Some(uri);
            }
            Err(e) => {
                log::error!(
                    "Event {} for {} not recorded: {} ({:?})",
                    index + 1,
                    record_uri,
                    e,
                    slot
                );
            }
        }
    }

    uris
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;

    fn slot(event_type: &str, begin: &str) -> EventSlot {
        EventSlot {
            event_type: event_type.to_string(),
            outcome: "Pass".to_string(),
            begin: begin.to_string(),
            outcome_note: "checked with ClamAV".to_string(),
        }
    }

    #[test]
    fn test_build_event_payload() {
        let event = build_event(
            &slot("Virus Check", "03/04/24"),
            "/agents/people/7",
            "/repositories/2/archival_objects/900",
        )
        .unwrap();

        assert_eq!(event["event_type"], "virus check");
        assert_eq!(event["outcome"], "pass");
        assert_eq!(event["outcome_note"], "checked with ClamAV");
        assert_eq!(event["date"]["begin"], "2024-03-04");
        assert_eq!(event["linked_agents"][0]["role"], "authorizer");
        assert_eq!(event["linked_agents"][0]["ref"], "/agents/people/7");
        assert_eq!(event["linked_records"][0]["role"], "source");
        assert_eq!(event["linked_records"][0]["ref"], "/repositories/2/archival_objects/900");
    }

    #[tokio::test]
    async fn test_bad_slot_does_not_block_others() {
        let api = FakeApi::new("archivist");
        let row = AccessionRow {
            events: [
                slot("capture", "not a date"),
                slot("virus check", "2024/03/04"),
                EventSlot::default(),
            ],
            ..Default::default()
        };

        let uris = record_events(
            &row,
            "/agents/people/7",
            "/repositories/2/archival_objects/900",
            "2",
            &api,
        )
        .await;

        assert_eq!(uris[0], None);
        assert!(uris[1].as_deref().unwrap().starts_with("/repositories/2/events/"));
        assert_eq!(uris[2], None);
        assert_eq!(api.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_api_failure_in_one_slot() {
        let api = FakeApi::new("archivist").fail_post("/repositories/2/events", 0);
        let row = AccessionRow {
            events: [
                slot("capture", "03/04/2024"),
                slot("virus check", "03/04/2024"),
                slot("fixity check", "03/05/2024"),
            ],
            ..Default::default()
        };

        let uris = record_events(&row, "/agents/people/7", "/repositories/2/archival_objects/1", "2", &api).await;
        assert_eq!(uris[0], None);
        assert!(uris[1].is_some());
        assert!(uris[2].is_some());
        assert_ne!(uris[1], uris[2]);
    }
}
