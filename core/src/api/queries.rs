//! GraphQL query text and variable builders.
//!
//! One parameterized query per logical operation; unset filters are passed
//! as explicit nulls, which the service treats as "not provided".

use serde_json::{Map, Value, json};

use super::types::EventFilter;

/// Report metadata and fight list in one round-trip.
pub const REPORT_OVERVIEW: &str = r#"
    query ReportOverview($code: String!) {
        reportData {
            report(code: $code) {
                title
                startTime
                endTime
                fights {
                    id
                    name
                    startTime
                    endTime
                    kill
                    fightPercentage
                }
            }
        }
    }"#;

/// All actors (players, NPCs, pets) from the report master data.
pub const MASTER_DATA: &str = r#"
    query MasterData($code: String!) {
        reportData {
            report(code: $code) {
                masterData {
                    actors {
                        id
                        name
                        type
                        subType
                        server
                        icon
                    }
                }
            }
        }
    }"#;

/// Single-ability lookup from the game-data dictionary.
pub const ABILITY_LOOKUP: &str = r#"
    query AbilityLookup($id: Float!) {
        gameData {
            ability(id: $id) {
                id
                name
                icon
            }
        }
    }"#;

/// Paged event query; every filter argument is nullable.
pub const EVENTS: &str = r#"
    query Events(
        $code: String!,
        $fightID: Int!,
        $dataType: EventDataType,
        $hostilityType: HostilityType,
        $sourceID: Int,
        $targetID: Int,
        $startTime: Float,
        $endTime: Float,
        $limit: Int
    ) {
        reportData {
            report(code: $code) {
                events(
                    fightIDs: [$fightID],
                    dataType: $dataType,
                    hostilityType: $hostilityType,
                    sourceID: $sourceID,
                    targetID: $targetID,
                    startTime: $startTime,
                    endTime: $endTime,
                    limit: $limit
                ) {
                    data
                    nextPageTimestamp
                }
            }
        }
    }"#;

pub fn report_variables(code: &str) -> Value {
    json!({ "code": code })
}

pub fn ability_variables(ability_id: i64) -> Value {
    json!({ "id": ability_id })
}

/// Build the variables for one events page. `cursor` (the previous page's
/// `nextPageTimestamp`) overrides the filter's start time while paging.
pub fn event_variables(code: &str, filter: &EventFilter, cursor: Option<f64>) -> Value {
    let mut vars = Map::new();
    vars.insert("code".into(), json!(code));
    vars.insert("fightID".into(), json!(filter.fight_id));
    vars.insert(
        "dataType".into(),
        filter.data_type.map_or(Value::Null, |dt| json!(dt.as_str())),
    );
    vars.insert(
        "hostilityType".into(),
        filter.hostility.map_or(Value::Null, |h| json!(h.as_str())),
    );
    vars.insert(
        "sourceID".into(),
        filter.source_id.map_or(Value::Null, |id| json!(id)),
    );
    vars.insert(
        "targetID".into(),
        filter.target_id.map_or(Value::Null, |id| json!(id)),
    );
    vars.insert(
        "startTime".into(),
        cursor
            .or(filter.start_time)
            .map_or(Value::Null, |t| json!(t)),
    );
    vars.insert(
        "endTime".into(),
        filter.end_time.map_or(Value::Null, |t| json!(t)),
    );
    vars.insert(
        "limit".into(),
        filter.limit.map_or(Value::Null, |l| json!(l)),
    );
    Value::Object(vars)
}
