//! Client for the external generative level service.
//!
//! One POST per requested level: a natural-language prompt plus a strict
//! output contract. The reply text is parsed as JSON (tolerating prose
//! around a single JSON block), normalized into a `LevelData`, and then
//! re-validated. A remote layout is never trusted to be playable.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use game_core::{LevelData, LevelError, Pos};

const ENDPOINT_ENV: &str = "LEVEL_SERVICE_ENDPOINT";
const API_KEY_ENV: &str = "LEVEL_SERVICE_API_KEY";

const MAX_TOKENS: u32 = 512;
const TEMPERATURE: f32 = 0.8;

pub struct GenerativeClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug)]
pub enum RemoteLevelError {
    Http(reqwest::Error),
    EmptyResponse,
    MalformedPayload(String),
    InvalidLevel(LevelError),
}

impl fmt::Display for RemoteLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(error) => write!(f, "level service request failed: {error}"),
            Self::EmptyResponse => write!(f, "level service returned an empty reply"),
            Self::MalformedPayload(message) => {
                write!(f, "level service reply did not match the schema: {message}")
            }
            Self::InvalidLevel(error) => {
                write!(f, "level service produced an unplayable level: {error}")
            }
        }
    }
}

impl From<reqwest::Error> for RemoteLevelError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

/// The strict reply contract. Unknown fields are rejected so a drifting
/// service schema fails loudly into the fallback path.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RemoteLevel {
    start: Pos,
    goal: Pos,
    obstacles: Vec<Pos>,
    theme: String,
    story: String,
}

impl GenerativeClient {
    /// Configured iff `LEVEL_SERVICE_ENDPOINT` is set; the API key is
    /// optional and sent as an `x-api-key` header when present.
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var(ENDPOINT_ENV).ok()?;
        let api_key = env::var(API_KEY_ENV).ok();
        Some(Self { http: reqwest::Client::new(), endpoint, api_key })
    }

    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), endpoint, api_key }
    }

    /// Request one level. Any failure mode (transport, non-2xx, empty or
    /// malformed reply, unplayable layout) surfaces as an error for the
    /// caller's fallback chain; no retry is attempted here.
    pub async fn generate_level(
        &self,
        level_id: u32,
        grid_size: i32,
    ) -> Result<LevelData, RemoteLevelError> {
        let prompt = build_level_prompt(level_id, grid_size);
        let payload =
            GenerateRequest { prompt: &prompt, max_tokens: MAX_TOKENS, temperature: TEMPERATURE };

        let mut request = self.http.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?.error_for_status()?;
        let body: GenerateResponse = response.json().await?;
        if body.text.trim().is_empty() {
            return Err(RemoteLevelError::EmptyResponse);
        }

        let remote = parse_remote_level(&body.text)?;
        normalize(remote, level_id, grid_size)
    }
}

fn build_level_prompt(level_id: u32, grid_size: i32) -> String {
    let difficulty = if level_id > 3 { "medium" } else { "easy" };
    let approximate_obstacles = if level_id > 3 { 6 } else { 3 };
    format!(
        "Create a grid puzzle level for a 4-year-old child's coding game.\n\
         The grid is {grid_size}x{grid_size}, with 0-indexed x/y coordinates.\n\
         Level ID: {level_id}. Difficulty: {difficulty}.\n\
         Approximate number of obstacles: {approximate_obstacles}.\n\
         Ensure there is a valid path from start to goal.\n\
         The story should be cute and simple; the theme should be fun \
         (e.g. animals, space, treats).\n\
         Reply with exactly one JSON object of the form \
         {{\"start\":{{\"x\":0,\"y\":0}},\"goal\":{{\"x\":0,\"y\":0}},\
         \"obstacles\":[{{\"x\":0,\"y\":0}}],\"theme\":\"string\",\
         \"story\":\"string\"}} and nothing else."
    )
}

fn parse_remote_level(text: &str) -> Result<RemoteLevel, RemoteLevelError> {
    if let Ok(remote) = serde_json::from_str::<RemoteLevel>(text) {
        return Ok(remote);
    }
    let Some(block) = extract_json_block(text) else {
        return Err(RemoteLevelError::MalformedPayload("no JSON object in reply".to_string()));
    };
    serde_json::from_str(block)
        .map_err(|error| RemoteLevelError::MalformedPayload(error.to_string()))
}

fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

/// Wrap a remote reply into a `LevelData` with the locally-owned id and
/// grid size, then check every level invariant including reachability.
fn normalize(
    remote: RemoteLevel,
    level_id: u32,
    grid_size: i32,
) -> Result<LevelData, RemoteLevelError> {
    let level = LevelData {
        id: level_id,
        grid_size,
        start: remote.start,
        goal: remote.goal,
        obstacles: remote.obstacles,
        theme: remote.theme,
        story: remote.story,
    };
    level.validate().map_err(RemoteLevelError::InvalidLevel)?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "start": {"x": 0, "y": 0},
        "goal": {"x": 3, "y": 3},
        "obstacles": [{"x": 1, "y": 1}, {"x": 2, "y": 2}],
        "theme": "space",
        "story": "Fly to the little moon!"
    }"#;

    #[test]
    fn well_formed_reply_normalizes_with_local_id_and_grid() {
        let remote = parse_remote_level(WELL_FORMED).expect("parse");
        let level = normalize(remote, 4, 5).expect("normalize");
        assert_eq!(level.id, 4);
        assert_eq!(level.grid_size, 5);
        assert_eq!(level.start, Pos { x: 0, y: 0 });
        assert_eq!(level.theme, "space");
        level.validate().expect("normalized level is playable");
    }

    #[test]
    fn json_block_is_extracted_from_surrounding_prose() {
        let chatty = format!("Sure! Here is your level:\n```json\n{WELL_FORMED}\n```\nEnjoy!");
        let remote = parse_remote_level(&chatty).expect("parse");
        assert_eq!(remote.goal, Pos { x: 3, y: 3 });
    }

    #[test]
    fn replies_without_a_json_object_are_malformed() {
        assert!(matches!(
            parse_remote_level("I could not think of a level, sorry."),
            Err(RemoteLevelError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_remote_level(""),
            Err(RemoteLevelError::MalformedPayload(_))
        ));
    }

    #[test]
    fn unknown_schema_fields_are_rejected() {
        let drifted = r#"{
            "start": {"x": 0, "y": 0},
            "goal": {"x": 3, "y": 3},
            "obstacles": [],
            "theme": "space",
            "story": "hi",
            "difficulty": "hard"
        }"#;
        assert!(matches!(
            parse_remote_level(drifted),
            Err(RemoteLevelError::MalformedPayload(_))
        ));
    }

    #[test]
    fn missing_schema_fields_are_rejected() {
        let truncated = r#"{"start": {"x": 0, "y": 0}, "goal": {"x": 3, "y": 3}}"#;
        assert!(matches!(
            parse_remote_level(truncated),
            Err(RemoteLevelError::MalformedPayload(_))
        ));
    }

    #[test]
    fn out_of_bounds_remote_levels_are_rejected_as_unplayable() {
        let oversized = r#"{
            "start": {"x": 0, "y": 0},
            "goal": {"x": 9, "y": 9},
            "obstacles": [],
            "theme": "space",
            "story": "hi"
        }"#;
        let remote = parse_remote_level(oversized).expect("parse");
        assert!(matches!(
            normalize(remote, 2, 5),
            Err(RemoteLevelError::InvalidLevel(LevelError::GoalOutOfBounds { .. }))
        ));
    }

    #[test]
    fn unreachable_remote_levels_are_rejected_as_unplayable() {
        let walled = r#"{
            "start": {"x": 0, "y": 0},
            "goal": {"x": 4, "y": 0},
            "obstacles": [
                {"x": 2, "y": 0}, {"x": 2, "y": 1}, {"x": 2, "y": 2},
                {"x": 2, "y": 3}, {"x": 2, "y": 4}
            ],
            "theme": "space",
            "story": "hi"
        }"#;
        let remote = parse_remote_level(walled).expect("parse");
        assert!(matches!(
            normalize(remote, 2, 5),
            Err(RemoteLevelError::InvalidLevel(LevelError::GoalUnreachable))
        ));
    }

    #[test]
    fn prompt_difficulty_ramps_after_level_three() {
        let easy = build_level_prompt(2, 5);
        assert!(easy.contains("Difficulty: easy"));
        assert!(easy.contains("obstacles: 3"));

        let medium = build_level_prompt(4, 5);
        assert!(medium.contains("Difficulty: medium"));
        assert!(medium.contains("obstacles: 6"));
    }
}
