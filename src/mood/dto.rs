use serde::{Deserialize, Serialize};

/// Request body for `POST /api/get-mood-response`.
#[derive(Debug, Deserialize)]
pub struct MoodRequest {
    pub emoji: String,
}

#[derive(Debug, Serialize)]
pub struct MoodResponse {
    pub response: String,
}
