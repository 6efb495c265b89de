use serde::{Deserialize, Serialize};

/// Body of POST /api/track. Both fields are optional; everything else about
/// the visit comes from ambient request metadata.
#[derive(Deserialize, Serialize, Default)]
pub struct TrackRequest {
    pub path: Option<String>,
    pub traffic: Option<f64>,
}
