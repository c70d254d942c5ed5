pub mod json_api;

pub use json_api::{
    apply_ball_json, simulate_match_json, simulate_over_json, ApplyBallRequest,
    ApplyBallResponse, MatchRequest, MatchResponse, OverRequest, OverResponse, SCHEMA_VERSION,
};
