/// Wire types for flat-array vendors: `{ "matches": [ ... ] }` with the two
/// sides in `teams[0]` / `teams[1]`.
use crate::lenient;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatResponse {
    #[serde(default, deserialize_with = "lenient::list")]
    pub matches: Vec<FlatMatch>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatMatch {
    #[serde(default, deserialize_with = "lenient::text")]
    pub match_id: Option<String>,
    /// Home side first. Fewer than two entries pre-toss on some feeds.
    #[serde(default, deserialize_with = "lenient::list")]
    pub teams: Vec<FlatTeam>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub format_str: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub venue: Option<FlatVenue>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub series: Option<FlatSeries>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub live_score: Option<FlatScore>,
    /// Epoch milliseconds or an ISO-8601 string.
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub start_time: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub result: Option<FlatResult>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatTeam {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub short_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub logo: Option<String>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatVenue {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatSeries {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub season: Option<String>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatScore {
    #[serde(default, deserialize_with = "lenient::count")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub wickets: Option<u32>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub overs: Option<f64>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatResult {
    #[serde(default, deserialize_with = "lenient::text")]
    pub winner: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub margin: Option<String>,
}

// ---------------------------------------------------------------------------
// Single-match detail  (/matches/{id})
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatDetail {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub innings: Option<FlatInnings>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub batsmen: Vec<FlatBatter>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub bowlers: Vec<FlatBowler>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub partnership: Option<FlatPartnership>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub powerplay: Option<FlatPowerPlay>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatInnings {
    #[serde(default, deserialize_with = "lenient::text")]
    pub batting_team: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub bowling_team: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub score: Option<FlatScore>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub run_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub fall_of_wickets: Vec<FlatWicket>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatWicket {
    #[serde(default, deserialize_with = "lenient::text")]
    pub batter: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub score: Option<u32>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub over: Option<f64>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatBatter {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub balls: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub fours: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub sixes: Option<u32>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub strike_rate: Option<f64>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatBowler {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub overs: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub maidens: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub wickets: Option<u32>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub economy: Option<f64>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatPartnership {
    #[serde(default, deserialize_with = "lenient::count")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub balls: Option<u32>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct FlatPowerPlay {
    #[serde(default, deserialize_with = "lenient::count")]
    pub from_over: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub to_over: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub runs: Option<u32>,
}
