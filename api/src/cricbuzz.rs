/// Cricbuzz (RapidAPI) raw wire types: the nested
/// `typeMatches → seriesMatches → matchDetails` tree.
/// These map to our clean domain types in normalize.rs.
use crate::lenient;
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Match lists  (/matches/v1/{live,upcoming,recent})
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchesResponse {
    #[serde(default, deserialize_with = "lenient::list")]
    pub type_matches: Vec<TypeMatch>,
}

impl MatchesResponse {
    /// Every match in the tree paired with the series entry that holds it.
    pub fn entries(&self) -> impl Iterator<Item = (&SeriesMatch, &MatchEntry)> {
        self.type_matches
            .iter()
            .flat_map(|t| t.series_matches.iter())
            .flat_map(|s| s.match_details.iter().map(move |m| (s, m)))
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TypeMatch {
    /// "International", "League", "Domestic", "Women"
    #[serde(default, deserialize_with = "lenient::text")]
    pub match_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub series_matches: Vec<SeriesMatch>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMatch {
    #[serde(default, deserialize_with = "lenient::text")]
    pub series_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub match_details: Vec<MatchEntry>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub match_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub team1: Option<CbTeam>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub team2: Option<CbTeam>,
    /// "T20", "ODI", "TEST"
    #[serde(default, deserialize_with = "lenient::text")]
    pub match_format: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub venue: Option<CbVenue>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub series_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub series_season: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub match_score_details: Option<CbScoreDetails>,
    /// Epoch milliseconds, usually as a string.
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub start_date: Option<Value>,
    /// Local display time, e.g. "14:00".
    #[serde(default, deserialize_with = "lenient::text")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub match_result: Option<CbResult>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CbTeam {
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_s_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub image_id: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CbVenue {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CbScoreDetails {
    #[serde(default, deserialize_with = "lenient::list")]
    pub team_scores: Vec<CbScore>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CbScore {
    #[serde(default, deserialize_with = "lenient::count")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub wickets: Option<u32>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub overs: Option<f64>,
    /// Display form such as `"120/3 (15.2)"`, sent instead of the fields above.
    #[serde(default, deserialize_with = "lenient::text")]
    pub score: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CbResult {
    #[serde(default, deserialize_with = "lenient::text")]
    pub winning_team: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub winning_margin: Option<String>,
    /// "India won by 5 wkts"
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Commentary / live detail  (/matches/v1/{id}/commentary)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentaryResponse {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub batting_team: Option<CbInningsTeam>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub bowling_team: Option<CbInningsTeam>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub run_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub fall_of_wickets: Vec<CbWicket>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub batsmen: Vec<CbBatter>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub bowlers: Vec<CbBowler>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub partnership: Option<CbPartnership>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub power_play: Option<CbPowerPlay>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CbInningsTeam {
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub score: Option<CbScore>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CbWicket {
    #[serde(default, deserialize_with = "lenient::text")]
    pub batsman_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub score: Option<u32>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub over: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CbBatter {
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
    #[serde(default, rename = "strikeRate", deserialize_with = "lenient::decimal")]
    pub strike_rate: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CbBowler {
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

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CbPartnership {
    #[serde(default, deserialize_with = "lenient::count")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub balls: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CbPowerPlay {
    #[serde(default, deserialize_with = "lenient::count")]
    pub from: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub to: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub runs: Option<u32>,
}
