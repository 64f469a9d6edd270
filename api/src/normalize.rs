//! Vendor JSON → domain types.
//!
//! Each [`SourceShape`] has its own extraction routine; all of them produce the
//! same [`Match`] / [`MatchDetail`] records. Only a non-object top level is an
//! error. Any field below it that is missing or mistyped is replaced by a fixed
//! placeholder, so consumers never see an absent value.
use crate::cricbuzz::{self, CommentaryResponse, MatchesResponse};
use crate::flat::{self, FlatDetail, FlatResponse};
use crate::{
    BatterLine, BowlerLine, FallOfWicket, Innings, Match, MatchDetail, MatchPayload, MatchResult,
    MatchStatus, Partnership, PowerPlay, Score, Series, TBA, TeamRef, TopPerformers, UNKNOWN,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const UNKNOWN_ID: &str = "unknown";
const HOME_PLACEHOLDER: &str = "Team 1";
const AWAY_PLACEHOLDER: &str = "Team 2";
const BATTER_PLACEHOLDER: &str = "Batsman";
const BOWLER_PLACEHOLDER: &str = "Bowler";

/// Which vendor JSON layout the responses follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceShape {
    /// `typeMatches[].seriesMatches[].matchDetails[]`
    #[default]
    Cricbuzz,
    /// `matches[]` with `teams[0]` / `teams[1]`
    Flat,
}

impl SourceShape {
    pub fn name(&self) -> &'static str {
        match self {
            SourceShape::Cricbuzz => "cricbuzz",
            SourceShape::Flat => "flat",
        }
    }
}

impl FromStr for SourceShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cricbuzz" | "nested" => Ok(SourceShape::Cricbuzz),
            "flat" => Ok(SourceShape::Flat),
            other => Err(format!("unknown source shape '{other}' (expected cricbuzz or flat)")),
        }
    }
}

#[derive(Debug)]
pub enum NormalizationError {
    /// Top level was an array, string, number, bool or null.
    NotAnObject { found: &'static str },
    Shape(serde_json::Error),
}

impl fmt::Display for NormalizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationError::NotAnObject { found } => {
                write!(f, "malformed payload: expected a JSON object, found {found}")
            }
            NormalizationError::Shape(e) => write!(f, "malformed payload: {e}"),
        }
    }
}

impl std::error::Error for NormalizationError {}

impl From<serde_json::Error> for NormalizationError {
    fn from(e: serde_json::Error) -> Self {
        NormalizationError::Shape(e)
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Normalize a full category response (every match it contains).
pub fn normalize_matches(
    raw: &Value,
    status: MatchStatus,
    shape: SourceShape,
) -> Result<Vec<Match>, NormalizationError> {
    expect_object(raw)?;
    let matches = match shape {
        SourceShape::Cricbuzz => MatchesResponse::deserialize(raw)?
            .entries()
            .map(|(series, entry)| map_cricbuzz_match(entry, Some(series), status))
            .collect(),
        SourceShape::Flat => FlatResponse::deserialize(raw)?
            .matches
            .iter()
            .map(|m| map_flat_match(m, status))
            .collect(),
    };
    Ok(matches)
}

/// Normalize a single match entry (one element of `matchDetails` / `matches`).
pub fn normalize_match(
    raw: &Value,
    status: MatchStatus,
    shape: SourceShape,
) -> Result<Match, NormalizationError> {
    expect_object(raw)?;
    let normalized = match shape {
        SourceShape::Cricbuzz => {
            map_cricbuzz_match(&cricbuzz::MatchEntry::deserialize(raw)?, None, status)
        }
        SourceShape::Flat => map_flat_match(&flat::FlatMatch::deserialize(raw)?, status),
    };
    Ok(normalized)
}

pub fn normalize_match_detail(
    raw: &Value,
    match_id: &str,
    shape: SourceShape,
) -> Result<MatchDetail, NormalizationError> {
    expect_object(raw)?;
    let detail = match shape {
        SourceShape::Cricbuzz => map_commentary(match_id, CommentaryResponse::deserialize(raw)?),
        SourceShape::Flat => map_flat_detail(match_id, FlatDetail::deserialize(raw)?),
    };
    Ok(detail)
}

fn expect_object(raw: &Value) -> Result<(), NormalizationError> {
    let found = match raw {
        Value::Object(_) => return Ok(()),
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
    };
    Err(NormalizationError::NotAnObject { found })
}

// ---------------------------------------------------------------------------
// Mapping: Cricbuzz wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_cricbuzz_match(
    entry: &cricbuzz::MatchEntry,
    series_entry: Option<&cricbuzz::SeriesMatch>,
    status: MatchStatus,
) -> Match {
    let team = |t: Option<&cricbuzz::CbTeam>, placeholder: &str| TeamRef {
        name: t.and_then(|t| t.team_name.clone()).unwrap_or_else(|| placeholder.to_owned()),
        short_name: t.and_then(|t| t.team_s_name.clone()),
        logo: t.and_then(|t| t.image_id.clone()),
    };

    let venue = entry
        .venue
        .as_ref()
        .and_then(|v| v.name.clone().or_else(|| v.city.clone()))
        .unwrap_or_else(|| UNKNOWN.to_owned());

    let series_name = entry
        .series_name
        .clone()
        .or_else(|| series_entry.and_then(|s| s.series_name.clone()));
    let series_season = entry
        .series_season
        .clone()
        .or_else(|| series_entry.and_then(|s| s.season.clone()));
    let series = series_name.map(|name| Series {
        name,
        season: series_season.unwrap_or_else(|| UNKNOWN.to_owned()),
    });

    let payload = match status {
        MatchStatus::Live => {
            let first = entry
                .match_score_details
                .as_ref()
                .and_then(|d| d.team_scores.first());
            let (text_runs, text_wickets, text_overs) = first
                .and_then(|s| s.score.as_deref())
                .map(parse_score_text)
                .unwrap_or_default();
            MatchPayload::Live {
                current_score: score(
                    first.and_then(|s| s.runs).or(text_runs),
                    first.and_then(|s| s.wickets).or(text_wickets),
                    first.and_then(|s| s.overs).or(text_overs),
                ),
            }
        }
        MatchStatus::Upcoming => {
            let (scheduled_date, derived_time) = schedule(entry.start_date.as_ref());
            MatchPayload::Upcoming {
                scheduled_date,
                scheduled_time: entry.start_time.clone().unwrap_or(derived_time),
            }
        }
        MatchStatus::Completed => {
            let raw = entry.match_result.clone().unwrap_or_default();
            MatchPayload::Completed {
                result: match_result(raw.winning_team, raw.winning_margin, raw.description),
                date: schedule(entry.start_date.as_ref()).0,
            }
        }
    };

    Match {
        id: entry.match_id.clone().unwrap_or_else(|| UNKNOWN_ID.to_owned()),
        team1: team(entry.team1.as_ref(), HOME_PLACEHOLDER),
        team2: team(entry.team2.as_ref(), AWAY_PLACEHOLDER),
        match_type: entry.match_format.clone().unwrap_or_else(|| UNKNOWN.to_owned()),
        venue,
        series,
        payload,
    }
}

fn map_commentary(match_id: &str, raw: CommentaryResponse) -> MatchDetail {
    let batting = raw.batting_team.unwrap_or_default();
    let bowling = raw.bowling_team.unwrap_or_default();
    let batting_score = batting.score.unwrap_or_default();
    let current_score = score(batting_score.runs, batting_score.wickets, batting_score.overs);

    let fall_of_wickets = raw
        .fall_of_wickets
        .into_iter()
        .map(|w| FallOfWicket {
            batter: w.batsman_name.unwrap_or_else(|| BATTER_PLACEHOLDER.to_owned()),
            score: w.score.unwrap_or_default(),
            over: w.over.unwrap_or_default(),
        })
        .collect();

    let batsmen = raw
        .batsmen
        .into_iter()
        .map(|b| batter_line(b.name, b.runs, b.balls, b.fours, b.sixes, b.strike_rate))
        .collect();
    let bowlers = raw
        .bowlers
        .into_iter()
        .map(|b| bowler_line(b.name, b.overs, b.maidens, b.runs, b.wickets, b.economy))
        .collect();

    MatchDetail {
        id: match_id.to_owned(),
        current_innings: Innings {
            batting_team: batting.team_name.unwrap_or_else(|| UNKNOWN.to_owned()),
            bowling_team: bowling.team_name.unwrap_or_else(|| UNKNOWN.to_owned()),
            run_rate: raw.run_rate.unwrap_or_else(|| current_score.run_rate()),
            current_score,
            fall_of_wickets,
        },
        top_performers: TopPerformers { batsmen, bowlers },
        partnership: raw.partnership.map(|p| Partnership {
            runs: p.runs.unwrap_or_default(),
            balls: p.balls.unwrap_or_default(),
        }),
        power_play: raw.power_play.map(|p| PowerPlay {
            from_over: p.from.unwrap_or_default(),
            to_over: p.to.unwrap_or_default(),
            runs: p.runs.unwrap_or_default(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Mapping: flat-array wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_flat_match(m: &flat::FlatMatch, status: MatchStatus) -> Match {
    let team = |idx: usize, placeholder: &str| {
        let t = m.teams.get(idx);
        TeamRef {
            name: t.and_then(|t| t.name.clone()).unwrap_or_else(|| placeholder.to_owned()),
            short_name: t.and_then(|t| t.short_name.clone()),
            logo: t.and_then(|t| t.logo.clone()),
        }
    };

    let series = m.series.as_ref().and_then(|s| {
        s.name.clone().map(|name| Series {
            name,
            season: s.season.clone().unwrap_or_else(|| UNKNOWN.to_owned()),
        })
    });

    let payload = match status {
        MatchStatus::Live => {
            let live = m.live_score.clone().unwrap_or_default();
            MatchPayload::Live { current_score: score(live.runs, live.wickets, live.overs) }
        }
        MatchStatus::Upcoming => {
            let (scheduled_date, scheduled_time) = schedule(m.start_time.as_ref());
            MatchPayload::Upcoming { scheduled_date, scheduled_time }
        }
        MatchStatus::Completed => {
            let raw = m.result.clone().unwrap_or_default();
            MatchPayload::Completed {
                result: match_result(raw.winner, raw.margin, None),
                date: schedule(m.start_time.as_ref()).0,
            }
        }
    };

    Match {
        id: m.match_id.clone().unwrap_or_else(|| UNKNOWN_ID.to_owned()),
        team1: team(0, HOME_PLACEHOLDER),
        team2: team(1, AWAY_PLACEHOLDER),
        match_type: m.format_str.clone().unwrap_or_else(|| UNKNOWN.to_owned()),
        venue: m
            .venue
            .as_ref()
            .and_then(|v| v.name.clone())
            .unwrap_or_else(|| UNKNOWN.to_owned()),
        series,
        payload,
    }
}

fn map_flat_detail(match_id: &str, raw: FlatDetail) -> MatchDetail {
    let innings = raw.innings.unwrap_or_default();
    let innings_score = innings.score.unwrap_or_default();
    let current_score = score(innings_score.runs, innings_score.wickets, innings_score.overs);

    MatchDetail {
        id: match_id.to_owned(),
        current_innings: Innings {
            batting_team: innings.batting_team.unwrap_or_else(|| UNKNOWN.to_owned()),
            bowling_team: innings.bowling_team.unwrap_or_else(|| UNKNOWN.to_owned()),
            run_rate: innings.run_rate.unwrap_or_else(|| current_score.run_rate()),
            current_score,
            fall_of_wickets: innings
                .fall_of_wickets
                .into_iter()
                .map(|w| FallOfWicket {
                    batter: w.batter.unwrap_or_else(|| BATTER_PLACEHOLDER.to_owned()),
                    score: w.score.unwrap_or_default(),
                    over: w.over.unwrap_or_default(),
                })
                .collect(),
        },
        top_performers: TopPerformers {
            batsmen: raw
                .batsmen
                .into_iter()
                .map(|b| batter_line(b.name, b.runs, b.balls, b.fours, b.sixes, b.strike_rate))
                .collect(),
            bowlers: raw
                .bowlers
                .into_iter()
                .map(|b| bowler_line(b.name, b.overs, b.maidens, b.runs, b.wickets, b.economy))
                .collect(),
        },
        partnership: raw.partnership.map(|p| Partnership {
            runs: p.runs.unwrap_or_default(),
            balls: p.balls.unwrap_or_default(),
        }),
        power_play: raw.powerplay.map(|p| PowerPlay {
            from_over: p.from_over.unwrap_or_default(),
            to_over: p.to_over.unwrap_or_default(),
            runs: p.runs.unwrap_or_default(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Shared field rules
// ---------------------------------------------------------------------------

fn score(runs: Option<u32>, wickets: Option<u32>, overs: Option<f64>) -> Score {
    Score {
        runs: runs.unwrap_or_default(),
        wickets: wickets.unwrap_or_default(),
        overs: overs.filter(|o| *o >= 0.0).unwrap_or_default(),
    }
}

/// Pieces of a display score like `"120/3 (15.2)"`, `"120-3 (15.2 ov)"` or
/// `"87"`. A piece that does not parse is `None`.
fn parse_score_text(text: &str) -> (Option<u32>, Option<u32>, Option<f64>) {
    let (total, overs) = match text.split_once('(') {
        Some((total, rest)) => (total, rest.split(')').next()),
        None => (text, None),
    };
    let (runs, wickets) = match total.trim().split_once(['/', '-']) {
        Some((runs, wickets)) => (runs, Some(wickets)),
        None => (total.trim(), None),
    };

    let runs = runs.trim().parse().ok();
    let wickets = wickets.and_then(|w| w.trim().parse().ok());
    let overs = overs
        .and_then(|o| o.trim().trim_end_matches("ov").trim().parse::<f64>().ok())
        .filter(|o| o.is_finite() && *o >= 0.0);
    (runs, wickets, overs)
}

fn batter_line(
    name: Option<String>,
    runs: Option<u32>,
    balls: Option<u32>,
    fours: Option<u32>,
    sixes: Option<u32>,
    strike_rate: Option<f64>,
) -> BatterLine {
    let runs = runs.unwrap_or_default();
    let balls = balls.unwrap_or_default();
    BatterLine {
        name: name.unwrap_or_else(|| BATTER_PLACEHOLDER.to_owned()),
        runs,
        balls,
        fours: fours.unwrap_or_default(),
        sixes: sixes.unwrap_or_default(),
        strike_rate: strike_rate.unwrap_or_else(|| BatterLine::derived_strike_rate(runs, balls)),
    }
}

fn bowler_line(
    name: Option<String>,
    overs: Option<f64>,
    maidens: Option<u32>,
    runs: Option<u32>,
    wickets: Option<u32>,
    economy: Option<f64>,
) -> BowlerLine {
    let overs = overs.filter(|o| *o >= 0.0).unwrap_or_default();
    let runs = runs.unwrap_or_default();
    BowlerLine {
        name: name.unwrap_or_else(|| BOWLER_PLACEHOLDER.to_owned()),
        overs,
        maidens: maidens.unwrap_or_default(),
        runs,
        wickets: wickets.unwrap_or_default(),
        economy: economy.unwrap_or_else(|| BowlerLine::derived_economy(runs, overs)),
    }
}

/// Winner and margin, falling back to parsing "<team> won by <margin>".
fn match_result(
    winner: Option<String>,
    margin: Option<String>,
    description: Option<String>,
) -> MatchResult {
    let parsed = description.as_deref().and_then(|d| {
        let (team, by) = d.split_once(" won by ")?;
        let team = team.trim();
        (!team.is_empty()).then(|| (team.to_owned(), by.trim().to_owned()))
    });

    let (parsed_winner, parsed_margin) = match parsed {
        Some((team, by)) => (Some(team), Some(by).filter(|b| !b.is_empty())),
        None => (None, None),
    };

    MatchResult {
        winner: winner.or(parsed_winner).unwrap_or_else(|| UNKNOWN.to_owned()),
        margin: margin.or(parsed_margin),
        summary: description,
    }
}

/// Canonical `(YYYY-MM-DD, HH:MM)` in UTC for an epoch-millisecond or ISO
/// timestamp. Parts that cannot be determined are `"TBA"`.
pub fn schedule(raw: Option<&Value>) -> (String, String) {
    let tba = || (TBA.to_owned(), TBA.to_owned());
    let Some(raw) = raw else {
        return tba();
    };

    if let Some(dt) = parse_timestamp(raw) {
        return (dt.format("%Y-%m-%d").to_string(), dt.format("%H:%M").to_string());
    }

    // Date-only strings carry no time of day.
    raw.as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        .map(|d| (d.format("%Y-%m-%d").to_string(), TBA.to_owned()))
        .unwrap_or_else(tba)
}

fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(millis) = s.parse::<i64>() {
                return DateTime::from_timestamp_millis(millis);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}
