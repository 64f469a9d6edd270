pub mod client;
pub mod cricbuzz;
pub mod flat;
pub mod normalize;
pub mod repository;
pub mod scheduler;

mod lenient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";
pub const TBA: &str = "TBA";

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of any vendor wire format
// ---------------------------------------------------------------------------

/// One match snapshot from a single fetch cycle.
///
/// Every field is populated: absent vendor data has already been replaced by
/// a placeholder (`"Unknown"`, `"TBA"`, `0`) by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: String,
    pub team1: TeamRef,
    pub team2: TeamRef,
    pub match_type: String,
    pub venue: String,
    pub series: Option<Series>,
    pub payload: MatchPayload,
}

impl Match {
    pub fn status(&self) -> MatchStatus {
        self.payload.status()
    }

    pub fn is_live(&self) -> bool {
        self.status() == MatchStatus::Live
    }

    pub fn current_score(&self) -> Option<&Score> {
        match &self.payload {
            MatchPayload::Live { current_score } => Some(current_score),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        format!("{} vs {}", self.team1.name, self.team2.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    #[default]
    Live,
    Upcoming,
    Completed,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Live => "Live",
            MatchStatus::Upcoming => "Upcoming",
            MatchStatus::Completed => "Completed",
        }
    }
}

/// Status-dependent part of a [`Match`]. The variant *is* the status, so a
/// live match can never carry a result and a finished one never a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum MatchPayload {
    Live {
        current_score: Score,
    },
    Upcoming {
        scheduled_date: String,
        scheduled_time: String,
    },
    Completed {
        result: MatchResult,
        date: String,
    },
}

impl MatchPayload {
    pub fn status(&self) -> MatchStatus {
        match self {
            MatchPayload::Live { .. } => MatchStatus::Live,
            MatchPayload::Upcoming { .. } => MatchStatus::Upcoming,
            MatchPayload::Completed { .. } => MatchStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamRef {
    pub name: String,
    pub short_name: Option<String>,
    pub logo: Option<String>,
}

impl TeamRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), short_name: None, logo: None }
    }

    /// Short label for narrow layouts, falling back to the full name.
    pub fn label(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub season: String,
}

/// Batting side total. `overs` uses cricket notation: `15.2` is 15 overs and 2 balls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Score {
    pub runs: u32,
    pub wickets: u32,
    pub overs: f64,
}

impl Score {
    pub fn balls(&self) -> u32 {
        overs_to_balls(self.overs)
    }

    /// Runs per over, rounded to two decimals. Zero before the first ball.
    pub fn run_rate(&self) -> f64 {
        per_over(self.runs, self.balls())
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({} ov)", self.runs, self.wickets, self.overs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub winner: String,
    pub margin: Option<String>,
    /// Vendor's one-line summary, e.g. "Match drawn" or "India won by 5 wkts".
    pub summary: Option<String>,
}

/// Ball count for an overs figure in cricket notation (`4.3` → 27).
pub fn overs_to_balls(overs: f64) -> u32 {
    if !overs.is_finite() || overs <= 0.0 {
        return 0;
    }
    let whole = overs.trunc();
    let part = ((overs - whole) * 10.0).round().min(5.0);
    (whole as u32) * 6 + part as u32
}

fn per_over(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round2(f64::from(runs) * 6.0 / f64::from(balls))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Match detail: fetched on demand when a live match is expanded
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchDetail {
    pub id: String,
    pub current_innings: Innings,
    pub top_performers: TopPerformers,
    pub partnership: Option<Partnership>,
    pub power_play: Option<PowerPlay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Innings {
    pub batting_team: String,
    pub bowling_team: String,
    pub current_score: Score,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub run_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopPerformers {
    pub batsmen: Vec<BatterLine>,
    pub bowlers: Vec<BowlerLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatterLine {
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: f64,
}

impl BatterLine {
    pub fn derived_strike_rate(runs: u32, balls: u32) -> f64 {
        if balls == 0 {
            return 0.0;
        }
        round2(f64::from(runs) * 100.0 / f64::from(balls))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BowlerLine {
    pub name: String,
    pub overs: f64,
    pub maidens: u32,
    pub runs: u32,
    pub wickets: u32,
    pub economy: f64,
}

impl BowlerLine {
    pub fn derived_economy(runs: u32, overs: f64) -> f64 {
        per_over(runs, overs_to_balls(overs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FallOfWicket {
    pub batter: String,
    pub score: u32,
    pub over: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Partnership {
    pub runs: u32,
    pub balls: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerPlay {
    pub from_over: u32,
    pub to_over: u32,
    pub runs: u32,
}

// ---------------------------------------------------------------------------
// Refresh state: what the presentation layer reads
// ---------------------------------------------------------------------------

/// Aggregate result of one refresh cycle. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshState {
    pub live: Vec<Match>,
    pub upcoming: Vec<Match>,
    pub past: Vec<Match>,
    pub loading: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RefreshState {
    pub fn matches(&self, category: Category) -> &[Match] {
        match category {
            Category::Live => &self.live,
            Category::Upcoming => &self.upcoming,
            Category::Past => &self.past,
        }
    }

    pub fn find(&self, match_id: &str) -> Option<&Match> {
        self.live
            .iter()
            .chain(&self.upcoming)
            .chain(&self.past)
            .find(|m| m.id == match_id)
    }
}

/// One of the three match groupings the vendor exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Live,
    Upcoming,
    Past,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Live, Category::Upcoming, Category::Past];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Live => "live",
            Category::Upcoming => "upcoming",
            Category::Past => "past",
        }
    }

    /// Status every match in this category is normalized with.
    pub fn status(&self) -> MatchStatus {
        match self {
            Category::Live => MatchStatus::Live,
            Category::Upcoming => MatchStatus::Upcoming,
            Category::Past => MatchStatus::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overs_notation_counts_balls() {
        assert_eq!(overs_to_balls(15.2), 92);
        assert_eq!(overs_to_balls(4.0), 24);
        assert_eq!(overs_to_balls(0.0), 0);
        assert_eq!(overs_to_balls(-1.0), 0);
        assert_eq!(overs_to_balls(f64::NAN), 0);
    }

    #[test]
    fn run_rate_uses_balls_not_decimal_overs() {
        let score = Score { runs: 120, wickets: 3, overs: 15.2 };
        assert_eq!(score.run_rate(), 7.83);
        assert_eq!(Score::default().run_rate(), 0.0);
    }

    #[test]
    fn derived_rates() {
        assert_eq!(BatterLine::derived_strike_rate(50, 40), 125.0);
        assert_eq!(BatterLine::derived_strike_rate(10, 0), 0.0);
        assert_eq!(BowlerLine::derived_economy(27, 4.3), 6.0);
    }

    #[test]
    fn status_follows_payload() {
        let payload = MatchPayload::Upcoming {
            scheduled_date: TBA.into(),
            scheduled_time: TBA.into(),
        };
        assert_eq!(payload.status(), MatchStatus::Upcoming);
        assert_eq!(Category::Past.status(), MatchStatus::Completed);
    }

    #[test]
    fn team_label_prefers_short_name() {
        let mut team = TeamRef::named("India");
        assert_eq!(team.label(), "India");
        team.short_name = Some("IND".into());
        assert_eq!(team.label(), "IND");
    }
}
