use chrono::{DateTime, Local, Utc};
use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::state::app_state::DetailState;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use cricket_api::{Category, Match, MatchDetail, MatchPayload, MatchResult};

static TABS: &[&str; 3] = &["Live", "Upcoming", "Past"];

const HELP_LINES: &[(&str, &str)] = &[
    ("1 / 2 / 3", "live, upcoming, past matches"),
    ("Tab / ← →", "next / previous tab"),
    ("j k / ↑ ↓", "move selection"),
    ("Enter", "expand or collapse a live match"),
    ("Esc", "collapse, leave help"),
    ("r", "refresh now"),
    ("\"", "toggle log pane"),
    ("f", "toggle full screen"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let drawn = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.active_category() {
            Some(category) => draw_category(f, layout.main, app, category),
            None => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_status_line(f, layout.status, app, Utc::now());
        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = drawn {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = app
        .state
        .active_tab
        .category()
        .or(app.state.previous_tab.category())
        .and_then(|c| Category::ALL.iter().position(|x| *x == c))
        .unwrap_or(0);

    let titles: Vec<Line> = TABS
        .iter()
        .zip(Category::ALL)
        .map(|(t, c)| Line::from(format!("{t} ({})", app.state.refresh.matches(c).len())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_category(f: &mut Frame, area: Rect, app: &App, category: Category) {
    let matches = app.state.refresh.matches(category);

    let (list_area, detail_area) = match app.expanded_match() {
        Some(_) if area.width >= 100 => {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(area);
            (left, Some(right))
        }
        Some(_) => {
            let [top, bottom] =
                Layout::vertical([Constraint::Percentage(40), Constraint::Fill(1)]).areas(area);
            (top, Some(bottom))
        }
        None => (area, None),
    };

    let title = format!(" {} Matches ", TABS[category_index(category)]);
    let block = default_border(Color::White).title(title);
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    if matches.is_empty() {
        let refresh = &app.state.refresh;
        let (msg, color) = if let Some(err) = refresh.error.as_deref() {
            (err.to_string(), Color::Red)
        } else if refresh.updated_at.is_none() {
            ("Loading matches...".to_string(), Color::DarkGray)
        } else {
            (format!("No {} matches", category.label()), Color::DarkGray)
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(color))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    draw_match_list(f, inner, app, category, matches);

    if let (Some(area), Some(expanded)) = (detail_area, app.expanded_match()) {
        draw_detail(f, area, app, expanded);
    }
}

fn category_index(category: Category) -> usize {
    Category::ALL.iter().position(|c| *c == category).unwrap_or(0)
}

fn draw_match_list(f: &mut Frame, area: Rect, app: &App, category: Category, matches: &[Match]) {
    // Two rows per match.
    let visible = (area.height / 2).max(1) as usize;
    let selected = app.state.lists.get(category).selected;
    let offset = selected.saturating_sub(visible - 1);

    let mut lines = Vec::with_capacity(visible * 2);
    for (idx, m) in matches.iter().enumerate().skip(offset).take(visible) {
        let is_selected = idx == selected;
        let marker = match (is_selected, app.is_expanded(&m.id)) {
            (_, true) => "▾",
            (true, false) => ">",
            (false, false) => " ",
        };
        let title_style = if is_selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let status_style = match m.payload {
            MatchPayload::Live { .. } => Style::default().fg(Color::Green),
            MatchPayload::Upcoming { .. } => Style::default().fg(Color::Cyan),
            MatchPayload::Completed { .. } => Style::default().fg(Color::Gray),
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{marker} {}", m.title()), title_style),
            Span::styled(format!("  [{}]  ", m.match_type), Style::default().fg(Color::DarkGray)),
            Span::styled(status_text(m), status_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", where_text(m)),
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App, m: &Match) {
    let block = default_border(Color::Green).title(format!(" {} ", m.title()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (msg, color) = match &app.state.detail {
        DetailState::Loaded(detail) => {
            f.render_widget(Paragraph::new(detail_lines(detail)), inner);
            return;
        }
        DetailState::Loading | DetailState::Idle => ("Loading match detail...", Color::DarkGray),
        DetailState::Failed(message) => (message.as_str(), Color::Red),
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        inner,
    );
}

fn detail_lines(detail: &MatchDetail) -> Vec<Line<'static>> {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let innings = &detail.current_innings;

    let mut lines = vec![
        Line::from(format!(
            "{} batting, {} bowling",
            innings.batting_team, innings.bowling_team
        )),
        Line::from(format!("{}  RR {:.2}", innings.current_score, innings.run_rate)),
    ];
    if let Some(p) = detail.partnership {
        lines.push(Line::from(format!("Partnership {} ({} balls)", p.runs, p.balls)));
    }
    if let Some(pp) = detail.power_play {
        lines.push(Line::from(format!(
            "Powerplay overs {}-{}: {} runs",
            pp.from_over, pp.to_over, pp.runs
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Batters", heading)));
    for b in &detail.top_performers.batsmen {
        lines.push(Line::from(format!(
            "  {:<20} {:>4} ({:>3})  4s {:>2}  6s {:>2}  SR {:.2}",
            b.name, b.runs, b.balls, b.fours, b.sixes, b.strike_rate
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Bowlers", heading)));
    for b in &detail.top_performers.bowlers {
        lines.push(Line::from(format!(
            "  {:<20} {:>4}-{}-{}-{}  Econ {:.2}",
            b.name, b.overs, b.maidens, b.runs, b.wickets, b.economy
        )));
    }

    if !innings.fall_of_wickets.is_empty() {
        let fow: Vec<String> = innings
            .fall_of_wickets
            .iter()
            .map(|w| format!("{} ({}, {} ov)", w.score, w.batter, w.over))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Fall of wickets", heading)));
        lines.push(Line::from(format!("  {}", fow.join(", "))));
    }

    lines
}

/// Right-hand status column of a match row.
pub fn status_text(m: &Match) -> String {
    match &m.payload {
        MatchPayload::Live { current_score } => {
            format!("{current_score}  RR {:.2}", current_score.run_rate())
        }
        MatchPayload::Upcoming { scheduled_date, scheduled_time } => {
            format!("{scheduled_date} {scheduled_time}")
        }
        MatchPayload::Completed { result, date } => format!("{}  {date}", result_text(result)),
    }
}

pub fn result_text(result: &MatchResult) -> String {
    if let Some(summary) = &result.summary {
        return summary.clone();
    }
    match &result.margin {
        Some(margin) => format!("{} won by {margin}", result.winner),
        None => format!("Winner: {}", result.winner),
    }
}

fn where_text(m: &Match) -> String {
    match &m.series {
        Some(series) => format!("{}  |  {} {}", m.venue, series.name, series.season),
        None => m.venue.clone(),
    }
}

/// Coarse age of the last refresh for the status line.
pub fn format_age(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - updated_at).num_seconds().max(0);
    match secs {
        0..=4 => "just now".to_string(),
        5..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        _ => format!("{}h ago", secs / 3600),
    }
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App, now: DateTime<Utc>) {
    let dim = Style::default().fg(Color::DarkGray);
    let refresh = &app.state.refresh;

    let mut spans = Vec::new();
    match refresh.updated_at {
        Some(at) => spans.push(Span::styled(
            format!(
                " updated {} ({})",
                at.with_timezone(&Local).format("%H:%M:%S"),
                format_age(at, now)
            ),
            dim,
        )),
        None => spans.push(Span::styled(" waiting for first refresh", dim)),
    }
    if refresh.loading {
        spans.push(Span::styled("  refreshing", Style::default().fg(Color::Cyan)));
    }
    spans.push(Span::styled(
        format!(
            "  every {}s  source {}",
            app.settings.refresh_interval.as_secs(),
            app.settings.api.shape.name()
        ),
        dim,
    ));

    if let Some(notice) = app.state.notice.as_deref() {
        spans.push(Span::styled(format!("  {notice}"), Style::default().fg(Color::Yellow)));
    } else if let Some(err) = refresh.error.as_deref() {
        spans.push(Span::styled(format!("  {err}"), Style::default().fg(Color::Red)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_target(false);
    f.render_widget(logs, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("  {key:<12}"), key_style),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(3), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cricket_api::{Score, Series, TeamRef};

    fn sample(payload: MatchPayload) -> Match {
        Match {
            id: "7".into(),
            team1: TeamRef::named("A"),
            team2: TeamRef::named("B"),
            match_type: "T20".into(),
            venue: "Oval".into(),
            series: None,
            payload,
        }
    }

    #[test]
    fn live_row_shows_score_and_run_rate() {
        let m = sample(MatchPayload::Live {
            current_score: Score { runs: 120, wickets: 3, overs: 15.2 },
        });
        assert_eq!(status_text(&m), "120/3 (15.2 ov)  RR 7.83");
    }

    #[test]
    fn upcoming_row_shows_schedule() {
        let m = sample(MatchPayload::Upcoming {
            scheduled_date: "TBA".into(),
            scheduled_time: "TBA".into(),
        });
        assert_eq!(status_text(&m), "TBA TBA");
    }

    #[test]
    fn result_prefers_vendor_summary() {
        let mut result = MatchResult {
            winner: "India".into(),
            margin: Some("5 wkts".into()),
            summary: None,
        };
        assert_eq!(result_text(&result), "India won by 5 wkts");

        result.margin = None;
        assert_eq!(result_text(&result), "Winner: India");

        result.summary = Some("Match drawn".into());
        assert_eq!(result_text(&result), "Match drawn");
    }

    #[test]
    fn where_line_includes_series() {
        let mut m = sample(MatchPayload::Live { current_score: Score::default() });
        assert_eq!(where_text(&m), "Oval");
        m.series = Some(Series { name: "IPL".into(), season: "2024".into() });
        assert_eq!(where_text(&m), "Oval  |  IPL 2024");
    }

    #[test]
    fn age_is_coarse() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let after = |secs| at + chrono::Duration::seconds(secs);
        assert_eq!(format_age(at, after(2)), "just now");
        assert_eq!(format_age(at, after(42)), "42s ago");
        assert_eq!(format_age(at, after(185)), "3m ago");
        assert_eq!(format_age(at, after(7300)), "2h ago");
        assert_eq!(format_age(at, at - chrono::Duration::seconds(10)), "just now");
    }

    #[test]
    fn detail_lists_performers_and_wickets() {
        let mut detail = MatchDetail { id: "7".into(), ..Default::default() };
        detail.current_innings.batting_team = "A".into();
        detail.current_innings.bowling_team = "B".into();
        detail.top_performers.batsmen.push(cricket_api::BatterLine {
            name: "Batsman".into(),
            runs: 50,
            balls: 40,
            strike_rate: 125.0,
            ..Default::default()
        });
        detail.current_innings.fall_of_wickets.push(cricket_api::FallOfWicket {
            batter: "X".into(),
            score: 30,
            over: 4.3,
        });

        let text: Vec<String> = detail_lines(&detail).iter().map(|l| l.to_string()).collect();
        assert_eq!(text[0], "A batting, B bowling");
        assert!(text.iter().any(|l| l.contains("Batsman") && l.contains("SR 125.00")));
        assert_eq!(text.last().map(String::as_str), Some("  30 (X, 4.3 ov)"));
    }
}
