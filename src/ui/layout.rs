use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const STATUS_HEIGHT: u16 = 1;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    pub logs: Option<Rect>,
    pub status: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let [body, status] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(STATUS_HEIGHT)]).areas(area);

        let (tab_bar, content) = if full_screen {
            ([Rect::ZERO, Rect::ZERO], body)
        } else {
            let [tab, content] =
                Layout::vertical([Constraint::Length(TAB_BAR_HEIGHT), Constraint::Fill(1)])
                    .areas(body);
            (Self::split_tab_bar(tab), content)
        };

        let (main, logs) = if show_logs {
            let [main, logs] =
                Layout::vertical([Constraint::Percentage(65), Constraint::Fill(1)])
                    .areas(content);
            (main, Some(logs))
        } else {
            (content, None)
        };

        LayoutAreas { tab_bar, main, logs, status }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_is_always_the_bottom_row() {
        let area = Rect::new(0, 0, 100, 40);
        for (full_screen, show_logs) in [(false, false), (true, false), (false, true)] {
            let layout = LayoutAreas::from_rect(area, full_screen, show_logs);
            assert_eq!(layout.status, Rect::new(0, 39, 100, 1));
        }
    }

    #[test]
    fn full_screen_hides_tabs_and_logs_split_main() {
        let area = Rect::new(0, 0, 100, 40);
        let full = LayoutAreas::from_rect(area, true, false);
        assert_eq!(full.tab_bar, [Rect::ZERO, Rect::ZERO]);
        assert_eq!(full.main.height, 39);

        let logs = LayoutAreas::from_rect(area, false, true);
        let pane = logs.logs.unwrap();
        assert_eq!(logs.main.y, TAB_BAR_HEIGHT);
        assert_eq!(logs.main.height + pane.height, 39 - TAB_BAR_HEIGHT);
    }
}
