//! Core TUI application state and event loop.

use std::io;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use waymark_core::popup::popup_for;
use waymark_core::scroll_spy::visible_rects;
use waymark_core::{
    CameraController, FocusOutcome, Marker, RouteLayout, ScrollSpy, build_route, project_markers,
};
use waymark_shared::{CameraConfig, ScrollSpyConfig, Trip};

use crate::screens::itinerary::ItineraryPane;
use crate::screens::map::{self, CanvasCamera, MapScene};
use crate::widgets::status_bar;

/// Frame interval while something is moving.
const ANIMATION_TICK: Duration = Duration::from_millis(16);
/// Poll interval when idle.
const IDLE_TICK: Duration = Duration::from_millis(100);
const WHEEL_ROWS: f64 = 3.0;

/// Application state.
pub(crate) struct App<'t> {
    trip: &'t Trip,
    markers: Vec<Marker<'t>>,
    route: RouteLayout,
    itinerary: ItineraryPane,
    spy: ScrollSpy,
    camera: CameraController<CanvasCamera>,
    excerpt_chars: usize,
    /// Itinerary pane area at the last draw, for mouse hit-testing.
    list_area: Rect,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
}

impl<'t> App<'t> {
    pub(crate) fn new(
        trip: &'t Trip,
        spy_config: ScrollSpyConfig,
        camera_config: CameraConfig,
        excerpt_chars: usize,
    ) -> Self {
        let markers = project_markers(&trip.steps);
        let route = build_route(&markers);
        let mut camera = CameraController::new(CanvasCamera::new(), camera_config);
        camera.place_initial(&markers);

        let status = if markers.is_empty() {
            "No step has a location; the map stays on the world view".to_string()
        } else {
            "Ready, press ? for help".to_string()
        };

        Self {
            trip,
            spy: ScrollSpy::new(trip.steps.len(), spy_config),
            markers,
            route,
            itinerary: ItineraryPane::new(),
            camera,
            excerpt_chars,
            list_area: Rect::default(),
            should_quit: false,
            status,
            show_help: false,
        }
    }

    /// One frame of controller work: advance the smooth scroll, feed the
    /// visible cards to the scroll-spy, then let the camera follow.
    /// Returns `true` while anything is still animating.
    pub(crate) fn update(&mut self, now: Instant) -> bool {
        let scrolling = self.itinerary.animate();

        let viewport = self.itinerary.viewport();
        let visible = visible_rects(&self.itinerary.rects(), &viewport);
        self.spy.observe(&visible, viewport, now);

        let active = self.spy.active();
        if self.camera.focus(active, &self.markers, now) == FocusOutcome::Moved {
            if let Some(step) = active.and_then(|i| self.trip.steps.get(i)) {
                self.status = format!("Focused {}", step.name);
            }
        }

        scrolling || self.camera.map().is_animating(now) || self.spy.is_pinned(now)
    }

    /// Activate a step as if its card was clicked.
    fn click(&mut self, index: usize, now: Instant) {
        if let Some(request) = self.spy.click(index, now) {
            self.itinerary.selected = request.index;
            self.itinerary.scroll_into_view(request.index);
        }
    }

    fn select_next(&mut self) {
        let count = self.trip.steps.len();
        if count > 0 {
            self.itinerary.selected = (self.itinerary.selected + 1) % count;
        }
    }

    fn select_previous(&mut self) {
        let count = self.trip.steps.len();
        if count > 0 {
            self.itinerary.selected = self.itinerary.selected.checked_sub(1).unwrap_or(count - 1);
        }
    }
}

/// Set up the terminal, run the event loop, restore the terminal.
pub(crate) fn run(app: App<'_>) -> Result<()> {
    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App<'_>) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, &mut app))?;
        let animating = app.update(Instant::now());

        let timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut app, key.code, key.modifiers),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App<'_>, code: KeyCode, modifiers: KeyModifiers) {
    let now = Instant::now();

    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            app.show_help = !app.show_help;
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    match code {
        KeyCode::Down | KeyCode::Char('j') => app.itinerary.scroll_by(1.0),
        KeyCode::Up | KeyCode::Char('k') => app.itinerary.scroll_by(-1.0),
        KeyCode::PageDown | KeyCode::Char(' ') => {
            let page = app.itinerary.page();
            app.itinerary.scroll_by(page);
        }
        KeyCode::PageUp => {
            let page = app.itinerary.page();
            app.itinerary.scroll_by(-page);
        }
        KeyCode::Home => app.itinerary.scroll_to_top(),
        KeyCode::End => app.itinerary.scroll_to_bottom(),
        KeyCode::Tab => app.select_next(),
        KeyCode::BackTab => app.select_previous(),
        KeyCode::Enter => {
            let index = app.itinerary.selected;
            app.click(index, now);
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            if index < app.trip.steps.len() {
                app.click(index, now);
            } else {
                app.status = format!("No step {}", index + 1);
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App<'_>, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.itinerary.scroll_by(WHEEL_ROWS),
        MouseEventKind::ScrollUp => app.itinerary.scroll_by(-WHEEL_ROWS),
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(index) = app.itinerary.card_at(app.list_area, mouse.column, mouse.row) {
                app.click(index, Instant::now());
            }
        }
        _ => {}
    }
}

fn draw(f: &mut Frame, app: &mut App<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Panes
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    let now = Instant::now();
    let active = app.spy.active();
    let pinned = app.spy.is_pinned(now);

    app.list_area = panes[0];
    app.itinerary.resize(&app.trip.steps, panes[0]);
    app.itinerary.draw(f, panes[0], &app.trip.steps, active, pinned);

    let popup = active
        .and_then(|i| app.trip.steps.get(i))
        .filter(|step| step.location.is_some())
        .map(|step| popup_for(step, app.trip.country_name(), app.excerpt_chars));
    let scene = MapScene {
        title: &app.trip.title,
        markers: &app.markers,
        route: &app.route,
        active,
        popup: popup.as_ref(),
    };
    map::draw(f, panes[1], app.camera.map(), &scene);

    let bar = status_bar(&app.status, active.and_then(|i| app.trip.steps.get(i)), pinned);
    f.render_widget(bar, rows[1]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  ↑/↓ j/k      Scroll the itinerary"),
        Line::from("  PgUp/PgDn    Scroll a page"),
        Line::from("  Home/End     Jump to first / last step"),
        Line::from("  Tab/S-Tab    Move the selection"),
        Line::from("  Enter        Focus the selected step"),
        Line::from("  1-9          Focus step by number"),
        Line::from("  Mouse        Wheel scrolls, click focuses"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("A focused step stays active for a moment while the list scrolls to it."),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help: press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use waymark_shared::{ConnectionType, Coordinate, ItineraryStep, StepId, StepKind};

    fn trip() -> Trip {
        let steps = (0..8)
            .map(|i| ItineraryStep {
                id: StepId(format!("s{i}")),
                name: format!("Stop {i}"),
                description: None,
                location: Some(Coordinate::new(40.0 + f64::from(i), 70.0 + f64::from(i))),
                gallery: vec![],
                activities: None,
                region: None,
                kind: StepKind::Waypoint {
                    connection: ConnectionType::Route,
                },
            })
            .collect();
        Trip {
            id: None,
            title: "Test".into(),
            slug: None,
            country: None,
            start_date: None,
            end_date: None,
            steps,
        }
    }

    fn app(trip: &Trip) -> App<'_> {
        let spy = ScrollSpyConfig {
            top_snap: 2.0,
            ..ScrollSpyConfig::default()
        };
        App::new(trip, spy, CameraConfig::default(), 120)
    }

    fn render(app: &mut App<'_>) {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).expect("terminal");
        terminal.draw(|f| draw(f, app)).expect("draw");
    }

    #[test]
    fn first_frame_activates_first_step() {
        let trip = trip();
        let mut app = app(&trip);
        render(&mut app);
        app.update(Instant::now());
        assert_eq!(app.spy.active(), Some(0));
    }

    #[test]
    fn number_key_pins_step_and_scrolls_toward_it() {
        let trip = trip();
        let mut app = app(&trip);
        render(&mut app);
        app.update(Instant::now());

        handle_key(&mut app, KeyCode::Char('6'), KeyModifiers::NONE);
        assert_eq!(app.spy.active(), Some(5));
        assert_eq!(app.itinerary.selected, 5);

        // Frames during the smooth scroll keep the clicked step.
        for _ in 0..5 {
            app.update(Instant::now());
            assert_eq!(app.spy.active(), Some(5));
        }
        assert!(app.itinerary.viewport().scroll_y > 0.0);
    }

    #[test]
    fn tab_wraps_selection() {
        let trip = trip();
        let mut app = app(&trip);
        handle_key(&mut app, KeyCode::BackTab, KeyModifiers::NONE);
        assert_eq!(app.itinerary.selected, 7);
        handle_key(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.itinerary.selected, 0);
    }

    #[test]
    fn help_swallows_next_key() {
        let trip = trip();
        let mut app = app(&trip);
        handle_key(&mut app, KeyCode::Char('?'), KeyModifiers::NONE);
        assert!(app.show_help);
        handle_key(&mut app, KeyCode::Char('3'), KeyModifiers::NONE);
        assert!(!app.show_help);
        assert_eq!(app.spy.active(), None);
    }

    #[test]
    fn quit_keys() {
        let trip = trip();
        let mut app = app(&trip);
        handle_key(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
