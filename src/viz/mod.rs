//! Terminal chart for interactive playback
//!
//! Draws the dataset as a bar chart whose focused bar follows playback, with
//! a status line for the transport state and the latest announcement. The
//! chart is both the focus target and the announcer of the controller it
//! drives.

mod chart;

pub use chart::BarChart;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::data::VisualHandle;
use crate::playback::{
    Announcer, FocusTarget, NavigationKey, PlaybackController, PlaybackMode, PlaybackState,
};

const SPEED_STEP: f64 = 0.25;

/// What the chart shows
pub struct ChartState {
    pub title: String,
    /// One bar per point; `None` for points without a numeric value
    pub values: Vec<Option<f64>>,
    pub focused: Option<usize>,
    pub announcement: String,
    running: Arc<AtomicBool>,
}

impl ChartState {
    pub fn new(title: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            title: title.into(),
            values,
            focused: None,
            announcement: String::new(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

pub type SharedChart = Arc<Mutex<ChartState>>;

fn lock(chart: &SharedChart) -> MutexGuard<'_, ChartState> {
    chart.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Focus target that highlights a bar
pub struct ChartFocus(pub SharedChart);

impl FocusTarget for ChartFocus {
    fn highlight(&self, handle: Option<VisualHandle>) {
        lock(&self.0).focused = handle.map(|h| h.0);
    }
}

/// Announcer that shows the message in the status line
pub struct ChartAnnouncer(pub SharedChart);

impl Announcer for ChartAnnouncer {
    fn announce(&self, message: &str) {
        log::debug!("announce: {}", message);
        lock(&self.0).announcement = message.to_string();
    }
}

/// Run the interactive chart until `q` or ctrl-c
pub async fn run_chart(controller: PlaybackController, chart: SharedChart) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &controller, &chart).await;

    controller.destroy();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    controller: &PlaybackController,
    chart: &SharedChart,
) -> Result<()> {
    while lock(chart).is_running() {
        render_frame(terminal, controller, chart)?;

        // Non-blocking poll so playback timers keep running on this runtime
        if !event::poll(Duration::ZERO)? {
            tokio::time::sleep(Duration::from_millis(30)).await;
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                lock(chart).stop();
            }
            (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
                controller.set_speed(controller.speed() + SPEED_STEP);
            }
            (KeyCode::Char('-'), _) => {
                controller.set_speed(controller.speed() - SPEED_STEP);
            }
            (KeyCode::Char('m'), _) => {
                let mode = match controller.mode() {
                    PlaybackMode::Discrete => PlaybackMode::Continuous,
                    PlaybackMode::Continuous => PlaybackMode::Discrete,
                };
                controller.set_mode(mode);
            }
            (code, _) => {
                if let Ok(key) = NavigationKey::try_from(code) {
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        if let Err(e) = controller.handle_key(key).await {
                            log::error!("Playback failed: {}", e);
                        }
                    });
                }
            }
        }
    }
    Ok(())
}

/// Transport state captured before the chart is locked
struct Status {
    state: PlaybackState,
    len: usize,
}

/// Draw one frame.
///
/// The controller holds its own lock while it announces and focuses through
/// the chart, so the controller is read first and the chart lock is never
/// held across a controller call.
fn render_frame<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &PlaybackController,
    chart: &SharedChart,
) -> Result<()> {
    let status = Status {
        state: controller.state(),
        len: controller.len(),
    };
    terminal.draw(|f| draw_ui(f, &lock(chart), &status))?;
    Ok(())
}

fn draw_ui(f: &mut Frame, chart: &ChartState, status: &Status) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Chart
            Constraint::Length(4), // Announcement
            Constraint::Length(3), // Status
        ])
        .split(area);

    draw_chart(f, chunks[0], chart);
    draw_announcement(f, chunks[1], chart);
    draw_status(f, chunks[2], status);
}

fn draw_chart(f: &mut Frame, area: Rect, chart: &ChartState) {
    let widget = BarChart::new(&chart.values)
        .focused(chart.focused)
        .style(Style::default().fg(Color::Cyan))
        .focus_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", chart.title)),
        );

    f.render_widget(widget, area);
}

fn draw_announcement(f: &mut Frame, area: Rect, chart: &ChartState) {
    let paragraph = Paragraph::new(chart.announcement.as_str())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_status(f: &mut Frame, area: Rect, status: &Status) {
    let state = status.state;
    let status_color = if state.playing {
        Color::Green
    } else if state.paused {
        Color::Yellow
    } else {
        Color::Gray
    };
    let position = if state.index >= 0 {
        format!("{}/{}", state.index + 1, status.len)
    } else {
        format!("-/{}", status.len)
    };

    let text = Line::from(vec![
        Span::raw(" "),
        Span::styled(state.label().to_uppercase(), Style::default().fg(status_color)),
        Span::raw(format!("  {}  {}  x{:.2}  |  ", position, state.mode, state.speed)),
        Span::raw("Space: play/pause  ←/→: step  Home/End  Esc: stop  m: mode  +/-: speed  q: quit"),
    ]);

    let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> SharedChart {
        Arc::new(Mutex::new(ChartState::new("test", vec![Some(1.0), Some(2.0)])))
    }

    #[test]
    fn test_focus_moves_highlight() {
        let chart = shared();
        let focus = ChartFocus(Arc::clone(&chart));

        focus.highlight(Some(VisualHandle(1)));
        assert_eq!(chart.lock().unwrap().focused, Some(1));

        focus.highlight(None);
        assert_eq!(chart.lock().unwrap().focused, None);
    }

    #[test]
    fn test_announcer_updates_status() {
        let chart = shared();
        ChartAnnouncer(Arc::clone(&chart)).announce("Point 1 of 2");
        assert_eq!(chart.lock().unwrap().announcement, "Point 1 of 2");
    }

    #[test]
    fn test_chart_state_running() {
        let state = ChartState::new("t", Vec::new());
        assert!(state.is_running());
        state.stop();
        assert!(!state.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_frames_keep_drawing_during_playback() {
        use crate::config::SonifyConfig;
        use crate::data::bind_values;
        use crate::playback::{Services, SilentRenderer};
        use ratatui::backend::TestBackend;

        let values: Vec<serde_json::Value> = (0..20).map(serde_json::Value::from).collect();
        let chart = Arc::new(Mutex::new(ChartState::new("t", vec![Some(1.0); 20])));
        let mut config = SonifyConfig::default();
        config.mode = PlaybackMode::Continuous;
        config.duration = crate::config::DurationConfig::Fixed(20.0);
        let services = Services::new(
            SilentRenderer,
            ChartAnnouncer(Arc::clone(&chart)),
            ChartFocus(Arc::clone(&chart)),
        );
        let controller = PlaybackController::new(bind_values(values), config, services);

        let player = controller.clone();
        tokio::spawn(async move { player.play().await });

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let drawing = async {
            for _ in 0..100 {
                render_frame(&mut terminal, &controller, &chart).unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), drawing)
            .await
            .expect("drawing stalled while playback was running");

        controller.destroy();
    }
}
