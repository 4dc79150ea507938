use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const SCORE_BANDS: usize = 5;
const BAND_LABELS: [&str; SCORE_BANDS] = ["0-19", "20-39", "40-59", "60-79", "80+"];
const MAX_ERRORS_KEPT: usize = 10;

/// Shared counters for the bulk run, read by the dashboard while the
/// sequential grading loop writes them.
pub struct AuditStats {
    pub processed: Arc<AtomicUsize>,
    pub failed: Arc<AtomicUsize>,
    pub errors: Arc<Mutex<VecDeque<String>>>,
    pub score_bands: Arc<Mutex<[u64; SCORE_BANDS]>>,
    pub current: Arc<Mutex<String>>,
    pub start_time: Instant,
    pub should_stop: Arc<AtomicBool>,
}

impl AuditStats {
    pub fn new() -> Self {
        Self {
            processed: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_ERRORS_KEPT))),
            score_bands: Arc::new(Mutex::new([0; SCORE_BANDS])),
            current: Arc::new(Mutex::new(String::new())),
            start_time: Instant::now(),
            should_stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn add_error(&self, error: String) {
        let mut errors = self.errors.lock().unwrap();
        if errors.len() >= MAX_ERRORS_KEPT {
            errors.pop_front();
        }
        errors.push_back(error);
    }

    pub fn record_score(&self, score: u8) {
        let band = (score as usize / 20).min(SCORE_BANDS - 1);
        self.score_bands.lock().unwrap()[band] += 1;
    }

    pub fn set_current(&self, website: &str) {
        let mut current = self.current.lock().unwrap();
        current.clear();
        current.push_str(website);
    }

    pub fn should_stop(&self) -> bool {
        self.should_stop.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.should_stop.store(true, Ordering::Relaxed);
    }
}

pub async fn run_ui(stats: Arc<AuditStats>, total: usize) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_ui_loop(&mut terminal, stats.clone(), total).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    stats: Arc<AuditStats>,
    total: usize,
) -> io::Result<()> {
    let mut animation_frame = 0u8;
    let spinner_frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

    loop {
        let processed = stats.processed.load(Ordering::Relaxed);
        let failed = stats.failed.load(Ordering::Relaxed);
        let elapsed = stats.start_time.elapsed();

        animation_frame = (animation_frame + 1) % (spinner_frames.len() as u8);
        let spinner = spinner_frames[animation_frame as usize];

        terminal.draw(|f| {
            // 2x2 grid layout
            let vertical_chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(f.area());

            let top_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(vertical_chunks[0]);

            let bottom_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(vertical_chunks[1]);

            // Top-left: run info
            let elapsed_secs = elapsed.as_secs();
            let minutes = elapsed_secs / 60;
            let seconds = elapsed_secs % 60;
            let rate = if elapsed_secs > 0 {
                processed as f64 / elapsed_secs as f64
            } else {
                0.0
            };
            let current = stats.current.lock().unwrap().clone();

            let failed_status = if failed > 0 {
                Span::styled(
                    format!("{}", failed),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled("0", Style::default().fg(Color::Green))
            };

            let run_info = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled("  ", Style::default()),
                    Span::styled(
                        format!("{} ", spinner),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        "sitegrade bulk check",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from("  ─────────────────"),
                Line::from(vec![
                    Span::styled("  Elapsed  : ", Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!("{:02}:{:02}", minutes, seconds),
                        Style::default().fg(Color::White),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("  Rate     : ", Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!("{:.2} sites/s", rate),
                        Style::default().fg(Color::White),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("  Failed   : ", Style::default().fg(Color::Cyan)),
                    failed_status,
                ]),
                Line::from(vec![
                    Span::styled("  Checking : ", Style::default().fg(Color::Cyan)),
                    Span::styled(current, Style::default().fg(Color::White)),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "  press q to stop after the current site",
                    Style::default().fg(Color::DarkGray),
                )),
            ];

            let run_block =
                Paragraph::new(run_info).block(Block::default().borders(Borders::ALL).title("Run"));
            f.render_widget(run_block, top_chunks[0]);

            // Top-right: recent errors
            let errors = stats.errors.lock().unwrap();
            let max_errors = 8usize;
            let mut error_lines: Vec<Line> = errors
                .iter()
                .rev()
                .take(max_errors)
                .map(|msg| Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Red))))
                .collect();
            error_lines.reverse();
            if error_lines.is_empty() {
                error_lines.push(Line::from(Span::styled(
                    "No errors",
                    Style::default().fg(Color::Green),
                )));
            }

            let error_block = Paragraph::new(error_lines)
                .block(Block::default().borders(Borders::ALL).title("Errors"));
            f.render_widget(error_block, top_chunks[1]);

            // Bottom-left: progress
            let progress_pct = if total > 0 {
                ((processed as f64 / total as f64) * 100.0).min(100.0)
            } else {
                100.0
            };

            let progress_info = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled("  ", Style::default()),
                    Span::styled(
                        format!("{}", processed),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(" / ", Style::default().fg(Color::White)),
                    Span::styled(format!("{}", total), Style::default().fg(Color::White)),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  ", Style::default()),
                    Span::styled(
                        format!("{:.1}%", progress_pct),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(" Complete", Style::default().fg(Color::White)),
                ]),
            ];

            let progress_block = Paragraph::new(progress_info)
                .block(Block::default().borders(Borders::ALL).title("Progress"));
            f.render_widget(progress_block, bottom_chunks[0]);

            // Bottom-right: score histogram
            let bands = stats.score_bands.lock().unwrap();
            let bars: Vec<Bar> = BAND_LABELS
                .iter()
                .zip(bands.iter())
                .map(|(label, count)| {
                    Bar::default()
                        .label(Line::from(*label))
                        .value(*count)
                        .style(Style::default().fg(Color::Cyan))
                })
                .collect();

            let histogram = BarChart::default()
                .block(Block::default().borders(Borders::ALL).title("Scores"))
                .bar_width(7)
                .bar_gap(1)
                .data(BarGroup::default().bars(&bars));
            f.render_widget(histogram, bottom_chunks[1]);
        })?;

        // Check for key press
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && let KeyCode::Char('q') = key.code
        {
            stats.stop();
            break;
        }

        // Check if done
        if processed >= total {
            tokio::time::sleep(Duration::from_secs(2)).await;
            break;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_log_is_bounded() {
        let stats = AuditStats::new();
        for i in 0..25 {
            stats.add_error(format!("error {}", i));
        }
        let errors = stats.errors.lock().unwrap();
        assert_eq!(errors.len(), MAX_ERRORS_KEPT);
        assert_eq!(errors.back().unwrap(), "error 24");
    }

    #[test]
    fn scores_land_in_the_right_band() {
        let stats = AuditStats::new();
        stats.record_score(0);
        stats.record_score(19);
        stats.record_score(20);
        stats.record_score(79);
        stats.record_score(80);
        stats.record_score(100);
        let bands = stats.score_bands.lock().unwrap();
        assert_eq!(*bands, [2, 1, 0, 1, 2]);
    }

    #[test]
    fn stop_flag_round_trips() {
        let stats = AuditStats::new();
        assert!(!stats.should_stop());
        stats.stop();
        assert!(stats.should_stop());
    }
}
