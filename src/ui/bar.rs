//! Terminal user interface for the press-and-hold recording bar.
//!
//! Translates terminal mouse/keyboard events into session calls and renders
//! the bar, the amplitude indicator, the slide-to-lock column, and the
//! discard confirmation prompt. All drawing is driven by the frame clock; the
//! session itself never touches the terminal.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Clear, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crate::recordbar::{
    geom, BarLayout, FilterDecision, FilterKey, Point, RecordBar, SessionState,
};

/// Inactive button/indicator tint.
const COLOR_INACTIVE: Color = Color::Rgb(110, 110, 110);
/// Active (release-would-send) tint.
const COLOR_ACTIVE: Color = Color::Rgb(211, 47, 47);
const COLOR_TEXT: Color = Color::Rgb(206, 224, 220);
const COLOR_BG: Color = Color::Rgb(0, 0, 0);

/// What the host loop should do after an input batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Continue,
    Quit,
}

/// Terminal UI for the recording bar.
pub struct RecordBarTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    poll_timeout: Duration,
}

impl RecordBarTui {
    /// Creates the TUI, entering alternate screen mode with mouse capture.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(tick_ms: u64) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(RecordBarTui {
            terminal,
            poll_timeout: Duration::from_millis(tick_ms),
        })
    }

    /// Recomputes the bar geometry from the current terminal size and hands
    /// it to the session. Called every frame so resizes take effect.
    ///
    /// # Errors
    /// - If the terminal size cannot be queried
    pub fn update_layout(&mut self, bar: &mut RecordBar) -> anyhow::Result<()> {
        let size = self.terminal.size()?;
        bar.set_layout(Self::layout_for(size.width, size.height));
        Ok(())
    }

    /// Bar geometry for a terminal of the given size: the bar spans the
    /// bottom rows, the level indicator sits near its right edge, and the
    /// lock column rises from the bar toward the top of the screen.
    fn layout_for(width: u16, height: u16) -> BarLayout {
        let bar_y = height.saturating_sub(4) as i32;
        BarLayout {
            bar: geom::Rect {
                x: 0,
                y: bar_y,
                w: width as i32,
                h: 3,
            },
            level_center: Point {
                x: width.saturating_sub(8) as i32,
                y: bar_y + 1,
            },
            lock_height: (bar_y - 2).clamp(4, 10),
        }
    }

    /// Waits up to one tick for input and routes it to the session.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, bar: &mut RecordBar, now: Instant) -> anyhow::Result<UiCommand> {
        if !event::poll(self.poll_timeout)? {
            return Ok(UiCommand::Continue);
        }
        match event::read()? {
            Event::Key(key) => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    tracing::debug!("Ctrl+C pressed: quitting");
                    bar.stop(false, now);
                    bar.finish_animating();
                    bar.tick(now);
                    return Ok(UiCommand::Quit);
                }
                if bar.prompt_open() {
                    match key.code {
                        KeyCode::Enter | KeyCode::Char('y') => bar.confirm_discard(now),
                        KeyCode::Esc | KeyCode::Char('n') => bar.dismiss_prompt(),
                        _ => {}
                    }
                    return Ok(UiCommand::Continue);
                }
                if bar.is_locked() {
                    let filter_key = match key.code {
                        KeyCode::Enter => FilterKey::Enter,
                        KeyCode::Esc => FilterKey::Escape,
                        _ => FilterKey::Other,
                    };
                    let decision = bar.on_key(filter_key, now);
                    if decision == FilterDecision::Continue && key.code == KeyCode::Esc {
                        // The escape-override released the key back to us
                        bar.stop(false, now);
                        bar.finish_animating();
                        bar.tick(now);
                        return Ok(UiCommand::Quit);
                    }
                    return Ok(UiCommand::Continue);
                }
                if bar.state() == SessionState::Idle {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        return Ok(UiCommand::Quit);
                    }
                }
                // Keys during an unlocked hold are ignored; the gesture owns input
            }
            Event::Mouse(mouse) => {
                let p = Point {
                    x: mouse.column as i32,
                    y: mouse.row as i32,
                };
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        if bar.prompt_open() {
                            // Prompt is keyboard-driven; swallow clicks
                        } else if bar.state() == SessionState::Idle {
                            if bar.level_hit(p) {
                                bar.start_recording(now);
                            }
                        } else {
                            bar.on_pointer_press(p, now);
                        }
                    }
                    MouseEventKind::Down(MouseButton::Right) => {
                        bar.on_dismissive_input();
                    }
                    MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                        bar.on_pointer_move(p, now);
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        bar.on_pointer_release(now);
                    }
                    _ => {}
                }
            }
            Event::FocusLost => bar.on_window_leave(now),
            _ => {}
        }
        Ok(UiCommand::Continue)
    }

    /// Renders one frame of the recording bar.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(
        &mut self,
        bar: &RecordBar,
        now: Instant,
        status_line: &str,
    ) -> anyhow::Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(
                Block::default().style(Style::default().bg(COLOR_BG)),
                area,
            );
            if area.width < 30 || area.height < 8 {
                let notice = Paragraph::new("Terminal too small")
                    .style(Style::default().fg(COLOR_TEXT).bg(COLOR_BG))
                    .alignment(Alignment::Center);
                frame.render_widget(notice, area);
                return;
            }

            draw_status(frame, area, status_line);
            draw_bar_row(frame, area, bar, now);
            draw_lock_column(frame, area, bar, now);
            draw_level_indicator(frame, area, bar, now);
            if bar.prompt_open() {
                draw_discard_prompt(frame, area);
            }
        })?;
        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for RecordBarTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Linear blend between two RGB colors.
fn blend(a: Color, b: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let (Color::Rgb(ar, ag, ab), Color::Rgb(br, bg, bb)) = (a, b) else {
        return if t < 0.5 { a } else { b };
    };
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Color::Rgb(mix(ar, br), mix(ag, bg), mix(ab, bb))
}

fn draw_status(frame: &mut Frame, area: Rect, status_line: &str) {
    let status = Paragraph::new(status_line)
        .style(Style::default().fg(COLOR_TEXT).bg(COLOR_BG))
        .alignment(Alignment::Left);
    let top = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(status, top);
}

fn draw_bar_row(frame: &mut Frame, area: Rect, bar: &RecordBar, now: Instant) {
    let layout = *bar.layout();
    let row_y = (layout.bar.y + 1) as u16;
    if row_y >= area.height {
        return;
    }
    let row = Rect {
        x: area.x,
        y: row_y,
        width: area.width,
        height: 1,
    };

    let show = bar.show_ratio(now);
    if show == 0.0 {
        let hint = Paragraph::new("Click and hold the mic to record · q quits")
            .style(Style::default().fg(COLOR_INACTIVE).bg(COLOR_BG))
            .alignment(Alignment::Left);
        frame.render_widget(hint, row);
        return;
    }

    // Red dot pulsing with the capture updates, then the running duration
    let pulse = bar.pulse_ratio(now);
    let dot_color = blend(Color::Rgb(90, 20, 20), COLOR_ACTIVE, pulse.max(0.3));
    let message = if bar.is_locked() {
        format!("{} · Enter sends", bar.cancel_message())
    } else {
        bar.cancel_message().to_string()
    };
    let line = Line::from(vec![
        Span::styled("● ", Style::default().fg(dot_color)),
        Span::styled(bar.duration_text(), Style::default().fg(COLOR_TEXT)),
        Span::raw("   "),
        Span::styled(message, Style::default().fg(COLOR_INACTIVE)),
    ]);
    // The bar slides in from the right as the show animation runs
    let offset = ((1.0 - show) * 6.0).round() as u16;
    let slid = Rect {
        x: (row.x + offset).min(area.width.saturating_sub(1)),
        y: row.y,
        width: row.width.saturating_sub(offset),
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(COLOR_BG)),
        slid,
    );
}

fn draw_level_indicator(frame: &mut Frame, area: Rect, bar: &RecordBar, now: Instant) {
    let center = bar.layout().level_center;
    let show = bar.level().show_progress();
    let base = bar.level().radius() as f64;
    // Idle shows the resting button; a live session grows with the amplitude
    // once the smoothing driver is running
    let level_ratio = if bar.level().is_driving() {
        bar.level().level_ratio(now)
    } else {
        0.0
    };
    let radius = if show == 0.0 {
        1.0
    } else {
        base * show * (0.6 + 0.4 * level_ratio)
    };
    let color = if show == 0.0 {
        COLOR_INACTIVE
    } else {
        blend(COLOR_INACTIVE, COLOR_ACTIVE, bar.level().color_progress())
    };

    let buf = frame.buffer_mut();
    let r = radius.ceil() as i32;
    for dy in -r..=r {
        // Cells are about twice as tall as wide
        for dx in -(2 * r)..=(2 * r) {
            let fx = dx as f64 / 2.0;
            let fy = dy as f64;
            if fx * fx + fy * fy > radius * radius {
                continue;
            }
            let x = center.x + dx;
            let y = center.y + dy;
            if x < 0 || y < 0 || x >= area.width as i32 || y >= area.height as i32 {
                continue;
            }
            buf.set_string(x as u16, y as u16, " ", Style::default().bg(color));
        }
    }
    if center.x >= 0
        && center.y >= 0
        && center.x < area.width as i32
        && center.y < area.height as i32
    {
        buf.set_string(
            center.x as u16,
            center.y as u16,
            "●",
            Style::default().fg(Color::White).bg(color),
        );
    }
}

fn draw_lock_column(frame: &mut Frame, area: Rect, bar: &RecordBar, now: Instant) {
    let reveal = bar.lock_show_ratio(now);
    if bar.lock().is_hidden() || reveal == 0.0 {
        return;
    }
    let layout = *bar.layout();
    let x = layout.level_center.x;
    if x < 0 || x >= area.width as i32 {
        return;
    }
    let shown_rows = (layout.lock_height as f64 * reveal).round() as i32;
    let progress = bar.lock().progress();
    let reached = (progress * layout.lock_height as f64).round() as i32;

    let buf = frame.buffer_mut();
    for i in 0..shown_rows {
        let y = layout.bar.y - 1 - i;
        if y < 0 || y >= area.height as i32 {
            continue;
        }
        let at_top = i == layout.lock_height - 1;
        let (glyph, style) = if at_top && bar.is_locked() {
            // The glyph settles into its locked tint as the slide completes
            let tint = blend(COLOR_TEXT, COLOR_ACTIVE, bar.lock().locked_slide_ratio(now));
            ("◆", Style::default().fg(tint))
        } else if at_top {
            ("◇", Style::default().fg(COLOR_TEXT))
        } else if i < reached {
            ("│", Style::default().fg(COLOR_TEXT))
        } else {
            ("┊", Style::default().fg(COLOR_INACTIVE))
        };
        buf.set_string(x as u16, y as u16, glyph, style.bg(COLOR_BG));
    }
}

fn draw_discard_prompt(frame: &mut Frame, area: Rect) {
    let width = 44.min(area.width.saturating_sub(4));
    let height = 5;
    let prompt_area = Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, prompt_area);
    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            "y/Enter discards · n/Esc keeps recording",
            Style::default().fg(COLOR_TEXT),
        )),
    ]);
    let prompt = Paragraph::new(text)
        .block(
            Block::bordered()
                .title("Discard recording?")
                .style(Style::default().fg(COLOR_ACTIVE).bg(COLOR_BG)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(prompt, prompt_area);
}
