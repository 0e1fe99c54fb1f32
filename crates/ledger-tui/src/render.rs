//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame`, and never
//! mutate state or return effects.

use ledger_core::transcript::TranscriptLine;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::state::AppState;

/// Rows used by everything except the transcript body (borders, input, status).
pub const CHROME_HEIGHT: u16 = 4;

const INPUT_HEIGHT: u16 = 1;
const STATUS_HEIGHT: u16 = 1;
const PROMPT: &str = ">> ";
const TITLE: &str = " Ledger_AI.exe ";
const ACCENT: Color = Color::Rgb(0xE2, 0xC4, 0x00);
const HINTS: &str = "Enter send · PgUp/PgDn scroll · Ctrl+O open link · Esc quit";

/// Spinner frames for the status line.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_transcript(app, frame, chunks[0]);
    render_input(app, frame, chunks[1]);
    render_status(app, frame, chunks[2]);
}

fn render_transcript(app: &AppState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(TITLE, Style::default().fg(Color::Yellow)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = usize::from(inner.width.max(1));
    let height = usize::from(inner.height);

    let rows: Vec<Line<'static>> = app
        .session
        .transcript()
        .lines()
        .iter()
        .flat_map(|line| wrap_transcript_line(line, width))
        .collect();

    let visible = visible_window(rows.len(), height, app.scroll.from_bottom());
    let mut lines: Vec<Line<'static>> = rows
        .into_iter()
        .skip(visible.start)
        .take(visible.len())
        .collect();

    // Bottom-align when content doesn't fill the pane.
    if lines.len() < height {
        let mut padded = vec![Line::default(); height - lines.len()];
        padded.append(&mut lines);
        lines = padded;
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Row range to show for `total` rows in a `height`-row pane scrolled
/// `from_bottom` rows up (clamped to the top).
pub fn visible_window(total: usize, height: usize, from_bottom: usize) -> std::ops::Range<usize> {
    let max_offset = total.saturating_sub(height);
    let end = total - from_bottom.min(max_offset);
    end.saturating_sub(height)..end
}

fn wrap_transcript_line(line: &TranscriptLine, width: usize) -> Vec<Line<'static>> {
    match line {
        TranscriptLine::Text(text) => wrap_styled(text.chars().map(|c| (c, Style::default())), width),
        TranscriptLine::Link { label, url } => {
            let link = Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED);
            let label_chars = label.chars().map(|c| (c, Style::default()));
            let separator = (!label.is_empty()).then_some((' ', Style::default()));
            let url_chars = url.chars().map(move |c| (c, link));
            wrap_styled(label_chars.chain(separator).chain(url_chars), width)
        }
    }
}

/// Hard-wraps styled characters at `width` display columns, merging runs of
/// equal style into spans. An empty input yields one empty row.
pub fn wrap_styled(chars: impl IntoIterator<Item = (char, Style)>, width: usize) -> Vec<Line<'static>> {
    let mut rows: Vec<Vec<Span<'static>>> = vec![Vec::new()];
    let mut row_width = 0;
    let mut run = String::new();
    let mut run_style = Style::default();

    for (ch, style) in chars {
        let ch = if ch == '\t' { ' ' } else { ch };
        let w = ch.width().unwrap_or(0);
        if row_width + w > width && row_width > 0 {
            flush_run(&mut rows, &mut run, run_style);
            rows.push(Vec::new());
            row_width = 0;
        }
        if style != run_style {
            flush_run(&mut rows, &mut run, run_style);
        }
        run_style = style;
        run.push(ch);
        row_width += w;
    }
    flush_run(&mut rows, &mut run, run_style);

    rows.into_iter().map(Line::from).collect()
}

fn flush_run(rows: &mut [Vec<Span<'static>>], run: &mut String, style: Style) {
    if !run.is_empty()
        && let Some(row) = rows.last_mut()
    {
        row.push(Span::styled(std::mem::take(run), style));
    }
}

fn render_input(app: &AppState, frame: &mut Frame, area: Rect) {
    let text = app.input.text();
    let available = usize::from(area.width).saturating_sub(PROMPT.width() + 1);

    // Keep the cursor visible by scrolling the line horizontally.
    let before_cursor: String = text.chars().take(app.input.cursor()).collect();
    let mut skip = 0;
    while before_cursor.chars().skip(skip).collect::<String>().width() > available {
        skip += 1;
    }
    let shown: String = text.chars().skip(skip).collect();
    let cursor_x = before_cursor.chars().skip(skip).collect::<String>().width() + PROMPT.width();

    let line = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(ACCENT)),
        Span::raw(shown),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let x = area.x + u16::try_from(cursor_x).unwrap_or(area.width).min(area.width.saturating_sub(1));
    frame.set_cursor_position(Position::new(x, area.y));
}

fn render_status(app: &AppState, frame: &mut Frame, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::new();

    if app.session.in_flight().is_some() {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        spans.push(Span::styled(format!("{spinner} working"), Style::default().fg(ACCENT)));
    } else if app.session.is_typing() {
        spans.push(Span::styled("typing", Style::default().fg(ACCENT)));
    } else {
        spans.push(Span::styled("ready", dim));
    }

    if let Some(queued) = app.session.queued() {
        spans.push(Span::raw(" · "));
        spans.push(Span::styled(format!("queued: {queued}"), Style::default().fg(Color::Cyan)));
    }
    if let Some(notice) = &app.notice {
        spans.push(Span::raw(" · "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Red)));
    }

    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    let free = usize::from(area.width).saturating_sub(used);
    if free > HINTS.width() + 1 {
        spans.push(Span::raw(" ".repeat(free - HINTS.width())));
        spans.push(Span::styled(HINTS, dim));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use ledger_core::config::Config;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn row_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_wrap_plain_text() {
        let rows = wrap_styled("abcdefg".chars().map(|c| (c, Style::default())), 3);
        let texts: Vec<_> = rows.iter().map(row_text).collect();
        assert_eq!(texts, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_wrap_empty_line_keeps_a_row() {
        assert_eq!(wrap_styled(std::iter::empty(), 10).len(), 1);
    }

    #[test]
    fn test_wrap_counts_wide_chars() {
        let rows = wrap_styled("🔍ab".chars().map(|c| (c, Style::default())), 3);
        let texts: Vec<_> = rows.iter().map(row_text).collect();
        assert_eq!(texts, vec!["🔍a", "b"]);
    }

    #[test]
    fn test_link_line_styles_url() {
        let line = TranscriptLine::Link {
            label: "➜ Join us:".to_string(),
            url: "https://t.me/x".to_string(),
        };
        let rows = wrap_transcript_line(&line, 80);
        assert_eq!(rows.len(), 1);
        assert_eq!(row_text(&rows[0]), "➜ Join us: https://t.me/x");
        let url_span = rows[0].spans.last().unwrap();
        assert_eq!(url_span.content, "https://t.me/x");
        assert!(url_span.style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_visible_window() {
        assert_eq!(visible_window(5, 10, 0), 0..5);
        assert_eq!(visible_window(20, 10, 0), 10..20);
        assert_eq!(visible_window(20, 10, 3), 7..17);
        assert_eq!(visible_window(20, 10, 99), 0..10);
    }

    #[test]
    fn test_render_shows_greeting_and_prompt() {
        let app = AppState::new(&Config::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(screen.contains("Ledger_AI.exe"));
        assert!(screen.contains("Type 'help' to see available commands"));
        assert!(screen.contains(">>"));
        assert!(screen.contains("ready"));
    }
}
