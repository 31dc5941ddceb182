mod app;

use std::{io, time::Duration};

use color_eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use tasklist_core::storage::KeyValueStore;
use tasklist_task::TaskStore;

use crate::display;
pub use app::{App, Mode};

/// Interactive task list. Press `q` or `Esc` to exit.
pub fn launch<S: KeyValueStore>(store: &mut TaskStore<S>, date_format: &str) -> Result<()> {
    // Guard restores the terminal even if we early-return.
    let guard = TerminalGuard::enter()?;
    let mut terminal = guard.terminal()?;
    let mut app = App::new();

    while !app.should_quit() {
        terminal.draw(|frame| draw(frame, &app, store, date_format))?;

        if event::poll(Duration::from_millis(150))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(store, key.code);
                }
            }
        }
    }

    Ok(())
}

/// Render the whole screen from the store's derived view and the app state.
pub fn draw<S: KeyValueStore>(frame: &mut Frame, app: &App, store: &TaskStore<S>, date_format: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(input_box(app), chunks[0]);

    let visible = store.visible_tasks();
    let dragging = match app.mode() {
        Mode::Dragging { source, target } => Some((*source, *target)),
        _ => None,
    };

    let mut items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(row, task)| {
            let mut text_style = if task.is_done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            if dragging.is_some_and(|(source, _)| source == task.id) {
                text_style = text_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
            }

            let mut line = vec![
                Span::styled(
                    display::done_marker(task.is_done),
                    Style::default().fg(if task.is_done {
                        Color::Green
                    } else {
                        Color::Gray
                    }),
                ),
                Span::raw(" "),
                Span::styled(task.value.as_str(), text_style),
            ];
            if store.show_dates() {
                line.push(Span::styled(
                    format!("  {}", display::format_date(task.created_date, date_format)),
                    Style::default().fg(Color::DarkGray),
                ));
            }

            let item = ListItem::new(Line::from(line));
            if dragging.is_some_and(|(_, target)| target == row) {
                item.style(Style::default().bg(Color::Blue))
            } else {
                item
            }
        })
        .collect();

    if let Some((_, target)) = dragging {
        let slot = ListItem::new(Line::from(Span::styled(
            "── drop at end ──",
            Style::default().fg(Color::DarkGray),
        )));
        items.push(if target == visible.len() {
            slot.style(Style::default().bg(Color::Blue))
        } else {
            slot
        });
    }

    let title = if store.filter_active_only() {
        "Tasks (active only)"
    } else {
        "Tasks (all)"
    };
    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    if empty {
        let hint = if store.tasks().is_empty() {
            "No tasks yet. Press a to add one."
        } else {
            "No active tasks."
        };
        frame.render_widget(
            Paragraph::new(hint).block(Block::default().borders(Borders::ALL).title(title)),
            chunks[1],
        );
    } else {
        let highlighted = match dragging {
            Some((_, target)) => target,
            None => app.selected(),
        };
        let mut state = ListState::default().with_selected(Some(highlighted));
        if dragging.is_some() {
            // Drop target is marked by its background instead.
            frame.render_stateful_widget(list.highlight_style(Style::default()), chunks[1], &mut state);
        } else {
            frame.render_stateful_widget(list, chunks[1], &mut state);
        }
    }

    frame.render_widget(footer(app, store.filter_active_only(), store.show_dates()), chunks[2]);
}

fn input_box(app: &App) -> Paragraph<'_> {
    let (text, style) = match app.mode() {
        Mode::Adding { input } => (format!("{input}▏"), Style::default().fg(Color::White)),
        _ => (
            "Press a to add a new task".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    Paragraph::new(Span::styled(text, style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(
                "New task",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
    )
}

fn footer(app: &App, filter_active_only: bool, show_dates: bool) -> Paragraph<'_> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));
    let line = if let Some(status) = app.status() {
        Line::from(Span::styled(status, Style::default().fg(Color::Red)))
    } else {
        match app.mode() {
            Mode::Adding { .. } => Line::from(vec![
                key("Enter"),
                Span::raw(" add  "),
                key("Esc"),
                Span::raw(" cancel"),
            ]),
            Mode::Dragging { .. } => Line::from(vec![
                key("↑/↓"),
                Span::raw(" choose spot  "),
                key("Enter"),
                Span::raw(" drop  "),
                key("Esc"),
                Span::raw(" cancel"),
            ]),
            Mode::Normal => Line::from(vec![
                key("a"),
                Span::raw(" add  "),
                key("space"),
                Span::raw(" done  "),
                key("d"),
                Span::raw(" delete  "),
                key("D"),
                Span::raw(" delete done  "),
                key("m"),
                Span::raw(" move  "),
                key("f"),
                Span::raw(if filter_active_only {
                    " show all  "
                } else {
                    " show active  "
                }),
                key("t"),
                Span::raw(if show_dates {
                    " hide dates  "
                } else {
                    " show dates  "
                }),
                key("q"),
                Span::raw(" quit"),
            ]),
        }
    };
    Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Controls"))
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; errors are reported but not propagated from Drop.
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}
