use crate::application::{App, AppMode, FormField};
use crate::domain::{WorkoutDetails, WorkoutKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    render_map(f, app, body[0]);
    render_sidebar(f, app, body[1]);
    render_status_bar(f, app, chunks[2]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "twkt - Terminal Workout Tracker | {} workout{} logged",
        app.store.len(),
        if app.store.len() == 1 { "" } else { "s" }
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_map(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Map ({:.4}, {:.4}) zoom {}",
        app.map_center.lat, app.map_center.lon, app.map_zoom
    ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Input handling inverts clicks through the same viewport
    app.map_area = Some((inner.x, inner.y, inner.width, inner.height));
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let width = inner.width as usize;
    let height = inner.height as usize;
    let backdrop = (' ', Style::default());
    let mut grid = vec![vec![backdrop; width]; height];

    // Faint graticule so panning and zooming are visible
    for (row_idx, row) in grid.iter_mut().enumerate() {
        for (col_idx, cell) in row.iter_mut().enumerate() {
            if row_idx % 4 == 0 && col_idx % 8 == 0 {
                *cell = ('·', Style::default().fg(Color::DarkGray));
            }
        }
    }

    let selected_id = app
        .selected_index
        .and_then(|i| app.store.get(i))
        .map(|w| w.id.clone());

    let mut popup: Option<(u16, u16, String, Color)> = None;
    for workout in app.store.iter() {
        let Some((cx, cy)) = app.coords_to_map_cell(workout.coords) else {
            continue;
        };
        let color = match workout.kind() {
            WorkoutKind::Running => Color::Green,
            WorkoutKind::Cycling => Color::Cyan,
        };
        let selected = selected_id.as_deref() == Some(workout.id.as_str());
        let style = if selected {
            Style::default().fg(Color::Black).bg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        };
        grid[(cy - inner.y) as usize][(cx - inner.x) as usize] =
            (workout.kind().marker(), style);
        if selected {
            let text = format!("{} {}", workout.kind().glyph(), workout.label);
            popup = Some((cx, cy, text, color));
        }
    }

    if let Some(coords) = app.pending_location {
        if let Some((cx, cy)) = app.coords_to_map_cell(coords) {
            grid[(cy - inner.y) as usize][(cx - inner.x) as usize] =
                ('+', Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        }
    }

    let lines: Vec<Line> = grid
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|(ch, style)| Span::styled(ch.to_string(), style))
                    .collect::<Vec<Span>>(),
            )
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);

    // Marker popup rendered on top, to the right of the marker when it
    // fits, otherwise to the left
    if let Some((cx, cy, text, color)) = popup {
        let text_width = text.chars().count() as u16 + 3;
        let popup_x = if cx + 2 + text_width <= inner.x + inner.width {
            cx + 2
        } else {
            cx.saturating_sub(text_width + 1).max(inner.x)
        };
        let popup_area = Rect {
            x: popup_x,
            y: cy.clamp(inner.y, inner.y + inner.height - 1),
            width: text_width.min((inner.x + inner.width).saturating_sub(popup_x)),
            height: 1,
        };
        f.render_widget(Clear, popup_area);
        let style = Style::default().fg(Color::Black).bg(color);
        f.render_widget(Paragraph::new(format!(" {} ", text)).style(style), popup_area);
    }
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    if matches!(app.mode, AppMode::EntryForm) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(area);
        render_form(f, app, chunks[0]);
        render_workout_list(f, app, chunks[1]);
    } else {
        render_workout_list(f, app, area);
    }
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let extra_label = match app.form_kind {
        WorkoutKind::Running => "Cadence (spm)",
        WorkoutKind::Cycling => "Elev Gain (m)",
    };

    let kind_line = form_choice_line(
        "Type",
        app.form_kind.capitalized(),
        app.focused_field == FormField::Kind,
    );
    let lines = vec![
        kind_line,
        form_text_line("Distance (km)", &app.distance_input, app, FormField::Distance),
        form_text_line("Duration (min)", &app.duration_input, app, FormField::Duration),
        form_text_line(extra_label, &app.extra_input, app, FormField::Extra),
    ];

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("New Workout")
            .style(Style::default().fg(Color::Green)),
    );
    f.render_widget(form, area);
}

fn form_choice_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::raw(format!(" {:<15}", format!("{}:", label))),
        Span::styled(format!("◂ {} ▸", value), style),
    ])
}

fn form_text_line(label: &str, value: &str, app: &App, field: FormField) -> Line<'static> {
    let focused = app.focused_field == field;
    let mut spans = vec![Span::raw(format!(" {:<15}", format!("{}:", label)))];
    if focused {
        let cursor = app.cursor_position.min(value.len());
        spans.push(Span::raw(value[..cursor].to_string()));
        spans.push(Span::styled(
            " ",
            Style::default().bg(Color::White),
        ));
        spans.push(Span::raw(value[cursor..].to_string()));
    } else {
        spans.push(Span::raw(value.to_string()));
    }
    Line::from(spans)
}

fn render_workout_list(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Workouts");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.store.is_empty() {
        let empty = Paragraph::new("Click a spot on the map to log your first workout.")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    // Three rendered lines per entry; scroll so the selection stays visible
    let item_height = 3usize;
    let visible_items = (inner.height as usize / item_height).max(1);
    let selected = app.selected_index.unwrap_or(0);
    let start = selected.saturating_sub(visible_items.saturating_sub(1));

    let mut lines: Vec<Line> = Vec::new();
    for (index, workout) in app.store.iter().enumerate().skip(start).take(visible_items) {
        let is_selected = app.selected_index == Some(index);
        let title_style = if is_selected {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        lines.push(Line::from(Span::styled(
            format!("{} {}", workout.kind().glyph(), workout.label),
            title_style,
        )));

        let detail = match workout.details {
            WorkoutDetails::Running { cadence_spm, pace_min_per_km } => format!(
                "   {} km · {} min · ⚡{:.1} min/km · 🦶{} spm",
                workout.distance_km, workout.duration_min, pace_min_per_km, cadence_spm
            ),
            WorkoutDetails::Cycling { elevation_gain_m, speed_km_per_h } => format!(
                "   {} km · {} min · ⚡{:.1} km/h · ⛰ {} m",
                workout.distance_km, workout.duration_min, speed_km_per_h, elevation_gain_m
            ),
        };
        lines.push(Line::from(Span::styled(
            detail,
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Browsing => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "Click map: log workout | ↑↓: select | Enter: focus marker | +/-: zoom | e: export CSV | Ctrl+R: reset | F1/?: help | q: quit"
                    .to_string()
            }
        }
        AppMode::EntryForm => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "Tab/↑↓: switch field | ◂▸/Space: toggle type | Enter: save workout | Esc: cancel"
                    .to_string()
            }
        }
        AppMode::Help => {
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        AppMode::ExportCsv => format!(
            "Export CSV as: {} (Enter to export, Esc to cancel)",
            app.filename_input
        ),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Browsing => Style::default(),
            AppMode::EntryForm => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("twkt Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> String {
    r#"TWKT - TERMINAL WORKOUT TRACKER

=== LOGGING A WORKOUT ===
1. Left-click a spot on the map panel.
2. Fill in the form that opens in the sidebar:
   Type            Running or Cycling (Space or ◂▸ to toggle)
   Distance (km)   positive number
   Duration (min)  positive number
   Cadence (spm)   positive number (running only)
   Elev Gain (m)   number, zero or more (cycling only)
3. Press Enter to save. The workout appears as a marker on the
   map and as an entry in the list, and is persisted immediately.

Clicking the map again while the form is open moves the pending
location without losing what you typed. Esc discards the form.

=== BROWSING ===
↑↓ or j/k       Select a workout in the list
Enter           Center the map on the selected workout
+ / -           Zoom the map in / out
Mouse click     Start a new workout at that spot

=== DERIVED METRICS ===
Running         pace  = duration / distance      (min/km)
Cycling         speed = distance / (duration/60) (km/h)
Both are computed once when the workout is created.

=== FILE OPERATIONS ===
e / Ctrl+E      Export the log to a CSV file
Ctrl+R          Reset: delete all workouts and the saved log

The log is saved automatically after every workout, as JSON in
your user data directory, and restored on the next start.

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#
        .to_string()
}
