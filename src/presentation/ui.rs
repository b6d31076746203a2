use crate::application::{
    page_title, AlertKind, App, AppMode, CloseoutReview, FormState, INCOMPLETE_ITEMS_MESSAGE,
    PAGE_COMPLETE,
};
use crate::domain::{format_yes_no, ExpenseType, FieldKind, FieldSpec, FormKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let alert_height = if app.alert.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(alert_height),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_alert(f, app, chunks[1]);
    render_page(f, app, chunks[2]);
    render_buttons(f, app, chunks[3]);
    render_status_bar(f, app, chunks[4]);

    match app.mode {
        AppMode::Help => render_help_popup(f, app.help_scroll),
        AppMode::ConfirmDelete => render_confirm_popup(f),
        _ => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut text = format!(
        "closeout | PPM {} | Page {}/{}: {}",
        app.shipment().id,
        app.wizard.index() + 1,
        app.wizard.page_list().len(),
        page_title(app.current_page())
    );
    if let Some(user) = app.session.user() {
        text.push_str(&format!(" | {}", user));
    }
    if let Some(gbloc) = app.session.selected_gbloc() {
        text.push_str(&format!(" | GBLOC {}", gbloc));
    }
    let header = Paragraph::new(text).style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_alert(f: &mut Frame, app: &App, area: Rect) {
    let Some(alert) = &app.alert else {
        return;
    };
    let (title, color) = match alert.kind {
        AlertKind::Error => ("Error", Color::Red),
        AlertKind::Success => ("Success", Color::Green),
        AlertKind::Info => ("Info", Color::Blue),
    };
    let widget = Paragraph::new(alert.message.as_str())
        .block(Block::default().borders(Borders::ALL).title(format!("{} (Esc to dismiss)", title)))
        .style(Style::default().fg(color));
    f.render_widget(widget, area);
}

fn render_page(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if app.current_page() == PAGE_COMPLETE {
        summary_lines(app, &mut lines);
    }
    match &app.form {
        Some(form) => form_lines(app, &form.state, &mut lines),
        None if app.is_reviewing() => review_lines(&app.review(), app.selected_item, &mut lines),
        None => {}
    }

    let title = match &app.form {
        Some(form) if app.flags.edit_mode => edit_title(form.kind, form.target.as_deref()),
        _ => page_title(app.current_page()).to_string(),
    };

    // Keep the selected line on screen
    let focus = lines.iter().position(|line| line.style.add_modifier.contains(Modifier::REVERSED));
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = focus.map(|i| i.saturating_sub(visible.saturating_sub(3))).unwrap_or(0);

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    f.render_widget(widget, area);
}

fn edit_title(kind: FormKind, target: Option<&str>) -> String {
    let noun = match kind {
        FormKind::WeightTicket => "trip",
        FormKind::ProGear => "pro-gear set",
        FormKind::GunSafe => "gun safe",
        FormKind::Expense => "receipt",
        _ => "details",
    };
    match target {
        Some("") => format!("Add {}", noun),
        _ => format!("Edit {}", noun),
    }
}

fn field_display(state: &FormState, spec: &FieldSpec) -> String {
    let values = state.values();
    match spec.kind {
        FieldKind::Flag => format_yes_no(values.flag(spec.name)),
        FieldKind::Files => {
            let files = values.files(spec.name);
            if files.is_empty() {
                "(no uploads)".to_string()
            } else {
                files.join(", ")
            }
        }
        FieldKind::Choice(_) => {
            let code = values.text(spec.name);
            ExpenseType::from_code(code)
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| code.to_string())
        }
        _ => values.text(spec.name).to_string(),
    }
}

fn form_lines(app: &App, state: &FormState, lines: &mut Vec<Line<'static>>) {
    for (i, spec) in state.visible_fields().iter().enumerate() {
        let selected = i == app.selected_field;
        let value = if selected && app.mode == AppMode::Editing {
            format!("{}_", app.input)
        } else {
            field_display(state, spec)
        };
        let style = if selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(
            Line::from(vec![
                Span::styled(format!("{}: ", spec.label), Style::default().fg(Color::Yellow)),
                Span::raw(value),
            ])
            .style(style),
        );
        if let Some(error) = state.visible_error(spec.name) {
            let error = Span::styled(format!("  {}", error), Style::default().fg(Color::Red));
            lines.push(Line::from(error));
        }
    }
}

fn review_lines(review: &CloseoutReview, selected: usize, lines: &mut Vec<Line<'static>>) {
    if review.show_incomplete_error {
        let warning = Span::styled(INCOMPLETE_ITEMS_MESSAGE, Style::default().fg(Color::Red));
        lines.push(Line::from(warning));
        lines.push(Line::default());
    }

    let bold = Style::default().add_modifier(Modifier::BOLD);
    lines.push(Line::from(Span::styled("About Your PPM", bold)));
    for row in &review.about {
        lines.push(Line::from(format!("  {}: {}", row.label, row.value)));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(review.documents_heading, bold)));

    let mut index = 0;
    for section in &review.sections {
        lines.push(Line::from(Span::styled(
            format!("{} ({})", section.heading, section.total),
            Style::default().fg(Color::Yellow),
        )));
        if section.items.is_empty() {
            lines.push(Line::from(format!("  {}", section.empty_message)));
        }
        for item in &section.items {
            let mut title = vec![Span::raw(format!("  {}", item.title))];
            if !item.is_complete {
                title.push(Span::styled(" [incomplete]", Style::default().fg(Color::Red)));
            }
            let style = if index == selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            lines.push(Line::from(title).style(style));
            for row in &item.rows {
                lines.push(Line::from(format!("    {}: {}", row.label, row.value)));
            }
            index += 1;
        }
        lines.push(Line::from(Span::styled(
            format!("  {}", section.add_label),
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn summary_lines(app: &App, lines: &mut Vec<Line<'static>>) {
    let summary = app.summary();
    lines.push(Line::from(Span::styled(
        summary.incentive_heading.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for line in summary.lines.iter().chain(summary.incentive_lines().iter()) {
        lines.push(Line::from(format!("  {}", line)));
    }
    lines.push(Line::default());
}

fn render_buttons(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for button in app.navigation() {
        let style = if button.enabled {
            Style::default().fg(Color::Black).bg(Color::LightBlue)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("[ {} ]", button.label), style));
        spans.push(Span::raw(" "));
    }
    if app.wizard.is_submitting {
        spans.push(Span::styled("Saving...", Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

const REVIEW_HINT: &str =
    "↑↓: select | Enter: edit | d: delete | w/p/g/x: add item | Ctrl+N: next | F1/?: help";
const PAGE_HINT: &str =
    "↑↓: field | Enter: edit | y/n: answer | ←→: choose | Ctrl+N: next | Ctrl+B: back | Esc: later";

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else if app.flags.read_only {
                "Enter: return home | Ctrl+E: export CSV | F1/?: help".to_string()
            } else if app.is_reviewing() {
                REVIEW_HINT.to_string()
            } else {
                PAGE_HINT.to_string()
            }
        }
        AppMode::Editing => format!("Editing: {} (Enter to save, Esc to cancel)", app.input),
        AppMode::Help => {
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        AppMode::ConfirmDelete => "Delete this item? (y/n)".to_string(),
        AppMode::ExportCsv => {
            format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input)
        }
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ConfirmDelete => Style::default().fg(Color::Red),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(input, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_confirm_popup(f: &mut Frame) {
    let popup_area = centered_rect(f.area(), 44, 5);
    f.render_widget(Clear, popup_area);
    let message = "Are you sure you want to delete this item?\n\ny: delete    n: keep";
    let widget = Paragraph::new(message)
        .block(Block::default().borders(Borders::ALL).title("Delete item"))
        .style(Style::default().fg(Color::Red));
    f.render_widget(widget, popup_area);
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

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("Closeout Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"PPM CLOSEOUT

=== PAGES ===
About your PPM     Departure date, addresses and any advance you received
Weight tickets     Empty and full weight for each trip
Pro-gear           Only shown when you said you are moving pro-gear
Gun safe           Only shown when you declared a gun safe (--enable-gun-safe)
Expenses           Receipts (small package moves document shipments here)
Review             Everything entered so far; fix incomplete items here
Complete PPM       Final totals and your signature

=== NAVIGATION ===
Ctrl+N             Next / Save / Complete (when the page is valid)
Ctrl+B             Back to the previous page
Esc                Dismiss the banner, cancel an edit, or finish later
Ctrl+Q             Quit without submitting the current page

=== FORMS ===
↑↓ / Tab           Move between fields
Enter / Space      Edit a text field, toggle a yes/no, add an upload
y / n              Answer a yes/no question
← →                Cycle through choices (expense type, storage location)
Backspace          Remove the last upload from an upload field

Errors appear under a field once you have edited it or tried to
continue. Numbers accept thousands separators, money accepts "$".
Dates accept "29 Apr 2022" or "2022-04-29". Addresses go on one line:
"1 Main St, Fort Bragg, NC 28310".

=== REVIEW ===
↑↓ / jk            Select a trip, pro-gear set or receipt
Enter / e          Edit the selected item
d / Delete         Delete the selected item (asks first)
w                  Add a trip
p                  Add a pro-gear set
g                  Add a gun safe (with --enable-gun-safe)
x                  Add a receipt

=== OTHER ===
Ctrl+E             Export the summary and review to CSV
F1 / ?             Show this help
"#;
