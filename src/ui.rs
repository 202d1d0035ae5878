use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, InputMode};
use crate::transcript::ChatRole;

/// Convert `**bold**` markup in a reply line to styled spans. Anything
/// unmatched stays literal.
fn markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;
    let mut bold = false;

    while let Some(idx) = rest.find("**") {
        let (head, tail) = rest.split_at(idx);
        if !head.is_empty() {
            spans.push(if bold {
                Span::styled(
                    head.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(head.to_string())
            });
        }
        bold = !bold;
        rest = &tail[2..];
    }

    if !rest.is_empty() {
        if bold {
            // Opening ** with no close; restore it as literal text
            spans.push(Span::raw(format!("**{rest}")));
        } else {
            spans.push(Span::raw(rest.to_string()));
        }
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat_screen(app, frame, body_area);
    render_footer(app, frame, footer_area);

    // Popups (notice on top; it blocks input until dismissed)
    if app.show_file_prompt {
        render_file_prompt(app, frame, area);
    }
    if let Some(notice) = app.session.notice() {
        render_notice(notice, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Knowledge Assistant ",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!("{} @ {}", app.user_label, app.backend_label),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, file_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area for mouse hit-testing and scroll math (inner size
    // minus borders)
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_chat_log(app, frame, chat_area);
    render_file_line(app, frame, file_area);
    render_input(app, frame, input_area);
}

fn render_chat_log(app: &App, frame: &mut Frame, area: Rect) {
    let chat_focused = app.input_mode == InputMode::Normal;
    let border_color = if chat_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Conversation ({}) ", app.session.transcript.len()));

    let messages = app.session.transcript.snapshot();
    let chat_text = if app.session.transcript.is_empty() && !app.is_waiting() {
        Text::from(Span::styled(
            "Ask a question, or upload a document and ask about it...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in messages {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                    lines.push(Line::default());
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Assistant:",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(markdown_line(line));
                    }
                    lines.push(Line::default());
                }
            }
        }

        if app.is_waiting() {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{dots}"),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_file_line(app: &App, frame: &mut Frame, area: Rect) {
    let line = if app.session.is_uploading() {
        Line::from(Span::styled(
            " Uploading... ",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        match app.session.composer.selected_file() {
            Some(path) => Line::from(vec![
                Span::styled(" File: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    path.display().to_string(),
                    Style::default().fg(Color::Green),
                ),
            ]),
            None => Line::from(Span::styled(
                " No file selected ",
                Style::default().fg(Color::DarkGray),
            )),
        }
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Message [{}] ", app.target.label()));

    // Horizontal scrolling keeps the cursor visible in a long draft.
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.session.composer.cursor();

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .session
        .composer
        .draft()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(
                format!(" to {} ", app.target.toggled().label()),
                label_style,
            ),
            Span::styled(" Esc ", key_style),
            Span::styled(" browse ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" f ", key_style),
            Span::styled(" file ", label_style),
            Span::styled(" u ", key_style),
            Span::styled(" upload ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(
                format!(" to {} ", app.target.toggled().label()),
                label_style,
            ),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_file_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_popup(area, 60, 7);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Select Document ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions =
        Paragraph::new("Type the path to a document. Press Enter to select, Esc to cancel.")
            .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let input = Paragraph::new(app.file_input.as_str()).style(Style::default().fg(Color::Cyan));
    frame.render_widget(input, input_area);

    let cursor_x = app
        .file_input
        .chars()
        .count()
        .min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    let current = match app.session.composer.selected_file() {
        Some(path) => format!("Current: {}", path.display()),
        None => "No file selected".to_string(),
    };
    let status = Paragraph::new(current).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, Rect::new(inner.x, inner.y + 4, inner.width, 1));
}

fn render_notice(notice: &str, frame: &mut Frame, area: Rect) {
    let popup_area = centered_popup(area, 50, 7);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Notice ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let message_area = Rect::new(
        inner.x,
        inner.y,
        inner.width,
        inner.height.saturating_sub(2),
    );
    let message = Paragraph::new(notice.to_string()).wrap(Wrap { trim: true });
    frame.render_widget(message, message_area);

    let hint = Paragraph::new("Press Enter to dismiss").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(
        hint,
        Rect::new(
            inner.x,
            inner.y + inner.height.saturating_sub(1),
            inner.width,
            1,
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_markdown_line_plain() {
        let line = markdown_line("just text");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line_text(&line), "just text");
    }

    #[test]
    fn test_markdown_line_bold() {
        let line = markdown_line("see **this** here");
        assert_eq!(line_text(&line), "see this here");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(!line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_line_unclosed_stays_literal() {
        let line = markdown_line("dangling **bold");
        assert_eq!(line_text(&line), "dangling **bold");
    }

    #[test]
    fn test_markdown_line_empty() {
        let line = markdown_line("");
        assert!(line.spans.is_empty() || line_text(&line).is_empty());
    }
}
