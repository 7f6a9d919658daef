use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, InputMode, NoticeKind};
use crate::handler::action_key;

const INPUT_PREFIX: &str = "github.com/";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, form, card, footer
    let [header_area, input_area, card_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_input(app, frame, input_area);
    render_card(app, frame, card_area);
    render_footer(app, frame, footer_area);

    if app.notice.is_some() {
        render_notice(app, frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" HUMILHADOR DE PERFIL ", Style::default().fg(Color::Magenta).bold()),
        Span::styled(
            "descubra sua humilhação personalizada ",
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" 🎯 Username do GitHub da vítima ");

    let content = if app.username_input.is_empty() && !editing {
        Line::from(vec![
            Span::styled(INPUT_PREFIX, Style::default().fg(Color::DarkGray)),
            Span::styled("seu-nome-de-usuario", Style::default().fg(Color::DarkGray).italic()),
        ])
    } else {
        Line::from(vec![
            Span::styled(INPUT_PREFIX, Style::default().fg(Color::DarkGray)),
            Span::styled(app.username_input.as_str(), Style::default().fg(Color::Cyan)),
        ])
    };

    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(content).block(block), area);

    if editing {
        let cursor_x = input_cursor_offset(&app.username_input, app.input_cursor).min(inner.width);
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

/// Terminal columns between the start of the input line and the cursor.
fn input_cursor_offset(input: &str, cursor: usize) -> u16 {
    let before: String = input.chars().take(cursor).collect();
    let width = Span::raw(INPUT_PREFIX).width() + Span::raw(before).width();
    width.min(u16::MAX as usize) as u16
}

fn render_card(app: &mut App, frame: &mut Frame, area: Rect) {
    let reveal = app.reveal_snapshot();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" 🎭 Roast Profissional ");

    let text = if app.loading {
        // Animated ellipsis: cycles through "", ".", "..", "..."
        let dots = ".".repeat(app.animation_frame as usize);
        Text::from(Span::styled(
            format!("🔍 Stalkeando{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else if let (Some(card), Some(state)) = (app.card.as_ref(), reveal.as_ref()) {
        let badge = card.initials();
        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!(" {} ", if badge.is_empty() { "?" } else { badge.as_str() }),
                    Style::default().bg(Color::Magenta).fg(Color::White).bold(),
                ),
                Span::raw("  "),
                Span::styled(
                    "Baseado no seu perfil do GitHub",
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::default(),
        ];

        let mut body: Vec<Line> = state
            .displayed()
            .split('\n')
            .map(|line| Line::from(line.to_string()))
            .collect();

        // Blinking caret while typing
        if state.is_typing() && app.animation_frame % 2 == 0 {
            if let Some(last) = body.last_mut() {
                last.push_span(Span::styled("|", Style::default().fg(Color::Magenta)));
            }
        }
        lines.append(&mut body);

        if state.is_complete() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("[{}] {}", action_key(app.capability()), app.action.label()),
                Style::default().fg(Color::Yellow).bold(),
            )));
        }

        Text::from(lines)
    } else {
        Text::from(Span::styled(
            "Digite um username e aperte Enter para gerar a humilhação.",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    let mut hints = match app.input_mode {
        InputMode::Editing => " Enter: gerar humilhação  Esc: sair da edição  Ctrl+C: sair".to_string(),
        InputMode::Normal => " i: editar  q: sair".to_string(),
    };

    // Only offered once typing has finished
    if app.input_mode == InputMode::Normal && app.completed_card().is_some() {
        hints.push_str(&format!(
            "  {}: {}",
            action_key(app.capability()),
            app.action.label()
        ));
    }

    let footer = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::styled(hints, Style::default().fg(Color::Gray)),
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notice) = app.notice.as_ref() else {
        return;
    };

    let (color, icon) = match notice.kind {
        NoticeKind::Success => (Color::Green, "✅"),
        NoticeKind::Error => (Color::Red, "😅"),
    };

    // Bottom-centered toast, like a snackbar
    let width = 70.min(area.width.saturating_sub(4));
    let height = 3;
    let x = (area.width.saturating_sub(width)) / 2;
    let y = area.height.saturating_sub(height + 1);
    let popup_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(" Esc para fechar ");

    let paragraph = Paragraph::new(format!("{} {}", icon, notice.message))
        .style(Style::default().fg(color))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}
