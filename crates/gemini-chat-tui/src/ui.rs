use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use gemini_chat_core::{Conversation, MessageEntry, Theme};
use crate::app::{App, InputMode};

pub const TITLE: &str = "AI Chat with Gemini";
pub const PLACEHOLDER: &str = "Type your message...";
pub const TYPING_TEXT: &str = "Bot is typing...";

/// Colours for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub title: Color,
    pub chat_bg: Color,
    pub user_fg: Color,
    pub user_bg: Color,
    pub bot_fg: Color,
    pub bot_bg: Color,
    pub timestamp: Color,
    pub typing_fg: Color,
    pub typing_bg: Color,
    pub muted: Color,
    pub border: Color,
    pub focus_border: Color,
    pub disabled_border: Color,
    pub theme_icon: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                background: Color::Rgb(99, 102, 241),
                text: Color::Rgb(17, 24, 39),
                title: Color::Rgb(49, 46, 129),
                chat_bg: Color::Rgb(243, 244, 246),
                user_fg: Color::White,
                user_bg: Color::Rgb(99, 102, 241),
                bot_fg: Color::White,
                bot_bg: Color::Rgb(55, 65, 81),
                timestamp: Color::Rgb(107, 114, 128),
                typing_fg: Color::Black,
                typing_bg: Color::Rgb(209, 213, 219),
                muted: Color::Rgb(107, 114, 128),
                border: Color::Rgb(209, 213, 219),
                focus_border: Color::Rgb(99, 102, 241),
                disabled_border: Color::Rgb(165, 180, 252),
                theme_icon: Color::Rgb(107, 114, 128),
            },
            Theme::Dark => Palette {
                background: Color::Rgb(17, 24, 39),
                text: Color::White,
                title: Color::Rgb(165, 180, 252),
                chat_bg: Color::Rgb(55, 65, 81),
                user_fg: Color::White,
                user_bg: Color::Rgb(99, 102, 241),
                bot_fg: Color::White,
                bot_bg: Color::Rgb(31, 41, 55),
                timestamp: Color::Rgb(156, 163, 175),
                typing_fg: Color::Black,
                typing_bg: Color::Rgb(209, 213, 219),
                muted: Color::Rgb(156, 163, 175),
                border: Color::Rgb(75, 85, 99),
                focus_border: Color::Rgb(99, 102, 241),
                disabled_border: Color::Rgb(67, 56, 202),
                theme_icon: Color::Rgb(234, 179, 8),
            },
        }
    }
}

/// Project the transcript into styled lines.
///
/// Depends only on its arguments, so drawing the same conversation twice gives
/// the same lines.
pub fn transcript_lines(conversation: &Conversation, busy: bool, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for entry in conversation.iter() {
        match entry {
            MessageEntry::User { text } => {
                let style = Style::default().fg(palette.user_fg).bg(palette.user_bg);
                for (i, line) in text.lines().enumerate() {
                    let mut spans = Vec::new();
                    if i == 0 {
                        spans.push(Span::styled("You: ", style.add_modifier(Modifier::BOLD)));
                    }
                    spans.push(Span::styled(line.to_string(), style));
                    lines.push(Line::from(spans).alignment(Alignment::Right));
                }
            }
            MessageEntry::Bot { text, timestamp } => {
                let style = Style::default().fg(palette.bot_fg).bg(palette.bot_bg);
                for (i, line) in text.lines().enumerate() {
                    let mut spans = Vec::new();
                    if i == 0 {
                        spans.push(Span::styled("Bot: ", style.add_modifier(Modifier::BOLD)));
                    }
                    spans.push(Span::styled(line.to_string(), style));
                    lines.push(Line::from(spans));
                }
                lines.push(Line::from(Span::styled(
                    timestamp.clone(),
                    Style::default().fg(palette.timestamp).add_modifier(Modifier::ITALIC),
                )));
            }
        }
        lines.push(Line::default());
    }

    if busy {
        lines.push(Line::from(Span::styled(
            TYPING_TEXT,
            Style::default().fg(palette.typing_fg).bg(palette.typing_bg),
        )));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = Palette::for_theme(app.theme);

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        area,
    );

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, &palette, frame, header_area);
    render_chat(app, &palette, frame, chat_area);
    render_input(app, &palette, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_api_key_input {
        render_api_key_input(app, &palette, frame, area);
    }
}

fn render_header(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        format!(" {} ", TITLE),
        Style::default().fg(palette.title).bold(),
    )));
    frame.render_widget(title, area);

    // Sun switches to light, moon switches to dark
    let icon = if app.theme.is_dark() { "☀ " } else { "☾ " };
    let toggle = Paragraph::new(Line::from(Span::styled(
        icon,
        Style::default().fg(palette.theme_icon),
    )))
    .alignment(Alignment::Right);
    frame.render_widget(toggle, area);
}

fn render_chat(app: &mut App, palette: &Palette, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_focused = app.input_mode == InputMode::Normal && !app.show_api_key_input;
    let border_color = if chat_focused { palette.focus_border } else { palette.border };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(palette.chat_bg).fg(palette.text));

    let conversation = app.exchange.conversation();
    let chat_text = if conversation.is_empty() && !app.is_busy() {
        Text::from(Span::styled(
            "Say hello to start the conversation.",
            Style::default().fg(palette.muted),
        ))
    } else {
        Text::from(transcript_lines(conversation, app.is_busy(), palette))
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing && !app.show_api_key_input;
    let border_color = if app.is_busy() {
        palette.disabled_border
    } else if editing {
        palette.focus_border
    } else {
        palette.border
    };
    let title = if app.is_busy() { " Message (waiting for reply) " } else { " Message " };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let pending = app.exchange.pending_input();
    let (visible, cursor_x) = input_window(pending, app.input_cursor, area.width.saturating_sub(2));
    let content = if pending.is_empty() {
        Span::styled(PLACEHOLDER, Style::default().fg(palette.muted))
    } else {
        Span::raw(visible)
    };

    let input = Paragraph::new(Line::from(content)).block(block);
    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

/// Slice of `text` that fits in `width` columns with the cursor kept in view,
/// and the cursor column within that slice
fn input_window(text: &str, cursor: usize, width: u16) -> (String, u16) {
    let width = usize::from(width);
    if width == 0 {
        return (String::new(), 0);
    }

    let char_count = text.chars().count();
    let cursor = cursor.min(char_count);
    // The cursor may sit one past the last char, so it needs a column too
    let offset = cursor.saturating_sub(width - 1);

    let visible: String = text.chars().skip(offset).take(width).collect();
    let cursor_x = u16::try_from(cursor - offset).unwrap_or(u16::MAX);
    (visible, cursor_x)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.show_api_key_input {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" save key ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ]
    } else {
        match app.input_mode {
            InputMode::Normal => vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" t ", key_style),
                Span::styled(" theme ", label_style),
                Span::styled(" K ", key_style),
                Span::styled(" API key ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
            InputMode::Editing => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(if app.is_busy() { " waiting " } else { " send " }, label_style),
                Span::styled(" Ctrl-T ", key_style),
                Span::styled(" theme ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" stop typing ", label_style),
            ],
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_api_key_input(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(palette.chat_bg).fg(palette.text))
        .title(" Enter Gemini API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if inner.height < 5 {
        return;
    }

    let instructions = Paragraph::new("Paste your API key below. Press Enter to save, Esc to cancel.")
        .style(Style::default().fg(palette.muted));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    // Input field
    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);

    // Mask the key, showing only the last 4 chars
    let char_count = app.api_key_input.chars().count();
    let display_text = if char_count <= 4 {
        "*".repeat(char_count)
    } else {
        let masked_len = char_count - 4;
        let last_four: String = app.api_key_input.chars().skip(masked_len).collect();
        format!("{}...{}", "*".repeat(masked_len.min(20)), last_four)
    };

    let input = Paragraph::new(display_text).style(Style::default().fg(palette.focus_border));
    frame.render_widget(input, input_area);

    let cursor_x = app.api_key_input_cursor.min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    let status = Paragraph::new(format!("{} characters", char_count))
        .style(Style::default().fg(palette.muted));
    frame.render_widget(status, Rect::new(inner.x, inner.y + 4, inner.width, 1));
}
