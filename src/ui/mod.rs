pub mod dialogs;
mod form;
mod lists;
pub mod text_input;

use crate::app::{App, Focus};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

/// 主渲染函数
pub fn render<S>(f: &mut Frame, app: &App<S>) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // 新建任务表单
            Constraint::Min(0),    // 两个列表
            Constraint::Length(1), // 按键提示
        ])
        .split(f.area());

    form::render(f, main_chunks[0], app);

    // 两列布局：待办 | 已完成
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_chunks[1]);

    lists::render_column(
        f,
        columns[0],
        "Pending",
        &app.lists.pending,
        app.focus == Focus::Pending,
        app.selected_pending,
    );
    lists::render_column(
        f,
        columns[1],
        "Done",
        &app.lists.done,
        app.focus == Focus::Done,
        app.selected_done,
    );

    render_hints(f, main_chunks[2], app.focus);

    // 渲染对话框（如果有）
    if let Some(dialog) = &app.dialog {
        dialogs::render_dialog(f, dialog);
    }

    // 渲染通知栏（如果有通知）
    if let Some(ref notification) = app.notification {
        render_notification(f, f.area(), notification);
    }
}

/// 底部按键提示
fn render_hints(f: &mut Frame, area: ratatui::layout::Rect, focus: Focus) {
    use ratatui::style::{Color, Style};
    use ratatui::widgets::Paragraph;

    let text = match focus {
        Focus::Name | Focus::Date => " Enter add · Tab next field · Esc lists · Ctrl+C quit",
        Focus::Pending | Focus::Done => {
            " ↑↓ select · Enter toggle · ←→ switch list · a/n add · r reload · e export · i import · q quit"
        }
    };

    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    f.render_widget(paragraph, area);
}

/// 渲染通知栏
fn render_notification(f: &mut Frame, area: ratatui::layout::Rect, notification: &crate::app::Notification) {
    use crate::app::NotificationLevel;
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph};

    // 通知栏占据底部 3 行
    let height = 3.min(area.height);
    let notification_area = ratatui::layout::Rect {
        x: area.x,
        y: area.y + area.height - height,
        width: area.width,
        height,
    };

    // 根据级别选择颜色
    let (bg_color, fg_color, prefix) = match notification.level {
        NotificationLevel::Info => (Color::Blue, Color::White, "ℹ"),
        NotificationLevel::Success => (Color::Green, Color::White, "✓"),
        NotificationLevel::Warning => (Color::Yellow, Color::Black, "⚠"),
        NotificationLevel::Error => (Color::Red, Color::White, "✗"),
    };

    let content = Line::from(vec![
        Span::styled(format!(" {} ", prefix), Style::default().fg(fg_color).bg(bg_color).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(&notification.message, Style::default().fg(fg_color)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(bg_color))
        .style(Style::default().bg(bg_color));

    let paragraph = Paragraph::new(content).block(block);

    f.render_widget(Clear, notification_area);
    f.render_widget(paragraph, notification_area);
}
