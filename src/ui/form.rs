use crate::app::{App, Focus};
use crate::validate::Field;
use crate::ui::text_input::LineInput;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// 渲染新建任务表单（名称 | 日期）
pub fn render<S>(f: &mut Frame, area: Rect, app: &App<S>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_field(
        f,
        columns[0],
        " Name ",
        &app.name_input,
        &app.form.name,
        app.focus == Focus::Name,
    );
    render_field(
        f,
        columns[1],
        " Date (optional) ",
        &app.date_input,
        &app.form.date,
        app.focus == Focus::Date,
    );
}

/// 输入框 + 错误提示行
fn render_field(
    f: &mut Frame,
    area: Rect,
    title: &str,
    input: &LineInput,
    field: &Field,
    is_focused: bool,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    // 无效字段红框，聚焦白框，其余灰框
    let border_color = if field.is_invalid() {
        Color::Red
    } else if is_focused {
        Color::White
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .border_type(ratatui::widgets::BorderType::Rounded);
    let inner = block.inner(rows[0]);
    f.render_widget(block, rows[0]);
    input.render(f, inner);

    if let Some(message) = field.message() {
        let paragraph = Paragraph::new(format!(" {}", message)).style(Style::default().fg(Color::Red));
        f.render_widget(paragraph, rows[1]);
    }
}
