use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::text_input::LineInput;

/// 对话框类型
pub enum DialogType {
    /// 导入备份：输入文件路径
    ImportPath { input: LineInput },
}

impl DialogType {
    pub fn import_path(default_path: &str) -> Self {
        let mut input = LineInput::with_value("Path to a backup file", default_path);
        input.set_focused(true);
        DialogType::ImportPath { input }
    }
}

/// 渲染居中的对话框
pub fn render_dialog(f: &mut Frame, dialog: &DialogType) {
    let area = centered_rect(60, 20, f.area());

    // 清空对话框区域
    f.render_widget(Clear, area);

    match dialog {
        DialogType::ImportPath { input } => render_input_dialog(
            f,
            area,
            "Import backup",
            "Documents are merged by id; existing tasks are overwritten.",
            input,
        ),
    }
}

/// 渲染输入对话框
fn render_input_dialog(f: &mut Frame, area: Rect, title: &str, prompt: &str, input: &LineInput) {
    let block = Block::default()
        .title(format!("  {}  ", title))
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(76, 86, 106)))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .style(Style::default().bg(Color::Rgb(46, 52, 64)));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // 提示文本
            Constraint::Length(3), // 输入框
            Constraint::Min(0),
            Constraint::Length(1), // 按键提示
        ])
        .split(inner);

    let prompt = Paragraph::new(prompt).style(Style::default().fg(Color::Gray));
    f.render_widget(prompt, chunks[0]);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(ratatui::widgets::BorderType::Rounded);
    let input_area = input_block.inner(chunks[1]);
    f.render_widget(input_block, chunks[1]);
    input.render(f, input_area);

    let hint = Paragraph::new(Line::from("Enter import · Esc cancel"))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    f.render_widget(hint, chunks[3]);
}

/// 计算居中矩形
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Min(9),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
