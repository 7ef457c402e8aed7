use crate::render::RenderedItem;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// 渲染单个列表（待办 / 已完成）
pub fn render_column(
    f: &mut Frame,
    area: Rect,
    title: &str,
    items: &[RenderedItem],
    is_focused: bool,
    selected: usize,
) {
    // 简洁配色：聚焦=白色，非聚焦=灰色
    let (border_color, title_style) = if is_focused {
        (Color::White, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
    } else {
        (Color::DarkGray, Style::default().fg(Color::Gray))
    };

    let list_items: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_selected = is_focused && i == selected;

            // 选中指示器
            let selection_indicator = if is_selected {
                Span::styled("▶ ", Style::default().fg(Color::White))
            } else {
                Span::raw("  ")
            };

            let mut lines = vec![
                Line::from(vec![
                    selection_indicator,
                    Span::styled(item.task.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(item.meta.as_str(), Style::default().fg(Color::Gray)),
                ]),
            ];

            // 只有选中项显示操作提示
            if is_selected {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("[Enter] {}", item.action),
                        Style::default().fg(Color::Cyan),
                    ),
                ]));
            }

            let style = if is_selected {
                Style::default().bg(Color::Rgb(41, 98, 218)).fg(Color::White)
            } else {
                Style::default()
            };

            ListItem::new(lines).style(style)
        })
        .collect();

    // 列标题
    let title_with_count = format!(" {} ({}) ", title, items.len());

    let list = List::new(list_items).block(
        Block::default()
            .title(title_with_count)
            .title_alignment(ratatui::layout::Alignment::Center)
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .border_type(ratatui::widgets::BorderType::Rounded),
    );

    // 让选中项保持在可见范围内
    let mut state = ListState::default();
    if is_focused && !items.is_empty() {
        state.select(Some(selected));
    }

    f.render_stateful_widget(list, area, &mut state);
}
