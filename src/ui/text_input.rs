use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    Frame,
};
use tui_textarea::{CursorMove, TextArea};

/// 单行输入框（表单字段、导入路径）
pub struct LineInput {
    textarea: TextArea<'static>,
    placeholder: &'static str,
    focused: bool,
}

impl LineInput {
    pub fn new(placeholder: &'static str) -> Self {
        let mut input = Self {
            textarea: TextArea::default(),
            placeholder,
            focused: false,
        };
        input.apply_style();
        input
    }

    pub fn with_value(placeholder: &'static str, value: &str) -> Self {
        let mut input = Self::new(placeholder);
        input.textarea.insert_str(value);
        input
    }

    /// 获取内容
    pub fn value(&self) -> String {
        self.textarea.lines().join("")
    }

    pub fn clear(&mut self) {
        self.textarea = TextArea::default();
        self.apply_style();
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.apply_style();
    }

    fn apply_style(&mut self) {
        self.textarea.set_placeholder_text(self.placeholder);
        self.textarea
            .set_placeholder_style(Style::default().fg(Color::DarkGray));
        self.textarea.set_cursor_line_style(Style::default());

        // 失去焦点时隐藏光标
        let cursor = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.textarea.set_cursor_style(cursor);
    }

    /// 处理按键，返回内容是否改变
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('u') => {
                    let changed = !self.value().is_empty();
                    self.clear();
                    changed
                }
                KeyCode::Char('a') => {
                    self.textarea.move_cursor(CursorMove::Head);
                    false
                }
                KeyCode::Char('e') => {
                    self.textarea.move_cursor(CursorMove::End);
                    false
                }
                _ => false,
            };
        }

        match key.code {
            KeyCode::Char(c) => {
                self.textarea.insert_char(c);
                true
            }
            KeyCode::Backspace => self.textarea.delete_char(),
            KeyCode::Delete => self.textarea.delete_next_char(),
            KeyCode::Left => {
                self.textarea.move_cursor(CursorMove::Back);
                false
            }
            KeyCode::Right => {
                self.textarea.move_cursor(CursorMove::Forward);
                false
            }
            KeyCode::Home => {
                self.textarea.move_cursor(CursorMove::Head);
                false
            }
            KeyCode::End => {
                self.textarea.move_cursor(CursorMove::End);
                false
            }
            _ => false,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        f.render_widget(&self.textarea, area);
    }
}
