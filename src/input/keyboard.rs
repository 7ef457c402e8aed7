use crate::app::{App, Focus};
use crate::store::DocumentStore;
use crate::ui::dialogs::DialogType;
use crate::validate::FieldId;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

/// 处理键盘输入
/// 返回 false 表示应该退出应用
pub fn handle_key_input<S: DocumentStore>(app: &mut App<S>, key: KeyEvent) -> bool {
    // Ctrl+C 在任何位置都退出
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }

    if app.dialog.is_some() {
        handle_dialog(app, key);
        return true;
    }

    match key.code {
        KeyCode::Tab => {
            app.set_focus(app.focus.next());
            return true;
        }
        KeyCode::BackTab => {
            app.set_focus(app.focus.prev());
            return true;
        }
        _ => {}
    }

    match app.focus.field() {
        Some(field) => {
            handle_form_key(app, field, key);
            true
        }
        None => handle_list_key(app, key),
    }
}

/// 表单输入框中的按键
fn handle_form_key<S: DocumentStore>(app: &mut App<S>, field: FieldId, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_form(),
        KeyCode::Esc => app.set_focus(Focus::Pending),
        KeyCode::Down if field == FieldId::Name => app.set_focus(Focus::Date),
        KeyCode::Up if field == FieldId::Date => app.set_focus(Focus::Name),
        _ => {
            let input = match field {
                FieldId::Name => &mut app.name_input,
                FieldId::Date => &mut app.date_input,
            };
            if input.handle_key(key) {
                app.sync_field(field);
            }
        }
    }
}

/// 列表中的按键
fn handle_list_key<S: DocumentStore>(app: &mut App<S>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Left | KeyCode::Char('h') => app.set_focus(Focus::Pending),
        KeyCode::Right | KeyCode::Char('l') => app.set_focus(Focus::Done),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('a') | KeyCode::Char('n') => app.set_focus(Focus::Name),
        KeyCode::Char('e') => app.export(),
        KeyCode::Char('i') => app.open_import_dialog(),
        KeyCode::Char('r') => {
            app.refresh();
        }
        _ => {}
    }
    true
}

/// 对话框中的按键
fn handle_dialog<S: DocumentStore>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dialog = None,
        KeyCode::Enter => {
            if let Some(DialogType::ImportPath { input }) = app.dialog.take() {
                let path = input.value();
                let path = path.trim();
                if !path.is_empty() {
                    app.import(&PathBuf::from(path));
                }
            }
        }
        _ => {
            if let Some(DialogType::ImportPath { input }) = app.dialog.as_mut() {
                input.handle_key(key);
            }
        }
    }
}
