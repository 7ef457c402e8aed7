use crate::backup;
use crate::config::Config;
use crate::models::TaskStatus;
use crate::render::{ListRenderer, RenderedItem, RenderedLists};
use crate::repository::TaskRepository;
use crate::store::DocumentStore;
use crate::ui::dialogs::DialogType;
use crate::ui::text_input::LineInput;
use crate::validate::{FieldId, TaskForm};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::runtime::Runtime;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 通知消息
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: Instant,
}

impl Notification {
    /// 检查通知是否已过期（4秒后自动消失）
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() >= 4
    }
}

/// 焦点位置，Tab 按此顺序循环
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Date,
    Pending,
    Done,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Name => Focus::Date,
            Focus::Date => Focus::Pending,
            Focus::Pending => Focus::Done,
            Focus::Done => Focus::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Name => Focus::Done,
            Focus::Date => Focus::Name,
            Focus::Pending => Focus::Date,
            Focus::Done => Focus::Pending,
        }
    }

    pub fn field(self) -> Option<FieldId> {
        match self {
            Focus::Name => Some(FieldId::Name),
            Focus::Date => Some(FieldId::Date),
            _ => None,
        }
    }

    pub fn list(self) -> Option<TaskStatus> {
        match self {
            Focus::Pending => Some(TaskStatus::Pending),
            Focus::Done => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// 应用状态
///
/// Every store operation runs to completion on the current-thread runtime
/// before the next key is handled, so a render after a mutation always sees it.
pub struct App<S> {
    pub repo: TaskRepository<S>,
    runtime: Runtime,
    /// 应用配置
    pub config: Config,
    /// 导出目录（默认数据目录）
    pub export_dir: PathBuf,
    /// 表单校验状态
    pub form: TaskForm,
    pub name_input: LineInput,
    pub date_input: LineInput,
    pub focus: Focus,
    /// 最近一次成功渲染的列表
    pub lists: RenderedLists,
    pub selected_pending: usize,
    pub selected_done: usize,
    /// 当前显示的对话框
    pub dialog: Option<DialogType>,
    /// 通知消息
    pub notification: Option<Notification>,
}

impl<S: DocumentStore> App<S> {
    pub fn new(repo: TaskRepository<S>, runtime: Runtime, config: Config, export_dir: PathBuf) -> Self {
        let mut app = Self {
            repo,
            runtime,
            config,
            export_dir,
            form: TaskForm::new(),
            name_input: LineInput::new("Task name"),
            date_input: LineInput::new("YYYY-MM-DD or D/M/YYYY"),
            focus: Focus::Name,
            lists: RenderedLists::default(),
            selected_pending: 0,
            selected_done: 0,
            dialog: None,
            notification: None,
        };
        app.name_input.set_focused(true);
        app.refresh();
        app
    }

    /// 显示通知
    pub fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
            created_at: Instant::now(),
        });
    }

    /// Re-query and rebuild both lists. On failure the previous lists stay.
    pub fn refresh(&mut self) -> bool {
        let renderer = ListRenderer::new(&self.repo, &self.config.date_format);
        match self.runtime.block_on(renderer.render()) {
            Ok(lists) => {
                self.set_lists(lists);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to list tasks");
                self.notify(format!("Could not list tasks: {}", e), NotificationLevel::Error);
                false
            }
        }
    }

    fn set_lists(&mut self, lists: RenderedLists) {
        self.lists = lists;
        self.selected_pending = clamp(self.selected_pending, self.lists.pending.len());
        self.selected_done = clamp(self.selected_done, self.lists.done.len());
    }

    /// 切换焦点；离开输入框即标记为已触碰
    pub fn set_focus(&mut self, focus: Focus) {
        if focus == self.focus {
            return;
        }
        if let Some(field) = self.focus.field() {
            self.form.blur(field);
        }
        self.focus = focus;
        self.name_input.set_focused(focus == Focus::Name);
        self.date_input.set_focused(focus == Focus::Date);
    }

    /// 输入框内容变化后同步到表单
    pub fn sync_field(&mut self, field: FieldId) {
        let value = match field {
            FieldId::Name => self.name_input.value(),
            FieldId::Date => self.date_input.value(),
        };
        self.form.input(field, &value);
    }

    /// 提交表单：校验失败时不触碰存储
    pub fn submit_form(&mut self) {
        let validation = self.form.submit();
        if !validation.valid {
            self.notify("Fix the highlighted fields", NotificationLevel::Warning);
            return;
        }

        let created = self.runtime.block_on(
            self.repo
                .create(&validation.normalized_name, validation.normalized_date),
        );

        match created {
            Ok(task) => {
                self.form.reset();
                self.name_input.clear();
                self.date_input.clear();
                if self.refresh() {
                    self.selected_pending = 0;
                }
                self.notify(format!("Added \"{}\"", task.name), NotificationLevel::Success);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to add task");
                self.notify(format!("Could not add task: {}", e), NotificationLevel::Error);
            }
        }
    }

    pub fn selected_item(&self) -> Option<&RenderedItem> {
        match self.focus.list()? {
            TaskStatus::Pending => self.lists.pending.get(self.selected_pending),
            TaskStatus::Done => self.lists.done.get(self.selected_done),
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let Some(status) = self.focus.list() else {
            return;
        };
        let len = self.lists.list(status).len();
        let selected = match status {
            TaskStatus::Pending => &mut self.selected_pending,
            TaskStatus::Done => &mut self.selected_done,
        };
        *selected = clamp(selected.saturating_add_signed(delta), len);
    }

    /// The selected item's action: toggle, then render again
    pub fn toggle_selected(&mut self) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };

        let renderer = ListRenderer::new(&self.repo, &self.config.date_format);
        match self.runtime.block_on(renderer.activate(&item)) {
            Ok(lists) => {
                self.set_lists(lists);
                let verb = match item.task.status.toggled() {
                    TaskStatus::Done => "done",
                    TaskStatus::Pending => "pending",
                };
                self.notify(format!("Marked \"{}\" {}", item.task.name, verb), NotificationLevel::Info);
            }
            Err(e) if e.is_conflict() => {
                tracing::warn!(id = %item.task.id, error = %e, "task changed since it was listed");
                self.notify("Task changed elsewhere; list reloaded, try again", NotificationLevel::Warning);
                self.refresh();
            }
            Err(e) => {
                tracing::error!(id = %item.task.id, error = %e, "failed to update task status");
                self.notify(format!("Could not update task: {}", e), NotificationLevel::Error);
            }
        }
    }

    pub fn export(&mut self) {
        match self.runtime.block_on(backup::export_to(&self.repo, &self.export_dir)) {
            Ok(path) => self.notify(format!("Exported to {}", path.display()), NotificationLevel::Success),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.notify(format!("Export failed: {}", e), NotificationLevel::Error);
            }
        }
    }

    pub fn open_import_dialog(&mut self) {
        let default_path = self.export_dir.join(backup::BACKUP_FILE_NAME);
        self.dialog = Some(DialogType::import_path(&default_path.to_string_lossy()));
    }

    pub fn import(&mut self, path: &Path) {
        match self.runtime.block_on(backup::import_from(&self.repo, path)) {
            Ok(report) => {
                let level = if report.failed.is_empty() {
                    NotificationLevel::Success
                } else {
                    NotificationLevel::Warning
                };
                let message = format!(
                    "Imported {} new, {} updated, {} failed",
                    report.inserted.len(),
                    report.updated.len(),
                    report.failed.len()
                );
                self.refresh();
                self.notify(message, level);
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "import failed");
                self.notify(format!("Import failed: {}", e), NotificationLevel::Error);
            }
        }
    }
}

fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App<MemoryStore> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        App::new(
            TaskRepository::new(MemoryStore::new()),
            runtime,
            Config::default(),
            dir.path().to_path_buf(),
        )
    }

    fn type_into(app: &mut App<MemoryStore>, field: FieldId, text: &str) {
        let input = match field {
            FieldId::Name => &mut app.name_input,
            FieldId::Date => &mut app.date_input,
        };
        for c in text.chars() {
            input.handle_key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char(c),
                crossterm::event::KeyModifiers::NONE,
            ));
        }
        app.sync_field(field);
    }

    #[test]
    fn test_submit_creates_and_renders() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        type_into(&mut app, FieldId::Name, "Buy milk");
        type_into(&mut app, FieldId::Date, "1/3/2024");
        app.submit_form();

        assert_eq!(app.lists.pending.len(), 1);
        assert_eq!(app.lists.pending[0].task.name, "Buy milk");
        assert_eq!(app.lists.pending[0].meta, "01/03/2024 · Pending");
        assert_eq!(app.name_input.value(), "");
        assert!(app.form.name.message().is_none());
    }

    #[test]
    fn test_invalid_submit_never_reaches_store() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        type_into(&mut app, FieldId::Name, "Buy milk");
        type_into(&mut app, FieldId::Date, "31/02/2024");
        app.submit_form();

        assert!(app.lists.pending.is_empty());
        assert!(app.form.date.is_invalid());
        assert_eq!(app.notification.as_ref().map(|n| n.level), Some(NotificationLevel::Warning));
        assert!(app.runtime.block_on(app.repo.list()).unwrap().is_empty());
    }

    #[test]
    fn test_leaving_field_marks_it_touched() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        assert!(app.form.name.message().is_none());
        app.set_focus(Focus::Date);
        assert_eq!(app.form.name.message(), Some("Name is required"));
    }

    #[test]
    fn test_toggle_selected_moves_task() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        type_into(&mut app, FieldId::Name, "Walk dog");
        app.submit_form();

        app.set_focus(Focus::Pending);
        app.toggle_selected();
        assert!(app.lists.pending.is_empty());
        assert_eq!(app.lists.done.len(), 1);

        app.set_focus(Focus::Done);
        app.toggle_selected();
        assert_eq!(app.lists.pending.len(), 1);
        assert!(app.lists.done.is_empty());
    }

    #[test]
    fn test_stale_toggle_keeps_state_consistent() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        type_into(&mut app, FieldId::Name, "Walk dog");
        app.submit_form();

        // 另一处修改了任务
        let task = app.lists.pending[0].task.clone();
        app.runtime.block_on(app.repo.toggle_status(&task)).unwrap();

        app.set_focus(Focus::Pending);
        app.toggle_selected();
        assert_eq!(app.notification.as_ref().map(|n| n.level), Some(NotificationLevel::Warning));
        // 冲突后重新加载，任务显示在已完成列表
        assert!(app.lists.pending.is_empty());
        assert_eq!(app.lists.done.len(), 1);
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        type_into(&mut app, FieldId::Name, "Buy milk");
        app.submit_form();
        app.export();

        let path = dir.path().join(backup::BACKUP_FILE_NAME);
        assert!(path.exists());

        app.import(&path);
        assert_eq!(app.lists.pending.len(), 1);
        assert_eq!(app.notification.as_ref().map(|n| n.level), Some(NotificationLevel::Success));
    }

    #[test]
    fn test_selection_is_clamped() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        for name in ["a", "b"] {
            type_into(&mut app, FieldId::Name, name);
            app.submit_form();
        }

        app.set_focus(Focus::Pending);
        app.move_selection(5);
        assert_eq!(app.selected_pending, 1);
        app.move_selection(-9);
        assert_eq!(app.selected_pending, 0);
    }
}
