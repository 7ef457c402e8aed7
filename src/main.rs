use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

mod app;
mod backup;
mod cli;
mod clock;
mod config;
mod input;
mod logging;
mod models;
mod render;
mod repository;
mod store;
mod ui;
mod validate;

use app::App;
use store::DocumentStore;

fn main() -> Result<()> {
    let config = config::load_config()?;
    let data_dir = config::data_dir(&config)?;

    // guard 必须活到退出，否则日志可能丢失
    let _log_guard = logging::init_logging(&data_dir, &config.log_level);
    tracing::info!(data_dir = %data_dir.display(), "starting tasklist");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // 处理 CLI 命令
    let should_run_tui = cli::handle_cli(&runtime, &config, &data_dir)?;

    // 如果 CLI 命令已处理，直接退出
    if !should_run_tui {
        return Ok(());
    }

    let repo = cli::open_repository(&runtime, &data_dir)?;

    // 创建应用
    let mut app = App::new(repo, runtime, config, data_dir);

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 运行应用
    let res = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "tui exited with error");
        eprintln!("Error: {:?}", err);
    }

    tracing::info!("exiting");
    Ok(())
}

fn run_app<B, S>(terminal: &mut Terminal<B>, app: &mut App<S>) -> Result<()>
where
    B: ratatui::backend::Backend,
    S: DocumentStore,
{
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // 过期通知自动消失
        if app.notification.as_ref().is_some_and(|n| n.is_expired()) {
            app.notification = None;
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Windows 上会同时收到按下和释放事件
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !input::handle_key_input(app, key) {
                    return Ok(()); // 退出应用
                }
            }
        }
    }
}
