use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::backup;
use crate::config::Config;
use crate::models::TaskStatus;
use crate::render::{build_lists, format_date};
use crate::repository::TaskRepository;
use crate::store::{JsonFileStore, DATA_FILE_NAME};
use crate::validate;

/// 打开数据目录下的任务库
pub fn open_repository(runtime: &Runtime, data_dir: &Path) -> Result<TaskRepository<JsonFileStore>> {
    let path = data_dir.join(DATA_FILE_NAME);
    let store = runtime
        .block_on(JsonFileStore::open(&path))
        .with_context(|| format!("failed to open {}", path.display()))?;
    let repo = TaskRepository::new(store);
    runtime.block_on(repo.resume_ids())?;
    Ok(repo)
}

/// 处理 CLI 命令
/// 返回 true 表示应该继续进入 TUI，false 表示已处理完毕应该退出
pub fn handle_cli(runtime: &Runtime, config: &Config, data_dir: &Path) -> Result<bool> {
    let args: Vec<String> = env::args().collect();

    // 如果没有参数，进入 TUI 模式
    if args.len() < 2 {
        return Ok(true);
    }

    let result = match args[1].as_str() {
        "add" => {
            if args.len() < 3 {
                eprintln!("Usage: tasklist add <name> [--date <date>]");
                std::process::exit(1);
            }
            open_repository(runtime, data_dir).and_then(|repo| cli_add(runtime, &repo, &args[2..]))
        }
        "list" => open_repository(runtime, data_dir).and_then(|repo| {
            let status = parse_flag(&args[2..], "--status");
            cli_list(runtime, &repo, config, status.as_deref())
        }),
        "toggle" => {
            if args.len() < 3 {
                eprintln!("Usage: tasklist toggle <id>");
                std::process::exit(1);
            }
            open_repository(runtime, data_dir).and_then(|repo| cli_toggle(runtime, &repo, &args[2]))
        }
        "export" => open_repository(runtime, data_dir).and_then(|repo| {
            let dir = args.get(2).map(PathBuf::from).unwrap_or_else(|| data_dir.to_path_buf());
            cli_export(runtime, &repo, &dir)
        }),
        "import" => {
            if args.len() < 3 {
                eprintln!("Usage: tasklist import <file>");
                std::process::exit(1);
            }
            open_repository(runtime, data_dir)
                .and_then(|repo| cli_import(runtime, &repo, Path::new(&args[2])))
        }
        "config" => handle_config_command(&args[1..]),
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "-v" => {
            print_version();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            eprintln!("Run 'tasklist --help' for usage");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        tracing::error!(command = %args[1], error = %e, "command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(false)
}

// ============================================================================
// Task Commands
// ============================================================================

fn cli_add(runtime: &Runtime, repo: &TaskRepository<JsonFileStore>, args: &[String]) -> Result<()> {
    let (name, date) = split_name_and_date(args);

    let name = validate::check_name(&name)?;
    let date = match date {
        Some(value) => validate::check_date(&value)?,
        None => None,
    };

    let task = runtime.block_on(repo.create(&name, date))?;
    println!("✓ Added: {} ({})", task.name, task.id);
    Ok(())
}

fn cli_list(
    runtime: &Runtime,
    repo: &TaskRepository<JsonFileStore>,
    config: &Config,
    status: Option<&str>,
) -> Result<()> {
    let filter = match status {
        Some(value) => Some(
            TaskStatus::parse(value)
                .with_context(|| format!("unknown status '{}' (expected pending or done)", value))?,
        ),
        None => None,
    };

    let tasks = runtime.block_on(repo.list())?;
    let lists = build_lists(tasks, &config.date_format);

    let sections = [TaskStatus::Pending, TaskStatus::Done]
        .into_iter()
        .filter(|status| filter.is_none_or(|f| f == *status));

    for status in sections {
        let items = lists.list(status);
        println!("{} ({})", status.display(), items.len());
        for item in items {
            let date = item
                .task
                .date
                .map(|d| format_date(d, &config.date_format))
                .unwrap_or_default();
            println!("  {:<26} {:<12} {}", item.task.id, date, truncate(&item.task.name, 50));
        }
    }
    Ok(())
}

fn cli_toggle(runtime: &Runtime, repo: &TaskRepository<JsonFileStore>, id: &str) -> Result<()> {
    let task = runtime.block_on(async {
        let current = repo.get(id).await?;
        repo.toggle_status(&current).await
    })?;
    println!("✓ {} → {}", task.name, task.status.display());
    Ok(())
}

fn cli_export(runtime: &Runtime, repo: &TaskRepository<JsonFileStore>, dir: &Path) -> Result<()> {
    let path = runtime.block_on(backup::export_to(repo, dir))?;
    println!("✓ Exported to {}", path.display());
    Ok(())
}

fn cli_import(runtime: &Runtime, repo: &TaskRepository<JsonFileStore>, file: &Path) -> Result<()> {
    let report = runtime.block_on(backup::import_from(repo, file))?;

    println!(
        "✓ Imported {} ({} new, {} updated)",
        report.written(),
        report.inserted.len(),
        report.updated.len()
    );
    if !report.failed.is_empty() {
        println!("✗ {} failed:", report.failed.len());
        for failure in &report.failed {
            println!("  {}: {}", failure.id, failure.reason);
        }
    }
    Ok(())
}

// ============================================================================
// Config Commands
// ============================================================================

fn handle_config_command(args: &[String]) -> Result<()> {
    match args.get(1).map(|s| s.as_str()) {
        None | Some("show") => crate::config::show_config(),
        Some("data-dir") => {
            let Some(dir) = args.get(2) else {
                eprintln!("Usage: tasklist config data-dir <path>");
                std::process::exit(1);
            };
            crate::config::set_data_dir(PathBuf::from(dir))
        }
        Some("date-format") => {
            if args.len() < 3 {
                eprintln!("Usage: tasklist config date-format <format>");
                std::process::exit(1);
            }
            crate::config::set_date_format(args[2..].join(" "))
        }
        Some(other) => {
            eprintln!("Unknown config option: {}", other);
            eprintln!("Available: show, data-dir, date-format");
            std::process::exit(1);
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|s| s == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// `add` 的参数：名称可以是多个词，`--date` 及其值被单独取出
fn split_name_and_date(args: &[String]) -> (String, Option<String>) {
    let mut words = Vec::new();
    let mut date = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--date" {
            date = iter.next().cloned();
        } else {
            words.push(arg.as_str());
        }
    }

    (words.join(" "), date)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len - 3).collect::<String>())
    }
}

fn print_help() {
    println!("tasklist - a local task list\n");
    println!("Usage:");
    println!("  tasklist                       Start the TUI");
    println!("  tasklist <command> [args]      Run a CLI command");
    println!("  tasklist --help                Show this help");
    println!("  tasklist --version             Show the version\n");

    println!("Commands:");
    println!("  add <name> [--date <date>]     Add a pending task");
    println!("  list [--status pending|done]   List tasks, newest first");
    println!("  toggle <id>                    Flip a task between pending and done");
    println!("  export [<dir>]                 Write tasks-backup.json (default: data directory)");
    println!("  import <file>                  Merge a backup into the task list");
    println!("  config [show]                  Show the configuration");
    println!("  config data-dir <path>         Set the data directory");
    println!("  config date-format <format>    Set the list date format (strftime)\n");

    println!("Dates are accepted as YYYY-MM-DD or D/M/YYYY.\n");

    println!("TUI keys:");
    println!("  Tab / Shift+Tab   Move between Name, Date, Pending and Done");
    println!("  Enter             Add the task, or toggle the selected task");
    println!("  ↑↓ / j k          Move the selection");
    println!("  ←→ / h l          Switch between Pending and Done");
    println!("  a / n             Jump to the Name field");
    println!("  r                 Reload the lists from the store");
    println!("  e / i             Export / import");
    println!("  q / Esc           Quit (from a list)");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const NAME: &str = env!("CARGO_PKG_NAME");
    println!("{} {}", NAME, VERSION);
}
