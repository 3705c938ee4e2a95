//! 学习任务跟踪 CLI
//!
//! 非交互式命令行：每次执行一个子命令，结果以 JSON 输出到 stdout

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use study_tracker_core::tracker::assignment::Assignment;
use study_tracker_core::tracker::exam::Exam;
use study_tracker_core::tracker::project::Project;
use study_tracker_core::tracker::usecase::{
    GetCurrentSheetConfigUseCase, MarkAssignmentCompleteUseCase, UpdateGoogleSheetUrlUseCase,
    ValidateSheetUrlUseCase, ViewItemDetailsUseCase,
};
use study_tracker_core::{ClientConfig, ItemKind, SyncRepository, TrackedItem, TrackerClient};
use tracing::{info, warn};

/// 学习任务跟踪 CLI
#[derive(Parser, Debug)]
#[command(name = "tracker-cli")]
#[command(about = "学习任务跟踪 CLI - 作业、考试、项目与 Google Sheets 同步", long_about = None)]
struct Args {
    /// 本地数据库 URL
    #[arg(long, default_value = "sqlite://tracker.db?mode=rwc")]
    db: String,

    /// Google Sheets 脚本地址（为空时使用已保存的配置）
    #[arg(long, default_value = "")]
    script_url: String,

    /// 请求超时（秒）
    #[arg(long, default_value = "120")]
    timeout: u64,

    /// 日志级别（默认: warn,study_tracker_core=info）
    #[arg(long, default_value = "warn,study_tracker_core=info")]
    log_level: String,

    /// 额外写入的日志文件
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 从远端拉取三类条目并合并到本地
    Sync,
    /// 列出某类条目（先同步）
    List { kind: ItemKind },
    /// 查看单个条目（只读本地）
    Show { kind: ItemKind, id: i64 },
    /// 三类条目中日期在当前时间之后的部分
    Upcoming,
    /// 仪表盘统计
    Dashboard,
    AddAssignment {
        title: String,
        /// YYYY-MM-DD 或 RFC 3339
        #[arg(long)]
        due: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    AddExam {
        title: String,
        /// YYYY-MM-DD 或 RFC 3339
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    AddProject {
        title: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        due: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// 将作业标记为已完成
    Complete { id: i64 },
    /// 设置项目进度（0-100）
    Progress { id: i64, value: i32 },
    /// 删除本地条目
    Delete { kind: ItemKind, id: i64 },
    /// 表格地址配置
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    SetUrl { url: String },
    Validate { url: String },
}

/// 初始化日志（stdout，指定了 --log-file 时同时写文件）
fn init_logger(log_level: &str, log_file: Option<&PathBuf>) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // stdout 只输出 JSON 结果，日志走 stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(true);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("无法创建日志文件 {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(false)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

/// 解析 `YYYY-MM-DD`（按 UTC 零点）或 RFC 3339，返回毫秒时间戳
fn parse_date(input: &str) -> Result<i64> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("无效日期: {}", input))?;
        return Ok(start.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.timestamp_millis())
        .with_context(|| format!("无法解析日期 {:?}（需要 YYYY-MM-DD 或 RFC 3339）", input))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn list_items<T: TrackedItem + Serialize>(repo: &SyncRepository<T>) -> Result<()> {
    repo.load_all().await;
    if let Some(error) = repo.current_error() {
        warn!("[CLI] 同步 {} 失败，显示本地缓存: {}", T::KIND, error);
    }
    print_json(&repo.current_items())
}

async fn show_item<T: TrackedItem + Serialize>(
    repo: std::sync::Arc<SyncRepository<T>>,
    id: i64,
) -> Result<()> {
    match ViewItemDetailsUseCase::new(repo).execute(id).await? {
        Some(item) => print_json(&item),
        None => Err(anyhow!("{} {} 不存在", T::KIND, id)),
    }
}

async fn delete_item<T: TrackedItem>(repo: &SyncRepository<T>, id: i64) -> Result<()> {
    repo.delete(id).await?;
    info!("[CLI] 已删除 {} {}", T::KIND, id);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level, args.log_file.as_ref())?;

    let mut config = ClientConfig::new(args.db.clone());
    config.script_url = args.script_url.clone();
    config.request_timeout = Duration::from_secs(args.timeout);
    let client = TrackerClient::connect(config).await?;

    match args.command {
        Command::Sync => {
            let errors = client.sync_all().await;
            for (kind, error) in &errors {
                warn!("[CLI] {} 同步失败: {}", kind, error);
            }
            println!(
                "assignments={} exams={} projects={} failed={}",
                client.assignments().current_items().len(),
                client.exams().current_items().len(),
                client.projects().current_items().len(),
                errors.len()
            );
        }
        Command::List { kind } => match kind {
            ItemKind::Assignment => list_items(&client.assignments()).await?,
            ItemKind::Exam => list_items(&client.exams()).await?,
            ItemKind::Project => list_items(&client.projects()).await?,
        },
        Command::Show { kind, id } => match kind {
            ItemKind::Assignment => show_item(client.assignments(), id).await?,
            ItemKind::Exam => show_item(client.exams(), id).await?,
            ItemKind::Project => show_item(client.projects(), id).await?,
        },
        Command::Upcoming => {
            print_json(&client.upcoming_items().execute().await?)?;
        }
        Command::Dashboard => {
            client.sync_all().await;
            print_json(&client.dashboard_overview().execute().await?)?;
        }
        Command::AddAssignment {
            title,
            due,
            subject,
            description,
            priority,
        } => {
            let item = Assignment {
                title,
                description,
                due_date: parse_date(&due)?,
                subject,
                priority,
                ..Default::default()
            };
            let id = client.assignments().insert(&item).await?;
            println!("{}", id);
        }
        Command::AddExam {
            title,
            date,
            subject,
            description,
        } => {
            let item = Exam {
                title,
                subject,
                exam_date: parse_date(&date)?,
                description,
                ..Default::default()
            };
            let id = client.exams().insert(&item).await?;
            println!("{}", id);
        }
        Command::AddProject {
            title,
            start,
            due,
            subject,
            description,
        } => {
            let item = Project {
                title,
                description,
                start_date: parse_date(&start)?,
                due_date: parse_date(&due)?,
                subject,
                ..Default::default()
            };
            let id = client.projects().insert(&item).await?;
            println!("{}", id);
        }
        Command::Complete { id } => {
            MarkAssignmentCompleteUseCase::new(client.assignments())
                .execute(id)
                .await?;
        }
        Command::Progress { id, value } => {
            client.projects().update_progress(id, value).await?;
        }
        Command::Delete { kind, id } => match kind {
            ItemKind::Assignment => delete_item(&client.assignments(), id).await?,
            ItemKind::Exam => delete_item(&client.exams(), id).await?,
            ItemKind::Project => delete_item(&client.projects(), id).await?,
        },
        Command::Config(ConfigCommand::Show) => {
            match GetCurrentSheetConfigUseCase::new(client.app_config())
                .execute()
                .await?
            {
                Some(config) => print_json(&config)?,
                None => println!("未配置表格地址"),
            }
        }
        Command::Config(ConfigCommand::SetUrl { url }) => {
            let saved = UpdateGoogleSheetUrlUseCase::new(client.app_config())
                .execute(&url)
                .await?;
            print_json(&saved)?;
        }
        Command::Config(ConfigCommand::Validate { url }) => {
            let ok = ValidateSheetUrlUseCase::new(client.app_config())
                .execute(&url)
                .await;
            println!("{}", if ok { "ok" } else { "unreachable" });
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
