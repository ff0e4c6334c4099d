//! Shatter Notify CLI
//!
//! 脱离合成器运行通知动画引擎：脚本模拟、终端预览、查看配置

use anyhow::Result;
use clap::{Parser, Subcommand};
use shatter_notify::cli::{ConfigArgs, SimulateArgs};
use shatter_notify::EngineConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "shatter")]
#[command(about = "Shatter Notify - 带粒子破碎效果的通知动画引擎")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行事件脚本，每个 tick 输出一行 JSON 绘制列表
    Simulate(SimulateArgs),
    /// 在终端里预览通知动画
    Preview {
        /// 每帧间隔（毫秒）
        #[arg(long, default_value = "16")]
        tick_ms: u64,
        /// 配置文件路径
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// 打印生效的配置
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 通过 RUST_LOG 环境变量控制日志级别
    // 预览模式占用整个终端，默认只输出警告
    let default_filter = match cli.command {
        Commands::Preview { .. } => "shatter_notify=warn,shatter=warn",
        _ => "shatter_notify=info,shatter=info",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Simulate(args) => {
            shatter_notify::cli::handle_simulate(args).await?;
        }
        Commands::Preview { tick_ms, config } => {
            use shatter_notify::tui::{App, init_terminal, restore_terminal, run};

            let config = EngineConfig::load_or_default(config.as_deref())?;
            info!(max_live = config.max_live, "Starting preview");

            let mut terminal = init_terminal()?;
            let mut app = App::new(config);

            let result = run(&mut terminal, &mut app, Duration::from_millis(tick_ms.max(1)));

            restore_terminal(&mut terminal)?;

            result?;
        }
        Commands::Config(args) => {
            shatter_notify::cli::handle_config(args)?;
        }
    }

    Ok(())
}
