// src/cli/show_config.rs
//! Config 命令 - 打印生效的引擎配置

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::format_output;
use crate::config::EngineConfig;

/// Config 命令参数
#[derive(Args)]
pub struct ConfigArgs {
    /// 配置文件路径（缺省使用默认路径）
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// 输出单行 JSON
    #[arg(long)]
    pub compact: bool,
}

/// 处理 config 命令
pub fn handle_config(args: ConfigArgs) -> Result<()> {
    let path = args.config.clone().unwrap_or_else(EngineConfig::default_path);
    let config = EngineConfig::load_or_default(Some(&path))?;
    eprintln!("# {}", path.display());
    println!("{}", format_output(&config, !args.compact));
    Ok(())
}
