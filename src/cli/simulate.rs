// src/cli/simulate.rs
//! Simulate 命令 - 无界面宿主，按 tick 输出绘制列表
//!
//! 事件脚本为 JSONL，每行一个事件：
//! ```text
//! {"at_ms": 0,   "show": {"id": 1, "summary": "Build finished", "urgency": "normal"}}
//! {"at_ms": 120, "action": {"id": 1, "key": "dismiss"}}
//! {"at_ms": 300, "close": 1}
//! ```
//! 默认按虚拟时间推送事件（结果可重复）；`--realtime` 时由 tokio 任务
//! 按真实时间异步推送，渲染 tick 由 `tokio::time::interval` 驱动。

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::notification::{
    intake, AnimationManager, DrawList, IntakeHandle, NotificationId, ShowRequest,
};

/// 未指定 --ticks 时的安全上限（约 10 分钟 @16ms）
const DEFAULT_TICK_LIMIT: u64 = 36_000;

/// Simulate 命令参数
#[derive(Args)]
pub struct SimulateArgs {
    /// 事件脚本（JSONL），缺省从 stdin 读取
    #[arg(long, short)]
    pub script: Option<PathBuf>,

    /// 运行的 tick 数（缺省：脚本结束且所有通知结束为止）
    #[arg(long)]
    pub ticks: Option<u64>,

    /// 每个 tick 的间隔（毫秒）
    #[arg(long, default_value = "16")]
    pub tick_ms: u64,

    /// 按真实时间异步推送事件
    #[arg(long)]
    pub realtime: bool,

    /// 同时输出没有任何通知的空帧
    #[arg(long)]
    pub include_empty: bool,

    /// 配置文件路径
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

/// 脚本中的一行
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptLine {
    /// 相对脚本开始的推送时间
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: ScriptEvent,
}

/// 脚本事件
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptEvent {
    Show(ShowRequest),
    Close(u32),
    Action { id: u32, key: String },
}

/// 运行统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationSummary {
    pub ticks: u64,
    pub frames_written: u64,
    pub rejected: u64,
}

/// 解析 JSONL 脚本（忽略空行和 # 注释行），按 at_ms 稳定排序
pub fn parse_script(content: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line: ScriptLine = serde_json::from_str(trimmed)
            .with_context(|| format!("脚本第 {} 行解析失败", index + 1))?;
        lines.push(line);
    }
    lines.sort_by_key(|l| l.at_ms);
    Ok(lines)
}

/// 推送一行脚本事件；被拒绝时返回 false
fn push_line(handle: &IntakeHandle, line: ScriptLine) -> bool {
    let at_ms = line.at_ms;
    let result = match line.event {
        ScriptEvent::Show(request) => handle.submit(request).map(|id| {
            debug!(at_ms, id = %id, "Script show submitted");
        }),
        ScriptEvent::Close(id) => handle.close(NotificationId(id)),
        ScriptEvent::Action { id, key } => handle.invoke_action(NotificationId(id), key),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(at_ms, error = %e, "Script event rejected");
            false
        }
    }
}

fn write_frame<W: Write>(out: &mut W, frame: &DrawList) -> Result<()> {
    serde_json::to_writer(&mut *out, frame)?;
    writeln!(out)?;
    Ok(())
}

/// 以虚拟时间运行脚本：tick 开始时推送所有 at_ms ≤ 当前时钟的事件
///
/// 相同的脚本、配置和 tick 间隔总是产生相同的输出。
pub fn run_script<W: Write>(
    lines: Vec<ScriptLine>,
    config: EngineConfig,
    tick: Duration,
    max_ticks: Option<u64>,
    include_empty: bool,
    out: &mut W,
) -> Result<SimulationSummary> {
    let (handle, queue) = intake::channel();
    let mut manager = AnimationManager::new(config, queue);
    let mut script = lines.into_iter().peekable();
    let mut summary = SimulationSummary::default();
    let limit = max_ticks.unwrap_or(DEFAULT_TICK_LIMIT);

    while summary.ticks < limit {
        let now_ms = manager.clock().as_millis() as u64;
        while let Some(line) = script.next_if(|l| l.at_ms <= now_ms) {
            if !push_line(&handle, line) {
                summary.rejected += 1;
            }
        }

        let frame = manager.tick(tick);
        summary.ticks += 1;
        if include_empty || !frame.is_empty() {
            write_frame(out, &frame)?;
            summary.frames_written += 1;
        }

        if max_ticks.is_none() && script.peek().is_none() && manager.is_idle() {
            break;
        }
    }

    if max_ticks.is_none() && summary.ticks >= limit {
        warn!(limit, "Tick limit reached with notifications still on screen");
    }
    manager.release_all();
    Ok(summary)
}

/// 以真实时间运行：生产者任务异步推送，渲染 tick 按固定间隔推进
async fn run_realtime<W: Write>(
    lines: Vec<ScriptLine>,
    config: EngineConfig,
    tick: Duration,
    max_ticks: Option<u64>,
    include_empty: bool,
    out: &mut W,
) -> Result<SimulationSummary> {
    let (handle, queue) = intake::channel();
    let mut manager = AnimationManager::new(config, queue);
    let limit = max_ticks.unwrap_or(DEFAULT_TICK_LIMIT);

    let producer_handle = handle.clone();
    let producer = tokio::spawn(async move {
        let start = Instant::now();
        let mut rejected = 0u64;
        for line in lines {
            tokio::time::sleep_until(start + Duration::from_millis(line.at_ms)).await;
            if !push_line(&producer_handle, line) {
                rejected += 1;
            }
        }
        rejected
    });

    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();
    let mut summary = SimulationSummary::default();

    while summary.ticks < limit {
        interval.tick().await;
        let now = Instant::now();
        let frame = manager.tick(now - last);
        last = now;
        summary.ticks += 1;

        if include_empty || !frame.is_empty() {
            write_frame(out, &frame)?;
            summary.frames_written += 1;
        }

        if max_ticks.is_none() && producer.is_finished() && manager.is_idle() {
            break;
        }
    }

    if producer.is_finished() {
        match producer.await {
            Ok(rejected) => summary.rejected = rejected,
            Err(e) => warn!(error = %e, "Script producer task failed"),
        }
    } else {
        producer.abort();
    }
    manager.release_all();
    Ok(summary)
}

/// 处理 simulate 命令
pub async fn handle_simulate(args: SimulateArgs) -> Result<()> {
    let config = EngineConfig::load_or_default(args.config.as_deref())?;

    let content = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("读取脚本失败: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("读取 stdin 失败")?;
            buf
        }
    };
    let lines = parse_script(&content)?;
    info!(events = lines.len(), realtime = args.realtime, "Starting simulation");

    let tick = Duration::from_millis(args.tick_ms.max(1));
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let summary = if args.realtime {
        run_realtime(lines, config, tick, args.ticks, args.include_empty, &mut out).await?
    } else {
        run_script(lines, config, tick, args.ticks, args.include_empty, &mut out)?
    };
    out.flush()?;

    info!(
        ticks = summary.ticks,
        frames = summary.frames_written,
        rejected = summary.rejected,
        "Simulation finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
# two notifications, one dismissed early
{"at_ms": 0, "show": {"id": 1, "summary": "first", "urgency": "low", "received_at": "2026-01-01T10:00:00+00:00"}}
{"at_ms": 32, "show": {"id": 2, "summary": "second", "received_at": "2026-01-01T10:00:00+00:00"}}
{"at_ms": 64, "action": {"id": 2, "key": "dismiss"}}
"#;

    fn frames(output: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_script() {
        let lines = parse_script(SCRIPT).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(matches!(lines[0].event, ScriptEvent::Show(_)));
        assert!(matches!(
            lines[2].event,
            ScriptEvent::Action { id: 2, ref key } if key == "dismiss"
        ));
    }

    #[test]
    fn test_parse_script_reports_line_number() {
        let err = parse_script("{\"at_ms\": 0, \"close\": 1}\nnot json").unwrap_err();
        assert!(format!("{err:#}").contains("第 2 行"));
    }

    #[test]
    fn test_parse_script_sorts_by_time() {
        let lines = parse_script(
            "{\"at_ms\": 50, \"close\": 1}\n{\"at_ms\": 10, \"close\": 2}",
        )
        .unwrap();
        assert_eq!(lines[0].at_ms, 10);
        assert_eq!(lines[1].at_ms, 50);
    }

    #[test]
    fn test_run_script_until_idle() {
        let lines = parse_script(SCRIPT).unwrap();
        let mut out = Vec::new();
        let summary = run_script(
            lines,
            EngineConfig::default(),
            Duration::from_millis(16),
            None,
            false,
            &mut out,
        )
        .unwrap();

        assert_eq!(summary.rejected, 0);
        assert!(summary.ticks > 0);
        let frames = frames(&out);
        assert_eq!(frames.len() as u64, summary.frames_written);
        // the last frame still shows the low notification leaving
        let last = frames.last().unwrap();
        assert_eq!(last["entries"][0]["id"], 1);
    }

    #[test]
    fn test_run_script_is_deterministic() {
        let run = || {
            let mut out = Vec::new();
            run_script(
                parse_script(SCRIPT).unwrap(),
                EngineConfig::default(),
                Duration::from_millis(16),
                Some(120),
                true,
                &mut out,
            )
            .unwrap();
            out
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_rejected_events_are_counted() {
        let lines = parse_script(r#"{"at_ms": 0, "show": {"summary": ""}}"#).unwrap();
        let mut out = Vec::new();
        let summary = run_script(
            lines,
            EngineConfig::default(),
            Duration::from_millis(16),
            Some(3),
            true,
            &mut out,
        )
        .unwrap();
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.frames_written, 3);
    }

    #[tokio::test]
    async fn test_run_realtime_with_tick_limit() {
        let lines = parse_script(r#"{"at_ms": 0, "show": {"id": 3, "summary": "rt"}}"#).unwrap();
        let mut out = Vec::new();
        let summary = run_realtime(
            lines,
            EngineConfig::default(),
            Duration::from_millis(5),
            Some(20),
            false,
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(summary.ticks, 20);
        assert!(summary.frames_written > 0);
    }
}
