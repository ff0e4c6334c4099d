//! TUI 应用状态和主循环

use anyhow::Result;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::notification::{
    intake, AnimationManager, DrawList, IntakeHandle, NotificationId, ShowRequest, Urgency,
};
use crate::tui::event::{handle_key, poll_event, TuiEvent};
use crate::tui::ui::render;

pub type AppResult<T> = Result<T>;

/// 终端类型
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// TUI 应用状态
pub struct App {
    /// 是否退出
    pub should_quit: bool,
    /// 暂停时不推进时钟
    pub paused: bool,
    /// 最近一帧
    pub frame: DrawList,
    /// 最近一次被拒绝的请求
    pub last_error: Option<String>,
    handle: IntakeHandle,
    manager: AnimationManager,
    counter: u32,
}

impl App {
    pub fn new(config: EngineConfig) -> Self {
        let (handle, queue) = intake::channel();
        Self {
            should_quit: false,
            paused: false,
            frame: DrawList::default(),
            last_error: None,
            handle,
            manager: AnimationManager::new(config, queue),
            counter: 0,
        }
    }

    pub fn manager(&self) -> &AnimationManager {
        &self.manager
    }

    /// 提交一条演示通知
    pub fn submit_demo(&mut self, urgency: Urgency) {
        self.counter += 1;
        let mut request = ShowRequest::new(format!("Notification #{}", self.counter), urgency)
            .with_app_name("shatter")
            .with_body(format!("{} urgency demo", urgency));
        if urgency == Urgency::Critical {
            request = request
                .with_expire_timeout_ms(0)
                .with_action("default", "Open")
                .with_action("dismiss", "Dismiss");
        }
        match self.handle.submit(request) {
            Ok(id) => debug!(id = %id, urgency = %urgency, "Demo notification submitted"),
            Err(e) => self.reject(e),
        }
    }

    /// 关闭最早的、仍在屏幕上的通知
    pub fn close_oldest(&mut self) {
        if let Some(id) = self.target(false) {
            if let Err(e) = self.handle.close(id) {
                self.reject(e);
            }
        }
    }

    /// 对最新的通知触发动作（优先 dismiss）
    pub fn invoke_on_newest(&mut self) {
        let Some(id) = self.target(true) else {
            return;
        };
        let key = self
            .manager
            .get(id)
            .and_then(|live| {
                let actions = &live.request().actions;
                actions
                    .iter()
                    .find(|a| a.key == "dismiss")
                    .or_else(|| actions.first())
                    .map(|a| a.key.clone())
            })
            .unwrap_or_else(|| "default".to_string());
        if let Err(e) = self.handle.invoke_action(id, key) {
            self.reject(e);
        }
    }

    fn target(&self, newest: bool) -> Option<NotificationId> {
        let mut occupying = self
            .manager
            .iter()
            .filter(|live| live.phase().occupies_slot())
            .map(|live| live.id());
        if newest {
            occupying.last()
        } else {
            occupying.next()
        }
    }

    fn reject(&mut self, error: impl std::fmt::Display) {
        warn!(error = %error, "Request rejected");
        self.last_error = Some(error.to_string());
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// 推进一帧
    pub fn tick(&mut self, dt: Duration) {
        let dt = if self.paused { Duration::ZERO } else { dt };
        self.frame = self.manager.tick(dt);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// 退出前释放所有被抑制的窗口
    pub fn shutdown(&mut self) {
        self.manager.release_all();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// 进入 raw mode 和备用屏幕
pub fn init_terminal() -> AppResult<Tui> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// 恢复终端
pub fn restore_terminal(terminal: &mut Tui) -> AppResult<()> {
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    terminal.show_cursor()?;
    Ok(())
}

/// 主循环：按键随时处理，每隔 `tick` 推进一次动画
pub fn run(terminal: &mut Tui, app: &mut App, tick: Duration) -> AppResult<()> {
    let mut last_tick = Instant::now();

    while !app.should_quit {
        terminal.draw(|frame| render(app, frame))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if let Some(TuiEvent::Key(key)) = poll_event(timeout)? {
            handle_key(app, key);
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick {
            app.tick(elapsed);
            last_tick = Instant::now();
        }
    }

    app.shutdown();
    Ok(())
}
