//! 事件处理模块

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::notification::Urgency;

/// TUI 事件
#[derive(Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
}

/// 轮询事件
pub fn poll_event(timeout: Duration) -> Result<Option<TuiEvent>> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            return Ok(Some(TuiEvent::Key(key)));
        }
    }
    Ok(None)
}

/// 处理按键事件
pub fn handle_key(app: &mut crate::tui::App, key: KeyEvent) {
    // Windows 上会收到 Release
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('n') => app.submit_demo(Urgency::Normal),
        KeyCode::Char('l') => app.submit_demo(Urgency::Low),
        KeyCode::Char('c') => app.submit_demo(Urgency::Critical),
        KeyCode::Char('x') => app.close_oldest(),
        KeyCode::Char('a') => app.invoke_on_newest(),
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_pause(),
        _ => {}
    }
}
