//! TUI 渲染模块
//!
//! 把显示器坐标按比例缩放到终端区域，卡片和粒子都按绘制列表的位置画出。

use crate::notification::{DrawEntry, MonitorGeometry, Phase, Urgency, Vec2};
use crate::tui::App;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// 低于这个透明度时卡片变暗
const FAINT_OPACITY: f32 = 0.5;

/// 渲染主界面
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // 垂直分割: 状态栏 | 桌面 | 底部栏
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // 状态栏
            Constraint::Min(4),    // 桌面
            Constraint::Length(1), // 快捷键
        ])
        .split(area);

    let manager = app.manager();
    let mut status = format!(
        " Shatter │ t={}ms │ Live: {}/{} │ Pending: {}",
        app.frame.clock_ms,
        manager.live_count(),
        manager.config().max_live,
        manager.pending_count()
    );
    if app.paused {
        status.push_str(" │ PAUSED");
    }
    if let Some(error) = &app.last_error {
        status.push_str(&format!(" │ {}", error));
    }
    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(status_bar, vertical[0]);

    let monitor = manager.config().monitor;
    let desktop = Block::default()
        .borders(Borders::ALL)
        .title(" Desktop ")
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = desktop.inner(vertical[1]);
    frame.render_widget(desktop, vertical[1]);

    let scale = Scale::new(&monitor, inner);
    let card = manager.config().card;
    for entry in &app.frame.entries {
        render_card(frame, &scale, entry, card.width, card.height);
    }
    // 粒子画在所有卡片之上
    for entry in &app.frame.entries {
        render_particles(frame, &scale, entry);
    }

    let help =
        " [n] normal  [l] low  [c] critical  [x] close oldest  [a] action  [p] pause  [q] quit ";
    let help_bar = Paragraph::new(help).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(help_bar, vertical[2]);
}

/// 显示器坐标到终端单元格的映射
struct Scale {
    origin: Vec2,
    sx: f32,
    sy: f32,
    area: Rect,
}

impl Scale {
    fn new(monitor: &MonitorGeometry, area: Rect) -> Self {
        Self {
            origin: Vec2::new(monitor.x, monitor.y),
            sx: area.width as f32 / monitor.width,
            sy: area.height as f32 / monitor.height,
            area,
        }
    }

    fn cell(&self, p: Vec2) -> (i32, i32) {
        let x = self.area.x as i32 + ((p.x - self.origin.x) * self.sx).round() as i32;
        let y = self.area.y as i32 + ((p.y - self.origin.y) * self.sy).round() as i32;
        (x, y)
    }
}

/// 把可能部分在区域外的矩形裁剪到区域内
pub(crate) fn clip(area: Rect, x: i32, y: i32, width: i32, height: i32) -> Option<Rect> {
    let left = x.max(area.x as i32);
    let top = y.max(area.y as i32);
    let right = (x + width).min(area.x as i32 + area.width as i32);
    let bottom = (y + height).min(area.y as i32 + area.height as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::Low => Color::DarkGray,
        Urgency::Normal => Color::Cyan,
        Urgency::Critical => Color::Red,
    }
}

fn render_card(frame: &mut Frame, scale: &Scale, entry: &DrawEntry, width: f32, height: f32) {
    let (x, y) = scale.cell(entry.painted_position());
    let w = ((width * scale.sx).round() as i32).max(3);
    let h = ((height * scale.sy).round() as i32).max(3);
    let Some(rect) = clip(scale.area, x, y, w, h) else {
        return;
    };

    let content = &entry.content;
    let mut style = Style::default().fg(urgency_color(content.urgency));
    if entry.opacity < FAINT_OPACITY {
        style = style.add_modifier(Modifier::DIM);
    }
    if entry.phase == Phase::Breaking {
        style = style.add_modifier(Modifier::BOLD);
    }

    let title = if content.app_name.is_empty() {
        format!(" {} ", content.summary)
    } else {
        format!(" {} · {} ", content.app_name, content.summary)
    };
    let mut text = content.body.clone();
    if !content.actions.is_empty() {
        let labels: Vec<&str> = content.actions.iter().map(|a| a.label.as_str()).collect();
        text.push_str(&format!("\n[{}]", labels.join("] [")));
    }

    let card = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_bottom(format!(" {} ", content.time_label()))
            .border_style(style),
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(card, rect);
}

fn render_particles(frame: &mut Frame, scale: &Scale, entry: &DrawEntry) {
    let color = urgency_color(entry.content.urgency);
    let area = scale.area;
    let buf = frame.buffer_mut();
    for particle in &entry.particles {
        let (x, y) = scale.cell(particle.position);
        if clip(area, x, y, 1, 1).is_none() {
            continue;
        }
        let glyph = match particle.alpha {
            a if a > 0.66 => "*",
            a if a > 0.33 => "+",
            _ => ".",
        };
        buf.set_string(x as u16, y as u16, glyph, Style::default().fg(color));
    }
}
