//! 通知请求 - 入口校验与不可变请求值
//!
//! `ShowRequest` 是调用方（通知协议适配层）提交的原始请求，
//! 经过 `validate` 之后变成不可变的 `NotificationRequest`。
//! 管理器只会看到校验过的请求，自身不做任何校验。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::urgency::Urgency;

/// 通知 ID（与通知协议的 u32 id 对应，0 表示"未指定"）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u32);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NotificationId {
    fn from(id: u32) -> Self {
        NotificationId(id)
    }
}

/// 通知动作（key 是不透明标识，label 用于显示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub key: String,
    pub label: String,
}

/// 过期策略（由 expire_timeout 解析而来）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiry {
    /// -1：使用 urgency 默认时长
    #[default]
    Default,
    /// 0：永不自动过期
    Never,
    /// >0：调用方指定时长
    After(Duration),
}

impl Expiry {
    fn from_timeout_ms(ms: i32) -> Result<Self, IntakeError> {
        match ms {
            -1 => Ok(Expiry::Default),
            0 => Ok(Expiry::Never),
            ms if ms > 0 => Ok(Expiry::After(Duration::from_millis(ms as u64))),
            ms => Err(IntakeError::InvalidExpireTimeout(ms)),
        }
    }
}

/// 入口错误（请求被拒绝，不会进入状态机）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IntakeError {
    #[error("notification summary is empty")]
    EmptySummary,

    #[error("action at position {0} has an empty key")]
    EmptyActionKey(usize),

    #[error("duplicate action key: {0}")]
    DuplicateActionKey(String),

    #[error("invalid expire timeout: {0} ms (expected -1, 0 or a positive value)")]
    InvalidExpireTimeout(i32),

    #[error("notification engine is no longer running")]
    Disconnected,
}

/// 调用方提交的原始通知请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRequest {
    /// 替换的通知 ID（0 或缺省表示由入口分配）
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub app_name: String,
    pub summary: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    /// -1 = urgency 默认，0 = 永不过期
    #[serde(default = "default_expire_timeout")]
    pub expire_timeout_ms: i32,
    /// 接收时间（仅用于显示；缺省时在校验时取当前时间）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Local>>,
}

fn default_expire_timeout() -> i32 {
    -1
}

impl ShowRequest {
    /// 创建简单请求
    pub fn new(summary: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            id: 0,
            app_name: String::new(),
            summary: summary.into(),
            body: String::new(),
            urgency,
            icon: None,
            actions: Vec::new(),
            expire_timeout_ms: -1,
            received_at: None,
        }
    }

    /// 指定（替换）通知 ID
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// 追加一个动作（保持顺序）
    pub fn with_action(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.actions.push(Action {
            key: key.into(),
            label: label.into(),
        });
        self
    }

    pub fn with_expire_timeout_ms(mut self, ms: i32) -> Self {
        self.expire_timeout_ms = ms;
        self
    }

    /// 固定接收时间（测试和回放脚本需要确定性输出）
    pub fn with_received_at(mut self, at: DateTime<Local>) -> Self {
        self.received_at = Some(at);
        self
    }

    /// 校验并生成不可变请求
    ///
    /// `id` 是入口最终分配的 ID（调用方指定的或新生成的）。
    pub fn validate(self, id: NotificationId) -> Result<NotificationRequest, IntakeError> {
        if self.summary.trim().is_empty() {
            return Err(IntakeError::EmptySummary);
        }

        for (i, action) in self.actions.iter().enumerate() {
            if action.key.is_empty() {
                return Err(IntakeError::EmptyActionKey(i));
            }
            if self.actions[..i].iter().any(|a| a.key == action.key) {
                return Err(IntakeError::DuplicateActionKey(action.key.clone()));
            }
        }

        let expiry = Expiry::from_timeout_ms(self.expire_timeout_ms)?;

        Ok(NotificationRequest {
            id,
            app_name: self.app_name,
            summary: self.summary,
            body: self.body,
            urgency: self.urgency,
            icon: self.icon,
            actions: self.actions,
            expiry,
            received_at: self.received_at.unwrap_or_else(Local::now),
        })
    }
}

/// 校验后的不可变通知请求
///
/// 只能由 `ShowRequest::validate` 构造，管理器因此不会看到未经校验的请求：
/// ```compile_fail
/// use shatter_notify::notification::{Expiry, NotificationId, NotificationRequest, Urgency};
///
/// let raw = NotificationRequest {
///     id: NotificationId(0),
///     app_name: String::new(),
///     summary: String::new(),
///     body: String::new(),
///     urgency: Urgency::Normal,
///     icon: None,
///     actions: Vec::new(),
///     expiry: Expiry::Default,
///     received_at: chrono::Local::now(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct NotificationRequest {
    pub id: NotificationId,
    pub app_name: String,
    pub summary: String,
    pub body: String,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub actions: Vec<Action>,
    pub expiry: Expiry,
    pub received_at: DateTime<Local>,
}

impl NotificationRequest {
    /// 显示用的时间标签（HH:MM）
    pub fn time_label(&self) -> String {
        self.received_at.format("%H:%M").to_string()
    }

    /// 默认动作（freedesktop 约定 key 为 "default"）
    pub fn default_action(&self) -> Option<&Action> {
        self.actions.iter().find(|a| a.key == "default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> NotificationId {
        NotificationId(n)
    }

    #[test]
    fn test_validate_minimal_request() {
        let req = ShowRequest::new("Build finished", Urgency::Normal)
            .validate(id(1))
            .unwrap();
        assert_eq!(req.id, id(1));
        assert_eq!(req.summary, "Build finished");
        assert_eq!(req.expiry, Expiry::Default);
        assert!(req.actions.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_summary() {
        let err = ShowRequest::new("   ", Urgency::Low).validate(id(1)).unwrap_err();
        assert_eq!(err, IntakeError::EmptySummary);
    }

    #[test]
    fn test_validate_rejects_bad_actions() {
        let err = ShowRequest::new("x", Urgency::Normal)
            .with_action("open", "Open")
            .with_action("", "Nothing")
            .validate(id(1))
            .unwrap_err();
        assert_eq!(err, IntakeError::EmptyActionKey(1));

        let err = ShowRequest::new("x", Urgency::Normal)
            .with_action("open", "Open")
            .with_action("open", "Open again")
            .validate(id(1))
            .unwrap_err();
        assert_eq!(err, IntakeError::DuplicateActionKey("open".to_string()));
    }

    #[test]
    fn test_expire_timeout_mapping() {
        let never = ShowRequest::new("x", Urgency::Critical)
            .with_expire_timeout_ms(0)
            .validate(id(1))
            .unwrap();
        assert_eq!(never.expiry, Expiry::Never);

        let after = ShowRequest::new("x", Urgency::Normal)
            .with_expire_timeout_ms(1500)
            .validate(id(1))
            .unwrap();
        assert_eq!(after.expiry, Expiry::After(Duration::from_millis(1500)));

        let err = ShowRequest::new("x", Urgency::Normal)
            .with_expire_timeout_ms(-5)
            .validate(id(1))
            .unwrap_err();
        assert_eq!(err, IntakeError::InvalidExpireTimeout(-5));
    }

    #[test]
    fn test_actions_keep_order() {
        let req = ShowRequest::new("x", Urgency::Normal)
            .with_action("default", "Open")
            .with_action("dismiss", "Dismiss")
            .validate(id(1))
            .unwrap();
        let keys: Vec<_> = req.actions.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["default", "dismiss"]);
        assert_eq!(req.default_action().map(|a| a.label.as_str()), Some("Open"));
    }

    #[test]
    fn test_show_request_from_json_defaults() {
        let req: ShowRequest =
            serde_json::from_str(r#"{"summary": "hello", "urgency": "critical"}"#).unwrap();
        assert_eq!(req.id, 0);
        assert_eq!(req.urgency, Urgency::Critical);
        assert_eq!(req.expire_timeout_ms, -1);
        assert!(req.received_at.is_none());
    }
}
