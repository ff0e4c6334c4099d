//! 引擎配置 - 构造管理器时注入的静态配置
//!
//! 所有字段都有默认值，配置文件里只需要写想覆盖的部分：
//! ```json
//! { "max_live": 3, "urgency": { "low": { "show_ms": 2000, ... } } }
//! ```
//! 引擎本身不读文件；`load` / `load_or_default` 只给宿主程序使用。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::notification::geometry::{CardSize, MonitorGeometry, StackLayout};
use crate::notification::particle::EmitterConfig;
use crate::notification::urgency::UrgencyTable;

/// 配置校验错误
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("max_live must be at least 1")]
    ZeroMaxLive,

    #[error("row_height must be positive, got {0}")]
    InvalidRowHeight(f32),

    #[error("particle speed range is inverted: min {min} > max {max}")]
    InvertedSpeedRange { min: f32, max: f32 },

    #[error("monitor geometry must have a positive size")]
    EmptyMonitor,

    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 同时占用槽位的通知上限（N_max）
    pub max_live: usize,
    /// 等待接纳的请求上限（超出时丢弃最旧的）
    pub max_pending: usize,
    /// 每个槽位的垂直间距
    pub row_height: f32,
    /// 通知卡片尺寸
    pub card: CardSize,
    /// 卡片与屏幕边缘的距离
    pub margin: f32,
    /// 目标显示器
    pub monitor: MonitorGeometry,
    /// 每个通知的粒子池容量
    pub particle_capacity: usize,
    /// 破碎阶段的抖动幅度（像素）
    pub shake_magnitude: f32,
    /// 粒子发射参数
    pub particles: EmitterConfig,
    /// 各 urgency 的时间表
    pub urgency: UrgencyTable,
    /// 粒子随机数种子（与通知 ID 异或）
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_live: 5,
            max_pending: 64,
            row_height: 96.0,
            card: CardSize::default(),
            margin: 16.0,
            monitor: MonitorGeometry::default(),
            particle_capacity: 128,
            shake_magnitude: 6.0,
            particles: EmitterConfig::default(),
            urgency: UrgencyTable::default(),
            rng_seed: 0x5EED_CAFE,
        }
    }
}

impl EngineConfig {
    /// 默认配置文件路径：<config dir>/shatter-notify/config.json
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shatter-notify")
            .join("config.json")
    }

    /// 从 JSON 文件加载并校验
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        config.validate()?;
        info!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// 文件不存在时使用默认配置；文件存在但无效时返回错误
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.particles;
        let finite = [
            ("particles.cone_direction_deg", p.cone_direction_deg),
            ("particles.cone_spread_deg", p.cone_spread_deg),
            ("particles.min_speed", p.min_speed),
            ("particles.max_speed", p.max_speed),
            ("particles.gravity", p.gravity),
            ("shake_magnitude", self.shake_magnitude),
            ("margin", self.margin),
            ("card.width", self.card.width),
            ("card.height", self.card.height),
            ("monitor.x", self.monitor.x),
            ("monitor.y", self.monitor.y),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite(*name));
        }
        if self.max_live == 0 {
            return Err(ConfigError::ZeroMaxLive);
        }
        if !(self.row_height > 0.0) {
            return Err(ConfigError::InvalidRowHeight(self.row_height));
        }
        if self.particles.min_speed > self.particles.max_speed {
            return Err(ConfigError::InvertedSpeedRange {
                min: self.particles.min_speed,
                max: self.particles.max_speed,
            });
        }
        if !(self.monitor.width > 0.0 && self.monitor.height > 0.0) {
            return Err(ConfigError::EmptyMonitor);
        }
        Ok(())
    }

    /// 由配置推导出的堆叠布局
    pub fn layout(&self) -> StackLayout {
        StackLayout {
            monitor: self.monitor,
            card: self.card,
            margin: self.margin,
            row_height: self.row_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"max_live": 3, "urgency": {"low": {"slide_in_ms": 100, "break_ms": 100, "show_ms": 1000, "slide_out_ms": 100, "particle_burst": 8, "max_particle_lifespan_ms": 300}}}"#)
                .unwrap();
        assert_eq!(config.max_live, 3);
        assert_eq!(config.urgency.low.show_ms, 1000);
        // 未写的字段保持默认
        assert_eq!(config.urgency.normal, UrgencyTable::default().normal);
        assert_eq!(config.particle_capacity, 128);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = EngineConfig {
            max_live: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxLive));

        let config = EngineConfig {
            row_height: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidRowHeight(0.0)));

        let mut config = EngineConfig::default();
        config.particles.min_speed = 500.0;
        config.particles.max_speed = 100.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedSpeedRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut config = EngineConfig::default();
        config.particles.cone_spread_deg = f32::NAN;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite("particles.cone_spread_deg"))
        );

        let mut config = EngineConfig::default();
        config.particles.max_speed = f32::INFINITY;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite("particles.max_speed"))
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"max_live": 2, "rng_seed": 7}}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_live, 2);
        assert_eq!(config.rng_seed, 7);
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"max_live": 0}}"#).unwrap();
        assert!(EngineConfig::load(file.path()).is_err());

        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        writeln!(garbage, "not json").unwrap();
        assert!(EngineConfig::load(garbage.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let config = EngineConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
