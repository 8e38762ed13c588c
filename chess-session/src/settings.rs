//! 会话设置
//!
//! JSON 文件，默认位于 `<配置目录>/chess-session/settings.json`。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uci_bridge::EngineConfig;

use crate::view::ViewSettings;

/// 会话设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub engine: EngineConfig,
    pub view: ViewSettings,
}

impl SessionSettings {
    /// 默认设置文件路径
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("chess-session");
            path.push("settings.json");
            path
        })
    }

    /// 加载设置：优先使用指定路径，否则使用默认路径
    pub fn load(explicit: Option<PathBuf>) -> Self {
        let Some(path) = explicit.or_else(Self::settings_path) else {
            warn!("无法获取配置目录，使用默认设置");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// 从文件加载设置；文件缺失或无效时使用默认设置
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("设置文件不存在，使用默认设置");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    info!("已加载设置: {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("设置文件格式无效: {}，使用默认设置", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("无法读取设置文件: {}，使用默认设置", e);
                Self::default()
            }
        }
    }

    /// 保存设置
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self).context("序列化设置失败")?;
        std::fs::write(path, content)
            .with_context(|| format!("写入设置文件失败: {:?}", path))?;

        info!("设置已保存: {:?}", path);
        Ok(())
    }

    /// 视图参数有变化时写回设置文件，返回是否写入
    pub fn persist_view(&mut self, view: &ViewSettings, path: &Path) -> Result<bool> {
        if self.view == *view {
            return Ok(false);
        }
        self.view = *view;
        self.save_to(path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Orbit;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = SessionSettings::load_from(&dir.path().join("absent.json"));
        assert_eq!(settings, SessionSettings::default());
        assert_eq!(settings.engine.program, "komodo");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = SessionSettings::default();
        settings.engine.program = "stockfish".to_string();
        settings.engine.search_depth = 10;
        settings.view.camera = Orbit::new(30.0, 120.0, 25.0);
        settings.save_to(&path).unwrap();

        let loaded = SessionSettings::load(Some(path));
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_persist_view_only_when_changed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = SessionSettings::default();

        let unchanged = ViewSettings::default();
        assert!(!settings.persist_view(&unchanged, &path).unwrap());
        assert!(!path.exists());

        let view = ViewSettings {
            light_power: 320.0,
            ..ViewSettings::default()
        };
        assert!(settings.persist_view(&view, &path).unwrap());
        assert_eq!(SessionSettings::load_from(&path).view, view);
        assert_eq!(SessionSettings::load_from(&path).engine, EngineConfig::default());
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(SessionSettings::load_from(&path), SessionSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "engine": { "response_timeout_secs": 5 } }"#).unwrap();

        let settings = SessionSettings::load_from(&path);
        assert_eq!(settings.engine.response_timeout_secs, 5);
        assert_eq!(settings.engine.search_depth, 7);
        assert_eq!(settings.view, ViewSettings::default());
    }
}
