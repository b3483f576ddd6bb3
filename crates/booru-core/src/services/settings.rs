//! 应用程序设置服务
//!
//! 负责设置的读取、保存和管理

use crate::models::AppSettings;
use crate::paths::PathProvider;
use crate::utils::error::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// 设置管理器
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// 使用 PathProvider 创建设置管理器
    pub fn new(provider: &dyn PathProvider) -> AppResult<Self> {
        Self::from_path(provider.settings_path())
    }

    /// 从指定路径创建设置管理器
    pub fn from_path(settings_path: PathBuf) -> AppResult<Self> {
        // 确保父目录存在
        if let Some(parent) = settings_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("无法创建配置目录: {}", e)))?;
        }

        Ok(Self { settings_path })
    }

    /// 加载设置，文件不存在时返回默认值
    pub fn load(&self) -> AppResult<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("设置文件不存在，使用默认设置");
            return Ok(AppSettings::default());
        }

        let content = fs::read_to_string(&self.settings_path)
            .map_err(|e| AppError::Config(format!("无法读取设置文件: {}", e)))?;

        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("设置文件格式错误: {}", e)))?;

        validate(&settings)?;

        tracing::info!("成功加载设置: {:?}", self.settings_path);
        Ok(settings)
    }

    /// 保存设置
    pub fn save(&self, settings: &AppSettings) -> AppResult<()> {
        validate(settings)?;

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Config(format!("无法序列化设置: {}", e)))?;

        fs::write(&self.settings_path, content)
            .map_err(|e| AppError::Config(format!("无法保存设置文件: {}", e)))?;

        tracing::info!("成功保存设置: {:?}", self.settings_path);
        Ok(())
    }

    /// 重置为默认设置
    pub fn reset(&self) -> AppResult<AppSettings> {
        let default_settings = AppSettings::default();
        self.save(&default_settings)?;
        Ok(default_settings)
    }

    /// 获取设置文件路径
    pub fn path(&self) -> &Path {
        &self.settings_path
    }
}

/// 页大小必须为正且默认值不超过上限；缓存大小必须为正
fn validate(settings: &AppSettings) -> AppResult<()> {
    if settings.database.cache_size_kb <= 0 {
        return Err(AppError::Config(format!(
            "缓存大小必须为正数: {}",
            settings.database.cache_size_kb
        )));
    }

    let search = &settings.search;
    if search.default_page_size <= 0 || search.max_page_size <= 0 {
        return Err(AppError::Config("页大小必须为正数".to_string()));
    }
    if search.default_page_size > search.max_page_size {
        return Err(AppError::Config(format!(
            "默认页大小 {} 超过上限 {}",
            search.default_page_size, search.max_page_size
        )));
    }
    Ok(())
}
