//! 设置管理命令

use booru_core::models::AppSettings;
use booru_core::CommandError;

use super::run_blocking;
use crate::AppState;

/// 获取应用程序设置
pub async fn get_settings(state: &AppState) -> Result<AppSettings, CommandError> {
    let manager = state.settings_manager.clone();
    run_blocking(move || manager.load()).await
}

/// 保存应用程序设置，之后的搜索立即使用新设置
pub async fn save_settings(state: &AppState, settings: AppSettings) -> Result<(), CommandError> {
    let manager = state.settings_manager.clone();
    let saved = settings.clone();
    run_blocking(move || manager.save(&saved)).await?;

    state.core.update_settings(settings);
    tracing::info!("设置已更新");
    Ok(())
}

/// 重置设置为默认值
pub async fn reset_settings(state: &AppState) -> Result<AppSettings, CommandError> {
    let manager = state.settings_manager.clone();
    let settings = run_blocking(move || manager.reset()).await?;

    state.core.update_settings(settings.clone());
    Ok(settings)
}
