//! # 配置模块
//!
//! ## 设计思路
//!
//! 将渲染、缩放与下载相关的可调参数集中到 `QrImageConfig`。
//! `Default` 给出与原始脚本一致的行为：10 像素模块、4 模块静区、M 级纠错、
//! logo 最大 60×60、不设置任何网络超时。
//!
//! ## 实现思路
//!
//! - 超时默认 `None`，即沿用 HTTP 客户端的“无超时”行为。
//! - `apply_overrides` 通过注入的查找函数读取环境变量，便于测试。
//! - 覆盖值先整体校验，任何一项非法都不修改当前配置。

use image::imageops::FilterType;
use qrcode::EcLevel;

use super::QrImageError;

pub const ENV_DOWNLOAD_TIMEOUT_SECS: &str = "QUANTUM_QR_DOWNLOAD_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "QUANTUM_QR_CONNECT_TIMEOUT_SECS";
pub const ENV_LOGO_MAX: &str = "QUANTUM_QR_LOGO_MAX";

/// 二维码图片处理配置。
#[derive(Debug, Clone)]
pub struct QrImageConfig {
    /// 单个模块边长（像素）。
    pub module_size: u32,
    /// 是否保留 4 模块宽的静区。
    pub quiet_zone: bool,
    /// 纠错等级。
    pub ec_level: EcLevel,
    /// logo 缩放后的最大宽度（像素）。
    pub logo_max_width: u32,
    /// logo 缩放后的最大高度（像素）。
    pub logo_max_height: u32,
    /// 缩放滤镜。
    pub resize_filter: FilterType,
    /// 整体下载超时（秒），`None` 表示不限制。
    pub download_timeout_secs: Option<u64>,
    /// 建立连接超时（秒），`None` 表示不限制。
    pub connect_timeout_secs: Option<u64>,
    /// 下载体积上限（字节）。
    pub max_file_size: u64,
}

impl Default for QrImageConfig {
    fn default() -> Self {
        Self {
            module_size: 10,
            quiet_zone: true,
            ec_level: EcLevel::M,
            logo_max_width: 60,
            logo_max_height: 60,
            resize_filter: FilterType::CatmullRom,
            download_timeout_secs: None,
            connect_timeout_secs: None,
            max_file_size: 50 * 1024 * 1024,
        }
    }
}

impl QrImageConfig {
    /// 从环境变量覆盖配置。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use quantum_qr::qr_image::QrImageConfig;
    ///
    /// let mut config = QrImageConfig::default();
    /// config.apply_overrides(|key| std::env::var(key).ok())?;
    /// # Ok::<(), quantum_qr::qr_image::QrImageError>(())
    /// ```
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), QrImageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let download_timeout =
            Self::parse_ranged(&lookup, ENV_DOWNLOAD_TIMEOUT_SECS, 1..=600)?;
        let connect_timeout = Self::parse_ranged(&lookup, ENV_CONNECT_TIMEOUT_SECS, 1..=120)?;
        let logo_max = Self::parse_ranged(&lookup, ENV_LOGO_MAX, 1..=512)?;

        if let Some(secs) = download_timeout {
            self.download_timeout_secs = Some(secs);
        }
        if let Some(secs) = connect_timeout {
            self.connect_timeout_secs = Some(secs);
        }
        if let Some(max) = logo_max {
            self.logo_max_width = max as u32;
            self.logo_max_height = max as u32;
        }

        Ok(())
    }

    fn parse_ranged<F>(
        lookup: &F,
        key: &str,
        range: std::ops::RangeInclusive<u64>,
    ) -> Result<Option<u64>, QrImageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(raw) = lookup(key) else {
            return Ok(None);
        };

        let value = raw.trim().parse::<u64>().map_err(|e| {
            QrImageError::InvalidFormat(format!("{key} is not a number ({raw:?}): {e}"))
        })?;

        if !range.contains(&value) {
            return Err(QrImageError::InvalidFormat(format!(
                "{key} must be within {}..={} (got {value})",
                range.start(),
                range.end()
            )));
        }

        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_have_no_network_timeouts() {
        let config = QrImageConfig::default();

        assert_eq!(config.download_timeout_secs, None);
        assert_eq!(config.connect_timeout_secs, None);
        assert_eq!((config.logo_max_width, config.logo_max_height), (60, 60));
        assert_eq!(config.module_size, 10);
    }

    #[test]
    fn overrides_apply_valid_values() {
        let mut config = QrImageConfig::default();
        config
            .apply_overrides(lookup_from(&[
                (ENV_DOWNLOAD_TIMEOUT_SECS, "30"),
                (ENV_CONNECT_TIMEOUT_SECS, " 5 "),
                (ENV_LOGO_MAX, "80"),
            ]))
            .expect("valid overrides");

        assert_eq!(config.download_timeout_secs, Some(30));
        assert_eq!(config.connect_timeout_secs, Some(5));
        assert_eq!((config.logo_max_width, config.logo_max_height), (80, 80));
    }

    #[test]
    fn invalid_override_leaves_config_untouched() {
        let mut config = QrImageConfig::default();
        let result = config.apply_overrides(lookup_from(&[
            (ENV_DOWNLOAD_TIMEOUT_SECS, "30"),
            (ENV_LOGO_MAX, "0"),
        ]));

        assert!(matches!(result, Err(QrImageError::InvalidFormat(_))));
        assert_eq!(config.download_timeout_secs, None);
        assert_eq!(config.logo_max_width, 60);
    }

    #[test]
    fn non_numeric_override_is_rejected() {
        let mut config = QrImageConfig::default();
        let result =
            config.apply_overrides(lookup_from(&[(ENV_CONNECT_TIMEOUT_SECS, "soon")]));

        assert!(matches!(result, Err(QrImageError::InvalidFormat(_))));
    }
}
