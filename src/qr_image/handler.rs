//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `QrImageHandler` 只负责流程编排，不关心命令行与控制台输出。
//! 处理链路固定为：
//! 1. 获取 logo（仅模式 2）
//! 2. 渲染二维码
//! 3. 解码、缩放并居中贴上 logo（仅模式 2）
//! 4. 写出 PNG
//!
//! ## 实现思路
//!
//! - HTTP 客户端在构造时创建一次并复用。
//! - 任何一步失败都直接返回错误，输出文件只在全部成功后写入。
//! - 记录 `encode/compose/save/total` 阶段耗时，便于诊断。

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;

use super::source::LogoPayload;
use super::{ImageSource, QrImageConfig, QrImageError};

/// 二维码图片处理器。
pub struct QrImageHandler {
    pub(super) config: QrImageConfig,
    pub(super) client: reqwest::Client,
}

impl QrImageHandler {
    /// 根据配置创建处理器。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use quantum_qr::qr_image::{QrImageConfig, QrImageHandler};
    ///
    /// let handler = QrImageHandler::new(QrImageConfig::default())?;
    /// # Ok::<(), quantum_qr::qr_image::QrImageError>(())
    /// ```
    pub fn new(config: QrImageConfig) -> Result<Self, QrImageError> {
        let client = Self::build_http_client(&config)?;
        Ok(Self { config, client })
    }

    /// 生成纯二维码并写到 `output`。
    pub fn generate_plain(&self, text: &str, output: &Path) -> Result<(), QrImageError> {
        let total_start = Instant::now();

        let encode_start = Instant::now();
        let qr = self.render_qr(text)?;
        let encode_elapsed = encode_start.elapsed();

        let save_start = Instant::now();
        Self::write_png(&DynamicImage::ImageLuma8(qr), output)?;
        let save_elapsed = save_start.elapsed();

        log::info!(
            "✅ 二维码生成完成 - encode={}ms save={}ms total={}ms",
            encode_elapsed.as_millis(),
            save_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(())
    }

    /// 按来源获取 logo。
    ///
    /// URL 来源会下载字节；本地路径原样透传，不检查是否存在，空路径返回 `EmptyLocation`。
    pub async fn fetch_logo(&self, source: ImageSource) -> Result<LogoPayload, QrImageError> {
        let load_start = Instant::now();

        let payload = match source {
            ImageSource::Url(url) => LogoPayload::Downloaded(self.load_from_url(&url).await?),
            ImageSource::FilePath(path) => self.pass_through_path(path)?,
        };

        log::info!("⏱️ logo 获取耗时 load={}ms", load_start.elapsed().as_millis());

        Ok(payload)
    }

    /// 生成中心带 logo 的二维码并写到 `output`。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use quantum_qr::qr_image::{ImageSource, QrImageConfig, QrImageHandler};
    ///
    /// # async fn demo() -> Result<(), quantum_qr::qr_image::QrImageError> {
    /// let handler = QrImageHandler::new(QrImageConfig::default())?;
    /// let payload = handler
    ///     .fetch_logo(ImageSource::FilePath("logo.png".into()))
    ///     .await?;
    /// handler.generate_with_logo("Hello World!", payload, "out.png".as_ref())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn generate_with_logo(
        &self,
        text: &str,
        payload: LogoPayload,
        output: &Path,
    ) -> Result<(), QrImageError> {
        let total_start = Instant::now();

        let encode_start = Instant::now();
        let qr = self.render_qr(text)?;
        let encode_elapsed = encode_start.elapsed();

        let compose_start = Instant::now();
        let decoded = self.open_logo(payload)?;
        let logo = self.prepare_logo(decoded)?;
        let mut canvas = DynamicImage::ImageLuma8(qr).to_rgba8();
        Self::paste_centered(&mut canvas, &logo);
        let compose_elapsed = compose_start.elapsed();

        let save_start = Instant::now();
        let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();
        Self::write_png(&DynamicImage::ImageRgb8(flattened), output)?;
        let save_elapsed = save_start.elapsed();

        log::info!(
            "✅ 带 logo 二维码生成完成 - encode={}ms compose={}ms save={}ms total={}ms",
            encode_elapsed.as_millis(),
            compose_elapsed.as_millis(),
            save_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(())
    }
}
