//! # 二维码渲染模块
//!
//! 编码与纠错交给 `qrcode`，这里只决定纠错等级、模块像素尺寸与静区。
//! 版本自动选择能容纳数据的最小版本。

use image::{GrayImage, Luma};
use qrcode::QrCode;

use super::{QrImageError, QrImageHandler};

impl QrImageHandler {
    /// 将文本渲染为灰度二维码栅格。
    pub(crate) fn render_qr(&self, text: &str) -> Result<GrayImage, QrImageError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), self.config.ec_level)
            .map_err(|e| QrImageError::Encode(format!("cannot encode {} bytes: {}", text.len(), e)))?;

        let module_size = self.config.module_size;
        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(module_size, module_size)
            .quiet_zone(self.config.quiet_zone)
            .build();

        log::debug!(
            "🔳 二维码渲染完成 - version={:?} modules={} size={}x{}",
            code.version(),
            code.width(),
            image.width(),
            image.height()
        );

        Ok(image)
    }
}
