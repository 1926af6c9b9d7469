//! # 解码与合成流水线模块
//!
//! ## 设计思路
//!
//! 将“payload → logo 图像 → 缩放 → 居中贴图 → PNG”集中管理。
//! logo 只缩小不放大，贴图位置由固定公式计算，保证结果可预测、可测试。
//!
//! ## 实现思路
//!
//! 1. 按内容嗅探格式并解码（字节或本地路径）
//! 2. 按文件本身的色彩类型（PNG 读 IHDR，GIF 视为调色板）决定是否使用 alpha 蒙版
//! 3. 按缩略图规则计算目标尺寸，`fast_image_resize` 缩放，失败回退 `image::resize_exact`
//! 4. 偏移 = `((qr_w - logo_w) / 2, (qr_h - logo_h) / 2)`，向下取整
//! 5. 有蒙版则 alpha 混合，否则不透明覆盖

use fast_image_resize as fr;
use image::{
    ColorType, DynamicImage, GenericImageView, ImageBuffer, ImageFormat, ImageReader, Rgba,
    RgbaImage,
};
use std::io::Cursor;
use std::path::Path;

use super::source::{DecodedLogo, LogoPayload, PreparedLogo};
use super::{QrImageError, QrImageHandler};

/// PNG 文件中 IHDR 色彩类型字节的位置（8 字节签名 + 长度 + 类型 + 宽高 + 位深）。
const PNG_COLOR_TYPE_OFFSET: usize = 25;
/// PNG 色彩类型 6：真彩色 + alpha。
const PNG_COLOR_TYPE_RGBA: u8 = 6;

impl QrImageHandler {
    /// 打开 logo 图像，格式按内容判断而非扩展名。
    pub(crate) fn open_logo(&self, payload: LogoPayload) -> Result<DecodedLogo, QrImageError> {
        let (bytes, source_hint) = match payload {
            LogoPayload::Downloaded(raw) => (raw.bytes, raw.source_hint),
            LogoPayload::LocalPath(path) => {
                let bytes = std::fs::read(&path).map_err(|e| {
                    QrImageError::FileSystem(format!("cannot open {}: {}", path.display(), e))
                })?;
                (bytes, "file")
            }
        };

        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| QrImageError::InvalidFormat(format!("cannot sniff image format: {}", e)))?;
        let format = reader.format();
        let image = reader
            .decode()
            .map_err(|e| QrImageError::Decode(format!("cannot identify image: {}", e)))?;
        let masked = stored_as_rgba(format, &bytes, &image);

        let (width, height) = image.dimensions();
        log::info!(
            "✅ logo 解码成功 - 来源: {} 格式: {:?} 尺寸: {}x{} 色彩: {:?} 蒙版: {}",
            source_hint,
            format,
            width,
            height,
            image.color(),
            masked
        );

        Ok(DecodedLogo { image, masked })
    }

    /// 缩放 logo 并决定贴图方式。
    ///
    /// 只有文件本身为 RGBA 的 logo 使用 alpha 蒙版；其余（灰度 + alpha、调色板、
    /// GIF 等）先去掉 alpha，再以不透明方式贴图。
    pub(crate) fn prepare_logo(&self, decoded: DecodedLogo) -> Result<PreparedLogo, QrImageError> {
        let DecodedLogo { image, masked } = decoded;

        let decoded = if masked {
            image
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        };

        let (width, height) = decoded.dimensions();
        let (target_width, target_height) = fit_within(
            width,
            height,
            self.config.logo_max_width,
            self.config.logo_max_height,
        );

        let resized = if (target_width, target_height) == (width, height) {
            decoded
        } else {
            log::info!(
                "🧩 logo 缩放：{}x{} -> {}x{}（filter={:?}）",
                width,
                height,
                target_width,
                target_height,
                self.config.resize_filter
            );

            match Self::resize_with_fast_image_resize(
                &decoded,
                target_width,
                target_height,
                self.config.resize_filter,
            ) {
                Ok(resized) => resized,
                Err(err) => {
                    log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
                    decoded.resize_exact(target_width, target_height, self.config.resize_filter)
                }
            }
        };

        Ok(PreparedLogo {
            image: resized.to_rgba8(),
            masked,
        })
    }

    /// 将 logo 居中贴到画布上。
    pub(crate) fn paste_centered(canvas: &mut RgbaImage, logo: &PreparedLogo) {
        let (x, y) = centered_offset(canvas.dimensions(), logo.image.dimensions());

        if logo.masked {
            image::imageops::overlay(canvas, &logo.image, x, y);
        } else {
            image::imageops::replace(canvas, &logo.image, x, y);
        }

        log::debug!(
            "📌 logo 已贴到 ({}, {})，蒙版: {}",
            x,
            y,
            if logo.masked { "alpha" } else { "无" }
        );
    }

    /// 以 PNG 写出，已存在的文件直接覆盖。
    pub(crate) fn write_png(image: &DynamicImage, output: &Path) -> Result<(), QrImageError> {
        image
            .save_with_format(output, ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => {
                    QrImageError::FileSystem(format!("cannot write {}: {}", output.display(), io))
                }
                other => QrImageError::Encode(format!("cannot encode PNG: {}", other)),
            })
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: image::imageops::FilterType,
    ) -> Result<DynamicImage, QrImageError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| QrImageError::Decode(format!("cannot build source buffer: {}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(
            Self::to_fast_filter(filter),
        ));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| QrImageError::Decode(format!("fast_image_resize failed: {}", e)))?;

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            target_width,
            target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| QrImageError::Decode("fast_image_resize returned a short buffer".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
        match filter {
            image::imageops::FilterType::Nearest => fr::FilterType::Box,
            image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
            image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
            image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
            image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}

/// 文件本身是否以 RGBA 存储。
///
/// PNG 直接读 IHDR 色彩类型；GIF 总是调色板；其他格式以解码结果为准。
fn stored_as_rgba(format: Option<ImageFormat>, bytes: &[u8], decoded: &DynamicImage) -> bool {
    match format {
        Some(ImageFormat::Png) => bytes.get(PNG_COLOR_TYPE_OFFSET) == Some(&PNG_COLOR_TYPE_RGBA),
        Some(ImageFormat::Gif) => false,
        _ => matches!(
            decoded.color(),
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F
        ),
    }
}

/// 缩略图尺寸：放得下就保持原尺寸，否则等比缩小到框内。
///
/// 长边贴满框，短边在向下/向上取整中选更接近原宽高比的一个，最小为 1。
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if max_width >= width && max_height >= height {
        return (width, height);
    }

    let aspect = width as f64 / height as f64;
    let (box_w, box_h) = (max_width as f64, max_height as f64);

    if box_w / box_h >= aspect {
        let x = round_aspect(box_h * aspect, |n| (aspect - n / box_h).abs());
        (x, max_height)
    } else {
        let y = round_aspect(box_w / aspect, |n| {
            if n == 0.0 { 0.0 } else { (aspect - box_w / n).abs() }
        });
        (max_width, y)
    }
}

fn round_aspect<K>(number: f64, key: K) -> u32
where
    K: Fn(f64) -> f64,
{
    let (low, high) = (number.floor(), number.ceil());
    // 相等时取 floor
    let picked = if key(high) < key(low) { high } else { low };
    (picked as u32).max(1)
}

/// 居中偏移，向下取整（logo 比画布大时为负）。
pub fn centered_offset(canvas: (u32, u32), logo: (u32, u32)) -> (i64, i64) {
    let dx = canvas.0 as i64 - logo.0 as i64;
    let dy = canvas.1 as i64 - logo.1 as i64;
    (dx.div_euclid(2), dy.div_euclid(2))
}
