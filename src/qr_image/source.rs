//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“命令行给出的来源语义”和“流水线中间结果”解耦：
//! - `SourceKind` / `ImageSource` 表示外部来源语义
//! - `LogoPayload` 表示获取阶段的产物（已下载字节或未校验的本地路径）
//! - `DecodedLogo` 表示解码后的 logo 及其原始色彩是否为 RGBA
//! - `PreparedLogo` 表示可直接贴到二维码上的 RGBA logo

use std::path::PathBuf;

use image::{DynamicImage, RgbaImage};

use super::QrImageError;

/// 表示 URL 来源的记号（精确匹配）。
pub const URL_TOKENS: [&str; 5] = ["U", "u", "url", "Url", "URL"];

/// 表示本地路径来源的记号（精确匹配）。
pub const DIR_TOKENS: [&str; 5] = ["D", "d", "dir", "Dir", "DIR"];

/// 图片位置的解释方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Url,
    Dir,
}

impl SourceKind {
    /// 从命令行记号解析来源类型。
    pub fn parse(token: &str) -> Result<Self, QrImageError> {
        if URL_TOKENS.contains(&token) {
            Ok(Self::Url)
        } else if DIR_TOKENS.contains(&token) {
            Ok(Self::Dir)
        } else {
            Err(QrImageError::InvalidSource(token.to_string()))
        }
    }
}

/// logo 输入来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// 网络地址来源。
    Url(String),
    /// 本地文件路径来源。
    FilePath(PathBuf),
}

impl ImageSource {
    /// 结合图片位置与来源记号构造来源。
    pub fn from_location(location: &str, kind_token: &str) -> Result<Self, QrImageError> {
        Ok(match SourceKind::parse(kind_token)? {
            SourceKind::Url => Self::Url(location.to_string()),
            SourceKind::Dir => Self::FilePath(PathBuf::from(location)),
        })
    }
}

/// 下载阶段输出：原始字节与来源标识。
#[derive(Debug)]
pub struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 获取阶段输出。
#[derive(Debug)]
pub enum LogoPayload {
    /// 已下载的字节。
    Downloaded(RawImageData),
    /// 原样透传的本地路径，打开时才检查是否存在。
    LocalPath(PathBuf),
}

/// 解码阶段输出。
///
/// 解码器会把调色板、带 tRNS 的 RGB 以及 GIF 统一展开成 RGBA，
/// 因此蒙版标记必须按文件本身的色彩类型判断，而不是按解码结果判断。
pub(crate) struct DecodedLogo {
    pub(crate) image: DynamicImage,
    /// 文件本身是 RGBA 时为真。
    pub(crate) masked: bool,
}

/// 合成阶段输入：缩放后的 RGBA logo。
pub(crate) struct PreparedLogo {
    pub(crate) image: RgbaImage,
    /// 为真时以 alpha 通道作为蒙版贴图，否则不透明覆盖。
    pub(crate) masked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_accepts_only_listed_tokens() {
        for token in URL_TOKENS {
            assert_eq!(SourceKind::parse(token).expect("url token"), SourceKind::Url);
        }
        for token in DIR_TOKENS {
            assert_eq!(SourceKind::parse(token).expect("dir token"), SourceKind::Dir);
        }

        for token in ["ftp", "uRL", "DiR", "", " url"] {
            assert!(matches!(
                SourceKind::parse(token),
                Err(QrImageError::InvalidSource(t)) if t == token
            ));
        }
    }

    #[test]
    fn from_location_keeps_location_verbatim() {
        assert_eq!(
            ImageSource::from_location("https://example.com/a.png", "u").expect("url"),
            ImageSource::Url("https://example.com/a.png".to_string())
        );
        assert_eq!(
            ImageSource::from_location("./missing/logo.png", "DIR").expect("dir"),
            ImageSource::FilePath(PathBuf::from("./missing/logo.png"))
        );
    }
}
