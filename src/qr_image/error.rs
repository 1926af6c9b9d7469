//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 二维码生成链路（获取 → 解码 → 合成 → 写文件）的所有失败都收敛到一个枚举，
//! 通过 `thiserror` 保持可读文案，调用侧可以按分支决定退出方式。

/// 二维码图片处理统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum QrImageError {
    #[error("network error: {0}")]
    Network(String),

    #[error("timed out: {0}")]
    Timeout(String),

    /// 来源记号既不是 URL 也不是 DIR，携带原始记号。
    #[error("invalid option for URL/Dir: {0}")]
    InvalidSource(String),

    /// 本地路径为空字符串，视为没有拿到图片。
    #[error("image location is empty")]
    EmptyLocation,

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("file error: {0}")]
    FileSystem(String),

    #[error("resource limit: {0}")]
    ResourceLimit(String),
}
