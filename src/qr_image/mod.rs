//! # 二维码图片模块（qr_image）
//!
//! ## 设计思路
//!
//! 该模块将“logo 来源识别 → 获取 → 二维码渲染 → 解码缩放 → 居中合成 → 写 PNG”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `handler`：编排整条处理流水线
//! - `loader`：负责 URL 下载与本地路径透传
//! - `render`：负责二维码栅格生成
//! - `pipeline`：负责解码、缩放、居中与贴图
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 调用链
//!
//! ```text
//! commands.rs（模式分发）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（URL 下载 / 路径透传）
//!    ├─ render.rs（qrcode 渲染）
//!    └─ pipeline.rs（解码 + 缩放 + 居中贴图 + 写 PNG）
//!    ↓
//! 返回 QrImageError 给调用方
//! ```

mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod render;
mod source;

pub use config::{
    ENV_CONNECT_TIMEOUT_SECS, ENV_DOWNLOAD_TIMEOUT_SECS, ENV_LOGO_MAX, QrImageConfig,
};
pub use error::QrImageError;
pub use handler::QrImageHandler;
pub use pipeline::{centered_offset, fit_within};
pub use source::{DIR_TOKENS, ImageSource, LogoPayload, RawImageData, SourceKind, URL_TOKENS};
