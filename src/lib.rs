//! # quantum-qr — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main.rs   env_logger 初始化 · 控制台输出 · 退出码        │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ CliArgs（clap 位置参数）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  ├─ settings ──── 默认值常量 / Defaults                    │
//! │  ├─ cli ───────── 参数解析 → Invocation / ResolvedOptions │
//! │  ├─ commands ──── 模式分发 → RunOutcome                   │
//! │  └─ qr_image      logo 获取 · 二维码渲染 · 居中合成         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`settings`] | 缺省文件名、文本、图片地址等具名常量 |
//! | [`cli`] | 位置参数解析、默认值替换、提示文案 |
//! | [`commands`] | 按模式调用图片处理器，汇总运行结果 |
//! | [`qr_image`] | 从 URL/本地路径获取 logo，生成并合成二维码 PNG |

pub mod cli;
pub mod commands;
pub mod qr_image;
pub mod settings;
