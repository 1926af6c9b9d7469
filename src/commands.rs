//! # 模式分发
//!
//! 根据解析后的模式调用 `QrImageHandler`，把结果折叠成 `RunOutcome`。
//! 图片获取失败（网络、来源记号非法）属于“正常结束、不产出文件”，
//! 不作为错误返回；解码、编码、写文件失败才返回 `QrImageError`。
//! `ConsoleReport` 再把结果翻译成控制台文案与退出码。

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cli::{Mode, ResolvedOptions};
use crate::qr_image::{ImageSource, QrImageError, QrImageHandler};

/// 一次运行的结果。
#[derive(Debug)]
pub enum RunOutcome {
    /// 已写出文件。
    Saved { path: PathBuf, with_logo: bool },
    /// 模式不是 1 或 2。
    UnknownMode(i64),
    /// logo 获取失败，未写出任何文件。
    ImageUnavailable { location: String, error: QrImageError },
}

/// 执行一次解析好的调用。
pub async fn execute(
    options: &ResolvedOptions,
    handler: &QrImageHandler,
) -> Result<RunOutcome, QrImageError> {
    let output = Path::new(&options.filename.value);
    let text = options.text.value.as_str();

    match options.mode.value {
        Mode::Plain => {
            handler.generate_plain(text, output)?;
            Ok(RunOutcome::Saved {
                path: output.to_path_buf(),
                with_logo: false,
            })
        }
        Mode::WithLogo => {
            let Some(logo) = options.logo.as_ref() else {
                return Err(QrImageError::InvalidFormat(
                    "logo options missing for mode 2".to_string(),
                ));
            };
            let location = logo.image_location.value.clone();

            let fetched = match ImageSource::from_location(&location, &logo.source_kind.value) {
                Ok(source) => handler.fetch_logo(source).await,
                Err(err) => Err(err),
            };

            let payload = match fetched {
                Ok(payload) => payload,
                Err(error) => {
                    log::warn!("⚠️ logo 获取失败：{}", error);
                    return Ok(RunOutcome::ImageUnavailable { location, error });
                }
            };

            handler.generate_with_logo(text, payload, output)?;
            Ok(RunOutcome::Saved {
                path: output.to_path_buf(),
                with_logo: true,
            })
        }
        Mode::Unknown(value) => Ok(RunOutcome::UnknownMode(value)),
    }
}

/// 一次运行对应的控制台输出与退出状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleReport {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub success: bool,
}

impl ConsoleReport {
    /// 把 `execute` 的结果翻译成控制台文案。
    pub fn from_result(result: &Result<RunOutcome, QrImageError>) -> Self {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => return Self::failure(err),
        };

        let stdout = match outcome {
            RunOutcome::Saved { path, with_logo: true } => {
                vec![format!("QR code with image saved as {}", path.display())]
            }
            RunOutcome::Saved { path, with_logo: false } => {
                vec![format!("QR code saved as {}", path.display())]
            }
            RunOutcome::UnknownMode(_) => vec!["Unknown mode!".to_string()],
            RunOutcome::ImageUnavailable { location, error } => {
                let mut lines = match error {
                    QrImageError::InvalidSource(token) => {
                        vec![format!("Invalid option for URL/Dir: {}", token)]
                    }
                    QrImageError::EmptyLocation => Vec::new(),
                    other => vec![format!("Error fetching image from URL: {}", other)],
                };
                lines.push(format!("Failed to retrieve image from {}.", location));
                lines
            }
        };

        Self {
            stdout,
            stderr: Vec::new(),
            success: true,
        }
    }

    /// 致命错误：stderr 一行，失败退出。
    pub fn failure(err: &QrImageError) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: vec![format!("Error: {}", err)],
            success: false,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
