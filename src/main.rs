//! # quantum-qr — 程序入口
//!
//! 本文件只负责日志初始化、参数解析与控制台输出，
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::process::ExitCode;

use quantum_qr::cli::{self, CliArgs, Invocation};
use quantum_qr::commands::{self, ConsoleReport};
use quantum_qr::qr_image::{QrImageConfig, QrImageHandler};
use quantum_qr::settings::Defaults;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = match CliArgs::parse_env().resolve(&Defaults::default()) {
        Invocation::Help => {
            println!("{}", cli::usage());
            return ExitCode::SUCCESS;
        }
        Invocation::Run(options) => options,
    };

    for notice in &options.notices {
        println!("{notice}");
    }

    let mut config = QrImageConfig::default();
    if let Err(err) = config.apply_overrides(|key| std::env::var(key).ok()) {
        log::warn!("环境变量配置无效，使用默认配置: {err}");
        config = QrImageConfig::default();
    }

    let report = match QrImageHandler::new(config) {
        Ok(handler) => ConsoleReport::from_result(&commands::execute(&options, &handler).await),
        Err(err) => ConsoleReport::failure(&err),
    };

    for line in &report.stdout {
        println!("{line}");
    }
    for line in &report.stderr {
        eprintln!("{line}");
    }

    report.exit_code()
}
