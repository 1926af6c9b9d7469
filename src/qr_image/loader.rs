//! # 加载模块
//!
//! ## 设计思路
//!
//! 负责把 `ImageSource` 变成 `LogoPayload`：
//! - URL：单次 GET，非 2xx、传输错误、URL 格式错误、超出体积上限都视为获取失败。
//! - 本地路径：原样透传，不检查是否存在，打开阶段再报告错误；空路径视为获取失败。
//!
//! ## 实现思路
//!
//! - 不做重试；超时只在配置显式开启时才设置。
//! - 按块读取响应体并累计体积，超过上限立即停止。
//! - reqwest 错误统一经 `map_reqwest_error` 映射，日志中的 URL 去掉 query/fragment。

use std::path::PathBuf;
use std::time::Duration;

use super::source::{LogoPayload, RawImageData};
use super::{QrImageConfig, QrImageError, QrImageHandler};

const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;

impl QrImageHandler {
    /// 构建复用型 HTTP 客户端，超时仅在配置给出时生效。
    pub(super) fn build_http_client(config: &QrImageConfig) -> Result<reqwest::Client, QrImageError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.download_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        builder
            .build()
            .map_err(|e| QrImageError::Network(format!("cannot build HTTP client: {}", e)))
    }

    /// 从 URL 下载 logo 原始字节。
    pub(super) async fn load_from_url(&self, url: &str) -> Result<RawImageData, QrImageError> {
        log::info!("🌐 开始下载 logo - URL: {}", Self::redact_url_for_log(url));

        let parsed = reqwest::Url::parse(url)
            .map_err(|e| QrImageError::InvalidFormat(format!("malformed URL {:?}: {}", url, e)))?;

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QrImageError::Network(format!(
                "HTTP {} {} for url: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Error"),
                Self::redact_url_for_log(url)
            )));
        }

        let max_file_size = self.config.max_file_size;
        if let Some(len) = response.content_length() {
            if len > max_file_size {
                return Err(Self::oversize_error(len, max_file_size));
            }
        }

        let initial_capacity = response
            .content_length()
            .map(|len| len.min(max_file_size) as usize)
            .filter(|len| *len > 0)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = Vec::with_capacity(initial_capacity);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?
        {
            let total = buffer.len() as u64 + chunk.len() as u64;
            if total > max_file_size {
                return Err(Self::oversize_error(total, max_file_size));
            }
            buffer.extend_from_slice(&chunk);
        }

        log::debug!("📦 下载完成 - {} 字节", buffer.len());

        Ok(RawImageData {
            bytes: buffer,
            source_hint: "url",
        })
    }

    /// 本地路径原样透传；空路径等同于没有图片。
    pub(super) fn pass_through_path(&self, path: PathBuf) -> Result<LogoPayload, QrImageError> {
        if path.as_os_str().is_empty() {
            return Err(QrImageError::EmptyLocation);
        }
        log::info!("📁 使用本地 logo - 路径: {}", path.display());
        Ok(LogoPayload::LocalPath(path))
    }

    /// 统一映射 reqwest 错误到业务错误。
    fn map_reqwest_error(&self, e: reqwest::Error, url: &str) -> QrImageError {
        let err_msg = e.to_string().replace(url, &Self::redact_url_for_log(url));

        if e.is_timeout() {
            QrImageError::Timeout(format!(
                "download exceeded {}s: {}",
                self.config.download_timeout_secs.unwrap_or_default(),
                err_msg
            ))
        } else if e.is_connect() {
            QrImageError::Network(format!("cannot connect: {}", err_msg))
        } else {
            QrImageError::Network(format!("request failed: {}", err_msg))
        }
    }

    fn oversize_error(size: u64, limit: u64) -> QrImageError {
        QrImageError::ResourceLimit(format!(
            "image too large: {:.2} MB (limit {:.2} MB)",
            size as f64 / 1024.0 / 1024.0,
            limit as f64 / 1024.0 / 1024.0
        ))
    }

    /// 日志中去掉 URL 的 query 与 fragment。
    pub(super) fn redact_url_for_log(url: &str) -> String {
        match reqwest::Url::parse(url) {
            Ok(mut parsed) => {
                parsed.set_query(None);
                parsed.set_fragment(None);
                parsed.to_string()
            }
            Err(_) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(status_line: &'static str, body: Vec<u8>) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
        let addr = listener.local_addr().expect("read local addr failed");

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept failed");

            let mut req_buf = [0u8; 1024];
            let _ = stream.read(&mut req_buf);

            let headers = format!(
                "HTTP/1.1 {}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );

            stream
                .write_all(headers.as_bytes())
                .expect("write headers failed");
            stream.write_all(&body).expect("write body failed");
            stream.flush().expect("flush failed");
        });

        (format!("http://127.0.0.1:{}/logo.png", addr.port()), server)
    }

    #[tokio::test]
    async fn load_from_url_returns_body_bytes() {
        let (url, server) = serve_once("200 OK", b"fake-png-bytes".to_vec());
        let handler = QrImageHandler::new(QrImageConfig::default()).expect("handler init failed");

        let raw = handler.load_from_url(&url).await.expect("download");
        server.join().expect("server thread failed");

        assert_eq!(raw.bytes, b"fake-png-bytes");
        assert_eq!(raw.source_hint, "url");
    }

    #[tokio::test]
    async fn load_from_url_treats_error_status_as_failure() {
        let (url, server) = serve_once("404 Not Found", Vec::new());
        let handler = QrImageHandler::new(QrImageConfig::default()).expect("handler init failed");

        let result = handler.load_from_url(&url).await;
        server.join().expect("server thread failed");

        match result {
            Err(QrImageError::Network(msg)) => assert!(msg.contains("HTTP 404")),
            other => panic!("unexpected result: {:?}", other.map(|r| r.bytes.len())),
        }
    }

    #[tokio::test]
    async fn load_from_url_enforces_size_limit() {
        let (url, server) = serve_once("200 OK", vec![7_u8; 64]);
        let config = QrImageConfig {
            max_file_size: 16,
            ..QrImageConfig::default()
        };
        let handler = QrImageHandler::new(config).expect("handler init failed");

        let result = handler.load_from_url(&url).await;
        server.join().expect("server thread failed");

        assert!(matches!(result, Err(QrImageError::ResourceLimit(_))));
    }

    #[tokio::test]
    async fn load_from_url_reports_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
        let port = listener.local_addr().expect("read local addr failed").port();
        drop(listener);

        let handler = QrImageHandler::new(QrImageConfig::default()).expect("handler init failed");
        let result = handler
            .load_from_url(&format!("http://127.0.0.1:{}/logo.png", port))
            .await;

        assert!(matches!(result, Err(QrImageError::Network(_))));
    }

    #[tokio::test]
    async fn load_from_url_rejects_malformed_url() {
        let handler = QrImageHandler::new(QrImageConfig::default()).expect("handler init failed");

        let result = handler.load_from_url("not a url").await;

        assert!(matches!(result, Err(QrImageError::InvalidFormat(_))));
    }

    #[test]
    fn pass_through_path_rejects_empty_path() {
        let handler = QrImageHandler::new(QrImageConfig::default()).expect("handler init failed");

        assert!(matches!(
            handler.pass_through_path(PathBuf::new()),
            Err(QrImageError::EmptyLocation)
        ));
        assert!(matches!(
            handler.pass_through_path(PathBuf::from("./missing.png")),
            Ok(LogoPayload::LocalPath(path)) if path == PathBuf::from("./missing.png")
        ));
    }

    #[test]
    fn redact_url_for_log_removes_query_and_fragment() {
        assert_eq!(
            QrImageHandler::redact_url_for_log("https://example.com:8443/img.png?token=abc#x"),
            "https://example.com:8443/img.png"
        );
        assert_eq!(QrImageHandler::redact_url_for_log("bad url?x=1"), "bad url");
    }
}
