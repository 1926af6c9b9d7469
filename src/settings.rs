//! # 默认值模块
//!
//! ## 设计思路
//!
//! 所有“参数缺省时的替代值”集中定义为具名常量，不在解析逻辑中散落字面量。
//! `Defaults` 把这些常量打包成一个可替换的值，测试可以注入自己的默认值。

/// 未提供文件名时使用的输出文件名（已包含后缀）。
pub const DEFAULT_FILENAME: &str = "MyQR.png";

/// 未提供内容时编码进二维码的文本。
pub const DEFAULT_TEXT: &str = "Hello World!";

/// 模式 2 未提供图片位置时使用的占位 logo。
pub const DEFAULT_IMAGE_URL: &str =
    "https://svgtopng.com/files/6lldgu0p4szac8y5/o_1er05v6kt1ksorj9mhu1vfpe51b/thumb.png";

/// 未指定来源类型时使用的记号。
pub const DEFAULT_SOURCE_KIND: &str = "url";

/// 用户提供的文件名一律追加此后缀（即使已经以 `.png` 结尾）。
pub const OUTPUT_SUFFIX: &str = ".png";

/// 参数解析使用的默认值集合。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub filename: String,
    pub text: String,
    pub image_location: String,
    pub source_kind: String,
    pub output_suffix: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            text: DEFAULT_TEXT.to_string(),
            image_location: DEFAULT_IMAGE_URL.to_string(),
            source_kind: DEFAULT_SOURCE_KIND.to_string(),
            output_suffix: OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl Defaults {
    /// 为用户提供的文件名追加输出后缀。
    ///
    /// 不检查是否已有后缀：`logo.png` 会得到 `logo.png.png`。
    pub fn suffixed_filename(&self, raw: &str) -> String {
        format!("{}{}", raw, self.output_suffix)
    }
}
