//! # 命令行参数解析模块
//!
//! ## 设计思路
//!
//! 参数全部是位置参数，且每一个都“可缺省”：缺失或格式不对时只提示并替换为默认值，
//! 从不直接失败。解析结果是一个字段齐全的 `ResolvedOptions`，每个字段都带有
//! “是否使用了默认值”的标记，方便测试直接断言而不必解析控制台输出。
//!
//! ## 实现思路
//!
//! - `clap` 只负责把原始位置参数收集成 `CliArgs`（关闭内置 help/version 标志）。
//!   程序名之后固定插入 `--`，因此 `--`、`-h` 这类记号也按普通位置参数处理。
//! - `CliArgs::resolve` 完成模式判定、默认值替换与提示文案收集。
//! - 图片相关参数只在模式 2 下解析，其他模式不会产生相关提示。

use std::ffi::OsString;

use clap::Parser;

use crate::settings::Defaults;

/// 触发帮助信息的模式记号。
pub const HELP_TOKENS: [&str; 5] = ["help", "Help", "HELP", "h", "H"];

const PROGRAM_NAME: &str = "quantum-qr";

/// 原始位置参数。
#[derive(Debug, Parser)]
#[command(
    name = "quantum-qr",
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// 模式：1 = 纯二维码，2 = 中心带图片的二维码
    #[arg(allow_hyphen_values = true)]
    pub mode: Option<String>,
    /// 输出文件名（会追加 `.png`）
    #[arg(allow_hyphen_values = true)]
    pub filename: Option<String>,
    /// 编码进二维码的文本
    #[arg(allow_hyphen_values = true)]
    pub text: Option<String>,
    /// 图片 URL 或本地路径（仅模式 2）
    #[arg(allow_hyphen_values = true)]
    pub image_location: Option<String>,
    /// URL / DIR（仅模式 2）
    #[arg(allow_hyphen_values = true)]
    pub source_kind: Option<String>,
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

/// 运行模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `1`：纯二维码。
    Plain,
    /// `2`：二维码中心嵌入图片。
    WithLogo,
    /// 其他整数：提示后正常退出。
    Unknown(i64),
}

impl Mode {
    fn from_number(value: i64) -> Self {
        match value {
            1 => Self::Plain,
            2 => Self::WithLogo,
            other => Self::Unknown(other),
        }
    }
}

/// 解析后的单个字段及其默认值标记。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T> Setting<T> {
    fn given(value: T) -> Self {
        Self { value, defaulted: false }
    }

    fn defaulted(value: T) -> Self {
        Self { value, defaulted: true }
    }
}

/// 模式 2 的图片参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoOptions {
    pub image_location: Setting<String>,
    /// 原始来源记号，合法性在获取图片时才校验。
    pub source_kind: Setting<String>,
}

/// 字段齐全的运行参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub mode: Setting<Mode>,
    pub filename: Setting<String>,
    pub text: Setting<String>,
    /// 仅在 `Mode::WithLogo` 时存在。
    pub logo: Option<LogoOptions>,
    /// 按出现顺序排列的提示文案。
    pub notices: Vec<String>,
}

/// 一次调用的解析结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run(ResolvedOptions),
}

impl CliArgs {
    /// 从任意参数序列构造（首个元素视为程序名）。
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(escape_positionals(args))
    }

    /// 从进程参数构造。
    pub fn parse_env() -> Self {
        Self::parse_from(escape_positionals(std::env::args_os()))
    }

    /// 将原始参数解析为 `Invocation`。
    pub fn resolve(&self, defaults: &Defaults) -> Invocation {
        if let Some(token) = self.mode.as_deref() {
            if HELP_TOKENS.contains(&token) {
                return Invocation::Help;
            }
        }

        let mut notices = Vec::new();

        let mode = match self.mode.as_deref().and_then(parse_mode_number) {
            Some(value) => Setting::given(Mode::from_number(value)),
            None => {
                notices.push("Invalid or missing mode, defaulting to mode 1.".to_string());
                Setting::defaulted(Mode::Plain)
            }
        };

        let filename = match self.filename.as_deref() {
            Some(raw) => Setting::given(defaults.suffixed_filename(raw)),
            None => {
                notices.push(format!(
                    "Filename not specified, defaulting to \"{}\".",
                    defaults.filename
                ));
                Setting::defaulted(defaults.filename.clone())
            }
        };

        let text = match self.text.as_deref() {
            Some(raw) => Setting::given(raw.to_string()),
            None => {
                notices.push(format!(
                    "Text not specified, defaulting to \"{}\".",
                    defaults.text
                ));
                Setting::defaulted(defaults.text.clone())
            }
        };

        let logo = if mode.value == Mode::WithLogo {
            Some(self.resolve_logo(defaults, &mut notices))
        } else {
            None
        };

        log::debug!(
            "🧾 参数解析完成 - mode={:?} filename={} defaulted=[mode:{} filename:{} text:{}]",
            mode.value,
            filename.value,
            mode.defaulted,
            filename.defaulted,
            text.defaulted
        );

        Invocation::Run(ResolvedOptions {
            mode,
            filename,
            text,
            logo,
            notices,
        })
    }

    fn resolve_logo(&self, defaults: &Defaults, notices: &mut Vec<String>) -> LogoOptions {
        let image_location = match self.image_location.as_deref() {
            Some(raw) => Setting::given(raw.to_string()),
            None => {
                notices.push("Image URL/DIR not provided, using default image.".to_string());
                Setting::defaulted(defaults.image_location.clone())
            }
        };

        let source_kind = match self.source_kind.as_deref() {
            Some(raw) => Setting::given(raw.to_string()),
            None => {
                notices.push("URL/Dir mode not specified, defaulting to URL.".to_string());
                Setting::defaulted(defaults.source_kind.clone())
            }
        };

        LogoOptions {
            image_location,
            source_kind,
        }
    }
}

/// 在程序名之后插入 `--`，之后的所有记号都只作为位置参数值。
fn escape_positionals<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let program = args.next().unwrap_or_else(|| OsString::from(PROGRAM_NAME));

    let mut escaped = vec![program, OsString::from("--")];
    escaped.extend(args);
    escaped
}

/// 模式记号按整数解析：允许首尾空白、正负号以及数字之间的单个 `_`。
///
/// 超出 `i64` 的整数仍是合法整数，按饱和值返回。
fn parse_mode_number(token: &str) -> Option<i64> {
    let trimmed = token.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let well_formed = !body.is_empty()
        && body
            .split('_')
            .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return None;
    }

    let digits: String = body.chars().filter(|c| *c != '_').collect();
    Some(match (negative, digits.parse::<i64>()) {
        (false, Ok(value)) => value,
        (true, Ok(value)) => -value,
        (false, Err(_)) => i64::MAX,
        (true, Err(_)) => i64::MIN,
    })
}

/// 帮助文案。
pub fn usage() -> String {
    format!(
        "Usage: {} <MODE> <FILENAME> <\"QR DATA\"> <\"IMAGE URL/DIR\" (Mode 2 only!)> <URL/DIR (Mode 2 only!)>\n\
         Modes:\n\
         [1] Text2QR\n\
         [2] Text2QR with an image in the center",
        PROGRAM_NAME
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn resolve(args: &[&str]) -> Invocation {
        let mut argv = vec![PROGRAM_NAME];
        argv.extend_from_slice(args);
        CliArgs::try_from_args(argv)
            .expect("parse args")
            .resolve(&Defaults::default())
    }

    fn run_options(args: &[&str]) -> ResolvedOptions {
        match resolve(args) {
            Invocation::Run(options) => options,
            Invocation::Help => panic!("unexpected help invocation"),
        }
    }

    #[test]
    fn clap_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn help_tokens_short_circuit() {
        for token in HELP_TOKENS {
            assert_eq!(resolve(&[token, "ignored"]), Invocation::Help);
        }
        assert!(matches!(resolve(&["hElp"]), Invocation::Run(_)));
    }

    #[test]
    fn no_arguments_defaults_everything() {
        let options = run_options(&[]);

        assert_eq!(options.mode, Setting::defaulted(Mode::Plain));
        assert_eq!(options.filename, Setting::defaulted("MyQR.png".to_string()));
        assert_eq!(options.text, Setting::defaulted("Hello World!".to_string()));
        assert!(options.logo.is_none());
        assert_eq!(
            options.notices,
            vec![
                "Invalid or missing mode, defaulting to mode 1.".to_string(),
                "Filename not specified, defaulting to \"MyQR.png\".".to_string(),
                "Text not specified, defaulting to \"Hello World!\".".to_string(),
            ]
        );
    }

    #[test]
    fn non_integer_mode_behaves_as_plain() {
        let invalid = run_options(&["two", "out", "payload"]);
        let explicit = run_options(&["1", "out", "payload"]);

        assert_eq!(invalid.mode.value, explicit.mode.value);
        assert!(invalid.mode.defaulted);
        assert!(!explicit.mode.defaulted);
        assert_eq!(invalid.filename, explicit.filename);
        assert_eq!(invalid.text, explicit.text);
    }

    #[test]
    fn mode_token_accepts_whitespace_and_sign() {
        assert_eq!(run_options(&[" 2 "]).mode.value, Mode::WithLogo);
        assert_eq!(run_options(&["+1"]).mode.value, Mode::Plain);
        assert_eq!(run_options(&["0"]).mode.value, Mode::Unknown(0));
        assert_eq!(run_options(&["7"]).mode.value, Mode::Unknown(7));
    }

    #[test]
    fn oversized_integer_mode_is_unknown() {
        let options = run_options(&["99999999999999999999", "a", "b"]);
        assert_eq!(options.mode, Setting::given(Mode::Unknown(i64::MAX)));
        assert!(options.notices.is_empty());

        let negative = run_options(&["-99999999999999999999", "a", "b"]);
        assert_eq!(negative.mode, Setting::given(Mode::Unknown(i64::MIN)));
    }

    #[test]
    fn mode_token_accepts_digit_separators() {
        assert_eq!(run_options(&["1_0"]).mode.value, Mode::Unknown(10));
        assert_eq!(run_options(&["-5"]).mode.value, Mode::Unknown(-5));

        for malformed in ["_1", "1_", "1__0", "+", "-", "+-1", "1.0"] {
            let options = run_options(&[malformed]);
            assert_eq!(options.mode, Setting::defaulted(Mode::Plain), "token {malformed:?}");
        }
    }

    #[test]
    fn double_dash_is_an_ordinary_value() {
        let options = run_options(&["1", "out", "--"]);
        assert_eq!(options.text, Setting::given("--".to_string()));

        let options = run_options(&["--", "-h", "--help"]);
        assert!(options.mode.defaulted);
        assert_eq!(options.filename.value, "-h.png");
        assert_eq!(options.text.value, "--help");
    }

    #[test]
    fn filename_suffix_is_doubled_when_already_present() {
        assert_eq!(run_options(&["1", "logo"]).filename.value, "logo.png");
        assert_eq!(run_options(&["1", "logo.png"]).filename.value, "logo.png.png");
    }

    #[test]
    fn logo_options_only_resolved_for_mode_two() {
        assert!(run_options(&["1", "a", "b", "c", "d"]).logo.is_none());
        assert!(run_options(&["9", "a", "b"]).logo.is_none());

        let options = run_options(&["2", "a", "b"]);
        let logo = options.logo.expect("logo options");
        assert!(logo.image_location.defaulted);
        assert_eq!(logo.image_location.value, crate::settings::DEFAULT_IMAGE_URL);
        assert_eq!(logo.source_kind, Setting::defaulted("url".to_string()));
        assert_eq!(
            options.notices,
            vec![
                "Image URL/DIR not provided, using default image.".to_string(),
                "URL/Dir mode not specified, defaulting to URL.".to_string(),
            ]
        );
    }

    #[test]
    fn explicit_logo_arguments_are_kept_verbatim() {
        let options = run_options(&["2", "out", "text", "./logo.png", "ftp", "extra"]);
        let logo = options.logo.expect("logo options");

        assert_eq!(logo.image_location, Setting::given("./logo.png".to_string()));
        assert_eq!(logo.source_kind, Setting::given("ftp".to_string()));
        assert!(options.notices.is_empty());
    }

    #[test]
    fn injected_defaults_are_used() {
        let defaults = Defaults {
            filename: "custom.png".to_string(),
            text: "payload".to_string(),
            ..Defaults::default()
        };
        let args = CliArgs::try_from_args([PROGRAM_NAME, "1"]).expect("parse args");

        match args.resolve(&defaults) {
            Invocation::Run(options) => {
                assert_eq!(options.filename.value, "custom.png");
                assert_eq!(options.text.value, "payload");
            }
            Invocation::Help => panic!("unexpected help invocation"),
        }
    }

    #[test]
    fn usage_lists_both_modes() {
        let text = usage();
        assert!(text.starts_with("Usage: quantum-qr <MODE>"));
        assert!(text.contains("[1] Text2QR\n"));
        assert!(text.ends_with("[2] Text2QR with an image in the center"));
    }
}
