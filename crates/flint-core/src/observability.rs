//! 可观测性门面：结构化日志的最小契约与关闭域的稳定字段键名。
//!
//! # 教案级说明
//! - **Why**：关闭协调的每次状态跃迁与裁决投递都值得留痕，但核心 crate 不应绑定
//!   任何具体日志后端；以对象安全的 [`Logger`] 门面解耦，宿主可对接自有管线；
//! - **What**：定义日志级别、键值属性与单条记录结构；[`NoopLogger`] 作为默认空实现；
//! - **How**：记录以借用形式传递，热路径上零拷贝；字段键收敛在 [`keys`] 模块，
//!   作为“单一事实来源”防止漂移。

use alloc::borrow::Cow;
use core::fmt;

/// 日志级别。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSeverity::Trace => f.write_str("trace"),
            LogSeverity::Debug => f.write_str("debug"),
            LogSeverity::Info => f.write_str("info"),
            LogSeverity::Warn => f.write_str("warn"),
            LogSeverity::Error => f.write_str("error"),
        }
    }
}

/// 属性值的统一枚举。
///
/// # 契约说明（What）
/// - 支持文本、布尔与整数三类标量；关闭域的字段全部是低基数标签，
///   不需要浮点与复合类型。
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue<'a> {
    /// 文本值。
    Text(Cow<'a, str>),
    /// 布尔值。
    Bool(bool),
    /// 整数值。
    I64(i64),
}

impl<'a> From<&'a str> for AttributeValue<'a> {
    fn from(value: &'a str) -> Self {
        AttributeValue::Text(Cow::Borrowed(value))
    }
}

impl From<bool> for AttributeValue<'_> {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue<'_> {
    fn from(value: i64) -> Self {
        AttributeValue::I64(value)
    }
}

/// 单个属性键值对。
///
/// # 契约说明（What）
/// - **前置条件**：键名低基数、蛇形命名，且不与 [`keys`] 中的保留键冲突；
/// - **后置条件**：可安全在线程间克隆，本身不提供同步原语。
#[derive(Clone, Debug, PartialEq)]
pub struct KeyValue<'a> {
    pub key: Cow<'a, str>,
    pub value: AttributeValue<'a>,
}

impl<'a> KeyValue<'a> {
    /// 构建属性键值对。
    pub fn new(key: impl Into<Cow<'a, str>>, value: impl Into<AttributeValue<'a>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 属性集合的借用视图；生命周期由调用方管理。
pub type AttributeSet<'a> = &'a [KeyValue<'a>];

/// 单条结构化日志记录。
///
/// # 契约说明（What）
/// - **前置条件**：`attributes` 切片需在 [`Logger::log`] 返回前保持有效；
/// - **后置条件**：记录提交后视为不可变对象，实现不得缓存其中的引用。
#[derive(Debug)]
pub struct LogRecord<'a> {
    pub message: Cow<'a, str>,
    pub severity: LogSeverity,
    pub attributes: AttributeSet<'a>,
}

impl<'a> LogRecord<'a> {
    /// 构建新的日志记录。
    pub fn new(
        message: impl Into<Cow<'a, str>>,
        severity: LogSeverity,
        attributes: AttributeSet<'a>,
    ) -> Self {
        Self {
            message: message.into(),
            severity,
            attributes,
        }
    }
}

/// 日志接口的核心契约。
///
/// # 契约说明（What）
/// - `log` 为唯一必需方法；便捷方法内部构造 [`LogRecord`] 再调用 `log`，
///   确保所有路径共享相同逻辑；
/// - 实现应尽量非阻塞，必要时将写出移交后台。
pub trait Logger: Send + Sync + 'static {
    /// 提交结构化日志。
    fn log(&self, record: &LogRecord<'_>);

    /// 输出带字段的 DEBUG 日志。
    fn debug_with_fields(&self, message: &str, attributes: AttributeSet<'_>) {
        self.log(&LogRecord::new(message, LogSeverity::Debug, attributes));
    }

    /// 输出带字段的 INFO 日志。
    fn info_with_fields(&self, message: &str, attributes: AttributeSet<'_>) {
        self.log(&LogRecord::new(message, LogSeverity::Info, attributes));
    }

    /// 输出带字段的 WARN 日志。
    fn warn_with_fields(&self, message: &str, attributes: AttributeSet<'_>) {
        self.log(&LogRecord::new(message, LogSeverity::Warn, attributes));
    }
}

/// 丢弃一切记录的空实现，作为未注入日志后端时的默认值。
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _record: &LogRecord<'_>) {}
}

/// 关闭域日志字段键名：指标、日志与告警统一引用的单一事实来源。
pub mod keys {
    /// 触发处理的关闭事件标签。
    pub const FIELD_EVENT: &str = "close.event";
    /// 处理后的连接阶段。
    pub const FIELD_PHASE: &str = "close.phase";
    /// 本次投递的裁决标签。
    pub const FIELD_VERDICT: &str = "close.verdict";
    /// 连接标识。
    pub const FIELD_CONNECTION: &str = "close.connection";
    /// 请求的半关闭方向。
    pub const FIELD_DIRECTION: &str = "close.direction";
}
