use crate::close::CloseEvent;
use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use core::fmt;

/// 对象安全的轻量错误抽象，在 `no_std + alloc` 环境下替代 `std::error::Error`。
///
/// # 设计背景（Why）
/// - 核心契约需兼容 `no_std + alloc` 场景，不能直接依赖 `std::error::Error`；
/// - 通过 crate 内部定义的最小 trait 保留“根因链路”能力，`std` 构建下再桥接标准库。
///
/// # 契约说明（What）
/// - `cause` 返回可选的底层原因，默认无；
/// - 实现必须 `Send + Sync + 'static`，以便错误可安全跨线程传播。
pub trait Error: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// 查询底层原因，默认没有。
    fn cause(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

/// `FlintError` 表示跨层共享的稳定错误域，是所有可观察错误的最终形态。
///
/// # 设计背景（Why）
/// - 关闭协调、传输实现与上层重试逻辑在不同层次产生的故障需要合流为统一的错误码，
///   以便日志与重试治理能够执行精确的自动化分类。
/// - 框架兼容 `no_std + alloc` 场景，因此复用 crate 内部定义的轻量 [`Error`] 抽象。
///
/// # 契约说明（What）
/// - **前置条件**：调用方必须使用 [`codes`] 模块或遵循 `<域>.<语义>` 约定的自定义码值；
/// - **返回值**：构造函数返回拥有所有权的 `FlintError`，可安全跨线程移动（`Send + Sync + 'static`）；
/// - **后置条件**：除非显式调用 `with_cause`，错误不包含底层原因。
///
/// # 设计取舍与风险（Trade-offs）
/// - 采用 `Cow` 保存消息，静态文案零分配，动态文案仅一次堆分配；
/// - 错误码始终为 `'static` 字符串，承载稳定语义；`message` 面向排障人员。
#[derive(Debug)]
pub struct FlintError {
    code: &'static str,
    message: Cow<'static, str>,
    cause: Option<Box<dyn Error>>,
}

impl FlintError {
    /// 构造核心错误。
    ///
    /// # 契约说明（What）
    /// - `code`：遵循 `<域>.<语义>` 约定的稳定错误码；
    /// - `message`：面向排障人员的自然语言描述，不应包含敏感信息。
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// 附加底层原因，Builder 风格。
    pub fn with_cause(mut self, cause: impl Error) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 获取人类可读描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 查询底层原因。
    pub fn source_cause(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref()
    }

    /// 错误是否携带“可安全重试”标记。
    ///
    /// # 契约说明（What）
    /// - 仅 [`codes::CLOSURE_RETRYABLE`] 携带该标记；上层重试逻辑只能依据它重发交换，
    ///   其余错误码一律按不可重试处理。
    pub fn is_retry_safe(&self) -> bool {
        self.code == codes::CLOSURE_RETRYABLE
    }
}

impl fmt::Display for FlintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for FlintError {
    fn cause(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref()
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FlintError {}

/// 关闭协调域的稳定错误码集合。
///
/// # 设计背景（Why）
/// - 关闭期间的失败必须让上层“只看错误码”就能决定是否重发交换，因此码值粒度与
///   [`ClosureVerdict`](crate::close::ClosureVerdict) 三分类一一对应；
/// - 错误码遵循 `<域>.<语义>` 命名约定，方便在跨组件日志中检索与聚合。
///
/// # 契约说明（What）
/// - **使用前提**：错误码应由实现者封装进 [`FlintError`]，并在日志中携带完整上下文；
/// - **返回承诺**：调用方收到 [`CLOSURE_RETRYABLE`] 后可在新连接上安全重发；其余码值
///   必须作为硬失败向上传播。
pub mod codes {
    /// 交换未产生对外可见进展即被关闭打断，可安全重发。
    pub const CLOSURE_RETRYABLE: &str = "closure.retryable";
    /// 空闲连接上的新操作与关闭竞速，仅告知观测到的关闭事实。
    pub const CLOSURE_OBSERVED: &str = "closure.observed";
    /// 响应已部分写出或通道已关闭，交换被硬终止。
    pub const TRANSPORT_CHANNEL_CLOSED: &str = "transport.channel_closed";
    /// 传输层 I/O 错误。
    pub const TRANSPORT_IO: &str = "transport.io";
}

/// 可安全重发的关闭失败：交换尚未向对端产生任何部分性进展。
///
/// # 契约说明（What）
/// - `event` 记录触发分类的关闭事实，供诊断与指标使用；
/// - 上层重试逻辑收到该错误后，可在新连接上重新发起整个交换而无重复副作用风险。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryableClosureError {
    event: CloseEvent,
}

impl RetryableClosureError {
    /// 以触发事件构造错误。
    pub fn new(event: CloseEvent) -> Self {
        Self { event }
    }

    /// 触发分类的关闭事件。
    pub fn event(&self) -> CloseEvent {
        self.event
    }

    /// 恒为真：这是唯一携带重试安全标记的关闭错误。
    pub fn is_retry_safe(&self) -> bool {
        true
    }
}

impl fmt::Display for RetryableClosureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "connection closed before the exchange made visible progress ({})",
            self.event
        )
    }
}

impl Error for RetryableClosureError {}

impl From<RetryableClosureError> for FlintError {
    fn from(kind: RetryableClosureError) -> Self {
        FlintError::new(
            codes::CLOSURE_RETRYABLE,
            format!("exchange interrupted by {}, safe to retry", kind.event()),
        )
        .with_cause(kind)
    }
}

/// 硬终止的关闭失败：响应可能已部分送达对端，重发会带来重复副作用风险。
///
/// # 契约说明（What）
/// - 语义等价于“通道已关闭”一类的错误，既用于写到一半被打断的交换，
///   也用于在已关闭连接上发起的新订阅；
/// - 上层必须将其作为不可重试的硬失败向调用方传播。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbortedClosureError {
    event: CloseEvent,
}

impl AbortedClosureError {
    /// 以触发事件构造错误。
    pub fn new(event: CloseEvent) -> Self {
        Self { event }
    }

    /// 触发分类的关闭事件。
    pub fn event(&self) -> CloseEvent {
        self.event
    }

    /// 恒为假：该错误不可重试。
    pub fn is_retry_safe(&self) -> bool {
        false
    }
}

impl fmt::Display for AbortedClosureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel closed while the exchange was in flight ({})", self.event)
    }
}

impl Error for AbortedClosureError {}

impl From<AbortedClosureError> for FlintError {
    fn from(kind: AbortedClosureError) -> Self {
        FlintError::new(
            codes::TRANSPORT_CHANNEL_CLOSED,
            format!("exchange aborted by {}", kind.event()),
        )
        .with_cause(kind)
    }
}

/// 仅告知关闭事实的信息性失败：不对重试安全性做任何判断。
///
/// # 契约说明（What）
/// - 出现在空闲连接上的新操作与关闭竞速时，调用方只需要知道确切发生了哪种关闭，
///   例如区分对端优雅下线与异常断连；
/// - 默认按不可重试处理。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObservedClosureError {
    event: CloseEvent,
}

impl ObservedClosureError {
    /// 以触发事件构造错误。
    pub fn new(event: CloseEvent) -> Self {
        Self { event }
    }

    /// 触发分类的关闭事件。
    pub fn event(&self) -> CloseEvent {
        self.event
    }

    /// 恒为假：信息性错误不携带重试安全标记。
    pub fn is_retry_safe(&self) -> bool {
        false
    }
}

impl fmt::Display for ObservedClosureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "close event observed on idle connection ({})", self.event)
    }
}

impl Error for ObservedClosureError {}

impl From<ObservedClosureError> for FlintError {
    fn from(kind: ObservedClosureError) -> Self {
        FlintError::new(
            codes::CLOSURE_OBSERVED,
            format!("close event observed: {}", kind.event()),
        )
        .with_cause(kind)
    }
}
