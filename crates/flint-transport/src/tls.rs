use core::fmt;

/// `CloseNotifySignal` 描述 TLS 层观测到的 close-notify 告警完成事实。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - TLS 的 close-notify 是对端（或本端）承诺“该方向不再有数据”的协议级优雅信号；
///   上层关闭协调逻辑需要区分它与套接字层面的硬关闭，才能做出正确的重试安全判定。
/// - 本枚举只承载“信号发生在哪个方向”这一事实，不涉及 TLS 记录层机制。
///
/// ## 契约说明（What）
/// - `Inbound`：收到了对端发来的 close-notify；
/// - `Outbound`：本端的 close-notify 已发出；
/// - 每个信号是一次性的点事实，方向内重复上报由消费方去重。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CloseNotifySignal {
    /// 收到对端 close-notify。
    Inbound,
    /// 本端 close-notify 已发出。
    Outbound,
}

impl fmt::Display for CloseNotifySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseNotifySignal::Inbound => f.write_str("close-notify inbound"),
            CloseNotifySignal::Outbound => f.write_str("close-notify outbound"),
        }
    }
}
