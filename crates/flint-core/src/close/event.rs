use core::fmt;
use serde::{Deserialize, Serialize};

/// `CloseEvent` 是连接生命周期可能发生的关闭事实的完整词汇表。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 关闭协调的一切判定都建立在“到底发生了哪种关闭”之上：本端主动、对端协议级优雅信号、
///   通道某半边彻底关闭、还是毫无征兆的异常断连。把这些事实收敛为封闭枚举，
///   使分类策略可以穷尽匹配并获得编译期覆盖保证。
/// - 每个事件是一次点状事实；同一连接上的事件按到达顺序全序排列。
///
/// ## 契约说明（What）
/// - `UserInitiatedClose`：本端用户请求关闭连接；
/// - `ProtocolCloseInbound`：对端发来协议级优雅关闭信号（如 TLS close-notify）；
/// - `ProtocolCloseOutbound`：本端的协议级优雅关闭信号已发出；
/// - `ChannelClosedInbound`：传输通道的读方向已彻底关闭；
/// - `ChannelClosedOutbound`：传输通道的写方向已彻底关闭；
/// - `AbruptClose`：连接在无任何优雅信号的情况下断开（RST、意外 EOF）。
/// - 枚举刻意不加 `#[non_exhaustive]`：消费方必须穷尽匹配，新增变体属于破坏性变更。
///
/// ## 风险提示（Trade-offs）
/// - 事件只描述事实，不携带时间戳与地址等上下文；诊断信息由日志字段补充，
///   避免在热路径上复制大对象。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseEvent {
    /// 本端用户请求关闭。
    UserInitiatedClose,
    /// 对端发来协议级优雅关闭信号。
    ProtocolCloseInbound,
    /// 本端协议级优雅关闭信号已发出。
    ProtocolCloseOutbound,
    /// 通道读方向彻底关闭。
    ChannelClosedInbound,
    /// 通道写方向彻底关闭。
    ChannelClosedOutbound,
    /// 无优雅信号的异常断连。
    AbruptClose,
}

impl CloseEvent {
    /// 事件是否波及入站（读）半边。
    pub fn closes_inbound(&self) -> bool {
        matches!(
            self,
            CloseEvent::UserInitiatedClose
                | CloseEvent::ProtocolCloseInbound
                | CloseEvent::ChannelClosedInbound
                | CloseEvent::AbruptClose
        )
    }

    /// 事件是否波及出站（写）半边。
    pub fn closes_outbound(&self) -> bool {
        matches!(
            self,
            CloseEvent::UserInitiatedClose
                | CloseEvent::ProtocolCloseOutbound
                | CloseEvent::ChannelClosedOutbound
                | CloseEvent::AbruptClose
        )
    }

    /// 事件是否属于协议级优雅信号（含本端主动关闭）。
    pub fn is_graceful(&self) -> bool {
        matches!(
            self,
            CloseEvent::UserInitiatedClose
                | CloseEvent::ProtocolCloseInbound
                | CloseEvent::ProtocolCloseOutbound
        )
    }

    /// 把协议级优雅信号折算为它对通道的最终后果。
    ///
    /// # 契约说明（What）
    /// - 对端的 close-notify 意味着入站半边事实上已经到头，因此
    ///   `ProtocolCloseInbound → ChannelClosedInbound`，出站方向对称；
    /// - 其余事件本身就是通道层事实，原样返回。
    ///
    /// 空闲连接上的竞速分类（`Observed`）使用该折算结果，让调用方直接看到
    /// “通道哪一半没了”，而不是触发它的上游信号。
    pub fn channel_consequence(&self) -> CloseEvent {
        match self {
            CloseEvent::ProtocolCloseInbound => CloseEvent::ChannelClosedInbound,
            CloseEvent::ProtocolCloseOutbound => CloseEvent::ChannelClosedOutbound,
            other => *other,
        }
    }

    /// 面向日志字段的稳定低基数标签。
    pub fn diagnostic_label(&self) -> &'static str {
        match self {
            CloseEvent::UserInitiatedClose => "user_initiated_close",
            CloseEvent::ProtocolCloseInbound => "protocol_close_inbound",
            CloseEvent::ProtocolCloseOutbound => "protocol_close_outbound",
            CloseEvent::ChannelClosedInbound => "channel_closed_inbound",
            CloseEvent::ChannelClosedOutbound => "channel_closed_outbound",
            CloseEvent::AbruptClose => "abrupt_close",
        }
    }
}

impl fmt::Display for CloseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseEvent::UserInitiatedClose => f.write_str("user initiated close"),
            CloseEvent::ProtocolCloseInbound => f.write_str("protocol close inbound"),
            CloseEvent::ProtocolCloseOutbound => f.write_str("protocol close outbound"),
            CloseEvent::ChannelClosedInbound => f.write_str("channel closed inbound"),
            CloseEvent::ChannelClosedOutbound => f.write_str("channel closed outbound"),
            CloseEvent::AbruptClose => f.write_str("abrupt close"),
        }
    }
}
