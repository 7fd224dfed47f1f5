use core::fmt;

use super::event::CloseEvent;

/// 连接生命周期的粗粒度阶段：`Open → Closing → Closed`，`Closed` 为终态。
///
/// # 契约说明（What）
/// - `Closing` 覆盖任一半边开始关闭而整体尚未终结的全部中间形态；
///   半边细节由 [`ConnectionState`] 的布尔位承载，不再枚举子状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionPhase {
    /// 两个半边都完全可用。
    Open,
    /// 至少一个半边开始关闭。
    Closing,
    /// 连接已终结，不再接受新事件。
    Closed,
}

impl ConnectionPhase {
    /// 面向日志字段的稳定低基数标签。
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionPhase::Open => "open",
            ConnectionPhase::Closing => "closing",
            ConnectionPhase::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionPhase::Open => f.write_str("open"),
            ConnectionPhase::Closing => f.write_str("closing"),
            ConnectionPhase::Closed => f.write_str("closed"),
        }
    }
}

/// 一次事件观察对状态机的影响。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    /// 本次事件是否改变了任何状态位。
    pub changed: bool,
    /// 本次事件是否使连接进入终态。
    pub became_closed: bool,
}

impl StateChange {
    /// 无任何影响的观察结果。
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            became_closed: false,
        }
    }
}

/// 每连接一份的关闭状态机。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 双工连接的两个半边可以独立、以任意顺序关闭；用两组布尔位
///   （“开始关闭”与“彻底关闭”各分入站/出站）而非枚举子状态来追踪，
///   避免组合爆炸，也让“任意到达顺序收敛到同一终态”天然成立。
///
/// ## 契约说明（What）
/// - `observe` 按到达顺序逐个消化事件并返回 [`StateChange`]；
/// - 一旦进入 `Closed`，后续任何事件都是无影响的静默观察（幂等，不是错误）；
/// - 终态条件：观察到 `AbruptClose`，或两个半边均已彻底关闭
///   （`ChannelClosedInbound` 与 `ChannelClosedOutbound` 先后到齐）。
///
/// ## 并发（Concurrency）
/// - 与 [`ExchangeProgress`](super::progress::ExchangeProgress) 相同：裸数据，
///   串行化由持有它的协调器临界区负责（见 `coordinator` 模块）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionState {
    inbound_closing: bool,
    outbound_closing: bool,
    inbound_closed: bool,
    outbound_closed: bool,
    closed: bool,
}

impl ConnectionState {
    /// 全开初始状态。
    pub fn new() -> Self {
        Self::default()
    }

    /// 消化一个按到达顺序投递的关闭事件。
    ///
    /// # 执行逻辑（How）
    /// 1. 终态短路：`Closed` 之后一切事件无影响；
    /// 2. 根据事件种类置位相应半边的 closing/closed 标记；
    ///    `UserInitiatedClose` 表示整条连接进入关闭流程，两个半边同时标记 closing；
    /// 3. 两半边均彻底关闭或出现 `AbruptClose` 时收敛到终态；
    /// 4. 与观察前的快照比较得出 `changed`，重复事实自然归于无影响。
    pub fn observe(&mut self, event: CloseEvent) -> StateChange {
        if self.closed {
            return StateChange::unchanged();
        }

        let before = *self;
        match event {
            CloseEvent::UserInitiatedClose => {
                self.inbound_closing = true;
                self.outbound_closing = true;
            }
            CloseEvent::ProtocolCloseInbound => {
                self.inbound_closing = true;
            }
            CloseEvent::ProtocolCloseOutbound => {
                self.outbound_closing = true;
            }
            CloseEvent::ChannelClosedInbound => {
                self.inbound_closing = true;
                self.inbound_closed = true;
            }
            CloseEvent::ChannelClosedOutbound => {
                self.outbound_closing = true;
                self.outbound_closed = true;
            }
            CloseEvent::AbruptClose => {
                self.inbound_closing = true;
                self.outbound_closing = true;
                self.inbound_closed = true;
                self.outbound_closed = true;
            }
        }

        if self.inbound_closed && self.outbound_closed {
            self.closed = true;
        }

        StateChange {
            changed: *self != before,
            became_closed: self.closed && !before.closed,
        }
    }

    /// 当前阶段。
    pub fn phase(&self) -> ConnectionPhase {
        if self.closed {
            ConnectionPhase::Closed
        } else if self.inbound_closing || self.outbound_closing {
            ConnectionPhase::Closing
        } else {
            ConnectionPhase::Open
        }
    }

    /// 入站半边是否开始关闭。
    pub fn inbound_closing(&self) -> bool {
        self.inbound_closing
    }

    /// 出站半边是否开始关闭。
    pub fn outbound_closing(&self) -> bool {
        self.outbound_closing
    }

    /// 连接是否已终结。
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
