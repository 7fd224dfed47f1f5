use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use super::event::CloseEvent;
use super::policy::{classify, ClosureVerdict};
use super::progress::ExchangeProgress;
use super::state::{ConnectionPhase, ConnectionState};
use crate::configuration::CloseConfig;
use crate::error::{AbortedClosureError, ObservedClosureError};
use crate::observability::{keys, KeyValue, Logger, NoopLogger};
use crate::stream::TerminalSignalSink;
use crate::transport::{ShutdownDirection, TransportCloser};

/// 一次关闭事件处理的对外结论。
///
/// # 契约说明（What）
/// - `state_changed`：事件是否推进了连接状态；重复事实与终态后的事件均为假；
/// - `verdict`：仅当事件波及在途读/写流时才出现；纯状态记账返回 `None`。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CloseObservation {
    /// 事件是否改变了连接状态。
    pub state_changed: bool,
    /// 波及在途交换时的定性结论。
    pub verdict: Option<ClosureVerdict>,
}

impl CloseObservation {
    /// 无任何影响的静默观察。
    pub fn silent() -> Self {
        Self {
            state_changed: false,
            verdict: None,
        }
    }

    /// 本次处理是否完全无影响。
    pub fn is_silent(&self) -> bool {
        !self.state_changed && self.verdict.is_none()
    }
}

/// 关闭协调的统一契约：交换执行逻辑与传输事件源共同面向的入口。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 交换执行逻辑需要在读写开始/结束时打点，传输层需要在观察到关闭事实时上报，
///   两者面向同一个对象安全契约，便于在“一问一答协议”与“无半关闭语义协议”之间
///   热替换实现；
/// - 与其让多条异步回调链共享可变的处理器状态，不如收敛为单一持有者：
///   每连接一个实例，所有状态变更经由同一串行化入口。
///
/// ## 契约说明（What）
/// - 打点方法（`read_started` 等）由持有在途读写的线程调用，内部与事件处理共用
///   同一临界区，分类永远读到一致的进度快照；
/// - `register_read`/`register_write` 登记当前订阅的流；连接终态后登记立即被拒，
///   以硬错误收尾，返回 `false`；
/// - `on_close_event` 按到达顺序串行消化事件；终态后的重复投递是静默无操作；
/// - 所有回调（终态投递、关闭请求）都在临界区外发起，订阅者在错误回调中重入
///   协调器不会死锁。
pub trait CloseCoordination: Send + Sync + 'static {
    /// 标记请求消费开始。
    fn read_started(&self);

    /// 标记请求消费结束。
    fn read_complete(&self);

    /// 标记响应发射开始。
    fn write_started(&self);

    /// 标记响应发射结束。
    fn write_complete(&self);

    /// 登记当前订阅的读流；连接终态后拒绝并返回 `false`。
    fn register_read(&self, sink: Arc<dyn TerminalSignalSink>) -> bool;

    /// 登记当前订阅的写流；连接终态后拒绝并返回 `false`。
    fn register_write(&self, sink: Arc<dyn TerminalSignalSink>) -> bool;

    /// 按到达顺序消化一个关闭事件。
    fn on_close_event(&self, event: CloseEvent) -> CloseObservation;

    /// 本端用户请求关闭连接。
    fn user_close(&self);

    /// 当前连接阶段。
    fn phase(&self) -> ConnectionPhase;

    /// 当前交换进度快照。
    fn progress(&self) -> ExchangeProgress;
}

struct CoordinatorInner {
    state: ConnectionState,
    progress: ExchangeProgress,
    read_slot: Option<Arc<dyn TerminalSignalSink>>,
    write_slot: Option<Arc<dyn TerminalSignalSink>>,
    drain_pending: bool,
    user_close_requested: bool,
    final_close_requested: bool,
}

impl CoordinatorInner {
    fn new() -> Self {
        Self {
            state: ConnectionState::new(),
            progress: ExchangeProgress::new(),
            read_slot: None,
            write_slot: None,
            drain_pending: false,
            user_close_requested: false,
            final_close_requested: false,
        }
    }

    /// 把已经自行终结（完成/出错/取消）的流移出在途集合。
    fn prune_settled(&mut self) {
        if self.read_slot.as_ref().is_some_and(|sink| sink.is_settled()) {
            self.read_slot = None;
        }
        if self.write_slot.as_ref().is_some_and(|sink| sink.is_settled()) {
            self.write_slot = None;
        }
    }
}

/// 一问一答交换的关闭协调器。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 这是关闭协调的核心实现：观察传输层上报的关闭事实，对照当前交换的读写进度，
///   给在途流裁决出“可重发 / 硬终止 / 仅告知”三种结局之一。判错的代价是
///   非幂等操作被重复执行（把写到一半的交换误判为可重发），或失败被不必要地
///   放大（把安全可重发的失败当成硬错误上抛）。
///
/// ## 执行逻辑（How）
/// - 每连接一个实例，内部以自旋互斥锁构成单一临界区：状态跃迁、进度打点与
///   裁决计算全部在锁内完成，保证严格的到达序与一致的进度快照；
/// - 裁决产生后先释放锁，再向流注入终态、向传输层请求关闭——临界区外回调是
///   防止订阅者重入导致死锁的关键顺序约束；
/// - 本端主动关闭在默认配置下优雅排空：在途写完成后才请求出站半关闭，
///   读方向继续排空直到对端关闭。
///
/// ## 契约说明（What）
/// - 见 [`CloseCoordination`] 的契约；此外：
/// - 连接收敛到终态时，恰好请求一次 [`ShutdownDirection::Both`]；
/// - 每条受影响的流恰好收到一个终态信号，既不会为零（在途操作必然随关闭收敛），
///   也不会超过一（由流契约的唯一终态闸门兜底）。
pub struct ExchangeCloseCoordinator {
    inner: Mutex<CoordinatorInner>,
    closer: Arc<dyn TransportCloser>,
    logger: Arc<dyn Logger>,
    config: CloseConfig,
    connection_id: Cow<'static, str>,
}

impl ExchangeCloseCoordinator {
    /// 以默认配置与空日志后端创建协调器。
    pub fn new(
        connection_id: impl Into<Cow<'static, str>>,
        closer: Arc<dyn TransportCloser>,
    ) -> Self {
        Self {
            inner: Mutex::new(CoordinatorInner::new()),
            closer,
            logger: Arc::new(NoopLogger),
            config: CloseConfig::default(),
            connection_id: connection_id.into(),
        }
    }

    /// 替换策略配置，Builder 风格。
    pub fn with_config(mut self, config: CloseConfig) -> Self {
        self.config = config;
        self
    }

    /// 注入日志后端，Builder 风格。
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// 当前生效的策略配置。
    pub fn config(&self) -> CloseConfig {
        self.config
    }

    fn log_event(&self, event: CloseEvent, phase: ConnectionPhase, verdict: Option<ClosureVerdict>) {
        match verdict {
            Some(verdict) => {
                let attributes = [
                    KeyValue::new(keys::FIELD_CONNECTION, self.connection_id.as_ref()),
                    KeyValue::new(keys::FIELD_EVENT, event.diagnostic_label()),
                    KeyValue::new(keys::FIELD_PHASE, phase.label()),
                    KeyValue::new(keys::FIELD_VERDICT, verdict.diagnostic_label()),
                ];
                self.logger
                    .info_with_fields("close event terminated in-flight exchange", &attributes);
            }
            None => {
                let attributes = [
                    KeyValue::new(keys::FIELD_CONNECTION, self.connection_id.as_ref()),
                    KeyValue::new(keys::FIELD_EVENT, event.diagnostic_label()),
                    KeyValue::new(keys::FIELD_PHASE, phase.label()),
                ];
                self.logger
                    .debug_with_fields("close event recorded", &attributes);
            }
        }
    }

    fn log_close_request(&self, direction: ShutdownDirection) {
        let attributes = [
            KeyValue::new(keys::FIELD_CONNECTION, self.connection_id.as_ref()),
            KeyValue::new(keys::FIELD_DIRECTION, direction.label()),
        ];
        self.logger
            .info_with_fields("requesting transport close", &attributes);
    }
}

impl CloseCoordination for ExchangeCloseCoordinator {
    fn read_started(&self) {
        let mut inner = self.inner.lock();
        if inner.progress.is_complete() {
            inner.progress.reset_for_next_exchange();
        }
        inner.progress.mark_read_started();
    }

    fn read_complete(&self) {
        self.inner.lock().progress.mark_read_complete();
    }

    fn write_started(&self) {
        let mut inner = self.inner.lock();
        if inner.progress.is_complete() {
            inner.progress.reset_for_next_exchange();
        }
        inner.progress.mark_write_started();
    }

    fn write_complete(&self) {
        let drained = {
            let mut inner = self.inner.lock();
            inner.progress.mark_write_complete();
            if inner.drain_pending {
                inner.drain_pending = false;
                inner.user_close_requested = true;
                true
            } else {
                false
            }
        };
        if drained {
            self.log_close_request(ShutdownDirection::Write);
            self.closer.request_close(ShutdownDirection::Write);
        }
    }

    fn register_read(&self, sink: Arc<dyn TerminalSignalSink>) -> bool {
        let rejected = {
            let mut inner = self.inner.lock();
            if inner.state.is_closed() {
                Some(sink)
            } else {
                inner.prune_settled();
                if inner.read_slot.is_some() {
                    return false;
                }
                inner.read_slot = Some(sink);
                None
            }
        };
        match rejected {
            Some(sink) => {
                sink.fail(AbortedClosureError::new(CloseEvent::ChannelClosedInbound).into());
                false
            }
            None => true,
        }
    }

    fn register_write(&self, sink: Arc<dyn TerminalSignalSink>) -> bool {
        let rejected = {
            let mut inner = self.inner.lock();
            if inner.state.is_closed() {
                Some(sink)
            } else {
                inner.prune_settled();
                if inner.write_slot.is_some() {
                    return false;
                }
                inner.write_slot = Some(sink);
                None
            }
        };
        match rejected {
            Some(sink) => {
                sink.fail(AbortedClosureError::new(CloseEvent::ChannelClosedOutbound).into());
                false
            }
            None => true,
        }
    }

    fn on_close_event(&self, event: CloseEvent) -> CloseObservation {
        let mut deliveries: Vec<Arc<dyn TerminalSignalSink>> = Vec::new();
        let mut close_request = None;
        let (observation, phase) = {
            let mut inner = self.inner.lock();
            if inner.state.is_closed() {
                return CloseObservation::silent();
            }

            let change = inner.state.observe(event);
            if !change.changed {
                return CloseObservation::silent();
            }

            inner.prune_settled();
            // 每个事件只取一次进度快照；同一事件波及的所有流都用这一份定性。
            let snapshot = inner.progress;
            let verdict = if inner.read_slot.is_some() || inner.write_slot.is_some() {
                let verdict = classify(&snapshot, event, self.config.idle_race_policy);
                if let Some(sink) = inner.read_slot.take() {
                    deliveries.push(sink);
                }
                if let Some(sink) = inner.write_slot.take() {
                    deliveries.push(sink);
                }
                Some(verdict)
            } else {
                None
            };

            if change.became_closed && !inner.final_close_requested {
                inner.final_close_requested = true;
                close_request = Some(ShutdownDirection::Both);
            }

            (
                CloseObservation {
                    state_changed: true,
                    verdict,
                },
                inner.state.phase(),
            )
        };

        if let Some(verdict) = observation.verdict {
            for sink in deliveries {
                sink.fail(verdict.to_error());
            }
        }
        if let Some(direction) = close_request {
            self.log_close_request(direction);
            self.closer.request_close(direction);
        }
        self.log_event(event, phase, observation.verdict);
        observation
    }

    fn user_close(&self) {
        let immediate = {
            let mut inner = self.inner.lock();
            if inner.state.is_closed() || inner.user_close_requested || inner.drain_pending {
                return;
            }
            inner.state.observe(CloseEvent::UserInitiatedClose);
            let write_in_flight =
                inner.progress.write_started() && !inner.progress.write_complete();
            if self.config.graceful_drain && write_in_flight {
                // 在途写排空之前不发出出站半关闭，避免对端看到截断的响应。
                inner.drain_pending = true;
                None
            } else if self.config.graceful_drain {
                inner.user_close_requested = true;
                Some(ShutdownDirection::Write)
            } else {
                inner.user_close_requested = true;
                Some(ShutdownDirection::Both)
            }
        };
        if let Some(direction) = immediate {
            self.log_close_request(direction);
            self.closer.request_close(direction);
        }
    }

    fn phase(&self) -> ConnectionPhase {
        self.inner.lock().state.phase()
    }

    fn progress(&self) -> ExchangeProgress {
        self.inner.lock().progress
    }
}

struct PassiveInner {
    closed: bool,
    read_slot: Option<Arc<dyn TerminalSignalSink>>,
    write_slot: Option<Arc<dyn TerminalSignalSink>>,
}

/// 无半关闭语义协议的被动协调器。
///
/// # 契约说明（What）
/// - 进度打点全部为无操作：没有半关闭语义，就没有可供分类的交换阶段；
/// - 任何关闭观察都把连接一步推入终态，对在途流一律投递 `Observed(event)`，
///   不做任何重试安全性判断；
/// - 终态后的登记以 `Observed` 风格的硬错误即拒。
pub struct PassiveCloseCoordinator {
    inner: Mutex<PassiveInner>,
    closer: Arc<dyn TransportCloser>,
}

impl PassiveCloseCoordinator {
    /// 创建被动协调器。
    pub fn new(closer: Arc<dyn TransportCloser>) -> Self {
        Self {
            inner: Mutex::new(PassiveInner {
                closed: false,
                read_slot: None,
                write_slot: None,
            }),
            closer,
        }
    }
}

impl CloseCoordination for PassiveCloseCoordinator {
    fn read_started(&self) {}

    fn read_complete(&self) {}

    fn write_started(&self) {}

    fn write_complete(&self) {}

    fn register_read(&self, sink: Arc<dyn TerminalSignalSink>) -> bool {
        let rejected = {
            let mut inner = self.inner.lock();
            if inner.closed {
                Some(sink)
            } else {
                inner.read_slot = Some(sink);
                None
            }
        };
        match rejected {
            Some(sink) => {
                sink.fail(ObservedClosureError::new(CloseEvent::ChannelClosedInbound).into());
                false
            }
            None => true,
        }
    }

    fn register_write(&self, sink: Arc<dyn TerminalSignalSink>) -> bool {
        let rejected = {
            let mut inner = self.inner.lock();
            if inner.closed {
                Some(sink)
            } else {
                inner.write_slot = Some(sink);
                None
            }
        };
        match rejected {
            Some(sink) => {
                sink.fail(ObservedClosureError::new(CloseEvent::ChannelClosedOutbound).into());
                false
            }
            None => true,
        }
    }

    fn on_close_event(&self, event: CloseEvent) -> CloseObservation {
        let mut deliveries: Vec<Arc<dyn TerminalSignalSink>> = Vec::new();
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return CloseObservation::silent();
            }
            inner.closed = true;
            if let Some(sink) = inner.read_slot.take() {
                deliveries.push(sink);
            }
            if let Some(sink) = inner.write_slot.take() {
                deliveries.push(sink);
            }
        }
        let verdict = if deliveries.is_empty() {
            None
        } else {
            let verdict = ClosureVerdict::Observed(event);
            for sink in &deliveries {
                sink.fail(verdict.to_error());
            }
            Some(verdict)
        };
        CloseObservation {
            state_changed: true,
            verdict,
        }
    }

    fn user_close(&self) {
        let deliveries = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return;
            }
            inner.closed = true;
            let mut sinks: Vec<Arc<dyn TerminalSignalSink>> = Vec::new();
            if let Some(sink) = inner.read_slot.take() {
                sinks.push(sink);
            }
            if let Some(sink) = inner.write_slot.take() {
                sinks.push(sink);
            }
            sinks
        };
        for sink in deliveries {
            sink.fail(ObservedClosureError::new(CloseEvent::UserInitiatedClose).into());
        }
        self.closer.request_close(ShutdownDirection::Both);
    }

    fn phase(&self) -> ConnectionPhase {
        if self.inner.lock().closed {
            ConnectionPhase::Closed
        } else {
            ConnectionPhase::Open
        }
    }

    fn progress(&self) -> ExchangeProgress {
        ExchangeProgress::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::stream::SubscriberTerminal;
    use crate::test_stubs::{NoopTransportCloser, RecordingCloser, RecordingSubscriber, SubscriberLog};

    fn coordinator() -> ExchangeCloseCoordinator {
        ExchangeCloseCoordinator::new("conn-test", Arc::new(NoopTransportCloser))
    }

    #[test]
    fn event_without_outstanding_stream_is_bookkeeping_only() {
        let coordinator = coordinator();
        let observation = coordinator.on_close_event(CloseEvent::ProtocolCloseInbound);
        assert!(observation.state_changed);
        assert!(observation.verdict.is_none());
        assert_eq!(coordinator.phase(), ConnectionPhase::Closing);
    }

    #[test]
    fn events_after_closed_are_silent_noops() {
        let coordinator = coordinator();
        assert!(coordinator.on_close_event(CloseEvent::AbruptClose).state_changed);
        let replay = coordinator.on_close_event(CloseEvent::AbruptClose);
        assert!(replay.is_silent());
    }

    #[test]
    fn second_live_subscriber_is_refused_without_signal() {
        let coordinator = coordinator();
        let first = SubscriberLog::<&'static str>::new();
        let second = SubscriberLog::<&'static str>::new();
        assert!(coordinator.register_read(SubscriberTerminal::subscribe(
            RecordingSubscriber::new(Arc::clone(&first))
        )));
        assert!(!coordinator.register_read(SubscriberTerminal::subscribe(
            RecordingSubscriber::new(Arc::clone(&second))
        )));
        assert_eq!(second.terminal_count(), 0);
    }

    #[test]
    fn closed_connection_requests_transport_close_exactly_once() {
        let closer = RecordingCloser::new();
        let coordinator =
            ExchangeCloseCoordinator::new("conn-test", Arc::clone(&closer) as Arc<dyn TransportCloser>);
        coordinator.on_close_event(CloseEvent::ChannelClosedInbound);
        coordinator.on_close_event(CloseEvent::ChannelClosedOutbound);
        coordinator.on_close_event(CloseEvent::AbruptClose);
        assert_eq!(closer.requests(), [ShutdownDirection::Both]);
    }

    #[test]
    fn passive_coordinator_reports_observation_only() {
        let passive = PassiveCloseCoordinator::new(Arc::new(NoopTransportCloser));
        let log = SubscriberLog::<&'static str>::new();
        assert!(passive.register_read(SubscriberTerminal::subscribe(RecordingSubscriber::new(
            Arc::clone(&log)
        ))));
        let observation = passive.on_close_event(CloseEvent::ProtocolCloseInbound);
        assert_eq!(
            observation.verdict,
            Some(ClosureVerdict::Observed(CloseEvent::ProtocolCloseInbound))
        );
        assert_eq!(log.last_error_code(), Some(codes::CLOSURE_OBSERVED));
        assert_eq!(passive.phase(), ConnectionPhase::Closed);
    }
}
