use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use super::coordinator::{CloseCoordination, CloseObservation};
use super::event::CloseEvent;
use crate::transport::CloseNotifySignal;

/// TLS close-notify 观测适配器：把告警层事实翻译为关闭事件词汇。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - TLS 实现通常在告警处理回调里多次暴露同一个 close-notify 事实（告警解析、
///   读管道终止、会话拆除各报一次）；协调器的状态机虽然对重复事实幂等，
///   但在源头去重可以避免无意义的临界区往返，也让日志不被重复观测刷屏；
/// - 适配器只做翻译与去重，从不解析 TLS 记录层——那是传输实现的职责。
///
/// ## 契约说明（What）
/// - `Inbound` 信号首次到达 → 向协调器投递
///   [`CloseEvent::ProtocolCloseInbound`]；`Outbound` 对称；
/// - 每个方向至多转发一次，后续重复信号返回静默观察；
/// - 可从任意线程并发调用：方向内以原子位竞争，败者静默。
pub struct CloseNotifyDetector {
    coordinator: Arc<dyn CloseCoordination>,
    inbound_seen: AtomicBool,
    outbound_seen: AtomicBool,
}

impl CloseNotifyDetector {
    /// 绑定协调器。
    pub fn new(coordinator: Arc<dyn CloseCoordination>) -> Self {
        Self {
            coordinator,
            inbound_seen: AtomicBool::new(false),
            outbound_seen: AtomicBool::new(false),
        }
    }

    /// 消化一个 close-notify 观测信号。
    pub fn on_close_notify(&self, signal: CloseNotifySignal) -> CloseObservation {
        let (flag, event) = match signal {
            CloseNotifySignal::Inbound => (&self.inbound_seen, CloseEvent::ProtocolCloseInbound),
            CloseNotifySignal::Outbound => (&self.outbound_seen, CloseEvent::ProtocolCloseOutbound),
        };
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return CloseObservation::silent();
        }
        self.coordinator.on_close_event(event)
    }
}
