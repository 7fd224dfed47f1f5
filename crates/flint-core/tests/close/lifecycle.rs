//! 生命周期契约：幂等性、终态拒绝、优雅排空、取消与 close-notify 去重。

use std::sync::Arc;

use super::support::{harness, harness_with_config, read_stream, write_stream};
use flint_core::test_stubs::{NoopTransportCloser, SubscriberEvent};
use flint_core::{
    codes, CloseConfig, CloseCoordination, CloseEvent, CloseNotifyDetector, CloseNotifySignal,
    ClosureVerdict, ConnectionPhase, ExchangeCloseCoordinator, FlintError, IdleRacePolicy,
    ShutdownDirection,
};

/// 终态后的重复事件是静默无操作：不产生新裁决，也不再投递任何错误。
#[test]
fn replayed_terminal_event_delivers_nothing_new() {
    let harness = harness();
    let read = read_stream(&harness);

    harness.coordinator.read_started();
    let first = harness.coordinator.on_close_event(CloseEvent::AbruptClose);
    assert_eq!(
        first.verdict,
        Some(ClosureVerdict::Retryable(CloseEvent::AbruptClose))
    );
    assert_eq!(read.log.terminal_count(), 1);

    let replay = harness.coordinator.on_close_event(CloseEvent::AbruptClose);
    assert!(replay.is_silent());
    assert_eq!(read.log.terminal_count(), 1);
}

/// 终态连接上的新订阅立即被拒：读侧收到入站通道关闭，写侧对称。
#[test]
fn subscribers_after_closed_are_rejected_with_channel_closed() {
    let harness = harness();
    harness.coordinator.on_close_event(CloseEvent::AbruptClose);
    assert_eq!(harness.coordinator.phase(), ConnectionPhase::Closed);

    let read = read_stream_rejected(&harness);
    assert_eq!(
        read.log.last_error_code(),
        Some(codes::TRANSPORT_CHANNEL_CLOSED)
    );

    let write = write_stream_rejected(&harness);
    assert_eq!(
        write.log.last_error_code(),
        Some(codes::TRANSPORT_CHANNEL_CLOSED)
    );
}

fn read_stream_rejected(harness: &super::support::Harness) -> super::support::TestStream {
    let stream = unregistered_stream();
    assert!(!harness.coordinator.register_read(Arc::clone(&stream.terminal) as _));
    assert_eq!(stream.log.terminal_count(), 1);
    stream
}

fn write_stream_rejected(harness: &super::support::Harness) -> super::support::TestStream {
    let stream = unregistered_stream();
    assert!(!harness.coordinator.register_write(Arc::clone(&stream.terminal) as _));
    assert_eq!(stream.log.terminal_count(), 1);
    stream
}

fn unregistered_stream() -> super::support::TestStream {
    use flint_core::stream::SubscriberTerminal;
    use flint_core::test_stubs::{RecordingSubscriber, SubscriberLog};
    let log = SubscriberLog::new();
    let terminal = SubscriberTerminal::subscribe(RecordingSubscriber::new(Arc::clone(&log)));
    super::support::TestStream { log, terminal }
}

/// 默认配置下本端主动关闭会排空在途写：出站半关闭推迟到写完成之后。
#[test]
fn user_close_defers_outbound_shutdown_until_write_drains() {
    let harness = harness();
    let _write = write_stream(&harness);

    harness.coordinator.read_started();
    harness.coordinator.read_complete();
    harness.coordinator.write_started();

    harness.coordinator.user_close();
    assert!(
        harness.closer.requests().is_empty(),
        "在途写尚未排空，不得发出关闭请求"
    );

    harness.coordinator.write_complete();
    assert_eq!(harness.closer.requests(), [ShutdownDirection::Write]);

    // 对端随后关闭两个半边，连接收敛到终态并请求整体关闭。
    harness
        .coordinator
        .on_close_event(CloseEvent::ChannelClosedInbound);
    harness
        .coordinator
        .on_close_event(CloseEvent::ChannelClosedOutbound);
    assert_eq!(
        harness.closer.requests(),
        [ShutdownDirection::Write, ShutdownDirection::Both]
    );
}

/// 没有在途写时，本端主动关闭立即发出出站半关闭，读方向继续排空。
#[test]
fn user_close_with_idle_write_requests_half_close_immediately() {
    let harness = harness();
    harness.coordinator.user_close();
    assert_eq!(harness.closer.requests(), [ShutdownDirection::Write]);
    assert_eq!(harness.coordinator.phase(), ConnectionPhase::Closing);
}

/// 关闭优雅排空后，本端主动关闭立即请求整体关闭。
#[test]
fn user_close_without_drain_requests_full_close() {
    let harness = harness_with_config(CloseConfig {
        graceful_drain: false,
        idle_race_policy: IdleRacePolicy::ObserveRaw,
    });
    let _write = write_stream(&harness);
    harness.coordinator.write_started();

    harness.coordinator.user_close();
    assert_eq!(harness.closer.requests(), [ShutdownDirection::Both]);
}

/// 已取消的流被移出在途集合：其后的关闭事件不会再尝试投递。
#[test]
fn cancelled_stream_receives_no_delivery() {
    let harness = harness();
    let read = read_stream(&harness);
    harness.coordinator.read_started();

    assert!(read.terminal.handle().cancel());

    let observation = harness
        .coordinator
        .on_close_event(CloseEvent::ProtocolCloseInbound);
    assert!(observation.verdict.is_none(), "取消后没有在途流可供裁决");
    assert_eq!(read.log.terminal_count(), 0);
}

/// 同方向的重复 close-notify 只转发一次；跨方向互不影响。
#[test]
fn close_notify_detector_deduplicates_per_direction() {
    let coordinator = Arc::new(ExchangeCloseCoordinator::new(
        "conn-1",
        Arc::new(NoopTransportCloser),
    ));
    let detector = CloseNotifyDetector::new(Arc::clone(&coordinator) as _);

    assert!(detector
        .on_close_notify(CloseNotifySignal::Inbound)
        .state_changed);
    assert!(detector
        .on_close_notify(CloseNotifySignal::Inbound)
        .is_silent());
    assert!(detector
        .on_close_notify(CloseNotifySignal::Outbound)
        .state_changed);
}

/// 上层调用方典型的错误包装：只有携带重试安全标记的关闭错误才放行重发。
#[derive(Debug, thiserror::Error)]
enum CallerError {
    #[error("exchange failed: {0}")]
    Closure(#[from] FlintError),
}

#[test]
fn caller_retry_gate_only_accepts_retryable_kind() {
    let harness = harness();
    let write = write_stream(&harness);
    harness.coordinator.read_started();
    harness.coordinator.read_complete();
    harness
        .coordinator
        .on_close_event(CloseEvent::ProtocolCloseInbound);

    let error = match write.log.take().pop() {
        Some(SubscriberEvent::Error(error)) => error,
        other => panic!("写流必须以错误终结，实际为 {other:?}"),
    };
    let wrapped = CallerError::from(error);
    let CallerError::Closure(inner) = &wrapped;
    assert!(inner.is_retry_safe(), "写未开始的关闭必须放行重发");
}

/// 空闲竞速的折叠口径：无活跃交换视同“写未开始”，裁决回落为可重发。
#[test]
fn fold_policy_turns_idle_race_into_retryable() {
    let harness = harness_with_config(CloseConfig {
        idle_race_policy: IdleRacePolicy::FoldIntoRetrySafety,
        graceful_drain: true,
    });
    let write = write_stream(&harness);
    harness.coordinator.write_started();
    harness.coordinator.write_complete();

    let observation = harness
        .coordinator
        .on_close_event(CloseEvent::ProtocolCloseInbound);
    assert_eq!(
        observation.verdict,
        Some(ClosureVerdict::Retryable(CloseEvent::ProtocolCloseInbound))
    );
    assert_eq!(write.log.last_error_code(), Some(codes::CLOSURE_RETRYABLE));
}
