//! 分类策略的五个典型场景：同一份进度快照在不同交换阶段得出不同结局。

use super::support::{harness, read_stream, write_stream, BEGIN};
use flint_core::test_stubs::SubscriberEvent;
use flint_core::{codes, CloseCoordination, CloseEvent, ClosureVerdict, TerminalSignalSink};

/// 请求已完整收到、响应尚未动笔：对端优雅关闭 → 可安全重发。
#[test]
fn request_received_response_untouched_is_retryable() {
    let harness = harness();
    let write = write_stream(&harness);

    harness.coordinator.read_started();
    harness.coordinator.read_complete();

    let observation = harness
        .coordinator
        .on_close_event(CloseEvent::ProtocolCloseInbound);
    assert_eq!(
        observation.verdict,
        Some(ClosureVerdict::Retryable(CloseEvent::ProtocolCloseInbound))
    );
    assert_eq!(write.log.terminal_count(), 1);
    assert_eq!(write.log.last_error_code(), Some(codes::CLOSURE_RETRYABLE));
}

/// 响应已写出首个数据块但未写完：对端优雅关闭 → 硬终止，通道已关闭风格错误。
#[test]
fn partially_written_response_is_aborted() {
    let harness = harness();
    let write = write_stream(&harness);

    harness.coordinator.read_started();
    harness.coordinator.read_complete();
    harness.coordinator.write_started();
    assert!(write.terminal.emit(BEGIN));

    let observation = harness
        .coordinator
        .on_close_event(CloseEvent::ProtocolCloseInbound);
    assert_eq!(
        observation.verdict,
        Some(ClosureVerdict::Aborted(CloseEvent::ProtocolCloseInbound))
    );
    assert_eq!(write.log.terminal_count(), 1);
    assert_eq!(
        write.log.last_error_code(),
        Some(codes::TRANSPORT_CHANNEL_CLOSED)
    );
}

/// 交换已完整结束、连接空闲：新写与 close-notify 竞速 → 仅告知通道后果。
#[test]
fn fresh_write_racing_close_on_idle_connection_is_observed() {
    let harness = harness();

    // 第一轮交换完整走完，流自然终结。
    let first_write = write_stream(&harness);
    harness.coordinator.read_started();
    harness.coordinator.read_complete();
    harness.coordinator.write_started();
    harness.coordinator.write_complete();
    first_write.terminal.complete();

    // 空闲连接上的新写完成了数据发射，但其完成信号尚未送达订阅者。
    let second_write = write_stream(&harness);
    harness.coordinator.write_started();
    harness.coordinator.write_complete();

    let observation = harness
        .coordinator
        .on_close_event(CloseEvent::ProtocolCloseInbound);
    assert_eq!(
        observation.verdict,
        Some(ClosureVerdict::Observed(CloseEvent::ChannelClosedInbound))
    );
    assert_eq!(second_write.log.terminal_count(), 1);
    assert_eq!(
        second_write.log.last_error_code(),
        Some(codes::CLOSURE_OBSERVED)
    );
}

/// 请求读到一半、响应从未开始：已缓冲的数据块先送达，再以可重发错误终结。
#[test]
fn in_flight_read_delivers_buffered_item_then_retryable() {
    let harness = harness();
    let read = read_stream(&harness);

    harness.coordinator.read_started();
    assert!(read.terminal.emit(BEGIN));

    let observation = harness
        .coordinator
        .on_close_event(CloseEvent::ProtocolCloseInbound);
    assert_eq!(
        observation.verdict,
        Some(ClosureVerdict::Retryable(CloseEvent::ProtocolCloseInbound))
    );

    let events = read.log.take();
    assert!(matches!(events[0], SubscriberEvent::Subscribed));
    assert!(matches!(events[1], SubscriberEvent::Item(BEGIN)));
    match &events[2] {
        SubscriberEvent::Error(error) => assert_eq!(error.code(), codes::CLOSURE_RETRYABLE),
        other => panic!("读流必须以错误终结，实际为 {other:?}"),
    }
    assert_eq!(events.len(), 3);
}

/// 读写同时在途、写已发出数据块：两条流都以硬终止收场。
#[test]
fn concurrent_read_and_partial_write_abort_both_streams() {
    let harness = harness();
    let read = read_stream(&harness);
    let write = write_stream(&harness);

    harness.coordinator.read_started();
    harness.coordinator.write_started();
    assert!(write.terminal.emit(BEGIN));

    let observation = harness
        .coordinator
        .on_close_event(CloseEvent::ProtocolCloseInbound);
    assert_eq!(
        observation.verdict,
        Some(ClosureVerdict::Aborted(CloseEvent::ProtocolCloseInbound))
    );
    assert_eq!(read.log.terminal_count(), 1);
    assert_eq!(write.log.terminal_count(), 1);
    assert_eq!(
        read.log.last_error_code(),
        Some(codes::TRANSPORT_CHANNEL_CLOSED)
    );
    assert_eq!(
        write.log.last_error_code(),
        Some(codes::TRANSPORT_CHANNEL_CLOSED)
    );
}
