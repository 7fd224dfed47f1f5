//! 静默窗口契约：等待“某段时长内没有任何信号”。
//!
//! # 测试目标（Why）
//! - 关闭协调自身永不阻塞等待时间；“窗口内无信号”是测试工装的表达方式：
//!   起一个定时器，若先于任何事件到期，则它本身只是无操作；
//! - 在 [`MockClock`] 控制下，窗口推进与事件投递的相对顺序完全确定，
//!   CI 中 100% 可复现。
//!
//! # 执行步骤（How）
//! 1. 装配协调器并登记一条读流；
//! 2. 以虚拟时钟开启一个静默窗口，分两次推进到期，期间断言没有任何信号；
//! 3. 窗口到期后投递关闭事件，断言流这才收到唯一的终态。

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::task::noop_waker;

use flint_core::stream::SubscriberTerminal;
use flint_core::test_stubs::{NoopTransportCloser, RecordingSubscriber, SubscriberLog};
use flint_core::time::{Clock, MockClock};
use flint_core::{CloseCoordination, CloseEvent, ExchangeCloseCoordinator};

#[test]
fn quiet_window_elapses_as_noop_before_any_event() {
    let clock = MockClock::new();
    let coordinator = Arc::new(ExchangeCloseCoordinator::new(
        "conn-quiet",
        Arc::new(NoopTransportCloser),
    ));
    let log = SubscriberLog::<&'static str>::new();
    assert!(coordinator.register_read(SubscriberTerminal::subscribe(RecordingSubscriber::new(
        Arc::clone(&log)
    ))));
    coordinator.read_started();

    let mut window = clock.sleep(Duration::from_millis(200));
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);

    assert!(matches!(window.as_mut().poll(&mut cx), Poll::Pending));
    clock.advance(Duration::from_millis(120));
    assert!(matches!(window.as_mut().poll(&mut cx), Poll::Pending));
    assert_eq!(log.terminal_count(), 0, "静默窗口内不得出现任何信号");

    clock.advance(Duration::from_millis(80));
    assert!(matches!(window.as_mut().poll(&mut cx), Poll::Ready(())));
    assert_eq!(
        log.terminal_count(),
        0,
        "窗口先于事件到期时，它本身只是无操作"
    );

    coordinator.on_close_event(CloseEvent::ProtocolCloseInbound);
    assert_eq!(log.terminal_count(), 1);
}

#[test]
fn two_windows_wake_in_registration_order() {
    let clock = MockClock::new();
    let mut early = clock.sleep(Duration::from_millis(50));
    let mut late = clock.sleep(Duration::from_millis(90));
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);

    assert!(early.as_mut().poll(&mut cx).is_pending());
    assert!(late.as_mut().poll(&mut cx).is_pending());

    clock.advance(Duration::from_millis(60));
    assert!(early.as_mut().poll(&mut cx).is_ready());
    assert!(late.as_mut().poll(&mut cx).is_pending());

    clock.advance(Duration::from_millis(40));
    assert!(late.as_mut().poll(&mut cx).is_ready());
    assert_eq!(clock.elapsed(), Duration::from_millis(100));
}
