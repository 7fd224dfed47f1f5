//! 测试桩命名空间：集中暴露框架官方维护的 `Noop`/`Recording` 实现，供单元测试、
//! 集成测试与示例复用。
//!
//! # 设计背景（Why）
//! - 统一维护常见桩对象，避免在各处重复定义记录器结构体；
//! - 当核心契约演进时，通过单点更新保证所有测试同步适配。
//!
//! # 使用方式（How）
//! - 通过 `use flint_core::test_stubs::*;` 引入需要的桩类型；
//! - 所有桩对象在 `no_std + alloc` 环境同样可用，便于运行最小化集成测试。

use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::error::FlintError;
use crate::stream::{StreamSubscriber, SubscriptionHandle};
use crate::transport::{ShutdownDirection, TransportCloser};

/// 订阅者观察到的单个信号。
#[derive(Debug)]
pub enum SubscriberEvent<T> {
    /// 订阅确认。
    Subscribed,
    /// 数据项。
    Item(T),
    /// 正常终态。
    Complete,
    /// 错误终态。
    Error(FlintError),
}

/// 订阅信号的共享记录缓冲，供断言使用。
#[derive(Debug)]
pub struct SubscriberLog<T> {
    events: Mutex<Vec<SubscriberEvent<T>>>,
}

impl<T> SubscriberLog<T> {
    /// 新建空记录缓冲。
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    fn push(&self, event: SubscriberEvent<T>) {
        self.events.lock().push(event);
    }

    /// 取走全部已记录信号。
    pub fn take(&self) -> Vec<SubscriberEvent<T>> {
        core::mem::take(&mut *self.events.lock())
    }

    /// 已观察到的终态信号数量（不清空缓冲）。
    pub fn terminal_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, SubscriberEvent::Complete | SubscriberEvent::Error(_)))
            .count()
    }

    /// 已观察到的数据项数量（不清空缓冲）。
    pub fn item_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, SubscriberEvent::Item(_)))
            .count()
    }

    /// 最近一次错误终态的稳定错误码。
    pub fn last_error_code(&self) -> Option<&'static str> {
        self.events.lock().iter().rev().find_map(|event| match event {
            SubscriberEvent::Error(error) => Some(error.code()),
            _ => None,
        })
    }
}

/// 把所有信号写入 [`SubscriberLog`] 的记录订阅者。
#[derive(Debug)]
pub struct RecordingSubscriber<T> {
    log: Arc<SubscriberLog<T>>,
}

impl<T> RecordingSubscriber<T> {
    /// 绑定记录缓冲。
    pub fn new(log: Arc<SubscriberLog<T>>) -> Self {
        Self { log }
    }
}

impl<T: Send + 'static> StreamSubscriber<T> for RecordingSubscriber<T> {
    fn on_subscribe(&self, _handle: SubscriptionHandle) {
        self.log.push(SubscriberEvent::Subscribed);
    }

    fn on_next(&self, item: T) {
        self.log.push(SubscriberEvent::Item(item));
    }

    fn on_complete(&self) {
        self.log.push(SubscriberEvent::Complete);
    }

    fn on_error(&self, error: FlintError) {
        self.log.push(SubscriberEvent::Error(error));
    }
}

/// 记录关闭请求方向序列的传输关闭桩。
#[derive(Debug, Default)]
pub struct RecordingCloser {
    requests: Mutex<Vec<ShutdownDirection>>,
}

impl RecordingCloser {
    /// 新建空记录桩。
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 已记录的关闭请求序列副本。
    pub fn requests(&self) -> Vec<ShutdownDirection> {
        self.requests.lock().clone()
    }
}

impl TransportCloser for RecordingCloser {
    fn request_close(&self, direction: ShutdownDirection) {
        self.requests.lock().push(direction);
    }
}

/// 丢弃一切关闭请求的空实现。
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTransportCloser;

impl TransportCloser for NoopTransportCloser {
    fn request_close(&self, _direction: ShutdownDirection) {}
}
