//! 推送式流契约：订阅者、取消句柄与“唯一终态信号”闸门。
//!
//! # 教案级说明
//! - **Why**：关闭协调器需要一个最小的流抽象来表达其全部职责——作为特权生产者向
//!   仍然存活的读/写流注入唯一的终态错误，并尊重订阅者的取消。完整的响应式算子
//!   代数不在本 crate 范围内，这里只固化“订阅确认 → 零或多个数据项 → 恰好一个
//!   终态信号”的骨架契约。
//! - **What**：[`StreamSubscriber`] 是消费侧回调契约；[`SubscriptionHandle`] 允许
//!   订阅者单方面取消；[`SubscriberTerminal`] 把两者拼成生产侧句柄，并用原子闸门
//!   保证终态信号至多投递一次、取消后一切信号被抑制。
//! - **How**：取消与终态各用一个原子布尔表达，CAS 竞争的胜者获得投递权；
//!   闸门判定不依赖任何外部锁，因此可以在协调器临界区之外安全调用。

use alloc::sync::Arc;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::FlintError;

/// 订阅的共享旗标：取消与终态。
///
/// # 契约说明（What）
/// - `cancel` 与 `try_terminate` 均为一次性转换，重复调用返回 `false`；
/// - 已取消的订阅永远无法再获得终态投递权，反向亦然——两个旗标互斥地
///   决定“谁终结了这条流”。
#[derive(Debug, Default)]
pub struct SubscriptionState {
    cancelled: AtomicBool,
    terminated: AtomicBool,
}

impl SubscriptionState {
    /// 新建活跃订阅旗标。
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记取消；仅首次调用返回 `true`。
    pub fn cancel(&self) -> bool {
        if self.terminated.load(Ordering::Acquire) {
            return false;
        }
        self.cancelled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 订阅是否已被取消。
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// 争夺终态投递权；取消后或已有终态时返回 `false`。
    pub fn try_terminate(&self) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return false;
        }
        self.terminated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 流是否不再需要任何投递（已终态或已取消）。
    pub fn is_settled(&self) -> bool {
        self.terminated.load(Ordering::Acquire) || self.cancelled.load(Ordering::Acquire)
    }
}

/// 订阅确认时交给订阅者的取消句柄。
#[derive(Clone, Debug)]
pub struct SubscriptionHandle {
    state: Arc<SubscriptionState>,
}

impl SubscriptionHandle {
    /// 取消订阅，抑制此后的一切信号；仅首次生效。
    pub fn cancel(&self) -> bool {
        self.state.cancel()
    }

    /// 订阅是否已被取消。
    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }
}

/// 流消费侧的回调契约。
///
/// # 契约说明（What）
/// - 信号顺序：至多一次 `on_subscribe`（携带取消句柄），随后零或多个 `on_next`，
///   最后恰好一个终态（`on_complete` 或 `on_error`）；
/// - 取消后订阅者不得再收到任何信号；
/// - 回调必须非阻塞：投递线程可能同时服务多条连接。
pub trait StreamSubscriber<T>: Send + Sync + 'static {
    /// 订阅确认，携带取消句柄。
    fn on_subscribe(&self, handle: SubscriptionHandle);

    /// 投递一个数据项。
    fn on_next(&self, item: T);

    /// 正常终态。
    fn on_complete(&self);

    /// 错误终态。
    fn on_error(&self, error: FlintError);
}

/// 终态信号注入点：关闭协调器作为特权生产者持有的对象安全句柄。
///
/// # 设计背景（Why）
/// - 协调器不关心流的数据项类型，只需要“向这条流注入唯一终态”的能力；
///   抹去泛型后读流与写流可以放进同一个槽位结构统一管理。
///
/// # 契约说明（What）
/// - `complete`/`fail` 受唯一终态闸门约束：竞争的胜者投递，败者静默；
/// - `is_settled` 为真的流不再需要投递，协调器据此把它移出在途集合。
pub trait TerminalSignalSink: Send + Sync + 'static {
    /// 注入正常终态。
    fn complete(&self);

    /// 注入错误终态。
    fn fail(&self, error: FlintError);

    /// 流是否已不再需要投递。
    fn is_settled(&self) -> bool;
}

/// 把订阅者与订阅旗标拼接为生产侧句柄。
///
/// # 契约说明（What）
/// - [`subscribe`](Self::subscribe) 完成订阅确认并返回可共享的句柄；
/// - `emit` 是数据项路径：已取消或已终态时静默丢弃并返回 `false`；
/// - 作为 [`TerminalSignalSink`]，终态路径由闸门裁决，保证至多一次。
pub struct SubscriberTerminal<T, S: StreamSubscriber<T>> {
    subscriber: S,
    state: Arc<SubscriptionState>,
    _marker: PhantomData<fn(T)>,
}

impl<T: 'static, S: StreamSubscriber<T>> SubscriberTerminal<T, S> {
    /// 执行订阅握手：向订阅者发出 `on_subscribe` 并返回生产侧句柄。
    pub fn subscribe(subscriber: S) -> Arc<Self> {
        let state = Arc::new(SubscriptionState::new());
        subscriber.on_subscribe(SubscriptionHandle {
            state: Arc::clone(&state),
        });
        Arc::new(Self {
            subscriber,
            state,
            _marker: PhantomData,
        })
    }

    /// 订阅者侧的取消句柄。
    pub fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// 投递一个数据项；已取消或已终态时静默丢弃。
    pub fn emit(&self, item: T) -> bool {
        if self.state.is_settled() {
            return false;
        }
        self.subscriber.on_next(item);
        true
    }
}

impl<T: 'static, S: StreamSubscriber<T>> TerminalSignalSink for SubscriberTerminal<T, S> {
    fn complete(&self) {
        if self.state.try_terminate() {
            self.subscriber.on_complete();
        }
    }

    fn fail(&self, error: FlintError) {
        if self.state.try_terminate() {
            self.subscriber.on_error(error);
        }
    }

    fn is_settled(&self) -> bool {
        self.state.is_settled()
    }
}
