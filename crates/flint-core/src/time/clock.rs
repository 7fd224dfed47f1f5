// 本模块仅在启用 `std` Feature 后编译：默认实现依赖 `std::time::Instant`、
// 线程调度与 `Waker` 机制，`no_std + alloc` 环境无法提供这些原语。
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};
use std::thread;
use std::time::{Duration, Instant};

use alloc::boxed::Box;
use alloc::vec::Vec;

/// `Sleep` 为时钟接口返回的统一延迟 Future 类型。
///
/// # 契约说明（What）
/// - Future 完成时表示指定的持续时间已经过去；
/// - 必须 `Send + 'static` 以适配多线程调度；
/// - 返回 `Poll::Pending` 后，状态变化时实现须唤醒登记的 waker。
pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// 可注入的时钟抽象：统一“取当前时间”与“等待一段时间”。
///
/// # 设计背景（Why）
/// - 静默窗口断言依赖可靠的时间来源；直接调用系统时钟会让测试不可复现；
/// - 以 trait 注入后，生产环境用真实时间，测试用可控的虚拟时间。
///
/// # 接口约束（What）
/// - `now` 单调递增；
/// - `sleep` 返回的 Future 完成前至少等待所给持续时间。
pub trait Clock: Send + Sync + 'static {
    /// 返回当前的单调时间点。
    fn now(&self) -> Instant;

    /// 返回一个在指定持续时间后完成的睡眠 Future。
    fn sleep(&self, duration: Duration) -> Sleep;
}

/// 基于标准库线程实现的系统时钟。
///
/// # 契约说明（What）
/// - `now` 直接返回 [`Instant::now`]；
/// - `sleep` 启动后台线程执行阻塞睡眠，醒来后唤醒 Future；
/// - 适合调用频率较低的控制面逻辑；高频场景应注入自定义 [`Clock`]。
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> Sleep {
        Box::pin(ThreadSleep::spawn(duration))
    }
}

/// 线程驱动的睡眠 Future：构造时启动后台线程阻塞睡眠，醒来置完成位并唤醒 waker。
struct ThreadSleep {
    shared: Arc<SleepShared>,
}

impl ThreadSleep {
    fn spawn(duration: Duration) -> Self {
        let shared = Arc::new(SleepShared::new());
        let worker = Arc::clone(&shared);
        thread::spawn(move || {
            thread::sleep(duration);
            worker.finish();
        });
        Self { shared }
    }
}

impl Future for ThreadSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.shared.is_finished() {
            return Poll::Ready(());
        }
        self.shared.register_waker(cx.waker());
        // 注册后复查，封堵“完成发生在注册之前”的窗口。
        if self.shared.is_finished() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

struct SleepShared {
    finished: AtomicBool,
    waker: Mutex<Option<Waker>>,
}

impl SleepShared {
    fn new() -> Self {
        Self {
            finished: AtomicBool::new(false),
            waker: Mutex::new(None),
        }
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    fn register_waker(&self, waker: &Waker) {
        let mut slot = self.waker.lock().expect("sleep waker lock poisoned");
        *slot = Some(waker.clone());
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::Release);
        let waker = self
            .waker
            .lock()
            .expect("sleep waker lock poisoned")
            .take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// 虚拟时钟：手动推进时间，在测试中复现确定性的唤醒序列。
///
/// # 行为概览（How）
/// - 内部维护自构造起的偏移量与待触发的睡眠列表；
/// - [`advance`](Self::advance) 增加偏移量并按登记顺序唤醒到期的睡眠 Future；
/// - [`sleep`](Clock::sleep) 创建绑定虚拟时钟的 Future，遵循标准 `Poll` 契约。
///
/// # 契约说明（What）
/// - 偏移量单调增加；
/// - 未到期的睡眠 Future 必须保持 `Pending`；被提前丢弃的 Future 会从调度
///   队列中移除，不会留下悬空 waker。
#[derive(Clone, Debug)]
pub struct MockClock {
    inner: Arc<MockClockInner>,
}

impl MockClock {
    /// 以当前系统时间为基准创建虚拟时钟。
    pub fn new() -> Self {
        Self::with_origin(Instant::now())
    }

    /// 以指定基准时间创建虚拟时钟，便于固定初始偏移。
    pub fn with_origin(origin: Instant) -> Self {
        Self {
            inner: Arc::new(MockClockInner {
                state: Mutex::new(MockClockState {
                    origin,
                    elapsed: Duration::ZERO,
                    sleepers: Vec::new(),
                }),
            }),
        }
    }

    /// 手动推进虚拟时间，并唤醒所有到期的睡眠 Future。
    ///
    /// # 契约说明（What）
    /// - 返回后所有截止点不晚于新偏移量的睡眠均已唤醒；
    /// - 唤醒顺序与睡眠登记顺序一致，保证测试序列可复现。
    pub fn advance(&self, delta: Duration) {
        if delta.is_zero() {
            return;
        }
        let mut ready = Vec::new();
        {
            let mut state = self.inner.lock_state();
            state.elapsed = state.elapsed.saturating_add(delta);
            let elapsed = state.elapsed;
            state.sleepers.retain(|entry| {
                if entry.cancelled.load(Ordering::Acquire) {
                    return false;
                }
                if elapsed >= entry.deadline {
                    entry.finished.store(true, Ordering::Release);
                    if let Some(waker) = entry.take_waker() {
                        ready.push(waker);
                    }
                    false
                } else {
                    true
                }
            });
        }
        for waker in ready {
            waker.wake();
        }
    }

    /// 自基准起累积的虚拟时间偏移。
    pub fn elapsed(&self) -> Duration {
        self.inner.lock_state().elapsed
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let state = self.inner.lock_state();
        state.origin + state.elapsed
    }

    fn sleep(&self, duration: Duration) -> Sleep {
        let entry = {
            let mut state = self.inner.lock_state();
            let deadline = state.elapsed.saturating_add(duration);
            let entry = Arc::new(MockSleepEntry::new(deadline));
            state.sleepers.push(Arc::clone(&entry));
            entry
        };
        Box::pin(MockSleep { entry })
    }
}

#[derive(Debug)]
struct MockClockInner {
    state: Mutex<MockClockState>,
}

impl MockClockInner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, MockClockState> {
        self.state.lock().expect("mock clock state lock poisoned")
    }
}

#[derive(Debug)]
struct MockClockState {
    origin: Instant,
    elapsed: Duration,
    sleepers: Vec<Arc<MockSleepEntry>>,
}

#[derive(Debug)]
struct MockSleepEntry {
    deadline: Duration,
    finished: AtomicBool,
    cancelled: AtomicBool,
    waker: Mutex<Option<Waker>>,
}

impl MockSleepEntry {
    fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            finished: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            waker: Mutex::new(None),
        }
    }

    fn take_waker(&self) -> Option<Waker> {
        self.waker.lock().expect("mock sleep waker lock poisoned").take()
    }
}

struct MockSleep {
    entry: Arc<MockSleepEntry>,
}

impl Future for MockSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.entry.finished.load(Ordering::Acquire) {
            return Poll::Ready(());
        }
        {
            let mut slot = self
                .entry
                .waker
                .lock()
                .expect("mock sleep waker lock poisoned");
            *slot = Some(cx.waker().clone());
        }
        if self.entry.finished.load(Ordering::Acquire) {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl Drop for MockSleep {
    fn drop(&mut self) {
        self.entry.cancelled.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::task::noop_waker;

    #[test]
    fn mock_sleep_completes_only_after_deadline() {
        let clock = MockClock::new();
        let mut sleep = clock.sleep(Duration::from_millis(100));
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        assert!(sleep.as_mut().poll(&mut cx).is_pending());
        clock.advance(Duration::from_millis(60));
        assert!(sleep.as_mut().poll(&mut cx).is_pending());
        clock.advance(Duration::from_millis(40));
        assert!(sleep.as_mut().poll(&mut cx).is_ready());
    }

    #[test]
    fn dropped_sleep_is_removed_from_schedule() {
        let clock = MockClock::new();
        let sleep = clock.sleep(Duration::from_millis(10));
        drop(sleep);
        // 推进不应尝试唤醒已释放的 Future。
        clock.advance(Duration::from_millis(20));
        assert_eq!(clock.elapsed(), Duration::from_millis(20));
    }
}
