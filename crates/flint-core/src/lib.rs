#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "flint-core: 双工连接关闭协调的核心契约与实现。"]
#![doc = ""]
#![doc = "== 问题域 =="]
#![doc = "一问一答式双工连接开始关闭（本端、对端或异常）时，必须回答：在途的读写操作该以何种结局收场？"]
#![doc = "判错的代价是非幂等操作被重复执行（把写到一半的交换误判为可重发），或失败被不必要地放大（把安全可重发的失败当作硬错误上抛）。"]
#![doc = ""]
#![doc = "== 构件总览 =="]
#![doc = "- [`close`]：关闭事件词汇表、交换进度、状态机、分类策略与协调器；"]
#![doc = "- [`stream`]：推送式流契约（订阅/取消/唯一终态闸门）；"]
#![doc = "- [`error`]：稳定错误码与三种关闭失败类别；"]
#![doc = "- [`transport`]：传输层契约（`flint-transport`）的桥接层；"]
#![doc = "- [`time`]（`std`）：可注入时钟与确定性虚拟时间。"]
#![doc = ""]
#![doc = "== 内存分配依赖 =="]
#![doc = "`flint-core` 定位于 `no_std + alloc` 场景：协调器槽位、终态投递列表等依赖 [`alloc`] 中的 `Arc`、`Vec`。纯 `no_std`（无分配器）环境暂不支持。"]

extern crate alloc;

pub mod close;
pub mod configuration;
pub mod error;
pub mod observability;
pub mod stream;
pub mod test_stubs;
#[cfg(feature = "std")]
pub mod time;
pub mod transport;

pub use close::{
    classify, CloseCoordination, CloseEvent, CloseNotifyDetector, CloseObservation,
    ClosureVerdict, ConnectionPhase, ConnectionState, ExchangeCloseCoordinator, ExchangeProgress,
    IdleRacePolicy, PassiveCloseCoordinator, StateChange,
};
pub use configuration::CloseConfig;
pub use error::{
    codes, AbortedClosureError, Error, FlintError, ObservedClosureError, RetryableClosureError,
};
pub use observability::{
    AttributeSet, AttributeValue, KeyValue, LogRecord, LogSeverity, Logger, NoopLogger,
};
pub use stream::{
    StreamSubscriber, SubscriberTerminal, SubscriptionHandle, SubscriptionState,
    TerminalSignalSink,
};
pub use transport::{CloseNotifySignal, ShutdownDirection, TransportCloser};
