//! 连接关闭协调：事件词汇、交换进度、状态机、分类策略与协调器。
//!
//! # 教案级导览
//! - **Why**：一问一答式双工连接开始关闭时，最难的工程问题是回答“发生了什么、
//!   在途的读写该如何收场”。答案偏向激进会把写到一半的交换误判为可重发，
//!   造成非幂等操作重复执行；偏向保守则把安全可重发的失败当作硬错误放大。
//! - **What**：本模块自底向上给出四层构件——[`CloseEvent`] 事实词汇表、
//!   [`ExchangeProgress`] 交换进度、[`ConnectionState`] 状态机与
//!   [`classify`] 分类策略，最终由 [`ExchangeCloseCoordinator`] 把它们
//!   串在同一临界区内，对外实现 [`CloseCoordination`] 契约。
//! - **How**：事件按到达顺序串行消化；裁决基于事件到达时刻的一份进度快照；
//!   终态信号与关闭请求一律在临界区外发起。

pub mod coordinator;
pub mod event;
pub mod policy;
pub mod progress;
pub mod state;
pub mod tls;

pub use coordinator::{
    CloseCoordination, CloseObservation, ExchangeCloseCoordinator, PassiveCloseCoordinator,
};
pub use event::CloseEvent;
pub use policy::{classify, ClosureVerdict, IdleRacePolicy};
pub use progress::ExchangeProgress;
pub use state::{ConnectionPhase, ConnectionState, StateChange};
pub use tls::CloseNotifyDetector;
