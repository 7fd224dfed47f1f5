//! 传输层契约在核心 crate 内的兼容桥接层。
//!
//! # 教案级说明
//! - **Why**：维持统一路径 `flint_core::transport::ShutdownDirection`，同时让真正的
//!   定义归属独立的接口 crate，便于多种传输实现共享；
//! - **How**：直接 re-export [`flint_transport`] 的半关闭方向、关闭执行回调与
//!   TLS close-notify 信号；调用方无需关心类型的宿主 crate；
//! - **What**：不承载任何实现细节，仅作别名桥接。

pub use flint_transport::{CloseNotifySignal, ShutdownDirection, TransportCloser};
