#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "flint-transport: 传输层契约接口统一抽象层。"]
#![doc = ""]
#![doc = "== 使命概述 =="]
#![doc = "- **Why**：为 Flint 运行时的 TCP/TLS 等双工字节流实现提供共同语言，确保热插拔替换时无需重编译调用方。"]
#![doc = "- **What**：定义半关闭方向、双工连接、关闭执行回调与 TLS close-notify 信号等核心契约。"]
#![doc = "- **How**：面向 `no_std + alloc` 环境设计，所有实现仅需依赖本 crate 即可遵循统一契约。"]

extern crate alloc;

/// `Result` 是传输层契约内部使用的统一返回别名，避免直接依赖 `flint-core` 造成循环引用。
///
/// # 设计背景（Why）
/// - `flint-core` 依赖本 crate 暴露的接口，若在此直接引入 `flint-core` 的错误类型会导致依赖环。
/// - 通过本地别名确保传输层仍遵循统一错误语义，调用方可以在上层将错误转换为框架标准形式。
pub type Result<T, E> = core::result::Result<T, E>;

pub mod closer;
pub mod connection;
pub mod shutdown;
pub mod tls;

pub use closer::TransportCloser;
pub use connection::DuplexConnection;
pub use shutdown::ShutdownDirection;
pub use tls::CloseNotifySignal;
