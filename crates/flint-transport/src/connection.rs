use core::future::Future;

use crate::shutdown::ShutdownDirection;
use bytes::{Buf, BufMut};

/// 统一的双工字节流连接接口。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 为 TCP/TLS 等一问一答式（单交换在途）协议提供一致的读写/半关闭接口；
/// - 允许在运行期热替换不同传输实现，而无需修改交换执行逻辑。
///
/// ## 架构定位（Architecture）
/// - 该 trait 位于 `flint-transport` 核心层，供各实现 crate 实现；
/// - 上层通过泛型或 trait object 统一调度不同协议的连接，关闭协调器则只通过
///   [`TransportCloser`](crate::closer::TransportCloser) 间接触达它。
///
/// ## 契约说明（What）
/// - `read`/`write`/`flush`/`shutdown` 返回 `Future`，实现自行处理超时与取消；
/// - `shutdown` 的方向语义见 [`ShutdownDirection`]；同方向重复调用必须幂等；
/// - 连接关闭期间在途的读写应以错误收敛，而非悬挂。
///
/// ## 风险提示（Trade-offs）
/// - 建议实现保持方法非阻塞；若协议不支持半关闭，应在 `shutdown` 中返回错误或记录限制。
pub trait DuplexConnection: Send + Sync + 'static {
    /// 协议特定的错误类型。
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// 读操作返回的 Future。
    type ReadFuture<'c>: Future<Output = crate::Result<usize, Self::Error>> + Send + 'c
    where
        Self: 'c;

    /// 写操作返回的 Future。
    type WriteFuture<'c>: Future<Output = crate::Result<usize, Self::Error>> + Send + 'c
    where
        Self: 'c;

    /// 刷新操作返回的 Future。
    type FlushFuture<'c>: Future<Output = crate::Result<(), Self::Error>> + Send + 'c
    where
        Self: 'c;

    /// 半关闭操作返回的 Future。
    type ShutdownFuture<'c>: Future<Output = crate::Result<(), Self::Error>> + Send + 'c
    where
        Self: 'c;

    /// 读取数据到缓冲区，返回读取的字节数；返回 0 表示入站半边已到达末尾。
    fn read<'c>(&'c self, buf: &'c mut (dyn BufMut + Send + Sync + 'static)) -> Self::ReadFuture<'c>;

    /// 写入数据，返回写入的字节数。
    fn write<'c>(&'c self, buf: &'c mut (dyn Buf + Send + Sync + 'static)) -> Self::WriteFuture<'c>;

    /// 冲刷缓冲区。
    fn flush<'c>(&'c self) -> Self::FlushFuture<'c>;

    /// 执行半关闭。
    fn shutdown<'c>(&'c self, direction: ShutdownDirection) -> Self::ShutdownFuture<'c>;
}
