use crate::shutdown::ShutdownDirection;

/// `TransportCloser` 是上层协调逻辑向传输实现下达关闭指令的回调契约。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 连接对象由创建它的组件独占持有；关闭协调器只观察、决策，从不直接执行 I/O。
///   该契约把“请求关闭”与“执行关闭”解耦，使协调器可以在任意传输实现上复用。
///
/// ## 契约说明（What）
/// - `request_close`：请求按给定方向关闭连接。实现应尽快排队执行，不得阻塞调用线程；
///   同方向的重复请求必须幂等。
/// - **前置条件**：无；协调器可能在任意线程发起调用。
/// - **后置条件**：实现完成（半）关闭后，应通过既有的事件通道回报相应的关闭事实，
///   使协调器观察到状态收敛。
///
/// ## 风险提示（Trade-offs）
/// - 调用点不在任何内部锁内发生；实现若需要回调协调器（例如上报关闭事件），不会死锁。
pub trait TransportCloser: Send + Sync + 'static {
    /// 请求按 `direction` 关闭连接。
    fn request_close(&self, direction: ShutdownDirection);
}
