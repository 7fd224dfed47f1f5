/// `ExchangeProgress` 记录当前在途交换的读写推进程度。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 重试安全性的唯一判据是“本端是否已向对端写出过部分响应”；读写各自的
///   开始/结束四个布尔位恰好刻画了分类策略需要的全部交换阶段信息。
///
/// ## 契约说明（What）
/// - 不变式：`read_complete ⇒ read_started`，`write_complete ⇒ write_started`。
///   标记完成的方法会顺带补齐开始位，调用方无法构造违例状态；
/// - 仅在上一交换完全结束、连接空闲时，随新交换的开始重置为全假；
/// - 快照语义：结构体 `Copy`，分类策略拿到的是事件到达时刻的一份只读快照。
///
/// ## 并发（Concurrency）
/// - 本结构自身不做同步；它由关闭协调器独占持有，所有读写都发生在协调器的
///   临界区内（见 `coordinator` 模块）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExchangeProgress {
    read_started: bool,
    read_complete: bool,
    write_started: bool,
    write_complete: bool,
}

impl ExchangeProgress {
    /// 全假初始状态。
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记请求消费已开始。
    pub fn mark_read_started(&mut self) {
        self.read_started = true;
    }

    /// 标记请求消费已结束；顺带补齐开始位以维持不变式。
    pub fn mark_read_complete(&mut self) {
        self.read_started = true;
        self.read_complete = true;
    }

    /// 标记响应发射已开始。
    pub fn mark_write_started(&mut self) {
        self.write_started = true;
    }

    /// 标记响应发射已结束；顺带补齐开始位以维持不变式。
    pub fn mark_write_complete(&mut self) {
        self.write_started = true;
        self.write_complete = true;
    }

    /// 请求消费是否已开始。
    pub fn read_started(&self) -> bool {
        self.read_started
    }

    /// 请求消费是否已结束。
    pub fn read_complete(&self) -> bool {
        self.read_complete
    }

    /// 响应发射是否已开始。
    pub fn write_started(&self) -> bool {
        self.write_started
    }

    /// 响应发射是否已结束。
    pub fn write_complete(&self) -> bool {
        self.write_complete
    }

    /// 当前是否没有任何交换活动。
    pub fn is_idle(&self) -> bool {
        !self.read_started && !self.write_started
    }

    /// 当前交换是否已完整结束（读写均完成）。
    pub fn is_complete(&self) -> bool {
        self.read_complete && self.write_complete
    }

    /// 为新交换重置进度。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：上一交换已完整结束（[`is_complete`](Self::is_complete)）或从未开始；
    ///   调用点由协调器在新交换的首个开始标记前保证。
    pub fn reset_for_next_exchange(&mut self) {
        *self = Self::default();
    }
}
