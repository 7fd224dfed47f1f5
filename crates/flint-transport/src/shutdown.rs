use core::fmt;

/// `ShutdownDirection` 表达双工连接半关闭的目标方向。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - TCP/TLS 等双工协议允许两个半边独立关闭，且顺序不定；统一方向枚举使上层协调逻辑
///   无需关心具体协议如何实现半关闭（`shutdown(SHUT_WR)`、TLS close-notify 等）。
/// - 关闭协调器据此向传输实现下达“只关读”“只关写”或“整体关闭”的指令。
///
/// ## 契约说明（What）
/// - `Read`：不再从对端读取；实现应释放读方向资源并停止投递入站数据。
/// - `Write`：本端不再发送；实现应在冲刷完待写数据后发出协议层的优雅关闭信号。
/// - `Both`：两个方向一并关闭，语义等价于依次执行 `Read` 与 `Write`。
///
/// ## 风险提示（Trade-offs）
/// - 若协议不支持半关闭，实现可将 `Read`/`Write` 升格为整体关闭，但必须在文档中注明。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShutdownDirection {
    /// 关闭读方向。
    Read,
    /// 关闭写方向。
    Write,
    /// 同时关闭两个方向。
    Both,
}

impl ShutdownDirection {
    /// 该方向是否波及读半边。
    pub fn affects_read(&self) -> bool {
        matches!(self, ShutdownDirection::Read | ShutdownDirection::Both)
    }

    /// 该方向是否波及写半边。
    pub fn affects_write(&self) -> bool {
        matches!(self, ShutdownDirection::Write | ShutdownDirection::Both)
    }

    /// 面向日志字段的稳定低基数标签。
    pub fn label(&self) -> &'static str {
        match self {
            ShutdownDirection::Read => "read",
            ShutdownDirection::Write => "write",
            ShutdownDirection::Both => "both",
        }
    }
}

impl fmt::Display for ShutdownDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownDirection::Read => f.write_str("read"),
            ShutdownDirection::Write => f.write_str("write"),
            ShutdownDirection::Both => f.write_str("both"),
        }
    }
}
