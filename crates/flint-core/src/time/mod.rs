//! 时间抽象：可注入的时钟与确定性的虚拟时间。
//!
//! 关闭协调本身是同步且非阻塞的，永远不等待时间；时间能力只服务于
//! “某段时长内不应出现任何信号”这类静默窗口断言。测试通过注入
//! [`clock::MockClock`] 手动推进时间，在 CI 中获得完全可复现的唤醒序列。

pub mod clock;

pub use clock::{Clock, MockClock, Sleep, SystemClock};
