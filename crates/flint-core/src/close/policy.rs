use core::fmt;
use serde::{Deserialize, Serialize};

use super::event::CloseEvent;
use super::progress::ExchangeProgress;
use crate::error::{AbortedClosureError, FlintError, ObservedClosureError, RetryableClosureError};

/// 空闲竞速场景的裁决口径。
///
/// # 设计背景（Why）
/// - “响应已完整写出、连接其余部分空闲，一个新发起的操作与关闭事件竞速”这一场景
///   存在两种都站得住脚的读法：要么如实报告观测到的关闭事实（不做重试判断），
///   要么把“没有活跃交换”等同于“写尚未开始”并入常规分类表；
/// - 两种口径各有拥趸，因此以配置项显式收口，默认取信息量更大的前者。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleRacePolicy {
    /// 如实报告关闭事实：裁决为 `Observed`，不做重试安全性判断。
    #[default]
    ObserveRaw,
    /// 并入常规分类表：无活跃交换视同“写未开始”，裁决为 `Retryable`。
    FoldIntoRetrySafety,
}

/// `ClosureVerdict` 是分类策略的输出：关闭事件对在途交换的定性结论。
///
/// # 契约说明（What）
/// - `Retryable`：交换未对外产生任何部分性进展，可在新连接上安全重发；
/// - `Aborted`：响应可能已部分送达，必须作为硬失败终止，严禁重发；
/// - `Observed`：无交换处于危险之中，仅告知观测到的关闭事实；
/// - 三种裁决都携带触发事件，供诊断与日志使用；
/// - 枚举封闭，消费方穷尽匹配即获得编译期覆盖保证。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClosureVerdict {
    /// 可安全重发。
    Retryable(CloseEvent),
    /// 硬终止，不可重发。
    Aborted(CloseEvent),
    /// 仅告知关闭事实。
    Observed(CloseEvent),
}

impl ClosureVerdict {
    /// 触发裁决的关闭事件。
    pub fn event(&self) -> CloseEvent {
        match self {
            ClosureVerdict::Retryable(event)
            | ClosureVerdict::Aborted(event)
            | ClosureVerdict::Observed(event) => *event,
        }
    }

    /// 裁决是否携带重试安全标记。
    pub fn is_retry_safe(&self) -> bool {
        matches!(self, ClosureVerdict::Retryable(_))
    }

    /// 面向日志字段的稳定低基数标签。
    pub fn diagnostic_label(&self) -> &'static str {
        match self {
            ClosureVerdict::Retryable(_) => "retryable",
            ClosureVerdict::Aborted(_) => "aborted",
            ClosureVerdict::Observed(_) => "observed",
        }
    }

    /// 将裁决翻译为交付给流订阅者的具体错误。
    ///
    /// # 契约说明（What）
    /// - `Retryable` → [`RetryableClosureError`]（携带重试安全标记）；
    /// - `Aborted` → [`AbortedClosureError`]（通道已关闭风格的硬错误）；
    /// - `Observed` → [`ObservedClosureError`]（诊断性包装）。
    pub fn to_error(&self) -> FlintError {
        match self {
            ClosureVerdict::Retryable(event) => RetryableClosureError::new(*event).into(),
            ClosureVerdict::Aborted(event) => AbortedClosureError::new(*event).into(),
            ClosureVerdict::Observed(event) => ObservedClosureError::new(*event).into(),
        }
    }
}

impl fmt::Display for ClosureVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.diagnostic_label(), self.event())
    }
}

/// 核心分类算法：由事件到达时刻的进度快照定性一次关闭。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 重试安全性的判据只有一个：本端是否已向对端写出过部分响应。写出过而未写完，
///   重发就有重复副作用风险；完全没写过，重发必然安全；写完了则没有交换处于危险，
///   只剩下“把关闭事实告诉调用方”一件事。
///
/// ## 执行逻辑（How）
/// 1. `write_complete`：响应已完整写出 → 空闲竞速口径，按 [`IdleRacePolicy`] 裁决。
///    `ObserveRaw` 下把优雅信号折算为通道后果
///    （见 [`CloseEvent::channel_consequence`]），如实报告；
/// 2. `write_started && !write_complete` → `Aborted(event)`；
/// 3. 其余（写从未开始，无论读推进到哪）→ `Retryable(event)`。
///
/// ## 契约说明（What）
/// - **输入**：`progress` 必须是事件到达时刻在临界区内取得的一份快照；
///   同一事件波及的多条流各自用同一份快照独立定性，绝不按流重取；
/// - **纯函数**：无副作用，可在任意线程重入。
pub fn classify(
    progress: &ExchangeProgress,
    event: CloseEvent,
    policy: IdleRacePolicy,
) -> ClosureVerdict {
    if progress.write_complete() {
        return match policy {
            IdleRacePolicy::ObserveRaw => ClosureVerdict::Observed(event.channel_consequence()),
            IdleRacePolicy::FoldIntoRetrySafety => ClosureVerdict::Retryable(event),
        };
    }
    if progress.write_started() {
        ClosureVerdict::Aborted(event)
    } else {
        ClosureVerdict::Retryable(event)
    }
}
