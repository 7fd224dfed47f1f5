//! 场景测试的共享支撑件：协调器装配与记录流。

use std::sync::Arc;

use flint_core::stream::SubscriberTerminal;
use flint_core::test_stubs::{RecordingCloser, RecordingSubscriber, SubscriberLog};
use flint_core::{CloseConfig, CloseCoordination, ExchangeCloseCoordinator};

/// 报文片段常量：模拟一问一答交换中的首个与末个数据块。
pub const BEGIN: &str = "begin";
#[allow(dead_code)]
pub const END: &str = "end";

/// 一台装配完成的协调器与其关闭请求记录。
pub struct Harness {
    pub coordinator: Arc<ExchangeCloseCoordinator>,
    pub closer: Arc<RecordingCloser>,
}

/// 默认配置装配。
pub fn harness() -> Harness {
    harness_with_config(CloseConfig::default())
}

/// 指定配置装配。
pub fn harness_with_config(config: CloseConfig) -> Harness {
    let closer = RecordingCloser::new();
    let coordinator = Arc::new(
        ExchangeCloseCoordinator::new("conn-0", Arc::clone(&closer) as _).with_config(config),
    );
    Harness {
        coordinator,
        closer,
    }
}

/// 一条已完成订阅握手的记录流：信号缓冲与生产侧句柄。
pub struct TestStream {
    pub log: Arc<SubscriberLog<&'static str>>,
    pub terminal: Arc<SubscriberTerminal<&'static str, RecordingSubscriber<&'static str>>>,
}

fn stream() -> TestStream {
    let log = SubscriberLog::new();
    let terminal = SubscriberTerminal::subscribe(RecordingSubscriber::new(Arc::clone(&log)));
    TestStream { log, terminal }
}

/// 订阅并登记一条读流。
pub fn read_stream(harness: &Harness) -> TestStream {
    let stream = stream();
    assert!(
        harness.coordinator.register_read(Arc::clone(&stream.terminal) as _),
        "登记读流必须在连接存活时成功"
    );
    stream
}

/// 订阅并登记一条写流。
pub fn write_stream(harness: &Harness) -> TestStream {
    let stream = stream();
    assert!(
        harness.coordinator.register_write(Arc::clone(&stream.terminal) as _),
        "登记写流必须在连接存活时成功"
    );
    stream
}
