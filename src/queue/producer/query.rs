use tracing::warn;

use crate::queue::history::BufferHistoryEntry;
use crate::queue::status::{QueueResult, Status};
use crate::queue::window::NativeWindowAttribute;

use super::BufferQueueProducer;

impl BufferQueueProducer {
    /// ### English
    /// Reads one window attribute from the core.
    ///
    /// #### Parameters
    /// - `what`: Raw `NativeWindowAttribute` value; unknown values fail with `BadValue`.
    ///
    /// ### 中文
    /// 从 core 读取一个窗口属性。
    ///
    /// #### 参数
    /// - `what`：原始 `NativeWindowAttribute` 值；未知值返回 `BadValue`。
    pub fn query(&self, what: i32) -> QueueResult<i32> {
        let state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let Ok(attribute) = NativeWindowAttribute::try_from(what) else {
            warn!(what, "query: unknown attribute");
            return Err(Status::BadValue);
        };

        let value = match attribute {
            NativeWindowAttribute::Width => state.default_size.width as i32,
            NativeWindowAttribute::Height => state.default_size.height as i32,
            NativeWindowAttribute::Format => state.default_format.raw(),
            NativeWindowAttribute::MinUnqueuedBuffers => {
                state.min_undequeued_buffer_count(false) as i32
            }
            NativeWindowAttribute::ConsumerRunningBehind => i32::from(state.queue.len() >= 2),
            NativeWindowAttribute::ConsumerUsageBits => state.consumer_usage_bits as i32,
            NativeWindowAttribute::MaxBufferCountAsync => state.max_buffer_count(true) as i32,
        };
        Ok(value)
    }

    /// ### English
    /// Snapshot of the last `count` queued frames, most recent first (clamped to the ring size).
    ///
    /// ### 中文
    /// 最近 `count` 个入队帧的快照，最新的在前（按环形缓冲大小截断）。
    pub fn get_buffer_history(&self, count: usize) -> QueueResult<Vec<BufferHistoryEntry>> {
        if count == 0 {
            return Err(Status::BadValue);
        }

        let state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }
        Ok(state.history.latest(count))
    }
}
