//! ### English
//! Buffer-count negotiation helpers (called with the core lock held).
//!
//! ### 中文
//! 缓冲区数量协商辅助方法（在持有 core 锁时调用）。

use super::super::slot::BufferState;
use super::super::status::{QueueResult, Status};
use super::{BufferQueueCore, CoreState};

impl CoreState {
    /// ### English
    /// Number of slots that must stay un-dequeued so the consumer can make progress.
    ///
    /// #### Parameters
    /// - `is_async`: Whether the caller dequeues/queues in async mode.
    ///
    /// ### 中文
    /// 为保证消费者能够推进，必须保持未被 dequeue 的槽位数量。
    ///
    /// #### 参数
    /// - `is_async`：调用方是否以异步模式 dequeue/queue。
    pub(crate) fn min_undequeued_buffer_count(&self, is_async: bool) -> usize {
        if !self.use_async_buffer {
            return 0;
        }

        if self.dequeue_buffer_cannot_block || is_async {
            self.max_acquired_buffer_count + 1
        } else {
            self.max_acquired_buffer_count
        }
    }

    /// ### English
    /// Smallest buffer count that still leaves the producer one slot to dequeue.
    ///
    /// ### 中文
    /// 仍能为生产者留出一个可 dequeue 槽位的最小缓冲区数量。
    pub(crate) fn min_max_buffer_count(&self, is_async: bool) -> usize {
        self.min_undequeued_buffer_count(is_async) + 1
    }

    /// ### English
    /// Effective buffer count.
    ///
    /// An explicit override wins outright. Otherwise the default is raised to the undequeued
    /// minimum, then past any slot beyond the nominal cap that is still queued or dequeued, so
    /// buffers in flight are never invalidated by a shrinking cap.
    ///
    /// ### 中文
    /// 实际生效的缓冲区数量。
    ///
    /// 显式 override 直接生效。否则先将默认值提升到未 dequeue 下限，再越过名义上限之外仍处于
    /// queued 或 dequeued 的槽位，确保缩小上限时不会使在途缓冲区失效。
    pub(crate) fn max_buffer_count(&self, is_async: bool) -> usize {
        if self.override_max_buffer_count != 0 {
            return self.override_max_buffer_count;
        }

        let nominal = self
            .default_max_buffer_count
            .max(self.min_undequeued_buffer_count(is_async))
            .min(self.slots.len());

        self.slots
            .iter()
            .enumerate()
            .skip(nominal)
            .filter(|(_, slot)| matches!(slot.state, BufferState::Queued | BufferState::Dequeued))
            .map(|(index, _)| index + 1)
            .fold(nominal, usize::max)
    }

    /// ### English
    /// Minimum accepted by `set_default_max_buffer_count`.
    ///
    /// ### 中文
    /// `set_default_max_buffer_count` 接受的最小值。
    pub(crate) fn min_buffer_count(&self) -> usize {
        if self.use_async_buffer { 2 } else { 1 }
    }
}

impl BufferQueueCore {
    /// ### English
    /// Sets the default buffer count used when no override is negotiated.
    ///
    /// ### 中文
    /// 设置未协商 override 时使用的默认缓冲区数量。
    pub(crate) fn set_default_max_buffer_count(&self, count: usize) -> QueueResult<()> {
        let mut state = self.lock();
        if count < state.min_buffer_count() || count > state.slots.len() {
            return Err(Status::BadValue);
        }

        state.default_max_buffer_count = count;
        self.signal_dequeue();
        Ok(())
    }
}
