//! ### English
//! `acquire_buffer`: takes the head of the pending FIFO for composition.
//!
//! ### 中文
//! `acquire_buffer`：取出待处理 FIFO 的队首用于合成。

use tracing::debug;

use crate::queue::buffer::Fence;
use crate::queue::item::BufferItem;
use crate::queue::slot::BufferState;
use crate::queue::status::{QueueResult, Status};

use super::BufferQueueConsumer;

/// ### English
/// Frames scheduled further out than this (in nanoseconds) are treated as bogus timestamps.
///
/// ### 中文
/// 计划时间超出该范围（纳秒）的帧被视为无效时间戳。
const MAX_REASONABLE_NSEC: i64 = 1_000_000_000;

impl BufferQueueConsumer {
    /// ### English
    /// Acquires the next pending frame.
    ///
    /// With a non-zero `expected_present`, timed frames whose successor is already due are dropped
    /// (their slots return to `Free`), and a head scheduled less than a second in the future
    /// yields `PresentLater`. When the consumer already holds the slot's buffer, the returned
    /// item's `buffer` is `None`.
    ///
    /// #### Parameters
    /// - `expected_present`: Expected display time in nanoseconds, or `0` to take the head as-is.
    ///
    /// ### 中文
    /// acquire 下一个待处理帧。
    ///
    /// `expected_present` 非 0 时，若后继帧已到期则丢弃带时间戳的帧（其槽位退回 `Free`），
    /// 若队首计划在一秒内的未来呈现则返回 `PresentLater`。若消费者已持有该槽位的缓冲区，
    /// 返回项的 `buffer` 为 `None`。
    ///
    /// #### 参数
    /// - `expected_present`：预期显示时间（纳秒），`0` 表示直接取队首。
    pub fn acquire_buffer(&self, expected_present: i64) -> QueueResult<BufferItem> {
        let mut state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let acquired = state
            .slots
            .iter()
            .filter(|slot| slot.state == BufferState::Acquired)
            .count();
        if acquired > state.max_acquired_buffer_count {
            debug!(acquired, max = state.max_acquired_buffer_count, "acquire_buffer: too many acquired buffers");
            return Err(Status::InvalidOperation);
        }

        if state.queue.is_empty() {
            return Err(Status::NoBufferAvailable);
        }

        if expected_present != 0 {
            while state.queue.len() > 1 && !state.queue[0].is_auto_timestamp {
                let desired_present = state.queue[1].timestamp;
                if desired_present < expected_present.saturating_sub(MAX_REASONABLE_NSEC)
                    || desired_present > expected_present
                {
                    break;
                }

                let Some(dropped) = state.queue.pop_front() else {
                    break;
                };
                if state.still_tracking(&dropped) {
                    if let Ok(index) = usize::try_from(dropped.slot) {
                        let slot = &mut state.slots[index];
                        slot.state = BufferState::Free;
                        slot.frame_number = 0;
                        state.signal_buffer_free();
                    }
                }
                debug!(slot = dropped.slot, frame_number = dropped.frame_number, "acquire_buffer: dropped stale frame");
            }

            if let Some(head) = state.queue.front() {
                let desired_present = head.timestamp;
                if !head.is_auto_timestamp
                    && desired_present > expected_present
                    && desired_present < expected_present.saturating_add(MAX_REASONABLE_NSEC)
                {
                    debug!(desired_present, expected_present, "acquire_buffer: head is not due yet");
                    self.core.signal_dequeue();
                    return Err(Status::PresentLater);
                }
            }
        }

        let Some(mut item) = state.queue.pop_front() else {
            return Err(Status::NoBufferAvailable);
        };

        if state.still_tracking(&item) {
            if let Ok(index) = usize::try_from(item.slot) {
                let slot = &mut state.slots[index];
                slot.acquire_called = true;
                slot.needs_cleanup_on_release = false;
                slot.state = BufferState::Acquired;
                slot.fence = Fence::NO_FENCE;
            }
        }
        if item.acquire_called {
            item.buffer = None;
        }

        state.history.mark(item.frame_number, BufferState::Acquired);
        self.core.signal_dequeue();

        debug!(slot = item.slot, frame_number = item.frame_number, "acquire_buffer");
        Ok(item)
    }
}
