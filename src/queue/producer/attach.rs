//! ### English
//! Moving buffers in and out of queue management from the producer side.
//!
//! ### 中文
//! 从生产者侧将缓冲区移入或移出队列管理。

use std::sync::Arc;

use tracing::{debug, error};

use crate::queue::buffer::{Fence, GraphicBuffer};
use crate::queue::slot::BufferState;
use crate::queue::status::{QueueResult, Status, StatusFlags};

use super::BufferQueueProducer;

impl BufferQueueProducer {
    /// ### English
    /// Removes a dequeued (and requested) slot's buffer from the queue entirely.
    ///
    /// ### 中文
    /// 将已 dequeue（且已 request）槽位的缓冲区完全移出队列。
    pub fn detach_buffer(&self, slot: i32) -> QueueResult<()> {
        let mut state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let limit = state.slots.len();
        let Some(index) = state.slot_index(slot, limit) else {
            error!(slot, "detach_buffer: slot index out of range");
            return Err(Status::BadValue);
        };
        let slot_state = &state.slots[index];
        if slot_state.state != BufferState::Dequeued {
            error!(slot, state = ?slot_state.state, "detach_buffer: slot is not owned by the producer");
            return Err(Status::BadValue);
        }
        if !slot_state.request_buffer_called {
            error!(slot, "detach_buffer: buffer was never requested");
            return Err(Status::BadValue);
        }

        state.detach_slot_locked(index);
        self.core.signal_dequeue();
        debug!(slot, "detach_buffer");
        Ok(())
    }

    /// ### English
    /// Detaches the oldest free slot that still holds a buffer and returns that buffer together
    /// with its fence.
    ///
    /// ### 中文
    /// 分离仍持有缓冲区的最旧空闲槽位，并返回该缓冲区及其 fence。
    pub fn detach_next_buffer(&self) -> QueueResult<(Arc<GraphicBuffer>, Fence)> {
        let state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }
        let mut state = self.core.wait_while_allocating(state);
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let oldest = state
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == BufferState::Free && slot.buffer.is_some())
            .min_by_key(|(_, slot)| slot.frame_number)
            .map(|(index, _)| index);
        let Some(index) = oldest else {
            return Err(Status::NoMemory);
        };

        let fence = state.slots[index].fence;
        let Some(buffer) = state.slots[index].buffer.clone() else {
            return Err(Status::NoMemory);
        };

        state.detach_slot_locked(index);
        self.core.signal_dequeue();
        debug!(slot = index, "detach_next_buffer");
        Ok((buffer, fence))
    }

    /// ### English
    /// Inserts an externally held buffer into a free slot, which becomes `Dequeued`.
    ///
    /// Uses the same free-slot search as `dequeue_buffer` (in blocking mode). The buffer counts as
    /// already requested.
    ///
    /// ### 中文
    /// 将外部持有的缓冲区插入空闲槽位，该槽位变为 `Dequeued`。
    ///
    /// 使用与 `dequeue_buffer` 相同的空闲槽位搜索（阻塞模式）。该缓冲区视为已 request。
    pub fn attach_buffer(&self, buffer: Arc<GraphicBuffer>) -> QueueResult<(i32, StatusFlags)> {
        let state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }
        let state = self.core.wait_while_allocating(state);

        let (mut state, found) = self.wait_for_free_slot(state, "attach_buffer", false);
        let (index, flags) = found?;

        let slot = &mut state.slots[index];
        slot.buffer = Some(buffer);
        slot.state = BufferState::Dequeued;
        slot.fence = Fence::NO_FENCE;
        slot.request_buffer_called = true;
        slot.attached_by_consumer = false;
        slot.is_preallocated = false;

        debug!(slot = index, ?flags, "attach_buffer");
        Ok((index as i32, flags))
    }
}
