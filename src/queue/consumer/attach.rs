use std::sync::Arc;

use tracing::{debug, error};

use crate::queue::buffer::{Fence, GraphicBuffer};
use crate::queue::slot::BufferState;
use crate::queue::status::{QueueResult, Status};

use super::BufferQueueConsumer;

impl BufferQueueConsumer {
    /// ### English
    /// Takes an acquired slot's buffer out of queue management.
    ///
    /// ### 中文
    /// 将已 acquire 槽位的缓冲区移出队列管理。
    pub fn detach_buffer(&self, slot: i32) -> QueueResult<()> {
        let mut state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let limit = state.slots.len();
        let Some(index) = state.slot_index(slot, limit) else {
            error!(slot, "consumer detach_buffer: slot index out of range");
            return Err(Status::BadValue);
        };
        if state.slots[index].state != BufferState::Acquired {
            error!(slot, state = ?state.slots[index].state, "consumer detach_buffer: slot is not acquired");
            return Err(Status::BadValue);
        }

        state.detach_slot_locked(index);
        self.core.signal_dequeue();
        debug!(slot, "consumer detach_buffer");
        Ok(())
    }

    /// ### English
    /// Places an external buffer into the first free slot as an acquired buffer.
    ///
    /// The producer sees `BUFFER_NEEDS_REALLOCATION` the next time it dequeues that slot.
    ///
    /// ### 中文
    /// 将外部缓冲区作为已 acquire 的缓冲区放入第一个空闲槽位。
    ///
    /// 生产者下次 dequeue 该槽位时会收到 `BUFFER_NEEDS_REALLOCATION`。
    pub fn attach_buffer(&self, buffer: Arc<GraphicBuffer>) -> QueueResult<i32> {
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
            error!(acquired, max = state.max_acquired_buffer_count, "consumer attach_buffer: too many acquired buffers");
            return Err(Status::InvalidOperation);
        }

        let Some(index) = state
            .slots
            .iter()
            .position(|slot| slot.state == BufferState::Free && !slot.is_preallocated)
        else {
            error!("consumer attach_buffer: no free slot");
            return Err(Status::NoMemory);
        };

        let slot = &mut state.slots[index];
        slot.buffer = Some(buffer);
        slot.state = BufferState::Acquired;
        slot.attached_by_consumer = true;
        slot.needs_cleanup_on_release = false;
        slot.fence = Fence::NO_FENCE;
        slot.frame_number = 0;
        slot.acquire_called = false;

        debug!(slot = index, "consumer attach_buffer");
        Ok(index as i32)
    }
}
