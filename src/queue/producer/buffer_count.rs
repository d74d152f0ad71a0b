//! ### English
//! Buffer-count negotiation from the producer side.
//!
//! ### 中文
//! 生产者侧的缓冲区数量协商。

use std::sync::Arc;

use tracing::{debug, error};

use crate::queue::buffer::GraphicBuffer;
use crate::queue::slot::BufferState;
use crate::queue::status::{QueueResult, Status};

use super::BufferQueueProducer;

impl BufferQueueProducer {
    /// ### English
    /// Sets (or with `0`, clears) the explicit buffer count.
    ///
    /// Fails with `BadValue` while any slot is dequeued, including for `0`; the override is left
    /// untouched in that case.
    ///
    /// ### 中文
    /// 设置（`0` 时清除）显式缓冲区数量。
    ///
    /// 只要有槽位处于 dequeued 就返回 `BadValue`（包括 `0`），此时 override 保持不变。
    pub fn set_buffer_count(&self, buffer_count: usize) -> QueueResult<()> {
        let mut state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        if buffer_count > state.slots.len() {
            error!(buffer_count, capacity = state.slots.len(), "set_buffer_count: count exceeds capacity");
            return Err(Status::BadValue);
        }
        if let Some(slot) = state
            .slots
            .iter()
            .position(|slot| slot.state == BufferState::Dequeued)
        {
            error!(buffer_count, slot, "set_buffer_count: a slot is still dequeued");
            return Err(Status::BadValue);
        }

        if buffer_count == 0 {
            state.override_max_buffer_count = 0;
            self.core.signal_dequeue();
            debug!("set_buffer_count: override cleared");
            return Ok(());
        }

        let min_buffer_count = state.min_max_buffer_count(false);
        if buffer_count < min_buffer_count {
            error!(buffer_count, min_buffer_count, "set_buffer_count: count below minimum");
            return Err(Status::BadValue);
        }

        let preallocated = state.preallocated_count();
        if preallocated > 0 && preallocated < buffer_count {
            error!(buffer_count, preallocated, "set_buffer_count: not enough preallocated buffers");
            return Err(Status::BadValue);
        }

        state.free_all_buffers_locked();
        state.override_max_buffer_count = buffer_count;
        self.core.signal_dequeue();
        let listener = state.consumer_listener.clone();
        drop(state);

        debug!(buffer_count, "set_buffer_count");
        if let Some(listener) = listener {
            listener.on_buffers_released();
        }
        Ok(())
    }

    /// ### English
    /// Binds `buffer` to a fixed slot outside normal allocation, or clears the slot with `None`.
    ///
    /// The override buffer count follows the number of preallocated slots. When none remain, every
    /// buffer is freed and the pending queue is reset.
    ///
    /// #### Parameters
    /// - `slot`: Slot to bind.
    /// - `buffer`: Buffer to bind, or `None` to clear.
    ///
    /// ### 中文
    /// 在常规分配之外将 `buffer` 绑定到固定槽位，或传入 `None` 清除该槽位。
    ///
    /// override 缓冲区数量跟随预分配槽位的数量。全部清除后，释放所有缓冲区并重置待处理队列。
    ///
    /// #### 参数
    /// - `slot`：要绑定的槽位。
    /// - `buffer`：要绑定的缓冲区，`None` 表示清除。
    pub fn set_preallocated_buffer(
        &self,
        slot: i32,
        buffer: Option<Arc<GraphicBuffer>>,
    ) -> QueueResult<()> {
        let mut state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let limit = state.slots.len();
        let Some(index) = state.slot_index(slot, limit) else {
            error!(slot, "set_preallocated_buffer: slot index out of range");
            return Err(Status::BadValue);
        };

        let slot_state = &mut state.slots[index];
        slot_state.state = BufferState::Free;
        slot_state.frame_number = 0;
        slot_state.request_buffer_called = false;
        slot_state.acquire_called = false;
        slot_state.attached_by_consumer = false;
        slot_state.needs_cleanup_on_release = false;
        slot_state.is_preallocated = buffer.is_some();
        slot_state.buffer = buffer;

        let preallocated = state.preallocated_count();
        state.override_max_buffer_count = preallocated;
        if preallocated == 0 {
            state.free_all_buffers_locked();
        }
        state.signal_buffer_free();
        self.core.signal_dequeue();
        let listener = state.producer_listener.clone();
        drop(state);

        debug!(slot, preallocated, "set_preallocated_buffer");
        if let Some(listener) = listener {
            listener.on_buffer_released();
        }
        Ok(())
    }
}
