use tracing::{debug, warn};

use crate::queue::buffer::Fence;
use crate::queue::slot::BufferState;

use super::BufferQueueProducer;

impl BufferQueueProducer {
    /// ### English
    /// Returns a dequeued slot to the free pool without queuing it.
    ///
    /// Best-effort: a bad slot, wrong ownership or an abandoned core is logged and ignored.
    ///
    /// #### Parameters
    /// - `slot`: Slot previously returned by `dequeue_buffer`.
    /// - `fence`: Fence the next user of the slot must wait on.
    ///
    /// ### 中文
    /// 将已 dequeue 的槽位直接退回空闲池而不入队。
    ///
    /// 尽力而为：槽位错误、所有权不符或 core 已放弃时仅记录日志并忽略。
    ///
    /// #### 参数
    /// - `slot`：之前由 `dequeue_buffer` 返回的槽位。
    /// - `fence`：该槽位下一个使用者必须等待的 fence。
    pub fn cancel_buffer(&self, slot: i32, fence: Fence) {
        let mut state = self.core.lock();
        if state.is_abandoned {
            warn!(slot, "cancel_buffer: queue has been abandoned");
            return;
        }

        let limit = state.slots.len();
        let Some(index) = state.slot_index(slot, limit) else {
            warn!(slot, "cancel_buffer: slot index out of range");
            return;
        };
        if state.slots[index].state != BufferState::Dequeued {
            warn!(slot, state = ?state.slots[index].state, "cancel_buffer: slot is not owned by the producer");
            return;
        }

        let slot_state = &mut state.slots[index];
        slot_state.state = BufferState::Free;
        slot_state.frame_number = 0;
        slot_state.fence = fence;
        state.signal_buffer_free();

        self.core.signal_dequeue();
        self.core.signal_allocation_finished();
        debug!(slot, "cancel_buffer");
    }
}
