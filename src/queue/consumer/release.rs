use tracing::{debug, error};

use crate::queue::buffer::Fence;
use crate::queue::slot::BufferState;
use crate::queue::status::{QueueResult, Status};

use super::BufferQueueConsumer;

impl BufferQueueConsumer {
    /// ### English
    /// Returns an acquired slot to the free pool.
    ///
    /// `StaleBufferSlot` means the slot was freed behind the consumer's back (buffer-count
    /// change, disconnect) and the release has been absorbed.
    ///
    /// #### Parameters
    /// - `slot`: Slot of the acquired item.
    /// - `frame_number`: Frame number of the acquired item.
    /// - `fence`: Signalled when the consumer has finished reading.
    ///
    /// ### 中文
    /// 将已 acquire 的槽位退回空闲池。
    ///
    /// `StaleBufferSlot` 表示该槽位已在消费者不知情时被释放（缓冲区数量变更、断开连接），
    /// 本次 release 已被吸收。
    ///
    /// #### 参数
    /// - `slot`：已 acquire 项的槽位。
    /// - `frame_number`：已 acquire 项的帧号。
    /// - `fence`：消费者读取完成时发出信号。
    pub fn release_buffer(&self, slot: i32, frame_number: u64, fence: Fence) -> QueueResult<()> {
        let mut state = self.core.lock();

        let limit = state.slots.len();
        let Some(index) = state.slot_index(slot, limit) else {
            error!(slot, "release_buffer: slot index out of range");
            return Err(Status::BadValue);
        };
        if state.slots[index].frame_number != frame_number {
            return Err(Status::StaleBufferSlot);
        }
        if state.queue.iter().any(|item| item.slot == slot) {
            error!(slot, "release_buffer: slot is still pending");
            return Err(Status::BadValue);
        }

        let slot_state = &mut state.slots[index];
        match slot_state.state {
            BufferState::Acquired => {
                slot_state.state = BufferState::Free;
                slot_state.fence = fence;
            }
            _ if slot_state.needs_cleanup_on_release => {
                slot_state.needs_cleanup_on_release = false;
                return Err(Status::StaleBufferSlot);
            }
            other => {
                error!(slot, state = ?other, "release_buffer: slot is not acquired");
                return Err(Status::BadValue);
            }
        }

        state.signal_buffer_free();
        self.core.signal_dequeue();
        let listener = state.producer_listener.clone();
        drop(state);

        debug!(slot, frame_number, "release_buffer");
        if let Some(listener) = listener {
            listener.on_buffer_released();
        }
        Ok(())
    }
}
