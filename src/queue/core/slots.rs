//! ### English
//! Slot lifecycle helpers shared by the producer and consumer (called with the core lock held).
//!
//! ### 中文
//! 生产者与消费者共用的槽位生命周期辅助方法（在持有 core 锁时调用）。

use crate::queue::buffer::Fence;
use crate::queue::item::BufferItem;
use crate::queue::slot::BufferState;

use super::CoreState;

impl CoreState {
    /// ### English
    /// Converts a protocol slot index into a table index below `limit`.
    ///
    /// ### 中文
    /// 将协议槽位索引转换为小于 `limit` 的表索引。
    pub(crate) fn slot_index(&self, slot: i32, limit: usize) -> Option<usize> {
        usize::try_from(slot)
            .ok()
            .filter(|&index| index < limit.min(self.slots.len()))
    }

    /// ### English
    /// Returns a slot to `Free`.
    ///
    /// The buffer reference is dropped unless the slot is preallocated (preallocated buffers only
    /// go away through `set_preallocated_buffer` or detach). An acquired slot is flagged so the
    /// consumer's pending release is reported as stale.
    ///
    /// ### 中文
    /// 将槽位退回 `Free`。
    ///
    /// 除非槽位是预分配的，否则释放缓冲区引用（预分配缓冲区只能通过
    /// `set_preallocated_buffer` 或 detach 移除）。被 acquire 的槽位会被标记，
    /// 使消费者随后的 release 被视为过期。
    pub(crate) fn free_buffer_locked(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if !slot.is_preallocated {
            slot.buffer = None;
        }
        if slot.state == BufferState::Acquired {
            slot.needs_cleanup_on_release = true;
        }
        slot.state = BufferState::Free;
        slot.frame_number = 0;
        slot.acquire_called = false;
        slot.request_buffer_called = false;
        slot.attached_by_consumer = false;
        slot.fence = Fence::NO_FENCE;
        self.signal_buffer_free();
    }

    /// ### English
    /// Removes a slot from queue management entirely, preallocated or not.
    ///
    /// ### 中文
    /// 将槽位完全移出队列管理，无论是否预分配。
    pub(crate) fn detach_slot_locked(&mut self, index: usize) {
        self.slots[index].is_preallocated = false;
        self.free_buffer_locked(index);
    }

    /// ### English
    /// Frees every slot and drops the pending FIFO (its items would point at freed slots).
    ///
    /// ### 中文
    /// 释放所有槽位并清空待处理 FIFO（其中的项会指向已释放的槽位）。
    pub(crate) fn free_all_buffers_locked(&mut self) {
        self.buffer_has_been_queued = false;
        self.queue.clear();
        for index in 0..self.slots.len() {
            self.free_buffer_locked(index);
        }
    }

    /// ### English
    /// Whether the slot behind `item` still holds the buffer the item was queued with.
    ///
    /// ### 中文
    /// `item` 对应的槽位是否仍持有该项入队时的缓冲区。
    pub(crate) fn still_tracking(&self, item: &BufferItem) -> bool {
        let Some(index) = usize::try_from(item.slot).ok() else {
            return false;
        };
        let Some(slot) = self.slots.get(index) else {
            return false;
        };

        match (slot.buffer_handle(), item.buffer_handle()) {
            (Some(current), Some(queued)) => current == queued,
            _ => false,
        }
    }

    pub(crate) fn preallocated_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.is_preallocated && slot.buffer.is_some())
            .count()
    }

    pub(crate) fn signal_buffer_free(&self) {
        if let Some(event) = &self.buffer_free_event {
            event.signal();
        }
    }
}
