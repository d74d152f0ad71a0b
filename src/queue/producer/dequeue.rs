//! ### English
//! `request_buffer`, `dequeue_buffer` and the free-slot search they share with `attach_buffer`.
//!
//! ### 中文
//! `request_buffer`、`dequeue_buffer` 以及它们与 `attach_buffer` 共用的空闲槽位搜索。

use std::sync::{Arc, MutexGuard};

use dpi::PhysicalSize;
use tracing::{debug, error};

use crate::queue::buffer::{Fence, GraphicBuffer, PixelFormat};
use crate::queue::core::CoreState;
use crate::queue::slot::BufferState;
use crate::queue::status::{QueueResult, Status, StatusFlags};

use super::{BufferQueueProducer, DequeuedBuffer};

impl BufferQueueProducer {
    /// ### English
    /// Returns the buffer bound to a dequeued slot and records that the producer fetched it.
    ///
    /// ### 中文
    /// 返回已 dequeue 槽位绑定的缓冲区，并记录生产者已获取该缓冲区。
    pub fn request_buffer(&self, slot: i32) -> QueueResult<Option<Arc<GraphicBuffer>>> {
        let mut state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let limit = state.slots.len();
        let Some(index) = state.slot_index(slot, limit) else {
            error!(slot, "request_buffer: slot index out of range");
            return Err(Status::BadValue);
        };
        if state.slots[index].state != BufferState::Dequeued {
            error!(slot, state = ?state.slots[index].state, "request_buffer: slot is not owned by the producer");
            return Err(Status::BadValue);
        }

        state.slots[index].request_buffer_called = true;
        Ok(state.slots[index].buffer.clone())
    }

    /// ### English
    /// Hands a free slot to the producer.
    ///
    /// Blocks while no slot is available unless `is_async` is set or the connection cannot block.
    /// The returned fence belonged to the slot's previous user; the caller must wait on it before
    /// writing.
    ///
    /// #### Parameters
    /// - `is_async`: Async (non-blocking, droppable) submission mode.
    /// - `width` / `height`: Requested size; both zero selects the default size.
    /// - `format`: Requested format; `Unknown` selects the default format.
    /// - `usage`: Requested usage bits (consumer usage bits are added).
    ///
    /// ### 中文
    /// 将一个空闲槽位交给生产者。
    ///
    /// 没有可用槽位时会阻塞，除非设置了 `is_async` 或当前连接不允许阻塞。
    /// 返回的 fence 属于该槽位的上一个使用者；调用方写入前必须等待它。
    ///
    /// #### 参数
    /// - `is_async`：异步（非阻塞、可丢弃）提交模式。
    /// - `width` / `height`：请求尺寸；均为 0 时使用默认尺寸。
    /// - `format`：请求格式；`Unknown` 时使用默认格式。
    /// - `usage`：请求的 usage 位（会附加消费者 usage 位）。
    pub fn dequeue_buffer(
        &self,
        is_async: bool,
        width: u32,
        height: u32,
        format: PixelFormat,
        usage: u32,
    ) -> QueueResult<DequeuedBuffer> {
        if (width == 0) != (height == 0) {
            error!(width, height, "dequeue_buffer: invalid size");
            return Err(Status::BadValue);
        }

        let state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }
        let state = self.core.wait_while_allocating(state);

        let (mut state, found) = self.wait_for_free_slot(state, "dequeue_buffer", is_async);
        let (index, mut flags) = found?;

        let size = if width == 0 {
            state.default_size
        } else {
            PhysicalSize::new(width, height)
        };
        let format = if format == PixelFormat::Unknown {
            state.default_format
        } else {
            format
        };
        let usage = usage | state.consumer_usage_bits;

        let needs_allocation = state.slots[index]
            .buffer
            .as_ref()
            .is_none_or(|buffer| !buffer.matches(size, format, usage));
        if needs_allocation && state.slots[index].is_preallocated {
            error!(slot = index, "dequeue_buffer: preallocated buffer does not match the request");
            return Err(Status::NoInit);
        }
        let allocator = state.allocator.clone();
        if needs_allocation && allocator.is_none() {
            return Err(Status::NoMemory);
        }

        let previous = state.slots[index].clone();
        let slot = &mut state.slots[index];
        slot.state = BufferState::Dequeued;
        let fence = std::mem::replace(&mut slot.fence, Fence::NO_FENCE);
        slot.queue_time = 0;
        slot.presentation_time = 0;
        if slot.attached_by_consumer {
            slot.attached_by_consumer = false;
            slot.request_buffer_called = false;
            flags |= StatusFlags::BUFFER_NEEDS_REALLOCATION;
        }

        if let (true, Some(allocator)) = (needs_allocation, allocator) {
            slot.buffer = None;
            slot.request_buffer_called = false;
            flags |= StatusFlags::BUFFER_NEEDS_REALLOCATION;
            state.allocations_in_flight += 1;
            drop(state);

            let allocated = allocator.allocate(size, format, usage);

            let mut state = self.core.lock();
            state.allocations_in_flight -= 1;
            self.core.signal_allocation_finished();

            if state.is_abandoned {
                return Err(Status::NoInit);
            }
            match allocated {
                Ok(buffer) => state.slots[index].buffer = Some(buffer),
                Err(status) => {
                    error!(slot = index, %status, "dequeue_buffer: allocation failed");
                    // The slot goes back untouched, pending fence and consumer attachment included.
                    if state.slots[index].state == BufferState::Dequeued {
                        state.slots[index] = previous;
                        state.signal_buffer_free();
                    }
                    self.core.signal_dequeue();
                    return Err(status);
                }
            }
        }

        debug!(slot = index, ?flags, "dequeue_buffer");
        Ok(DequeuedBuffer {
            slot: index as i32,
            fence,
            flags,
        })
    }

    /// ### English
    /// Free-slot search: loops until a slot is found or a terminal condition fires.
    ///
    /// Returns the (possibly re-acquired) guard together with the chosen slot and the flags
    /// collected while trimming slots above a shrunk buffer count.
    ///
    /// ### 中文
    /// 空闲槽位搜索：循环直到找到槽位或触发终止条件。
    ///
    /// 返回（可能重新获取的）锁 guard，以及选中的槽位和在裁剪超出协商数量的槽位时收集的标志。
    pub(super) fn wait_for_free_slot<'a>(
        &self,
        mut state: MutexGuard<'a, CoreState>,
        caller: &'static str,
        is_async: bool,
    ) -> (MutexGuard<'a, CoreState>, QueueResult<(usize, StatusFlags)>) {
        let mut flags = StatusFlags::empty();

        loop {
            if state.is_abandoned {
                return (state, Err(Status::NoInit));
            }

            let max_buffer_count = state.max_buffer_count(is_async);
            if is_async
                && state.override_max_buffer_count != 0
                && state.override_max_buffer_count < state.min_max_buffer_count(is_async)
            {
                error!(caller, "async mode is invalid with the negotiated buffer count");
                return (state, Err(Status::BadValue));
            }

            let cached = state.max_buffer_count_cached.min(state.slots.len());
            for index in max_buffer_count..cached {
                let slot = &state.slots[index];
                if slot.state == BufferState::Free && slot.buffer.is_some() && !slot.is_preallocated
                {
                    state.free_buffer_locked(index);
                    flags |= StatusFlags::RELEASE_ALL_BUFFERS;
                }
            }
            state.max_buffer_count_cached = max_buffer_count;

            let mut found: Option<(usize, u64)> = None;
            let mut dequeued_count = 0usize;
            let mut acquired_count = 0usize;
            for (index, slot) in state.slots.iter().enumerate().take(max_buffer_count) {
                match slot.state {
                    BufferState::Dequeued => dequeued_count += 1,
                    BufferState::Acquired => acquired_count += 1,
                    BufferState::Free => {
                        if found.is_none_or(|(_, oldest)| slot.frame_number < oldest) {
                            found = Some((index, slot.frame_number));
                        }
                    }
                    BufferState::Queued => {}
                }
            }

            if state.override_max_buffer_count == 0 && dequeued_count > 0 {
                error!(caller, "can't dequeue multiple buffers without setting the buffer count");
                return (state, Err(Status::InvalidOperation));
            }

            if state.buffer_has_been_queued {
                let min_undequeued = state.min_undequeued_buffer_count(is_async);
                let new_undequeued = max_buffer_count.checked_sub(dequeued_count + 1);
                if new_undequeued.is_none_or(|count| count < min_undequeued) {
                    error!(
                        caller,
                        min_undequeued,
                        max_buffer_count,
                        dequeued_count,
                        "min undequeued buffer count exceeded"
                    );
                    return (state, Err(Status::InvalidOperation));
                }
            }

            let too_many_buffers = state.queue.len() > max_buffer_count;
            if let (Some((index, _)), false) = (found, too_many_buffers) {
                return (state, Ok((index, flags)));
            }

            if is_async
                || (state.dequeue_buffer_cannot_block
                    && acquired_count < state.max_acquired_buffer_count)
            {
                return (state, Err(Status::WouldBlock));
            }
            if !state.active {
                return (state, Err(Status::Busy));
            }

            state = self.core.wait_dequeue(state);
            if !state.active {
                return (state, Err(Status::Busy));
            }
        }
    }
}
