//! ### English
//! `queue_buffer`: submits a filled slot to the consumer.
//!
//! ### 中文
//! `queue_buffer`：将已填充的槽位提交给消费者。

use tracing::{debug, error};

use crate::queue::history::BufferHistoryEntry;
use crate::queue::item::BufferItem;
use crate::queue::slot::BufferState;
use crate::queue::status::{QueueResult, Status};
use crate::queue::window::{NativeWindowScalingMode, NativeWindowTransform};

use super::{BufferQueueProducer, QueueBufferInput, QueueBufferOutput};

/// ### English
/// Which consumer callback a queue operation produced.
///
/// ### 中文
/// 入队操作产生的消费者回调类型。
enum FrameNotification {
    Available,
    Replaced,
}

impl BufferQueueProducer {
    /// ### English
    /// Queues a dequeued slot for presentation.
    ///
    /// If the head of the pending FIFO is droppable and still tracked, it is replaced in place
    /// (its slot returns to `Free`) and `on_frame_replaced` fires; otherwise the item is appended
    /// and `on_frame_available` fires. Listener calls happen outside the core lock, in the order
    /// the queue operations mutated the core.
    ///
    /// #### Parameters
    /// - `slot`: Slot previously returned by `dequeue_buffer` or `attach_buffer`.
    /// - `input`: Per-frame parameters.
    ///
    /// ### 中文
    /// 将已 dequeue 的槽位入队等待呈现。
    ///
    /// 若待处理 FIFO 的队首可丢弃且仍被跟踪，则原地替换（其槽位退回 `Free`）并触发
    /// `on_frame_replaced`；否则追加该项并触发 `on_frame_available`。监听回调在 core 锁之外、
    /// 按入队操作修改 core 的顺序执行。
    ///
    /// #### 参数
    /// - `slot`：之前由 `dequeue_buffer` 或 `attach_buffer` 返回的槽位。
    /// - `input`：逐帧参数。
    pub fn queue_buffer(&self, slot: i32, input: &QueueBufferInput) -> QueueResult<QueueBufferOutput> {
        let Ok(scaling_mode) = NativeWindowScalingMode::try_from(input.scaling_mode) else {
            error!(scaling_mode = input.scaling_mode, "queue_buffer: unknown scaling mode");
            return Err(Status::BadValue);
        };

        let mut state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let max_buffer_count = state.max_buffer_count(input.is_async);
        if input.is_async
            && state.override_max_buffer_count != 0
            && state.override_max_buffer_count < state.min_max_buffer_count(input.is_async)
        {
            error!("queue_buffer: async mode is invalid with the negotiated buffer count");
            return Err(Status::BadValue);
        }

        let Some(index) = state.slot_index(slot, max_buffer_count) else {
            error!(slot, max_buffer_count, "queue_buffer: slot index out of range");
            return Err(Status::BadValue);
        };
        if state.slots[index].state != BufferState::Dequeued {
            error!(slot, state = ?state.slots[index].state, "queue_buffer: slot is not owned by the producer");
            return Err(Status::BadValue);
        }
        if !state.slots[index].request_buffer_called {
            error!(slot, "queue_buffer: slot was queued without requesting a buffer");
            return Err(Status::BadValue);
        }
        let Some(buffer) = state.slots[index].buffer.clone() else {
            error!(slot, "queue_buffer: slot has no buffer");
            return Err(Status::BadValue);
        };

        let crop = input.crop;
        if crop.intersect(&buffer.bounds()) != crop {
            error!(?crop, bounds = ?buffer.bounds(), "queue_buffer: crop rect is not contained in the buffer");
            return Err(Status::BadValue);
        }

        let queue_time = self.core.now_nanos();
        state.frame_counter += 1;
        let frame_number = state.frame_counter;
        let acquire_called = {
            let slot_state = &mut state.slots[index];
            slot_state.fence = input.fence;
            slot_state.state = BufferState::Queued;
            slot_state.frame_number = frame_number;
            slot_state.queue_time = queue_time;
            slot_state.presentation_time = input.timestamp;
            slot_state.acquire_called
        };

        let item = BufferItem {
            slot,
            buffer: Some(buffer),
            fence: input.fence,
            crop,
            transform: input.transform & !NativeWindowTransform::INVERSE_DISPLAY,
            transform_to_display_inverse: input
                .transform
                .contains(NativeWindowTransform::INVERSE_DISPLAY),
            scaling_mode,
            timestamp: input.timestamp,
            is_auto_timestamp: input.is_auto_timestamp,
            frame_number,
            is_droppable: state.dequeue_buffer_cannot_block || input.is_async,
            acquire_called,
        };

        state.sticky_transform = input.sticky_transform;
        state.history.push(BufferHistoryEntry {
            frame_number,
            queue_time,
            presentation_time: input.timestamp,
            state: BufferState::Queued,
        });

        let head_replaceable = state
            .queue
            .front()
            .is_some_and(|head| head.is_droppable && state.still_tracking(head));
        let notification = if head_replaceable {
            if let Some(head_slot) = state
                .queue
                .front()
                .and_then(|head| usize::try_from(head.slot).ok())
            {
                let head = &mut state.slots[head_slot];
                head.state = BufferState::Free;
                head.frame_number = 0;
                state.signal_buffer_free();
            }
            if let Some(head) = state.queue.front_mut() {
                *head = item.clone();
            }
            FrameNotification::Replaced
        } else {
            state.queue.push_back(item.clone());
            FrameNotification::Available
        };

        state.buffer_has_been_queued = true;
        self.core.signal_dequeue();

        let output = QueueBufferOutput {
            width: state.default_size.width,
            height: state.default_size.height,
            transform_hint: state.transform_hint,
            num_pending_buffers: state.queue.len() as u32,
            frame_number: input.want_frame_number.then_some(frame_number),
        };

        let listener = state.consumer_listener.clone();
        let ticket = self.core.callbacks.draw();
        drop(state);

        debug!(slot, frame_number, pending = output.num_pending_buffers, "queue_buffer");

        self.core.callbacks.run_in_turn(ticket, || {
            if let Some(listener) = listener {
                match notification {
                    FrameNotification::Available => listener.on_frame_available(&item),
                    FrameNotification::Replaced => listener.on_frame_replaced(&item),
                }
            }
        });

        Ok(output)
    }
}
