//! ### English
//! One entry of the slot table and its lifecycle state.
//!
//! ### 中文
//! 槽位表中的单个条目及其生命周期状态。

use std::sync::Arc;

use super::buffer::{Fence, GraphicBuffer};

/// ### English
/// Lifecycle state of a slot.
///
/// `Free -> Dequeued` (producer owns) `-> Queued` (in the pending FIFO) `-> Acquired` (consumer
/// owns) `-> Free`. Cancel, detach and replacement return a slot straight to `Free`.
///
/// ### 中文
/// 槽位的生命周期状态。
///
/// `Free -> Dequeued`（生产者持有）`-> Queued`（位于待处理 FIFO）`-> Acquired`（消费者持有）
/// `-> Free`。cancel、detach 与替换会直接把槽位退回 `Free`。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BufferState {
    #[default]
    Free,
    Dequeued,
    Queued,
    Acquired,
}

/// ### English
/// Per-slot bookkeeping, guarded by the core lock.
///
/// ### 中文
/// 每个槽位的簿记信息，由 core 锁保护。
#[derive(Clone, Debug, Default)]
pub struct BufferSlot {
    /// ### English
    /// Buffer bound to this slot; kept across Free/Dequeued cycles to avoid reallocation.
    ///
    /// ### 中文
    /// 绑定到该槽位的缓冲区；在 Free/Dequeued 之间保留以避免重新分配。
    pub buffer: Option<Arc<GraphicBuffer>>,
    pub state: BufferState,
    /// ### English
    /// The producer fetched the current buffer via `request_buffer`.
    ///
    /// ### 中文
    /// 生产者已通过 `request_buffer` 获取当前缓冲区。
    pub request_buffer_called: bool,
    /// ### English
    /// The consumer has seen this buffer at least once (it may be elided from later items).
    ///
    /// ### 中文
    /// 消费者至少见过该缓冲区一次（后续队列项可省略缓冲区）。
    pub acquire_called: bool,
    pub attached_by_consumer: bool,
    /// ### English
    /// Frame number stamped on queue; `0` once the slot is freed or cancelled.
    ///
    /// ### 中文
    /// 入队时写入的帧号；槽位被释放或取消后为 `0`。
    pub frame_number: u64,
    pub fence: Fence,
    /// ### English
    /// Buffer was bound via `set_preallocated_buffer` and may not be replaced by negotiation.
    ///
    /// ### 中文
    /// 缓冲区通过 `set_preallocated_buffer` 绑定，协商逻辑不得替换。
    pub is_preallocated: bool,
    /// ### English
    /// Slot was freed while acquired; the consumer's next release is stale.
    ///
    /// ### 中文
    /// 槽位在被 acquire 时遭到释放；消费者下一次 release 将视为过期。
    pub needs_cleanup_on_release: bool,
    pub queue_time: u64,
    pub presentation_time: i64,
}

impl BufferSlot {
    /// ### English
    /// Handle of the bound buffer, if any.
    ///
    /// ### 中文
    /// 已绑定缓冲区的句柄（若有）。
    pub fn buffer_handle(&self) -> Option<u64> {
        self.buffer.as_ref().map(|buffer| buffer.handle)
    }
}
