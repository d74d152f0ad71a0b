//! ### English
//! Shared queue state owned jointly by the producer and consumer interfaces.
//!
//! A single mutex (the "core lock") guards the slot table, the pending FIFO, every negotiation
//! field and the abandon/active flags. Two condition variables hang off it:
//! - "dequeue possible": broadcast on any event that may free a slot or change the buffer count.
//! - "allocation finished": broadcast when an out-of-lock buffer allocation completes.
//!
//! ### 中文
//! 由生产者与消费者接口共同持有的队列共享状态。
//!
//! 单个互斥锁（“core 锁”）保护槽位表、待处理 FIFO、所有协商字段以及 abandon/active 标记。
//! 其上挂有两个条件变量：
//! - “可 dequeue”：任何可能释放槽位或改变缓冲区数量的事件都会广播。
//! - “分配完成”：锁外缓冲区分配完成时广播。

mod negotiation;
mod slots;

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use dpi::PhysicalSize;

use super::buffer::PixelFormat;
use super::config::QueueConfig;
use super::history::BufferHistory;
use super::item::BufferItem;
use super::listener::{BufferAllocator, ConsumerListener, ProducerListener, WaitableEvent};
use super::sequencer::CallbackSequencer;
use super::slot::{BufferSlot, BufferState};
use super::status::QueueResult;
use super::window::{NativeWindowApi, NativeWindowTransform};

/// ### English
/// Lock-protected fields of the queue core.
///
/// ### 中文
/// 队列 core 中受锁保护的字段。
pub(crate) struct CoreState {
    pub(crate) slots: Box<[BufferSlot]>,
    /// ### English
    /// Pending FIFO visible to the consumer (insertion order = presentation order).
    ///
    /// ### 中文
    /// 消费者可见的待处理 FIFO（插入顺序 = 呈现顺序）。
    pub(crate) queue: VecDeque<BufferItem>,
    pub(crate) default_size: PhysicalSize<u32>,
    pub(crate) default_format: PixelFormat,
    pub(crate) default_max_buffer_count: usize,
    /// ### English
    /// Explicitly negotiated buffer count; `0` means unset.
    ///
    /// ### 中文
    /// 显式协商的缓冲区数量；`0` 表示未设置。
    pub(crate) override_max_buffer_count: usize,
    pub(crate) max_acquired_buffer_count: usize,
    /// ### English
    /// Buffer count seen by the previous free-slot search (slots above a shrunk count get freed).
    ///
    /// ### 中文
    /// 上一次空闲槽位搜索看到的缓冲区数量（数量缩小后，超出部分的槽位会被释放）。
    pub(crate) max_buffer_count_cached: usize,
    pub(crate) use_async_buffer: bool,
    pub(crate) dequeue_buffer_cannot_block: bool,
    pub(crate) consumer_controlled_by_app: bool,
    pub(crate) consumer_usage_bits: u32,
    pub(crate) transform_hint: NativeWindowTransform,
    pub(crate) sticky_transform: u32,
    pub(crate) frame_counter: u64,
    pub(crate) buffer_has_been_queued: bool,
    pub(crate) connected_api: Option<NativeWindowApi>,
    /// ### English
    /// Terminal flag: once set, every operation fails with `NoInit`.
    ///
    /// ### 中文
    /// 终止标记：一旦设置，所有操作都以 `NoInit` 失败。
    pub(crate) is_abandoned: bool,
    /// ### English
    /// Cleared on shutdown; blocking waits give up instead of sleeping.
    ///
    /// ### 中文
    /// 关闭时清除；阻塞等待将放弃而不是休眠。
    pub(crate) active: bool,
    /// ### English
    /// Out-of-lock allocations still running; slot-freeing operations wait for zero.
    ///
    /// ### 中文
    /// 仍在进行的锁外分配数量；会释放槽位的操作需等待其归零。
    pub(crate) allocations_in_flight: usize,
    pub(crate) history: BufferHistory,
    pub(crate) consumer_listener: Option<Arc<dyn ConsumerListener>>,
    pub(crate) producer_listener: Option<Arc<dyn ProducerListener>>,
    pub(crate) allocator: Option<Arc<dyn BufferAllocator>>,
    pub(crate) buffer_free_event: Option<Arc<dyn WaitableEvent>>,
}

/// ### English
/// Queue core shared by one producer/consumer pair.
///
/// ### 中文
/// 由一对生产者/消费者共享的队列 core。
pub struct BufferQueueCore {
    state: Mutex<CoreState>,
    dequeue_condition: Condvar,
    allocation_condition: Condvar,
    /// ### English
    /// Orders listener callbacks of concurrent `queue_buffer` calls (independent of the core lock).
    ///
    /// ### 中文
    /// 对并发 `queue_buffer` 调用的监听回调排序（独立于 core 锁）。
    pub(crate) callbacks: CallbackSequencer,
    epoch: Instant,
}

impl BufferQueueCore {
    /// ### English
    /// Creates a core with every slot empty and `Free`.
    ///
    /// Fails with `BadValue` when `config` is inconsistent.
    ///
    /// ### 中文
    /// 创建所有槽位为空且处于 `Free` 的 core。
    ///
    /// `config` 不一致时返回 `BadValue`。
    pub fn new(config: QueueConfig) -> QueueResult<Arc<Self>> {
        config.validate()?;

        let state = CoreState {
            slots: vec![BufferSlot::default(); config.slot_count].into_boxed_slice(),
            queue: VecDeque::with_capacity(config.slot_count),
            default_size: config.default_size,
            default_format: config.default_format,
            default_max_buffer_count: config.default_max_buffer_count,
            override_max_buffer_count: 0,
            max_acquired_buffer_count: config.max_acquired_buffer_count,
            max_buffer_count_cached: 0,
            use_async_buffer: config.use_async_buffer,
            dequeue_buffer_cannot_block: false,
            consumer_controlled_by_app: false,
            consumer_usage_bits: 0,
            transform_hint: NativeWindowTransform::empty(),
            sticky_transform: 0,
            frame_counter: 0,
            buffer_has_been_queued: false,
            connected_api: None,
            is_abandoned: false,
            active: true,
            allocations_in_flight: 0,
            history: BufferHistory::default(),
            consumer_listener: None,
            producer_listener: None,
            allocator: None,
            buffer_free_event: None,
        };

        Ok(Arc::new(Self {
            state: Mutex::new(state),
            dequeue_condition: Condvar::new(),
            allocation_condition: Condvar::new(),
            callbacks: CallbackSequencer::default(),
            epoch: Instant::now(),
        }))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, CoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// ### English
    /// Blocks on "dequeue possible", releasing the core lock while asleep.
    ///
    /// ### 中文
    /// 在“可 dequeue”条件上阻塞，休眠期间释放 core 锁。
    pub(crate) fn wait_dequeue<'a>(
        &self,
        guard: MutexGuard<'a, CoreState>,
    ) -> MutexGuard<'a, CoreState> {
        self.dequeue_condition
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn signal_dequeue(&self) {
        self.dequeue_condition.notify_all();
    }

    /// ### English
    /// Waits until no out-of-lock allocation is in flight.
    ///
    /// ### 中文
    /// 等待直到没有正在进行的锁外分配。
    pub(crate) fn wait_while_allocating<'a>(
        &self,
        mut guard: MutexGuard<'a, CoreState>,
    ) -> MutexGuard<'a, CoreState> {
        while guard.allocations_in_flight > 0 {
            guard = self
                .allocation_condition
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
        guard
    }

    pub(crate) fn signal_allocation_finished(&self) {
        self.allocation_condition.notify_all();
    }

    /// ### English
    /// Monotonic nanoseconds since the core was created (used for queue timestamps).
    ///
    /// ### 中文
    /// 自 core 创建以来的单调纳秒数（用于入队时间戳）。
    pub(crate) fn now_nanos(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// ### English
    /// Installs the allocator used when a dequeued slot needs a new buffer.
    ///
    /// ### 中文
    /// 安装 dequeue 槽位需要新缓冲区时使用的分配器。
    pub fn set_allocator(&self, allocator: Option<Arc<dyn BufferAllocator>>) {
        self.lock().allocator = allocator;
    }

    /// ### English
    /// Installs the event signalled whenever a slot becomes free.
    ///
    /// ### 中文
    /// 安装每当槽位变为空闲时发出信号的事件。
    pub fn set_buffer_free_event(&self, event: Option<Arc<dyn WaitableEvent>>) {
        self.lock().buffer_free_event = event;
    }

    pub fn slot_count(&self) -> usize {
        self.lock().slots.len()
    }

    /// ### English
    /// Snapshot of one slot's state; `None` for an out-of-range index.
    ///
    /// ### 中文
    /// 单个槽位状态的快照；索引越界时返回 `None`。
    pub fn slot_state(&self, slot: usize) -> Option<BufferState> {
        self.lock().slots.get(slot).map(|slot| slot.state)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn frame_counter(&self) -> u64 {
        self.lock().frame_counter
    }

    pub fn override_max_buffer_count(&self) -> usize {
        self.lock().override_max_buffer_count
    }

    /// ### English
    /// Current negotiated buffer count (see `CoreState::max_buffer_count`).
    ///
    /// ### 中文
    /// 当前协商的缓冲区数量（参见 `CoreState::max_buffer_count`）。
    pub fn max_buffer_count(&self, is_async: bool) -> usize {
        self.lock().max_buffer_count(is_async)
    }

    pub fn min_undequeued_buffer_count(&self, is_async: bool) -> usize {
        self.lock().min_undequeued_buffer_count(is_async)
    }

    pub fn is_abandoned(&self) -> bool {
        self.lock().is_abandoned
    }
}
