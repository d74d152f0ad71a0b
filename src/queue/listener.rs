//! ### English
//! Callback interfaces the queue invokes, plus the external collaborators it may be given
//! (allocator, buffer-free event).
//!
//! Listeners are never called while the core lock is held, so an implementation may call back
//! into the producer or consumer.
//!
//! ### 中文
//! 队列调用的回调接口，以及可注入的外部协作者（分配器、缓冲区空闲事件）。
//!
//! 持有 core 锁时绝不调用监听器，因此实现可以回调生产者或消费者。

use std::sync::Arc;

use crossbeam_channel as channel;
use dpi::PhysicalSize;

use super::buffer::{GraphicBuffer, PixelFormat};
use super::item::BufferItem;
use super::status::QueueResult;

/// ### English
/// Implemented by the compositor (consumer side).
///
/// ### 中文
/// 由合成器（消费者侧）实现。
pub trait ConsumerListener: Send + Sync {
    /// ### English
    /// A new item was appended to the pending FIFO.
    ///
    /// ### 中文
    /// 新的队列项被追加到待处理 FIFO。
    fn on_frame_available(&self, item: &BufferItem);

    /// ### English
    /// The droppable head item was replaced in place by `item`.
    ///
    /// ### 中文
    /// 可丢弃的队首项被 `item` 原地替换。
    fn on_frame_replaced(&self, item: &BufferItem);

    /// ### English
    /// All buffer references were dropped (disconnect / buffer-count change).
    ///
    /// ### 中文
    /// 所有缓冲区引用均已释放（断开连接 / 缓冲区数量变更）。
    fn on_buffers_released(&self);
}

/// ### English
/// Implemented by the rendering client (producer side).
///
/// ### 中文
/// 由渲染客户端（生产者侧）实现。
pub trait ProducerListener: Send + Sync {
    fn on_buffer_released(&self);
}

/// ### English
/// Allocates buffers for slots that need (re)allocation during dequeue.
///
/// Called without the core lock held; other dequeuers wait on "allocation finished".
///
/// ### 中文
/// 在 dequeue 期间为需要（重新）分配的槽位分配缓冲区。
///
/// 调用时不持有 core 锁；其它 dequeue 调用方会等待“分配完成”条件。
pub trait BufferAllocator: Send + Sync {
    fn allocate(
        &self,
        size: PhysicalSize<u32>,
        format: PixelFormat,
        usage: u32,
    ) -> QueueResult<Arc<GraphicBuffer>>;
}

/// ### English
/// A waitable event owned by the emulated kernel; signalled whenever a slot becomes free.
///
/// ### 中文
/// 由模拟内核持有的可等待事件；每当有槽位变为空闲时发出信号。
pub trait WaitableEvent: Send + Sync {
    fn signal(&self);
}

/// ### English
/// Consumer listener callback, as delivered through a channel.
///
/// ### 中文
/// 通过通道投递的消费者监听回调。
#[derive(Clone, Debug)]
pub enum ConsumerEvent {
    FrameAvailable(BufferItem),
    FrameReplaced(BufferItem),
    BuffersReleased,
}

/// ### English
/// `ConsumerListener` that forwards every callback into a channel drained by a compositor thread.
///
/// Sends never block (unbounded channel); a dropped receiver silently discards events.
///
/// ### 中文
/// 将每个回调转发到通道中的 `ConsumerListener`，由合成器线程消费。
///
/// 发送从不阻塞（无界通道）；接收端被丢弃后事件会被静默丢弃。
pub struct ChannelConsumerListener {
    events_tx: channel::Sender<ConsumerEvent>,
}

impl ChannelConsumerListener {
    /// ### English
    /// Creates a listener and the receiver that observes its events.
    ///
    /// ### 中文
    /// 创建监听器及用于观察其事件的接收端。
    pub fn new() -> (Arc<Self>, channel::Receiver<ConsumerEvent>) {
        let (events_tx, events_rx) = channel::unbounded();
        (Arc::new(Self { events_tx }), events_rx)
    }

    fn send(&self, event: ConsumerEvent) {
        let _ = self.events_tx.send(event);
    }
}

impl ConsumerListener for ChannelConsumerListener {
    fn on_frame_available(&self, item: &BufferItem) {
        self.send(ConsumerEvent::FrameAvailable(item.clone()));
    }

    fn on_frame_replaced(&self, item: &BufferItem) {
        self.send(ConsumerEvent::FrameReplaced(item.clone()));
    }

    fn on_buffers_released(&self) {
        self.send(ConsumerEvent::BuffersReleased);
    }
}
