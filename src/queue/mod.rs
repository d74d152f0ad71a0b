//! ### English
//! Graphics buffer queue: a fixed table of buffer slots shared between one producer and one
//! consumer, with negotiated buffer counts, ordered listener delivery and a diagnostic history.
//!
//! ### 中文
//! 图形缓冲区队列：由一个生产者和一个消费者共享的定长缓冲区槽位表，支持缓冲区数量协商、
//! 有序的监听回调以及诊断历史。

pub mod buffer;
pub mod config;
pub mod consumer;
pub mod core;
pub mod history;
pub mod item;
pub mod listener;
pub mod producer;
mod sequencer;
pub mod slot;
pub mod status;
pub mod window;

pub use buffer::{Fence, GraphicBuffer, PixelFormat, Rect};
pub use config::{NUM_BUFFER_SLOTS, QueueConfig};
pub use consumer::BufferQueueConsumer;
pub use self::core::BufferQueueCore;
pub use history::{BUFFER_HISTORY_SIZE, BufferHistoryEntry};
pub use item::BufferItem;
pub use listener::{
    BufferAllocator, ChannelConsumerListener, ConsumerEvent, ConsumerListener, ProducerListener,
    WaitableEvent,
};
pub use producer::{BufferQueueProducer, DequeuedBuffer, QueueBufferInput, QueueBufferOutput};
pub use slot::{BufferSlot, BufferState};
pub use status::{QueueResult, Status, StatusFlags};
pub use window::{
    NativeWindowApi, NativeWindowAttribute, NativeWindowScalingMode, NativeWindowTransform,
};

/// ### English
/// Creates a queue core and returns its two ends.
///
/// ### 中文
/// 创建队列 core 并返回其两端。
pub fn create(config: QueueConfig) -> QueueResult<(BufferQueueProducer, BufferQueueConsumer)> {
    let core = BufferQueueCore::new(config)?;
    Ok((
        BufferQueueProducer::new(core.clone()),
        BufferQueueConsumer::new(core),
    ))
}
