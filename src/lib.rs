//! ### English
//! `gfx_buffer_queue` crate root.
//! The producer/consumer buffer queue lives under `queue`; the id-based transaction registry that
//! exposes producers to remote callers lives under `binder`.
//!
//! ### 中文
//! `gfx_buffer_queue` 的 crate 根。
//! 生产者/消费者缓冲区队列位于 `queue` 模块；向远端调用方暴露生产者的、基于 id 的事务注册表
//! 位于 `binder` 模块。

pub mod binder;
pub mod queue;

pub use binder::{Binder, BinderContext, Parcel};
pub use queue::{
    BufferQueueConsumer, BufferQueueCore, BufferQueueProducer, QueueConfig, Status, create,
};
