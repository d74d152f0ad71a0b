//! ### English
//! Consumer-side defaults and negotiation knobs.
//!
//! ### 中文
//! 消费者侧默认值与协商参数。

use dpi::PhysicalSize;
use tracing::{debug, error};

use crate::queue::buffer::PixelFormat;
use crate::queue::status::{QueueResult, Status};
use crate::queue::window::NativeWindowTransform;

use super::BufferQueueConsumer;

impl BufferQueueConsumer {
    /// ### English
    /// Size used when the producer dequeues with `0 x 0`.
    ///
    /// ### 中文
    /// 生产者以 `0 x 0` dequeue 时使用的尺寸。
    pub fn set_default_buffer_size(&self, width: u32, height: u32) -> QueueResult<()> {
        if width == 0 || height == 0 {
            error!(width, height, "set_default_buffer_size: invalid size");
            return Err(Status::BadValue);
        }

        self.core.lock().default_size = PhysicalSize::new(width, height);
        Ok(())
    }

    pub fn set_default_buffer_format(&self, format: PixelFormat) -> QueueResult<()> {
        if format == PixelFormat::Unknown {
            return Err(Status::BadValue);
        }

        self.core.lock().default_format = format;
        Ok(())
    }

    /// ### English
    /// Buffer count used while the producer has not set one.
    ///
    /// ### 中文
    /// 生产者未设置时使用的缓冲区数量。
    pub fn set_default_max_buffer_count(&self, count: usize) -> QueueResult<()> {
        self.core.set_default_max_buffer_count(count)
    }

    /// ### English
    /// How many buffers the consumer may hold acquired at once (`1..=capacity - 2`).
    ///
    /// Rejected with `InvalidOperation` while a producer is connected.
    ///
    /// ### 中文
    /// 消费者可同时持有的已 acquire 缓冲区数量（`1..=容量 - 2`）。
    ///
    /// 生产者已连接时以 `InvalidOperation` 拒绝。
    pub fn set_max_acquired_buffer_count(&self, count: usize) -> QueueResult<()> {
        let mut state = self.core.lock();
        if count == 0 || count > state.slots.len().saturating_sub(2) {
            error!(count, "set_max_acquired_buffer_count: count out of range");
            return Err(Status::BadValue);
        }
        if let Some(api) = state.connected_api {
            error!(count, ?api, "set_max_acquired_buffer_count: producer already connected");
            return Err(Status::InvalidOperation);
        }

        state.max_acquired_buffer_count = count;
        debug!(count, "set_max_acquired_buffer_count");
        Ok(())
    }

    /// ### English
    /// Turns off the extra undequeued buffer reserved for async producers.
    ///
    /// ### 中文
    /// 关闭为异步生产者预留的额外未 dequeue 缓冲区。
    pub fn disable_async_buffer(&self) -> QueueResult<()> {
        let mut state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }
        if state.connected_api.is_some() {
            return Err(Status::InvalidOperation);
        }

        state.use_async_buffer = false;
        Ok(())
    }

    pub fn set_consumer_usage_bits(&self, usage: u32) -> QueueResult<()> {
        self.core.lock().consumer_usage_bits = usage;
        Ok(())
    }

    pub fn set_transform_hint(&self, hint: NativeWindowTransform) -> QueueResult<()> {
        self.core.lock().transform_hint = hint;
        Ok(())
    }
}
