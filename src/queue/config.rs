//! ### English
//! Construction-time configuration of a buffer queue.
//!
//! ### 中文
//! 缓冲区队列的构造期配置。

use dpi::PhysicalSize;

use super::buffer::PixelFormat;
use super::status::{QueueResult, Status};

/// ### English
/// Upper bound on the slot table size of any queue.
///
/// ### 中文
/// 任意队列槽位表大小的上限。
pub const NUM_BUFFER_SLOTS: usize = 64;

/// ### English
/// Initial negotiation state of a queue core.
///
/// ### 中文
/// 队列 core 的初始协商状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueConfig {
    /// ### English
    /// Slot table capacity (`1..=NUM_BUFFER_SLOTS`).
    ///
    /// ### 中文
    /// 槽位表容量（`1..=NUM_BUFFER_SLOTS`）。
    pub slot_count: usize,
    /// ### English
    /// Size used when a dequeue request passes `0x0`.
    ///
    /// ### 中文
    /// dequeue 请求传入 `0x0` 时使用的尺寸。
    pub default_size: PhysicalSize<u32>,
    /// ### English
    /// Format used when a dequeue request passes `PixelFormat::Unknown`.
    ///
    /// ### 中文
    /// dequeue 请求传入 `PixelFormat::Unknown` 时使用的格式。
    pub default_format: PixelFormat,
    pub default_max_buffer_count: usize,
    pub max_acquired_buffer_count: usize,
    /// ### English
    /// Whether async (non-blocking, droppable) buffering is allowed at all.
    ///
    /// ### 中文
    /// 是否允许异步（非阻塞、可丢弃）缓冲。
    pub use_async_buffer: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            slot_count: NUM_BUFFER_SLOTS,
            default_size: PhysicalSize::new(1, 1),
            default_format: PixelFormat::Rgba8888,
            default_max_buffer_count: 2,
            max_acquired_buffer_count: 1,
            use_async_buffer: true,
        }
    }
}

impl QueueConfig {
    /// ### English
    /// Rejects configurations the negotiation logic cannot honour.
    ///
    /// ### 中文
    /// 拒绝协商逻辑无法满足的配置。
    pub(crate) fn validate(&self) -> QueueResult<()> {
        let min_buffer_count = if self.use_async_buffer { 2 } else { 1 };
        if self.slot_count == 0 || self.slot_count > NUM_BUFFER_SLOTS {
            return Err(Status::BadValue);
        }
        if self.default_size.width == 0 || self.default_size.height == 0 {
            return Err(Status::BadValue);
        }
        if self.default_max_buffer_count < min_buffer_count
            || self.default_max_buffer_count > self.slot_count
        {
            return Err(Status::BadValue);
        }
        if self.max_acquired_buffer_count == 0 || self.max_acquired_buffer_count > self.slot_count {
            return Err(Status::BadValue);
        }
        Ok(())
    }
}
