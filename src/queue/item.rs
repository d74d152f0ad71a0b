//! ### English
//! Entry of the pending FIFO handed to the consumer.
//!
//! ### 中文
//! 交给消费者的待处理 FIFO 条目。

use std::sync::Arc;

use super::buffer::{Fence, GraphicBuffer, Rect};
use super::window::{NativeWindowScalingMode, NativeWindowTransform};

/// ### English
/// One queued buffer as seen by the consumer. Insertion order is presentation order.
///
/// ### 中文
/// 消费者看到的一个已入队缓冲区。插入顺序即呈现顺序。
#[derive(Clone, Debug, Default)]
pub struct BufferItem {
    pub slot: i32,
    /// ### English
    /// Buffer of the slot at queue time; `None` after acquire when the consumer already holds it.
    ///
    /// ### 中文
    /// 入队时槽位的缓冲区；若消费者已持有该缓冲区，acquire 后为 `None`。
    pub buffer: Option<Arc<GraphicBuffer>>,
    pub fence: Fence,
    pub crop: Rect,
    pub transform: NativeWindowTransform,
    pub transform_to_display_inverse: bool,
    pub scaling_mode: NativeWindowScalingMode,
    /// ### English
    /// Desired presentation time (nanoseconds) supplied by the producer.
    ///
    /// ### 中文
    /// 生产者提供的期望呈现时间（纳秒）。
    pub timestamp: i64,
    pub is_auto_timestamp: bool,
    pub frame_number: u64,
    /// ### English
    /// May be replaced by a newer buffer instead of being presented (async / non-blocking producer).
    ///
    /// ### 中文
    /// 可被更新的缓冲区替换而不呈现（异步 / 非阻塞生产者）。
    pub is_droppable: bool,
    pub acquire_called: bool,
}

impl BufferItem {
    pub(crate) fn buffer_handle(&self) -> Option<u64> {
        self.buffer.as_ref().map(|buffer| buffer.handle)
    }
}
