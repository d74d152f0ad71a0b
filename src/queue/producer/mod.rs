//! ### English
//! Producer interface: the operations a rendering client calls on a queue core.
//!
//! Every operation takes the core lock for its state-mutating section and drops it before
//! invoking any listener. An abandoned core rejects every operation with `NoInit`
//! (`cancel_buffer` swallows it).
//!
//! ### 中文
//! 生产者接口：渲染客户端对队列 core 调用的操作。
//!
//! 每个操作在修改状态的区段内持有 core 锁，并在调用任何监听器之前释放。
//! 已放弃的 core 对所有操作返回 `NoInit`（`cancel_buffer` 会吞掉该错误）。

mod attach;
mod buffer_count;
mod cancel;
mod connect;
mod dequeue;
mod query;
mod queue;

use std::sync::Arc;

use super::buffer::{Fence, Rect};
use super::core::BufferQueueCore;
use super::status::StatusFlags;
use super::window::NativeWindowTransform;

/// ### English
/// Per-frame parameters supplied with `queue_buffer`.
///
/// ### 中文
/// 随 `queue_buffer` 提供的逐帧参数。
#[derive(Clone, Copy, Debug, Default)]
pub struct QueueBufferInput {
    /// ### English
    /// Desired presentation time in nanoseconds.
    ///
    /// ### 中文
    /// 期望的呈现时间（纳秒）。
    pub timestamp: i64,
    pub is_auto_timestamp: bool,
    /// ### English
    /// Crop rectangle; must already lie within the buffer bounds. Empty means "whole buffer".
    ///
    /// ### 中文
    /// 裁剪矩形；必须已位于缓冲区边界之内。为空表示“整个缓冲区”。
    pub crop: Rect,
    /// ### English
    /// Raw scaling mode, validated against `NativeWindowScalingMode`.
    ///
    /// ### 中文
    /// 原始缩放模式，按 `NativeWindowScalingMode` 校验。
    pub scaling_mode: u32,
    pub transform: NativeWindowTransform,
    pub sticky_transform: u32,
    pub is_async: bool,
    pub swap_interval: i32,
    pub fence: Fence,
    /// ### English
    /// Report the assigned frame number in the output.
    ///
    /// ### 中文
    /// 在输出中报告分配的帧号。
    pub want_frame_number: bool,
}

/// ### English
/// Consumer-side view returned by `connect` and `queue_buffer`.
///
/// ### 中文
/// 由 `connect` 与 `queue_buffer` 返回的消费者侧视图。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueBufferOutput {
    pub width: u32,
    pub height: u32,
    pub transform_hint: NativeWindowTransform,
    pub num_pending_buffers: u32,
    pub frame_number: Option<u64>,
}

/// ### English
/// Successful `dequeue_buffer` result.
///
/// ### 中文
/// `dequeue_buffer` 的成功结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DequeuedBuffer {
    pub slot: i32,
    /// ### English
    /// Fence left by the previous user of the slot; the caller now owns waiting on it.
    ///
    /// ### 中文
    /// 槽位上一个使用者留下的 fence；现在由调用方负责等待。
    pub fence: Fence,
    pub flags: StatusFlags,
}

/// ### English
/// Producer end of a buffer queue.
///
/// ### 中文
/// 缓冲区队列的生产者端。
#[derive(Clone)]
pub struct BufferQueueProducer {
    core: Arc<BufferQueueCore>,
}

impl BufferQueueProducer {
    pub fn new(core: Arc<BufferQueueCore>) -> Self {
        Self { core }
    }

    pub fn core(&self) -> &Arc<BufferQueueCore> {
        &self.core
    }
}
