//! ### English
//! Status codes returned by producer/consumer operations.
//!
//! Errors are plain return values (never panics) so the transaction layer can forward them across
//! a process boundary as a single `i32`. Numeric values follow the windowing protocol (negative
//! errno values for failures, small positive values for consumer-side outcomes and success flags).
//!
//! ### 中文
//! 生产者/消费者操作返回的状态码。
//!
//! 错误以普通返回值表示（从不 panic），事务层可以将其作为单个 `i32` 跨进程转发。
//! 数值与窗口协议一致（失败为负的 errno，消费者侧结果与成功标志为小的正数）。

use bitflags::bitflags;
use thiserror::Error;

/// ### English
/// Failure status of a queue operation.
///
/// ### 中文
/// 队列操作的失败状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Status {
    /// ### English
    /// Caller protocol violation (bad slot index, wrong ownership, invalid argument).
    ///
    /// ### 中文
    /// 调用方违反协议（槽位索引错误、所有权不符、参数非法）。
    #[error("bad value")]
    BadValue,
    /// ### English
    /// The queue is abandoned or not connected; terminal for the abandoned case.
    ///
    /// ### 中文
    /// 队列已被放弃或尚未连接；放弃状态不可恢复。
    #[error("no init")]
    NoInit,
    /// ### English
    /// The queue cannot wait for a slot (it is shutting down).
    ///
    /// ### 中文
    /// 队列无法等待槽位（正在关闭）。
    #[error("busy")]
    Busy,
    /// ### English
    /// No buffer could be provided for the slot.
    ///
    /// ### 中文
    /// 无法为该槽位提供缓冲区。
    #[error("no memory")]
    NoMemory,
    /// ### English
    /// The call is not valid in the current negotiation state.
    ///
    /// ### 中文
    /// 在当前协商状态下该调用无效。
    #[error("invalid operation")]
    InvalidOperation,
    /// ### English
    /// No slot is available and the caller may not block; retry after a wake signal.
    ///
    /// ### 中文
    /// 没有可用槽位且调用方不允许阻塞；收到唤醒信号后重试。
    #[error("would block")]
    WouldBlock,
    /// ### English
    /// Consumer released a slot whose frame number no longer matches.
    ///
    /// ### 中文
    /// 消费者释放的槽位帧号已不匹配。
    #[error("stale buffer slot")]
    StaleBufferSlot,
    /// ### English
    /// Consumer tried to acquire from an empty queue.
    ///
    /// ### 中文
    /// 消费者尝试从空队列 acquire。
    #[error("no buffer available")]
    NoBufferAvailable,
    /// ### English
    /// The head buffer is scheduled for a later presentation time.
    ///
    /// ### 中文
    /// 队首缓冲区计划在更晚的时间呈现。
    #[error("present later")]
    PresentLater,
}

impl Status {
    /// ### English
    /// Protocol code for this status.
    ///
    /// ### 中文
    /// 该状态对应的协议码。
    pub const fn code(self) -> i32 {
        match self {
            Status::BadValue => -22,
            Status::NoInit => -19,
            Status::Busy => -16,
            Status::NoMemory => -12,
            Status::InvalidOperation => -38,
            Status::WouldBlock => -11,
            Status::StaleBufferSlot => 1,
            Status::NoBufferAvailable => 2,
            Status::PresentLater => 3,
        }
    }

    /// ### English
    /// Maps a negative producer-side protocol code back to a status.
    ///
    /// Positive codes are ambiguous on the wire (they double as success flags) and are not decoded.
    ///
    /// ### 中文
    /// 将生产者侧的负协议码映射回状态。
    ///
    /// 正数协议码在线路上有歧义（同时用作成功标志），因此不解码。
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -22 => Some(Status::BadValue),
            -19 => Some(Status::NoInit),
            -16 => Some(Status::Busy),
            -12 => Some(Status::NoMemory),
            -38 => Some(Status::InvalidOperation),
            -11 => Some(Status::WouldBlock),
            _ => None,
        }
    }
}

bitflags! {
    /// ### English
    /// Flags combinable with success, reported by dequeue/attach.
    ///
    /// ### 中文
    /// 可与成功结果组合的标志，由 dequeue/attach 返回。
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StatusFlags: i32 {
        /// ### English
        /// The producer must call `request_buffer` again for this slot.
        ///
        /// ### 中文
        /// 生产者必须为该槽位重新调用 `request_buffer`。
        const BUFFER_NEEDS_REALLOCATION = 1 << 0;
        /// ### English
        /// Slots above the negotiated count were freed; cached handles are stale.
        ///
        /// ### 中文
        /// 超出协商数量的槽位已被释放；缓存的句柄已失效。
        const RELEASE_ALL_BUFFERS = 1 << 1;
    }
}

/// ### English
/// Result type used throughout the queue.
///
/// ### 中文
/// 队列内部统一使用的结果类型。
pub type QueueResult<T> = Result<T, Status>;

/// ### English
/// Flattens a result into its protocol code (`0` or flag bits on success).
///
/// ### 中文
/// 将结果展平为协议码（成功时为 `0` 或标志位）。
pub fn status_code(result: QueueResult<StatusFlags>) -> i32 {
    match result {
        Ok(flags) => flags.bits(),
        Err(status) => status.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_codes_round_trip() {
        for status in [
            Status::BadValue,
            Status::NoInit,
            Status::Busy,
            Status::NoMemory,
            Status::InvalidOperation,
            Status::WouldBlock,
        ] {
            assert!(status.code() < 0);
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
        assert_eq!(Status::from_code(0), None);
    }

    #[test]
    fn success_flags_combine() {
        let flags = StatusFlags::BUFFER_NEEDS_REALLOCATION | StatusFlags::RELEASE_ALL_BUFFERS;
        assert_eq!(status_code(Ok(flags)), 3);
        assert_eq!(status_code(Ok(StatusFlags::empty())), 0);
        assert_eq!(status_code(Err(Status::WouldBlock)), -11);
    }
}
