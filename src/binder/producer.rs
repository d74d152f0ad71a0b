//! ### English
//! Transaction surface of the producer interface.
//!
//! Each method reads its arguments from the data parcel in order and writes its results to the
//! reply, always followed by an `i32` status code (`0` or flag bits on success, a negative code
//! on failure). A malformed argument list is answered with `BadValue` alone.
//!
//! ### 中文
//! 生产者接口的事务入口。
//!
//! 每个方法按顺序从 data parcel 读取参数，并将结果写入回复，结果之后总是跟随一个 `i32`
//! 状态码（成功时为 `0` 或标志位，失败时为负码）。参数列表格式错误时仅回复 `BadValue`。

use tracing::warn;

use crate::queue::buffer::{Fence, PixelFormat};
use crate::queue::producer::{BufferQueueProducer, QueueBufferOutput};
use crate::queue::status::{QueueResult, Status};
use crate::queue::window::NativeWindowApi;

use super::{Binder, Parcel};

pub const PRODUCER_INTERFACE_DESCRIPTOR: &str = "android.gui.IGraphicBufferProducer";

/// ### English
/// Producer method codes.
///
/// ### 中文
/// 生产者方法码。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TransactionCode {
    RequestBuffer = 1,
    SetBufferCount = 2,
    DequeueBuffer = 3,
    DetachBuffer = 4,
    DetachNextBuffer = 5,
    AttachBuffer = 6,
    QueueBuffer = 7,
    CancelBuffer = 8,
    Query = 9,
    Connect = 10,
    Disconnect = 11,
    SetPreallocatedBuffer = 14,
    GetBufferHistory = 17,
}

impl TryFrom<u32> for TransactionCode {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TransactionCode::RequestBuffer),
            2 => Ok(TransactionCode::SetBufferCount),
            3 => Ok(TransactionCode::DequeueBuffer),
            4 => Ok(TransactionCode::DetachBuffer),
            5 => Ok(TransactionCode::DetachNextBuffer),
            6 => Ok(TransactionCode::AttachBuffer),
            7 => Ok(TransactionCode::QueueBuffer),
            8 => Ok(TransactionCode::CancelBuffer),
            9 => Ok(TransactionCode::Query),
            10 => Ok(TransactionCode::Connect),
            11 => Ok(TransactionCode::Disconnect),
            14 => Ok(TransactionCode::SetPreallocatedBuffer),
            17 => Ok(TransactionCode::GetBufferHistory),
            _ => Err(()),
        }
    }
}

fn read_count(data: &mut Parcel) -> QueueResult<usize> {
    usize::try_from(data.read_i32()?).map_err(|_| Status::BadValue)
}

fn read_api(data: &mut Parcel) -> QueueResult<NativeWindowApi> {
    NativeWindowApi::try_from(data.read_i32()?).map_err(|_| Status::BadValue)
}

fn code_of(result: QueueResult<()>) -> i32 {
    result.map_or_else(Status::code, |()| 0)
}

impl BufferQueueProducer {
    /// ### English
    /// Runs one decoded method. `Err` means the arguments could not be read; the returned `Ok`
    /// value is the status code to append to the reply.
    ///
    /// ### 中文
    /// 执行一个已解码的方法。`Err` 表示参数无法读取；返回的 `Ok` 值是要追加到回复的状态码。
    fn on_transact(
        &self,
        code: TransactionCode,
        data: &mut Parcel,
        reply: &mut Parcel,
    ) -> QueueResult<i32> {
        let status = match code {
            TransactionCode::RequestBuffer => {
                let slot = data.read_i32()?;
                match self.request_buffer(slot) {
                    Ok(buffer) => {
                        reply.write_buffer(buffer);
                        0
                    }
                    Err(status) => {
                        reply.write_buffer(None);
                        status.code()
                    }
                }
            }
            TransactionCode::SetBufferCount => {
                let count = read_count(data)?;
                code_of(self.set_buffer_count(count))
            }
            TransactionCode::DequeueBuffer => {
                let is_async = data.read_bool()?;
                let width = data.read_u32()?;
                let height = data.read_u32()?;
                let format = PixelFormat::from_raw(data.read_i32()?);
                let usage = data.read_u32()?;
                match self.dequeue_buffer(is_async, width, height, format, usage) {
                    Ok(dequeued) => {
                        reply.write_i32(dequeued.slot);
                        reply.write_fence(dequeued.fence);
                        dequeued.flags.bits()
                    }
                    Err(status) => {
                        reply.write_i32(-1);
                        reply.write_fence(Fence::NO_FENCE);
                        status.code()
                    }
                }
            }
            TransactionCode::DetachBuffer => {
                let slot = data.read_i32()?;
                code_of(self.detach_buffer(slot))
            }
            TransactionCode::DetachNextBuffer => match self.detach_next_buffer() {
                Ok((buffer, fence)) => {
                    reply.write_buffer(Some(buffer));
                    reply.write_fence(fence);
                    0
                }
                Err(status) => {
                    reply.write_buffer(None);
                    reply.write_fence(Fence::NO_FENCE);
                    status.code()
                }
            },
            TransactionCode::AttachBuffer => {
                let buffer = data.read_buffer()?.ok_or(Status::BadValue)?;
                match self.attach_buffer(buffer) {
                    Ok((slot, flags)) => {
                        reply.write_i32(slot);
                        flags.bits()
                    }
                    Err(status) => {
                        reply.write_i32(-1);
                        status.code()
                    }
                }
            }
            TransactionCode::QueueBuffer => {
                let slot = data.read_i32()?;
                let input = data.read_queue_buffer_input()?;
                match self.queue_buffer(slot, &input) {
                    Ok(output) => {
                        reply.write_queue_buffer_output(output);
                        0
                    }
                    Err(status) => {
                        reply.write_queue_buffer_output(QueueBufferOutput::default());
                        status.code()
                    }
                }
            }
            TransactionCode::CancelBuffer => {
                let slot = data.read_i32()?;
                let fence = data.read_fence()?;
                self.cancel_buffer(slot, fence);
                0
            }
            TransactionCode::Query => {
                let what = data.read_i32()?;
                match self.query(what) {
                    Ok(value) => {
                        reply.write_i32(value);
                        0
                    }
                    Err(status) => {
                        reply.write_i32(0);
                        status.code()
                    }
                }
            }
            TransactionCode::Connect => {
                let listener = data.read_producer_listener()?;
                let api = read_api(data)?;
                let producer_controlled_by_app = data.read_bool()?;
                match self.connect(listener, api, producer_controlled_by_app) {
                    Ok(output) => {
                        reply.write_queue_buffer_output(output);
                        0
                    }
                    Err(status) => {
                        reply.write_queue_buffer_output(QueueBufferOutput::default());
                        status.code()
                    }
                }
            }
            TransactionCode::Disconnect => {
                let api = read_api(data)?;
                code_of(self.disconnect(api))
            }
            TransactionCode::SetPreallocatedBuffer => {
                let slot = data.read_i32()?;
                let buffer = data.read_buffer()?;
                code_of(self.set_preallocated_buffer(slot, buffer))
            }
            TransactionCode::GetBufferHistory => {
                let count = read_count(data)?;
                match self.get_buffer_history(count) {
                    Ok(entries) => {
                        reply.write_buffer_history(entries);
                        0
                    }
                    Err(status) => {
                        reply.write_buffer_history(Vec::new());
                        status.code()
                    }
                }
            }
        };
        Ok(status)
    }
}

impl Binder for BufferQueueProducer {
    fn interface_descriptor(&self) -> &'static str {
        PRODUCER_INTERFACE_DESCRIPTOR
    }

    fn transact(&self, code: u32, _flags: u32, data: &mut Parcel, reply: &mut Parcel) {
        let Ok(method) = TransactionCode::try_from(code) else {
            warn!(code, "unknown producer transaction code");
            reply.write_i32(Status::BadValue.code());
            return;
        };

        match self.on_transact(method, data, reply) {
            Ok(status) => reply.write_i32(status),
            Err(status) => {
                warn!(?method, %status, "malformed producer transaction");
                reply.write_i32(status.code());
            }
        }
    }
}
