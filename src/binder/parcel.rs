//! ### English
//! In-process transaction payload: a FIFO of typed values.
//!
//! Values are read back in the order they were written. Reading a value of the wrong type, or
//! past the end, fails with `BadValue` and leaves the parcel unchanged.
//!
//! ### 中文
//! 进程内事务载荷：按类型存放值的 FIFO。
//!
//! 值按写入顺序读出。读取类型不符或越过末尾时返回 `BadValue`，且不改变 parcel。

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::queue::buffer::{Fence, GraphicBuffer};
use crate::queue::history::BufferHistoryEntry;
use crate::queue::listener::ProducerListener;
use crate::queue::producer::{QueueBufferInput, QueueBufferOutput};
use crate::queue::status::{QueueResult, Status};

/// ### English
/// One typed value carried by a `Parcel`.
///
/// ### 中文
/// `Parcel` 携带的一个带类型的值。
#[derive(Clone)]
pub enum ParcelValue {
    InterfaceToken(String),
    I32(i32),
    U32(u32),
    Bool(bool),
    Fence(Fence),
    Buffer(Option<Arc<GraphicBuffer>>),
    ProducerListener(Option<Arc<dyn ProducerListener>>),
    QueueBufferInput(QueueBufferInput),
    QueueBufferOutput(QueueBufferOutput),
    BufferHistory(Vec<BufferHistoryEntry>),
}

impl fmt::Debug for ParcelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParcelValue::InterfaceToken(token) => f.debug_tuple("InterfaceToken").field(token).finish(),
            ParcelValue::I32(value) => f.debug_tuple("I32").field(value).finish(),
            ParcelValue::U32(value) => f.debug_tuple("U32").field(value).finish(),
            ParcelValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            ParcelValue::Fence(fence) => f.debug_tuple("Fence").field(fence).finish(),
            ParcelValue::Buffer(buffer) => f.debug_tuple("Buffer").field(buffer).finish(),
            ParcelValue::ProducerListener(listener) => f
                .debug_tuple("ProducerListener")
                .field(&listener.is_some())
                .finish(),
            ParcelValue::QueueBufferInput(input) => {
                f.debug_tuple("QueueBufferInput").field(input).finish()
            }
            ParcelValue::QueueBufferOutput(output) => {
                f.debug_tuple("QueueBufferOutput").field(output).finish()
            }
            ParcelValue::BufferHistory(entries) => {
                f.debug_tuple("BufferHistory").field(entries).finish()
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Parcel {
    values: VecDeque<ParcelValue>,
}

/// ### English
/// Generates a `write_*` / `read_*` pair for a single-field `ParcelValue` variant.
///
/// ### 中文
/// 为单字段 `ParcelValue` 变体生成一对 `write_*` / `read_*` 方法。
macro_rules! parcel_accessors {
    ($($write:ident, $read:ident => $variant:ident($ty:ty);)*) => {
        $(
            pub fn $write(&mut self, value: $ty) {
                self.values.push_back(ParcelValue::$variant(value));
            }

            pub fn $read(&mut self) -> QueueResult<$ty> {
                match self.values.front() {
                    Some(ParcelValue::$variant(_)) => match self.values.pop_front() {
                        Some(ParcelValue::$variant(value)) => Ok(value),
                        _ => Err(Status::BadValue),
                    },
                    _ => Err(Status::BadValue),
                }
            }
        )*
    };
}

impl Parcel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// ### English
    /// Consumes the next value if it is an interface token equal to `descriptor`.
    ///
    /// ### 中文
    /// 若下一个值是等于 `descriptor` 的接口令牌则消费它。
    pub fn enforce_interface(&mut self, descriptor: &str) -> bool {
        match self.values.front() {
            Some(ParcelValue::InterfaceToken(token)) if token == descriptor => {
                self.values.pop_front();
                true
            }
            _ => false,
        }
    }

    pub fn write_interface_token(&mut self, descriptor: &str) {
        self.values
            .push_back(ParcelValue::InterfaceToken(descriptor.to_owned()));
    }

    parcel_accessors! {
        write_i32, read_i32 => I32(i32);
        write_u32, read_u32 => U32(u32);
        write_bool, read_bool => Bool(bool);
        write_fence, read_fence => Fence(Fence);
        write_buffer, read_buffer => Buffer(Option<Arc<GraphicBuffer>>);
        write_producer_listener, read_producer_listener => ProducerListener(Option<Arc<dyn ProducerListener>>);
        write_queue_buffer_input, read_queue_buffer_input => QueueBufferInput(QueueBufferInput);
        write_queue_buffer_output, read_queue_buffer_output => QueueBufferOutput(QueueBufferOutput);
        write_buffer_history, read_buffer_history => BufferHistory(Vec<BufferHistoryEntry>);
    }

    /// ### English
    /// Reads a trailing status code and converts it back into a result.
    ///
    /// Non-negative codes are success (the value carries any flag bits).
    ///
    /// ### 中文
    /// 读取末尾的状态码并转换回结果。
    ///
    /// 非负码表示成功（值中携带标志位）。
    pub fn read_status(&mut self) -> QueueResult<i32> {
        let code = self.read_i32()?;
        match Status::from_code(code) {
            Some(status) => Err(status),
            None => Ok(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_come_back_in_order() {
        let mut parcel = Parcel::new();
        parcel.write_i32(3);
        parcel.write_bool(true);
        parcel.write_fence(Fence::new(4, 9));

        assert_eq!(parcel.read_i32(), Ok(3));
        assert_eq!(parcel.read_bool(), Ok(true));
        assert_eq!(parcel.read_fence(), Ok(Fence::new(4, 9)));
        assert!(parcel.is_empty());
    }

    #[test]
    fn type_mismatch_leaves_the_value_in_place() {
        let mut parcel = Parcel::new();
        parcel.write_u32(5);

        assert_eq!(parcel.read_i32(), Err(Status::BadValue));
        assert_eq!(parcel.len(), 1);
        assert_eq!(parcel.read_u32(), Ok(5));
        assert_eq!(parcel.read_u32(), Err(Status::BadValue));
    }

    #[test]
    fn interface_token_must_match() {
        let mut parcel = Parcel::new();
        parcel.write_interface_token("a.b.IFoo");

        assert!(!parcel.enforce_interface("a.b.IBar"));
        assert!(parcel.enforce_interface("a.b.IFoo"));
        assert!(parcel.is_empty());
    }

    #[test]
    fn status_decoding() {
        let mut parcel = Parcel::new();
        parcel.write_i32(Status::WouldBlock.code());
        parcel.write_i32(2);

        assert_eq!(parcel.read_status(), Err(Status::WouldBlock));
        assert_eq!(parcel.read_status(), Ok(2));
    }
}
