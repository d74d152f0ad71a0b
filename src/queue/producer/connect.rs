//! ### English
//! Producer connection lifecycle.
//!
//! ### 中文
//! 生产者连接生命周期。

use std::sync::Arc;

use tracing::{debug, error};

use crate::queue::listener::ProducerListener;
use crate::queue::status::{QueueResult, Status};
use crate::queue::window::NativeWindowApi;

use super::{BufferQueueProducer, QueueBufferOutput};

impl BufferQueueProducer {
    /// ### English
    /// Binds a producer API to the queue.
    ///
    /// Requires a connected consumer. Only one API may be bound at a time.
    ///
    /// #### Parameters
    /// - `listener`: Notified when the consumer releases a buffer.
    /// - `api`: Producer API being bound.
    /// - `producer_controlled_by_app`: Together with the consumer's flag, decides whether dequeue
    ///   may block.
    ///
    /// ### 中文
    /// 将生产者 API 绑定到队列。
    ///
    /// 需要消费者已连接。同一时间只能绑定一个 API。
    ///
    /// #### 参数
    /// - `listener`：消费者释放缓冲区时收到通知。
    /// - `api`：要绑定的生产者 API。
    /// - `producer_controlled_by_app`：与消费者的标志一起决定 dequeue 是否可阻塞。
    pub fn connect(
        &self,
        listener: Option<Arc<dyn ProducerListener>>,
        api: NativeWindowApi,
        producer_controlled_by_app: bool,
    ) -> QueueResult<QueueBufferOutput> {
        let state = self.core.lock();
        if state.is_abandoned || state.consumer_listener.is_none() {
            error!(?api, "connect: no consumer is attached");
            return Err(Status::NoInit);
        }
        if let Some(connected) = state.connected_api {
            error!(?api, ?connected, "connect: a producer is already connected");
            return Err(Status::BadValue);
        }

        let mut state = self.core.wait_while_allocating(state);
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        state.connected_api = Some(api);
        state.producer_listener = listener;
        state.buffer_has_been_queued = false;
        state.dequeue_buffer_cannot_block =
            state.consumer_controlled_by_app && producer_controlled_by_app;

        debug!(?api, cannot_block = state.dequeue_buffer_cannot_block, "connect");
        Ok(QueueBufferOutput {
            width: state.default_size.width,
            height: state.default_size.height,
            transform_hint: state.transform_hint,
            num_pending_buffers: state.queue.len() as u32,
            frame_number: None,
        })
    }

    /// ### English
    /// Unbinds the producer API, freeing every slot and dropping pending frames.
    ///
    /// ### 中文
    /// 解绑生产者 API，释放所有槽位并丢弃待处理帧。
    pub fn disconnect(&self, api: NativeWindowApi) -> QueueResult<()> {
        let state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }
        let mut state = self.core.wait_while_allocating(state);

        if state.connected_api != Some(api) {
            error!(?api, connected = ?state.connected_api, "disconnect: api mismatch");
            return Err(Status::BadValue);
        }

        state.free_all_buffers_locked();
        state.connected_api = None;
        state.dequeue_buffer_cannot_block = false;
        let producer_listener = state.producer_listener.take();
        let consumer_listener = state.consumer_listener.clone();
        self.core.signal_dequeue();
        drop(state);

        debug!(?api, "disconnect");

        if let Some(listener) = consumer_listener {
            listener.on_buffers_released();
        }
        if let Some(listener) = producer_listener {
            listener.on_buffer_released();
        }
        Ok(())
    }
}
