//! ### English
//! Consumer interface: the compositor end of a queue core.
//!
//! ### 中文
//! 消费者接口：队列 core 的合成器端。

mod acquire;
mod attach;
mod defaults;
mod release;

use std::sync::Arc;

use tracing::{debug, error};

use super::core::BufferQueueCore;
use super::listener::ConsumerListener;
use super::status::{QueueResult, Status};

/// ### English
/// Consumer end of a buffer queue.
///
/// ### 中文
/// 缓冲区队列的消费者端。
#[derive(Clone)]
pub struct BufferQueueConsumer {
    core: Arc<BufferQueueCore>,
}

impl BufferQueueConsumer {
    pub fn new(core: Arc<BufferQueueCore>) -> Self {
        Self { core }
    }

    pub fn core(&self) -> &Arc<BufferQueueCore> {
        &self.core
    }

    /// ### English
    /// Attaches the consumer listener. A producer can only connect after this.
    ///
    /// #### Parameters
    /// - `listener`: Receives frame notifications.
    /// - `controlled_by_app`: Together with the producer's flag, decides whether dequeue may block.
    ///
    /// ### 中文
    /// 挂接消费者监听器。只有在此之后生产者才能连接。
    ///
    /// #### 参数
    /// - `listener`：接收帧通知。
    /// - `controlled_by_app`：与生产者的标志一起决定 dequeue 是否可阻塞。
    pub fn connect(
        &self,
        listener: Arc<dyn ConsumerListener>,
        controlled_by_app: bool,
    ) -> QueueResult<()> {
        let mut state = self.core.lock();
        if state.is_abandoned {
            error!("consumer connect: queue has been abandoned");
            return Err(Status::NoInit);
        }

        state.consumer_listener = Some(listener);
        state.consumer_controlled_by_app = controlled_by_app;
        debug!(controlled_by_app, "consumer connect");
        Ok(())
    }

    /// ### English
    /// Tears the consumer down and abandons the core.
    ///
    /// Pending frames are dropped, every slot is freed and all waiters wake up to `NoInit`.
    /// Abandonment is permanent.
    ///
    /// ### 中文
    /// 拆除消费者并放弃 core。
    ///
    /// 丢弃待处理帧，释放所有槽位，所有等待者被唤醒并得到 `NoInit`。放弃不可撤销。
    pub fn disconnect(&self) -> QueueResult<()> {
        let mut state = self.core.lock();
        if state.consumer_listener.is_none() {
            error!("consumer disconnect: no consumer is connected");
            return Err(Status::BadValue);
        }

        state.is_abandoned = true;
        state.consumer_listener = None;
        state.free_all_buffers_locked();
        self.core.signal_dequeue();
        self.core.signal_allocation_finished();
        debug!("consumer disconnect: queue abandoned");
        Ok(())
    }

    /// ### English
    /// Bit mask of slots whose buffer the consumer no longer holds a reference to.
    ///
    /// A bit is set for every slot not acquired since its buffer last changed, except slots whose
    /// pending item is still carrying a buffer the consumer already has.
    ///
    /// ### 中文
    /// 消费者不再持有引用的槽位位掩码。
    ///
    /// 自缓冲区上次变化以来未被 acquire 的槽位对应位被置位；待处理项仍携带消费者已持有缓冲区
    /// 的槽位除外。
    pub fn get_released_buffers(&self) -> QueueResult<u64> {
        let state = self.core.lock();
        if state.is_abandoned {
            return Err(Status::NoInit);
        }

        let mut mask = state
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.acquire_called)
            .fold(0u64, |mask, (index, _)| mask | (1u64 << index));
        for item in state.queue.iter().filter(|item| item.acquire_called) {
            if let Ok(index) = u32::try_from(item.slot) {
                mask &= !(1u64 << index);
            }
        }
        Ok(mask)
    }

    /// ### English
    /// Opens or closes the shutdown gate for blocking waits. While inactive, a dequeue that would
    /// have to wait fails with `Busy`.
    ///
    /// ### 中文
    /// 打开或关闭阻塞等待的关闭闸门。处于非活动状态时，需要等待的 dequeue 以 `Busy` 失败。
    pub fn set_active(&self, active: bool) {
        let mut state = self.core.lock();
        state.active = active;
        self.core.signal_dequeue();
        debug!(active, "set_active");
    }
}
