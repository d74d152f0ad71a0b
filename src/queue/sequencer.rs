//! ### English
//! Ticket sequencer that orders listener callbacks across concurrent `queue_buffer` calls.
//!
//! A caller draws a ticket while still holding the core lock, drops the core lock, then waits
//! here until its ticket comes up. The callback runs without any lock held; the turn only passes
//! to the next ticket once it returns.
//!
//! ### 中文
//! 票号序列器：在并发的 `queue_buffer` 调用之间对监听器回调排序。
//!
//! 调用方在仍持有 core 锁时领取票号，释放 core 锁后在此等待轮到自己的票号。
//! 回调在不持有任何锁的情况下执行；回调返回后才会轮到下一个票号。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

#[derive(Debug, Default)]
pub(crate) struct CallbackSequencer {
    /// ### English
    /// Next ticket to hand out.
    ///
    /// ### 中文
    /// 下一个要发放的票号。
    next_ticket: AtomicU64,
    /// ### English
    /// Ticket currently allowed to run its callback.
    ///
    /// ### 中文
    /// 当前允许执行回调的票号。
    current: Mutex<u64>,
    turn_changed: Condvar,
}

impl CallbackSequencer {
    /// ### English
    /// Draws the next ticket. Call while holding the core lock so ticket order equals mutation
    /// order.
    ///
    /// ### 中文
    /// 领取下一个票号。需在持有 core 锁时调用，使票号顺序与修改顺序一致。
    pub(crate) fn draw(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    /// ### English
    /// Waits for `ticket`'s turn, runs `callback`, then hands the turn to the next ticket.
    ///
    /// ### 中文
    /// 等待轮到 `ticket`，执行 `callback`，然后把轮次交给下一个票号。
    pub(crate) fn run_in_turn<R>(&self, ticket: u64, callback: impl FnOnce() -> R) -> R {
        {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            while *current != ticket {
                current = self
                    .turn_changed
                    .wait(current)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }

        let result = callback();

        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        self.turn_changed.notify_all();
        result
    }
}
