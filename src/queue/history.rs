//! ### English
//! Fixed-size ring of recently queued frames, kept for diagnostics.
//!
//! ### 中文
//! 最近入队帧的定长环形记录，用于诊断。

use super::slot::BufferState;

/// ### English
/// Number of entries kept in the history ring.
///
/// ### 中文
/// 历史环中保留的条目数量。
pub const BUFFER_HISTORY_SIZE: usize = 8;

/// ### English
/// One history record written on every successful queue.
///
/// ### 中文
/// 每次成功入队时写入的一条历史记录。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferHistoryEntry {
    pub frame_number: u64,
    pub queue_time: u64,
    pub presentation_time: i64,
    pub state: BufferState,
}

#[derive(Debug, Default)]
pub(crate) struct BufferHistory {
    entries: [BufferHistoryEntry; BUFFER_HISTORY_SIZE],
    /// ### English
    /// Index of the most recently written entry.
    ///
    /// ### 中文
    /// 最近一次写入的条目索引。
    position: usize,
}

impl BufferHistory {
    /// ### English
    /// Advances the ring and stores `entry` as the newest record.
    ///
    /// ### 中文
    /// 推进环形位置并将 `entry` 存为最新记录。
    pub(crate) fn push(&mut self, entry: BufferHistoryEntry) {
        self.position = (self.position + 1) % BUFFER_HISTORY_SIZE;
        self.entries[self.position] = entry;
    }

    /// ### English
    /// Updates the state of the entry carrying `frame_number` (used on acquire).
    ///
    /// ### 中文
    /// 更新携带 `frame_number` 的条目的状态（acquire 时使用）。
    pub(crate) fn mark(&mut self, frame_number: u64, state: BufferState) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.frame_number == frame_number && frame_number != 0)
        {
            entry.state = state;
        }
    }

    /// ### English
    /// Returns up to `count` entries, most recent first.
    ///
    /// ### 中文
    /// 返回最多 `count` 条记录，按从新到旧排列。
    pub(crate) fn latest(&self, count: usize) -> Vec<BufferHistoryEntry> {
        let count = count.min(BUFFER_HISTORY_SIZE);
        (0..count)
            .map(|back| {
                let index = (self.position + BUFFER_HISTORY_SIZE - back) % BUFFER_HISTORY_SIZE;
                self.entries[index]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(frame_number: u64) -> BufferHistoryEntry {
        BufferHistoryEntry {
            frame_number,
            queue_time: frame_number * 10,
            presentation_time: 0,
            state: BufferState::Queued,
        }
    }

    #[test]
    fn reads_back_in_reverse_order() {
        let mut history = BufferHistory::default();
        for frame in 1..=5 {
            history.push(entry(frame));
        }

        let frames: Vec<u64> = history.latest(5).iter().map(|e| e.frame_number).collect();
        assert_eq!(frames, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn wraps_and_clamps_to_capacity() {
        let mut history = BufferHistory::default();
        for frame in 1..=11 {
            history.push(entry(frame));
        }

        let frames: Vec<u64> = history.latest(100).iter().map(|e| e.frame_number).collect();
        assert_eq!(frames, vec![11, 10, 9, 8, 7, 6, 5, 4]);
    }

    #[test]
    fn mark_updates_matching_frame() {
        let mut history = BufferHistory::default();
        history.push(entry(1));
        history.push(entry(2));
        history.mark(1, BufferState::Acquired);

        let latest = history.latest(2);
        assert_eq!(latest[0].state, BufferState::Queued);
        assert_eq!(latest[1].state, BufferState::Acquired);
    }
}
