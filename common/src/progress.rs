//! 進捗通知とキャンセル
//!
//! 大きなツリーの読み込み中に一定ノード数ごとにホストへ制御を返す。

/// 既定の通知間隔（ノード数）
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

/// 進捗コールバックの戻り値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Cancel,
}

/// 進捗の受け手
pub trait Progress {
    /// `processed` ノードを処理した時点で呼ばれる
    fn tick(&mut self, processed: usize) -> Flow;
}

impl<F> Progress for F
where
    F: FnMut(usize) -> Flow,
{
    fn tick(&mut self, processed: usize) -> Flow {
        self(processed)
    }
}

/// 何もしない進捗（常に継続）
pub struct NoProgress;

impl Progress for NoProgress {
    fn tick(&mut self, _processed: usize) -> Flow {
        Flow::Continue
    }
}

/// 処理ノード数を数え、間隔ごとに `Progress` を呼ぶ
pub(crate) struct Ticker<'a> {
    progress: &'a mut dyn Progress,
    interval: usize,
    processed: usize,
}

impl<'a> Ticker<'a> {
    pub(crate) fn new(progress: &'a mut dyn Progress, interval: usize) -> Self {
        Self {
            progress,
            interval: interval.max(1),
            processed: 0,
        }
    }

    /// 1ノード処理。キャンセルされたら `false`
    pub(crate) fn step(&mut self) -> bool {
        self.processed += 1;
        if self.processed % self.interval == 0 {
            return self.progress.tick(self.processed) == Flow::Continue;
        }
        true
    }

    pub(crate) fn processed(&self) -> usize {
        self.processed
    }
}
