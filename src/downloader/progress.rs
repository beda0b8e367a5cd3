use tqdm::{Tqdm, pbar};
use tracing::debug;

/// Byte progress of one transfer attempt. Renders a tqdm bar when visible;
/// with an unknown total (0) it only counts bytes.
pub struct Progress {
    bar: Option<Tqdm<()>>,
    total: u64,
    transferred: u64,
}

impl Progress {
    pub fn new(label: &str, total: u64, visible: bool) -> Self {
        let bar = visible.then(|| {
            let total = (total > 0).then_some(total as usize);
            pbar(total).desc(Some(format!("  {}", label)))
        });
        Progress {
            bar,
            total,
            transferred: 0,
        }
    }

    pub fn advance(&mut self, n: usize) {
        self.transferred += n as u64;
        if let Some(bar) = self.bar.as_mut() {
            if let Err(err) = bar.update(n) {
                // Terminal went away; keep counting without rendering.
                debug!("progress bar disabled: {}", err);
                self.bar = None;
            }
        }
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Completion in percent, `None` while the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((self.transferred as f64 / self.total as f64 * 100.0).min(100.0))
    }

    pub fn finish(mut self) {
        match self.percent() {
            Some(percent) => debug!(transferred = self.transferred, "transfer done at {:.1}%", percent),
            None => debug!(transferred = self.transferred, "transfer done, size unknown"),
        }
        if let Some(mut bar) = self.bar.take() {
            if let Err(err) = bar.close() {
                debug!("closing progress bar failed: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_total_counts_bytes() {
        let mut progress = Progress::new("claude-linux-x64", 0, false);
        progress.advance(8192);
        progress.advance(10);

        assert_eq!(progress.transferred(), 8202);
        assert_eq!(progress.percent(), None);
    }

    #[test]
    fn test_percent() {
        let mut progress = Progress::new("claude-linux-x64", 200, false);
        progress.advance(50);
        assert_eq!(progress.percent(), Some(25.0));

        // Servers may send more than announced
        progress.advance(500);
        assert_eq!(progress.percent(), Some(100.0));
    }

    #[test]
    fn test_visible_bar_with_unknown_total() {
        let mut progress = Progress::new("claude-win32-x64.exe", 0, true);
        progress.advance(1);
        assert_eq!(progress.percent(), None);
        progress.finish();
    }
}
