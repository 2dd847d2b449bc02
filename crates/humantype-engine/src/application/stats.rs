//! Run statistics.

use std::time::Duration;

use humantype_core::TypoStats;
use uuid::Uuid;

/// Summary reported with [`EngineEvent::Completed`](super::events::EngineEvent::Completed).
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub run_id: Uuid,
    /// Source characters consumed (a transposition consumes two at once).
    pub characters_typed: usize,
    /// Number of typos planned, across all kinds.
    pub typo_count: u64,
    pub typos: TypoStats,
    /// Type and backspace actions executed (injected unless dry-run).
    pub keystrokes: u64,
    pub injection_failures: u64,
    /// Time from the first character's delay to the last character's actions.
    pub elapsed: Duration,
    pub avg_delay_ms: f64,
    pub min_delay_ms: f64,
    pub max_delay_ms: f64,
    /// Characters per minute.
    pub cpm: f64,
    /// Words per minute, counting five characters as one word.
    pub wpm: f64,
}

/// Accumulates per-character figures on the worker task.
#[derive(Debug)]
pub(crate) struct StatsAccumulator {
    run_id: Uuid,
    characters_typed: usize,
    keystrokes: u64,
    injection_failures: u64,
    delay_count: u64,
    delay_sum: f64,
    delay_min: f64,
    delay_max: f64,
}

impl StatsAccumulator {
    pub(crate) fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            characters_typed: 0,
            keystrokes: 0,
            injection_failures: 0,
            delay_count: 0,
            delay_sum: 0.0,
            delay_min: f64::INFINITY,
            delay_max: 0.0,
        }
    }

    pub(crate) fn record_delay(&mut self, delay_ms: f64) {
        self.delay_count += 1;
        self.delay_sum += delay_ms;
        self.delay_min = self.delay_min.min(delay_ms);
        self.delay_max = self.delay_max.max(delay_ms);
    }

    pub(crate) fn record_characters(&mut self, count: usize) {
        self.characters_typed += count;
    }

    pub(crate) fn record_keystrokes(&mut self, count: u64) {
        self.keystrokes += count;
    }

    pub(crate) fn record_injection_failure(&mut self) {
        self.injection_failures += 1;
    }

    pub(crate) fn finish(&self, elapsed: Duration, typos: TypoStats) -> RunStats {
        let (avg, min) = if self.delay_count == 0 {
            (0.0, 0.0)
        } else {
            (self.delay_sum / self.delay_count as f64, self.delay_min)
        };
        let minutes = elapsed.as_secs_f64() / 60.0;
        let cpm = if minutes > 0.0 {
            self.characters_typed as f64 / minutes
        } else {
            0.0
        };

        RunStats {
            run_id: self.run_id,
            characters_typed: self.characters_typed,
            typo_count: typos.total(),
            typos,
            keystrokes: self.keystrokes,
            injection_failures: self.injection_failures,
            elapsed,
            avg_delay_ms: avg,
            min_delay_ms: min,
            max_delay_ms: self.delay_max,
            cpm,
            wpm: cpm / 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_computes_delay_figures_and_rates() {
        // Arrange
        let mut acc = StatsAccumulator::new(Uuid::nil());
        for d in [50.0, 100.0, 150.0] {
            acc.record_delay(d);
        }
        acc.record_characters(30);
        acc.record_keystrokes(31);

        // Act
        let stats = acc.finish(Duration::from_secs(30), TypoStats::default());

        // Assert
        assert_eq!(stats.avg_delay_ms, 100.0);
        assert_eq!(stats.min_delay_ms, 50.0);
        assert_eq!(stats.max_delay_ms, 150.0);
        assert_eq!(stats.cpm, 60.0);
        assert_eq!(stats.wpm, 12.0);
        assert_eq!(stats.keystrokes, 31);
    }

    #[test]
    fn test_finish_with_no_characters_reports_zeros() {
        let stats = StatsAccumulator::new(Uuid::nil()).finish(Duration::ZERO, TypoStats::default());
        assert_eq!(stats.characters_typed, 0);
        assert_eq!(stats.min_delay_ms, 0.0);
        assert_eq!(stats.cpm, 0.0);
    }

    #[test]
    fn test_typo_count_comes_from_typo_stats() {
        let typos = TypoStats {
            substitution: 2,
            transposition: 1,
            corrected: 3,
            ..TypoStats::default()
        };
        let stats = StatsAccumulator::new(Uuid::nil()).finish(Duration::from_secs(1), typos);
        assert_eq!(stats.typo_count, 3);
        assert_eq!(stats.typos.corrected, 3);
    }
}
