use super::names::message_name;
use crate::config::Toggles;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// What the pipeline did with one event, as reported to the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Logged,
    Throttled,
    MotionSkipped,
    Unrecognized,
}

/// Metadata included in JSON statistics output.
#[derive(Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub throttle_window_ms: u64,
    pub toggles: Toggles,
    pub runtime_ms: Option<u64>,
}

/// Counters for one message kind.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct KindStats {
    pub logged: u64,
    pub throttled: u64,
    pub motion_skipped: u64,
}

/// Session-wide statistics for the dispatch pipeline.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StatsCollector {
    pub events_processed: u64,
    pub events_logged: u64,
    pub events_throttled: u64,
    pub events_motion_skipped: u64,
    pub events_unrecognized: u64,
    #[serde(skip)]
    pub per_kind_stats: BTreeMap<u32, KindStats>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: u32, outcome: Outcome) {
        self.events_processed += 1;
        match outcome {
            Outcome::Unrecognized => self.events_unrecognized += 1,
            Outcome::Logged => {
                self.events_logged += 1;
                self.per_kind_stats.entry(kind).or_default().logged += 1;
            }
            Outcome::Throttled => {
                self.events_throttled += 1;
                self.per_kind_stats.entry(kind).or_default().throttled += 1;
            }
            Outcome::MotionSkipped => {
                self.events_motion_skipped += 1;
                self.per_kind_stats.entry(kind).or_default().motion_skipped += 1;
            }
        }
    }

    pub fn kind(&self, kind: u32) -> Option<&KindStats> {
        self.per_kind_stats.get(&kind)
    }

    fn named_kinds(&self) -> BTreeMap<&'static str, &KindStats> {
        self.per_kind_stats
            .iter()
            .filter_map(|(kind, stats)| message_name(*kind).map(|name| (name, stats)))
            .collect()
    }

    /// Writes a human-readable summary.
    pub fn print_stats(&self, toggles: &Toggles, runtime_ms: Option<u64>, mut writer: impl Write) -> io::Result<()> {
        writeln!(writer, "--- pointer-trace session ---")?;
        writeln!(
            writer,
            "Toggles: terse={} throttle={} motion_events={} suppress_default_pointer={} mouse_in_pointer={}",
            toggles.terse,
            toggles.throttle,
            toggles.motion_events,
            toggles.suppress_default_pointer,
            toggles.mouse_in_pointer
        )?;
        if let Some(runtime) = runtime_ms {
            writeln!(
                writer,
                "Runtime:            {}",
                crate::util::format_duration(std::time::Duration::from_millis(runtime))
            )?;
        }
        writeln!(writer, "Events Processed:   {}", self.events_processed)?;
        writeln!(writer, "Events Logged:      {}", self.events_logged)?;
        writeln!(writer, "Events Throttled:   {}", self.events_throttled)?;
        writeln!(writer, "Motion Skipped:     {}", self.events_motion_skipped)?;
        writeln!(writer, "Unrecognized:       {}", self.events_unrecognized)?;

        if self.per_kind_stats.is_empty() {
            writeln!(writer, "--- No traced messages ---")?;
            return Ok(());
        }

        writeln!(writer, "\n--- Per Message ---")?;
        writeln!(writer, "Format: NAME: logged / throttled / motion skipped")?;
        for (name, stats) in self.named_kinds() {
            writeln!(
                writer,
                "  {name}: {} / {} / {}",
                stats.logged, stats.throttled, stats.motion_skipped
            )?;
        }
        Ok(())
    }

    /// Writes the statistics as pretty JSON followed by a newline.
    pub fn print_stats_json(&self, toggles: &Toggles, runtime_ms: Option<u64>, mut writer: impl Write) -> io::Result<()> {
        #[derive(Serialize)]
        struct Output<'a> {
            meta: Meta,
            stats: &'a StatsCollector,
            per_kind_stats: BTreeMap<&'static str, &'a KindStats>,
        }

        let output = Output {
            meta: Meta {
                generated_at: chrono::Local::now().to_rfc3339(),
                throttle_window_ms: super::throttle::THROTTLE_WINDOW.as_millis() as u64,
                toggles: *toggles,
                runtime_ms,
            },
            stats: self,
            per_kind_stats: self.named_kinds(),
        };
        serde_json::to_writer_pretty(&mut writer, &output)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::names::{WM_POINTERDOWN, WM_POINTERUPDATE};

    #[test]
    fn totals_match_per_kind_counts() {
        let mut stats = StatsCollector::new();
        stats.record(WM_POINTERDOWN, Outcome::Logged);
        stats.record(WM_POINTERDOWN, Outcome::Throttled);
        stats.record(WM_POINTERUPDATE, Outcome::MotionSkipped);
        stats.record(0x0010, Outcome::Unrecognized);

        assert_eq!(stats.events_processed, 4);
        assert_eq!(stats.events_logged, 1);
        assert_eq!(stats.events_throttled, 1);
        assert_eq!(stats.events_motion_skipped, 1);
        assert_eq!(stats.events_unrecognized, 1);
        assert_eq!(
            stats.kind(WM_POINTERDOWN),
            Some(&KindStats {
                logged: 1,
                throttled: 1,
                motion_skipped: 0
            })
        );
        assert!(stats.kind(0x0010).is_none());
    }

    #[test]
    fn json_output_names_kinds() {
        let mut stats = StatsCollector::new();
        stats.record(WM_POINTERDOWN, Outcome::Logged);
        let mut out = Vec::new();
        stats.print_stats_json(&Toggles::default(), Some(12), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["stats"]["events_logged"], 1);
        assert_eq!(value["per_kind_stats"]["WM_POINTERDOWN"]["logged"], 1);
        assert_eq!(value["meta"]["throttle_window_ms"], 500);
        assert_eq!(value["meta"]["runtime_ms"], 12);
        assert_eq!(value["meta"]["toggles"]["terse"], true);
    }

    #[test]
    fn human_output_lists_kinds() {
        let mut stats = StatsCollector::new();
        stats.record(WM_POINTERDOWN, Outcome::Logged);
        stats.record(WM_POINTERDOWN, Outcome::Throttled);
        let mut out = Vec::new();
        stats.print_stats(&Toggles::default(), None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Events Processed:   2"));
        assert!(text.contains("  WM_POINTERDOWN: 1 / 1 / 0"));
    }
}
