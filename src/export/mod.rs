// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Printable chart sheet.
//!
//! Renders a chart as plain text for printing or sharing: the song header,
//! the reference links, then one block per section in performance order.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::chart::{ChartSection, SongChart};

/// Width of the rules between blocks
const RULE_WIDTH: usize = 48;

/// Plain-text print sheet of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintSheet {
    /// Width of the rules between blocks
    pub rule_width: usize,
}

impl Default for PrintSheet {
    fn default() -> Self {
        Self {
            rule_width: RULE_WIDTH,
        }
    }
}

impl PrintSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the chart as it is right now
    pub fn render(&self, chart: &SongChart) -> String {
        let mut out = String::new();
        let rule = "=".repeat(self.rule_width);
        let thin = "-".repeat(self.rule_width);

        // Writing to a String cannot fail
        let _ = writeln!(out, "{}", chart.title);
        let _ = writeln!(out, "{}", chart.artist);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Tempo: {} BPM   Time: {}", chart.tempo, chart.time_signature);
        let _ = writeln!(out, "Feel: {}   Genre: {}", chart.feel, chart.genre);

        if !chart.links.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Links");
            for link in &chart.links {
                let target = if link.url.is_empty() { "Link" } else { &link.url };
                let _ = writeln!(out, "  {}: {}", link.label, target);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Structure ({} measures)", chart.total_measures());
        let _ = writeln!(out, "{}", rule);
        for (index, section) in chart.sections.iter().enumerate() {
            if index > 0 {
                let _ = writeln!(out, "{}", thin);
            }
            render_section(&mut out, index + 1, section);
        }

        out
    }

    /// Render the chart and write it to `path`, creating parent directories
    pub fn export_to<P: AsRef<Path>>(&self, chart: &SongChart, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        file.write_all(self.render(chart).as_bytes())?;
        file.flush()?;

        info!(path = %path.display(), sections = chart.sections.len(), "Print sheet exported");
        Ok(())
    }
}

fn render_section(out: &mut String, ordinal: usize, section: &ChartSection) {
    let _ = writeln!(
        out,
        "{:02}. {} [{}x]",
        ordinal,
        section.display_label(),
        section.measures
    );
    for line in section.notation.lines() {
        let _ = writeln!(out, "    {}", line);
    }
    if !section.cues.trim().is_empty() {
        let _ = writeln!(out, "    > {}", section.cues.trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartId, LinkId, ReferenceLink, SectionId, SectionType};

    fn chart() -> SongChart {
        let mut chart = SongChart::empty(ChartId::from("c1"))
            .with_section(
                ChartSection::new(SectionId::from("s1"), SectionType::Intro, 4)
                    .with_notation("Am | G | F | E7")
                    .with_cues("Só bateria"),
            )
            .with_section(
                ChartSection::new(SectionId::from("s2"), SectionType::Custom, 2)
                    .with_custom_label("Solo de baixo"),
            );
        chart.title = "Garota".to_string();
        chart.artist = "Banda".to_string();
        chart.tempo = 96;
        chart
    }

    #[test]
    fn test_render_header() {
        let text = PrintSheet::new().render(&chart());
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Garota"));
        assert_eq!(lines.next(), Some("Banda"));
        assert!(text.contains("Tempo: 96 BPM"));
        assert!(text.contains("Time: 4/4"));
        assert!(text.contains("Structure (6 measures)"));
        assert!(!text.contains("Links"));
    }

    #[test]
    fn test_render_sections_in_order() {
        let text = PrintSheet::new().render(&chart());
        let intro = text.find("01. Intro [4x]").unwrap();
        let solo = text.find("02. Solo de baixo [2x]").unwrap();
        assert!(intro < solo);
        assert!(text.contains("    Am | G | F | E7"));
        assert!(text.contains("    > Só bateria"));
    }

    #[test]
    fn test_render_links() {
        let mut chart = chart();
        let mut spotify = ReferenceLink::new(LinkId::from("l1"));
        spotify.label = "Spotify".to_string();
        spotify.url = "https://open.spotify.com/track/x".to_string();
        let mut empty = ReferenceLink::new(LinkId::from("l2"));
        empty.label = "YouTube".to_string();
        chart.links = vec![spotify, empty];

        let text = PrintSheet::new().render(&chart);
        assert!(text.contains("  Spotify: https://open.spotify.com/track/x"));
        assert!(text.contains("  YouTube: Link"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("sheet.txt");
        let chart = chart();

        PrintSheet::new().export_to(&chart, &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, PrintSheet::new().render(&chart));
    }
}
