//! Show command: print layer grids and typing statistics.

use crate::cli::common::{CliError, CliResult};
use crate::cli::export::ArrangementChoice;
use crate::models::key::{cols_for_row, ROWS};
use crate::models::{Arrangement, Layer, LayoutMapping, PhysicalKey, ShiftState};
use crate::services::LayoutService;
use clap::Args;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Print the layout grids with key legends and statistics
#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    /// Path to layout markdown file (built-in layout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Only print this layer (0-2)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..=2))]
    pub layer: Option<u8>,

    /// Key legends to print next to each cell
    #[arg(long, value_enum, default_value = "qwerty")]
    pub arrangement: ArrangementChoice,
}

impl ShowArgs {
    /// Execute the show command
    pub fn execute(&self) -> CliResult<()> {
        let layout = LayoutService::load_or_builtin(self.layout.as_deref())
            .map_err(|e| CliError::io(format!("Failed to load layout: {e:#}")))?;

        println!("{}", layout.metadata.name);
        if !layout.metadata.description.is_empty() {
            println!("{}", layout.metadata.description);
        }

        for arrangement in self.arrangement.arrangements() {
            for layer in &layout.layers {
                if self.layer.is_some_and(|number| number != layer.number) {
                    continue;
                }
                println!();
                print!("{}", render_layer(layer, arrangement));
            }
        }

        let mapping = LayoutMapping::build(&layout)
            .map_err(|e| CliError::validation(format!("Failed to resolve layout: {e:#}")))?;
        println!();
        print!("{}", render_stats(&mapping));

        Ok(())
    }
}

/// One layer as `legend:output` cells, one line per row.
#[must_use]
pub fn render_layer(layer: &Layer, arrangement: Arrangement) -> String {
    let mut out = format!(
        "Layer {}: {} [{}]\n",
        layer.number,
        layer.name,
        arrangement.display_name()
    );

    for row in 0..ROWS {
        let cells: Vec<String> = (0..cols_for_row(row))
            .filter_map(|col| PhysicalKey::checked(row, col))
            .map(|key| format!("{}:{}", key.legend(arrangement), layer.get(key).legend()))
            .collect();
        let _ = writeln!(out, "  {}", cells.join(" "));
    }

    out
}

/// Character counts per tier and skipped diacritic derivations.
#[must_use]
pub fn render_stats(mapping: &LayoutMapping) -> String {
    let mut per_tier: BTreeMap<ShiftState, usize> = BTreeMap::new();
    for path in mapping.paths() {
        *per_tier.entry(path.state).or_default() += 1;
    }

    let mut out = String::from("Characters:\n");
    for (state, count) in &per_tier {
        let (min, max) = state.sequence_len_range();
        let presses = if min == max {
            min.to_string()
        } else {
            format!("{min}-{max}")
        };
        let _ = writeln!(out, "  {:<16} {count:>3}  ({presses} presses)", state.to_string());
    }
    let _ = writeln!(out, "  {:<16} {:>3}", "total", mapping.paths().len());

    if !mapping.skipped().is_empty() {
        let _ = writeln!(out, "Skipped (too many presses):");
        for skipped in mapping.skipped() {
            let _ = writeln!(
                out,
                "  {} ({} presses)",
                skipped.rule.result, skipped.length
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layer() {
        let layout = LayoutService::builtin().unwrap();
        let base = layout.layer(ShiftState::Unshifted).unwrap();

        let qwerty = render_layer(base, Arrangement::Qwerty);
        assert!(qwerty.starts_with("Layer 0:"));
        assert!(qwerty.contains("a:か"));
        assert!(qwerty.contains("d:★"));
        assert_eq!(qwerty.lines().count(), 4);

        let colemak = render_layer(base, Arrangement::Colemak);
        assert!(colemak.contains("s:★"));
        assert!(colemak.contains("e:☆"));
    }

    #[test]
    fn test_render_stats() {
        let layout = LayoutService::builtin().unwrap();
        let mapping = LayoutMapping::build(&layout).unwrap();
        let stats = render_stats(&mapping);

        assert!(stats.starts_with("Characters:"));
        assert!(stats.contains("unshifted"));
        assert!(stats.contains("(2-3 presses)"));
        let total = mapping.paths().len().to_string();
        assert!(stats
            .lines()
            .any(|line| line.trim_start().starts_with("total") && line.ends_with(&total)));
        assert!(!stats.contains("Skipped"));
    }
}
