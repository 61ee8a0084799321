//! Command-line surface for `resume-builder`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::layout::{DirectRenderer, ImageFileSnapshot, PageRenderer, SnapshotRenderer};

#[derive(Parser, Debug)]
#[command(name = "resume-builder", version, about = "Edit, import and export a resume", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the current resume as JSON
    Show,
    /// Replace the resume with the contents of a JSON file
    Import {
        path: PathBuf,
    },
    /// Write resume.json to the output directory
    ExportJson,
    /// Write a PDF of the resume to the output directory
    ExportPdf {
        /// Layout strategy order
        #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
        strategy: StrategyArg,
        /// Captured preview image used by the snapshot strategy
        #[arg(long, env = "RESUME_SNAPSHOT_PATH")]
        snapshot: Option<PathBuf>,
    },
    /// Discard the resume and start from the blank template
    Reset,
    /// Add a skill (ignored when blank or already listed)
    AddSkill {
        skill: String,
    },
    /// Remove a skill
    RemoveSkill {
        skill: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Direct text layout, falling back to the snapshot when one is given
    Auto,
    /// Direct text layout only
    Direct,
    /// Snapshot first, direct text layout as fallback
    Snapshot,
}

/// Renderers to try, in order, for the chosen strategy.
pub fn renderer_chain(
    strategy: StrategyArg,
    snapshot: Option<PathBuf>,
    scale: u32,
) -> Vec<Arc<dyn PageRenderer>> {
    let direct: Arc<dyn PageRenderer> = Arc::new(DirectRenderer);
    let snapshot: Option<Arc<dyn PageRenderer>> = snapshot.map(|path| {
        Arc::new(SnapshotRenderer::new(Arc::new(ImageFileSnapshot::new(path)), scale))
            as Arc<dyn PageRenderer>
    });

    match strategy {
        StrategyArg::Direct => vec![direct],
        StrategyArg::Auto => std::iter::once(direct).chain(snapshot).collect(),
        StrategyArg::Snapshot => snapshot.into_iter().chain(std::iter::once(direct)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StrategyKind;

    fn kinds(chain: &[Arc<dyn PageRenderer>]) -> Vec<StrategyKind> {
        chain.iter().map(|r| r.strategy()).collect()
    }

    #[test]
    fn test_parse_export_pdf_defaults() {
        let cli = Cli::try_parse_from(["resume-builder", "export-pdf"]).unwrap();
        match cli.command {
            Commands::ExportPdf { strategy, .. } => assert_eq!(strategy, StrategyArg::Auto),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_skill() {
        let cli = Cli::try_parse_from(["resume-builder", "add-skill", "Rust"]).unwrap();
        assert!(matches!(cli.command, Commands::AddSkill { skill } if skill == "Rust"));
    }

    #[test]
    fn test_chain_without_snapshot_is_direct_only() {
        for strategy in [StrategyArg::Auto, StrategyArg::Direct, StrategyArg::Snapshot] {
            assert_eq!(kinds(&renderer_chain(strategy, None, 2)), vec![StrategyKind::Direct]);
        }
    }

    #[test]
    fn test_chain_order_follows_strategy() {
        let png = Some(PathBuf::from("preview.png"));
        assert_eq!(
            kinds(&renderer_chain(StrategyArg::Auto, png.clone(), 2)),
            vec![StrategyKind::Direct, StrategyKind::Snapshot]
        );
        assert_eq!(
            kinds(&renderer_chain(StrategyArg::Snapshot, png.clone(), 2)),
            vec![StrategyKind::Snapshot, StrategyKind::Direct]
        );
        assert_eq!(
            kinds(&renderer_chain(StrategyArg::Direct, png, 2)),
            vec![StrategyKind::Direct]
        );
    }
}
