use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde::Serialize;

use crate::export::{EdgeListFormat, ToEdgeList};
use crate::graph::builder::DotGraph;
use crate::graph::graphviz::ToGraphviz;
use crate::graph::GraphSummary;
use crate::transform::NetPruner;
use crate::yosys::YosysRunner;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub input: PathBuf,
    pub before: GraphSummary,
    pub after: GraphSummary,
    pub outputs: Vec<PathBuf>,
}

/// Verilog (or DOT) file in, `.edges` file out.
pub struct Pipeline {
    yosys: Option<YosysRunner>,
    pruner: NetPruner,
    format: EdgeListFormat,
    pruned_dot: bool,
}

impl Pipeline {
    /// A pipeline that reads DOT files directly.
    pub fn new(pruner: NetPruner, format: EdgeListFormat) -> Self {
        Self {
            yosys: None,
            pruner,
            format,
            pruned_dot: false,
        }
    }

    pub fn with_yosys(mut self, runner: YosysRunner) -> Self {
        self.yosys = Some(runner);
        self
    }

    pub fn with_pruned_dot(mut self, pruned_dot: bool) -> Self {
        self.pruned_dot = pruned_dot;
        self
    }

    pub fn run(&self, input: &Path) -> eyre::Result<Report> {
        let prefix = output_prefix(input);
        let mut outputs = Vec::new();

        let text = match &self.yosys {
            Some(runner) => {
                tracing::info!("running yosys on {}", input.display());
                let output = runner
                    .run(input)
                    .wrap_err_with(|| format!("yosys failed on {}", input.display()))?;

                if let Some(png) = &output.png {
                    outputs.push(write_output(&prefix, ".png", png)?);
                }
                outputs.push(write_output(&prefix, ".dot", &output.dot)?);

                output.dot
            }
            None => fs::read_to_string(input)
                .wrap_err_with(|| format!("cannot read {}", input.display()))?,
        };

        let DotGraph {
            name,
            attributes,
            graph,
        } = DotGraph::from_dot(&text)
            .wrap_err_with(|| format!("cannot parse graph of {}", input.display()))?;

        let before = graph.summary();
        let graph = self.pruner.prune(graph)?;
        let after = graph.summary();
        tracing::debug!("{}: {before:?} -> {after:?}", input.display());

        outputs.push(write_output(
            &prefix,
            ".edges",
            graph.to_edge_list(self.format)?,
        )?);

        if self.pruned_dot {
            let pruned = DotGraph {
                name,
                attributes,
                graph,
            };
            outputs.push(write_output(&prefix, ".pruned.dot", pruned.to_graphviz())?);
        }

        Ok(Report {
            input: input.to_path_buf(),
            before,
            after,
            outputs,
        })
    }
}

/// `dir/counter.v` becomes `dir/counter`; other extensions are kept.
pub fn output_prefix(input: &Path) -> PathBuf {
    match input.extension().and_then(|ext| ext.to_str()) {
        Some("v" | "sv" | "dot") => input.with_extension(""),
        _ => input.to_path_buf(),
    }
}

fn write_output(prefix: &Path, suffix: &str, contents: impl AsRef<[u8]>) -> eyre::Result<PathBuf> {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(suffix);
    let path = PathBuf::from(path);

    fs::write(&path, contents).wrap_err_with(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}
