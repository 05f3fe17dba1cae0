use std::path::PathBuf;

use structopt::StructOpt;

use crate::export::EdgeListFormat;
use crate::pipeline::Pipeline;
use crate::transform::{ElisionStrategy, NetPruner};
use crate::yosys::{YosysConfig, YosysRunner};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "yosys-netgraph",
    about = "Draws Verilog designs with Yosys and writes their cell-to-cell edges"
)]
pub struct Opt {
    /// Synthesize with ABC against the liberty file before drawing
    #[structopt(short = "s", long)]
    pub synthesize: bool,

    /// Liberty cell library used when synthesizing
    #[structopt(long, parse(from_os_str), default_value = "cmos_cells.lib")]
    pub liberty: PathBuf,

    /// Yosys executable
    #[structopt(long, parse(from_os_str), default_value = "yosys")]
    pub yosys: PathBuf,

    /// Skip the PNG rendering (no Graphviz needed)
    #[structopt(long)]
    pub no_png: bool,

    /// Format of the .edges file
    #[structopt(long, default_value = "python", possible_values = &["python", "json"])]
    pub format: EdgeListFormat,

    /// Elide nets one by one so net-to-net chains stay connected
    #[structopt(long)]
    pub bridge_chains: bool,

    /// Also write the pruned graph as <prefix>.pruned.dot
    #[structopt(long)]
    pub pruned_dot: bool,

    /// Inputs are DOT files already produced by `yosys show`
    #[structopt(long)]
    pub from_dot: bool,

    /// Write a JSON summary of every processed file
    #[structopt(long, parse(from_os_str))]
    pub report: Option<PathBuf>,

    /// Worker threads (defaults to the number of CPUs)
    #[structopt(short, long)]
    pub jobs: Option<usize>,

    /// Verilog files to convert
    #[structopt(name = "FILE", parse(from_os_str), required = true)]
    pub files: Vec<PathBuf>,
}

impl Opt {
    pub fn yosys_config(&self) -> YosysConfig {
        YosysConfig {
            binary: self.yosys.clone(),
            synthesize: self.synthesize,
            liberty: self.liberty.clone(),
            render_png: !self.no_png,
        }
    }

    pub fn pruner(&self) -> NetPruner {
        let strategy = if self.bridge_chains {
            ElisionStrategy::Sequential
        } else {
            ElisionStrategy::SinglePass
        };

        NetPruner::new().strategy(strategy)
    }

    pub fn pipeline(&self) -> Pipeline {
        let pipeline =
            Pipeline::new(self.pruner(), self.format).with_pruned_dot(self.pruned_dot);

        if self.from_dot {
            pipeline
        } else {
            pipeline.with_yosys(YosysRunner::new(self.yosys_config()))
        }
    }
}
