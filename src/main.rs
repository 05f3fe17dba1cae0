use std::fs;

use eyre::WrapErr;
use indicatif::{ParallelProgressIterator, ProgressStyle};
use mimalloc::MiMalloc;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use structopt::StructOpt;
use yosys_netgraph::cli::Opt;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn progress_style() -> eyre::Result<ProgressStyle> {
    Ok(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}",
    )?
    .progress_chars("#>-"))
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::from_args();
    if let Some(jobs) = opt.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()?;
    }

    let pipeline = opt.pipeline();
    tracing::info!("processing {} file(s)", opt.files.len());

    let results = opt
        .files
        .par_iter()
        .progress_with_style(progress_style()?)
        .map(|input| (input, pipeline.run(input)))
        .collect::<Vec<_>>();

    let mut reports = Vec::new();
    let mut failed = 0;
    for (input, result) in results {
        match result {
            Ok(report) => {
                tracing::info!(
                    "{}: {} -> {} nodes, {} -> {} edges",
                    input.display(),
                    report.before.nodes,
                    report.after.nodes,
                    report.before.edges,
                    report.after.edges
                );
                reports.push(report);
            }
            Err(err) => {
                failed += 1;
                tracing::error!("{}: {err:?}", input.display());
            }
        }
    }

    if let Some(path) = &opt.report {
        fs::write(path, serde_json::to_string_pretty(&reports)?)
            .wrap_err_with(|| format!("cannot write report {}", path.display()))?;
    }

    eyre::ensure!(
        failed == 0,
        "{failed} of {} file(s) failed",
        opt.files.len()
    );

    Ok(())
}
