//! Runnable host simulation: load a topology file, build its pipelines on
//! a single-core `Runtime`, start every pipeline, and run a fixed number of
//! scheduling periods, logging progress and any xrun notifications.

use std::path::PathBuf;

use adsp_component::TriggerCmd;
use adsp_runtime::{Runtime, TopologyDoc};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Host-hosted simulation of the audio co-processor pipeline runtime")]
struct Args {
    /// Path to a JSON topology document (see `adsp_runtime::topology`).
    topology: PathBuf,

    /// Number of scheduling periods to run after every pipeline starts.
    #[arg(long, default_value_t = 1000)]
    periods: u32,

    /// DSP core id this runtime simulates.
    #[arg(long, default_value_t = 0)]
    core: u8,
}

fn main() -> adsp_runtime::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let doc = TopologyDoc::load(&args.topology)?;
    let mut runtime = Runtime::new(args.core);
    let pipeline_ids = doc.apply(&mut runtime)?;

    for (&doc_id, &pipeline_id) in &pipeline_ids {
        runtime.trigger(pipeline_id, TriggerCmd::Start)?;
        info!(doc_id, pipeline = %pipeline_id, "pipeline started");
    }

    for period in 0..args.periods {
        for &pipeline_id in pipeline_ids.values() {
            match runtime.run_period(pipeline_id) {
                Ok(false) => {}
                Ok(true) => warn!(pipeline = %pipeline_id, period, "xrun threshold crossed"),
                Err(e) => warn!(pipeline = %pipeline_id, period, error = %e, "period failed"),
            }
        }
    }

    info!(periods = args.periods, "simulation finished");
    Ok(())
}
