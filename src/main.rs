//! Command line tracer: load a compiled beamline description from
//! JSON, trace it and write the recorded events as CSV.

// std
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::exit;
// others
use structopt::StructOpt;
// rayx
use rayx::beamline::Beamline;
use rayx::tracer::{Platform, RayAttrFlag, Sequential, TraceConfig, Tracer};

#[derive(StructOpt)]
#[structopt(name = "rayx", about = "synchrotron beamline ray tracer")]
struct Opt {
    /// Beamline description (JSON)
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Write events here instead of stdout
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Trace the elements strictly in order
    #[structopt(short, long)]
    sequential: bool,

    /// Maximum number of events recorded per ray path
    #[structopt(short = "e", long, default_value = "32")]
    max_events: u32,

    /// Maximum number of rays per kernel dispatch
    #[structopt(short = "b", long, default_value = "100000")]
    batch_size: u32,

    /// Seed of the per-path random number streams
    #[structopt(long, default_value = "42")]
    seed: u64,
}

fn run(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(&opt.input)?;
    let beamline: Beamline = serde_json::from_reader(file)?;

    let config = TraceConfig {
        sequential: if opt.sequential {
            Sequential::Yes
        } else {
            Sequential::No
        },
        max_events_per_path: opt.max_events,
        max_batch_size: opt.batch_size,
        seed: opt.seed,
        record_mask_objects: None,
        record_mask_attrs: RayAttrFlag::ALL,
        ..TraceConfig::default()
    };

    let mut tracer = Tracer::new(Platform::Cpu)?;
    let soa = tracer.trace(&beamline, &config)?;

    log::info!(
        "traced {} events over {} paths",
        soa.num_events,
        soa.num_paths
    );

    let mut out: BufWriter<Box<dyn Write>> = BufWriter::new(match &opt.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    });

    writeln!(
        out,
        "path_id,path_event_id,event_type,object_id,source_id,order,\
         position_x,position_y,position_z,direction_x,direction_y,direction_z,\
         energy,optical_path_length"
    )?;
    for i in 0..soa.num_events {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            soa.path_id[i],
            soa.path_event_id[i],
            soa.event_type[i],
            soa.object_id[i],
            soa.source_id[i],
            soa.order[i],
            soa.position_x[i],
            soa.position_y[i],
            soa.position_z[i],
            soa.direction_x[i],
            soa.direction_y[i],
            soa.direction_z[i],
            soa.energy[i],
            soa.optical_path_length[i],
        )?;
    }
    out.flush()?;

    Ok(())
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();
    if let Err(err) = run(opt) {
        eprintln!("error: {}", err);
        exit(1);
    }
}
