use std::time::Instant;
use std::{env, fs, process};

use snarl_distance::{Decomposition, SnarlDistanceIndex};
use snarl_distance::utils;

use gbwt::GBZ;
use getopts::Options;
use simple_sds::serialize;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Check if the index already exists.
    if utils::file_exists(&config.index_file) {
        if config.overwrite {
            eprintln!("Overwriting index {}", config.index_file);
            fs::remove_file(&config.index_file).map_err(|x| x.to_string())?;
        } else {
            return Err(format!("Index {} already exists", config.index_file));
        }
    }

    // Load the inputs.
    eprintln!("Loading GBZ graph {}", config.gbz_file);
    let graph: GBZ = serialize::load_from(&config.gbz_file).map_err(|x| x.to_string())?;
    eprintln!("Loading decomposition {}", config.decomposition_file);
    let decomposition = Decomposition::load_from(&config.decomposition_file)?;
    eprintln!("The decomposition contains {} events", decomposition.len());

    // Build and write the index.
    let index = SnarlDistanceIndex::new(&graph, decomposition, true)?;
    eprintln!(
        "The index covers nodes {}..={} in {} connected components",
        index.min_node_id(), index.max_node_id(), index.connected_components()
    );
    serialize::serialize_to(&index, &config.index_file).map_err(|x| x.to_string())?;
    if let Some(size) = utils::file_size(&config.index_file) {
        eprintln!("Wrote index {} ({})", config.index_file, size);
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub gbz_file: String,
    pub decomposition_file: String,
    pub index_file: String,
    pub overwrite: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output file name (default: <graph>.dist)", "FILE");
        opts.optflag("", "overwrite", "overwrite the index file if it exists");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] graph.gbz snarls.txt", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        if matches.free.len() != 2 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }
        let gbz_file = matches.free[0].clone();
        let decomposition_file = matches.free[1].clone();
        let index_file = matches.opt_str("o").unwrap_or(format!("{}.dist", gbz_file));
        let overwrite = matches.opt_present("overwrite");

        Config {
            gbz_file,
            decomposition_file,
            index_file,
            overwrite,
        }
    }
}

//-----------------------------------------------------------------------------
