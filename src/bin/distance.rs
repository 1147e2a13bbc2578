use std::time::Instant;
use std::{env, process};

use snarl_distance::{Position, SnarlDistanceIndex};

use getopts::Options;
use simple_sds::serialize;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Load the index.
    let index: SnarlDistanceIndex = serialize::load_from(&config.index_file).map_err(|x| x.to_string())?;
    for position in [config.from, config.to] {
        if !index.has_node(position.node) {
            return Err(format!("The index does not contain node {}", position.node));
        }
        let length = index.node_length(index.get_net(position.handle()));
        if position.offset > length {
            return Err(format!("Position {} is past the end of a node of length {}", position, length));
        }
    }

    // Query.
    match index.minimum_distance(config.from, config.to) {
        Some(distance) => println!("{}", distance),
        None => println!("unreachable"),
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub index_file: String,
    pub from: Position,
    pub to: Position,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] graph.dist from to\n\nPositions are of the form >12:3 or <15:0.", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        if matches.free.len() != 3 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }

        let index_file = matches.free[0].clone();
        let parse = |value: &str| match Position::parse(value) {
            Ok(position) => position,
            Err(err) => {
                eprintln!("{}", err);
                process::exit(1);
            }
        };
        let from = parse(&matches.free[1]);
        let to = parse(&matches.free[2]);

        Config {
            index_file,
            from,
            to,
        }
    }
}

//-----------------------------------------------------------------------------
