use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use std::{env, process};

use asm_validate::{fasta, utils};

use env_logger::Env;
use getopts::Options;
use log::info;

//-----------------------------------------------------------------------------

// Prints name, GC content, and sequence length for each record in a FASTA file.
fn main() -> Result<(), String> {
    let start_time = Instant::now();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Parse arguments.
    let config = Config::new();

    info!("Reading sequences from {}", config.fasta_file.display());
    let mut reader = fasta::open(&config.fasta_file).map_err(|x| x.to_string())?;
    let mut output = BufWriter::new(io::stdout().lock());
    let mut records = 0;
    for record in fasta::records(&mut reader) {
        let record = record.map_err(|x| x.to_string())?;
        let sequence: &[u8] = record.sequence().as_ref();
        let gc_content = utils::gc_fraction(sequence);
        writeln!(output, "{}\t{:.2}\t{}", fasta::record_name(&record), gc_content, sequence.len()).map_err(|x| x.to_string())?;
        records += 1;
    }
    output.flush().map_err(|x| x.to_string())?;
    info!("Processed {} sequences", records);

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    info!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub fasta_file: PathBuf,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] sequences.fa[.gz]", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        let fasta_file = if let Some(s) = matches.free.first() {
            PathBuf::from(s)
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };

        Config { fasta_file }
    }
}

//-----------------------------------------------------------------------------
