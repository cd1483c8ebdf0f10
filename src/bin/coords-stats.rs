use std::path::PathBuf;
use std::time::Instant;
use std::{env, process};

use asm_validate::{CacheMode, ReadInputs, ValidationConfig};
use asm_validate::pipeline;

use env_logger::Env;
use getopts::Options;
use log::info;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Parse arguments.
    let config = Config::new();

    // Run the validation.
    let results = pipeline::run(&config.validation).map_err(|x| x.to_string())?;

    // Statistics.
    let assembly = &results.assembly;
    info!(
        "Assembly: {} contigs, {} bp, L50 {}, N50 {}",
        assembly.len(), assembly.total_bases, assembly.l50, assembly.n50
    );
    if let Ok(purity) = results.ratios.global_purity() {
        info!("Global purity: {:.6}", purity);
    }
    if let Some(chimeric) = &results.chimeric_lca {
        info!("Chimeric contigs: {}", chimeric.total());
    }
    info!("Output written to {}", config.validation.output_dir.display());

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    info!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub validation: ValidationConfig,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] alignments.coords ref.stats contigs.fa[.gz]", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output directory (default: .)", "DIR");
        let cutoff_desc = format!("minimum contig and aligned read length (default: {})", ValidationConfig::MIN_LENGTH);
        opts.optopt("c", "cutoff", &cutoff_desc, "INT");
        opts.optopt("p", "phylogeny", "reference phylogeny table for read-level purity", "FILE");
        opts.optopt("", "ref-bam", "reads mapped to the references (required with -p)", "FILE");
        opts.optopt("", "asm-bam", "reads mapped to the contigs (required with -p)", "FILE");
        let chimeric_desc = format!("read-level purity threshold for chimeric contigs (default: {})", ValidationConfig::CHIMERIC_THRESHOLD);
        opts.optopt("", "chimeric", &chimeric_desc, "FLOAT");
        opts.optopt("", "cache", "alignment cache file (default: <coords>.sqlite)", "FILE");
        opts.optflag("", "no-cache", "do not cache the alignments");
        opts.optflag("", "rebuild", "rebuild the alignment cache if it exists");
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
        if matches.free.len() != 3 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }
        let output_dir = matches.opt_str("o").unwrap_or(String::from("."));
        let mut validation = ValidationConfig::new(
            matches.free[0].as_str(), matches.free[1].as_str(), matches.free[2].as_str(), output_dir.as_str()
        );

        // Parameters.
        if let Some(s) = matches.opt_str("c") {
            match s.parse::<usize>() {
                Ok(cutoff) => validation.min_length = cutoff,
                Err(_) => {
                    eprintln!("Invalid cutoff: {}", s);
                    process::exit(1);
                }
            }
        }
        if let Some(s) = matches.opt_str("chimeric") {
            match s.parse::<f64>() {
                Ok(threshold) if (0.0..=1.0).contains(&threshold) => validation.chimeric_threshold = threshold,
                _ => {
                    eprintln!("Invalid chimeric threshold: {}", s);
                    process::exit(1);
                }
            }
        }

        // Read-level inputs.
        let phylogeny = matches.opt_str("p");
        let reference_bam = matches.opt_str("ref-bam");
        let contig_bam = matches.opt_str("asm-bam");
        match (phylogeny, reference_bam, contig_bam) {
            (Some(phylogeny), Some(reference_bam), Some(contig_bam)) => {
                validation.reads = Some(ReadInputs {
                    phylogeny: PathBuf::from(phylogeny),
                    reference_bam: PathBuf::from(reference_bam),
                    contig_bam: PathBuf::from(contig_bam),
                });
            },
            (None, None, None) => (),
            _ => {
                eprintln!("Options -p, --ref-bam, and --asm-bam must be used together");
                process::exit(1);
            }
        }

        // Cache.
        if matches.opt_present("no-cache") {
            if matches.opt_present("cache") {
                eprintln!("Options --cache and --no-cache are mutually exclusive");
                process::exit(1);
            }
            validation.cache = CacheMode::Memory;
        } else if let Some(s) = matches.opt_str("cache") {
            validation.cache = CacheMode::File(PathBuf::from(s));
        }
        validation.rebuild_cache = matches.opt_present("rebuild");

        Config { validation }
    }
}

//-----------------------------------------------------------------------------
