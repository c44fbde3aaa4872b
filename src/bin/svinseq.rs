use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{error, info, warn};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use svinseq::input::AlignmentInput;
use svinseq::output::FastaWriter;
use svinseq::var::insertion::{recover_insertion, InsertionVariant};
use svinseq::vcf::VariantInput;

#[derive(Parser)]
#[command(name = "svinseq")]
#[command(
    about = "Recover insertion sequences for structural variant calls",
    long_about = "Scans an indexed BAM for reads supporting each INS record in a VCF and emits one consensus insertion sequence per variant as FASTA on stdout."
)]
struct Cli {
    /// VCF file with structural variant calls (SVTYPE/SVLEN/RNAMES INFO fields as written by long-read SV callers).
    #[arg(long, required = true)]
    vcf: String,
    /// Sorted BAM file containing the aligned reads. Must have an associated .bai index file.
    #[arg(long, required = true)]
    bam: String,
    /// Write the consensus FASTA to this path instead of stdout.
    #[arg(long)]
    out: Option<String>,
    /// Log verbosity level
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
    /// Write log output to a file instead of stderr
    #[arg(long)]
    log_file: Option<String>,
    /// Append to log file instead of truncating
    #[arg(long)]
    append_log: bool,
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut variants = VariantInput::open(&cli.vcf)?;
    let mut bam = AlignmentInput::open(&cli.bam)?;

    let stdout = io::stdout();
    let mut fasta: FastaWriter<Box<dyn Write>> = match &cli.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path))?;
            FastaWriter::new(Box::new(BufWriter::new(file)))
        }
        None => FastaWriter::new(Box::new(BufWriter::new(stdout.lock()))),
    };

    let mut n_records = 0u64;
    let mut n_insertions = 0u64;
    let mut n_written = 0u64;

    while let Some(rec) = variants.next_record()? {
        n_records += 1;

        let Some(sv_type) = rec.sv_type.as_deref() else {
            anyhow::bail!(
                "VCF record at {}:{} has no SVTYPE INFO field",
                rec.chrom,
                rec.pos + 1
            );
        };
        if sv_type != "INS" {
            continue;
        }
        n_insertions += 1;

        let Some(id) = rec.id.as_deref() else {
            warn!(
                "skipping INS record at {}:{} without an ID",
                rec.chrom,
                rec.pos + 1
            );
            continue;
        };

        let contig_len = variants
            .contig_length(&rec.chrom)
            .or_else(|| bam.reference_length(&rec.chrom));
        let var = InsertionVariant::new(
            id,
            &rec.chrom,
            rec.pos,
            rec.sv_len.unwrap_or(0),
            rec.read_names.clone(),
            contig_len,
        );

        let consensus = recover_insertion(&mut bam, &var)?;
        if !consensus.is_empty() {
            fasta.write_record(&consensus.id, &consensus.sequence)?;
            n_written += 1;
        }
    }
    fasta.flush()?;

    info!(
        "{} VCF records, {} insertion variants, {} consensus sequences written",
        n_records, n_insertions, n_written
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    log_builder
        .filter_level(cli.log_level.to_level_filter())
        .format_module_path(false);
    if let Some(ref path) = cli.log_file {
        let file = if cli.append_log {
            std::fs::File::options().create(true).append(true).open(path)
        } else {
            std::fs::File::create(path)
        }
        .unwrap_or_else(|e| panic!("Could not open log file '{}': {}", path, e));
        log_builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    log_builder.init();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
