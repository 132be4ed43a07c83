//! Topicflow CLI: runs the topic pipeline over a directory of period graphs
//!
//! Graph directories hold one `<period>.json` graph record per period. Seed
//! lists and topics are exchanged as TSV record logs.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use topicflow::lineage::TopicIndex;
use topicflow::records::{
    load_graph_dir, read_tsv_file, LineageRecord, SeedRecord, StepRecord, TopicRecord, TsvWriter,
};
use topicflow::scoring::select_seeds;
use topicflow::{
    run_periods_with, ErrorKind, IdSequence, PeriodFailure, PeriodJob, PeriodRunner, ScoringMeasure, TopicTracer,
    TopicflowConfig,
};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "topicflow", version, about = "Topic discovery and lineage tracing over keyword graphs")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover consensus topics for every period
    Run {
        /// Directory of `<period>.json` graph records
        #[arg(long)]
        graphs: PathBuf,

        /// Seed TSV as written by `topicflow seeds`
        #[arg(long)]
        seeds: PathBuf,

        /// YAML configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to write topic records
        #[arg(long)]
        out: Option<PathBuf>,

        /// Where to write cascade step records
        #[arg(long)]
        steps: Option<PathBuf>,
    },
    /// Select seed keywords by centrality
    Seeds {
        #[arg(long)]
        graphs: PathBuf,

        /// Seed-set sizes, comma separated; `seeding.k` when absent
        #[arg(long, value_delimiter = ',')]
        k: Vec<usize>,

        /// Centrality measure short name (pag, clu, clo, deg)
        #[arg(long)]
        measure: Option<ScoringMeasure>,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to write the seed TSV; stdout when absent
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Link topics across periods
    Trace {
        /// Topic TSV as written by `topicflow run`
        #[arg(long)]
        topics: PathBuf,

        /// Overlap a later topic needs to continue a lineage
        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            graphs,
            seeds,
            config,
            out,
            steps,
        } => run_pipeline(&graphs, &seeds, config.as_deref(), out.as_deref(), steps.as_deref(), cli.format),
        Commands::Seeds {
            graphs,
            k,
            measure,
            config,
            out,
        } => run_seeds(&graphs, &k, measure, config.as_deref(), out.as_deref()),
        Commands::Trace {
            topics,
            threshold,
            config,
        } => run_trace(&topics, threshold, config.as_deref(), cli.format),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TopicflowConfig> {
    match path {
        Some(p) => Ok(TopicflowConfig::from_yaml_file(p)?),
        None => Ok(TopicflowConfig::default()),
    }
}

fn run_pipeline(
    graphs_dir: &Path,
    seeds_path: &Path,
    config_path: Option<&Path>,
    out: Option<&Path>,
    steps_out: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let runner = PeriodRunner::from_config(&config)?;
    let buckets = config.tracing.buckets()?;

    let graphs = load_graph_dir(graphs_dir, &IdSequence::new())
        .with_context(|| format!("loading graphs from {}", graphs_dir.display()))?;
    let by_period: HashMap<i32, usize> = graphs.iter().enumerate().map(|(i, g)| (g.period, i)).collect();

    let seed_log = read_tsv_file::<SeedRecord>(seeds_path)
        .with_context(|| format!("reading seeds from {}", seeds_path.display()))?;
    if seed_log.skipped > 0 {
        warn!(skipped = seed_log.skipped, "some seed rows were malformed");
    }

    let mut jobs = Vec::new();
    let mut unresolved = Vec::new();
    for row in &seed_log.rows {
        let period = row.record.period;
        let Some(&idx) = by_period.get(&period) else {
            unresolved.push(bad_seed_row(period, row.cohort, format!("no graph for period {period}")));
            continue;
        };
        let pg = &graphs[idx];
        match row.record.seed_ids(&pg.graph) {
            Ok(seeds) => jobs.push(PeriodJob {
                period,
                graph: &pg.graph,
                weights: pg.weights.as_ref(),
                seeds,
                series: Some(row.cohort),
            }),
            Err(e) => unresolved.push(bad_seed_row(period, row.cohort, e.to_string())),
        }
    }

    let mut step_writer = match steps_out {
        Some(p) => Some(TsvWriter::new(BufWriter::new(File::create(p)?))?),
        None => None,
    };
    let mut step_error = None;

    let mut report = run_periods_with(&runner, &buckets, jobs, |job, cohort, outcome| {
        let Some(writer) = step_writer.as_mut() else { return };
        if step_error.is_some() {
            return;
        }
        for (trial, t) in outcome.trials.iter().enumerate() {
            for step in &t.steps {
                let written = StepRecord::from_step(job.period, trial, step, job.graph)
                    .and_then(|record| writer.write_row(job.period, cohort, &record));
                if let Err(e) = written {
                    step_error = Some(e);
                    return;
                }
            }
        }
    });
    if let Some(e) = step_error {
        return Err(e).context("writing step records");
    }
    if let Some(writer) = step_writer {
        let rows = writer.rows();
        writer.into_inner()?;
        info!(rows, "wrote step records");
    }
    report.failures.extend(unresolved);

    if let Some(path) = out {
        let mut writer = TsvWriter::new(BufWriter::new(File::create(path)?))?;
        for (cohort, periods) in report.index.iter() {
            for (&period, topics) in periods {
                for topic in topics {
                    writer.write_row(period, cohort, &TopicRecord::from_topic(period, cohort, topic))?;
                }
            }
        }
        info!(rows = writer.rows(), path = %path.display(), "wrote topic records");
        writer.into_inner()?;
    }

    #[derive(Serialize)]
    struct RunOutput<'a> {
        summaries: &'a [topicflow::pipeline::PeriodSummary],
        failures: &'a [PeriodFailure],
    }

    let mut rows: Vec<Vec<String>> = report
        .summaries
        .iter()
        .map(|s| {
            vec![
                s.period.to_string(),
                s.cohort.to_string(),
                s.seeds.to_string(),
                s.topics.to_string(),
                s.members.to_string(),
                "ok".to_string(),
            ]
        })
        .collect();
    rows.extend(report.failures.iter().map(|f| {
        vec![
            f.period.to_string(),
            f.cohort.to_string(),
            String::new(),
            String::new(),
            String::new(),
            format!("{}: {}", f.kind, f.reason),
        ]
    }));

    emit(
        format,
        &["period", "cohort", "seeds", "topics", "members", "status"],
        &rows,
        &RunOutput {
            summaries: &report.summaries,
            failures: &report.failures,
        },
    )?;

    if report.summaries.is_empty() && !report.failures.is_empty() {
        bail!("every period failed");
    }
    Ok(())
}

fn bad_seed_row(period: i32, cohort: usize, reason: String) -> PeriodFailure {
    warn!(period, cohort, %reason, "skipping seed row");
    PeriodFailure {
        period,
        cohort,
        kind: ErrorKind::BadInput,
        reason,
    }
}

fn run_seeds(
    graphs_dir: &Path,
    ks: &[usize],
    measure: Option<ScoringMeasure>,
    config_path: Option<&Path>,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let ks = if ks.is_empty() { config.seeding.k.as_slice() } else { ks };
    if ks.contains(&0) {
        bail!("--k entries must be positive");
    }
    let measure = measure.unwrap_or(config.seeding.measure);
    let graphs = load_graph_dir(graphs_dir, &IdSequence::new())?;

    let sink: Box<dyn std::io::Write> = match out {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = TsvWriter::new(sink)?;

    for pg in &graphs {
        for &k in ks {
            let seeds = select_seeds(&pg.graph, measure, pg.weights.as_ref(), config.seeding.blend, k);
            let record = SeedRecord::new(pg.period, &pg.graph, &seeds)?;
            writer.write_row(pg.period, k, &record)?;
        }
    }
    info!(rows = writer.rows(), %measure, "wrote seed records");
    writer.into_inner()?;
    Ok(())
}

fn run_trace(
    topics_path: &Path,
    threshold: Option<f64>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(t) = threshold {
        if !(0.0..=1.0).contains(&t) {
            bail!("--threshold must be in [0, 1], got {t}");
        }
        config.tracing.similarity_threshold = t;
    }

    let log = read_tsv_file::<TopicRecord>(topics_path)
        .with_context(|| format!("reading topics from {}", topics_path.display()))?;
    if log.skipped > 0 {
        warn!(skipped = log.skipped, "some topic rows were malformed");
    }

    let mut index = TopicIndex::new();
    for row in &log.rows {
        index.insert(row.cohort, row.period, vec![row.record.to_topic()]);
    }

    let tracer = TopicTracer::from_config(&config.tracing);
    let lineages = tracer.trace(&index);
    let records: Vec<LineageRecord> = lineages.iter().map(LineageRecord::from_lineage).collect();

    let mut rows = Vec::new();
    for (n, lineage) in lineages.iter().enumerate() {
        for link in &lineage.links {
            rows.push(vec![
                lineage.cohort.to_string(),
                n.to_string(),
                link.period.to_string(),
                link.similarity.map(|s| format!("{s:.3}")).unwrap_or_default(),
                link.topic.seed_labels().join(" "),
                link.topic.member_labels().join(" "),
            ]);
        }
    }

    emit(
        format,
        &["cohort", "lineage", "period", "similarity", "seeds", "members"],
        &rows,
        &records,
    )
}

fn emit<T: Serialize>(format: OutputFormat, columns: &[&str], rows: &[Vec<String>], json: &T) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(json)?);
        }
        OutputFormat::Csv => {
            println!("{}", columns.join(","));
            for row in rows {
                let cells: Vec<String> = row.iter().map(|c| format_csv_value(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(columns);
            for row in rows {
                table.add_row(row);
            }

            println!("{}", table);
            println!("{} row(s)", rows.len());
        }
    }
    Ok(())
}

fn format_csv_value(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
