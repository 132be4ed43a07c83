use topicflow::graph::KeywordGraph;
use topicflow::lineage::CohortBuckets;
use topicflow::{run_periods, PeriodJob, PeriodRunner, TopicTracer, TopicflowConfig};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Topicflow v{}", topicflow::version());
    println!("==========================================");
    println!();

    let mut config = TopicflowConfig::default();
    config.consensus.rng_seed = Some(42);

    let (early, early_seeds) = period_graph(&[("rust", "borrow"), ("borrow", "lifetime"), ("tokio", "async")])?;
    let (late, late_seeds) = period_graph(&[("rust", "borrow"), ("borrow", "lifetime"), ("async", "await")])?;

    let runner = PeriodRunner::from_config(&config)?;
    let buckets = CohortBuckets::new([2])?;
    let jobs = vec![
        PeriodJob {
            period: 2001,
            graph: &early,
            weights: None,
            seeds: early_seeds,
            series: None,
        },
        PeriodJob {
            period: 2002,
            graph: &late,
            weights: None,
            seeds: late_seeds,
            series: None,
        },
    ];

    let report = run_periods(&runner, &buckets, jobs);

    println!("=== Consensus topics ===");
    for (cohort, periods) in report.index.iter() {
        for (period, topics) in periods {
            for (i, topic) in topics.iter().enumerate() {
                println!(
                    "cohort {cohort} period {period} topic {i}: seeds {:?} members {:?}",
                    topic.seed_labels(),
                    topic.member_labels()
                );
            }
        }
    }

    println!();
    println!("=== Lineages ===");
    let tracer = TopicTracer::from_config(&config.tracing);
    for lineage in report.trace(&tracer) {
        let periods: Vec<String> = lineage.periods().iter().map(i32::to_string).collect();
        println!("cohort {}: {}", lineage.cohort, periods.join(" -> "));
    }

    Ok(())
}

/// Build one period's graph; the first vertex of every other pair is a seed
fn period_graph(pairs: &[(&str, &str)]) -> anyhow::Result<(KeywordGraph, Vec<topicflow::VertexId>)> {
    let mut graph = KeywordGraph::new();
    let mut seeds = Vec::new();
    for (i, (a, b)) in pairs.iter().enumerate() {
        let a = graph.add_vertex(*a);
        let b = graph.add_vertex(*b);
        graph.add_edge(a, b, format!("author{i}"), 3)?;
        if i % 2 == 0 && !seeds.contains(&a) {
            seeds.push(a);
        }
    }
    Ok((graph, seeds))
}
