use std::io::Write;
use topicflow::graph::{IdSequence, KeywordGraph, VertexId, VertexWeights, Weighting};
use topicflow::lineage::CohortBuckets;
use topicflow::{
    run_periods, run_periods_with, ErrorKind, PeriodJob, PeriodRunner, PipelineError, TopicTracer, TopicflowConfig,
};

fn config() -> TopicflowConfig {
    let mut config = TopicflowConfig::default();
    config.propagation.weighting = Weighting::IncidentUsage;
    config.consensus.trials = 5;
    config.consensus.rng_seed = Some(17);
    config
}

/// A triangle `a1 a2 a3` where every probability rescales to 1, plus extras
fn triangle(ids: &IdSequence, extra: &[&str]) -> KeywordGraph {
    let mut graph = KeywordGraph::with_sequence(ids.clone());
    let a1 = graph.add_vertex("a1");
    let a2 = graph.add_vertex("a2");
    let a3 = graph.add_vertex("a3");
    for (x, y) in [(a1, a2), (a2, a3), (a1, a3)] {
        graph.add_edge(x, y, "author", 2).unwrap();
    }
    for label in extra {
        graph.add_vertex(*label);
    }
    graph
}

fn seed(graph: &KeywordGraph, label: &str) -> VertexId {
    graph.vertex_by_label(label).unwrap().id
}

#[test]
fn test_periods_run_and_trace() {
    let ids = IdSequence::new();
    let g1 = triangle(&ids, &[]);
    let g2 = triangle(&ids, &["isolated"]);
    let runner = PeriodRunner::from_config(&config()).unwrap();

    let jobs = vec![
        PeriodJob {
            period: 2002,
            graph: &g2,
            weights: None,
            seeds: vec![seed(&g2, "a1")],
            series: None,
        },
        PeriodJob {
            period: 2001,
            graph: &g1,
            weights: None,
            seeds: vec![seed(&g1, "a1")],
            series: None,
        },
    ];
    let report = run_periods(&runner, &CohortBuckets::default(), jobs);

    assert!(report.failures.is_empty());
    assert_eq!(report.summaries.len(), 2);
    assert_eq!(report.summaries[0].period, 2001);
    assert_eq!(report.summaries[0].cohort, 5);
    assert_eq!(report.summaries[1].members, 2);

    let topics = report.index.get(5, 2002).unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].member_labels(), vec!["a2", "a3"]);

    let lineages = report.trace(&TopicTracer::new(0.5));
    assert_eq!(lineages.len(), 1);
    assert_eq!(lineages[0].periods(), vec![2001, 2002]);
    assert_eq!(lineages[0].links[1].similarity, Some(1.0));
}

#[test]
fn test_failed_period_does_not_stop_the_others() {
    let ids = IdSequence::new();
    let good = triangle(&ids, &[]);
    let bad = triangle(&ids, &[]);
    let runner = PeriodRunner::from_config(&config()).unwrap();

    let jobs = vec![
        PeriodJob {
            period: 2001,
            graph: &bad,
            weights: None,
            seeds: vec![VertexId(9_999)],
            series: None,
        },
        PeriodJob {
            period: 2002,
            graph: &good,
            weights: None,
            seeds: vec![seed(&good, "a2")],
            series: None,
        },
    ];
    let report = run_periods(&runner, &CohortBuckets::default(), jobs);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].period, 2001);
    assert_eq!(report.failures[0].kind, ErrorKind::BadInput);
    assert!(report.failures[0].reason.contains("9999"));
    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.index.topic_count(), 1);
}

#[test]
fn test_explicit_weights_override_configured_weighting() {
    let mut graph = KeywordGraph::new();
    let a = graph.add_vertex("a");
    let b = graph.add_vertex("b");
    graph.add_edge(a, b, "author", 1).unwrap();

    // W(b) = 0 blocks every infection into b
    let weights: VertexWeights = [(a, 1.0), (b, 0.0)].into_iter().collect();
    let runner = PeriodRunner::from_config(&config()).unwrap();
    let topics = runner.run(&graph, Some(&weights), &[a]).unwrap();
    assert_eq!(topics.len(), 1);
    assert!(topics[0].members.is_empty());

    let topics = runner.run(&graph, None, &[a]).unwrap();
    assert_eq!(topics[0].member_labels(), vec!["b"]);
}

#[test]
fn test_observer_sees_every_trial() {
    let ids = IdSequence::new();
    let graph = triangle(&ids, &[]);
    let runner = PeriodRunner::from_config(&config()).unwrap();
    let jobs = vec![PeriodJob {
        period: 2001,
        graph: &graph,
        weights: None,
        seeds: vec![seed(&graph, "a1")],
        series: None,
    }];

    let mut seen = Vec::new();
    run_periods_with(&runner, &CohortBuckets::default(), jobs, |job, cohort, outcome| {
        seen.push((job.period, cohort, outcome.trials.len()));
    });
    assert_eq!(seen, vec![(2001, 5, 5)]);
}

/// `n` keywords with no co-occurrences, all of them seeds
fn isolated(ids: &IdSequence, n: usize) -> (KeywordGraph, Vec<VertexId>) {
    let mut graph = KeywordGraph::with_sequence(ids.clone());
    let seeds = (0..n).map(|i| graph.add_vertex(format!("k{i}"))).collect();
    (graph, seeds)
}

#[test]
fn test_cohort_ties_follow_the_series_bucket() {
    let ids = IdSequence::new();
    let (g20, s20) = isolated(&ids, 20);
    let (g10, s10) = isolated(&ids, 10);
    let (g15a, s15a) = isolated(&ids, 15);
    let (g15b, s15b) = isolated(&ids, 15);
    let runner = PeriodRunner::from_config(&config()).unwrap();
    let buckets = CohortBuckets::new([10, 20]).unwrap();

    let job = |period, graph, seeds, series| PeriodJob {
        period,
        graph,
        weights: None,
        seeds,
        series: Some(series),
    };
    let jobs = vec![
        job(2000, &g20, s20, 20),
        job(2000, &g10, s10, 10),
        job(2001, &g15a, s15a, 20),
        job(2001, &g15b, s15b, 10),
    ];
    let report = run_periods(&runner, &buckets, jobs);

    assert!(report.failures.is_empty());
    let cohorts: Vec<(i32, usize, usize)> = report
        .summaries
        .iter()
        .map(|s| (s.period, s.seeds, s.cohort))
        .collect();
    assert_eq!(cohorts, vec![(2000, 10, 10), (2000, 20, 20), (2001, 15, 10), (2001, 15, 20)]);
}

#[test]
fn test_duplicate_seeds_do_not_inflate_the_cohort() {
    let ids = IdSequence::new();
    let graph = triangle(&ids, &[]);
    let a1 = seed(&graph, "a1");
    let runner = PeriodRunner::from_config(&config()).unwrap();
    let jobs = vec![PeriodJob {
        period: 2001,
        graph: &graph,
        weights: None,
        seeds: vec![a1, a1, a1, a1],
        series: None,
    }];

    let report = run_periods(&runner, &CohortBuckets::new([2, 4]).unwrap(), jobs);
    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.summaries[0].seeds, 1);
    assert_eq!(report.summaries[0].cohort, 2);
}

#[test]
fn test_default_weighting_reaches_rarely_used_keywords() {
    let mut graph = KeywordGraph::new();
    let hub = graph.add_vertex("hub");
    let dense = graph.add_vertex("dense");
    let rare = graph.add_vertex("rare");
    graph.add_edge(hub, dense, "author", 5).unwrap();
    graph.add_edge(hub, rare, "author", 1).unwrap();

    let mut config = TopicflowConfig::default();
    config.consensus.trials = 20;
    config.consensus.rng_seed = Some(3);
    let runner = PeriodRunner::from_config(&config).unwrap();

    let topics = runner.run(&graph, None, &[hub]).unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].member_labels(), vec!["dense", "rare"]);
}

#[test]
fn test_config_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "propagation:\n  intensity: 2.0\nconsensus:\n  trials: 3\n  rng_seed: 5\ntracing:\n  cohort_targets: [3, 6]"
    )
    .unwrap();

    let config = TopicflowConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.propagation.intensity, 2.0);
    assert_eq!(config.consensus.trials, 3);
    assert_eq!(config.consensus.frequency_ratio, 0.5);
    assert_eq!(config.tracing.buckets().unwrap().targets(), &[3, 6]);
    assert!(PeriodRunner::from_config(&config).is_ok());
}

#[test]
fn test_invalid_config_is_bad_input() {
    let mut config = config();
    config.consensus.frequency_ratio = 0.0;
    let err = PeriodRunner::from_config(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert_eq!(err.kind(), ErrorKind::BadInput);
}
