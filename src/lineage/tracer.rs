//! Greedy topic tracing across periods
//!
//! Within a cohort, periods are visited in increasing order. Each topic not
//! yet claimed starts a lineage and is extended, period by period, with the
//! unclaimed topic whose members overlap the lineage's latest topic the most.

use super::{CohortTopics, TopicIndex};
use crate::config::TracingConfig;
use crate::consensus::{overlap_coefficient, ConsensusTopic};
use serde::Serialize;
use tracing::debug;

/// One topic in a lineage
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LineageLink<'a> {
    pub period: i32,
    /// Position of the topic within its period
    pub index: usize,
    /// Overlap with the previous link; `None` for the first one
    pub similarity: Option<f64>,
    pub topic: &'a ConsensusTopic,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicLineage<'a> {
    pub cohort: usize,
    pub links: Vec<LineageLink<'a>>,
}

impl<'a> TopicLineage<'a> {
    /// Number of matches made, i.e. links after the first
    pub fn matches(&self) -> usize {
        self.links.len().saturating_sub(1)
    }

    pub fn periods(&self) -> Vec<i32> {
        self.links.iter().map(|l| l.period).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TopicTracer {
    threshold: f64,
    allow_gaps: bool,
}

impl TopicTracer {
    pub fn new(threshold: f64) -> Self {
        TopicTracer {
            threshold,
            allow_gaps: true,
        }
    }

    pub fn from_config(config: &TracingConfig) -> Self {
        Self::new(config.similarity_threshold).with_gaps(config.allow_gaps)
    }

    /// Whether a lineage may skip a period with no qualifying match
    pub fn with_gaps(mut self, allow_gaps: bool) -> Self {
        self.allow_gaps = allow_gaps;
        self
    }

    /// Trace every cohort of the index, cohorts in ascending order
    pub fn trace<'a>(&self, index: &'a TopicIndex) -> Vec<TopicLineage<'a>> {
        index
            .iter()
            .flat_map(|(cohort, periods)| self.trace_cohort(cohort, periods))
            .collect()
    }

    /// Trace one cohort. Every topic ends up in exactly one lineage.
    pub fn trace_cohort<'a>(&self, cohort: usize, periods: &'a CohortTopics) -> Vec<TopicLineage<'a>> {
        let periods: Vec<(i32, &'a Vec<ConsensusTopic>)> = periods.iter().map(|(&p, t)| (p, t)).collect();
        let mut claimed: Vec<Vec<bool>> = periods.iter().map(|(_, t)| vec![false; t.len()]).collect();
        let mut lineages = Vec::new();

        for (pi, &(period, topics)) in periods.iter().enumerate() {
            for (ti, topic) in topics.iter().enumerate() {
                if claimed[pi][ti] {
                    continue;
                }
                claimed[pi][ti] = true;

                let mut links = vec![LineageLink {
                    period,
                    index: ti,
                    similarity: None,
                    topic,
                }];
                let mut tail = topic;

                for (pj, &(later, candidates)) in periods.iter().enumerate().skip(pi + 1) {
                    let mut best: Option<(usize, f64)> = None;
                    for (ci, candidate) in candidates.iter().enumerate() {
                        if claimed[pj][ci] {
                            continue;
                        }
                        let sim = overlap_coefficient(&tail.members, &candidate.members);
                        // strict comparison: the first candidate seen wins ties
                        if sim > self.threshold && best.map_or(true, |(_, b)| sim > b) {
                            best = Some((ci, sim));
                        }
                    }

                    match best {
                        Some((ci, sim)) => {
                            claimed[pj][ci] = true;
                            debug!(cohort, from = period, to = later, sim, "topic matched");
                            tail = &candidates[ci];
                            links.push(LineageLink {
                                period: later,
                                index: ci,
                                similarity: Some(sim),
                                topic: tail,
                            });
                        }
                        None if self.allow_gaps => continue,
                        None => break,
                    }
                }

                lineages.push(TopicLineage { cohort, links });
            }
        }

        lineages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Vertex, VertexId};

    fn topic(members: &[&str]) -> ConsensusTopic {
        let v: Vec<Vertex> = members
            .iter()
            .enumerate()
            .map(|(i, l)| Vertex::new(VertexId(i as u64), *l))
            .collect();
        ConsensusTopic::new(v.first().cloned(), v)
    }

    fn cohort(periods: Vec<(i32, Vec<ConsensusTopic>)>) -> CohortTopics {
        periods.into_iter().collect()
    }

    #[test]
    fn test_best_match_is_taken() {
        let data = cohort(vec![
            (2000, vec![topic(&["a", "b", "c"])]),
            (2001, vec![topic(&["a", "x", "y"]), topic(&["a", "b", "z"])]),
        ]);
        let lineages = TopicTracer::new(0.3).trace_cohort(5, &data);

        assert_eq!(lineages.len(), 2);
        assert_eq!(lineages[0].periods(), vec![2000, 2001]);
        assert_eq!(lineages[0].links[1].index, 1);
        // the leftover topic starts its own lineage
        assert_eq!(lineages[1].links[0].index, 0);
        assert_eq!(lineages[1].matches(), 0);
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let data = cohort(vec![
            (1, vec![topic(&["a", "b"])]),
            (2, vec![topic(&["a", "c"]), topic(&["b", "d"])]),
        ]);
        let lineages = TopicTracer::new(0.4).trace_cohort(5, &data);
        assert_eq!(lineages[0].links[1].index, 0);
    }

    #[test]
    fn test_lineage_extends_from_its_tail() {
        let data = cohort(vec![
            (1, vec![topic(&["a", "b"])]),
            (2, vec![topic(&["b", "c"])]),
            (3, vec![topic(&["c", "d"])]),
        ]);
        let lineages = TopicTracer::new(0.4).trace_cohort(5, &data);
        assert_eq!(lineages.len(), 1);
        assert_eq!(lineages[0].periods(), vec![1, 2, 3]);
    }

    #[test]
    fn test_gaps() {
        let data = cohort(vec![
            (1, vec![topic(&["a", "b"])]),
            (2, vec![topic(&["q", "r"])]),
            (3, vec![topic(&["a", "b", "c"])]),
        ]);

        let with_gaps = TopicTracer::new(0.5).trace_cohort(5, &data);
        assert_eq!(with_gaps[0].periods(), vec![1, 3]);

        let without = TopicTracer::new(0.5).with_gaps(false).trace_cohort(5, &data);
        assert_eq!(without[0].periods(), vec![1]);
        assert_eq!(without.len(), 3);
    }

    #[test]
    fn test_trace_index_by_cohort() {
        let mut index = TopicIndex::new();
        index.insert(10, 2001, vec![topic(&["a"])]);
        index.insert(5, 2000, vec![topic(&["a"])]);
        index.insert(5, 2001, vec![topic(&["a", "b"])]);

        let lineages = TopicTracer::new(0.5).trace(&index);
        assert_eq!(lineages.len(), 2);
        assert_eq!(lineages[0].cohort, 5);
        assert_eq!(lineages[0].periods(), vec![2000, 2001]);
        assert_eq!(lineages[1].cohort, 10);
    }
}
