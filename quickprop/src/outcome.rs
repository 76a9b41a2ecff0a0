//! Test outcomes, per-test directives and the lazily shrinkable evaluation tree.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::Arc;

/// Observational tags attached to a test case
pub type Labels = BTreeSet<String>;

/// A user callback run once when a property is reported falsified
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    pub fn new<F: Fn() + Send + Sync + 'static>(f: F) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callback")
    }
}

/// Details of a failing test case
#[derive(Debug, Clone, Default)]
pub struct Failure {
    /// Debug renderings of the sampled arguments, outermost first
    pub witness: Vec<String>,
    pub labels: Labels,
    /// Why the case failed, when known (an `Err` message or a panic)
    pub reason: Option<String>,
    /// Extra lines added with `counterexample`
    pub notes: Vec<String>,
    pub callbacks: Vec<Callback>,
}

impl Failure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    fn absorb(&mut self, other: Failure) {
        self.witness.extend(other.witness);
        self.labels.extend(other.labels);
        self.reason = match (self.reason.take(), other.reason) {
            (Some(left), Some(right)) => Some(format!("{}; {}", left, right)),
            (left, right) => left.or(right),
        };
        self.notes.extend(other.notes);
        self.callbacks.extend(other.callbacks);
    }
}

/// Verdict of a single test case
#[derive(Debug, Clone)]
pub enum Outcome {
    Success { labels: Labels },
    Failure(Failure),
    /// The case did not meet a precondition; it counts toward giving up, not
    /// toward passing
    Discard,
}

impl Outcome {
    pub fn success() -> Self {
        Outcome::Success {
            labels: Labels::new(),
        }
    }

    pub fn failure() -> Self {
        Outcome::Failure(Failure::new())
    }

    pub fn failure_with_reason(reason: impl Into<String>) -> Self {
        Outcome::Failure(Failure::with_reason(reason))
    }

    pub fn discard() -> Self {
        Outcome::Discard
    }

    pub fn from_bool(passed: bool) -> Self {
        if passed {
            Self::success()
        } else {
            Self::failure()
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn is_discard(&self) -> bool {
        matches!(self, Outcome::Discard)
    }

    /// Labels of a counted case; discards carry none
    pub fn labels(&self) -> Option<&Labels> {
        match self {
            Outcome::Success { labels } => Some(labels),
            Outcome::Failure(failure) => Some(&failure.labels),
            Outcome::Discard => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// Add labels to a counted case
    pub fn with_labels<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        match &mut self {
            Outcome::Success { labels } => labels.extend(extra),
            Outcome::Failure(failure) => failure.labels.extend(extra),
            Outcome::Discard => {}
        }
        self
    }

    pub(crate) fn with_witness_prefix(mut self, rendered: &[String]) -> Self {
        if let Outcome::Failure(failure) = &mut self {
            failure.witness.splice(0..0, rendered.iter().cloned());
        }
        self
    }

    /// Conjunction.
    ///
    /// A failure on either side wins, the left one first. Otherwise any
    /// discard makes the whole discarded, and two successes union their
    /// labels.
    pub fn and(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Failure(failure), _) => Outcome::Failure(failure),
            (Outcome::Success { labels }, Outcome::Failure(mut failure)) => {
                failure.labels.extend(labels);
                Outcome::Failure(failure)
            }
            (Outcome::Discard, Outcome::Failure(failure)) => Outcome::Failure(failure),
            (Outcome::Discard, _) | (_, Outcome::Discard) => Outcome::Discard,
            (Outcome::Success { mut labels }, Outcome::Success { labels: right }) => {
                labels.extend(right);
                Outcome::Success { labels }
            }
        }
    }

    /// Disjunction.
    ///
    /// A success on either side wins, the left one first. Two failures merge
    /// their witnesses; any other mix is discarded.
    pub fn or(self, other: Outcome) -> Outcome {
        match (self, other) {
            (success @ Outcome::Success { .. }, _) => success,
            (_, success @ Outcome::Success { .. }) => success,
            (Outcome::Failure(mut left), Outcome::Failure(right)) => {
                left.absorb(right);
                Outcome::Failure(left)
            }
            _ => Outcome::Discard,
        }
    }
}

/// Per-test directives steering the driver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directives {
    /// The property is expected to be falsified
    pub expect_failure: bool,
    /// Stop after the first successful test
    pub once: bool,
    /// Required minimum percentage of counted tests per label
    pub requirements: BTreeMap<String, f64>,
}

impl Directives {
    pub fn merge(mut self, other: Directives) -> Directives {
        self.expect_failure |= other.expect_failure;
        self.once |= other.once;
        for (label, percent) in other.requirements {
            let entry = self.requirements.entry(label).or_insert(percent);
            *entry = entry.max(percent);
        }
        self
    }
}

type Candidates = Rc<dyn Fn() -> Box<dyn Iterator<Item = Evaluation>>>;

/// Result of evaluating a property once: the outcome, its directives and the
/// shrink candidates to try if it failed.
///
/// Candidates are produced on demand, one level at a time, so an evaluation
/// tree is never materialised beyond the path the shrink search walks.
#[derive(Clone)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub directives: Directives,
    candidates: Option<Candidates>,
}

impl Evaluation {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            directives: Directives::default(),
            candidates: None,
        }
    }

    pub fn with_directives(mut self, directives: Directives) -> Self {
        self.directives = directives;
        self
    }

    /// Replace the shrink candidates
    pub fn with_candidates<F>(mut self, candidates: F) -> Self
    where
        F: Fn() -> Box<dyn Iterator<Item = Evaluation>> + 'static,
    {
        self.candidates = Some(Rc::new(candidates));
        self
    }

    pub fn has_candidates(&self) -> bool {
        self.candidates.is_some()
    }

    /// Re-evaluate the next level of shrink candidates
    pub fn candidates(&self) -> Box<dyn Iterator<Item = Evaluation>> {
        match &self.candidates {
            Some(candidates) => candidates(),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Apply `f` to this node and, lazily, to every node below it
    pub fn map_nodes<F>(self, f: F) -> Evaluation
    where
        F: Fn(Outcome, Directives) -> (Outcome, Directives) + 'static,
    {
        self.map_nodes_shared(Rc::new(f))
    }

    fn map_nodes_shared(self, f: Rc<dyn Fn(Outcome, Directives) -> (Outcome, Directives)>) -> Evaluation {
        let (outcome, directives) = f(self.outcome, self.directives);
        let candidates = self.candidates.map(|children| {
            let mapped: Candidates = Rc::new(move || -> Box<dyn Iterator<Item = Evaluation>> {
                let f = Rc::clone(&f);
                Box::new(children().map(move |child| child.map_nodes_shared(Rc::clone(&f))))
            });
            mapped
        });
        Evaluation {
            outcome,
            directives,
            candidates,
        }
    }

    /// Apply `f` to the outcome of every node
    pub fn map_outcome<F>(self, f: F) -> Evaluation
    where
        F: Fn(Outcome) -> Outcome + 'static,
    {
        self.map_nodes(move |outcome, directives| (f(outcome), directives))
    }
}

impl std::fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluation")
            .field("outcome", &self.outcome)
            .field("directives", &self.directives)
            .field("has_candidates", &self.has_candidates())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(label: &str) -> Outcome {
        Outcome::success().with_labels([label.to_string()])
    }

    fn failing(witness: &str) -> Outcome {
        Outcome::Failure(Failure {
            witness: vec![witness.to_string()],
            ..Failure::default()
        })
    }

    fn tag(outcome: &Outcome) -> &'static str {
        match outcome {
            Outcome::Success { .. } => "S",
            Outcome::Failure(_) => "F",
            Outcome::Discard => "D",
        }
    }

    fn all() -> Vec<Outcome> {
        vec![Outcome::success(), Outcome::failure(), Outcome::discard()]
    }

    #[test]
    fn test_and_truth_table() {
        let expected = [
            ["S", "F", "D"], // S and _
            ["F", "F", "F"], // F and _
            ["D", "F", "D"], // D and _
        ];
        for (i, left) in all().into_iter().enumerate() {
            for (j, right) in all().into_iter().enumerate() {
                assert_eq!(tag(&left.clone().and(right)), expected[i][j], "row {} col {}", i, j);
            }
        }
    }

    #[test]
    fn test_or_truth_table() {
        let expected = [
            ["S", "S", "S"], // S or _
            ["S", "F", "D"], // F or _
            ["S", "D", "D"], // D or _
        ];
        for (i, left) in all().into_iter().enumerate() {
            for (j, right) in all().into_iter().enumerate() {
                assert_eq!(tag(&left.clone().or(right)), expected[i][j], "row {} col {}", i, j);
            }
        }
    }

    #[test]
    fn test_and_unions_labels() {
        let combined = labelled("a").and(labelled("b"));
        let labels: Vec<&str> = combined.labels().unwrap().iter().map(String::as_str).collect();
        assert_eq!(labels, vec!["a", "b"]);

        let combined = labelled("a").and(failing("1"));
        assert!(combined.labels().unwrap().contains("a"));
    }

    #[test]
    fn test_or_merges_failures() {
        let left = Outcome::Failure(Failure {
            witness: vec!["1".to_string()],
            reason: Some("left".to_string()),
            ..Failure::default()
        });
        let right = Outcome::Failure(Failure {
            witness: vec!["2".to_string()],
            reason: Some("right".to_string()),
            ..Failure::default()
        });
        let merged = left.or(right);
        let failure = merged.as_failure().unwrap();
        assert_eq!(failure.witness, vec!["1", "2"]);
        assert_eq!(failure.reason.as_deref(), Some("left; right"));
    }

    #[test]
    fn test_discard_has_no_labels() {
        assert!(Outcome::discard().with_labels(["x".to_string()]).labels().is_none());
    }

    #[test]
    fn test_directives_merge() {
        let mut left = Directives::default();
        left.requirements.insert("small".to_string(), 10.0);
        let mut right = Directives {
            once: true,
            ..Directives::default()
        };
        right.requirements.insert("small".to_string(), 25.0);
        right.requirements.insert("large".to_string(), 5.0);

        let merged = left.merge(right);
        assert!(merged.once);
        assert!(!merged.expect_failure);
        assert_eq!(merged.requirements["small"], 25.0);
        assert_eq!(merged.requirements["large"], 5.0);
    }

    #[test]
    fn test_map_nodes_reaches_children_lazily() {
        let leaf = Evaluation::new(failing("leaf"));
        let root = Evaluation::new(failing("root")).with_candidates(move || {
            Box::new(std::iter::once(leaf.clone()))
        });

        let mapped = root.map_outcome(|outcome| outcome.with_witness_prefix(&["outer".to_string()]));
        assert_eq!(mapped.outcome.as_failure().unwrap().witness, vec!["outer", "root"]);

        let children: Vec<Evaluation> = mapped.candidates().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0].outcome.as_failure().unwrap().witness,
            vec!["outer", "leaf"]
        );
        assert!(!children[0].has_candidates());
    }

    #[test]
    fn test_callback_runs() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let callback = Callback::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        callback.clone().call();
        callback.call();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
