//! Properties and their combinators.
//!
//! A [`Property`] maps a random source and a size to an [`Evaluation`]. It is
//! an immutable value; every combinator returns a new property. Shrink
//! candidates of a failing evaluation re-run the property lazily, so the
//! driver only ever pays for the candidates its search actually visits.

use std::any::Any;
use std::fmt::{Debug, Display};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::trace;

use crate::arbitrary::Arbitrary;
use crate::config::GeneratorConfig;
use crate::outcome::{Callback, Directives, Evaluation, Failure, Outcome};
use crate::registry::StrategyRegistry;
use crate::rng::RandomSource;
use crate::strategy::{Strategy, render};

type PropertyFn = dyn Fn(RandomSource, &GeneratorConfig) -> Evaluation + Send + Sync;

/// A testable statement over randomly generated inputs
#[derive(Clone)]
pub struct Property {
    run: Arc<PropertyFn>,
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Property")
    }
}

/// Values that can be turned into a [`Property`]: `bool`, `()`, [`Outcome`],
/// `Result<(), E>` and `Property` itself.
///
/// The provided methods make the combinators available on every testable
/// value, so a body can return `(x > 0).label("positive")` directly. Types
/// with inherent methods of the same name (`Result::and`, `Outcome::or`) need
/// an explicit `.property()` first.
pub trait Testable: Sized {
    fn property(self) -> Property;

    fn and<T: Testable>(self, other: T) -> Property {
        self.property().and(other)
    }

    fn or<T: Testable>(self, other: T) -> Property {
        self.property().or(other)
    }

    fn label(self, label: impl Into<String>) -> Property {
        self.property().label(label)
    }

    fn classify(self, condition: bool, label: impl Into<String>) -> Property {
        self.property().classify(condition, label)
    }

    fn collect<V: Debug>(self, value: V) -> Property {
        self.property().collect(value)
    }

    fn cover(self, condition: bool, percent: f64, label: impl Into<String>) -> Property {
        self.property().cover(condition, percent, label)
    }

    fn counterexample(self, note: impl Into<String>) -> Property {
        self.property().counterexample(note)
    }

    fn when_fail<F: Fn() + Send + Sync + 'static>(self, callback: F) -> Property {
        self.property().when_fail(callback)
    }

    fn expect_failure(self) -> Property {
        self.property().expect_failure()
    }

    fn once(self) -> Property {
        self.property().once()
    }
}

impl Testable for Property {
    fn property(self) -> Property {
        self
    }
}

impl Testable for bool {
    fn property(self) -> Property {
        Property::from_outcome(Outcome::from_bool(self))
    }
}

impl Testable for () {
    fn property(self) -> Property {
        Property::from_outcome(Outcome::success())
    }
}

impl Testable for Outcome {
    fn property(self) -> Property {
        Property::from_outcome(self)
    }
}

impl<E: Display> Testable for Result<(), E> {
    fn property(self) -> Property {
        match self {
            Ok(()) => Property::from_outcome(Outcome::success()),
            Err(error) => Property::from_outcome(Outcome::failure_with_reason(error.to_string())),
        }
    }
}

impl Property {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(RandomSource, &GeneratorConfig) -> Evaluation + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    /// A property that always evaluates to `outcome`
    pub fn from_outcome(outcome: Outcome) -> Self {
        Self::new(move |_, _| Evaluation::new(outcome.clone()))
    }

    pub fn evaluate(&self, source: RandomSource, config: &GeneratorConfig) -> Evaluation {
        (self.run)(source, config)
    }

    /// Rewrite every node of every evaluation
    fn map_nodes<F>(self, f: F) -> Property
    where
        F: Fn(Outcome, Directives) -> (Outcome, Directives) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Property::new(move |source, config| {
            let f = Arc::clone(&f);
            self.evaluate(source, config)
                .map_nodes(move |outcome, directives| f(outcome, directives))
        })
    }

    fn map_directives<F>(self, f: F) -> Property
    where
        F: Fn(&mut Directives) + Send + Sync + 'static,
    {
        self.map_nodes(move |outcome, mut directives| {
            f(&mut directives);
            (outcome, directives)
        })
    }

    /// Conjunction; the right side is not evaluated when the left fails
    pub fn and<T: Testable>(self, other: T) -> Property {
        let right = other.property();
        Property::new(move |source, config| {
            let (left_source, right_source) = source.split();
            let left = self.evaluate(left_source, config);
            if left.outcome.is_failure() {
                return left;
            }
            conjoin(left, right.evaluate(right_source, config))
        })
    }

    /// Disjunction; the right side is not evaluated when the left succeeds
    pub fn or<T: Testable>(self, other: T) -> Property {
        let right = other.property();
        Property::new(move |source, config| {
            let (left_source, right_source) = source.split();
            let left = self.evaluate(left_source, config);
            if left.outcome.is_success() {
                return left;
            }
            disjoin(left, right.evaluate(right_source, config))
        })
    }

    /// Tag every counted case with `label`
    pub fn label(self, label: impl Into<String>) -> Property {
        let label = label.into();
        self.map_nodes(move |outcome, directives| {
            (outcome.with_labels([label.clone()]), directives)
        })
    }

    /// Tag the case with `label` when `condition` holds
    pub fn classify(self, condition: bool, label: impl Into<String>) -> Property {
        if condition { self.label(label) } else { self }
    }

    /// Tag the case with the rendering of `value`
    pub fn collect<V: Debug>(self, value: V) -> Property {
        self.label(render(&value))
    }

    /// Require that at least `percent` of counted cases carry `label`.
    ///
    /// The case is tagged when `condition` holds; the requirement is checked
    /// over the whole run and reported when it is not met.
    pub fn cover(self, condition: bool, percent: f64, label: impl Into<String>) -> Property {
        let label = label.into();
        let requirement = label.clone();
        self.classify(condition, label).map_directives(move |directives| {
            let entry = directives
                .requirements
                .entry(requirement.clone())
                .or_insert(percent);
            *entry = entry.max(percent);
        })
    }

    /// Attach a note printed with the counterexample
    pub fn counterexample(self, note: impl Into<String>) -> Property {
        let note = note.into();
        self.map_nodes(move |outcome, directives| {
            let outcome = match outcome {
                Outcome::Failure(mut failure) => {
                    failure.notes.push(note.clone());
                    Outcome::Failure(failure)
                }
                other => other,
            };
            (outcome, directives)
        })
    }

    /// Run `callback` once, after shrinking, if the property is falsified
    pub fn when_fail<F: Fn() + Send + Sync + 'static>(self, callback: F) -> Property {
        let callback = Callback::new(callback);
        self.map_nodes(move |outcome, directives| {
            let outcome = match outcome {
                Outcome::Failure(mut failure) => {
                    failure.callbacks.push(callback.clone());
                    Outcome::Failure(failure)
                }
                other => other,
            };
            (outcome, directives)
        })
    }

    /// The run passes only if some case fails
    pub fn expect_failure(self) -> Property {
        self.map_directives(|directives| directives.expect_failure = true)
    }

    /// Stop the run after one successful case
    pub fn once(self) -> Property {
        self.map_directives(|directives| directives.once = true)
    }
}

/// Combine two evaluations under conjunction when the left did not fail
fn conjoin(left: Evaluation, right: Evaluation) -> Evaluation {
    if right.outcome.is_failure() {
        let left_directives = left.directives;
        let left_labels = left.outcome.labels().cloned().unwrap_or_default();
        return right.map_nodes(move |outcome, directives| {
            (
                outcome.with_labels(left_labels.iter().cloned()),
                left_directives.clone().merge(directives),
            )
        });
    }
    let directives = left.directives.merge(right.directives);
    Evaluation::new(left.outcome.and(right.outcome)).with_directives(directives)
}

/// Combine two evaluations under disjunction when the left did not succeed.
///
/// Two failures stay failing only while both sides keep failing, so shrink
/// candidates try the left side's candidates against the fixed right side,
/// then the right side's against the fixed left.
fn disjoin(left: Evaluation, right: Evaluation) -> Evaluation {
    if !(left.outcome.is_failure() && right.outcome.is_failure()) {
        let directives = left.directives.merge(right.directives);
        return Evaluation::new(left.outcome.or(right.outcome)).with_directives(directives);
    }

    let outcome = left.outcome.clone().or(right.outcome.clone());
    let directives = left.directives.clone().merge(right.directives.clone());
    Evaluation::new(outcome)
        .with_directives(directives)
        .with_candidates(move || {
            let fixed_right = right.clone();
            let fixed_left = left.clone();
            let left_side = left
                .candidates()
                .map(move |candidate| disjoin(candidate, fixed_right.clone()));
            let right_side = right
                .candidates()
                .map(move |candidate| disjoin(fixed_left.clone(), candidate));
            Box::new(left_side.chain(right_side))
        })
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Evaluate `body(value)`, turning a panic into a failure
fn run_body<T, P, F>(body: &F, value: T, source: RandomSource, config: &GeneratorConfig) -> Evaluation
where
    P: Testable,
    F: Fn(T) -> P,
{
    match catch_unwind(AssertUnwindSafe(|| body(value).property().evaluate(source, config))) {
        Ok(evaluation) => evaluation,
        Err(payload) => Evaluation::new(Outcome::Failure(Failure::with_reason(format!(
            "panicked: {}",
            panic_message(payload.as_ref())
        )))),
    }
}

/// Renders a quantified value as its witness entries, one per argument
type Render<T> = Arc<dyn Fn(&T) -> Vec<String> + Send + Sync>;

/// Evaluate the body at `value`, recording the value in the witness and
/// offering its shrinks ahead of the body's own candidates.
///
/// Every descended node offers the value's shrinks again, so a tuple of
/// arguments is shrunk until no component shrinks further.
fn shrink_node<T, P, F>(
    value: T,
    strategy: Strategy<T>,
    render: Render<T>,
    body: Arc<F>,
    source: RandomSource,
    config: GeneratorConfig,
) -> Evaluation
where
    T: Clone + 'static,
    P: Testable,
    F: Fn(T) -> P + Send + Sync + 'static,
{
    let rendered = render(&value);
    let inner = run_body(body.as_ref(), value.clone(), source.clone(), &config)
        .map_nodes(move |outcome, directives| (outcome.with_witness_prefix(&rendered), directives));

    let body_candidates = inner.clone();
    inner.with_candidates(move || {
        let strategy = strategy.clone();
        let render = Arc::clone(&render);
        let body = Arc::clone(&body);
        let source = source.clone();
        let config = config.clone();
        let value_side = strategy.shrink(&value).map(move |smaller| {
            shrink_node(
                smaller,
                strategy.clone(),
                Arc::clone(&render),
                Arc::clone(&body),
                source.clone(),
                config.clone(),
            )
        });
        Box::new(value_side.chain(body_candidates.candidates()))
    })
}

/// Quantify over `strategy`, rendering each value with `render`
fn quantify<T, P, F, R>(strategy: Strategy<T>, render: R, body: F) -> Property
where
    T: Clone + 'static,
    P: Testable,
    F: Fn(T) -> P + Send + Sync + 'static,
    R: Fn(&T) -> Vec<String> + Send + Sync + 'static,
{
    let render: Render<T> = Arc::new(render);
    let body = Arc::new(body);
    Property::new(move |source, config| {
        let (value_source, body_source) = source.split();
        match strategy.generator().generate(value_source, config) {
            Ok(value) => shrink_node(
                value,
                strategy.clone(),
                Arc::clone(&render),
                Arc::clone(&body),
                body_source,
                config.clone(),
            ),
            Err(exhausted) => {
                trace!(attempts = exhausted.attempts, "argument generation exhausted, discarding");
                Evaluation::new(Outcome::Discard)
            }
        }
    })
}

/// Universal quantification over values drawn from `strategy`.
///
/// If the strategy's generator is exhausted the case is discarded.
pub fn for_all_with<T, P, F>(strategy: Strategy<T>, body: F) -> Property
where
    T: Debug + Clone + 'static,
    P: Testable,
    F: Fn(T) -> P + Send + Sync + 'static,
{
    quantify(strategy, |value: &T| vec![render(value)], body)
}

/// Universal quantification over the type's arbitrary values
pub fn for_all<T, P, F>(body: F) -> Property
where
    T: Arbitrary,
    P: Testable,
    F: Fn(T) -> P + Send + Sync + 'static,
{
    for_all_with(Strategy::arbitrary(), body)
}

/// Universal quantification with the strategy registered for `T`
pub fn for_all_in<T, P, F>(registry: &StrategyRegistry, body: F) -> Property
where
    T: Arbitrary,
    P: Testable,
    F: Fn(T) -> P + Send + Sync + 'static,
{
    for_all_with(registry.resolve::<T>(), body)
}

/// Two arguments, quantified as a pair.
///
/// The pair is shrunk until neither argument shrinks further, so the
/// reported witness is minimal even when the arguments depend on each other.
pub fn for_all2<A, B, P, F>(body: F) -> Property
where
    A: Arbitrary,
    B: Arbitrary,
    P: Testable,
    F: Fn(A, B) -> P + Send + Sync + 'static,
{
    quantify(
        Strategy::<(A, B)>::arbitrary(),
        |(a, b): &(A, B)| vec![render(a), render(b)],
        move |(a, b): (A, B)| body(a, b),
    )
}

/// Three arguments, quantified as a triple
pub fn for_all3<A, B, C, P, F>(body: F) -> Property
where
    A: Arbitrary,
    B: Arbitrary,
    C: Arbitrary,
    P: Testable,
    F: Fn(A, B, C) -> P + Send + Sync + 'static,
{
    quantify(
        Strategy::<(A, B, C)>::arbitrary(),
        |(a, b, c): &(A, B, C)| vec![render(a), render(b), render(c)],
        move |(a, b, c): (A, B, C)| body(a, b, c),
    )
}

/// Run `body` only when `precondition` holds; otherwise discard the case
pub fn implies<P, F>(precondition: bool, body: F) -> Property
where
    P: Testable,
    F: FnOnce() -> P,
{
    if precondition {
        body().property()
    } else {
        Property::from_outcome(Outcome::Discard)
    }
}
