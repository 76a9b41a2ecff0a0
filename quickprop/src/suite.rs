//! Named collections of properties, run one after another or on a thread pool.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::config::CheckConfig;
use crate::execution::{CancellationToken, PropertyTest};
use crate::property::{Property, Testable};
use crate::report::Report;
use crate::rng::RandomSource;

/// Configuration for parallel execution
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub num_threads: usize,
    /// Whether to run in parallel at all
    pub enabled: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            enabled: true,
        }
    }
}

impl ParallelConfig {
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: num_threads.max(1),
            enabled: true,
        }
    }
}

/// Report of one suite member
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberReport {
    pub name: String,
    pub report: Report,
}

/// Reports of every member, in registration order
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuiteReport {
    pub members: Vec<MemberReport>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.members.iter().all(|member| member.report.is_passed())
    }

    pub fn passed(&self) -> usize {
        self.members
            .iter()
            .filter(|member| member.report.is_passed())
            .count()
    }

    /// Members whose verdict is anything but passed
    pub fn failures(&self) -> impl Iterator<Item = &MemberReport> {
        self.members
            .iter()
            .filter(|member| !member.report.is_passed())
    }

    pub fn get(&self, name: &str) -> Option<&Report> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(|member| &member.report)
    }
}

impl std::fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for member in &self.members {
            writeln!(f, "=== {} ===", member.name)?;
            write!(f, "{}", member.report)?;
        }
        writeln!(
            f,
            "{} of {} properties passed.",
            self.passed(),
            self.members.len()
        )
    }
}

/// A set of named properties sharing one configuration.
///
/// With a fixed seed every member receives its own seed split from it, so
/// sequential and parallel runs of the same suite produce identical reports.
#[derive(Debug, Clone, Default)]
pub struct Suite {
    members: Vec<(String, Property)>,
    config: CheckConfig,
    cancellation: Option<CancellationToken>,
}

impl Suite {
    pub fn new(config: CheckConfig) -> Self {
        Self {
            members: Vec::new(),
            config,
            cancellation: None,
        }
    }

    /// Register a property under `name`
    pub fn add<P: Testable>(&mut self, name: impl Into<String>, property: P) -> &mut Self {
        self.members.push((name.into(), property.property()));
        self
    }

    /// Builder form of [`add`](Self::add)
    pub fn with<P: Testable>(mut self, name: impl Into<String>, property: P) -> Self {
        self.add(name, property);
        self
    }

    /// Members not yet started observe the token and report `Cancelled`
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(name, _)| name.as_str())
    }

    fn member_configs(&self) -> Vec<CheckConfig> {
        match self.config.seed {
            Some(seed) => RandomSource::from_seed(seed)
                .split_n(self.members.len())
                .into_iter()
                .map(|source| self.config.clone().with_seed(source.seed()))
                .collect(),
            None => vec![self.config.clone(); self.members.len()],
        }
    }

    fn run_member(&self, index: usize, config: CheckConfig) -> MemberReport {
        let (name, property) = &self.members[index];
        let mut test = PropertyTest::new(property.clone(), config).named(name.clone());
        if let Some(token) = &self.cancellation {
            test = test.with_cancellation(token.clone());
        }
        let report = test.run();
        debug!(name = %name, verdict = report.verdict(), "suite member finished");
        MemberReport {
            name: name.clone(),
            report,
        }
    }

    /// Run every member on the calling thread
    pub fn run(&self) -> SuiteReport {
        info!(members = self.members.len(), "running suite");
        let members = self
            .member_configs()
            .into_iter()
            .enumerate()
            .map(|(index, config)| self.run_member(index, config))
            .collect();
        SuiteReport { members }
    }

    /// Run members on a pool of scoped worker threads.
    ///
    /// Workers take the next unstarted member until none are left; reports
    /// are returned in registration order regardless of completion order.
    pub fn run_parallel(&self, parallel: &ParallelConfig) -> SuiteReport {
        if !parallel.enabled || parallel.num_threads <= 1 || self.members.len() <= 1 {
            return self.run();
        }

        let workers = parallel.num_threads.min(self.members.len());
        info!(
            members = self.members.len(),
            workers, "running suite in parallel"
        );
        let configs = self.member_configs();
        let next = AtomicUsize::new(0);

        let joined = crossbeam::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let next = &next;
                    let configs = &configs;
                    scope.spawn(move |_| {
                        let mut finished = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::SeqCst);
                            if index >= configs.len() {
                                break finished;
                            }
                            finished.push((index, self.run_member(index, configs[index].clone())));
                        }
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        });

        let mut finished = Vec::with_capacity(self.members.len());
        for worker in joined.into_iter().flatten() {
            match worker {
                Ok(reports) => finished.extend(reports),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        finished.sort_by_key(|(index, _)| *index);
        SuiteReport {
            members: finished.into_iter().map(|(_, member)| member).collect(),
        }
    }
}
