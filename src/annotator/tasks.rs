//! Auxiliary annotation tasks
//!
//! Six lookups run on a bounded rayon pool while the calling thread
//! computes consequence types. Each task queries its provider once for
//! the whole batch and writes only its own slot; the joining thread merges
//! the slots afterwards (see [`super::merge`]).

use log::{debug, error};
use rayon::{Scope, ThreadPool, ThreadPoolBuilder};

use super::options::{AnnotationOptions, Annotator};
use super::regions::{lookup_regions, truncate_for_conservation};
use crate::error::FerroError;
use crate::model::{Cytoband, Region, Repeat, Score, TraitAssociation, Variant, VariationRecord};
use crate::provider::AnnotationBackend;

/// The concurrent lookups of one `annotate` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxiliaryTask {
    Variation,
    Conservation,
    FunctionalScore,
    TraitAssociation,
    Repeats,
    Cytoband,
}

impl AuxiliaryTask {
    pub const ALL: [AuxiliaryTask; 6] = [
        AuxiliaryTask::Variation,
        AuxiliaryTask::Conservation,
        AuxiliaryTask::FunctionalScore,
        AuxiliaryTask::TraitAssociation,
        AuxiliaryTask::Repeats,
        AuxiliaryTask::Cytoband,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AuxiliaryTask::Variation => "variation",
            AuxiliaryTask::Conservation => "conservation",
            AuxiliaryTask::FunctionalScore => "functionalScore",
            AuxiliaryTask::TraitAssociation => "traitAssociation",
            AuxiliaryTask::Repeats => "repeats",
            AuxiliaryTask::Cytoband => "cytoband",
        }
    }

    /// Whether the options ask for this task.
    ///
    /// The variation lookup also serves population frequencies.
    pub fn requested(&self, options: &AnnotationOptions) -> bool {
        match self {
            AuxiliaryTask::Variation => {
                options.runs(Annotator::Variation) || options.runs(Annotator::PopulationFrequencies)
            }
            AuxiliaryTask::Conservation => options.runs(Annotator::Conservation),
            AuxiliaryTask::FunctionalScore => options.runs(Annotator::FunctionalScore),
            AuxiliaryTask::TraitAssociation => options.runs(Annotator::TraitAssociation),
            AuxiliaryTask::Repeats => options.runs(Annotator::Repeats),
            AuxiliaryTask::Cytoband => options.runs(Annotator::Cytoband),
        }
    }
}

/// Build the bounded worker pool.
pub fn build_pool(workers: usize) -> Result<ThreadPool, FerroError> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("ferro-annotate-{}", index))
        .build()
        .map_err(|e| FerroError::Config {
            msg: format!("cannot start annotation workers: {}", e),
        })
}

type Slot<T> = Option<Result<Vec<Vec<T>>, FerroError>>;

/// One result slot per task, `None` until the task has run
#[derive(Debug, Default)]
pub struct TaskSlots {
    variation: Slot<VariationRecord>,
    conservation: Slot<Score>,
    functional_score: Slot<Score>,
    trait_association: Slot<TraitAssociation>,
    repeats: Slot<Repeat>,
    cytoband: Slot<Cytoband>,
}

/// Joined auxiliary results, aligned with the batch; `None` for tasks
/// that did not run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AuxiliaryResults {
    pub variation: Option<Vec<Vec<VariationRecord>>>,
    pub conservation: Option<Vec<Vec<Score>>>,
    pub functional_score: Option<Vec<Vec<Score>>>,
    pub trait_association: Option<Vec<Vec<TraitAssociation>>>,
    pub repeats: Option<Vec<Vec<Repeat>>>,
    pub cytoband: Option<Vec<Vec<Cytoband>>>,
}

impl TaskSlots {
    /// Spawn every requested task onto `scope`.
    pub fn spawn<'scope, P: AnnotationBackend>(
        &'scope mut self,
        scope: &Scope<'scope>,
        provider: &'scope P,
        variants: &'scope [Variant],
        options: &'scope AnnotationOptions,
    ) {
        let launched: Vec<_> = AuxiliaryTask::ALL
            .iter()
            .filter(|task| task.requested(options))
            .map(AuxiliaryTask::name)
            .collect();
        debug!("Launching auxiliary annotators: {:?}", launched);

        let TaskSlots {
            variation,
            conservation,
            functional_score,
            trait_association,
            repeats,
            cytoband,
        } = self;

        if AuxiliaryTask::Variation.requested(options) {
            scope.spawn(move |_| *variation = Some(fetch_variation(provider, variants, options)));
        }
        if AuxiliaryTask::Conservation.requested(options) {
            scope.spawn(move |_| *conservation = Some(fetch_conservation(provider, variants, options)));
        }
        if AuxiliaryTask::FunctionalScore.requested(options) {
            scope.spawn(move |_| {
                *functional_score = Some(fetch_functional_scores(provider, variants, options))
            });
        }
        if AuxiliaryTask::TraitAssociation.requested(options) {
            scope.spawn(move |_| {
                *trait_association = Some(fetch_trait_associations(provider, variants, options))
            });
        }
        if AuxiliaryTask::Repeats.requested(options) {
            scope.spawn(move |_| *repeats = Some(fetch_repeats(provider, variants, options)));
        }
        if AuxiliaryTask::Cytoband.requested(options) {
            scope.spawn(move |_| *cytoband = Some(fetch_cytobands(provider, variants, options)));
        }
    }

    /// Collect the slots; the first failed task fails the batch.
    pub fn join(self) -> Result<AuxiliaryResults, FerroError> {
        Ok(AuxiliaryResults {
            variation: joined(AuxiliaryTask::Variation, self.variation)?,
            conservation: joined(AuxiliaryTask::Conservation, self.conservation)?,
            functional_score: joined(AuxiliaryTask::FunctionalScore, self.functional_score)?,
            trait_association: joined(AuxiliaryTask::TraitAssociation, self.trait_association)?,
            repeats: joined(AuxiliaryTask::Repeats, self.repeats)?,
            cytoband: joined(AuxiliaryTask::Cytoband, self.cytoband)?,
        })
    }
}

fn joined<T>(task: AuxiliaryTask, slot: Slot<T>) -> Result<Option<Vec<Vec<T>>>, FerroError> {
    match slot {
        None => Ok(None),
        Some(Ok(results)) => Ok(Some(results)),
        Some(Err(e)) => {
            error!("Auxiliary annotator '{}' failed: {}", task.name(), e);
            Err(e)
        }
    }
}

/// Reject provider answers that are not aligned with the query.
fn aligned<T>(task: AuxiliaryTask, expected: usize, results: Vec<Vec<T>>) -> Result<Vec<Vec<T>>, FerroError> {
    if results.len() != expected {
        return Err(FerroError::provider(
            task.name(),
            format!("returned {} results for {} queries", results.len(), expected),
        ));
    }
    Ok(results)
}

/// Query the regions of every variant in one call and fold the answers
/// back per variant, dropping duplicates from the two breakpoints of a
/// structural variant.
fn fetch_by_region<T, F>(
    task: AuxiliaryTask,
    variants: &[Variant],
    regions_of: impl Fn(&Variant) -> Vec<Region>,
    query: F,
) -> Result<Vec<Vec<T>>, FerroError>
where
    T: PartialEq,
    F: FnOnce(&[Region]) -> Result<Vec<Vec<T>>, FerroError>,
{
    let mut regions = Vec::with_capacity(variants.len());
    let mut owners = Vec::with_capacity(variants.len());
    for (index, variant) in variants.iter().enumerate() {
        for region in regions_of(variant) {
            regions.push(region);
            owners.push(index);
        }
    }
    let answers = aligned(task, regions.len(), query(&regions)?)?;

    let mut results: Vec<Vec<T>> = variants.iter().map(|_| Vec::new()).collect();
    for (owner, answer) in owners.into_iter().zip(answers) {
        let merged = &mut results[owner];
        for item in answer {
            if !merged.contains(&item) {
                merged.push(item);
            }
        }
    }
    Ok(results)
}

pub fn fetch_variation<P: AnnotationBackend>(
    provider: &P,
    variants: &[Variant],
    options: &AnnotationOptions,
) -> Result<Vec<Vec<VariationRecord>>, FerroError> {
    let results = provider.variation(variants, options)?;
    aligned(AuxiliaryTask::Variation, variants.len(), results)
}

pub fn fetch_conservation<P: AnnotationBackend>(
    provider: &P,
    variants: &[Variant],
    options: &AnnotationOptions,
) -> Result<Vec<Vec<Score>>, FerroError> {
    fetch_by_region(
        AuxiliaryTask::Conservation,
        variants,
        |variant| {
            lookup_regions(variant)
                .into_iter()
                .map(truncate_for_conservation)
                .collect()
        },
        |regions| provider.conservation(regions, options),
    )
}

pub fn fetch_functional_scores<P: AnnotationBackend>(
    provider: &P,
    variants: &[Variant],
    options: &AnnotationOptions,
) -> Result<Vec<Vec<Score>>, FerroError> {
    let results = provider.functional_scores(variants, options)?;
    aligned(AuxiliaryTask::FunctionalScore, variants.len(), results)
}

/// Clinical lookups see the phased and `checkAminoAcidChange` options.
pub fn fetch_trait_associations<P: AnnotationBackend>(
    provider: &P,
    variants: &[Variant],
    options: &AnnotationOptions,
) -> Result<Vec<Vec<TraitAssociation>>, FerroError> {
    let results = provider.trait_associations(variants, options)?;
    aligned(AuxiliaryTask::TraitAssociation, variants.len(), results)
}

pub fn fetch_repeats<P: AnnotationBackend>(
    provider: &P,
    variants: &[Variant],
    options: &AnnotationOptions,
) -> Result<Vec<Vec<Repeat>>, FerroError> {
    fetch_by_region(AuxiliaryTask::Repeats, variants, lookup_regions, |regions| {
        provider.repeats(regions, options)
    })
}

pub fn fetch_cytobands<P: AnnotationBackend>(
    provider: &P,
    variants: &[Variant],
    options: &AnnotationOptions,
) -> Result<Vec<Vec<Cytoband>>, FerroError> {
    fetch_by_region(AuxiliaryTask::Cytoband, variants, lookup_regions, |regions| {
        provider.cytobands(regions, options)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;

    fn cytoband(name: &str, start: i64, end: i64) -> Cytoband {
        Cytoband {
            chromosome: "1".to_string(),
            name: name.to_string(),
            stain: "gneg".to_string(),
            start,
            end,
        }
    }

    fn provider() -> MockProvider {
        let mut provider = MockProvider::new();
        provider.add_cytoband(cytoband("p36.33", 1, 2_300_000));
        provider.add_cytoband(cytoband("p36.32", 2_300_001, 5_300_000));
        provider.add_conservation(Region::new("1", 100, 100), Score::new("phylop", 1.5));
        provider.add_conservation(Region::new("1", 5000, 5000), Score::new("phastCons", 0.9));
        provider
    }

    #[test]
    fn test_requested_tasks() {
        let options = AnnotationOptions::default().with_annotators(&[Annotator::PopulationFrequencies]);
        let requested: Vec<_> = AuxiliaryTask::ALL
            .iter()
            .filter(|t| t.requested(&options))
            .collect();
        assert_eq!(requested, vec![&AuxiliaryTask::Variation]);
    }

    #[test]
    fn test_breakpoint_results_are_merged() {
        let variants = vec![
            Variant::new("1", 1000, "A", "T"),
            Variant::new("1", 2_000_000, "N", "<DEL>").with_end(3_000_000),
            Variant::new("1", 100, "N", "<DUP>").with_end(200),
        ];
        let results = fetch_cytobands(&provider(), &variants, &AnnotationOptions::default()).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].len(), 1);
        let names: Vec<_> = results[1].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["p36.33", "p36.32"]);
        // both breakpoints fall in the same band
        assert_eq!(results[2].len(), 1);
    }

    #[test]
    fn test_conservation_regions_are_truncated() {
        let variants = vec![
            Variant::new("1", 60, "N", "<INV>").with_end(5000),
            Variant::new("1", 60, &"A".repeat(100), ""),
        ];
        let results = fetch_conservation(&provider(), &variants, &AnnotationOptions::default()).unwrap();
        // the inversion reaches position 5000 through its second breakpoint
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].source, "phastCons");
        // 60..159 is cut to 60..109, which still holds position 100
        assert_eq!(results[1].len(), 1);
        assert_eq!(results[1][0].source, "phylop");
    }

    #[test]
    fn test_failed_task_fails_join() {
        let mut provider = provider();
        provider.fail_source("repeats");
        let variants = vec![Variant::new("1", 1000, "A", "T")];
        let options = AnnotationOptions::default();
        let pool = build_pool(2).unwrap();
        let mut slots = TaskSlots::default();
        pool.in_place_scope(|scope| slots.spawn(scope, &provider, &variants, &options));
        let err = slots.join().unwrap_err();
        assert_eq!(err, FerroError::provider("repeats", "mock failure"));
    }

    #[test]
    fn test_skipped_tasks_leave_no_result() {
        let provider = provider();
        let variants = vec![Variant::new("1", 1000, "A", "T")];
        let options = AnnotationOptions::default().with_annotators(&[Annotator::Cytoband]);
        let pool = build_pool(1).unwrap();
        let mut slots = TaskSlots::default();
        pool.in_place_scope(|scope| slots.spawn(scope, &provider, &variants, &options));
        let results = slots.join().unwrap();
        assert!(results.cytoband.is_some());
        assert!(results.variation.is_none());
        assert!(results.repeats.is_none());
    }
}
