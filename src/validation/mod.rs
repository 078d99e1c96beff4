//! Dataset validation.
//!
//! Decoding already guarantees that every record is well-formed on its
//! own. Validation checks what decoding cannot see:
//! - Frame declarations (no duplicates within a record, consistent across
//!   the dataset)
//! - Frame references (every `input`/`output` names a declared frame)
//! - Sequence structure (steps chain, endpoints agree, no empty sequences)
//! - Payload shape against the input frame's axis count

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::error::CetsError;
use crate::model::{
    Annotation, CoordinateMetadata, CoordinateSystem, Dataset, Transformation, TransformationKind,
};
use crate::standard::BASE_LOGICAL_COORDS;

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// A record that declares frames and transformations.
struct Entity<'a> {
    path: String,
    systems: &'a [CoordinateSystem],
    transformations: Vec<(String, &'a Transformation)>,
}

#[derive(Default)]
struct Walk<'a> {
    entities: Vec<Entity<'a>>,
    annotations: Vec<(String, &'a Annotation)>,
}

fn items<T>(list: &Option<Vec<T>>) -> impl Iterator<Item = (usize, &T)> {
    list.iter().flatten().enumerate()
}

impl<'a> Walk<'a> {
    fn record(&mut self, path: String, meta: &'a dyn CoordinateMetadata) {
        let transformations = meta
            .coordinate_transformations()
            .iter()
            .enumerate()
            .map(|(i, tf)| (format!("{path}.coordinate_transformations[{i}]"), tf))
            .collect();
        self.entities.push(Entity {
            path,
            systems: meta.coordinate_systems(),
            transformations,
        });
    }

    fn annotations(&mut self, prefix: &str, list: &'a Option<Vec<Annotation>>) {
        for (i, annotation) in items(list) {
            let path = format!("{prefix}.annotations[{i}]");
            if let Some(meta) = annotation.coordinate_metadata() {
                self.record(path.clone(), meta);
            }
            self.annotations.push((path, annotation));
        }
    }

    fn dataset(dataset: &'a Dataset) -> Self {
        let mut walk = Walk::default();

        for (r, region) in items(&dataset.regions) {
            let rp = format!("regions[{r}]");

            for (c, collection) in items(&region.movie_stack_collections) {
                let cp = format!("{rp}.movie_stack_collections[{c}]");
                for (s, series) in items(&collection.movie_stacks) {
                    for (k, stack) in items(&series.stacks) {
                        for (f, frame) in items(&stack.images) {
                            walk.record(
                                format!("{cp}.movie_stacks[{s}].stacks[{k}].images[{f}]"),
                                frame,
                            );
                        }
                    }
                }
                if let Some(gain) = &collection.gain_file {
                    walk.record(format!("{cp}.gain_file"), gain);
                }
                if let Some(defect) = &collection.defect_file {
                    walk.record(format!("{cp}.defect_file"), defect);
                }
            }

            for (t, series) in items(&region.tilt_series) {
                for (i, image) in items(&series.images) {
                    walk.record(format!("{rp}.tilt_series[{t}].images[{i}]"), image);
                }
            }

            for (a, alignment) in items(&region.alignments) {
                for (p, projection) in items(&alignment.projection_alignments) {
                    let path = format!("{rp}.alignments[{a}].projection_alignments[{p}]");
                    walk.entities.push(Entity {
                        path: path.clone(),
                        systems: &[],
                        transformations: vec![(path, projection.as_transformation())],
                    });
                }
            }

            for (t, tomogram) in items(&region.tomograms) {
                walk.record(format!("{rp}.tomograms[{t}]"), tomogram);
            }

            walk.annotations(&rp, &region.annotations);
        }

        for (a, average) in items(&dataset.averages) {
            let ap = format!("averages[{a}]");
            for (m, map) in items(&average.particle_maps) {
                walk.record(format!("{ap}.particle_maps[{m}]"), map);
            }
            walk.annotations(&ap, &average.annotations);
        }

        walk
    }
}

/// Validates a dataset and returns a report of all issues found.
///
/// Frames named in transformations are resolved against the record's own
/// declarations first, then against every frame declared anywhere in the
/// dataset. `base_logical_coordinates` is always known.
pub fn validate_dataset(dataset: &Dataset, _opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    let walk = Walk::dataset(dataset);

    let global = validate_declarations(&walk.entities, &mut report);

    for entity in &walk.entities {
        let local: HashMap<&str, &CoordinateSystem> =
            entity.systems.iter().map(|cs| (cs.name(), cs)).collect();
        let resolve = |name: &str| local.get(name).or_else(|| global.get(name)).copied();

        for (path, tf) in &entity.transformations {
            check_structure(tf, path, &mut report);
            check_references(tf, path, &resolve, &mut report);
        }
    }

    for (path, annotation) in &walk.annotations {
        if let Some((origins, others)) = annotation.paired_counts() {
            if origins > 0 && others > 0 && origins != others {
                report.add(ValidationIssue::warning(
                    IssueCode::PointCountMismatch,
                    format!(
                        "{} has {} origin(s) but {} paired entries",
                        annotation.type_name(),
                        origins,
                        others
                    ),
                    IssueContext::Entity(path.clone()),
                ));
            }
        }
    }

    tracing::debug!(
        entities = walk.entities.len(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validated dataset"
    );
    report
}

/// Checks the structure of one transformation tree: non-empty sequences
/// whose steps chain and whose endpoints match their first and last step.
pub fn validate_transformation(tf: &Transformation) -> ValidationReport {
    let mut report = ValidationReport::new();
    let path = tf.name.clone().unwrap_or_else(|| "<root>".to_string());
    check_structure(tf, &path, &mut report);
    report
}

/// Turns a report into an error when it fails under `opts`.
pub fn enforce(
    report: ValidationReport,
    opts: &ValidateOptions,
) -> Result<ValidationReport, CetsError> {
    let passed = if opts.strict {
        report.is_ok_strict()
    } else {
        report.is_ok()
    };
    if passed {
        Ok(report)
    } else {
        Err(CetsError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    }
}

/// Reports duplicate frames and returns the dataset-wide frame table,
/// keyed by name and holding the first declaration seen.
fn validate_declarations<'a>(
    entities: &[Entity<'a>],
    report: &mut ValidationReport,
) -> HashMap<&'a str, &'a CoordinateSystem> {
    let mut global: HashMap<&'a str, (&'a CoordinateSystem, &str)> = HashMap::new();

    for entity in entities {
        let mut seen = HashSet::new();
        for cs in entity.systems {
            if !seen.insert(cs.name()) {
                report.add(ValidationIssue::error(
                    IssueCode::DuplicateCoordinateSystem,
                    format!("Coordinate system '{}' is declared more than once", cs.name()),
                    IssueContext::Entity(entity.path.clone()),
                ));
                continue;
            }

            match global.get(cs.name()) {
                Some((first, first_path)) if first.axes() != cs.axes() => {
                    report.add(ValidationIssue::warning(
                        IssueCode::DuplicateCoordinateSystemAcrossDataset,
                        format!(
                            "Coordinate system '{}' was first declared with different axes at {}",
                            cs.name(),
                            first_path
                        ),
                        IssueContext::Entity(entity.path.clone()),
                    ));
                }
                Some(_) => {}
                None => {
                    global.insert(cs.name(), (cs, entity.path.as_str()));
                }
            }
        }
    }

    global
        .into_iter()
        .map(|(name, (cs, _))| (name, cs))
        .collect()
}

fn check_structure(tf: &Transformation, path: &str, report: &mut ValidationReport) {
    let context = || IssueContext::Transformation(path.to_string());

    if tf.kind.payload_missing() {
        let ty = tf.transformation_type();
        report.add(ValidationIssue::warning(
            IssueCode::MissingPayload,
            format!("{} transformation has no '{}' payload", ty, ty),
            context(),
        ));
        return;
    }
    let Some(steps) = tf.steps() else {
        return;
    };

    if steps.is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::EmptySequence,
            "Sequence has no steps",
            context(),
        ));
        return;
    }

    for (i, pair) in steps.windows(2).enumerate() {
        if let (Some(out), Some(next_in)) = (&pair[0].output, &pair[1].input) {
            if out != next_in {
                report.add(ValidationIssue::warning(
                    IssueCode::BrokenSequenceChain,
                    format!(
                        "Step {} ends in '{}' but step {} starts from '{}'",
                        i,
                        out,
                        i + 1,
                        next_in
                    ),
                    context(),
                ));
            }
        }
    }

    let first = &steps[0];
    let last = &steps[steps.len() - 1];
    for (end, outer, inner) in [
        ("input", &tf.input, &first.input),
        ("output", &tf.output, &last.output),
    ] {
        if let (Some(outer), Some(inner)) = (outer, inner) {
            if outer != inner {
                report.add(ValidationIssue::warning(
                    IssueCode::SequenceEndpointMismatch,
                    format!(
                        "Sequence {} is '{}' but its {} step has '{}'",
                        end,
                        outer,
                        if end == "input" { "first" } else { "last" },
                        inner
                    ),
                    context(),
                ));
            }
        }
    }

    for (i, step) in steps.iter().enumerate() {
        check_structure(step, &format!("{path}.sequence[{i}]"), report);
    }
}

/// Number of axes a payload implies, if it implies one.
fn payload_dimension(kind: &TransformationKind) -> Option<usize> {
    match kind {
        TransformationKind::Translation(v) | TransformationKind::Scale(v) => {
            v.as_ref().map(Vec::len)
        }
        TransformationKind::Affine(m) => m.as_ref().map(|m| m.rank()),
        TransformationKind::Rotation2D(m) | TransformationKind::Flip2D(m) => {
            m.as_ref().map(|m| m.rank())
        }
        TransformationKind::Identity
        | TransformationKind::MapAxis(_)
        | TransformationKind::Sequence(_) => None,
    }
}

fn check_references<'a>(
    tf: &Transformation,
    path: &str,
    resolve: &dyn Fn(&str) -> Option<&'a CoordinateSystem>,
    report: &mut ValidationReport,
) {
    let context = || IssueContext::Transformation(path.to_string());
    let known = |name: &str| name == BASE_LOGICAL_COORDS || resolve(name).is_some();

    if let Some(input) = tf.input.as_deref() {
        if !known(input) {
            report.add(ValidationIssue::warning(
                IssueCode::UnknownInputFrame,
                format!("Input frame '{}' is not declared", input),
                context(),
            ));
        }
    }
    if let Some(output) = tf.output.as_deref() {
        if !known(output) {
            report.add(ValidationIssue::warning(
                IssueCode::UnknownOutputFrame,
                format!("Output frame '{}' is not declared", output),
                context(),
            ));
        }
    }

    if let (Some(dim), Some(frame)) = (
        payload_dimension(&tf.kind),
        tf.input.as_deref().and_then(resolve),
    ) {
        if dim != frame.ndim() {
            report.add(ValidationIssue::warning(
                IssueCode::PayloadDimensionMismatch,
                format!(
                    "{} payload has {} component(s) but input frame '{}' has {} axes",
                    tf.transformation_type(),
                    dim,
                    frame.name(),
                    frame.ndim()
                ),
                context(),
            ));
        }
    }

    if let Some(steps) = tf.steps() {
        for (i, step) in steps.iter().enumerate() {
            check_references(step, &format!("{path}.sequence[{i}]"), resolve, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axis, PointVectorSet3D, Region, Tomogram, Vector3D};
    use crate::standard::{aligned_map_to_tomogram, logical_coords, Dimensionality};

    fn frame(name: &str, dims: &[&str]) -> CoordinateSystem {
        CoordinateSystem::new(name, dims.iter().map(|d| Axis::new(*d)).collect()).unwrap()
    }

    fn dataset_with(tomogram: Tomogram) -> Dataset {
        Dataset {
            name: Some("test".to_string()),
            regions: Some(vec![Region {
                tomograms: Some(vec![tomogram]),
                ..Default::default()
            }]),
            averages: None,
        }
    }

    fn valid_tomogram() -> Tomogram {
        Tomogram {
            path: Some("tomo.mrc".to_string()),
            coordinate_systems: Some(vec![frame("physical", &["x", "y", "z"])]),
            coordinate_transformations: Some(vec![Transformation::scale(vec![10.0, 10.0, 10.0])
                .named("pixel_size")
                .with_input(BASE_LOGICAL_COORDS)
                .with_output("physical")]),
            ..Default::default()
        }
    }

    fn has(report: &ValidationReport, code: IssueCode) -> bool {
        report.issues.iter().any(|i| i.code == code)
    }

    #[test]
    fn test_valid_dataset() {
        let report = validate_dataset(&dataset_with(valid_tomogram()), &ValidateOptions::default());
        assert!(report.is_ok_strict(), "{}", report);
    }

    #[test]
    fn test_duplicate_coordinate_system() {
        let mut tomogram = valid_tomogram();
        tomogram
            .coordinate_systems
            .as_mut()
            .unwrap()
            .push(frame("physical", &["x", "y", "z"]));

        let report = validate_dataset(&dataset_with(tomogram), &ValidateOptions::default());
        assert_eq!(report.error_count(), 1);
        assert!(has(&report, IssueCode::DuplicateCoordinateSystem));
    }

    #[test]
    fn test_conflicting_frames_across_dataset() {
        let mut dataset = dataset_with(valid_tomogram());
        let mut other = valid_tomogram();
        other.coordinate_systems = Some(vec![frame("physical", &["u", "v", "w"])]);
        dataset.regions.as_mut().unwrap()[0]
            .tomograms
            .as_mut()
            .unwrap()
            .push(other);

        let report = validate_dataset(&dataset, &ValidateOptions::default());
        assert_eq!(report.error_count(), 0);
        assert!(has(&report, IssueCode::DuplicateCoordinateSystemAcrossDataset));
    }

    #[test]
    fn test_unknown_frames() {
        let mut tomogram = valid_tomogram();
        tomogram.coordinate_transformations = Some(vec![Transformation::identity()
            .with_input("nowhere")
            .with_output("elsewhere")]);

        let report = validate_dataset(&dataset_with(tomogram), &ValidateOptions::default());
        assert!(has(&report, IssueCode::UnknownInputFrame));
        assert!(has(&report, IssueCode::UnknownOutputFrame));
        let issue = report.with_code(IssueCode::UnknownInputFrame).next().unwrap();
        assert_eq!(
            issue.context,
            IssueContext::Transformation("regions[0].tomograms[0].coordinate_transformations[0]".into())
        );
    }

    #[test]
    fn test_payload_dimension_mismatch() {
        let mut tomogram = valid_tomogram();
        tomogram.coordinate_transformations = Some(vec![Transformation::translation(vec![1.0, 2.0])
            .with_input("physical")
            .with_output("physical")]);

        let report = validate_dataset(&dataset_with(tomogram), &ValidateOptions::default());
        assert!(has(&report, IssueCode::PayloadDimensionMismatch));
    }

    #[test]
    fn test_broken_sequence_chain() {
        let seq = Transformation::sequence(vec![
            Transformation::identity().with_input("a").with_output("b"),
            Transformation::identity().with_input("c").with_output("d"),
        ]);
        let report = validate_transformation(&seq);
        assert_eq!(report.warning_count(), 1);
        assert!(has(&report, IssueCode::BrokenSequenceChain));
    }

    #[test]
    fn test_sequence_endpoint_mismatch() {
        let seq = Transformation::sequence(vec![Transformation::identity()
            .with_input("a")
            .with_output("b")])
        .with_output("z");
        let report = validate_transformation(&seq);
        assert!(has(&report, IssueCode::SequenceEndpointMismatch));
    }

    #[test]
    fn test_empty_sequence() {
        let report = validate_transformation(&Transformation::sequence(vec![]));
        assert!(has(&report, IssueCode::EmptySequence));
    }

    #[test]
    fn test_missing_payload_is_a_warning() {
        let seq = Transformation::new(TransformationKind::Sequence(None)).named("pa");
        let report = validate_transformation(&seq);
        assert_eq!(report.warning_count(), 1);
        assert!(has(&report, IssueCode::MissingPayload));
        assert!(!has(&report, IssueCode::EmptySequence));

        let mut tomogram = valid_tomogram();
        tomogram.coordinate_transformations = Some(vec![Transformation::new(
            TransformationKind::Translation(None),
        )
        .with_input("physical")
        .with_output("physical")]);
        let report = validate_dataset(&dataset_with(tomogram), &ValidateOptions::default());
        assert!(has(&report, IssueCode::MissingPayload));
        assert!(!has(&report, IssueCode::PayloadDimensionMismatch));
        assert!(report.is_ok());
    }

    #[test]
    fn test_nested_sequence_is_checked() {
        let inner = Transformation::sequence(vec![
            Transformation::identity().with_input("a").with_output("b"),
            Transformation::identity().with_input("x").with_output("c"),
        ]);
        let outer = Transformation::sequence(vec![inner]).named("outer");
        let report = validate_transformation(&outer);
        let issue = report.with_code(IssueCode::BrokenSequenceChain).next().unwrap();
        assert_eq!(issue.context, IssueContext::Transformation("outer.sequence[0]".into()));
    }

    #[test]
    fn test_pipeline_output_validates_cleanly() {
        let pipeline = aligned_map_to_tomogram(Some(2.0), None, Some(&[1.0, 2.0, 3.0])).unwrap();
        let (tf, mut frames) = pipeline.into_parts();
        frames.push(logical_coords(BASE_LOGICAL_COORDS, Dimensionality::Three));
        let tomogram = Tomogram {
            coordinate_systems: Some(frames),
            coordinate_transformations: Some(vec![tf]),
            ..Default::default()
        };

        let report = validate_dataset(&dataset_with(tomogram), &ValidateOptions::default());
        assert!(report.is_ok_strict(), "{}", report);
    }

    #[test]
    fn test_point_count_mismatch() {
        let mut dataset = dataset_with(valid_tomogram());
        dataset.regions.as_mut().unwrap()[0].annotations =
            Some(vec![Annotation::PointVectorSet3D(PointVectorSet3D {
                origin3d: Some(vec![Vector3D::new([0.0; 3]), Vector3D::new([1.0; 3])]),
                vector3d: Some(vec![Vector3D::new([0.0, 0.0, 1.0])]),
                ..Default::default()
            })]);

        let report = validate_dataset(&dataset, &ValidateOptions::default());
        assert!(has(&report, IssueCode::PointCountMismatch));
    }

    #[test]
    fn test_enforce_strict() {
        let seq = Transformation::sequence(vec![]);
        let report = validate_transformation(&seq);
        assert!(enforce(report.clone(), &ValidateOptions::default()).is_ok());

        let err = enforce(report, &ValidateOptions { strict: true }).unwrap_err();
        assert!(matches!(
            err,
            CetsError::ValidationFailed {
                error_count: 0,
                warning_count: 1,
                ..
            }
        ));
    }
}
