//! Normalisation, affinity and pool orderings working together.

use airs_core::prelude::*;

fn weather() -> Dataset {
    let schema = Schema::new(
        vec![
            Attribute::numeric("temperature"),
            Attribute::numeric("humidity"),
            Attribute::nominal("outlook", ["sunny", "overcast", "rainy"]),
            Attribute::new("observed", AttributeKind::Date),
            Attribute::nominal("play", ["yes", "no"]),
        ],
        4,
    )
    .unwrap();
    let rows = [
        [85.0, 85.0, 0.0, f64::NAN, 1.0],
        [80.0, 90.0, 0.0, f64::NAN, 1.0],
        [83.0, 86.0, 1.0, f64::NAN, 0.0],
        [70.0, f64::NAN, 2.0, f64::NAN, 0.0],
        [68.0, 80.0, 2.0, f64::NAN, 0.0],
        [65.0, 70.0, 2.0, f64::NAN, 1.0],
        [64.0, 65.0, 1.0, f64::NAN, 0.0],
    ];
    Dataset::new(schema, rows.iter().map(|r| Instance::new(r.to_vec())).collect()).unwrap()
}

#[test]
fn normalised_training_set_stays_in_unit_range() {
    let raw = weather();
    let data = Normalizer::fit(&raw).transform(&raw).unwrap();

    for inst in data.instances() {
        for (i, v) in inst.values.iter().enumerate() {
            if v.is_nan() || i >= 2 {
                continue;
            }
            assert!((0.0..=1.0).contains(v), "attribute {i} = {v}");
        }
        // Nominal codes and the class pass through.
        assert!(inst.values[2] == 0.0 || inst.values[2] == 1.0 || inst.values[2] == 2.0);
    }
    assert_eq!(data.instances()[6].values[0], 0.0);
    assert_eq!(data.instances()[0].values[0], 1.0);
    assert!(data.instances()[3].values[1].is_nan(), "missing stays missing");
}

#[test]
fn query_outside_training_range_is_not_clamped() {
    let raw = weather();
    let normalizer = Normalizer::fit(&raw);
    let mut query = vec![106.0, 65.0, 0.0, f64::NAN, f64::NAN];
    normalizer.apply_in_place(&mut query).unwrap();
    assert!((query[0] - 2.0).abs() < 1e-12);

    assert!(matches!(
        normalizer.apply_in_place(&mut [1.0, 2.0]),
        Err(AirsError::DimensionMismatch { expected: 5, got: 2 })
    ));
}

#[test]
fn affinity_is_symmetric_and_zero_on_self() {
    let raw = weather();
    let data = Normalizer::fit(&raw).transform(&raw).unwrap();
    let space = DistanceFunction::new(&data).unwrap();

    for a in data.instances() {
        assert_eq!(space.affinity(&a.values, &a.values), 0.0);
        for b in data.instances() {
            let ab = space.affinity(&a.values, &b.values);
            assert_eq!(ab, space.affinity(&b.values, &a.values));
            assert!(ab >= 0.0, "affinity {ab}");
        }
    }
}

#[test]
fn pool_orders_by_similarity_to_an_antigen() {
    let raw = weather();
    let data = Normalizer::fit(&raw).transform(&raw).unwrap();
    let space = DistanceFunction::new(&data).unwrap();
    let antigen = data.instances()[4].values.clone();

    let mut pool: CellPool = data
        .instances()
        .iter()
        .map(|inst| Cell::from_instance(inst, data.class_of(inst)))
        .collect();
    pool.stimulate(&space, &antigen);
    pool.order_by_stimulation();

    assert_eq!(pool.cells()[0].attributes(), antigen.as_slice());
    assert_eq!(pool.cells()[0].stimulation, 1.0);
    for pair in pool.cells().windows(2) {
        assert!(pair[0].stimulation >= pair[1].stimulation);
    }

    pool.order_by_affinity();
    for pair in pool.cells().windows(2) {
        assert!(pair[0].affinity <= pair[1].affinity);
    }

    pool.normalize_stimulation().unwrap();
    let max = pool.iter().map(|c| c.stimulation).fold(f64::MIN, f64::max);
    let min = pool.iter().map(|c| c.stimulation).fold(f64::MAX, f64::min);
    assert_eq!((min, max), (0.0, 1.0));
}

#[test]
fn cells_persist_vectors_but_not_scores() {
    let raw = weather();
    let space = DistanceFunction::new(&raw).unwrap();
    let mut cell = Cell::from_instance(&raw.instances()[3], ClassId(0));
    cell.stimulate(&space, &raw.instances()[0].values);
    cell.resources = 4.0;

    let json = serde_json::to_string(&cell).unwrap();
    assert!(json.contains("null"), "missing values encoded as null");
    let back: Cell = serde_json::from_str(&json).unwrap();
    assert_eq!(back.class(), ClassId(0));
    assert!(back.attributes()[1].is_nan());
    assert_eq!(back.resources, 0.0);
    assert_eq!(back.stimulation, 0.0);
}

#[test]
fn datasets_reject_bad_rows() {
    let schema = weather().schema().clone();
    assert!(matches!(
        Dataset::new(schema.clone(), vec![]),
        Err(AirsError::EmptyDataset)
    ));
    assert!(matches!(
        Dataset::new(schema.clone(), vec![Instance::new(vec![1.0, 2.0, 0.0, f64::NAN, f64::NAN])]),
        Err(AirsError::MissingClass { index: 0 })
    ));
    assert!(matches!(
        Dataset::new(schema, vec![Instance::new(vec![1.0, 0.0])]),
        Err(AirsError::DimensionMismatch { expected: 5, got: 2 })
    ));
}
