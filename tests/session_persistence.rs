use negsampler::{
    FeatureColumns, InMemorySource, InteractionBatch, InteractionSource, InteractionSplit, Mode,
    SamplerConfig, SamplerError, SamplingSession, SessionSnapshot,
};

fn build_source(n_items: usize) -> InMemorySource {
    let users: Vec<u32> = (0..24).map(|row| row % 4).collect();
    let items: Vec<u32> = (0..24).map(|row| (row * 5) % 16).collect();
    let features = FeatureColumns::new(
        (0..24).map(|row| vec![1000 + row % 4, 2000 + row, items[row as usize]]).collect(),
        (0..24).map(|row| vec![1.0, row as f32, 1.0]).collect(),
    )
    .unwrap();
    let train = InteractionSplit::new(users, items, vec![1.0; 24])
        .unwrap()
        .with_features(features)
        .unwrap();
    InMemorySource::new(4, n_items, train, InteractionSplit::default()).unwrap()
}

fn config(replacement: bool) -> SamplerConfig {
    SamplerConfig {
        seed: 1234,
        batch_size: 5,
        num_neg: 2,
        replacement_sampling: replacement,
        ..SamplerConfig::default()
    }
}

fn drain(session: &mut SamplingSession<'_, InMemorySource>) -> Vec<InteractionBatch> {
    let mut batches = Vec::new();
    loop {
        let batch = session.next_batch().unwrap();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

fn resume_after_two_batches(replacement: bool) {
    let source = build_source(16);
    let mut original = SamplingSession::new(&source, Mode::Train, config(replacement)).unwrap();
    original.next_batch().unwrap();
    original.next_batch().unwrap();

    let encoded = serde_json::to_string(&original.snapshot()).unwrap();
    let snapshot: SessionSnapshot = serde_json::from_str(&encoded).unwrap();
    assert_eq!(snapshot.offset, 10);
    assert_eq!(snapshot.steps, 2);
    assert_eq!(snapshot.pools.is_some(), !replacement);

    let mut resumed = SamplingSession::new(&source, Mode::Train, config(replacement)).unwrap();
    resumed.restore(&snapshot).unwrap();
    assert_eq!(resumed.cursor().offset(), 10);
    assert_eq!(drain(&mut resumed), drain(&mut original));
}

#[test]
fn restored_session_continues_the_same_stream() {
    resume_after_two_batches(true);
}

#[test]
fn restored_pool_session_continues_the_same_stream() {
    resume_after_two_batches(false);
}

#[test]
fn restored_pools_keep_their_depletion() {
    let source = build_source(16);
    let mut original = SamplingSession::new(&source, Mode::Train, config(false)).unwrap();
    original.next_batch().unwrap();
    let snapshot = original.snapshot();
    let pools = snapshot.pools.as_ref().unwrap();
    // User 0 owns rows 0 and 4 of the first slice: two draws of two negatives.
    assert_eq!(pools.pool_len(0), Some(16 - source.consumed().count(0) - 4));

    let mut resumed = SamplingSession::new(&source, Mode::Train, config(false)).unwrap();
    resumed.restore(&snapshot).unwrap();
    assert_eq!(resumed.pools(), original.pools());
}

#[test]
fn pools_carry_over_between_epochs() {
    let source = build_source(16);
    let mut first = SamplingSession::new(&source, Mode::Train, config(false)).unwrap();
    drain(&mut first);
    let pools = first.into_pools().unwrap();
    let lengths: Vec<(u32, Option<usize>)> =
        pools.users().map(|user| (user, pools.pool_len(user))).collect();
    let refills = pools.refill_count();

    let mut second =
        SamplingSession::with_pools(&source, Mode::Train, config(false), pools).unwrap();
    let carried = second.pools().unwrap();
    for (user, len) in &lengths {
        assert_eq!(carried.pool_len(*user), *len);
    }
    assert_eq!(carried.refill_count(), refills);

    let batches = drain(&mut second);
    assert_eq!(batches.len(), 5);
    for batch in &batches {
        for (user, item, label) in batch.rows() {
            if label == 0.0 {
                assert!(!source.consumed().contains(user, item));
            }
        }
    }
}

#[test]
fn pools_from_another_universe_are_rejected() {
    let small = build_source(16);
    let large = build_source(32);
    let pools = SamplingSession::new(&small, Mode::Train, config(false))
        .unwrap()
        .into_pools()
        .unwrap();
    assert!(matches!(
        SamplingSession::with_pools(&large, Mode::Train, config(false), pools),
        Err(SamplerError::InconsistentData(_))
    ));
}

#[test]
fn feature_transform_copies_every_slot_but_the_item() {
    let source = build_source(16);
    let split = source.split(Mode::Train);
    let features = split.features().unwrap();
    for replacement in [true, false] {
        let mut session =
            SamplingSession::new(&source, Mode::Train, config(replacement)).unwrap();
        let batch = session.transform_full_features(Mode::Train).unwrap();

        assert_eq!(batch.len(), split.len() * 3);
        assert_eq!(&batch.feat_indices[..split.len()], features.indices());

        for (pos, (indices, values)) in batch
            .feat_indices
            .iter()
            .zip(&batch.feat_values)
            .enumerate()
            .skip(split.len())
        {
            let row = (pos - split.len()) / 2;
            let template = &features.indices()[row];
            assert_eq!(indices[..2], template[..2]);
            assert_eq!(values, &features.values()[row]);
            let user = split.users()[row];
            assert!(!source.consumed().contains(user, indices[2]));
            assert_eq!(batch.labels[pos], 0.0);
        }
        // The one-shot transform never draws from the pools.
        if let Some(pools) = session.pools() {
            for user in 0..4 {
                assert_eq!(pools.pool_len(user), Some(16 - source.consumed().count(user)));
            }
        }
    }
}

#[test]
fn feature_rejection_batches_have_k_plus_one_rows_per_positive() {
    let source = build_source(16);
    let split = source.split(Mode::Train);
    let features = split.features().unwrap();
    let mut session = SamplingSession::new(&source, Mode::Train, config(false)).unwrap();
    let mut remaining = split.len();
    loop {
        let batch = session.next_feature_batch_with_replacement().unwrap();
        if batch.is_empty() {
            break;
        }
        let n = remaining.min(5);
        remaining -= n;
        assert_eq!(batch.len(), n * 3);
        assert_eq!(batch.feat_indices.len(), batch.feat_values.len());
        let positives = batch.labels.iter().filter(|label| **label != 0.0).count();
        assert_eq!(positives, n);
        for (indices, label) in batch.feat_indices.iter().zip(&batch.labels) {
            if *label == 0.0 {
                // Slot 0 encodes the user as 1000 + user.
                let user = indices[0] - 1000;
                assert!(!source.consumed().contains(user, indices[2]));
            } else {
                let row = (indices[1] - 2000) as usize;
                assert_eq!(indices, &features.indices()[row]);
            }
        }
    }
    assert_eq!(remaining, 0);
    assert_eq!(session.stats().pool_refills, 0);
}

#[test]
fn feature_negatives_do_not_alias_their_template() {
    let source = build_source(16);
    let mut session = SamplingSession::new(&source, Mode::Train, config(false)).unwrap();
    let batch = session.next_feature_batch().unwrap();
    let features = source.split(Mode::Train).features().unwrap();
    // Templates are untouched after their copies were overwritten.
    for row in 0..5 {
        assert_eq!(features.indices()[row][2], source.split(Mode::Train).items()[row]);
    }
    let positives = batch.labels.iter().filter(|label| **label != 0.0).count();
    assert_eq!(positives, 5);
}
