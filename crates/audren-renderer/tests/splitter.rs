use audren_dsp::{BiquadFilterParameter, BiquadFilterParameterFloat};
use audren_renderer::splitter::splitter_send_data_magic;
use audren_renderer::{
    BehaviorInfo, SplitterBiquadFilter, SplitterDestinationData, SplitterDestinationInParameter,
    SplitterDestinationPool, MAX_MIX_BUFFERS, UNUSED_MIX_ID,
};

fn volumes(v: f32) -> [f32; MAX_MIX_BUFFERS] {
    let mut out = [0.0; MAX_MIX_BUFFERS];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = v + i as f32;
    }
    out
}

fn configured(id: i32) -> SplitterDestinationData {
    let mut destination = SplitterDestinationData::new(id);
    destination.update(&SplitterDestinationInParameter::new(id, 3, volumes(0.25), true), false);
    destination
}

#[test]
fn new_destination_is_unrouted() {
    let destination = SplitterDestinationData::new(4);
    assert_eq!(destination.id(), 4);
    assert_eq!(destination.destination_id(), UNUSED_MIX_ID);
    assert!(!destination.in_use());
    assert!(!destination.is_configured());
    assert_eq!(destination.next(), None);
}

#[test]
fn mismatched_id_or_magic_changes_nothing() {
    let before = configured(1);

    let mut wrong_id = SplitterDestinationInParameter::new(2, 7, volumes(9.0), false);
    wrong_id.reset_prev_volume = true;
    let mut wrong_magic = SplitterDestinationInParameter::new(1, 7, volumes(9.0), false);
    wrong_magic.magic = u32::from_le_bytes(*b"SNDE");

    for params in [&wrong_id, &wrong_magic] {
        for supported in [false, true] {
            let mut destination = before.clone();
            destination.mark_as_need_to_update_internal_state();
            let marked = destination.clone();
            destination.update(params, supported);
            assert_eq!(destination, marked);
        }
    }
}

#[test]
fn first_activation_resets_previous_volumes_without_explicit_flag() {
    let mut destination = SplitterDestinationData::new(0);
    destination.mark_as_need_to_update_internal_state();

    destination.update(&SplitterDestinationInParameter::new(0, 5, volumes(0.5), true), false);

    assert!(destination.in_use());
    assert!(destination.is_configured());
    assert_eq!(destination.destination_id(), 5);
    assert_eq!(destination.mix_volumes_prev(), destination.mix_volumes());
    assert!(!destination.need_update());
}

#[test]
fn staying_in_use_keeps_previous_volumes() {
    let mut destination = configured(0);
    let prev = *destination.mix_volumes_prev();

    destination.update(&SplitterDestinationInParameter::new(0, 3, volumes(2.0), true), false);

    assert_eq!(*destination.mix_volumes_prev(), prev);
    assert_eq!(*destination.mix_volumes(), volumes(2.0));
}

#[test]
fn explicit_reset_flag_is_honoured_literally() {
    // Not an activation edge, but the flag asks for a reset.
    let mut destination = configured(0);
    let mut params = SplitterDestinationInParameter::new(0, 3, volumes(2.0), true);
    params.reset_prev_volume = true;
    destination.update(&params, true);
    assert_eq!(*destination.mix_volumes_prev(), volumes(2.0));

    // Activation edge, but the flag says no.
    let mut fresh = SplitterDestinationData::new(0);
    let params = SplitterDestinationInParameter::new(0, 3, volumes(2.0), true);
    fresh.update(&params, true);
    assert_eq!(*fresh.mix_volumes_prev(), [0.0; MAX_MIX_BUFFERS]);
    assert!(fresh.in_use());
}

#[test]
fn internal_state_commit_needs_in_use_and_dirty_flag() {
    let mut destination = configured(0);
    destination.update(&SplitterDestinationInParameter::new(0, 3, volumes(4.0), true), false);

    // Not marked: nothing to commit.
    destination.update_internal_state();
    assert_eq!(*destination.mix_volumes_prev(), volumes(0.25));

    destination.mark_as_need_to_update_internal_state();
    destination.update_internal_state();
    assert_eq!(*destination.mix_volumes_prev(), volumes(4.0));
    assert!(!destination.need_update());

    // Out of use: the flag is cleared but volumes stay.
    destination.update(&SplitterDestinationInParameter::new(0, 3, volumes(8.0), false), false);
    destination.mark_as_need_to_update_internal_state();
    destination.update_internal_state();
    assert_eq!(*destination.mix_volumes_prev(), volumes(4.0));
    assert!(!destination.need_update());
}

#[test]
fn filter_sets_are_overwritten_only_when_present() {
    let compact = [
        SplitterBiquadFilter {
            enabled: false,
            coefficients: BiquadFilterParameterFloat::IDENTITY.into(),
        },
        SplitterBiquadFilter {
            enabled: true,
            coefficients: BiquadFilterParameterFloat::new([0.5, 0.0, 0.0], [0.0, 0.0]).into(),
        },
    ];
    let per_voice = [
        SplitterBiquadFilter {
            enabled: true,
            coefficients: BiquadFilterParameter::new([8192, 0, 0], [0, 0]).into(),
        },
        SplitterBiquadFilter::default(),
    ];

    let mut destination = SplitterDestinationData::new(0);
    let mut params = SplitterDestinationInParameter::new(0, 1, volumes(1.0), true);
    params.biquad_filters = Some(compact);
    params.voice_biquad_filters = Some(per_voice);
    destination.update(&params, true);

    assert_eq!(*destination.biquad_filters(), compact);
    assert_eq!(*destination.voice_biquad_filters(), per_voice);
    assert_eq!(destination.active_biquad_filter(0), Some(&per_voice[0]));
    assert_eq!(destination.active_biquad_filter(1), Some(&compact[1]));
    assert_eq!(destination.active_biquad_filter(2), None);

    // A blob without filter sets leaves them alone.
    destination.update(&SplitterDestinationInParameter::new(0, 1, volumes(1.0), true), true);
    assert_eq!(*destination.biquad_filters(), compact);
    assert_eq!(*destination.voice_biquad_filters(), per_voice);
}

#[test]
fn pool_routes_updates_by_id_and_gates_filters_on_revision() {
    let filter = SplitterBiquadFilter {
        enabled: true,
        coefficients: BiquadFilterParameter::IDENTITY.into(),
    };
    let mut params = SplitterDestinationInParameter::new(2, 9, volumes(1.0), true);
    params.biquad_filters = Some([filter; 2]);

    let mut old = SplitterDestinationPool::new(4);
    old.update(&params, &BehaviorInfo::new(11));
    let routed = old.get(2).unwrap();
    assert_eq!(routed.destination_id(), 9);
    assert_eq!(routed.active_biquad_filter(0), None);
    assert!(!old.get(1).unwrap().in_use());

    let mut current = SplitterDestinationPool::new(4);
    current.update(&params, &BehaviorInfo::default());
    assert_eq!(current.get(2).unwrap().active_biquad_filter(0), Some(&filter));

    // Unknown ids are dropped.
    let before = current.clone();
    current.update(
        &SplitterDestinationInParameter::new(17, 1, volumes(1.0), true),
        &BehaviorInfo::default(),
    );
    current.update(
        &SplitterDestinationInParameter::new(-1, 1, volumes(1.0), true),
        &BehaviorInfo::default(),
    );
    assert_eq!(current, before);
}

#[test]
fn pool_disables_float_filters_before_float_coefficient_support() {
    let fixed = SplitterBiquadFilter {
        enabled: true,
        coefficients: BiquadFilterParameter::IDENTITY.into(),
    };
    let float = SplitterBiquadFilter {
        enabled: true,
        coefficients: BiquadFilterParameterFloat::new([0.5, 0.0, 0.0], [0.0, 0.0]).into(),
    };
    let mut params = SplitterDestinationInParameter::new(1, 9, volumes(1.0), true);
    params.biquad_filters = Some([float, fixed]);

    for revision in [12, 13, 14] {
        let mut pool = SplitterDestinationPool::new(2);
        pool.update(&params, &BehaviorInfo::new(revision));
        let routed = pool.get(1).unwrap();
        assert_eq!(routed.active_biquad_filter(0), None, "revision {revision}");
        assert_eq!(routed.active_biquad_filter(1), Some(&fixed), "revision {revision}");
        assert_eq!(routed.destination_id(), 9);
    }

    let mut pool = SplitterDestinationPool::new(2);
    pool.update(&params, &BehaviorInfo::new(15));
    assert_eq!(pool.get(1).unwrap().active_biquad_filter(0), Some(&float));
}

#[test]
fn pool_commits_every_destination() {
    let mut pool = SplitterDestinationPool::new(2);
    let behavior = BehaviorInfo::new(11);
    for id in 0..2 {
        pool.update(&SplitterDestinationInParameter::new(id, 0, volumes(1.0), true), &behavior);
        pool.update(&SplitterDestinationInParameter::new(id, 0, volumes(3.0), true), &behavior);
    }

    pool.mark_all_as_need_to_update_internal_state();
    pool.update_internal_states();

    for destination in pool.iter() {
        assert_eq!(*destination.mix_volumes_prev(), volumes(3.0));
        assert!(!destination.need_update());
    }
}

#[test]
fn update_blobs_carry_the_send_data_magic() {
    let params = SplitterDestinationInParameter::new(0, 0, volumes(0.0), false);
    assert_eq!(params.magic, splitter_send_data_magic());
    assert_eq!(params.magic.to_le_bytes(), *b"SNDD");
}
