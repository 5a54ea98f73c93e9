#![cfg(not(target_arch = "wasm32"))]

use audren_dsp::{
    apply_biquad_filter_and_mix, apply_biquad_filter_and_mix_ramp, apply_biquad_filter_float,
    apply_biquad_filter_int, apply_double_biquad_filter_and_mix,
    apply_double_biquad_filter_and_mix_ramp, BiquadCoefficients, BiquadFilterParameter,
    BiquadFilterState,
};
use proptest::prelude::*;

/// Coefficients bounded to |c| <= 1.0 so 64-sample blocks stay finite.
fn parameter() -> impl Strategy<Value = BiquadFilterParameter> {
    (
        proptest::array::uniform3(-16384i16..=16384),
        proptest::array::uniform2(-16384i16..=16384),
    )
        .prop_map(|(b, a)| BiquadFilterParameter::new(b, a))
}

fn samples(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(-(1 << 20)..(1i32 << 20), 0..=max_len)
}

proptest! {
    #[test]
    fn split_blocks_through_raw_words_match_one_block(
        p in parameter(),
        input in samples(64),
        split in 0usize..=64,
    ) {
        let split = split.min(input.len());

        let mut whole = vec![0i32; input.len()];
        let mut whole_state = BiquadFilterState::zeroed();
        apply_biquad_filter_float(&mut whole, &input, &p, &mut whole_state, input.len());

        let mut parts = vec![0i32; input.len()];
        let mut first_state = BiquadFilterState::zeroed();
        apply_biquad_filter_float(&mut parts[..split], &input[..split], &p, &mut first_state, split);

        // Persist through the raw register words only.
        let mut second_state = BiquadFilterState::from_words(first_state.words());
        let rest = input.len() - split;
        apply_biquad_filter_float(&mut parts[split..], &input[split..], &p, &mut second_state, rest);

        prop_assert_eq!(whole, parts);
        prop_assert_eq!(whole_state, second_state);
    }

    #[test]
    fn integer_kernel_split_blocks_match_one_block(
        p in parameter(),
        input in samples(64),
        split in 0usize..=64,
    ) {
        let split = split.min(input.len());

        let mut whole = vec![0i32; input.len()];
        let mut whole_state = BiquadFilterState::zeroed();
        apply_biquad_filter_int(&mut whole, &input, &p, &mut whole_state, input.len());

        let mut parts = vec![0i32; input.len()];
        let mut state = BiquadFilterState::zeroed();
        apply_biquad_filter_int(&mut parts[..split], &input[..split], &p, &mut state, split);
        let rest = input.len() - split;
        apply_biquad_filter_int(&mut parts[split..], &input[split..], &p, &mut state, rest);

        prop_assert_eq!(whole, parts);
        prop_assert_eq!(whole_state, state);
    }

    #[test]
    fn cascade_with_identity_second_stage_matches_single_filter(
        p in parameter(),
        input in samples(64),
        volume in -2.0f32..2.0,
    ) {
        let n = input.len();
        let prefill: Vec<i32> = (0..n as i32).map(|i| i * 17 - 300).collect();

        let mut single = prefill.clone();
        let mut single_state = BiquadFilterState::zeroed();
        apply_biquad_filter_and_mix(&mut single, &input, &p.into(), &mut single_state, n, volume);

        let mut double = prefill.clone();
        let mut states = [BiquadFilterState::zeroed(); 2];
        let coefficients: [BiquadCoefficients; 2] =
            [p.into(), BiquadFilterParameter::IDENTITY.into()];
        apply_double_biquad_filter_and_mix(&mut double, &input, &coefficients, &mut states, n, volume);

        prop_assert_eq!(single, double);
        prop_assert_eq!(single_state, states[0]);
    }

    #[test]
    fn ramped_cascade_with_identity_second_stage_matches_single_filter(
        p in parameter(),
        input in samples(64),
        volume0 in 0.0f32..1.0,
        volume1 in 0.0f32..1.0,
    ) {
        let n = input.len();

        let mut single = vec![0i32; n];
        let mut single_state = BiquadFilterState::zeroed();
        let single_last = apply_biquad_filter_and_mix_ramp(
            &mut single, &input, &p.into(), &mut single_state, n, volume0, volume1,
        );

        let mut double = vec![0i32; n];
        let mut states = [BiquadFilterState::zeroed(); 2];
        let coefficients: [BiquadCoefficients; 2] =
            [p.into(), BiquadFilterParameter::IDENTITY.into()];
        let double_last = apply_double_biquad_filter_and_mix_ramp(
            &mut double, &input, &coefficients, &mut states, n, volume0, volume1,
        );

        prop_assert_eq!(single, double);
        prop_assert_eq!(single_last, double_last);
        prop_assert_eq!(single_state, states[0]);
    }

    #[test]
    fn integer_and_float_kernels_agree_on_fir_filters(
        b in proptest::array::uniform3(-8192i16..=8192),
        input in proptest::collection::vec(-10_000i32..10_000, 1..=64),
    ) {
        let p = BiquadFilterParameter::new(b, [0, 0]);
        let n = input.len();

        let mut float_out = vec![0i32; n];
        let mut float_state = BiquadFilterState::zeroed();
        apply_biquad_filter_float(&mut float_out, &input, &p, &mut float_state, n);

        let mut int_out = vec![0i32; n];
        let mut int_state = BiquadFilterState::zeroed();
        apply_biquad_filter_int(&mut int_out, &input, &p, &mut int_state, n);

        for (i, (f, q)) in float_out.iter().zip(int_out.iter()).enumerate() {
            prop_assert!((f - q).abs() <= 1, "sample {i}: float {f} int {q}");
        }
    }
}

#[test]
fn integer_and_float_kernels_stay_close_with_feedback() {
    // Complex pole pair at radius 0.5.
    let p = BiquadFilterParameter::new([4096, 2048, 1024], [8192, -4096]);
    let input: Vec<i32> = (0..240).map(|i| ((i * 7919) % 20_000) - 10_000).collect();

    let mut float_out = vec![0i32; input.len()];
    let mut float_state = BiquadFilterState::zeroed();
    apply_biquad_filter_float(&mut float_out, &input, &p, &mut float_state, input.len());

    let mut int_out = vec![0i32; input.len()];
    let mut int_state = BiquadFilterState::zeroed();
    apply_biquad_filter_int(&mut int_out, &input, &p, &mut int_state, input.len());

    for (i, (f, q)) in float_out.iter().zip(int_out.iter()).enumerate() {
        assert!((f - q).abs() <= 4, "sample {i}: float {f} int {q}");
    }
}
