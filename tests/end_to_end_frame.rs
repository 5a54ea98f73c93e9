use anyhow::{Context, Result};
use audren_dsp::BiquadFilterParameter;
use audren_renderer::splitter::splitter_send_data_magic;
use audren_renderer::{
    BiquadFilterAndMixCommand, BiquadFilterCommand, Command, CommandListProcessor, MixVolume,
    RendererConfig, SplitterDestinationInParameter, StateArena, StateHandle, StateSnapshot,
    VoiceHandle, MAX_MIX_BUFFERS,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn small_config() -> Result<RendererConfig> {
    RendererConfig::from_json(
        &serde_json::json!({
            "sample_rate": 32000,
            "sample_count": 160,
            "mix_buffer_count": 4,
            "voice_count": 1,
            "biquad_state_count": 2,
            "splitter_destination_count": 2,
        })
        .to_string(),
    )
    .context("config")
}

#[test]
fn half_gain_filter_produces_expected_block_and_state() -> Result<()> {
    init_tracing();

    let mut mix = audren_renderer::MixBufferArena::new(2, 3);
    mix.buffer_mut(0)
        .context("input buffer")?
        .copy_from_slice(&[1000, 2000, 3000]);
    let mut states = StateArena::with_counts(1, 0);
    let commands: Vec<Command> = vec![BiquadFilterCommand {
        input: 0,
        output: 1,
        coefficients: BiquadFilterParameter::new([8192, 0, 0], [0, 0]).into(),
        state: StateHandle(0),
        needs_init: true,
        use_float_processing: true,
    }
    .into()];

    let summary = CommandListProcessor::from_arena(&mut mix, &mut states).process_list(&commands);
    assert_eq!(summary.processed, 1);

    assert_eq!(mix.buffer(1), Some(&[500, 1000, 1500][..]));
    let state = states.biquad_state(StateHandle(0)).context("state")?;
    assert_eq!(state.s0, 3000.0f64.to_bits() as i64);
    assert_eq!(state.s1, 2000.0f64.to_bits() as i64);
    assert_eq!(state.s2, 1500.0f64.to_bits() as i64);
    assert_eq!(state.s3, 1000.0f64.to_bits() as i64);
    Ok(())
}

/// One frame of a voice routed through a splitter destination: the destination's volumes drive
/// a ramped filter-and-mix into two final mix buffers, the state survives a save/restore, and a
/// second frame continues exactly where the first left off.
#[test]
fn splitter_driven_frames_survive_a_snapshot() -> Result<()> {
    init_tracing();

    let config = small_config()?;
    let behavior = config.behavior();
    let mut pool = config.build_splitter_pool();
    let mut states = config.build_state_arena();
    let mut mix = config.build_mix_buffers();
    let n = config.sample_count as usize;

    let mut volumes = [0.0f32; MAX_MIX_BUFFERS];
    volumes[2] = 0.5;
    volumes[3] = 1.0;
    let params = SplitterDestinationInParameter::new(1, 0, volumes, true);
    assert_eq!(params.magic, splitter_send_data_magic());
    pool.update(&params, &behavior);
    let destination = pool.get(1).context("destination")?;
    assert!(destination.is_configured());

    let frame = |out: u32, first: bool, needs_init: bool| -> Command {
        BiquadFilterAndMixCommand {
            input: 0,
            output: out as i16,
            coefficients: BiquadFilterParameter::new([8192, 8192, 0], [0, 0]).into(),
            state: StateHandle(0),
            previous_state: StateHandle(1),
            voice_state: VoiceHandle(0),
            last_sample_index: out as i32,
            volume: MixVolume::from_pair(
                destination.mix_volume_prev(out as usize),
                destination.mix_volume(out as usize),
                true,
            ),
            needs_init,
            is_first_mix_buffer: first,
        }
        .into()
    };
    let first_frame = vec![frame(2, true, true), frame(3, false, false)];
    let next_frame = vec![frame(2, true, false), frame(3, false, false)];

    let input: Vec<i32> = (0..n as i32).map(|i| (i % 40) * 100 - 2000).collect();
    mix.buffer_mut(0).context("input")?.copy_from_slice(&input);
    let summary = CommandListProcessor::from_arena(&mut mix, &mut states).process_list(&first_frame);
    assert_eq!(summary.skipped, 0);

    // Ramping from 0.0 on first activation is skipped: previous volumes were reset.
    let buffer2 = mix.buffer(2).context("buffer 2")?.to_vec();
    let buffer3 = mix.buffer(3).context("buffer 3")?.to_vec();
    assert!(buffer2.iter().zip(&buffer3).all(|(&a, &b)| (a - b / 2).abs() <= 1));
    let voice = states.voice(VoiceHandle(0)).context("voice")?;
    assert_eq!(voice.previous_samples[3], *buffer3.last().context("tail")?);

    // Save, restore into a fresh arena, then run the same next frame on both.
    let saved = states.save_state();
    let mut restored = config.build_state_arena();
    restored.load_state(&saved)?;
    assert_eq!(restored, states);

    let mut mix_a = config.build_mix_buffers();
    let mut mix_b = config.build_mix_buffers();
    mix_a.buffer_mut(0).context("input")?.copy_from_slice(&input);
    mix_b.buffer_mut(0).context("input")?.copy_from_slice(&input);
    CommandListProcessor::from_arena(&mut mix_a, &mut states).process_list(&next_frame);
    CommandListProcessor::from_arena(&mut mix_b, &mut restored).process_list(&next_frame);

    assert_eq!(mix_a, mix_b);
    assert_eq!(states, restored);

    pool.update_internal_states();
    Ok(())
}
