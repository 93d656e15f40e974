use spikecode::prelude::*;

#[test]
fn rate_encoded_input_and_saturated_output_tie_to_negative_torque() {
    let obs = ObservationEncoding::Rate.encode(1.0, 10).unwrap();
    assert_eq!(obs.shape(), (10, 2));
    assert_eq!(obs.channel_counts(), vec![10, 0]);

    let out = SpikeTensor::ones(10, 2);
    let action = OutputDecoding::Method1.decode(&out, 10).unwrap();
    assert_eq!(action.values(), &[-2.0]);
}

#[test]
fn every_codec_pair_runs_through_the_reference_network() {
    for enc in ObservationEncoding::ALL {
        for dec in OutputDecoding::ALL {
            let cfg = RunConfig {
                observation_encoding: enc,
                output_decoding: dec,
                time_steps_per_action: 7,
                ..Default::default()
            };
            let mut net = LifNetwork::new(cfg.lif_config(1)).unwrap();
            for x in [-0.9f32, 0.0, 0.3] {
                let input = enc.encode(x, net.spike_time()).unwrap();
                let f = net.forward(&input).unwrap();
                let action = dec.decode(&f.spikes, net.spike_time()).unwrap();
                assert_eq!(action.len(), dec.action_len(net.output_channels()), "{enc}+{dec}");
                assert!(action.values().iter().all(|v| v.is_finite()));
            }
            net.update(1.0);
        }
    }
}

#[test]
fn temporal_round_trip_preserves_latency_order() {
    // A stronger signal spikes earlier, and the temporal decoder reports the
    // earlier index; a zero signal decodes to the no-spike sentinel.
    let window = 12;
    let strong = ObservationEncoding::Temporal.encode(0.9, window).unwrap();
    let weak = ObservationEncoding::Temporal.encode(0.2, window).unwrap();
    let silent = ObservationEncoding::Temporal.encode(0.0, window).unwrap();

    let t_strong = OutputDecoding::Temporal.decode(&strong, window).unwrap();
    let t_weak = OutputDecoding::Temporal.decode(&weak, window).unwrap();
    let t_silent = OutputDecoding::Temporal.decode(&silent, window).unwrap();

    assert!(t_strong.values()[0] < t_weak.values()[0]);
    assert_eq!(t_silent.values(), &[window as f32, window as f32]);
}
