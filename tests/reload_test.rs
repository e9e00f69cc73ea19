mod test_signals;

use symdec::config::{ElementType, FilterConfig};
use symdec::kernel::build_reloadable_cascade;
use symdec::reference;
use symdec::{CascadeChain, FilterError, FirDecimateSym, Invocation, step_cascade};
use test_signals::{random_half_taps, random_input};

fn reload_config(cascade_len: usize) -> FilterConfig {
    FilterConfig::builder(ElementType::Int16, ElementType::Int32)
        .fir_len(27)
        .decimate(3)
        .window_size(192)
        .shift(12)
        .cascade_len(cascade_len)
        .reload(true)
        .build()
        .unwrap()
}

#[test]
fn test_reload_propagates_through_cascade() {
    let config = reload_config(3);
    let input: Vec<i16> = random_input(192 * 4, 1000, 41);
    let taps_a: Vec<i32> = random_half_taps(14, 1000, 42);
    let taps_b: Vec<i32> = random_half_taps(14, 1000, 43);

    let mut kernels = build_reloadable_cascade::<i16, i32>(&config, 1).unwrap();
    let mut output = Vec::new();
    for window in input[..384].chunks(192) {
        let out = step_cascade(&mut kernels, Invocation::new(window).with_taps(&taps_a)).unwrap();
        output.extend(out.primary);
    }
    // Same taps twice: only the first invocation rebuilds
    for kernel in &kernels {
        assert_eq!(kernel.rebuilds(), 1);
        assert_eq!(kernel.previous_taps(), Some(&taps_a[..]));
    }
    assert_eq!(output, reference::decimate(&config, &taps_a, &input[..384]));

    output.clear();
    for window in input[384..].chunks(192) {
        let out = step_cascade(&mut kernels, Invocation::new(window).with_taps(&taps_b)).unwrap();
        output.extend(out.primary);
    }
    for kernel in &kernels {
        assert_eq!(kernel.rebuilds(), 2);
        assert_eq!(kernel.previous_taps(), Some(&taps_b[..]));
    }
    let expected = reference::decimate(&config, &taps_b, &input);
    assert_eq!(output, expected[128..]);
}

#[test]
fn test_rejected_tap_set_leaves_cascade_in_step() {
    let config = reload_config(2);
    let input: Vec<i16> = random_input(192 * 3, 1000, 49);
    let taps: Vec<i32> = random_half_taps(14, 1000, 50);

    let mut kernels = build_reloadable_cascade::<i16, i32>(&config, 1).unwrap();
    let mut output = Vec::new();
    let first = step_cascade(&mut kernels, Invocation::new(&input[..192]).with_taps(&taps)).unwrap();
    output.extend(first.primary);

    let err = step_cascade(
        &mut kernels,
        Invocation::new(&input[192..384]).with_taps(&taps[..5]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        FilterError::TapCount {
            expected: 14,
            actual: 5
        }
    );

    // The rejected window never entered the cascade: resend it
    for window in input[192..].chunks(192) {
        let out = step_cascade(&mut kernels, Invocation::new(window).with_taps(&taps)).unwrap();
        output.extend(out.primary);
    }
    assert_eq!(output, reference::decimate(&config, &taps, &input));
    assert!(kernels.iter().all(|k| k.rebuilds() == 1));
}

#[test]
fn test_missing_taps_keep_current_set() {
    let config = reload_config(2);
    let input: Vec<i16> = random_input(192 * 2, 1000, 44);
    let taps: Vec<i32> = random_half_taps(14, 1000, 45);

    let mut kernels = build_reloadable_cascade::<i16, i32>(&config, 1).unwrap();
    let first = step_cascade(&mut kernels, Invocation::new(&input[..192]).with_taps(&taps)).unwrap();
    let second = step_cascade(&mut kernels, Invocation::new(&input[192..])).unwrap();

    let mut output = first.primary;
    output.extend(second.primary);
    assert_eq!(output, reference::decimate(&config, &taps, &input));
    assert!(kernels.iter().all(|k| k.rebuilds() == 1));
}

#[test]
fn test_reload_starts_from_zero_taps() {
    let config = reload_config(1);
    let mut kernel = FirDecimateSym::<i16, i32>::new_reloadable(&config, 0).unwrap();
    let out = kernel
        .process(Invocation::new(&vec![100; 192]))
        .unwrap()
        .unwrap();
    assert!(out.primary.iter().all(|&y| y == 0));

    // An all-zero set matches the initial state and is not a change
    assert!(!kernel.maybe_reload(Some(&[0; 14][..])).unwrap());
    assert_eq!(kernel.rebuilds(), 0);
}

#[test]
fn test_bound_taps_are_initial_reload_state() {
    let config = reload_config(1);
    let taps: Vec<i32> = random_half_taps(14, 1000, 46);
    let mut kernel = FirDecimateSym::<i16, i32>::new(&config, 0, &taps).unwrap();
    assert!(!kernel.maybe_reload(Some(taps.as_slice())).unwrap());
    assert_eq!(kernel.rebuilds(), 0);
}

#[test]
fn test_taps_ignored_without_reload() {
    let config = FilterConfig::builder(ElementType::Int32, ElementType::Int32)
        .fir_len(16)
        .decimate(2)
        .window_size(64)
        .build()
        .unwrap();
    let taps: Vec<i32> = (1..=8).collect();
    let other = vec![0i32; 8];
    let mut kernel = FirDecimateSym::<i32, i32>::new(&config, 0, &taps).unwrap();

    let window = vec![1; 64];
    let out = kernel
        .process(Invocation::new(&window).with_taps(&other))
        .unwrap()
        .unwrap();
    assert_eq!(out.primary[31], 72);
    assert_eq!(kernel.previous_taps(), None);
}

#[test]
fn test_threaded_chain_reloads() {
    let config = reload_config(2);
    let input: Vec<i16> = random_input(192 * 3, 1000, 47);
    let taps: Vec<i32> = random_half_taps(14, 1000, 48);

    let chain = CascadeChain::<i16, i32>::spawn_reloadable(&config).unwrap();
    let mut output = Vec::new();
    for (i, window) in input.chunks(192).enumerate() {
        let reload = (i == 0).then(|| taps.clone());
        chain.push(window.to_vec(), None, reload).unwrap();
        output.extend(chain.recv().unwrap().primary);
    }
    chain.finish().unwrap();

    assert_eq!(output, reference::decimate(&config, &taps, &input));
}
