//! Property tests for the delay buffer and the output fit.

use delayed_mirror::buffer::DelayBuffer;
use delayed_mirror::geometry::{compute_fit, Size};
use proptest::prelude::*;
use std::time::Duration;

const GRACE: Duration = Duration::from_millis(2000);

/// Strictly increasing capture times in milliseconds.
fn capture_times() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..200, 1..60).prop_map(|gaps| {
        gaps.iter()
            .scan(0u64, |t, gap| {
                *t += gap;
                Some(*t)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn released_units_keep_capture_order(
        times in capture_times(),
        target_ms in 0u64..3000,
        poll_every in 1usize..10,
    ) {
        let target = Duration::from_millis(target_ms);
        let mut buffer = DelayBuffer::new(GRACE);
        let mut seen = Vec::new();

        for (i, &t) in times.iter().enumerate() {
            let now = Duration::from_millis(t);
            buffer.enqueue(i, now);
            if i % poll_every == 0 {
                let release = buffer.release_ready(now, target);
                seen.extend(release.released.into_iter().map(|u| *u.payload()));
            }
        }
        let end = Duration::from_millis(times[times.len() - 1] + target_ms);
        seen.extend(buffer.release_ready(end, target).released.into_iter().map(|u| *u.payload()));

        prop_assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn released_units_are_old_enough_and_fresh_enough(
        times in capture_times(),
        target_ms in 0u64..3000,
        poll_offset in 0u64..6000,
    ) {
        let target = Duration::from_millis(target_ms);
        let mut buffer = DelayBuffer::new(GRACE);
        for (i, &t) in times.iter().enumerate() {
            buffer.enqueue(i, Duration::from_millis(t));
        }

        let now = Duration::from_millis(times[times.len() - 1] + poll_offset);
        let release = buffer.release_ready(now, target);

        for unit in &release.released {
            let age = unit.age(now);
            prop_assert!(age >= target);
            prop_assert!(age <= target + GRACE);
        }
        // Whatever is left is not due yet
        if let Some(age) = buffer.oldest_age(now) {
            prop_assert!(age < target);
        }
        prop_assert_eq!(
            release.released.len() + release.discarded + buffer.len(),
            times.len()
        );
    }

    #[test]
    fn zero_target_releases_each_unit_immediately(times in capture_times()) {
        let mut buffer = DelayBuffer::new(GRACE);
        for (i, &t) in times.iter().enumerate() {
            let now = Duration::from_millis(t);
            buffer.enqueue(i, now);
            let (latest, superseded) = buffer.release_ready(now, Duration::ZERO).into_latest();
            prop_assert_eq!(latest.map(|u| *u.payload()), Some(i));
            prop_assert_eq!(superseded, 0);
        }
        prop_assert!(buffer.is_empty());
    }

    #[test]
    fn fit_stays_inside_container(
        sw in 1.0f64..4000.0,
        sh in 1.0f64..4000.0,
        cw in 1.0f64..4000.0,
        ch in 1.0f64..4000.0,
        landscape in any::<bool>(),
    ) {
        let g = compute_fit(Size::new(sw, sh), Size::new(cw, ch), landscape).unwrap();
        let eps = 1e-6;

        prop_assert!(g.output_width <= cw + eps);
        prop_assert!(g.output_height <= ch + eps);
        // One axis fills the container
        prop_assert!((g.output_width - cw).abs() < eps || (g.output_height - ch).abs() < eps);

        let source_ratio = g.effective_source.width / g.effective_source.height;
        let output_ratio = g.output_width / g.output_height;
        prop_assert!((source_ratio - output_ratio).abs() <= source_ratio * 1e-9);

        prop_assert!((g.offset_x * 2.0 + g.output_width - cw).abs() < eps);
        prop_assert!((g.offset_y * 2.0 + g.output_height - ch).abs() < eps);
        prop_assert_eq!(g.orientation_corrected, landscape && sh > sw);
    }
}
