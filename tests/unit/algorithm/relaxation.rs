//! Tests for density bounds, split geometry and the relaxation step

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::f32::consts::{PI, SQRT_2};
    use stippler::algorithm::accumulator::Cell;
    use stippler::algorithm::jitter::Jitter;
    use stippler::algorithm::relaxation::{
        CellDecision, Diagnostic, calculate_lower_density_bound, calculate_upper_density_bound,
        classify, current_stipple_size, hysteresis_at, relax, split_cell,
    };
    use stippler::algorithm::stippler::StippleConfig;
    use stippler::math::Point;
    use stippler::math::polygon::Rect;
    use stippler::spatial::stipple::Stipple;

    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn cell(centroid: Point, area: f32, total_density: f32) -> Cell {
        Cell {
            centroid,
            orientation: 0.0,
            area,
            total_density,
        }
    }

    fn fixed_config() -> StippleConfig {
        StippleConfig {
            adaptive_point_size: false,
            point_size: 2.0,
            hysteresis: 0.6,
            hysteresis_delta: 0.0,
            ..StippleConfig::default()
        }
    }

    // Tests the bounds bracket the ink of one dot
    // Verified by using the diameter as the radius
    #[test]
    fn test_density_bounds() {
        let lower = calculate_lower_density_bound(2.0, 0.6);
        let upper = calculate_upper_density_bound(2.0, 0.6);

        assert!((lower - 0.7 * PI).abs() < 1e-5);
        assert!((upper - 1.3 * PI).abs() < 1e-5);
        assert!(lower < PI && PI < upper);
    }

    // Tests hysteresis widens linearly per iteration
    // Verified by ignoring the iteration index
    #[test]
    fn test_hysteresis_growth() {
        let config = StippleConfig {
            hysteresis: 0.5,
            hysteresis_delta: 0.1,
            ..StippleConfig::default()
        };

        assert!((hysteresis_at(&config, 0) - 0.5).abs() < 1e-6);
        assert!((hysteresis_at(&config, 3) - 0.8).abs() < 1e-6);
    }

    // Tests adaptive size interpolates between the configured bounds
    // Verified by inverting the blend weights
    #[test]
    fn test_adaptive_size() {
        let config = StippleConfig {
            point_size_min: 2.0,
            point_size_max: 4.0,
            adaptive_point_size: true,
            ..StippleConfig::default()
        };

        let dense = cell(Point::ZERO, 10.0, 10.0);
        let quarter = cell(Point::ZERO, 16.0, 4.0);
        let blank = cell(Point::ZERO, 10.0, 0.0);

        assert!((current_stipple_size(&dense, &config) - 4.0).abs() < 1e-5);
        assert!((current_stipple_size(&quarter, &config) - 3.0).abs() < 1e-5);
        assert!((current_stipple_size(&blank, &config) - 2.0).abs() < 1e-5);
        assert!((current_stipple_size(&dense, &fixed_config()) - 2.0).abs() < f32::EPSILON);
    }

    // Tests classification against both thresholds
    // Verified by swapping the split and delete comparisons
    #[test]
    fn test_classify() {
        assert_eq!(classify(&cell(Point::ZERO, 50.0, 1.0), 2.0, 0.6), CellDecision::Delete);
        assert_eq!(classify(&cell(Point::ZERO, 50.0, PI), 2.0, 0.6), CellDecision::Move);
        assert_eq!(classify(&cell(Point::ZERO, 50.0, 10.0), 2.0, 0.6), CellDecision::Split);
    }

    // Tests split children sit along the principal axis with half the dot area
    // Verified by offsetting perpendicular to the axis
    #[test]
    fn test_split_geometry() {
        let parent = Stipple::new(Point::new(5.0, 5.0), 2.0, BLACK);
        let split = cell(Point::new(5.0, 5.0), 100.0 * PI, 30.0);
        let mut jitter = Jitter::new(0);

        let [first, second] = split_cell(&parent, &split, 2.0, &mut jitter);

        assert!((first.position.x - 0.0).abs() <= 0.1 + 1e-4);
        assert!((second.position.x - 10.0).abs() <= 0.1 + 1e-4);
        assert!((first.position.y - 5.0).abs() <= 0.1 + 1e-4);
        assert!((first.size - 2.0 / SQRT_2).abs() < 1e-6);
        assert_eq!(first.color, BLACK);
        assert!(!first.is_moving());
    }

    // Tests moving parents hand their motion to the children
    // Verified by placing children directly
    #[test]
    fn test_split_inherits_motion() {
        let mut parent = Stipple::new(Point::new(5.0, 5.0), 2.0, BLACK);
        parent.glide_to(Point::new(5.0, 5.0), 2.0, 0.5);
        let split = cell(Point::new(5.0, 5.0), 100.0 * PI, 30.0);

        let children = split_cell(&parent, &split, 2.0, &mut Jitter::new(0));

        for child in &children {
            assert!(child.is_moving());
            assert_eq!(child.position, Point::new(5.0, 5.0));
            assert!((child.motion.speed - 0.5).abs() < f32::EPSILON);
        }
    }

    // Tests a full step moves, splits, deletes and compacts
    // Verified by keeping deleted stipples after compaction
    #[test]
    fn test_relax_lifecycle() {
        let stipples = vec![
            Stipple::new(Point::new(1.0, 1.0), 2.0, BLACK),
            Stipple::new(Point::new(5.0, 5.0), 2.0, BLACK),
            Stipple::new(Point::new(8.0, 8.0), 2.0, BLACK),
            Stipple::new(Point::new(8.0, 8.0), 2.0, BLACK),
        ];
        let cells = vec![
            cell(Point::new(2.0, 1.5), 20.0, PI),
            cell(Point::new(5.0, 5.0), 60.0, 40.0),
            cell(Point::new(8.0, 8.0), 20.0, 0.1),
            Cell::default(),
        ];
        let bounds = Rect::from_image_size(10, 10);

        let relaxed = relax(
            &stipples,
            0,
            &cells,
            None,
            bounds,
            &fixed_config(),
            0,
            &mut Jitter::new(1),
        );

        assert_eq!(relaxed.report.splits, 1);
        assert_eq!(relaxed.report.deletions, 2);
        assert_eq!(relaxed.stipples.len(), 3);
        assert_eq!(relaxed.report.stipple_count, 3);
        assert_eq!(relaxed.stipples[0].position, Point::new(2.0, 1.5));
        assert!((relaxed.report.displacement - 1.118_034).abs() < 1e-4);
        assert!(relaxed.report.population_changed());
        assert!(relaxed.stipples.iter().all(|s| !s.deleted));
    }

    // Tests held stipples are skipped and left out of the result
    // Verified by relaxing from index zero regardless of the held count
    #[test]
    fn test_held_stipples_are_fixed_sites() {
        let stipples = vec![
            Stipple::new(Point::new(1.0, 1.0), 2.0, BLACK),
            Stipple::new(Point::new(6.0, 6.0), 2.0, BLACK),
        ];
        let cells = vec![
            cell(Point::new(2.0, 2.0), 20.0, 50.0),
            cell(Point::new(7.0, 6.0), 20.0, PI),
        ];

        let relaxed = relax(
            &stipples,
            1,
            &cells,
            None,
            Rect::from_image_size(10, 10),
            &fixed_config(),
            0,
            &mut Jitter::new(1),
        );

        assert_eq!(relaxed.report.splits, 0);
        assert_eq!(relaxed.stipples.len(), 1);
        assert_eq!(relaxed.stipples[0].position, Point::new(7.0, 6.0));
        assert_eq!(relaxed.report.stipple_count, 1);
    }

    // Tests population control can be disabled
    // Verified by ignoring the population_control flag
    #[test]
    fn test_population_control_off() {
        let config = StippleConfig {
            population_control: false,
            ..fixed_config()
        };
        let stipples = vec![Stipple::new(Point::new(1.0, 1.0), 2.0, BLACK)];
        let cells = vec![cell(Point::new(3.0, 3.0), 50.0, 0.0)];

        let relaxed = relax(
            &stipples,
            0,
            &cells,
            None,
            Rect::from_image_size(10, 10),
            &config,
            0,
            &mut Jitter::new(1),
        );

        assert_eq!(relaxed.stipples.len(), 1);
        assert_eq!(relaxed.stipples[0].position, Point::new(3.0, 3.0));
        assert_eq!(
            relaxed.report.diagnostics,
            vec![Diagnostic::ZeroDensityCell { index: 0 }]
        );
    }

    // Tests centroids outside the image are clamped and reported
    // Verified by skipping the clamp
    #[test]
    fn test_out_of_bounds_clamped() {
        let stipples = vec![Stipple::new(Point::new(1.0, 1.0), 2.0, BLACK)];
        let cells = vec![cell(Point::new(-4.0, 12.0), 20.0, PI)];

        let relaxed = relax(
            &stipples,
            0,
            &cells,
            None,
            Rect::from_image_size(10, 10),
            &fixed_config(),
            0,
            &mut Jitter::new(1),
        );

        assert_eq!(relaxed.stipples[0].position, Point::new(0.0, 9.0));
        assert!(
            relaxed
                .report
                .diagnostics
                .contains(&Diagnostic::OutOfBoundsSample { index: 0 })
        );
    }

    // Tests gliding stipples move at capped speed instead of snapping
    // Verified by ignoring the glide flag
    #[test]
    fn test_glide_step() {
        let config = StippleConfig {
            glide: true,
            animation_speed: 1.0,
            ..fixed_config()
        };
        let stipples = vec![Stipple::new(Point::new(0.0, 0.0), 2.0, BLACK)];
        let cells = vec![cell(Point::new(5.0, 0.0), 20.0, PI)];

        let relaxed = relax(
            &stipples,
            0,
            &cells,
            None,
            Rect::from_image_size(10, 10),
            &config,
            0,
            &mut Jitter::new(1),
        );

        assert_eq!(relaxed.stipples[0].position, Point::new(1.0, 0.0));
        assert!((relaxed.report.displacement - 1.0).abs() < 1e-6);
        assert!(relaxed.stipples[0].is_moving());
    }

    proptest! {
        // Tests cells between the bounds never split or delete
        // Verified by using a single threshold for both decisions
        #[test]
        fn prop_hysteresis_band_is_stable(
            size in 1.0f32..8.0,
            hysteresis in 0.0f32..1.5,
            fraction in 0.0f32..=1.0,
        ) {
            let lower = calculate_lower_density_bound(size, hysteresis);
            let upper = calculate_upper_density_bound(size, hysteresis);
            let density = (upper - lower).mul_add(fraction, lower).clamp(lower, upper);

            let decision = classify(&cell(Point::ZERO, 100.0, density), size, hysteresis);
            prop_assert_eq!(decision, CellDecision::Move);
        }
    }
}
