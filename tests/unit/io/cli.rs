//! Tests for command-line interface parsing and file processing

#[cfg(test)]
mod tests {
    use clap::Parser;
    use image::{Rgba, RgbaImage};
    use std::fs;
    use std::path::{Path, PathBuf};
    use stippler::io::cli::{Cli, FileProcessor};
    use stippler::io::configuration::{
        DEFAULT_INITIAL_POINTS, DEFAULT_MAX_ITERATIONS, DEFAULT_SEED, DEFAULT_TRANSITION_FRAMES,
    };
    use stippler::math::easing::Easing;
    use stippler::spatial::density::DensityMode;
    use tempfile::TempDir;

    fn write_gradient(path: &Path) {
        RgbaImage::from_fn(16, 12, |x, _| {
            let level = (x * 16).min(255) as u8;
            Rgba([level, level, level, 255])
        })
        .save(path)
        .unwrap();
    }

    fn quick_cli(input: &Path, extra: &[&str]) -> Cli {
        let mut args = vec![
            "program",
            input.to_str().unwrap(),
            "--quiet",
            "-i",
            "3",
            "-p",
            "12",
        ];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    // Tests CLI parsing with only the required image argument
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_cli_parse_minimal_args() {
        let cli = Cli::parse_from(["program", "test.png"]);

        assert_eq!(cli.image, PathBuf::from("test.png"));
        assert_eq!(cli.target, None);
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(cli.points, DEFAULT_INITIAL_POINTS);
        assert_eq!(cli.frames, DEFAULT_TRANSITION_FRAMES);
        assert_eq!(cli.mode, DensityMode::Grayscale);
        assert!(!cli.quiet);
        assert!(!cli.edges);
        assert!(!cli.fill);
    }

    // Tests CLI parsing with all available arguments
    // Verified by modifying value enums to ensure they're invoked
    #[test]
    fn test_cli_parse_all_args() {
        let cli = Cli::parse_from([
            "program",
            "input.png",
            "--target",
            "other.png",
            "--seed",
            "123",
            "--iterations",
            "40",
            "--points",
            "500",
            "--point-size",
            "3",
            "--min-size",
            "1",
            "--max-size",
            "5",
            "--fixed-size",
            "--hysteresis",
            "0.4",
            "--mode",
            "color",
            "--edges",
            "--fill",
            "--visualize",
            "--frames",
            "12",
            "--match-distance",
            "8",
            "--easing",
            "cubic-in-out",
            "--quiet",
        ]);

        assert_eq!(cli.target, Some(PathBuf::from("other.png")));
        assert_eq!(cli.seed, 123);
        assert_eq!(cli.iterations, 40);
        assert_eq!(cli.points, 500);
        assert_eq!(cli.mode, DensityMode::Color);
        assert_eq!(cli.easing, Easing::CubicInOut);
        assert!(cli.fixed_size && cli.edges && cli.fill && cli.visualize && cli.quiet);
    }

    // Tests short flag parsing
    // Verified by changing short flag definitions
    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["program", "test.png", "-s", "999", "-i", "100", "-m", "color"]);

        assert_eq!(cli.seed, 999);
        assert_eq!(cli.iterations, 100);
        assert_eq!(cli.mode, DensityMode::Color);
    }

    // Tests progress display based on --quiet flag
    // Verified by inverting quiet flag logic
    #[test]
    fn test_should_show_progress() {
        assert!(Cli::parse_from(["program", "test.png"]).should_show_progress());
        assert!(!Cli::parse_from(["program", "test.png", "--quiet"]).should_show_progress());
    }

    // Tests flags map onto the engine and transition configurations
    // Verified by inverting the fixed-size flag
    #[test]
    fn test_configs_from_flags() {
        let cli = Cli::parse_from([
            "program",
            "test.png",
            "--fixed-size",
            "-e",
            "-p",
            "77",
            "-f",
            "9",
            "--match-distance",
            "3.5",
        ]);

        let config = cli.stipple_config();
        assert!(!config.adaptive_point_size);
        assert!(config.record_edges);
        assert_eq!(config.initial_points, 77);
        assert!(config.validate().is_ok());

        let transition = cli.transition_config();
        assert_eq!(transition.frames, 9);
        assert!((transition.match_distance - 3.5).abs() < f32::EPSILON);
    }

    // Tests error handling for missing files
    // Verified by removing error return for nonexistent files
    #[test]
    fn test_process_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let cli = quick_cli(&temp_dir.path().join("missing.png"), &[]);

        assert!(FileProcessor::new(cli).process().is_err());
    }

    // Tests error handling for files that are not images
    // Verified by skipping decode errors
    #[test]
    fn test_process_invalid_file_type() {
        let temp_dir = TempDir::new().unwrap();
        let txt_file = temp_dir.path().join("test.txt");
        fs::write(&txt_file, "not a png").unwrap();

        assert!(FileProcessor::new(quick_cli(&txt_file, &[])).process().is_err());
    }

    // Tests invalid flags are rejected before any output is written
    // Verified by validating after rendering
    #[test]
    fn test_process_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.png");
        write_gradient(&input);

        let cli = quick_cli(&input, &["--min-size", "6", "--max-size", "2"]);

        assert!(FileProcessor::new(cli).process().is_err());
        assert!(!temp_dir.path().join("photo_stippled.png").exists());
    }

    // Tests the stippled PNG is written next to the input
    // Verified by changing the output suffix
    #[test]
    fn test_process_writes_png() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.png");
        write_gradient(&input);

        FileProcessor::new(quick_cli(&input, &["--edges"]))
            .process()
            .unwrap();

        let output = image::open(temp_dir.path().join("photo_stippled.png")).unwrap();
        assert_eq!((output.width(), output.height()), (16, 12));
        assert!(!temp_dir.path().join("photo_iterations.gif").exists());
    }

    // Tests visualization and morph targets produce their animations
    // Verified by skipping the transition export
    #[test]
    fn test_process_writes_animations() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.png");
        let target = temp_dir.path().join("target.png");
        write_gradient(&input);
        RgbaImage::from_fn(16, 12, |_, y| {
            let level = (y * 20).min(255) as u8;
            Rgba([level, level, level, 255])
        })
        .save(&target)
        .unwrap();

        let cli = quick_cli(
            &input,
            &["--visualize", "--target", target.to_str().unwrap(), "-f", "3"],
        );
        FileProcessor::new(cli).process().unwrap();

        assert!(temp_dir.path().join("photo_stippled.png").exists());
        assert!(temp_dir.path().join("photo_iterations.gif").exists());
        assert!(temp_dir.path().join("photo_transition.gif").exists());
    }

    // Tests color mode runs every ink layer end to end
    // Verified by rendering only the first layer
    #[test]
    fn test_process_color_mode() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("swatch.png");
        RgbaImage::from_pixel(12, 12, Rgba([200, 40, 90, 255]))
            .save(&input)
            .unwrap();

        FileProcessor::new(quick_cli(&input, &["-m", "color"]))
            .process()
            .unwrap();

        assert!(temp_dir.path().join("swatch_stippled.png").exists());
    }

    // Tests fill dots are drawn and animated in next to the stippling
    // Verified by skipping the fill export
    #[test]
    fn test_process_fill() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.png");
        write_gradient(&input);

        FileProcessor::new(quick_cli(&input, &["--fill", "-f", "3"]))
            .process()
            .unwrap();

        assert!(temp_dir.path().join("photo_stippled.png").exists());
        assert!(temp_dir.path().join("photo_fill.gif").exists());
        assert!(!temp_dir.path().join("photo_transition.gif").exists());
    }

    // Tests inverse mode renders light dots on a black canvas
    // Verified by rendering inverse runs on paper
    #[test]
    fn test_process_inverse_mode() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("night.png");
        RgbaImage::from_pixel(12, 12, Rgba([30, 30, 30, 255]))
            .save(&input)
            .unwrap();

        FileProcessor::new(quick_cli(&input, &["-m", "inverse"]))
            .process()
            .unwrap();

        let output = image::open(temp_dir.path().join("night_stippled.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(output.get_pixel(0, 0).0[3], 255);
        assert!(output.pixels().any(|p| p.0[0] < 128));
    }
}
