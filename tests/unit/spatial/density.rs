//! Tests for density extraction from images

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use ndarray::Array2;
    use stippler::StippleError;
    use stippler::math::Point;
    use stippler::spatial::density::{DensityField, DensityMode, DensitySource, InkChannel};

    // Tests grayscale density is inverted luminance
    // Verified by dropping the inversion
    #[test]
    fn test_luminance_density() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 255]));

        let field = DensityField::from_rgba(&image, DensitySource::Luminance).unwrap();

        assert!(field.sample(0, 0).abs() < 1e-6);
        assert!((field.sample(1, 0) - 1.0).abs() < 1e-6);
        assert!((field.density_sum() - 1.0).abs() < f32::EPSILON);
        assert_eq!(field.ink(), [0, 0, 0, 255]);
    }

    // Tests transparent pixels carry no ink
    // Verified by ignoring alpha
    #[test]
    fn test_alpha_scales_density() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let field = DensityField::from_rgba(&image, DensitySource::Luminance).unwrap();

        assert!(field.sample(0, 0).abs() < 1e-6);
    }

    // Tests color channels each carry a third of a black pixel's ink
    // Verified by omitting the density_sum scaling
    #[test]
    fn test_channel_density_sum() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));

        let total: f32 = DensityMode::Color
            .sources()
            .into_iter()
            .map(|source| {
                DensityField::from_rgba(&image, source)
                    .unwrap()
                    .sample(0, 0)
            })
            .sum();

        assert!((total - 1.0).abs() < 1e-5);
    }

    // Tests a pure red pixel only feeds the cyan channel
    // Verified by reading the wrong component
    #[test]
    fn test_channel_selection() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 255, 255, 255]));

        let cyan = DensityField::from_rgba(&image, DensitySource::Channel(InkChannel::Cyan)).unwrap();
        let magenta =
            DensityField::from_rgba(&image, DensitySource::Channel(InkChannel::Magenta)).unwrap();

        assert!((cyan.sample(0, 0) - 1.0 / 3.0).abs() < 1e-5);
        assert!(magenta.sample(0, 0).abs() < 1e-6);
        assert_eq!(cyan.ink(), InkChannel::Cyan.ink());
    }

    // Tests grayscale mode has one source and color mode three
    // Verified by returning a single source in color mode
    #[test]
    fn test_mode_sources() {
        assert_eq!(DensityMode::Grayscale.sources(), vec![DensitySource::Luminance]);
        assert_eq!(DensityMode::Color.sources().len(), 3);
        assert_eq!(DensityMode::Inverse.sources(), vec![DensitySource::Inverted]);
    }

    // Tests inverse density follows luminance and draws in white
    // Verified by reusing the grayscale inversion
    #[test]
    fn test_inverted_density() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 255]));

        let field = DensityField::from_rgba(&image, DensitySource::Inverted).unwrap();

        assert!((field.sample(0, 0) - 1.0).abs() < 1e-6);
        assert!(field.sample(1, 0).abs() < 1e-6);
        assert_eq!(field.ink(), [255, 255, 255, 255]);
    }

    // Tests the complement holds the ink left out, relative to the field's share
    // Verified by complementing against 1.0 for every field
    #[test]
    fn test_complement() {
        let values = Array2::from_shape_vec((1, 2), vec![0.25, 1.0]).unwrap();
        let field = DensityField::from_values(values).unwrap();

        let complement = field.complement().with_ink([9, 9, 9, 255]);

        assert!((complement.sample(0, 0) - 0.75).abs() < 1e-6);
        assert!(complement.sample(1, 0).abs() < 1e-6);
        assert_eq!(complement.ink(), [9, 9, 9, 255]);
        assert_eq!(field.ink(), [0, 0, 0, 255]);

        let image = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let cyan = DensityField::from_rgba(&image, DensitySource::Channel(InkChannel::Cyan)).unwrap();
        assert!((cyan.complement().sample(0, 0) - 1.0 / 3.0).abs() < 1e-5);
    }

    // Tests samples outside the frame read zero without wraparound
    // Verified by wrapping coordinates modulo the size
    #[test]
    fn test_out_of_frame_is_zero() {
        let field = DensityField::uniform(4, 4, 1.0).unwrap();

        assert!(field.sample(-1, 0).abs() < f32::EPSILON);
        assert!(field.sample(4, 0).abs() < f32::EPSILON);
        assert!(field.sample(0, 4).abs() < f32::EPSILON);
        assert!((field.sample(3, 3) - 1.0).abs() < f32::EPSILON);
        assert!(field.sample_at(Point::new(f32::NAN, 1.0)).abs() < f32::EPSILON);
    }

    // Tests precomputed values are clamped into [0, 1]
    // Verified by removing the clamp
    #[test]
    fn test_from_values_clamps() {
        let values = Array2::from_shape_vec((1, 3), vec![-1.0, 0.5, 7.0]).unwrap();
        let field = DensityField::from_values(values).unwrap();

        assert!(field.sample(0, 0).abs() < f32::EPSILON);
        assert!((field.sample(1, 0) - 0.5).abs() < f32::EPSILON);
        assert!((field.sample(2, 0) - 1.0).abs() < f32::EPSILON);
        assert_eq!((field.width(), field.height()), (3, 1));
    }

    // Tests empty images are rejected
    // Verified by removing the dimension check
    #[test]
    fn test_empty_image_rejected() {
        let result = DensityField::uniform(0, 5, 1.0);
        assert!(matches!(result, Err(StippleError::InvalidSourceData { .. })));
    }

    // Tests total ink sums every pixel
    // Verified by summing a single row
    #[test]
    fn test_total() {
        let field = DensityField::uniform(4, 2, 0.5).unwrap();
        assert!((field.total() - 4.0).abs() < 1e-9);
    }
}
