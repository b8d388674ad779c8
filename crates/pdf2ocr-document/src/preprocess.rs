// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image cleanup ahead of text recognition: grayscale, contrast stretch,
// and a 3x3 median filter against scanner speckle.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::median_filter;
use tracing::{debug, instrument};

/// Prepare a rendered page for the recognition engine.
#[instrument(skip_all, fields(width = page.width(), height = page.height()))]
pub fn prepare_for_recognition(page: &DynamicImage) -> GrayImage {
    let gray = page.to_luma8();
    let stretched = autocontrast(&gray);
    let filtered = median_filter(&stretched, 1, 1);
    debug!("Page preprocessed");
    filtered
}

/// Linearly stretch the darkest pixel to black and the brightest to white.
///
/// A flat image is returned unchanged.
pub fn autocontrast(gray: &GrayImage) -> GrayImage {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), Luma([v])| (lo.min(*v), hi.max(*v)));
    if max <= min {
        return gray.clone();
    }

    let span = f32::from(max - min);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let Luma([v]) = *gray.get_pixel(x, y);
        let scaled = f32::from(v - min) * 255.0 / span;
        Luma([scaled.round().clamp(0.0, 255.0) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretches_to_full_range() {
        let mut img = GrayImage::from_pixel(4, 1, Luma([100]));
        img.put_pixel(0, 0, Luma([50]));
        img.put_pixel(3, 0, Luma([150]));
        let out = autocontrast(&img);
        assert_eq!(out.get_pixel(0, 0).0, [0]);
        assert_eq!(out.get_pixel(3, 0).0, [255]);
        assert_eq!(out.get_pixel(1, 0).0, [128]);
    }

    #[test]
    fn flat_image_unchanged() {
        let img = GrayImage::from_pixel(3, 3, Luma([77]));
        assert_eq!(autocontrast(&img), img);
    }

    #[test]
    fn median_removes_single_speckle() {
        let mut img = GrayImage::from_pixel(5, 5, Luma([255]));
        img.put_pixel(2, 2, Luma([0]));
        img.put_pixel(0, 0, Luma([0]));
        let out = prepare_for_recognition(&DynamicImage::ImageLuma8(img));
        assert_eq!(out.get_pixel(2, 2).0, [255]);
    }
}
