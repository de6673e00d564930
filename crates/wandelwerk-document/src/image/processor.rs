// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image compression and format conversion using the `image` crate.

use image::DynamicImage;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use tracing::{debug, info, instrument};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::types::{ConversionOutcome, ImageFormat, ResultFile, SourceFile};

/// Largest dimension kept when compressing; bigger images are downscaled to
/// fit, preserving aspect ratio.
const MAX_DIMENSION: u32 = 4096;

/// Encoder speed for AVIF (1 slowest/best … 10 fastest).
const AVIF_SPEED: u8 = 4;

/// Re-encode an image in its own format at the given quality (1–100),
/// downscaling to at most 4096 px on either axis first.
///
/// Quality applies to the lossy formats; PNG re-encodes as-is and WebP
/// re-encodes losslessly (the `image` crate carries no lossy WebP encoder).
/// The reported ratio is `(original − result) / original` and may be
/// negative when recompression grows the file.
#[instrument(skip(file), fields(name = %file.name, quality))]
pub fn compress_image(file: &SourceFile, quality: u8) -> Result<ConversionOutcome> {
    let format = ImageFormat::from_mime(&file.mime).ok_or_else(|| {
        WandelwerkError::UnsupportedInput(format!("not a compressible image type: {}", file.mime))
    })?;

    let decoded = decode(file)?;
    let bounded = if decoded.width() > MAX_DIMENSION || decoded.height() > MAX_DIMENSION {
        info!(
            from_w = decoded.width(),
            from_h = decoded.height(),
            max = MAX_DIMENSION,
            "Downscaling oversized image"
        );
        decoded.resize(
            MAX_DIMENSION,
            MAX_DIMENSION,
            image::imageops::FilterType::Lanczos3,
        )
    } else {
        decoded
    };

    let data = encode(&bounded, format, quality)?;
    let result = ResultFile::new(compressed_name(&file.name), format.mime_type(), data);
    let outcome = ConversionOutcome::new(result, file.size());

    debug!(
        original = outcome.original_size,
        converted = outcome.converted_size,
        reduction = outcome.reduction_percent(),
        "Image compressed"
    );
    Ok(outcome)
}

/// Decode an image and re-encode it in the target format.
///
/// Quality applies to JPEG and AVIF; PNG ignores it and WebP encodes
/// losslessly. The output is renamed to the target extension.
#[instrument(skip(file), fields(name = %file.name, target = ?target, quality))]
pub fn convert_format(file: &SourceFile, target: ImageFormat, quality: u8) -> Result<ResultFile> {
    let decoded = decode(file)?;
    let data = encode(&decoded, target, quality)?;

    let name = format!("{}.{}", file.stem(), target.extension());
    info!(output = %name, "Image converted");
    Ok(ResultFile::new(name, target.mime_type(), data))
}

/// Decode any `image`-supported input.
pub(crate) fn decode(file: &SourceFile) -> Result<DynamicImage> {
    image::load_from_memory(&file.data).map_err(|err| {
        WandelwerkError::Image(format!("failed to decode {}: {}", file.name, err))
    })
}

/// Encode a decoded image into one of the toolbox formats.
pub(crate) fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let quality = quality.clamp(1, 100);
    let mut buffer = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            image
                .to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|err| WandelwerkError::Image(format!("JPEG encoding failed: {}", err)))?;
        }
        ImageFormat::Png => {
            let mut cursor = std::io::Cursor::new(&mut buffer);
            image
                .write_to(&mut cursor, image::ImageFormat::Png)
                .map_err(|err| WandelwerkError::Image(format!("PNG encoding failed: {}", err)))?;
        }
        ImageFormat::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut buffer);
            image
                .to_rgba8()
                .write_with_encoder(encoder)
                .map_err(|err| WandelwerkError::Image(format!("WebP encoding failed: {}", err)))?;
        }
        ImageFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(&mut buffer, AVIF_SPEED, quality);
            image
                .to_rgba8()
                .write_with_encoder(encoder)
                .map_err(|err| WandelwerkError::Image(format!("AVIF encoding failed: {}", err)))?;
        }
    }

    Ok(buffer)
}

/// `photo.jpg` → `photo_compressed.jpg`; extensionless names get a plain
/// `_compressed` suffix.
fn compressed_name(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => format!("{}_compressed{}", &name[..idx], &name[idx..]),
        _ => format!("{}_compressed", name),
    }
}
