use async_trait::async_trait;
use image::DynamicImage;
use pdf2image::{DPI, PDF, Pages, RenderOptionsBuilder};
use tracing::info;

use crate::error::RasterizeError;

/// Render resolution for paged documents.
pub const RASTER_DPI: u32 = 200;

/// Seam to the external rasterizer: bytes in, ordered page bitmaps out.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, bytes: Vec<u8>) -> Result<Vec<DynamicImage>, RasterizeError>;
}

/// Poppler-backed PDF rasterizer via pdf2image. Rendering is CPU-bound and
/// runs on the blocking pool.
pub struct PdfRasterizer;

#[async_trait]
impl Rasterizer for PdfRasterizer {
    async fn rasterize(&self, bytes: Vec<u8>) -> Result<Vec<DynamicImage>, RasterizeError> {
        if bytes.is_empty() {
            return Err(RasterizeError::EmptyInput);
        }

        let pages = tokio::task::spawn_blocking(move || -> Result<Vec<DynamicImage>, RasterizeError> {
            let pdf = PDF::from_bytes(bytes).map_err(|e| RasterizeError::Render(e.to_string()))?;
            let options = RenderOptionsBuilder::default()
                .resolution(DPI::Uniform(RASTER_DPI))
                .build()
                .map_err(|e| RasterizeError::Render(e.to_string()))?;
            pdf.render(Pages::All, options)
                .map_err(|e| RasterizeError::Render(e.to_string()))
        })
        .await
        .map_err(|e| RasterizeError::Join(e.to_string()))??;

        if pages.is_empty() {
            return Err(RasterizeError::NoPages);
        }

        info!(pages = pages.len(), "rasterized pdf");
        Ok(pages)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Test double returning a fixed page count (or a scripted failure).
    pub(crate) enum ScriptedRasterizer {
        Pages(usize),
        Empty,
        Fails,
    }

    #[async_trait]
    impl Rasterizer for ScriptedRasterizer {
        async fn rasterize(&self, _bytes: Vec<u8>) -> Result<Vec<DynamicImage>, RasterizeError> {
            match self {
                ScriptedRasterizer::Pages(count) => Ok((0..*count)
                    .map(|_| DynamicImage::new_rgb8(4, 4))
                    .collect()),
                ScriptedRasterizer::Empty => Ok(Vec::new()),
                ScriptedRasterizer::Fails => {
                    Err(RasterizeError::Render("scripted failure".to_string()))
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let result = PdfRasterizer.rasterize(Vec::new()).await;
        assert!(matches!(result, Err(RasterizeError::EmptyInput)));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_render() {
        let result = PdfRasterizer.rasterize(b"not a pdf".to_vec()).await;
        assert!(matches!(result, Err(RasterizeError::Render(_))));
    }
}
