use std::sync::Arc;

use image::DynamicImage;
use tracing::{info, warn};

use crate::models::{CategoryUploads, DocumentCategory, ExtractionResults, FileResult, UploadedFile};
use crate::pipeline::extract::PageExtractor;
use crate::pipeline::rasterize::Rasterizer;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Stage 1: turns per-category uploads into per-page extraction results.
///
/// Files and pages are processed strictly sequentially; a file that yields no
/// pages (unsupported extension, rasterization failure, undecodable image) is
/// omitted rather than failing the batch.
pub struct DocumentPipeline {
    extractor: PageExtractor,
    rasterizer: Arc<dyn Rasterizer>,
}

impl DocumentPipeline {
    pub fn new(extractor: PageExtractor, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            extractor,
            rasterizer,
        }
    }

    pub async fn run(&self, uploads: CategoryUploads) -> ExtractionResults {
        let mut results = ExtractionResults::default();

        for (category, files) in uploads.into_entries() {
            if files.is_empty() {
                continue;
            }
            info!(category = %category, files = files.len(), "processing uploads");

            for file in files {
                let UploadedFile { filename, contents } = file;

                let Some(images) = self.page_images(&filename, contents, category).await else {
                    continue;
                };
                if images.is_empty() {
                    continue;
                }

                let mut pages = Vec::with_capacity(images.len());
                for (index, image) in images.iter().enumerate() {
                    info!(
                        category = %category,
                        filename = %filename,
                        page = index + 1,
                        total = images.len(),
                        "extracting page"
                    );
                    pages.push(self.extractor.extract(image, category).await);
                }

                results
                    .category_mut(category)
                    .push(FileResult { filename, pages });
            }
        }

        results
    }

    async fn page_images(
        &self,
        filename: &str,
        contents: Vec<u8>,
        category: DocumentCategory,
    ) -> Option<Vec<DynamicImage>> {
        match extension(filename).as_deref() {
            Some("pdf") => match self.rasterizer.rasterize(contents).await {
                Ok(pages) => Some(pages),
                Err(error) => {
                    warn!(
                        category = %category,
                        filename = %filename,
                        error = %error,
                        "rasterization failed, skipping file"
                    );
                    None
                }
            },
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => {
                match image::load_from_memory(&contents) {
                    Ok(image) => Some(vec![image]),
                    Err(error) => {
                        warn!(
                            category = %category,
                            filename = %filename,
                            error = %error,
                            "could not decode image, skipping file"
                        );
                        None
                    }
                }
            }
            _ => {
                warn!(filename = %filename, "skipping unsupported file");
                None
            }
        }
    }
}

fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::ScriptedClient;
    use crate::pipeline::rasterize::testing::ScriptedRasterizer;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut buffer = Vec::new();
        DynamicImage::new_rgb8(4, 4)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn pipeline(
        replies: Vec<Result<String, crate::error::InferenceError>>,
        rasterizer: ScriptedRasterizer,
    ) -> DocumentPipeline {
        let client = Arc::new(ScriptedClient::new(replies));
        DocumentPipeline::new(
            PageExtractor::new(client, "test-model"),
            Arc::new(rasterizer),
        )
    }

    fn upload(filename: &str, contents: Vec<u8>) -> UploadedFile {
        UploadedFile {
            filename: filename.to_string(),
            contents,
        }
    }

    #[tokio::test]
    async fn single_image_upload_becomes_one_page() {
        let p = pipeline(
            vec![Ok(r#"{"patient_name": "Jane Roe"}"#.to_string())],
            ScriptedRasterizer::Pages(0),
        );
        let mut uploads = CategoryUploads::default();
        uploads.push(DocumentCategory::MedicalReport, upload("scan.png", png_bytes()));

        let results = p.run(uploads).await;

        assert_eq!(results.medical_report.len(), 1);
        let file = &results.medical_report[0];
        assert_eq!(file.filename, "scan.png");
        assert_eq!(file.pages.len(), 1);
        assert_eq!(file.pages[0]["patient_name"], "Jane Roe");
    }

    #[tokio::test]
    async fn pdf_pages_are_extracted_in_order() {
        let p = pipeline(
            vec![
                Ok(r#"{"patient_name": "page one"}"#.to_string()),
                Ok(r#"{"patient_name": "page two"}"#.to_string()),
            ],
            ScriptedRasterizer::Pages(2),
        );
        let mut uploads = CategoryUploads::default();
        uploads.push(DocumentCategory::Prescription, upload("rx.pdf", vec![1, 2, 3]));

        let results = p.run(uploads).await;

        let file = &results.prescription[0];
        assert_eq!(file.pages.len(), 2);
        assert_eq!(file.pages[0]["patient_name"], "page one");
        assert_eq!(file.pages[1]["patient_name"], "page two");
    }

    #[tokio::test]
    async fn zero_page_pdf_yields_no_file_result() {
        let p = pipeline(Vec::new(), ScriptedRasterizer::Empty);
        let mut uploads = CategoryUploads::default();
        uploads.push(DocumentCategory::MedicalBill, upload("empty.pdf", vec![0]));

        let results = p.run(uploads).await;
        assert!(results.medical_bill.is_empty());
    }

    #[tokio::test]
    async fn failed_rasterization_omits_the_file() {
        let p = pipeline(
            vec![Ok("{}".to_string())],
            ScriptedRasterizer::Fails,
        );
        let mut uploads = CategoryUploads::default();
        uploads.push(DocumentCategory::MedicalBill, upload("broken.pdf", vec![0]));
        uploads.push(DocumentCategory::MedicalBill, upload("scan.jpg", png_bytes()));

        let results = p.run(uploads).await;

        // The broken PDF disappears; the decodable image still goes through.
        assert_eq!(results.medical_bill.len(), 1);
        assert_eq!(results.medical_bill[0].filename, "scan.jpg");
    }

    #[tokio::test]
    async fn unsupported_extensions_are_skipped() {
        let p = pipeline(Vec::new(), ScriptedRasterizer::Pages(1));
        let mut uploads = CategoryUploads::default();
        uploads.push(DocumentCategory::MedicalReport, upload("notes.docx", vec![1]));
        uploads.push(DocumentCategory::MedicalReport, upload("noext", vec![1]));

        let results = p.run(uploads).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn undecodable_image_is_omitted() {
        let p = pipeline(Vec::new(), ScriptedRasterizer::Pages(1));
        let mut uploads = CategoryUploads::default();
        uploads.push(DocumentCategory::MedicalReport, upload("scan.png", vec![9, 9, 9]));

        let results = p.run(uploads).await;
        assert!(results.medical_report.is_empty());
    }

    #[tokio::test]
    async fn files_keep_upload_order_within_a_category() {
        let p = pipeline(
            vec![Ok("{}".to_string()), Ok("{}".to_string())],
            ScriptedRasterizer::Pages(1),
        );
        let mut uploads = CategoryUploads::default();
        uploads.push(DocumentCategory::Prescription, upload("first.png", png_bytes()));
        uploads.push(DocumentCategory::Prescription, upload("second.png", png_bytes()));

        let results = p.run(uploads).await;

        let names: Vec<_> = results
            .prescription
            .iter()
            .map(|f| f.filename.as_str())
            .collect();
        assert_eq!(names, ["first.png", "second.png"]);
    }

    #[tokio::test]
    async fn uppercase_extensions_are_recognized() {
        let p = pipeline(vec![Ok("{}".to_string())], ScriptedRasterizer::Pages(1));
        let mut uploads = CategoryUploads::default();
        uploads.push(DocumentCategory::MedicalReport, upload("SCAN.PNG", png_bytes()));

        let results = p.run(uploads).await;
        assert_eq!(results.medical_report.len(), 1);
    }
}
