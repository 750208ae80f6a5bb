//! PaddleOCR engine.
//!
//! Uses paddle-ocr-rs for OCR via ONNX Runtime. Models are downloaded on
//! first use from the RapidOCR model hub.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use paddle_ocr_rs::ocr_lite::OcrLite;

use super::backend::{OcrBackendType, OcrConfig, OcrEngine, OcrError};
use super::model_utils::{ensure_model_file, ModelDirConfig, ModelSpec};
use super::normalize::{NdArray, RawValue, ScalarValue};

/// Loaded models. `detect_from_path` needs `&mut self`, hence the mutex.
static OCR_LITE: OnceLock<Mutex<OcrLite>> = OnceLock::new();

const DET_MODEL_NAME: &str = "ch_PP-OCRv4_det_infer.onnx";
const REC_MODEL_NAME: &str = "ch_PP-OCRv4_rec_infer.onnx";
const CLS_MODEL_NAME: &str = "ch_ppocr_mobile_v2.0_cls_infer.onnx";

const MODEL_CONFIG: ModelDirConfig = ModelDirConfig {
    subdir: "paddle-ocr",
    required_files: &[DET_MODEL_NAME, REC_MODEL_NAME, CLS_MODEL_NAME],
};

const MODELS: [ModelSpec; 3] = [
    ModelSpec {
        url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_det_infer.onnx",
        filename: DET_MODEL_NAME,
        size_hint: "4 MB",
    },
    ModelSpec {
        url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_rec_infer.onnx",
        filename: REC_MODEL_NAME,
        size_hint: "10 MB",
    },
    ModelSpec {
        url: "https://www.modelscope.cn/models/RapidAI/RapidOCR/resolve/v3.4.0/onnx/PP-OCRv4/cls/ch_ppocr_mobile_v2.0_cls_infer.onnx",
        filename: CLS_MODEL_NAME,
        size_hint: "1 MB",
    },
];

/// PaddleOCR engine via ONNX Runtime.
pub struct PaddleEngine {
    config: OcrConfig,
}

impl PaddleEngine {
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    fn ensure_models(&self) -> Result<PathBuf, OcrError> {
        if let Some(dir) = MODEL_CONFIG.find(self.config.model_path.as_deref()) {
            return Ok(dir);
        }

        let model_dir = MODEL_CONFIG.default_dir();
        std::fs::create_dir_all(&model_dir)?;
        for spec in &MODELS {
            ensure_model_file(spec, &model_dir)?;
        }
        Ok(model_dir)
    }

    /// Get or initialize the loaded models.
    fn get_or_init(&self) -> Result<&'static Mutex<OcrLite>, OcrError> {
        if let Some(engine) = OCR_LITE.get() {
            return Ok(engine);
        }

        let model_dir = self.ensure_models()?;
        let model = |name: &str| model_dir.join(name).to_string_lossy().to_string();

        let mut ocr = OcrLite::new();
        ocr.init_models(
            &model(DET_MODEL_NAME),
            &model(CLS_MODEL_NAME),
            &model(REC_MODEL_NAME),
            4,
        )
        .map_err(|e| OcrError::OcrFailed(format!("Failed to init PaddleOCR: {}", e)))?;

        let _ = OCR_LITE.set(Mutex::new(ocr));
        OCR_LITE
            .get()
            .ok_or_else(|| OcrError::OcrFailed("Failed to cache OCR engine".to_string()))
    }
}

impl OcrEngine for PaddleEngine {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::PaddleOcr
    }

    fn is_available(&self) -> bool {
        // Models are downloaded on first use.
        true
    }

    fn availability_hint(&self) -> String {
        match MODEL_CONFIG.find(self.config.model_path.as_deref()) {
            Some(path) => format!("PaddleOCR models found at {:?}", path),
            None => format!(
                "PaddleOCR models will be downloaded on first use (~15 MB) to {:?}",
                MODEL_CONFIG.default_dir()
            ),
        }
    }

    fn detect(&self, image_path: &Path) -> Result<RawValue, OcrError> {
        let path = image_path.to_str().ok_or_else(|| {
            OcrError::OcrFailed(format!("Non UTF-8 image path: {}", image_path.display()))
        })?;

        let (width, height) = image::image_dimensions(image_path)
            .map_err(|e| OcrError::OcrFailed(format!("Unreadable page image: {}", e)))?;
        tracing::debug!("PaddleOCR on {}x{} image {}", width, height, image_path.display());

        let engine = self.get_or_init()?;
        let mut ocr = engine
            .lock()
            .map_err(|e| OcrError::OcrFailed(format!("Failed to lock OCR engine: {}", e)))?;

        let result = ocr
            .detect_from_path(
                path,
                50,    // padding
                1024,  // max side length
                0.5,   // box score threshold
                0.3,   // box threshold
                1.6,   // unclip ratio
                false, // do angle
                false, // most angle
            )
            .map_err(|e| OcrError::OcrFailed(format!("PaddleOCR detection failed: {}", e)))?;

        let lines = result
            .text_blocks
            .iter()
            .map(|block| {
                let points: Vec<[i64; 2]> = block
                    .box_points
                    .iter()
                    .map(|p| [i64::from(p.x), i64::from(p.y)])
                    .collect();
                RawValue::Seq(vec![
                    RawValue::Array(NdArray::from_int_points(&points)),
                    RawValue::Seq(vec![
                        RawValue::Str(block.text.clone()),
                        RawValue::Scalar(ScalarValue::F32(block.text_score)),
                    ]),
                ])
            })
            .collect();

        Ok(RawValue::Seq(vec![RawValue::Seq(lines)]))
    }
}
