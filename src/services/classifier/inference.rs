use crate::config::TensorLayout;
use crate::error::AppError;
use crate::models::classify_types::{ClassLabel, Classification, Prediction};
use crate::services::classifier::model_manager::Classifier;
use image::imageops::FilterType;
use ndarray::Array4;

/// Decode an upload and turn it into a `[1, ...]` tensor scaled to [0, 1].
pub fn preprocess_image(
    bytes: &[u8],
    input_size: u32,
    layout: TensorLayout,
) -> Result<Array4<f32>, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::bad_request(format!("Failed to decode image: {}", e)))?;

    // Alpha and grayscale inputs are folded to 3 channels before resizing.
    let rgb = img
        .resize_exact(input_size, input_size, FilterType::CatmullRom)
        .to_rgb8();

    let side = input_size as usize;
    let raw = rgb.into_raw();

    let tensor = match layout {
        TensorLayout::Nhwc => {
            let data: Vec<f32> = raw.iter().map(|&v| v as f32 / 255.0).collect();
            Array4::from_shape_vec((1, side, side, 3), data)
        }
        TensorLayout::Nchw => {
            let hw = side * side;
            let mut data = vec![0f32; 3 * hw];
            for (i, pixel) in raw.chunks_exact(3).enumerate() {
                data[i] = pixel[0] as f32 / 255.0;
                data[hw + i] = pixel[1] as f32 / 255.0;
                data[2 * hw + i] = pixel[2] as f32 / 255.0;
            }
            Array4::from_shape_vec((1, 3, side, side), data)
        }
    }
    .map_err(|e| AppError::new(format!("Failed to create tensor: {}", e)))?;

    Ok(tensor)
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_sum: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();
    logits
        .iter()
        .map(|&x| (x - max_logit).exp() / exp_sum)
        .collect()
}

/// Probability to a percentage with two decimals.
pub fn to_percentage(probability: f32) -> f32 {
    let pct = ((probability as f64) * 100.0).clamp(0.0, 100.0);
    ((pct * 100.0).round() / 100.0) as f32
}

/// Rank the post-softmax distribution. The first entry is the arg-max; ties
/// keep the lower class index first.
pub fn rank_predictions(probabilities: &[f32], top_k: usize) -> Result<Classification, AppError> {
    if probabilities.len() != ClassLabel::ALL.len() {
        return Err(format!(
            "Model produced {} scores, expected {}",
            probabilities.len(),
            ClassLabel::ALL.len()
        )
        .into());
    }

    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let top_k = top_k.clamp(1, indexed.len());
    let confidences: Vec<Prediction> = indexed[..top_k]
        .iter()
        .filter_map(|&(idx, prob)| {
            ClassLabel::from_index(idx).map(|label| Prediction {
                class_name: label.name().to_string(),
                confidence: to_percentage(prob),
            })
        })
        .collect();

    let best = confidences
        .first()
        .cloned()
        .ok_or_else(|| AppError::new("Model produced no scores"))?;

    Ok(Classification {
        label: best.class_name,
        confidence: best.confidence,
        confidences,
    })
}

pub fn classify_image_with_model(
    model: &mut dyn Classifier,
    bytes: &[u8],
    input_size: u32,
    layout: TensorLayout,
    top_k: usize,
) -> Result<Classification, AppError> {
    let tensor = preprocess_image(bytes, input_size, layout)?;
    let logits = model.run(tensor)?;
    rank_predictions(&softmax(&logits), top_k)
}
