use serde::Serialize;
use std::fmt;

/// The four health categories the model was fine-tuned on, in output index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassLabel {
    Coccidiosis,
    Healthy,
    NewCastleDisease,
    Salmonella,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 4] = [
        ClassLabel::Coccidiosis,
        ClassLabel::Healthy,
        ClassLabel::NewCastleDisease,
        ClassLabel::Salmonella,
    ];

    pub fn from_index(index: usize) -> Option<ClassLabel> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClassLabel::Coccidiosis => "Coccidiosis",
            ClassLabel::Healthy => "Healthy",
            ClassLabel::NewCastleDisease => "NewCastleDisease",
            ClassLabel::Salmonella => "Salmonella",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ModelStatus {
    pub ready: bool,
    pub model_path: String,
    pub input_size: u32,
    pub top_k: usize,
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Prediction {
    pub class_name: String,
    /// Percentage in [0, 100], rounded to two decimals.
    pub confidence: f32,
}

#[derive(Debug, Serialize, Clone)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
    pub confidences: Vec<Prediction>,
}
