//! Tumor class labels and static metadata
//!
//! The label order must stay identical to the class order used when the
//! model was trained (class folders sorted alphabetically):
//! glioma, meningioma, notumor, pituitary.

use serde::Serialize;

/// Output cardinality of the classifier
pub const NUM_CLASSES: usize = 4;

/// Tumor classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TumorClass {
    Glioma,
    Meningioma,
    NoTumor,
    Pituitary,
}

impl TumorClass {
    /// All classes in model output order
    pub const ALL: [TumorClass; NUM_CLASSES] = [
        TumorClass::Glioma,
        TumorClass::Meningioma,
        TumorClass::NoTumor,
        TumorClass::Pituitary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TumorClass::Glioma => "glioma",
            TumorClass::Meningioma => "meningioma",
            TumorClass::NoTumor => "notumor",
            TumorClass::Pituitary => "pituitary",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TumorClass::Glioma => "Glioma",
            TumorClass::Meningioma => "Meningioma",
            TumorClass::NoTumor => "No Tumor",
            TumorClass::Pituitary => "Pituitary Adenoma",
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn metadata(&self) -> &'static ClassMetadata {
        match self {
            TumorClass::Glioma => &GLIOMA_INFO,
            TumorClass::Meningioma => &MENINGIOMA_INFO,
            TumorClass::NoTumor => &NO_TUMOR_INFO,
            TumorClass::Pituitary => &PITUITARY_INFO,
        }
    }
}

/// Static descriptive metadata for one tumor class
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetadata {
    pub description: &'static str,
    pub details: &'static str,
    pub treatment: &'static str,
    pub prognosis: &'static str,
    /// Display color for result rendering (hex)
    pub color: &'static str,
    pub severity: &'static str,
}

static GLIOMA_INFO: ClassMetadata = ClassMetadata {
    description: "Gliomas are brain tumors that develop from glial cells, \
        which support and protect nerve cells in the brain.",
    details: "Gliomas are the most common type of primary brain tumor in \
        adults. They can be slow-growing (low-grade) or fast-growing \
        (high-grade). Symptoms may include headaches, seizures, memory \
        problems and neurological deficits depending on the location.",
    treatment: "Treatment typically involves a combination of surgery, \
        radiation therapy and chemotherapy, depending on the type, grade, \
        location and size of the tumor.",
    prognosis: "Prognosis varies significantly with the grade and location \
        of the tumor. Low-grade gliomas may have better outcomes than \
        high-grade ones.",
    color: "#e74c3c",
    severity: "high",
};

static MENINGIOMA_INFO: ClassMetadata = ClassMetadata {
    description: "Meningiomas are tumors that develop from the meninges, \
        the protective membranes surrounding the brain and spinal cord.",
    details: "Most meningiomas are benign and grow slowly. They are more \
        common in women and older adults. Symptoms depend on location and \
        size, and may include headaches, vision problems or seizures.",
    treatment: "Options include observation for small asymptomatic tumors, \
        surgical removal and radiation therapy. Many meningiomas can be \
        completely cured with surgery.",
    prognosis: "Generally good for benign meningiomas, especially when \
        completely removed surgically.",
    color: "#f39c12",
    severity: "moderate",
};

static NO_TUMOR_INFO: ClassMetadata = ClassMetadata {
    description: "No tumor detected - the brain scan appears normal without \
        signs of abnormal growth or masses.",
    details: "A normal brain MRI shows healthy brain tissue without evidence \
        of tumors, lesions or other abnormalities. Brain structures appear \
        intact with normal signal intensity.",
    treatment: "No treatment is needed for a normal scan. Continue regular \
        check-ups as recommended by a healthcare provider.",
    prognosis: "Excellent - no abnormalities detected.",
    color: "#2ecc71",
    severity: "none",
};

static PITUITARY_INFO: ClassMetadata = ClassMetadata {
    description: "Pituitary tumors (adenomas) are growths in the pituitary \
        gland, a small gland at the base of the brain that controls hormone \
        production.",
    details: "Most pituitary tumors are benign adenomas. They can be \
        functioning (producing excess hormones) or non-functioning. Symptoms \
        may include headaches, vision problems and hormonal imbalances.",
    treatment: "Depending on type and size, options include medication to \
        control hormone levels, surgery (often through the nose) and \
        radiation therapy.",
    prognosis: "Generally good with appropriate treatment. Many patients \
        achieve normal hormone levels and symptom relief.",
    color: "#9b59b6",
    severity: "moderate",
};
