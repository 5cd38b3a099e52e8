use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelSheetError {
    #[error("Failed to load asset: {0}")]
    Asset(String),

    #[error("Failed to render barcode: {0}")]
    Barcode(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<lopdf::Error> for LabelSheetError {
    fn from(e: lopdf::Error) -> Self {
        LabelSheetError::Pdf(e.to_string())
    }
}
