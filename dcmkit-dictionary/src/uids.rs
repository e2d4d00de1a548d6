//! Well-known UIDs needed to negotiate associations and build DIMSE
//! requests: transfer syntaxes, SOP classes, and query/retrieve
//! information models.

/// Transfer syntax UIDs.
pub mod transfer_syntax {
    /// Implicit VR Little Endian: the default transfer syntax.
    pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
    /// Explicit VR Little Endian.
    pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
    /// Explicit VR Big Endian (retired).
    pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
    /// Deflated Explicit VR Little Endian.
    pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";
    /// JPEG Baseline (Process 1), recognized but not decoded.
    pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";
    /// JPEG Lossless, Non-Hierarchical, First-Order Prediction.
    pub const JPEG_LOSSLESS: &str = "1.2.840.10008.1.2.4.70";
    /// JPEG-LS Lossless Image Compression.
    pub const JPEG_LS_LOSSLESS: &str = "1.2.840.10008.1.2.4.80";
    /// JPEG 2000 Image Compression (Lossless Only).
    pub const JPEG_2000_LOSSLESS: &str = "1.2.840.10008.1.2.4.90";
    /// JPEG 2000 Image Compression.
    pub const JPEG_2000: &str = "1.2.840.10008.1.2.4.91";
    /// RLE Lossless.
    pub const RLE_LOSSLESS: &str = "1.2.840.10008.1.2.5";
}

/// SOP Class UIDs for the service classes this toolkit acts as an SCU
/// for.
pub mod sop_class {
    /// Verification SOP Class (C-ECHO).
    pub const VERIFICATION: &str = "1.2.840.10008.1.1";
    /// Patient Root Query/Retrieve Information Model - FIND.
    pub const PATIENT_ROOT_FIND: &str = "1.2.840.10008.5.1.4.1.2.1.1";
    /// Patient Root Query/Retrieve Information Model - MOVE.
    pub const PATIENT_ROOT_MOVE: &str = "1.2.840.10008.5.1.4.1.2.1.2";
    /// Patient Root Query/Retrieve Information Model - GET.
    pub const PATIENT_ROOT_GET: &str = "1.2.840.10008.5.1.4.1.2.1.3";
    /// Study Root Query/Retrieve Information Model - FIND.
    pub const STUDY_ROOT_FIND: &str = "1.2.840.10008.5.1.4.1.2.2.1";
    /// Study Root Query/Retrieve Information Model - MOVE.
    pub const STUDY_ROOT_MOVE: &str = "1.2.840.10008.5.1.4.1.2.2.2";
    /// Study Root Query/Retrieve Information Model - GET.
    pub const STUDY_ROOT_GET: &str = "1.2.840.10008.5.1.4.1.2.2.3";
    /// Modality Worklist Information Model - FIND.
    pub const MODALITY_WORKLIST_FIND: &str = "1.2.840.10008.5.1.4.31";
}

/// The full set of transfer syntax UIDs that this toolkit understands
/// well enough to decode element headers and datasets for (as opposed to
/// the compressed ones, which are only recognized and treated opaquely).
pub const NATIVE_TRANSFER_SYNTAXES: &[&str] = &[
    transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN,
    transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN,
    transfer_syntax::EXPLICIT_VR_BIG_ENDIAN,
    transfer_syntax::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
];
