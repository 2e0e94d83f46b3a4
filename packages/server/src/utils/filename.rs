/// Result of validating an uploaded image filename.
#[derive(Debug)]
pub enum ImageFilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename contains null bytes.
    NullByte,
    /// Filename starts with a dot (hidden file, includes `..`).
    Hidden,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
    /// Extension is missing or not an accepted image format.
    UnsupportedExtension,
}

impl ImageFilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Image filename cannot be empty",
            Self::ContainsPathSeparator => {
                "Invalid image filename: path separators are not allowed"
            }
            Self::NullByte => "Invalid image filename: null bytes are not allowed",
            Self::Hidden => "Invalid image filename: hidden files are not allowed",
            Self::ControlCharacter => {
                "Invalid image filename: control characters are not allowed"
            }
            Self::UnsupportedExtension => {
                "Unsupported image format: expected jpg, jpeg, png, gif or webp"
            }
        }
    }
}

/// Accepted image file extensions (lowercase).
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Validates the filename of an uploaded image: a flat name with no
/// directory components and a recognized image extension.
pub fn validate_image_filename(filename: &str) -> Result<&str, ImageFilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(ImageFilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(ImageFilenameError::NullByte);
    }

    // Reject ASCII control characters to prevent HTTP header injection
    // (e.g. CRLF in Content-Disposition).
    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(ImageFilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(ImageFilenameError::ContainsPathSeparator);
    }

    if trimmed.starts_with('.') {
        return Err(ImageFilenameError::Hidden);
    }

    let extension = trimmed
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or(ImageFilenameError::UnsupportedExtension)?;
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImageFilenameError::UnsupportedExtension);
    }

    Ok(trimmed)
}
