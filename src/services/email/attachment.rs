use mail_parser::{Message, MimeHeaders};

/// Filename suffixes treated as candidate CV documents.
pub const CV_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt"];

/// Attachment extracted from a message
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub size: usize,
}

/// Attachment extraction and filtering
pub struct AttachmentHandler;

impl AttachmentHandler {
    /// Extract every named attachment from a parsed message. The allowlist is
    /// applied separately so a message with only non-CV attachments still
    /// counts as "has attachments".
    pub fn extract_attachments(parsed: &Message) -> Vec<Attachment> {
        let mut attachments = Vec::new();

        for part in &parsed.parts {
            // Parts without a filename are inline bodies, not attachments.
            if let Some(filename) = part.attachment_name() {
                let content_type = part
                    .content_type()
                    .map(|ct| {
                        if let Some(subtype) = ct.subtype() {
                            format!("{}/{}", ct.c_type, subtype)
                        } else {
                            ct.c_type.to_string()
                        }
                    })
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let data = part.contents().to_vec();
                let size = data.len();
                attachments.push(Attachment {
                    filename: filename.to_string(),
                    content_type,
                    data,
                    size,
                });
            }
        }

        attachments
    }

    /// True iff the filename, lowercased, ends with an allowlisted suffix.
    /// No content-type sniffing, no size limit.
    pub fn is_cv_attachment(filename: &str) -> bool {
        let lower = filename.to_lowercase();
        CV_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cv_attachment() {
        assert!(AttachmentHandler::is_cv_attachment("cv.pdf"));
        assert!(AttachmentHandler::is_cv_attachment("resume.doc"));
        assert!(AttachmentHandler::is_cv_attachment("resume.docx"));
        assert!(AttachmentHandler::is_cv_attachment("cover-letter.txt"));
        assert!(AttachmentHandler::is_cv_attachment("cv.rtf"));
        assert!(AttachmentHandler::is_cv_attachment("cv.odt"));
        assert!(!AttachmentHandler::is_cv_attachment("photo.jpg"));
        assert!(!AttachmentHandler::is_cv_attachment("archive.zip"));
        assert!(!AttachmentHandler::is_cv_attachment("cv.pdf.exe"));
        assert!(!AttachmentHandler::is_cv_attachment(""));
    }

    #[test]
    fn test_is_cv_attachment_is_case_insensitive() {
        assert!(AttachmentHandler::is_cv_attachment("Resume.PDF"));
        assert!(AttachmentHandler::is_cv_attachment("CV.DocX"));
        assert!(!AttachmentHandler::is_cv_attachment("PHOTO.JPG"));
    }
}
